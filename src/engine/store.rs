use std::ops::Range;

use crate::{core::ComponentMemory, error::WitnessError};

/// Flat arena of signal values shared by every component of one circuit instance.
///
/// Slots start unset; each component owns the contiguous range recorded in its
/// descriptor.
#[derive(Clone, Debug)]
pub struct SignalStore<F> {
    values: Vec<Option<F>>,
}

impl<F: Copy> SignalStore<F> {
    pub fn new(len: usize) -> Self {
        Self {
            values: vec![None; len],
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<F> {
        self.values.get(index).copied().flatten()
    }

    pub fn is_set(&self, index: usize) -> bool {
        self.get(index).is_some()
    }

    pub fn set(&mut self, index: usize, value: F) -> Result<(), WitnessError> {
        let len = self.values.len();
        let slot = self
            .values
            .get_mut(index)
            .ok_or(WitnessError::SignalOutOfRange {
                signal: index,
                start: 0,
                end: len,
            })?;
        *slot = Some(value);
        Ok(())
    }

    /// First unset slot in `range`, if any.
    pub fn first_unset(&self, mut range: Range<usize>) -> Option<usize> {
        range.find(|&i| !self.is_set(i))
    }

    pub(crate) fn as_mut_slice(&mut self) -> &mut [Option<F>] {
        &mut self.values
    }
}

/// Descriptor table, pre-sized to the compiler-computed component count.
#[derive(Clone, Debug, Default)]
pub struct ComponentTable {
    slots: Vec<Option<ComponentMemory>>,
}

impl ComponentTable {
    pub fn new(len: usize) -> Self {
        Self {
            slots: vec![None; len],
        }
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn get(&self, id: usize) -> Option<&ComponentMemory> {
        self.slots.get(id).and_then(Option::as_ref)
    }

    /// Created descriptors with their ids, in id order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, &ComponentMemory)> {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(id, slot)| slot.as_ref().map(|memory| (id, memory)))
    }

    /// Component names from the root down to `id`, joined with `.`.
    pub fn trace(&self, id: usize) -> String {
        let mut names = Vec::new();
        let mut current = Some(id);
        // a well-formed father chain is never longer than the table
        while let Some(cid) = current {
            if names.len() > self.slots.len() {
                break;
            }
            match self.get(cid) {
                Some(memory) => {
                    names.push(memory.component_name.as_str());
                    current = memory.id_father;
                }
                None => break,
            }
        }
        names.reverse();
        names.join(".")
    }

    pub(crate) fn as_mut_slice(&mut self) -> &mut [Option<ComponentMemory>] {
        &mut self.slots
    }
}

/// Places `memory` at absolute index `offset` of a table slice starting at `base`.
pub(crate) fn create(
    table: &mut [Option<ComponentMemory>],
    base: usize,
    offset: usize,
    memory: ComponentMemory,
) -> Result<(), WitnessError> {
    let limit = base + table.len();
    let slot = offset
        .checked_sub(base)
        .and_then(|index| table.get_mut(index))
        .ok_or(WitnessError::ComponentOutOfRange { offset, limit })?;
    if slot.is_some() {
        return Err(WitnessError::ComponentSlotOccupied { offset });
    }
    *slot = Some(memory);
    Ok(())
}

/// Carves pairwise disjoint sub-slices out of `slice` (whose element 0 sits at
/// absolute index `base`), returned in the order of `ranges`.
///
/// Returns `None` if a range leaves the slice or two ranges overlap.
pub(crate) fn split_disjoint<'s, T>(
    slice: &'s mut [T],
    base: usize,
    ranges: &[Range<usize>],
) -> Option<Vec<&'s mut [T]>> {
    let mut order: Vec<usize> = (0..ranges.len()).collect();
    order.sort_by_key(|&i| ranges[i].start);

    let mut parts: Vec<Option<&'s mut [T]>> = (0..ranges.len()).map(|_| None).collect();
    let mut rest = slice;
    let mut cursor = base;
    for i in order {
        let range = &ranges[i];
        if range.start < cursor || range.end < range.start {
            return None;
        }
        let skip = range.start - cursor;
        let len = range.end - range.start;
        if skip + len > rest.len() {
            return None;
        }
        let (_, tail) = std::mem::take(&mut rest).split_at_mut(skip);
        let (part, tail) = tail.split_at_mut(len);
        parts[i] = Some(part);
        rest = tail;
        cursor = range.end;
    }
    parts.into_iter().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn memory(name: &str, father: Option<usize>) -> ComponentMemory {
        ComponentMemory {
            template_id: 0,
            template_name: "T",
            component_name: name.to_string(),
            signal_start: 0,
            signal_len: 0,
            component_len: 1,
            input_counter: 0,
            id_father: father,
            subcomponents: Box::new([]),
            subcomponents_parallel: Box::new([]),
            has_run: false,
        }
    }

    #[test]
    fn test_create_checks_bounds_and_occupancy() {
        let mut table = ComponentTable::new(3);
        create(table.as_mut_slice(), 0, 0, memory("main", None)).unwrap();
        assert!(matches!(
            create(table.as_mut_slice(), 0, 0, memory("again", None)),
            Err(WitnessError::ComponentSlotOccupied { offset: 0 })
        ));
        assert!(matches!(
            create(table.as_mut_slice(), 0, 3, memory("late", None)),
            Err(WitnessError::ComponentOutOfRange { offset: 3, limit: 3 })
        ));
        // sub-slice addressed by absolute index
        create(&mut table.as_mut_slice()[1..], 1, 2, memory("child", Some(0))).unwrap();
        assert!(matches!(
            create(&mut table.as_mut_slice()[1..], 1, 0, memory("below", Some(0))),
            Err(WitnessError::ComponentOutOfRange { .. })
        ));
        assert_eq!(table.iter().count(), 2);
    }

    #[test]
    fn test_trace_joins_names_from_root() {
        let mut table = ComponentTable::new(3);
        create(table.as_mut_slice(), 0, 0, memory("main", None)).unwrap();
        create(table.as_mut_slice(), 0, 1, memory("left", Some(0))).unwrap();
        create(table.as_mut_slice(), 0, 2, memory("leaf", Some(1))).unwrap();
        assert_eq!(table.trace(0), "main");
        assert_eq!(table.trace(2), "main.left.leaf");
    }

    #[test]
    fn test_split_disjoint() {
        let mut data: Vec<u32> = (0..10).collect();
        // absolute indices 10..20
        let parts = split_disjoint(&mut data, 10, &[15..18, 11..13]).unwrap();
        assert_eq!(parts[0], &[5, 6, 7]);
        assert_eq!(parts[1], &[1, 2]);

        assert!(split_disjoint(&mut data, 10, &[11..14, 13..15]).is_none());
        assert!(split_disjoint(&mut data, 10, &[18..21]).is_none());
        assert!(split_disjoint(&mut data, 10, &[9..11]).is_none());
    }

    #[test]
    fn test_signal_store() {
        let mut store = SignalStore::<u64>::new(4);
        assert_eq!(store.first_unset(0..4), Some(0));
        store.set(0, 1).unwrap();
        store.set(1, 2).unwrap();
        assert_eq!(store.get(1), Some(2));
        assert_eq!(store.first_unset(0..2), None);
        assert_eq!(store.first_unset(0..4), Some(2));
        assert!(store.set(4, 0).is_err());
    }
}
