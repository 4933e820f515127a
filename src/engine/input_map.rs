use hashbrown::HashMap;

use crate::{core::IoSignal, error::WitnessError};

const FNV_OFFSET_BASIS: u64 = 0xcbf2_9ce4_8422_2325;
const FNV_PRIME: u64 = 0x0000_0100_0000_01b3;

/// 64-bit FNV-1a hash, the key compiled circuits use for main input names.
pub fn fnv1a(name: &str) -> u64 {
    name.bytes().fold(FNV_OFFSET_BASIS, |hash, byte| {
        (hash ^ u64::from(byte)).wrapping_mul(FNV_PRIME)
    })
}

/// Fixed-capacity map from main input name to its signal range.
#[derive(Clone, Debug)]
pub struct InputHashMap {
    capacity: usize,
    entries: HashMap<u64, IoSignal>,
}

impl InputHashMap {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            capacity,
            entries: HashMap::with_capacity(capacity),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn insert(&mut self, input: IoSignal) -> Result<(), WitnessError> {
        if self.entries.len() >= self.capacity {
            return Err(WitnessError::InputMapFull {
                capacity: self.capacity,
            });
        }
        let key = fnv1a(&input.name);
        if let Some(existing) = self.entries.get(&key) {
            return Err(WitnessError::ConfigurationError(format!(
                "input {} collides with {}",
                input.name, existing.name
            )));
        }
        self.entries.insert(key, input);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&IoSignal> {
        self.entries
            .get(&fnv1a(name))
            .filter(|input| input.name == name)
    }

    /// Absolute signal index of `name[index]`.
    pub fn resolve(&self, name: &str, index: usize) -> Result<usize, WitnessError> {
        let input = self
            .get(name)
            .ok_or_else(|| WitnessError::UnknownInput(name.to_string()))?;
        if index >= input.len {
            return Err(WitnessError::InputIndexOutOfRange {
                name: name.to_string(),
                index,
                size: input.len,
            });
        }
        Ok(input.offset + index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input(name: &str, offset: usize, len: usize) -> IoSignal {
        IoSignal {
            name: name.to_string(),
            offset,
            len,
        }
    }

    #[test]
    fn test_fnv1a_reference_values() {
        assert_eq!(fnv1a(""), 0xcbf29ce484222325);
        assert_eq!(fnv1a("a"), 0xaf63dc4c8601ec8c);
    }

    #[test]
    fn test_resolve() {
        let mut map = InputHashMap::with_capacity(4);
        map.insert(input("a", 1, 1)).unwrap();
        map.insert(input("in", 2, 3)).unwrap();

        assert_eq!(map.resolve("a", 0).unwrap(), 1);
        assert_eq!(map.resolve("in", 2).unwrap(), 4);
        assert!(matches!(
            map.resolve("in", 3),
            Err(WitnessError::InputIndexOutOfRange { index: 3, size: 3, .. })
        ));
        assert!(matches!(map.resolve("b", 0), Err(WitnessError::UnknownInput(_))));
    }

    #[test]
    fn test_capacity_is_fixed() {
        let mut map = InputHashMap::with_capacity(1);
        map.insert(input("a", 1, 1)).unwrap();
        assert!(matches!(
            map.insert(input("b", 2, 1)),
            Err(WitnessError::InputMapFull { capacity: 1 })
        ));
    }
}
