use std::ops::Range;

use p3_field::Field;
use rayon::prelude::*;
use tracing::{debug, info};

use super::{context::Shared, store};
use crate::{
    core::{ComponentMemory, FieldOps},
    error::WitnessError,
};

fn overlaps(a: &Range<usize>, b: &Range<usize>) -> bool {
    a.start < b.end && b.start < a.end
}

/// A running component: its descriptor plus exclusive access to the signals and
/// descriptor slots of its whole subtree.
///
/// Template bodies address their own signals by index relative to
/// `signal_start`. Sub-components are reached only through their slot number,
/// which keeps sibling ranges disjoint and lets parallel siblings run without
/// locking.
pub struct Component<'a, F> {
    id: usize,
    memory: &'a mut ComponentMemory,
    descendants: &'a mut [Option<ComponentMemory>],
    signals: &'a mut [Option<F>],
    shared: &'a Shared<F>,
    /// Slots whose inputs are complete and which wait for a parallel join.
    pending: Vec<usize>,
}

impl<'a, F: Field> Component<'a, F> {
    pub(crate) fn enter(
        id: usize,
        signals: &'a mut [Option<F>],
        components: &'a mut [Option<ComponentMemory>],
        shared: &'a Shared<F>,
    ) -> Result<Self, WitnessError> {
        let (own, descendants) = components
            .split_first_mut()
            .ok_or(WitnessError::ComponentNotCreated { component: id })?;
        let memory = own
            .as_mut()
            .ok_or(WitnessError::ComponentNotCreated { component: id })?;
        if signals.len() != memory.signal_len {
            return Err(WitnessError::SizeMismatch {
                query: "component signal range",
                expected: memory.signal_len,
                got: signals.len(),
            });
        }
        Ok(Self {
            id,
            memory,
            descendants,
            signals,
            shared,
            pending: Vec::new(),
        })
    }

    pub fn id(&self) -> usize {
        self.id
    }

    pub fn template_id(&self) -> usize {
        self.memory.template_id
    }

    pub fn template_name(&self) -> &'static str {
        self.memory.template_name
    }

    pub fn component_name(&self) -> &str {
        &self.memory.component_name
    }

    pub fn signal_start(&self) -> usize {
        self.memory.signal_start
    }

    pub fn father(&self) -> Option<usize> {
        self.memory.id_father
    }

    fn out_of_range(&self, index: usize) -> WitnessError {
        let range = self.memory.signal_range();
        WitnessError::SignalOutOfRange {
            signal: range.start + index,
            start: range.start,
            end: range.end,
        }
    }

    /// Reads signal `signal_start + index`.
    pub fn signal(&self, index: usize) -> Result<F, WitnessError> {
        let slot = self
            .signals
            .get(index)
            .copied()
            .ok_or_else(|| self.out_of_range(index))?;
        slot.ok_or(WitnessError::SignalNotSet {
            signal: self.memory.signal_start + index,
        })
    }

    /// Writes signal `signal_start + index`.
    pub fn set_signal(&mut self, index: usize, value: F) -> Result<(), WitnessError> {
        let error = self.out_of_range(index);
        let slot = self.signals.get_mut(index).ok_or(error)?;
        *slot = Some(value);
        Ok(())
    }

    pub fn constant(&self, index: usize) -> Result<F, WitnessError> {
        let constants = &self.shared.constants;
        constants
            .get(index)
            .copied()
            .ok_or(WitnessError::ConstantOutOfRange {
                index,
                count: constants.len(),
            })
    }

    pub fn div(&self, numerator: F, denominator: F, line: usize) -> Result<F, WitnessError> {
        numerator
            .fr_div(&denominator)
            .ok_or_else(|| WitnessError::DivisionByZero {
                template: self.template_name().to_string(),
                line,
            })
    }

    /// Fails the run unless `condition` is true in the field's sense.
    ///
    /// The trace is left empty here; the driver fills it in from the full
    /// descriptor table once the error reaches it.
    pub fn assert(&self, condition: F, line: usize) -> Result<(), WitnessError> {
        if condition.fr_is_true() {
            return Ok(());
        }
        Err(WitnessError::AssertionFailed {
            template: self.template_name().to_string(),
            line,
            component: self.id,
            trace: String::new(),
        })
    }

    /// Prints template message `message` followed by `values`.
    pub fn log(&self, message: usize, values: &[F]) -> Result<(), WitnessError> {
        let messages = &self.shared.messages;
        let text = messages
            .get(message)
            .ok_or(WitnessError::MessageOutOfRange {
                index: message,
                count: messages.len(),
            })?;
        let rendered: Vec<String> = values.iter().map(ToString::to_string).collect();
        info!(component = %self.memory.component_name, "{} {}", text, rendered.join(" "));
        Ok(())
    }

    /// Descriptor id of the sub-component in `slot`.
    pub fn subcomponent(&self, slot: usize) -> Result<usize, WitnessError> {
        let count = self.memory.subcomponents.len();
        self.memory
            .subcomponents
            .get(slot)
            .copied()
            .ok_or(WitnessError::SubcomponentSlotOutOfRange {
                component: self.id,
                slot,
                count,
            })?
            .ok_or(WitnessError::SubcomponentNotCreated {
                component: self.id,
                slot,
            })
    }

    fn descendant_index(&self, id: usize) -> Result<usize, WitnessError> {
        id.checked_sub(self.id + 1)
            .filter(|&index| index < self.descendants.len())
            .ok_or(WitnessError::ComponentOutOfRange {
                offset: id,
                limit: self.id + 1 + self.descendants.len(),
            })
    }

    fn descendant(&self, id: usize) -> Result<&ComponentMemory, WitnessError> {
        let index = self.descendant_index(id)?;
        self.descendants[index]
            .as_ref()
            .ok_or(WitnessError::ComponentNotCreated { component: id })
    }

    fn descendant_mut(&mut self, id: usize) -> Result<&mut ComponentMemory, WitnessError> {
        let index = self.descendant_index(id)?;
        self.descendants[index]
            .as_mut()
            .ok_or(WitnessError::ComponentNotCreated { component: id })
    }

    /// Position in `self.signals` of child signal `index`.
    fn child_signal_index(&self, child: usize, index: usize) -> Result<usize, WitnessError> {
        let memory = self.descendant(child)?;
        let range = memory.signal_range();
        if index >= memory.signal_len {
            return Err(WitnessError::SignalOutOfRange {
                signal: range.start + index,
                start: range.start,
                end: range.end,
            });
        }
        Ok(range.start + index - self.memory.signal_start)
    }

    /// Instantiates template `template_id` in sub-component `slot`.
    ///
    /// The child's signals occupy `[signal_start, signal_start + n_signals)` and
    /// its descriptors `[component_offset, component_offset + n_components)`;
    /// both must lie inside this component's reservation and must not overlap a
    /// sibling. A template without inputs is ready as soon as it exists.
    pub fn create_subcomponent(
        &mut self,
        slot: usize,
        template_id: usize,
        signal_start: usize,
        component_offset: usize,
        name: impl Into<String>,
        parallel: bool,
    ) -> Result<(), WitnessError> {
        let shared = self.shared;
        let count = self.memory.subcomponents.len();
        match self.memory.subcomponents.get(slot) {
            None => {
                return Err(WitnessError::SubcomponentSlotOutOfRange {
                    component: self.id,
                    slot,
                    count,
                });
            }
            Some(Some(_)) => {
                return Err(WitnessError::ComponentSlotOccupied {
                    offset: component_offset,
                });
            }
            Some(None) => {}
        }

        let template = shared
            .templates
            .get(template_id)
            .ok_or(WitnessError::UnknownTemplate { template_id })?;
        if parallel && !shared.dispatch.has_parallel(template_id) {
            return Err(WitnessError::ParallelVariantMissing {
                template: template.name.to_string(),
            });
        }

        let own = self.memory.signal_range();
        let signals = signal_start
            .checked_add(template.n_signals)
            .filter(|&end| signal_start >= own.start && end <= own.end)
            .map(|end| signal_start..end)
            .ok_or(WitnessError::SignalOutOfRange {
                signal: signal_start,
                start: own.start,
                end: own.end,
            })?;
        let limit = self.id + self.memory.component_len;
        let components = component_offset
            .checked_add(template.n_components)
            .filter(|&end| component_offset > self.id && end <= limit)
            .map(|end| component_offset..end)
            .ok_or(WitnessError::ComponentOutOfRange {
                offset: component_offset,
                limit,
            })?;
        for &sibling in self.memory.subcomponents.iter().flatten() {
            let other = self.descendant(sibling)?;
            let other_components = sibling..sibling + other.component_len;
            if overlaps(&signals, &other.signal_range())
                || overlaps(&components, &other_components)
            {
                return Err(WitnessError::OverlappingRange {
                    component: component_offset,
                    sibling,
                });
            }
        }

        let n = template.n_subcomponents;
        let name = name.into();
        debug!(
            id = component_offset,
            father = self.id,
            template = template.name,
            signal_start,
            parallel,
            "create {}",
            name
        );
        store::create(
            self.descendants,
            self.id + 1,
            component_offset,
            ComponentMemory {
                template_id,
                template_name: template.name,
                component_name: name,
                signal_start,
                signal_len: template.n_signals,
                component_len: template.n_components,
                input_counter: template.n_inputs,
                id_father: Some(self.id),
                subcomponents: vec![None; n].into_boxed_slice(),
                subcomponents_parallel: vec![false; n].into_boxed_slice(),
                has_run: false,
            },
        )?;
        self.memory.subcomponents[slot] = Some(component_offset);
        self.memory.subcomponents_parallel[slot] = parallel;

        if template.n_inputs == 0 {
            self.ready(slot)?;
        }
        Ok(())
    }

    /// Writes input signal `index` of the sub-component in `slot`. The write that
    /// completes the child's inputs runs it (or queues it, if parallel).
    pub fn set_subcomponent_input(
        &mut self,
        slot: usize,
        index: usize,
        value: F,
    ) -> Result<(), WitnessError> {
        let child = self.subcomponent(slot)?;
        let position = self.child_signal_index(child, index)?;
        self.signals[position] = Some(value);

        let memory = self.descendant_mut(child)?;
        if memory.input_counter == 0 {
            return Err(WitnessError::InputCounterUnderflow { component: child });
        }
        memory.input_counter -= 1;
        if memory.input_counter == 0 {
            self.ready(slot)?;
        }
        Ok(())
    }

    /// Reads signal `index` of the sub-component in `slot`, joining queued
    /// parallel siblings first if that child is among them.
    pub fn subcomponent_signal(&mut self, slot: usize, index: usize) -> Result<F, WitnessError> {
        if self.pending.contains(&slot) {
            self.sync()?;
        }
        let child = self.subcomponent(slot)?;
        let position = self.child_signal_index(child, index)?;
        self.signals[position].ok_or(WitnessError::SignalNotSet {
            signal: self.memory.signal_start + position,
        })
    }

    fn ready(&mut self, slot: usize) -> Result<(), WitnessError> {
        if self.memory.subcomponents_parallel[slot] && self.shared.parallel {
            self.pending.push(slot);
            Ok(())
        } else {
            self.run_subcomponent(slot)
        }
    }

    fn run_subcomponent(&mut self, slot: usize) -> Result<(), WitnessError> {
        let shared = self.shared;
        let child = self.subcomponent(slot)?;
        let (signals, components) = {
            let memory = self.descendant(child)?;
            let first = memory.signal_start - self.memory.signal_start;
            let signals = first..first + memory.signal_len;
            let first = self.descendant_index(child)?;
            (signals, first..first + memory.component_len)
        };
        let limit = self.id + 1 + self.descendants.len();
        let own = self.memory.signal_range();

        let signals = self
            .signals
            .get_mut(signals)
            .ok_or(WitnessError::SignalOutOfRange {
                signal: own.start,
                start: own.start,
                end: own.end,
            })?;
        let components = self
            .descendants
            .get_mut(components)
            .ok_or(WitnessError::ComponentOutOfRange {
                offset: child,
                limit,
            })?;
        let mut component = Component::enter(child, signals, components, shared)?;
        shared.dispatch.execute(&mut component, false)
    }

    /// Runs every queued parallel sub-component to completion.
    pub(crate) fn sync(&mut self) -> Result<(), WitnessError> {
        if self.pending.is_empty() {
            return Ok(());
        }
        let shared = self.shared;
        let slots = std::mem::take(&mut self.pending);

        let mut ids = Vec::with_capacity(slots.len());
        let mut signal_ranges = Vec::with_capacity(slots.len());
        let mut component_ranges = Vec::with_capacity(slots.len());
        for slot in slots {
            let child = self.subcomponent(slot)?;
            let memory = self.descendant(child)?;
            ids.push(child);
            signal_ranges.push(memory.signal_range());
            component_ranges.push(child..child + memory.component_len);
        }
        let overlap = WitnessError::OverlappingRange {
            component: ids[0],
            sibling: ids[ids.len() - 1],
        };

        debug!(parent = self.id, count = ids.len(), "join parallel sub-components");
        let signal_parts =
            store::split_disjoint(&mut *self.signals, self.memory.signal_start, &signal_ranges);
        let component_parts =
            store::split_disjoint(&mut *self.descendants, self.id + 1, &component_ranges);
        let (Some(signal_parts), Some(component_parts)) = (signal_parts, component_parts) else {
            return Err(overlap);
        };

        let children = ids
            .into_iter()
            .zip(signal_parts)
            .zip(component_parts)
            .map(|((id, signals), components)| Component::enter(id, signals, components, shared))
            .collect::<Result<Vec<_>, _>>()?;
        children
            .into_par_iter()
            .try_for_each(|mut child| shared.dispatch.execute(&mut child, true))
    }

    pub(crate) fn mark_run(&mut self) {
        self.memory.has_run = true;
    }
}
