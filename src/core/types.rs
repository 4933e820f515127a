use serde::{Deserialize, Serialize};

use crate::{engine::Component, error::WitnessError};

/// Body of a compiled template, executed against the component's signal slice.
pub type TemplateFn<F> = fn(&mut Component<'_, F>) -> Result<(), WitnessError>;

/// One entry of the template table, as emitted by the compiler.
pub struct TemplateDef<F> {
    pub name: &'static str,
    /// Declared input signals; seeds the component's input counter.
    pub n_inputs: usize,
    /// Signals reserved for one instance, including all nested sub-components.
    pub n_signals: usize,
    /// Descriptor slots reserved for one instance, itself included.
    pub n_components: usize,
    /// Direct sub-component slots.
    pub n_subcomponents: usize,
    pub run: TemplateFn<F>,
    /// Variant used when a parent runs this template on a worker thread.
    pub run_parallel: Option<TemplateFn<F>>,
}

impl<F> Clone for TemplateDef<F> {
    fn clone(&self) -> Self {
        Self {
            name: self.name,
            n_inputs: self.n_inputs,
            n_signals: self.n_signals,
            n_components: self.n_components,
            n_subcomponents: self.n_subcomponents,
            run: self.run,
            run_parallel: self.run_parallel,
        }
    }
}

impl<F> std::fmt::Debug for TemplateDef<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TemplateDef")
            .field("name", &self.name)
            .field("n_inputs", &self.n_inputs)
            .field("n_signals", &self.n_signals)
            .field("n_components", &self.n_components)
            .field("n_subcomponents", &self.n_subcomponents)
            .field("parallel", &self.run_parallel.is_some())
            .finish()
    }
}

/// Descriptor of one instantiated component.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ComponentMemory {
    pub template_id: usize,
    pub template_name: &'static str,
    pub component_name: String,
    pub signal_start: usize,
    /// Signals owned by the instance (its whole subtree).
    pub signal_len: usize,
    /// Descriptor slots owned by the instance (its whole subtree).
    pub component_len: usize,
    /// Input signals not yet written.
    pub input_counter: usize,
    /// `None` for the root.
    pub id_father: Option<usize>,
    pub subcomponents: Box<[Option<usize>]>,
    pub subcomponents_parallel: Box<[bool]>,
    pub has_run: bool,
}

impl ComponentMemory {
    pub fn signal_range(&self) -> std::ops::Range<usize> {
        self.signal_start..self.signal_start + self.signal_len
    }
}

/// A main-level input or output array: `name` covers `len` consecutive signals.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct IoSignal {
    pub name: String,
    /// Absolute signal index of element 0.
    pub offset: usize,
    pub len: usize,
}
