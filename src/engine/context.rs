use p3_field::Field;
use tracing::{debug, error, info};

use super::{Component, ComponentTable, DispatchTable, InputHashMap, SignalStore, store};
use crate::{
    circuits::Circuit,
    config::{CircuitSizes, ExecConfig},
    core::{ComponentMemory, IoSignal, TemplateDef},
    error::WitnessError,
};

/// Read-only state every running component can see.
#[derive(Debug)]
pub(crate) struct Shared<F> {
    pub dispatch: DispatchTable<F>,
    pub templates: Vec<TemplateDef<F>>,
    pub constants: Vec<F>,
    pub messages: Vec<String>,
    pub parallel: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum RunStatus {
    Ready,
    Completed,
    Failed,
}

/// State of one witness computation.
///
/// Built from a compiled [`Circuit`], filled with main inputs, run once by
/// [`super::run`], then read for its witness.
#[derive(Debug)]
pub struct Context<F> {
    name: String,
    sizes: CircuitSizes,
    main_template: usize,
    config: ExecConfig,
    signals: SignalStore<F>,
    components: ComponentTable,
    shared: Shared<F>,
    inputs: InputHashMap,
    outputs: Vec<IoSignal>,
    inputs_remaining: usize,
    status: RunStatus,
}

/// Signal index of the root component; index 0 holds the constant one.
const MAIN_SIGNAL_START: usize = 1;

/// Every array in `signals` must lie inside `[start, end)`.
fn within(signals: &[IoSignal], start: usize, end: usize) -> Result<(), WitnessError> {
    for signal in signals {
        let inside = signal
            .offset
            .checked_add(signal.len)
            .is_some_and(|last| signal.offset >= start && last <= end);
        if !inside {
            return Err(WitnessError::SignalOutOfRange {
                signal: signal.offset,
                start,
                end,
            });
        }
    }
    Ok(())
}

fn check(query: &'static str, expected: usize, got: usize) -> Result<(), WitnessError> {
    if expected != got {
        return Err(WitnessError::SizeMismatch {
            query,
            expected,
            got,
        });
    }
    Ok(())
}

impl<F: Field> Context<F> {
    /// Allocates the signal store and descriptor table from the circuit's sizing
    /// queries, after checking them against its template table.
    pub fn new(circuit: &Circuit<F>, config: ExecConfig) -> Result<Self, WitnessError> {
        let sizes = circuit.sizes;
        let main = circuit
            .templates
            .get(circuit.main_template)
            .ok_or(WitnessError::UnknownTemplate {
                template_id: circuit.main_template,
            })?;

        check(
            "total_signal_no",
            main.n_signals.saturating_add(MAIN_SIGNAL_START),
            sizes.total_signal_no,
        )?;
        check(
            "number_of_components",
            main.n_components,
            sizes.number_of_components,
        )?;
        check(
            "constants_size",
            sizes.constants_size,
            circuit.constants.len(),
        )?;
        check(
            "main_input_signal_no",
            main.n_inputs,
            sizes.main_input_signal_no,
        )?;
        let declared: usize = circuit.inputs.iter().map(|input| input.len).sum();
        check("main_input_signal_no", sizes.main_input_signal_no, declared)?;
        // main outputs come first, the inputs follow them
        let n_outputs: usize = circuit.outputs.iter().map(|output| output.len).sum();
        check(
            "main_input_signal_start",
            MAIN_SIGNAL_START + n_outputs,
            sizes.main_input_signal_start,
        )?;
        if sizes.witness_size > sizes.total_signal_no {
            return Err(WitnessError::SizeMismatch {
                query: "witness_size",
                expected: sizes.total_signal_no,
                got: sizes.witness_size,
            });
        }

        let main_end = sizes.total_signal_no;
        let input_start = sizes.main_input_signal_start;
        let input_end = input_start
            .checked_add(sizes.main_input_signal_no)
            .filter(|&end| end <= main_end)
            .ok_or(WitnessError::SignalOutOfRange {
                signal: input_start,
                start: MAIN_SIGNAL_START,
                end: main_end,
            })?;
        if let Some(first) = circuit.inputs.iter().map(|input| input.offset).min() {
            check("main_input_signal_start", input_start, first)?;
        }
        within(&circuit.outputs, MAIN_SIGNAL_START, input_start)?;
        within(&circuit.inputs, input_start, input_end)?;

        let mut inputs = InputHashMap::with_capacity(sizes.input_hashmap_size);
        for input in &circuit.inputs {
            inputs.insert(input.clone())?;
        }

        let mut signals = SignalStore::new(sizes.total_signal_no);
        signals.set(0, F::ONE)?;

        debug!(
            circuit = %circuit.name,
            signals = sizes.total_signal_no,
            components = sizes.number_of_components,
            "context allocated"
        );
        Ok(Self {
            name: circuit.name.clone(),
            sizes,
            main_template: circuit.main_template,
            signals,
            components: ComponentTable::new(sizes.number_of_components),
            shared: Shared {
                dispatch: DispatchTable::new(&circuit.templates),
                templates: circuit.templates.clone(),
                constants: circuit.constants.clone(),
                messages: circuit.messages.clone(),
                parallel: config.parallel,
            },
            config,
            inputs,
            outputs: circuit.outputs.clone(),
            inputs_remaining: sizes.main_input_signal_no,
            status: RunStatus::Ready,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn sizes(&self) -> CircuitSizes {
        self.sizes
    }

    pub fn config(&self) -> &ExecConfig {
        &self.config
    }

    pub fn input_map(&self) -> &InputHashMap {
        &self.inputs
    }

    pub fn dispatch(&self) -> &DispatchTable<F> {
        &self.shared.dispatch
    }

    /// Main input signals not yet supplied.
    pub fn inputs_remaining(&self) -> usize {
        self.inputs_remaining
    }

    /// Binds `name[index]` to `value` before the run.
    pub fn set_input(&mut self, name: &str, index: usize, value: F) -> Result<(), WitnessError> {
        if self.status != RunStatus::Ready {
            return Err(WitnessError::AlreadyRun);
        }
        let signal = self.inputs.resolve(name, index)?;
        if self.signals.is_set(signal) {
            return Err(WitnessError::DuplicateInput {
                name: name.to_string(),
                index,
            });
        }
        self.signals.set(signal, value)?;
        self.inputs_remaining -= 1;
        Ok(())
    }

    /// Binds a whole input array; `values` must match its declared length.
    pub fn set_input_array(&mut self, name: &str, values: &[F]) -> Result<(), WitnessError> {
        let len = self
            .inputs
            .get(name)
            .ok_or_else(|| WitnessError::UnknownInput(name.to_string()))?
            .len;
        check("input length", len, values.len())?;
        for (index, &value) in values.iter().enumerate() {
            self.set_input(name, index, value)?;
        }
        Ok(())
    }

    pub fn signal(&self, index: usize) -> Option<F> {
        self.signals.get(index)
    }

    pub fn component(&self, id: usize) -> Option<&ComponentMemory> {
        self.components.get(id)
    }

    pub fn components(&self) -> &ComponentTable {
        &self.components
    }

    /// Component names from the root to `id`.
    pub fn trace(&self, id: usize) -> String {
        self.components.trace(id)
    }

    pub fn is_completed(&self) -> bool {
        self.status == RunStatus::Completed
    }

    /// Creates the root component and runs it. Called by the driver.
    pub(crate) fn execute_root(&mut self) -> Result<(), WitnessError> {
        if self.status != RunStatus::Ready {
            return Err(WitnessError::AlreadyRun);
        }
        if self.inputs_remaining > 0 {
            return Err(WitnessError::MissingInputs {
                remaining: self.inputs_remaining,
            });
        }

        let main = self
            .shared
            .templates
            .get(self.main_template)
            .ok_or(WitnessError::UnknownTemplate {
                template_id: self.main_template,
            })?;
        let start = MAIN_SIGNAL_START;
        let n = main.n_subcomponents;
        store::create(
            self.components.as_mut_slice(),
            0,
            0,
            ComponentMemory {
                template_id: self.main_template,
                template_name: main.name,
                component_name: "main".to_string(),
                signal_start: start,
                signal_len: main.n_signals,
                component_len: main.n_components,
                // inputs arrive through the input map; `inputs_remaining` gates the run
                input_counter: main.n_inputs,
                id_father: None,
                subcomponents: vec![None; n].into_boxed_slice(),
                subcomponents_parallel: vec![false; n].into_boxed_slice(),
                has_run: false,
            },
        )?;

        let signals = self
            .signals
            .as_mut_slice()
            .get_mut(start..start + main.n_signals)
            .ok_or(WitnessError::SizeMismatch {
                query: "total_signal_no",
                expected: start + main.n_signals,
                got: self.sizes.total_signal_no,
            })?;
        let mut root = Component::enter(0, signals, self.components.as_mut_slice(), &self.shared)?;
        self.shared.dispatch.execute(&mut root, false)
    }

    /// Records the outcome of a run, completing the trace of a failed assertion.
    pub(crate) fn finish(
        &mut self,
        result: Result<(), WitnessError>,
    ) -> Result<(), WitnessError> {
        match result {
            Ok(()) => {
                self.status = RunStatus::Completed;
                info!(
                    circuit = %self.name,
                    components = self.components.iter().count(),
                    "witness computed"
                );
                Ok(())
            }
            Err(err) => {
                // a second run attempt must not poison a finished context
                if !matches!(err, WitnessError::AlreadyRun) {
                    self.status = RunStatus::Failed;
                }
                let err = match err {
                    WitnessError::AssertionFailed {
                        template,
                        line,
                        component,
                        ..
                    } => WitnessError::AssertionFailed {
                        template,
                        line,
                        component,
                        trace: self.components.trace(component),
                    },
                    other => other,
                };
                error!("{err}");
                Err(err)
            }
        }
    }

    /// Values of the main outputs of a completed run, in declaration order.
    pub fn outputs(&self) -> Result<Vec<F>, WitnessError> {
        if self.status != RunStatus::Completed {
            return Err(WitnessError::NotRun);
        }
        self.outputs
            .iter()
            .flat_map(|output| output.offset..output.offset + output.len)
            .map(|signal| {
                self.signals
                    .get(signal)
                    .ok_or(WitnessError::SignalNotSet { signal })
            })
            .collect()
    }

    /// Witness slots `[0, witness_size)` of a completed run.
    pub fn witness(&self) -> Result<Vec<F>, WitnessError> {
        if self.status != RunStatus::Completed {
            return Err(WitnessError::NotRun);
        }
        let range = 0..self.sizes.witness_size;
        if self.config.check_witness {
            if let Some(signal) = self.signals.first_unset(range.clone()) {
                return Err(WitnessError::SignalNotSet { signal });
            }
        }
        Ok(range
            .map(|i| self.signals.get(i).unwrap_or(F::ZERO))
            .collect())
    }
}
