use p3_field::Field;
use tracing::trace;

use super::Component;
use crate::{
    core::{TemplateDef, TemplateFn},
    error::WitnessError,
};

/// Fixed `template id -> run routine` tables, built once per context.
#[derive(Debug)]
pub struct DispatchTable<F> {
    run: Box<[TemplateFn<F>]>,
    run_parallel: Box<[Option<TemplateFn<F>>]>,
}

impl<F: Field> DispatchTable<F> {
    pub fn new(templates: &[TemplateDef<F>]) -> Self {
        Self {
            run: templates.iter().map(|t| t.run).collect(),
            run_parallel: templates.iter().map(|t| t.run_parallel).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.run.len()
    }

    pub fn is_empty(&self) -> bool {
        self.run.is_empty()
    }

    pub fn has_parallel(&self, template_id: usize) -> bool {
        matches!(self.run_parallel.get(template_id), Some(Some(_)))
    }

    fn lookup(&self, template_id: usize, on_worker: bool) -> Result<TemplateFn<F>, WitnessError> {
        if on_worker {
            self.run_parallel
                .get(template_id)
                .copied()
                .ok_or(WitnessError::UnknownTemplate { template_id })?
                .ok_or_else(|| WitnessError::ParallelVariantMissing {
                    template: template_id.to_string(),
                })
        } else {
            self.run
                .get(template_id)
                .copied()
                .ok_or(WitnessError::UnknownTemplate { template_id })
        }
    }

    /// Runs the component's template body, then joins any sub-components it
    /// left queued for parallel execution.
    pub(crate) fn execute(
        &self,
        component: &mut Component<'_, F>,
        on_worker: bool,
    ) -> Result<(), WitnessError> {
        let run = self.lookup(component.template_id(), on_worker)?;
        trace!(
            id = component.id(),
            template = component.template_name(),
            on_worker,
            "run"
        );
        run(component)?;
        component.sync()?;
        component.mark_run();
        Ok(())
    }
}
