use p3_field::Field;
use rayon::ThreadPoolBuilder;
use tracing::instrument;

use super::Context;
use crate::{circuits::Circuit, config::ExecConfig, error::WitnessError};

/// Runs the circuit against a context whose main inputs are already bound.
///
/// Creates the root component "main" at signal 1 and runs it;
/// the whole component tree has finished when this returns `Ok`. Any error is
/// final: the context will not run again and yields no witness.
#[instrument(skip_all, fields(circuit = %ctx.name()))]
pub fn run<F: Field>(ctx: &mut Context<F>) -> Result<(), WitnessError> {
    let threads = ctx.config().num_threads;
    let result = match threads {
        Some(threads) => ThreadPoolBuilder::new()
            .num_threads(threads)
            .build()
            .map_err(|e| WitnessError::ConfigurationError(e.to_string()))
            .and_then(|pool| pool.install(|| ctx.execute_root())),
        None => ctx.execute_root(),
    };
    ctx.finish(result)
}

/// Builds a context, binds `inputs` by name and runs it.
pub fn calculate<F: Field>(
    circuit: &Circuit<F>,
    config: ExecConfig,
    inputs: &[(&str, Vec<F>)],
) -> Result<Context<F>, WitnessError> {
    let mut ctx = Context::new(circuit, config)?;
    for (name, values) in inputs {
        ctx.set_input_array(name, values)?;
    }
    run(&mut ctx)?;
    Ok(ctx)
}
