//! Product tree of eight inputs:
//!
//! ```text
//! template Multiplier2() {            // out, a, b
//!     out <== a * b;                  // line 6
//!     assert(out != 0);               // line 7
//! }
//! template Multiplier4() {            // out, in[4]
//!     component mul[3];               // mul[0], mul[1] parallel
//!     ...
//! }
//! template Multiplier8() {            // out, in[8]
//!     component quad[2];              // parallel
//!     component mul = Multiplier2();
//!     ...
//!     log("product", out);
//! }
//! ```
//!
//! Every instance reserves its own signals first (outputs before inputs), then
//! the ranges of its sub-components in creation order.

use p3_field::Field;

use super::Circuit;
use crate::{
    config::CircuitSizes,
    core::{FieldOps, IoSignal, TemplateDef},
    engine::Component,
    error::WitnessError,
};

pub const NAME: &str = "multiplier";

pub const MULTIPLIER2: usize = 0;
pub const MULTIPLIER4: usize = 1;
pub const MULTIPLIER8: usize = 2;

const MUL2_SIGNALS: usize = 3;
const MUL4_OWN: usize = 5;
const MUL4_SIGNALS: usize = MUL4_OWN + 3 * MUL2_SIGNALS;
const MUL4_COMPONENTS: usize = 4;
const MUL8_OWN: usize = 9;
const MUL8_SIGNALS: usize = MUL8_OWN + 2 * MUL4_SIGNALS + MUL2_SIGNALS;
const MUL8_COMPONENTS: usize = 1 + 2 * MUL4_COMPONENTS + 1;

fn multiplier2_run<F: Field>(c: &mut Component<'_, F>) -> Result<(), WitnessError> {
    let out = c.signal(1)? * c.signal(2)?;
    c.set_signal(0, out)?;
    c.assert(c.signal(0)?.fr_neq(&F::ZERO), 7)
}

/// Feeds `a` and `b` into the `Multiplier2` in `slot`.
fn feed<F: Field>(c: &mut Component<'_, F>, slot: usize, a: F, b: F) -> Result<(), WitnessError> {
    c.set_subcomponent_input(slot, 1, a)?;
    c.set_subcomponent_input(slot, 2, b)
}

fn multiplier4_run<F: Field>(c: &mut Component<'_, F>) -> Result<(), WitnessError> {
    let start = c.signal_start();
    let id = c.id();
    for slot in 0..3 {
        c.create_subcomponent(
            slot,
            MULTIPLIER2,
            start + MUL4_OWN + slot * MUL2_SIGNALS,
            id + 1 + slot,
            format!("mul[{slot}]"),
            slot < 2,
        )?;
    }

    let (in0, in1, in2, in3) = (c.signal(1)?, c.signal(2)?, c.signal(3)?, c.signal(4)?);
    feed(c, 0, in0, in1)?;
    feed(c, 1, in2, in3)?;

    let left = c.subcomponent_signal(0, 0)?;
    let right = c.subcomponent_signal(1, 0)?;
    feed(c, 2, left, right)?;

    let out = c.subcomponent_signal(2, 0)?;
    c.set_signal(0, out)
}

fn multiplier8_run<F: Field>(c: &mut Component<'_, F>) -> Result<(), WitnessError> {
    let start = c.signal_start();
    let id = c.id();
    for slot in 0..2 {
        c.create_subcomponent(
            slot,
            MULTIPLIER4,
            start + MUL8_OWN + slot * MUL4_SIGNALS,
            id + 1 + slot * MUL4_COMPONENTS,
            format!("quad[{slot}]"),
            true,
        )?;
    }
    c.create_subcomponent(
        2,
        MULTIPLIER2,
        start + MUL8_OWN + 2 * MUL4_SIGNALS,
        id + 1 + 2 * MUL4_COMPONENTS,
        "mul",
        false,
    )?;

    for slot in 0..2 {
        for i in 0..4 {
            let value = c.signal(1 + slot * 4 + i)?;
            c.set_subcomponent_input(slot, 1 + i, value)?;
        }
    }

    let left = c.subcomponent_signal(0, 0)?;
    let right = c.subcomponent_signal(1, 0)?;
    feed(c, 2, left, right)?;

    let out = c.subcomponent_signal(2, 0)?;
    c.set_signal(0, out)?;
    c.log(0, &[out])
}

pub fn circuit<F: Field>() -> Circuit<F> {
    Circuit {
        name: NAME.to_string(),
        sizes: CircuitSizes {
            main_input_signal_start: 2,
            main_input_signal_no: 8,
            total_signal_no: 1 + MUL8_SIGNALS,
            number_of_components: MUL8_COMPONENTS,
            input_hashmap_size: 256,
            witness_size: 1 + MUL8_SIGNALS,
            constants_size: 0,
            io_map_size: 0,
        },
        templates: vec![
            TemplateDef {
                name: "Multiplier2",
                n_inputs: 2,
                n_signals: MUL2_SIGNALS,
                n_components: 1,
                n_subcomponents: 0,
                run: multiplier2_run::<F>,
                run_parallel: Some(multiplier2_run::<F>),
            },
            TemplateDef {
                name: "Multiplier4",
                n_inputs: 4,
                n_signals: MUL4_SIGNALS,
                n_components: MUL4_COMPONENTS,
                n_subcomponents: 3,
                run: multiplier4_run::<F>,
                run_parallel: Some(multiplier4_run::<F>),
            },
            TemplateDef {
                name: "Multiplier8",
                n_inputs: 8,
                n_signals: MUL8_SIGNALS,
                n_components: MUL8_COMPONENTS,
                n_subcomponents: 3,
                run: multiplier8_run::<F>,
                run_parallel: None,
            },
        ],
        main_template: MULTIPLIER8,
        constants: Vec::new(),
        messages: vec!["product".to_string()],
        inputs: vec![IoSignal {
            name: "in".to_string(),
            offset: 2,
            len: 8,
        }],
        outputs: vec![IoSignal {
            name: "out".to_string(),
            offset: 1,
            len: 1,
        }],
    }
}
