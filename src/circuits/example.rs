//! Single-template circuit:
//!
//! ```text
//! template Example() {
//!     signal input sig1;
//!     signal input sig2;
//!     signal input sig2_check;
//!     signal derived;
//!     derived <== sig1 + sig2;                     // line 11
//!     assert(sig2_check == sig1 * sig2 - derived); // line 12
//! }
//! ```

use p3_field::Field;

use super::Circuit;
use crate::{
    config::CircuitSizes,
    core::{FieldOps, IoSignal, TemplateDef},
    engine::Component,
    error::WitnessError,
};

pub const NAME: &str = "example";

pub const EXAMPLE: usize = 0;

fn example_run<F: Field>(c: &mut Component<'_, F>) -> Result<(), WitnessError> {
    let derived = c.signal(0)? + c.signal(1)?;
    c.set_signal(3, derived)?;

    let expected = c.signal(0)? * c.signal(1)? - c.signal(3)?;
    c.assert(c.signal(2)?.fr_eq(&expected), 12)
}

pub fn circuit<F: Field>() -> Circuit<F> {
    let input = |name: &str, offset| IoSignal {
        name: name.to_string(),
        offset,
        len: 1,
    };
    Circuit {
        name: NAME.to_string(),
        sizes: CircuitSizes {
            main_input_signal_start: 1,
            main_input_signal_no: 3,
            total_signal_no: 5,
            number_of_components: 1,
            input_hashmap_size: 256,
            witness_size: 5,
            constants_size: 0,
            io_map_size: 0,
        },
        templates: vec![TemplateDef {
            name: "Example",
            n_inputs: 3,
            n_signals: 4,
            n_components: 1,
            n_subcomponents: 0,
            run: example_run::<F>,
            run_parallel: None,
        }],
        main_template: EXAMPLE,
        constants: Vec::new(),
        messages: Vec::new(),
        inputs: vec![
            input("sig1", 1),
            input("sig2", 2),
            input("sig2_check", 3),
        ],
        outputs: Vec::new(),
    }
}
