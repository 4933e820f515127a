pub mod circuits;
pub mod config;
pub mod core;
pub mod engine;
pub mod error;
pub mod hash;
pub mod io;

pub use circuits::Circuit;
pub use config::{CircuitSizes, ExecConfig};
pub use engine::{Component, Context, calculate, run};
pub use error::{ErrorKind, WitnessError};
