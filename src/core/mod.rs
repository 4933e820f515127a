pub mod traits;
pub mod types;

pub use traits::FieldOps;
pub use types::{ComponentMemory, IoSignal, TemplateDef, TemplateFn};
