//! The execution engine: signal store, descriptor table, dispatch and driver.

mod component;
mod context;
mod dispatch;
mod driver;
mod input_map;
mod store;

pub use component::Component;
pub use context::Context;
pub use dispatch::DispatchTable;
pub use driver::{calculate, run};
pub use input_map::{InputHashMap, fnv1a};
pub use store::{ComponentTable, SignalStore};
