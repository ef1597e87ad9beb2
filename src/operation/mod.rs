//! Single-shot asynchronous operations and their factories.
//!
//! ## Contents
//! - [`AsyncOperation`] callback-driven unit of work with an
//!   exactly-once-or-never completion contract
//! - [`OperationFactory`] per-iteration producer of operations
//! - [`OperationFn`], [`FactoryFn`] closure-backed adapters
//! - [`SimulatedQueryFactory`] timer-backed stand-in collaborator producing a
//!   fixed-size byte payload after a randomized latency

mod op;
mod simulated;

pub use op::{AsyncOperation, BoxedOperation, FactoryFn, OperationFactory, OperationFn, Payload};
pub use simulated::SimulatedQueryFactory;
