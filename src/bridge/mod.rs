//! Completion bridge: one blocking return per asynchronous completion.
//!
//! This module contains the synchronization core of the crate:
//! - [`CompletionBridge`] pairs a result slot with a wait primitive and gives
//!   a calling thread a synchronous `wait()` over a callback-driven operation;
//! - [`Completion`] is the delivery handle the asynchronous side invokes;
//! - [`OpsMeter`] tracks unresolved bridges and absorbed deliveries.
//!
//! The resolution discipline is first-resolver-wins: an atomic state cell
//! gates every attempted write, so a double delivery or a completion racing a
//! timeout degrades to a safe no-op for the loser instead of corrupting
//! shared state.

mod core;
mod meter;
mod state;

pub use self::core::{Completion, CompletionBridge};
pub use self::meter::OpsMeter;
