//! # blockbridge
//!
//! **blockbridge** bridges single-shot asynchronous operations into blocking,
//! synchronous calls and runs them from a fixed pool of perpetual worker
//! threads.
//!
//! The volatile part of that arrangement is the bridge: two parties — a
//! blocked caller thread and an asynchronous callback fired from a shared
//! execution pool — contend on write-once state. Done carelessly this yields
//! double-signal races, use-after-free on cancellation handles, and leaked
//! subscriptions under sustained load. blockbridge makes those failure modes
//! structurally impossible:
//!
//! - an atomic **first-resolver-wins** state cell gates every delivery and
//!   every timeout, so the loser of any race degrades to a counted no-op;
//! - the cancellation handle is **owned by the blocking call** and released
//!   only after resolution has been observed on the caller side;
//! - each worker drives **one bridge per iteration, strictly sequentially**,
//!   capping outstanding operations at the worker count.
//!
//! ## Architecture
//! ```text
//!     ┌──────────────┐   ┌──────────────┐   ┌──────────────┐
//!     │   Worker 0   │   │   Worker 1   │   │   Worker N-1 │   (OS threads)
//!     └──────┬───────┘   └──────┬───────┘   └──────┬───────┘
//!            │ per iteration:   │                  │
//!            │  factory.create ─► AsyncOperation::start(completion)
//!            │  bridge.wait() ◄─ Completion::complete(result)
//!            ▼                  ▼                  ▼
//! ┌───────────────────────────────────────────────────────────────┐
//! │  shared execution runtime (tokio): operation timers/callbacks │
//! └───────────────────────────────────────────────────────────────┘
//!            │ publish(Event)
//!            ▼
//!      Bus (broadcast) ──► listener ──► SubscriberSet ──► LogWriter,
//!                                                         ProgressTracker, ...
//! ```
//!
//! ## Features
//! | Area            | Description                                                | Key types                                  |
//! |-----------------|------------------------------------------------------------|--------------------------------------------|
//! | **Bridge**      | Exactly-once blocking handoff with timeout/cancel safety.  | [`CompletionBridge`], [`Completion`]       |
//! | **Operations**  | Callback-driven single-shot work units and factories.      | [`AsyncOperation`], [`OperationFactory`]   |
//! | **Pool**        | Fixed worker set, graceful grace-bounded shutdown.         | [`WorkerPool`], [`PoolConfig`]             |
//! | **Policies**    | Backoff, jitter, and per-condition reactions.              | [`BackoffPolicy`], [`JitterPolicy`], [`Reaction`] |
//! | **Diagnostics** | Event bus with non-blocking subscriber fan-out.            | [`Event`], [`Bus`], [`Subscribe`]          |
//! | **Bookkeeping** | Outstanding-operation gauge and absorbed-delivery counter. | [`OpsMeter`]                               |
//!
//! ## Example
//! ```no_run
//! use std::sync::Arc;
//! use std::time::Duration;
//! use blockbridge::{LogWriter, PoolConfig, SimulatedQueryFactory, Subscribe, WorkerPool};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let cfg = PoolConfig {
//!         workers: 8,
//!         report_every: 100,
//!         grace: Duration::from_secs(5),
//!         ..PoolConfig::default()
//!     };
//!
//!     let factory = Arc::new(SimulatedQueryFactory::new());
//!     let subs: Vec<Arc<dyn Subscribe>> = vec![Arc::new(LogWriter)];
//!
//!     let pool = WorkerPool::start(cfg, factory, subs)?;
//!     pool.wait_for_signal();
//!     pool.shutdown()?;
//!     Ok(())
//! }
//! ```

mod bridge;
mod config;
mod error;
mod events;
mod operation;
mod policies;
mod pool;
mod subscribers;

// ---- Public re-exports ----

pub use bridge::{Completion, CompletionBridge, OpsMeter};
pub use config::PoolConfig;
pub use error::{BridgeError, OperationError, PoolError};
pub use events::{Bus, Event, EventKind};
pub use operation::{
    AsyncOperation, BoxedOperation, FactoryFn, OperationFactory, OperationFn, Payload,
    SimulatedQueryFactory,
};
pub use policies::{BackoffPolicy, JitterPolicy, Reaction};
pub use pool::WorkerPool;
pub use subscribers::{LogWriter, ProgressTracker, Subscribe, SubscriberSet};
