//! Pool core: worker loops and their supervision.
//!
//! The only public API from this module is [`WorkerPool`], which spawns the
//! worker threads, owns the shared execution runtime, and drives graceful
//! shutdown.
//!
//! Internal modules:
//! - [`worker`]: the perpetual per-thread iteration loop;
//! - [`liveness`]: alive-set used for grace-bounded shutdown;
//! - [`signal`]: cross-platform termination-signal wait.

mod liveness;
mod pool;
mod signal;
mod worker;

pub use pool::WorkerPool;
