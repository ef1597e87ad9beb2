//! The worker pool: spawns workers, owns the shared runtime, drives shutdown.
//!
//! ## High-level wiring
//! ```text
//! WorkerPool::start(cfg, factory, subscribers)
//!   ├─► tokio Runtime (shared execution pool: operation timers, fan-out, signals)
//!   ├─► Bus + subscriber listener ─► SubscriberSet (per-subscriber queues)
//!   ├─► OpsMeter (outstanding / absorbed bookkeeping, shared by all bridges)
//!   └─► N worker threads, each: factory.create ─► bridge ─► wait ─► classify
//!
//! shutdown():
//!   publish ShutdownRequested ─► cancel token ─► wait on liveness (≤ grace)
//!     ├─ drained  → AllStoppedWithin, join threads, Ok(())
//!     └─ timeout  → GraceExceeded, join finished threads only,
//!                   Err(PoolError::GraceExceeded { stuck })
//! ```
//!
//! Workers run on dedicated OS threads; `start` returns as soon as spawning
//! completes and the workers keep looping until `shutdown()` (or a
//! `StopWorker` reaction stops an individual worker).

use std::sync::Arc;

use tokio::runtime::Runtime;
use tokio_util::sync::CancellationToken;

use crate::bridge::OpsMeter;
use crate::config::PoolConfig;
use crate::error::PoolError;
use crate::events::{Bus, Event, EventKind};
use crate::operation::OperationFactory;
use crate::pool::liveness::Liveness;
use crate::pool::signal;
use crate::pool::worker::Worker;
use crate::subscribers::{Subscribe, SubscriberSet};

/// Fixed set of perpetual workers plus the shared machinery they use.
pub struct WorkerPool {
    cfg: Arc<PoolConfig>,
    bus: Bus,
    meter: Arc<OpsMeter>,
    runtime: Runtime,
    shutdown_token: CancellationToken,
    liveness: Arc<Liveness>,
    handles: Vec<(usize, std::thread::JoinHandle<()>)>,
}

impl WorkerPool {
    /// Builds the shared machinery and spawns `cfg.workers` worker threads.
    ///
    /// Returns once spawning is complete; the workers run indefinitely until
    /// [`shutdown`](Self::shutdown).
    pub fn start(
        cfg: PoolConfig,
        factory: Arc<dyn OperationFactory>,
        subscribers: Vec<Arc<dyn Subscribe>>,
    ) -> Result<Self, PoolError> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .thread_name("blockbridge-exec")
            .enable_time()
            .enable_io()
            .build()?;

        let cfg = Arc::new(cfg);
        let bus = Bus::new(cfg.bus_capacity_clamped());
        let meter = Arc::new(OpsMeter::new());
        let shutdown_token = CancellationToken::new();
        let liveness = Arc::new(Liveness::new());

        // Fan-out lives on the owned runtime; both the set's worker tasks
        // and the listener need its context.
        {
            let _guard = runtime.enter();
            let subs = Arc::new(SubscriberSet::with_bus(subscribers, bus.clone()));
            let mut rx = bus.subscribe();
            tokio::spawn(async move {
                loop {
                    match rx.recv().await {
                        Ok(ev) => subs.emit(&ev),
                        // Diagnostics are best-effort: skip what the bus
                        // overwrote and keep listening.
                        Err(tokio::sync::broadcast::error::RecvError::Lagged(_)) => continue,
                        Err(tokio::sync::broadcast::error::RecvError::Closed) => break,
                    }
                }
            });
        }

        let mut handles = Vec::with_capacity(cfg.workers);
        for index in 0..cfg.workers {
            let worker = Worker {
                index,
                cfg: Arc::clone(&cfg),
                factory: Arc::clone(&factory),
                bus: bus.clone(),
                meter: Arc::clone(&meter),
                exec: runtime.handle().clone(),
                shutdown: shutdown_token.clone(),
                liveness: Arc::clone(&liveness),
            };
            let handle = std::thread::Builder::new()
                .name(format!("blockbridge-worker-{index}"))
                .spawn(move || worker.run())?;
            handles.push((index, handle));
        }

        Ok(Self {
            cfg,
            bus,
            meter,
            runtime,
            shutdown_token,
            liveness,
            handles,
        })
    }

    /// Signals all workers to stop after their current iteration and joins
    /// them, bounded by the configured grace period.
    ///
    /// On success every worker has left its loop and no bridge remains
    /// reachable from the asynchronous side. If the grace elapses, the stuck
    /// workers' indexes are reported and their threads are left to the
    /// process exit; finished threads are still joined.
    pub fn shutdown(self) -> Result<(), PoolError> {
        let WorkerPool {
            cfg,
            bus,
            meter: _,
            runtime,
            shutdown_token,
            liveness,
            handles,
        } = self;

        bus.publish(Event::now(EventKind::ShutdownRequested));
        shutdown_token.cancel();

        let result = match liveness.wait_all_stopped(cfg.grace) {
            Ok(()) => {
                bus.publish(Event::now(EventKind::AllStoppedWithin));
                for (_, handle) in handles {
                    let _ = handle.join();
                }
                Ok(())
            }
            Err(stuck) => {
                bus.publish(Event::now(EventKind::GraceExceeded));
                for (index, handle) in handles {
                    if !stuck.contains(&index) {
                        let _ = handle.join();
                    }
                }
                Err(PoolError::GraceExceeded {
                    grace: cfg.grace,
                    stuck,
                })
            }
        };

        // Let the fan-out drain briefly before tearing the runtime down.
        runtime.shutdown_timeout(std::time::Duration::from_millis(500));
        result
    }

    /// Blocks until the process receives a termination signal.
    ///
    /// Combine with [`shutdown`](Self::shutdown) for a run-until-terminated
    /// entry point.
    pub fn wait_for_signal(&self) {
        let _ = self.runtime.block_on(signal::wait_for_shutdown_signal());
    }

    /// Bridge bookkeeping shared by all of this pool's workers.
    pub fn meter(&self) -> &Arc<OpsMeter> {
        &self.meter
    }

    /// The diagnostics bus; subscribe for raw event access.
    pub fn bus(&self) -> &Bus {
        &self.bus
    }

    /// The pool configuration.
    pub fn config(&self) -> &PoolConfig {
        &self.cfg
    }
}
