//! Integrity violations are reported, not fatal.
//!
//! Every 50th operation fabricates a 512-byte payload against an expected
//! 1024 bytes. The workers report the violation and keep running — contrast
//! with aborting the whole process over one bad payload.
//!
//! Run with: `cargo run --example short_payload`

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use blockbridge::{
    Completion, FactoryFn, LogWriter, OperationFn, Payload, PoolConfig, ProgressTracker,
    Subscribe, WorkerPool,
};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cfg = PoolConfig {
        workers: 2,
        report_every: 100,
        grace: Duration::from_secs(5),
        ..PoolConfig::default()
    };

    let issued = Arc::new(AtomicU64::new(0));
    let factory = FactoryFn::arc(move |_worker, exec| {
        let nth = issued.fetch_add(1, Ordering::Relaxed) + 1;
        let exec = exec.clone();
        OperationFn::boxed(move |completion: Completion<Payload>| {
            let token = CancellationToken::new();
            let cancelled = token.clone();
            let len = if nth % 50 == 0 { 512 } else { 1024 };
            exec.spawn(async move {
                tokio::select! {
                    _ = cancelled.cancelled() => {}
                    _ = tokio::time::sleep(Duration::from_micros(500)) => {
                        completion.succeed(vec![0u8; len]);
                    }
                }
            });
            token
        })
    });

    let tracker = Arc::new(ProgressTracker::new());
    let subs: Vec<Arc<dyn Subscribe>> = vec![Arc::new(LogWriter), tracker.clone()];

    let pool = WorkerPool::start(cfg, factory, subs)?;
    std::thread::sleep(Duration::from_secs(3));
    pool.shutdown()?;

    for (worker, counter) in tracker.snapshot() {
        println!("worker {worker} completed {counter} valid iterations");
    }
    Ok(())
}
