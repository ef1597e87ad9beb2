//! Eight perpetual workers hammering a simulated query until Ctrl-C.
//!
//! Run with: `cargo run --example perpetual`

use std::sync::Arc;
use std::time::Duration;

use blockbridge::{LogWriter, PoolConfig, SimulatedQueryFactory, Subscribe, WorkerPool};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cfg = PoolConfig {
        workers: 8,
        report_every: 100,
        grace: Duration::from_secs(5),
        ..PoolConfig::default()
    };

    let factory = Arc::new(
        SimulatedQueryFactory::new().with_latency(Duration::ZERO..=Duration::from_millis(5)),
    );
    let subs: Vec<Arc<dyn Subscribe>> = vec![Arc::new(LogWriter)];

    let pool = WorkerPool::start(cfg, factory, subs)?;
    println!("pool running with {} workers; Ctrl-C to stop", pool.config().workers);

    pool.wait_for_signal();
    pool.shutdown()?;
    println!("all workers stopped");
    Ok(())
}
