//! Pool-level behavior: bounded outstanding operations, worker isolation,
//! payload validation, graceful shutdown, and sustained load.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use blockbridge::{
    BackoffPolicy, BoxedOperation, Completion, Event, EventKind, FactoryFn, JitterPolicy,
    OperationError, OperationFn, Payload, PoolConfig, ProgressTracker, Reaction,
    SimulatedQueryFactory, Subscribe, WorkerPool,
};

/// Subscriber counting occurrences of one event kind.
struct KindCounter {
    kind: EventKind,
    seen: AtomicU64,
}

impl KindCounter {
    fn new(kind: EventKind) -> Arc<Self> {
        Arc::new(Self {
            kind,
            seen: AtomicU64::new(0),
        })
    }

    fn count(&self) -> u64 {
        self.seen.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Subscribe for KindCounter {
    async fn on_event(&self, event: &Event) {
        if event.kind == self.kind {
            self.seen.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn name(&self) -> &'static str {
        "kind_counter"
    }
}

/// Polls `cond` until it holds or `deadline` elapses.
fn eventually(deadline: Duration, mut cond: impl FnMut() -> bool) -> bool {
    let until = Instant::now() + deadline;
    while Instant::now() < until {
        if cond() {
            return true;
        }
        std::thread::sleep(Duration::from_millis(5));
    }
    cond()
}

/// One operation that delivers `result` on the shared runtime after `delay`,
/// unless cancelled first.
fn complete_after(
    exec: &tokio::runtime::Handle,
    delay: Duration,
    result: Result<Payload, OperationError>,
) -> BoxedOperation {
    let exec = exec.clone();
    OperationFn::boxed(move |completion: Completion<Payload>| {
        let token = CancellationToken::new();
        let cancelled = token.clone();
        exec.spawn(async move {
            tokio::select! {
                _ = cancelled.cancelled() => {}
                _ = tokio::time::sleep(delay) => {
                    completion.complete(result);
                }
            }
        });
        token
    })
}

fn quick_backoff() -> BackoffPolicy {
    BackoffPolicy {
        first: Duration::from_millis(1),
        max: Duration::from_millis(5),
        factor: 1.0,
        jitter: JitterPolicy::None,
    }
}

#[test]
fn outstanding_operations_stay_bounded_by_worker_count() {
    let cfg = PoolConfig {
        workers: 4,
        report_every: 10,
        grace: Duration::from_secs(10),
        ..PoolConfig::default()
    };
    let factory = Arc::new(
        SimulatedQueryFactory::new()
            .with_latency(Duration::ZERO..=Duration::from_millis(1)),
    );

    let pool = WorkerPool::start(cfg, factory, vec![]).unwrap();
    let meter = Arc::clone(pool.meter());

    let watched = Instant::now() + Duration::from_millis(300);
    while Instant::now() < watched {
        assert!(meter.outstanding() <= 4);
        std::thread::sleep(Duration::from_millis(2));
    }
    assert!(meter.peak() <= 4, "peak {} exceeded worker count", meter.peak());
    assert_eq!(meter.absorbed(), 0);

    pool.shutdown().unwrap();
    assert_eq!(meter.outstanding(), 0, "no bridge survives shutdown");
}

#[test]
fn failing_worker_does_not_affect_its_sibling() {
    let cfg = PoolConfig {
        workers: 2,
        report_every: 1,
        backoff: quick_backoff(),
        grace: Duration::from_secs(10),
        ..PoolConfig::default()
    };

    // Worker 0 fails every iteration; worker 1 keeps succeeding.
    let factory = FactoryFn::arc(|worker, exec| {
        let result = if worker == 0 {
            Err(OperationError::new("injected failure"))
        } else {
            Ok(vec![0u8; 1024])
        };
        complete_after(exec, Duration::from_micros(500), result)
    });

    let tracker = Arc::new(ProgressTracker::new());
    let failures = KindCounter::new(EventKind::OperationFailed);
    let pool = WorkerPool::start(
        cfg,
        factory,
        vec![tracker.clone() as Arc<dyn Subscribe>, failures.clone() as _],
    )
    .unwrap();

    assert!(
        eventually(Duration::from_secs(5), || {
            tracker.counter(1).unwrap_or(0) >= 50 && failures.count() >= 5
        }),
        "healthy worker stalled: tracker={:?} failures={}",
        tracker.snapshot(),
        failures.count()
    );
    assert_eq!(
        tracker.counter(0).unwrap_or(0),
        0,
        "failing worker must not advance its counter"
    );

    pool.shutdown().unwrap();
}

#[test]
fn short_payload_is_reported_and_the_worker_keeps_running() {
    let cfg = PoolConfig {
        workers: 2,
        report_every: 1,
        expected_len: 1024,
        grace: Duration::from_secs(10),
        ..PoolConfig::default()
    };

    // Worker 0's 3rd operation fabricates 512 bytes instead of 1024.
    let worker0_ops = Arc::new(AtomicU64::new(0));
    let factory = FactoryFn::arc(move |worker, exec| {
        let nth = if worker == 0 {
            worker0_ops.fetch_add(1, Ordering::SeqCst) + 1
        } else {
            0
        };
        let len = if nth == 3 { 512 } else { 1024 };
        complete_after(exec, Duration::from_micros(500), Ok(vec![0u8; len]))
    });

    let tracker = Arc::new(ProgressTracker::new());
    let violations = KindCounter::new(EventKind::IntegrityViolation);
    let stops = KindCounter::new(EventKind::WorkerStopped);
    let pool = WorkerPool::start(
        cfg,
        factory,
        vec![
            tracker.clone() as Arc<dyn Subscribe>,
            violations.clone() as _,
            stops.clone() as _,
        ],
    )
    .unwrap();

    assert!(
        eventually(Duration::from_secs(5), || {
            tracker.counter(0).unwrap_or(0) >= 10 && tracker.counter(1).unwrap_or(0) >= 10
        }),
        "workers stalled: {:?}",
        tracker.snapshot()
    );
    assert_eq!(violations.count(), 1, "exactly one short payload injected");
    assert_eq!(stops.count(), 0, "no worker stopped over an integrity violation");

    pool.shutdown().unwrap();
}

#[test]
fn stop_worker_reaction_stops_only_that_worker() {
    let cfg = PoolConfig {
        workers: 2,
        report_every: 1,
        on_integrity: Reaction::StopWorker,
        grace: Duration::from_secs(10),
        ..PoolConfig::default()
    };

    // Worker 0 immediately violates the shape; worker 1 is healthy.
    let factory = FactoryFn::arc(|worker, exec| {
        let len = if worker == 0 { 1 } else { 1024 };
        complete_after(exec, Duration::from_micros(500), Ok(vec![0u8; len]))
    });

    let tracker = Arc::new(ProgressTracker::new());
    let stops = KindCounter::new(EventKind::WorkerStopped);
    let pool = WorkerPool::start(
        cfg,
        factory,
        vec![tracker.clone() as Arc<dyn Subscribe>, stops.clone() as _],
    )
    .unwrap();

    assert!(
        eventually(Duration::from_secs(5), || {
            stops.count() >= 1 && tracker.counter(1).unwrap_or(0) >= 20
        }),
        "expected worker 0 to stop and worker 1 to keep going"
    );

    pool.shutdown().unwrap();
}

#[test]
fn sustained_load_completes_without_absorbed_deliveries() {
    let cfg = PoolConfig {
        workers: 8,
        report_every: 25,
        grace: Duration::from_secs(10),
        ..PoolConfig::default()
    };
    let factory = Arc::new(
        SimulatedQueryFactory::new()
            .with_latency(Duration::ZERO..=Duration::from_millis(2)),
    );

    let tracker = Arc::new(ProgressTracker::new());
    let pool = WorkerPool::start(cfg, factory, vec![tracker.clone() as Arc<dyn Subscribe>])
        .unwrap();
    let meter = Arc::clone(pool.meter());

    let total = |t: &ProgressTracker| t.snapshot().iter().map(|(_, c)| c).sum::<u64>();
    assert!(
        eventually(Duration::from_secs(20), || total(&tracker) >= 2_000),
        "pool too slow: total={}",
        total(&tracker)
    );

    assert_eq!(meter.absorbed(), 0, "no delivery may lose a race in a clean run");
    assert!(meter.peak() <= 8);

    pool.shutdown().unwrap();
    assert_eq!(meter.outstanding(), 0);
}

#[test]
fn timed_out_iterations_are_contained_and_retried() {
    let cfg = PoolConfig {
        workers: 1,
        report_every: 1,
        timeout: Duration::from_millis(10),
        backoff: quick_backoff(),
        grace: Duration::from_secs(10),
        ..PoolConfig::default()
    };
    // Far beyond the timeout: every iteration times out and gets cancelled.
    let factory = Arc::new(
        SimulatedQueryFactory::new()
            .with_latency(Duration::from_secs(5)..=Duration::from_secs(5)),
    );

    let timeouts = KindCounter::new(EventKind::TimeoutHit);
    let pool = WorkerPool::start(cfg, factory, vec![timeouts.clone() as Arc<dyn Subscribe>])
        .unwrap();
    let meter = Arc::clone(pool.meter());

    assert!(
        eventually(Duration::from_secs(5), || timeouts.count() >= 3),
        "worker did not keep iterating through timeouts"
    );
    // Each timeout cancelled its operation before the 5s latency elapsed, so
    // no late delivery ever fired against an abandoned bridge.
    assert_eq!(meter.absorbed(), 0);

    pool.shutdown().unwrap();
}

#[test]
fn shutdown_reports_a_stuck_worker_after_grace() {
    let cfg = PoolConfig {
        workers: 1,
        grace: Duration::from_millis(100),
        ..PoolConfig::default()
    };
    // The completion handle is dropped without delivering: the worker blocks
    // in its bridge forever.
    let factory = FactoryFn::arc(|_worker, _exec| {
        OperationFn::boxed(|_completion: Completion<Payload>| CancellationToken::new())
    });

    let pool = WorkerPool::start(cfg, factory, vec![]).unwrap();
    std::thread::sleep(Duration::from_millis(50));

    match pool.shutdown() {
        Err(blockbridge::PoolError::GraceExceeded { stuck, .. }) => {
            assert_eq!(stuck, vec![0]);
        }
        other => panic!("expected GraceExceeded, got {other:?}"),
    }
}
