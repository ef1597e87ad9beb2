//! Operation and factory traits.
//!
//! An [`AsyncOperation`] produces exactly one result after an arbitrary delay
//! once started, delivered through a [`Completion`] handle. The cancellation
//! handle it returns is a plain [`CancellationToken`]: cancel is idempotent,
//! thread-safe, and must be totally ordered with delivery — after a cancel
//! wins, the completion must never fire; after a delivery wins, cancel is a
//! no-op. The bridge additionally absorbs deliveries from operations that get
//! this wrong.

use std::sync::Arc;

use tokio::runtime::Handle;
use tokio_util::sync::CancellationToken;

use crate::bridge::Completion;

/// Payload produced by pool operations: an opaque byte buffer whose only
/// contractual property is its length.
pub type Payload = Vec<u8>;

/// Boxed operation handed from a factory to a worker.
pub type BoxedOperation = Box<dyn AsyncOperation<Payload>>;

/// A single-shot, callback-driven unit of asynchronous work.
pub trait AsyncOperation<T>: Send {
    /// Starts the operation.
    ///
    /// Callable from any thread; returns immediately. Exactly one delivery
    /// through `completion` must eventually occur — unless the returned token
    /// is cancelled before the delivery, in which case the delivery must
    /// never happen.
    fn start(self: Box<Self>, completion: Completion<T>) -> CancellationToken;
}

/// Produces one fresh operation per worker iteration.
///
/// `worker` identifies the requesting worker, which lets factories inject
/// per-worker behavior (fault injection, sharded backends). `exec` is the
/// pool's shared execution runtime for operations that need timers or tasks;
/// factories backed by their own I/O stack may ignore it.
pub trait OperationFactory: Send + Sync + 'static {
    /// Creates the operation for one iteration.
    fn create(&self, worker: usize, exec: &Handle) -> BoxedOperation;
}

/// Closure-backed operation.
///
/// Wraps `FnOnce(Completion<T>) -> CancellationToken`; useful for tests and
/// small collaborators.
pub struct OperationFn<F> {
    f: F,
}

impl<F> OperationFn<F> {
    /// Creates a boxed closure-backed operation.
    pub fn boxed<T>(f: F) -> Box<Self>
    where
        F: FnOnce(Completion<T>) -> CancellationToken + Send,
    {
        Box::new(Self { f })
    }
}

impl<T, F> AsyncOperation<T> for OperationFn<F>
where
    F: FnOnce(Completion<T>) -> CancellationToken + Send,
{
    fn start(self: Box<Self>, completion: Completion<T>) -> CancellationToken {
        (self.f)(completion)
    }
}

/// Closure-backed factory.
///
/// # Example
/// ```
/// use blockbridge::{Completion, FactoryFn, OperationFn, Payload};
/// use tokio_util::sync::CancellationToken;
///
/// let factory = FactoryFn::arc(|_worker, _exec| {
///     OperationFn::boxed(|completion: Completion<Payload>| {
///         completion.succeed(vec![0u8; 1024]);
///         CancellationToken::new()
///     })
/// });
/// # let _ = factory;
/// ```
pub struct FactoryFn<F> {
    f: F,
}

impl<F> FactoryFn<F>
where
    F: Fn(usize, &Handle) -> BoxedOperation + Send + Sync + 'static,
{
    /// Creates the factory and returns it as a shared handle.
    pub fn arc(f: F) -> Arc<Self> {
        Arc::new(Self { f })
    }
}

impl<F> OperationFactory for FactoryFn<F>
where
    F: Fn(usize, &Handle) -> BoxedOperation + Send + Sync + 'static,
{
    fn create(&self, worker: usize, exec: &Handle) -> BoxedOperation {
        (self.f)(worker, exec)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bridge::CompletionBridge;

    #[test]
    fn closure_operation_delivers_through_the_bridge() {
        let bridge = CompletionBridge::<Payload>::new();
        let op = OperationFn::boxed(|completion: Completion<Payload>| {
            completion.succeed(vec![1, 2, 3]);
            CancellationToken::new()
        });

        let cancel = op.start(bridge.completion());
        let payload = bridge.wait(cancel, None).unwrap();
        assert_eq!(payload, vec![1, 2, 3]);
    }
}
