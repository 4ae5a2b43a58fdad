/// A unit of work handed to an executor.
pub type Job = Box<dyn FnOnce() + Send + 'static>;

/// Context on which a caller expects to observe results (commonly a UI
/// thread).
///
/// Capture completions are always re-dispatched through an executor, never
/// invoked on the controller's session queue.
pub trait CallbackExecutor: Send + Sync {
    fn execute(&self, job: Job);
}
