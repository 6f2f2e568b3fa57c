use std::{
    collections::VecDeque,
    panic::{AssertUnwindSafe, catch_unwind},
    sync::Mutex,
};

/// A zero-argument side-effect scheduled to run after the current frame.
pub type DeferredOp = Box<dyn FnOnce() + Send>;

/// FIFO of operations that must run outside an in-flight UI frame: anything
/// that starts a new UI context or swaps render targets (captures, transition
/// preparation, card creation).
///
/// Enqueue is safe from any thread; [`DeferredQueue::drain`] runs on the UI
/// thread only, once per frame, after the frame has been presented. When the
/// queue was non-empty the main loop skips its idle wait for the next
/// iteration so the enqueued work becomes visible without user input.
#[derive(Default)]
pub struct DeferredQueue {
    ops: Mutex<VecDeque<DeferredOp>>,
}

impl DeferredQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn enqueue(&self, op: impl FnOnce() + Send + 'static) {
        self.ops.lock().unwrap().push_back(Box::new(op));
    }

    /// Non-authoritative; used by the main loop to decide whether to skip the
    /// idle wait.
    pub fn is_pending(&self) -> bool {
        !self.ops.lock().unwrap().is_empty()
    }

    /// Pop-and-run in FIFO order until empty; each operation runs to
    /// completion before the next. Operations may enqueue further operations;
    /// those run within the same drain. A panicking operation is logged and
    /// discarded, and the drain continues.
    ///
    /// Returns the number of operations that ran.
    pub fn drain(&self) -> usize {
        let mut ran = 0;
        loop {
            // Lock is released while the operation runs so it can enqueue.
            let op = self.ops.lock().unwrap().pop_front();
            let Some(op) = op else { break };
            if catch_unwind(AssertUnwindSafe(op)).is_err() {
                tracing::error!(component = "deferred", "deferred operation panicked; discarded");
            }
            ran += 1;
        }
        ran
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    #[test]
    fn drain_runs_in_enqueue_order() {
        let queue = DeferredQueue::new();
        let seen = Arc::new(Mutex::new(Vec::new()));
        for label in ["A", "B", "C"] {
            let seen = seen.clone();
            queue.enqueue(move || seen.lock().unwrap().push(label));
        }
        assert!(queue.is_pending());
        assert_eq!(queue.drain(), 3);
        assert_eq!(*seen.lock().unwrap(), vec!["A", "B", "C"]);
        assert!(!queue.is_pending());
    }

    #[test]
    fn operations_enqueued_during_drain_run_in_the_same_drain() {
        let queue = Arc::new(DeferredQueue::new());
        let seen = Arc::new(Mutex::new(Vec::new()));

        let inner_seen = seen.clone();
        let inner_queue = queue.clone();
        queue.enqueue(move || {
            inner_seen.lock().unwrap().push("outer");
            let seen = inner_seen.clone();
            inner_queue.enqueue(move || seen.lock().unwrap().push("inner"));
        });

        assert_eq!(queue.drain(), 2);
        assert_eq!(*seen.lock().unwrap(), vec!["outer", "inner"]);
    }

    #[test]
    fn panicking_operation_is_swallowed() {
        let queue = DeferredQueue::new();
        let seen = Arc::new(Mutex::new(Vec::new()));
        queue.enqueue(|| panic!("bad op"));
        let after = seen.clone();
        queue.enqueue(move || after.lock().unwrap().push("survivor"));

        assert_eq!(queue.drain(), 2);
        assert_eq!(*seen.lock().unwrap(), vec!["survivor"]);
    }

    #[test]
    fn enqueue_is_safe_across_threads() {
        let queue = Arc::new(DeferredQueue::new());
        let mut handles = Vec::new();
        for _ in 0..4 {
            let queue = queue.clone();
            handles.push(std::thread::spawn(move || {
                for _ in 0..25 {
                    queue.enqueue(|| {});
                }
            }));
        }
        for h in handles {
            h.join().unwrap();
        }
        assert_eq!(queue.drain(), 100);
    }
}
