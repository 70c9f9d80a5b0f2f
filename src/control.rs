//! The run controller: the blocking primitive that keeps the process alive
//! while the graph executes.
//!
//! [`RunController::wait`] blocks the application thread; a [`StopHandle`]
//! (cloneable, shareable across threads) is handed to the bus error handler
//! so that an asynchronous stage error can end the run.

use std::sync::{Arc, Condvar, Mutex};

#[derive(Default)]
struct Shared {
    stopped: Mutex<bool>,
    cond: Condvar,
}

/// Blocking wait primitive owned by the pipeline driver.
#[derive(Default)]
pub struct RunController {
    shared: Arc<Shared>,
}

/// Signals a [`RunController`] to stop waiting.
#[derive(Clone)]
pub struct StopHandle {
    shared: Arc<Shared>,
}

impl RunController {
    /// Create a controller in the running (not stopped) state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Get a handle that can stop this controller from another thread.
    pub fn handle(&self) -> StopHandle {
        StopHandle {
            shared: Arc::clone(&self.shared),
        }
    }

    /// Block the calling thread until [`StopHandle::stop`] is called.
    ///
    /// Returns immediately if the controller was already stopped.
    pub fn wait(&self) {
        let mut stopped = self.shared.stopped.lock().unwrap();
        while !*stopped {
            stopped = self.shared.cond.wait(stopped).unwrap();
        }
    }

    /// Whether the controller has been stopped.
    pub fn is_stopped(&self) -> bool {
        *self.shared.stopped.lock().unwrap()
    }
}

impl StopHandle {
    /// Stop the controller, waking the waiting thread.
    ///
    /// Idempotent: stopping an already-stopped controller is a no-op.
    pub fn stop(&self) {
        let mut stopped = self.shared.stopped.lock().unwrap();
        *stopped = true;
        self.shared.cond.notify_all();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;
    use std::time::Duration;

    #[test]
    fn wait_returns_immediately_when_already_stopped() {
        let controller = RunController::new();
        controller.handle().stop();
        controller.wait();
        assert!(controller.is_stopped());
    }

    #[test]
    fn stop_from_another_thread_unblocks_wait() {
        let controller = RunController::new();
        let handle = controller.handle();

        let stopper = thread::spawn(move || {
            thread::sleep(Duration::from_millis(20));
            handle.stop();
        });

        controller.wait();
        assert!(controller.is_stopped());
        stopper.join().unwrap();
    }

    #[test]
    fn stop_is_idempotent() {
        let controller = RunController::new();
        let handle = controller.handle();
        handle.stop();
        handle.stop();
        controller.wait();
    }
}
