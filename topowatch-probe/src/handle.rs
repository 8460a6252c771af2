//! Control over a running publish loop.

use tokio::sync::watch;
use tokio::task::JoinHandle;

/// Handle for a probe's background publish loop.
///
/// Drop this handle to stop publishing, or call `stop()` explicitly.
#[derive(Debug)]
pub struct PublishHandle {
    pub(crate) stop_tx: watch::Sender<bool>,
    pub(crate) task: JoinHandle<()>,
}

impl PublishHandle {
    /// Stop publishing. The report being published, if any, is finished.
    pub fn stop(self) {
        let _ = self.stop_tx.send(true);
    }

    /// Stop publishing and wait for the loop to exit.
    pub async fn shutdown(self) {
        let _ = self.stop_tx.send(true);
        let _ = self.task.await;
    }

    /// True once the publish loop has exited.
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}
