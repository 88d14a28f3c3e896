use std::time::Duration;

use tokio::sync::oneshot;
use tokio::task::JoinHandle;

/// A scheduled one-shot callback: fires exactly once after the delay unless
/// cancelled first. Dropping the handle cancels it, so teardown of whatever
/// owns the timer is enough to stop the callback from ever firing.
#[derive(Debug)]
pub struct OneShot {
    cancel: Option<oneshot::Sender<()>>,
    #[allow(dead_code)]
    handle: JoinHandle<()>,
}

impl OneShot {
    pub fn schedule<F>(delay: Duration, callback: F) -> OneShot
    where
        F: FnOnce() + Send + 'static,
    {
        let (cancel, cancelled) = oneshot::channel();

        let handle = tokio::spawn(async move {
            tokio::select! {
                _ = tokio::time::sleep(delay) => callback(),
                _ = cancelled => {}
            }
        });

        OneShot {
            cancel: Some(cancel),
            handle,
        }
    }

    pub fn cancel(mut self) {
        if let Some(cancel) = self.cancel.take() {
            let _ = cancel.send(());
        }
    }
}

impl Drop for OneShot {
    fn drop(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            let _ = cancel.send(());
        }
    }
}
