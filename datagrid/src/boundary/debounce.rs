//! Trailing-edge debouncer for filter text.

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::timeout;

/// Collapses bursts of values into the last one.
///
/// A value is released once no newer value arrived for the whole window.
/// Senders are plain [`mpsc::UnboundedSender`]s, so keystroke handlers never
/// block.
///
/// # Example
///
/// ```
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// use std::time::Duration;
/// use datagrid::boundary::debounce;
///
/// let (tx, mut debouncer) = debounce::channel(Duration::from_millis(300));
/// tx.send("a".to_string()).unwrap();
/// tx.send("ad".to_string()).unwrap();
/// drop(tx);
/// assert_eq!(debouncer.next().await.as_deref(), Some("ad"));
/// # }
/// ```
#[derive(Debug)]
pub struct Debouncer<T> {
    rx: mpsc::UnboundedReceiver<T>,
    window: Duration,
}

/// Creates a sender and the debouncer reading from it.
pub fn channel<T>(window: Duration) -> (mpsc::UnboundedSender<T>, Debouncer<T>) {
    let (tx, rx) = mpsc::unbounded_channel();
    (tx, Debouncer { rx, window })
}

impl<T> Debouncer<T> {
    /// Returns the configured quiet window.
    pub fn window(&self) -> Duration {
        self.window
    }

    /// Waits for the next settled value.
    ///
    /// Returns `None` once every sender is dropped and nothing is pending.
    /// A pending value is flushed immediately when the senders go away.
    pub async fn next(&mut self) -> Option<T> {
        let mut latest = self.rx.recv().await?;
        loop {
            match timeout(self.window, self.rx.recv()).await {
                Ok(Some(value)) => latest = value,
                Ok(None) | Err(_) => return Some(latest),
            }
        }
    }
}
