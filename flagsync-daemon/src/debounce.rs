//! Stream-scoped trailing-edge debouncer.
//!
//! Converts a potentially high-frequency stream of change notifications into
//! a low-frequency stream of "resync now" triggers: one pending timer for the
//! whole stream, restarted from zero by every notification, emitting exactly
//! one trigger when it expires without being reset. Resync therefore happens
//! `window` after the *last* event in a burst, never per event.

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::Instant;

use flagsync_core::ChangeNotification;

/// Handle feeding notifications into the debounce task.
///
/// Dropping the handle (and every [`Debouncer::notifier`] clone) cancels a
/// pending window without firing it.
pub struct Debouncer {
    notify_tx: mpsc::UnboundedSender<ChangeNotification>,
}

impl Debouncer {
    /// Spawn the debounce task.
    ///
    /// Returns the handle and the trigger stream. The trigger channel has
    /// capacity 1: a trigger arriving while a resync is already pending or
    /// running is absorbed by that cycle, which will reflect the latest data
    /// once it runs — no overlapping resyncs, no lost work.
    pub fn spawn(window: Duration) -> (Self, mpsc::Receiver<()>) {
        let (notify_tx, notify_rx) = mpsc::unbounded_channel();
        let (trigger_tx, trigger_rx) = mpsc::channel(1);
        tokio::spawn(debounce_task(window, notify_rx, trigger_tx));
        (Self { notify_tx }, trigger_rx)
    }

    /// Feed one notification into the pending window.
    pub fn notify(&self, notification: ChangeNotification) {
        let _ = self.notify_tx.send(notification);
    }

    /// A cloneable sender for change-handler callbacks.
    pub fn notifier(&self) -> mpsc::UnboundedSender<ChangeNotification> {
        self.notify_tx.clone()
    }
}

async fn debounce_task(
    window: Duration,
    mut notify_rx: mpsc::UnboundedReceiver<ChangeNotification>,
    trigger_tx: mpsc::Sender<()>,
) {
    while let Some(first) = notify_rx.recv().await {
        tracing::debug!(key = %first.key, "change notification received, debounce window started");
        let sleep = tokio::time::sleep(window);
        tokio::pin!(sleep);

        loop {
            tokio::select! {
                () = &mut sleep => {
                    // Quiet window elapsed: emit one trigger. A full channel
                    // means a resync is already pending; that cycle covers us.
                    if trigger_tx.try_send(()).is_err() && trigger_tx.is_closed() {
                        return;
                    }
                    break;
                }
                more = notify_rx.recv() => match more {
                    Some(notification) => {
                        tracing::debug!(key = %notification.key, "debounce window restarted");
                        sleep.as_mut().reset(Instant::now() + window);
                    }
                    // All senders gone: shutdown cancels the pending window.
                    None => return,
                },
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
