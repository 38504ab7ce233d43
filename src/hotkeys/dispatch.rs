//! Per-binding delivery of press events to application handlers.
//!
//! Each registered binding gets a bounded single-consumer channel. The host
//! callback only filters and enqueues (it may run on an OS event thread); a
//! Tokio task owns the receiving end and runs the handler according to the
//! binding's [`DispatchPolicy`]. Every invocation runs in its own task, so
//! a panicking handler loses only the press that triggered it.
//!
//! When the host drops a callback (e.g. on `unregister_all`) the sender goes
//! with it, the channel closes, and the consumer task exits after draining
//! whatever was already queued.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_channel::{Receiver, Sender, TrySendError};
use serde::{Deserialize, Serialize};
use tokio::task::JoinHandle;
use tracing::{debug, error, warn};

use super::handlers::AsyncHandler;
use super::host::{ShortcutCallback, ShortcutEvent};
use crate::shortcuts::BindingKind;

/// What a binding does with presses that arrive while its handler is running.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DispatchPolicy {
    /// One invocation at a time, presses queued in arrival order.
    #[default]
    Serial,
    /// Every press starts its own invocation; invocations may overlap.
    Concurrent,
    /// Presses arriving while an invocation is in flight are dropped.
    SkipWhileBusy,
}

/// Create the channel for one binding and the host callback feeding it.
///
/// The callback ignores everything but `Pressed` transitions. A full or
/// closed channel drops the press.
pub(crate) fn press_channel(
    binding: BindingKind,
    capacity: usize,
) -> (ShortcutCallback, Receiver<ShortcutEvent>) {
    // bounded(0) panics
    let (tx, rx) = async_channel::bounded(capacity.max(1));
    (forward_presses(binding, tx), rx)
}

fn forward_presses(binding: BindingKind, tx: Sender<ShortcutEvent>) -> ShortcutCallback {
    Arc::new(move |event: ShortcutEvent| {
        if !event.is_pressed() {
            return;
        }
        match tx.try_send(event) {
            Ok(()) => {}
            Err(TrySendError::Full(event)) => {
                warn!(
                    binding = %binding,
                    combo = %event.combo,
                    "Hotkey press queue full, dropping press"
                );
            }
            Err(TrySendError::Closed(event)) => {
                debug!(
                    binding = %binding,
                    combo = %event.combo,
                    "Hotkey press channel closed, dropping press"
                );
            }
        }
    })
}

/// Spawn the consumer task for one binding.
///
/// Must be called from within a Tokio runtime.
pub(crate) fn spawn_consumer(
    binding: BindingKind,
    presses: Receiver<ShortcutEvent>,
    handler: AsyncHandler,
    policy: DispatchPolicy,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        debug!(binding = %binding, ?policy, "Hotkey consumer started");

        match policy {
            DispatchPolicy::Serial => {
                while let Ok(event) = presses.recv().await {
                    supervise(binding, event, handler.clone()).await;
                }
            }
            DispatchPolicy::Concurrent => {
                while let Ok(event) = presses.recv().await {
                    tokio::spawn(supervise(binding, event, handler.clone()));
                }
            }
            DispatchPolicy::SkipWhileBusy => {
                let in_flight = Arc::new(AtomicBool::new(false));
                while let Ok(event) = presses.recv().await {
                    if in_flight.swap(true, Ordering::SeqCst) {
                        debug!(binding = %binding, "Handler busy, skipping press");
                        continue;
                    }
                    let handler = handler.clone();
                    let in_flight = in_flight.clone();
                    tokio::spawn(async move {
                        supervise(binding, event, handler).await;
                        in_flight.store(false, Ordering::SeqCst);
                    });
                }
            }
        }

        debug!(binding = %binding, "Hotkey consumer stopped");
    })
}

/// Run one invocation in its own task so a panicking handler only loses
/// that press. Resolves once the invocation has finished or panicked.
async fn supervise(binding: BindingKind, event: ShortcutEvent, handler: AsyncHandler) {
    let combo = event.combo.clone();
    let invocation = tokio::spawn(async move { run_handler(binding, &event, &handler).await });

    if let Err(e) = invocation.await {
        if e.is_panic() {
            error!(binding = %binding, combo = %combo, "Hotkey handler panicked");
        } else {
            warn!(binding = %binding, combo = %combo, "Hotkey handler cancelled");
        }
    }
}

async fn run_handler(binding: BindingKind, event: &ShortcutEvent, handler: &AsyncHandler) {
    debug!(binding = %binding, combo = %event.combo, "Hotkey pressed");
    if let Err(e) = handler().await {
        error!(
            binding = %binding,
            combo = %event.combo,
            error = ?e,
            "Hotkey handler failed"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hotkeys::handlers::handler;
    use crate::hotkeys::host::ShortcutState;
    use std::sync::atomic::AtomicUsize;
    use std::time::Duration;
    use tokio::sync::Notify;

    fn pressed() -> ShortcutEvent {
        ShortcutEvent::new("Alt+K", ShortcutState::Pressed)
    }

    #[test]
    fn callback_drops_released_events() {
        let (callback, rx) = press_channel(BindingKind::RecordToggle, 4);
        callback(ShortcutEvent::new("Alt+K", ShortcutState::Released));
        assert!(rx.is_empty());
        callback(pressed());
        assert_eq!(rx.len(), 1);
    }

    #[test]
    fn full_queue_drops_extra_presses() {
        let (callback, rx) = press_channel(BindingKind::PasteLast, 2);
        for _ in 0..5 {
            callback(pressed());
        }
        assert_eq!(rx.len(), 2);
    }

    #[test]
    fn zero_capacity_is_clamped() {
        let (callback, rx) = press_channel(BindingKind::OpenApp, 0);
        callback(pressed());
        assert_eq!(rx.len(), 1);
    }

    #[test]
    fn closed_channel_does_not_panic() {
        let (callback, rx) = press_channel(BindingKind::OpenApp, 1);
        drop(rx);
        callback(pressed());
    }

    #[tokio::test]
    async fn serial_runs_every_press_and_stops_when_closed() {
        let count = Arc::new(AtomicUsize::new(0));
        let counter = count.clone();
        let (callback, rx) = press_channel(BindingKind::RecordToggle, 8);
        let task = spawn_consumer(
            BindingKind::RecordToggle,
            rx,
            handler(move || {
                let counter = counter.clone();
                async move {
                    counter.fetch_add(1, Ordering::SeqCst);
                    Ok(())
                }
            }),
            DispatchPolicy::Serial,
        );

        for _ in 0..3 {
            callback(pressed());
        }
        drop(callback);

        tokio::time::timeout(Duration::from_secs(5), task)
            .await
            .expect("consumer exits once the channel closes")
            .expect("consumer task panicked");
        assert_eq!(count.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn failing_handler_keeps_consumer_alive() {
        let count = Arc::new(AtomicUsize::new(0));
        let counter = count.clone();
        let (callback, rx) = press_channel(BindingKind::PasteLast, 8);
        let task = spawn_consumer(
            BindingKind::PasteLast,
            rx,
            handler(move || {
                let counter = counter.clone();
                async move {
                    counter.fetch_add(1, Ordering::SeqCst);
                    Err::<(), _>(anyhow::anyhow!("paste failed"))
                }
            }),
            DispatchPolicy::Serial,
        );

        callback(pressed());
        callback(pressed());
        drop(callback);

        tokio::time::timeout(Duration::from_secs(5), task)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(count.load(Ordering::SeqCst), 2);
    }

    /// Handler that panics on its first call and counts every call.
    fn panics_first_time(calls: Arc<AtomicUsize>) -> AsyncHandler {
        handler(move || {
            let calls = calls.clone();
            async move {
                if calls.fetch_add(1, Ordering::SeqCst) == 0 {
                    panic!("handler blew up");
                }
                Ok(())
            }
        })
    }

    #[tokio::test]
    async fn serial_survives_a_panicking_handler() {
        let calls = Arc::new(AtomicUsize::new(0));
        let (callback, rx) = press_channel(BindingKind::RecordToggle, 8);
        let task = spawn_consumer(
            BindingKind::RecordToggle,
            rx,
            panics_first_time(calls.clone()),
            DispatchPolicy::Serial,
        );

        for _ in 0..3 {
            callback(pressed());
        }
        drop(callback);

        tokio::time::timeout(Duration::from_secs(5), task)
            .await
            .unwrap()
            .expect("consumer outlives the panicking invocation");
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn panicking_handler_does_not_stall_other_policies() {
        for policy in [DispatchPolicy::SkipWhileBusy, DispatchPolicy::Concurrent] {
            let calls = Arc::new(AtomicUsize::new(0));
            let (callback, rx) = press_channel(BindingKind::PasteLast, 8);
            let _task = spawn_consumer(
                BindingKind::PasteLast,
                rx,
                panics_first_time(calls.clone()),
                policy,
            );

            // One press at a time so SkipWhileBusy never sees an overlap.
            for _ in 0..3 {
                callback(pressed());
                tokio::time::sleep(Duration::from_millis(50)).await;
            }
            assert_eq!(calls.load(Ordering::SeqCst), 3, "{policy:?}");
        }
    }

    #[tokio::test]
    async fn skip_while_busy_drops_presses_during_invocation() {
        let started = Arc::new(AtomicUsize::new(0));
        let release = Arc::new(Notify::new());
        let entered = Arc::new(Notify::new());

        let (callback, rx) = press_channel(BindingKind::RecordToggle, 8);
        let _task = spawn_consumer(
            BindingKind::RecordToggle,
            rx,
            handler({
                let started = started.clone();
                let release = release.clone();
                let entered = entered.clone();
                move || {
                    let started = started.clone();
                    let release = release.clone();
                    let entered = entered.clone();
                    async move {
                        started.fetch_add(1, Ordering::SeqCst);
                        entered.notify_one();
                        release.notified().await;
                        Ok(())
                    }
                }
            }),
            DispatchPolicy::SkipWhileBusy,
        );

        callback(pressed());
        tokio::time::timeout(Duration::from_secs(5), entered.notified())
            .await
            .unwrap();

        // Handler is parked; these arrive while busy.
        callback(pressed());
        callback(pressed());
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(started.load(Ordering::SeqCst), 1);

        release.notify_one();
    }

    #[tokio::test]
    async fn concurrent_invocations_overlap() {
        let entered = Arc::new(AtomicUsize::new(0));
        let release = Arc::new(Notify::new());
        let all_in = Arc::new(Notify::new());

        let (callback, rx) = press_channel(BindingKind::PasteLast, 8);
        let _task = spawn_consumer(
            BindingKind::PasteLast,
            rx,
            handler({
                let entered = entered.clone();
                let release = release.clone();
                let all_in = all_in.clone();
                move || {
                    let entered = entered.clone();
                    let release = release.clone();
                    let all_in = all_in.clone();
                    async move {
                        if entered.fetch_add(1, Ordering::SeqCst) + 1 == 2 {
                            all_in.notify_one();
                        }
                        release.notified().await;
                        Ok(())
                    }
                }
            }),
            DispatchPolicy::Concurrent,
        );

        callback(pressed());
        callback(pressed());

        // Both invocations are in flight at the same time.
        tokio::time::timeout(Duration::from_secs(5), all_in.notified())
            .await
            .unwrap();
        assert_eq!(entered.load(Ordering::SeqCst), 2);

        release.notify_waiters();
    }
}
