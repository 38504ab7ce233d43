//! [`ShortcutHost`] backed by the `global-hotkey` crate.
//!
//! `GlobalHotKeyManager` is not `Send` on every platform (on Windows it owns a
//! window handle that only its creating thread may use), so it lives on a
//! dedicated "hotkey-manager" thread. The host talks to it over a command
//! channel and awaits each reply.

use std::collections::HashMap;
use std::sync::{Arc, OnceLock, Weak};

use async_channel::{Receiver, Sender};
use async_trait::async_trait;
use global_hotkey::{
    hotkey::HotKey, Error as HotkeyError, GlobalHotKeyEvent, GlobalHotKeyManager, HotKeyState,
};
use parking_lot::Mutex;
use tracing::{debug, info, warn};

use super::host::{HostError, ShortcutCallback, ShortcutEvent, ShortcutHost, ShortcutState};
use crate::error::ResultExt;

struct Route {
    combo: String,
    hotkey: HotKey,
    callback: ShortcutCallback,
}

/// Maps hotkey ID -> registered combo and its callback
type RouteTable = Mutex<HashMap<u32, Route>>;

type Reply = Sender<Result<(), HostError>>;

/// Requests executed on the manager thread.
#[derive(Debug)]
enum ManagerCommand {
    Register {
        hotkey: HotKey,
        combo: String,
        reply: Reply,
    },
    UnregisterAll {
        hotkeys: Vec<HotKey>,
        combos: String,
        reply: Reply,
    },
}

/// Route table of the live host. The event pump reads through this so that
/// only one pump thread ever consumes `GlobalHotKeyEvent::receiver()`.
static ACTIVE_ROUTES: OnceLock<Mutex<Weak<RouteTable>>> = OnceLock::new();
static EVENT_PUMP: OnceLock<Result<(), HostError>> = OnceLock::new();

#[cfg(windows)]
const PUMP_INTERVAL: std::time::Duration = std::time::Duration::from_millis(15);

fn active_routes() -> &'static Mutex<Weak<RouteTable>> {
    ACTIVE_ROUTES.get_or_init(|| Mutex::new(Weak::new()))
}

/// Global shortcut registry of the operating system.
///
/// NOTE: Hotkey events are only delivered while the platform event loop
/// runs (on macOS, the application's main-thread run loop). The most
/// recently created host receives all hotkey events.
pub struct GlobalHotkeyHost {
    commands: Sender<ManagerCommand>,
    routes: Arc<RouteTable>,
}

impl GlobalHotkeyHost {
    /// Start the manager thread and the event pump.
    ///
    /// Blocks until the manager thread has created its `GlobalHotKeyManager`.
    pub fn new() -> Result<Self, HostError> {
        let (commands, inbox) = async_channel::unbounded();
        let (ready_tx, ready_rx) = async_channel::bounded(1);

        std::thread::Builder::new()
            .name("hotkey-manager".to_string())
            .spawn(move || run_manager(inbox, ready_tx))
            .map_err(|e| {
                HostError::Unavailable(format!("failed to start hotkey manager thread: {}", e))
            })?;
        ready_rx.recv_blocking().map_err(|_| manager_gone())??;

        let routes: Arc<RouteTable> = Arc::default();
        *active_routes().lock() = Arc::downgrade(&routes);
        start_event_pump()?;

        Ok(Self { commands, routes })
    }

    /// Combos currently registered through this host.
    pub fn registered_combos(&self) -> Vec<String> {
        self.routes
            .lock()
            .values()
            .map(|route| route.combo.clone())
            .collect()
    }

    fn registered_hotkeys(&self) -> (Vec<HotKey>, Vec<String>) {
        self.routes
            .lock()
            .values()
            .map(|route| (route.hotkey, route.combo.clone()))
            .unzip()
    }

    async fn request(
        &self,
        command: ManagerCommand,
        response: Receiver<Result<(), HostError>>,
    ) -> Result<(), HostError> {
        self.commands
            .send(command)
            .await
            .map_err(|_| manager_gone())?;
        response.recv().await.map_err(|_| manager_gone())?
    }
}

#[async_trait]
impl ShortcutHost for GlobalHotkeyHost {
    async fn register(&self, combo: &str, callback: ShortcutCallback) -> Result<(), HostError> {
        let hotkey = parse_combo(combo)?;
        let hotkey_id = hotkey.id();

        let (reply, response) = async_channel::bounded(1);
        self.request(
            ManagerCommand::Register {
                hotkey,
                combo: combo.to_string(),
                reply,
            },
            response,
        )
        .await?;

        self.routes.lock().insert(
            hotkey_id,
            Route {
                combo: combo.to_string(),
                hotkey,
                callback,
            },
        );

        info!(combo = %combo, hotkey_id, "Registered global hotkey");
        Ok(())
    }

    async fn unregister_all(&self) -> Result<(), HostError> {
        let (hotkeys, combos) = self.registered_hotkeys();
        if hotkeys.is_empty() {
            return Ok(());
        }
        let count = hotkeys.len();

        let (reply, response) = async_channel::bounded(1);
        self.request(
            ManagerCommand::UnregisterAll {
                hotkeys,
                combos: combos.join(", "),
                reply,
            },
            response,
        )
        .await?;

        // Dropping the routes drops their callbacks.
        self.routes.lock().clear();
        info!(count, "Unregistered all global hotkeys");
        Ok(())
    }
}

impl Drop for GlobalHotkeyHost {
    fn drop(&mut self) {
        let (hotkeys, combos) = self.registered_hotkeys();
        self.routes.lock().clear();
        if hotkeys.is_empty() {
            return;
        }

        // Queued before the channel closes, so the manager thread handles it
        // and then exits. Failures are logged there.
        let (reply, _) = async_channel::bounded(1);
        self.commands
            .try_send(ManagerCommand::UnregisterAll {
                hotkeys,
                combos: combos.join(", "),
                reply,
            })
            .warn_on_err();
    }
}

fn manager_gone() -> HostError {
    HostError::Unavailable("hotkey manager thread stopped".to_string())
}

/// Body of the "hotkey-manager" thread. Exits when every host handle is gone.
fn run_manager(inbox: Receiver<ManagerCommand>, ready: Sender<Result<(), HostError>>) {
    let manager = match GlobalHotKeyManager::new() {
        Ok(manager) => manager,
        Err(e) => {
            let _ = ready.send_blocking(Err(HostError::Unavailable(format!(
                "failed to create hotkey manager: {}",
                e
            ))));
            return;
        }
    };
    if ready.send_blocking(Ok(())).is_err() {
        return;
    }
    drop(ready);

    debug!("Hotkey manager thread started");
    while let Some(command) = next_command(&inbox) {
        handle_command(&manager, command);
    }
    debug!("Hotkey manager thread stopped");
}

fn handle_command(manager: &GlobalHotKeyManager, command: ManagerCommand) {
    let (result, reply) = match command {
        ManagerCommand::Register {
            hotkey,
            combo,
            reply,
        } => (
            manager.register(hotkey).map_err(|e| host_error(&e, &combo)),
            reply,
        ),
        ManagerCommand::UnregisterAll {
            hotkeys,
            combos,
            reply,
        } => (
            manager
                .unregister_all(&hotkeys)
                .map_err(|e| host_error(&e, &combos)),
            reply,
        ),
    };

    // Nobody waiting (host dropped): log the outcome here.
    if let Err(unsent) = reply.send_blocking(result) {
        unsent.into_inner().warn_on_err();
    }
}

#[cfg(not(windows))]
fn next_command(inbox: &Receiver<ManagerCommand>) -> Option<ManagerCommand> {
    inbox.recv_blocking().ok()
}

/// WM_HOTKEY goes to the thread owning the manager's hidden window, so this
/// thread pumps Win32 messages while it waits for commands.
#[cfg(windows)]
fn next_command(inbox: &Receiver<ManagerCommand>) -> Option<ManagerCommand> {
    use async_channel::TryRecvError;

    loop {
        pump_messages();
        match inbox.try_recv() {
            Ok(command) => return Some(command),
            Err(TryRecvError::Empty) => std::thread::sleep(PUMP_INTERVAL),
            Err(TryRecvError::Closed) => return None,
        }
    }
}

#[cfg(windows)]
fn pump_messages() {
    use windows::Win32::UI::WindowsAndMessaging::{
        DispatchMessageW, PeekMessageW, TranslateMessage, MSG, PM_REMOVE,
    };

    unsafe {
        let mut msg = MSG::default();
        while PeekMessageW(&mut msg, None, 0, 0, PM_REMOVE).as_bool() {
            let _ = TranslateMessage(&msg);
            DispatchMessageW(&msg);
        }
    }
}

/// Parse a normalized combo with `global-hotkey`'s accelerator syntax
/// (understands `CmdOrCtrl`, `Alt`, `Shift`, `KeyR`/`R`, `F1`...).
pub fn parse_combo(combo: &str) -> Result<HotKey, HostError> {
    combo
        .parse::<HotKey>()
        .map_err(|e| HostError::InvalidCombo {
            combo: combo.to_string(),
            message: e.to_string(),
        })
}

fn map_state(state: HotKeyState) -> ShortcutState {
    match state {
        HotKeyState::Pressed => ShortcutState::Pressed,
        HotKeyState::Released => ShortcutState::Released,
    }
}

/// Translate a `global-hotkey` error, keeping the combo for context.
fn host_error(e: &HotkeyError, combo: &str) -> HostError {
    match e {
        HotkeyError::AlreadyRegistered(_) => HostError::AlreadyRegistered(combo.to_string()),
        HotkeyError::FailedToRegister(msg) => HostError::Rejected {
            combo: combo.to_string(),
            message: msg.to_string(),
        },
        HotkeyError::OsError(os_err) => HostError::Os {
            combo: combo.to_string(),
            message: os_err.to_string(),
        },
        other => HostError::Rejected {
            combo: combo.to_string(),
            message: other.to_string(),
        },
    }
}

fn start_event_pump() -> Result<(), HostError> {
    start_once(&EVENT_PUMP, spawn_event_pump)
}

/// Run `start` at most once per `cell`, even with concurrent callers. Every
/// caller gets the outcome of that single run.
fn start_once(
    cell: &OnceLock<Result<(), HostError>>,
    start: impl FnOnce() -> Result<(), HostError>,
) -> Result<(), HostError> {
    cell.get_or_init(start).clone()
}

fn spawn_event_pump() -> Result<(), HostError> {
    std::thread::Builder::new()
        .name("hotkey-events".to_string())
        .spawn(|| {
            let receiver = GlobalHotKeyEvent::receiver();
            while let Ok(event) = receiver.recv() {
                dispatch_event(event.id, map_state(event.state));
            }
            warn!("Global hotkey event channel closed, event pump stopped");
        })
        .map(|_| ())
        .map_err(|e| HostError::Unavailable(format!("failed to start event pump: {}", e)))
}

fn dispatch_event(hotkey_id: u32, state: ShortcutState) {
    let Some(routes) = active_routes().lock().upgrade() else {
        debug!(hotkey_id, "Hotkey event with no active host");
        return;
    };

    // Release the table lock before running the callback.
    let target = routes
        .lock()
        .get(&hotkey_id)
        .map(|route| (route.combo.clone(), route.callback.clone()));

    match target {
        Some((combo, callback)) => callback(ShortcutEvent::new(combo, state)),
        None => debug!(hotkey_id, %state, "Hotkey event for unknown id"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn accelerator_aliases_parse_to_same_hotkey() {
        let a = parse_combo("CmdOrCtrl+Shift+R").unwrap();
        let b = parse_combo("CommandOrControl+Shift+R").unwrap();
        assert_eq!(a.id(), b.id());
    }

    #[test]
    fn normalized_defaults_parse() {
        for combo in ["CmdOrCtrl+Shift+R", "CmdOrCtrl+Shift+V", "CmdOrCtrl+Shift+O", "Alt+F9"] {
            assert!(parse_combo(combo).is_ok(), "{combo} should parse");
        }
    }

    #[test]
    fn unknown_key_is_invalid_combo() {
        let err = parse_combo("CmdOrCtrl+NotAKey").unwrap_err();
        assert!(matches!(err, HostError::InvalidCombo { ref combo, .. } if combo == "CmdOrCtrl+NotAKey"));
    }

    #[test]
    fn hotkey_states_map_one_to_one() {
        assert_eq!(map_state(HotKeyState::Pressed), ShortcutState::Pressed);
        assert_eq!(map_state(HotKeyState::Released), ShortcutState::Released);
    }

    #[test]
    fn registration_errors_keep_the_combo() {
        let hotkey = parse_combo("Alt+K").unwrap();
        assert_eq!(
            host_error(&HotkeyError::AlreadyRegistered(hotkey), "Alt+K"),
            HostError::AlreadyRegistered("Alt+K".to_string())
        );

        let rejected = host_error(&HotkeyError::FailedToRegister("reserved".into()), "Alt+K");
        assert_eq!(
            rejected.to_string(),
            "System rejected hotkey 'Alt+K': reserved"
        );
    }

    #[test]
    fn events_route_to_the_active_table() {
        let hits = Arc::new(AtomicUsize::new(0));
        let counter = hits.clone();
        let hotkey = parse_combo("Alt+Shift+F7").unwrap();

        let routes: Arc<RouteTable> = Arc::default();
        routes.lock().insert(
            hotkey.id(),
            Route {
                combo: "Alt+Shift+F7".to_string(),
                hotkey,
                callback: Arc::new(move |event: ShortcutEvent| {
                    assert_eq!(event.combo, "Alt+Shift+F7");
                    if event.is_pressed() {
                        counter.fetch_add(1, Ordering::SeqCst);
                    }
                }),
            },
        );
        *active_routes().lock() = Arc::downgrade(&routes);

        dispatch_event(hotkey.id(), ShortcutState::Pressed);
        dispatch_event(hotkey.id(), ShortcutState::Released);
        dispatch_event(hotkey.id().wrapping_add(1), ShortcutState::Pressed);
        assert_eq!(hits.load(Ordering::SeqCst), 1);

        drop(routes);
        dispatch_event(hotkey.id(), ShortcutState::Pressed);
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    /// Host wired to a stand-in manager thread that accepts every request.
    fn host_with_stub_manager() -> GlobalHotkeyHost {
        let (commands, inbox) = async_channel::unbounded::<ManagerCommand>();
        std::thread::spawn(move || {
            while let Ok(command) = inbox.recv_blocking() {
                let reply = match command {
                    ManagerCommand::Register { reply, .. }
                    | ManagerCommand::UnregisterAll { reply, .. } => reply,
                };
                let _ = reply.send_blocking(Ok(()));
            }
        });
        GlobalHotkeyHost {
            commands,
            routes: Arc::default(),
        }
    }

    #[test]
    fn host_can_be_shared_across_threads() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<GlobalHotkeyHost>();
        assert_send_sync::<ManagerCommand>();
    }

    #[tokio::test]
    async fn register_and_clear_go_through_the_manager_thread() {
        let host = host_with_stub_manager();
        host.register("CmdOrCtrl+Shift+R", Arc::new(|_: ShortcutEvent| {}))
            .await
            .unwrap();
        host.register("Alt+F9", Arc::new(|_: ShortcutEvent| {}))
            .await
            .unwrap();

        let mut combos = host.registered_combos();
        combos.sort();
        assert_eq!(combos, vec!["Alt+F9", "CmdOrCtrl+Shift+R"]);

        host.unregister_all().await.unwrap();
        assert!(host.registered_combos().is_empty());
    }

    #[tokio::test]
    async fn unparsable_combo_fails_before_the_manager() {
        let host = host_with_stub_manager();
        let err = host
            .register("CmdOrCtrl+NotAKey", Arc::new(|_: ShortcutEvent| {}))
            .await
            .unwrap_err();
        assert!(matches!(err, HostError::InvalidCombo { .. }));
        assert!(host.registered_combos().is_empty());
    }

    #[tokio::test]
    async fn stopped_manager_reports_unavailable() {
        let (commands, inbox) = async_channel::unbounded::<ManagerCommand>();
        drop(inbox);
        let host = GlobalHotkeyHost {
            commands,
            routes: Arc::default(),
        };

        let err = host
            .register("Alt+K", Arc::new(|_: ShortcutEvent| {}))
            .await
            .unwrap_err();
        assert_eq!(err, manager_gone());
        assert!(host.registered_combos().is_empty());
    }

    #[test]
    fn concurrent_starts_run_once() {
        let cell = OnceLock::new();
        let starts = AtomicUsize::new(0);

        std::thread::scope(|scope| {
            for _ in 0..8 {
                scope.spawn(|| {
                    start_once(&cell, || {
                        starts.fetch_add(1, Ordering::SeqCst);
                        std::thread::sleep(std::time::Duration::from_millis(10));
                        Ok(())
                    })
                    .unwrap();
                });
            }
        });

        assert_eq!(starts.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn failed_start_is_reported_to_every_caller() {
        let cell = OnceLock::new();
        let first = start_once(&cell, || Err(HostError::Unavailable("no threads".into())));
        let second = start_once(&cell, || Ok(()));
        assert_eq!(first, second);
        assert!(second.is_err());
    }

    /// Registers with the real OS service; needs a display session.
    #[cfg(feature = "system-tests")]
    #[tokio::test]
    async fn real_host_registers_and_clears() {
        let host = GlobalHotkeyHost::new().expect("hotkey manager");
        host.register("CmdOrCtrl+Alt+Shift+F12", Arc::new(|_: ShortcutEvent| {}))
            .await
            .expect("register");
        assert_eq!(host.registered_combos(), vec!["CmdOrCtrl+Alt+Shift+F12"]);

        host.unregister_all().await.expect("unregister");
        assert!(host.registered_combos().is_empty());
    }
}
