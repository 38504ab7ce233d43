//! Registration of the application's global hotkeys.
//!
//! [`HotkeyRegistrar::register_hotkeys`] validates the settings, clears the
//! host's registry, then installs the three bindings in order. Each binding
//! gets its own press channel and consumer task (see [`dispatch`]).

mod dispatch;
mod global;
mod handlers;
mod host;
mod window;

use std::sync::Arc;

use tracing::{info, instrument, warn};

use crate::config::{DispatchConfig, HotkeySettings};
use crate::error::HotkeyError;
use crate::shortcuts::{self, Binding, BindingKind};

pub use dispatch::DispatchPolicy;
pub use global::{parse_combo, GlobalHotkeyHost};
pub use handlers::{handler, AsyncHandler, HandlerFuture, HandlerSet};
pub use host::{HostError, ShortcutCallback, ShortcutEvent, ShortcutHost, ShortcutState};
pub use window::MainWindow;

/// Drives registration of the three bindings against a [`ShortcutHost`].
///
/// The registrar keeps no record of what it registered before: every call
/// clears the whole host registry first.
pub struct HotkeyRegistrar {
    host: Arc<dyn ShortcutHost>,
    window: Arc<dyn MainWindow>,
    dispatch: DispatchConfig,
}

impl HotkeyRegistrar {
    pub fn new(host: Arc<dyn ShortcutHost>, window: Arc<dyn MainWindow>) -> Self {
        Self {
            host,
            window,
            dispatch: DispatchConfig::default(),
        }
    }

    pub fn with_dispatch(mut self, dispatch: DispatchConfig) -> Self {
        self.dispatch = dispatch;
        self
    }

    pub fn with_policy(mut self, policy: DispatchPolicy) -> Self {
        self.dispatch.policy = policy;
        self
    }

    pub fn dispatch(&self) -> DispatchConfig {
        self.dispatch
    }

    /// Validate `settings` and (re)install all three global hotkeys.
    ///
    /// Validation errors are returned before the host is touched. A host
    /// error is returned as-is; bindings registered before the failing one
    /// stay registered.
    ///
    /// Must be awaited inside a Tokio runtime.
    #[instrument(name = "register_hotkeys", skip_all)]
    pub async fn register_hotkeys(
        &self,
        settings: &HotkeySettings,
        handlers: &HandlerSet,
    ) -> Result<(), HotkeyError> {
        shortcuts::validate(settings)?;

        self.host.unregister_all().await?;

        let bindings = shortcuts::normalized_bindings(settings);
        let mut registered: Vec<BindingKind> = Vec::with_capacity(bindings.len());
        for binding in &bindings {
            if let Err(e) = self.install(binding, handlers).await {
                warn!(
                    binding = %binding.kind,
                    combo = %binding.combo,
                    error = %e,
                    still_registered = ?registered,
                    "Hotkey registration failed, earlier bindings remain active"
                );
                return Err(e.into());
            }
            registered.push(binding.kind);
        }

        let [record_toggle, paste_last, open_app] = &bindings;
        info!(
            record_toggle = %record_toggle.combo,
            paste_last = %paste_last.combo,
            open_app = %open_app.combo,
            policy = ?self.dispatch.policy,
            "Registered global hotkeys"
        );
        Ok(())
    }

    async fn install(&self, binding: &Binding, handlers: &HandlerSet) -> Result<(), HostError> {
        let (callback, presses) = dispatch::press_channel(binding.kind, self.dispatch.queue_capacity);
        self.host.register(binding.combo.as_str(), callback).await?;

        dispatch::spawn_consumer(
            binding.kind,
            presses,
            self.action_for(binding.kind, handlers),
            self.dispatch.policy,
        );
        Ok(())
    }

    fn action_for(&self, kind: BindingKind, handlers: &HandlerSet) -> AsyncHandler {
        match kind {
            BindingKind::RecordToggle => handlers.on_toggle.clone(),
            BindingKind::PasteLast => handlers.on_paste_last.clone(),
            BindingKind::OpenApp => open_app(self.window.clone()),
        }
    }
}

/// Bring the main window to the front and focus it.
fn open_app(window: Arc<dyn MainWindow>) -> AsyncHandler {
    handler(move || {
        let window = window.clone();
        async move {
            window.show().await?;
            window.set_focus().await
        }
    })
}
