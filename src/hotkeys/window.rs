//! Control over the application's primary window.

use async_trait::async_trait;

/// The window the `open_app` binding brings forward.
#[async_trait]
pub trait MainWindow: Send + Sync {
    /// Make the window visible and raise it above other windows.
    async fn show(&self) -> anyhow::Result<()>;

    /// Give the window keyboard focus.
    async fn set_focus(&self) -> anyhow::Result<()>;
}
