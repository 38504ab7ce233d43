use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

/// Future returned by an [`AsyncHandler`].
pub type HandlerFuture = Pin<Box<dyn Future<Output = anyhow::Result<()>> + Send + 'static>>;

/// Application callback for a binding - uses `Arc<dyn Fn>` for repeated invocation.
pub type AsyncHandler = Arc<dyn Fn() -> HandlerFuture + Send + Sync>;

/// Wrap an async closure as an [`AsyncHandler`].
pub fn handler<F, Fut>(f: F) -> AsyncHandler
where
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
{
    Arc::new(move || -> HandlerFuture { Box::pin(f()) })
}

/// Handlers supplied by the application.
///
/// `open_app` is not part of the set: it always shows and focuses the main
/// window.
#[derive(Clone)]
pub struct HandlerSet {
    pub on_toggle: AsyncHandler,
    pub on_paste_last: AsyncHandler,
}

impl HandlerSet {
    pub fn new<T, TFut, P, PFut>(on_toggle: T, on_paste_last: P) -> Self
    where
        T: Fn() -> TFut + Send + Sync + 'static,
        TFut: Future<Output = anyhow::Result<()>> + Send + 'static,
        P: Fn() -> PFut + Send + Sync + 'static,
        PFut: Future<Output = anyhow::Result<()>> + Send + 'static,
    {
        Self {
            on_toggle: handler(on_toggle),
            on_paste_last: handler(on_paste_last),
        }
    }
}

impl fmt::Debug for HandlerSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HandlerSet").finish_non_exhaustive()
    }
}
