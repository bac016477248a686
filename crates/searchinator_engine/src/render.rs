use std::time::Duration;

use crate::{LaunchMode, RenderError};

/// Starts the one rendering backend a run uses.
#[async_trait::async_trait]
pub trait BackendLauncher: Send + Sync {
    async fn launch(&self, mode: LaunchMode) -> Result<Box<dyn RenderBackend>, RenderError>;
}

/// A launched backend. Sessions opened on it never share cookies or identity.
#[async_trait::async_trait]
pub trait RenderBackend: Send + Sync {
    async fn open_session(&self, identity: &str) -> Result<Box<dyn RenderSession>, RenderError>;

    async fn shutdown(&self) -> Result<(), RenderError>;
}

/// One isolated browsing context.
#[async_trait::async_trait]
pub trait RenderSession: Send {
    /// Loads `url` and waits for the initial load to finish.
    async fn navigate(&mut self, url: &str) -> Result<(), RenderError>;

    /// Waits for content matching `selector`. Gives up with a
    /// [`crate::RenderErrorKind::Timeout`] error after `timeout`.
    async fn wait_for_marker(&mut self, selector: &str, timeout: Duration)
        -> Result<(), RenderError>;

    /// Link targets of every element matching `selector`, in document order.
    async fn extract_links(&mut self, selector: &str) -> Result<Vec<String>, RenderError>;

    async fn close(&mut self) -> Result<(), RenderError>;
}
