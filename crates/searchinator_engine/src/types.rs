use std::fmt;

/// Whether the backend should show what it renders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LaunchMode {
    #[default]
    Headless,
    Visible,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{kind}: {message}")]
pub struct RenderError {
    pub kind: RenderErrorKind,
    pub message: String,
}

impl RenderError {
    pub fn new(kind: RenderErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    /// Timeouts are soft while waiting for a content marker.
    pub fn is_timeout(&self) -> bool {
        self.kind == RenderErrorKind::Timeout
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderErrorKind {
    Launch,
    Session,
    InvalidUrl,
    HttpStatus(u16),
    Timeout,
    Network,
    TooLarge { max_bytes: u64, actual: Option<u64> },
    Decode,
    Selector,
}

impl fmt::Display for RenderErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RenderErrorKind::Launch => write!(f, "launch failed"),
            RenderErrorKind::Session => write!(f, "session error"),
            RenderErrorKind::InvalidUrl => write!(f, "invalid url"),
            RenderErrorKind::HttpStatus(code) => write!(f, "http status {code}"),
            RenderErrorKind::Timeout => write!(f, "timeout"),
            RenderErrorKind::Network => write!(f, "network error"),
            RenderErrorKind::TooLarge { max_bytes, actual } => {
                write!(f, "response too large (max {max_bytes}, actual {actual:?})")
            }
            RenderErrorKind::Decode => write!(f, "decode error"),
            RenderErrorKind::Selector => write!(f, "invalid selector"),
        }
    }
}
