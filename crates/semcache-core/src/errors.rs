use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigError(pub String);

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::error::Error for ConfigError {}

/// Failure of a remote model call (embedding or generation).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProviderError {
    #[error("rate limited by {provider}: {message}")]
    RateLimited { provider: String, message: String },

    #[error("connection to {provider} failed: {message}")]
    ConnectionFailed { provider: String, message: String },

    #[error("{provider} call timed out: {message}")]
    TimedOut { provider: String, message: String },

    #[error("{provider} service error: {message}")]
    ServiceError { provider: String, message: String },
}

impl ProviderError {
    pub fn rate_limited(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::RateLimited {
            provider: provider.into(),
            message: message.into(),
        }
    }

    pub fn connection(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ConnectionFailed {
            provider: provider.into(),
            message: message.into(),
        }
    }

    pub fn timed_out(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::TimedOut {
            provider: provider.into(),
            message: message.into(),
        }
    }

    pub fn service(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ServiceError {
            provider: provider.into(),
            message: message.into(),
        }
    }

    /// Value persisted in `error_logs.error_type`.
    pub fn kind(&self) -> &'static str {
        match self {
            ProviderError::RateLimited { .. } => "RateLimited",
            ProviderError::ConnectionFailed { .. } => "ConnectionFailed",
            ProviderError::TimedOut { .. } => "TimedOut",
            ProviderError::ServiceError { .. } => "ServiceError",
        }
    }

    pub fn message(&self) -> &str {
        match self {
            ProviderError::RateLimited { message, .. }
            | ProviderError::ConnectionFailed { message, .. }
            | ProviderError::TimedOut { message, .. }
            | ProviderError::ServiceError { message, .. } => message,
        }
    }

    /// Maps a transport-level reqwest failure onto the taxonomy.
    pub fn from_transport(provider: &str, err: &reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::timed_out(provider, err.to_string())
        } else if err.is_connect() {
            Self::connection(provider, err.to_string())
        } else {
            Self::service(provider, err.to_string())
        }
    }

    /// Maps a non-success HTTP status onto the taxonomy.
    pub fn from_status(provider: &str, status: reqwest::StatusCode, body: &str) -> Self {
        let message = if body.trim().is_empty() {
            format!("HTTP {}", status.as_u16())
        } else {
            format!("HTTP {}: {}", status.as_u16(), body.trim())
        };
        match status.as_u16() {
            429 => Self::rate_limited(provider, message),
            408 | 504 => Self::timed_out(provider, message),
            _ => Self::service(provider, message),
        }
    }
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store unavailable: {0}")]
    Unavailable(String),

    #[error("store data corrupt: {0}")]
    Corrupt(String),
}

impl From<rusqlite::Error> for StoreError {
    fn from(e: rusqlite::Error) -> Self {
        StoreError::Unavailable(e.to_string())
    }
}

/// Terminal failure of one cache cycle.
#[derive(Debug, Error)]
pub enum CycleError {
    #[error("query is empty")]
    EmptyQuery,

    #[error("threshold must be a finite, non-negative distance (got {0})")]
    InvalidThreshold(f64),

    #[error("embedding failed: {0}")]
    EmbeddingFailed(#[source] ProviderError),

    #[error("generation failed: {0}")]
    GenerationFailed(#[source] ProviderError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl CycleError {
    /// Short machine-readable tag used by the CLI and structured logs.
    pub fn outcome(&self) -> &'static str {
        match self {
            CycleError::EmptyQuery | CycleError::InvalidThreshold(_) => "rejected",
            CycleError::EmbeddingFailed(_) => "embedding_failed",
            CycleError::GenerationFailed(_) => "generation_failed",
            CycleError::Store(_) => "store_unavailable",
        }
    }
}
