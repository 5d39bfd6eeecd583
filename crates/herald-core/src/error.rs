//! Event error types

use std::sync::Arc;

use thiserror::Error;

/// Error type returned by listener callbacks.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Debug, Clone, Error)]
pub enum Error {
    #[error("subscribe called without a callback on event '{event}'")]
    InvalidCallback { event: String },

    #[error("subscriber of event '{event}' failed: {source}")]
    SubscriberExecution {
        event: String,
        #[source]
        source: Arc<dyn std::error::Error + Send + Sync>,
    },
}

impl Error {
    pub(crate) fn subscriber(event: &str, source: BoxError) -> Self {
        Self::SubscriberExecution {
            event: event.to_string(),
            source: Arc::from(source),
        }
    }

    pub fn event_name(&self) -> &str {
        match self {
            Self::InvalidCallback { event } | Self::SubscriberExecution { event, .. } => event,
        }
    }

    pub fn is_subscriber_failure(&self) -> bool {
        matches!(self, Self::SubscriberExecution { .. })
    }
}

/// Failure raised by a panicking listener.
#[derive(Debug, Error)]
#[error("listener panicked: {0}")]
pub struct ListenerPanic(pub String);

pub type Result<T = ()> = std::result::Result<T, Error>;
