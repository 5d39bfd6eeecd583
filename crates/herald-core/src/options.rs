use serde::{Deserialize, Serialize};

use crate::notification::SignatureMode;

/// Construction-time settings of an [`Event`](crate::Event).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct EventOptions {
    /// Suppress diagnostics below `ERROR`.
    #[serde(default)]
    pub silent: bool,

    #[serde(default)]
    pub signature_mode: SignatureMode,

    /// Deliver at most one firing; late subscribers receive it on subscribe.
    #[serde(default)]
    pub fire_once: bool,

    /// Return subscriber failures from `fire` instead of swallowing them.
    #[serde(default)]
    pub rethrow_errors: bool,
}
