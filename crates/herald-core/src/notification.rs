use serde::{Deserialize, Serialize};

/// Argument shape delivered to every subscriber of an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignatureMode {
    /// `(name, args, payload)`
    #[default]
    List,
    /// `(first_arg, payload)`
    Flat,
}

impl SignatureMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::List => "list",
            Self::Flat => "flat",
        }
    }
}

impl std::fmt::Display for SignatureMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for SignatureMode {
    type Err = SignatureModeParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "list" => Ok(Self::List),
            "flat" => Ok(Self::Flat),
            _ => Err(SignatureModeParseError(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, thiserror::Error)]
#[error("unknown signature mode: {0}")]
pub struct SignatureModeParseError(pub String);

/// What a callback receives when its event fires.
#[derive(Debug)]
pub enum Notification<'a, A, P> {
    Flat {
        arg: Option<&'a A>,
        payload: Option<&'a P>,
    },
    List {
        name: &'a str,
        args: &'a [A],
        payload: Option<&'a P>,
    },
}

impl<'a, A, P> Notification<'a, A, P> {
    pub(crate) fn new(
        mode: SignatureMode,
        name: &'a str,
        args: &'a [A],
        payload: Option<&'a P>,
    ) -> Self {
        match mode {
            SignatureMode::Flat => Self::Flat {
                arg: args.first(),
                payload,
            },
            SignatureMode::List => Self::List {
                name,
                args,
                payload,
            },
        }
    }

    pub fn payload(&self) -> Option<&'a P> {
        match self {
            Self::Flat { payload, .. } | Self::List { payload, .. } => *payload,
        }
    }

    /// The first argument of the firing, whichever shape it was delivered in.
    pub fn first(&self) -> Option<&'a A> {
        match self {
            Self::Flat { arg, .. } => *arg,
            Self::List { args, .. } => args.first(),
        }
    }
}

/// Returned by a callback to decide whether later subscribers run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Propagation {
    #[default]
    Continue,
    Stop,
}

impl Propagation {
    pub fn is_stop(&self) -> bool {
        matches!(self, Self::Stop)
    }
}

/// Context resolution policy of a subscriber.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContextOverride<C> {
    /// Use the event's default context.
    Default,
    /// Use the subscriber's payload as context.
    Payload,
    Custom(C),
}

impl<C> Default for ContextOverride<C> {
    fn default() -> Self {
        Self::Default
    }
}

impl<C> ContextOverride<C> {
    pub fn kind(&self) -> ContextKind {
        match self {
            Self::Default => ContextKind::Default,
            Self::Payload => ContextKind::Payload,
            Self::Custom(_) => ContextKind::Custom,
        }
    }
}

/// The context a callback runs with, as resolved for its subscriber.
#[derive(Debug)]
pub enum Context<'a, P, C> {
    /// The event's default context.
    Event(&'a C),
    Payload(&'a P),
    Custom(&'a C),
}

impl<'a, P, C> Context<'a, P, C> {
    /// The context object, unless the subscriber runs in its payload.
    pub fn value(&self) -> Option<&'a C> {
        match self {
            Self::Event(context) | Self::Custom(context) => Some(*context),
            Self::Payload(_) => None,
        }
    }

    pub fn is_payload(&self) -> bool {
        matches!(self, Self::Payload(_))
    }
}

/// [`ContextOverride`] without its value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContextKind {
    Default,
    Payload,
    Custom,
}
