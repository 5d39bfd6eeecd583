use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::error::BoxError;
use crate::notification::{Context, ContextOverride, Notification, Propagation};

/// Value returned by a listener callback.
pub type ListenerResult = std::result::Result<Propagation, BoxError>;

type CallbackFn<A, P, C> =
    dyn Fn(Context<'_, P, C>, Notification<'_, A, P>) -> ListenerResult + Send + Sync;

/// Address-based identity of a [`Callback`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CallbackId(usize);

impl std::fmt::Display for CallbackId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "callback@{:#x}", self.0)
    }
}

/// Shared handle to a listener function.
///
/// Clones refer to the same function and compare equal; two handles built
/// from separate `Callback::new` calls never do, even for identical closures.
/// Keep a clone around to [`unsubscribe`](crate::Event::unsubscribe) later.
pub struct Callback<A, P = (), C = ()> {
    inner: Arc<CallbackFn<A, P, C>>,
}

impl<A, P, C> Callback<A, P, C> {
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(Context<'_, P, C>, Notification<'_, A, P>) -> ListenerResult + Send + Sync + 'static,
    {
        Self { inner: Arc::new(f) }
    }

    pub fn id(&self) -> CallbackId {
        CallbackId(Arc::as_ptr(&self.inner) as *const () as usize)
    }

    pub(crate) fn call(
        &self,
        context: Context<'_, P, C>,
        notification: Notification<'_, A, P>,
    ) -> ListenerResult {
        (self.inner)(context, notification)
    }
}

impl<A, P, C> Clone for Callback<A, P, C> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<A, P, C> PartialEq for Callback<A, P, C> {
    fn eq(&self, other: &Self) -> bool {
        self.id() == other.id()
    }
}

impl<A, P, C> Eq for Callback<A, P, C> {}

impl<A, P, C> std::fmt::Debug for Callback<A, P, C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("Callback").field(&self.id()).finish()
    }
}

/// A registered `(callback, payload, context policy)` triple.
///
/// Immutable once built. Removal from its event only flips the detached
/// flag, so an in-flight firing holding a snapshot can skip it.
pub struct Subscriber<A, P = (), C = ()> {
    callback: Callback<A, P, C>,
    payload: Option<P>,
    context: ContextOverride<C>,
    detached: AtomicBool,
}

impl<A, P, C> Subscriber<A, P, C> {
    pub fn new(
        callback: Callback<A, P, C>,
        payload: Option<P>,
        context: ContextOverride<C>,
    ) -> Self {
        Self {
            callback,
            payload,
            context,
            detached: AtomicBool::new(false),
        }
    }

    pub fn callback(&self) -> &Callback<A, P, C> {
        &self.callback
    }

    pub fn payload(&self) -> Option<&P> {
        self.payload.as_ref()
    }

    pub fn context_override(&self) -> &ContextOverride<C> {
        &self.context
    }

    /// Picks the context the callback runs with.
    ///
    /// `Payload` falls back to `default` when the subscriber has no payload.
    pub fn resolve_context<'a>(&'a self, default: &'a C) -> Context<'a, P, C> {
        match (&self.context, &self.payload) {
            (ContextOverride::Custom(context), _) => Context::Custom(context),
            (ContextOverride::Payload, Some(payload)) => Context::Payload(payload),
            _ => Context::Event(default),
        }
    }

    /// Callback identity match, narrowed by payload equality when one is given.
    pub fn matches(&self, callback: &Callback<A, P, C>, payload: Option<&P>) -> bool
    where
        P: PartialEq,
    {
        if self.callback != *callback {
            return false;
        }
        match payload {
            Some(payload) => self.payload.as_ref() == Some(payload),
            None => true,
        }
    }

    pub fn is_detached(&self) -> bool {
        self.detached.load(Ordering::Acquire)
    }

    pub(crate) fn detach(&self) {
        self.detached.store(true, Ordering::Release);
    }
}

impl<A, P: std::fmt::Debug, C: std::fmt::Debug> std::fmt::Debug for Subscriber<A, P, C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscriber")
            .field("callback", &self.callback)
            .field("payload", &self.payload)
            .field("context", &self.context)
            .field("detached", &self.is_detached())
            .finish()
    }
}
