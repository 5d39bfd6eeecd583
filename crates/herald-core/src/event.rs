use std::marker::PhantomData;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::Level;

use crate::diagnostics::{Diagnostics, TracingDiagnostics};
use crate::error::{BoxError, Error, ListenerPanic, Result};
use crate::notification::{ContextKind, ContextOverride, Notification, Propagation, SignatureMode};
use crate::options::EventOptions;
use crate::subscriber::{Callback, CallbackId, Subscriber};

/// Reserved name of the per-event subscription notifier.
pub const SUBSCRIBE_EVENT: &str = "herald:subscribe";

const LOG_SOURCE: &str = "event";

/// Announced on an event's [subscribe notifier](Event::subscribe_notifier)
/// before a new subscription is registered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubscribeNotice {
    /// Name of the event being subscribed to.
    pub event: Arc<str>,
    pub callback: CallbackId,
    pub has_payload: bool,
    pub context: ContextKind,
}

/// Subscribe notifier of an event; its context is the parent event's name.
pub type Notifier = Event<SubscribeNotice, (), Arc<str>>;

struct State<A, P, C> {
    subscribers: Vec<Arc<Subscriber<A, P, C>>>,
    has_fired: bool,
    fired_args: Option<Arc<[A]>>,
}

/// A named, synchronous notification point.
///
/// `A` is the argument type of a firing, `P` the per-subscriber payload and
/// `C` the execution context handed to callbacks. Every method takes `&self`
/// and no lock is held while a callback runs, so callbacks may subscribe,
/// unsubscribe or fire on the event that is notifying them.
pub struct Event<A, P = (), C = ()> {
    name: Arc<str>,
    context: C,
    options: EventOptions,
    diagnostics: Arc<dyn Diagnostics>,
    state: Mutex<State<A, P, C>>,
    last_error: Mutex<Option<Error>>,
    notifier: Option<Box<Notifier>>,
}

impl<A, P, C> Event<A, P, C> {
    pub fn new(name: impl Into<String>, context: C) -> Self {
        EventBuilder::new(name, context).build()
    }

    pub fn with_options(name: impl Into<String>, context: C, options: EventOptions) -> Self {
        EventBuilder::new(name, context).options(options).build()
    }

    pub fn builder(name: impl Into<String>, context: C) -> EventBuilder<A, P, C> {
        EventBuilder::new(name, context)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn context(&self) -> &C {
        &self.context
    }

    pub fn options(&self) -> &EventOptions {
        &self.options
    }

    pub fn signature_mode(&self) -> SignatureMode {
        self.options.signature_mode
    }

    pub fn is_silent(&self) -> bool {
        self.options.silent
    }

    pub fn is_fire_once(&self) -> bool {
        self.options.fire_once
    }

    pub fn has_fired(&self) -> bool {
        self.state.lock().has_fired
    }

    /// Arguments of the first firing of a fire-once event.
    pub fn fired_args(&self) -> Option<Arc<[A]>> {
        self.state.lock().fired_args.clone()
    }

    pub fn subscriber_count(&self) -> usize {
        self.state.lock().subscribers.len()
    }

    /// Most recent listener failure caught by the latest `fire`.
    pub fn last_error(&self) -> Option<Error> {
        self.last_error.lock().clone()
    }

    /// Absent only on the notifier events themselves.
    pub fn subscribe_notifier(&self) -> Option<&Notifier> {
        self.notifier.as_deref()
    }

    /// Detaches every subscriber and returns how many there were.
    pub fn unsubscribe_all(&self) -> usize {
        let mut state = self.state.lock();
        let count = state.subscribers.len();
        for subscriber in state.subscribers.drain(..).rev() {
            subscriber.detach();
        }
        count
    }

    fn emit(&self, level: Level, message: &str) {
        if self.options.silent && level != Level::ERROR {
            return;
        }
        self.diagnostics.log(level, LOG_SOURCE, message);
    }

    /// Registers `callback`, or delivers the captured firing immediately when
    /// this is a fire-once event that already fired.
    pub fn subscribe(
        &self,
        callback: Option<Callback<A, P, C>>,
        payload: Option<P>,
        context: ContextOverride<C>,
    ) -> Result<()> {
        let Some(callback) = callback else {
            return Err(Error::InvalidCallback {
                event: self.name.to_string(),
            });
        };

        if let Some(notifier) = &self.notifier {
            notifier.fire([SubscribeNotice {
                event: Arc::clone(&self.name),
                callback: callback.id(),
                has_payload: payload.is_some(),
                context: context.kind(),
            }])?;
        }

        let subscriber = Arc::new(Subscriber::new(callback, payload, context));

        // fired_args is only ever set on a fire-once event that has fired
        let fired_args = {
            let mut state = self.state.lock();
            let fired_args = state.fired_args.clone();
            if fired_args.is_none() {
                state.subscribers.push(Arc::clone(&subscriber));
            }
            fired_args
        };

        if let Some(args) = fired_args {
            self.emit(
                Level::DEBUG,
                &format!("'{}' already fired, delivering to late subscriber", self.name),
            );
            self.notify(&subscriber, &args)?;
        }

        Ok(())
    }

    /// Subscribes `callback` with no payload and the default context.
    pub fn on(&self, callback: Callback<A, P, C>) -> Result<()> {
        self.subscribe(Some(callback), None, ContextOverride::Default)
    }

    /// Removes every subscriber matching `callback` (and `payload`, when given).
    ///
    /// Without a payload all subscriptions of `callback` go, whatever their
    /// payload. Without a callback this is [`unsubscribe_all`](Self::unsubscribe_all).
    ///
    /// Payloads are compared with `P::eq` while the subscriber list is locked,
    /// so that `PartialEq` impl must not call back into this event.
    pub fn unsubscribe(&self, callback: Option<&Callback<A, P, C>>, payload: Option<&P>) -> bool
    where
        P: PartialEq,
    {
        let Some(callback) = callback else {
            return self.unsubscribe_all() > 0;
        };

        let mut state = self.state.lock();
        let before = state.subscribers.len();
        state.subscribers.retain(|subscriber| {
            if subscriber.matches(callback, payload) {
                subscriber.detach();
                false
            } else {
                true
            }
        });
        state.subscribers.len() != before
    }

    /// Notifies subscribers in subscription order.
    ///
    /// Returns `Ok(false)` when a subscriber stopped propagation. Listener
    /// failures are kept in [`last_error`](Self::last_error) and only
    /// returned as `Err` when the event rethrows errors.
    ///
    /// A panicking listener is caught, but the process panic hook still runs
    /// first and by default prints the panic to stderr, outside the event's
    /// [`Diagnostics`]. Install a quiet hook with `std::panic::set_hook` to
    /// silence it.
    pub fn fire(&self, args: impl IntoIterator<Item = A>) -> Result<bool> {
        *self.last_error.lock() = None;
        let args: Arc<[A]> = args.into_iter().collect();

        let snapshot = {
            let mut state = self.state.lock();
            if self.options.fire_once {
                if state.has_fired {
                    return Ok(true);
                }
                state.fired_args = Some(Arc::clone(&args));
            }
            state.has_fired = true;

            if state.subscribers.is_empty() && self.options.silent {
                return Ok(true);
            }
            state.subscribers.clone()
        };

        self.emit(
            Level::DEBUG,
            &format!("firing '{}' to {} subscriber(s)", self.name, snapshot.len()),
        );

        let mut propagation = Propagation::Continue;
        for subscriber in &snapshot {
            if subscriber.is_detached() {
                continue;
            }
            propagation = self.notify(subscriber, &args)?;
            if propagation.is_stop() {
                self.emit(
                    Level::DEBUG,
                    &format!(
                        "'{}' propagation stopped by {}",
                        self.name,
                        subscriber.callback().id()
                    ),
                );
                break;
            }
        }

        Ok(!propagation.is_stop())
    }

    /// Panics are caught after the panic hook has run; see [`fire`](Self::fire).
    fn notify(&self, subscriber: &Subscriber<A, P, C>, args: &[A]) -> Result<Propagation> {
        let context = subscriber.resolve_context(&self.context);
        let notification = Notification::new(
            self.options.signature_mode,
            &self.name,
            args,
            subscriber.payload(),
        );

        let failure: BoxError = match panic::catch_unwind(AssertUnwindSafe(|| {
            subscriber.callback().call(context, notification)
        })) {
            Ok(Ok(propagation)) => return Ok(propagation),
            Ok(Err(err)) => err,
            Err(panic) => Box::new(ListenerPanic(panic_message(panic.as_ref()))),
        };

        let error = Error::subscriber(&self.name, failure);
        self.emit(
            Level::ERROR,
            &format!("{} subscriber exception: {}", self.name, error),
        );
        *self.last_error.lock() = Some(error.clone());

        if self.options.rethrow_errors {
            return Err(error);
        }
        Ok(Propagation::Continue)
    }
}

impl<A, P, C> std::fmt::Debug for Event<A, P, C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state.lock();
        f.debug_struct("Event")
            .field("name", &self.name)
            .field("options", &self.options)
            .field("subscribers", &state.subscribers.len())
            .field("has_fired", &state.has_fired)
            .finish()
    }
}

impl<A, P, C> std::fmt::Display for Event<A, P, C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.name)
    }
}

fn panic_message(panic: &(dyn std::any::Any + Send)) -> String {
    if let Some(message) = panic.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message.clone()
    } else {
        "(non-string panic)".to_string()
    }
}

pub struct EventBuilder<A, P = (), C = ()> {
    name: String,
    context: C,
    options: EventOptions,
    diagnostics: Option<Arc<dyn Diagnostics>>,
    _marker: PhantomData<fn() -> (A, P)>,
}

impl<A, P, C> EventBuilder<A, P, C> {
    pub fn new(name: impl Into<String>, context: C) -> Self {
        Self {
            name: name.into(),
            context,
            options: EventOptions::default(),
            diagnostics: None,
            _marker: PhantomData,
        }
    }

    pub fn options(mut self, options: EventOptions) -> Self {
        self.options = options;
        self
    }

    pub fn silent(mut self, silent: bool) -> Self {
        self.options.silent = silent;
        self
    }

    pub fn signature(mut self, mode: SignatureMode) -> Self {
        self.options.signature_mode = mode;
        self
    }

    pub fn fire_once(mut self, fire_once: bool) -> Self {
        self.options.fire_once = fire_once;
        self
    }

    pub fn rethrow_errors(mut self, rethrow: bool) -> Self {
        self.options.rethrow_errors = rethrow;
        self
    }

    pub fn diagnostics(mut self, diagnostics: Arc<dyn Diagnostics>) -> Self {
        self.diagnostics = Some(diagnostics);
        self
    }

    pub fn build(self) -> Event<A, P, C> {
        let diagnostics = self
            .diagnostics
            .unwrap_or_else(|| Arc::new(TracingDiagnostics));

        let name: Arc<str> = Arc::from(self.name);
        let notifier = (&*name != SUBSCRIBE_EVENT).then(|| {
            Box::new(
                EventBuilder::new(SUBSCRIBE_EVENT, Arc::clone(&name))
                    .silent(true)
                    .rethrow_errors(self.options.rethrow_errors)
                    .diagnostics(Arc::clone(&diagnostics))
                    .build(),
            )
        });

        Event {
            name,
            context: self.context,
            options: self.options,
            diagnostics,
            state: Mutex::new(State {
                subscribers: Vec::new(),
                has_fired: false,
                fired_args: None,
            }),
            last_error: Mutex::new(None),
            notifier,
        }
    }
}
