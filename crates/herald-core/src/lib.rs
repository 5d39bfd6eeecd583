//! Synchronous named events.
//!
//! An [`Event`] keeps an ordered list of [`Subscriber`]s and notifies them in
//! subscription order, on the caller's stack, each time it is fired. A
//! subscriber can halt the rest of a firing by returning
//! [`Propagation::Stop`]; a subscriber that fails (returns `Err` or panics)
//! is recorded in [`Event::last_error`] without affecting the others.
//!
//! ```
//! use herald_core::{Callback, Event, Notification, Propagation};
//!
//! let ready: Event<u32> = Event::new("ready", ());
//! ready
//!     .on(Callback::new(|_, notification: Notification<'_, u32, ()>| {
//!         if let Notification::List { name, args, .. } = notification {
//!             assert_eq!(name, "ready");
//!             assert_eq!(args, &[1, 2]);
//!         }
//!         Ok(Propagation::Continue)
//!     }))
//!     .unwrap();
//!
//! assert!(ready.fire([1, 2]).unwrap());
//! ```

mod diagnostics;
mod error;
mod event;
mod notification;
mod options;
mod subscriber;

pub use diagnostics::{Diagnostics, NoopDiagnostics, TracingDiagnostics};
pub use error::{BoxError, Error, ListenerPanic, Result};
pub use event::{Event, EventBuilder, Notifier, SubscribeNotice, SUBSCRIBE_EVENT};
pub use notification::{
    Context, ContextKind, ContextOverride, Notification, Propagation, SignatureMode,
    SignatureModeParseError,
};
pub use options::EventOptions;
pub use subscriber::{Callback, CallbackId, ListenerResult, Subscriber};
