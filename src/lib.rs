//! `rxcore` is the minimal core beneath a reactive library: cold observables,
//! subscribers that guard the notification lifecycle, and subscriptions that cancel
//! one execution.
//!
//! An [`Observable`] wraps a producer function and does nothing until it is
//! subscribed to. Each `subscribe` call runs the producer with a fresh
//! [`Subscriber`](subscribe::Subscriber). The producer emits zero or more `next`
//! notifications, then at most one `error` or `complete`. The returned
//! [`Subscription`](subscribe::Subscription) closes on that terminal notification
//! or when `unsubscribe()` is called, whichever happens first, and runs the
//! producer's unsubscribe logic exactly once.
//!
//! Events from any [`EventTarget`] can be turned into an observable with
//! [`from_event`].
//!
//! ```no_run
//! use rxcore::subscribe::{Subscriber, UnsubscribeLogic, Unsubscribeable};
//! use rxcore::{Observable, Observer, Subscribeable};
//!
//! let news = Observable::new(|mut o| {
//!     o.next("Weather forecast tomorrow is rainy.");
//!     o.next("Your local sports team won today.");
//!     o.complete();
//!     UnsubscribeLogic::Nil
//! });
//!
//! let subscription = news.subscribe(Subscriber::on_next(|update| println!("{}", update)));
//! assert!(subscription.is_closed());
//! ```

mod errors;
mod events;
mod observable;
mod observer;
mod subscription;

pub use errors::*;
pub use events::*;
pub use observable::*;
pub use observer::Observer;
pub use subscription::subscribe;
pub use subscription::subscribe::{Subscribeable, Unsubscribeable};
