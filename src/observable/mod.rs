//! The `observable` module provides the building blocks for creating observables
//! and consuming them.

mod from_event;

pub use from_event::from_event;

use std::{
    error::Error,
    fmt,
    future::Future,
    panic::{self, AssertUnwindSafe},
    sync::{Arc, Mutex},
};

use tokio::sync::oneshot;

use crate::{
    errors::{ObservableErr, ObservableError},
    observer::Observer,
    subscription::subscribe::{
        lock, Subscribeable, Subscriber, Subscription, UnsubscribeLogic,
    },
};

type Producer<T> =
    dyn Fn(Subscriber<T>) -> Result<UnsubscribeLogic, ObservableErr> + Send + Sync;

/// The `Observable` struct represents a lazy source of values that can be observed.
///
/// An `Observable` only holds a producer function. Nothing runs until `subscribe`
/// is called, and every `subscribe` call runs the producer again with a fresh
/// `Subscriber`, so subscriptions never share execution state. Cloning an
/// `Observable` is cheap and shares the producer only.
///
/// The producer emits through the `Subscriber` it receives and returns the
/// [`UnsubscribeLogic`] that stops it. That logic runs exactly once, either on
/// `unsubscribe()` or right after the producer signals `error` or `complete`.
///
/// # Example: basic synchronous `Observable`
///
/// ```no_run
/// use rxcore::subscribe::{Subscriber, UnsubscribeLogic};
/// use rxcore::{Observable, Observer, Subscribeable};
///
/// // Create a custom observable that emits values from 1 to 10.
/// let emit_10_observable = Observable::new(|mut subscriber| {
///     for i in 1..=10 {
///         subscriber.next(i);
///     }
///     subscriber.complete();
///
///     // Nothing to clean up.
///     UnsubscribeLogic::Nil
/// });
///
/// let mut observer = Subscriber::on_next(|v| println!("Emitted {}", v));
/// observer.on_complete(|| println!("Completed"));
///
/// // Observables are cold, nothing is emitted before this call.
/// emit_10_observable.subscribe(observer);
/// ```
///
/// # Example: asynchronous `Observable` with `unsubscribe`
///
/// ```no_run
/// use std::{sync::mpsc, time::Duration};
///
/// use rxcore::subscribe::{Subscriber, UnsubscribeLogic, Unsubscribeable};
/// use rxcore::{Observable, Observer, Subscribeable};
///
/// let observable = Observable::new(|mut o| {
///     let (tx, rx) = mpsc::channel::<()>();
///
///     std::thread::spawn(move || {
///         for i in 0.. {
///             // Stop as soon as the unsubscribe logic signals.
///             if rx.try_recv().is_ok() {
///                 break;
///             }
///             o.next(i);
///             std::thread::sleep(Duration::from_millis(1));
///         }
///     });
///
///     UnsubscribeLogic::logic(move || {
///         let _ = tx.send(());
///     })
/// });
///
/// let subscription = observable.subscribe(Subscriber::on_next(|v| println!("Emitted {}", v)));
/// std::thread::sleep(Duration::from_millis(20));
/// subscription.unsubscribe();
/// ```
pub struct Observable<T> {
    producer: Arc<Producer<T>>,
}

impl<T: Send + 'static> Observable<T> {
    /// Creates a new `Observable` with the provided producer function.
    ///
    /// The producer is invoked once per `subscribe` call, synchronously, with the
    /// `Subscriber` of that subscription. A panic inside the producer is caught and
    /// delivered to the subscriber as [`ObservableError::ProducerPanicked`]. A panic
    /// raised by one of the subscriber's handlers is not caught; it reaches the
    /// caller of `subscribe`.
    pub fn new(
        producer: impl Fn(Subscriber<T>) -> UnsubscribeLogic + Send + Sync + 'static,
    ) -> Self {
        Observable {
            producer: Arc::new(move |s| Ok(producer(s))),
        }
    }

    /// Creates a new `Observable` from a producer that can fail while subscribing.
    ///
    /// An `Err` returned by the producer is delivered to the subscriber's `error`
    /// handler and closes the subscription; `subscribe` itself does not fail.
    pub fn try_new<E>(
        producer: impl Fn(Subscriber<T>) -> Result<UnsubscribeLogic, E> + Send + Sync + 'static,
    ) -> Self
    where
        E: Error + Send + Sync + 'static,
    {
        Observable {
            producer: Arc::new(move |s| producer(s).map_err(|e| Arc::new(e) as ObservableErr)),
        }
    }

    /// An `Observable` that completes immediately without emitting.
    #[must_use]
    pub fn empty() -> Self {
        Observable::new(|mut s| {
            s.complete();
            UnsubscribeLogic::Nil
        })
    }

    /// An `Observable` that never emits and never terminates.
    ///
    /// The subscriber is kept alive until the subscription is unsubscribed.
    #[must_use]
    pub fn never() -> Self {
        Observable::new(|s| UnsubscribeLogic::logic(move || drop(s)))
    }

    /// An `Observable` that signals `error` immediately.
    #[must_use]
    pub fn throw(error: ObservableErr) -> Self {
        Observable::new(move |mut s| {
            s.error(Arc::clone(&error));
            UnsubscribeLogic::Nil
        })
    }

    /// Subscribes with `next_fn` and resolves once the observable terminates.
    ///
    /// The returned future yields `Ok(())` on `complete` and the emitted error on
    /// `error`. If the producer drops its subscriber without terminating, it yields
    /// [`ObservableError::Abandoned`].
    ///
    /// The subscription starts right away, not when the future is first polled.
    pub fn for_each(
        &self,
        next_fn: impl FnMut(T) + Send + 'static,
    ) -> impl Future<Output = Result<(), ObservableErr>> + Send + 'static {
        let (tx, rx) = oneshot::channel();
        let tx = Arc::new(Mutex::new(Some(tx)));
        let tx_c = Arc::clone(&tx);

        self.subscribe(Subscriber::new(
            next_fn,
            move |e| {
                if let Some(tx) = lock(&tx).take() {
                    let _ = tx.send(Err(e));
                }
            },
            move || {
                if let Some(tx) = lock(&tx_c).take() {
                    let _ = tx.send(Ok(()));
                }
            },
        ));

        async move {
            rx.await
                .unwrap_or_else(|_| Err(Arc::new(ObservableError::Abandoned) as ObservableErr))
        }
    }
}

impl<T> Clone for Observable<T> {
    fn clone(&self) -> Self {
        Observable {
            producer: Arc::clone(&self.producer),
        }
    }
}

impl<T> fmt::Debug for Observable<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Observable").finish_non_exhaustive()
    }
}

/// Emits every collected value in order, then completes.
impl<T> FromIterator<T> for Observable<T>
where
    T: Clone + Send + Sync + 'static,
{
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let values: Arc<[T]> = iter.into_iter().collect();

        Observable::new(move |mut s| {
            for v in values.iter() {
                if s.is_closed() {
                    break;
                }
                s.next(v.clone());
            }
            s.complete();
            UnsubscribeLogic::Nil
        })
    }
}

impl<T: Send + 'static> Subscribeable for Observable<T> {
    type ObsType = T;

    fn subscribe(&self, s: Subscriber<Self::ObsType>) -> Subscription {
        let subscription = s.subscription();
        let mut sink = s.clone();

        tracing::trace!("subscribing to observable");
        match panic::catch_unwind(AssertUnwindSafe(|| (self.producer)(s))) {
            Ok(Ok(unsubscribe_logic)) => subscription.attach(unsubscribe_logic),
            Ok(Err(e)) => {
                tracing::debug!(error = %e, "producer failed, routing error to subscriber");
                sink.error(e);
            }
            // Panics raised by the subscriber's own handlers belong to the caller.
            Err(payload) if sink.take_handler_panic() => panic::resume_unwind(payload),
            Err(payload) => {
                let e = ObservableError::producer_panicked(&*payload);
                tracing::debug!(error = %e, "producer panicked, routing error to subscriber");
                sink.error(Arc::new(e));
            }
        }
        subscription
    }
}
