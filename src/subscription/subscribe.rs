use std::{
    collections::VecDeque,
    fmt,
    future::Future,
    mem,
    panic::{self, AssertUnwindSafe},
    pin::Pin,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc, Mutex, MutexGuard, PoisonError,
    },
    thread::{self, ThreadId},
};

use tokio::runtime;

use crate::{errors::ObservableErr, observer::Observer};

/// A trait for types that can be subscribed to, allowing consumers to receive
/// values emitted by an observable stream.
pub trait Subscribeable {
    /// The type of items emitted by the observable stream.
    type ObsType;

    /// Subscribes to the observable stream and specifies how to handle emitted values.
    ///
    /// Every call starts an independent execution of the stream. The `Subscriber`
    /// passed in receives the notifications of that execution only.
    ///
    /// # Arguments
    ///
    /// - `s`: A `Subscriber` that handles emitted values and other events from
    ///        the observable stream.
    ///
    /// # Returns
    ///
    /// A `Subscription` that represents this one execution. Use it to cancel the
    /// execution or to check whether it is still running.
    fn subscribe(&self, s: Subscriber<Self::ObsType>) -> Subscription;
}

/// A trait for types that can be unsubscribed, allowing the clean release of resources
/// associated with a subscription.
pub trait Unsubscribeable {
    /// Closes the subscription and runs its unsubscribe logic.
    ///
    /// The first call closes the subscription, drops the subscriber's handlers and
    /// runs the unsubscribe logic once. Any later call is a no-op. Once closed, the
    /// subscriber drops every notification the producer still sends.
    ///
    /// A panic raised by the unsubscribe logic propagates to the caller.
    fn unsubscribe(&self);

    /// Returns `true` once the subscription has been unsubscribed or the observable
    /// has signaled `error` or `complete`.
    fn is_closed(&self) -> bool;
}

// Handler panics poison the mutex; later notifications must still be routed.
pub(crate) fn lock<T: ?Sized>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

type NextFn<T> = Box<dyn FnMut(T) + Send>;
type ErrorFn = Box<dyn FnOnce(ObservableErr) + Send>;
type CompleteFn = Box<dyn FnOnce() + Send>;

struct Handlers<T> {
    next_fn: Option<NextFn<T>>,
    error_fn: Option<ErrorFn>,
    complete_fn: Option<CompleteFn>,
}

impl<T> Default for Handlers<T> {
    fn default() -> Self {
        Handlers {
            next_fn: None,
            error_fn: None,
            complete_fn: None,
        }
    }
}

impl<T> Handlers<T> {
    fn terminate(self, notification: Notification<T>) {
        match notification {
            Notification::Next(_) => (),
            Notification::Error(e) => {
                if let Some(error_fn) = self.error_fn {
                    error_fn(e);
                }
            }
            Notification::Complete => {
                if let Some(complete_fn) = self.complete_fn {
                    complete_fn();
                }
            }
        }
    }
}

enum Notification<T> {
    Next(T),
    Error(ObservableErr),
    Complete,
}

/// Handler slots together with the notifications waiting for delivery.
///
/// Handlers always run with the lock released. A notification that arrives while
/// another one is being delivered, from inside a handler or from another thread,
/// is queued and delivered by the caller that is already emitting.
struct Sink<T> {
    handlers: Handlers<T>,
    pending: VecDeque<Notification<T>>,
    emitting: bool,
    released: bool,
    handler_panicked: Option<ThreadId>,
}

impl<T> Sink<T> {
    fn new(handlers: Handlers<T>) -> Self {
        Sink {
            handlers,
            pending: VecDeque::new(),
            emitting: false,
            released: false,
            handler_panicked: None,
        }
    }

    fn release(&mut self) {
        self.released = true;
        self.handlers = Handlers::default();
        self.pending.clear();
    }
}

/// Lets a `Subscription` drop the handlers of a subscriber of any item type.
trait ReleaseHandlers: Send + Sync {
    fn release_handlers(&self);
}

impl<T: Send> ReleaseHandlers for Mutex<Sink<T>> {
    fn release_handlers(&self) {
        lock(self).release();
    }
}

/// State shared by a `Subscriber` and the `Subscription` returned for it.
struct SubscriptionState {
    closed: AtomicBool,
    teardown: Mutex<Option<UnsubscribeLogic>>,
    runtime_handle: Option<runtime::Handle>,
}

impl SubscriptionState {
    fn new() -> Self {
        SubscriptionState {
            closed: AtomicBool::new(false),
            teardown: Mutex::new(None),
            runtime_handle: runtime::Handle::try_current().ok(),
        }
    }

    fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    // Returns `false` if the state was already closed.
    fn close(&self) -> bool {
        !self.closed.swap(true, Ordering::AcqRel)
    }

    fn run_teardown(&self) {
        let teardown = lock(&self.teardown).take();
        if let Some(logic) = teardown {
            logic.run(self.runtime_handle.as_ref());
        }
    }

    // The closed check happens under the teardown lock so a concurrent `close`
    // either sees the stored logic or this call runs it.
    fn attach(&self, logic: UnsubscribeLogic) {
        let mut slot = lock(&self.teardown);
        if self.is_closed() {
            drop(slot);
            logic.run(self.runtime_handle.as_ref());
        } else {
            *slot = Some(logic);
        }
    }
}

/// A type that acts as an observer, allowing users to handle emitted values, errors,
/// and completion when subscribing to an `Observable`.
///
/// Every handler is optional; a missing handler swallows its notification. Note
/// that this makes errors silent when no `error` handler is set.
///
/// The producer receives the `Subscriber` as its sink. The sink guards the
/// subscription lifecycle: after `error`, `complete` or an `unsubscribe()` on the
/// matching `Subscription`, every further notification is dropped, and at most one
/// of `error` and `complete` ever reaches the handlers.
///
/// Clones share handlers and lifecycle, so a producer can hand copies of the sink
/// to threads, tasks or event listeners. Handlers never run concurrently. A
/// notification sent while a handler is running, including one sent from inside
/// that handler, is queued and delivered in order once the running handler
/// returns.
///
/// A panic raised by a handler propagates to the caller that was delivering. A
/// panic in the `error` or `complete` handler still runs the unsubscribe logic.
pub struct Subscriber<NextFnType> {
    sink: Arc<Mutex<Sink<NextFnType>>>,
    state: Arc<SubscriptionState>,
}

impl<NextFnType> Subscriber<NextFnType> {
    /// Creates a new `Subscriber` instance with custom handling functions for emitted
    /// values, errors, and completion.
    pub fn new(
        next_fn: impl FnMut(NextFnType) + Send + 'static,
        error_fn: impl FnOnce(ObservableErr) + Send + 'static,
        complete_fn: impl FnOnce() + Send + 'static,
    ) -> Self {
        Self::with_handlers(Handlers {
            next_fn: Some(Box::new(next_fn)),
            error_fn: Some(Box::new(error_fn)),
            complete_fn: Some(Box::new(complete_fn)),
        })
    }

    /// Create a new Subscriber with the provided `next` function.
    ///
    /// The `next` closure is called when the observable emits a new item.
    pub fn on_next(next_fn: impl FnMut(NextFnType) + Send + 'static) -> Self {
        Self::with_handlers(Handlers {
            next_fn: Some(Box::new(next_fn)),
            ..Handlers::default()
        })
    }

    /// Set the completion function for the Subscriber.
    pub fn on_complete(&mut self, complete_fn: impl FnOnce() + Send + 'static) {
        let mut sink = lock(&self.sink);
        if !sink.released {
            sink.handlers.complete_fn = Some(Box::new(complete_fn));
        }
    }

    /// Set the error-handling function for the Subscriber.
    pub fn on_error(&mut self, error_fn: impl FnOnce(ObservableErr) + Send + 'static) {
        let mut sink = lock(&self.sink);
        if !sink.released {
            sink.handlers.error_fn = Some(Box::new(error_fn));
        }
    }

    /// Adapts any `Observer` implementation into a `Subscriber`.
    pub fn from_observer<O>(observer: O) -> Self
    where
        O: Observer<NextFnType = NextFnType> + Send + 'static,
        NextFnType: 'static,
    {
        let observer = Arc::new(Mutex::new(observer));
        let observer_e = Arc::clone(&observer);
        let observer_c = Arc::clone(&observer);

        Subscriber::new(
            move |v| lock(&observer).next(v),
            move |e| lock(&observer_e).error(e),
            move || lock(&observer_c).complete(),
        )
    }

    /// Returns `true` once this subscriber stopped accepting notifications.
    ///
    /// Long running producers should poll this and stop emitting when it flips.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.state.is_closed()
    }

    // True when the panic unwinding on this thread was raised by one of the
    // handlers rather than by the code that called into the sink.
    pub(crate) fn take_handler_panic(&self) -> bool {
        let mut sink = lock(&self.sink);
        if sink.handler_panicked == Some(thread::current().id()) {
            sink.handler_panicked = None;
            true
        } else {
            false
        }
    }

    fn with_handlers(handlers: Handlers<NextFnType>) -> Self {
        Subscriber {
            sink: Arc::new(Mutex::new(Sink::new(handlers))),
            state: Arc::new(SubscriptionState::new()),
        }
    }

    fn terminate(&self, name: &'static str, notification: Notification<NextFnType>) {
        if !self.state.close() {
            tracing::trace!(notification = name, "subscription closed, notification dropped");
            return;
        }
        tracing::debug!(notification = name, "subscription terminated");
        let sink = lock(&self.sink);
        self.emit(sink, notification);
    }

    fn emit(
        &self,
        mut sink: MutexGuard<'_, Sink<NextFnType>>,
        notification: Notification<NextFnType>,
    ) {
        if sink.released {
            return;
        }
        sink.pending.push_back(notification);
        if sink.emitting {
            return;
        }
        sink.emitting = true;
        sink.handler_panicked = None;
        drop(sink);
        self.drain();
    }

    // Delivers queued notifications until the queue is empty or a terminal
    // notification was delivered. Only one caller drains at a time.
    fn drain(&self) {
        loop {
            let mut sink = lock(&self.sink);
            let Some(notification) = sink.pending.pop_front() else {
                sink.emitting = false;
                return;
            };

            let terminal = match notification {
                Notification::Next(v) => {
                    let Some(mut next_fn) = sink.handlers.next_fn.take() else {
                        continue;
                    };
                    drop(sink);
                    let result = panic::catch_unwind(AssertUnwindSafe(|| next_fn(v)));

                    let mut sink = lock(&self.sink);
                    if !sink.released {
                        sink.handlers.next_fn = Some(next_fn);
                    }
                    if let Err(payload) = result {
                        sink.emitting = false;
                        sink.handler_panicked = Some(thread::current().id());
                        // A terminal queued behind the failed value is never delivered.
                        let closed = self.state.is_closed();
                        if closed {
                            sink.release();
                        }
                        drop(sink);
                        if closed {
                            self.state.run_teardown();
                        }
                        panic::resume_unwind(payload);
                    }
                    continue;
                }
                terminal => terminal,
            };

            let handlers = mem::take(&mut sink.handlers);
            sink.release();
            sink.emitting = false;
            drop(sink);

            let result = panic::catch_unwind(AssertUnwindSafe(|| handlers.terminate(terminal)));
            self.state.run_teardown();
            if let Err(payload) = result {
                lock(&self.sink).handler_panicked = Some(thread::current().id());
                panic::resume_unwind(payload);
            }
            return;
        }
    }
}

impl<T: Send + 'static> Subscriber<T> {
    pub(crate) fn subscription(&self) -> Subscription {
        let sink: Arc<dyn ReleaseHandlers> = Arc::<Mutex<Sink<T>>>::clone(&self.sink);
        Subscription {
            state: Arc::clone(&self.state),
            sink: Some(sink),
        }
    }
}

impl<T> Default for Subscriber<T> {
    fn default() -> Self {
        Self::with_handlers(Handlers::default())
    }
}

impl<T> Clone for Subscriber<T> {
    fn clone(&self) -> Self {
        Subscriber {
            sink: Arc::clone(&self.sink),
            state: Arc::clone(&self.state),
        }
    }
}

impl<T> fmt::Debug for Subscriber<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscriber")
            .field("closed", &self.is_closed())
            .finish_non_exhaustive()
    }
}

impl<T> Observer for Subscriber<T> {
    type NextFnType = T;

    fn next(&mut self, v: Self::NextFnType) {
        if self.state.is_closed() {
            tracing::trace!(
                notification = "next",
                "subscription closed, notification dropped"
            );
            return;
        }
        let sink = lock(&self.sink);
        // Checked again under the lock so no value is queued behind a terminal.
        if self.state.is_closed() {
            return;
        }
        self.emit(sink, Notification::Next(v));
    }

    fn error(&mut self, observable_error: ObservableErr) {
        self.terminate("error", Notification::Error(observable_error));
    }

    fn complete(&mut self) {
        self.terminate("complete", Notification::Complete);
    }
}

/// Represents one execution of an observable, allowing control over it.
///
/// Dropping a `Subscription` does not unsubscribe; the execution keeps running
/// until it terminates on its own.
pub struct Subscription {
    state: Arc<SubscriptionState>,
    sink: Option<Arc<dyn ReleaseHandlers>>,
}

impl Subscription {
    /// Creates an open `Subscription` that owns the given unsubscribe logic.
    ///
    /// Useful for nesting one subscription inside another through
    /// [`UnsubscribeLogic::Wrapped`].
    #[must_use]
    pub fn new(unsubscribe_logic: UnsubscribeLogic) -> Self {
        let state = SubscriptionState::new();
        state.attach(unsubscribe_logic);
        Subscription {
            state: Arc::new(state),
            sink: None,
        }
    }

    /// Creates a `Subscription` that is already closed.
    #[must_use]
    pub fn closed() -> Self {
        let state = SubscriptionState::new();
        state.close();
        Subscription {
            state: Arc::new(state),
            sink: None,
        }
    }

    pub(crate) fn attach(&self, unsubscribe_logic: UnsubscribeLogic) {
        self.state.attach(unsubscribe_logic);
    }
}

impl Unsubscribeable for Subscription {
    fn unsubscribe(&self) {
        if !self.state.close() {
            return;
        }
        tracing::debug!("unsubscribed");
        if let Some(sink) = &self.sink {
            sink.release_handlers();
        }
        self.state.run_teardown();
    }

    fn is_closed(&self) -> bool {
        self.state.is_closed()
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("closed", &self.is_closed())
            .finish()
    }
}

/// Enumerates various unsubscribe logic options for a subscription.
///
/// Producers return one of these; it runs exactly once, when the subscription
/// closes.
pub enum UnsubscribeLogic {
    /// No specific unsubscribe logic.
    Nil,

    /// If one subscription depends on another. Wrapped subscription's unsubscribe
    /// will be called upon unsubscribing.
    Wrapped(Subscription),

    /// Unsubscribe logic defined by a function.
    Logic(Box<dyn FnOnce() + Send>),

    /// Asynchronous unsubscribe logic represented by a future. It is spawned on the
    /// current `Tokio` runtime, or on the runtime that was current when the
    /// subscriber was created.
    Future(Pin<Box<dyn Future<Output = ()> + Send>>),
}

impl UnsubscribeLogic {
    /// Shorthand for [`UnsubscribeLogic::Logic`].
    pub fn logic(fnc: impl FnOnce() + Send + 'static) -> Self {
        UnsubscribeLogic::Logic(Box::new(fnc))
    }

    fn run(self, runtime_handle: Option<&runtime::Handle>) {
        match self {
            UnsubscribeLogic::Nil => (),
            UnsubscribeLogic::Logic(fnc) => fnc(),
            UnsubscribeLogic::Wrapped(subscription) => subscription.unsubscribe(),
            UnsubscribeLogic::Future(future) => {
                let handle = runtime::Handle::try_current()
                    .ok()
                    .or_else(|| runtime_handle.cloned());
                match handle {
                    Some(handle) => {
                        handle.spawn(future);
                    }
                    None => {
                        tracing::warn!("no Tokio runtime available, async unsubscribe logic dropped");
                    }
                }
            }
        }
    }
}

impl fmt::Debug for UnsubscribeLogic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UnsubscribeLogic::Nil => f.write_str("Nil"),
            UnsubscribeLogic::Wrapped(s) => f.debug_tuple("Wrapped").field(s).finish(),
            UnsubscribeLogic::Logic(_) => f.write_str("Logic(..)"),
            UnsubscribeLogic::Future(_) => f.write_str("Future(..)"),
        }
    }
}
