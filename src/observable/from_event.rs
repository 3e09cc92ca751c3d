use std::sync::Arc;

use crate::{
    events::{EventListener, EventTarget},
    observer::Observer,
    subscription::subscribe::UnsubscribeLogic,
    Observable,
};

/// Creates an `Observable` that emits every `event_name` event fired by `target`.
///
/// Each subscription registers its own listener on `target`, and unsubscribing
/// removes exactly that listener. The observable never completes on its own.
///
/// ```no_run
/// use std::sync::Arc;
///
/// use rxcore::subscribe::{Subscriber, Unsubscribeable};
/// use rxcore::{from_event, EventEmitter, Subscribeable};
///
/// let button = Arc::new(EventEmitter::<&str>::new());
/// let clicks = from_event(Arc::clone(&button), "click");
///
/// let subscription = clicks.subscribe(Subscriber::on_next(|e| println!("clicked: {}", e)));
/// button.dispatch("click", "left");
/// subscription.unsubscribe();
/// ```
pub fn from_event<Tgt>(target: Arc<Tgt>, event_name: impl Into<String>) -> Observable<Tgt::Event>
where
    Tgt: EventTarget + Send + Sync + 'static,
    Tgt::Event: Send + 'static,
{
    let event_name: String = event_name.into();

    Observable::new(move |subscriber| {
        let listener: EventListener<Tgt::Event> =
            Arc::new(move |event| subscriber.clone().next(event));
        target.add_event_listener(&event_name, Arc::clone(&listener));
        tracing::trace!(event_name = %event_name, "listener registered");

        let target = Arc::clone(&target);
        let event_name = event_name.clone();
        UnsubscribeLogic::logic(move || {
            target.remove_event_listener(&event_name, &listener);
            tracing::trace!(event_name = %event_name, "listener removed");
        })
    })
}

#[cfg(test)]
mod tests {
    use std::sync::{
        atomic::{AtomicUsize, Ordering},
        Mutex,
    };

    use super::*;
    use crate::{
        subscribe::{Subscribeable, Subscriber, Unsubscribeable},
        EventEmitter,
    };

    #[test]
    fn listener_is_registered_lazily() {
        let target = Arc::new(EventEmitter::<u32>::new());
        let clicks = from_event(Arc::clone(&target), "click");

        assert_eq!(target.listener_count("click"), 0);
        let subscription = clicks.subscribe(Subscriber::default());
        assert_eq!(target.listener_count("click"), 1);

        subscription.unsubscribe();
        assert_eq!(target.listener_count("click"), 0);
    }

    #[test]
    fn each_subscription_owns_its_listener() {
        let target = Arc::new(EventEmitter::<u32>::new());
        let clicks = from_event(Arc::clone(&target), "click");
        let first = Arc::new(Mutex::new(Vec::new()));
        let second = Arc::new(AtomicUsize::new(0));

        let first_c = Arc::clone(&first);
        let s1 = clicks.subscribe(Subscriber::on_next(move |v| first_c.lock().unwrap().push(v)));
        let second_c = Arc::clone(&second);
        let _s2 = clicks.subscribe(Subscriber::on_next(move |_| {
            second_c.fetch_add(1, Ordering::SeqCst);
        }));

        target.dispatch("click", 1);
        s1.unsubscribe();
        target.dispatch("click", 2);

        assert_eq!(*first.lock().unwrap(), vec![1]);
        assert_eq!(second.load(Ordering::SeqCst), 2);
        assert_eq!(target.listener_count("click"), 1);
    }
}
