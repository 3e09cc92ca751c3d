mod custom_error;
mod register_emissions;

use std::sync::{Arc, Mutex};

use proptest::prelude::*;

use custom_error::CustomError;
use register_emissions::register_emissions_subscriber;
use rxcore::{
    subscribe::{Subscriber, Subscription, UnsubscribeLogic},
    Observable, Observer, Subscribeable, Unsubscribeable,
};

#[derive(Clone, Debug)]
enum Step {
    Next(i32),
    Error,
    Complete,
    Unsubscribe,
}

fn step() -> impl Strategy<Value = Step> {
    prop_oneof![
        6 => any::<i32>().prop_map(Step::Next),
        1 => Just(Step::Error),
        1 => Just(Step::Complete),
        1 => Just(Step::Unsubscribe),
    ]
}

/// What a consumer must observe for a given script.
#[derive(Debug, Default, PartialEq)]
struct Expected {
    nexts: Vec<i32>,
    errors: usize,
    completes: usize,
}

fn model(script: &[Step]) -> Expected {
    let mut expected = Expected::default();
    for step in script {
        match step {
            Step::Next(v) => expected.nexts.push(*v),
            Step::Error => {
                expected.errors = 1;
                break;
            }
            Step::Complete => {
                expected.completes = 1;
                break;
            }
            Step::Unsubscribe => break,
        }
    }
    expected
}

proptest! {
    #[test]
    fn delivery_follows_the_lifecycle(script in prop::collection::vec(step(), 0..40)) {
        // The producer plays the script from a handle it keeps after subscribe.
        let sink: Arc<Mutex<Option<Subscriber<i32>>>> = Arc::new(Mutex::new(None));
        let sink_c = Arc::clone(&sink);
        let observable = Observable::new(move |o| {
            *sink_c.lock().unwrap() = Some(o);
            UnsubscribeLogic::Nil
        });

        let (subscriber, emissions) = register_emissions_subscriber();
        let subscription: Subscription = observable.subscribe(subscriber);
        let mut o = sink.lock().unwrap().take().unwrap();

        for step in &script {
            match step {
                Step::Next(v) => o.next(*v),
                Step::Error => o.error(Arc::new(CustomError("scripted"))),
                Step::Complete => o.complete(),
                Step::Unsubscribe => subscription.unsubscribe(),
            }
        }

        let expected = model(&script);
        prop_assert_eq!(emissions.nexts(), expected.nexts);
        prop_assert_eq!(emissions.errors().len(), expected.errors);
        prop_assert_eq!(emissions.completes(), expected.completes);

        let terminated = script
            .iter()
            .any(|s| !matches!(s, Step::Next(_)));
        prop_assert_eq!(subscription.is_closed(), terminated);
    }

    #[test]
    fn collected_observables_replay_in_order(values in prop::collection::vec(any::<i32>(), 0..64)) {
        let observable: Observable<i32> = values.iter().copied().collect();

        for _ in 0..2 {
            let (subscriber, emissions) = register_emissions_subscriber();
            prop_assert!(observable.subscribe(subscriber).is_closed());
            prop_assert_eq!(&emissions.nexts(), &values);
            prop_assert_eq!(emissions.completes(), 1);
        }
    }
}
