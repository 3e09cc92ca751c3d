use std::sync::{Arc, Mutex};

use rxcore::subscribe::Subscriber;

/// Everything a subscriber built by `register_emissions_subscriber` observed.
#[derive(Clone, Default)]
pub struct Emissions {
    pub nexts: Arc<Mutex<Vec<i32>>>,
    pub errors: Arc<Mutex<Vec<String>>>,
    pub completes: Arc<Mutex<usize>>,
}

impl Emissions {
    pub fn nexts(&self) -> Vec<i32> {
        self.nexts.lock().unwrap().clone()
    }

    pub fn errors(&self) -> Vec<String> {
        self.errors.lock().unwrap().clone()
    }

    pub fn completes(&self) -> usize {
        *self.completes.lock().unwrap()
    }
}

pub fn register_emissions_subscriber() -> (Subscriber<i32>, Emissions) {
    let emissions = Emissions::default();
    let nexts = Arc::clone(&emissions.nexts);
    let errors = Arc::clone(&emissions.errors);
    let completes = Arc::clone(&emissions.completes);

    let subscriber = Subscriber::new(
        move |n| {
            // Track next() calls.
            nexts.lock().unwrap().push(n);
        },
        move |e| {
            // Track error() calls.
            errors.lock().unwrap().push(e.to_string());
        },
        move || {
            // Track complete() calls.
            *completes.lock().unwrap() += 1;
        },
    );
    (subscriber, emissions)
}
