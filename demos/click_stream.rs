//! Derives an observable from button clicks. The button is an `EventEmitter`
//! handed to `from_event`; whoever holds the observable can subscribe to the
//! clicks without getting access to the button itself.
//!
//! To run this example, execute `cargo run --example click_stream`.

use std::sync::Arc;

use rxcore::subscribe::Subscriber;
use rxcore::{from_event, EventEmitter, Observable, Subscribeable, Unsubscribeable};
use tracing_subscriber::EnvFilter;

#[derive(Clone, Debug)]
struct Click {
    x: u32,
    y: u32,
}

fn clicks(button: &Arc<EventEmitter<Click>>) -> Observable<Click> {
    from_event(Arc::clone(button), "click")
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let button = Arc::new(EventEmitter::new());
    let subscription = clicks(&button).subscribe(Subscriber::on_next(|click: Click| {
        println!("targetButton was clicked at ({}, {})", click.x, click.y)
    }));

    button.dispatch("click", Click { x: 10, y: 20 });
    button.dispatch("click", Click { x: 11, y: 21 });

    subscription.unsubscribe();

    // Nobody listens anymore.
    let delivered = button.dispatch("click", Click { x: 12, y: 22 });
    println!("click after unsubscribe reached {} listeners", delivered);
}
