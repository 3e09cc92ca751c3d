//! This `Observable` emits values from an OS thread until it is unsubscribed.
//! Its unsubscribe logic signals the thread to stop; the subscriber also drops
//! anything the thread emits after that point.
//!
//! To run this example, execute `cargo run --example unsubscribe_observable`.

use std::{sync::mpsc, time::Duration};

use rxcore::{
    subscribe::{Subscriber, UnsubscribeLogic, Unsubscribeable},
    Observable, Observer, Subscribeable,
};
use tracing_subscriber::EnvFilter;

const UNSUBSCRIBE_SIGNAL: bool = true;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    // Create a custom observable that emits values in a separate thread.
    let observable = Observable::new(|mut o| {
        let (tx, rx) = mpsc::channel();

        std::thread::spawn(move || {
            for i in 0..=10000 {
                // If an unsubscribe signal is received, exit the loop and stop emissions.
                if let Ok(UNSUBSCRIBE_SIGNAL) = rx.try_recv() {
                    break;
                }
                o.next(i);
                std::thread::sleep(Duration::from_millis(1));
            }
            o.complete();
        });

        // Runs once, when the subscription is unsubscribed.
        UnsubscribeLogic::logic(move || {
            if tx.send(UNSUBSCRIBE_SIGNAL).is_err() {
                println!("Receiver dropped.");
            }
        })
    });

    let mut observer = Subscriber::on_next(|v| println!("Emitted {}", v));
    observer.on_complete(|| println!("Completed"));

    let subscription = observable.subscribe(observer);

    // Do something else here.
    println!("Do something while Observable is emitting.");
    std::thread::sleep(Duration::from_millis(50));

    // Unsubscribe from the observable to stop emissions. `Completed` is never
    // printed because the subscription closed first.
    subscription.unsubscribe();

    std::thread::sleep(Duration::from_millis(500));
    println!("`main` function done")
}
