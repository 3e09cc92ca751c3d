//! This `Observable` emits values from a `Tokio` task. Its unsubscribe logic is
//! asynchronous, so it is handed back as `UnsubscribeLogic::Future` and spawned on
//! the runtime when the subscription closes.
//!
//! To run this example, execute `cargo run --example async_observable_tokio`.

use rxcore::{
    subscribe::{Subscriber, UnsubscribeLogic, Unsubscribeable},
    Observable, Observer, Subscribeable,
};
use tokio::{sync::mpsc::channel, task, time};
use tracing_subscriber::EnvFilter;

const UNSUBSCRIBE_SIGNAL: bool = true;

#[tokio::main()]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let observable = Observable::new(|mut o| {
        let (tx, mut rx) = channel(10);

        task::spawn(async move {
            for i in 0..=10000 {
                tokio::select! {
                    Some(UNSUBSCRIBE_SIGNAL) = rx.recv() => break,
                    _ = time::sleep(time::Duration::from_millis(1)) => o.next(i),
                }
            }
            o.complete();
        });

        UnsubscribeLogic::Future(Box::pin(async move {
            if tx.send(UNSUBSCRIBE_SIGNAL).await.is_err() {
                println!("Receiver dropped.");
            }
        }))
    });

    let subscription = observable.subscribe(Subscriber::on_next(|v| println!("Emitted {}", v)));

    time::sleep(time::Duration::from_millis(30)).await;
    subscription.unsubscribe();

    // A finite observable can also be awaited to completion.
    let numbers: Observable<u32> = (1..=3).collect();
    match numbers.for_each(|v| println!("Number {}", v)).await {
        Ok(()) => println!("Numbers completed"),
        Err(e) => eprintln!("Numbers failed: {}", e),
    }

    println!("`main` function done")
}
