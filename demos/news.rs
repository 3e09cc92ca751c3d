//! Observables as news feeds: the feed describes what will be published, and
//! nothing is published until someone subscribes.
//!
//! To run this example, execute `cargo run --example news`.

use rxcore::subscribe::{Subscriber, UnsubscribeLogic};
use rxcore::{Observable, Observer, Subscribeable};
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let news = Observable::new(|mut reader| {
        reader.next("Weather forecast tomorrow is rainy.");
        reader.next("Your local sports team won today.");
        reader.complete();
        UnsubscribeLogic::Nil
    });

    // Every reader gets the whole feed; observables are cold.
    for name in ["you", "your friend"] {
        let mut reader = Subscriber::on_next(move |update| match update {
            "Weather forecast tomorrow is rainy." => println!("{} brings an umbrella", name),
            "Your local sports team won today." => println!("{} screams yay", name),
            other => println!("{} read: {}", name, other),
        });
        reader.on_complete(move || println!("{} finished reading the news", name));

        news.subscribe(reader);
    }
}
