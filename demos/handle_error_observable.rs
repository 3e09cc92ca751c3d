//! This `Observable` waits for user input and emits a value and a completion
//! signal upon success. A failing producer returns its error from `try_new`, and
//! the error reaches the `Observer` instead of the caller of `subscribe`.
//!
//! To run this example, execute `cargo run --example handle_error_observable`.

use std::{io, num::ParseIntError};

use rxcore::{
    subscribe::{Subscriber, UnsubscribeLogic},
    Observable, Observer, Subscribeable,
};
use tracing_subscriber::EnvFilter;

#[derive(Debug, thiserror::Error)]
enum InputError {
    #[error("failed to read input")]
    Io(#[from] io::Error),
    #[error("not an integer")]
    Parse(#[from] ParseIntError),
    #[error("number should be less than 100, you entered {0}")]
    TooLarge(i32),
}

// Creates an `Observable<i32>` that processes user input and emits or signals errors.
pub fn get_less_than_100() -> Observable<i32> {
    Observable::try_new(|mut observer| -> Result<UnsubscribeLogic, InputError> {
        let mut input = String::new();

        println!("Please enter an integer (less than 100):");
        io::stdin().read_line(&mut input)?;

        let num = input.trim().parse::<i32>()?;
        if num > 100 {
            return Err(InputError::TooLarge(num));
        }

        observer.next(num);
        observer.complete();
        Ok(UnsubscribeLogic::Nil)
    })
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let observer = Subscriber::new(
        |input| println!("You entered: {}", input),
        |e| eprintln!("{}", e),
        || println!("User input handled"),
    );

    get_less_than_100().subscribe(observer);
}
