use std::{any::Any, error::Error, sync::Arc};

/// Error value delivered to an observer's `error` handler.
///
/// Any error type can travel through an observable once it is wrapped in an `Arc`,
/// and the `Arc` lets the same error be handed to more than one place.
pub type ObservableErr = Arc<dyn Error + Send + Sync>;

/// Errors raised by the observable machinery itself, as opposed to errors that a
/// producer emits on its own.
#[derive(Debug, thiserror::Error)]
pub enum ObservableError {
    /// The producer function panicked while the observable was being subscribed to.
    #[error("observable producer panicked: {message}")]
    ProducerPanicked { message: String },

    /// Every handle to the subscriber was dropped before the observable signaled
    /// `error` or `complete`.
    #[error("observable dropped its subscriber without completing")]
    Abandoned,
}

impl ObservableError {
    pub(crate) fn producer_panicked(payload: &(dyn Any + Send)) -> Self {
        let message = if let Some(s) = payload.downcast_ref::<&str>() {
            (*s).to_owned()
        } else if let Some(s) = payload.downcast_ref::<String>() {
            s.clone()
        } else {
            String::from("non-string panic payload")
        };
        ObservableError::ProducerPanicked { message }
    }
}
