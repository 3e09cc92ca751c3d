//! Provides structures and traits related to subscription management.
//!
//! This module includes `Subscriber`, the guarded sink a producer emits into, and
//! `Subscription`, the handle a consumer uses to cancel one execution of an
//! observable. It also defines the unsubscribe logic a producer hands back.
pub mod subscribe;
