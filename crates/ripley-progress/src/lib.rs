//! Process-wide progress notification channel.
//!
//! This crate provides:
//! - Progress events tagged with the operation that produced them
//! - A broadcast channel with cloneable publishers
//! - A long-lived relay that forwards events to the active progress sink

pub mod channel;
pub mod relay;

pub use channel::{
    ProgressChannel, ProgressEvent, ProgressPublisher, ProgressSubscription, DEFAULT_CAPACITY,
    PROGRESS_STREAM,
};
pub use relay::{ProgressRelay, ProgressSink};
