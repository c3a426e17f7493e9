//! Use cases built on the ports.

pub mod publisher;
pub mod scheduling;

#[cfg(test)]
pub(crate) mod testing;

pub use publisher::{
    DEFAULT_PLATFORM_TIMEOUT, MIN_SETTLE_DELAY, PostPublishResult, Publisher, PublisherConfig, SweepReport, TwoPhasePublish,
};
pub use scheduling::{MAX_PREVIEW_SLOTS, NewPostRequest, SchedulingService, plan_batch};
