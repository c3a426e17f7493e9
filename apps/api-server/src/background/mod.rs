//! Background jobs.

mod scheduler;

pub use scheduler::{Scheduler, SchedulerConfig, SweepRunner};
