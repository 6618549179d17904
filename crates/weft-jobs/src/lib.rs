//! # weft-jobs
//!
//! A minimal parallel task facility: a fixed pool of worker threads fed
//! from a shared queue, returning a [`TaskHandle`] per submitted job.
//!
//! The simulation controller submits one job per solver and then blocks
//! on every handle; that wait is the only suspension point of a frame.

pub mod scheduler;

pub use scheduler::{wait_all, JobScheduler, TaskHandle};
