//! Embassy async tasks

pub mod edge_wait;

pub use edge_wait::{edge_wait_task, WAITERS};
