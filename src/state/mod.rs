//! State module for tracking probe progress
//!
//! # Components
//!
//! - `ProbeState`: where a single ID's probe stands (retrying, resolved, abandoned)
//! - `RetryPolicy`: the pure decision function driving those transitions

mod probe_state;

pub use probe_state::{NextAction, ProbeState, RetryPolicy};
