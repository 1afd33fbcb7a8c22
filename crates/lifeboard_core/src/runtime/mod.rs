//! Single-threaded cooperative runtime.
//!
//! # Responsibility
//! - Run posted tasks and timers on one thread with a virtual clock.
//! - Provide the debounce primitive used by editors and search inputs.
//!
//! # Invariants
//! - Tasks never run re-entrantly; a task posted while another runs waits
//!   for the next turn.
//! - Timers with the same due time fire in scheduling order.

pub mod debounce;
pub mod event_loop;

pub use debounce::Debouncer;
pub use event_loop::{EventLoop, TimerHost, TimerId};
