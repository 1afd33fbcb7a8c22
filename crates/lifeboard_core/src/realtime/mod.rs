//! Per-user change channel.
//!
//! # Responsibility
//! - Fan out record changes to the subscribers of the owning user.
//! - Tie subscription lifetime to a guard value.
//!
//! # Invariants
//! - Delivery happens on a later event loop turn, never inside `publish`.
//! - Only subscribers registered when `publish` ran receive the event.
//! - After a `Subscription` is dropped, no further event reaches its
//!   callback, including events already queued.

mod feed;

pub use feed::{ChangeEvent, ChangeFeed, Subscription};
