//! Authentication plumbing around an external identity provider.
//!
//! # Responsibility
//! - Mirror provider-verified users into the local `users` table.
//! - Issue, resolve and revoke opaque session tokens.
//! - Decide redirects for protected and sign-in routes.
//!
//! # Invariants
//! - An expired session resolves to nothing, exactly like an unknown token.
//! - Guard decisions are pure functions of path and session presence.

pub mod guard;
pub mod session;

pub use guard::{RouteDecision, RouteGuard};
pub use session::{ensure_user, user_id_for_email, Session, SessionStore};
