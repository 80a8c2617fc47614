//! Business logic services for the social graph.
//!
//! Services orchestrate repositories and handle session management,
//! using the `FromContext` derive macro for dependency injection.

mod social;

pub use social::{GraphStats, SocialGraphService};
