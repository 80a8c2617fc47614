//! Data access layer for social graph operations.
//!
//! Repositories provide a clean abstraction over graph queries, using the
//! `FromContext` derive macro for dependency injection. Every operation
//! takes the execution context it should run in - an auto-commit session
//! or an explicit transaction - as `&mut impl CypherExecutor`; the
//! repositories never create or manage one themselves.

mod query;
mod relationship;
mod user;

pub use query::QueryRepository;
pub use relationship::{MergeOutcome, RelationshipRepository};
pub use user::UserRepository;
