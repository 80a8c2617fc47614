//! Sociograph - Social Graph Persistence and Query Layer
//!
//! A persistence and query layer for a social graph stored in Neo4j:
//! user nodes connected by directed FOLLOWS and INVITED_BY_USER edges.
//! Writes are idempotent merges, reads are paginated traversals and live
//! edge counts, and both run through the same execution context trait
//! whether the caller holds an auto-commit session or a transaction.

pub mod config;
pub mod context;
pub mod di;
pub mod error;
pub mod graph;
pub mod models;
pub mod repositories;
pub mod sanitize;
pub mod services;

// Re-export FromRef at crate root for di-macros generated code
pub use di::FromRef;
