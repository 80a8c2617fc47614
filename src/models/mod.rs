//! Domain models for the social graph.

mod page;
mod user;

pub use page::Page;
pub use user::{UpsertPolicy, User, UserProfile};
