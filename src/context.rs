//! Application context providing dependency injection root.

use std::sync::Arc;

use neo4rs::Graph;

use crate::config::Config;
use crate::di::Context as ContextDerive;
use crate::di::FromRef;
use crate::models::UpsertPolicy;
use crate::sanitize::{NoopSanitizer, Sanitizer};

/// Shared handle to the configured bio sanitizer.
pub type AppSanitizer = Arc<dyn Sanitizer>;

/// Root application context for dependency injection.
///
/// The Context holds all shared dependencies and uses `#[derive(Context)]`
/// to generate `FromRef` implementations for each field, enabling
/// compile-time dependency resolution.
#[derive(ContextDerive, Clone)]
pub struct Context {
    /// Neo4j graph database connection pool.
    pub graph: Arc<Graph>,
    /// Application configuration.
    pub config: Arc<Config>,
    /// Sanitizer applied to user bios before persistence.
    pub sanitizer: AppSanitizer,
}

impl Context {
    /// Creates a new context with the default no-op sanitizer.
    pub fn new(graph: Graph, config: Config) -> Self {
        Self::with_sanitizer(graph, config, Arc::new(NoopSanitizer))
    }

    /// Creates a new context with a caller-supplied sanitizer.
    pub fn with_sanitizer(graph: Graph, config: Config, sanitizer: AppSanitizer) -> Self {
        Self {
            graph: Arc::new(graph),
            config: Arc::new(config),
            sanitizer,
        }
    }
}

// The write policy lives inside the configuration; resolving it here lets
// repositories declare it as an ordinary dependency field.
impl FromRef<Context> for UpsertPolicy {
    fn from_ref(input: &Context) -> Self {
        input.config.users.upsert_policy
    }
}
