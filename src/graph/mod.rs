//! Graph database access.
//!
//! This module provides the connection factory plus a thin execution
//! abstraction over neo4rs, so repository code can run the same queries
//! through an auto-commit session or an explicit transaction.
//!
//! # Architecture
//!
//! - [`connect`] - build an authenticated, pool-backed [`neo4rs::Graph`]
//!   from a [`GraphConfig`](crate::config::GraphConfig)
//! - [`CypherExecutor`] - the execution context trait, implemented by
//!   [`neo4rs::Graph`] and [`neo4rs::Txn`]
//! - [`Query`] / [`QueryExt`] - fluent parameterized query builder
//!
//! # Usage
//!
//! ```ignore
//! use sociograph::graph::{self, QueryExt};
//!
//! let graph = graph::connect(&config.graph).await?;
//!
//! // Auto-commit session: clone the pool handle per unit of work
//! let mut session = graph.clone();
//! let rows = session
//!     .query("MATCH (u:User {user_id: $user_id}) RETURN u")
//!     .param("user_id", 42_i64)
//!     .fetch_all()
//!     .await?;
//!
//! // Explicit transaction: same call sites, ordered and atomic
//! let mut txn = graph.start_txn().await?;
//! txn.query("MERGE (u:User {user_id: $user_id})")
//!     .param("user_id", 42_i64)
//!     .run()
//!     .await?;
//! txn.commit().await?;
//! ```

mod query;
mod traits;

// Re-export core types
pub use query::{Query, QueryExt};
pub use traits::{CypherExecutor, Params};

#[cfg(test)]
pub(crate) use query::testing;

use neo4rs::{ConfigBuilder, Graph};
use tracing::debug;

use crate::config::GraphConfig;
use crate::error::AppError;

/// Builds an authenticated connection pool from the configuration.
///
/// The pool is lazy: no connection is established here, so an unreachable
/// server or rejected credentials surface as [`AppError::Connection`] on
/// first use. Call [`ping`] afterwards when failing fast matters.
pub async fn connect(config: &GraphConfig) -> Result<Graph, AppError> {
    let uri = connection_uri(&config.uri, config.encryption_enabled());
    debug!(uri = %uri, db = %config.db, "connecting to neo4j");

    let driver_config = ConfigBuilder::default()
        .uri(uri.as_str())
        .user(config.user.as_str())
        .password(config.password.as_str())
        .db(config.db.as_str())
        .fetch_size(config.fetch_size)
        .max_connections(config.max_connections)
        .build()?;

    Ok(Graph::connect(driver_config).await?)
}

/// Eagerly checks connectivity with a `RETURN 1` round trip.
pub async fn ping(graph: &Graph) -> Result<(), AppError> {
    graph.run(neo4rs::query("RETURN 1")).await?;
    Ok(())
}

/// Renders the encryption toggle into the bolt URI scheme.
///
/// neo4rs drives TLS from the URI scheme, so enabling encryption upgrades
/// `neo4j://` and `bolt://` to their `+s` variants. Already-secure URIs
/// and a scheme-less host are handled; with encryption disabled the URI
/// passes through untouched.
fn connection_uri(uri: &str, encrypted: bool) -> String {
    if !encrypted {
        return uri.to_string();
    }
    if let Some(rest) = uri.strip_prefix("neo4j://") {
        format!("neo4j+s://{}", rest)
    } else if let Some(rest) = uri.strip_prefix("bolt://") {
        format!("bolt+s://{}", rest)
    } else if uri.contains("://") {
        // +s and +ssc schemes already state their transport security
        uri.to_string()
    } else {
        format!("neo4j+s://{}", uri)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uri_untouched_when_encryption_disabled() {
        assert_eq!(
            connection_uri("neo4j://host:7687", false),
            "neo4j://host:7687"
        );
        assert_eq!(
            connection_uri("bolt://host:7687", false),
            "bolt://host:7687"
        );
    }

    #[test]
    fn neo4j_scheme_upgraded() {
        assert_eq!(
            connection_uri("neo4j://host:7687", true),
            "neo4j+s://host:7687"
        );
    }

    #[test]
    fn bolt_scheme_upgraded() {
        assert_eq!(
            connection_uri("bolt://host:7687", true),
            "bolt+s://host:7687"
        );
    }

    #[test]
    fn secure_schemes_kept() {
        assert_eq!(
            connection_uri("neo4j+s://host:7687", true),
            "neo4j+s://host:7687"
        );
        assert_eq!(
            connection_uri("bolt+ssc://host:7687", true),
            "bolt+ssc://host:7687"
        );
    }

    #[test]
    fn bare_host_gets_secure_scheme() {
        assert_eq!(connection_uri("host:7687", true), "neo4j+s://host:7687");
    }
}
