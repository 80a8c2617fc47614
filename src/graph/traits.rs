//! Execution contexts for running Cypher.
//!
//! [`CypherExecutor`] is the seam between repositories and the driver: one
//! trait over "run a parameterized query, return the rows", implemented by
//!
//! - [`neo4rs::Graph`] - pool-backed auto-commit sessions
//! - [`neo4rs::Txn`] - explicit transactions
//!
//! Repository operations take `&mut impl CypherExecutor` and stay agnostic
//! about which one they were handed. Methods take `&mut self` because
//! transactions require exclusive access; `Graph` clones share one pool, so
//! callers hand each unit of work its own session.

use std::collections::HashMap;

use async_trait::async_trait;
use serde_json::Value as JsonValue;

use crate::error::AppError;

/// Named parameters bound to a Cypher query.
pub type Params = HashMap<String, JsonValue>;

/// Executes Cypher queries against the graph database.
///
/// This is the execution context every repository operation runs through.
/// It provides methods for queries that return rows and queries that
/// don't (mutations).
#[async_trait]
pub trait CypherExecutor: Send {
    /// Executes a Cypher query and collects the result rows.
    ///
    /// Use this for queries that return data (MATCH, RETURN). Result sets
    /// in this layer are bounded by `SKIP`/`LIMIT`, so collecting is safe.
    async fn execute_cypher(
        &mut self,
        cypher: &str,
        params: Params,
    ) -> Result<Vec<neo4rs::Row>, AppError>;

    /// Executes a Cypher query without returning results.
    ///
    /// Use this for mutations whose rows nobody reads (CREATE, MERGE,
    /// DELETE, SET).
    async fn run_cypher(&mut self, cypher: &str, params: Params) -> Result<(), AppError>;
}

/// Auto-commit sessions: each call is its own transaction.
#[async_trait]
impl CypherExecutor for neo4rs::Graph {
    async fn execute_cypher(
        &mut self,
        cypher: &str,
        params: Params,
    ) -> Result<Vec<neo4rs::Row>, AppError> {
        let query = bind_params(neo4rs::query(cypher), params, cypher)?;
        let mut stream = self.execute(query).await?;
        let mut rows = Vec::new();
        while let Some(row) = stream.next().await? {
            rows.push(row);
        }
        Ok(rows)
    }

    async fn run_cypher(&mut self, cypher: &str, params: Params) -> Result<(), AppError> {
        let query = bind_params(neo4rs::query(cypher), params, cypher)?;
        self.run(query).await?;
        Ok(())
    }
}

/// Explicit transactions: calls are ordered and commit or roll back together.
#[async_trait]
impl CypherExecutor for neo4rs::Txn {
    async fn execute_cypher(
        &mut self,
        cypher: &str,
        params: Params,
    ) -> Result<Vec<neo4rs::Row>, AppError> {
        let query = bind_params(neo4rs::query(cypher), params, cypher)?;
        let mut stream = self.execute(query).await?;
        let mut rows = Vec::new();
        while let Some(row) = stream.next(self.handle()).await? {
            rows.push(row);
        }
        Ok(rows)
    }

    async fn run_cypher(&mut self, cypher: &str, params: Params) -> Result<(), AppError> {
        let query = bind_params(neo4rs::query(cypher), params, cypher)?;
        self.run(query).await?;
        Ok(())
    }
}

/// Binds the JSON parameter map onto a driver query.
///
/// Only scalar values are supported: strings, booleans, integers and
/// floats. Null, arrays and objects are rejected as [`AppError::Query`]
/// rather than silently coerced.
fn bind_params(
    mut query: neo4rs::Query,
    params: Params,
    cypher: &str,
) -> Result<neo4rs::Query, AppError> {
    for (name, value) in params {
        query = match value {
            JsonValue::String(s) => query.param(&name, s),
            JsonValue::Bool(b) => query.param(&name, b),
            JsonValue::Number(n) => {
                if let Some(i) = n.as_i64() {
                    query.param(&name, i)
                } else if let Some(f) = n.as_f64() {
                    query.param(&name, f)
                } else {
                    return Err(unsupported_param(&name, cypher));
                }
            }
            JsonValue::Null | JsonValue::Array(_) | JsonValue::Object(_) => {
                return Err(unsupported_param(&name, cypher));
            }
        };
    }
    Ok(query)
}

fn unsupported_param(name: &str, cypher: &str) -> AppError {
    AppError::Query {
        message: format!("unsupported parameter type for ${}", name),
        query: cypher.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn bind(value: JsonValue) -> Result<neo4rs::Query, AppError> {
        let mut params = Params::new();
        params.insert("value".to_string(), value);
        bind_params(neo4rs::query("RETURN $value"), params, "RETURN $value")
    }

    #[test]
    fn scalar_params_bind() {
        assert!(bind(json!("text")).is_ok());
        assert!(bind(json!(true)).is_ok());
        assert!(bind(json!(42)).is_ok());
        assert!(bind(json!(1.5)).is_ok());
    }

    #[test]
    fn null_param_is_a_query_error() {
        assert!(matches!(bind(JsonValue::Null), Err(AppError::Query { .. })));
    }

    #[test]
    fn collection_params_are_query_errors() {
        assert!(matches!(bind(json!([1, 2])), Err(AppError::Query { .. })));
        assert!(matches!(bind(json!({"a": 1})), Err(AppError::Query { .. })));
    }

    #[test]
    fn bind_error_names_the_parameter() {
        match bind(JsonValue::Null) {
            Err(AppError::Query { message, query }) => {
                assert!(message.contains("$value"));
                assert_eq!(query, "RETURN $value");
            }
            other => panic!("unexpected result: {:?}", other.map(|_| ())),
        }
    }
}
