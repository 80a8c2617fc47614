//! Query builder for fluent Cypher query construction.

use serde::Serialize;
use serde_json::Value as JsonValue;

use crate::error::AppError;
use crate::graph::traits::{CypherExecutor, Params};

/// A builder for constructing and executing Cypher queries.
///
/// `Query` provides a fluent API for adding parameters and executing
/// queries against any [`CypherExecutor`].
///
/// # Example
///
/// ```ignore
/// let rows = Query::new(&mut session, "MATCH (u:User {user_id: $user_id}) RETURN u")
///     .param("user_id", 42_i64)
///     .fetch_all()
///     .await?;
/// ```
pub struct Query<'a, E: CypherExecutor + ?Sized> {
    executor: &'a mut E,
    cypher: String,
    params: Params,
}

impl<'a, E: CypherExecutor + ?Sized> Query<'a, E> {
    /// Creates a new query builder.
    ///
    /// # Arguments
    ///
    /// * `executor` - The execution context to run the query against
    /// * `cypher` - The Cypher query string
    pub fn new(executor: &'a mut E, cypher: &str) -> Self {
        Self {
            executor,
            cypher: cypher.to_string(),
            params: Params::new(),
        }
    }

    /// Adds a parameter to the query.
    ///
    /// Parameters are referenced in Cypher using `$name` syntax.
    ///
    /// # Arguments
    ///
    /// * `name` - The parameter name (without the $ prefix)
    /// * `value` - The parameter value (must be serializable)
    ///
    /// # Panics
    ///
    /// Panics if the value cannot be serialized to JSON.
    pub fn param<T: Serialize>(mut self, name: &str, value: T) -> Self {
        let json_value = serde_json::to_value(value).expect("failed to serialize parameter value");
        self.params.insert(name.to_string(), json_value);
        self
    }

    /// Adds a parameter that's already a JSON value.
    ///
    /// Use this when you already have a `serde_json::Value`.
    pub fn param_raw(mut self, name: &str, value: JsonValue) -> Self {
        self.params.insert(name.to_string(), value);
        self
    }

    /// Executes the query and collects all rows into a vector.
    pub async fn fetch_all(self) -> Result<Vec<neo4rs::Row>, AppError> {
        self.executor
            .execute_cypher(&self.cypher, self.params)
            .await
    }

    /// Executes the query and returns the first row, if any.
    pub async fn fetch_one(self) -> Result<Option<neo4rs::Row>, AppError> {
        Ok(self.fetch_all().await?.into_iter().next())
    }

    /// Executes the query without returning results.
    ///
    /// Use this for mutations (CREATE, MERGE, DELETE, SET).
    pub async fn run(self) -> Result<(), AppError> {
        self.executor.run_cypher(&self.cypher, self.params).await
    }
}

/// Extension trait providing a convenient `query()` method.
///
/// This trait is automatically implemented for all [`CypherExecutor`]
/// types, allowing you to write `executor.query("...")` instead of
/// `Query::new(&mut executor, "...")`.
pub trait QueryExt: CypherExecutor {
    /// Creates a new query builder for this execution context.
    ///
    /// # Example
    ///
    /// ```ignore
    /// use sociograph::graph::QueryExt;
    ///
    /// let rows = session.query("MATCH (u:User) RETURN u LIMIT $limit")
    ///     .param("limit", 10_i64)
    ///     .fetch_all()
    ///     .await?;
    /// ```
    fn query(&mut self, cypher: &str) -> Query<'_, Self>
    where
        Self: Sized,
    {
        Query::new(self, cypher)
    }
}

// Blanket implementation for all CypherExecutor types
impl<E: CypherExecutor> QueryExt for E {}


#[cfg(test)]
mod tests {
    use super::testing::MockExecutor;
    use super::*;

    #[tokio::test]
    async fn test_query_no_params() {
        let mut executor = MockExecutor::expecting("MATCH (u:User) RETURN u");

        let result = executor.query("MATCH (u:User) RETURN u").fetch_all().await;
        assert!(result.is_ok());
        assert!(result.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_query_with_params() {
        let mut executor =
            MockExecutor::expecting("MATCH (u:User {user_id: $user_id}) RETURN u LIMIT $limit")
                .param("user_id", 42_i64)
                .param("limit", 10_i64);

        let result = executor
            .query("MATCH (u:User {user_id: $user_id}) RETURN u LIMIT $limit")
            .param("user_id", 42_i64)
            .param("limit", 10_i64)
            .fetch_all()
            .await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_query_run() {
        let mut executor = MockExecutor::expecting("MERGE (u:User {user_id: $user_id})")
            .param("user_id", 7_i64);

        let result = executor
            .query("MERGE (u:User {user_id: $user_id})")
            .param("user_id", 7_i64)
            .run()
            .await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_fetch_one_empty() {
        let mut executor = MockExecutor::expecting("MATCH (u:User {user_id: $user_id}) RETURN u")
            .param("user_id", 1_i64);

        let row = executor
            .query("MATCH (u:User {user_id: $user_id}) RETURN u")
            .param("user_id", 1_i64)
            .fetch_one()
            .await
            .unwrap();
        assert!(row.is_none());
    }
}
