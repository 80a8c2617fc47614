//! Query repository for social graph reads: lookups, lists and counts.

use chrono::{DateTime, Utc};

use crate::context::Context;
use crate::di::FromContext;
use crate::error::AppError;
use crate::graph::{CypherExecutor, QueryExt};
use crate::models::{Page, User};

/// Repository for the read side of the social graph.
///
/// List operations order by ascending `user_id` and window with a bound
/// `SKIP`/`LIMIT` pair, so pages are stable and repeatable. Counts are
/// always computed live from the stored edges, never from the snapshot
/// attributes on the nodes.
#[derive(FromContext, Clone, Default)]
pub struct QueryRepository {}

impl QueryRepository {
    /// Looks up a single user by id.
    pub async fn get_user_by_id(
        &self,
        ctx: &mut impl CypherExecutor,
        user_id: i64,
    ) -> Result<Option<User>, AppError> {
        let row = ctx
            .query("MATCH (u:User {user_id: $user_id}) RETURN u")
            .param("user_id", user_id)
            .fetch_one()
            .await?;

        match row {
            Some(row) => Ok(Some(Self::row_to_user(&row, "u")?)),
            None => Ok(None),
        }
    }

    /// One page of the users following `user_id`, ascending by follower id.
    pub async fn get_user_followers_by_id(
        &self,
        ctx: &mut impl CypherExecutor,
        user_id: i64,
        page: Page,
    ) -> Result<Vec<User>, AppError> {
        let rows = ctx
            .query("MATCH (f:User)-[:FOLLOWS]->(u:User {user_id: $user_id}) RETURN f ORDER BY f.user_id ASC SKIP $skip LIMIT $limit")
            .param("user_id", user_id)
            .param("skip", page.skip())
            .param("limit", page.limit())
            .fetch_all()
            .await?;

        Self::rows_to_users(&rows, "f")
    }

    /// One page of the users `user_id` follows, ascending by followed id.
    pub async fn get_following_users_by_id(
        &self,
        ctx: &mut impl CypherExecutor,
        user_id: i64,
        page: Page,
    ) -> Result<Vec<User>, AppError> {
        let rows = ctx
            .query("MATCH (u:User {user_id: $user_id})-[:FOLLOWS]->(f:User) RETURN f ORDER BY f.user_id ASC SKIP $skip LIMIT $limit")
            .param("user_id", user_id)
            .param("skip", page.skip())
            .param("limit", page.limit())
            .fetch_all()
            .await?;

        Self::rows_to_users(&rows, "f")
    }

    /// Number of users following `user_id` (incoming FOLLOWS edges).
    pub async fn get_num_followers_by_id(
        &self,
        ctx: &mut impl CypherExecutor,
        user_id: i64,
    ) -> Result<i64, AppError> {
        let rows = ctx
            .query("MATCH (:User)-[r:FOLLOWS]->(u:User {user_id: $user_id}) RETURN count(r) AS count")
            .param("user_id", user_id)
            .fetch_all()
            .await?;

        Self::count_from(&rows)
    }

    /// Number of users `user_id` follows (outgoing FOLLOWS edges).
    pub async fn get_num_following_by_id(
        &self,
        ctx: &mut impl CypherExecutor,
        user_id: i64,
    ) -> Result<i64, AppError> {
        let rows = ctx
            .query("MATCH (u:User {user_id: $user_id})-[r:FOLLOWS]->(:User) RETURN count(r) AS count")
            .param("user_id", user_id)
            .fetch_all()
            .await?;

        Self::count_from(&rows)
    }

    /// Total number of user nodes in the graph.
    pub async fn get_num_users(&self, ctx: &mut impl CypherExecutor) -> Result<i64, AppError> {
        let rows = ctx
            .query("MATCH (u:User) RETURN count(u) AS count")
            .fetch_all()
            .await?;

        Self::count_from(&rows)
    }

    /// Total number of FOLLOWS edges in the graph.
    pub async fn get_num_followers(&self, ctx: &mut impl CypherExecutor) -> Result<i64, AppError> {
        let rows = ctx
            .query("MATCH (:User)-[r:FOLLOWS]->(:User) RETURN count(r) AS count")
            .fetch_all()
            .await?;

        Self::count_from(&rows)
    }

    /// Total number of INVITED_BY_USER edges in the graph.
    pub async fn get_num_user_invites(
        &self,
        ctx: &mut impl CypherExecutor,
    ) -> Result<i64, AppError> {
        let rows = ctx
            .query("MATCH (:User)-[r:INVITED_BY_USER]->(:User) RETURN count(r) AS count")
            .fetch_all()
            .await?;

        Self::count_from(&rows)
    }

    /// How many users `user_id` has invited.
    ///
    /// Invite edges point from the invited user to the inviter, so this
    /// counts the edges arriving at `user_id`.
    pub async fn get_num_users_invited_by_id(
        &self,
        ctx: &mut impl CypherExecutor,
        user_id: i64,
    ) -> Result<i64, AppError> {
        let rows = ctx
            .query("MATCH (:User)-[r:INVITED_BY_USER]->(u:User {user_id: $user_id}) RETURN count(r) AS count")
            .param("user_id", user_id)
            .fetch_all()
            .await?;

        Self::count_from(&rows)
    }

    /// How many inviters `user_id` has. Expected to be 0 or 1; anything
    /// larger means the one-inviter convention was violated.
    pub async fn get_num_invites_for_user_by_id(
        &self,
        ctx: &mut impl CypherExecutor,
        user_id: i64,
    ) -> Result<i64, AppError> {
        let rows = ctx
            .query("MATCH (u:User {user_id: $user_id})-[r:INVITED_BY_USER]->(:User) RETURN count(r) AS count")
            .param("user_id", user_id)
            .fetch_all()
            .await?;

        Self::count_from(&rows)
    }

    /// One page of the users invited by `user_id`, ascending by invited id.
    pub async fn get_users_invited_by_id(
        &self,
        ctx: &mut impl CypherExecutor,
        user_id: i64,
        page: Page,
    ) -> Result<Vec<User>, AppError> {
        let rows = ctx
            .query("MATCH (invited:User)-[:INVITED_BY_USER]->(u:User {user_id: $user_id}) RETURN invited ORDER BY invited.user_id ASC SKIP $skip LIMIT $limit")
            .param("user_id", user_id)
            .param("skip", page.skip())
            .param("limit", page.limit())
            .fetch_all()
            .await?;

        Self::rows_to_users(&rows, "invited")
    }

    // ============================================================================
    // Helper methods
    // ============================================================================

    /// Extract the `count` column of an aggregate query's first row.
    fn count_from(rows: &[neo4rs::Row]) -> Result<i64, AppError> {
        match rows.first() {
            Some(row) => row.get("count").map_err(|e| AppError::Query {
                message: e.to_string(),
                query: "get count".to_string(),
            }),
            None => Ok(0),
        }
    }

    /// Convert every row's `field` node to a User.
    fn rows_to_users(rows: &[neo4rs::Row], field: &str) -> Result<Vec<User>, AppError> {
        rows.iter().map(|row| Self::row_to_user(row, field)).collect()
    }

    /// Convert a row's `field` node to a User.
    fn row_to_user(row: &neo4rs::Row, field: &str) -> Result<User, AppError> {
        let node: neo4rs::Node = row.get(field).map_err(|e| AppError::Query {
            message: e.to_string(),
            query: format!("get {} node", field),
        })?;
        Self::node_to_user(&node)
    }

    /// Convert a Neo4j node to a User.
    fn node_to_user(node: &neo4rs::Node) -> Result<User, AppError> {
        let user_id: i64 = node.get("user_id").map_err(|e| AppError::Query {
            message: e.to_string(),
            query: "get user id".to_string(),
        })?;

        let time_created: DateTime<Utc> = node
            .get::<String>("time_created")
            .ok()
            .and_then(|s| DateTime::parse_from_rfc3339(&s).ok())
            .map(|dt| dt.with_timezone(&Utc))
            .unwrap_or_else(Utc::now);

        Ok(User {
            user_id,
            name: Self::optional_text(node, "name"),
            photo_url: Self::optional_text(node, "photo_url"),
            username: Self::optional_text(node, "username"),
            twitter: Self::optional_text(node, "twitter"),
            bio: Self::optional_text(node, "bio"),
            displayname: Self::optional_text(node, "displayname"),
            instagram: Self::optional_text(node, "instagram"),
            num_followers: node.get("num_followers").unwrap_or_default(),
            num_following: node.get("num_following").unwrap_or_default(),
            time_created,
            is_blocked_by_network: node.get("is_blocked_by_network").unwrap_or_default(),
        })
    }

    /// Empty strings encode absent attributes; read them back as None.
    fn optional_text(node: &neo4rs::Node, key: &str) -> Option<String> {
        node.get::<String>(key).ok().filter(|s| !s.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::testing::MockExecutor;

    #[tokio::test]
    async fn absent_user_maps_to_none() {
        let mut executor = MockExecutor::expecting("MATCH (u:User {user_id: $user_id}) RETURN u")
            .param("user_id", 42_i64);

        let user = QueryRepository::default()
            .get_user_by_id(&mut executor, 42)
            .await
            .unwrap();
        assert!(user.is_none());
    }

    #[tokio::test]
    async fn followers_page_binds_window_as_parameters() {
        let mut executor = MockExecutor::expecting(
            "MATCH (f:User)-[:FOLLOWS]->(u:User {user_id: $user_id}) RETURN f ORDER BY f.user_id ASC SKIP $skip LIMIT $limit",
        )
        .param("user_id", 7_i64)
        .param("skip", 20_i64)
        .param("limit", 10_i64);

        let users = QueryRepository::default()
            .get_user_followers_by_id(&mut executor, 7, Page::new(10, 20))
            .await
            .unwrap();
        assert!(users.is_empty());
    }

    #[tokio::test]
    async fn following_traverses_outgoing_edges() {
        let mut executor = MockExecutor::expecting(
            "MATCH (u:User {user_id: $user_id})-[:FOLLOWS]->(f:User) RETURN f ORDER BY f.user_id ASC SKIP $skip LIMIT $limit",
        )
        .param("user_id", 7_i64)
        .param("skip", 0_i64)
        .param("limit", 1000_i64);

        let users = QueryRepository::default()
            .get_following_users_by_id(&mut executor, 7, Page::default())
            .await
            .unwrap();
        assert!(users.is_empty());
    }

    #[tokio::test]
    async fn empty_aggregate_counts_as_zero() {
        let mut executor = MockExecutor::expecting("MATCH (u:User) RETURN count(u) AS count");

        let count = QueryRepository::default()
            .get_num_users(&mut executor)
            .await
            .unwrap();
        assert_eq!(count, 0);
    }

    #[tokio::test]
    async fn num_users_invited_counts_incoming_invite_edges() {
        let mut executor = MockExecutor::expecting(
            "MATCH (:User)-[r:INVITED_BY_USER]->(u:User {user_id: $user_id}) RETURN count(r) AS count",
        )
        .param("user_id", 7_i64);

        let count = QueryRepository::default()
            .get_num_users_invited_by_id(&mut executor, 7)
            .await
            .unwrap();
        assert_eq!(count, 0);
    }

    #[tokio::test]
    async fn num_invites_for_user_counts_outgoing_invite_edges() {
        let mut executor = MockExecutor::expecting(
            "MATCH (u:User {user_id: $user_id})-[r:INVITED_BY_USER]->(:User) RETURN count(r) AS count",
        )
        .param("user_id", 7_i64);

        let count = QueryRepository::default()
            .get_num_invites_for_user_by_id(&mut executor, 7)
            .await
            .unwrap();
        assert_eq!(count, 0);
    }

    #[tokio::test]
    async fn invited_list_returns_the_invited_side() {
        let mut executor = MockExecutor::expecting(
            "MATCH (invited:User)-[:INVITED_BY_USER]->(u:User {user_id: $user_id}) RETURN invited ORDER BY invited.user_id ASC SKIP $skip LIMIT $limit",
        )
        .param("user_id", 7_i64)
        .param("skip", 0_i64)
        .param("limit", 1000_i64);

        let users = QueryRepository::default()
            .get_users_invited_by_id(&mut executor, 7, Page::default())
            .await
            .unwrap();
        assert!(users.is_empty());
    }
}
