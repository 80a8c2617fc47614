//! Relationship repository for follow and invite edges.

use crate::context::Context;
use crate::di::FromContext;
use crate::error::AppError;
use crate::graph::{CypherExecutor, QueryExt};

const UPSERT_FOLLOWS: &str = "MATCH (follower:User {user_id: $follower_id})
 MATCH (followed:User {user_id: $user_id})
 MERGE (follower)-[r:FOLLOWS]->(followed)
 RETURN r";

const UPSERT_INVITED_BY_USER: &str = "MATCH (invited:User {user_id: $user_id})
 MATCH (inviter:User {user_id: $inviter_id})
 MERGE (invited)-[r:INVITED_BY_USER]->(inviter)
 RETURN r";

/// Result of an edge merge.
///
/// A missing endpoint is not an error: the operation writes nothing and
/// reports it here instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeOutcome {
    /// Both endpoints existed; the edge now exists exactly once.
    Merged,
    /// At least one endpoint was absent; nothing was written.
    MissingEndpoint,
}

/// Repository for FOLLOWS and INVITED_BY_USER edge upserts.
///
/// Both edge types anchor on already-existing `:User` nodes: the queries
/// `MATCH` each endpoint before the `MERGE`, so an absent endpoint makes
/// the whole statement a no-op.
#[derive(FromContext, Clone, Default)]
pub struct RelationshipRepository {}

impl RelationshipRepository {
    /// Merges a FOLLOWS edge from `follower_id` to `user_id`.
    ///
    /// Repeated calls converge on a single edge per ordered pair.
    pub async fn upsert_follows(
        &self,
        ctx: &mut impl CypherExecutor,
        follower_id: i64,
        user_id: i64,
    ) -> Result<MergeOutcome, AppError> {
        let rows = ctx
            .query(UPSERT_FOLLOWS)
            .param("follower_id", follower_id)
            .param("user_id", user_id)
            .fetch_all()
            .await?;

        Ok(Self::outcome(&rows))
    }

    /// Merges an INVITED_BY_USER edge from the invited user to the inviter.
    ///
    /// Each user is expected to carry at most one outgoing invite edge.
    /// Repeats of the same pair stay idempotent; a second, different
    /// inviter is not rejected here but shows up in the invite counts.
    pub async fn upsert_invited_by_user(
        &self,
        ctx: &mut impl CypherExecutor,
        inviter_id: i64,
        user_id: i64,
    ) -> Result<MergeOutcome, AppError> {
        let rows = ctx
            .query(UPSERT_INVITED_BY_USER)
            .param("inviter_id", inviter_id)
            .param("user_id", user_id)
            .fetch_all()
            .await?;

        Ok(Self::outcome(&rows))
    }

    // A MATCH-MATCH-MERGE statement yields a row iff both endpoints matched.
    fn outcome(rows: &[neo4rs::Row]) -> MergeOutcome {
        if rows.is_empty() {
            MergeOutcome::MissingEndpoint
        } else {
            MergeOutcome::Merged
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::testing::MockExecutor;

    #[test]
    fn follows_query_anchors_both_endpoints_before_merging() {
        assert!(UPSERT_FOLLOWS.contains("MATCH (follower:User {user_id: $follower_id})"));
        assert!(UPSERT_FOLLOWS.contains("MATCH (followed:User {user_id: $user_id})"));
        assert!(UPSERT_FOLLOWS.contains("MERGE (follower)-[r:FOLLOWS]->(followed)"));
        assert!(UPSERT_FOLLOWS.ends_with("RETURN r"));
    }

    #[test]
    fn invite_edge_points_from_invited_to_inviter() {
        assert!(UPSERT_INVITED_BY_USER.contains("MATCH (invited:User {user_id: $user_id})"));
        assert!(UPSERT_INVITED_BY_USER.contains("MATCH (inviter:User {user_id: $inviter_id})"));
        assert!(UPSERT_INVITED_BY_USER.contains("MERGE (invited)-[r:INVITED_BY_USER]->(inviter)"));
    }

    #[tokio::test]
    async fn missing_endpoint_is_reported_not_raised() {
        let mut executor = MockExecutor::expecting(UPSERT_FOLLOWS)
            .param("follower_id", 1_i64)
            .param("user_id", 2_i64);

        let outcome = RelationshipRepository::default()
            .upsert_follows(&mut executor, 1, 2)
            .await
            .unwrap();
        assert_eq!(outcome, MergeOutcome::MissingEndpoint);
    }

    #[tokio::test]
    async fn invite_upsert_binds_both_ids() {
        let mut executor = MockExecutor::expecting(UPSERT_INVITED_BY_USER)
            .param("inviter_id", 10_i64)
            .param("user_id", 20_i64);

        let outcome = RelationshipRepository::default()
            .upsert_invited_by_user(&mut executor, 10, 20)
            .await
            .unwrap();
        assert_eq!(outcome, MergeOutcome::MissingEndpoint);
    }
}
