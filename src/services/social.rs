//! Social graph service for business logic around users and relationships.

use std::sync::Arc;

use neo4rs::Graph;
use serde::Serialize;

use crate::context::Context;
use crate::di::FromContext;
use crate::error::AppError;
use crate::models::{Page, User, UserProfile};
use crate::repositories::{MergeOutcome, QueryRepository, RelationshipRepository, UserRepository};

/// Global node and edge counts.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct GraphStats {
    pub users: i64,
    pub follows: i64,
    pub invites: i64,
}

/// High-level facade over the social graph.
///
/// Owns the pool handle and hands each operation its own auto-commit
/// session. Callers that need multi-statement atomicity skip the facade
/// and drive the repositories with a transaction instead.
#[derive(FromContext, Clone)]
pub struct SocialGraphService {
    graph: Arc<Graph>,
    users: UserRepository,
    relationships: RelationshipRepository,
    queries: QueryRepository,
}

impl SocialGraphService {
    /// A fresh auto-commit session on the shared pool.
    fn session(&self) -> Graph {
        self.graph.as_ref().clone()
    }

    /// Upsert a user profile under the configured policy.
    pub async fn upsert_user(&self, profile: &UserProfile) -> Result<User, AppError> {
        let mut session = self.session();
        self.users.upsert(&mut session, profile).await
    }

    /// Merge a FOLLOWS edge from follower to followed.
    pub async fn upsert_follows(
        &self,
        follower_id: i64,
        user_id: i64,
    ) -> Result<MergeOutcome, AppError> {
        let mut session = self.session();
        self.relationships
            .upsert_follows(&mut session, follower_id, user_id)
            .await
    }

    /// Merge an INVITED_BY_USER edge from the invited user to the inviter.
    pub async fn upsert_invited_by_user(
        &self,
        inviter_id: i64,
        user_id: i64,
    ) -> Result<MergeOutcome, AppError> {
        let mut session = self.session();
        self.relationships
            .upsert_invited_by_user(&mut session, inviter_id, user_id)
            .await
    }

    /// Look up a user by id.
    pub async fn user_by_id(&self, user_id: i64) -> Result<Option<User>, AppError> {
        let mut session = self.session();
        self.queries.get_user_by_id(&mut session, user_id).await
    }

    /// Followers of a user. A zero limit selects the default page size.
    pub async fn followers_by_id(
        &self,
        user_id: i64,
        limit: u32,
        skip: u32,
    ) -> Result<Vec<User>, AppError> {
        let limit = if limit == 0 { Page::DEFAULT_LIMIT } else { limit };
        let mut session = self.session();
        self.queries
            .get_user_followers_by_id(&mut session, user_id, Page::new(limit, skip))
            .await
    }

    /// Users a user follows. A zero limit selects the default page size.
    pub async fn following_by_id(
        &self,
        user_id: i64,
        limit: u32,
        skip: u32,
    ) -> Result<Vec<User>, AppError> {
        let limit = if limit == 0 { Page::DEFAULT_LIMIT } else { limit };
        let mut session = self.session();
        self.queries
            .get_following_users_by_id(&mut session, user_id, Page::new(limit, skip))
            .await
    }

    /// Users invited by a user. A zero limit selects the default page size.
    pub async fn users_invited_by_id(
        &self,
        user_id: i64,
        limit: u32,
        skip: u32,
    ) -> Result<Vec<User>, AppError> {
        let limit = if limit == 0 { Page::DEFAULT_LIMIT } else { limit };
        let mut session = self.session();
        self.queries
            .get_users_invited_by_id(&mut session, user_id, Page::new(limit, skip))
            .await
    }

    /// Number of followers a user has.
    pub async fn num_followers_by_id(&self, user_id: i64) -> Result<i64, AppError> {
        let mut session = self.session();
        self.queries
            .get_num_followers_by_id(&mut session, user_id)
            .await
    }

    /// Number of users a user follows.
    pub async fn num_following_by_id(&self, user_id: i64) -> Result<i64, AppError> {
        let mut session = self.session();
        self.queries
            .get_num_following_by_id(&mut session, user_id)
            .await
    }

    /// Number of users a user has invited.
    pub async fn num_users_invited_by_id(&self, user_id: i64) -> Result<i64, AppError> {
        let mut session = self.session();
        self.queries
            .get_num_users_invited_by_id(&mut session, user_id)
            .await
    }

    /// Number of inviters a user has (0 or 1 when the data is healthy).
    pub async fn num_invites_for_user_by_id(&self, user_id: i64) -> Result<i64, AppError> {
        let mut session = self.session();
        self.queries
            .get_num_invites_for_user_by_id(&mut session, user_id)
            .await
    }

    /// Total number of users.
    pub async fn num_users(&self) -> Result<i64, AppError> {
        let mut session = self.session();
        self.queries.get_num_users(&mut session).await
    }

    /// Total number of FOLLOWS edges.
    pub async fn num_followers(&self) -> Result<i64, AppError> {
        let mut session = self.session();
        self.queries.get_num_followers(&mut session).await
    }

    /// Total number of INVITED_BY_USER edges.
    pub async fn num_user_invites(&self) -> Result<i64, AppError> {
        let mut session = self.session();
        self.queries.get_num_user_invites(&mut session).await
    }

    /// Snapshot of the global counts, computed concurrently over three
    /// sessions.
    pub async fn stats(&self) -> Result<GraphStats, AppError> {
        let mut users_session = self.session();
        let mut follows_session = self.session();
        let mut invites_session = self.session();

        let (users, follows, invites) = futures::try_join!(
            self.queries.get_num_users(&mut users_session),
            self.queries.get_num_followers(&mut follows_session),
            self.queries.get_num_user_invites(&mut invites_session),
        )?;

        Ok(GraphStats {
            users,
            follows,
            invites,
        })
    }
}
