//! User repository for profile node upserts.

use chrono::{DateTime, Utc};

use crate::context::{AppSanitizer, Context};
use crate::di::FromContext;
use crate::error::AppError;
use crate::graph::{CypherExecutor, QueryExt};
use crate::models::{UpsertPolicy, User, UserProfile};

/// Repository for writing `:User` nodes.
///
/// The merge key is `user_id`; what happens to the other attributes on a
/// repeat upsert is governed by the configured [`UpsertPolicy`].
#[derive(FromContext, Clone)]
pub struct UserRepository {
    sanitizer: AppSanitizer,
    policy: UpsertPolicy,
}

impl UserRepository {
    /// Replaces the configured policy.
    pub fn with_policy(mut self, policy: UpsertPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Idempotently writes a user node and returns the stored state.
    ///
    /// Under [`UpsertPolicy::CreateOnly`] a repeat upsert for the same
    /// `user_id` leaves the stored attributes untouched, so the returned
    /// [`User`] reflects the first write, not this call's input. The bio
    /// passes through the sanitizer exactly once before binding.
    pub async fn upsert(
        &self,
        ctx: &mut impl CypherExecutor,
        profile: &UserProfile,
    ) -> Result<User, AppError> {
        let bio = self
            .sanitizer
            .sanitize(profile.bio.as_deref().unwrap_or_default());

        let row = ctx
            .query(merge_user_query(self.policy))
            .param("user_id", profile.user_id)
            .param("name", profile.name.clone().unwrap_or_default())
            .param("photo_url", profile.photo_url.clone().unwrap_or_default())
            .param("username", profile.username.clone().unwrap_or_default())
            .param("twitter", profile.twitter.clone().unwrap_or_default())
            .param("bio", bio)
            .param("displayname", profile.displayname.clone().unwrap_or_default())
            .param("instagram", profile.instagram.clone().unwrap_or_default())
            .param("num_followers", profile.num_followers)
            .param("num_following", profile.num_following)
            .param("time_created", profile.time_created.to_rfc3339())
            .param("is_blocked_by_network", profile.is_blocked_by_network)
            .fetch_one()
            .await?;

        match row {
            Some(row) => Self::row_to_user(&row),
            None => Err(AppError::Query {
                message: "user merge returned no row".to_string(),
                query: "upsert user".to_string(),
            }),
        }
    }

    /// Convert a row's `u` field to a User.
    fn row_to_user(row: &neo4rs::Row) -> Result<User, AppError> {
        let node: neo4rs::Node = row.get("u").map_err(|e| AppError::Query {
            message: e.to_string(),
            query: "get u node".to_string(),
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
            name: optional_text(node, "name"),
            photo_url: optional_text(node, "photo_url"),
            username: optional_text(node, "username"),
            twitter: optional_text(node, "twitter"),
            bio: optional_text(node, "bio"),
            displayname: optional_text(node, "displayname"),
            instagram: optional_text(node, "instagram"),
            num_followers: node.get("num_followers").unwrap_or_default(),
            num_following: node.get("num_following").unwrap_or_default(),
            time_created,
            is_blocked_by_network: node.get("is_blocked_by_network").unwrap_or_default(),
        })
    }
}

/// Empty strings encode absent attributes; read them back as None.
fn optional_text(node: &neo4rs::Node, key: &str) -> Option<String> {
    node.get::<String>(key).ok().filter(|s| !s.is_empty())
}

/// The merge query for a given policy.
///
/// All three share the `MERGE` on the key plus the `ON CREATE SET` block;
/// the policies differ only in what a match does to the stored attributes.
fn merge_user_query(policy: UpsertPolicy) -> &'static str {
    match policy {
        UpsertPolicy::CreateOnly => {
            "MERGE (u:User {user_id: $user_id})
             ON CREATE SET u.name = $name,
                 u.photo_url = $photo_url,
                 u.username = $username,
                 u.twitter = $twitter,
                 u.bio = $bio,
                 u.displayname = $displayname,
                 u.instagram = $instagram,
                 u.num_followers = $num_followers,
                 u.num_following = $num_following,
                 u.time_created = $time_created,
                 u.is_blocked_by_network = $is_blocked_by_network
             RETURN u"
        }
        UpsertPolicy::OverwriteOnConflict => {
            "MERGE (u:User {user_id: $user_id})
             ON CREATE SET u.name = $name,
                 u.photo_url = $photo_url,
                 u.username = $username,
                 u.twitter = $twitter,
                 u.bio = $bio,
                 u.displayname = $displayname,
                 u.instagram = $instagram,
                 u.num_followers = $num_followers,
                 u.num_following = $num_following,
                 u.time_created = $time_created,
                 u.is_blocked_by_network = $is_blocked_by_network
             ON MATCH SET u.name = $name,
                 u.photo_url = $photo_url,
                 u.username = $username,
                 u.twitter = $twitter,
                 u.bio = $bio,
                 u.displayname = $displayname,
                 u.instagram = $instagram,
                 u.num_followers = $num_followers,
                 u.num_following = $num_following,
                 u.time_created = $time_created,
                 u.is_blocked_by_network = $is_blocked_by_network
             RETURN u"
        }
        // Text attributes stored as '' count as absent and get filled; the
        // counts, timestamp and block flag always carry a value once the
        // node exists, so a match keeps them.
        UpsertPolicy::MergeFields => {
            "MERGE (u:User {user_id: $user_id})
             ON CREATE SET u.name = $name,
                 u.photo_url = $photo_url,
                 u.username = $username,
                 u.twitter = $twitter,
                 u.bio = $bio,
                 u.displayname = $displayname,
                 u.instagram = $instagram,
                 u.num_followers = $num_followers,
                 u.num_following = $num_following,
                 u.time_created = $time_created,
                 u.is_blocked_by_network = $is_blocked_by_network
             ON MATCH SET u.name = CASE WHEN u.name IS NULL OR u.name = '' THEN $name ELSE u.name END,
                 u.photo_url = CASE WHEN u.photo_url IS NULL OR u.photo_url = '' THEN $photo_url ELSE u.photo_url END,
                 u.username = CASE WHEN u.username IS NULL OR u.username = '' THEN $username ELSE u.username END,
                 u.twitter = CASE WHEN u.twitter IS NULL OR u.twitter = '' THEN $twitter ELSE u.twitter END,
                 u.bio = CASE WHEN u.bio IS NULL OR u.bio = '' THEN $bio ELSE u.bio END,
                 u.displayname = CASE WHEN u.displayname IS NULL OR u.displayname = '' THEN $displayname ELSE u.displayname END,
                 u.instagram = CASE WHEN u.instagram IS NULL OR u.instagram = '' THEN $instagram ELSE u.instagram END
             RETURN u"
        }
    }
}
