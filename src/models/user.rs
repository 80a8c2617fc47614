//! User model representing profile nodes in the social graph.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A user node in the social graph.
///
/// This is the read model: what a stored `:User` node maps back to.
/// Optional attributes are persisted as empty strings and come back
/// as `None`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    /// Globally unique identifier, the node's merge key.
    pub user_id: i64,
    /// Full name.
    pub name: Option<String>,
    /// Avatar URL.
    pub photo_url: Option<String>,
    /// Handle within this network.
    pub username: Option<String>,
    /// Linked Twitter handle.
    pub twitter: Option<String>,
    /// Free-text bio, sanitized before persistence.
    pub bio: Option<String>,
    /// Preferred display name.
    pub displayname: Option<String>,
    /// Linked Instagram handle.
    pub instagram: Option<String>,
    /// Follower-count snapshot supplied by the caller, not derived from edges.
    pub num_followers: i64,
    /// Following-count snapshot supplied by the caller, not derived from edges.
    pub num_following: i64,
    /// Account creation time.
    pub time_created: DateTime<Utc>,
    /// Whether the network has blocked this account.
    pub is_blocked_by_network: bool,
}

/// An inbound user profile payload.
///
/// What the ingestion side hands to
/// [`UserRepository::upsert`](crate::repositories::UserRepository::upsert).
/// Timestamps arrive as ISO-8601 strings and parse at this boundary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserProfile {
    pub user_id: i64,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub photo_url: Option<String>,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub twitter: Option<String>,
    #[serde(default)]
    pub bio: Option<String>,
    #[serde(default)]
    pub displayname: Option<String>,
    #[serde(default)]
    pub instagram: Option<String>,
    #[serde(default)]
    pub num_followers: i64,
    #[serde(default)]
    pub num_following: i64,
    pub time_created: DateTime<Utc>,
    #[serde(default)]
    pub is_blocked_by_network: bool,
}

/// How a user upsert treats a node that already exists.
///
/// The merge key is always `user_id`; the policy only governs the other
/// attributes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum UpsertPolicy {
    /// Attributes are written only when the node is created; later upserts
    /// with the same `user_id` leave them untouched (first write wins).
    #[default]
    CreateOnly,
    /// Later upserts replace every attribute with the incoming values.
    OverwriteOnConflict,
    /// Later upserts fill in attributes the stored node lacks and keep
    /// the ones it already carries.
    MergeFields,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_profile_parses_iso8601_timestamps() {
        let json = r#"{
            "user_id": 42,
            "name": "Ada",
            "time_created": "2021-03-04T05:06:07Z"
        }"#;
        let profile: UserProfile = serde_json::from_str(json).unwrap();
        assert_eq!(profile.user_id, 42);
        assert_eq!(profile.name.as_deref(), Some("Ada"));
        assert_eq!(
            profile.time_created.to_rfc3339(),
            "2021-03-04T05:06:07+00:00"
        );
        assert_eq!(profile.num_followers, 0);
        assert!(!profile.is_blocked_by_network);
    }

    #[test]
    fn upsert_policy_defaults_to_create_only() {
        assert_eq!(UpsertPolicy::default(), UpsertPolicy::CreateOnly);
    }

    #[test]
    fn upsert_policy_uses_kebab_case() {
        let policy: UpsertPolicy = serde_json::from_str("\"overwrite-on-conflict\"").unwrap();
        assert_eq!(policy, UpsertPolicy::OverwriteOnConflict);
        assert_eq!(
            serde_json::to_string(&UpsertPolicy::MergeFields).unwrap(),
            "\"merge-fields\""
        );
    }
}
