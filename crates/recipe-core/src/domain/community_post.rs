use chrono::{DateTime, Utc};
use serde::Deserialize;

use super::{collections, loose};
use crate::error::DomainError;
use crate::ports::{DocumentSnapshot, Fields};

/// A post in the community feed.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommunityPost {
    #[serde(skip)]
    pub id: String,
    #[serde(default, deserialize_with = "loose::text")]
    pub user_id: String,
    #[serde(default, deserialize_with = "loose::text")]
    pub user_name: String,
    #[serde(default, deserialize_with = "loose::text")]
    pub content: String,
    /// Ids of the users who liked the post, each at most once.
    #[serde(default, deserialize_with = "loose::string_set")]
    pub likes: Vec<String>,
    /// Assigned by the backend. `None` until the write is acknowledged.
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl CommunityPost {
    pub fn from_document(doc: &DocumentSnapshot) -> Result<Self, DomainError> {
        let mut post: CommunityPost = doc.decode().map_err(|e| DomainError::Malformed {
            collection: collections::COMMUNITY_POSTS,
            id: doc.id.clone(),
            reason: e.to_string(),
        })?;
        post.id = doc.id.clone();
        Ok(post)
    }

    /// Field writes for a brand new post: no likes, backend-assigned timestamp.
    pub fn new_fields(user_id: &str, user_name: &str, content: &str) -> Fields {
        Fields::new()
            .set("userId", user_id)
            .set("userName", user_name)
            .set("content", content)
            .set("likes", serde_json::Value::Array(Vec::new()))
            .server_timestamp("createdAt")
    }

    pub fn is_liked_by(&self, user_id: &str) -> bool {
        self.likes.iter().any(|id| id == user_id)
    }

    pub fn like_count(&self) -> usize {
        self.likes.len()
    }
}
