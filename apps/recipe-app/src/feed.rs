//! Community feed synchronizer.

use std::sync::Arc;

use futures::StreamExt;
use serde_json::Value;
use tokio::sync::watch;

use recipe_core::DomainError;
use recipe_core::domain::{CommunityPost, collections, display_name_from_email};
use recipe_core::ports::{Direction, DocumentStore, Fields, Query};

use crate::error::AppResult;
use crate::gateway::decode_or_skip;
use crate::session::SessionManager;
use crate::subscription::Subscription;

/// Live view of every community post, newest first.
#[derive(Clone)]
pub struct CommunityFeed {
    store: Arc<dyn DocumentStore>,
    session: SessionManager,
    posts: watch::Sender<Vec<CommunityPost>>,
}

impl CommunityFeed {
    pub fn new(store: Arc<dyn DocumentStore>, session: SessionManager) -> Self {
        Self {
            store,
            session,
            posts: watch::channel(Vec::new()).0,
        }
    }

    pub fn start(&self) -> Subscription {
        let store = self.store.clone();
        let posts = self.posts.clone();

        Subscription::spawn("community-feed", async move {
            let query = Query::collection(collections::COMMUNITY_POSTS)
                .order_by("createdAt", Direction::Descending);
            let mut snapshots = match store.watch(query).await {
                Ok(snapshots) => snapshots,
                Err(e) => {
                    tracing::error!(error = %e, "Error opening community feed");
                    return;
                }
            };

            while let Some(emission) = snapshots.next().await {
                match emission {
                    Ok(docs) => {
                        let decoded: Vec<CommunityPost> = docs
                            .iter()
                            .filter_map(|doc| decode_or_skip(doc, CommunityPost::from_document))
                            .collect();
                        posts.send_replace(decoded);
                    }
                    Err(e) => tracing::error!(error = %e, "Error fetching community posts"),
                }
            }
        })
    }

    pub fn subscribe(&self) -> watch::Receiver<Vec<CommunityPost>> {
        self.posts.subscribe()
    }

    pub fn posts(&self) -> Vec<CommunityPost> {
        self.posts.borrow().clone()
    }

    /// Publish a post as the signed-in user. Returns the new post's id.
    pub async fn create_post(&self, content: &str) -> AppResult<String> {
        let user = self
            .session
            .current_user()
            .ok_or(DomainError::LoginRequired("share a post"))?;
        if content.trim().is_empty() {
            return Err(DomainError::validation("Post cannot be empty.").into());
        }

        let profile_email = self.session.profile().map(|p| p.email);
        let user_name =
            display_name_from_email(profile_email.as_deref().or(user.email.as_deref()));

        let id = self
            .store
            .add(
                collections::COMMUNITY_POSTS,
                CommunityPost::new_fields(&user.uid, &user_name, content),
            )
            .await?;

        tracing::info!(post_id = %id, uid = %user.uid, "Community post created");
        Ok(id)
    }

    /// Like or unlike a post depending on whether the signed-in user is in
    /// `current_likes`. Returns whether the post is now liked.
    ///
    /// The like set is changed with an atomic array union or removal, never
    /// rewritten from the client's copy.
    pub async fn toggle_like(&self, post_id: &str, current_likes: &[String]) -> AppResult<bool> {
        let user = self
            .session
            .current_user()
            .ok_or(DomainError::LoginRequired("like posts"))?;

        let liked = current_likes.iter().any(|id| *id == user.uid);
        let uid = vec![Value::String(user.uid.clone())];
        let fields = if liked {
            Fields::new().array_remove("likes", uid)
        } else {
            Fields::new().array_union("likes", uid)
        };

        self.store
            .update(collections::COMMUNITY_POSTS, post_id, fields)
            .await?;
        Ok(!liked)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use recipe_core::ports::AuthProvider;
    use recipe_infra::{Argon2PasswordService, InMemoryAuthProvider, InMemoryDocumentStore};

    struct Harness {
        store: InMemoryDocumentStore,
        auth: Arc<InMemoryAuthProvider>,
        session: SessionManager,
        feed: CommunityFeed,
    }

    fn harness() -> Harness {
        let store = InMemoryDocumentStore::new();
        let auth = Arc::new(InMemoryAuthProvider::new(Arc::new(
            Argon2PasswordService::lightweight().unwrap(),
        )));
        let session = SessionManager::new(auth.clone(), Arc::new(store.clone()), None);
        let feed = CommunityFeed::new(Arc::new(store.clone()), session.clone());
        Harness {
            store,
            auth,
            session,
            feed,
        }
    }

    async fn sign_up(h: &Harness, email: &str) -> String {
        let user = h.auth.create_user(email, "secret1").await.unwrap();
        h.session.settled_for(Some(user.uid.as_str())).await;
        user.uid
    }

    #[tokio::test]
    async fn test_guest_cannot_post_or_like() {
        let h = harness();

        assert!(h.feed.create_post("Hello").await.unwrap_err().is_login_required());
        assert!(h.feed.toggle_like("p1", &[]).await.unwrap_err().is_login_required());
        assert_eq!(h.store.operation_count(), 0);
    }

    #[tokio::test]
    async fn test_blank_post_is_rejected() {
        let h = harness();
        let _session = h.session.start();
        sign_up(&h, "cook@example.com").await;
        let calls = h.store.operation_count();

        let err = h.feed.create_post("   \n ").await.unwrap_err();

        assert_eq!(err.to_alert().message, "Post cannot be empty.");
        assert_eq!(h.store.operation_count(), calls);
    }

    #[tokio::test]
    async fn test_posts_arrive_newest_first() {
        let h = harness();
        let _session = h.session.start();
        let _feed = h.feed.start();
        sign_up(&h, "cook@example.com").await;

        h.feed.create_post("first").await.unwrap();
        h.feed.create_post("second").await.unwrap();

        let posts = h
            .feed
            .subscribe()
            .wait_for(|posts| posts.len() == 2)
            .await
            .unwrap()
            .clone();
        assert_eq!(posts[0].content, "second");
        assert_eq!(posts[1].content, "first");
        assert_eq!(posts[0].user_name, "cook");
        assert!(posts[0].likes.is_empty());
    }

    #[tokio::test]
    async fn test_like_then_unlike_restores_likes() {
        let h = harness();
        let _session = h.session.start();
        let uid = sign_up(&h, "cook@example.com").await;

        let post_id = h.feed.create_post("hello").await.unwrap();

        assert!(h.feed.toggle_like(&post_id, &[]).await.unwrap());
        let doc = h.store.get(collections::COMMUNITY_POSTS, &post_id).await.unwrap().unwrap();
        let liked = CommunityPost::from_document(&doc).unwrap();
        assert_eq!(liked.likes, vec![uid.clone()]);

        assert!(!h.feed.toggle_like(&post_id, &liked.likes).await.unwrap());
        let doc = h.store.get(collections::COMMUNITY_POSTS, &post_id).await.unwrap().unwrap();
        assert!(CommunityPost::from_document(&doc).unwrap().likes.is_empty());
    }

    #[tokio::test]
    async fn test_repeated_like_keeps_single_entry() {
        let h = harness();
        let _session = h.session.start();
        sign_up(&h, "cook@example.com").await;
        let post_id = h.feed.create_post("hello").await.unwrap();

        // A stale view that does not yet show the like.
        h.feed.toggle_like(&post_id, &[]).await.unwrap();
        h.feed.toggle_like(&post_id, &[]).await.unwrap();

        let doc = h.store.get(collections::COMMUNITY_POSTS, &post_id).await.unwrap().unwrap();
        assert_eq!(CommunityPost::from_document(&doc).unwrap().like_count(), 1);
    }
}
