//! Opaque bearer tokens.
//!
//! A token is 32 random bytes, base64url-encoded. The token maps to the user it
//! was issued to in a `moka` cache whose time-to-live is the token lifetime;
//! an expired or unknown token simply does not resolve.

use std::time::Duration;

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use moka::future::Cache;
use rand::RngCore;

use crate::models::CurrentUser;

const TOKEN_BYTES: usize = 32;
const MAX_LIVE_TOKENS: u64 = 100_000;

/// Issued tokens and the users they belong to.
#[derive(Clone)]
pub struct TokenStore {
    sessions: Cache<String, CurrentUser>,
}

impl std::fmt::Debug for TokenStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenStore")
            .field("live_tokens", &self.sessions.entry_count())
            .finish_non_exhaustive()
    }
}

impl TokenStore {
    /// Create a store whose tokens expire `ttl` after issue.
    #[must_use]
    pub fn new(ttl: Duration) -> Self {
        let sessions = Cache::builder()
            .max_capacity(MAX_LIVE_TOKENS)
            .time_to_live(ttl)
            .build();
        Self { sessions }
    }

    /// Issue a fresh token for `user`.
    pub async fn issue(&self, user: CurrentUser) -> String {
        let token = generate_token();
        self.sessions.insert(token.clone(), user).await;
        token
    }

    /// Resolve a token to its user, if it is live.
    pub async fn verify(&self, token: &str) -> Option<CurrentUser> {
        self.sessions.get(token).await
    }
}

fn generate_token() -> String {
    let mut bytes = [0u8; TOKEN_BYTES];
    rand::rng().fill_bytes(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}

#[cfg(test)]
mod tests {
    use yarnshop_core::UserId;

    use super::*;

    fn user() -> CurrentUser {
        CurrentUser {
            id: UserId::new(1),
            username: "weaver".to_owned(),
        }
    }

    #[tokio::test]
    async fn test_issue_and_verify() {
        let store = TokenStore::new(Duration::from_secs(60));
        let token = store.issue(user()).await;

        assert_eq!(token.len(), 43);
        assert_eq!(store.verify(&token).await, Some(user()));
        assert_eq!(store.verify("not-a-token").await, None);
    }

    #[tokio::test]
    async fn test_tokens_are_unique() {
        let store = TokenStore::new(Duration::from_secs(60));
        let a = store.issue(user()).await;
        let b = store.issue(user()).await;
        assert_ne!(a, b);
        assert!(store.verify(&a).await.is_some());
        assert!(store.verify(&b).await.is_some());
    }

    #[tokio::test]
    async fn test_tokens_expire() {
        let store = TokenStore::new(Duration::from_millis(50));
        let token = store.issue(user()).await;
        tokio::time::sleep(Duration::from_millis(150)).await;
        assert_eq!(store.verify(&token).await, None);
    }
}
