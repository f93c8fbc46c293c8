//! Client-side authentication state.

use tokio::sync::RwLock;

/// Whether the client currently holds an access token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthState {
    Anonymous,
    Authenticated { access_token: String },
}

#[derive(Debug, Default)]
struct Inner {
    access_token: Option<String>,
    epoch: u64,
}

/// Access token holder.
///
/// The epoch changes on every token change, so a request can tell whether
/// the token it was sent with is still current.
#[derive(Debug, Default)]
pub struct AuthSession {
    inner: RwLock<Inner>,
}

impl AuthSession {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn state(&self) -> AuthState {
        match &self.inner.read().await.access_token {
            Some(token) => AuthState::Authenticated {
                access_token: token.clone(),
            },
            None => AuthState::Anonymous,
        }
    }

    pub async fn is_authenticated(&self) -> bool {
        self.inner.read().await.access_token.is_some()
    }

    /// Current token and epoch.
    pub(crate) async fn snapshot(&self) -> (Option<String>, u64) {
        let inner = self.inner.read().await;
        (inner.access_token.clone(), inner.epoch)
    }

    /// Enter `Authenticated` with `token`.
    pub async fn set_token(&self, token: impl Into<String>) {
        let mut inner = self.inner.write().await;
        inner.access_token = Some(token.into());
        inner.epoch += 1;
    }

    /// Enter `Anonymous`.
    pub async fn clear(&self) {
        let mut inner = self.inner.write().await;
        inner.access_token = None;
        inner.epoch += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_transitions_bump_epoch() {
        let session = AuthSession::new();
        assert_eq!(session.state().await, AuthState::Anonymous);
        let (_, start) = session.snapshot().await;

        session.set_token("t1").await;
        let (token, epoch) = session.snapshot().await;
        assert_eq!(token.as_deref(), Some("t1"));
        assert_eq!(epoch, start + 1);

        session.clear().await;
        assert!(!session.is_authenticated().await);
        assert_eq!(session.snapshot().await.1, start + 2);
    }
}
