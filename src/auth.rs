use async_trait::async_trait;
use std::error::Error;
use tokio::sync::watch;

use crate::model::UserInfo;

/// Opaque authentication capability: sign in, sign out, and observe the
/// current user as it changes.
///
/// `subscribe` hands out a long-lived receiver delivering user-present /
/// user-absent events; dropping the receiver is the teardown contract, so
/// a view that navigates away simply lets its handle fall out of scope.
/// Consumers re-derive user-dependent state on every event instead of
/// reading the identity once.
#[async_trait]
pub trait AuthGateway: Send + Sync {
    async fn sign_in(&self) -> Result<UserInfo, Box<dyn Error + Send + Sync>>;

    async fn sign_out(&self) -> Result<(), Box<dyn Error + Send + Sync>>;

    /// The signed-in user right now, if any
    fn current_user(&self) -> Option<UserInfo>;

    /// Subscribe to authentication-state changes
    fn subscribe(&self) -> watch::Receiver<Option<UserInfo>>;
}

/// In-process [`AuthGateway`] over a single local account. Used by tests
/// and the CLI.
pub struct MemoryAuth {
    profile: UserInfo,
    state: watch::Sender<Option<UserInfo>>,
}

impl MemoryAuth {
    /// Gateway for the given account, initially signed out
    pub fn new(profile: UserInfo) -> Self {
        let (state, _) = watch::channel(None);
        Self { profile, state }
    }

    /// Gateway for the given account, already signed in
    pub fn signed_in(profile: UserInfo) -> Self {
        let (state, _) = watch::channel(Some(profile.clone()));
        Self { profile, state }
    }
}

impl Default for MemoryAuth {
    fn default() -> Self {
        Self::new(UserInfo {
            uid: "local".to_string(),
            email: None,
        })
    }
}

#[async_trait]
impl AuthGateway for MemoryAuth {
    async fn sign_in(&self) -> Result<UserInfo, Box<dyn Error + Send + Sync>> {
        self.state.send_replace(Some(self.profile.clone()));
        Ok(self.profile.clone())
    }

    async fn sign_out(&self) -> Result<(), Box<dyn Error + Send + Sync>> {
        self.state.send_replace(None);
        Ok(())
    }

    fn current_user(&self) -> Option<UserInfo> {
        self.state.borrow().clone()
    }

    fn subscribe(&self) -> watch::Receiver<Option<UserInfo>> {
        self.state.subscribe()
    }
}
