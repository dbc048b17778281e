use async_trait::async_trait;
use std::sync::{
    Arc,
    atomic::{AtomicUsize, Ordering},
};

/// Sign-out could not be confirmed by the auth backend.
#[derive(Debug, thiserror::Error)]
#[error("sign-out failed: {0}")]
pub struct SignOutError(pub String);

// 1. IdentityProvider Contract
/// IdentityProvider
///
/// The part of the auth backend this service writes to: revoking a session whose
/// owner must not stay signed in (orphaned or blocked).
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn sign_out(&self, access_token: &str) -> Result<(), SignOutError>;
}

/// IdentityState
///
/// The concrete type used to share the identity provider across the application state.
pub type IdentityState = Arc<dyn IdentityProvider>;

// 2. The Real Implementation (Supabase GoTrue)
/// SupabaseIdentity
///
/// Calls `POST {SUPABASE_URL}/auth/v1/logout` with the project's anon key and the
/// user's own access token, which revokes that session's refresh tokens.
#[derive(Clone)]
pub struct SupabaseIdentity {
    http: reqwest::Client,
    supabase_url: String,
    anon_key: String,
}

impl SupabaseIdentity {
    pub fn new(supabase_url: &str, anon_key: &str) -> Self {
        Self {
            http: reqwest::Client::new(),
            supabase_url: supabase_url.trim_end_matches('/').to_string(),
            anon_key: anon_key.to_string(),
        }
    }
}

#[async_trait]
impl IdentityProvider for SupabaseIdentity {
    async fn sign_out(&self, access_token: &str) -> Result<(), SignOutError> {
        let url = format!("{}/auth/v1/logout", self.supabase_url);

        let response = self
            .http
            .post(url)
            .header("apikey", &self.anon_key)
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(|e| SignOutError(e.to_string()))?;

        if !response.status().is_success() {
            return Err(SignOutError(format!(
                "auth backend answered {}",
                response.status()
            )));
        }

        Ok(())
    }
}

// 3. The Mock Implementation (For Tests)
/// MockIdentity
///
/// Counts sign-out calls; `should_fail` simulates an unreachable auth backend.
#[derive(Default)]
pub struct MockIdentity {
    pub should_fail: bool,
    calls: AtomicUsize,
}

impl MockIdentity {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn new_failing() -> Self {
        Self {
            should_fail: true,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn sign_out_calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl IdentityProvider for MockIdentity {
    async fn sign_out(&self, _access_token: &str) -> Result<(), SignOutError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.should_fail {
            return Err(SignOutError("Mock identity error: simulation requested".to_string()));
        }
        Ok(())
    }
}
