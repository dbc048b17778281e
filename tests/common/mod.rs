//! Shared fixtures for the integration tests: a controllable in-memory repository,
//! state builders and token minting.
#![allow(dead_code)]

use async_trait::async_trait;
use chrono::Utc;
use club_manager::{
    AppState,
    auth::{AuthUser, Claims, SUPABASE_AUDIENCE, Session},
    config::AppConfig,
    error::RepositoryError,
    identity::MockIdentity,
    mailer::{MailerState, MockMailer},
    models::{
        ActivityLog, Club, ClubCounts, Match, NewActivityLog, Participation, Player, Profile,
    },
    repository::Repository,
};
use jsonwebtoken::{EncodingKey, Header, encode};
use std::{
    sync::{
        Arc, Mutex,
        atomic::{AtomicUsize, Ordering},
    },
    time::SystemTime,
};
use uuid::Uuid;

pub const TEST_JWT_SECRET: &str = "test-secret-value-1234567890";

// --- MOCK REPOSITORY ---

/// Canned outputs plus a record of what the code under test asked for.
#[derive(Default)]
pub struct MockRepo {
    pub profiles: Vec<Profile>,
    pub fail_profile_lookup: bool,
    pub fail_activity_insert: bool,
    pub counts: ClubCounts,
    pub recent: Vec<ActivityLog>,
    pub players: Vec<Player>,
    pub fixture: Option<Match>,
    pub participations: Vec<Participation>,

    // Recorded calls.
    pub profile_queries: AtomicUsize,
    pub logs: Mutex<Vec<NewActivityLog>>,
    pub convocations: Mutex<Vec<(Uuid, Vec<Uuid>)>>,
    pub participation_scopes: Mutex<Vec<(Uuid, Uuid, Option<Uuid>)>>,
    /// Clubs created through onboarding, keyed by the attached profile.
    pub created_clubs: Mutex<Vec<(Uuid, Club)>>,
}

impl MockRepo {
    pub fn with_profile(profile: Profile) -> Self {
        Self {
            profiles: vec![profile],
            ..Self::default()
        }
    }

    pub fn failing() -> Self {
        Self {
            fail_profile_lookup: true,
            ..Self::default()
        }
    }

    pub fn profile_queries(&self) -> usize {
        self.profile_queries.load(Ordering::SeqCst)
    }

    pub fn logs(&self) -> Vec<NewActivityLog> {
        self.logs.lock().unwrap().clone()
    }

    pub fn convocations(&self) -> Vec<(Uuid, Vec<Uuid>)> {
        self.convocations.lock().unwrap().clone()
    }

    pub fn participation_scopes(&self) -> Vec<(Uuid, Uuid, Option<Uuid>)> {
        self.participation_scopes.lock().unwrap().clone()
    }

    pub fn created_clubs(&self) -> Vec<(Uuid, Club)> {
        self.created_clubs.lock().unwrap().clone()
    }

    // Profile as currently stored, including a club attached by onboarding.
    fn stored_profile(&self, id: Uuid) -> Option<Profile> {
        let mut profile = self.profiles.iter().find(|p| p.id == id).cloned()?;
        if let Some((_, club)) = self
            .created_clubs
            .lock()
            .unwrap()
            .iter()
            .find(|(owner, _)| *owner == id)
        {
            profile.club_id = Some(club.id);
        }
        Some(profile)
    }
}

fn unreachable_store() -> RepositoryError {
    RepositoryError::Database(sqlx::Error::PoolTimedOut)
}

#[async_trait]
impl Repository for MockRepo {
    async fn get_profile(&self, id: Uuid) -> Result<Option<Profile>, RepositoryError> {
        self.profile_queries.fetch_add(1, Ordering::SeqCst);
        if self.fail_profile_lookup {
            return Err(unreachable_store());
        }
        Ok(self.stored_profile(id))
    }

    async fn find_profile_by_email(
        &self,
        email: &str,
    ) -> Result<Option<Profile>, RepositoryError> {
        Ok(self
            .profiles
            .iter()
            .find(|p| p.email.eq_ignore_ascii_case(email.trim()))
            .cloned())
    }

    async fn list_profiles(&self) -> Result<Vec<Profile>, RepositoryError> {
        Ok(self.profiles.clone())
    }

    async fn set_profile_blocked(
        &self,
        id: Uuid,
        is_blocked: bool,
    ) -> Result<Option<Profile>, RepositoryError> {
        Ok(self
            .profiles
            .iter()
            .find(|p| p.id == id)
            .cloned()
            .map(|p| Profile { is_blocked, ..p }))
    }

    async fn create_club_for(
        &self,
        profile_id: Uuid,
        name: &str,
        city: Option<&str>,
    ) -> Result<Option<Club>, RepositoryError> {
        match self.stored_profile(profile_id) {
            Some(profile) if profile.club_id.is_none() => {
                let club = Club {
                    id: Uuid::new_v4(),
                    name: name.to_string(),
                    city: city.map(str::to_string),
                    created_at: Utc::now(),
                };
                self.created_clubs
                    .lock()
                    .unwrap()
                    .push((profile_id, club.clone()));
                Ok(Some(club))
            }
            _ => Ok(None),
        }
    }

    async fn insert_activity_log(&self, entry: NewActivityLog) -> Result<(), RepositoryError> {
        if self.fail_activity_insert {
            return Err(unreachable_store());
        }
        self.logs.lock().unwrap().push(entry);
        Ok(())
    }

    async fn recent_activity(
        &self,
        _club_id: Uuid,
        limit: i64,
    ) -> Result<Vec<ActivityLog>, RepositoryError> {
        Ok(self.recent.iter().take(limit as usize).cloned().collect())
    }

    async fn club_counts(&self, _club_id: Uuid) -> Result<ClubCounts, RepositoryError> {
        Ok(self.counts.clone())
    }

    async fn club_players(&self, _club_id: Uuid) -> Result<Vec<Player>, RepositoryError> {
        Ok(self.players.clone())
    }

    async fn get_match(&self, id: Uuid) -> Result<Option<Match>, RepositoryError> {
        Ok(self.fixture.clone().filter(|m| m.id == id))
    }

    async fn replace_convocations(
        &self,
        match_id: Uuid,
        player_ids: &[Uuid],
    ) -> Result<(), RepositoryError> {
        self.convocations
            .lock()
            .unwrap()
            .push((match_id, player_ids.to_vec()));
        Ok(())
    }

    async fn team_participations(
        &self,
        club_id: Uuid,
        team_id: Uuid,
        match_id: Option<Uuid>,
    ) -> Result<Vec<Participation>, RepositoryError> {
        self.participation_scopes
            .lock()
            .unwrap()
            .push((club_id, team_id, match_id));
        Ok(self.participations.clone())
    }
}

// --- FIXTURES ---

pub fn profile(role: &str, club_id: Option<Uuid>, is_blocked: bool) -> Profile {
    Profile {
        id: Uuid::new_v4(),
        email: format!("{role}@club.test"),
        role: role.to_string(),
        club_id,
        is_blocked,
        created_at: Utc::now(),
    }
}

pub fn player(last_name: &str, first_name: &str) -> Player {
    Player {
        id: Uuid::new_v4(),
        last_name: last_name.to_string(),
        first_name: first_name.to_string(),
        position: "MIL".to_string(),
    }
}

pub fn session_for(profile: &Profile) -> Session {
    Session {
        user_id: profile.id,
        email: profile.email.clone(),
        access_token: Some("session-token".to_string()),
    }
}

pub fn auth_user(role: &str, club_id: Option<Uuid>) -> AuthUser {
    AuthUser {
        id: Uuid::new_v4(),
        email: format!("{role}@club.test"),
        role: role.to_string(),
        club_id,
    }
}

pub fn test_config() -> AppConfig {
    AppConfig {
        jwt_secret: TEST_JWT_SECRET.to_string(),
        ..AppConfig::default()
    }
}

/// State over the given mocks. Pass `None` for the mailer to simulate a missing
/// `RESEND_API_KEY`.
pub fn app_state(
    repo: Arc<MockRepo>,
    mailer: Option<Arc<MockMailer>>,
    identity: Arc<MockIdentity>,
    config: AppConfig,
) -> AppState {
    AppState {
        repo,
        mailer: mailer.map(|m| m as MailerState),
        identity,
        config,
    }
}

pub fn simple_state(repo: MockRepo) -> AppState {
    app_state(
        Arc::new(repo),
        Some(Arc::new(MockMailer::new())),
        Arc::new(MockIdentity::new()),
        test_config(),
    )
}

// --- TOKENS ---

fn now_secs() -> u64 {
    SystemTime::now()
        .duration_since(SystemTime::UNIX_EPOCH)
        .unwrap()
        .as_secs()
}

/// Supabase-shaped access token. `exp_offset` is relative to now and may be negative.
pub fn mint_token(user_id: Uuid, email: &str, exp_offset: i64) -> String {
    let now = now_secs() as i64;
    let claims = Claims {
        sub: user_id,
        email: email.to_string(),
        aud: SUPABASE_AUDIENCE.to_string(),
        iat: now as usize,
        exp: (now + exp_offset) as usize,
    };

    let key = EncodingKey::from_secret(TEST_JWT_SECRET.as_bytes());
    encode(&Header::default(), &claims, &key).unwrap()
}
