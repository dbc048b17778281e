//! Landing decision: where a session goes, and whether it must be signed out first.

use serde::Serialize;
use utoipa::ToSchema;

use crate::{
    auth::{Session, SessionError},
    error::RepositoryError,
    models::{Profile, Role},
    repository::Repository,
};

/// Destination
///
/// The five places the front end can send a user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Destination {
    Login,
    Backoffice,
    Dashboard,
    Onboarding,
    Me,
}

impl Destination {
    pub fn path(&self) -> &'static str {
        match self {
            Destination::Login => "/login",
            Destination::Backoffice => "/backoffice",
            Destination::Dashboard => "/dashboard",
            Destination::Onboarding => "/onboarding",
            Destination::Me => "/me",
        }
    }
}

/// Why a decision came out the way it did. Several reasons share a user-visible
/// outcome; they stay distinct here so logs can tell them apart.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecisionReason {
    Unauthenticated,
    AdminOverride,
    OrphanedSession,
    BlockedAccount,
    SessionLookupFailed,
    ProfileLookupFailed,
    SuperAdmin,
    ClubMember,
    AwaitingOnboarding,
}

/// Decision
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Decision {
    pub destination: Destination,
    pub force_sign_out: bool,
    pub reason: DecisionReason,
}

impl Decision {
    fn login(reason: DecisionReason, force_sign_out: bool) -> Self {
        Self {
            destination: Destination::Login,
            force_sign_out,
            reason,
        }
    }

    fn to(destination: Destination, reason: DecisionReason) -> Self {
        Self {
            destination,
            force_sign_out: false,
            reason,
        }
    }
}

/// Override matching ignores ASCII case and surrounding whitespace. A blank or
/// missing override never matches, so an empty session email cannot slip through.
pub fn is_admin_override(email: &str, override_email: Option<&str>) -> bool {
    let email = email.trim();
    match override_email.map(str::trim) {
        Some(expected) if !expected.is_empty() => email.eq_ignore_ascii_case(expected),
        _ => false,
    }
}

/// decide_for_profile
///
/// Pure half of the procedure, applied once a session exists and is not the
/// override: maps the profile lookup result to a decision.
pub fn decide_for_profile(lookup: Result<Option<&Profile>, &RepositoryError>) -> Decision {
    let profile = match lookup {
        Err(_) => return Decision::login(DecisionReason::ProfileLookupFailed, false),
        Ok(None) => return Decision::login(DecisionReason::OrphanedSession, true),
        Ok(Some(profile)) => profile,
    };

    if profile.is_blocked {
        return Decision::login(DecisionReason::BlockedAccount, true);
    }

    if profile.role_kind() == Some(Role::SuperAdmin) {
        Decision::to(Destination::Backoffice, DecisionReason::SuperAdmin)
    } else if profile.club_id.is_some() {
        Decision::to(Destination::Dashboard, DecisionReason::ClubMember)
    } else {
        Decision::to(Destination::Onboarding, DecisionReason::AwaitingOnboarding)
    }
}

/// decide
///
/// Full procedure. The profile store is only queried when a readable, non-override
/// session exists. Every failure routes to login.
pub async fn decide(
    session: &Result<Option<Session>, SessionError>,
    repo: &dyn Repository,
    admin_override_email: Option<&str>,
) -> Decision {
    let session = match session {
        Ok(Some(session)) => session,
        Ok(None) => return Decision::login(DecisionReason::Unauthenticated, false),
        Err(e) => {
            tracing::warn!(error = %e, "Session lookup failed, routing to login");
            return Decision::login(DecisionReason::SessionLookupFailed, false);
        }
    };

    if is_admin_override(&session.email, admin_override_email) {
        return Decision::to(Destination::Backoffice, DecisionReason::AdminOverride);
    }

    let lookup = repo.get_profile(session.user_id).await;
    if let Err(e) = &lookup {
        tracing::error!(user_id = %session.user_id, error = %e, "Profile lookup failed, routing to login");
    }

    let decision = decide_for_profile(lookup.as_ref().map(Option::as_ref));
    tracing::debug!(
        user_id = %session.user_id,
        destination = decision.destination.path(),
        reason = ?decision.reason,
        force_sign_out = decision.force_sign_out,
        "Landing decision"
    );
    decision
}

/// landing_path
///
/// Post-login table. Unrecognised role text degrades to re-authentication.
pub fn landing_path(role: &str) -> Destination {
    match role.parse::<Role>() {
        Ok(Role::SuperAdmin) => Destination::Backoffice,
        Ok(Role::Admin) | Ok(Role::SuperUser) => Destination::Dashboard,
        Ok(Role::User) => Destination::Me,
        Err(_) => Destination::Login,
    }
}
