use std::{fmt, str::FromStr};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use ts_rs::TS;
use utoipa::ToSchema;
use uuid::Uuid;

// --- Roles ---

/// Role
///
/// The four account roles stored in `profiles.role`. The column is plain text, so
/// rows are parsed on read; anything outside this enumeration is treated as unknown
/// by the callers rather than failing the query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS, ToSchema)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub enum Role {
    /// Cross-club platform operator (backoffice).
    SuperAdmin,
    /// Club administrator.
    Admin,
    /// Coach.
    SuperUser,
    /// Player.
    User,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::SuperAdmin => "superAdmin",
            Role::Admin => "admin",
            Role::SuperUser => "superUser",
            Role::User => "user",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unrecognised role string.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown role `{0}`")]
pub struct UnknownRole(pub String);

impl FromStr for Role {
    type Err = UnknownRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "superAdmin" => Ok(Role::SuperAdmin),
            "admin" => Ok(Role::Admin),
            "superUser" => Ok(Role::SuperUser),
            "user" => Ok(Role::User),
            other => Err(UnknownRole(other.to_string())),
        }
    }
}

// --- Core Schemas (Mapped to Database) ---

/// Profile
///
/// Per-user record in `public.profiles`, keyed by the Supabase auth user id.
/// `club_id` stays empty until onboarding attaches the user to a club.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[ts(export)]
pub struct Profile {
    pub id: Uuid,
    pub email: String,
    // Raw role text; see `Profile::role_kind`.
    pub role: String,
    pub club_id: Option<Uuid>,
    pub is_blocked: bool,
    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
}

impl Profile {
    /// Parsed role, `None` when the stored text is not one of the four roles.
    pub fn role_kind(&self) -> Option<Role> {
        self.role.parse().ok()
    }
}

/// ActionType
///
/// Category of an activity log entry, stored as upper-case text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS, ToSchema)]
#[serde(rename_all = "UPPERCASE")]
#[ts(export)]
pub enum ActionType {
    Joueur,
    Equipe,
    Match,
    Staff,
    Convocation,
}

impl ActionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActionType::Joueur => "JOUEUR",
            ActionType::Equipe => "EQUIPE",
            ActionType::Match => "MATCH",
            ActionType::Staff => "STAFF",
            ActionType::Convocation => "CONVOCATION",
        }
    }
}

/// ActivityLog
///
/// One row of `public.activity_logs`, shown newest-first on the club dashboard.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[ts(export)]
pub struct ActivityLog {
    pub id: Uuid,
    pub club_id: Uuid,
    pub user_id: Uuid,
    pub action_type: String,
    pub description: String,
    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
}

/// Insert payload for the activity logger.
#[derive(Debug, Clone, PartialEq)]
pub struct NewActivityLog {
    pub club_id: Uuid,
    pub user_id: Uuid,
    pub action_type: ActionType,
    pub description: String,
}

/// Club
///
/// A club (`public.clubs`). Every non-backoffice user belongs to at most one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[ts(export)]
pub struct Club {
    pub id: Uuid,
    #[sqlx(rename = "nom")]
    pub name: String,
    #[sqlx(rename = "ville")]
    pub city: Option<String>,
    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
}

/// Player
///
/// A club player (`public.joueurs`). Column names are French in the schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[ts(export)]
pub struct Player {
    pub id: Uuid,
    #[sqlx(rename = "nom")]
    pub last_name: String,
    #[sqlx(rename = "prenom")]
    pub first_name: String,
    #[sqlx(rename = "poste")]
    pub position: String,
}

/// Match
///
/// A fixture (`public.matchs`) of one of the club's teams.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[ts(export)]
pub struct Match {
    pub id: Uuid,
    pub club_id: Uuid,
    #[sqlx(rename = "equipe_id")]
    pub team_id: Uuid,
    #[sqlx(rename = "adversaire")]
    pub opponent: String,
    #[sqlx(rename = "date_heure")]
    #[ts(type = "string | null")]
    pub kickoff: Option<DateTime<Utc>>,
    pub score_home: Option<i32>,
    pub score_away: Option<i32>,
}

/// Participation
///
/// One player's line in one match (`public.match_participations` joined with the
/// player). Counters are nullable in the schema; null means zero.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, Default)]
pub struct Participation {
    pub match_id: Uuid,
    pub player_id: Uuid,
    pub last_name: String,
    pub first_name: String,
    pub position: String,
    pub goals: Option<i32>,
    pub penalties_scored: Option<i32>,
    pub assists: Option<i32>,
    pub yellow_cards: Option<i32>,
    pub red_cards: Option<i32>,
}

/// Headline counters for one club.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct ClubCounts {
    pub players: i64,
    pub teams: i64,
    pub matches: i64,
}

// --- Request Payloads (Input Schemas) ---

/// SendInviteRequest
///
/// Input for `POST /api/send-invite`. Accepts the front end's camelCase `clubName`.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct SendInviteRequest {
    pub email: String,
    pub link: String,
    pub role: String,
    #[serde(default, alias = "clubName")]
    pub club_name: Option<String>,
}

/// ContactAdminRequest
///
/// Input for `POST /contact-admin`: the caller asks a club administrator to be
/// attached to their club. The requester is always the session's email.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct ContactAdminRequest {
    #[serde(alias = "adminEmail")]
    pub admin_email: String,
    #[serde(alias = "clubName")]
    pub club_name: String,
}

/// CreateClubRequest
///
/// Input for `POST /onboarding`: the club a newly registered administrator creates.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct CreateClubRequest {
    pub name: String,
    #[serde(default, alias = "ville")]
    pub city: Option<String>,
}

/// ConvocationRequest
///
/// Input for `PUT /matches/{id}/convocation`: the ids ticked on the roster.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct ConvocationRequest {
    pub player_ids: Vec<Uuid>,
}

/// StatsQuery
///
/// Scope of the statistics page: a whole season for one team, or a single match.
#[derive(Debug, Clone, Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct StatsQuery {
    pub team_id: Uuid,
    /// When present, restricts the report to this match.
    pub match_id: Option<Uuid>,
}

// --- Response Schemas (Output) ---

/// RedirectResponse
///
/// Outcome of the landing decision, as consumed by the front end router.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct RedirectResponse {
    pub destination: String,
    pub force_sign_out: bool,
}

/// Post-login landing path for the caller's role.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct LandingResponse {
    pub role: String,
    pub path: String,
}

/// Provider-assigned id of an accepted email.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct MailReceipt {
    pub id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct ContactAdminResponse {
    pub message: String,
}

/// ConvocationResponse
///
/// Players convened for the match after the save, in roster order.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct ConvocationResponse {
    pub match_id: Uuid,
    pub convened: Vec<Player>,
}

/// DashboardOverview
///
/// Club dashboard landing data: counters plus the latest activity.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct DashboardOverview {
    pub club_id: Uuid,
    pub counts: ClubCounts,
    pub recent_activity: Vec<ActivityLog>,
}
