use crate::{
    AppState,
    activity::log_activity,
    auth::{AuthUser, MaybeSession, Session, SessionError},
    error::{AppError, Result},
    mailer::{self, MailError, MailerState},
    models::{
        ActionType, Club, ContactAdminRequest, ContactAdminResponse, ConvocationRequest,
        ConvocationResponse, CreateClubRequest, DashboardOverview, LandingResponse, MailReceipt,
        Profile, RedirectResponse, Role, SendInviteRequest, StatsQuery,
    },
    roster::RosterSelection,
    routing::{self, Decision},
    stats::{self, StatsReport},
};
use axum::{
    Json,
    extract::{Path, Query, State, rejection::JsonRejection},
    response::Redirect,
};
use uuid::Uuid;

/// Number of activity rows shown on the dashboard.
const RECENT_ACTIVITY_LIMIT: i64 = 5;

// --- Helpers ---

/// Runs the landing decision and, when it demands it, revokes the session before
/// answering. A failed revocation is logged; the user still goes to login.
async fn run_landing_decision(
    state: &AppState,
    session: &std::result::Result<Option<Session>, SessionError>,
) -> Decision {
    let decision = routing::decide(
        session,
        state.repo.as_ref(),
        state.config.admin_override_email.as_deref(),
    )
    .await;

    if decision.force_sign_out {
        if let Ok(Some(Session {
            user_id,
            access_token: Some(token),
            ..
        })) = session
        {
            if let Err(e) = state.identity.sign_out(token).await {
                tracing::warn!(%user_id, error = %e, "Forced sign-out failed");
            }
        }
    }

    decision
}

/// The mail client only exists when a credential was configured at startup.
fn configured_mailer(state: &AppState) -> Result<&MailerState> {
    state.mailer.as_ref().ok_or(AppError::MailerNotConfigured)
}

fn mail_error(e: MailError) -> AppError {
    match e {
        MailError::Rejected { status, payload } => AppError::MailRejected { status, payload },
        MailError::Transport(msg) => AppError::Processing(msg),
    }
}

fn read_body<T>(payload: std::result::Result<Json<T>, JsonRejection>) -> Result<T> {
    payload
        .map(|Json(body)| body)
        .map_err(|rejection| AppError::Processing(rejection.body_text()))
}

// --- Landing ---

/// landing
///
/// [Public Route] Application entry point: redirects (303) to the decided destination.
#[utoipa::path(
    get,
    path = "/",
    responses((status = 303, description = "Redirect to login, backoffice, dashboard or onboarding"))
)]
pub async fn landing(State(state): State<AppState>, MaybeSession(session): MaybeSession) -> Redirect {
    let decision = run_landing_decision(&state, &session).await;
    Redirect::to(decision.destination.path())
}

/// session_redirect
///
/// [Public Route] Same decision as `/`, answered as JSON for the client-side router.
#[utoipa::path(
    get,
    path = "/session/redirect",
    responses((status = 200, description = "Landing decision", body = RedirectResponse))
)]
pub async fn session_redirect(
    State(state): State<AppState>,
    MaybeSession(session): MaybeSession,
) -> Json<RedirectResponse> {
    let decision = run_landing_decision(&state, &session).await;
    Json(RedirectResponse {
        destination: decision.destination.path().to_string(),
        force_sign_out: decision.force_sign_out,
    })
}

/// get_landing_path
///
/// [Authenticated Route] Post-login landing path for the caller's role.
#[utoipa::path(
    get,
    path = "/me/landing",
    responses((status = 200, description = "Landing path", body = LandingResponse))
)]
pub async fn get_landing_path(AuthUser { role, .. }: AuthUser) -> Json<LandingResponse> {
    let path = routing::landing_path(&role).path().to_string();
    Json(LandingResponse { role, path })
}

/// get_me
///
/// [Authenticated Route] The caller's profile (player "me" view).
#[utoipa::path(
    get,
    path = "/me",
    responses(
        (status = 200, description = "Profile", body = Profile),
        (status = 404, description = "Override account without a profile")
    )
)]
pub async fn get_me(
    AuthUser { id, .. }: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<Profile>> {
    state
        .repo
        .get_profile(id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("profile {id}")))
}

// --- Email ---

/// send_invite
///
/// [Authenticated Route] Emails an invitation link for a role in a club.
///
/// The credential check comes first: without `RESEND_API_KEY` nothing is parsed or
/// sent and the answer is the configuration error.
#[utoipa::path(
    post,
    path = "/api/send-invite",
    request_body = SendInviteRequest,
    responses(
        (status = 200, description = "Accepted by the provider", body = MailReceipt),
        (status = 400, description = "Rejected by the provider"),
        (status = 500, description = "Mailer not configured or unreadable request")
    )
)]
pub async fn send_invite(
    AuthUser { id: user_id, .. }: AuthUser,
    State(state): State<AppState>,
    payload: std::result::Result<Json<SendInviteRequest>, JsonRejection>,
) -> Result<Json<MailReceipt>> {
    let mailer = configured_mailer(&state)?;
    let request = read_body(payload)?;

    if request.email.trim().is_empty() || request.link.trim().is_empty() {
        return Err(AppError::BadRequest("email and link are required".to_string()));
    }

    let message = mailer::invitation_message(&request, &state.config.mail_from);
    let receipt = mailer.send(message).await.map_err(mail_error)?;

    tracing::info!(%user_id, mail_id = %receipt.id, role = %request.role, "Invitation sent");
    Ok(Json(receipt))
}

/// contact_admin
///
/// [Authenticated Route] Notifies a club administrator that the caller asks to join
/// their club. The recipient must be the email of an `admin` profile and the
/// requester is the session's own email.
#[utoipa::path(
    post,
    path = "/contact-admin",
    request_body = ContactAdminRequest,
    responses(
        (status = 200, description = "Notice sent", body = ContactAdminResponse),
        (status = 400, description = "Unknown administrator or rejected by the provider"),
        (status = 401, description = "No session"),
        (status = 500, description = "Mailer not configured or unreadable request")
    )
)]
pub async fn contact_admin(
    user: AuthUser,
    State(state): State<AppState>,
    payload: std::result::Result<Json<ContactAdminRequest>, JsonRejection>,
) -> Result<Json<ContactAdminResponse>> {
    let mailer = configured_mailer(&state)?;
    let request = read_body(payload)?;

    // Only registered club administrators can be mailed through this route.
    let recipient = state.repo.find_profile_by_email(&request.admin_email).await?;
    if !recipient.is_some_and(|profile| profile.role_kind() == Some(Role::Admin)) {
        tracing::warn!(
            user_id = %user.id,
            admin = %request.admin_email,
            "Contact request for a non-admin address"
        );
        return Err(AppError::BadRequest(
            "no club administrator with this email".to_string(),
        ));
    }

    tracing::info!(
        club = %request.club_name,
        requester = %user.email,
        admin = %request.admin_email,
        "Admin contact requested"
    );

    let message = mailer::admin_contact_message(&request, &user.email, &state.config.mail_from);
    mailer.send(message).await.map_err(mail_error)?;

    Ok(Json(ContactAdminResponse {
        message: "Demande transmise avec succès".to_string(),
    }))
}

// --- Onboarding ---

/// create_club
///
/// [Authenticated Route] Onboarding: creates the caller's club and attaches their
/// profile to it, after which the landing decision sends them to the dashboard.
#[utoipa::path(
    post,
    path = "/onboarding",
    request_body = CreateClubRequest,
    responses(
        (status = 200, description = "Club created", body = Club),
        (status = 400, description = "Blank name or caller already has a club"),
        (status = 404, description = "Caller has no profile")
    )
)]
pub async fn create_club(
    user: AuthUser,
    State(state): State<AppState>,
    Json(payload): Json<CreateClubRequest>,
) -> Result<Json<Club>> {
    if user.club_id.is_some() {
        return Err(AppError::BadRequest("account already belongs to a club".to_string()));
    }

    let name = payload.name.trim();
    if name.is_empty() {
        return Err(AppError::BadRequest("club name is required".to_string()));
    }
    let city = payload
        .city
        .as_deref()
        .map(str::trim)
        .filter(|city| !city.is_empty());

    let club = state
        .repo
        .create_club_for(user.id, name, city)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("club-less profile {}", user.id)))?;

    log_activity(
        state.repo.as_ref(),
        club.id,
        user.id,
        ActionType::Staff,
        format!("Création du club {} par {}", club.name, user.email),
    )
    .await;

    tracing::info!(user_id = %user.id, club_id = %club.id, "Club created");
    Ok(Json(club))
}

// --- Club dashboard ---

/// get_dashboard
///
/// [Authenticated Route] Club counters and the latest activity entries.
#[utoipa::path(
    get,
    path = "/dashboard",
    responses(
        (status = 200, description = "Overview", body = DashboardOverview),
        (status = 403, description = "Caller has no club")
    )
)]
pub async fn get_dashboard(
    user: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<DashboardOverview>> {
    let club_id = user.require_club()?;

    let counts = state.repo.club_counts(club_id).await?;
    let recent_activity = state
        .repo
        .recent_activity(club_id, RECENT_ACTIVITY_LIMIT)
        .await?;

    Ok(Json(DashboardOverview {
        club_id,
        counts,
        recent_activity,
    }))
}

/// get_team_stats
///
/// [Authenticated Route] Player statistics for one of the caller's teams, over the
/// season or a single match.
#[utoipa::path(
    get,
    path = "/dashboard/stats",
    params(StatsQuery),
    responses(
        (status = 200, description = "Stats report", body = StatsReport),
        (status = 403, description = "Caller has no club")
    )
)]
pub async fn get_team_stats(
    user: AuthUser,
    State(state): State<AppState>,
    Query(query): Query<StatsQuery>,
) -> Result<Json<StatsReport>> {
    let club_id = user.require_club()?;

    let rows = state
        .repo
        .team_participations(club_id, query.team_id, query.match_id)
        .await?;

    Ok(Json(stats::build_report(&rows)))
}

/// save_convocation
///
/// [Authenticated Route] Replaces a match's convocation with the ticked players.
/// Ids outside the club roster are dropped; a `CONVOCATION` activity is recorded.
#[utoipa::path(
    put,
    path = "/matches/{id}/convocation",
    params(("id" = Uuid, Path, description = "Match ID")),
    request_body = ConvocationRequest,
    responses(
        (status = 200, description = "Saved", body = ConvocationResponse),
        (status = 404, description = "No such match in the caller's club")
    )
)]
pub async fn save_convocation(
    user: AuthUser,
    State(state): State<AppState>,
    Path(match_id): Path<Uuid>,
    Json(payload): Json<ConvocationRequest>,
) -> Result<Json<ConvocationResponse>> {
    let club_id = user.require_club()?;

    let fixture = state
        .repo
        .get_match(match_id)
        .await?
        .filter(|fixture| fixture.club_id == club_id)
        .ok_or_else(|| AppError::NotFound(format!("match {match_id}")))?;

    let roster = state.repo.club_players(club_id).await?;
    let mut selection = RosterSelection::with_selection(roster, payload.player_ids);
    let convened = selection.confirm_selection().to_vec();

    let convened_ids: Vec<Uuid> = convened.iter().map(|player| player.id).collect();
    state
        .repo
        .replace_convocations(match_id, &convened_ids)
        .await?;

    log_activity(
        state.repo.as_ref(),
        club_id,
        user.id,
        ActionType::Convocation,
        format!(
            "Mise à jour convocation ({} joueurs) vs {}",
            convened.len(),
            fixture.opponent
        ),
    )
    .await;

    Ok(Json(ConvocationResponse { match_id, convened }))
}

// --- Backoffice ---

/// list_users
///
/// [Backoffice Route] Every profile on the platform, newest first.
#[utoipa::path(
    get,
    path = "/backoffice/users",
    responses(
        (status = 200, description = "All profiles", body = [Profile]),
        (status = 403, description = "Not a super admin")
    )
)]
pub async fn list_users(user: AuthUser, State(state): State<AppState>) -> Result<Json<Vec<Profile>>> {
    user.require_super_admin()?;
    Ok(Json(state.repo.list_profiles().await?))
}

/// set_user_blocked
///
/// [Backoffice Route] Blocks or unblocks an account. A blocked account is signed out
/// on its next landing decision.
#[utoipa::path(
    patch,
    path = "/backoffice/users/{id}/block",
    params(("id" = Uuid, Path, description = "Profile ID")),
    request_body = bool,
    responses(
        (status = 200, description = "Updated", body = Profile),
        (status = 400, description = "Attempt to block oneself"),
        (status = 403, description = "Not a super admin"),
        (status = 404, description = "Not Found")
    )
)]
pub async fn set_user_blocked(
    user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(is_blocked): Json<bool>,
) -> Result<Json<Profile>> {
    user.require_super_admin()?;

    if id == user.id && is_blocked {
        return Err(AppError::BadRequest("cannot block your own account".to_string()));
    }

    let profile = state
        .repo
        .set_profile_blocked(id, is_blocked)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("profile {id}")))?;

    tracing::info!(admin_id = %user.id, target_id = %id, is_blocked, "Block status changed");
    Ok(Json(profile))
}
