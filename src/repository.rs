use crate::{
    error::RepositoryError,
    models::{
        ActivityLog, Club, ClubCounts, Match, NewActivityLog, Participation, Player, Profile,
    },
};
use async_trait::async_trait;
use sqlx::PgPool;
use std::sync::Arc;
use uuid::Uuid;

/// Repository Trait
///
/// Abstract contract for every persistence operation, so handlers and the redirect
/// decision work against `Arc<dyn Repository>` and tests can swap in mocks.
///
/// Every method returns `Result`: callers must be able to tell a missing row from an
/// unreachable store.
#[async_trait]
pub trait Repository: Send + Sync {
    // --- Profiles ---
    /// Profile by user id. Takes the first row should the store ever hold several.
    async fn get_profile(&self, id: Uuid) -> Result<Option<Profile>, RepositoryError>;
    /// Profile by email, ignoring ASCII case. Takes the first row on duplicates.
    async fn find_profile_by_email(
        &self,
        email: &str,
    ) -> Result<Option<Profile>, RepositoryError>;
    /// Every profile, newest first (backoffice).
    async fn list_profiles(&self) -> Result<Vec<Profile>, RepositoryError>;
    /// Sets `is_blocked`; `None` when no profile has that id.
    async fn set_profile_blocked(
        &self,
        id: Uuid,
        is_blocked: bool,
    ) -> Result<Option<Profile>, RepositoryError>;

    // --- Clubs ---
    /// Creates a club and attaches the profile to it, atomically. `None` (and no
    /// club created) when the profile is missing or already has a club.
    async fn create_club_for(
        &self,
        profile_id: Uuid,
        name: &str,
        city: Option<&str>,
    ) -> Result<Option<Club>, RepositoryError>;

    // --- Activity ---
    async fn insert_activity_log(&self, entry: NewActivityLog) -> Result<(), RepositoryError>;
    async fn recent_activity(
        &self,
        club_id: Uuid,
        limit: i64,
    ) -> Result<Vec<ActivityLog>, RepositoryError>;

    // --- Club data ---
    async fn club_counts(&self, club_id: Uuid) -> Result<ClubCounts, RepositoryError>;
    /// Club roster ordered by last name.
    async fn club_players(&self, club_id: Uuid) -> Result<Vec<Player>, RepositoryError>;
    async fn get_match(&self, id: Uuid) -> Result<Option<Match>, RepositoryError>;
    /// Replaces the match's convocations with `player_ids`, all marked present.
    async fn replace_convocations(
        &self,
        match_id: Uuid,
        player_ids: &[Uuid],
    ) -> Result<(), RepositoryError>;
    /// Participation rows for a club team's matches, or a single match when `match_id`
    /// is set. Teams of other clubs yield nothing.
    async fn team_participations(
        &self,
        club_id: Uuid,
        team_id: Uuid,
        match_id: Option<Uuid>,
    ) -> Result<Vec<Participation>, RepositoryError>;
}

/// RepositoryState
///
/// The concrete type used to share the persistence layer across the application state.
pub type RepositoryState = Arc<dyn Repository>;

/// PostgresRepository
///
/// `Repository` backed by the Supabase Postgres database.
pub struct PostgresRepository {
    pool: PgPool,
}

impl PostgresRepository {
    /// Creates a new repository instance using the initialized connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

const PROFILE_COLUMNS: &str = "id, email, role, club_id, is_blocked, created_at";

#[async_trait]
impl Repository for PostgresRepository {
    /// get_profile
    ///
    /// Equality match on `id`. `LIMIT 1` makes the first-match assumption explicit;
    /// uniqueness itself is the primary key's job.
    async fn get_profile(&self, id: Uuid) -> Result<Option<Profile>, RepositoryError> {
        let query = format!("SELECT {PROFILE_COLUMNS} FROM profiles WHERE id = $1 LIMIT 1");
        let profile = sqlx::query_as::<_, Profile>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(profile)
    }

    async fn find_profile_by_email(
        &self,
        email: &str,
    ) -> Result<Option<Profile>, RepositoryError> {
        let query = format!(
            "SELECT {PROFILE_COLUMNS} FROM profiles WHERE lower(email) = lower($1) LIMIT 1"
        );
        let profile = sqlx::query_as::<_, Profile>(&query)
            .bind(email.trim())
            .fetch_optional(&self.pool)
            .await?;
        Ok(profile)
    }

    async fn list_profiles(&self) -> Result<Vec<Profile>, RepositoryError> {
        let query = format!("SELECT {PROFILE_COLUMNS} FROM profiles ORDER BY created_at DESC");
        let profiles = sqlx::query_as::<_, Profile>(&query)
            .fetch_all(&self.pool)
            .await?;
        Ok(profiles)
    }

    async fn set_profile_blocked(
        &self,
        id: Uuid,
        is_blocked: bool,
    ) -> Result<Option<Profile>, RepositoryError> {
        let query = format!(
            "UPDATE profiles SET is_blocked = $1 WHERE id = $2 RETURNING {PROFILE_COLUMNS}"
        );
        let profile = sqlx::query_as::<_, Profile>(&query)
            .bind(is_blocked)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(profile)
    }

    /// create_club_for
    ///
    /// The profile update only matches a club-less profile, so two concurrent
    /// onboardings cannot both attach; the loser's transaction is rolled back.
    async fn create_club_for(
        &self,
        profile_id: Uuid,
        name: &str,
        city: Option<&str>,
    ) -> Result<Option<Club>, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let club = sqlx::query_as::<_, Club>(
            "INSERT INTO clubs (nom, ville) VALUES ($1, $2) RETURNING id, nom, ville, created_at",
        )
        .bind(name)
        .bind(city)
        .fetch_one(&mut *tx)
        .await?;

        let attached = sqlx::query(
            "UPDATE profiles SET club_id = $1 WHERE id = $2 AND club_id IS NULL",
        )
        .bind(club.id)
        .bind(profile_id)
        .execute(&mut *tx)
        .await?;

        if attached.rows_affected() == 0 {
            tx.rollback().await?;
            return Ok(None);
        }

        tx.commit().await?;
        Ok(Some(club))
    }

    async fn insert_activity_log(&self, entry: NewActivityLog) -> Result<(), RepositoryError> {
        sqlx::query(
            "INSERT INTO activity_logs (club_id, user_id, action_type, description) VALUES ($1, $2, $3, $4)",
        )
        .bind(entry.club_id)
        .bind(entry.user_id)
        .bind(entry.action_type.as_str())
        .bind(entry.description)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn recent_activity(
        &self,
        club_id: Uuid,
        limit: i64,
    ) -> Result<Vec<ActivityLog>, RepositoryError> {
        let logs = sqlx::query_as::<_, ActivityLog>(
            r#"
            SELECT id, club_id, user_id, action_type, description, created_at
            FROM activity_logs
            WHERE club_id = $1
            ORDER BY created_at DESC
            LIMIT $2
            "#,
        )
        .bind(club_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        Ok(logs)
    }

    /// club_counts
    ///
    /// The three counters are independent, so they run concurrently on the pool.
    async fn club_counts(&self, club_id: Uuid) -> Result<ClubCounts, RepositoryError> {
        let count = |table: &'static str| {
            let pool = self.pool.clone();
            async move {
                let query = format!("SELECT COUNT(*) FROM {table} WHERE club_id = $1");
                sqlx::query_scalar::<_, i64>(&query)
                    .bind(club_id)
                    .fetch_one(&pool)
                    .await
            }
        };

        let (players, teams, matches) =
            tokio::try_join!(count("joueurs"), count("equipes"), count("matchs"))?;

        Ok(ClubCounts {
            players,
            teams,
            matches,
        })
    }

    async fn club_players(&self, club_id: Uuid) -> Result<Vec<Player>, RepositoryError> {
        let players = sqlx::query_as::<_, Player>(
            "SELECT id, nom, prenom, poste FROM joueurs WHERE club_id = $1 ORDER BY nom ASC",
        )
        .bind(club_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(players)
    }

    async fn get_match(&self, id: Uuid) -> Result<Option<Match>, RepositoryError> {
        let found = sqlx::query_as::<_, Match>(
            r#"
            SELECT id, club_id, equipe_id, adversaire, date_heure, score_home, score_away
            FROM matchs
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(found)
    }

    /// replace_convocations
    ///
    /// Delete-then-insert inside one transaction so a failed insert never leaves the
    /// match without its previous convocation.
    async fn replace_convocations(
        &self,
        match_id: Uuid,
        player_ids: &[Uuid],
    ) -> Result<(), RepositoryError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM convocations WHERE match_id = $1")
            .bind(match_id)
            .execute(&mut *tx)
            .await?;

        if !player_ids.is_empty() {
            sqlx::query(
                r#"
                INSERT INTO convocations (match_id, joueur_id, present)
                SELECT $1, player_id, true FROM UNNEST($2::uuid[]) AS player_id
                "#,
            )
            .bind(match_id)
            .bind(player_ids)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(())
    }

    async fn team_participations(
        &self,
        club_id: Uuid,
        team_id: Uuid,
        match_id: Option<Uuid>,
    ) -> Result<Vec<Participation>, RepositoryError> {
        let rows = sqlx::query_as::<_, Participation>(
            r#"
            SELECT
                mp.match_id,
                mp.joueur_id AS player_id,
                j.nom AS last_name,
                j.prenom AS first_name,
                j.poste AS position,
                mp.buts AS goals,
                mp.penaltys_reussis AS penalties_scored,
                mp.passes_d AS assists,
                mp.cartons_jaunes AS yellow_cards,
                mp.cartons_rouges AS red_cards
            FROM match_participations mp
            JOIN joueurs j ON j.id = mp.joueur_id
            JOIN matchs m ON m.id = mp.match_id
            WHERE m.club_id = $1
              AND m.equipe_id = $2
              AND ($3::uuid IS NULL OR m.id = $3)
            "#,
        )
        .bind(club_id)
        .bind(team_id)
        .bind(match_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }
}
