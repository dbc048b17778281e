use club_manager::{
    models::{ActionType, NewActivityLog},
    repository::{PostgresRepository, Repository},
};
use sqlx::PgPool;
use uuid::Uuid;

// --- Test Context and Setup ---

/// Database pool with migrations applied. `None` when `DATABASE_URL` is unset, in
/// which case the calling test returns early.
struct DbTestContext {
    pool: PgPool,
}

impl DbTestContext {
    async fn setup() -> Option<Self> {
        dotenv::dotenv().ok();

        let Ok(db_url) = std::env::var("DATABASE_URL") else {
            eprintln!("DATABASE_URL not set, skipping repository integration test");
            return None;
        };

        let pool = PgPool::connect(&db_url)
            .await
            .expect("Failed to connect to database for integration tests.");

        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .expect("Failed to run database migrations.");

        Some(DbTestContext { pool })
    }

    fn repository(&self) -> PostgresRepository {
        PostgresRepository::new(self.pool.clone())
    }
}

// --- Test Data Helpers ---

async fn create_club(pool: &PgPool) -> Uuid {
    sqlx::query_scalar("INSERT INTO clubs (nom) VALUES ($1) RETURNING id")
        .bind(format!("Club {}", Uuid::new_v4()))
        .fetch_one(pool)
        .await
        .unwrap()
}

async fn create_profile(pool: &PgPool, role: &str, club_id: Option<Uuid>) -> Uuid {
    let id = Uuid::new_v4();
    sqlx::query("INSERT INTO profiles (id, email, role, club_id) VALUES ($1, $2, $3, $4)")
        .bind(id)
        .bind(format!("{id}@test.com"))
        .bind(role)
        .bind(club_id)
        .execute(pool)
        .await
        .unwrap();
    id
}

async fn create_player(pool: &PgPool, club_id: Uuid, last_name: &str) -> Uuid {
    sqlx::query_scalar(
        "INSERT INTO joueurs (club_id, nom, prenom, poste) VALUES ($1, $2, 'Test', 'DEF') RETURNING id",
    )
    .bind(club_id)
    .bind(last_name)
    .fetch_one(pool)
    .await
    .unwrap()
}

async fn create_match(pool: &PgPool, club_id: Uuid) -> (Uuid, Uuid) {
    let team_id: Uuid =
        sqlx::query_scalar("INSERT INTO equipes (club_id, nom) VALUES ($1, 'Seniors') RETURNING id")
            .bind(club_id)
            .fetch_one(pool)
            .await
            .unwrap();
    let match_id: Uuid = sqlx::query_scalar(
        "INSERT INTO matchs (club_id, equipe_id, adversaire) VALUES ($1, $2, 'FC Rival') RETURNING id",
    )
    .bind(club_id)
    .bind(team_id)
    .fetch_one(pool)
    .await
    .unwrap();
    (team_id, match_id)
}

// --- Tests ---

#[tokio::test]
async fn profile_lookup_and_block_flag() {
    let Some(ctx) = DbTestContext::setup().await else {
        return;
    };
    let repo = ctx.repository();
    let club_id = create_club(&ctx.pool).await;
    let id = create_profile(&ctx.pool, "admin", Some(club_id)).await;

    let profile = repo.get_profile(id).await.unwrap().unwrap();
    assert_eq!(profile.role, "admin");
    assert_eq!(profile.club_id, Some(club_id));
    assert!(!profile.is_blocked);

    let blocked = repo.set_profile_blocked(id, true).await.unwrap().unwrap();
    assert!(blocked.is_blocked);

    assert!(repo.get_profile(Uuid::new_v4()).await.unwrap().is_none());
}

#[tokio::test]
async fn activity_is_listed_newest_first() {
    let Some(ctx) = DbTestContext::setup().await else {
        return;
    };
    let repo = ctx.repository();
    let club_id = create_club(&ctx.pool).await;
    let user_id = create_profile(&ctx.pool, "admin", Some(club_id)).await;

    for i in 0..7 {
        repo.insert_activity_log(NewActivityLog {
            club_id,
            user_id,
            action_type: ActionType::Joueur,
            description: format!("entry {i}"),
        })
        .await
        .unwrap();
    }

    let recent = repo.recent_activity(club_id, 5).await.unwrap();
    assert_eq!(recent.len(), 5);
    assert!(recent.windows(2).all(|w| w[0].created_at >= w[1].created_at));
    assert!(recent.iter().all(|log| log.action_type == "JOUEUR"));
}

#[tokio::test]
async fn convocations_are_replaced_and_counts_follow() {
    let Some(ctx) = DbTestContext::setup().await else {
        return;
    };
    let repo = ctx.repository();
    let club_id = create_club(&ctx.pool).await;
    let a = create_player(&ctx.pool, club_id, "Abidal").await;
    let b = create_player(&ctx.pool, club_id, "Benzema").await;
    let (_, match_id) = create_match(&ctx.pool, club_id).await;

    repo.replace_convocations(match_id, &[a, b]).await.unwrap();
    repo.replace_convocations(match_id, &[b]).await.unwrap();

    let convened: Vec<Uuid> =
        sqlx::query_scalar("SELECT joueur_id FROM convocations WHERE match_id = $1 AND present")
            .bind(match_id)
            .fetch_all(&ctx.pool)
            .await
            .unwrap();
    assert_eq!(convened, vec![b]);

    let counts = repo.club_counts(club_id).await.unwrap();
    assert_eq!((counts.players, counts.teams, counts.matches), (2, 1, 1));

    let roster = repo.club_players(club_id).await.unwrap();
    assert_eq!(roster[0].last_name, "Abidal");

    let fixture = repo.get_match(match_id).await.unwrap().unwrap();
    assert_eq!(fixture.opponent, "FC Rival");
}

#[tokio::test]
async fn participations_are_scoped_to_club_and_team() {
    let Some(ctx) = DbTestContext::setup().await else {
        return;
    };
    let repo = ctx.repository();
    let club_id = create_club(&ctx.pool).await;
    let player_id = create_player(&ctx.pool, club_id, "Giroud").await;
    let (team_id, match_id) = create_match(&ctx.pool, club_id).await;

    sqlx::query(
        "INSERT INTO match_participations (match_id, joueur_id, buts, passes_d) VALUES ($1, $2, 2, NULL)",
    )
    .bind(match_id)
    .bind(player_id)
    .execute(&ctx.pool)
    .await
    .unwrap();

    let rows = repo.team_participations(club_id, team_id, None).await.unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].goals, Some(2));
    assert_eq!(rows[0].assists, None);

    let other_club = create_club(&ctx.pool).await;
    let foreign = repo.team_participations(other_club, team_id, None).await.unwrap();
    assert!(foreign.is_empty());

    let other_match = repo
        .team_participations(club_id, team_id, Some(Uuid::new_v4()))
        .await
        .unwrap();
    assert!(other_match.is_empty());
}

#[tokio::test]
async fn onboarding_creates_and_attaches_exactly_once() {
    let Some(ctx) = DbTestContext::setup().await else {
        return;
    };
    let repo = ctx.repository();
    let id = create_profile(&ctx.pool, "admin", None).await;

    let club = repo
        .create_club_for(id, "AS Test", Some("Lyon"))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(club.name, "AS Test");
    assert_eq!(club.city.as_deref(), Some("Lyon"));

    let profile = repo.get_profile(id).await.unwrap().unwrap();
    assert_eq!(profile.club_id, Some(club.id));

    // Already attached: refused, and the rolled-back club row is gone.
    let again = format!("Again {id}");
    assert!(repo.create_club_for(id, &again, None).await.unwrap().is_none());
    let leftovers: i64 = sqlx::query_scalar("SELECT count(*) FROM clubs WHERE nom = $1")
        .bind(&again)
        .fetch_one(&ctx.pool)
        .await
        .unwrap();
    assert_eq!(leftovers, 0);

    assert!(
        repo.create_club_for(Uuid::new_v4(), "Nobody FC", None)
            .await
            .unwrap()
            .is_none()
    );
}

#[tokio::test]
async fn admin_lookup_by_email_ignores_case() {
    let Some(ctx) = DbTestContext::setup().await else {
        return;
    };
    let repo = ctx.repository();
    let club_id = create_club(&ctx.pool).await;
    let id = create_profile(&ctx.pool, "admin", Some(club_id)).await;

    let found = repo
        .find_profile_by_email(&format!("  {id}@TEST.com  "))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(found.id, id);

    assert!(repo.find_profile_by_email("nobody@test.com").await.unwrap().is_none());
}

#[tokio::test]
async fn teams_carry_a_category() {
    let Some(ctx) = DbTestContext::setup().await else {
        return;
    };
    let club_id = create_club(&ctx.pool).await;

    let category: Option<String> = sqlx::query_scalar(
        "INSERT INTO equipes (club_id, nom, categorie) VALUES ($1, 'U17', 'U17') RETURNING categorie",
    )
    .bind(club_id)
    .fetch_one(&ctx.pool)
    .await
    .unwrap();

    assert_eq!(category.as_deref(), Some("U17"));
}
