//! Per-player statistics aggregated from match participations.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use ts_rs::TS;
use utoipa::ToSchema;

use crate::models::{Participation, Player};

/// Size of every leaderboard.
pub const TOP_LIMIT: usize = 3;

/// PlayerStatLine
///
/// One player's totals over the selected scope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct PlayerStatLine {
    pub player: Player,
    pub matches_played: u32,
    pub goals: u32,
    pub penalties_scored: u32,
    pub assists: u32,
    pub yellow_cards: u32,
    pub red_cards: u32,
}

impl PlayerStatLine {
    fn new(player: Player) -> Self {
        Self {
            player,
            matches_played: 0,
            goals: 0,
            penalties_scored: 0,
            assists: 0,
            yellow_cards: 0,
            red_cards: 0,
        }
    }

    /// Open-play goals plus converted penalties, saturating at `u32::MAX`.
    pub fn total_goals(&self) -> u32 {
        self.goals.saturating_add(self.penalties_scored)
    }
}

/// StatsReport
///
/// The statistics page: full table plus the four leaderboards.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct StatsReport {
    pub players: Vec<PlayerStatLine>,
    pub top_scorers: Vec<PlayerStatLine>,
    pub top_assists: Vec<PlayerStatLine>,
    pub top_yellow_cards: Vec<PlayerStatLine>,
    pub top_red_cards: Vec<PlayerStatLine>,
}

// Null counters count as zero; negative values never come from the schema's checks
// but are clamped rather than wrapped.
fn counter(value: Option<i32>) -> u32 {
    value.unwrap_or(0).max(0) as u32
}

/// aggregate
///
/// Folds participation rows into one line per player, each row counting as one
/// match played. Sorted by total goals then assists (descending), ties by name.
pub fn aggregate(rows: &[Participation]) -> Vec<PlayerStatLine> {
    let mut by_player: HashMap<uuid::Uuid, PlayerStatLine> = HashMap::new();

    for row in rows {
        let line = by_player.entry(row.player_id).or_insert_with(|| {
            PlayerStatLine::new(Player {
                id: row.player_id,
                last_name: row.last_name.clone(),
                first_name: row.first_name.clone(),
                position: row.position.clone(),
            })
        });

        // Counters saturate instead of overflowing on absurd stored values.
        line.matches_played = line.matches_played.saturating_add(1);
        line.goals = line.goals.saturating_add(counter(row.goals));
        line.penalties_scored = line.penalties_scored.saturating_add(counter(row.penalties_scored));
        line.assists = line.assists.saturating_add(counter(row.assists));
        line.yellow_cards = line.yellow_cards.saturating_add(counter(row.yellow_cards));
        line.red_cards = line.red_cards.saturating_add(counter(row.red_cards));
    }

    let mut lines: Vec<PlayerStatLine> = by_player.into_values().collect();
    lines.sort_by(|a, b| {
        b.total_goals()
            .cmp(&a.total_goals())
            .then(b.assists.cmp(&a.assists))
            .then_with(|| a.player.last_name.cmp(&b.player.last_name))
            .then_with(|| a.player.first_name.cmp(&b.player.first_name))
            .then_with(|| a.player.id.cmp(&b.player.id))
    });
    lines
}

/// top_by
///
/// The `limit` best lines by `metric`, skipping players at zero. Relies on a stable
/// sort so equal values keep the main table's order.
pub fn top_by<F>(lines: &[PlayerStatLine], limit: usize, metric: F) -> Vec<PlayerStatLine>
where
    F: Fn(&PlayerStatLine) -> u32,
{
    let mut ranked: Vec<&PlayerStatLine> = lines.iter().filter(|line| metric(*line) > 0).collect();
    ranked.sort_by(|a, b| metric(*b).cmp(&metric(*a)));
    ranked.into_iter().take(limit).cloned().collect()
}

pub fn build_report(rows: &[Participation]) -> StatsReport {
    let players = aggregate(rows);

    StatsReport {
        top_scorers: top_by(&players, TOP_LIMIT, PlayerStatLine::total_goals),
        top_assists: top_by(&players, TOP_LIMIT, |line| line.assists),
        top_yellow_cards: top_by(&players, TOP_LIMIT, |line| line.yellow_cards),
        top_red_cards: top_by(&players, TOP_LIMIT, |line| line.red_cards),
        players,
    }
}
