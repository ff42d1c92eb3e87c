use serde::Serialize;

use crate::season::SeasonPlayerRow;

/// One ranked player in a suggested roster.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Suggestion {
    pub player: String,
    pub team: String,
    pub runs: i64,
    pub wickets: i64,
    pub performance_score: f64,
    pub final_score: f64,
}

/// Rank the players of `team_a` and `team_b` by final score, best first.
///
/// `n` is clamped to `1..=eligible`; an empty eligible set gives an empty
/// result. Ties keep the order of `rows`.
pub fn suggest(rows: &[SeasonPlayerRow], team_a: &str, team_b: &str, n: usize) -> Vec<Suggestion> {
    let mut eligible: Vec<Suggestion> = rows
        .iter()
        .filter(|row| row.team == team_a || row.team == team_b)
        .map(|row| Suggestion {
            player: row.player.clone(),
            team: row.team.clone(),
            runs: row.runs,
            wickets: row.wickets,
            performance_score: row.performance_score,
            final_score: final_score(row),
        })
        .collect();
    if eligible.is_empty() {
        return eligible;
    }

    // `sort_by` is stable.
    eligible.sort_by(|a, b| b.final_score.total_cmp(&a.final_score));
    let take = n.clamp(1, eligible.len());
    eligible.truncate(take);
    eligible
}

/// Number of rows `suggest` would rank for this pair of teams.
pub fn eligible_count(rows: &[SeasonPlayerRow], team_a: &str, team_b: &str) -> usize {
    rows.iter()
        .filter(|row| row.team == team_a || row.team == team_b)
        .count()
}

/// Score used for ranking. No venue or matchup weighting yet.
pub fn final_score(row: &SeasonPlayerRow) -> f64 {
    row.performance_score
}
