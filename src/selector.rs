use std::sync::Arc;

use serde::Serialize;
use tracing::info;

use crate::compare::{self, Comparison};
use crate::dataset::{DatasetStore, Tables};
use crate::error::{Result, SelectorError};
use crate::season::{SeasonCache, SeasonView, TeamAssignment};
use crate::suggest::{self, Suggestion};

/// Read-only query surface over the loaded tables.
///
/// One `Selector` is shared by every session; per-session picks live in
/// [`crate::state::AppState`].
#[derive(Debug)]
pub struct Selector {
    cache: SeasonCache,
    seasons: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SuggestionSet {
    pub season: String,
    pub team_a: String,
    pub team_b: String,
    pub requested: usize,
    pub eligible: usize,
    pub rows: Vec<Suggestion>,
}

impl SuggestionSet {
    pub fn title(&self) -> String {
        format!(
            "Top {} Suggested Players ({} vs {}, IPL {})",
            self.rows.len(),
            self.team_a,
            self.team_b,
            self.season
        )
    }
}

impl Selector {
    pub fn new(tables: Arc<Tables>, policy: TeamAssignment) -> Self {
        let seasons = tables.seasons();
        Self {
            cache: SeasonCache::new(tables, policy),
            seasons,
        }
    }

    pub fn from_store(store: &DatasetStore, policy: TeamAssignment) -> Result<Self> {
        let tables = store.load()?;
        if tables.seasons().is_empty() {
            return Err(SelectorError::MissingData(
                "matches table has no season values".to_string(),
            ));
        }
        Ok(Self::new(tables, policy))
    }

    pub fn policy(&self) -> TeamAssignment {
        self.cache.policy()
    }

    /// Distinct seasons, newest first.
    pub fn seasons(&self) -> &[String] {
        &self.seasons
    }

    pub fn view(&self, season: &str) -> Result<Arc<SeasonView>> {
        if !self.seasons.iter().any(|s| s == season) {
            return Err(SelectorError::MissingData(format!(
                "season {season} has no matches"
            )));
        }
        Ok(self.cache.get(season))
    }

    pub fn teams(&self, season: &str) -> Result<Vec<String>> {
        Ok(self.view(season)?.teams.clone())
    }

    pub fn players(&self, season: &str, team: &str) -> Result<Vec<String>> {
        Ok(self.view(season)?.players_for_team(team))
    }

    pub fn prewarm(&self) -> usize {
        self.cache.prewarm(&self.seasons)
    }

    pub fn suggest(
        &self,
        season: &str,
        team_a: &str,
        team_b: &str,
        n: usize,
    ) -> Result<SuggestionSet> {
        if team_a == team_b {
            return Err(SelectorError::InvalidSelection(
                "Team A and Team B must be different".to_string(),
            ));
        }
        let view = self.view(season)?;
        for team in [team_a, team_b] {
            if !view.has_team(team) {
                return Err(SelectorError::InvalidSelection(format!(
                    "{team} did not play in season {season}"
                )));
            }
        }

        let eligible = suggest::eligible_count(&view.players, team_a, team_b);
        if eligible == 0 {
            return Err(SelectorError::NoEligiblePlayers {
                season: season.to_string(),
                team_a: team_a.to_string(),
                team_b: team_b.to_string(),
            });
        }
        let rows = suggest::suggest(&view.players, team_a, team_b, n);
        info!(season, team_a, team_b, eligible, returned = rows.len(), "suggestions ranked");

        Ok(SuggestionSet {
            season: season.to_string(),
            team_a: team_a.to_string(),
            team_b: team_b.to_string(),
            requested: n,
            eligible,
            rows,
        })
    }

    pub fn compare(
        &self,
        season: &str,
        team1: &str,
        player1: &str,
        team2: &str,
        player2: &str,
    ) -> Result<Comparison> {
        // Stats come from one players-table row, so a player never differs from themselves.
        if player1 == player2 {
            return Err(SelectorError::InvalidSelection(
                "pick two different players to compare".to_string(),
            ));
        }
        let view = self.view(season)?;
        compare::compare(&view, team1, player1, team2, player2)
    }
}
