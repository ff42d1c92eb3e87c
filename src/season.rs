use std::collections::{BTreeSet, HashMap, HashSet};
use std::str::FromStr;
use std::sync::{Arc, Mutex, PoisonError};

use rayon::prelude::*;
use serde::Serialize;
use tracing::{debug, info};

use crate::dataset::{MatchRecord, Tables};

/// How a player who batted for several teams in one season is placed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum TeamAssignment {
    /// One row per (player, team) pair; the player is listed once per team.
    #[default]
    KeepAll,
    /// Team of the player's first delivery in file order.
    FirstSeen,
    /// Team with the most deliveries faced; ties go to the earlier team.
    MostFrequent,
}

impl TeamAssignment {
    pub fn label(self) -> &'static str {
        match self {
            Self::KeepAll => "keep-all",
            Self::FirstSeen => "first-seen",
            Self::MostFrequent => "most-frequent",
        }
    }
}

impl FromStr for TeamAssignment {
    type Err = String;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().replace('_', "-").as_str() {
            "keep-all" | "all" => Ok(Self::KeepAll),
            "first-seen" | "first" => Ok(Self::FirstSeen),
            "most-frequent" | "mode" => Ok(Self::MostFrequent),
            other => Err(format!("unknown team policy '{other}'")),
        }
    }
}

/// A Player row joined with the team it represented in one season.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeasonPlayerRow {
    pub player: String,
    pub team: String,
    pub runs: i64,
    pub wickets: i64,
    pub performance_score: f64,
}

#[derive(Debug, Clone)]
pub struct SeasonView {
    pub season: String,
    pub matches: Vec<MatchRecord>,
    pub match_ids: HashSet<u64>,
    /// Distinct `team1`/`team2` values, sorted.
    pub teams: Vec<String>,
    pub players: Vec<SeasonPlayerRow>,
}

impl SeasonView {
    pub fn is_empty(&self) -> bool {
        self.matches.is_empty()
    }

    pub fn has_team(&self, team: &str) -> bool {
        self.teams.iter().any(|t| t == team)
    }

    /// Distinct player names for `team`, sorted.
    pub fn players_for_team(&self, team: &str) -> Vec<String> {
        let names: BTreeSet<&str> = self
            .players
            .iter()
            .filter(|row| row.team == team)
            .map(|row| row.player.as_str())
            .collect();
        names.into_iter().map(str::to_string).collect()
    }

    pub fn find(&self, team: &str, player: &str) -> Option<&SeasonPlayerRow> {
        self.players
            .iter()
            .find(|row| row.team == team && row.player == player)
    }
}

pub fn teams_for(matches: &[MatchRecord]) -> Vec<String> {
    let set: BTreeSet<&str> = matches
        .iter()
        .flat_map(|m| [m.team1.as_str(), m.team2.as_str()])
        .filter(|t| !t.is_empty())
        .collect();
    set.into_iter().map(str::to_string).collect()
}

/// Scope the base tables to one season.
///
/// An unknown season yields an empty view rather than an error.
pub fn resolve(tables: &Tables, season: &str, policy: TeamAssignment) -> SeasonView {
    let matches: Vec<MatchRecord> = tables
        .matches
        .iter()
        .filter(|m| m.season.as_deref() == Some(season))
        .cloned()
        .collect();
    let match_ids: HashSet<u64> = matches.iter().map(|m| m.id).collect();
    let teams = teams_for(&matches);

    let team_set: HashSet<&str> = teams.iter().map(String::as_str).collect();
    let team_map = player_team_map(tables, &match_ids, &team_set, policy);

    let mut players = Vec::new();
    for p in &tables.players {
        let Some(player_teams) = team_map.get(p.player.as_str()) else {
            continue;
        };
        for team in player_teams {
            players.push(SeasonPlayerRow {
                player: p.player.clone(),
                team: (*team).to_string(),
                runs: p.runs,
                wickets: p.wickets,
                performance_score: p.performance_score,
            });
        }
    }

    debug!(
        season,
        matches = matches.len(),
        players = players.len(),
        policy = policy.label(),
        "season resolved"
    );

    SeasonView {
        season: season.to_string(),
        matches,
        match_ids,
        teams,
        players,
    }
}

fn player_team_map<'a>(
    tables: &'a Tables,
    match_ids: &HashSet<u64>,
    season_teams: &HashSet<&str>,
    policy: TeamAssignment,
) -> HashMap<&'a str, Vec<&'a str>> {
    // Per batter: (team, deliveries) in order of first appearance.
    let mut seen: HashMap<&str, Vec<(&str, usize)>> = HashMap::new();
    for d in &tables.deliveries {
        if !match_ids.contains(&d.match_id) || !season_teams.contains(d.batting_team.as_str()) {
            continue;
        }
        let teams = seen.entry(d.batter.as_str()).or_default();
        match teams.iter_mut().find(|(team, _)| *team == d.batting_team) {
            Some((_, count)) => *count += 1,
            None => teams.push((d.batting_team.as_str(), 1)),
        }
    }

    seen.into_iter()
        .map(|(player, teams)| {
            let picked = match policy {
                TeamAssignment::KeepAll => teams.iter().map(|(team, _)| *team).collect(),
                TeamAssignment::FirstSeen => teams.first().map(|(team, _)| *team).into_iter().collect(),
                TeamAssignment::MostFrequent => {
                    let mut best: Option<(&str, usize)> = None;
                    for &(team, count) in &teams {
                        if best.is_none_or(|(_, c)| count > c) {
                            best = Some((team, count));
                        }
                    }
                    best.map(|(team, _)| team).into_iter().collect()
                }
            };
            (player, picked)
        })
        .collect()
}

/// Memoized [`resolve`] keyed by season, shareable across sessions.
#[derive(Debug)]
pub struct SeasonCache {
    tables: Arc<Tables>,
    policy: TeamAssignment,
    views: Mutex<HashMap<String, Arc<SeasonView>>>,
}

impl SeasonCache {
    pub fn new(tables: Arc<Tables>, policy: TeamAssignment) -> Self {
        Self {
            tables,
            policy,
            views: Mutex::new(HashMap::new()),
        }
    }

    pub fn policy(&self) -> TeamAssignment {
        self.policy
    }

    pub fn get(&self, season: &str) -> Arc<SeasonView> {
        if let Some(view) = self.lock().get(season) {
            debug!(season, "season cache hit");
            return Arc::clone(view);
        }
        let view = Arc::new(resolve(&self.tables, season, self.policy));
        Arc::clone(
            self.lock()
                .entry(season.to_string())
                .or_insert(view),
        )
    }

    /// Resolve every uncached season in parallel. Returns how many were added.
    pub fn prewarm(&self, seasons: &[String]) -> usize {
        let missing: Vec<&String> = {
            let views = self.lock();
            seasons.iter().filter(|s| !views.contains_key(*s)).collect()
        };
        let resolved: Vec<(String, Arc<SeasonView>)> = missing
            .par_iter()
            .map(|season| {
                (
                    (*season).clone(),
                    Arc::new(resolve(&self.tables, season, self.policy)),
                )
            })
            .collect();
        let added = resolved.len();
        let mut views = self.lock();
        for (season, view) in resolved {
            views.entry(season).or_insert(view);
        }
        info!(added, cached = views.len(), "season cache prewarmed");
        added
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, Arc<SeasonView>>> {
        // Views are only ever inserted whole, so a poisoned map is still consistent.
        self.views.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
