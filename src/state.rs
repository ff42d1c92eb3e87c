use std::collections::VecDeque;
use std::sync::Arc;

use chrono::Local;
use tracing::{info, warn};

use crate::compare::Comparison;
use crate::config::MAX_TOP_N;
use crate::error::SelectorError;
use crate::selector::{Selector, SuggestionSet};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Suggest,
    Compare,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Season,
    TeamA,
    TeamB,
    TopN,
    Team1,
    Player1,
    Team2,
    Player2,
}

const SUGGEST_FIELDS: &[Field] = &[Field::Season, Field::TeamA, Field::TeamB, Field::TopN];
const COMPARE_FIELDS: &[Field] = &[
    Field::Season,
    Field::Team1,
    Field::Player1,
    Field::Team2,
    Field::Player2,
];

const MAX_LOGS: usize = 200;

/// Everything one dashboard session has picked or computed.
///
/// The shared [`Selector`] is read-only; all mutable state is here, so two
/// sessions never see each other's picks.
#[derive(Debug, Clone)]
pub struct AppState {
    selector: Arc<Selector>,
    pub screen: Screen,
    pub focus: Field,
    pub season_idx: usize,
    pub teams: Vec<String>,
    pub team_a: usize,
    pub team_b: usize,
    pub top_n: usize,
    pub suggestions: Option<SuggestionSet>,
    pub suggestion_scroll: usize,
    pub team1: usize,
    pub player1: usize,
    pub team2: usize,
    pub player2: usize,
    pub players1: Vec<String>,
    pub players2: Vec<String>,
    pub comparison: Option<Comparison>,
    pub notice: Option<String>,
    pub logs: VecDeque<String>,
    pub help_overlay: bool,
}

impl AppState {
    pub fn new(selector: Arc<Selector>, top_n: usize) -> Self {
        let mut state = Self {
            selector,
            screen: Screen::Suggest,
            focus: Field::Season,
            season_idx: 0,
            teams: Vec::new(),
            team_a: 0,
            team_b: 0,
            top_n: top_n.clamp(1, MAX_TOP_N),
            suggestions: None,
            suggestion_scroll: 0,
            team1: 0,
            player1: 0,
            team2: 0,
            player2: 0,
            players1: Vec::new(),
            players2: Vec::new(),
            comparison: None,
            notice: None,
            logs: VecDeque::with_capacity(MAX_LOGS),
            help_overlay: false,
        };
        state.load_season();
        state
    }

    pub fn seasons(&self) -> &[String] {
        self.selector.seasons()
    }

    pub fn selected_season(&self) -> Option<&str> {
        self.seasons().get(self.season_idx).map(String::as_str)
    }

    pub fn team_a_name(&self) -> Option<&str> {
        self.teams.get(self.team_a).map(String::as_str)
    }

    pub fn team_b_name(&self) -> Option<&str> {
        self.teams.get(self.team_b).map(String::as_str)
    }

    pub fn team1_name(&self) -> Option<&str> {
        self.teams.get(self.team1).map(String::as_str)
    }

    pub fn team2_name(&self) -> Option<&str> {
        self.teams.get(self.team2).map(String::as_str)
    }

    pub fn player1_name(&self) -> Option<&str> {
        self.players1.get(self.player1).map(String::as_str)
    }

    pub fn player2_name(&self) -> Option<&str> {
        self.players2.get(self.player2).map(String::as_str)
    }

    pub fn set_screen(&mut self, screen: Screen) {
        if self.screen == screen {
            return;
        }
        self.screen = screen;
        self.focus = Field::Season;
        if screen == Screen::Compare {
            self.refresh_comparison();
        }
    }

    pub fn fields(&self) -> &'static [Field] {
        match self.screen {
            Screen::Suggest => SUGGEST_FIELDS,
            Screen::Compare => COMPARE_FIELDS,
        }
    }

    pub fn focus_next(&mut self) {
        self.move_focus(1);
    }

    pub fn focus_prev(&mut self) {
        self.move_focus(-1);
    }

    fn move_focus(&mut self, delta: i64) {
        let fields = self.fields();
        let current = fields.iter().position(|f| *f == self.focus).unwrap_or(0);
        self.focus = fields[step(current, fields.len(), delta)];
    }

    /// Move the focused picker by `delta` (wrapping), recomputing what depends on it.
    pub fn adjust(&mut self, delta: i64) {
        match self.focus {
            Field::Season => {
                let next = step(self.season_idx, self.seasons().len(), delta);
                if next != self.season_idx {
                    self.season_idx = next;
                    self.load_season();
                }
            }
            Field::TeamA => self.team_a = step(self.team_a, self.teams.len(), delta),
            Field::TeamB => self.team_b = step(self.team_b, self.teams.len(), delta),
            Field::TopN => {
                let n = self.top_n as i64 + delta;
                self.top_n = n.clamp(1, MAX_TOP_N as i64) as usize;
            }
            Field::Team1 => {
                self.team1 = step(self.team1, self.teams.len(), delta);
                self.player1 = 0;
                self.refresh_players();
                self.refresh_comparison();
            }
            Field::Team2 => {
                self.team2 = step(self.team2, self.teams.len(), delta);
                self.player2 = 0;
                self.refresh_players();
                self.refresh_comparison();
            }
            Field::Player1 => {
                self.player1 = step(self.player1, self.players1.len(), delta);
                self.refresh_comparison();
            }
            Field::Player2 => {
                self.player2 = step(self.player2, self.players2.len(), delta);
                self.refresh_comparison();
            }
        }
    }

    pub fn run_suggest(&mut self) {
        let (Some(season), Some(team_a), Some(team_b)) = (
            self.selected_season().map(str::to_string),
            self.team_a_name().map(str::to_string),
            self.team_b_name().map(str::to_string),
        ) else {
            self.warn_log("Pick a season and two teams first");
            return;
        };

        self.suggestion_scroll = 0;
        match self.selector.suggest(&season, &team_a, &team_b, self.top_n) {
            Ok(set) => {
                self.notice = None;
                self.info_log(format!("{} generated", set.title()));
                self.suggestions = Some(set);
            }
            Err(err) => {
                self.suggestions = None;
                self.report(err);
            }
        }
    }

    pub fn scroll_suggestions(&mut self, delta: i64) {
        let total = self.suggestions.as_ref().map_or(0, |s| s.rows.len());
        let max = total.saturating_sub(1) as i64;
        self.suggestion_scroll = (self.suggestion_scroll as i64 + delta).clamp(0, max) as usize;
    }

    pub fn push_log(&mut self, msg: impl Into<String>) {
        let line = format!("{} {}", Local::now().format("%H:%M:%S"), msg.into());
        self.logs.push_back(line);
        while self.logs.len() > MAX_LOGS {
            self.logs.pop_front();
        }
    }

    fn info_log(&mut self, msg: impl Into<String>) {
        let msg = msg.into();
        info!("{msg}");
        self.push_log(format!("[INFO] {msg}"));
    }

    fn warn_log(&mut self, msg: impl Into<String>) {
        let msg = msg.into();
        warn!("{msg}");
        self.notice = Some(msg.clone());
        self.push_log(format!("[WARN] {msg}"));
    }

    fn report(&mut self, err: SelectorError) {
        if err.is_recoverable() {
            self.warn_log(err.to_string());
        } else {
            self.warn_log(format!("error: {err}"));
        }
    }

    /// Season changed: every team and player pick belongs to the old season.
    fn load_season(&mut self) {
        self.suggestions = None;
        self.suggestion_scroll = 0;
        self.comparison = None;
        self.notice = None;

        let Some(season) = self.selected_season().map(str::to_string) else {
            self.teams.clear();
            self.players1.clear();
            self.players2.clear();
            self.warn_log("No seasons available");
            return;
        };
        self.teams = match self.selector.teams(&season) {
            Ok(teams) => teams,
            Err(err) => {
                self.report(err);
                Vec::new()
            }
        };
        let second = if self.teams.len() > 1 { 1 } else { 0 };
        self.team_a = 0;
        self.team_b = second;
        self.team1 = 0;
        self.team2 = second;
        self.player1 = 0;
        self.player2 = 0;
        self.refresh_players();
        self.push_log(format!("[INFO] Season {season}: {} teams", self.teams.len()));
        if self.screen == Screen::Compare {
            self.refresh_comparison();
        }
    }

    fn refresh_players(&mut self) {
        let Some(season) = self.selected_season().map(str::to_string) else {
            return;
        };
        let players_of = |team: Option<&str>| {
            team.and_then(|t| self.selector.players(&season, t).ok())
                .unwrap_or_default()
        };
        let players1 = players_of(self.team1_name());
        let players2 = players_of(self.team2_name());
        self.players1 = players1;
        self.players2 = players2;
        if self.player1 >= self.players1.len() {
            self.player1 = 0;
        }
        if self.player2 >= self.players2.len() {
            self.player2 = 0;
        }
    }

    pub fn refresh_comparison(&mut self) {
        self.comparison = None;
        let picks = (
            self.selected_season().map(str::to_string),
            self.team1_name().map(str::to_string),
            self.player1_name().map(str::to_string),
            self.team2_name().map(str::to_string),
            self.player2_name().map(str::to_string),
        );
        let (Some(season), Some(t1), Some(p1), Some(t2), Some(p2)) = picks else {
            self.notice = Some("Both teams need at least one player this season".to_string());
            return;
        };
        if p1 == p2 {
            self.warn_log(format!("{p1} is picked in both slots; pick two different players"));
            return;
        }
        match self.selector.compare(&season, &t1, &p1, &t2, &p2) {
            Ok(cmp) => {
                self.notice = None;
                self.comparison = Some(cmp);
            }
            Err(err) => self.report(err),
        }
    }
}

fn step(idx: usize, len: usize, delta: i64) -> usize {
    if len == 0 {
        return 0;
    }
    (idx as i64 + delta).rem_euclid(len as i64) as usize
}

pub fn screen_label(screen: Screen) -> &'static str {
    match screen {
        Screen::Suggest => "SUGGEST",
        Screen::Compare => "COMPARE",
    }
}

pub fn field_label(field: Field) -> &'static str {
    match field {
        Field::Season => "Season",
        Field::TeamA => "Team A",
        Field::TeamB => "Team B",
        Field::TopN => "Top N",
        Field::Team1 => "Team 1",
        Field::Player1 => "Player 1",
        Field::Team2 => "Team 2",
        Field::Player2 => "Player 2",
    }
}

#[cfg(test)]
mod tests {
    use super::step;

    #[test]
    fn step_wraps_both_ways() {
        assert_eq!(step(0, 3, -1), 2);
        assert_eq!(step(2, 3, 1), 0);
        assert_eq!(step(1, 3, 4), 2);
        assert_eq!(step(5, 0, 1), 0);
    }
}
