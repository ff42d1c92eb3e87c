use std::cmp::Ordering;

use serde::Serialize;

use crate::error::{Result, SelectorError};
use crate::season::{SeasonPlayerRow, SeasonView};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Verdict {
    Left,
    Right,
    Tied,
}

impl Verdict {
    fn from_ordering(ordering: Ordering) -> Self {
        match ordering {
            Ordering::Greater => Self::Left,
            Ordering::Less => Self::Right,
            Ordering::Equal => Self::Tied,
        }
    }

    fn by_count(left: i64, right: i64) -> Self {
        Self::from_ordering(left.cmp(&right))
    }

    fn by_score(left: f64, right: f64) -> Self {
        Self::from_ordering(left.partial_cmp(&right).unwrap_or(Ordering::Equal))
    }

    pub fn swapped(self) -> Self {
        match self {
            Self::Left => Self::Right,
            Self::Right => Self::Left,
            Self::Tied => Self::Tied,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Category {
    Batting,
    Bowling,
    Overall,
}

impl Category {
    pub fn label(self) -> &'static str {
        match self {
            Self::Batting => "Batting",
            Self::Bowling => "Bowling",
            Self::Overall => "Overall",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlayerCard {
    pub player: String,
    pub team: String,
    pub runs: i64,
    pub wickets: i64,
    pub performance_score: f64,
}

impl PlayerCard {
    fn from_row(row: &SeasonPlayerRow) -> Self {
        Self {
            player: row.player.clone(),
            team: row.team.clone(),
            runs: row.runs,
            wickets: row.wickets,
            performance_score: row.performance_score,
        }
    }

    pub fn display_score(&self) -> f64 {
        round_display(self.performance_score)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Comparison {
    pub season: String,
    pub left: PlayerCard,
    pub right: PlayerCard,
    pub batting: Verdict,
    pub bowling: Verdict,
    pub overall: Verdict,
}

/// Compare two (team, player) picks within one season.
pub fn compare(
    view: &SeasonView,
    team1: &str,
    player1: &str,
    team2: &str,
    player2: &str,
) -> Result<Comparison> {
    let lookup = |team: &str, player: &str| {
        view.find(team, player)
            .ok_or_else(|| SelectorError::PlayerNotFound {
                season: view.season.clone(),
                team: team.to_string(),
                player: player.to_string(),
            })
    };
    let left = PlayerCard::from_row(lookup(team1, player1)?);
    let right = PlayerCard::from_row(lookup(team2, player2)?);

    Ok(Comparison {
        season: view.season.clone(),
        batting: Verdict::by_count(left.runs, right.runs),
        bowling: Verdict::by_count(left.wickets, right.wickets),
        overall: Verdict::by_score(left.performance_score, right.performance_score),
        left,
        right,
    })
}

impl Comparison {
    pub fn verdicts(&self) -> [(Category, Verdict); 3] {
        [
            (Category::Batting, self.batting),
            (Category::Bowling, self.bowling),
            (Category::Overall, self.overall),
        ]
    }

    pub fn winner(&self, verdict: Verdict) -> Option<&PlayerCard> {
        match verdict {
            Verdict::Left => Some(&self.left),
            Verdict::Right => Some(&self.right),
            Verdict::Tied => None,
        }
    }

    pub fn verdict_text(&self, category: Category) -> String {
        let verdict = match category {
            Category::Batting => self.batting,
            Category::Bowling => self.bowling,
            Category::Overall => self.overall,
        };
        match self.winner(verdict) {
            Some(card) => format!("{}: {} better", category.label(), card.player),
            None => format!("{}: tied", category.label()),
        }
    }

    /// One sentence per category.
    pub fn insights(&self) -> Vec<String> {
        let (l, r) = (&self.left, &self.right);
        let batting = match self.winner(self.batting) {
            Some(w) => format!(
                "{} has scored more runs ({} vs {})",
                w.player, l.runs.max(r.runs), l.runs.min(r.runs)
            ),
            None => format!("Both players have scored {} runs", l.runs),
        };
        let bowling = match self.winner(self.bowling) {
            Some(w) => format!(
                "{} has taken more wickets ({} vs {})",
                w.player,
                l.wickets.max(r.wickets),
                l.wickets.min(r.wickets)
            ),
            None => format!("Both players have taken {} wickets", l.wickets),
        };
        let (hi, lo) = if self.overall == Verdict::Right {
            (r.display_score(), l.display_score())
        } else {
            (l.display_score(), r.display_score())
        };
        let overall = match self.winner(self.overall) {
            Some(w) => format!(
                "{} has the higher performance score ({hi:.3} vs {lo:.3})",
                w.player
            ),
            None => format!("Both players share a performance score of {hi:.3}"),
        };
        vec![batting, bowling, overall]
    }

    /// (label, left, right) triples for the comparison bar chart.
    pub fn chart_series(&self) -> [(&'static str, f64, f64); 3] {
        [
            ("Runs", self.left.runs as f64, self.right.runs as f64),
            ("Wickets", self.left.wickets as f64, self.right.wickets as f64),
            (
                "Performance",
                self.left.performance_score,
                self.right.performance_score,
            ),
        ]
    }

    pub fn swapped(&self) -> Self {
        Self {
            season: self.season.clone(),
            left: self.right.clone(),
            right: self.left.clone(),
            batting: self.batting.swapped(),
            bowling: self.bowling.swapped(),
            overall: self.overall.swapped(),
        }
    }
}

pub fn round_display(value: f64) -> f64 {
    (value * 1000.0).round() / 1000.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_display_keeps_three_places() {
        assert_eq!(round_display(80.12345), 80.123);
        assert_eq!(round_display(95.0), 95.0);
        assert_eq!(round_display(2.71828), 2.718);
    }

    #[test]
    fn verdicts_handle_ties() {
        assert_eq!(Verdict::by_score(2.0, 1.0), Verdict::Left);
        assert_eq!(Verdict::by_score(1.0, 2.0), Verdict::Right);
        assert_eq!(Verdict::by_score(1.0, 1.0), Verdict::Tied);
        assert_eq!(Verdict::by_count(500, 300), Verdict::Left);
        assert_eq!(Verdict::by_count(0, 10), Verdict::Right);
        assert_eq!(Verdict::by_count(7, 7), Verdict::Tied);
        assert_eq!(Verdict::Left.swapped(), Verdict::Right);
        assert_eq!(Verdict::Tied.swapped(), Verdict::Tied);
    }

    #[test]
    fn counts_above_f64_precision_still_differ() {
        let big = 1_i64 << 53;
        assert_eq!(Verdict::by_count(big + 1, big), Verdict::Left);
    }
}
