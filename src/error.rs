use std::path::PathBuf;

use thiserror::Error;

pub type Result<T, E = SelectorError> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum SelectorError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("CSV error in {path}: {source}")]
    Csv { path: PathBuf, source: csv::Error },

    #[error("parquet error in {path}: {source}")]
    Parquet {
        path: PathBuf,
        source: parquet::errors::ParquetError,
    },

    /// Required column absent, unknown season, or an empty table.
    #[error("missing data: {0}")]
    MissingData(String),

    #[error("invalid selection: {0}")]
    InvalidSelection(String),

    #[error("no eligible players for {team_a} vs {team_b} in season {season}")]
    NoEligiblePlayers {
        season: String,
        team_a: String,
        team_b: String,
    },

    #[error("{player} ({team}) did not play in season {season}")]
    PlayerNotFound {
        season: String,
        team: String,
        player: String,
    },
}

impl SelectorError {
    pub fn missing_column(table: &str, path: &std::path::Path, column: &str) -> Self {
        Self::MissingData(format!(
            "{table} table {} has no `{column}` column",
            path.display()
        ))
    }

    /// Errors a session can show as a warning and carry on from.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::InvalidSelection(_) | Self::NoEligiblePlayers { .. } | Self::PlayerNotFound { .. }
        )
    }
}
