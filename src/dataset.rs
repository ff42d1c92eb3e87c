use std::collections::BTreeSet;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use once_cell::sync::OnceCell;
use parquet::file::reader::{FileReader, SerializedFileReader};
use parquet::record::Field;
use serde::Serialize;
use tracing::{info, warn};

use crate::error::{Result, SelectorError};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Player {
    pub player: String,
    pub runs: i64,
    pub wickets: i64,
    pub performance_score: f64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Delivery {
    pub match_id: u64,
    pub batter: String,
    pub batting_team: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchRecord {
    pub id: u64,
    pub season: Option<String>,
    pub team1: String,
    pub team2: String,
}

/// The three base tables, immutable once loaded.
#[derive(Debug, Clone, Default)]
pub struct Tables {
    pub players: Vec<Player>,
    pub deliveries: Vec<Delivery>,
    pub matches: Vec<MatchRecord>,
}

impl Tables {
    /// Distinct non-null seasons, newest first.
    pub fn seasons(&self) -> Vec<String> {
        let set: BTreeSet<&str> = self
            .matches
            .iter()
            .filter_map(|m| m.season.as_deref())
            .collect();
        set.into_iter().rev().map(str::to_string).collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatasetPaths {
    pub players: PathBuf,
    pub deliveries: PathBuf,
    pub matches: PathBuf,
}

/// Load-once holder for [`Tables`].
///
/// The first successful [`DatasetStore::load`] reads the files; every later
/// call hands out the same `Arc`. A failed load leaves the store empty so the
/// caller may retry after fixing the files.
#[derive(Debug)]
pub struct DatasetStore {
    paths: Option<DatasetPaths>,
    tables: OnceCell<Arc<Tables>>,
}

impl DatasetStore {
    pub fn open(paths: DatasetPaths) -> Self {
        Self {
            paths: Some(paths),
            tables: OnceCell::new(),
        }
    }

    pub fn from_tables(tables: Tables) -> Self {
        Self {
            paths: None,
            tables: OnceCell::with_value(Arc::new(tables)),
        }
    }

    pub fn is_loaded(&self) -> bool {
        self.tables.get().is_some()
    }

    pub fn load(&self) -> Result<Arc<Tables>> {
        self.tables
            .get_or_try_init(|| {
                let Some(paths) = &self.paths else {
                    return Err(SelectorError::MissingData(
                        "dataset store has no file paths".to_string(),
                    ));
                };
                load_tables(paths).map(Arc::new)
            })
            .map(Arc::clone)
    }
}

pub fn load_tables(paths: &DatasetPaths) -> Result<Tables> {
    let players = load_players(&paths.players)?;
    let deliveries = load_deliveries(&paths.deliveries)?;
    let matches = load_matches(&paths.matches)?;
    info!(
        players = players.len(),
        deliveries = deliveries.len(),
        matches = matches.len(),
        "dataset loaded"
    );
    Ok(Tables {
        players,
        deliveries,
        matches,
    })
}

// ---------------------------------------------------------------------------
// Column projection
// ---------------------------------------------------------------------------

struct Column {
    name: &'static str,
    aliases: &'static [&'static str],
}

const PLAYER_COLUMNS: &[Column] = &[
    Column { name: "player", aliases: &[] },
    Column { name: "runs", aliases: &[] },
    Column { name: "wickets", aliases: &[] },
    Column { name: "performance_score", aliases: &[] },
];

const DELIVERY_COLUMNS: &[Column] = &[
    Column { name: "match_id", aliases: &["id"] },
    Column { name: "batter", aliases: &["batsman", "striker"] },
    Column { name: "batting_team", aliases: &[] },
];

const MATCH_COLUMNS: &[Column] = &[
    Column { name: "id", aliases: &["match_id"] },
    Column { name: "season", aliases: &[] },
    Column { name: "team1", aliases: &[] },
    Column { name: "team2", aliases: &[] },
];

type Cells = Vec<Option<String>>;

fn resolve_indices<'a>(
    headers: impl Iterator<Item = &'a str>,
    table: &str,
    path: &Path,
    columns: &[Column],
) -> Result<Vec<usize>> {
    let headers: Vec<String> = headers.map(|h| h.trim().to_ascii_lowercase()).collect();
    columns
        .iter()
        .map(|col| {
            std::iter::once(col.name)
                .chain(col.aliases.iter().copied())
                .find_map(|name| headers.iter().position(|h| h == name))
                .ok_or_else(|| SelectorError::missing_column(table, path, col.name))
        })
        .collect()
}

fn read_columns(path: &Path, table: &str, columns: &[Column]) -> Result<Vec<Cells>> {
    let is_parquet = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("parquet"));
    if is_parquet {
        return read_parquet_columns(path, table, columns);
    }
    let file = File::open(path).map_err(|source| SelectorError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    read_csv_columns(file, path, table, columns)
}

fn read_csv_columns<R: Read>(
    rdr: R,
    path: &Path,
    table: &str,
    columns: &[Column],
) -> Result<Vec<Cells>> {
    let csv_err = |source| SelectorError::Csv {
        path: path.to_path_buf(),
        source,
    };
    let mut reader = csv::ReaderBuilder::new().flexible(true).from_reader(rdr);
    let headers = reader.headers().map_err(csv_err)?.clone();
    let idx = resolve_indices(headers.iter(), table, path, columns)?;

    let mut rows = Vec::new();
    for (line, record) in reader.records().enumerate() {
        match record {
            Ok(record) => rows.push(
                idx.iter()
                    .map(|&i| record.get(i).and_then(clean_cell))
                    .collect(),
            ),
            Err(err) => warn!("skipping malformed {table} row {}: {err}", line + 2),
        }
    }
    Ok(rows)
}

fn read_parquet_columns(path: &Path, table: &str, columns: &[Column]) -> Result<Vec<Cells>> {
    let pq_err = |source| SelectorError::Parquet {
        path: path.to_path_buf(),
        source,
    };
    let file = File::open(path).map_err(|source| SelectorError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let reader = SerializedFileReader::new(file).map_err(pq_err)?;
    let names: Vec<String> = reader
        .metadata()
        .file_metadata()
        .schema_descr()
        .root_schema()
        .get_fields()
        .iter()
        .map(|f| f.name().to_string())
        .collect();
    let idx = resolve_indices(names.iter().map(String::as_str), table, path, columns)?;

    let mut rows = Vec::new();
    for row in reader.get_row_iter(None).map_err(pq_err)? {
        let row = match row {
            Ok(row) => row,
            Err(err) => {
                warn!("skipping unreadable {table} row: {err}");
                continue;
            }
        };
        let fields: Vec<&Field> = row.get_column_iter().map(|(_, field)| field).collect();
        rows.push(
            idx.iter()
                .map(|&i| fields.get(i).and_then(|f| field_text(f)))
                .collect(),
        );
    }
    Ok(rows)
}

fn field_text(field: &Field) -> Option<String> {
    match field {
        Field::Null => None,
        Field::Str(s) => clean_cell(s),
        other => clean_cell(&other.to_string()),
    }
}

fn clean_cell(raw: &str) -> Option<String> {
    let s = raw.trim();
    if s.is_empty() || ["na", "nan", "null", "none"].iter().any(|n| s.eq_ignore_ascii_case(n)) {
        None
    } else {
        Some(s.to_string())
    }
}

// ---------------------------------------------------------------------------
// Typed tables
// ---------------------------------------------------------------------------

pub fn load_players(path: &Path) -> Result<Vec<Player>> {
    let rows = read_columns(path, "players", PLAYER_COLUMNS)?;
    non_empty(players_from_rows(rows), "players", path)
}

pub fn load_deliveries(path: &Path) -> Result<Vec<Delivery>> {
    let rows = read_columns(path, "deliveries", DELIVERY_COLUMNS)?;
    non_empty(deliveries_from_rows(rows), "deliveries", path)
}

pub fn load_matches(path: &Path) -> Result<Vec<MatchRecord>> {
    let rows = read_columns(path, "matches", MATCH_COLUMNS)?;
    non_empty(matches_from_rows(rows), "matches", path)
}

fn non_empty<T>(rows: Vec<T>, table: &str, path: &Path) -> Result<Vec<T>> {
    if rows.is_empty() {
        return Err(SelectorError::MissingData(format!(
            "{table} table {} has no usable rows",
            path.display()
        )));
    }
    Ok(rows)
}

fn players_from_rows(rows: Vec<Cells>) -> Vec<Player> {
    let mut out = Vec::with_capacity(rows.len());
    for row in rows {
        let [player, runs, wickets, score] = <[Option<String>; 4]>::try_from(row)
            .unwrap_or_else(|_| [None, None, None, None]);
        let Some(player) = player else {
            warn!("skipping player row without a name");
            continue;
        };
        let Some(performance_score) = score.as_deref().and_then(parse_score) else {
            warn!("skipping player '{player}': missing or non-finite performance_score");
            continue;
        };
        out.push(Player {
            runs: count_or_zero(&player, "runs", runs.as_deref()),
            wickets: count_or_zero(&player, "wickets", wickets.as_deref()),
            player,
            performance_score,
        });
    }
    out
}

fn count_or_zero(player: &str, column: &str, raw: Option<&str>) -> i64 {
    let Some(raw) = raw else {
        return 0;
    };
    parse_count(raw).unwrap_or_else(|| {
        warn!("player '{player}': unparseable {column} value '{raw}', using 0");
        0
    })
}

fn deliveries_from_rows(rows: Vec<Cells>) -> Vec<Delivery> {
    let mut out = Vec::with_capacity(rows.len());
    let mut skipped = 0usize;
    for row in rows {
        let [match_id, batter, team] = <[Option<String>; 3]>::try_from(row)
            .unwrap_or_else(|_| [None, None, None]);
        let (Some(match_id), Some(batter), Some(batting_team)) =
            (match_id.as_deref().and_then(parse_id), batter, team)
        else {
            skipped += 1;
            continue;
        };
        out.push(Delivery {
            match_id,
            batter,
            batting_team,
        });
    }
    if skipped > 0 {
        warn!("skipped {skipped} delivery rows with missing match_id, batter or batting_team");
    }
    out
}

fn matches_from_rows(rows: Vec<Cells>) -> Vec<MatchRecord> {
    let mut out = Vec::with_capacity(rows.len());
    for row in rows {
        let [id, season, team1, team2] = <[Option<String>; 4]>::try_from(row)
            .unwrap_or_else(|_| [None, None, None, None]);
        let Some(id) = id.as_deref().and_then(parse_id) else {
            warn!("skipping match row with missing or invalid id");
            continue;
        };
        // Deliveries of a match with a blank side still count for the season.
        if team1.is_none() || team2.is_none() {
            warn!("match {id}: missing team1/team2");
        }
        out.push(MatchRecord {
            id,
            season: season.map(normalize_season),
            team1: team1.unwrap_or_default(),
            team2: team2.unwrap_or_default(),
        });
    }
    out
}

/// Parquet and dataframe exports sometimes store the season as a float.
fn normalize_season(raw: String) -> String {
    match raw.strip_suffix(".0") {
        Some(year) if !year.is_empty() && year.chars().all(|c| c.is_ascii_digit()) => {
            year.to_string()
        }
        _ => raw,
    }
}

fn parse_score(raw: &str) -> Option<f64> {
    raw.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

fn parse_count(raw: &str) -> Option<i64> {
    let s = raw.trim();
    if let Ok(v) = s.parse::<i64>() {
        return Some(v);
    }
    let v = s.parse::<f64>().ok()?;
    if v.is_finite() && v.fract() == 0.0 {
        Some(v as i64)
    } else {
        None
    }
}

fn parse_id(raw: &str) -> Option<u64> {
    parse_count(raw).and_then(|v| u64::try_from(v).ok())
}
