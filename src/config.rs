use std::env;
use std::path::{Path, PathBuf};

use crate::dataset::DatasetPaths;
use crate::season::TeamAssignment;

pub const DEFAULT_TOP_N: usize = 22;
pub const MAX_TOP_N: usize = 200;

const APP_DIR: &str = "ipl_selector";
const LOG_FILE: &str = "ipl_selector.log";

const DEFAULT_DATA_DIR: &str = "data";
const DEFAULT_PLAYERS_FILE: &str = "player_features_with_score.csv";
const DEFAULT_DELIVERIES_FILE: &str = "deliveries.csv";
const DEFAULT_MATCHES_FILE: &str = "matches.csv";

#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub data_dir: PathBuf,
    pub players_file: PathBuf,
    pub deliveries_file: PathBuf,
    pub matches_file: PathBuf,
    pub top_n: usize,
    pub team_policy: TeamAssignment,
    pub log_file: Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self::from_lookup(|_| None)
    }
}

impl AppConfig {
    /// Reads `.env.local`, `.env`, then the process environment.
    pub fn from_env() -> Self {
        let _ = dotenvy::from_filename(".env.local");
        let _ = dotenvy::from_filename(".env");
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let data_dir = get("IPL_DATA_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_DIR));
        let top_n = get("IPL_TOP_N")
            .and_then(|v| v.trim().parse::<usize>().ok())
            .unwrap_or(DEFAULT_TOP_N)
            .clamp(1, MAX_TOP_N);
        let team_policy = get("IPL_TEAM_POLICY")
            .and_then(|v| v.parse::<TeamAssignment>().ok())
            .unwrap_or_default();
        let log_file = get("IPL_LOG_FILE")
            .map(PathBuf::from)
            .or_else(|| app_cache_dir().map(|dir| dir.join(LOG_FILE)));

        Self {
            data_dir,
            players_file: get("IPL_PLAYERS_FILE")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_PLAYERS_FILE)),
            deliveries_file: get("IPL_DELIVERIES_FILE")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_DELIVERIES_FILE)),
            matches_file: get("IPL_MATCHES_FILE")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_MATCHES_FILE)),
            top_n,
            team_policy,
            log_file,
        }
    }

    /// Command-line flags win over the environment.
    pub fn with_args(mut self, args: &[String]) -> Self {
        if let Some(dir) = arg_value(args, "data-dir") {
            self.data_dir = PathBuf::from(dir);
        }
        if let Some(file) = arg_value(args, "players") {
            self.players_file = PathBuf::from(file);
        }
        if let Some(file) = arg_value(args, "deliveries") {
            self.deliveries_file = PathBuf::from(file);
        }
        if let Some(file) = arg_value(args, "matches") {
            self.matches_file = PathBuf::from(file);
        }
        if let Some(n) = arg_value(args, "top").and_then(|v| v.trim().parse::<usize>().ok()) {
            self.top_n = n.clamp(1, MAX_TOP_N);
        }
        if let Some(policy) = arg_value(args, "team-policy").and_then(|v| v.parse().ok()) {
            self.team_policy = policy;
        }
        self
    }

    pub fn dataset_paths(&self) -> DatasetPaths {
        DatasetPaths {
            players: resolve_in(&self.data_dir, &self.players_file),
            deliveries: resolve_in(&self.data_dir, &self.deliveries_file),
            matches: resolve_in(&self.data_dir, &self.matches_file),
        }
    }
}

fn resolve_in(dir: &Path, file: &Path) -> PathBuf {
    if file.is_absolute() {
        file.to_path_buf()
    } else {
        dir.join(file)
    }
}

/// Value of `--name=value` or `--name value`.
pub fn arg_value(args: &[String], name: &str) -> Option<String> {
    let long = format!("--{name}");
    let prefix = format!("--{name}=");
    for (idx, arg) in args.iter().enumerate() {
        if let Some(v) = arg.strip_prefix(&prefix)
            && !v.trim().is_empty()
        {
            return Some(v.trim().to_string());
        }
        if *arg == long
            && let Some(next) = args.get(idx + 1)
            && !next.trim().is_empty()
            && !next.starts_with("--")
        {
            return Some(next.trim().to_string());
        }
    }
    None
}

pub fn has_flag(args: &[String], name: &str) -> bool {
    let long = format!("--{name}");
    args.iter().any(|arg| *arg == long)
}

pub fn app_cache_dir() -> Option<PathBuf> {
    if let Ok(base) = env::var("XDG_CACHE_HOME")
        && !base.trim().is_empty()
    {
        return Some(PathBuf::from(base).join(APP_DIR));
    }
    let home = env::var("HOME").ok()?;
    if home.trim().is_empty() {
        return None;
    }
    Some(PathBuf::from(home).join(".cache").join(APP_DIR))
}
