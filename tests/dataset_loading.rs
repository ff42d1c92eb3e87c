use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use parquet::data_type::{ByteArray, ByteArrayType, DoubleType, Int64Type};
use parquet::file::properties::WriterProperties;
use parquet::file::writer::SerializedFileWriter;
use parquet::schema::parser::parse_message_type;

use ipl_selector::SelectorError;
use ipl_selector::config::AppConfig;
use ipl_selector::dataset::{DatasetPaths, DatasetStore, Player, load_players, load_tables};
use ipl_selector::season::TeamAssignment;
use ipl_selector::selector::Selector;

fn fixture(name: &str) -> PathBuf {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("tests");
    path.push("fixtures");
    path.push(name);
    path
}

fn fixture_paths() -> DatasetPaths {
    DatasetPaths {
        players: fixture("players.csv"),
        deliveries: fixture("deliveries.csv"),
        matches: fixture("matches.csv"),
    }
}

#[test]
fn loads_all_three_fixture_tables() {
    let store = DatasetStore::open(fixture_paths());
    assert!(!store.is_loaded());

    let tables = store.load().expect("fixtures should load");
    assert!(store.is_loaded());
    assert_eq!(tables.players.len(), 12);
    assert_eq!(tables.deliveries.len(), 23);
    assert_eq!(tables.matches.len(), 5);

    let kohli = tables
        .players
        .iter()
        .find(|p| p.player == "V Kohli")
        .expect("kohli row");
    assert_eq!(kohli.runs, 6624);
    assert_eq!(kohli.wickets, 4);
    assert_eq!(kohli.performance_score, 95.4321);
}

#[test]
fn blank_season_is_kept_as_null() {
    let tables = DatasetStore::open(fixture_paths()).load().unwrap();
    let unknown = tables.matches.iter().find(|m| m.id == 5).unwrap();
    assert_eq!(unknown.season, None);
    assert_eq!(tables.seasons(), vec!["2020/21", "2019"]);
}

#[test]
fn store_loads_once() {
    let store = DatasetStore::open(fixture_paths());
    let first = store.load().unwrap();
    let second = store.load().unwrap();
    assert!(Arc::ptr_eq(&first, &second));
}

#[test]
fn missing_file_is_an_io_error() {
    let mut paths = fixture_paths();
    paths.deliveries = fixture("no_such_deliveries.csv");
    let store = DatasetStore::open(paths);
    match store.load() {
        Err(SelectorError::Io { path, .. }) => assert!(path.ends_with("no_such_deliveries.csv")),
        other => panic!("expected io error, got {other:?}"),
    }
    assert!(!store.is_loaded());
}

#[test]
fn missing_required_column_is_missing_data() {
    let err = load_players(&fixture("players_missing_score.csv")).unwrap_err();
    match err {
        SelectorError::MissingData(msg) => {
            assert!(msg.contains("performance_score"), "message was: {msg}")
        }
        other => panic!("expected missing data, got {other}"),
    }
}

#[test]
fn config_paths_resolve_against_data_dir() {
    let fixtures = fixture("");
    let dir = fixtures.to_string_lossy().to_string();
    let config = AppConfig::from_lookup(|key| match key {
        "IPL_DATA_DIR" => Some(dir.clone()),
        "IPL_PLAYERS_FILE" => Some("players.csv".to_string()),
        _ => None,
    });
    let paths = config.dataset_paths();
    assert_eq!(paths.players, fixture("players.csv"));
    assert_eq!(paths.deliveries, fixture("deliveries.csv"));
    assert_eq!(paths.matches, fixture("matches.csv"));
    assert!(DatasetStore::open(paths).load().is_ok());
}

enum ParquetColumn {
    Text(Vec<&'static str>),
    Int(Vec<i64>),
    Double(Vec<f64>),
    /// Non-null values plus one definition level per row (0 = null).
    NullableDouble(Vec<f64>, Vec<i16>),
}

/// Write a single-row-group parquet file into the temp dir. Columns follow schema order.
fn write_parquet(name: &str, schema: &str, columns: &[ParquetColumn]) -> PathBuf {
    let path = std::env::temp_dir().join(format!("ipl_selector_{}_{name}", std::process::id()));
    let schema = Arc::new(parse_message_type(schema).expect("valid parquet schema"));
    let props = Arc::new(WriterProperties::builder().build());
    let file = fs::File::create(&path).expect("create parquet file");
    let mut writer = SerializedFileWriter::new(file, schema, props).expect("parquet writer");
    let mut row_group = writer.next_row_group().expect("row group");
    for column in columns {
        let mut col = row_group
            .next_column()
            .expect("next column")
            .expect("schema has a column for every value list");
        match column {
            ParquetColumn::Text(values) => {
                let values: Vec<ByteArray> = values.iter().map(|v| ByteArray::from(*v)).collect();
                col.typed::<ByteArrayType>().write_batch(values.as_slice(), None, None)
            }
            ParquetColumn::Int(values) => {
                col.typed::<Int64Type>().write_batch(values.as_slice(), None, None)
            }
            ParquetColumn::Double(values) => {
                col.typed::<DoubleType>().write_batch(values.as_slice(), None, None)
            }
            ParquetColumn::NullableDouble(values, defs) => {
                col.typed::<DoubleType>()
                    .write_batch(values.as_slice(), Some(defs.as_slice()), None)
            }
        }
        .expect("write column");
        col.close().expect("close column");
    }
    row_group.close().expect("close row group");
    writer.close().expect("close parquet file");
    path
}

#[test]
fn parquet_players_accept_typed_columns() {
    let path = write_parquet(
        "players.parquet",
        "message players {
            REQUIRED BYTE_ARRAY player (UTF8);
            REQUIRED DOUBLE runs;
            REQUIRED INT64 wickets;
            OPTIONAL DOUBLE performance_score;
        }",
        &[
            ParquetColumn::Text(vec!["A", "B", "C"]),
            ParquetColumn::Double(vec![500.0, 0.0, 12.0]),
            ParquetColumn::Int(vec![0, 10, 3]),
            ParquetColumn::NullableDouble(vec![80.0, 1e-20], vec![1, 1, 0]),
        ],
    );
    let players = load_players(&path);
    fs::remove_file(&path).ok();

    // C has a null score and cannot be ranked.
    assert_eq!(
        players.expect("parquet players should load"),
        vec![
            Player {
                player: "A".to_string(),
                runs: 500,
                wickets: 0,
                performance_score: 80.0,
            },
            Player {
                player: "B".to_string(),
                runs: 0,
                wickets: 10,
                performance_score: 1e-20,
            },
        ]
    );
}

#[test]
fn parquet_matches_and_deliveries_feed_a_season() {
    let matches = write_parquet(
        "matches.parquet",
        "message matches {
            REQUIRED INT64 id;
            REQUIRED DOUBLE season;
            REQUIRED BYTE_ARRAY team1 (UTF8);
            REQUIRED BYTE_ARRAY team2 (UTF8);
        }",
        &[
            ParquetColumn::Int(vec![1, 2]),
            ParquetColumn::Double(vec![2019.0, 2020.0]),
            ParquetColumn::Text(vec!["Mumbai Indians", "Mumbai Indians"]),
            ParquetColumn::Text(vec!["Chennai Super Kings", "Delhi Capitals"]),
        ],
    );
    // Older exports: `id` and `batsman` instead of `match_id` and `batter`.
    let deliveries = write_parquet(
        "deliveries.parquet",
        "message deliveries {
            REQUIRED INT64 id;
            REQUIRED BYTE_ARRAY batsman (UTF8);
            REQUIRED BYTE_ARRAY batting_team (UTF8);
        }",
        &[
            ParquetColumn::Int(vec![1, 1, 2]),
            ParquetColumn::Text(vec!["RG Sharma", "MS Dhoni", "RR Pant"]),
            ParquetColumn::Text(vec![
                "Mumbai Indians",
                "Chennai Super Kings",
                "Delhi Capitals",
            ]),
        ],
    );
    let tables = load_tables(&DatasetPaths {
        players: fixture("players.csv"),
        deliveries: deliveries.clone(),
        matches: matches.clone(),
    });
    fs::remove_file(&matches).ok();
    fs::remove_file(&deliveries).ok();

    let tables = tables.expect("parquet tables should load");
    assert_eq!(tables.seasons(), vec!["2020", "2019"]);

    let selector = Selector::new(Arc::new(tables), TeamAssignment::KeepAll);
    let set = selector
        .suggest("2019", "Mumbai Indians", "Chennai Super Kings", 22)
        .unwrap();
    let names: Vec<&str> = set.rows.iter().map(|r| r.player.as_str()).collect();
    assert_eq!(names, vec!["MS Dhoni", "RG Sharma"]);
}
