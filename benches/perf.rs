use std::sync::Arc;

use criterion::{Criterion, criterion_group, criterion_main};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::hint::black_box;

use ipl_selector::dataset::{Delivery, MatchRecord, Player, Tables};
use ipl_selector::season::{TeamAssignment, resolve};
use ipl_selector::selector::Selector;
use ipl_selector::suggest::suggest;

const TEAMS: usize = 10;
const SEASONS: u64 = 16;
const PLAYERS: usize = 700;
const MATCHES_PER_SEASON: u64 = 60;
const BALLS_PER_MATCH: usize = 240;

fn team_name(idx: usize) -> String {
    format!("Team {idx:02}")
}

fn season_name(idx: u64) -> String {
    (2008 + idx).to_string()
}

/// Roughly full-history sized tables with a fixed seed.
fn synthetic_tables() -> Tables {
    let mut rng = StdRng::seed_from_u64(0x1915);

    let players = (0..PLAYERS)
        .map(|idx| Player {
            player: format!("Player {idx:04}"),
            runs: rng.gen_range(0..7000),
            wickets: rng.gen_range(0..200),
            performance_score: rng.gen_range(0.0..100.0),
        })
        .collect();

    let mut matches = Vec::new();
    let mut deliveries = Vec::new();
    for season in 0..SEASONS {
        for n in 0..MATCHES_PER_SEASON {
            let id = season * 1000 + n;
            let home = rng.gen_range(0..TEAMS);
            let away = (home + rng.gen_range(1..TEAMS)) % TEAMS;
            matches.push(MatchRecord {
                id,
                season: Some(season_name(season)),
                team1: team_name(home),
                team2: team_name(away),
            });
            for ball in 0..BALLS_PER_MATCH {
                let team = if ball < BALLS_PER_MATCH / 2 { home } else { away };
                // Squads of 70 per team, with the odd loan to keep KeepAll honest.
                let slot = rng.gen_range(0..PLAYERS / TEAMS);
                let owner = if rng.gen_bool(0.02) { (team + 1) % TEAMS } else { team };
                deliveries.push(Delivery {
                    match_id: id,
                    batter: format!("Player {:04}", owner * (PLAYERS / TEAMS) + slot),
                    batting_team: team_name(team),
                });
            }
        }
    }

    Tables {
        players,
        deliveries,
        matches,
    }
}

fn bench_resolve(c: &mut Criterion) {
    let tables = synthetic_tables();
    let season = season_name(SEASONS - 1);
    for policy in [TeamAssignment::KeepAll, TeamAssignment::MostFrequent] {
        c.bench_function(&format!("resolve_season_{}", policy.label()), |b| {
            b.iter(|| resolve(black_box(&tables), black_box(&season), policy))
        });
    }
}

fn bench_suggest(c: &mut Criterion) {
    let tables = synthetic_tables();
    let view = resolve(&tables, &season_name(3), TeamAssignment::KeepAll);
    let (a, b) = (team_name(0), team_name(1));
    c.bench_function("suggest_top_22", |bench| {
        bench.iter(|| suggest(black_box(&view.players), &a, &b, black_box(22)))
    });
}

fn bench_prewarm(c: &mut Criterion) {
    let tables = Arc::new(synthetic_tables());
    c.bench_function("selector_prewarm_all_seasons", |b| {
        b.iter(|| {
            let selector = Selector::new(Arc::clone(&tables), TeamAssignment::KeepAll);
            black_box(selector.prewarm())
        })
    });
}

criterion_group!(benches, bench_resolve, bench_suggest, bench_prewarm);
criterion_main!(benches);
