use anyhow::{Context, Result, anyhow};

use ipl_selector::compare::Comparison;
use ipl_selector::config::{AppConfig, arg_value, has_flag};
use ipl_selector::dataset::DatasetStore;
use ipl_selector::selector::Selector;
use ipl_selector::telemetry;

fn main() -> Result<()> {
    telemetry::init_stderr();
    let args = std::env::args().skip(1).collect::<Vec<_>>();
    let config = AppConfig::from_env().with_args(&args);

    let store = DatasetStore::open(config.dataset_paths());
    let selector = Selector::from_store(&store, config.team_policy)
        .with_context(|| format!("load datasets from {}", config.data_dir.display()))?;

    if has_flag(&args, "list") {
        let Some(season) = arg_value(&args, "season") else {
            println!("Seasons:");
            for season in selector.seasons() {
                println!("  {season}");
            }
            return Ok(());
        };
        for team in selector.teams(&season)? {
            println!("{team}:");
            for player in selector.players(&season, &team)? {
                println!("  {player}");
            }
        }
        return Ok(());
    }

    let season = arg_value(&args, "season")
        .or_else(|| selector.seasons().first().cloned())
        .context("no season available")?;

    let required = |name: &str| arg_value(&args, name).ok_or_else(|| anyhow!("--{name} is required"));
    let team1 = required("team1")?;
    let player1 = required("player1")?;
    let team2 = required("team2")?;
    let player2 = required("player2")?;

    let cmp = selector.compare(&season, &team1, &player1, &team2, &player2)?;

    if has_flag(&args, "json") {
        println!(
            "{}",
            serde_json::to_string_pretty(&cmp).context("serialize comparison")?
        );
        return Ok(());
    }
    print_comparison(&cmp);
    Ok(())
}

fn print_comparison(cmp: &Comparison) {
    let (l, r) = (&cmp.left, &cmp.right);
    println!("IPL {} head to head", cmp.season);
    println!("{:<14} {:>24} {:>24}", "", l.player, r.player);
    println!("{:<14} {:>24} {:>24}", "Team", l.team, r.team);
    println!("{:<14} {:>24} {:>24}", "Runs", l.runs, r.runs);
    println!("{:<14} {:>24} {:>24}", "Wickets", l.wickets, r.wickets);
    println!(
        "{:<14} {:>24.3} {:>24.3}",
        "Performance",
        l.display_score(),
        r.display_score()
    );
    println!();
    for (category, _) in cmp.verdicts() {
        println!("{}", cmp.verdict_text(category));
    }
    for line in cmp.insights() {
        println!("- {line}");
    }
}
