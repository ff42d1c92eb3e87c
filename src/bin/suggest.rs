use anyhow::{Context, Result, anyhow};

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
        return print_listing(&selector, arg_value(&args, "season").as_deref());
    }

    let season = arg_value(&args, "season")
        .or_else(|| selector.seasons().first().cloned())
        .context("no season available")?;
    let team_a = arg_value(&args, "team-a").ok_or_else(|| anyhow!("--team-a is required"))?;
    let team_b = arg_value(&args, "team-b").ok_or_else(|| anyhow!("--team-b is required"))?;

    let set = selector.suggest(&season, &team_a, &team_b, config.top_n)?;

    if has_flag(&args, "json") {
        println!(
            "{}",
            serde_json::to_string_pretty(&set).context("serialize suggestions")?
        );
        return Ok(());
    }

    println!("{}", set.title());
    println!("{:>3}  {:<28} {:<30} {:>11}", "#", "Player", "Team", "Final score");
    for (idx, row) in set.rows.iter().enumerate() {
        println!(
            "{:>3}  {:<28} {:<30} {:>11.3}",
            idx + 1,
            row.player,
            row.team,
            row.final_score
        );
    }
    println!("eligible players: {}", set.eligible);
    Ok(())
}

fn print_listing(selector: &Selector, season: Option<&str>) -> Result<()> {
    let Some(season) = season else {
        println!("Seasons:");
        for season in selector.seasons() {
            println!("  {season}");
        }
        return Ok(());
    };
    println!("Teams in {season}:");
    for team in selector.teams(season)? {
        println!("  {team}");
    }
    Ok(())
}
