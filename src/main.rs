//! Batch battle simulator.
//!
//! Runs AI vs AI battles between two prefab rosters and prints aggregate
//! statistics. Every battle runs on its own blocking task and owns its own
//! battlefield.

use battle_core::battle::field::BattleField;
use battle_core::catalog::{DataCatalog, StandardCatalog};
use battle_core::config::BattleConfig;
use battle_core::errors::BattleResult;
use battle_core::prefab_rosters::{find_prefab_roster, prefab_rosters, PrefabRoster};
use battle_core::providers::{ActionProvider, ScoringAi};
use battle_core::telemetry::{BattleStatistics, JsonLinesObserver, StatisticsCollector};
use battle_core::view::NullView;
use battle_core::{BattleConclusion, BattleEngine, BattleReport};
use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::{Arc, Mutex};
use tokio::task::JoinSet;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

/// Headless battle simulator: AI vs AI battles between prefab rosters
#[derive(Parser, Debug)]
#[command(name = "battle-sim")]
#[command(about = "Run AI vs AI battles and print aggregate statistics")]
struct Args {
    /// Battle configuration file (RON)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Number of battles to run
    #[arg(long, default_value_t = 10)]
    battles: u64,

    /// Base random seed; battle N uses seed + N
    #[arg(long)]
    seed: Option<u64>,

    /// Write telemetry events to stdout as JSON lines
    #[arg(long)]
    json: bool,

    /// Player roster id
    #[arg(long, default_value = "sun")]
    roster_a: String,

    /// Enemy roster id
    #[arg(long, default_value = "rain")]
    roster_b: String,
}

fn load_roster(id: &str) -> Option<PrefabRoster> {
    let roster = find_prefab_roster(id);
    if roster.is_none() {
        let known: Vec<String> = prefab_rosters().into_iter().map(|r| r.id).collect();
        error!(roster = id, known = ?known, "unknown roster");
    }
    roster
}

fn run_battle(
    config: BattleConfig,
    catalog: Arc<dyn DataCatalog>,
    player: &PrefabRoster,
    enemy: &PrefabRoster,
    statistics: Arc<Mutex<BattleStatistics>>,
    json: bool,
) -> BattleResult<BattleReport> {
    let seed = config.seed.unwrap_or_default();
    let field = BattleField::new(
        config.format,
        player.build(catalog.as_ref())?,
        enemy.build(catalog.as_ref())?,
    )?;
    let providers: [Box<dyn ActionProvider>; 2] = [
        Box::new(ScoringAi::new(seed)),
        Box::new(ScoringAi::new(seed.rotate_left(32))),
    ];

    let mut engine = BattleEngine::new(field, config, catalog, providers, Box::new(NullView))?;
    engine.add_observer(Box::new(StatisticsCollector::sharing(statistics)));
    if json {
        engine.add_observer(Box::new(JsonLinesObserver::new(std::io::stdout())));
    }
    Ok(engine.run())
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("battle_core=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => match BattleConfig::from_path(path) {
            Ok(config) => config,
            Err(err) => {
                error!(path = %path.display(), error = %err, "could not load config");
                return ExitCode::FAILURE;
            }
        },
        None => BattleConfig::default(),
    };
    let base_seed = args
        .seed
        .or(config.seed)
        .unwrap_or_else(rand::random::<u64>);
    config.seed = Some(base_seed);

    let (Some(player), Some(enemy)) = (load_roster(&args.roster_a), load_roster(&args.roster_b)) else {
        return ExitCode::FAILURE;
    };
    let player = Arc::new(player);
    let enemy = Arc::new(enemy);

    let catalog: Arc<dyn DataCatalog> = Arc::new(StandardCatalog::builtin());
    let statistics = Arc::new(Mutex::new(BattleStatistics::default()));
    info!(battles = args.battles, seed = base_seed, player = %player.name, enemy = %enemy.name, "starting batch");

    let mut tasks = JoinSet::new();
    for index in 0..args.battles {
        let config = config.clone().with_seed(base_seed.wrapping_add(index));
        let catalog = Arc::clone(&catalog);
        let player = Arc::clone(&player);
        let enemy = Arc::clone(&enemy);
        let statistics = Arc::clone(&statistics);
        let json = args.json;
        tasks.spawn_blocking(move || {
            (
                index,
                run_battle(config, catalog, &player, &enemy, statistics, json),
            )
        });
    }

    let mut failures = 0u64;
    let mut aborted = 0u64;
    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok((index, Ok(report))) => {
                if let BattleConclusion::Aborted { diagnostic } = &report.conclusion {
                    aborted += 1;
                    warn!(battle = index, %diagnostic, "battle aborted");
                } else {
                    info!(battle = index, turns = report.turns, conclusion = %report.conclusion, "battle finished");
                }
            }
            Ok((index, Err(err))) => {
                failures += 1;
                error!(battle = index, error = %err, "battle could not be set up");
            }
            Err(err) => {
                failures += 1;
                error!(error = %err, "battle task panicked");
            }
        }
    }

    let summary = match statistics.lock() {
        Ok(stats) => stats.clone(),
        Err(_) => {
            error!("statistics lock poisoned");
            return ExitCode::FAILURE;
        }
    };

    println!("=== {} vs {} ===", player.name, enemy.name);
    println!("battles: {}", summary.battles);
    println!("average turns: {:.2}", summary.average_turns());
    println!("total damage: {}", summary.total_damage);
    for (conclusion, count) in &summary.conclusions {
        println!("  {}: {}", conclusion, count);
    }
    println!("actions:");
    for (kind, count) in &summary.actions_by_kind {
        println!("  {}: {}", kind, count);
    }
    if aborted > 0 || failures > 0 {
        println!("aborted: {}, failed: {}", aborted, failures);
    }

    if failures > 0 {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}
