//! Loads client game data the way a world server does at startup.
//!
//! Runs the full startup sequence, exits with code 1 when the data cannot be
//! used, and answers a few inspection queries against the loaded data.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use db2_core::defines::{ItemContext, Position3D, UiMapSystem};
use db2_core::manager::UiMapQuery;
use db2_core::{DataConfig, DataError, GameData, Locale};
use tracing_subscriber::EnvFilter;

/// Command-line arguments for the data loader.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Data directory containing dbc/ and gt/
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// Default locale, e.g. enUS
    #[arg(long)]
    locale: Option<Locale>,

    /// Concurrent table loads
    #[arg(long)]
    workers: Option<usize>,

    /// JSON hotfix store
    #[arg(long)]
    hotfixes: Option<PathBuf>,

    /// Skip gt/*.txt game tables
    #[arg(long)]
    no_game_tables: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print load statistics (default)
    Summary,

    /// Evaluate a curve at x
    Curve {
        id: u32,
        #[arg(allow_negative_numbers = true)]
        x: f32,
    },

    /// Resolve a world position to UI map coordinates
    UiMap {
        #[arg(long)]
        map: i32,
        #[arg(long, allow_negative_numbers = true)]
        x: f32,
        #[arg(long, allow_negative_numbers = true)]
        y: f32,
        #[arg(long, allow_negative_numbers = true, default_value_t = 0.0)]
        z: f32,
        #[arg(long, default_value_t = 0)]
        area: i32,
        /// 0 world, 1 taxi, 2 adventure
        #[arg(long, default_value_t = 0)]
        system: u8,
        /// Coordinates relative to the matched map instead of its continent
        #[arg(long)]
        local: bool,
    },

    /// List the nodes of an item bonus tree
    BonusTree {
        id: u32,
        /// Only direct nodes
        #[arg(long)]
        direct: bool,
    },

    /// Default bonus lists of an item for an item context
    DefaultBonuses {
        item: u32,
        #[arg(long, default_value_t = 0)]
        context: u8,
    },
}

fn build_config(args: &Args) -> Result<DataConfig> {
    let mut config = match &args.config {
        Some(path) => DataConfig::from_file(path)
            .with_context(|| format!("Failed to read configuration {}", path.display()))?,
        None => DataConfig::default(),
    };
    config
        .apply_env_overrides()
        .context("Invalid DB2_* environment override")?;

    if let Some(data_dir) = &args.data_dir {
        config.data_dir = data_dir.clone();
    }
    if let Some(locale) = args.locale {
        config.default_locale = locale;
    }
    if let Some(workers) = args.workers {
        config.load_workers = workers;
    }
    if let Some(hotfixes) = &args.hotfixes {
        config.hotfix_path = Some(hotfixes.clone());
    }
    if args.no_game_tables {
        config.load_game_tables = false;
    }
    Ok(config)
}

fn run(command: Command, data: &GameData) -> Result<()> {
    let manager = &data.manager;
    match command {
        Command::Summary => {
            let tables = manager.tables();
            println!("tables:      {}", tables.table_count());
            println!("records:     {}", tables.total_records());
            println!(
                "locales:     {}",
                tables
                    .available_locales()
                    .iter()
                    .map(|locale| locale.name())
                    .collect::<Vec<_>>()
                    .join(", ")
            );
            println!("hotfixes:    {} pushes, max id {}", data.hotfixes.pushes().len(), data.hotfixes.max_hotfix_id());
            println!("game tables: {}", if data.game_tables.is_some() { "loaded" } else { "skipped" });
            println!("load time:   {} ms", data.summary.elapsed.as_millis());
        }
        Command::Curve { id, x } => {
            let mode = manager
                .curve_interpolation_mode(id)
                .with_context(|| format!("Curve {} has no points", id))?;
            println!("{:?} {}", mode, manager.evaluate_curve(id, x));
        }
        Command::UiMap { map, x, y, z, area, system, local } => {
            let system = UiMapSystem::from_id(system)
                .with_context(|| format!("Unknown UI map system {}", system))?;
            let query = UiMapQuery::new(Position3D::new(x, y, z), map, area);
            match manager.ui_map_position(&query, system, local) {
                Some(position) => println!(
                    "ui map {} at ({:.4}, {:.4})",
                    position.ui_map_id, position.position.x, position.position.y
                ),
                None => println!("no ui map assignment"),
            }
        }
        Command::BonusTree { id, direct } => {
            for node in manager.item_bonus_tree(id, !direct) {
                println!(
                    "node {} parent {} context {} tree {} list {} selector {}",
                    node.id,
                    node.parent_item_bonus_tree_id,
                    node.item_context,
                    node.child_item_bonus_tree_id,
                    node.child_item_bonus_list_id,
                    node.child_item_level_selector_id
                );
            }
        }
        Command::DefaultBonuses { item, context } => {
            let bonus_lists = manager.default_item_bonus_tree(item, ItemContext(context));
            println!("{:?}", bonus_lists);
        }
    }
    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = build_config(&args)?;
    let data = match GameData::load(&config) {
        Ok(data) => data,
        Err(e @ DataError::DefaultLocaleMissing { .. }) => {
            tracing::error!("{}", e);
            tracing::error!("Check data_dir and default_locale, the data directory must hold dbc/<locale>/");
            std::process::exit(1);
        }
        Err(e @ DataError::OutdatedClientData { .. }) => {
            tracing::error!("{}", e);
            tracing::error!("Extract the data files again from the supported client build");
            std::process::exit(1);
        }
        Err(e @ DataError::TablesFailed { .. }) => {
            tracing::error!("{}", e);
            std::process::exit(1);
        }
        Err(e) => return Err(e).context("Failed to load game data"),
    };

    run(args.command.unwrap_or(Command::Summary), &data)
}
