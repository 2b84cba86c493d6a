//! Command-line front end for viewing-plan generation.
//!
//! # Responsibility
//! - Merge config file values with CLI flags (flags win).
//! - Open the study database and run one generation use-case per call.

mod catalogue;
mod output;

use clap::Parser;
use log::info;
use rusqlite::Connection;
use std::path::PathBuf;
use viewplan_core::db::open_db;
use viewplan_core::{
    default_log_level, init_logging, load_config, seeded_rng, AssignmentService,
    BatchPlanRequest, ConfigMode, SqliteParticipantRepository, SqliteViewSink, ViewAssignment,
    ViewPlanConfig, ViewPlanRequest,
};

pub fn bail(msg: impl std::fmt::Display) -> ! {
    eprintln!("Error: {msg}");
    std::process::exit(1);
}

#[derive(Parser)]
#[command(name = "viewplan", version, about = "Assign study items to participants")]
struct Cli {
    #[command(flatten)]
    global: GlobalArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Args)]
struct GlobalArgs {
    /// Path to the JSON config file with per-mode sections
    #[arg(long, global = true, default_value = "config/config.json")]
    config: PathBuf,

    /// Config section: development, test or production
    #[arg(long, global = true, default_value = "development")]
    mode: String,

    /// SQLite database file (overrides config)
    #[arg(long, global = true)]
    database: Option<PathBuf>,

    /// Absolute directory for log files (overrides config)
    #[arg(long, global = true)]
    log_dir: Option<PathBuf>,

    /// Log level: trace, debug, info, warn or error
    #[arg(long, global = true)]
    log_level: Option<String>,
}

#[derive(clap::Subcommand)]
enum Commands {
    /// Register anonymous participants
    Register {
        /// Number of participants to add
        #[arg(long)]
        count: usize,
    },
    /// Generate per-participant view sequences (cycle, or transit with --delay)
    Views(ViewsArgs),
    /// Generate batch-based view sequences
    Batches(BatchesArgs),
    /// Count the items available in a data directory
    CountItems {
        #[arg(long)]
        data_dir: PathBuf,
    },
}

#[derive(clap::Args)]
struct ItemArgs {
    /// Number of primary items (defaults to the count found in --data-dir)
    #[arg(long)]
    items: Option<usize>,

    /// Directory of `file*.zlib` payloads used to size the catalogue
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// Random seed (overrides config)
    #[arg(long)]
    seed: Option<u64>,

    /// Keep companions in primary-first order instead of random swaps
    #[arg(long)]
    no_swap: bool,

    /// Print the plan without writing it to the database
    #[arg(long)]
    dry_run: bool,

    /// Output rows as JSON
    #[arg(long)]
    json: bool,
}

#[derive(clap::Args)]
struct ViewsArgs {
    #[command(flatten)]
    common: ItemArgs,

    /// Distinct participants per item (overrides config)
    #[arg(long)]
    views: Option<usize>,

    /// Companion row delay; omit for a plain cycle plan
    #[arg(long)]
    delay: Option<usize>,

    /// Keep cycle order instead of shuffling rows
    #[arg(long)]
    no_shuffle: bool,

    /// Also register a cohort whose ids are shifted by this offset and persist
    /// a copy of the plan for it
    #[arg(long)]
    mirror_offset: Option<i64>,
}

#[derive(clap::Args)]
struct BatchesArgs {
    #[command(flatten)]
    common: ItemArgs,

    /// Number of batches (overrides config)
    #[arg(long)]
    batches: Option<usize>,

    /// Companion row delay (overrides config)
    #[arg(long)]
    delay: Option<usize>,

    /// Whole batches per participant (overrides config)
    #[arg(long)]
    batches_per_participant: Option<usize>,
}

fn main() {
    let cli = Cli::parse();

    if let Commands::CountItems { data_dir } = &cli.command {
        let count = catalogue::count_items(data_dir)
            .unwrap_or_else(|e| bail(format!("Failed to read {}: {e}", data_dir.display())));
        println!("{count}");
        return;
    }

    let mode = ConfigMode::parse(&cli.global.mode).unwrap_or_else(|e| bail(e));
    let cfg = load_config(&cli.global.config, mode).unwrap_or_else(|e| bail(e));
    start_logging(&cli.global, &cfg);
    info!("event=cli_start module=cli status=ok mode={}", mode.as_str());

    let conn = open_database(&cli.global, &cfg);
    let participants = SqliteParticipantRepository::try_new(&conn).unwrap_or_else(|e| bail(e));

    match cli.command {
        Commands::Register { count } => {
            let ids = participants
                .register_participants(count)
                .unwrap_or_else(|e| bail(e));
            match (ids.first(), ids.last()) {
                (Some(first), Some(last)) => {
                    println!("Registered {} participants (ids {first}..={last})", ids.len())
                }
                _ => println!("No participants registered"),
            }
        }
        Commands::Views(args) => {
            let service = AssignmentService::new(participants, SqliteViewSink::new(&conn));
            run_views(&conn, &service, &args, &cfg);
        }
        Commands::Batches(args) => {
            let service = AssignmentService::new(participants, SqliteViewSink::new(&conn));
            run_batches(&service, &args, &cfg);
        }
        // Answered above without touching the database.
        Commands::CountItems { .. } => {}
    }
}

fn open_database(global: &GlobalArgs, cfg: &ViewPlanConfig) -> Connection {
    let database = global
        .database
        .clone()
        .or_else(|| cfg.database.clone())
        .unwrap_or_else(|| {
            bail(format!(
                "No database specified. Pass --database or set it in {}",
                global.config.display()
            ))
        });
    open_db(&database)
        .unwrap_or_else(|e| bail(format!("Failed to open {}: {e}", database.display())))
}

type Service<'conn> = AssignmentService<SqliteParticipantRepository<'conn>, SqliteViewSink<'conn>>;

fn run_views(conn: &Connection, service: &Service<'_>, args: &ViewsArgs, cfg: &ViewPlanConfig) {
    let request = ViewPlanRequest {
        n_items: resolve_items(&args.common),
        n_views: args.views.unwrap_or(cfg.n_views),
        shuffle: !args.no_shuffle,
        delay: args.delay,
        swap_before_interleave: !args.common.no_swap,
    };
    let mut rng = seeded_rng(args.common.seed.or(cfg.seed));

    if args.common.dry_run {
        let rows = service
            .plan_views(&request, &mut rng)
            .unwrap_or_else(|e| bail(e));
        output::print_views(&rows, args.common.json);
        return;
    }

    let summary = service
        .create_views(&request, &mut rng)
        .unwrap_or_else(|e| bail(e));
    output::print_summary(&summary, args.common.json);

    if let Some(offset) = args.mirror_offset {
        register_cohort(conn, &summary.rows, offset);
        let mirrored = service
            .mirror_views(&summary.rows, offset)
            .unwrap_or_else(|e| bail(e));
        output::print_summary(&mirrored, args.common.json);
    }
}

/// Registers the shifted ids of every participant in `rows`.
fn register_cohort(conn: &Connection, rows: &[ViewAssignment], offset: i64) {
    let mut ids: Vec<i64> = rows
        .iter()
        .map(|row| row.participant_id.checked_add(offset))
        .collect::<Option<_>>()
        .unwrap_or_else(|| bail(format!("Mirror offset {offset} overflows participant ids")));
    ids.sort_unstable();
    ids.dedup();
    let added = SqliteParticipantRepository::try_new(conn)
        .and_then(|participants| participants.ensure_participants(&ids))
        .unwrap_or_else(|e| bail(e));
    info!("event=cohort_register module=cli status=ok offset={offset} added={added}");
}

fn run_batches(service: &Service<'_>, args: &BatchesArgs, cfg: &ViewPlanConfig) {
    let request = BatchPlanRequest {
        n_items: resolve_items(&args.common),
        n_batches: args.batches.unwrap_or(cfg.n_batches),
        delay: args.delay.unwrap_or(cfg.delay),
        batches_per_participant: args
            .batches_per_participant
            .unwrap_or(cfg.batches_per_participant),
        swap_before_interleave: !args.common.no_swap,
    };
    let mut rng = seeded_rng(args.common.seed.or(cfg.seed));

    if args.common.dry_run {
        let rows = service
            .plan_batch_views(&request, &mut rng)
            .unwrap_or_else(|e| bail(e));
        output::print_batch_views(&rows, args.common.json);
        return;
    }

    let summary = service
        .create_batch_views(&request, &mut rng)
        .unwrap_or_else(|e| bail(e));
    output::print_summary(&summary, args.common.json);
}

fn resolve_items(args: &ItemArgs) -> usize {
    if let Some(items) = args.items {
        return items;
    }
    match &args.data_dir {
        Some(dir) => catalogue::count_items(dir)
            .unwrap_or_else(|e| bail(format!("Failed to read {}: {e}", dir.display()))),
        None => bail("No item count specified. Pass --items or --data-dir"),
    }
}

fn start_logging(global: &GlobalArgs, cfg: &ViewPlanConfig) {
    let Some(log_dir) = global.log_dir.clone().or_else(|| cfg.log_dir.clone()) else {
        return;
    };
    let level = global
        .log_level
        .clone()
        .or_else(|| cfg.log_level.clone())
        .unwrap_or_else(|| default_log_level().to_string());
    let log_dir = log_dir
        .to_str()
        .unwrap_or_else(|| bail("Log directory must be valid UTF-8"))
        .to_string();
    init_logging(&level, &log_dir).unwrap_or_else(|e| bail(e));
}
