// Command handlers. Each builds its collaborators from the loaded config and
// hands them to a core pipeline.

use std::path::Path;

use anyhow::{Context, Result};
use tracing::info;

use draftboard_core::config::{ensure_config_files, load_config_from, Config};
use draftboard_core::db::Database;
use draftboard_core::integrity::IntegrityReport;
use draftboard_core::report::pipelines::Pipeline;
use draftboard_core::report::{ReportRunner, TsvFileEmitter};

use crate::cli::{Command, OffsetsCommand, RosterCommand};

pub fn load_config(base_dir: &Path) -> Result<Config> {
    let copied = ensure_config_files(base_dir).context("failed to prepare config files")?;
    for path in &copied {
        info!("copied default config to {}", path.display());
    }
    let config = load_config_from(base_dir).context("failed to load configuration")?;
    info!("config loaded: season {}, reports in {}", config.season.year, config.reports_dir().display());
    Ok(config)
}

pub fn run(command: &Command, config: &Config) -> Result<()> {
    let db = Database::open_path(&config.database_path())?;
    let runner = ReportRunner::new(&db)?;
    let pipeline = Pipeline::new(config, &runner, &db);
    let mut emitter = TsvFileEmitter::new(config.reports_dir());

    match command {
        Command::Rankings => {
            let result = pipeline.rankings(&mut emitter)?;
            println!(
                "Ranked {} players ({} unresolved)",
                result.output.len(),
                result.resolution.unresolved.len()
            );
        }
        Command::Zscores => {
            let run = pipeline.zscores(&mut emitter)?;
            println!(
                "Scored {} batters and {} pitchers; combined board has {} rows ({} coverage gaps)",
                run.batters.output.len(),
                run.pitchers.output.len(),
                run.combined.rows.len(),
                run.combined.gaps.len()
            );
        }
        Command::Board { sections } => {
            let board = pipeline.board(sections, &mut emitter)?;
            println!("Board written with {} rows", board.rows.len());
        }
        Command::Movement => {
            let result = pipeline.movement(&mut emitter)?;
            let report = &result.output;
            if report.universe_mismatch {
                println!("Warning: player universe mismatch detected.");
            }
            println!("Movement Report (Non-Zero Only)");
            println!("--------------------------------");
            for record in report.by_magnitude() {
                println!("{} {:+}", record.name, record.movement);
            }
        }
        Command::Delta => {
            let result = pipeline.delta(&mut emitter)?;
            println!("{} ranking changes", result.output.len());
        }
        Command::Offsets { action } => match action {
            OffsetsCommand::Init => {
                let seeded = pipeline.seed_offsets()?;
                println!("Baseline offsets inserted: {seeded}");
            }
            OffsetsCommand::Adjust { batch } => {
                let written = pipeline.adjust_offsets(batch)?;
                println!("Offsets updated: {written}");
            }
        },
        Command::Roster { action } => match action {
            RosterCommand::Import { path } => {
                let imported = db.import_roster_csv(path)?;
                println!("Imported {imported} roster players ({} total)", db.player_count()?);
            }
            RosterCommand::AddMissing { rows } => {
                let outcome = pipeline.add_missing_players(&db, *rows)?;
                for (id, name) in &outcome.inserted {
                    println!("{id:>6} | {name}");
                }
                println!(
                    "Added {} players; {} still unresolved",
                    outcome.inserted.len(),
                    outcome.resolution.unresolved.len()
                );
            }
            RosterCommand::Check { fix } => {
                let report = pipeline.check_roster(&db, *fix)?;
                print_integrity(&report, *fix);
            }
        },
    }

    for path in emitter.written() {
        println!("{}", path.display());
    }
    Ok(())
}

fn print_integrity(report: &IntegrityReport, fixed: bool) {
    println!("Accented names without a plain alias{}", if fixed { " (alias added)" } else { "" });
    for m in &report.missing_plain_aliases {
        println!("{:>8} | {} | {}", m.id, m.primary_name, m.plain_name);
    }

    println!();
    println!("Names shared by several players");
    for c in &report.collisions {
        let ids: Vec<String> = c.ids.iter().map(|id| id.to_string()).collect();
        println!("{} | {}", c.name, ids.join(", "));
    }

    println!();
    println!("Redundant aliases");
    for r in &report.redundant_aliases {
        println!("{} | {} | {}", r.id, r.primary_name, r.aliases.join(" | "));
    }

    println!();
    println!("Suspected duplicate players");
    for d in &report.suspected_duplicates {
        println!("{:>8} | {} | {:>8} | {}", d.first_id, d.first_name, d.second_id, d.second_name);
    }

    println!();
    println!("{} issues found", report.issue_count());
}
