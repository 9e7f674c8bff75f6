// Command-line argument definitions.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use draftboard_core::report::pipelines::BoardSection;

#[derive(Parser)]
#[command(
    name = "draftboard",
    version,
    about = "Fantasy baseball draft board: adjusted rankings, z-scores and rank movement"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Directory holding defaults/ and config/ (default: current directory).
    #[arg(long = "base-dir", value_name = "DIR", global = true)]
    pub base_dir: Option<PathBuf>,

    /// Log to stderr instead of logs/draftboard.log.
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Command {
    /// Consensus ranking with manual offsets applied.
    Rankings,

    /// Batter, pitcher and combined z-scores over the ranked population.
    Zscores,

    /// Several reports side by side in one file.
    Board {
        /// Sections in display order: rankings, batters, pitchers, combined,
        /// movement, delta.
        #[arg(value_name = "SECTION", required = true)]
        sections: Vec<BoardSection>,
    },

    /// Positions each player moves from the starting list to the current
    /// adjusted ranking.
    Movement,

    /// Largest adjusted-rank changes since the previous snapshot.
    Delta,

    /// Manage manual rank offsets.
    Offsets {
        #[command(subcommand)]
        action: OffsetsCommand,
    },

    /// Manage the player roster.
    Roster {
        #[command(subcommand)]
        action: RosterCommand,
    },
}

#[derive(Subcommand)]
pub enum OffsetsCommand {
    /// Clear all offsets and seed catcher and closer baselines.
    Init,

    /// Upsert offsets from a batch such as "123,10|456,-5".
    Adjust {
        #[arg(value_name = "BATCH")]
        batch: String,
    },
}

#[derive(Subcommand)]
pub enum RosterCommand {
    /// Import players from a CSV with columns id,name,aka1,aka2.
    Import {
        #[arg(value_name = "CSV")]
        path: PathBuf,
    },

    /// Add consensus-ranked players the roster does not know yet.
    AddMissing {
        /// Consensus rows to read (default: the configured row limit).
        #[arg(long, value_name = "N")]
        rows: Option<usize>,
    },

    /// Report shared names, redundant aliases and suspected duplicates.
    Check {
        /// Store the plain spelling of accented names as their alias.
        #[arg(long)]
        fix: bool,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn board_sections_are_parsed() {
        let cli = Cli::try_parse_from(["draftboard", "board", "rankings", "Combined"]).unwrap();
        match cli.command {
            Command::Board { sections } => {
                assert_eq!(sections, vec![BoardSection::Rankings, BoardSection::Combined]);
            }
            _ => panic!("expected board command"),
        }
    }

    #[test]
    fn unknown_board_section_is_rejected() {
        assert!(Cli::try_parse_from(["draftboard", "board", "standings"]).is_err());
    }

    #[test]
    fn offsets_adjust_takes_batch() {
        let cli = Cli::try_parse_from(["draftboard", "-v", "offsets", "adjust", "1,5|2,-3"]).unwrap();
        assert!(cli.verbose);
        match cli.command {
            Command::Offsets {
                action: OffsetsCommand::Adjust { batch },
            } => assert_eq!(batch, "1,5|2,-3"),
            _ => panic!("expected offsets adjust"),
        }
    }

    #[test]
    fn roster_subcommands_are_parsed() {
        let cli = Cli::try_parse_from(["draftboard", "roster", "add-missing", "--rows", "400"]).unwrap();
        assert!(matches!(
            cli.command,
            Command::Roster {
                action: RosterCommand::AddMissing { rows: Some(400) }
            }
        ));

        let cli = Cli::try_parse_from(["draftboard", "roster", "check", "--fix"]).unwrap();
        assert!(matches!(
            cli.command,
            Command::Roster {
                action: RosterCommand::Check { fix: true }
            }
        ));
    }
}
