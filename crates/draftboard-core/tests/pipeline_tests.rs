// End-to-end pipeline tests: fixture files on disk, roster and offsets in an
// in-memory SQLite database, reports captured in memory or written to a
// temporary reports directory.

use std::fs;
use std::path::Path;

use draftboard_core::config::{parse_config, Config};
use draftboard_core::db::Database;
use draftboard_core::player::{CanonicalPlayer, Role};
use draftboard_core::ranking::offsets::OffsetStore;
use draftboard_core::report::pipelines::{BoardSection, Pipeline};
use draftboard_core::report::{MemoryEmitter, ReportRunner, TsvFileEmitter};
use tempfile::TempDir;

// ===========================================================================
// Fixtures
// ===========================================================================

const RANKINGS: &str = "\
RK,PLAYER NAME,TEAM,POS,BEST,WORST
1,Aaron Judge,NYY,LF,1,3
2,Bobby Witt Jr.,KC,SS,1,4
3,Tarik Skubal,DET,SP1,2,6
4,Juan Soto,NYM,RF,3,9
5,Paul Skenes,PIT,SP2,3,10
6,Cal Raleigh,SEA,C1,5,20
7,Emmanuel Clase,CLE,RP1,6,40
8,Mystery Man,FA,OF,50,90
";

const PREVIOUS_RANKINGS: &str = "\
RK,PLAYER NAME,TEAM,POS
1,Bobby Witt Jr.,KC,SS
2,Aaron Judge,NYY,LF
3,Juan Soto,NYM,RF
4,Tarik Skubal,DET,SP1
5,Cal Raleigh,SEA,C1
6,Paul Skenes,PIT,SP2
7,Emmanuel Clase,CLE,RP1
";

const START_LIST: &str = "\
My Pre-Draft Rankings

1. Bobby Witt Jr.
2. Aaron Judge
3. Tarik Skubal
";

const BATTERS: &str = "\
Name,Team,PA,R,HR,RBI,SB,AVG
Aaron Judge,NYY,680,120,50,125,8,0.300
Bobby Witt,KC,690,110,30,100,35,0.295
Juan Soto,NYM,690,115,35,105,6,0.280
Cal Raleigh,SEA,600,80,40,100,4,0.230
Shohei Ohtani,LAD,680,120,45,110,25,0.285
";

const PITCHERS: &str = "\
Name,Team,IP,W,SO,SV,H,BB,ERA
Tarik Skubal,DET,200,15,240,0,160,40,2.80
Paul Skenes,PIT,190,13,220,0,150,50,2.60
";

fn roster() -> Vec<CanonicalPlayer> {
    vec![
        CanonicalPlayer::new(1, "Aaron Judge"),
        CanonicalPlayer::new(2, "Bobby Witt Jr.").with_alias("Bobby Witt"),
        CanonicalPlayer::new(3, "Tarik Skubal"),
        CanonicalPlayer::new(4, "Cal Raleigh").with_alias("Big Dumper"),
        CanonicalPlayer::new(5, "Emmanuel Clase"),
        CanonicalPlayer::new(6, "Juan Soto"),
        CanonicalPlayer::new(7, "Paul Skenes"),
    ]
}

struct Fixture {
    _dir: TempDir,
    config: Config,
    db: Database,
}

impl Fixture {
    fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let data = dir.path().join("data");
        fs::create_dir_all(&data).unwrap();
        fs::write(data.join("rankings.csv"), RANKINGS).unwrap();
        fs::write(data.join("previous.csv"), PREVIOUS_RANKINGS).unwrap();
        fs::write(data.join("start.txt"), START_LIST).unwrap();
        fs::write(data.join("batters.csv"), BATTERS).unwrap();
        fs::write(data.join("pitchers.csv"), PITCHERS).unwrap();

        let text = r#"
[season]
year = 2026

[paths]
rankings = "data/rankings.csv"
previous_rankings = "data/previous.csv"
start_ranking_list = "data/start.txt"
batter_projections = "data/batters.csv"
pitcher_projections = "data/pitchers.csv"
reports_dir = "reports"
database = "data/board.db"
"#;
        let config = parse_config(text, Path::new("draftboard.toml"), dir.path()).unwrap();

        let db = Database::open(":memory:").unwrap();
        for player in roster() {
            db.upsert_player(&player).unwrap();
        }

        Self { _dir: dir, config, db }
    }

    fn runner(&self) -> ReportRunner {
        ReportRunner::new(&self.db).unwrap()
    }
}

fn approx_eq(a: f64, b: f64, epsilon: f64) -> bool {
    (a - b).abs() < epsilon
}

// ===========================================================================
// Rankings and offsets
// ===========================================================================

#[test]
fn rankings_resolve_and_adjust_without_offsets() {
    let fx = Fixture::new();
    let runner = fx.runner();
    let pipeline = Pipeline::new(&fx.config, &runner, &fx.db);
    let mut emitter = MemoryEmitter::new();

    let result = pipeline.rankings(&mut emitter).unwrap();

    assert_eq!(result.output.len(), 8);
    assert_eq!(result.resolution.unresolved, vec!["Mystery Man".to_string()]);
    let adjusted: Vec<u32> = result.output.iter().map(|e| e.adjusted_rank).collect();
    assert_eq!(adjusted, (1..=8).collect::<Vec<u32>>());
    assert_eq!(result.output[0].name, "Aaron Judge");

    let table = emitter.get("draftboard_rankings_2026.tsv").unwrap();
    assert_eq!(table.rows[0], vec!["1", "Aaron Judge", "NYY", "LF", "1", "0", "1"]);
    assert_eq!(table.rows[7][0], "");
}

#[test]
fn baseline_offsets_promote_catchers_and_closers() {
    let fx = Fixture::new();
    let runner = fx.runner();
    let pipeline = Pipeline::new(&fx.config, &runner, &fx.db);

    let seeded = pipeline.seed_offsets().unwrap();
    assert_eq!(seeded, 2);
    let offsets = fx.db.load_offsets().unwrap();
    assert_eq!(offsets[&4], 12);
    assert_eq!(offsets[&5], 24);

    let result = pipeline.rankings(&mut MemoryEmitter::new()).unwrap();
    let order: Vec<&str> = result.output.iter().take(3).map(|e| e.name.as_str()).collect();
    // Clase: 7 - 24 = -17, Raleigh: 6 - 12 = -6, then Judge at 1
    assert_eq!(order, vec!["Emmanuel Clase", "Cal Raleigh", "Aaron Judge"]);
}

#[test]
fn manual_offset_batch_is_applied() {
    let fx = Fixture::new();
    let runner = fx.runner();
    let pipeline = Pipeline::new(&fx.config, &runner, &fx.db);

    assert_eq!(pipeline.adjust_offsets("6,4|bad|1,-2").unwrap(), 2);
    let result = pipeline.rankings(&mut MemoryEmitter::new()).unwrap();
    // Soto: 4 - 4 = 0 goes first; Judge: 1 + 2 = 3 ties Skubal and wins on rank
    let order: Vec<&str> = result.output.iter().take(4).map(|e| e.name.as_str()).collect();
    assert_eq!(order, vec!["Juan Soto", "Bobby Witt Jr.", "Aaron Judge", "Tarik Skubal"]);

    assert!(pipeline.adjust_offsets("nothing valid").is_err());
}

// ===========================================================================
// Z-scores and merge
// ===========================================================================

#[test]
fn zscores_cover_ranked_population_only() {
    let fx = Fixture::new();
    let runner = fx.runner();
    let pipeline = Pipeline::new(&fx.config, &runner, &fx.db);
    let mut emitter = MemoryEmitter::new();

    let run = pipeline.zscores(&mut emitter).unwrap();

    // Ohtani is projected but not ranked
    let batter_names: Vec<&str> = run.batters.output.iter().map(|b| b.projection.name.as_str()).collect();
    assert_eq!(batter_names.len(), 4);
    assert!(!batter_names.contains(&"Shohei Ohtani"));
    assert_eq!(run.batters.resolution.unresolved, vec!["Shohei Ohtani".to_string()]);

    let mean_r: f64 = run.batters.output.iter().map(|b| b.zscores.r).sum::<f64>() / 4.0;
    assert!(approx_eq(mean_r, 0.0, 1e-9));
    assert!(run
        .batters
        .output
        .windows(2)
        .all(|w| w[0].zscores.total >= w[1].zscores.total));

    assert_eq!(run.pitchers.output.len(), 2);
    // Equal saves across the pool: no spread, no score
    assert!(run.pitchers.output.iter().all(|p| p.zscores.sv == 0.0));

    // Clase is ranked as a closer but has no pitcher projection
    assert_eq!(run.combined.rows.len(), 6);
    assert_eq!(run.combined.gaps.len(), 1);
    assert_eq!(run.combined.gaps[0].identity, 5);
    assert_eq!(run.combined.gaps[0].role, Role::Pitcher);
    assert_eq!(run.combined.unresolved, vec!["Mystery Man".to_string()]);
    assert!(run
        .combined
        .rows
        .windows(2)
        .all(|w| w[0].total_z >= w[1].total_z));

    assert!(emitter.get("draftboard_batters_zscores_2026.tsv").is_some());
    assert!(emitter.get("draftboard_pitchers_zscores_2026.tsv").is_some());
    let combined = emitter.get("draftboard_combined_zscores_2026.tsv").unwrap();
    assert_eq!(combined.rows.len(), 6);
    let tags: Vec<&str> = combined.rows.iter().map(|r| r[2].as_str()).collect();
    assert_eq!(tags.iter().filter(|t| **t == "P").count(), 2);
}

// ===========================================================================
// Movement and delta
// ===========================================================================

#[test]
fn movement_from_starting_list() {
    let fx = Fixture::new();
    let runner = fx.runner();
    let pipeline = Pipeline::new(&fx.config, &runner, &fx.db);
    let mut emitter = MemoryEmitter::new();

    let result = pipeline.movement(&mut emitter).unwrap();
    let report = &result.output;

    assert!(report.universe_mismatch);
    let moves: Vec<(&str, i64)> = report.records.iter().map(|r| (r.name.as_str(), r.movement)).collect();
    assert_eq!(moves, vec![("Bobby Witt Jr.", 0), ("Aaron Judge", 1), ("Tarik Skubal", 0)]);

    let table = emitter.get("draftboard_movement_2026.tsv").unwrap();
    assert_eq!(table.headers, vec!["PlayerName", "Movement"]);
    assert_eq!(table.rows, vec![vec!["Aaron Judge", "1"]]);
}

#[test]
fn delta_against_previous_snapshot() {
    let fx = Fixture::new();
    let runner = fx.runner();
    let pipeline = Pipeline::new(&fx.config, &runner, &fx.db);

    let result = pipeline.delta(&mut MemoryEmitter::new()).unwrap();
    let rows = &result.output;

    // Mystery Man has no identity and so no previous rank
    assert_eq!(rows.len(), 7);
    assert_eq!(rows[0].name, "Aaron Judge");
    assert_eq!(rows[0].movement(), 1);
    assert_eq!(rows[1].name, "Bobby Witt Jr.");
    assert_eq!(rows[1].movement(), -1);
    assert_eq!(rows[6].name, "Emmanuel Clase");
    assert_eq!(rows[6].movement(), 0);
}

// ===========================================================================
// Board and file output
// ===========================================================================

#[test]
fn board_writes_sections_side_by_side() {
    let fx = Fixture::new();
    let runner = fx.runner();
    let pipeline = Pipeline::new(&fx.config, &runner, &fx.db);
    let mut emitter = TsvFileEmitter::new(fx.config.reports_dir());

    let board = pipeline
        .board(&[BoardSection::Movement, BoardSection::Combined], &mut emitter)
        .unwrap();

    // Movement (2 columns) + spacer + combined (9 columns)
    assert_eq!(board.headers.len(), 12);
    assert_eq!(board.headers[0], "PlayerName");
    assert_eq!(board.headers[3], "PlayerID");
    assert_eq!(board.rows.len(), 6);
    assert_eq!(board.rows[1][0], "");

    let written = emitter.written();
    assert_eq!(written.len(), 1);
    assert!(written[0].ends_with("draftboard_board_2026.tsv"));
    let content = fs::read_to_string(&written[0]).unwrap();
    assert!(content.starts_with("PlayerName\tMovement\t\tPlayerID\tName\tPos\t"));
    assert_eq!(content.lines().count(), 7);
}

// ===========================================================================
// Roster maintenance
// ===========================================================================

#[test]
fn add_missing_inserts_unresolved_ranked_players_once() {
    let fx = Fixture::new();
    let runner = fx.runner();
    let pipeline = Pipeline::new(&fx.config, &runner, &fx.db);

    let outcome = pipeline.add_missing_players(&fx.db, None).unwrap();
    assert_eq!(outcome.inserted, vec![(8, "Mystery Man".to_string())]);
    assert!(outcome.resolution.unresolved.is_empty());
    assert_eq!(fx.db.player_count().unwrap(), 8);

    // A runner built from the refreshed roster finds nothing left to add.
    let runner = fx.runner();
    let pipeline = Pipeline::new(&fx.config, &runner, &fx.db);
    let again = pipeline.add_missing_players(&fx.db, None).unwrap();
    assert!(again.inserted.is_empty());

    let result = pipeline.rankings(&mut MemoryEmitter::new()).unwrap();
    assert!(result.resolution.unresolved.is_empty());
    assert_eq!(result.output[7].identity, Some(8));
}

#[test]
fn add_missing_honors_the_row_limit() {
    let fx = Fixture::new();
    let runner = fx.runner();
    let pipeline = Pipeline::new(&fx.config, &runner, &fx.db);

    let outcome = pipeline.add_missing_players(&fx.db, Some(3)).unwrap();
    assert!(outcome.inserted.is_empty());
    assert_eq!(fx.db.player_count().unwrap(), 7);
}

#[test]
fn roster_check_reports_and_fixes_accented_names() {
    let fx = Fixture::new();
    fx.db.upsert_player(&CanonicalPlayer::new(20, "José Ramírez")).unwrap();
    fx.db.upsert_player(&CanonicalPlayer::new(21, "Jose Ramirez")).unwrap();
    fx.db.upsert_player(&CanonicalPlayer::new(22, "Juan Soto")).unwrap();
    let runner = fx.runner();
    let pipeline = Pipeline::new(&fx.config, &runner, &fx.db);

    let report = pipeline.check_roster(&fx.db, true).unwrap();
    assert_eq!(report.missing_plain_aliases.len(), 1);
    assert_eq!(report.missing_plain_aliases[0].id, 20);
    assert_eq!(report.collisions.len(), 1);
    assert_eq!(report.collisions[0].ids, vec![6, 22]);
    assert_eq!(report.suspected_duplicates.len(), 2);

    // The stored alias now collides with player 21, and is no longer missing.
    let after = pipeline.check_roster(&fx.db, false).unwrap();
    assert!(after.missing_plain_aliases.is_empty());
    assert_eq!(after.collisions.len(), 2);
}
