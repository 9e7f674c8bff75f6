// SQLite persistence for the player roster and manual rank offsets.

use std::collections::HashMap;
use std::io::Read;
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use anyhow::{anyhow, Context, Result};
use rusqlite::{params, Connection};
use serde::Deserialize;
use tracing::{info, warn};

use crate::identity::{RosterSource, RosterStore};
use crate::player::{CanonicalPlayer, PlayerId};
use crate::ranking::offsets::OffsetStore;

/// SQLite-backed roster and offset store.
pub struct Database {
    conn: Mutex<Connection>,
}

impl Database {
    /// Open (or create) a SQLite database at `path` and ensure all tables
    /// exist. Pass `":memory:"` for an ephemeral in-memory database.
    pub fn open(path: &str) -> Result<Self> {
        let conn = Connection::open(path).with_context(|| format!("failed to open database at {path}"))?;

        conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA busy_timeout = 5000;",
        )
        .context("failed to set database pragmas")?;

        conn.execute_batch(
            "
            CREATE TABLE IF NOT EXISTS players (
                id   INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL,
                aka1 TEXT,
                aka2 TEXT
            );

            CREATE TABLE IF NOT EXISTS rank_offsets (
                player_id   INTEGER PRIMARY KEY,
                rank_offset INTEGER NOT NULL
            );
            ",
        )
        .context("failed to create database schema")?;

        Ok(Self { conn: Mutex::new(conn) })
    }

    /// Open the database at a filesystem path, creating parent directories.
    pub fn open_path(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("failed to create database directory {}", parent.display()))?;
        }
        let path_str = path
            .to_str()
            .ok_or_else(|| anyhow!("database path is not valid UTF-8: {}", path.display()))?;
        Self::open(path_str)
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn.lock().map_err(|_| anyhow!("database mutex poisoned"))
    }

    // -----------------------------------------------------------------------
    // Players
    // -----------------------------------------------------------------------

    /// Insert or replace a roster player by id. Only the first two aliases
    /// are stored.
    pub fn upsert_player(&self, player: &CanonicalPlayer) -> Result<()> {
        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO players (id, name, aka1, aka2) VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT(id) DO UPDATE SET name = excluded.name, aka1 = excluded.aka1, aka2 = excluded.aka2",
            params![
                player.id,
                player.primary_name,
                player.aliases.first(),
                player.aliases.get(1),
            ],
        )
        .with_context(|| format!("failed to upsert player {}", player.id))?;
        Ok(())
    }

    /// Insert a new player with no aliases and return its assigned id.
    pub fn insert_player(&self, name: &str) -> Result<PlayerId> {
        let conn = self.conn()?;
        conn.execute("INSERT INTO players (name) VALUES (?1)", params![name])
            .with_context(|| format!("failed to insert player '{name}'"))?;
        Ok(conn.last_insert_rowid())
    }

    pub fn player_count(&self) -> Result<usize> {
        let conn = self.conn()?;
        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM players", [], |row| row.get(0))
            .context("failed to count players")?;
        Ok(count as usize)
    }

    /// Import roster rows from CSV with columns `id,name,aka1,aka2`. Rows
    /// without an id get a new one. Returns the number of rows written.
    pub fn import_roster<R: Read>(&self, rdr: R) -> Result<usize> {
        let mut reader = csv::Reader::from_reader(rdr);
        let mut written = 0;
        for (line, result) in reader.deserialize::<RawRosterRow>().enumerate() {
            let raw = match result {
                Ok(raw) => raw,
                Err(e) => {
                    warn!("skipping malformed roster row {}: {}", line + 1, e);
                    continue;
                }
            };
            let name = raw.name.trim();
            if name.is_empty() {
                warn!("skipping roster row {} with empty name", line + 1);
                continue;
            }
            let id = match raw.id {
                Some(id) => id,
                None => self.insert_player(name)?,
            };
            let mut player = CanonicalPlayer::new(id, name);
            for alias in [raw.aka1, raw.aka2].into_iter().flatten() {
                if !alias.trim().is_empty() {
                    player = player.with_alias(alias.trim());
                }
            }
            self.upsert_player(&player)?;
            written += 1;
        }
        info!("imported {} roster players", written);
        Ok(written)
    }

    pub fn import_roster_csv(&self, path: &Path) -> Result<usize> {
        let file = std::fs::File::open(path).with_context(|| format!("failed to open roster file {}", path.display()))?;
        self.import_roster(file)
    }
}

#[derive(Debug, Deserialize)]
struct RawRosterRow {
    #[serde(default)]
    id: Option<PlayerId>,
    name: String,
    #[serde(default)]
    aka1: Option<String>,
    #[serde(default)]
    aka2: Option<String>,
}

impl RosterSource for Database {
    fn all_players(&self) -> Result<Vec<CanonicalPlayer>> {
        let conn = self.conn()?;
        let mut stmt = conn
            .prepare("SELECT id, name, aka1, aka2 FROM players ORDER BY id")
            .context("failed to prepare roster query")?;

        let players = stmt
            .query_map([], |row| {
                let mut player = CanonicalPlayer::new(row.get(0)?, row.get::<_, String>(1)?);
                for col in 2..=3 {
                    if let Some(alias) = row.get::<_, Option<String>>(col)? {
                        player = player.with_alias(alias);
                    }
                }
                Ok(player)
            })
            .context("failed to query roster")?
            .collect::<std::result::Result<Vec<_>, _>>()
            .context("failed to map roster rows")?;

        Ok(players)
    }
}

impl RosterStore for Database {
    fn insert_player(&self, name: &str) -> Result<PlayerId> {
        Database::insert_player(self, name)
    }

    fn upsert_player(&self, player: &CanonicalPlayer) -> Result<()> {
        Database::upsert_player(self, player)
    }
}

// ---------------------------------------------------------------------------
// Offsets
// ---------------------------------------------------------------------------

impl OffsetStore for Database {
    fn load_offsets(&self) -> Result<HashMap<PlayerId, i32>> {
        let conn = self.conn()?;
        let mut stmt = conn
            .prepare("SELECT player_id, rank_offset FROM rank_offsets")
            .context("failed to prepare offsets query")?;

        let offsets = stmt
            .query_map([], |row| Ok((row.get::<_, PlayerId>(0)?, row.get::<_, i32>(1)?)))
            .context("failed to query offsets")?
            .collect::<std::result::Result<HashMap<_, _>, _>>()
            .context("failed to map offset rows")?;

        Ok(offsets)
    }

    fn upsert_offset(&self, player_id: PlayerId, offset: i32) -> Result<()> {
        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO rank_offsets (player_id, rank_offset) VALUES (?1, ?2)
             ON CONFLICT(player_id) DO UPDATE SET rank_offset = excluded.rank_offset",
            params![player_id, offset],
        )
        .with_context(|| format!("failed to upsert offset for player {player_id}"))?;
        Ok(())
    }

    fn clear_offsets(&self) -> Result<()> {
        let conn = self.conn()?;
        conn.execute("DELETE FROM rank_offsets", [])
            .context("failed to clear offsets")?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
