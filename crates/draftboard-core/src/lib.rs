// Library root: re-exports all modules so the binary and integration tests can
// access the crate's public API.

pub mod config;
pub mod db;
pub mod identity;
pub mod integrity;
pub mod movement;
pub mod player;
pub mod ranking;
pub mod report;
pub mod valuation;
