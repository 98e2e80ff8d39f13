//! ETL for the EU Clinical Trials Information System (CTIS) portal.
//!
//! `scrape` walks the portal's paged search, reconciles every trial
//! into SQLite with upsert semantics, and records the run outcome;
//! `update-coordinates` enriches stored locations with coordinates
//! from Nominatim.

pub mod api;
pub mod config;
pub mod countries;
pub mod dates;
pub mod db;
pub mod decodings;
pub mod error;
pub mod geocode;
pub mod ingest;
pub mod scrape;
