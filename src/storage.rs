//! JSON persistence for the EV table.
//!
//! Format: a JSON array with one entry per nonempty category subset (511 entries):
//!
//! ```json
//! [{ "category_set": 3, "categories": ["Jumbleberry", "Sugarberry"], "ev": 9.87 }, ...]
//! ```
//!
//! Entries are written in ascending `category_set` order. Loading accepts any order
//! but requires every nonempty subset exactly once with matching names.

use std::fs;
use std::path::Path;
use std::time::Instant;

use log::{info, warn};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::constants::*;
use crate::state_computation::compute_all_state_values;
use crate::types::{CategorySet, EvTable, SolverContext};

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("unknown category set {0}")]
    UnknownCategorySet(u32),
    #[error("malformed EV table: {0}")]
    Malformed(String),
}

/// One persisted row.
#[derive(Debug, Serialize, Deserialize)]
pub struct EvEntry {
    pub category_set: u32,
    pub categories: Vec<String>,
    pub ev: f64,
}

/// Where the table handed out by [`load_or_compute_ev_table`] came from.
#[derive(Debug)]
pub enum TableSource {
    Loaded,
    Computed,
    /// Computed, but writing it back failed. The table is still valid.
    ComputedUnsaved(StorageError),
}

fn category_names(cs: CategorySet) -> Vec<String> {
    cs.iter().map(|c| c.name().to_string()).collect()
}

/// Table rows for every nonempty subset, ascending by bitmask.
pub fn ev_entries(table: &EvTable) -> Vec<EvEntry> {
    (1..NUM_CATEGORY_SETS as u16)
        .filter_map(CategorySet::from_bits)
        .map(|cs| EvEntry {
            category_set: cs.bits() as u32,
            categories: category_names(cs),
            ev: table.ev(cs),
        })
        .collect()
}

pub fn serialize_ev_table(table: &EvTable) -> Result<Vec<u8>, StorageError> {
    Ok(serde_json::to_vec_pretty(&ev_entries(table))?)
}

pub fn deserialize_ev_table(bytes: &[u8]) -> Result<EvTable, StorageError> {
    let entries: Vec<EvEntry> = serde_json::from_slice(bytes)?;

    let mut values = [0.0f64; NUM_CATEGORY_SETS];
    let mut seen = [false; NUM_CATEGORY_SETS];
    for entry in &entries {
        let cs = u16::try_from(entry.category_set)
            .ok()
            .and_then(CategorySet::from_bits)
            .filter(|cs| !cs.is_empty())
            .ok_or(StorageError::UnknownCategorySet(entry.category_set))?;
        if seen[cs.index()] {
            return Err(StorageError::Malformed(format!(
                "duplicate entry for category set {}",
                cs.bits()
            )));
        }
        if entry.categories != category_names(cs) {
            return Err(StorageError::Malformed(format!(
                "category names {:?} do not match set {}",
                entry.categories,
                cs.bits()
            )));
        }
        if !entry.ev.is_finite() || entry.ev < 0.0 {
            return Err(StorageError::Malformed(format!(
                "invalid EV {} for category set {}",
                entry.ev,
                cs.bits()
            )));
        }
        seen[cs.index()] = true;
        values[cs.index()] = entry.ev;
    }

    let missing = seen.iter().skip(1).filter(|&&s| !s).count();
    if missing > 0 {
        return Err(StorageError::Malformed(format!(
            "{} category sets missing",
            missing
        )));
    }

    Ok(EvTable::from_values(values))
}

/// Write the table as JSON, creating parent directories as needed.
pub fn save_ev_table<P: AsRef<Path>>(table: &EvTable, path: P) -> Result<(), StorageError> {
    let path = path.as_ref();
    let start_time = Instant::now();

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    fs::write(path, serialize_ev_table(table)?)?;

    info!(
        "Saved EV table to {} in {:.2} ms",
        path.display(),
        start_time.elapsed().as_secs_f64() * 1000.0
    );
    Ok(())
}

pub fn load_ev_table<P: AsRef<Path>>(path: P) -> Result<EvTable, StorageError> {
    let path = path.as_ref();
    let start_time = Instant::now();
    let bytes = fs::read(path)?;
    let table = deserialize_ev_table(&bytes)?;
    info!(
        "Loaded EV table from {} in {:.2} ms",
        path.display(),
        start_time.elapsed().as_secs_f64() * 1000.0
    );
    Ok(table)
}

/// Load the table from `path`; on any failure compute it and try to save it back.
pub fn load_or_compute_ev_table<P: AsRef<Path>>(
    ctx: &SolverContext,
    path: P,
) -> (EvTable, TableSource) {
    let path = path.as_ref();
    match load_ev_table(path) {
        Ok(table) => return (table, TableSource::Loaded),
        Err(e) => warn!("Could not load {}: {}; recomputing", path.display(), e),
    }

    let table = compute_all_state_values(ctx);
    match save_ev_table(&table, path) {
        Ok(()) => (table, TableSource::Computed),
        Err(e) => {
            warn!("Could not save {}: {}", path.display(), e);
            (table, TableSource::ComputedUnsaved(e))
        }
    }
}
