//! SQLite storage for search history, search results, and the peaks selected in the current session

// Standard Library Imports
use std::{collections::BTreeMap, path::Path};

// External Crate Imports
use chrono::{DateTime, Local};
use glycomod::{PersistRow, RunStore, SearchRun};
use miette::Diagnostic;
use peaks::{ChargeState, PeakNumber, PeakSelection};
use rusqlite::{Connection, TransactionBehavior, params};
use thiserror::Error;
use tracing::debug;

// Constants ===========================================================================================================

const SCHEMA: &str = "
    PRAGMA foreign_keys = ON;
    CREATE TABLE IF NOT EXISTS history (
        id INTEGER PRIMARY KEY,
        date TEXT,
        data TEXT,
        params TEXT,
        finished INTEGER
    );
    CREATE TABLE IF NOT EXISTS results (
        date TEXT,
        run_id INTEGER,
        peak INTEGER,
        measured REAL,
        theorMH REAL,
        theorMHTag REAL,
        comp_l TEXT,
        comp_s TEXT,
        tag TEXT,
        tag_mass REAL,
        FOREIGN KEY(run_id) REFERENCES history(id)
    );
    CREATE TABLE IF NOT EXISTS curr_ephem (
        peak INTEGER,
        mass FLOAT,
        charge INTEGER
    );
";

const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.6f";

// Public API ==========================================================================================================

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, Diagnostic, Error)]
pub enum Error {
    #[diagnostic(help("check that the database file is writable and isn't open in another program"))]
    #[error(transparent)]
    Sqlite(#[from] rusqlite::Error),

    #[error("failed to (de)serialize a history entry")]
    Json(#[from] serde_json::Error),

    #[error("a stored selection for peak {peak} has an impossible charge of {charge}")]
    InvalidCharge { peak: u32, charge: i64 },
}

/// A search as recorded in the history table
#[derive(Clone, PartialEq, Debug)]
pub struct HistoryEntry {
    pub id: i64,
    pub date: String,
    pub data: BTreeMap<u32, Vec<f64>>,
    pub params: serde_json::Value,
    pub finished: bool,
}

/// One row of the results table
#[derive(Clone, PartialEq, Debug)]
pub struct StoredResult {
    pub date: String,
    pub run_id: i64,
    pub peak: u32,
    pub measured: f64,
    pub theoretical_mh: f64,
    pub theoretical_mh_tag: f64,
    pub long_notation: String,
    pub short_notation: String,
    pub tag: String,
    pub tag_mass: f64,
}

pub struct Store {
    connection: Connection,
}

impl Store {
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        debug!("opening the store at {}", path.display());
        Self::with_connection(Connection::open(path)?)
    }

    pub fn open_in_memory() -> Result<Self> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    /// Creates any missing tables; existing tables and their rows are left alone
    pub fn setup_tables(&self) -> Result<()> {
        self.connection.execute_batch(SCHEMA)?;
        Ok(())
    }

    pub fn history(&self) -> Result<Vec<HistoryEntry>> {
        let mut statement = self
            .connection
            .prepare("SELECT id, date, data, params, finished FROM history ORDER BY id")?;
        let rows = statement
            .query_map([], |row| {
                Ok((
                    row.get::<_, i64>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, String>(3)?,
                    row.get::<_, bool>(4)?,
                ))
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        rows.into_iter()
            .map(|(id, date, data, params, finished)| -> Result<_> {
                Ok(HistoryEntry {
                    id,
                    date,
                    data: serde_json::from_str(&data)?,
                    params: serde_json::from_str(&params)?,
                    finished,
                })
            })
            .collect()
    }

    pub fn results(&self, run_id: i64) -> Result<Vec<StoredResult>> {
        let mut statement = self.connection.prepare(
            "SELECT date, run_id, peak, measured, theorMH, theorMHTag, comp_l, comp_s, tag, tag_mass
             FROM results WHERE run_id = ?1 ORDER BY rowid",
        )?;
        let results = statement
            .query_map([run_id], |row| {
                Ok(StoredResult {
                    date: row.get(0)?,
                    run_id: row.get(1)?,
                    peak: row.get(2)?,
                    measured: row.get(3)?,
                    theoretical_mh: row.get(4)?,
                    theoretical_mh_tag: row.get(5)?,
                    long_notation: row.get(6)?,
                    short_notation: row.get(7)?,
                    tag: row.get(8)?,
                    tag_mass: row.get(9)?,
                })
            })?
            .collect::<rusqlite::Result<_>>()?;
        Ok(results)
    }

    /// Adds to the current session's selections, keeping whatever was selected before
    pub fn append_selections(&mut self, selections: &[PeakSelection]) -> Result<()> {
        let transaction = self.connection.transaction()?;
        {
            let mut insert = transaction.prepare("INSERT INTO curr_ephem VALUES (?1, ?2, ?3)")?;
            for selection in selections {
                insert.execute(params![
                    selection.peak_number.get(),
                    selection.mass,
                    selection.charge.get()
                ])?;
            }
        }
        transaction.commit()?;
        debug!("stored {} selection(s)", selections.len());
        Ok(())
    }

    /// The current session's selections, in the order they were made
    pub fn selections(&self) -> Result<Vec<PeakSelection>> {
        let mut statement = self
            .connection
            .prepare("SELECT peak, mass, charge FROM curr_ephem ORDER BY rowid")?;
        let rows = statement
            .query_map([], |row| {
                Ok((row.get::<_, u32>(0)?, row.get::<_, f64>(1)?, row.get::<_, i64>(2)?))
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        rows.into_iter()
            .map(|(peak, mass, charge)| -> Result<_> {
                let charge = u8::try_from(charge)
                    .ok()
                    .and_then(ChargeState::new)
                    .ok_or(Error::InvalidCharge { peak, charge })?;
                Ok(PeakSelection {
                    peak_number: PeakNumber::from(peak),
                    mass,
                    charge,
                })
            })
            .collect()
    }

    pub fn clear_selections(&self) -> Result<()> {
        let cleared = self.connection.execute("DELETE FROM curr_ephem", [])?;
        debug!("cleared {cleared} selection(s)");
        Ok(())
    }

    fn with_connection(connection: Connection) -> Result<Self> {
        let store = Self { connection };
        store.setup_tables()?;
        Ok(store)
    }
}

impl RunStore for Store {
    type Error = Error;

    // NOTE: An immediate transaction takes the write lock up front, so concurrent runs can't interleave their rows
    fn record_run(&mut self, run: &SearchRun, results: &[PersistRow]) -> Result<i64> {
        let date = timestamp(&run.date);
        let data = serde_json::to_string(&run.data)?;
        let parameters = serde_json::to_string(&run.params)?;

        let transaction = self
            .connection
            .transaction_with_behavior(TransactionBehavior::Immediate)?;
        transaction.execute(
            "INSERT INTO history (date, data, params, finished) VALUES (?1, ?2, ?3, ?4)",
            params![date, data, parameters, run.finished],
        )?;
        let run_id = transaction.last_insert_rowid();
        {
            let mut insert =
                transaction.prepare("INSERT INTO results VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)")?;
            for row in results {
                insert.execute(params![
                    date,
                    run_id,
                    row.peak,
                    row.measured,
                    row.theoretical_mh,
                    row.theoretical_mh_tag,
                    row.long_notation,
                    row.short_notation,
                    row.tag,
                    row.tag_mass,
                ])?;
            }
        }
        transaction.commit()?;

        debug!("recorded run {run_id} with {} result(s)", results.len());
        Ok(run_id)
    }
}

// Private Functions ===================================================================================================

fn timestamp(date: &DateTime<Local>) -> String {
    date.naive_local().format(TIMESTAMP_FORMAT).to_string()
}

// Unit Tests ==========================================================================================================

#[cfg(test)]
mod tests {
    use glycomod::QueryForm;
    use insta::assert_debug_snapshot;

    use super::*;

    fn selection(peak: u32, mass: f64, charge: u8) -> PeakSelection {
        PeakSelection {
            peak_number: PeakNumber::from(peak),
            mass,
            charge: ChargeState::new(charge).unwrap(),
        }
    }

    fn result(peak: u32, measured: f64, mh: f64, notation: &str) -> PersistRow {
        PersistRow {
            peak,
            measured,
            theoretical_mh: mh,
            theoretical_mh_tag: mh + 19.0,
            long_notation: notation.to_owned(),
            short_notation: String::new(),
            tag: String::new(),
            tag_mass: 0.0,
        }
    }

    #[test]
    fn tables_are_created_once() {
        let store = Store::open_in_memory().unwrap();
        store.setup_tables().unwrap();
        let mut statement = store
            .connection
            .prepare("SELECT name FROM sqlite_master WHERE type = 'table' ORDER BY name")
            .unwrap();
        let tables: Vec<String> = statement
            .query_map([], |row| row.get(0))
            .unwrap()
            .collect::<rusqlite::Result<_>>()
            .unwrap();
        assert_eq!(tables, ["curr_ephem", "history", "results"]);
    }

    #[test]
    fn selections_keep_their_order() {
        let mut store = Store::open_in_memory().unwrap();
        let first = [selection(1, 911.3, 1), selection(1, 456.1712, 2)];
        let second = [selection(2, 1057.33, 1)];
        store.append_selections(&first).unwrap();
        store.append_selections(&second).unwrap();

        let selections = store.selections().unwrap();
        assert_eq!(selections, [first[0], first[1], second[0]]);

        store.clear_selections().unwrap();
        assert!(store.selections().unwrap().is_empty());
    }

    #[test]
    fn impossible_charges() {
        let store = Store::open_in_memory().unwrap();
        store
            .connection
            .execute("INSERT INTO curr_ephem VALUES (3, 1200.5, 9)", [])
            .unwrap();
        assert!(matches!(
            store.selections(),
            Err(Error::InvalidCharge { peak: 3, charge: 9 })
        ));
    }

    #[test]
    fn runs_and_their_results() {
        let mut store = Store::open_in_memory().unwrap();
        let selections = [selection(1, 911.3, 1), selection(1, 456.1712, 2), selection(2, 1057.33, 1)];

        let unfinished = SearchRun::new(&selections, QueryForm::default(), false);
        assert_eq!(store.record_run(&unfinished, &[]).unwrap(), 1);

        let finished = SearchRun::new(&selections, QueryForm::default(), true);
        let results = [
            result(1, 911.3, 892.317, "(Hex)3 (HexNAc)2"),
            result(2, 1057.33, 1038.375, "(Hex)3 (HexNAc)2 (Deoxyhexose)1"),
        ];
        let run_id = store.record_run(&finished, &results).unwrap();
        assert_eq!(run_id, 2);

        let history = store.history().unwrap();
        assert_eq!(history.len(), 2);
        assert!(!history[0].finished);
        assert!(history[1].finished);
        assert_eq!(history[1].data[&1], [911.3, 456.1712]);
        assert_eq!(history[1].data[&2], [1057.33]);
        assert_eq!(history[1].params, serde_json::json!({}));
        assert_eq!(history[1].date, timestamp(&finished.date));

        assert!(store.results(1).unwrap().is_empty());
        let stored = store.results(run_id).unwrap();
        assert_eq!(stored.len(), 2);
        assert!(stored.iter().all(|r| r.run_id == 2 && r.date == history[1].date));
        let rows: Vec<_> = stored
            .iter()
            .map(|r| (r.peak, r.measured, r.theoretical_mh, r.long_notation.as_str()))
            .collect();
        assert_debug_snapshot!(rows, @r#"
        [
            (
                1,
                911.3,
                892.317,
                "(Hex)3 (HexNAc)2",
            ),
            (
                2,
                1057.33,
                1038.375,
                "(Hex)3 (HexNAc)2 (Deoxyhexose)1",
            ),
        ]
        "#);
    }

    #[test]
    fn reopening_keeps_history() {
        let dir = std::env::temp_dir().join(format!("glycofinder-store-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("store.db");
        let _ = std::fs::remove_file(&path);

        let mut store = Store::open(&path).unwrap();
        let run = SearchRun::new(&[selection(1, 911.3, 1)], QueryForm::default(), true);
        store.record_run(&run, &[result(1, 911.3, 892.317, "(Hex)3 (HexNAc)2")]).unwrap();
        drop(store);

        let store = Store::open(&path).unwrap();
        assert_eq!(store.history().unwrap().len(), 1);
        assert_eq!(store.results(1).unwrap().len(), 1);
        drop(store);
        let _ = std::fs::remove_dir_all(&dir);
    }
}
