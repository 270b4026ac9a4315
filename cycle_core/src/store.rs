//! File-backed storage for cycle events and daily logs.
//!
//! Cycle events are appended to a JSONL (JSON Lines) file. Daily logs live in
//! a single JSON file that is replaced atomically on every upsert.
//!
//! Each data file has a sidecar `.lock` file. Writers hold an exclusive lock
//! on it for the whole read-modify-write, readers a shared one. The data
//! files themselves cannot carry the lock because a rewrite renames a new
//! file over the old path.

use crate::{CycleEvent, DailyLog, Error, Result};
use fs2::FileExt;
use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, Read, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use uuid::Uuid;

/// File name of the cycle event log inside the data directory
pub const EVENTS_FILE: &str = "cycle_events.jsonl";

/// File name of the daily log file inside the data directory
pub const DAILY_LOGS_FILE: &str = "daily_logs.json";

/// Lock guarding [`EVENTS_FILE`]
pub const EVENTS_LOCK_FILE: &str = "cycle_events.lock";

/// Lock guarding [`DAILY_LOGS_FILE`]
pub const DAILY_LOGS_LOCK_FILE: &str = "daily_logs.lock";

/// Source of period boundary events and daily logs
///
/// The inference engine only ever sees the loaded collections; writes go
/// through the store and callers recompute afterwards.
pub trait EventStore {
    /// All cycle events, in date order
    fn load_events(&self) -> Result<Vec<CycleEvent>>;

    /// All daily logs, in date order
    fn load_daily_logs(&self) -> Result<Vec<DailyLog>>;

    fn insert_event(&mut self, event: &CycleEvent) -> Result<()>;

    /// Remove the event with `id`, returning whether it existed
    fn delete_event(&mut self, id: Uuid) -> Result<bool>;

    /// Insert or replace the log for `log.date`
    fn upsert_daily_log(&mut self, log: &DailyLog) -> Result<()>;
}

/// Event store backed by files in a data directory
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    /// Create a store rooted at the given data directory
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn events_path(&self) -> PathBuf {
        self.dir.join(EVENTS_FILE)
    }

    pub fn daily_logs_path(&self) -> PathBuf {
        self.dir.join(DAILY_LOGS_FILE)
    }

    /// Ensure the data directory exists
    fn ensure_dir(&self) -> Result<()> {
        std::fs::create_dir_all(&self.dir)?;
        Ok(())
    }

    /// Open (creating if needed) a sidecar lock file
    ///
    /// The lock is released when the returned file is dropped, including on
    /// early error returns.
    fn open_lock(&self, name: &str) -> Result<File> {
        self.ensure_dir()?;
        let file = OpenOptions::new()
            .create(true)
            .read(true)
            .write(true)
            .open(self.dir.join(name))?;
        Ok(file)
    }

    fn acquire_exclusive(&self, name: &str) -> Result<File> {
        let lock = self.open_lock(name)?;
        lock.lock_exclusive()?;
        Ok(lock)
    }

    fn acquire_shared(&self, name: &str) -> Result<File> {
        let lock = self.open_lock(name)?;
        lock.lock_shared()?;
        Ok(lock)
    }

    /// Write `contents` to `path` via a temp file in the same directory
    ///
    /// Callers must hold the exclusive lock for `path`.
    fn replace_atomically(&self, path: &Path, contents: &[u8]) -> Result<()> {
        let parent = path
            .parent()
            .ok_or_else(|| Error::Store(format!("{:?} has no parent directory", path)))?;
        let temp = NamedTempFile::new_in(parent)?;

        {
            let mut writer = std::io::BufWriter::new(temp.as_file());
            writer.write_all(contents)?;
            writer.flush()?;
        }
        temp.as_file().sync_all()?;

        temp.persist(path).map_err(|e| Error::Io(e.error))?;
        Ok(())
    }
}

impl EventStore for FileStore {
    fn load_events(&self) -> Result<Vec<CycleEvent>> {
        let path = self.events_path();
        if !path.exists() {
            return Ok(Vec::new());
        }

        let lock = self.acquire_shared(EVENTS_LOCK_FILE)?;
        let mut events = read_events(&path)?;
        lock.unlock()?;

        events.sort_by_key(|e| e.date);
        Ok(events)
    }

    fn load_daily_logs(&self) -> Result<Vec<DailyLog>> {
        let path = self.daily_logs_path();
        if !path.exists() {
            return Ok(Vec::new());
        }

        let lock = self.acquire_shared(DAILY_LOGS_LOCK_FILE)?;
        let mut logs = read_daily_logs(&path);
        lock.unlock()?;

        logs.sort_by_key(|l| l.date);
        Ok(logs)
    }

    fn insert_event(&mut self, event: &CycleEvent) -> Result<()> {
        let lock = self.acquire_exclusive(EVENTS_LOCK_FILE)?;

        // Open only after locking; a delete may have renamed a new file in
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(self.events_path())?;

        let mut writer = std::io::BufWriter::new(&file);
        let line = serde_json::to_string(event)?;
        writer.write_all(line.as_bytes())?;
        writer.write_all(b"\n")?;
        writer.flush()?;
        drop(writer);

        lock.unlock()?;

        tracing::info!(
            "Logged {} on {} ({})",
            event.kind.as_str(),
            event.date,
            event.id
        );
        Ok(())
    }

    fn delete_event(&mut self, id: Uuid) -> Result<bool> {
        let path = self.events_path();
        if !path.exists() {
            return Ok(false);
        }

        let lock = self.acquire_exclusive(EVENTS_LOCK_FILE)?;
        let file = File::open(&path)?;

        // Unparseable lines are carried over untouched
        let mut kept = String::new();
        let mut removed = false;
        for line in BufReader::new(&file).lines() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            match serde_json::from_str::<CycleEvent>(&line) {
                Ok(event) if event.id == id => removed = true,
                _ => {
                    kept.push_str(&line);
                    kept.push('\n');
                }
            }
        }
        drop(file);

        if removed {
            self.replace_atomically(&path, kept.as_bytes())?;
            tracing::info!("Deleted event {}", id);
        } else {
            tracing::debug!("No event with id {} to delete", id);
        }

        lock.unlock()?;
        Ok(removed)
    }

    fn upsert_daily_log(&mut self, log: &DailyLog) -> Result<()> {
        let path = self.daily_logs_path();
        let lock = self.acquire_exclusive(DAILY_LOGS_LOCK_FILE)?;

        let mut logs = read_daily_logs(&path);
        match logs.iter_mut().find(|existing| existing.date == log.date) {
            Some(existing) => *existing = log.clone(),
            None => logs.push(log.clone()),
        }
        logs.sort_by_key(|l| l.date);

        let contents = serde_json::to_string(&logs)?;
        self.replace_atomically(&path, contents.as_bytes())?;

        lock.unlock()?;

        tracing::info!("Saved daily log for {}", log.date);
        Ok(())
    }
}

/// Read all events from a JSONL file, skipping lines that fail to parse
fn read_events(path: &Path) -> Result<Vec<CycleEvent>> {
    if !path.exists() {
        return Ok(Vec::new());
    }

    let file = File::open(path)?;
    let reader = BufReader::new(&file);
    let mut events = Vec::new();

    for (line_num, line_result) in reader.lines().enumerate() {
        let line = line_result?;
        if line.trim().is_empty() {
            continue;
        }

        match serde_json::from_str::<CycleEvent>(&line) {
            Ok(event) => events.push(event),
            Err(e) => {
                tracing::warn!("Failed to parse event at line {}: {}", line_num + 1, e);
            }
        }
    }

    tracing::debug!("Read {} events from {:?}", events.len(), path);
    Ok(events)
}

/// Read daily logs, treating a missing or corrupted file as empty
fn read_daily_logs(path: &Path) -> Vec<DailyLog> {
    if !path.exists() {
        return Vec::new();
    }

    let file = match File::open(path) {
        Ok(f) => f,
        Err(e) => {
            tracing::warn!("Unable to open daily logs {:?}: {}. Ignoring.", path, e);
            return Vec::new();
        }
    };

    let mut contents = String::new();
    if let Err(e) = BufReader::new(&file).read_to_string(&mut contents) {
        tracing::warn!("Failed to read daily logs {:?}: {}. Ignoring.", path, e);
        return Vec::new();
    }

    match serde_json::from_str::<Vec<DailyLog>>(&contents) {
        Ok(logs) => {
            tracing::debug!("Read {} daily logs from {:?}", logs.len(), path);
            logs
        }
        Err(e) => {
            tracing::warn!("Failed to parse daily logs {:?}: {}. Ignoring.", path, e);
            Vec::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::EventKind;
    use chrono::NaiveDate;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn test_insert_and_load_events() {
        crate::logging::init_test();
        let temp_dir = tempfile::tempdir().unwrap();
        let mut store = FileStore::new(temp_dir.path().join("data"));

        let start = CycleEvent::new(date("2024-02-01"), EventKind::PeriodStart, Some("heavy".into()));
        let end = CycleEvent::period_end(date("2024-02-05"));
        let earlier = CycleEvent::period_start(date("2024-01-04"));

        store.insert_event(&start).unwrap();
        store.insert_event(&end).unwrap();
        store.insert_event(&earlier).unwrap();

        let events = store.load_events().unwrap();
        assert_eq!(events.len(), 3);
        assert_eq!(events[0].id, earlier.id);
        assert_eq!(events[1], start);
        assert_eq!(events[2].kind, EventKind::PeriodEnd);
    }

    #[test]
    fn test_duplicate_events_are_retained() {
        let temp_dir = tempfile::tempdir().unwrap();
        let mut store = FileStore::new(temp_dir.path());

        store.insert_event(&CycleEvent::period_start(date("2024-02-01"))).unwrap();
        store.insert_event(&CycleEvent::period_start(date("2024-02-01"))).unwrap();

        assert_eq!(store.load_events().unwrap().len(), 2);
    }

    #[test]
    fn test_load_from_empty_dir() {
        let temp_dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(temp_dir.path().join("missing"));

        assert!(store.load_events().unwrap().is_empty());
        assert!(store.load_daily_logs().unwrap().is_empty());
    }

    #[test]
    fn test_corrupted_event_lines_are_skipped() {
        let temp_dir = tempfile::tempdir().unwrap();
        let mut store = FileStore::new(temp_dir.path());

        store.insert_event(&CycleEvent::period_start(date("2024-02-01"))).unwrap();
        let mut file = OpenOptions::new()
            .append(true)
            .open(store.events_path())
            .unwrap();
        writeln!(file, "{{ not json").unwrap();
        store.insert_event(&CycleEvent::period_end(date("2024-02-04"))).unwrap();

        assert_eq!(store.load_events().unwrap().len(), 2);
    }

    #[test]
    fn test_delete_event() {
        let temp_dir = tempfile::tempdir().unwrap();
        let mut store = FileStore::new(temp_dir.path());

        let keep = CycleEvent::period_start(date("2024-02-01"));
        let remove = CycleEvent::period_end(date("2024-02-05"));
        store.insert_event(&keep).unwrap();
        store.insert_event(&remove).unwrap();

        assert!(store.delete_event(remove.id).unwrap());
        assert!(!store.delete_event(remove.id).unwrap());

        let events = store.load_events().unwrap();
        assert_eq!(events, vec![keep]);
    }

    #[test]
    fn test_delete_keeps_unparseable_lines() {
        let temp_dir = tempfile::tempdir().unwrap();
        let mut store = FileStore::new(temp_dir.path());

        let remove = CycleEvent::period_start(date("2024-02-01"));
        store.insert_event(&remove).unwrap();
        let mut file = OpenOptions::new()
            .append(true)
            .open(store.events_path())
            .unwrap();
        writeln!(file, "garbage").unwrap();

        assert!(store.delete_event(remove.id).unwrap());
        let contents = std::fs::read_to_string(store.events_path()).unwrap();
        assert_eq!(contents, "garbage\n");
    }

    #[test]
    fn test_delete_without_file() {
        let temp_dir = tempfile::tempdir().unwrap();
        let mut store = FileStore::new(temp_dir.path());
        assert!(!store.delete_event(Uuid::new_v4()).unwrap());
    }

    #[test]
    fn test_upsert_daily_log_replaces_same_date() {
        let temp_dir = tempfile::tempdir().unwrap();
        let mut store = FileStore::new(temp_dir.path());

        let mut log = DailyLog::new(date("2024-02-02"));
        log.mood = Some(2);
        store.upsert_daily_log(&log).unwrap();

        let mut other = DailyLog::new(date("2024-02-01"));
        other.add_symptom("Cramps");
        store.upsert_daily_log(&other).unwrap();

        log.mood = Some(4);
        log.energy = Some(3);
        store.upsert_daily_log(&log).unwrap();

        let logs = store.load_daily_logs().unwrap();
        assert_eq!(logs.len(), 2);
        assert_eq!(logs[0], other);
        assert_eq!(logs[1].mood, Some(4));
        assert_eq!(logs[1].energy, Some(3));
    }

    #[test]
    fn test_corrupted_daily_logs_treated_as_empty() {
        let temp_dir = tempfile::tempdir().unwrap();
        let mut store = FileStore::new(temp_dir.path());
        std::fs::write(store.daily_logs_path(), "{ invalid json }").unwrap();

        assert!(store.load_daily_logs().unwrap().is_empty());

        // The next upsert starts over from an empty set
        store.upsert_daily_log(&DailyLog::new(date("2024-02-01"))).unwrap();
        assert_eq!(store.load_daily_logs().unwrap().len(), 1);
    }

    #[test]
    fn test_atomic_upsert_leaves_no_temp_files() {
        let temp_dir = tempfile::tempdir().unwrap();
        let mut store = FileStore::new(temp_dir.path());
        store.upsert_daily_log(&DailyLog::new(date("2024-02-01"))).unwrap();

        let extras: Vec<_> = std::fs::read_dir(temp_dir.path())
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_name() != DAILY_LOGS_FILE && e.file_name() != DAILY_LOGS_LOCK_FILE)
            .collect();
        assert!(
            extras.is_empty(),
            "Expected only {} and its lock, found extras: {:?}",
            DAILY_LOGS_FILE,
            extras
        );
    }

    #[test]
    fn test_concurrent_upserts_keep_every_date() {
        let temp_dir = tempfile::tempdir().unwrap();
        let dir = temp_dir.path().to_path_buf();
        let first = date("2024-03-01");

        let handles: Vec<_> = (0..16i64)
            .map(|i| {
                let dir = dir.clone();
                std::thread::spawn(move || {
                    let mut store = FileStore::new(dir);
                    let mut log = DailyLog::new(first + chrono::Duration::days(i));
                    log.mood = Some(3);
                    store.upsert_daily_log(&log).unwrap();
                })
            })
            .collect();
        for handle in handles {
            handle.join().expect("Thread panicked");
        }

        let logs = FileStore::new(&dir).load_daily_logs().unwrap();
        assert_eq!(logs.len(), 16);
        assert_eq!(logs[0].date, first);
        assert_eq!(logs[15].date, date("2024-03-16"));
    }

    #[test]
    fn test_delete_racing_inserts_loses_nothing() {
        for _ in 0..20 {
            let temp_dir = tempfile::tempdir().unwrap();
            let dir = temp_dir.path().to_path_buf();

            let doomed = CycleEvent::period_start(date("2024-01-01"));
            FileStore::new(&dir).insert_event(&doomed).unwrap();

            let mut handles: Vec<_> = (0..8i64)
                .map(|i| {
                    let dir = dir.clone();
                    std::thread::spawn(move || {
                        let event = CycleEvent::period_end(date("2024-02-01") + chrono::Duration::days(i));
                        FileStore::new(dir).insert_event(&event).unwrap();
                    })
                })
                .collect();
            let delete_dir = dir.clone();
            let doomed_id = doomed.id;
            handles.push(std::thread::spawn(move || {
                assert!(FileStore::new(delete_dir).delete_event(doomed_id).unwrap());
            }));
            for handle in handles {
                handle.join().expect("Thread panicked");
            }

            let events = FileStore::new(&dir).load_events().unwrap();
            assert_eq!(events.len(), 8);
            assert!(events.iter().all(|e| e.id != doomed.id));
        }
    }
}
