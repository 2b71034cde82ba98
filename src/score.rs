use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, AtomicUsize, Ordering};

use serde::{Deserialize, Serialize};

const APP_DIR_NAME: &str = "grid-snake";
const SCORE_FILE_NAME: &str = "scores.json";

/// Where the engine keeps its high score between sessions.
///
/// `load` is called once when the engine is built, `save` once per new record.
pub trait HighScoreStore {
    fn load(&mut self) -> io::Result<u32>;
    fn save(&mut self, high_score: u32) -> io::Result<()>;
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
struct ScoreFile {
    high_score: u32,
}

/// Returns the platform-correct score file path.
#[must_use]
pub fn scores_path() -> PathBuf {
    let mut base = dirs::data_local_dir().unwrap_or_else(|| PathBuf::from("."));
    base.push(APP_DIR_NAME);
    base.push(SCORE_FILE_NAME);
    base
}

/// JSON score file on disk.
#[derive(Debug, Clone)]
pub struct FileHighScoreStore {
    path: PathBuf,
}

impl FileHighScoreStore {
    #[must_use]
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// Store at the default per-user data location.
    #[must_use]
    pub fn default_location() -> Self {
        Self::new(scores_path())
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl HighScoreStore for FileHighScoreStore {
    /// Returns `Ok(0)` when the score file does not exist yet.
    fn load(&mut self) -> io::Result<u32> {
        load_high_score_from_path(&self.path)
    }

    fn save(&mut self, high_score: u32) -> io::Result<()> {
        save_high_score_to_path(&self.path, high_score)
    }
}

/// Process-local store. Clones share the stored value, so tests can watch
/// what the engine persisted.
#[derive(Debug, Clone, Default)]
pub struct MemoryHighScoreStore {
    high_score: Arc<AtomicU32>,
    saves: Arc<AtomicUsize>,
}

impl MemoryHighScoreStore {
    #[must_use]
    pub fn with_high_score(high_score: u32) -> Self {
        let store = Self::default();
        store.high_score.store(high_score, Ordering::SeqCst);
        store
    }

    #[must_use]
    pub fn high_score(&self) -> u32 {
        self.high_score.load(Ordering::SeqCst)
    }

    /// Number of `save` calls so far.
    #[must_use]
    pub fn saves(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }
}

impl HighScoreStore for MemoryHighScoreStore {
    fn load(&mut self) -> io::Result<u32> {
        Ok(self.high_score())
    }

    fn save(&mut self, high_score: u32) -> io::Result<()> {
        self.high_score.store(high_score, Ordering::SeqCst);
        self.saves.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

fn load_high_score_from_path(path: &Path) -> io::Result<u32> {
    let raw = match fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(0),
        Err(e) => return Err(e),
    };

    serde_json::from_str::<ScoreFile>(&raw)
        .map(|file| file.high_score)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
}

fn save_high_score_to_path(path: &Path, score: u32) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let payload = ScoreFile { high_score: score };
    let json = serde_json::to_string_pretty(&payload)
        .map_err(|error| io::Error::new(io::ErrorKind::InvalidData, error))?;

    fs::write(path, json)
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::path::PathBuf;
    use std::time::{SystemTime, UNIX_EPOCH};

    use super::{FileHighScoreStore, HighScoreStore, MemoryHighScoreStore};

    #[test]
    fn file_store_persists_between_instances() {
        let path = unique_test_path("persist");

        FileHighScoreStore::new(path.clone())
            .save(420)
            .expect("score save should succeed");
        let loaded = FileHighScoreStore::new(path.clone())
            .load()
            .expect("load should succeed");

        assert_eq!(loaded, 420);
        cleanup_test_path(&path);
    }

    #[test]
    fn missing_score_file_returns_zero() {
        let path = unique_test_path("missing");
        let loaded = FileHighScoreStore::new(path)
            .load()
            .expect("missing file should return Ok(0)");
        assert_eq!(loaded, 0);
    }

    #[test]
    fn malformed_score_file_returns_error() {
        let path = unique_test_path("malformed");
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("test parent directory should be creatable");
        }
        fs::write(&path, "not-json").expect("test file write should succeed");

        assert!(
            FileHighScoreStore::new(path.clone()).load().is_err(),
            "malformed file should return Err"
        );

        cleanup_test_path(&path);
    }

    #[test]
    fn memory_store_clones_share_value() {
        let store = MemoryHighScoreStore::with_high_score(30);
        let mut handle = store.clone();

        handle.save(80).expect("memory save cannot fail");

        assert_eq!(store.high_score(), 80);
        assert_eq!(store.saves(), 1);
    }

    fn unique_test_path(label: &str) -> PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("system time should be after epoch")
            .as_nanos();

        std::env::temp_dir()
            .join("grid-snake-score-tests")
            .join(format!("{label}-{nanos}.json"))
    }

    fn cleanup_test_path(path: &PathBuf) {
        let _ = fs::remove_file(path);
        if let Some(parent) = path.parent() {
            let _ = fs::remove_dir(parent);
        }
    }
}
