use std::fs;
use std::path::{Path, PathBuf};

use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

const FILE_VERSION: u8 = 1;

#[derive(Debug, Error)]
pub enum HighScoreError {
    #[error("failed to read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to write {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("failed to encode high score: {0}")]
    Encode(#[source] serde_json::Error),
    #[error("unsupported high score file version {version} at {}", .path.display())]
    UnsupportedVersion { path: PathBuf, version: u8 },
}

#[derive(Clone, Debug, Serialize, Deserialize)]
struct HighScoreFile {
    version: u8,
    #[serde(rename = "highScore", alias = "high_score")]
    high_score: u32,
    #[serde(rename = "updatedAt", default)]
    updated_at: Option<String>,
}

/// Single best score, read once at session start and written back only when
/// a finished round beats it. Without a path the store lives in memory.
#[derive(Clone, Debug)]
pub struct HighScoreStore {
    file_path: Option<PathBuf>,
    best: u32,
}

impl HighScoreStore {
    pub fn in_memory(best: u32) -> Self {
        Self {
            file_path: None,
            best,
        }
    }

    /// Opens the store, treating any unreadable file as an empty record.
    pub fn open(file_path: PathBuf) -> Self {
        let best = match load(&file_path) {
            Ok(best) => best,
            Err(error) => {
                warn!(%error, "high score unavailable, starting from zero");
                0
            }
        };
        Self {
            file_path: Some(file_path),
            best,
        }
    }

    /// Opens the store, failing on anything but a missing file.
    pub fn try_open(file_path: PathBuf) -> Result<Self, HighScoreError> {
        let best = load(&file_path)?;
        Ok(Self {
            file_path: Some(file_path),
            best,
        })
    }

    pub fn best(&self) -> u32 {
        self.best
    }

    pub fn path(&self) -> Option<&Path> {
        self.file_path.as_deref()
    }

    /// Records a finished round's score. Returns true when it beat the
    /// stored value.
    pub fn record(&mut self, score: u32) -> bool {
        if score <= self.best {
            return false;
        }
        self.best = score;
        if let Err(error) = self.save() {
            warn!(%error, score, "failed to persist high score");
        }
        true
    }

    fn save(&self) -> Result<(), HighScoreError> {
        let Some(path) = self.file_path.as_ref() else {
            return Ok(());
        };
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|source| HighScoreError::Write {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        let payload = HighScoreFile {
            version: FILE_VERSION,
            high_score: self.best,
            updated_at: Some(Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)),
        };
        let text = serde_json::to_string_pretty(&payload).map_err(HighScoreError::Encode)?;
        fs::write(path, text).map_err(|source| HighScoreError::Write {
            path: path.clone(),
            source,
        })?;
        debug!(path = %path.display(), high_score = self.best, "high score saved");
        Ok(())
    }
}

fn load(path: &Path) -> Result<u32, HighScoreError> {
    let text = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(error) if error.kind() == std::io::ErrorKind::NotFound => return Ok(0),
        Err(source) => {
            return Err(HighScoreError::Read {
                path: path.to_path_buf(),
                source,
            })
        }
    };
    let parsed: HighScoreFile =
        serde_json::from_str(&text).map_err(|source| HighScoreError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
    if parsed.version != FILE_VERSION {
        return Err(HighScoreError::UnsupportedVersion {
            path: path.to_path_buf(),
            version: parsed.version,
        });
    }
    Ok(parsed.high_score)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_file(name: &str) -> PathBuf {
        let unique = format!(
            "{}-{}-{}",
            name,
            std::process::id(),
            rand::random::<u32>()
        );
        std::env::temp_dir().join(unique).join("high_score.json")
    }

    #[test]
    fn missing_file_starts_at_zero() {
        let path = temp_file("hs-missing");
        let store = HighScoreStore::try_open(path).expect("missing file is not an error");
        assert_eq!(store.best(), 0);
    }

    #[test]
    fn record_persists_only_when_beaten() {
        let path = temp_file("hs-record");
        let mut store = HighScoreStore::open(path.clone());
        assert!(store.record(420));
        assert!(!store.record(420));
        assert!(!store.record(100));

        let reopened = HighScoreStore::try_open(path.clone()).expect("file should load");
        assert_eq!(reopened.best(), 420);

        let text = fs::read_to_string(&path).expect("file should exist");
        let value: serde_json::Value = serde_json::from_str(&text).expect("valid json");
        assert_eq!(value["version"], 1);
        assert_eq!(value["highScore"], 420);
        assert!(value["updatedAt"].is_string());
    }

    #[test]
    fn corrupt_file_is_an_error_for_try_open_but_not_open() {
        let path = temp_file("hs-corrupt");
        fs::create_dir_all(path.parent().expect("has parent")).expect("create dir");
        fs::write(&path, "not json").expect("write file");

        assert!(matches!(
            HighScoreStore::try_open(path.clone()),
            Err(HighScoreError::Parse { .. })
        ));
        assert_eq!(HighScoreStore::open(path).best(), 0);
    }

    #[test]
    fn rejects_unknown_version() {
        let path = temp_file("hs-version");
        fs::create_dir_all(path.parent().expect("has parent")).expect("create dir");
        fs::write(&path, r#"{"version":9,"highScore":5}"#).expect("write file");
        assert!(matches!(
            HighScoreStore::try_open(path),
            Err(HighScoreError::UnsupportedVersion { version: 9, .. })
        ));
    }

    #[test]
    fn in_memory_store_never_touches_disk() {
        let mut store = HighScoreStore::in_memory(50);
        assert!(store.path().is_none());
        assert!(store.record(60));
        assert_eq!(store.best(), 60);
    }
}
