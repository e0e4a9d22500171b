//! Durable cache of replicate sets.
//!
//! Entries are JSON files in a flat directory, one per [`CacheKey`]. A
//! present, well-formed entry is authoritative: the experiment reuses it
//! without re-running anything.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use hhbench_core::{ReplicateSet, SweepFamily};

use crate::error::CacheError;

/// Identity of one experiment's replicate set.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub dataset: String,
    pub replicates: usize,
    pub family: SweepFamily,
    /// Distinguishes sweeps of one family that differ in a fixed parameter.
    pub secondary: Option<String>,
}

impl CacheKey {
    pub fn new(dataset: impl Into<String>, replicates: usize, family: SweepFamily) -> Self {
        Self {
            dataset: dataset.into(),
            replicates,
            family,
            secondary: None,
        }
    }

    pub fn with_secondary(mut self, secondary: impl Into<String>) -> Self {
        self.secondary = Some(secondary.into());
        self
    }

    /// `{family}-{dataset}-{runs}runs[-{secondary}]`, sanitized.
    pub fn stem(&self) -> String {
        let mut stem = format!(
            "{}-{}-{}runs",
            self.family.name(),
            sanitize(&self.dataset),
            self.replicates
        );
        if let Some(secondary) = &self.secondary {
            stem.push('-');
            stem.push_str(&sanitize(secondary));
        }
        stem
    }

    pub fn file_name(&self) -> String {
        format!("{}.json", self.stem())
    }
}

fn sanitize(component: &str) -> String {
    component
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '.' {
                c.to_ascii_lowercase()
            } else {
                '_'
            }
        })
        .collect()
}

/// Why a lookup did not produce a replicate set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MissReason {
    Absent,
    Unreadable(String),
    Corrupt(String),
}

#[derive(Debug, Clone, PartialEq)]
pub enum CacheLookup {
    Hit(ReplicateSet),
    Miss(MissReason),
}

#[derive(Debug, Clone)]
pub struct ResultCache {
    dir: PathBuf,
}

impl ResultCache {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, key: &CacheKey) -> PathBuf {
        self.dir.join(key.file_name())
    }

    pub fn load(&self, key: &CacheKey) -> CacheLookup {
        let path = self.path_for(key);
        let contents = match fs::read_to_string(&path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return CacheLookup::Miss(MissReason::Absent)
            }
            Err(e) => return CacheLookup::Miss(MissReason::Unreadable(e.to_string())),
        };
        match serde_json::from_str(&contents) {
            Ok(set) => CacheLookup::Hit(set),
            Err(e) => CacheLookup::Miss(MissReason::Corrupt(e.to_string())),
        }
    }

    /// Write `set` under `key`, replacing any previous entry.
    ///
    /// The entry is written to a sibling temporary file and renamed into
    /// place, so readers see either the old entry or the complete new one.
    pub fn store(&self, key: &CacheKey, set: &ReplicateSet) -> Result<(), CacheError> {
        fs::create_dir_all(&self.dir).map_err(|source| CacheError::CreateDir {
            path: self.dir.clone(),
            source,
        })?;

        let json = serde_json::to_string(set)?;
        let path = self.path_for(key);
        let staging = path.with_extension("json.tmp");

        fs::write(&staging, json).map_err(|source| CacheError::Write {
            path: staging.clone(),
            source,
        })?;
        fs::rename(&staging, &path).map_err(|source| {
            let _ = fs::remove_file(&staging);
            CacheError::Write {
                path: path.clone(),
                source,
            }
        })
    }
}
