//! User registry and record loader. The only module that touches the disk.
//!
//! A user id names two files:
//!
//! ```text
//! <social_dir>/<id>.txt          social-feed export
//! <portfolio_dir>/<id>Web3.txt   portfolio export
//! ```
//!
//! The registry is the set of social exports present when the loader is
//! opened; it is never rescanned.

use std::collections::BTreeSet;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use rayon::prelude::*;

use crate::mentions::profile_mentions;
use crate::portfolio::read_portfolio;
use crate::social::read_social;
use crate::types::{
    Connections, ExportError, ExportResult, SkippedConnection, UserRecord,
};

/// Default number of connection loads in flight.
pub const DEFAULT_MAX_PARALLEL: usize = 4;

const SOCIAL_EXTENSION: &str = "txt";
const PORTFOLIO_SUFFIX: &str = "Web3.txt";

/// Where the two export families live.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportLayout {
    pub social_dir: PathBuf,
    pub portfolio_dir: PathBuf,
}

impl Default for ExportLayout {
    fn default() -> Self {
        Self {
            social_dir: PathBuf::from("TwitterData"),
            portfolio_dir: PathBuf::from("Web3Data"),
        }
    }
}

impl ExportLayout {
    pub fn new(social_dir: impl Into<PathBuf>, portfolio_dir: impl Into<PathBuf>) -> Self {
        Self {
            social_dir: social_dir.into(),
            portfolio_dir: portfolio_dir.into(),
        }
    }

    pub fn social_path(&self, id: &str) -> PathBuf {
        self.social_dir.join(format!("{id}.{SOCIAL_EXTENSION}"))
    }

    pub fn portfolio_path(&self, id: &str) -> PathBuf {
        self.portfolio_dir.join(format!("{id}{PORTFOLIO_SUFFIX}"))
    }
}

/// Sorted set of known user ids.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Registry {
    ids: BTreeSet<String>,
}

impl Registry {
    /// Collect the stem of every regular `*.txt` file in `dir`.
    ///
    /// A missing directory yields an empty registry.
    pub fn scan(dir: &Path) -> ExportResult<Self> {
        let io_err = |source| ExportError::Io {
            path: dir.to_path_buf(),
            source,
        };

        let entries = match std::fs::read_dir(dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::warn!("Export directory {} does not exist", dir.display());
                return Ok(Self::default());
            }
            Err(e) => return Err(io_err(e)),
        };

        let mut ids = BTreeSet::new();
        for entry in entries {
            let path = entry.map_err(io_err)?.path();
            if !path.is_file() || path.extension().and_then(|e| e.to_str()) != Some(SOCIAL_EXTENSION)
            {
                continue;
            }
            match path.file_stem().and_then(|s| s.to_str()) {
                Some(stem) if !stem.is_empty() => {
                    ids.insert(stem.to_string());
                }
                _ => tracing::debug!("Skipping unusable export name {}", path.display()),
            }
        }

        tracing::info!("Registered {} users from {}", ids.len(), dir.display());
        Ok(Self { ids })
    }

    pub fn contains(&self, id: &str) -> bool {
        self.ids.contains(id)
    }

    /// Ids in sorted order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.ids.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

/// Loads [`UserRecord`]s for registered users.
#[derive(Debug, Clone)]
pub struct UserLoader {
    layout: ExportLayout,
    registry: Registry,
    max_parallel: usize,
}

impl UserLoader {
    /// Scan the social directory and build a loader over it.
    pub fn open(layout: ExportLayout) -> ExportResult<Self> {
        let registry = Registry::scan(&layout.social_dir)?;
        Ok(Self {
            layout,
            registry,
            max_parallel: DEFAULT_MAX_PARALLEL,
        })
    }

    /// Bound the connection worker pool. Zero is treated as one.
    pub fn with_max_parallel(mut self, n: usize) -> Self {
        self.max_parallel = n.max(1);
        self
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn layout(&self) -> &ExportLayout {
        &self.layout
    }

    pub fn max_parallel(&self) -> usize {
        self.max_parallel
    }

    /// Load both exports of one registered user.
    pub fn load(&self, id: &str) -> ExportResult<UserRecord> {
        if !self.registry.contains(id) {
            return Err(ExportError::UserNotFound(id.to_string()));
        }

        let social = read_social(&self.layout.social_path(id))?;
        let (portfolio, diagnostics) =
            read_portfolio(&self.layout.portfolio_path(id))?.into_parts();

        if !diagnostics.is_empty() {
            tracing::debug!("User '{id}': {} fragments dropped", diagnostics.len());
        }

        Ok(UserRecord {
            id: id.to_string(),
            social,
            portfolio,
            diagnostics,
        })
    }

    /// Load every other registered user.
    pub fn load_connections(&self, record: &UserRecord) -> Connections {
        let ids: Vec<&str> = self.registry.iter().filter(|id| *id != record.id).collect();
        self.load_many(&ids)
    }

    /// Load the registered users this user mentions in their posts.
    pub fn load_mentioned_connections(&self, record: &UserRecord) -> Connections {
        let mentioned = profile_mentions(&record.social);
        let ids: Vec<&str> = self
            .registry
            .iter()
            .filter(|id| *id != record.id && mentioned.contains(*id))
            .collect();
        self.load_many(&ids)
    }

    /// Load `ids` on a bounded pool. Output keeps the order of `ids`.
    fn load_many(&self, ids: &[&str]) -> Connections {
        let results: Vec<(&str, ExportResult<UserRecord>)> =
            match rayon::ThreadPoolBuilder::new()
                .num_threads(self.max_parallel)
                .build()
            {
                Ok(pool) => pool.install(|| ids.par_iter().map(|id| (*id, self.load(id))).collect()),
                Err(e) => {
                    tracing::warn!("Worker pool unavailable ({e}); loading sequentially");
                    ids.iter().map(|id| (*id, self.load(id))).collect()
                }
            };

        let mut connections = Connections::default();
        for (id, result) in results {
            match result {
                Ok(record) => connections.records.push(record),
                Err(e) => {
                    tracing::warn!("Skipping connection '{id}': {e}");
                    connections.skipped.push(SkippedConnection {
                        id: id.to_string(),
                        reason: e.to_string(),
                    });
                }
            }
        }
        connections
    }
}
