//! Persisted snapshot of the task store.
//!
//! The database file is a single JSON document used as a small key-value
//! store: `"tasks"` holds the nested forest and `"axis"` the last burndown
//! range. Files that hold only a bare array of tasks are read as the
//! `"tasks"` value.

use std::fs::{self, File};
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::ser::{CompactFormatter, Formatter, PrettyFormatter};
use tracing::{debug, warn};

use crate::burndown::DateAxis;
use crate::error::{Error, Result};
use crate::store::Change;
use crate::task::TaskNode;
use crate::tree::Forest;

/// On-disk layout of the task store.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct Database {
    #[serde(default)]
    pub tasks: Vec<TaskNode>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub axis: Option<DateAxis>,
}

impl Database {
    /// Capture the current forest and axis.
    pub fn snapshot(forest: &Forest, axis: &DateAxis) -> Self {
        Database {
            tasks: forest.to_nodes(),
            axis: Some(*axis),
        }
    }

    /// Read and validate a database file.
    ///
    /// A missing file is an empty database. Unparseable content and
    /// duplicate task ids are reported as [`Error::CorruptSnapshot`]. A stored
    /// axis that is out of range is dropped with a warning.
    pub fn try_load(path: &Path) -> Result<(Forest, Option<DateAxis>)> {
        if !path.exists() {
            return Ok((Forest::new(), None));
        }
        let mut buf = String::new();
        File::open(path)?.read_to_string(&mut buf)?;
        let db = parse(&buf).map_err(|e| Error::CorruptSnapshot {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        let forest = Forest::from_nodes(db.tasks).map_err(|e| Error::CorruptSnapshot {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        let axis = db.axis.and_then(|axis| match axis.validated() {
            Ok(axis) => Some(axis),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "ignoring stored axis");
                None
            }
        });
        debug!(path = %path.display(), tasks = forest.len(), "database loaded");
        Ok((forest, axis))
    }

    /// Load a database file, starting fresh if it cannot be read.
    pub fn load(path: &Path) -> (Forest, Option<DateAxis>) {
        match Self::try_load(path) {
            Ok(loaded) => loaded,
            Err(e) => {
                warn!(error = %e, "starting with an empty task list");
                (Forest::new(), None)
            }
        }
    }

    /// Save as compact JSON using an atomic write (temp file + rename).
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir)?;
        }
        let tmp = path.with_extension("json.tmp");
        let data = to_json(self)?;
        let mut f = File::create(&tmp)?;
        f.write_all(data.as_bytes())?;
        f.flush()?;
        fs::rename(tmp, path)?;
        debug!(path = %path.display(), tasks = self.tasks.len(), "database saved");
        Ok(())
    }
}

fn parse(buf: &str) -> serde_json::Result<Database> {
    match deserialize::<Database>(buf) {
        Ok(db) => Ok(db),
        Err(keyed) => match deserialize::<Vec<TaskNode>>(buf) {
            Ok(tasks) => Ok(Database { tasks, axis: None }),
            Err(_) => Err(keyed),
        },
    }
}

// Task nesting has no fixed depth: the recursion limit is lifted and the
// stack grows on demand.
fn deserialize<T: for<'de> Deserialize<'de>>(buf: &str) -> serde_json::Result<T> {
    let mut json = serde_json::Deserializer::from_str(buf);
    json.disable_recursion_limit();
    let value = T::deserialize(serde_stacker::Deserializer::new(&mut json))?;
    json.end()?;
    Ok(value)
}

/// Compact JSON for values of any nesting depth.
pub fn to_json<T: Serialize>(value: &T) -> Result<String> {
    write_json(value, CompactFormatter)
}

/// Pretty-printed JSON for values of any nesting depth.
pub fn to_json_pretty<T: Serialize>(value: &T) -> Result<String> {
    write_json(value, PrettyFormatter::new())
}

fn write_json<T: Serialize, F: Formatter>(value: &T, formatter: F) -> Result<String> {
    let mut out = Vec::new();
    let mut json = serde_json::Serializer::with_formatter(&mut out, formatter);
    value.serialize(serde_stacker::Serializer::new(&mut json))?;
    String::from_utf8(out).map_err(|e| Error::Io(io::Error::new(io::ErrorKind::InvalidData, e)))
}

/// Observer that writes every published change to `path`.
///
/// Saving happens synchronously inside the notification, so writes never
/// interleave and the file always holds the latest state. Failures are
/// logged and otherwise ignored.
pub fn autosave(path: PathBuf) -> impl FnMut(&Change<'_>) + 'static {
    move |change| {
        let db = Database::snapshot(change.forest, change.axis);
        if let Err(e) = db.save(&path) {
            warn!(path = %path.display(), version = change.version, error = %e, "failed to save database");
        }
    }
}
