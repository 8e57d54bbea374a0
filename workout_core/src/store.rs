//! Saved plan storage.
//!
//! Plans are kept one JSON record per line. Every operation holds a lock on a
//! sibling `.lock` file: shared for reads, exclusive for appends and for the
//! whole read, modify and persist cycle of an edit. Edits rewrite the file
//! through a temp file that is persisted over the original.

use crate::{ComposedWorkout, Error, Result, WeeklyPlan};
use chrono::{DateTime, Utc};
use fs2::FileExt;
use serde::{Deserialize, Serialize};
use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use uuid::Uuid;

/// File name of the plan store inside the data directory
pub const PLANS_FILE: &str = "saved_plans.jsonl";

/// Suffix of the lock file kept next to the store
const LOCK_SUFFIX: &str = "lock";

/// Either kind of plan a user can keep
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(tag = "plan_type", rename_all = "snake_case")]
pub enum SavedPlanBody {
    Single(ComposedWorkout),
    Weekly(WeeklyPlan),
}

impl SavedPlanBody {
    pub fn kind(&self) -> &'static str {
        match self {
            SavedPlanBody::Single(_) => "single",
            SavedPlanBody::Weekly(_) => "weekly",
        }
    }
}

/// A named plan with its equipment selection
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct SavedPlan {
    pub id: Uuid,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub equipment: Vec<String>,
    #[serde(default)]
    pub is_favorite: bool,
    pub plan: SavedPlanBody,
}

impl SavedPlan {
    pub fn new(name: impl Into<String>, equipment: &[String], plan: SavedPlanBody) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            created_at: Utc::now(),
            equipment: equipment.to_vec(),
            is_favorite: false,
            plan,
        }
    }
}

/// Simple CRUD over saved plans
pub trait PlanStore {
    fn create(&mut self, plan: &SavedPlan) -> Result<()>;

    /// All plans, newest first
    fn list(&self) -> Result<Vec<SavedPlan>>;

    fn get(&self, id: Uuid) -> Result<Option<SavedPlan>>;

    fn set_favorite(&mut self, id: Uuid, favorite: bool) -> Result<SavedPlan>;

    fn delete(&mut self, id: Uuid) -> Result<SavedPlan>;
}

/// JSONL-backed plan store with file locking
pub struct JsonlPlanStore {
    path: PathBuf,
}

/// Held store lock
struct StoreLock(File);

impl Drop for StoreLock {
    fn drop(&mut self) {
        if let Err(e) = self.0.unlock() {
            tracing::warn!("Failed to release plan store lock: {}", e);
        }
    }
}

impl JsonlPlanStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store at the conventional location inside `data_dir`
    pub fn in_dir(data_dir: &Path) -> Self {
        Self::new(data_dir.join(PLANS_FILE))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn ensure_parent_dir(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        Ok(())
    }

    fn lock_path(&self) -> PathBuf {
        let mut name = self.path.as_os_str().to_owned();
        name.push(".");
        name.push(LOCK_SUFFIX);
        PathBuf::from(name)
    }

    /// Lock the store; released when the guard drops
    ///
    /// The store file itself is replaced on every edit, so locks live on a
    /// sibling file that is never renamed.
    fn lock(&self, exclusive: bool) -> Result<StoreLock> {
        self.ensure_parent_dir()?;
        let file = OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(self.lock_path())?;

        if exclusive {
            file.lock_exclusive()?;
        } else {
            file.lock_shared()?;
        }
        Ok(StoreLock(file))
    }

    /// Records in file order; corrupt lines are skipped. Caller holds the lock.
    fn read_all(&self) -> Result<Vec<SavedPlan>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }

        let file = File::open(&self.path)?;
        let reader = BufReader::new(&file);
        let mut plans = Vec::new();

        for (line_num, line_result) in reader.lines().enumerate() {
            let line = line_result?;
            if line.trim().is_empty() {
                continue;
            }

            match serde_json::from_str::<SavedPlan>(&line) {
                Ok(plan) => plans.push(plan),
                Err(e) => {
                    tracing::warn!("Failed to parse saved plan at line {}: {}", line_num + 1, e);
                }
            }
        }

        Ok(plans)
    }

    fn read_shared(&self) -> Result<Vec<SavedPlan>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let _lock = self.lock(false)?;
        self.read_all()
    }

    /// Replace the file contents. Caller holds the exclusive lock.
    fn rewrite(&self, plans: &[SavedPlan]) -> Result<()> {
        let dir = self.path.parent().ok_or_else(|| {
            Error::Store(format!("plan store path {:?} has no parent", self.path))
        })?;
        let temp = NamedTempFile::new_in(dir)?;

        {
            let mut writer = std::io::BufWriter::new(temp.as_file());
            for plan in plans {
                serde_json::to_writer(&mut writer, plan)?;
                writer.write_all(b"\n")?;
            }
            writer.flush()?;
        }

        temp.as_file().sync_all()?;
        temp.persist(&self.path).map_err(|e| Error::Io(e.error))?;
        Ok(())
    }

    /// Run one read, modify and persist cycle under the exclusive lock
    fn edit<T>(&self, change: impl FnOnce(&mut Vec<SavedPlan>) -> Result<T>) -> Result<T> {
        let _lock = self.lock(true)?;
        let mut plans = self.read_all()?;
        let result = change(&mut plans)?;
        self.rewrite(&plans)?;
        Ok(result)
    }

    fn not_found(id: Uuid) -> Error {
        Error::Store(format!("No saved plan with id {}", id))
    }
}

impl PlanStore for JsonlPlanStore {
    fn create(&mut self, plan: &SavedPlan) -> Result<()> {
        let _lock = self.lock(true)?;

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;

        let mut writer = std::io::BufWriter::new(&file);
        let line = serde_json::to_string(plan)?;
        writer.write_all(line.as_bytes())?;
        writer.write_all(b"\n")?;
        writer.flush()?;

        tracing::debug!("Saved {} plan '{}' as {}", plan.plan.kind(), plan.name, plan.id);
        Ok(())
    }

    fn list(&self) -> Result<Vec<SavedPlan>> {
        let mut plans = self.read_shared()?;
        plans.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(plans)
    }

    fn get(&self, id: Uuid) -> Result<Option<SavedPlan>> {
        Ok(self.read_shared()?.into_iter().find(|p| p.id == id))
    }

    fn set_favorite(&mut self, id: Uuid, favorite: bool) -> Result<SavedPlan> {
        let updated = self.edit(|plans| {
            let plan = plans
                .iter_mut()
                .find(|p| p.id == id)
                .ok_or_else(|| Self::not_found(id))?;
            plan.is_favorite = favorite;
            Ok(plan.clone())
        })?;

        tracing::debug!("Set favorite={} on plan {}", favorite, id);
        Ok(updated)
    }

    fn delete(&mut self, id: Uuid) -> Result<SavedPlan> {
        let removed = self.edit(|plans| {
            let position = plans
                .iter()
                .position(|p| p.id == id)
                .ok_or_else(|| Self::not_found(id))?;
            Ok(plans.remove(position))
        })?;

        tracing::debug!("Deleted plan {}", id);
        Ok(removed)
    }
}
