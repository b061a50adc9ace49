//! JSONL-backed assignment store with an in-memory cache.
//!
//! Two files live under the store directory: `colonies.jsonl` with one
//! [`ColonyRecord`] per line and `workers.jsonl` with one worker memory per
//! line. Every save rewrites the whole file through a temporary file and a
//! rename, so a crash mid-write leaves the previous contents in place. A
//! cycle save stages both temporary files before renaming either.

use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use serde::{Serialize, de::DeserializeOwned};

use super::{AssignmentStore, BossRecord, ColonyRecord};
use crate::error::Result;
use crate::worker::WorkerMemory;

const COLONIES: &str = "colonies";
const WORKERS: &str = "workers";

pub struct JsonlStore {
    base_path: PathBuf,
    colonies: BTreeMap<String, ColonyRecord>,
    workers: Vec<WorkerMemory>,
}

impl JsonlStore {
    /// Open or create a store at the given directory
    pub fn new(base_path: impl AsRef<Path>) -> Result<Self> {
        let base_path = base_path.as_ref().to_path_buf();
        fs::create_dir_all(&base_path)?;

        let colonies = read_lines::<ColonyRecord>(&collection_path(&base_path, COLONIES))?
            .into_iter()
            .map(|c| (c.id.clone(), c))
            .collect();
        let workers = read_lines(&collection_path(&base_path, WORKERS))?;

        Ok(Self {
            base_path,
            colonies,
            workers,
        })
    }

    fn rewrite_colonies(&self) -> Result<()> {
        let records: Vec<&ColonyRecord> = self.colonies.values().collect();
        write_lines(&collection_path(&self.base_path, COLONIES), &records)
    }
}

impl std::fmt::Debug for JsonlStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JsonlStore")
            .field("base_path", &self.base_path)
            .finish_non_exhaustive()
    }
}

impl AssignmentStore for JsonlStore {
    fn colony(&self, colony: &str) -> Result<Option<ColonyRecord>> {
        Ok(self.colonies.get(colony).cloned())
    }

    fn colonies(&self) -> Result<Vec<ColonyRecord>> {
        Ok(self.colonies.values().cloned().collect())
    }

    fn save_colony(&mut self, colony: &str, tick: u64, bosses: &[BossRecord]) -> Result<()> {
        self.colonies
            .insert(colony.to_string(), ColonyRecord::new(colony, tick, bosses.to_vec()));
        self.rewrite_colonies()
    }

    fn clear_colony(&mut self, colony: &str) -> Result<bool> {
        if self.colonies.remove(colony).is_none() {
            return Ok(false);
        }
        self.rewrite_colonies()?;
        Ok(true)
    }

    fn load_workers(&self) -> Result<Vec<WorkerMemory>> {
        Ok(self.workers.clone())
    }

    fn save_workers(&mut self, memories: &[WorkerMemory]) -> Result<()> {
        write_lines(&collection_path(&self.base_path, WORKERS), memories)?;
        self.workers = memories.to_vec();
        Ok(())
    }

    fn save_cycle(&mut self, colony: &str, tick: u64, bosses: &[BossRecord], memories: &[WorkerMemory]) -> Result<()> {
        let mut colonies = self.colonies.clone();
        colonies.insert(colony.to_string(), ColonyRecord::new(colony, tick, bosses.to_vec()));
        let records: Vec<&ColonyRecord> = colonies.values().collect();

        let colonies_path = collection_path(&self.base_path, COLONIES);
        let workers_path = collection_path(&self.base_path, WORKERS);
        let colonies_tmp = stage(&colonies_path, &records)?;
        let workers_tmp = match stage(&workers_path, memories) {
            Ok(tmp) => tmp,
            Err(e) => {
                let _ = fs::remove_file(&colonies_tmp);
                return Err(e);
            }
        };

        fs::rename(&colonies_tmp, &colonies_path)?;
        self.colonies = colonies;
        fs::rename(&workers_tmp, &workers_path)?;
        self.workers = memories.to_vec();
        Ok(())
    }
}

fn collection_path(base: &Path, collection: &str) -> PathBuf {
    base.join(format!("{}.jsonl", collection))
}

/// Parse one record per line. Blank lines are skipped; malformed lines are
/// logged and skipped so one bad record does not lose the rest.
fn read_lines<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>> {
    if !path.exists() {
        return Ok(Vec::new());
    }

    let reader = BufReader::new(File::open(path)?);
    let mut records = Vec::new();
    for (number, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        match serde_json::from_str(&line) {
            Ok(record) => records.push(record),
            Err(e) => log::warn!("Skipping malformed line {} of {}: {}", number + 1, path.display(), e),
        }
    }
    Ok(records)
}

/// Write one line per record to the file's temporary sibling
fn stage<T: Serialize>(path: &Path, records: &[T]) -> Result<PathBuf> {
    let tmp = path.with_extension("jsonl.tmp");
    if let Err(e) = write_records(&tmp, records) {
        let _ = fs::remove_file(&tmp);
        return Err(e);
    }
    Ok(tmp)
}

fn write_records<T: Serialize>(path: &Path, records: &[T]) -> Result<()> {
    let mut writer = BufWriter::new(File::create(path)?);
    for record in records {
        writeln!(writer, "{}", serde_json::to_string(record)?)?;
    }
    writer.flush()?;
    Ok(())
}

/// Replace the file with one line per record
fn write_lines<T: Serialize>(path: &Path, records: &[T]) -> Result<()> {
    let tmp = stage(path, records)?;
    fs::rename(&tmp, path)?;
    Ok(())
}
