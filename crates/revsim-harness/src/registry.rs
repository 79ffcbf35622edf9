//! Loading of task and groundtruth directories.
//!
//! Both directories hold one JSON document per file. Files are read in
//! byte-wise file-name order so that the n-th task lines up with the n-th
//! groundtruth entry. Hidden files and subdirectories are ignored.

use crate::error::{HarnessError, Result};
use revsim_core::{Groundtruth, Task, TaskError};
use serde_json::Value;
use std::fs::{self, File};
use std::io::BufReader;
use std::path::{Path, PathBuf};

/// Tasks and groundtruth loaded side by side.
#[derive(Debug, Clone, Default)]
pub struct TaskSet {
    pub tasks: Vec<Task>,
    pub groundtruth: Vec<Groundtruth>,
}

impl TaskSet {
    /// Loads both directories. A count mismatch is not an error here.
    pub fn load(task_dir: &Path, groundtruth_dir: &Path) -> Result<Self> {
        let tasks = load_tasks(task_dir)?;
        let groundtruth = load_groundtruth(groundtruth_dir)?;
        if tasks.len() != groundtruth.len() {
            tracing::warn!(
                tasks = tasks.len(),
                groundtruth = groundtruth.len(),
                "task and groundtruth counts differ"
            );
        }
        Ok(Self { tasks, groundtruth })
    }
}

/// Regular, non-hidden files of `dir`, sorted by file name.
pub fn list_files(dir: &Path) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Err(HarnessError::MissingDirectory(dir.to_path_buf()));
    }
    let io_err = |source: std::io::Error| HarnessError::Io {
        path: dir.to_path_buf(),
        source,
    };

    let mut files = Vec::new();
    for entry in fs::read_dir(dir).map_err(io_err)? {
        let entry = entry.map_err(io_err)?;
        let name = entry.file_name();
        if name.to_string_lossy().starts_with('.') {
            continue;
        }
        if entry.file_type().map_err(io_err)?.is_dir() {
            continue;
        }
        files.push(entry.path());
    }
    files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(files)
}

pub fn load_tasks(dir: &Path) -> Result<Vec<Task>> {
    let tasks = list_files(dir)?
        .into_iter()
        .map(|path| {
            let value = read_json(&path)?;
            Task::from_json(value).map_err(|err| match err {
                TaskError::UnsupportedType(kind) => HarnessError::UnsupportedTaskType { path, kind },
                other => HarnessError::Parse {
                    path,
                    source: Box::new(other),
                },
            })
        })
        .collect::<Result<Vec<_>>>()?;
    tracing::info!(dir = %dir.display(), count = tasks.len(), "tasks loaded");
    Ok(tasks)
}

pub fn load_groundtruth(dir: &Path) -> Result<Vec<Groundtruth>> {
    let entries = list_files(dir)?
        .into_iter()
        .map(|path| {
            serde_json::from_value(read_json(&path)?).map_err(|source| HarnessError::Parse {
                path,
                source: Box::new(source),
            })
        })
        .collect::<Result<Vec<_>>>()?;
    tracing::info!(dir = %dir.display(), count = entries.len(), "groundtruth loaded");
    Ok(entries)
}

fn read_json(path: &Path) -> Result<Value> {
    let file = File::open(path).map_err(|source| HarnessError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_reader(BufReader::new(file)).map_err(|source| HarnessError::Parse {
        path: path.to_path_buf(),
        source: Box::new(source),
    })
}
