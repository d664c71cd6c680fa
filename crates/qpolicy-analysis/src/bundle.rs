//! Program bundles: one directory per task, each holding a Python program.

use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{debug, info};
use walkdir::WalkDir;

use crate::error::{AnalysisError, AnalysisResult};
use crate::tally::{ShotTally, tally_source};

/// A task program found in a bundle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProgramEntry {
    /// Name of the task directory.
    pub task_id: String,
    pub path: PathBuf,
}

/// A task program together with its tally.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProgramTally {
    pub task_id: String,
    pub path: PathBuf,
    pub tally: ShotTally,
}

/// Tallies of every task in a bundle.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BundleTally {
    pub programs: Vec<ProgramTally>,
}

impl BundleTally {
    /// Sum over all programs.
    pub fn total(&self) -> AnalysisResult<ShotTally> {
        ShotTally::try_sum(self.programs.iter().map(|p| p.tally))
    }
}

/// Find the program of each task directory below `root`, ordered by task id.
///
/// The program of a task is the shallowest `.py` file, ties broken by file
/// name. Tasks without any Python file are skipped.
pub fn discover_programs(root: &Path) -> AnalysisResult<Vec<ProgramEntry>> {
    if !root.is_dir() {
        return Err(AnalysisError::BundleNotFound(root.to_path_buf()));
    }

    let mut task_dirs = Vec::new();
    for entry in std::fs::read_dir(root).map_err(|e| AnalysisError::io(root, e))? {
        let entry = entry.map_err(|e| AnalysisError::io(root, e))?;
        if entry.path().is_dir() {
            task_dirs.push(entry.path());
        }
    }
    task_dirs.sort();

    let mut programs = Vec::new();
    for dir in task_dirs {
        let task_id = dir
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        match find_program(&dir)? {
            Some(path) => {
                debug!("Task {} uses program {}", task_id, path.display());
                programs.push(ProgramEntry { task_id, path });
            }
            None => debug!("Task {} has no Python program, skipping", task_id),
        }
    }

    Ok(programs)
}

fn find_program(task_dir: &Path) -> AnalysisResult<Option<PathBuf>> {
    let mut best: Option<(usize, PathBuf)> = None;

    for entry in WalkDir::new(task_dir).min_depth(1).sort_by_file_name() {
        let entry = entry.map_err(|e| AnalysisError::io(task_dir, e))?;
        let is_python = entry.file_type().is_file()
            && entry.path().extension().is_some_and(|ext| ext == "py");
        if !is_python {
            continue;
        }
        let depth = entry.depth();
        if best.as_ref().is_none_or(|(d, _)| depth < *d) {
            best = Some((depth, entry.into_path()));
        }
    }

    Ok(best.map(|(_, path)| path))
}

/// Tally one program file.
pub fn tally_program(path: &Path) -> AnalysisResult<ShotTally> {
    let source = std::fs::read_to_string(path).map_err(|e| AnalysisError::io(path, e))?;
    tally_source(&source)
}

/// Tally every task program of a bundle.
pub fn tally_bundle(root: &Path) -> AnalysisResult<BundleTally> {
    let programs = discover_programs(root)?
        .into_iter()
        .map(|entry| {
            let tally = tally_program(&entry.path)?;
            Ok(ProgramTally {
                task_id: entry.task_id,
                path: entry.path,
                tally,
            })
        })
        .collect::<AnalysisResult<Vec<_>>>()?;

    let bundle = BundleTally { programs };
    let total = bundle.total()?;
    info!(
        "Tallied {} programs: {} quantum tasks, {} batches, {} executes",
        bundle.programs.len(),
        total.quantum_tasks,
        total.batches,
        total.executes
    );
    Ok(bundle)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_shallowest_program_wins() {
        let dir = tempfile::tempdir().unwrap();
        let task = dir.path().join("task-1");
        fs::create_dir_all(task.join("nested")).unwrap();
        fs::write(task.join("nested/a.py"), "").unwrap();
        fs::write(task.join("z.py"), "").unwrap();
        fs::write(task.join("readme.txt"), "").unwrap();

        let programs = discover_programs(dir.path()).unwrap();
        assert_eq!(programs.len(), 1);
        assert_eq!(programs[0].task_id, "task-1");
        assert!(programs[0].path.ends_with("z.py"));
    }

    #[test]
    fn test_first_by_name_at_same_depth() {
        let dir = tempfile::tempdir().unwrap();
        let task = dir.path().join("t");
        fs::create_dir_all(&task).unwrap();
        fs::write(task.join("b.py"), "").unwrap();
        fs::write(task.join("a.py"), "").unwrap();

        let programs = discover_programs(dir.path()).unwrap();
        assert!(programs[0].path.ends_with("a.py"));
    }

    #[test]
    fn test_nested_only() {
        let dir = tempfile::tempdir().unwrap();
        let task = dir.path().join("t");
        fs::create_dir_all(task.join("src/pkg")).unwrap();
        fs::write(task.join("src/pkg/main.py"), "").unwrap();

        let programs = discover_programs(dir.path()).unwrap();
        assert!(programs[0].path.ends_with("src/pkg/main.py"));
    }

    #[test]
    fn test_tasks_without_program_skipped() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("empty")).unwrap();
        fs::write(dir.path().join("top-level.py"), "").unwrap();

        assert!(discover_programs(dir.path()).unwrap().is_empty());
    }

    #[test]
    fn test_missing_root() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope");
        assert!(matches!(
            discover_programs(&missing),
            Err(AnalysisError::BundleNotFound(_))
        ));
    }
}
