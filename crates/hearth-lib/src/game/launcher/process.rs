use super::planner::LaunchPlan;
use crate::error::{Error, Result};
use crate::utils::process::LauncherCommandExt;
use std::process::Command;

/// Starts a planned game process
pub trait ProcessSpawner: Send + Sync {
    /// Spawn the plan and return the child's process id
    fn spawn(&self, plan: &LaunchPlan) -> Result<u32>;
}

/// Spawns the game detached from the launcher, in the plan's working directory.
/// The child outlives the launcher; its output is discarded. While the launcher
/// runs, a background thread waits on the child so it is reaped on exit.
#[derive(Debug, Default, Clone, Copy)]
pub struct DetachedSpawner;

impl ProcessSpawner for DetachedSpawner {
    fn spawn(&self, plan: &LaunchPlan) -> Result<u32> {
        std::fs::create_dir_all(&plan.working_dir).map_err(|e| Error::io(&plan.working_dir, e))?;

        let mut child = Command::new(&plan.executable)
            .args(&plan.arguments)
            .as_game_session(&plan.working_dir)
            .spawn()
            .map_err(|e| Error::io(&plan.executable, e))?;

        let pid = child.id();
        log::info!("Game process started with PID: {}", pid);

        std::thread::Builder::new()
            .name(format!("game-reaper-{}", pid))
            .spawn(move || match child.wait() {
                Ok(status) => log::info!("Game process {} exited: {}", pid, status),
                Err(e) => log::warn!("Failed to wait on game process {}: {}", pid, e),
            })
            .map_err(|e| Error::io(&plan.executable, e))?;

        Ok(pid)
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn spawns_in_working_dir() {
        let tmp = tempfile::tempdir().unwrap();
        let game_dir = tmp.path().join("game");
        let plan = LaunchPlan {
            executable: PathBuf::from("sh"),
            arguments: vec!["-c".to_string(), "touch started".to_string()],
            working_dir: game_dir.clone(),
        };

        let pid = DetachedSpawner.spawn(&plan).unwrap();
        assert!(pid > 0);

        let marker = game_dir.join("started");
        for _ in 0..50 {
            if marker.exists() {
                return;
            }
            std::thread::sleep(std::time::Duration::from_millis(100));
        }
        panic!("child never ran in {:?}", game_dir);
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn exited_child_is_reaped() {
        let tmp = tempfile::tempdir().unwrap();
        let plan = LaunchPlan {
            executable: PathBuf::from("sh"),
            arguments: vec!["-c".to_string(), "exit 0".to_string()],
            working_dir: tmp.path().to_path_buf(),
        };

        let pid = DetachedSpawner.spawn(&plan).unwrap();
        let proc_entry = PathBuf::from(format!("/proc/{}", pid));
        for _ in 0..50 {
            if !proc_entry.exists() {
                return;
            }
            std::thread::sleep(std::time::Duration::from_millis(100));
        }
        panic!("process {} was never reaped", pid);
    }

    #[test]
    fn missing_executable_is_io_error() {
        let tmp = tempfile::tempdir().unwrap();
        let plan = LaunchPlan {
            executable: PathBuf::from("/no/such/java"),
            arguments: vec![],
            working_dir: tmp.path().to_path_buf(),
        };
        assert!(matches!(DetachedSpawner.spawn(&plan), Err(Error::Io { .. })));
    }
}
