use std::path::{Path, PathBuf};
use std::sync::{LazyLock, Mutex, MutexGuard};
use tempfile::TempDir;

static CWD_LOCK: LazyLock<Mutex<()>> = LazyLock::new(|| Mutex::new(()));

pub(crate) struct DirGuard {
    original: PathBuf,
    _lock: MutexGuard<'static, ()>,
}

impl DirGuard {
    pub(crate) fn new(new_dir: &Path) -> Self {
        // Changing the process current working directory is global and not thread-safe.
        // Lock it so tests don't race even if a #[serial] annotation is missed.
        let lock = CWD_LOCK.lock().unwrap_or_else(|poison| poison.into_inner());
        let original = std::env::current_dir().unwrap();
        std::env::set_current_dir(new_dir).unwrap();
        Self {
            original,
            _lock: lock,
        }
    }
}

impl Drop for DirGuard {
    fn drop(&mut self) {
        let _ = std::env::set_current_dir(&self.original);
    }
}

/// Two-task checklist in the default layout: T001 in progress, T002 not started.
pub(crate) const SAMPLE_CHECKLIST: &str = "\
# Tasks

- [ ] - **T001: Add login route**
  - [ ] - Dev Status: [In Progress]
  - [ ] - QA Status: [Not Started]
- [ ] - **T002: Password reset email**
  - [ ] - Dev Status: [Not Started]
  - [ ] - QA Status: [Not Started]
";

/// An initialized project (`.taskgate/` present) whose `tasks.md` holds `checklist`.
pub(crate) fn create_test_project(checklist: &str) -> TempDir {
    let temp_dir = TempDir::new().unwrap();
    std::fs::create_dir(temp_dir.path().join(".taskgate")).unwrap();
    std::fs::write(temp_dir.path().join("tasks.md"), checklist).unwrap();
    temp_dir
}
