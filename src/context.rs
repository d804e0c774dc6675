//! Project context resolution for taskgate.
//!
//! Finds the project root from any working directory and resolves the
//! paths of the per-project state files. Every command and the hook go
//! through this module so that state is always read from, and written to,
//! the same `.taskgate/` directory regardless of where they are invoked.

use crate::config::Config;
use crate::error::{Result, TaskgateError};
use std::env;
use std::path::{Component, Path, PathBuf};

/// State directory name at the project root.
pub const STATE_DIR: &str = ".taskgate";

/// Config file name inside the state directory.
pub const CONFIG_FILE: &str = "config.yaml";

/// Active-scope record file name inside the state directory.
pub const SCOPE_FILE: &str = "active_scope.json";

/// Resolved paths for one project. All paths are absolute.
#[derive(Debug, Clone)]
pub struct ProjectContext {
    /// Directory containing `.taskgate/`.
    pub root: PathBuf,

    /// `{root}/.taskgate/`.
    pub state_dir: PathBuf,
}

impl ProjectContext {
    /// Resolve the project context from the current working directory.
    pub fn resolve() -> Result<Self> {
        let cwd = env::current_dir().map_err(|e| {
            TaskgateError::UserError(format!("failed to get current working directory: {}", e))
        })?;

        Self::resolve_from(&cwd)
    }

    /// Resolve the project context from a specific directory.
    ///
    /// Walks up from `start` to the nearest directory holding a state
    /// directory. When there is none, `start` itself is the root, so an
    /// uninitialized project runs with defaults.
    pub fn resolve_from<P: AsRef<Path>>(start: P) -> Result<Self> {
        let start = start.as_ref();
        let start = if start.is_absolute() {
            start.to_path_buf()
        } else {
            env::current_dir()
                .map_err(|e| {
                    TaskgateError::UserError(format!(
                        "failed to get current working directory: {}",
                        e
                    ))
                })?
                .join(start)
        };

        let root = start
            .ancestors()
            .find(|dir| dir.join(STATE_DIR).is_dir())
            .unwrap_or(&start)
            .to_path_buf();

        Ok(Self::at(root))
    }

    /// Context rooted exactly at `root`, without searching.
    pub fn at(root: PathBuf) -> Self {
        let state_dir = root.join(STATE_DIR);
        Self { root, state_dir }
    }

    /// Whether `taskgate init` has been run here.
    pub fn is_initialized(&self) -> bool {
        self.state_dir.is_dir()
    }

    /// Ensure the project is initialized, returning an error if not.
    pub fn ensure_initialized(&self) -> Result<()> {
        if !self.is_initialized() {
            return Err(TaskgateError::UserError(format!(
                "taskgate is not initialized.\n\
                 Expected state directory at: {}\n\n\
                 Run `taskgate init` in the project root.",
                self.state_dir.display()
            )));
        }
        Ok(())
    }

    /// Get the path to the config file.
    pub fn config_path(&self) -> PathBuf {
        self.state_dir.join(CONFIG_FILE)
    }

    /// Get the path to the active-scope record.
    pub fn scope_path(&self) -> PathBuf {
        self.state_dir.join(SCOPE_FILE)
    }

    /// Absolute path of the checklist file named by `config`.
    pub fn task_file_path(&self, config: &Config) -> PathBuf {
        self.root.join(&config.task_file)
    }

    /// Load the config, falling back to defaults when the file is missing.
    pub fn load_config(&self) -> Result<Config> {
        Config::load_or_default(self.config_path())
    }

    /// Read the checklist text.
    pub fn read_task_file(&self, config: &Config) -> Result<String> {
        let path = self.task_file_path(config);
        std::fs::read_to_string(&path).map_err(|e| TaskgateError::io(path, e))
    }

    /// Express `path` relative to the project root, with forward slashes.
    ///
    /// `.` segments are dropped and `..` segments are resolved lexically, so
    /// `docs/../src/main.rs` comes back as `src/main.rs`. A path that climbs
    /// above the root keeps its leading `..`. Absolute paths outside the root
    /// are returned unchanged.
    pub fn relative_path(&self, path: &str) -> String {
        let path = path.trim().replace('\\', "/");
        let candidate = Path::new(&path);
        let relative = if candidate.is_absolute() {
            match candidate.strip_prefix(&self.root) {
                Ok(relative) => relative,
                Err(_) => return path,
            }
        } else {
            candidate
        };

        let mut parts: Vec<String> = Vec::new();
        for component in relative.components() {
            match component {
                Component::CurDir => {}
                Component::ParentDir => {
                    if parts.last().is_some_and(|p| p != "..") {
                        parts.pop();
                    } else {
                        parts.push("..".to_string());
                    }
                }
                other => parts.push(other.as_os_str().to_string_lossy().into_owned()),
            }
        }
        parts.join("/")
    }
}

/// Convenience function to resolve context and ensure the project is initialized.
pub fn require_initialized_project() -> Result<ProjectContext> {
    let ctx = ProjectContext::resolve()?;
    ctx.ensure_initialized()?;
    Ok(ctx)
}

/// Convenience function to resolve context without requiring initialization.
pub fn resolve_context() -> Result<ProjectContext> {
    ProjectContext::resolve()
}
