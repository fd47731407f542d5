//! Service container for dependency injection
//!
//! Wires up all services with their dependencies.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::debug;

use crate::application::services::{CopyVerifier, DefinitionLoader, QueryService};
use crate::application::{ApplicationError, ApplicationResult};
use crate::config::Settings;
use crate::domain::PartTree;
use crate::infrastructure::traits::{FileSystem, RealFileSystem};

/// Container holding all application services.
pub struct ServiceContainer {
    /// Application settings
    pub settings: Arc<Settings>,

    /// Filesystem abstraction
    pub fs: Arc<dyn FileSystem>,

    /// Base for relative input paths given on the command line
    pub project_dir: PathBuf,

    pub loader: DefinitionLoader,
    pub queries: QueryService,
    pub verifier: CopyVerifier,
}

impl ServiceContainer {
    /// Create a new service container with real implementations.
    pub fn new(settings: Settings, project_dir: &Path) -> Self {
        Self::with_deps(settings, project_dir, Arc::new(RealFileSystem))
    }

    /// Create a service container with custom dependencies (for testing).
    pub fn with_deps(settings: Settings, project_dir: &Path, fs: Arc<dyn FileSystem>) -> Self {
        let settings = Arc::new(settings);

        Self {
            loader: DefinitionLoader::new(Arc::clone(&fs)),
            queries: QueryService::new(Arc::clone(&fs)),
            verifier: CopyVerifier::new(),
            settings,
            fs,
            project_dir: project_dir.to_path_buf(),
        }
    }

    /// Resolve an explicit input path against the project directory, falling
    /// back to the configured (already anchored) one.
    fn input_path(&self, explicit: Option<&Path>, configured: &Path) -> PathBuf {
        match explicit {
            Some(path) if path.is_relative() => self.project_dir.join(path),
            Some(path) => path.to_path_buf(),
            None => configured.to_path_buf(),
        }
    }

    /// Load the part tree from `definitions`, or the configured file.
    pub fn load_tree(&self, definitions: Option<&Path>) -> ApplicationResult<PartTree> {
        let path = self.input_path(definitions, &self.settings.definitions_file);
        debug!("load_tree: {}", path.display());
        if self.fs.exists(&path) && !self.fs.is_file(&path) {
            return Err(ApplicationError::OperationFailed {
                context: format!("read definitions: {}", path.display()),
                source: "not a file".into(),
            });
        }
        self.loader.load(&path)
    }

    /// Run the queries in `queries`, or the configured file, against `tree`.
    pub fn run_queries(&self, tree: &PartTree, queries: Option<&Path>) -> ApplicationResult<String> {
        let path = self.input_path(queries, &self.settings.queries_file);
        self.queries.run_file(tree, &path)
    }
}
