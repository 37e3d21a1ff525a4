//! Project collaborator: module manifest, package locator, and the
//! standard-library / framework skip rules.

use crate::error::{Error, Result};
use log::debug;
use std::fs;
use std::path::{Path, PathBuf};

const MODFILE_NAME: &str = "go.mod";

/// Import-path roots whose packages carry routing DSLs rather than
/// application code; they are never analyzed.
const FRAMEWORK_ROOTS: &[&str] = &["github.com/astaxie/beego", "github.com/go-chi/chi"];

/// An analyzed Go project: its root directory, module path and the toolchain
/// root used to recognize standard-library imports.
#[derive(Debug)]
pub struct Project {
    root: PathBuf,
    module_path: String,
    goroot: PathBuf,
}

impl Project {
    /// Opens the project at `root`.
    ///
    /// Reads the module path from `go.mod` and takes the toolchain root from
    /// `goroot` or the `GOROOT` environment variable.
    ///
    /// # Errors
    ///
    /// [`Error::ManifestMissing`] when `go.mod` is absent or has no module
    /// line; [`Error::ToolchainRootUnset`] when no toolchain root is
    /// available.
    pub fn open(root: &Path, goroot: Option<PathBuf>) -> Result<Self> {
        let modfile = root.join(MODFILE_NAME);
        let content =
            fs::read_to_string(&modfile).map_err(|_| Error::ManifestMissing(modfile.clone()))?;
        let module_path = parse_module_path(&content).ok_or(Error::ManifestMissing(modfile))?;

        let goroot = match goroot.or_else(|| std::env::var_os("GOROOT").map(PathBuf::from)) {
            Some(p) => p,
            None => return Err(Error::ToolchainRootUnset),
        };

        debug!("Project module path: {}, GOROOT: {}", module_path, goroot.display());

        Ok(Self { root: root.to_path_buf(), module_path, goroot })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn module_path(&self) -> &str {
        &self.module_path
    }

    /// Whether `import_path` names a standard-library package: its source
    /// directory exists under the toolchain root.
    pub fn is_std_package(&self, import_path: &str) -> bool {
        self.goroot.join("src").join(import_path).is_dir()
            || self.goroot.join("src").join("pkg").join(import_path).is_dir()
    }

    /// Whether `import_path` lives under a known framework root.
    pub fn is_framework_package(&self, import_path: &str) -> bool {
        FRAMEWORK_ROOTS.iter().any(|root| import_path.starts_with(root))
    }

    /// Whether `import_path` belongs to this project (shares the module path
    /// prefix).
    pub fn contains(&self, import_path: &str) -> bool {
        import_path == self.module_path
            || import_path.starts_with(&format!("{}/", self.module_path))
    }

    /// Project-relative package path for an in-project import, e.g.
    /// `example.com/shop/models` -> `models`. The module path itself maps to
    /// the empty string.
    pub fn relative_path(&self, import_path: &str) -> Option<String> {
        if !self.contains(import_path) {
            return None;
        }
        Some(import_path[self.module_path.len()..].trim_start_matches('/').to_string())
    }

    /// Source directory of an in-project package, by project-relative path.
    ///
    /// # Errors
    ///
    /// [`Error::PackageNotFound`] when the directory does not exist; a
    /// referenced in-project package that is not on disk would leave dangling
    /// `$ref`s in the document.
    pub fn package_dir(&self, rel_path: &str) -> Result<PathBuf> {
        let dir = if rel_path.is_empty() { self.root.clone() } else { self.root.join(rel_path) };
        if !dir.is_dir() {
            return Err(Error::PackageNotFound { import_path: rel_path.to_string() });
        }
        Ok(dir)
    }
}

/// Extract the module path from go.mod content.
fn parse_module_path(content: &str) -> Option<String> {
    for line in content.lines() {
        let line = line.trim();
        if let Some(rest) = line.strip_prefix("module") {
            let rest = rest.trim();
            if !rest.is_empty() {
                return Some(rest.trim_matches('"').to_string());
            }
        }
    }
    None
}
