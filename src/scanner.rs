use crate::error::Result;
use log::warn;
use std::path::PathBuf;
use walkdir::WalkDir;

/// File scanner for one Go package directory.
///
/// A Go package is a single directory; the scanner lists its `.go` sources
/// without descending into subdirectories (those are different packages). It
/// skips hidden files and `_test.go` files, matching the filter the analysis
/// applies everywhere.
///
/// # Example
///
/// ```no_run
/// use swagger_from_go::scanner::PackageScanner;
/// use std::path::PathBuf;
///
/// let scanner = PackageScanner::new(PathBuf::from("./project/models"));
/// let result = scanner.scan().unwrap();
/// println!("Found {} Go files", result.go_files.len());
/// ```
pub struct PackageScanner {
    dir: PathBuf,
}

/// Result of a package directory scan
pub struct ScanResult {
    /// Paths of the package's `.go` sources, sorted by file name
    pub go_files: Vec<PathBuf>,
    /// Warnings for entries that could not be accessed
    pub warnings: Vec<String>,
}

impl PackageScanner {
    /// Creates a scanner for the given package directory.
    pub fn new(dir: PathBuf) -> Self {
        Self { dir }
    }

    /// Lists the package's Go source files.
    ///
    /// Hidden files (leading `.`) and `_test.go` files are skipped. Entries
    /// that cannot be read are recorded as warnings and scanning continues.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory itself cannot be accessed.
    pub fn scan(&self) -> Result<ScanResult> {
        let mut go_files = Vec::new();
        let mut warnings = Vec::new();

        for entry in WalkDir::new(&self.dir).min_depth(1).max_depth(1).sort_by_file_name() {
            match entry {
                Ok(entry) => {
                    let path = entry.path();
                    if !path.is_file() {
                        continue;
                    }
                    let name = entry.file_name().to_string_lossy();
                    if name.starts_with('.') || name.ends_with("_test.go") {
                        continue;
                    }
                    if name.ends_with(".go") {
                        go_files.push(path.to_path_buf());
                    }
                }
                Err(e) => {
                    let warning = format!("Failed to access path: {}", e);
                    warn!("{}", warning);
                    warnings.push(warning);
                }
            }
        }

        Ok(ScanResult { go_files, warnings })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_scan_lists_go_files() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();

        fs::write(root.join("item.go"), "package models").unwrap();
        fs::write(root.join("price.go"), "package models").unwrap();
        fs::write(root.join("README.md"), "# models").unwrap();

        let scanner = PackageScanner::new(root.to_path_buf());
        let result = scanner.scan().unwrap();

        assert_eq!(result.go_files.len(), 2);
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn test_scan_skips_test_and_hidden_files() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();

        fs::write(root.join("item.go"), "package models").unwrap();
        fs::write(root.join("item_test.go"), "package models").unwrap();
        fs::write(root.join(".draft.go"), "package models").unwrap();

        let scanner = PackageScanner::new(root.to_path_buf());
        let result = scanner.scan().unwrap();

        assert_eq!(result.go_files.len(), 1);
        assert_eq!(result.go_files[0].file_name().unwrap().to_string_lossy(), "item.go");
    }

    #[test]
    fn test_scan_does_not_descend_into_subpackages() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();

        fs::write(root.join("item.go"), "package models").unwrap();
        fs::create_dir(root.join("sub")).unwrap();
        fs::write(root.join("sub/other.go"), "package sub").unwrap();

        let scanner = PackageScanner::new(root.to_path_buf());
        let result = scanner.scan().unwrap();

        assert_eq!(result.go_files.len(), 1);
    }

    #[test]
    fn test_scan_empty_directory() {
        let temp_dir = TempDir::new().unwrap();
        let scanner = PackageScanner::new(temp_dir.path().to_path_buf());
        let result = scanner.scan().unwrap();

        assert!(result.go_files.is_empty());
        assert!(result.warnings.is_empty());
    }
}
