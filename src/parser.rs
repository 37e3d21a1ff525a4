use crate::error::{Error, Result};
use crate::scanner::PackageScanner;
use crate::syntax::parse::parse_source;
use crate::syntax::SourceFile;
use log::{debug, warn};
use std::fs;
use std::path::Path;

/// Parser facade turning Go files and package directories into syntax trees.
///
/// Wraps the `syntax` module with file IO and the continue-on-error batch
/// behavior the pipeline relies on: one unparsable file degrades the package,
/// it does not abort the run.
///
/// # Example
///
/// ```no_run
/// use swagger_from_go::parser::GoParser;
/// use std::path::Path;
///
/// let file = GoParser::parse_file(Path::new("routers/router.go")).unwrap();
/// println!("package {}", file.package_name);
/// ```
pub struct GoParser;

impl GoParser {
    /// Parses a single Go source file.
    ///
    /// # Errors
    ///
    /// Returns [`Error::SourceUnreadable`] when the file cannot be read and
    /// [`Error::SyntaxError`] when it cannot be parsed.
    pub fn parse_file(path: &Path) -> Result<SourceFile> {
        debug!("Parsing file: {}", path.display());

        let content = fs::read_to_string(path).map_err(|e| Error::SourceUnreadable {
            file: path.to_path_buf(),
            message: e.to_string(),
        })?;

        let file = parse_source(path, &content).map_err(|e| Error::SyntaxError {
            file: path.to_path_buf(),
            line: e.line,
            message: e.message,
        })?;

        debug!(
            "Parsed {}: package {}, {} types, {} funcs",
            path.display(),
            file.package_name,
            file.types.len(),
            file.funcs.len()
        );

        Ok(file)
    }

    /// Parses every Go source file of one package directory.
    ///
    /// Hidden and `_test.go` files are excluded by the scanner. Files that
    /// fail to parse are logged as warnings and dropped; the remaining files
    /// are returned.
    ///
    /// # Errors
    ///
    /// Returns an error only when the directory itself cannot be scanned.
    pub fn parse_dir(dir: &Path) -> Result<Vec<SourceFile>> {
        debug!("Parsing package directory: {}", dir.display());

        let scanner = PackageScanner::new(dir.to_path_buf());
        let scan_result = scanner.scan()?;

        let mut files = Vec::new();
        for path in &scan_result.go_files {
            match Self::parse_file(path) {
                Ok(file) => files.push(file),
                Err(e) => warn!("Skipping {}: {}", path.display(), e),
            }
        }

        debug!("Parsed {}/{} files in {}", files.len(), scan_result.go_files.len(), dir.display());

        Ok(files)
    }
}
