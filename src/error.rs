use std::path::PathBuf;

/// Result type alias for the application
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for the application
#[derive(Debug)]
pub enum Error {
    IoError(std::io::Error),
    /// A source file could not be read from disk
    SourceUnreadable { file: PathBuf, message: String },
    /// A source file could not be tokenized or parsed
    SyntaxError { file: PathBuf, line: usize, message: String },
    /// The module manifest (go.mod) is missing or has no module line
    ManifestMissing(PathBuf),
    /// An in-project package was referenced but its directory does not exist
    PackageNotFound { import_path: String },
    /// An annotation line violated the annotation grammar
    InvalidAnnotation(String),
    /// The resolver exceeded its nesting safety cap
    ResolverDepthExceeded { type_name: String },
    /// The Go toolchain root is not configured
    ToolchainRootUnset,
    InvalidArgument(String),
    SerializationError(String),
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Error::IoError(e) => write!(f, "IO error: {}", e),
            Error::SourceUnreadable { file, message } => {
                write!(f, "cannot read source {}: {}", file.display(), message)
            }
            Error::SyntaxError { file, line, message } => {
                write!(f, "syntax error {}:{}: {}", file.display(), line, message)
            }
            Error::ManifestMissing(path) => {
                write!(f, "module manifest not found or invalid: {}", path.display())
            }
            Error::PackageNotFound { import_path } => {
                write!(f, "package {} does not exist in the project", import_path)
            }
            Error::InvalidAnnotation(msg) => write!(f, "invalid annotation: {}", msg),
            Error::ResolverDepthExceeded { type_name } => {
                write!(f, "type nesting too deep while resolving {}", type_name)
            }
            Error::ToolchainRootUnset => {
                write!(f, "toolchain root is not set (GOROOT or --goroot)")
            }
            Error::InvalidArgument(msg) => write!(f, "invalid argument: {}", msg),
            Error::SerializationError(msg) => write!(f, "serialization error: {}", msg),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::IoError(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::IoError(err)
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::SerializationError(format!("JSON serialization error: {}", err))
    }
}

impl From<serde_yaml::Error> for Error {
    fn from(err: serde_yaml::Error) -> Self {
        Error::SerializationError(format!("YAML serialization error: {}", err))
    }
}

impl Error {
    /// Exit code the CLI maps this error to.
    ///
    /// 2 is reserved for an unreadable router entry file, 1 for every other
    /// parse or locate failure.
    pub fn exit_code(&self) -> i32 {
        match self {
            Error::SourceUnreadable { .. } => 2,
            _ => 1,
        }
    }
}
