use crate::collector::Collector;
use crate::discovery::{discover_routes, StrategyKind};
use crate::document;
use crate::error::{Error, Result};
use crate::operation::collect_package;
use crate::parser::GoParser;
use crate::postman;
use crate::project::Project;
use crate::resolver::Resolver;
use crate::serializer;
use crate::tag::TagPrecedence;
use clap::{Parser, ValueEnum};
use log::{debug, info};
use std::path::PathBuf;

/// Conventional entry file locations, probed in order when none is given
const DEFAULT_ENTRY_FILES: &[&str] = &["routers/router.go", "pkg/router/routes.go"];

/// Generate Swagger 2.0 documentation from an annotated Go web project
#[derive(Parser, Debug)]
#[command(name = "swagger-from-go")]
#[command(author, version, about, long_about = None)]
pub struct CliArgs {
    /// Path to the Go project root (must contain go.mod)
    #[arg(value_name = "PROJECT_PATH")]
    pub project_path: PathBuf,

    /// Router entry file, relative to the project root
    #[arg(short = 'e', long = "entry", value_name = "FILE")]
    pub entry: Option<PathBuf>,

    /// Route discovery strategy
    #[arg(short = 's', long = "strategy", value_enum, default_value = "auto")]
    pub strategy: Strategy,

    /// Go toolchain root (defaults to the GOROOT environment variable)
    #[arg(long = "goroot", value_name = "DIR")]
    pub goroot: Option<PathBuf>,

    /// Which codec tag names a struct field when both are present
    #[arg(long = "tag-precedence", value_enum, default_value = "thrift")]
    pub tag_precedence: TagPrecedenceArg,

    /// Output directory (defaults to <project>/swagger)
    #[arg(short = 'o', long = "output", value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Skip writing the Postman collection
    #[arg(long = "skip-postman")]
    pub skip_postman: bool,

    /// Collection item group to sort first in the Postman output
    #[arg(long = "pin-collection", value_name = "NAME")]
    pub pin_collection: Option<String>,

    /// Enable verbose output
    #[arg(short = 'v', long = "verbose")]
    pub verbose: bool,
}

/// Route discovery strategy options
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum Strategy {
    /// Try both strategies; exactly one must match
    Auto,
    /// Namespace-include registration
    Namespace,
    /// Nested router literal
    #[value(name = "router-literal")]
    RouterLiteral,
}

impl From<Strategy> for StrategyKind {
    fn from(value: Strategy) -> Self {
        match value {
            Strategy::Auto => StrategyKind::Auto,
            Strategy::Namespace => StrategyKind::Namespace,
            Strategy::RouterLiteral => StrategyKind::RouterLiteral,
        }
    }
}

/// Tag precedence options
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum TagPrecedenceArg {
    /// thrift tag name wins over json
    Thrift,
    /// json tag name wins over thrift
    Json,
}

impl From<TagPrecedenceArg> for TagPrecedence {
    fn from(value: TagPrecedenceArg) -> Self {
        match value {
            TagPrecedenceArg::Thrift => TagPrecedence::ThriftFirst,
            TagPrecedenceArg::Json => TagPrecedence::JsonFirst,
        }
    }
}

/// Validate already-parsed arguments.
pub fn validate_args(args: CliArgs) -> Result<CliArgs> {
    debug!("Parsed arguments: {:?}", args);

    if !args.project_path.exists() {
        return Err(Error::InvalidArgument(format!(
            "project path does not exist: {}",
            args.project_path.display()
        )));
    }
    if !args.project_path.is_dir() {
        return Err(Error::InvalidArgument(format!(
            "project path is not a directory: {}",
            args.project_path.display()
        )));
    }

    info!("Project path: {}", args.project_path.display());
    Ok(args)
}

/// Run the whole generation workflow.
pub fn run(args: CliArgs) -> Result<()> {
    info!("Starting Swagger document generation...");

    // Step 1: open the project (module manifest + toolchain root)
    let project = Project::open(&args.project_path, args.goroot.clone())?;
    info!("Module path: {}", project.module_path());

    // Step 2: locate and parse the router entry file
    let entry_path = match &args.entry {
        Some(entry) => args.project_path.join(entry),
        None => {
            let found = DEFAULT_ENTRY_FILES
                .iter()
                .map(|candidate| args.project_path.join(candidate))
                .find(|p| p.is_file());
            match found {
                Some(p) => p,
                None => args.project_path.join(DEFAULT_ENTRY_FILES[0]),
            }
        }
    };
    info!("Entry file: {}", entry_path.display());
    let entry = GoParser::parse_file(&entry_path)?;

    // Step 3: info block from the entry file's comments
    let mut doc = document::new_document();
    document::apply_info_annotations(&mut doc, &entry);

    // Step 4: walk every package the entry file imports, building operations
    let resolver = Resolver::new(&project, args.tag_precedence.into());
    let mut collector = Collector::new();
    for import in &entry.imports {
        collect_package(
            &project,
            &resolver,
            &mut collector,
            import.alias.as_deref(),
            &import.path,
        )?;
    }
    info!(
        "Collected {} route paths across {} packages",
        collector.route_ops.len(),
        collector.visited_packages.len()
    );

    // Step 5: route discovery
    discover_routes(args.strategy.into(), &entry, &collector, &mut doc)?;
    info!("Document has {} paths", doc.paths.len());

    // Step 6: final merge and validation
    document::finalize(&mut doc, &collector);

    // Step 7: emit
    let output_dir =
        args.output_dir.clone().unwrap_or_else(|| args.project_path.join("swagger"));
    let collection = if args.skip_postman {
        None
    } else {
        Some(postman::translate(&doc, args.pin_collection.as_deref()))
    };
    serializer::emit(&output_dir, &doc, collection.as_ref())?;

    info!("Generation complete: {} paths, {} definitions", doc.paths.len(), doc.definitions.len());
    Ok(())
}
