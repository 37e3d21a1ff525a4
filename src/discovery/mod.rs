//! Route discovery: attaching collected operations to document paths.
//!
//! Two registration idioms are supported, behind one interface: namespace
//! includes (versioned namespace constructors including controller values)
//! and nested router literals (a `New` function registering handlers through
//! nested `Route` scopes). The caller picks a strategy or lets auto mode
//! require that exactly one of them matches the entry file.

pub mod namespace;
pub mod router_literal;

use crate::collector::Collector;
use crate::error::{Error, Result};
use crate::swagger::Swagger;
use crate::syntax::SourceFile;
use log::{debug, info};

pub use namespace::NamespaceStrategy;
pub use router_literal::RouterLiteralStrategy;

/// A route-discovery strategy: reads the entry file and the collected
/// operations, writes paths and tags into the document. Returns the number of
/// operations attached.
pub trait RouteStrategy {
    fn name(&self) -> &'static str;
    fn discover(&self, entry: &SourceFile, collector: &Collector, doc: &mut Swagger)
        -> Result<usize>;
}

/// Strategy selection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StrategyKind {
    /// Try both; exactly one must produce results
    Auto,
    Namespace,
    RouterLiteral,
}

/// Run route discovery with the selected strategy.
pub fn discover_routes(
    kind: StrategyKind,
    entry: &SourceFile,
    collector: &Collector,
    doc: &mut Swagger,
) -> Result<()> {
    match kind {
        StrategyKind::Namespace => {
            let added = NamespaceStrategy.discover(entry, collector, doc)?;
            info!("namespace discovery attached {} operations", added);
            Ok(())
        }
        StrategyKind::RouterLiteral => {
            let added = RouterLiteralStrategy.discover(entry, collector, doc)?;
            info!("router-literal discovery attached {} operations", added);
            Ok(())
        }
        StrategyKind::Auto => {
            let mut ns_doc = doc.clone();
            let ns_added = NamespaceStrategy.discover(entry, collector, &mut ns_doc)?;
            let mut rl_doc = doc.clone();
            let rl_added = RouterLiteralStrategy.discover(entry, collector, &mut rl_doc)?;
            debug!("auto discovery: namespace={}, router-literal={}", ns_added, rl_added);

            match (ns_added > 0, rl_added > 0) {
                (true, false) => {
                    info!("auto discovery selected the namespace strategy ({} operations)", ns_added);
                    *doc = ns_doc;
                    Ok(())
                }
                (false, true) => {
                    info!(
                        "auto discovery selected the router-literal strategy ({} operations)",
                        rl_added
                    );
                    *doc = rl_doc;
                    Ok(())
                }
                (true, true) => Err(Error::InvalidArgument(
                    "both route strategies matched the entry file; pass --strategy to pick one"
                        .to_string(),
                )),
                (false, false) => Err(Error::InvalidArgument(
                    "no route registrations found in the entry file".to_string(),
                )),
            }
        }
    }
}
