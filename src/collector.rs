//! Run context: every table the generator fills while walking a project.
//!
//! One `Collector` value is created per run and threaded through the
//! collection, resolution and discovery phases. Entries are only ever added,
//! never removed; the visited sets are what guarantee the resolver and the
//! package walk terminate.

use crate::swagger::{Item, Operation, Schema};
use crate::syntax::SourceFile;
use indexmap::IndexMap;
use std::collections::{HashMap, HashSet};

/// Process-scoped tables for one generator run
#[derive(Default)]
pub struct Collector {
    /// Import paths whose packages were already parsed and walked
    pub visited_packages: HashSet<String>,
    /// Controller key (import path + type name) -> doc comment text
    pub controller_comments: HashMap<String, String>,
    /// Local import name -> import path, gathered from the entry file
    pub imports: HashMap<String, String>,
    /// Controller key -> router path -> method slots, for namespace discovery
    pub controller_ops: HashMap<String, IndexMap<String, Item>>,
    /// Router path -> method slots across all controllers, for router-literal
    /// discovery
    pub route_ops: IndexMap<String, Item>,
    /// Canonical schema name -> definition
    pub definitions: IndexMap<String, Schema>,
    /// Fully-expanded type keys (`rel/path.Type`), the resolver's visited set
    pub resolved_types: HashSet<String>,
    /// Parsed package cache, keyed by project-relative path
    pub packages: HashMap<String, Vec<SourceFile>>,
}

impl Collector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one built operation under both discovery views.
    pub fn add_operation(
        &mut self,
        controller_key: &str,
        router_path: &str,
        method: &str,
        op: Operation,
    ) {
        self.controller_ops
            .entry(controller_key.to_string())
            .or_default()
            .entry(router_path.to_string())
            .or_default()
            .set_operation(method, op.clone());
        self.route_ops.entry(router_path.to_string()).or_default().set_operation(method, op);
    }
}
