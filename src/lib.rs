//! swagger-from-go - Swagger 2.0 documentation from annotated Go web projects.
//!
//! This library statically analyzes the source of a Go web service and emits a
//! Swagger 2.0 description of its HTTP API plus a derived Postman collection.
//! It never runs the service: everything comes from syntax trees and the
//! structured `@`-annotations embedded in comments.
//!
//! # Pipeline
//!
//! 1. [`scanner`] / [`parser`] - read a package directory into syntax trees
//! 2. [`annotation`] - classify one comment line into a typed annotation
//! 3. [`operation`] - assemble an operation from a function's annotation block
//! 4. [`resolver`] - resolve referenced types transitively into definitions
//! 5. [`discovery`] - attach operations to paths via one of two router idioms
//! 6. [`document`] - merge info, tags, paths and definitions; validate
//! 7. [`postman`] - translate the finished document into a collection
//! 8. [`serializer`] - write JSON and YAML side by side
//!
//! # Example
//!
//! ```no_run
//! use swagger_from_go::collector::Collector;
//! use swagger_from_go::discovery::{discover_routes, StrategyKind};
//! use swagger_from_go::operation::collect_package;
//! use swagger_from_go::parser::GoParser;
//! use swagger_from_go::project::Project;
//! use swagger_from_go::resolver::Resolver;
//! use swagger_from_go::tag::TagPrecedence;
//! use swagger_from_go::document;
//! use std::path::Path;
//!
//! let root = Path::new("./my-go-service");
//! let project = Project::open(root, None).unwrap();
//! let entry = GoParser::parse_file(&root.join("routers/router.go")).unwrap();
//!
//! let mut doc = document::new_document();
//! document::apply_info_annotations(&mut doc, &entry);
//!
//! let resolver = Resolver::new(&project, TagPrecedence::ThriftFirst);
//! let mut collector = Collector::new();
//! for import in &entry.imports {
//!     collect_package(&project, &resolver, &mut collector,
//!                     import.alias.as_deref(), &import.path).unwrap();
//! }
//!
//! discover_routes(StrategyKind::Auto, &entry, &collector, &mut doc).unwrap();
//! document::finalize(&mut doc, &collector);
//! ```

pub mod annotation;
pub mod cli;
pub mod collector;
pub mod discovery;
pub mod document;
pub mod error;
pub mod operation;
pub mod parser;
pub mod postman;
pub mod project;
pub mod resolver;
pub mod scanner;
pub mod serializer;
pub mod swagger;
pub mod syntax;
pub mod tag;
