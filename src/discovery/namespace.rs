//! Strategy A: namespace-include registration.
//!
//! Looks for `NewNamespace(version, ...)` calls in the entry file. Nested
//! `NSNamespace(prefix, ...)` calls contribute a path prefix; `NSInclude`
//! arguments name controllers whose collected operations are copied into the
//! document under the assembled path. Tags come from the trimmed prefix, or
//! from the controller key for top-level includes.

use crate::collector::Collector;
use crate::document::url_replace;
use crate::error::Result;
use crate::swagger::{Swagger, Tag};
use crate::syntax::{CallArg, CallExpr, SourceFile};
use log::debug;

pub struct NamespaceStrategy;

impl super::RouteStrategy for NamespaceStrategy {
    fn name(&self) -> &'static str {
        "namespace"
    }

    fn discover(
        &self,
        entry: &SourceFile,
        collector: &Collector,
        doc: &mut Swagger,
    ) -> Result<usize> {
        let mut added = 0;

        for func in &entry.funcs {
            for call in &func.calls {
                if call.callee() != "NewNamespace" {
                    continue;
                }
                let (version, rest) = split_namespace_args(&call.args);
                if doc.base_path.is_empty() && !version.is_empty() {
                    doc.base_path = version.to_string();
                }

                for arg in rest {
                    let CallArg::Call(sub) = arg else { continue };
                    match sub.callee() {
                        "NSNamespace" => {
                            let (prefix, inner) = split_namespace_args(&sub.args);
                            for inner_arg in inner {
                                let CallArg::Call(include) = inner_arg else { continue };
                                if include.callee() != "NSInclude" {
                                    continue;
                                }
                                let cname =
                                    attach_included(collector, doc, version, prefix, include, &mut added);
                                if let Some(desc) = collector.controller_comments.get(&cname) {
                                    doc.tags.push(Tag {
                                        name: prefix.trim_matches('/').to_string(),
                                        description: desc.clone(),
                                    });
                                }
                            }
                        }
                        "NSInclude" => {
                            let cname =
                                attach_included(collector, doc, version, "", sub, &mut added);
                            if let Some(desc) = collector.controller_comments.get(&cname) {
                                // without a prefix the controller key itself names the tag
                                doc.tags.push(Tag { name: cname.clone(), description: desc.clone() });
                            }
                        }
                        _ => {}
                    }
                }
            }
        }

        Ok(added)
    }
}

/// Split namespace-constructor arguments into the leading version/prefix
/// string literal and the remaining arguments.
fn split_namespace_args(args: &[CallArg]) -> (&str, &[CallArg]) {
    match args.first() {
        Some(CallArg::Str(version)) => (version.as_str(), &args[1..]),
        Some(_) => ("", &args[1..]),
        None => ("", args),
    }
}

/// Copy the collected operations of every controller included by `call` into
/// the document, applying the path prefix and attaching tags. Returns the
/// last controller key seen.
fn attach_included(
    collector: &Collector,
    doc: &mut Swagger,
    version: &str,
    baseurl: &str,
    call: &CallExpr,
    added: &mut usize,
) -> String {
    let mut cname = String::new();

    for arg in &call.args {
        let CallArg::CompositeRef(path) = arg else { continue };
        if path.len() >= 2 {
            if let Some(import_path) = collector.imports.get(&path[0]) {
                cname = format!("{}{}", import_path, path[path.len() - 1]);
            }
        }

        let Some(ops) = collector.controller_ops.get(&cname) else { continue };
        for (router_path, item) in ops {
            let tag = if baseurl.is_empty() {
                cname.clone()
            } else {
                baseurl.trim_matches('/').to_string()
            };

            let full = format!("{}{}{}", version, baseurl, router_path);
            let mut item = item.clone();
            for (_, op) in item.operations_mut() {
                op.tags.push(tag.clone());
                *added += 1;
            }

            let key = url_replace(&full);
            debug!("namespace: attaching {} (controller {})", key, cname);
            doc.paths.insert(key, item);
        }
    }

    cname
}

#[cfg(test)]
mod tests {
    use super::super::RouteStrategy;
    use super::*;
    use crate::swagger::Operation;
    use crate::syntax::parse::parse_source;
    use std::path::PathBuf;

    fn entry_file(src: &str) -> SourceFile {
        parse_source(&PathBuf::from("router.go"), src).unwrap()
    }

    fn collector_with_billing() -> Collector {
        let mut collector = Collector::new();
        collector
            .imports
            .insert("controllers".to_string(), "example.com/shop/controllers".to_string());
        collector.controller_comments.insert(
            "example.com/shop/controllersBillingController".to_string(),
            "BillingController manages invoices.\n".to_string(),
        );
        collector.add_operation(
            "example.com/shop/controllersBillingController",
            "/invoices",
            "POST",
            Operation { summary: "create invoice".to_string(), ..Default::default() },
        );
        collector
    }

    const ROUTER_SRC: &str = r#"
package routers

import (
    "example.com/shop/controllers"
)

func init() {
    ns := beego.NewNamespace("/v1",
        beego.NSNamespace("/billing",
            beego.NSInclude(&controllers.BillingController{}),
        ),
    )
    beego.AddNamespace(ns)
}
"#;

    #[test]
    fn test_namespace_include_with_prefix() {
        let entry = entry_file(ROUTER_SRC);
        let collector = collector_with_billing();
        let mut doc = Swagger::default();

        let added = NamespaceStrategy.discover(&entry, &collector, &mut doc).unwrap();

        assert_eq!(added, 1);
        assert_eq!(doc.base_path, "/v1");
        let item = &doc.paths["/v1/billing/invoices"];
        let op = item.post.as_ref().unwrap();
        assert_eq!(op.tags, vec!["billing"]);
        assert_eq!(
            doc.tags,
            vec![Tag {
                name: "billing".to_string(),
                description: "BillingController manages invoices.\n".to_string(),
            }]
        );
    }

    #[test]
    fn test_top_level_include_uses_controller_key_as_tag() {
        let entry = entry_file(
            r#"
package routers

func init() {
    ns := beego.NewNamespace("/v1",
        beego.NSInclude(&controllers.BillingController{}),
    )
}
"#,
        );
        let collector = collector_with_billing();
        let mut doc = Swagger::default();

        NamespaceStrategy.discover(&entry, &collector, &mut doc).unwrap();

        assert!(doc.paths.contains_key("/v1/invoices"));
        assert_eq!(doc.tags[0].name, "example.com/shop/controllersBillingController");
    }

    #[test]
    fn test_path_parameters_are_rewritten() {
        let entry = entry_file(
            r#"
package routers

func init() {
    ns := beego.NewNamespace("/v1",
        beego.NSNamespace("/billing",
            beego.NSInclude(&controllers.BillingController{}),
        ),
    )
}
"#,
        );
        let mut collector = collector_with_billing();
        collector.add_operation(
            "example.com/shop/controllersBillingController",
            "/invoices/:id",
            "GET",
            Operation::default(),
        );
        let mut doc = Swagger::default();

        NamespaceStrategy.discover(&entry, &collector, &mut doc).unwrap();

        assert!(doc.paths.contains_key("/v1/billing/invoices/{id}"));
        assert!(!doc.paths.keys().any(|p| p.contains(':')));
    }

    #[test]
    fn test_no_namespace_call_adds_nothing() {
        let entry = entry_file("package routers\n\nfunc init() {\n}\n");
        let collector = collector_with_billing();
        let mut doc = Swagger::default();

        let added = NamespaceStrategy.discover(&entry, &collector, &mut doc).unwrap();
        assert_eq!(added, 0);
        assert!(doc.paths.is_empty());
    }

    #[test]
    fn test_unknown_controller_is_skipped() {
        let entry = entry_file(ROUTER_SRC);
        let mut collector = collector_with_billing();
        collector.controller_ops.clear();
        let mut doc = Swagger::default();

        let added = NamespaceStrategy.discover(&entry, &collector, &mut doc).unwrap();
        assert_eq!(added, 0);
    }
}
