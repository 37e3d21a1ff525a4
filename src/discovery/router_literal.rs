//! Strategy B: nested router literal.
//!
//! Looks for a function named `New` whose body contains a `Group` call with a
//! function-literal argument. Inside it, nested `Route(prefix, func)` calls
//! open path scopes and HTTP-method calls attach handlers. An assembled route
//! is kept only when a collected operation's `@router` path, joined with the
//! outermost route prefix (the API base), matches it. Comment lines directly
//! above a `Route` call become tag descriptions.

use crate::collector::Collector;
use crate::document::url_replace;
use crate::error::Result;
use crate::swagger::{Item, Operation, Swagger, Tag};
use crate::syntax::{CallArg, CallExpr, SourceFile};
use log::debug;

pub struct RouterLiteralStrategy;

const HTTP_METHODS: &[&str] =
    &["GET", "POST", "PUT", "PATCH", "HEAD", "DELETE", "CONNECT", "OPTIONS", "TRACE"];

impl super::RouteStrategy for RouterLiteralStrategy {
    fn name(&self) -> &'static str {
        "router-literal"
    }

    fn discover(
        &self,
        entry: &SourceFile,
        collector: &Collector,
        doc: &mut Swagger,
    ) -> Result<usize> {
        let Some(new_func) = entry.funcs.iter().find(|f| f.name == "New") else {
            return Ok(0);
        };

        let mut added = 0;
        for call in &new_func.calls {
            if call.callee() != "Group" {
                continue;
            }
            for arg in &call.args {
                let CallArg::FuncLit(calls) = arg else { continue };
                walk_scope(entry, collector, doc, calls, "", None, &mut added);
            }
        }

        if doc.base_path.is_empty() {
            if let Some(base) = outermost_route_prefix(new_func) {
                doc.base_path = base;
            }
        }

        Ok(added)
    }
}

/// The first `Route` prefix under the `Group` call: the API base.
fn outermost_route_prefix(new_func: &crate::syntax::FuncDecl) -> Option<String> {
    for call in &new_func.calls {
        if call.callee() != "Group" {
            continue;
        }
        for arg in &call.args {
            let CallArg::FuncLit(calls) = arg else { continue };
            for inner in calls {
                if inner.callee() == "Route" {
                    if let Some(CallArg::Str(prefix)) = inner.args.first() {
                        return Some(prefix.clone());
                    }
                }
            }
        }
    }
    None
}

/// Recursively walk one route scope.
fn walk_scope(
    entry: &SourceFile,
    collector: &Collector,
    doc: &mut Swagger,
    calls: &[CallExpr],
    prefix: &str,
    base: Option<&str>,
    added: &mut usize,
) {
    for call in calls {
        let callee = call.callee();

        if callee == "Route" {
            let Some(CallArg::Str(part)) = call.args.first() else { continue };
            let new_prefix = format!("{}{}", prefix, part);
            let base_here = base.unwrap_or(part.as_str());

            // a comment on the line above a nested Route call documents the tag
            if base.is_some() {
                if let Some(comment) = entry.comment_on_line(call.line.saturating_sub(1)) {
                    let tag_name = first_segment_under(&new_prefix, base_here);
                    if !tag_name.is_empty() {
                        doc.tags.push(Tag {
                            name: tag_name,
                            description: format!("{}\n", comment.text.trim()),
                        });
                    }
                }
            }

            if let Some(CallArg::FuncLit(inner)) = call.args.get(1) {
                walk_scope(entry, collector, doc, inner, &new_prefix, Some(base_here), added);
            }
            continue;
        }

        let method = callee.to_uppercase();
        if !HTTP_METHODS.contains(&method.as_str()) {
            continue;
        }
        let Some(CallArg::Str(part)) = call.args.first() else { continue };

        let mut full = format!("{}{}", prefix, part);
        while full.len() > 1 && full.ends_with('/') {
            full.pop();
        }
        let internal = to_internal(&full);
        let base_str = base.unwrap_or("");

        let matched = collector.route_ops.iter().find(|(router_path, _)| {
            to_internal(&format!("{}{}", base_str, router_path)) == internal
                || to_internal(router_path) == internal
        });

        let Some((router_path, item)) = matched else {
            debug!("router-literal: no collected operation for {} {}", method, full);
            continue;
        };
        let Some(op) = operation_for(item, &method) else {
            debug!("router-literal: {} collected without method {}", router_path, method);
            continue;
        };

        let mut op = op.clone();
        let tag = first_segment_under(&full, base_str);
        if !tag.is_empty() {
            op.tags.push(tag);
        }

        let key = url_replace(&full);
        debug!("router-literal: attaching {} {}", method, key);
        doc.paths.entry(key).or_default().set_operation(&method, op);
        *added += 1;
    }
}

fn operation_for<'a>(item: &'a Item, method: &str) -> Option<&'a Operation> {
    match method {
        "GET" => item.get.as_ref(),
        "PUT" => item.put.as_ref(),
        "POST" => item.post.as_ref(),
        "DELETE" => item.delete.as_ref(),
        "OPTIONS" => item.options.as_ref(),
        "HEAD" => item.head.as_ref(),
        "PATCH" => item.patch.as_ref(),
        _ => None,
    }
}

/// Rewrite `{x}` path parameters into the internal `:x` form.
fn to_internal(path: &str) -> String {
    path.split('/')
        .map(|segment| {
            if segment.starts_with('{') && segment.ends_with('}') && segment.len() > 2 {
                format!(":{}", &segment[1..segment.len() - 1])
            } else {
                segment.to_string()
            }
        })
        .collect::<Vec<_>>()
        .join("/")
}

/// First path segment of `full` below the API base, used as the tag name.
fn first_segment_under(full: &str, base: &str) -> String {
    let below = full.strip_prefix(base).unwrap_or(full);
    below.split('/').find(|s| !s.is_empty()).unwrap_or("").to_string()
}
