//! Type resolver: turns Go type expressions into schema fragments and closes
//! the definition set transitively across packages.
//!
//! Resolution never aborts on an unknown shape; it logs and emits an empty
//! property so the rest of the document stays complete. Termination is
//! guaranteed by the resolved-type set (one expansion per fully-qualified
//! name) plus a recursion depth cap for pathological nesting.

use crate::collector::Collector;
use crate::error::{Error, Result};
use crate::parser::GoParser;
use crate::project::Project;
use crate::swagger::{Property, Schema};
use crate::syntax::{SourceFile, StructField, TypeDecl, TypeExpr};
use crate::tag::{FieldName, StructTag, TagPrecedence};
use indexmap::IndexMap;
use log::{debug, warn};
use std::collections::{HashMap, VecDeque};

const MAX_DEPTH: usize = 64;

/// Basic type table: Go spelling -> (type, format).
///
/// The swagger spelling `integer` is included so `@Param`/`@Success`
/// references to it pick up the 64-bit format.
pub fn basic_type(name: &str) -> Option<(&'static str, &'static str)> {
    let pair = match name {
        "bool" => ("boolean", ""),
        "uint" | "uint8" | "uint16" | "uint32" => ("integer", "int32"),
        "int8" | "int16" | "int32" => ("integer", "int32"),
        "uint64" | "int" | "int64" | "uintptr" | "integer" => ("integer", "int64"),
        "float32" | "complex64" => ("number", "float"),
        "float64" | "complex128" => ("number", "double"),
        "string" => ("string", ""),
        "byte" | "rune" => ("string", "byte"),
        "time.Time" => ("string", "datetime"),
        _ => return None,
    };
    Some(pair)
}

/// A type still to be expanded into `definitions`: a project-relative package
/// path plus the type name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingRef {
    pub rel_path: String,
    pub type_name: String,
}

impl PendingRef {
    fn key(&self) -> String {
        format!("{}.{}", self.rel_path, self.type_name)
    }
}

/// Resolution scope: the package and file a type expression was read from
struct Scope {
    package_name: String,
    rel_path: String,
    /// Local import name -> project-relative path, in-project imports only,
    /// plus the package's own name
    path_info: HashMap<String, String>,
    files: Vec<SourceFile>,
}

impl Scope {
    /// Canonical package segment: the last segment of the package path, or
    /// the package clause name for the root package.
    fn canonical_pkg(&self) -> &str {
        canonical_pkg_segment(&self.rel_path, &self.package_name)
    }
}

fn canonical_pkg_segment<'a>(rel_path: &'a str, package_name: &'a str) -> &'a str {
    match rel_path.rsplit('/').next() {
        Some(seg) if !seg.is_empty() => seg,
        _ => package_name,
    }
}

/// The resolver proper. Holds configuration; all mutable state lives in the
/// [`Collector`] passed to every call.
pub struct Resolver<'a> {
    project: &'a Project,
    precedence: TagPrecedence,
}

impl<'a> Resolver<'a> {
    pub fn new(project: &'a Project, precedence: TagPrecedence) -> Self {
        Self { project, precedence }
    }

    /// Resolve an annotation type reference like `model.Item` (or a bare
    /// `Item` in the root package): build its schema, add it to the
    /// definitions table and transitively expand everything it references.
    ///
    /// Returns the canonical definition name to use in `$ref` strings.
    pub fn resolve_model(&self, collector: &mut Collector, type_ref: &str) -> Result<String> {
        let first = annotation_ref(type_ref);
        let (canonical, pending) = self.expand_one(collector, &first)?;
        self.expand_pending(collector, pending)?;
        Ok(canonical)
    }

    /// Breadth-first worklist expansion of pending references.
    pub fn expand_pending(
        &self,
        collector: &mut Collector,
        pending: Vec<PendingRef>,
    ) -> Result<()> {
        let mut pending: VecDeque<PendingRef> = pending.into();
        while let Some(next) = pending.pop_front() {
            let (_, more) = self.expand_one(collector, &next)?;
            pending.extend(more);
        }
        Ok(())
    }

    /// Expand a single reference. A second request for an already-expanded
    /// name is a no-op that still reports the canonical name.
    fn expand_one(
        &self,
        collector: &mut Collector,
        pending_ref: &PendingRef,
    ) -> Result<(String, Vec<PendingRef>)> {
        let files = self.load_package(collector, &pending_ref.rel_path)?;

        let located = files.iter().enumerate().find_map(|(idx, file)| {
            file.find_type(&pending_ref.type_name).map(|decl| (idx, decl.clone()))
        });

        let (file_idx, decl) = match located {
            Some(found) => found,
            None => {
                warn!("can't find the object: {}", pending_ref.key());
                let package_name =
                    files.first().map(|f| f.package_name.clone()).unwrap_or_default();
                let canonical = format!(
                    "{}.{}",
                    canonical_pkg_segment(&pending_ref.rel_path, &package_name),
                    pending_ref.type_name
                );
                collector.resolved_types.insert(pending_ref.key());
                collector.definitions.entry(canonical.clone()).or_insert_with(|| Schema {
                    schema_type: "object".to_string(),
                    ..Default::default()
                });
                return Ok((canonical, Vec::new()));
            }
        };

        let scope = self.scope_for(&files, file_idx, &pending_ref.rel_path);
        let canonical = format!("{}.{}", scope.canonical_pkg(), pending_ref.type_name);

        if !collector.resolved_types.insert(pending_ref.key()) {
            debug!("{} already resolved", canonical);
            return Ok((canonical, Vec::new()));
        }

        debug!("Expanding {} -> {}", pending_ref.key(), canonical);

        let mut pending = Vec::new();
        let schema = self.build_schema(collector, &decl, &scope, &mut pending, 0)?;
        if schema.title.is_empty() {
            warn!("unresolved schema title for {}", canonical);
        }
        collector.definitions.insert(canonical.clone(), schema);

        Ok((canonical, pending))
    }

    /// Build the schema for one type declaration.
    fn build_schema(
        &self,
        collector: &mut Collector,
        decl: &TypeDecl,
        scope: &Scope,
        pending: &mut Vec<PendingRef>,
        depth: usize,
    ) -> Result<Schema> {
        if depth > MAX_DEPTH {
            return Err(Error::ResolverDepthExceeded { type_name: decl.name.clone() });
        }

        let mut schema = Schema { schema_type: "object".to_string(), ..Default::default() };

        match &decl.expr {
            TypeExpr::Struct(fields) => {
                schema.title = decl.name.clone();
                schema.properties = Some(IndexMap::new());
                self.build_struct_properties(collector, fields, scope, &mut schema, pending, depth)?;
            }
            TypeExpr::Ident(_) => {
                // alias of a primitive or of another named type
                schema.title = decl.name.clone();
                let prop = self.resolve_expr(collector, &decl.expr, scope, pending, depth + 1)?;
                schema.schema_type = prop.property_type;
                schema.format = prop.format;
                schema.reference = prop.reference;
                schema.properties = prop.properties;
            }
            other => {
                warn!("{:?} type is not supported yet", other);
            }
        }

        Ok(schema)
    }

    /// Walk struct fields into `schema`: embedded fields merge, named fields
    /// resolve with tag handling.
    fn build_struct_properties(
        &self,
        collector: &mut Collector,
        fields: &[StructField],
        scope: &Scope,
        schema: &mut Schema,
        pending: &mut Vec<PendingRef>,
        depth: usize,
    ) -> Result<()> {
        for field in fields {
            if field.is_embedded() {
                self.merge_embedded(collector, field, scope, schema, pending, depth)?;
                continue;
            }

            for name in &field.names {
                let mut prop =
                    self.resolve_expr(collector, &field.expr, scope, pending, depth + 1)?;

                let key = match &field.tag {
                    None => name.clone(),
                    Some(raw) => {
                        let tag = StructTag::parse(raw);
                        let key = match tag.field_name(self.precedence) {
                            FieldName::Dropped => continue,
                            FieldName::FromTag(tag_name) => tag_name,
                            FieldName::FromSource => name.clone(),
                        };
                        if tag.required() {
                            schema.required.push(key.clone());
                        }
                        if let Some(desc) = tag.description() {
                            prop.description = desc.to_string();
                        }
                        key
                    }
                };

                if let Some(props) = schema.properties.as_mut() {
                    props.insert(key, prop);
                }
            }
        }
        Ok(())
    }

    /// Merge an embedded field's properties into the enclosing schema.
    ///
    /// Lookup is scoped: the declaring package first, then the enclosing
    /// file's import map for qualified embeds.
    fn merge_embedded(
        &self,
        collector: &mut Collector,
        field: &StructField,
        scope: &Scope,
        schema: &mut Schema,
        pending: &mut Vec<PendingRef>,
        depth: usize,
    ) -> Result<()> {
        let mut expr = &field.expr;
        if let TypeExpr::Pointer(inner) = expr {
            expr = inner.as_ref();
        }

        let embedded = match expr {
            TypeExpr::Ident(name) => scope
                .files
                .iter()
                .find_map(|f| f.find_type(name))
                .map(|decl| (decl.clone(), None)),
            TypeExpr::Selector { pkg, name } => {
                let rel = match scope.path_info.get(pkg) {
                    Some(rel) => rel.clone(),
                    None => pkg.clone(),
                };
                let files = self.load_package(collector, &rel)?;
                let located = files.iter().enumerate().find_map(|(idx, file)| {
                    file.find_type(name).map(|decl| (idx, decl.clone()))
                });
                located.map(|(idx, decl)| {
                    let foreign = self.scope_for(&files, idx, &rel);
                    (decl, Some(foreign))
                })
            }
            _ => None,
        };

        let (decl, foreign_scope) = match embedded {
            Some(found) => found,
            None => {
                warn!("embedded field {:?} not found, skipping", field.expr);
                return Ok(());
            }
        };

        let inner_scope = foreign_scope.as_ref().unwrap_or(scope);
        let merged =
            self.build_schema(collector, &decl, inner_scope, pending, depth + 1)?;
        if let (Some(props), Some(merged_props)) = (schema.properties.as_mut(), merged.properties) {
            for (key, prop) in merged_props {
                props.insert(key, prop);
            }
        }
        schema.required.extend(merged.required);
        Ok(())
    }

    /// Resolve one type expression into the in-place property shape,
    /// recording further references in `pending`.
    fn resolve_expr(
        &self,
        collector: &mut Collector,
        expr: &TypeExpr,
        scope: &Scope,
        pending: &mut Vec<PendingRef>,
        depth: usize,
    ) -> Result<Property> {
        if depth > MAX_DEPTH {
            return Err(Error::ResolverDepthExceeded { type_name: format!("{:?}", expr) });
        }

        match expr {
            TypeExpr::Ident(name) => {
                if let Some((ty, format)) = basic_type(name) {
                    return Ok(Property::primitive(ty, format));
                }
                match scope.files.iter().find_map(|f| f.find_type(name)).cloned() {
                    Some(decl) => {
                        if matches!(decl.expr, TypeExpr::Struct(_)) {
                            pending.push(PendingRef {
                                rel_path: scope.rel_path.clone(),
                                type_name: name.clone(),
                            });
                            Ok(Property::reference(&format!("{}.{}", scope.canonical_pkg(), name)))
                        } else {
                            // transparent alias
                            self.resolve_expr(collector, &decl.expr, scope, pending, depth + 1)
                        }
                    }
                    None => {
                        warn!("unknown type {} in package {}", name, scope.package_name);
                        Ok(Property::default())
                    }
                }
            }
            TypeExpr::Selector { pkg, name } => {
                if let Some((ty, format)) = basic_type(&format!("{}.{}", pkg, name)) {
                    return Ok(Property::primitive(ty, format));
                }
                let rel = match scope.path_info.get(pkg) {
                    Some(rel) => rel.clone(),
                    None => pkg.clone(),
                };
                let canonical_pkg = canonical_pkg_segment(&rel, pkg);
                pending.push(PendingRef { rel_path: rel.clone(), type_name: name.clone() });
                Ok(Property::reference(&format!("{}.{}", canonical_pkg, name)))
            }
            TypeExpr::Pointer(inner) => match inner.as_ref() {
                TypeExpr::Ident(name) => {
                    if let Some((ty, format)) = basic_type(name) {
                        return Ok(Property::primitive(ty, format));
                    }
                    pending.push(PendingRef {
                        rel_path: scope.rel_path.clone(),
                        type_name: name.clone(),
                    });
                    Ok(Property::reference(&format!("{}.{}", scope.canonical_pkg(), name)))
                }
                TypeExpr::Selector { .. } => {
                    self.resolve_expr(collector, inner, scope, pending, depth + 1)
                }
                other => self.resolve_expr(collector, other, scope, pending, depth + 1),
            },
            TypeExpr::Slice(elem) => {
                let items = self.resolve_expr(collector, elem, scope, pending, depth + 1)?;
                Ok(Property {
                    property_type: "array".to_string(),
                    items: Some(Box::new(items)),
                    ..Default::default()
                })
            }
            TypeExpr::Map { key, value } => {
                if !matches!(key.as_ref(), TypeExpr::Ident(k) if k == "string") {
                    warn!("map keys must be strings, got {:?}", key);
                    return Ok(Property::default());
                }
                let value = self.resolve_expr(collector, value, scope, pending, depth + 1)?;
                Ok(Property {
                    property_type: "object".to_string(),
                    additional_properties: Some(Box::new(value)),
                    ..Default::default()
                })
            }
            TypeExpr::Struct(fields) => {
                self.inline_struct(collector, fields, scope, pending, depth)
            }
            TypeExpr::Unsupported(keyword) => {
                warn!("{} type is not supported yet", keyword);
                Ok(Property::default())
            }
        }
    }

    /// Inline anonymous struct: named fields only, tag names apply but
    /// required markers have no schema to land in.
    fn inline_struct(
        &self,
        collector: &mut Collector,
        fields: &[StructField],
        scope: &Scope,
        pending: &mut Vec<PendingRef>,
        depth: usize,
    ) -> Result<Property> {
        let mut props = IndexMap::new();
        for field in fields {
            if field.is_embedded() {
                warn!("unnamed field in anonymous struct is not supported");
                continue;
            }
            for name in &field.names {
                let mut prop =
                    self.resolve_expr(collector, &field.expr, scope, pending, depth + 1)?;
                let key = match &field.tag {
                    None => name.clone(),
                    Some(raw) => {
                        let tag = StructTag::parse(raw);
                        match tag.field_name(self.precedence) {
                            FieldName::Dropped => continue,
                            FieldName::FromTag(tag_name) => {
                                if let Some(desc) = tag.description() {
                                    prop.description = desc.to_string();
                                }
                                tag_name
                            }
                            FieldName::FromSource => {
                                if let Some(desc) = tag.description() {
                                    prop.description = desc.to_string();
                                }
                                name.clone()
                            }
                        }
                    }
                };
                props.insert(key, prop);
            }
        }
        Ok(Property {
            property_type: "object".to_string(),
            properties: Some(props),
            ..Default::default()
        })
    }

    /// Package files by project-relative path, parsed once per run.
    fn load_package(&self, collector: &mut Collector, rel_path: &str) -> Result<Vec<SourceFile>> {
        if let Some(files) = collector.packages.get(rel_path) {
            return Ok(files.clone());
        }
        let dir = self.project.package_dir(rel_path)?;
        let files = GoParser::parse_dir(&dir)?;
        collector.packages.insert(rel_path.to_string(), files.clone());
        Ok(files)
    }

    /// Scope for a declaration found in `files[file_idx]` of package
    /// `rel_path`.
    fn scope_for(&self, files: &[SourceFile], file_idx: usize, rel_path: &str) -> Scope {
        let file = &files[file_idx];
        let mut path_info = HashMap::new();
        for (local, import_path) in file.import_aliases() {
            if let Some(rel) = self.project.relative_path(&import_path) {
                path_info.insert(local, rel);
            }
        }
        path_info.insert(file.package_name.clone(), rel_path.to_string());
        Scope {
            package_name: file.package_name.clone(),
            rel_path: rel_path.to_string(),
            path_info,
            files: files.to_vec(),
        }
    }
}

/// Split an annotation reference (`model.Item`, `pkg.models.Item`, `Item`)
/// into a pending reference.
fn annotation_ref(type_ref: &str) -> PendingRef {
    let parts: Vec<&str> = type_ref.split('.').collect();
    let type_name = parts.last().copied().unwrap_or_default().to_string();
    let rel_path = parts[..parts.len().saturating_sub(1)].join("/");
    PendingRef { rel_path, type_name }
}
