//! Operation builder: assembles one [`Operation`] from a function's
//! annotation block, and the package walk that feeds it.

use crate::annotation::{media_type, parse_line, Annotation};
use crate::collector::Collector;
use crate::error::{Error, Result};
use crate::parser::GoParser;
use crate::project::Project;
use crate::resolver::{basic_type, Resolver};
use crate::swagger::{Operation, Parameter, ParameterItems, Response, Schema};
use crate::syntax::TypeExpr;
use log::{debug, warn};

/// Swagger parameter spellings that pass through without a format
const PLAIN_PARAM_TYPES: &[&str] = &["string", "number", "boolean", "array", "file"];

const KNOWN_LOCATIONS: &[&str] = &["query", "header", "path", "formData", "body"];

/// A built operation with its routing key
#[derive(Debug)]
pub struct BuiltOperation {
    pub router_path: String,
    pub method: String,
    pub operation: Operation,
}

/// Build one operation from a function's doc comment lines.
///
/// Returns `None` when no `@router` annotation is present: the function is not
/// an endpoint and is silently ignored.
pub fn build_operation(
    resolver: &Resolver,
    collector: &mut Collector,
    doc: &[String],
    controller_name: &str,
    func_name: &str,
) -> Result<Option<BuiltOperation>> {
    let mut router: Option<(String, String)> = None;
    let mut op = Operation::default();

    for line in doc {
        let annotation = match parse_line(line) {
            Ok(Some(a)) => a,
            Ok(None) => continue,
            Err(e) => {
                return Err(Error::InvalidAnnotation(format!(
                    "{}.{}: {}",
                    controller_name, func_name, e
                )))
            }
        };

        match annotation {
            Annotation::Router { path, method } => router = Some((path, method)),
            Annotation::Title(title) => {
                op.operation_id = format!("{}.{}", controller_name, title);
            }
            Annotation::Description(desc) => op.description = desc,
            Annotation::Summary(summary) => op.summary = summary,
            Annotation::Success { code, schema, description } => {
                let mut response = Response { description, schema: None };
                if let Some(success) = schema {
                    let inner = if let Some((ty, format)) = basic_type(&success.type_name) {
                        Schema {
                            schema_type: ty.to_string(),
                            format: format.to_string(),
                            ..Default::default()
                        }
                    } else {
                        let canonical = resolver.resolve_model(collector, &success.type_name)?;
                        Schema {
                            reference: format!("#/definitions/{}", canonical),
                            ..Default::default()
                        }
                    };
                    response.schema = Some(if success.is_array {
                        Schema {
                            schema_type: "array".to_string(),
                            items: Some(Box::new(inner)),
                            ..Default::default()
                        }
                    } else {
                        inner
                    });
                }
                op.responses.insert(code, response);
            }
            Annotation::Param(fields) => {
                let param =
                    build_parameter(resolver, collector, &fields, controller_name, func_name)?;
                op.parameters.push(param);
            }
            Annotation::Failure { code, description } => {
                op.responses.insert(code, Response { description, schema: None });
            }
            Annotation::Deprecated(flag) => op.deprecated = flag,
            Annotation::Accept(values) => {
                for value in &values {
                    match media_type(value) {
                        Some(mime) => {
                            op.consumes.push(mime.to_string());
                            op.produces.push(mime.to_string());
                        }
                        None => {
                            warn!(
                                "[{}.{}] unknown @Accept value: {}",
                                controller_name, func_name, value
                            );
                        }
                    }
                }
            }
            // file-level annotations have no meaning on a function
            _ => {}
        }
    }

    Ok(router.map(|(router_path, method)| BuiltOperation { router_path, method, operation: op }))
}

/// Build one parameter from the `@Param` fields
/// (name, in, type, required, [enum values], [default], ["description"]).
fn build_parameter(
    resolver: &Resolver,
    collector: &mut Collector,
    fields: &[String],
    controller_name: &str,
    func_name: &str,
) -> Result<Parameter> {
    let mut param = Parameter { name: fields[0].clone(), ..Default::default() };

    if !KNOWN_LOCATIONS.contains(&fields[1].as_str()) {
        warn!(
            "[{}.{}] unknown param location: {}, possible values are `query`, `header`, `path`, `formData` or `body`",
            controller_name, func_name, fields[1]
        );
    }
    param.in_location = fields[1].clone();

    let type_ref = &fields[2];
    if type_ref.contains('.') {
        let canonical = resolver.resolve_model(collector, type_ref)?;
        param.schema =
            Some(Schema { reference: format!("#/definitions/{}", canonical), ..Default::default() });
    } else {
        let (mut typ, is_array) = match type_ref.strip_prefix("[]") {
            Some(stripped) => (stripped, true),
            None => (type_ref.as_str(), false),
        };

        let mut param_type = String::new();
        let mut param_format = String::new();
        if let Some((ty, format)) = basic_type(typ) {
            param_type = ty.to_string();
            param_format = format.to_string();
        } else if PLAIN_PARAM_TYPES.contains(&typ) {
            param_type = typ.to_string();
        } else if typ == "enum" {
            // enum values come as a comma list in the fifth field
            if fields.len() < 5 {
                return Err(Error::InvalidAnnotation(format!(
                    "[{}.{}] enum should have sample values: {:?}",
                    controller_name, func_name, fields
                )));
            }
            typ = "string";
            param_type = typ.to_string();
            param.enum_values = fields[4].split(',').map(|s| s.to_string()).collect();
            if fields.len() > 6 {
                param.default = fields[5].clone();
            }
        } else {
            warn!("[{}.{}] unknown param type: {}", controller_name, func_name, typ);
        }

        if is_array {
            param.param_type = "array".to_string();
            param.items = Some(ParameterItems { item_type: param_type, format: param_format });
        } else {
            param.param_type = param_type;
            param.format = param_format;
        }
    }

    param.required = match fields[3].parse() {
        Ok(flag) => flag,
        Err(_) => {
            warn!("[{}.{}] invalid value on 'required' field: {:?}", controller_name, func_name, fields);
            false
        }
    };

    if let Some(last) = fields.last() {
        if last.starts_with('"') {
            param.description = last.trim_matches(|c| c == '"' || c == ' ').to_string();
        }
    }

    Ok(param)
}

/// Walk one imported package: register the import alias, collect controller
/// doc comments and build every annotated operation.
///
/// Standard-library and framework packages are skipped silently, as are
/// packages outside the project's module path. A referenced in-project
/// package that is missing on disk is fatal.
pub fn collect_package(
    project: &Project,
    resolver: &Resolver,
    collector: &mut Collector,
    local_name: Option<&str>,
    import_path: &str,
) -> Result<()> {
    if project.is_std_package(import_path) || project.is_framework_package(import_path) {
        return Ok(());
    }

    let local = match local_name {
        Some(name) => name.to_string(),
        None => import_path.rsplit('/').next().unwrap_or(import_path).to_string(),
    };
    collector.imports.insert(local, import_path.to_string());

    let rel_path = match project.relative_path(import_path) {
        Some(rel) => rel,
        None => return Ok(()),
    };

    if !collector.visited_packages.insert(import_path.to_string()) {
        return Ok(());
    }

    debug!("Collecting package {}", import_path);

    let dir = project.package_dir(&rel_path)?;
    let files = GoParser::parse_dir(&dir)?;

    for file in &files {
        for decl in &file.types {
            if matches!(decl.expr, TypeExpr::Struct(_)) && !decl.doc.is_empty() {
                let text = format!("{}\n", decl.doc.join("\n"));
                collector.controller_comments.insert(format!("{}{}", import_path, decl.name), text);
            }
        }

        for func in &file.funcs {
            let controller_name = func.receiver.clone().unwrap_or_default();
            let built =
                build_operation(resolver, collector, &func.doc, &controller_name, &func.name)?;
            if let Some(built) = built {
                let key = format!("{}{}", import_path, controller_name);
                debug!(
                    "Collected {} {} under {}",
                    built.method, built.router_path, key
                );
                collector.add_operation(&key, &built.router_path, &built.method, built.operation);
            }
        }
    }

    collector.packages.insert(rel_path, files);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tag::TagPrecedence;
    use std::fs;
    use tempfile::TempDir;

    fn project_from(files: &[(&str, &str)]) -> (TempDir, Project) {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join("go.mod"), "module example.com/shop\n").unwrap();
        let goroot = temp_dir.path().join("goroot");
        fs::create_dir_all(goroot.join("src/net/http")).unwrap();
        for (path, content) in files {
            let full = temp_dir.path().join(path);
            fs::create_dir_all(full.parent().unwrap()).unwrap();
            fs::write(full, content).unwrap();
        }
        let project = Project::open(temp_dir.path(), Some(goroot)).unwrap();
        (temp_dir, project)
    }

    fn doc(lines: &[&str]) -> Vec<String> {
        lines.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_function_without_router_is_ignored() {
        let (_tmp, project) = project_from(&[]);
        let resolver = Resolver::new(&project, TagPrecedence::ThriftFirst);
        let mut collector = Collector::new();

        let built = build_operation(
            &resolver,
            &mut collector,
            &doc(&["@Title List", "@Summary lists things"]),
            "Ctrl",
            "List",
        )
        .unwrap();
        assert!(built.is_none());
    }

    #[test]
    fn test_primitive_query_parameter() {
        let (_tmp, project) = project_from(&[]);
        let resolver = Resolver::new(&project, TagPrecedence::ThriftFirst);
        let mut collector = Collector::new();

        let built = build_operation(
            &resolver,
            &mut collector,
            &doc(&["@router /ping [get]", r#"@Param limit query integer true "max items""#]),
            "",
            "Ping",
        )
        .unwrap()
        .unwrap();

        assert_eq!(built.router_path, "/ping");
        assert_eq!(built.method, "GET");
        let param = &built.operation.parameters[0];
        assert_eq!(param.name, "limit");
        assert_eq!(param.in_location, "query");
        assert_eq!(param.param_type, "integer");
        assert_eq!(param.format, "int64");
        assert!(param.required);
        assert_eq!(param.description, "max items");
    }

    #[test]
    fn test_array_parameter() {
        let (_tmp, project) = project_from(&[]);
        let resolver = Resolver::new(&project, TagPrecedence::ThriftFirst);
        let mut collector = Collector::new();

        let built = build_operation(
            &resolver,
            &mut collector,
            &doc(&["@router /f [post]", r#"@Param ids formData []int64 false "ids""#]),
            "",
            "F",
        )
        .unwrap()
        .unwrap();

        let param = &built.operation.parameters[0];
        assert_eq!(param.param_type, "array");
        let items = param.items.as_ref().unwrap();
        assert_eq!(items.item_type, "integer");
        assert_eq!(items.format, "int64");
    }

    #[test]
    fn test_enum_parameter_with_default() {
        let (_tmp, project) = project_from(&[]);
        let resolver = Resolver::new(&project, TagPrecedence::ThriftFirst);
        let mut collector = Collector::new();

        let built = build_operation(
            &resolver,
            &mut collector,
            &doc(&["@router /s [get]", r#"@Param status query enum true a,b,c a "state filter""#]),
            "",
            "S",
        )
        .unwrap()
        .unwrap();

        let param = &built.operation.parameters[0];
        assert_eq!(param.param_type, "string");
        assert_eq!(param.enum_values, vec!["a", "b", "c"]);
        assert_eq!(param.default, "a");
        assert_eq!(param.description, "state filter");
    }

    #[test]
    fn test_enum_without_values_is_fatal() {
        let (_tmp, project) = project_from(&[]);
        let resolver = Resolver::new(&project, TagPrecedence::ThriftFirst);
        let mut collector = Collector::new();

        let err = build_operation(
            &resolver,
            &mut collector,
            &doc(&["@router /s [get]", "@Param status query enum true"]),
            "",
            "S",
        )
        .unwrap_err();
        assert!(matches!(err, Error::InvalidAnnotation(_)));
    }

    #[test]
    fn test_success_array_of_model() {
        let (_tmp, project) = project_from(&[(
            "model/item.go",
            "package model\n\ntype Item struct {\n\tID int64 `json:\"id\"`\n\tName string\n}\n",
        )]);
        let resolver = Resolver::new(&project, TagPrecedence::ThriftFirst);
        let mut collector = Collector::new();

        let built = build_operation(
            &resolver,
            &mut collector,
            &doc(&["@router /items [get]", r#"@Success 200 {array} model.Item "ok""#]),
            "",
            "List",
        )
        .unwrap()
        .unwrap();

        let response = &built.operation.responses["200"];
        let schema = response.schema.as_ref().unwrap();
        assert_eq!(schema.schema_type, "array");
        assert_eq!(schema.items.as_ref().unwrap().reference, "#/definitions/model.Item");

        let item = &collector.definitions["model.Item"];
        let props = item.properties.as_ref().unwrap();
        assert!(props.contains_key("id"));
        assert!(props.contains_key("Name"));
    }

    #[test]
    fn test_failure_and_success_accumulate() {
        let (_tmp, project) = project_from(&[]);
        let resolver = Resolver::new(&project, TagPrecedence::ThriftFirst);
        let mut collector = Collector::new();

        let built = build_operation(
            &resolver,
            &mut collector,
            &doc(&[
                "@router /x [delete]",
                "@Success 204 gone",
                "@Failure 403 forbidden",
                "@Failure 404 not found",
            ]),
            "",
            "X",
        )
        .unwrap()
        .unwrap();

        let responses = &built.operation.responses;
        assert_eq!(responses.len(), 3);
        assert_eq!(responses["404"].description, "not found");
    }

    #[test]
    fn test_last_write_wins_per_status() {
        let (_tmp, project) = project_from(&[]);
        let resolver = Resolver::new(&project, TagPrecedence::ThriftFirst);
        let mut collector = Collector::new();

        let built = build_operation(
            &resolver,
            &mut collector,
            &doc(&["@router /x [get]", "@Failure 404 first", "@Failure 404 second"]),
            "",
            "X",
        )
        .unwrap()
        .unwrap();

        assert_eq!(built.operation.responses["404"].description, "second");
    }

    #[test]
    fn test_accept_maps_media_types() {
        let (_tmp, project) = project_from(&[]);
        let resolver = Resolver::new(&project, TagPrecedence::ThriftFirst);
        let mut collector = Collector::new();

        let built = build_operation(
            &resolver,
            &mut collector,
            &doc(&["@router /x [post]", "@Accept json,form,bogus"]),
            "",
            "X",
        )
        .unwrap()
        .unwrap();

        assert_eq!(
            built.operation.consumes,
            vec!["application/json", "multipart/form-data"]
        );
        assert_eq!(built.operation.produces, built.operation.consumes);
    }

    #[test]
    fn test_title_becomes_operation_id() {
        let (_tmp, project) = project_from(&[]);
        let resolver = Resolver::new(&project, TagPrecedence::ThriftFirst);
        let mut collector = Collector::new();

        let built = build_operation(
            &resolver,
            &mut collector,
            &doc(&["@router /x [get]", "@Title GetOne", "@Deprecated true"]),
            "BillingController",
            "GetOne",
        )
        .unwrap()
        .unwrap();

        assert_eq!(built.operation.operation_id, "BillingController.GetOne");
        assert!(built.operation.deprecated);
    }

    #[test]
    fn test_collect_package_gathers_ops_and_comments() {
        let (_tmp, project) = project_from(&[(
            "controllers/billing.go",
            r#"package controllers

// BillingController manages invoices.
type BillingController struct {
}

// @Title GetInvoices
// @Summary list invoices
// @Success 200 ok
// @router /invoices [post]
func (c *BillingController) Post() {
}
"#,
        )]);
        let resolver = Resolver::new(&project, TagPrecedence::ThriftFirst);
        let mut collector = Collector::new();

        collect_package(
            &project,
            &resolver,
            &mut collector,
            None,
            "example.com/shop/controllers",
        )
        .unwrap();

        let key = "example.com/shop/controllersBillingController";
        assert!(collector.controller_ops.contains_key(key));
        let item = &collector.controller_ops[key]["/invoices"];
        assert!(item.post.is_some());
        assert_eq!(
            collector.controller_comments[key],
            "BillingController manages invoices.\n"
        );
        assert_eq!(collector.imports["controllers"], "example.com/shop/controllers");
    }

    #[test]
    fn test_collect_package_skips_std_and_framework() {
        let (_tmp, project) = project_from(&[]);
        let resolver = Resolver::new(&project, TagPrecedence::ThriftFirst);
        let mut collector = Collector::new();

        collect_package(&project, &resolver, &mut collector, None, "net/http").unwrap();
        collect_package(&project, &resolver, &mut collector, None, "github.com/astaxie/beego")
            .unwrap();
        assert!(collector.visited_packages.is_empty());
        assert!(collector.imports.is_empty());
    }

    #[test]
    fn test_collect_missing_in_project_package_is_fatal() {
        let (_tmp, project) = project_from(&[]);
        let resolver = Resolver::new(&project, TagPrecedence::ThriftFirst);
        let mut collector = Collector::new();

        let err =
            collect_package(&project, &resolver, &mut collector, None, "example.com/shop/ghost")
                .unwrap_err();
        assert!(matches!(err, Error::PackageNotFound { .. }));
    }
}
