//! End-to-end generation tests over synthetic Go projects.

use std::fs;
use std::path::{Path, PathBuf};
use swagger_from_go::{
    collector::Collector,
    discovery::{discover_routes, StrategyKind},
    document,
    operation::collect_package,
    parser::GoParser,
    project::Project,
    resolver::Resolver,
    swagger::{Property, Swagger},
    tag::TagPrecedence,
};
use tempfile::TempDir;

/// Materialize a Go project from (relative path, content) pairs.
fn create_project(files: &[(&str, &str)]) -> TempDir {
    let temp_dir = TempDir::new().expect("failed to create temp directory");
    fs::write(temp_dir.path().join("go.mod"), "module example.com/shop\n").unwrap();
    let goroot = temp_dir.path().join("goroot");
    fs::create_dir_all(goroot.join("src/net/http")).unwrap();
    fs::create_dir_all(goroot.join("src/time")).unwrap();
    for (path, content) in files {
        let full = temp_dir.path().join(path);
        fs::create_dir_all(full.parent().unwrap()).unwrap();
        fs::write(full, content).unwrap();
    }
    temp_dir
}

/// Run the full pipeline: entry parse, package walk, discovery, finalize.
fn generate(root: &Path, entry_rel: &str, strategy: StrategyKind) -> Swagger {
    let goroot = root.join("goroot");
    let project = Project::open(root, Some(goroot)).unwrap();
    let entry = GoParser::parse_file(&root.join(entry_rel)).unwrap();

    let mut doc = document::new_document();
    document::apply_info_annotations(&mut doc, &entry);

    let resolver = Resolver::new(&project, TagPrecedence::ThriftFirst);
    let mut collector = Collector::new();
    for import in &entry.imports {
        collect_package(&project, &resolver, &mut collector, import.alias.as_deref(), &import.path)
            .unwrap();
    }

    discover_routes(strategy, &entry, &collector, &mut doc).unwrap();
    document::finalize(&mut doc, &collector);
    doc
}

#[test]
fn test_s1_primitive_parameter() {
    let project = create_project(&[
        (
            "routers/router.go",
            r#"package routers

import (
    "example.com/shop/controllers"
)

func init() {
    ns := beego.NewNamespace("",
        beego.NSInclude(&controllers.PingController{}),
    )
    beego.AddNamespace(ns)
}
"#,
        ),
        (
            "controllers/ping.go",
            r#"package controllers

type PingController struct {
}

// @Success 200 pong
// @Param limit query integer true "max items"
// @router /ping [get]
func (c *PingController) Get() {
}
"#,
        ),
    ]);

    let doc = generate(project.path(), "routers/router.go", StrategyKind::Namespace);

    let op = doc.paths["/ping"].get.as_ref().expect("GET /ping missing");
    let param = &op.parameters[0];
    assert_eq!(param.name, "limit");
    assert_eq!(param.in_location, "query");
    assert_eq!(param.param_type, "integer");
    assert_eq!(param.format, "int64");
    assert!(param.required);
    assert_eq!(param.description, "max items");
}

#[test]
fn test_s2_array_of_named_type() {
    let project = create_project(&[
        (
            "routers/router.go",
            r#"package routers

import (
    "example.com/shop/controllers"
)

func init() {
    ns := beego.NewNamespace("/v1",
        beego.NSNamespace("/catalog",
            beego.NSInclude(&controllers.CatalogController{}),
        ),
    )
}
"#,
        ),
        (
            "controllers/catalog.go",
            r#"package controllers

import (
    "example.com/shop/model"
)

type CatalogController struct {
}

// @Success 200 {array} model.Item "ok"
// @router /items [get]
func (c *CatalogController) List() {
}
"#,
        ),
        (
            "model/item.go",
            "package model\n\ntype Item struct {\n\tID   int64 `json:\"id\"`\n\tName string\n}\n",
        ),
    ]);

    let doc = generate(project.path(), "routers/router.go", StrategyKind::Namespace);

    let op = doc.paths["/v1/catalog/items"].get.as_ref().unwrap();
    let schema = op.responses["200"].schema.as_ref().unwrap();
    assert_eq!(schema.schema_type, "array");
    assert_eq!(schema.items.as_ref().unwrap().reference, "#/definitions/model.Item");

    let item = &doc.definitions["model.Item"];
    let props = item.properties.as_ref().unwrap();
    assert_eq!(props["id"], Property::primitive("integer", "int64"));
    assert_eq!(props["Name"], Property::primitive("string", ""));
}

#[test]
fn test_s3_tag_precedence() {
    let project = create_project(&[
        (
            "routers/router.go",
            r#"package routers

import (
    "example.com/shop/controllers"
)

func init() {
    ns := beego.NewNamespace("/v1",
        beego.NSInclude(&controllers.TagController{}),
    )
}
"#,
        ),
        (
            "controllers/tags.go",
            r#"package controllers

import (
    "example.com/shop/model"
)

type TagController struct {
}

// @Success 200 {object} model.Tagged "ok"
// @router /tagged [get]
func (c *TagController) Get() {
}
"#,
        ),
        (
            "model/tagged.go",
            "package model\n\ntype Tagged struct {\n\tFoo int `json:\"j,omitempty\" thrift:\"t,1,required\"`\n}\n",
        ),
    ]);

    let doc = generate(project.path(), "routers/router.go", StrategyKind::Namespace);

    let tagged = &doc.definitions["model.Tagged"];
    let props = tagged.properties.as_ref().unwrap();
    assert!(props.contains_key("t"), "thrift tag name must win over json");
    assert!(!props.contains_key("j"));
    assert!(!props.contains_key("Foo"));
    assert_eq!(props["t"], Property::primitive("integer", "int64"));
}

#[test]
fn test_s4_nested_router_path_assembly() {
    let project = create_project(&[
        (
            "pkg/router/routes.go",
            r#"package router

import (
    "example.com/shop/handlers/users"
    "github.com/go-chi/chi/v5"
)

func New() chi.Router {
    r := chi.NewRouter()
    r.Group(func(r chi.Router) {
        r.Route("/v1", func(r chi.Router) {
            r.Route("/users", func(r chi.Router) {
                r.Get("/{id}", users.Get)
            })
        })
    })
    return r
}
"#,
        ),
        (
            "handlers/users/users.go",
            r#"package users

// @Summary get one user
// @Success 200 ok
// @router /users/{id} [get]
func Get() {
}
"#,
        ),
    ]);

    let doc = generate(project.path(), "pkg/router/routes.go", StrategyKind::RouterLiteral);

    assert!(doc.paths["/v1/users/{id}"].get.is_some());
    assert!(!doc.paths.keys().any(|p| p.contains(':')), "no :id form may survive");
}

#[test]
fn test_s5_namespace_include_with_prefix() {
    let project = create_project(&[
        (
            "routers/router.go",
            r#"package routers

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
"#,
        ),
        (
            "controllers/billing.go",
            r#"package controllers

// BillingController manages invoices.
type BillingController struct {
}

// @Summary create an invoice
// @Success 200 created
// @router /invoices [post]
func (c *BillingController) Post() {
}
"#,
        ),
    ]);

    let doc = generate(project.path(), "routers/router.go", StrategyKind::Namespace);

    assert!(doc.paths["/v1/billing/invoices"].post.is_some());
    let tag = doc.tags.iter().find(|t| t.name == "billing").expect("billing tag missing");
    assert_eq!(tag.description, "BillingController manages invoices.\n");
}

#[test]
fn test_s6_cross_package_ref_closure_is_minimal() {
    let project = create_project(&[
        (
            "routers/router.go",
            r#"package routers

import (
    "example.com/shop/controllers"
)

func init() {
    ns := beego.NewNamespace("/v1",
        beego.NSInclude(&controllers.AController{}),
    )
}
"#,
        ),
        (
            "controllers/a.go",
            r#"package controllers

import (
    "example.com/shop/a"
)

type AController struct {
}

// @Success 200 {object} a.A "ok"
// @router /a [get]
func (c *AController) Get() {
}
"#,
        ),
        (
            "a/a.go",
            "package a\n\nimport \"example.com/shop/b\"\n\ntype A struct {\n\tB b.T\n}\n",
        ),
        ("b/b.go", "package b\n\ntype T struct {\n\tC int\n}\n"),
    ]);

    let doc = generate(project.path(), "routers/router.go", StrategyKind::Namespace);

    let mut names: Vec<&str> = doc.definitions.keys().map(String::as_str).collect();
    names.sort_unstable();
    assert_eq!(names, vec!["a.A", "b.T"], "closure must be minimal");

    let a = &doc.definitions["a.A"];
    assert_eq!(a.properties.as_ref().unwrap()["B"].reference, "#/definitions/b.T");
}

#[test]
fn test_every_ref_has_a_definition() {
    let project = create_project(&[
        (
            "routers/router.go",
            r#"package routers

import (
    "example.com/shop/controllers"
)

func init() {
    ns := beego.NewNamespace("/v1",
        beego.NSNamespace("/catalog",
            beego.NSInclude(&controllers.CatalogController{}),
        ),
    )
}
"#,
        ),
        (
            "controllers/catalog.go",
            r#"package controllers

import (
    "example.com/shop/model"
)

type CatalogController struct {
}

// @Success 200 {object} model.Basket "ok"
// @router /baskets [get]
func (c *CatalogController) Get() {
}
"#,
        ),
        (
            "model/basket.go",
            r#"package model

import "time"

type Basket struct {
	Owner   *Customer
	Items   []Item
	Created time.Time
}

type Customer struct {
	Name string
}

type Item struct {
	ID int64 `json:"id"`
}
"#,
        ),
    ]);

    let doc = generate(project.path(), "routers/router.go", StrategyKind::Namespace);

    // walk every $ref in definitions and responses
    let mut refs: Vec<String> = Vec::new();
    for schema in doc.definitions.values() {
        if let Some(props) = &schema.properties {
            for prop in props.values() {
                collect_property_refs(prop, &mut refs);
            }
        }
    }
    for item in doc.paths.values() {
        if let Some(op) = &item.get {
            for response in op.responses.values() {
                if let Some(schema) = &response.schema {
                    if !schema.reference.is_empty() {
                        refs.push(schema.reference.clone());
                    }
                    if let Some(items) = &schema.items {
                        if !items.reference.is_empty() {
                            refs.push(items.reference.clone());
                        }
                    }
                }
            }
        }
    }

    assert!(!refs.is_empty());
    for reference in refs {
        let name = reference.trim_start_matches("#/definitions/");
        assert!(doc.definitions.contains_key(name), "dangling ref {}", reference);
    }
}

fn collect_property_refs(prop: &Property, refs: &mut Vec<String>) {
    if !prop.reference.is_empty() {
        refs.push(prop.reference.clone());
    }
    if let Some(items) = &prop.items {
        collect_property_refs(items, refs);
    }
    if let Some(props) = &prop.properties {
        for p in props.values() {
            collect_property_refs(p, refs);
        }
    }
    if let Some(additional) = &prop.additional_properties {
        collect_property_refs(additional, refs);
    }
}

#[test]
fn test_info_block_from_entry_comments() {
    let project = create_project(&[
        (
            "routers/router.go",
            r#"// @APIVersion 1.0.0
// @Title Shop API
// @Description shop backend\nwith line break
// @Host api.example.com
// @Schemes https
package routers

import (
    "example.com/shop/controllers"
)

func init() {
    ns := beego.NewNamespace("/v1",
        beego.NSInclude(&controllers.PingController{}),
    )
}
"#,
        ),
        (
            "controllers/ping.go",
            r#"package controllers

type PingController struct {
}

// @Success 200 pong
// @router /ping [get]
func (c *PingController) Get() {
}
"#,
        ),
    ]);

    let doc = generate(project.path(), "routers/router.go", StrategyKind::Namespace);

    assert_eq!(doc.swagger_version, "2.0");
    assert_eq!(doc.infos.version, "1.0.0");
    assert_eq!(doc.infos.title, "Shop API");
    assert_eq!(doc.infos.description, "shop backend\nwith line break");
    assert_eq!(doc.host, "api.example.com");
    assert_eq!(doc.schemes, vec!["https"]);
    assert_eq!(doc.base_path, "/v1");
}

#[test]
fn test_auto_strategy_picks_the_matching_one() {
    let project = create_project(&[
        (
            "pkg/router/routes.go",
            r#"package router

import (
    "example.com/shop/handlers/users"
    "github.com/go-chi/chi/v5"
)

func New() chi.Router {
    r := chi.NewRouter()
    r.Group(func(r chi.Router) {
        r.Route("/v1", func(r chi.Router) {
            r.Route("/users", func(r chi.Router) {
                r.Get("/{id}", users.Get)
            })
        })
    })
    return r
}
"#,
        ),
        (
            "handlers/users/users.go",
            r#"package users

// @Success 200 ok
// @router /users/{id} [get]
func Get() {
}
"#,
        ),
    ]);

    let doc = generate(project.path(), "pkg/router/routes.go", StrategyKind::Auto);
    assert!(doc.paths.contains_key("/v1/users/{id}"));
}

#[test]
fn test_cli_run_writes_swagger_files() {
    let project = create_project(&[
        (
            "routers/router.go",
            r#"// @Title Shop API
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
}
"#,
        ),
        (
            "controllers/billing.go",
            r#"package controllers

// BillingController manages invoices.
type BillingController struct {
}

// @Success 200 created
// @router /invoices [post]
func (c *BillingController) Post() {
}
"#,
        ),
    ]);

    let args = swagger_from_go::cli::CliArgs {
        project_path: project.path().to_path_buf(),
        entry: None,
        strategy: swagger_from_go::cli::Strategy::Namespace,
        goroot: Some(project.path().join("goroot")),
        tag_precedence: swagger_from_go::cli::TagPrecedenceArg::Thrift,
        output_dir: None,
        skip_postman: false,
        pin_collection: None,
        verbose: false,
    };
    swagger_from_go::cli::run(args).unwrap();

    let out = project.path().join("swagger");
    assert!(out.join("swagger.json").is_file());
    assert!(out.join("swagger.yml").is_file());
    assert!(out.join("postman-collection.json").is_file());

    let json = fs::read_to_string(out.join("swagger.json")).unwrap();
    assert!(json.contains("\"swagger\": \"2.0\""));
    assert!(json.contains("/v1/billing/invoices"));

    let postman = fs::read_to_string(out.join("postman-collection.json")).unwrap();
    assert!(postman.contains("billing"));
}

#[test]
fn test_missing_entry_file_is_unreadable() {
    let project = create_project(&[]);
    let result = GoParser::parse_file(&project.path().join(PathBuf::from("routers/router.go")));
    let err = result.unwrap_err();
    assert_eq!(err.exit_code(), 2);
}
