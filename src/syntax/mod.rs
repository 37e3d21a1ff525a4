//! Syntax trees for the analyzed Go subset.
//!
//! The generator performs purely syntactic analysis: declarations, imports,
//! struct shapes, struct tags, doc comments and the call expressions found in
//! function bodies. Type checking, generics and interface semantics are out of
//! scope; anything the grammar does not model folds into
//! [`TypeExpr::Unsupported`] and is reported by the resolver as a warning.

pub mod lexer;
pub mod parse;

use std::collections::HashMap;
use std::path::PathBuf;

/// One comment line, with the `//` or block markers stripped
#[derive(Debug, Clone, PartialEq)]
pub struct CommentLine {
    pub text: String,
    pub line: usize,
}

/// A parsed Go source file
#[derive(Debug, Clone)]
pub struct SourceFile {
    /// Path the file was read from
    pub path: PathBuf,
    /// Package clause name
    pub package_name: String,
    /// Import declarations in source order
    pub imports: Vec<Import>,
    /// Type declarations in source order
    pub types: Vec<TypeDecl>,
    /// Function and method declarations in source order
    pub funcs: Vec<FuncDecl>,
    /// Every comment line in the file
    pub comments: Vec<CommentLine>,
}

/// One import spec: optional local alias plus the quoted path
#[derive(Debug, Clone, PartialEq)]
pub struct Import {
    pub alias: Option<String>,
    pub path: String,
}

/// A `type Name ...` declaration with its doc comment
#[derive(Debug, Clone)]
pub struct TypeDecl {
    pub name: String,
    /// Doc comment lines immediately above the declaration
    pub doc: Vec<String>,
    pub expr: TypeExpr,
}

/// A function or method declaration
#[derive(Debug, Clone)]
pub struct FuncDecl {
    pub name: String,
    /// Receiver base type name for methods (`*Ctrl` and `Ctrl` both yield
    /// `Ctrl`); `None` for plain functions
    pub receiver: Option<String>,
    /// Doc comment lines immediately above the declaration
    pub doc: Vec<String>,
    /// Call expressions found in the body, in source order
    pub calls: Vec<CallExpr>,
    pub line: usize,
}

/// Structural type expression, one case per syntactic shape the resolver
/// dispatches on
#[derive(Debug, Clone, PartialEq)]
pub enum TypeExpr {
    /// Plain identifier: a primitive or a type in the same package
    Ident(String),
    /// Qualified identifier `pkg.Name`
    Selector { pkg: String, name: String },
    /// `*T`
    Pointer(Box<TypeExpr>),
    /// `[]T` or `[N]T`
    Slice(Box<TypeExpr>),
    /// `map[K]V`
    Map { key: Box<TypeExpr>, value: Box<TypeExpr> },
    /// Inline `struct { ... }`
    Struct(Vec<StructField>),
    /// Anything else (interface, func, chan); carries the leading keyword
    Unsupported(String),
}

/// One struct field group: `A, B T`, `A T \`tag\`` or an embedded type
#[derive(Debug, Clone, PartialEq)]
pub struct StructField {
    /// Field names; empty for an embedded field
    pub names: Vec<String>,
    pub expr: TypeExpr,
    /// Raw tag content with the backticks already stripped
    pub tag: Option<String>,
    pub line: usize,
}

impl StructField {
    pub fn is_embedded(&self) -> bool {
        self.names.is_empty()
    }
}

/// Call expression extracted from a function body
#[derive(Debug, Clone, PartialEq)]
pub struct CallExpr {
    /// Dotted callee path, e.g. `["beego", "NewNamespace"]` or `["r", "Route"]`
    pub path: Vec<String>,
    pub args: Vec<CallArg>,
    pub line: usize,
}

impl CallExpr {
    /// Last segment of the callee path (the method or function name).
    pub fn callee(&self) -> &str {
        self.path.last().map(String::as_str).unwrap_or("")
    }
}

/// Argument of a [`CallExpr`], reduced to the shapes route discovery inspects
#[derive(Debug, Clone, PartialEq)]
pub enum CallArg {
    /// String literal
    Str(String),
    /// Nested call
    Call(CallExpr),
    /// Function literal; holds the calls found in its body
    FuncLit(Vec<CallExpr>),
    /// `&pkg.Type{}` or `pkg.Type{}`; holds the dotted type path
    CompositeRef(Vec<String>),
    /// Bare identifier or selector, e.g. a handler reference
    Selector(Vec<String>),
    /// Anything else
    Other,
}

impl SourceFile {
    /// Local name -> import path for every import of this file, aliases first.
    ///
    /// Unaliased imports register under the last path segment, matching how the
    /// source refers to them.
    pub fn import_aliases(&self) -> HashMap<String, String> {
        let mut map = HashMap::new();
        for im in &self.imports {
            match &im.alias {
                Some(alias) if alias == "_" || alias == "." => continue,
                Some(alias) => {
                    map.insert(alias.clone(), im.path.clone());
                }
                None => {
                    if let Some(last) = im.path.rsplit('/').next() {
                        map.insert(last.to_string(), im.path.clone());
                    }
                }
            }
        }
        map
    }

    /// Look up a type declaration by identifier.
    pub fn find_type(&self, name: &str) -> Option<&TypeDecl> {
        self.types.iter().find(|t| t.name == name)
    }

    /// The comment line ending exactly at `line`, if any.
    pub fn comment_on_line(&self, line: usize) -> Option<&CommentLine> {
        self.comments.iter().find(|c| c.line == line)
    }
}
