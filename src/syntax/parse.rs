//! Recursive-descent parser for the Go declaration grammar plus the
//! call-expression scanner used on function bodies.
//!
//! The parser is deliberately permissive outside the shapes the generator
//! consumes: unknown constructs are skipped token by token so a single exotic
//! declaration does not sink a whole package.

use std::path::Path;

use super::lexer::{tokenize, Token, TokenKind};
use super::{
    CallArg, CallExpr, CommentLine, FuncDecl, Import, SourceFile, StructField, TypeDecl, TypeExpr,
};

/// Parse failure with the offending source line
#[derive(Debug, Clone)]
pub struct ParseError {
    pub line: usize,
    pub message: String,
}

impl std::fmt::Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "line {}: {}", self.line, self.message)
    }
}

impl std::error::Error for ParseError {}

/// Parse Go source text into a [`SourceFile`].
pub fn parse_source(path: &Path, source: &str) -> Result<SourceFile, ParseError> {
    let (tokens, comments) = tokenize(source);
    let mut parser = Parser { tokens, pos: 0, comments: &comments };

    let mut file = SourceFile {
        path: path.to_path_buf(),
        package_name: String::new(),
        imports: Vec::new(),
        types: Vec::new(),
        funcs: Vec::new(),
        comments: comments.clone(),
    };

    while let Some(tok) = parser.peek() {
        match tok.ident() {
            Some("package") => {
                parser.bump();
                file.package_name = parser.expect_ident()?;
            }
            Some("import") => {
                parser.bump();
                parser.parse_imports(&mut file.imports)?;
            }
            Some("type") => {
                parser.bump();
                parser.parse_type_decls(&mut file.types)?;
            }
            Some("func") => {
                parser.bump();
                if let Some(func) = parser.parse_func()? {
                    file.funcs.push(func);
                }
            }
            Some("var") | Some("const") => {
                parser.bump();
                parser.skip_simple_decl();
            }
            _ => {
                parser.bump();
            }
        }
    }

    if file.package_name.is_empty() {
        return Err(ParseError { line: 1, message: "missing package clause".to_string() });
    }

    Ok(file)
}

struct Parser<'a> {
    tokens: Vec<Token>,
    pos: usize,
    comments: &'a [CommentLine],
}

impl<'a> Parser<'a> {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn peek_at(&self, offset: usize) -> Option<&Token> {
        self.tokens.get(self.pos + offset)
    }

    fn bump(&mut self) -> Option<&Token> {
        let tok = self.tokens.get(self.pos);
        if tok.is_some() {
            self.pos += 1;
        }
        tok
    }

    fn current_line(&self) -> usize {
        self.peek().map(|t| t.line).unwrap_or(0)
    }

    fn expect_ident(&mut self) -> Result<String, ParseError> {
        let line = self.current_line();
        match self.peek().map(|t| t.kind.clone()) {
            Some(TokenKind::Ident(name)) => {
                self.pos += 1;
                Ok(name)
            }
            other => Err(ParseError {
                line,
                message: format!("expected identifier, found {:?}", other),
            }),
        }
    }

    fn expect_punct(&mut self, p: &str) -> Result<(), ParseError> {
        let line = self.current_line();
        match self.peek() {
            Some(tok) if tok.is_punct(p) => {
                self.pos += 1;
                Ok(())
            }
            other => Err(ParseError {
                line,
                message: format!("expected `{}`, found {:?}", p, other.map(|t| &t.kind)),
            }),
        }
    }

    /// Doc comment: the contiguous run of comment lines ending directly above
    /// `line`.
    fn doc_above(&self, line: usize) -> Vec<String> {
        let mut doc = Vec::new();
        let mut want = line.saturating_sub(1);
        loop {
            match self.comments.iter().rev().find(|c| c.line == want) {
                Some(c) => {
                    doc.push(c.text.trim_start().to_string());
                    if want == 0 {
                        break;
                    }
                    want -= 1;
                }
                None => break,
            }
        }
        doc.reverse();
        doc
    }

    fn parse_imports(&mut self, imports: &mut Vec<Import>) -> Result<(), ParseError> {
        if self.peek().map(|t| t.is_punct("(")).unwrap_or(false) {
            self.bump();
            while let Some(tok) = self.peek() {
                if tok.is_punct(")") {
                    self.bump();
                    return Ok(());
                }
                self.parse_import_spec(imports)?;
            }
            Ok(())
        } else {
            self.parse_import_spec(imports)
        }
    }

    fn parse_import_spec(&mut self, imports: &mut Vec<Import>) -> Result<(), ParseError> {
        let mut alias = None;
        match self.peek().map(|t| t.kind.clone()) {
            Some(TokenKind::Ident(name)) => {
                alias = Some(name);
                self.bump();
            }
            Some(TokenKind::Punct(ref p)) if p == "." => {
                alias = Some(".".to_string());
                self.bump();
            }
            _ => {}
        }
        let line = self.current_line();
        match self.bump().map(|t| t.kind.clone()) {
            Some(TokenKind::Str(path)) => {
                imports.push(Import { alias, path });
                Ok(())
            }
            other => Err(ParseError {
                line,
                message: format!("expected import path string, found {:?}", other),
            }),
        }
    }

    fn parse_type_decls(&mut self, types: &mut Vec<TypeDecl>) -> Result<(), ParseError> {
        if self.peek().map(|t| t.is_punct("(")).unwrap_or(false) {
            self.bump();
            while let Some(tok) = self.peek() {
                if tok.is_punct(")") {
                    self.bump();
                    return Ok(());
                }
                if tok.is_punct(";") {
                    self.bump();
                    continue;
                }
                let decl = self.parse_type_spec()?;
                types.push(decl);
            }
            Ok(())
        } else {
            let decl = self.parse_type_spec()?;
            types.push(decl);
            Ok(())
        }
    }

    fn parse_type_spec(&mut self) -> Result<TypeDecl, ParseError> {
        let line = self.current_line();
        let doc = self.doc_above(line);
        let name = self.expect_ident()?;
        // `type Foo = Bar` alias form
        if self.peek().map(|t| t.is_punct("=")).unwrap_or(false) {
            self.bump();
        }
        let expr = self.parse_type();
        Ok(TypeDecl { name, doc, expr })
    }

    fn parse_func(&mut self) -> Result<Option<FuncDecl>, ParseError> {
        // the `func` keyword itself is already consumed
        let line = self.tokens.get(self.pos.saturating_sub(1)).map(|t| t.line).unwrap_or(0);
        let doc = self.doc_above(line);

        // method receiver
        let mut receiver = None;
        if self.peek().map(|t| t.is_punct("(")).unwrap_or(false) {
            self.bump();
            let mut last_ident = None;
            while let Some(tok) = self.peek() {
                if tok.is_punct(")") {
                    self.bump();
                    break;
                }
                if let Some(name) = tok.ident() {
                    last_ident = Some(name.to_string());
                }
                self.bump();
            }
            receiver = last_ident;
        }

        let name = match self.peek().and_then(|t| t.ident()) {
            Some(n) => {
                let n = n.to_string();
                self.bump();
                n
            }
            // func literal at top level of a var decl slipped through; give up
            // on this declaration and let the outer loop resume
            None => return Ok(None),
        };

        // parameters
        if self.peek().map(|t| t.is_punct("(")).unwrap_or(false) {
            self.skip_balanced("(", ")");
        }

        // optional result: a paren list, or a single type expression
        if let Some(tok) = self.peek() {
            if tok.is_punct("(") {
                self.skip_balanced("(", ")");
            } else if !tok.is_punct("{") && !tok.is_punct(";") && self.starts_type() {
                let _ = self.parse_type();
            }
        }

        // body
        let mut calls = Vec::new();
        if self.peek().map(|t| t.is_punct("{")).unwrap_or(false) {
            let body = self.collect_balanced("{", "}");
            calls = scan_calls(&body);
        }

        Ok(Some(FuncDecl { name, receiver, doc, calls, line }))
    }

    /// Whether the current token can begin a type expression.
    fn starts_type(&self) -> bool {
        match self.peek() {
            Some(tok) => match &tok.kind {
                TokenKind::Ident(_) => true,
                TokenKind::Punct(p) => matches!(p.as_str(), "*" | "[" | "(" | "<-"),
                _ => false,
            },
            None => false,
        }
    }

    fn parse_type(&mut self) -> TypeExpr {
        let tok = match self.peek() {
            Some(t) => t.clone(),
            None => return TypeExpr::Unsupported(String::new()),
        };

        match &tok.kind {
            TokenKind::Punct(p) if p == "*" => {
                self.bump();
                TypeExpr::Pointer(Box::new(self.parse_type()))
            }
            TokenKind::Punct(p) if p == "[" => {
                self.bump();
                // drop an array length if present
                while let Some(t) = self.peek() {
                    if t.is_punct("]") {
                        break;
                    }
                    self.bump();
                }
                self.bump(); // `]`
                TypeExpr::Slice(Box::new(self.parse_type()))
            }
            TokenKind::Punct(p) if p == "(" => {
                self.bump();
                let inner = self.parse_type();
                if self.peek().map(|t| t.is_punct(")")).unwrap_or(false) {
                    self.bump();
                }
                inner
            }
            TokenKind::Punct(p) if p == "<-" => {
                self.bump();
                if self.peek().map(|t| t.is_ident("chan")).unwrap_or(false) {
                    self.bump();
                }
                let _ = self.parse_type();
                TypeExpr::Unsupported("chan".to_string())
            }
            TokenKind::Ident(name) => match name.as_str() {
                "map" => {
                    self.bump();
                    if self.expect_punct("[").is_err() {
                        return TypeExpr::Unsupported("map".to_string());
                    }
                    let key = self.parse_type();
                    if self.expect_punct("]").is_err() {
                        return TypeExpr::Unsupported("map".to_string());
                    }
                    let value = self.parse_type();
                    TypeExpr::Map { key: Box::new(key), value: Box::new(value) }
                }
                "struct" => {
                    self.bump();
                    if self.expect_punct("{").is_err() {
                        return TypeExpr::Unsupported("struct".to_string());
                    }
                    let fields = self.parse_struct_fields();
                    TypeExpr::Struct(fields)
                }
                "interface" => {
                    self.bump();
                    if self.peek().map(|t| t.is_punct("{")).unwrap_or(false) {
                        self.skip_balanced("{", "}");
                    }
                    TypeExpr::Unsupported("interface".to_string())
                }
                "func" => {
                    self.bump();
                    if self.peek().map(|t| t.is_punct("(")).unwrap_or(false) {
                        let close_line = self.skip_balanced("(", ")");
                        // a result type on the same line belongs to this func type
                        if let Some(t) = self.peek() {
                            if t.line == close_line && !t.is_punct("{") && self.starts_type() {
                                let _ = self.parse_type();
                            }
                        }
                    }
                    TypeExpr::Unsupported("func".to_string())
                }
                "chan" => {
                    self.bump();
                    if self.peek().map(|t| t.is_punct("<-")).unwrap_or(false) {
                        self.bump();
                    }
                    let _ = self.parse_type();
                    TypeExpr::Unsupported("chan".to_string())
                }
                _ => {
                    let first = name.clone();
                    self.bump();
                    if self.peek().map(|t| t.is_punct(".")).unwrap_or(false)
                        && self.peek_at(1).and_then(|t| t.ident()).is_some()
                    {
                        self.bump();
                        let second = self.expect_ident().unwrap_or_default();
                        TypeExpr::Selector { pkg: first, name: second }
                    } else {
                        TypeExpr::Ident(first)
                    }
                }
            },
            other => {
                self.bump();
                TypeExpr::Unsupported(format!("{:?}", other))
            }
        }
    }

    /// Parse struct fields up to and including the closing `}`.
    fn parse_struct_fields(&mut self) -> Vec<StructField> {
        let mut fields = Vec::new();

        while let Some(tok) = self.peek() {
            if tok.is_punct("}") {
                self.bump();
                break;
            }
            if tok.is_punct(";") {
                self.bump();
                continue;
            }

            let field_line = tok.line;

            // embedded pointer or exotic unnamed field
            if !matches!(tok.kind, TokenKind::Ident(_)) {
                let expr = self.parse_type();
                let tag = self.take_tag(field_line);
                fields.push(StructField { names: Vec::new(), expr, tag, line: field_line });
                continue;
            }

            let keyword = tok.ident().unwrap_or("");
            if matches!(keyword, "map" | "struct" | "interface" | "func" | "chan") {
                let expr = self.parse_type();
                let tag = self.take_tag(field_line);
                fields.push(StructField { names: Vec::new(), expr, tag, line: field_line });
                continue;
            }

            let first = match self.expect_ident() {
                Ok(name) => name,
                Err(_) => break,
            };

            // `A, B Type` named list
            if self.peek().map(|t| t.is_punct(",")).unwrap_or(false) {
                let mut names = vec![first];
                while self.peek().map(|t| t.is_punct(",")).unwrap_or(false) {
                    self.bump();
                    match self.expect_ident() {
                        Ok(name) => names.push(name),
                        Err(_) => break,
                    }
                }
                let expr = self.parse_type();
                let tag = self.take_tag(field_line);
                fields.push(StructField { names, expr, tag, line: field_line });
                continue;
            }

            // `pkg.Type` embedded selector
            if self.peek().map(|t| t.is_punct(".")).unwrap_or(false) {
                self.bump();
                let second = self.expect_ident().unwrap_or_default();
                let tag = self.take_tag(field_line);
                fields.push(StructField {
                    names: Vec::new(),
                    expr: TypeExpr::Selector { pkg: first, name: second },
                    tag,
                    line: field_line,
                });
                continue;
            }

            // `Name Type` when a type expression follows on the same line,
            // otherwise an embedded identifier
            let named = match self.peek() {
                Some(next) if next.line == field_line => {
                    !next.is_punct("}") && !matches!(next.kind, TokenKind::Str(_)) && self.starts_type()
                }
                _ => false,
            };

            if named {
                let expr = self.parse_type();
                let tag = self.take_tag(field_line);
                fields.push(StructField { names: vec![first], expr, tag, line: field_line });
            } else {
                let tag = self.take_tag(field_line);
                fields.push(StructField {
                    names: Vec::new(),
                    expr: TypeExpr::Ident(first),
                    tag,
                    line: field_line,
                });
            }
        }

        fields
    }

    /// Consume a trailing tag literal if one sits on the field's line.
    fn take_tag(&mut self, field_line: usize) -> Option<String> {
        match self.peek() {
            Some(tok) if tok.line >= field_line => {
                if let TokenKind::Str(tag) = &tok.kind {
                    let tag = tag.clone();
                    self.bump();
                    Some(tag)
                } else {
                    None
                }
            }
            _ => None,
        }
    }

    /// Skip a balanced delimiter pair; the current token must be `open`.
    /// Returns the line of the closing delimiter.
    fn skip_balanced(&mut self, open: &str, close: &str) -> usize {
        let mut depth = 0usize;
        let mut last_line = self.current_line();
        while let Some(tok) = self.peek() {
            last_line = tok.line;
            if tok.is_punct(open) {
                depth += 1;
            } else if tok.is_punct(close) {
                depth -= 1;
                if depth == 0 {
                    self.bump();
                    break;
                }
            }
            self.bump();
        }
        last_line
    }

    /// Like [`Parser::skip_balanced`] but returns the tokens strictly inside
    /// the delimiters.
    fn collect_balanced(&mut self, open: &str, close: &str) -> Vec<Token> {
        let mut depth = 0usize;
        let mut body = Vec::new();
        while let Some(tok) = self.peek() {
            if tok.is_punct(open) {
                depth += 1;
                if depth == 1 {
                    self.bump();
                    continue;
                }
            } else if tok.is_punct(close) {
                depth -= 1;
                if depth == 0 {
                    self.bump();
                    break;
                }
            }
            body.push(tok.clone());
            self.bump();
        }
        body
    }

    /// Skip the remainder of a `var`/`const` declaration.
    fn skip_simple_decl(&mut self) {
        if self.peek().map(|t| t.is_punct("(")).unwrap_or(false) {
            self.skip_balanced("(", ")");
            return;
        }
        let mut depth = 0usize;
        let mut prev_line = self.current_line();
        let mut prev_continues = true;
        while let Some(tok) = self.peek() {
            if depth == 0 && tok.line > prev_line && !prev_continues {
                break;
            }
            prev_line = tok.line;
            prev_continues = match &tok.kind {
                TokenKind::Punct(p) => {
                    match p.as_str() {
                        "(" | "[" | "{" => depth += 1,
                        ")" | "]" | "}" => depth = depth.saturating_sub(1),
                        _ => {}
                    }
                    matches!(p.as_str(), "=" | "," | "+" | "-" | "*" | "/" | "||" | "&&" | "." | "(" | "[" | "{")
                }
                _ => false,
            };
            self.bump();
        }
    }
}

/// Extract every call expression from a body token stream, in source order.
/// Nested calls appear inside their parent's argument list, not at top level.
pub fn scan_calls(tokens: &[Token]) -> Vec<CallExpr> {
    let mut calls = Vec::new();
    let mut i = 0;
    while i < tokens.len() {
        match try_parse_call(tokens, i) {
            Some((call, next)) => {
                calls.push(call);
                i = next;
            }
            None => i += 1,
        }
    }
    calls
}

fn dotted_path(tokens: &[Token], mut i: usize) -> Option<(Vec<String>, usize)> {
    let first = tokens.get(i)?.ident()?;
    if first == "func" {
        return None;
    }
    let mut path = vec![first.to_string()];
    i += 1;
    while tokens.get(i).map(|t| t.is_punct(".")).unwrap_or(false) {
        match tokens.get(i + 1).and_then(|t| t.ident()) {
            Some(next) => {
                path.push(next.to_string());
                i += 2;
            }
            None => break,
        }
    }
    Some((path, i))
}

fn try_parse_call(tokens: &[Token], start: usize) -> Option<(CallExpr, usize)> {
    let (path, mut i) = dotted_path(tokens, start)?;
    if !tokens.get(i)?.is_punct("(") {
        return None;
    }
    let line = tokens[start].line;
    i += 1;

    let mut args = Vec::new();
    loop {
        let tok = tokens.get(i)?;
        if tok.is_punct(")") {
            i += 1;
            break;
        }
        if tok.is_punct(",") {
            i += 1;
            continue;
        }
        let (arg, next) = parse_arg(tokens, i)?;
        args.push(arg);
        i = next;
    }

    Some((CallExpr { path, args, line }, i))
}

fn parse_arg(tokens: &[Token], start: usize) -> Option<(CallArg, usize)> {
    let tok = tokens.get(start)?;

    let (arg, consumed) = match &tok.kind {
        TokenKind::Str(s) => (CallArg::Str(s.clone()), start + 1),
        TokenKind::Ident(name) if name == "func" => {
            let mut i = start + 1;
            // parameters
            if tokens.get(i).map(|t| t.is_punct("(")).unwrap_or(false) {
                i = skip_balanced_at(tokens, i, "(", ")");
            }
            // body is the next brace block
            while i < tokens.len() && !tokens[i].is_punct("{") {
                i += 1;
            }
            let body_start = i + 1;
            let body_end = skip_balanced_at(tokens, i, "{", "}");
            let inner = if body_end > body_start {
                scan_calls(&tokens[body_start..body_end - 1])
            } else {
                Vec::new()
            };
            (CallArg::FuncLit(inner), body_end)
        }
        TokenKind::Punct(p) if p == "&" => match dotted_path(tokens, start + 1) {
            Some((path, i)) if tokens.get(i).map(|t| t.is_punct("{")).unwrap_or(false) => {
                let end = skip_balanced_at(tokens, i, "{", "}");
                (CallArg::CompositeRef(path), end)
            }
            _ => (CallArg::Other, start + 1),
        },
        TokenKind::Ident(_) => match dotted_path(tokens, start) {
            Some((path, i)) => {
                if tokens.get(i).map(|t| t.is_punct("(")).unwrap_or(false) {
                    let (call, end) = try_parse_call(tokens, start)?;
                    (CallArg::Call(call), end)
                } else if tokens.get(i).map(|t| t.is_punct("{")).unwrap_or(false) {
                    let end = skip_balanced_at(tokens, i, "{", "}");
                    (CallArg::CompositeRef(path), end)
                } else {
                    (CallArg::Selector(path), i)
                }
            }
            None => (CallArg::Other, start + 1),
        },
        _ => (CallArg::Other, start + 1),
    };

    Some((arg, skip_to_arg_end(tokens, consumed)))
}

/// Advance to the delimiter ending the current argument: a depth-zero comma or
/// the closing paren of the enclosing call.
fn skip_to_arg_end(tokens: &[Token], mut i: usize) -> usize {
    let mut depth = 0usize;
    while let Some(tok) = tokens.get(i) {
        if let TokenKind::Punct(p) = &tok.kind {
            match p.as_str() {
                "(" | "[" | "{" => depth += 1,
                ")" if depth == 0 => return i,
                "," if depth == 0 => return i,
                ")" | "]" | "}" => depth = depth.saturating_sub(1),
                _ => {}
            }
        }
        i += 1;
    }
    i
}

fn skip_balanced_at(tokens: &[Token], mut i: usize, open: &str, close: &str) -> usize {
    let mut depth = 0usize;
    while let Some(tok) = tokens.get(i) {
        if tok.is_punct(open) {
            depth += 1;
        } else if tok.is_punct(close) {
            depth -= 1;
            if depth == 0 {
                return i + 1;
            }
        }
        i += 1;
    }
    i
}
