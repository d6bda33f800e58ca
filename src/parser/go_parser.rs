use anyhow::{Context, Result};
use std::path::Path;
use tree_sitter::{Language, Node, Parser, Query, QueryCursor};

use crate::parser::ast_utils::*;
use crate::parser::symbols::*;

/// Statement kinds lowered into [`Stmt::Assign`].
const ASSIGNMENT_KINDS: &[&str] = &["short_var_declaration", "assignment_statement"];

/// Statement kinds that open a lexical block, lowered into [`Stmt::Block`].
const SCOPE_KINDS: &[&str] = &[
    "block",
    "if_statement",
    "for_statement",
    "expression_switch_statement",
    "select_statement",
    "expression_case",
    "default_case",
    "communication_case",
];

pub struct GoParser {
    parser: Parser,
    query_cursor: QueryCursor,
    import_query: Query,
}

impl GoParser {
    pub fn new() -> Result<Self> {
        let language = tree_sitter_go::language();
        let mut parser = Parser::new();
        parser
            .set_language(&language)
            .map_err(|e| anyhow::anyhow!("Failed to set language: {}", e))?;

        let import_query = Self::build_import_query(&language)?;

        Ok(Self {
            parser,
            query_cursor: QueryCursor::new(),
            import_query,
        })
    }

    fn build_import_query(language: &Language) -> Result<Query> {
        let query = Query::new(
            language,
            r#"
            (import_spec
              name: (_)? @alias
              path: (_) @path
            ) @spec
            "#,
        )?;
        Ok(query)
    }

    pub fn parse_file(&mut self, file_path: &Path) -> Result<ParsedFile> {
        let source = std::fs::read_to_string(file_path)
            .with_context(|| format!("Failed to read file: {:?}", file_path))?;

        self.parse_source(&source, file_path)
    }

    pub fn parse_source(&mut self, source: &str, file_path: &Path) -> Result<ParsedFile> {
        let tree = self.parser.parse(source, None).ok_or_else(|| {
            anyhow::anyhow!("Failed to parse source for: {}", file_path.display())
        })?;

        let root = tree.root_node();
        let source_bytes = source.as_bytes();
        let mut parsed = ParsedFile::new(file_path.to_path_buf());
        parsed.has_syntax_errors = root.has_error();

        if let Some(clause) = find_child_of_type(root, &["package_clause"]) {
            if let Some(name) = find_child_of_type(clause, &["package_identifier"]) {
                parsed.package_name = extract_text(name, source_bytes);
            }
        }

        parsed.imports = self.extract_imports(root, source_bytes);

        for child in named_children_no_comments(root) {
            match child.kind() {
                "type_declaration" => parsed.types.extend(extract_type_declaration(child, source_bytes)),
                "function_declaration" | "method_declaration" => {
                    if let Some(function) = extract_function(child, source_bytes) {
                        parsed.functions.push(function);
                    }
                }
                "var_declaration" | "const_declaration" => {
                    parsed.vars.extend(extract_package_vars(child, source_bytes))
                }
                _ => {}
            }
        }

        Ok(parsed)
    }

    fn extract_imports(&mut self, root: Node, source: &[u8]) -> Vec<GoImport> {
        let alias_idx = self.import_query.capture_index_for_name("alias");
        let path_idx = self.import_query.capture_index_for_name("path");
        let mut imports = Vec::new();

        for query_match in self.query_cursor.matches(&self.import_query, root, source) {
            let mut alias = None;
            let mut path = None;
            let mut line = 0;
            for capture in query_match.captures {
                if Some(capture.index) == alias_idx {
                    alias = safe_node_text(capture.node, source).map(str::to_string);
                } else if Some(capture.index) == path_idx {
                    path = safe_node_text(capture.node, source).map(|p| unquote(p).to_string());
                    line = capture.node.start_position().row + 1;
                }
            }
            if let Some(path) = path {
                imports.push(GoImport { path, alias, line });
            }
        }

        imports
    }
}

fn extract_text(node: Node, source: &[u8]) -> String {
    safe_node_text(node, source).unwrap_or_default().to_string()
}

fn extract_type_declaration(node: Node, source: &[u8]) -> Vec<GoTypeDecl> {
    let mut decls = Vec::new();
    for spec in named_children_no_comments(node) {
        let Some(name) = spec.child_by_field_name("name") else {
            continue;
        };
        let Some(ty) = spec.child_by_field_name("type") else {
            continue;
        };
        let ty = lower_type(ty, source);
        let kind = match spec.kind() {
            "type_alias" => TypeDeclKind::Alias(ty),
            "type_spec" => TypeDeclKind::Defined(ty),
            _ => continue,
        };
        decls.push(GoTypeDecl {
            name: extract_text(name, source),
            kind,
            line: spec.start_position().row + 1,
        });
    }
    decls
}

fn extract_function(node: Node, source: &[u8]) -> Option<GoFunction> {
    let name = extract_text(node.child_by_field_name("name")?, source);
    let receiver = node
        .child_by_field_name("receiver")
        .and_then(|list| extract_receiver(list, source));
    let params = node
        .child_by_field_name("parameters")
        .map(|list| extract_params(list, source))
        .unwrap_or_default();
    let results = node
        .child_by_field_name("result")
        .map(|result| extract_results(result, source))
        .unwrap_or_default();

    let mut body = Vec::new();
    if let Some(block) = node.child_by_field_name("body") {
        BodyLowerer { source }.lower_children(block, &mut body);
    }

    Some(GoFunction {
        name,
        receiver,
        params,
        results,
        body,
        span: node_span(node),
    })
}

fn extract_receiver(list: Node, source: &[u8]) -> Option<GoReceiver> {
    let decl = find_child_of_type(list, &["parameter_declaration"])?;
    let name = decl
        .child_by_field_name("name")
        .map(|n| extract_text(n, source));
    let (type_name, pointer) = receiver_base(lower_type(decl.child_by_field_name("type")?, source))?;

    Some(GoReceiver {
        name,
        type_name,
        pointer,
    })
}

/// `*Client`, `Client` and `Client[T]` all name the receiver type `Client`.
fn receiver_base(ty: TypeExpr) -> Option<(String, bool)> {
    match ty {
        TypeExpr::Name(name) => Some((name, false)),
        TypeExpr::Generic(base) => receiver_base(*base),
        TypeExpr::Pointer(inner) => receiver_base(*inner).map(|(name, _)| (name, true)),
        _ => None,
    }
}

fn extract_params(list: Node, source: &[u8]) -> Vec<Param> {
    let mut params = Vec::new();
    for decl in named_children_no_comments(list) {
        if !matches!(decl.kind(), "parameter_declaration" | "variadic_parameter_declaration") {
            continue;
        }
        let Some(ty) = decl.child_by_field_name("type") else {
            continue;
        };
        let mut ty = lower_type(ty, source);
        if decl.kind() == "variadic_parameter_declaration" {
            ty = TypeExpr::Slice(Box::new(ty));
        }
        let names = children_by_field(decl, "name")
            .into_iter()
            .map(|n| extract_text(n, source))
            .collect();
        params.push(Param { names, ty });
    }
    params
}

/// Results expand `(a, b int)` into one entry per value.
fn extract_results(result: Node, source: &[u8]) -> Vec<TypeExpr> {
    if result.kind() != "parameter_list" {
        return vec![lower_type(result, source)];
    }
    extract_params(result, source)
        .into_iter()
        .flat_map(|param| {
            let count = param.names.len().max(1);
            std::iter::repeat(param.ty).take(count)
        })
        .collect()
}

fn extract_package_vars(node: Node, source: &[u8]) -> Vec<GoVar> {
    let mut specs = Vec::new();
    collect_var_specs(node, &mut specs);

    specs
        .into_iter()
        .map(|spec| GoVar {
            names: children_by_field(spec, "name")
                .into_iter()
                .map(|n| extract_text(n, source))
                .collect(),
            ty: spec.child_by_field_name("type").map(|t| lower_type(t, source)),
            values: spec
                .child_by_field_name("value")
                .map(|list| lower_expr_list(list, source))
                .unwrap_or_default(),
            line: spec.start_position().row + 1,
        })
        .collect()
}

/// `var ( ... )` groups nest their specs one level down in some grammar versions.
fn collect_var_specs<'a>(node: Node<'a>, out: &mut Vec<Node<'a>>) {
    for child in named_children_no_comments(node) {
        match child.kind() {
            "var_spec" | "const_spec" => out.push(child),
            "var_spec_list" | "const_spec_list" => collect_var_specs(child, out),
            _ => {}
        }
    }
}

pub(crate) fn lower_type(node: Node, source: &[u8]) -> TypeExpr {
    match node.kind() {
        "type_identifier" | "identifier" => TypeExpr::Name(extract_text(node, source)),
        "qualified_type" => TypeExpr::Qualified {
            package: extract_field_text(node, "package", source),
            name: extract_field_text(node, "name", source),
        },
        // `pkg.T` written in expression position, e.g. `new(pkg.T)`
        "selector_expression" => match node.child_by_field_name("operand") {
            Some(operand) if operand.kind() == "identifier" => TypeExpr::Qualified {
                package: extract_text(operand, source),
                name: extract_field_text(node, "field", source),
            },
            _ => TypeExpr::Other(extract_text(node, source)),
        },
        "pointer_type" => match named_children_no_comments(node).first() {
            Some(inner) => TypeExpr::Pointer(Box::new(lower_type(*inner, source))),
            None => TypeExpr::Other(extract_text(node, source)),
        },
        "unary_expression" if extract_field_text(node, "operator", source) == "*" => {
            match node.child_by_field_name("operand") {
                Some(inner) => TypeExpr::Pointer(Box::new(lower_type(inner, source))),
                None => TypeExpr::Other(extract_text(node, source)),
            }
        }
        "slice_type" => element_type(node, source, TypeExpr::Slice),
        "array_type" | "implicit_length_array_type" => element_type(node, source, TypeExpr::Array),
        "map_type" => match (node.child_by_field_name("key"), node.child_by_field_name("value")) {
            (Some(key), Some(value)) => TypeExpr::Map(
                Box::new(lower_type(key, source)),
                Box::new(lower_type(value, source)),
            ),
            _ => TypeExpr::Other(extract_text(node, source)),
        },
        "generic_type" => match node.child_by_field_name("type") {
            Some(base) => TypeExpr::Generic(Box::new(lower_type(base, source))),
            None => TypeExpr::Other(extract_text(node, source)),
        },
        "parenthesized_type" => match named_children_no_comments(node).first() {
            Some(inner) => lower_type(*inner, source),
            None => TypeExpr::Other(extract_text(node, source)),
        },
        "struct_type" => TypeExpr::Struct(extract_fields(node, source)),
        "interface_type" => TypeExpr::Interface(extract_interface_methods(node, source)),
        "function_type" => TypeExpr::Func,
        _ => TypeExpr::Other(extract_text(node, source)),
    }
}

fn element_type(node: Node, source: &[u8], wrap: fn(Box<TypeExpr>) -> TypeExpr) -> TypeExpr {
    match node.child_by_field_name("element") {
        Some(element) => wrap(Box::new(lower_type(element, source))),
        None => TypeExpr::Other(extract_text(node, source)),
    }
}

fn extract_fields(struct_node: Node, source: &[u8]) -> Vec<FieldDecl> {
    let Some(list) = find_child_of_type(struct_node, &["field_declaration_list"]) else {
        return Vec::new();
    };

    let mut fields = Vec::new();
    for decl in find_children_of_type(list, "field_declaration") {
        let Some(ty_node) = decl.child_by_field_name("type") else {
            continue;
        };
        let ty = lower_type(ty_node, source);
        let names = children_by_field(decl, "name");

        if names.is_empty() {
            // Embedded `*T` carries the star as a bare token next to the type.
            let ty = if has_token(decl, "*") {
                TypeExpr::Pointer(Box::new(ty))
            } else {
                ty
            };
            fields.push(FieldDecl { name: None, ty });
        } else {
            for name in names {
                fields.push(FieldDecl {
                    name: Some(extract_text(name, source)),
                    ty: ty.clone(),
                });
            }
        }
    }
    fields
}

fn extract_interface_methods(node: Node, source: &[u8]) -> Vec<String> {
    named_children_no_comments(node)
        .into_iter()
        .filter(|child| matches!(child.kind(), "method_elem" | "method_spec"))
        .filter_map(|child| child.child_by_field_name("name"))
        .map(|name| extract_text(name, source))
        .collect()
}

fn lower_expr_list(list: Node, source: &[u8]) -> Vec<Expr> {
    if list.kind() != "expression_list" {
        return vec![lower_expr(list, source)];
    }
    named_children_no_comments(list)
        .into_iter()
        .map(|expr| lower_expr(expr, source))
        .collect()
}

pub(crate) fn lower_expr(node: Node, source: &[u8]) -> Expr {
    match node.kind() {
        "identifier" | "blank_identifier" => Expr::Ident(extract_text(node, source)),
        "selector_expression" => {
            let (Some(operand), Some(field)) =
                (node.child_by_field_name("operand"), node.child_by_field_name("field"))
            else {
                return Expr::Other;
            };
            Expr::Selector {
                operand: Box::new(lower_expr(operand, source)),
                field: extract_text(field, source),
                field_span: node_span(field),
            }
        }
        "call_expression" => {
            let Some(function) = node.child_by_field_name("function") else {
                return Expr::Other;
            };
            if function.kind() == "identifier" && safe_node_text(function, source) == Some("new") {
                let argument = node
                    .child_by_field_name("arguments")
                    .and_then(|args| named_children_no_comments(args).into_iter().next());
                return match argument {
                    Some(argument) => Expr::New(lower_type(argument, source)),
                    None => Expr::Other,
                };
            }
            Expr::Call {
                function: Box::new(lower_expr(function, source)),
                span: node_span(node),
            }
        }
        "unary_expression" => match node.child_by_field_name("operand") {
            Some(operand) => Expr::Unary {
                op: extract_field_text(node, "operator", source),
                operand: Box::new(lower_expr(operand, source)),
            },
            None => Expr::Other,
        },
        "parenthesized_expression" => match named_children_no_comments(node).first() {
            Some(inner) => lower_expr(*inner, source),
            None => Expr::Other,
        },
        "type_assertion_expression" => match node.child_by_field_name("operand") {
            Some(operand) => Expr::TypeAssert {
                operand: Box::new(lower_expr(operand, source)),
                ty: node.child_by_field_name("type").map(|t| lower_type(t, source)),
            },
            None => Expr::Other,
        },
        "composite_literal" => match node.child_by_field_name("type") {
            Some(ty) => Expr::Composite(lower_type(ty, source)),
            None => Expr::Other,
        },
        _ => Expr::Other,
    }
}

/// Lowers a function body into [`Stmt`]s in source order, keeping lexical blocks.
struct BodyLowerer<'a> {
    source: &'a [u8],
}

impl BodyLowerer<'_> {
    fn lower_node(&self, node: Node, out: &mut Vec<Stmt>) {
        match node.kind() {
            kind if ASSIGNMENT_KINDS.contains(&kind) => {
                if let (Some(left), Some(right)) =
                    (node.child_by_field_name("left"), node.child_by_field_name("right"))
                {
                    out.push(Stmt::Assign(Assignment {
                        lhs: lower_expr_list(left, self.source),
                        rhs: lower_expr_list(right, self.source),
                        declared_type: None,
                        defines: kind == "short_var_declaration",
                        span: node_span(node),
                    }));
                }
            }
            "var_spec" => {
                let names: Vec<Expr> = children_by_field(node, "name")
                    .into_iter()
                    .map(|n| Expr::Ident(extract_text(n, self.source)))
                    .collect();
                out.push(Stmt::Assign(Assignment {
                    lhs: names,
                    rhs: node
                        .child_by_field_name("value")
                        .map(|list| lower_expr_list(list, self.source))
                        .unwrap_or_default(),
                    declared_type: node.child_by_field_name("type").map(|t| lower_type(t, self.source)),
                    defines: true,
                    span: node_span(node),
                }));
            }
            "expression_statement" => {
                if let Some(expr) = named_children_no_comments(node).first() {
                    if expr.kind() == "call_expression" {
                        out.push(Stmt::Call {
                            call: lower_expr(*expr, self.source),
                            span: node_span(node),
                        });
                    }
                }
            }
            kind if SCOPE_KINDS.contains(&kind) => {
                let mut inner = Vec::new();
                self.lower_children(node, &mut inner);
                out.push(Stmt::Block(inner));
                return;
            }
            "func_literal" => {
                let mut inner = Vec::new();
                if let Some(params) = node.child_by_field_name("parameters") {
                    for param in extract_params(params, self.source) {
                        inner.push(Stmt::Declare {
                            names: param.names,
                            ty: Some(param.ty),
                        });
                    }
                }
                if let Some(body) = node.child_by_field_name("body") {
                    self.lower_children(body, &mut inner);
                }
                out.push(Stmt::Block(inner));
                return;
            }
            "range_clause" => {
                // `for range ch` and `for k, v = range m` introduce nothing
                if let (Some(left), Some(right), true) = (
                    node.child_by_field_name("left"),
                    node.child_by_field_name("right"),
                    has_token(node, ":="),
                ) {
                    out.push(Stmt::Range {
                        names: identifiers(left, self.source),
                        over: lower_expr(right, self.source),
                    });
                }
            }
            "type_switch_statement" => {
                out.push(Stmt::Block(self.lower_type_switch(node)));
                return;
            }
            _ => {}
        }

        self.lower_children(node, out);
    }

    fn lower_children(&self, node: Node, out: &mut Vec<Stmt>) {
        for child in named_children_no_comments(node) {
            self.lower_node(child, out);
        }
    }

    /// Each clause gets its own copy of the alias, typed when the clause names exactly
    /// one type.
    fn lower_type_switch(&self, node: Node) -> Vec<Stmt> {
        let alias = node.child_by_field_name("alias");
        let names = alias
            .map(|list| identifiers(list, self.source))
            .unwrap_or_default();

        let mut inner = Vec::new();
        for child in named_children_no_comments(node) {
            if Some(child) == alias {
                continue;
            }
            if !matches!(child.kind(), "type_case" | "default_case") {
                self.lower_node(child, &mut inner);
                continue;
            }

            let types = children_by_field(child, "type");
            let mut clause = Vec::new();
            if !names.is_empty() {
                let ty = match types.as_slice() {
                    [only] if safe_node_text(*only, self.source) != Some("nil") => {
                        Some(lower_type(*only, self.source))
                    }
                    _ => None,
                };
                clause.push(Stmt::Declare {
                    names: names.clone(),
                    ty,
                });
            }
            for statement in named_children_no_comments(child) {
                if !types.contains(&statement) {
                    self.lower_node(statement, &mut clause);
                }
            }
            inner.push(Stmt::Block(clause));
        }
        inner
    }
}

fn identifiers(list: Node, source: &[u8]) -> Vec<String> {
    lower_expr_list(list, source)
        .into_iter()
        .filter_map(|expr| expr.ident().map(str::to_string))
        .collect()
}
