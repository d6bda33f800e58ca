use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Everything the analyzer needs from a single `.go` file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParsedFile {
    pub path: PathBuf,
    pub package_name: String,
    pub imports: Vec<GoImport>,
    pub types: Vec<GoTypeDecl>,
    pub functions: Vec<GoFunction>,
    pub vars: Vec<GoVar>,
    pub has_syntax_errors: bool,
}

/// 1-based line and column (byte offset) inside a file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Span {
    pub line: usize,
    pub column: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GoImport {
    pub path: String,
    pub alias: Option<String>,  // explicit name, including "_" and "."
    pub line: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GoTypeDecl {
    pub name: String,
    pub kind: TypeDeclKind,
    pub line: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum TypeDeclKind {
    /// `type T U`
    Defined(TypeExpr),
    /// `type T = U`
    Alias(TypeExpr),
}

/// Type expression as written in the source, before any resolution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TypeExpr {
    Name(String),
    Qualified { package: String, name: String },
    Pointer(Box<TypeExpr>),
    Slice(Box<TypeExpr>),
    Array(Box<TypeExpr>),
    Map(Box<TypeExpr>, Box<TypeExpr>),
    Generic(Box<TypeExpr>),
    Struct(Vec<FieldDecl>),
    Interface(Vec<String>),
    Func,
    Other(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDecl {
    /// `None` for an embedded field.
    pub name: Option<String>,
    pub ty: TypeExpr,
}

impl FieldDecl {
    pub fn is_embedded(&self) -> bool {
        self.name.is_none()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GoFunction {
    pub name: String,
    pub receiver: Option<GoReceiver>,
    pub params: Vec<Param>,
    pub results: Vec<TypeExpr>,
    pub body: Vec<Stmt>,
    pub span: Span,
}

impl GoFunction {
    pub fn is_method(&self) -> bool {
        self.receiver.is_some()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GoReceiver {
    pub name: Option<String>,
    pub type_name: String,
    pub pointer: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Param {
    pub names: Vec<String>,
    pub ty: TypeExpr,
}

/// Package-level `var` or `const` declaration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GoVar {
    pub names: Vec<String>,
    pub ty: Option<TypeExpr>,
    pub values: Vec<Expr>,
    pub line: usize,
}

/// Lowered function body statement, in source order.
///
/// Lexical blocks are kept as [`Stmt::Block`], so a name defined inside an `if`, `for`,
/// `switch` clause or function literal is only visible until that block ends.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Stmt {
    Assign(Assignment),
    /// A call used as a statement: `client.Delete(ctx, id)`.
    Call { call: Expr, span: Span },
    /// Names introduced without an assignment: function literal parameters and type
    /// switch aliases. `ty` is `None` when it cannot be written down.
    Declare { names: Vec<String>, ty: Option<TypeExpr> },
    /// `for k, v := range over`. Blank names are kept so positions line up.
    Range { names: Vec<String>, over: Expr },
    /// `{ ... }`, an `if`/`for`/`switch` statement with its header, a case clause or a
    /// function literal.
    Block(Vec<Stmt>),
}

/// One step of a depth-first walk over a lowered body.
#[derive(Debug, Clone, Copy)]
pub enum BodyEvent<'s> {
    Enter,
    Stmt(&'s Stmt),
    Leave,
}

/// Walks `body` in source order, descending into blocks. Every `Enter` is matched by a
/// `Leave`; block statements themselves are not yielded.
pub fn walk_body(body: &[Stmt]) -> BodyWalk<'_> {
    BodyWalk {
        stack: vec![body.iter()],
    }
}

pub struct BodyWalk<'s> {
    stack: Vec<std::slice::Iter<'s, Stmt>>,
}

impl<'s> Iterator for BodyWalk<'s> {
    type Item = BodyEvent<'s>;

    fn next(&mut self) -> Option<Self::Item> {
        let next = self.stack.last_mut()?.next();
        match next {
            Some(Stmt::Block(inner)) => {
                self.stack.push(inner.iter());
                Some(BodyEvent::Enter)
            }
            Some(stmt) => Some(BodyEvent::Stmt(stmt)),
            None => {
                self.stack.pop();
                if self.stack.is_empty() {
                    None
                } else {
                    Some(BodyEvent::Leave)
                }
            }
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Assignment {
    pub lhs: Vec<Expr>,
    pub rhs: Vec<Expr>,
    pub declared_type: Option<TypeExpr>,
    /// `:=` or `var`, as opposed to plain `=`.
    pub defines: bool,
    pub span: Span,
}

impl Assignment {
    /// The single call on the right-hand side, when the right-hand side is exactly one
    /// call through a selector.
    pub fn selector_call(&self) -> Option<(&Expr, &str, Span)> {
        let [call] = self.rhs.as_slice() else {
            return None;
        };
        let Expr::Call { function, .. } = call else {
            return None;
        };
        let Expr::Selector { field, field_span, .. } = function.as_ref() else {
            return None;
        };
        Some((call, field.as_str(), *field_span))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Expr {
    Ident(String),
    Selector {
        operand: Box<Expr>,
        field: String,
        field_span: Span,
    },
    Call {
        function: Box<Expr>,
        span: Span,
    },
    /// `new(T)`
    New(TypeExpr),
    Unary {
        op: String,
        operand: Box<Expr>,
    },
    TypeAssert {
        operand: Box<Expr>,
        ty: Option<TypeExpr>,
    },
    Composite(TypeExpr),
    Other,
}

impl Expr {
    pub fn ident(&self) -> Option<&str> {
        match self {
            Expr::Ident(name) => Some(name),
            _ => None,
        }
    }
}

impl ParsedFile {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            package_name: String::new(),
            imports: Vec::new(),
            types: Vec::new(),
            functions: Vec::new(),
            vars: Vec::new(),
            has_syntax_errors: false,
        }
    }

    pub fn is_test_file(&self) -> bool {
        self.path
            .file_name()
            .and_then(|n| n.to_str())
            .map(|n| n.ends_with("_test.go"))
            .unwrap_or(false)
    }

    pub fn methods(&self) -> impl Iterator<Item = &GoFunction> {
        self.functions.iter().filter(|f| f.is_method())
    }
}

impl GoImport {
    /// The name this import is referred to by when no alias is written. Go uses the
    /// imported package clause; this is the conventional guess from the path.
    pub fn default_name(&self) -> &str {
        default_import_name(&self.path)
    }

    /// The path cannot supply a usable name (`go-azure-helpers`), so only the package
    /// clause of the imported package can tell what the import is called.
    pub fn needs_package_clause(&self) -> bool {
        !is_identifier(self.default_name())
    }
}

fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    chars.next().is_some_and(|c| c == '_' || c.is_alphabetic())
        && chars.all(|c| c == '_' || c.is_alphanumeric())
}

pub fn default_import_name(path: &str) -> &str {
    let mut segments = path.rsplit('/');
    let last = segments.next().unwrap_or(path);
    let is_major_version = last.len() > 1
        && last.starts_with('v')
        && last[1..].chars().all(|c| c.is_ascii_digit());
    let name = if is_major_version {
        segments.next().unwrap_or(last)
    } else {
        last
    };
    // gopkg.in/yaml.v3
    match name.split_once(".v") {
        Some((base, version)) if !version.is_empty() && version.chars().all(|c| c.is_ascii_digit()) => base,
        _ => name,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_import_name() {
        assert_eq!(default_import_name("fmt"), "fmt");
        assert_eq!(
            default_import_name("github.com/hashicorp/go-azure-sdk/resource-manager/network/2023-09-01/virtualnetworks"),
            "virtualnetworks"
        );
        assert_eq!(default_import_name("github.com/hashicorp/go-azure-helpers/v2"), "go-azure-helpers");
        assert_eq!(default_import_name("gopkg.in/yaml.v3"), "yaml");
    }

    #[test]
    fn test_needs_package_clause() {
        let import = |path: &str| GoImport {
            path: path.to_string(),
            alias: None,
            line: 1,
        };
        assert!(import("github.com/hashicorp/go-azure-helpers/v2").needs_package_clause());
        assert!(!import("github.com/Azure/go-autorest/autorest/azure").needs_package_clause());
        assert!(!import("gopkg.in/yaml.v3").needs_package_clause());
    }

    #[test]
    fn test_walk_body_matches_enter_and_leave() {
        let call = |name: &str| Stmt::Declare {
            names: vec![name.to_string()],
            ty: None,
        };
        let body = vec![
            call("a"),
            Stmt::Block(vec![call("b"), Stmt::Block(vec![]), call("c")]),
            call("d"),
        ];

        let events: Vec<String> = walk_body(&body)
            .map(|event| match event {
                BodyEvent::Enter => "{".to_string(),
                BodyEvent::Leave => "}".to_string(),
                BodyEvent::Stmt(Stmt::Declare { names, .. }) => names[0].clone(),
                BodyEvent::Stmt(other) => panic!("unexpected {:?}", other),
            })
            .collect();
        assert_eq!(events, vec!["a", "{", "b", "{", "}", "c", "}", "d"]);
    }
}
