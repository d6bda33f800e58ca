use std::collections::HashMap;

use crate::analyzer::program::ProgramModel;
use crate::analyzer::types::{NamedType, Signature, TypeRef};
use crate::analyzer::Package;
use crate::parser::symbols::{Assignment, Expr, GoFunction, ParsedFile, Stmt, TypeExpr};

const MAX_EXPR_DEPTH: usize = 16;

/// Local typing environment for one function body.
///
/// Statements are applied in source order with [`FunctionScope::apply`]. Names live in
/// a stack of frames, one per open lexical block: [`FunctionScope::enter`] and
/// [`FunctionScope::leave`] bracket a block, and a name bound inside it is gone once the
/// block is left. A name bound to `None` is a known local whose type could not be worked
/// out; it still shadows outer locals, package-level names and imports.
pub struct FunctionScope<'a> {
    model: &'a ProgramModel,
    package: &'a Package,
    file: &'a ParsedFile,
    frames: Vec<HashMap<String, Option<TypeRef>>>,
}

impl<'a> FunctionScope<'a> {
    /// Scope for package-level expressions such as `var` initialisers.
    pub fn file_scope(model: &'a ProgramModel, package: &'a Package, file: &'a ParsedFile) -> Self {
        Self {
            model,
            package,
            file,
            frames: vec![HashMap::new()],
        }
    }

    pub fn for_function(
        model: &'a ProgramModel,
        package: &'a Package,
        file: &'a ParsedFile,
        function: &GoFunction,
    ) -> Self {
        let mut scope = Self::file_scope(model, package, file);

        if let Some(receiver) = &function.receiver {
            if let Some(name) = &receiver.name {
                let named = TypeRef::Named(NamedType::new(package.path.clone(), receiver.type_name.clone()));
                let ty = if receiver.pointer {
                    TypeRef::Pointer(Box::new(named))
                } else {
                    named
                };
                scope.bind(name, Some(ty));
            }
        }
        for param in &function.params {
            let ty = scope.resolve(&param.ty);
            for name in &param.names {
                scope.bind(name, Some(ty.clone()));
            }
        }
        scope
    }

    fn bind(&mut self, name: &str, ty: Option<TypeRef>) {
        if name == "_" {
            return;
        }
        if let Some(frame) = self.frames.last_mut() {
            frame.insert(name.to_string(), ty);
        }
    }

    /// Innermost binding of `name`.
    fn local(&self, name: &str) -> Option<&Option<TypeRef>> {
        self.frames.iter().rev().find_map(|frame| frame.get(name))
    }

    pub fn enter(&mut self) {
        self.frames.push(HashMap::new());
    }

    /// Drops the innermost block's names. The function's own frame is never dropped.
    pub fn leave(&mut self) {
        if self.frames.len() > 1 {
            self.frames.pop();
        }
    }

    fn resolve(&self, ty: &TypeExpr) -> TypeRef {
        self.model.resolve_type_expr(&self.package.path, self.file, ty)
    }

    /// Records the names a statement introduces.
    pub fn apply(&mut self, stmt: &Stmt) {
        match stmt {
            Stmt::Assign(assignment) if assignment.defines => self.apply_definition(assignment),
            Stmt::Assign(_) | Stmt::Call { .. } => {}
            Stmt::Declare { names, ty } => {
                let ty = ty.as_ref().map(|ty| self.resolve(ty));
                for name in names {
                    self.bind(name, ty.clone());
                }
            }
            Stmt::Range { names, over } => {
                let types = self.range_types(over);
                for (name, ty) in names.iter().zip(types) {
                    self.bind(name, ty);
                }
            }
            Stmt::Block(inner) => {
                self.enter();
                for stmt in inner {
                    self.apply(stmt);
                }
                self.leave();
            }
        }
    }

    /// Key and value types of `for k, v := range over`.
    fn range_types(&self, over: &Expr) -> [Option<TypeRef>; 2] {
        let int = || Some(TypeRef::Named(NamedType::new("", "int")));
        let Some(ty) = self.type_of(over) else {
            return [None, None];
        };
        // ranging over a pointer to an array is allowed
        let ty = match ty.deref() {
            TypeRef::Named(named) if !named.is_predeclared() => self.model.underlying_type(named),
            other => Some(other.clone()),
        };
        match ty {
            Some(TypeRef::Slice(element)) => [int(), Some(*element)],
            Some(TypeRef::Map(key, value)) => [Some(*key), Some(*value)],
            Some(TypeRef::Named(named)) if named.is_predeclared() && named.name == "string" => {
                [int(), Some(TypeRef::Named(NamedType::new("", "rune")))]
            }
            _ => [None, None],
        }
    }

    fn apply_definition(&mut self, assignment: &Assignment) {
        let names: Vec<Option<&str>> = assignment.lhs.iter().map(Expr::ident).collect();

        let types: Vec<Option<TypeRef>> = if let Some(declared) = &assignment.declared_type {
            vec![Some(self.resolve(declared)); names.len()]
        } else if assignment.rhs.len() == names.len() {
            assignment.rhs.iter().map(|expr| self.type_of(expr)).collect()
        } else {
            match assignment.rhs.as_slice() {
                [Expr::Call { function, .. }] => self
                    .callee(function)
                    .map(|signature| signature.results.into_iter().map(Some).collect())
                    .unwrap_or_default(),
                // v, ok := x.(T)
                [assertion @ Expr::TypeAssert { .. }] => {
                    vec![self.type_of(assertion), Some(TypeRef::Named(NamedType::new("", "bool")))]
                }
                _ => Vec::new(),
            }
        };

        for (index, name) in names.into_iter().enumerate() {
            if let Some(name) = name {
                self.bind(name, types.get(index).cloned().flatten());
            }
        }
    }

    fn is_local(&self, name: &str) -> bool {
        self.local(name).is_some()
    }

    /// Import path when `name` is a package qualifier in this file.
    fn qualifier(&self, name: &str) -> Option<String> {
        if self.is_local(name)
            || self.package.var(name).is_some()
            || self.package.function(name).is_some()
            || self.package.type_decl(name).is_some()
        {
            return None;
        }
        self.model.qualifier_path(self.file, name)
    }

    /// Static type of an expression, when it can be worked out.
    pub fn type_of(&self, expr: &Expr) -> Option<TypeRef> {
        self.type_of_at(expr, 0)
    }

    fn type_of_at(&self, expr: &Expr, depth: usize) -> Option<TypeRef> {
        if depth > MAX_EXPR_DEPTH {
            return None;
        }
        match expr {
            Expr::Ident(name) => match self.local(name) {
                Some(ty) => ty.clone(),
                None => self.package_var_type(self.package, name, depth),
            },
            Expr::Selector { operand, field, .. } => {
                if let Some(name) = operand.ident() {
                    if let Some(path) = self.qualifier(name) {
                        let package = self.model.package(&path)?;
                        return self.package_var_type(&package, field, depth);
                    }
                }
                let operand_ty = self.type_of_at(operand, depth + 1)?;
                let named = operand_ty.deref().named()?;
                self.model.field_type(named, field)
            }
            Expr::Call { function, .. } => {
                if let Some(signature) = self.callee(function) {
                    return signature.results.into_iter().next();
                }
                self.conversion_type(function)
            }
            Expr::New(ty) => Some(TypeRef::Pointer(Box::new(self.resolve(ty)))),
            Expr::Unary { op, operand } => match op.as_str() {
                "&" => Some(TypeRef::Pointer(Box::new(self.type_of_at(operand, depth + 1)?))),
                "*" => match self.type_of_at(operand, depth + 1)? {
                    TypeRef::Pointer(inner) => Some(*inner),
                    _ => None,
                },
                _ => None,
            },
            Expr::TypeAssert { ty, .. } => ty.as_ref().map(|ty| self.resolve(ty)),
            Expr::Composite(ty) => Some(self.resolve(ty)),
            Expr::Other => None,
        }
    }

    /// `T(x)` and `pkg.T(x)` are conversions, not calls.
    fn conversion_type(&self, function: &Expr) -> Option<TypeRef> {
        match function {
            Expr::Ident(name) if !self.is_local(name) && self.package.type_decl(name).is_some() => {
                Some(self.resolve(&TypeExpr::Name(name.clone())))
            }
            Expr::Selector { operand, field, .. } => {
                let path = self.qualifier(operand.ident()?)?;
                let package = self.model.package(&path)?;
                package.type_decl(field)?;
                Some(TypeRef::Named(NamedType::new(path, field.clone())))
            }
            _ => None,
        }
    }

    fn package_var_type(&self, package: &Package, name: &str, depth: usize) -> Option<TypeRef> {
        let (file, var) = package.var(name)?;
        if let Some(ty) = &var.ty {
            return Some(self.model.resolve_type_expr(&package.path, file, ty));
        }
        let position = var.names.iter().position(|n| n == name)?;
        let scope = FunctionScope::file_scope(self.model, package, file);
        if var.values.len() == var.names.len() {
            return scope.type_of_at(&var.values[position], depth + 1);
        }
        match var.values.as_slice() {
            [Expr::Call { function, .. }] => scope.callee(function)?.results.into_iter().nth(position),
            _ => None,
        }
    }

    /// Declared function or method a call's function expression refers to.
    pub fn callee(&self, function: &Expr) -> Option<Signature> {
        match function {
            Expr::Selector { operand, field, .. } => {
                if let Some(name) = operand.ident() {
                    if let Some(path) = self.qualifier(name) {
                        return self.model.function_signature(&path, field);
                    }
                }
                let receiver = self.type_of(operand)?;
                let named = receiver.deref().named()?;
                self.model.method_signature(named, field)
            }
            Expr::Ident(name) if !self.is_local(name) => {
                self.model.function_signature(&self.package.path, name)
            }
            _ => None,
        }
    }
}
