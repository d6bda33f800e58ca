use dashmap::DashMap;
use std::sync::{Arc, OnceLock};
use tracing::debug;

use crate::analyzer::loader::{LoadError, PackageSource};
use crate::analyzer::types::{NamedType, ReceiverType, ResolvedField, Signature, TypeRef};
use crate::analyzer::Package;
use crate::parser::symbols::{GoFunction, ParsedFile, TypeDeclKind, TypeExpr};

/// Alias chains and embedded-field promotion stop after this many hops.
const MAX_RESOLVE_DEPTH: usize = 8;

const PREDECLARED_TYPES: &[&str] = &[
    "any", "bool", "byte", "comparable", "complex64", "complex128", "error", "float32",
    "float64", "int", "int8", "int16", "int32", "int64", "rune", "string", "uint", "uint8",
    "uint16", "uint32", "uint64", "uintptr",
];

type PackageCell = Arc<OnceLock<Result<Arc<Package>, LoadError>>>;

/// Type-level view over every package reachable from the analyzed code.
///
/// Packages are pulled from the [`PackageSource`] the first time a resolution needs
/// them and kept for the rest of the run. Every lookup fails open: anything that
/// cannot be resolved comes back as `None` instead of an error.
pub struct ProgramModel {
    source: Arc<dyn PackageSource>,
    packages: DashMap<String, PackageCell>,
}

impl ProgramModel {
    pub fn new(source: Arc<dyn PackageSource>) -> Self {
        Self {
            source,
            packages: DashMap::new(),
        }
    }

    /// Registers an already loaded package. An earlier load of the same path wins.
    pub fn insert(&self, package: Package) -> Arc<Package> {
        let path = package.path.clone();
        let package = Arc::new(package);
        let cell = self.cell(&path);
        match cell.get_or_init(|| Ok(package.clone())) {
            Ok(existing) => existing.clone(),
            Err(_) => package,
        }
    }

    /// Loads a package, surfacing the load error. Used for the packages under analysis.
    pub fn load(&self, import_path: &str) -> Result<Arc<Package>, LoadError> {
        let cell = self.cell(import_path);
        cell.get_or_init(|| {
            let package = self.source.load(import_path).map(Arc::new);
            if let Err(e) = &package {
                debug!(package = import_path, error = %e, "package unavailable for resolution");
            }
            package
        })
        .clone()
    }

    /// Loads a package for resolution purposes only; failures read as "unknown".
    pub fn package(&self, import_path: &str) -> Option<Arc<Package>> {
        self.load(import_path).ok()
    }

    pub fn loaded_count(&self) -> usize {
        self.packages.iter().filter(|entry| entry.value().get().is_some()).count()
    }

    // The map guard is dropped before the cell is initialized so loads of other
    // packages from inside the closure cannot deadlock on the same shard.
    fn cell(&self, import_path: &str) -> PackageCell {
        self.packages
            .entry(import_path.to_string())
            .or_insert_with(|| Arc::new(OnceLock::new()))
            .clone()
    }

    /// Import path a package qualifier (`azure` in `azure.FutureAPI`) refers to in `file`.
    pub fn qualifier_path(&self, file: &ParsedFile, qualifier: &str) -> Option<String> {
        if let Some(import) = file
            .imports
            .iter()
            .find(|import| import.alias.as_deref() == Some(qualifier))
        {
            return Some(import.path.clone());
        }

        let unaliased = || file.imports.iter().filter(|import| import.alias.is_none());
        if let Some(import) = unaliased().find(|import| import.default_name() == qualifier) {
            return Some(import.path.clone());
        }

        // Package clause differs from a path that cannot name the package by itself.
        unaliased()
            .filter(|import| import.needs_package_clause())
            .find(|import| {
                self.package(&import.path)
                    .is_some_and(|package| package.name == qualifier)
            })
            .map(|import| import.path.clone())
    }

    /// Resolves a written type inside `package_path`/`file`, following aliases.
    pub fn resolve_type_expr(&self, package_path: &str, file: &ParsedFile, ty: &TypeExpr) -> TypeRef {
        self.resolve_at(package_path, file, ty, 0)
    }

    fn resolve_at(&self, package_path: &str, file: &ParsedFile, ty: &TypeExpr, depth: usize) -> TypeRef {
        if depth > MAX_RESOLVE_DEPTH {
            return TypeRef::Other(format!("{:?}", ty));
        }
        match ty {
            TypeExpr::Name(name) => {
                let declared_locally = self
                    .package(package_path)
                    .is_some_and(|package| package.type_decl(name).is_some());
                if !declared_locally && PREDECLARED_TYPES.contains(&name.as_str()) {
                    return TypeRef::Named(NamedType::new("", name.clone()));
                }
                self.follow_alias(NamedType::new(package_path, name.clone()), depth)
            }
            TypeExpr::Qualified { package, name } => match self.qualifier_path(file, package) {
                Some(path) => self.follow_alias(NamedType::new(path, name.clone()), depth),
                None => TypeRef::Other(format!("{}.{}", package, name)),
            },
            TypeExpr::Pointer(inner) => {
                TypeRef::Pointer(Box::new(self.resolve_at(package_path, file, inner, depth + 1)))
            }
            TypeExpr::Slice(inner) | TypeExpr::Array(inner) => {
                TypeRef::Slice(Box::new(self.resolve_at(package_path, file, inner, depth + 1)))
            }
            TypeExpr::Map(key, value) => TypeRef::Map(
                Box::new(self.resolve_at(package_path, file, key, depth + 1)),
                Box::new(self.resolve_at(package_path, file, value, depth + 1)),
            ),
            TypeExpr::Generic(base) => self.resolve_at(package_path, file, base, depth + 1),
            TypeExpr::Struct(_) => TypeRef::Other("struct{...}".to_string()),
            TypeExpr::Interface(_) => TypeRef::Other("interface{...}".to_string()),
            TypeExpr::Func => TypeRef::Other("func".to_string()),
            TypeExpr::Other(text) => TypeRef::Other(text.clone()),
        }
    }

    /// `type A = B` makes `A` and `B` the same type.
    fn follow_alias(&self, named: NamedType, depth: usize) -> TypeRef {
        let Some(package) = self.package(&named.package) else {
            return TypeRef::Named(named);
        };
        match package.type_decl(&named.name) {
            Some((file, decl)) => match &decl.kind {
                TypeDeclKind::Alias(target) => self.resolve_at(&package.path, file, target, depth + 1),
                TypeDeclKind::Defined(_) => TypeRef::Named(named),
            },
            None => TypeRef::Named(named),
        }
    }

    /// Underlying type of a defined type: `type Clients []*Client` is `[]*Client`.
    /// Predeclared types are their own underlying type.
    pub fn underlying_type(&self, named: &NamedType) -> Option<TypeRef> {
        self.underlying_type_at(named, 0)
    }

    fn underlying_type_at(&self, named: &NamedType, depth: usize) -> Option<TypeRef> {
        if depth > MAX_RESOLVE_DEPTH {
            return None;
        }
        if named.is_predeclared() {
            return Some(TypeRef::Named(named.clone()));
        }
        let package = self.package(&named.package)?;
        let (file, decl) = package.type_decl(&named.name)?;
        let ty = match &decl.kind {
            TypeDeclKind::Defined(ty) | TypeDeclKind::Alias(ty) => ty,
        };
        match self.resolve_at(&package.path, file, ty, depth + 1) {
            TypeRef::Named(next) => self.underlying_type_at(&next, depth + 1),
            other => Some(other),
        }
    }

    /// Fields of the struct underlying `named`, in declaration order.
    pub fn struct_fields(&self, named: &NamedType) -> Option<Vec<ResolvedField>> {
        self.struct_fields_at(named, 0)
    }

    fn struct_fields_at(&self, named: &NamedType, depth: usize) -> Option<Vec<ResolvedField>> {
        if depth > MAX_RESOLVE_DEPTH || named.is_predeclared() {
            return None;
        }
        let package = self.package(&named.package)?;
        let (file, decl) = package.type_decl(&named.name)?;
        let underlying = match &decl.kind {
            TypeDeclKind::Defined(ty) | TypeDeclKind::Alias(ty) => ty,
        };
        self.underlying_fields(&package.path, file, underlying, depth)
    }

    fn underlying_fields(
        &self,
        package_path: &str,
        file: &ParsedFile,
        ty: &TypeExpr,
        depth: usize,
    ) -> Option<Vec<ResolvedField>> {
        match ty {
            TypeExpr::Struct(fields) => Some(
                fields
                    .iter()
                    .map(|field| ResolvedField {
                        name: field.name.clone(),
                        ty: self.resolve_type_expr(package_path, file, &field.ty),
                    })
                    .collect(),
            ),
            TypeExpr::Generic(base) => self.underlying_fields(package_path, file, base, depth),
            // `type A B` shares B's underlying type.
            TypeExpr::Name(_) | TypeExpr::Qualified { .. } => {
                match self.resolve_type_expr(package_path, file, ty) {
                    TypeRef::Named(next) => self.struct_fields_at(&next, depth + 1),
                    _ => None,
                }
            }
            _ => None,
        }
    }

    /// Type of `named.field`, including fields promoted from embedded structs.
    pub fn field_type(&self, named: &NamedType, field: &str) -> Option<TypeRef> {
        self.field_type_at(named, field, 0)
    }

    fn field_type_at(&self, named: &NamedType, field: &str, depth: usize) -> Option<TypeRef> {
        if depth > MAX_RESOLVE_DEPTH {
            return None;
        }
        let fields = self.struct_fields(named)?;
        if let Some(found) = fields.iter().find(|f| f.effective_name() == Some(field)) {
            return Some(found.ty.clone());
        }
        fields
            .iter()
            .filter(|f| f.is_embedded())
            .filter_map(|f| f.ty.deref().named().cloned())
            .find_map(|embedded| self.field_type_at(&embedded, field, depth + 1))
    }

    /// Signature of `method` on `named`, looking through embedded fields. The returned
    /// receiver is the type that actually declares the method.
    pub fn method_signature(&self, named: &NamedType, method: &str) -> Option<Signature> {
        self.method_signature_at(named, method, 0)
    }

    fn method_signature_at(&self, named: &NamedType, method: &str, depth: usize) -> Option<Signature> {
        if depth > MAX_RESOLVE_DEPTH || named.is_predeclared() {
            return None;
        }
        let package = self.package(&named.package)?;
        if let Some((file, function)) = package.method(&named.name, method) {
            return Some(self.signature_of(&package, file, function));
        }

        self.struct_fields(named)?
            .iter()
            .filter(|f| f.is_embedded())
            .filter_map(|f| f.ty.deref().named().cloned())
            .find_map(|embedded| self.method_signature_at(&embedded, method, depth + 1))
    }

    /// Signature of a package-level function.
    pub fn function_signature(&self, package_path: &str, name: &str) -> Option<Signature> {
        let package = self.package(package_path)?;
        let (file, function) = package.function(name)?;
        Some(self.signature_of(&package, file, function))
    }

    pub fn signature_of(&self, package: &Package, file: &ParsedFile, function: &GoFunction) -> Signature {
        Signature {
            package: package.path.clone(),
            name: function.name.clone(),
            receiver: function.receiver.as_ref().map(|receiver| ReceiverType {
                named: NamedType::new(package.path.clone(), receiver.type_name.clone()),
                pointer: receiver.pointer,
            }),
            results: function
                .results
                .iter()
                .map(|ty| self.resolve_type_expr(&package.path, file, ty))
                .collect(),
        }
    }
}
