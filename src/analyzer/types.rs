use serde::{Deserialize, Serialize};
use std::fmt;

/// A declared (named) type, identified by its declaring package path and name.
/// Predeclared types such as `error` have an empty package path.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NamedType {
    pub package: String,
    pub name: String,
}

impl NamedType {
    pub fn new(package: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            package: package.into(),
            name: name.into(),
        }
    }

    /// Canonical `package/path.TypeName` string used for cache keys.
    pub fn key(&self) -> String {
        self.to_string()
    }

    pub fn is_predeclared(&self) -> bool {
        self.package.is_empty()
    }
}

impl fmt::Display for NamedType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.package.is_empty() {
            write!(f, "{}", self.name)
        } else {
            write!(f, "{}.{}", self.package, self.name)
        }
    }
}

/// A resolved type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TypeRef {
    Named(NamedType),
    Pointer(Box<TypeRef>),
    Slice(Box<TypeRef>),
    Map(Box<TypeRef>, Box<TypeRef>),
    /// Anything the analyzer does not model further (func types, channels, literals).
    Other(String),
}

impl TypeRef {
    pub fn named(&self) -> Option<&NamedType> {
        match self {
            TypeRef::Named(named) => Some(named),
            _ => None,
        }
    }

    /// Strips one level of pointer, as Go does for selectors and method calls.
    pub fn deref(&self) -> &TypeRef {
        match self {
            TypeRef::Pointer(inner) => inner,
            other => other,
        }
    }
}

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeRef::Named(named) => write!(f, "{}", named),
            TypeRef::Pointer(inner) => write!(f, "*{}", inner),
            TypeRef::Slice(inner) => write!(f, "[]{}", inner),
            TypeRef::Map(key, value) => write!(f, "map[{}]{}", key, value),
            TypeRef::Other(text) => write!(f, "{}", text),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedField {
    pub name: Option<String>,
    pub ty: TypeRef,
}

impl ResolvedField {
    pub fn is_embedded(&self) -> bool {
        self.name.is_none()
    }

    /// Field name as Go sees it; embedded fields are named after their type.
    pub fn effective_name(&self) -> Option<&str> {
        match &self.name {
            Some(name) => Some(name),
            None => self.ty.deref().named().map(|n| n.name.as_str()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReceiverType {
    pub named: NamedType,
    pub pointer: bool,
}

/// Resolved signature of a declared function or method.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Signature {
    /// Declaring package path.
    pub package: String,
    pub name: String,
    pub receiver: Option<ReceiverType>,
    pub results: Vec<TypeRef>,
}

impl Signature {
    pub fn qualified_name(&self) -> String {
        match &self.receiver {
            Some(receiver) => format!("{}.{}", receiver.named, self.name),
            None => format!("{}.{}", self.package, self.name),
        }
    }
}
