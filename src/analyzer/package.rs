use std::collections::{BTreeSet, HashMap};
use std::path::PathBuf;

use crate::parser::symbols::{GoFunction, GoTypeDecl, GoVar, ParsedFile};

/// Position of a declaration: file index plus index inside that file's list.
#[derive(Debug, Clone, Copy)]
struct DeclRef {
    file: usize,
    index: usize,
}

/// One Go package as produced by a [`PackageSource`](crate::analyzer::PackageSource):
/// its parsed files plus lookup tables for its top-level declarations.
#[derive(Debug)]
pub struct Package {
    pub path: String,
    pub name: String,
    pub dir: PathBuf,
    pub files: Vec<ParsedFile>,
    types: HashMap<String, DeclRef>,
    functions: HashMap<String, DeclRef>,
    methods: HashMap<(String, String), DeclRef>,
    vars: HashMap<String, DeclRef>,
}

impl Package {
    pub fn new(path: impl Into<String>, name: impl Into<String>, dir: PathBuf, files: Vec<ParsedFile>) -> Self {
        let mut package = Self {
            path: path.into(),
            name: name.into(),
            dir,
            files,
            types: HashMap::new(),
            functions: HashMap::new(),
            methods: HashMap::new(),
            vars: HashMap::new(),
        };
        package.index();
        package
    }

    fn index(&mut self) {
        for (file_idx, file) in self.files.iter().enumerate() {
            for (index, decl) in file.types.iter().enumerate() {
                self.types.entry(decl.name.clone()).or_insert(DeclRef { file: file_idx, index });
            }
            for (index, function) in file.functions.iter().enumerate() {
                let decl = DeclRef { file: file_idx, index };
                match &function.receiver {
                    Some(receiver) => {
                        self.methods
                            .entry((receiver.type_name.clone(), function.name.clone()))
                            .or_insert(decl);
                    }
                    // `init` may be declared many times and is never callable.
                    None if function.name == "init" => {}
                    None => {
                        self.functions.entry(function.name.clone()).or_insert(decl);
                    }
                }
            }
            for (index, var) in file.vars.iter().enumerate() {
                for name in &var.names {
                    self.vars.entry(name.clone()).or_insert(DeclRef { file: file_idx, index });
                }
            }
        }
    }

    pub fn type_decl(&self, name: &str) -> Option<(&ParsedFile, &GoTypeDecl)> {
        let decl = self.types.get(name)?;
        let file = &self.files[decl.file];
        Some((file, &file.types[decl.index]))
    }

    pub fn function(&self, name: &str) -> Option<(&ParsedFile, &GoFunction)> {
        let decl = self.functions.get(name)?;
        let file = &self.files[decl.file];
        Some((file, &file.functions[decl.index]))
    }

    pub fn method(&self, type_name: &str, method: &str) -> Option<(&ParsedFile, &GoFunction)> {
        let decl = self.methods.get(&(type_name.to_string(), method.to_string()))?;
        let file = &self.files[decl.file];
        Some((file, &file.functions[decl.index]))
    }

    pub fn var(&self, name: &str) -> Option<(&ParsedFile, &GoVar)> {
        let decl = self.vars.get(name)?;
        let file = &self.files[decl.file];
        Some((file, &file.vars[decl.index]))
    }

    /// Every method declared in the package, in file order.
    pub fn methods(&self) -> impl Iterator<Item = &GoFunction> {
        self.files.iter().flat_map(|file| file.methods())
    }

    pub fn imports(&self) -> BTreeSet<&str> {
        self.files
            .iter()
            .flat_map(|file| file.imports.iter().map(|import| import.path.as_str()))
            .collect()
    }
}
