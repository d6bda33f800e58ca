use crate::analyzer::{FunctionScope, Package, ProgramModel};
use crate::lint::call_site::{CallShapes, CallSite};
use crate::lint::finding::Position;
use crate::parser::symbols::{walk_body, BodyEvent, Expr, ParsedFile, Span, Stmt};

/// Yields the call sites of a package that have either rule's surface shape.
///
/// Shape checks run first and only matching statements pay for callee resolution.
/// A site whose callee cannot be resolved is dropped.
#[derive(Clone, Copy)]
pub struct Classifier<'a> {
    model: &'a ProgramModel,
    shapes: &'a CallShapes,
    include_unassigned_calls: bool,
}

/// Statement parts that matter for classification, before resolution.
struct RawSite<'s> {
    function: &'s Expr,
    selector: &'s str,
    selector_span: Span,
    targets: Vec<Option<String>>,
    statement_span: Span,
}

impl<'a> Classifier<'a> {
    pub fn new(model: &'a ProgramModel, shapes: &'a CallShapes, include_unassigned_calls: bool) -> Self {
        Self {
            model,
            shapes,
            include_unassigned_calls,
        }
    }

    /// Lazily walks every function body of `package` in file and source order.
    pub fn candidates(self, package: &'a Package) -> impl Iterator<Item = CallSite> + 'a {
        package
            .files
            .iter()
            .flat_map(|file| file.functions.iter().map(move |function| (file, function)))
            .flat_map(move |(file, function)| {
                let mut scope = FunctionScope::for_function(self.model, package, file, function);
                walk_body(&function.body).filter_map(move |event| match event {
                    BodyEvent::Enter => {
                        scope.enter();
                        None
                    }
                    BodyEvent::Leave => {
                        scope.leave();
                        None
                    }
                    BodyEvent::Stmt(stmt) => {
                        let site = self.classify(&scope, package, file, stmt);
                        scope.apply(stmt);
                        site
                    }
                })
            })
    }

    fn classify(&self, scope: &FunctionScope, package: &Package, file: &ParsedFile, stmt: &Stmt) -> Option<CallSite> {
        let raw = self.raw_site(stmt)?;
        let track1 = self.shapes.is_track1_shape(&raw.targets);
        let pandora = self.shapes.is_pandora_shape(raw.selector);
        if !track1 && !pandora {
            return None;
        }

        let callee = scope.callee(raw.function)?;
        Some(CallSite {
            package: package.path.clone(),
            selector: raw.selector.to_string(),
            callee,
            targets: raw.targets,
            statement_pos: Position::new(&file.path, raw.statement_span),
            selector_pos: Position::new(&file.path, raw.selector_span),
        })
    }

    fn raw_site<'s>(&self, stmt: &'s Stmt) -> Option<RawSite<'s>> {
        match stmt {
            Stmt::Assign(assignment) => {
                let (call, selector, selector_span) = assignment.selector_call()?;
                let Expr::Call { function, .. } = call else {
                    return None;
                };
                Some(RawSite {
                    function,
                    selector,
                    selector_span,
                    targets: assignment
                        .lhs
                        .iter()
                        .map(|target| target.ident().map(str::to_string))
                        .collect(),
                    statement_span: assignment.span,
                })
            }
            Stmt::Call { call, span } if self.include_unassigned_calls => {
                let Expr::Call { function, .. } = call else {
                    return None;
                };
                let Expr::Selector { field, field_span, .. } = function.as_ref() else {
                    return None;
                };
                Some(RawSite {
                    function,
                    selector: field,
                    selector_span: *field_span,
                    targets: Vec::new(),
                    statement_span: *span,
                })
            }
            _ => None,
        }
    }
}
