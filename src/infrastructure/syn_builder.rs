//! AST traversal for call graph construction.
//!
//! One `UnitWalker` walks one compilation unit depth first. The enclosing
//! function is walker state that is set when a declaration is entered and
//! restored when it is left, so closures and async blocks are attributed to
//! the innermost named function around them.
//!
//! Local bindings are tracked per lexical scope: blocks, closures, match arms
//! and `if let`/`while let`/`for` bodies open a scope, and a `let` binds its
//! names only after its initializer has been walked.

use std::collections::HashSet;

use proc_macro2::Span;
use syn::punctuated::Punctuated;
use syn::spanned::Spanned;
use syn::visit::{self, Visit};
use syn::{Block, Expr, ExprCall, ExprMethodCall, FnArg, Ident, Pat, Signature, Token, Type};
use tracing::{debug, trace};

use crate::domain::callgraph::{CallDetail, CallGraph};
use crate::domain::index::{Scope, SymbolIndex};
use crate::domain::symbol::Symbol;
use crate::domain::unit::{CompilationUnit, Program};
use crate::ports::CallGraphBuilder;

/// Builds the call graph with `syn`'s visitor.
#[derive(Debug, Clone)]
pub struct SynCallGraphBuilder {
    /// Also walk expressions passed to macros such as `println!` or `assert_eq!`.
    pub scan_macro_args: bool,
}

impl Default for SynCallGraphBuilder {
    fn default() -> Self {
        Self {
            scan_macro_args: true,
        }
    }
}

impl SynCallGraphBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_macro_args(mut self, enabled: bool) -> Self {
        self.scan_macro_args = enabled;
        self
    }
}

impl CallGraphBuilder for SynCallGraphBuilder {
    fn build_call_graph(&self, program: &Program) -> CallGraph {
        let mut graph = CallGraph::new();
        for unit in &program.units {
            let mut walker = UnitWalker::new(unit, &program.index, &mut graph, self.scan_macro_args);
            walker.visit_file(&unit.syntax);
            debug!(file = %unit.path.display(), module = %unit.module_key(), "walked unit");
        }
        debug!(
            callers = graph.len(),
            edges = graph.edge_count(),
            "call graph built"
        );
        graph
    }
}

/// The callee side of a call expression.
enum CallShape<'a> {
    /// `f(...)`
    Direct(&'a Ident),
    /// `a::b::f(...)`, `Type::f(...)`, `<T as Trait>::f(...)`
    Path(Vec<String>),
    /// `receiver.f(...)`
    Method { receiver_is_self: bool, name: &'a Ident },
}

fn path_idents(path: &syn::Path) -> Vec<String> {
    path.segments.iter().map(|s| s.ident.to_string()).collect()
}

fn classify_call(call: &ExprCall) -> Option<CallShape<'_>> {
    let Expr::Path(expr) = &*call.func else {
        return None;
    };
    match &expr.qself {
        // <Vec<u8>>::new()
        Some(qself) if qself.position == 0 => {
            let Type::Path(ty) = &*qself.ty else {
                return None;
            };
            let mut segments = path_idents(&ty.path);
            segments.extend(path_idents(&expr.path));
            Some(CallShape::Path(segments))
        }
        // <T as Trait>::f(): the path already reads `Trait::f`.
        Some(_) => Some(CallShape::Path(path_idents(&expr.path))),
        None if expr.path.leading_colon.is_none() && expr.path.segments.len() == 1 => {
            Some(CallShape::Direct(&expr.path.segments[0].ident))
        }
        None => Some(CallShape::Path(path_idents(&expr.path))),
    }
}

fn classify_method_call(call: &ExprMethodCall) -> CallShape<'_> {
    let receiver_is_self = matches!(&*call.receiver, Expr::Path(p) if p.path.is_ident("self"));
    CallShape::Method {
        receiver_is_self,
        name: &call.method,
    }
}

struct UnitWalker<'a> {
    unit: &'a CompilationUnit,
    index: &'a SymbolIndex,
    graph: &'a mut CallGraph,
    scan_macro_args: bool,
    module: Vec<String>,
    self_type: Option<Vec<String>>,
    caller: Option<String>,
    /// Innermost scope last.
    scopes: Vec<HashSet<String>>,
}

impl<'a> UnitWalker<'a> {
    fn new(
        unit: &'a CompilationUnit,
        index: &'a SymbolIndex,
        graph: &'a mut CallGraph,
        scan_macro_args: bool,
    ) -> Self {
        Self {
            unit,
            index,
            graph,
            scan_macro_args,
            module: unit.module_path.clone(),
            self_type: None,
            caller: None,
            scopes: Vec::new(),
        }
    }

    /// Registers a function declaration and walks it as the current caller.
    ///
    /// Locals of an enclosing function are not visible inside a nested one.
    fn enter_function(&mut self, ident: &Ident, sig: &Signature, walk: impl FnOnce(&mut Self)) {
        let name = Symbol::in_package(self.module.join("::"), ident.to_string()).qualified_name();
        self.graph.declare(&name);

        let mut params = HashSet::new();
        for input in &sig.inputs {
            if let FnArg::Typed(arg) = input {
                params.extend(PatNames::of(&arg.pat));
            }
        }
        let outer_caller = self.caller.replace(name);
        let outer_scopes = std::mem::replace(&mut self.scopes, vec![params]);
        walk(self);
        self.scopes = outer_scopes;
        self.caller = outer_caller;
    }

    fn scoped(&mut self, walk: impl FnOnce(&mut Self)) {
        self.scopes.push(HashSet::new());
        walk(self);
        self.scopes.pop();
    }

    /// Adds the names bound by `pat` to the innermost scope.
    fn bind(&mut self, pat: &Pat) {
        if let Some(scope) = self.scopes.last_mut() {
            scope.extend(PatNames::of(pat));
        }
    }

    fn is_local(&self, name: &str) -> bool {
        self.scopes.iter().any(|scope| scope.contains(name))
    }

    fn resolve(&self, shape: CallShape<'_>) -> Option<Symbol> {
        let scope = Scope {
            module: &self.module,
            self_type: self.self_type.as_deref(),
        };
        match shape {
            CallShape::Direct(ident) => {
                let name = ident.to_string();
                // A call through a local value has no function symbol.
                if self.is_local(&name) {
                    return None;
                }
                self.index.resolve_path(&scope, &[name])
            }
            CallShape::Path(segments) => self.index.resolve_path(&scope, &segments),
            CallShape::Method {
                receiver_is_self,
                name,
            } => self
                .index
                .resolve_method(&scope, receiver_is_self, &name.to_string()),
        }
    }

    fn record(&mut self, shape: CallShape<'_>, span: Span) {
        let Some(caller) = self.caller.clone() else {
            return;
        };
        let Some(symbol) = self.resolve(shape) else {
            trace!(caller = %caller, at = %self.unit.position(span), "unresolved call skipped");
            return;
        };
        let callee = symbol.qualified_name();
        if callee.is_empty() {
            return;
        }
        let detail = CallDetail::new(callee, self.unit.position(span));
        self.graph.add_call(&caller, detail);
    }
}

impl<'ast> Visit<'ast> for UnitWalker<'_> {
    fn visit_item_mod(&mut self, node: &'ast syn::ItemMod) {
        if node.content.is_none() {
            return visit::visit_item_mod(self, node);
        }
        self.module.push(node.ident.to_string());
        visit::visit_item_mod(self, node);
        self.module.pop();
    }

    fn visit_item_impl(&mut self, node: &'ast syn::ItemImpl) {
        let self_type = match &*node.self_ty {
            Type::Path(tp) if tp.qself.is_none() => Some(path_idents(&tp.path)),
            _ => None,
        };
        let outer = std::mem::replace(&mut self.self_type, self_type);
        visit::visit_item_impl(self, node);
        self.self_type = outer;
    }

    fn visit_item_trait(&mut self, node: &'ast syn::ItemTrait) {
        let outer = self.self_type.replace(vec![node.ident.to_string()]);
        visit::visit_item_trait(self, node);
        self.self_type = outer;
    }

    fn visit_item_fn(&mut self, node: &'ast syn::ItemFn) {
        self.enter_function(&node.sig.ident, &node.sig, |w| visit::visit_item_fn(w, node));
    }

    fn visit_impl_item_fn(&mut self, node: &'ast syn::ImplItemFn) {
        self.enter_function(&node.sig.ident, &node.sig, |w| visit::visit_impl_item_fn(w, node));
    }

    fn visit_trait_item_fn(&mut self, node: &'ast syn::TraitItemFn) {
        match &node.default {
            Some(_) => {
                self.enter_function(&node.sig.ident, &node.sig, |w| visit::visit_trait_item_fn(w, node))
            }
            None => visit::visit_trait_item_fn(self, node),
        }
    }

    fn visit_block(&mut self, node: &'ast Block) {
        self.scoped(|w| visit::visit_block(w, node));
    }

    fn visit_local(&mut self, node: &'ast syn::Local) {
        // `let f = f();` calls the function: the name is bound afterwards.
        if let Some(init) = &node.init {
            self.visit_expr(&init.expr);
            if let Some((_, diverge)) = &init.diverge {
                self.visit_expr(diverge);
            }
        }
        self.bind(&node.pat);
    }

    fn visit_expr_let(&mut self, node: &'ast syn::ExprLet) {
        self.visit_expr(&node.expr);
        self.bind(&node.pat);
    }

    fn visit_expr_if(&mut self, node: &'ast syn::ExprIf) {
        self.scoped(|w| {
            w.visit_expr(&node.cond);
            w.visit_block(&node.then_branch);
        });
        if let Some((_, else_branch)) = &node.else_branch {
            self.visit_expr(else_branch);
        }
    }

    fn visit_expr_while(&mut self, node: &'ast syn::ExprWhile) {
        self.scoped(|w| {
            w.visit_expr(&node.cond);
            w.visit_block(&node.body);
        });
    }

    fn visit_expr_for_loop(&mut self, node: &'ast syn::ExprForLoop) {
        self.visit_expr(&node.expr);
        self.scoped(|w| {
            w.bind(&node.pat);
            w.visit_block(&node.body);
        });
    }

    fn visit_expr_closure(&mut self, node: &'ast syn::ExprClosure) {
        self.scoped(|w| {
            for input in &node.inputs {
                w.bind(input);
            }
            w.visit_expr(&node.body);
        });
    }

    fn visit_arm(&mut self, node: &'ast syn::Arm) {
        self.scoped(|w| {
            w.bind(&node.pat);
            if let Some((_, guard)) = &node.guard {
                w.visit_expr(guard);
            }
            w.visit_expr(&node.body);
        });
    }

    fn visit_expr_call(&mut self, node: &'ast ExprCall) {
        if let Some(shape) = classify_call(node) {
            self.record(shape, node.span());
        }
        visit::visit_expr_call(self, node);
    }

    fn visit_expr_method_call(&mut self, node: &'ast ExprMethodCall) {
        self.record(classify_method_call(node), node.span());
        visit::visit_expr_method_call(self, node);
    }

    fn visit_macro(&mut self, node: &'ast syn::Macro) {
        visit::visit_macro(self, node);
        if !self.scan_macro_args || node.path.is_ident("macro_rules") {
            return;
        }
        // Only bodies that read as `expr, expr, ...` are walked.
        if let Ok(args) = node.parse_body_with(Punctuated::<Expr, Token![,]>::parse_terminated) {
            for expr in &args {
                Visit::visit_expr(self, expr);
            }
        }
    }
}

/// Identifiers bound by a pattern. Nested items are skipped.
#[derive(Default)]
struct PatNames {
    names: Vec<String>,
}

impl PatNames {
    fn of(pat: &Pat) -> Vec<String> {
        let mut names = Self::default();
        names.visit_pat(pat);
        names.names
    }
}

impl<'ast> Visit<'ast> for PatNames {
    fn visit_pat_ident(&mut self, node: &'ast syn::PatIdent) {
        self.names.push(node.ident.to_string());
        visit::visit_pat_ident(self, node);
    }

    fn visit_item(&mut self, _node: &'ast syn::Item) {}
}
