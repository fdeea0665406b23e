//! Program-wide symbol table.
//!
//! Records, per module, which functions, types, submodules and imports it
//! declares, plus which modules declare methods of a given name. Call
//! resolution walks paths through this table; anything it cannot place
//! resolves to `None` and the call is left out of the graph.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use syn::{Block, ImplItem, Item, Stmt, TraitItem, Type, UseTree, Visibility};
use tracing::debug;

use crate::domain::symbol::Symbol;
use crate::domain::unit::CompilationUnit;

/// Crates that are always available without a manifest entry.
const STD_CRATES: &[&str] = &["std", "core", "alloc", "proc_macro", "test"];

/// Prelude functions. They have no declaring module in the graph.
const PRELUDE_FUNCTIONS: &[&str] = &["drop", "size_of", "size_of_val", "align_of", "align_of_val"];

const PRIMITIVE_TYPES: &[&str] = &[
    "bool", "char", "str", "u8", "u16", "u32", "u64", "u128", "usize", "i8", "i16", "i32", "i64",
    "i128", "isize", "f32", "f64",
];

/// Guards import and re-export chains against cycles.
const MAX_DEPTH: usize = 16;

/// Module of `std` that a prelude type or trait lives in.
fn prelude_module(name: &str) -> Option<[&'static str; 2]> {
    let module = match name {
        "Vec" => "vec",
        "String" | "ToString" => "string",
        "Box" => "boxed",
        "Option" => "option",
        "Result" => "result",
        "Default" => "default",
        "Clone" => "clone",
        "ToOwned" => "borrow",
        "Iterator" | "IntoIterator" | "DoubleEndedIterator" | "ExactSizeIterator" | "Extend"
        | "FromIterator" => "iter",
        "From" | "Into" | "TryFrom" | "TryInto" | "AsRef" | "AsMut" => "convert",
        "PartialEq" | "Eq" | "PartialOrd" | "Ord" => "cmp",
        "Drop" => "ops",
        _ => return None,
    };
    Some(["std", module])
}

fn is_type_like(segment: &str) -> bool {
    segment.chars().next().is_some_and(char::is_uppercase)
}

fn single(set: &BTreeSet<String>) -> Option<&String> {
    match set.len() {
        1 => set.iter().next(),
        _ => None,
    }
}

fn is_pub(vis: &Visibility) -> bool {
    matches!(vis, Visibility::Public(_))
}

fn join(prefix: &[String], rest: &[String]) -> Vec<String> {
    let mut out = Vec::with_capacity(prefix.len() + rest.len());
    out.extend_from_slice(prefix);
    out.extend_from_slice(rest);
    out
}

/// Last identifier of an `impl` self type: `Circle` for `impl<T> shapes::Circle<T>`.
pub fn self_type_name(ty: &Type) -> Option<String> {
    match ty {
        Type::Path(tp) => tp.path.segments.last().map(|s| s.ident.to_string()),
        Type::Reference(r) => self_type_name(&r.elem),
        Type::Paren(p) => self_type_name(&p.elem),
        Type::Group(g) => self_type_name(&g.elem),
        _ => None,
    }
}

/// Names declared directly in one module.
#[derive(Debug, Default, Clone)]
pub struct ModuleScope {
    /// Function name -> declared `pub`.
    pub functions: BTreeMap<String, bool>,
    pub types: BTreeSet<String>,
    pub modules: BTreeSet<String>,
    /// Local alias -> path as written in the `use` item.
    pub imports: BTreeMap<String, Vec<String>>,
    pub globs: Vec<Vec<String>>,
}

impl ModuleScope {
    pub fn declares(&self, name: &str) -> bool {
        self.functions.contains_key(name)
            || self.types.contains(name)
            || self.modules.contains(name)
            || self.imports.contains_key(name)
    }
}

/// Where a lookup happens: the enclosing module and, inside an `impl` or
/// `trait` block, the self type path as written.
#[derive(Debug, Clone, Copy)]
pub struct Scope<'a> {
    pub module: &'a [String],
    pub self_type: Option<&'a [String]>,
}

impl Scope<'_> {
    fn module_key(&self) -> String {
        self.module.join("::")
    }

    fn crate_name(&self) -> &str {
        self.module.first().map(String::as_str).unwrap_or_default()
    }
}

#[derive(Debug, Default)]
pub struct SymbolIndex {
    /// Key: module path joined with `::`.
    modules: HashMap<String, ModuleScope>,

    /// Method name -> modules with an `impl` or `trait` declaring it.
    method_lookup: HashMap<String, BTreeSet<String>>,

    /// Method name -> modules with a `trait` declaring it.
    trait_methods: HashMap<String, BTreeSet<String>>,

    /// (TypeName, MethodName) -> declaring module -> callable from other crates.
    type_methods: HashMap<(String, String), BTreeMap<String, bool>>,

    /// Crates whose sources are loaded.
    crates: BTreeSet<String>,

    /// Crates that are known to exist but whose sources are not loaded.
    extern_crates: BTreeSet<String>,
}

impl SymbolIndex {
    /// Indexes every unit. `extern_crates` are dependency names that may
    /// appear as path roots without being loaded.
    pub fn build(units: &[CompilationUnit], extern_crates: &[String]) -> Self {
        let mut index = SymbolIndex::default();
        index.extern_crates.extend(STD_CRATES.iter().map(|s| s.to_string()));
        index.extern_crates.extend(extern_crates.iter().cloned());

        for unit in units {
            if let Some(root) = unit.module_path.first() {
                index.crates.insert(root.clone());
            }
            index.modules.entry(unit.module_key()).or_default();
            index.index_items(&unit.module_path, &unit.syntax.items);
        }

        debug!(
            modules = index.modules.len(),
            methods = index.method_lookup.len(),
            crates = index.crates.len(),
            "symbol index built"
        );
        index
    }

    pub fn module(&self, path: &[String]) -> Option<&ModuleScope> {
        self.modules.get(&path.join("::"))
    }

    fn scope_mut(&mut self, module: &[String]) -> &mut ModuleScope {
        self.modules.entry(module.join("::")).or_default()
    }

    fn add_method(&mut self, module: &[String], type_name: &str, method: &str, public: bool) {
        let key = module.join("::");
        self.method_lookup
            .entry(method.to_string())
            .or_default()
            .insert(key.clone());
        self.type_methods
            .entry((type_name.to_string(), method.to_string()))
            .or_default()
            .insert(key, public);
    }

    /// Index all items in a list (recursive for inline modules and items
    /// nested in function bodies).
    fn index_items(&mut self, module: &[String], items: &[Item]) {
        for item in items {
            match item {
                Item::Fn(func) => {
                    self.scope_mut(module)
                        .functions
                        .insert(func.sig.ident.to_string(), is_pub(&func.vis));
                    self.index_block(module, &func.block);
                }
                Item::Struct(s) => {
                    self.scope_mut(module).types.insert(s.ident.to_string());
                }
                Item::Enum(e) => {
                    self.scope_mut(module).types.insert(e.ident.to_string());
                }
                Item::Union(u) => {
                    self.scope_mut(module).types.insert(u.ident.to_string());
                }
                Item::Type(t) => {
                    self.scope_mut(module).types.insert(t.ident.to_string());
                }
                Item::TraitAlias(t) => {
                    self.scope_mut(module).types.insert(t.ident.to_string());
                }
                Item::Trait(t) => {
                    let trait_name = t.ident.to_string();
                    self.scope_mut(module).types.insert(trait_name.clone());
                    for trait_item in &t.items {
                        if let TraitItem::Fn(method) = trait_item {
                            let name = method.sig.ident.to_string();
                            self.add_method(module, &trait_name, &name, is_pub(&t.vis));
                            self.trait_methods
                                .entry(name)
                                .or_default()
                                .insert(module.join("::"));
                            if let Some(body) = &method.default {
                                self.index_block(module, body);
                            }
                        }
                    }
                }
                Item::Impl(imp) => {
                    let Some(type_name) = self_type_name(&imp.self_ty) else {
                        continue;
                    };
                    for impl_item in &imp.items {
                        if let ImplItem::Fn(method) = impl_item {
                            // Trait impl methods are as visible as the trait.
                            let public = imp.trait_.is_some() || is_pub(&method.vis);
                            let name = method.sig.ident.to_string();
                            self.add_method(module, &type_name, &name, public);
                            self.index_block(module, &method.block);
                        }
                    }
                }
                Item::Mod(m) => {
                    let name = m.ident.to_string();
                    self.scope_mut(module).modules.insert(name.clone());
                    if let Some((_, content)) = &m.content {
                        let child = join(module, &[name]);
                        self.scope_mut(&child);
                        self.index_items(&child, content);
                    }
                }
                Item::Use(u) => {
                    self.index_use(module, Vec::new(), &u.tree);
                }
                Item::ExternCrate(e) => {
                    let name = e.ident.to_string();
                    if name == "self" {
                        continue;
                    }
                    let alias = e
                        .rename
                        .as_ref()
                        .map(|(_, ident)| ident.to_string())
                        .unwrap_or_else(|| name.clone());
                    self.extern_crates.insert(name.clone());
                    self.scope_mut(module).imports.insert(alias, vec![name]);
                }
                _ => {}
            }
        }
    }

    fn index_block(&mut self, module: &[String], block: &Block) {
        for stmt in &block.stmts {
            if let Stmt::Item(item) = stmt {
                self.index_items(module, std::slice::from_ref(item));
            }
        }
    }

    fn index_use(&mut self, module: &[String], prefix: Vec<String>, tree: &UseTree) {
        match tree {
            UseTree::Path(p) => {
                let mut next = prefix;
                next.push(p.ident.to_string());
                self.index_use(module, next, &p.tree);
            }
            UseTree::Name(n) => {
                let name = n.ident.to_string();
                if name == "self" {
                    if let Some(alias) = prefix.last().cloned() {
                        self.scope_mut(module).imports.insert(alias, prefix);
                    }
                } else {
                    let path = join(&prefix, &[name.clone()]);
                    self.scope_mut(module).imports.insert(name, path);
                }
            }
            UseTree::Rename(r) => {
                let alias = r.rename.to_string();
                if alias == "_" {
                    return;
                }
                let name = r.ident.to_string();
                let path = if name == "self" { prefix } else { join(&prefix, &[name]) };
                self.scope_mut(module).imports.insert(alias, path);
            }
            UseTree::Glob(_) => {
                self.scope_mut(module).globs.push(prefix);
            }
            UseTree::Group(g) => {
                for item in &g.items {
                    self.index_use(module, prefix.clone(), item);
                }
            }
        }
    }

    fn declares(&self, module: &[String], name: &str) -> bool {
        self.module(module).is_some_and(|scope| scope.declares(name))
    }

    /// Resolves a call through a path: `f`, `a::b::f`, `Type::f`, `Self::f`.
    ///
    /// Returns `None` whenever the path cannot be placed; that is not an
    /// error.
    pub fn resolve_path(&self, scope: &Scope<'_>, segments: &[String]) -> Option<Symbol> {
        let (first, rest) = segments.split_first()?;

        if rest.len() == 1
            && PRIMITIVE_TYPES.contains(&first.as_str())
            && !self.declares(scope.module, first)
        {
            return Some(Symbol::universe(rest[0].clone()));
        }

        match self.absolutize(scope.module, scope.self_type, segments, false, 0) {
            Some(abs) => self.locate(&abs, scope.crate_name(), 0),
            None if rest.is_empty() && PRELUDE_FUNCTIONS.contains(&first.as_str()) => {
                Some(Symbol::universe(first.clone()))
            }
            None => None,
        }
    }

    /// Resolves `receiver.name(...)` by the method name alone.
    ///
    /// The receiver's type is not consulted, except that `self.name()` inside
    /// an `impl` prefers methods declared for that impl's type. Same-named
    /// methods declared in one module share a node. Order: the current
    /// module, the only declaring module, the only declaring trait.
    pub fn resolve_method(
        &self,
        scope: &Scope<'_>,
        receiver_is_self: bool,
        name: &str,
    ) -> Option<Symbol> {
        let here = scope.module_key();

        if receiver_is_self {
            let self_decls = scope
                .self_type
                .and_then(<[String]>::last)
                .and_then(|ty| self.type_methods.get(&(ty.clone(), name.to_string())));
            if let Some(decls) = self_decls {
                let module = if decls.contains_key(&here) {
                    here
                } else {
                    decls.keys().next()?.clone()
                };
                return Some(Symbol::in_package(module, name));
            }
        }

        let candidates = self.method_lookup.get(name)?;
        if candidates.contains(&here) {
            return Some(Symbol::in_package(here, name));
        }
        if let Some(only) = single(candidates) {
            return Some(Symbol::in_package(only.clone(), name));
        }
        // Several impls: a single trait declaring the method is the static callee.
        self.trait_methods
            .get(name)
            .and_then(single)
            .map(|module| Symbol::in_package(module.clone(), name))
    }

    /// Rewrites a path as written in `module` into a path from a crate root.
    fn absolutize(
        &self,
        module: &[String],
        self_type: Option<&[String]>,
        segments: &[String],
        from_use: bool,
        depth: usize,
    ) -> Option<Vec<String>> {
        if depth > MAX_DEPTH {
            return None;
        }
        let (first, rest) = segments.split_first()?;

        match first.as_str() {
            "crate" => return Some(join(module.get(..1)?, rest)),
            "self" => return Some(join(module, rest)),
            "super" => {
                let mut base = module.to_vec();
                let mut rest = segments;
                while rest.first().is_some_and(|s| s == "super") {
                    if base.len() <= 1 {
                        return None;
                    }
                    base.pop();
                    rest = &rest[1..];
                }
                return Some(join(&base, rest));
            }
            "Self" => {
                let ty = self.absolutize(module, None, self_type?, false, depth + 1)?;
                return Some(join(&ty, rest));
            }
            _ => {}
        }

        if let Some(scope) = self.module(module) {
            if scope.functions.contains_key(first)
                || scope.types.contains(first)
                || scope.modules.contains(first)
            {
                return Some(join(module, segments));
            }

            if let Some(target) = scope.imports.get(first) {
                // `use serde;` names the crate itself.
                let is_crate_itself = target.len() == 1 && target[0] == *first;
                if !is_crate_itself {
                    if let Some(abs) = self.absolutize(module, None, target, true, depth + 1) {
                        return Some(join(&abs, rest));
                    }
                }
            }

            for glob in &scope.globs {
                if let Some(base) = self.absolutize(module, None, glob, true, depth + 1) {
                    if base.as_slice() != module && self.declares(&base, first) {
                        return Some(join(&base, segments));
                    }
                }
            }
        }

        if self.crates.contains(first) || self.extern_crates.contains(first) {
            return Some(segments.to_vec());
        }
        if let Some(prefix) = prelude_module(first) {
            let prefix: Vec<String> = prefix.iter().map(|s| s.to_string()).collect();
            return Some(join(&prefix, segments));
        }
        // Roots of `use` paths that name nothing local are extern crates.
        if from_use {
            return Some(segments.to_vec());
        }
        None
    }

    /// Walks an absolute path to the function it names.
    fn locate(&self, abs: &[String], from_crate: &str, depth: usize) -> Option<Symbol> {
        if depth > MAX_DEPTH {
            return None;
        }
        let root = abs.first()?;
        if !self.crates.contains(root) {
            return Self::external_symbol(abs);
        }

        let mut module = vec![root.clone()];
        for (i, segment) in abs.iter().enumerate().skip(1) {
            let scope = self.module(&module)?;
            let last = i + 1 == abs.len();

            if last {
                if let Some(&public) = scope.functions.get(segment) {
                    if !public && module[0] != from_crate {
                        return None;
                    }
                    return Some(Symbol::in_package(module.join("::"), segment.clone()));
                }
            } else {
                if scope.modules.contains(segment) {
                    module.push(segment.clone());
                    continue;
                }
                if scope.types.contains(segment) {
                    if i + 2 != abs.len() {
                        return None;
                    }
                    return self.associated(&module.join("::"), segment, &abs[i + 1], from_crate);
                }
            }

            if let Some(target) = scope.imports.get(segment) {
                let redirected = self.absolutize(&module, None, target, true, depth + 1)?;
                return self.locate(&join(&redirected, &abs[i + 1..]), from_crate, depth + 1);
            }

            for glob in &scope.globs {
                if let Some(base) = self.absolutize(&module, None, glob, true, depth + 1) {
                    if base != module && self.declares(&base, segment) {
                        return self.locate(&join(&base, &abs[i..]), from_crate, depth + 1);
                    }
                }
            }
            return None;
        }
        None
    }

    /// `Type::method` where `Type` is declared in `type_module`.
    fn associated(
        &self,
        type_module: &str,
        type_name: &str,
        method: &str,
        from_crate: &str,
    ) -> Option<Symbol> {
        let decls = self
            .type_methods
            .get(&(type_name.to_string(), method.to_string()))?;
        let (module, &public) = decls
            .get_key_value(type_module)
            .or_else(|| decls.iter().next())?;
        let declaring_crate = module.split("::").next().unwrap_or_default();
        if !public && declaring_crate != from_crate {
            return None;
        }
        Some(Symbol::in_package(module.clone(), method))
    }

    /// Paths into crates whose sources are not loaded resolve by shape:
    /// the package is every leading module segment, the name the last one.
    fn external_symbol(abs: &[String]) -> Option<Symbol> {
        let (name, parents) = abs.split_last()?;
        if parents.is_empty() || is_type_like(name) {
            return None;
        }
        let package: Vec<&str> = parents
            .iter()
            .take_while(|s| !is_type_like(s))
            .map(String::as_str)
            .collect();
        Some(Symbol::in_package(package.join("::"), name.clone()))
    }
}
