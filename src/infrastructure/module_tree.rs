//! Follows `mod` declarations from a crate root to every module file.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use syn::{Attribute, Expr, Item, Lit, Meta};
use tracing::{debug, warn};

use crate::domain::unit::CompilationUnit;
use crate::error::{LoadError, LoadResult};

/// A `mod name;` whose contents live in another file.
struct ModDecl {
    module_path: Vec<String>,
    candidates: Vec<PathBuf>,
    cfg_gated: bool,
    from_path_attr: bool,
}

/// Reads crates module by module. Each file becomes one compilation unit
/// per crate that reaches it: a file shared by a lib and a differently named
/// bin is read once for each. Targets with the same crate name (the usual
/// lib `foo` plus bin `foo`) share one module namespace, and a file they
/// both reach is read once.
#[derive(Default)]
pub struct ModuleTreeReader {
    units: Vec<CompilationUnit>,
    seen: HashSet<(String, PathBuf)>,
}

impl ModuleTreeReader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn read_crate(&mut self, crate_name: &str, root: &Path) -> LoadResult<()> {
        self.read_module(crate_name, vec![crate_name.to_string()], root, true)
    }

    pub fn finish(self) -> Vec<CompilationUnit> {
        self.units
    }

    /// `owns_dir` is true for crate roots, `mod.rs` files and `#[path]`
    /// files: their submodules live next to them rather than in a
    /// directory named after them.
    fn read_module(
        &mut self,
        crate_name: &str,
        module_path: Vec<String>,
        file: &Path,
        owns_dir: bool,
    ) -> LoadResult<()> {
        let canonical = file.canonicalize().unwrap_or_else(|_| file.to_path_buf());
        if !self.seen.insert((crate_name.to_string(), canonical)) {
            debug!(file = %file.display(), crate_name, "already loaded, skipping");
            return Ok(());
        }

        let unit = CompilationUnit::read(crate_name, module_path, file)?;
        let base = file.parent().unwrap_or_else(|| Path::new(".")).to_path_buf();
        let child_dir = match (owns_dir, file.file_stem()) {
            (false, Some(stem)) => base.join(stem),
            _ => base.clone(),
        };

        let mut decls = Vec::new();
        collect_mod_decls(&unit.syntax.items, &unit.module_path, &child_dir, &base, &mut decls);
        debug!(file = %file.display(), module = %unit.module_key(), submodules = decls.len(), "read module");
        self.units.push(unit);

        for decl in decls {
            match decl.candidates.iter().find(|p| p.is_file()) {
                Some(found) => {
                    let owns_dir = decl.from_path_attr
                        || found.file_name().is_some_and(|name| name == "mod.rs");
                    let found = found.clone();
                    self.read_module(crate_name, decl.module_path, &found, owns_dir)?;
                }
                None if decl.cfg_gated => {
                    warn!(
                        module = %decl.module_path.join("::"),
                        declared_in = %file.display(),
                        "no file for cfg-gated module, skipping"
                    );
                }
                None => {
                    return Err(LoadError::ModuleNotFound {
                        module: decl.module_path.join("::"),
                        declared_in: file.to_path_buf(),
                    });
                }
            }
        }
        Ok(())
    }
}

fn collect_mod_decls(
    items: &[Item],
    module_path: &[String],
    dir: &Path,
    path_attr_base: &Path,
    out: &mut Vec<ModDecl>,
) {
    for item in items {
        let Item::Mod(m) = item else { continue };
        let name = m.ident.to_string();
        let mut child_path = module_path.to_vec();
        child_path.push(name.clone());
        let explicit = path_attr(&m.attrs);

        match &m.content {
            Some((_, content)) => {
                let inner_dir = match &explicit {
                    Some(p) => dir.join(p),
                    None => dir.join(&name),
                };
                collect_mod_decls(content, &child_path, &inner_dir, &inner_dir, out);
            }
            None => {
                let candidates = match &explicit {
                    Some(p) => vec![path_attr_base.join(p)],
                    None => vec![dir.join(format!("{name}.rs")), dir.join(&name).join("mod.rs")],
                };
                out.push(ModDecl {
                    module_path: child_path,
                    candidates,
                    cfg_gated: m.attrs.iter().any(|a| a.path().is_ident("cfg")),
                    from_path_attr: explicit.is_some(),
                });
            }
        }
    }
}

/// Value of `#[path = "..."]`, if present.
fn path_attr(attrs: &[Attribute]) -> Option<String> {
    attrs.iter().find_map(|attr| match &attr.meta {
        Meta::NameValue(nv) if nv.path.is_ident("path") => match &nv.value {
            Expr::Lit(lit) => match &lit.lit {
                Lit::Str(s) => Some(s.value()),
                _ => None,
            },
            _ => None,
        },
        _ => None,
    })
}
