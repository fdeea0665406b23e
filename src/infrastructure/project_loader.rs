use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use cargo_metadata::{Metadata, MetadataCommand, Package};
use tracing::{debug, info};

use crate::domain::unit::Program;
use crate::error::{LoadError, LoadResult};
use crate::infrastructure::module_tree::ModuleTreeReader;
use crate::ports::ProgramLoader;

/// Target kinds whose sources are part of the program. A library built with
/// `crate-type = ["cdylib", "rlib"]` reports those crate types as its kinds.
/// Tests, benches, examples and build scripts are left out.
const PROGRAM_KINDS: &[&str] = &[
    "lib",
    "rlib",
    "dylib",
    "cdylib",
    "staticlib",
    "proc-macro",
    "bin",
];

/// Which workspace packages a pattern selects.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PackageSelection {
    /// The package whose manifest is exactly this file.
    Manifest(PathBuf),
    /// Every workspace member whose manifest lies under this directory.
    Under(PathBuf),
}

/// Loads Cargo packages through `cargo metadata`.
pub struct WorkspaceLoader {
    pattern: String,
    selection: PackageSelection,
}

impl WorkspaceLoader {
    /// `crates/foo` or `crates/foo/Cargo.toml` selects one package;
    /// `./...` or `crates/...` selects every member below that directory.
    pub fn from_pattern(pattern: &str) -> Self {
        let selection = match pattern.strip_suffix("...") {
            Some(prefix) => {
                let dir = prefix.trim_end_matches(['/', '\\']);
                let dir = if dir.is_empty() { "." } else { dir };
                PackageSelection::Under(PathBuf::from(dir))
            }
            None => {
                let path = PathBuf::from(pattern);
                if path.file_name().is_some_and(|name| name == "Cargo.toml") {
                    PackageSelection::Manifest(path)
                } else {
                    PackageSelection::Manifest(path.join("Cargo.toml"))
                }
            }
        };
        Self {
            pattern: pattern.to_string(),
            selection,
        }
    }

    pub fn selection(&self) -> &PackageSelection {
        &self.selection
    }

    fn metadata(&self) -> LoadResult<Metadata> {
        let mut cmd = MetadataCommand::new();
        cmd.no_deps();
        match &self.selection {
            PackageSelection::Manifest(manifest) => {
                cmd.manifest_path(manifest);
            }
            // Let cargo search upwards for the workspace, as it does from a
            // member directory.
            PackageSelection::Under(dir) => {
                cmd.current_dir(dir);
            }
        }
        Ok(cmd.exec()?)
    }

    /// Workspace members in manifest order, filtered by the selection.
    fn select_packages<'m>(&self, metadata: &'m Metadata) -> Vec<&'m Package> {
        let members = metadata
            .workspace_members
            .iter()
            .filter_map(|id| metadata.packages.iter().find(|p| &p.id == id));

        match &self.selection {
            PackageSelection::Manifest(manifest) => {
                let wanted = canonical(manifest);
                members
                    .filter(|p| canonical(p.manifest_path.as_std_path()) == wanted)
                    .collect()
            }
            PackageSelection::Under(dir) => {
                let root = canonical(dir);
                members
                    .filter(|p| {
                        p.manifest_path
                            .parent()
                            .is_some_and(|d| canonical(d.as_std_path()).starts_with(&root))
                    })
                    .collect()
            }
        }
    }
}

fn canonical(path: &Path) -> PathBuf {
    path.canonicalize().unwrap_or_else(|_| path.to_path_buf())
}

/// Name a crate is referred to by in paths: `my-lib` -> `my_lib`.
fn crate_ident(name: &str) -> String {
    name.replace('-', "_")
}

impl ProgramLoader for WorkspaceLoader {
    fn load(&self) -> LoadResult<Program> {
        let metadata = self.metadata()?;
        let packages = self.select_packages(&metadata);
        if packages.is_empty() {
            return Err(LoadError::NoPackages(self.pattern.clone()));
        }

        let mut reader = ModuleTreeReader::new();
        let mut externs = BTreeSet::new();

        for package in &packages {
            for dep in &package.dependencies {
                externs.insert(crate_ident(dep.rename.as_deref().unwrap_or(&dep.name)));
            }

            for target in &package.targets {
                if !target.kind.iter().any(|k| PROGRAM_KINDS.contains(&k.as_str())) {
                    debug!(package = %package.name, target = %target.name, kind = ?target.kind, "skipping target");
                    continue;
                }
                let crate_name = crate_ident(&target.name);
                debug!(package = %package.name, target = %crate_name, root = %target.src_path, "reading crate");
                reader.read_crate(&crate_name, target.src_path.as_std_path())?;
            }
        }

        let units = reader.finish();
        if units.is_empty() {
            return Err(LoadError::NoSources(self.pattern.clone()));
        }
        info!(
            packages = packages.len(),
            units = units.len(),
            "loaded workspace"
        );
        let externs: Vec<String> = externs.into_iter().collect();
        Ok(Program::new(units, &externs))
    }
}
