use fardel_common::{Asset, EdgeType, Graph};
use fardel_ecmascript::ImportedName;
use fardel_error::BuildDiagnostic;
use rustc_hash::FxHashSet;

use super::{unresolved, ScriptLinker};

/// What an imported or re-exported name ends up referring to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Binding {
  /// A top-level name of the merged scope.
  Name(String),
  /// The export record of a merged module.
  Namespace(usize),
  /// A name exported by a separately chunked module, or its whole record.
  External(usize, Option<String>),
}

#[derive(Debug, Clone, Copy)]
pub enum Target {
  Inlined(usize),
  External(usize),
}

impl ScriptLinker<'_, '_> {
  pub(super) fn target_of(&self, idx: usize, request: &str) -> Result<Target, BuildDiagnostic> {
    let importer = self.modules[idx].asset;
    let edge = importer
      .dependencies
      .find_request(request, EdgeType::StaticImportExport)
      .ok_or_else(|| unresolved(importer, request))?;
    if let Some(module) = self.module_indexes.get(&edge.target) {
      return Ok(Target::Inlined(*module));
    }
    self
      .externals
      .get_index_of(&edge.target)
      .map(Target::External)
      .ok_or_else(|| unresolved(importer, request))
  }

  /// Follows `import { imported } from request` as written in module `idx`.
  pub(super) fn resolve_import(
    &self,
    idx: usize,
    request: &str,
    imported: &ImportedName,
  ) -> Result<Binding, BuildDiagnostic> {
    let target = self.target_of(idx, request)?;
    let name = match imported {
      ImportedName::Named(name) => name,
      ImportedName::Namespace => {
        return Ok(match target {
          Target::Inlined(module) => Binding::Namespace(module),
          Target::External(external) => Binding::External(external, None),
        });
      }
    };

    let binding = match target {
      Target::Inlined(module) => self.resolve_export(module, name, &mut FxHashSet::default()),
      Target::External(external) => {
        surface_has(self.ctx.graph, self.externals[external].asset, name)
          .then(|| Binding::External(external, Some(name.clone())))
      }
    };

    binding.ok_or_else(|| {
      let id = match target {
        Target::Inlined(module) => self.modules[module].asset.stable_id.clone(),
        Target::External(external) => self.externals[external].asset.stable_id.clone(),
      };
      BuildDiagnostic::MissingExport {
        id,
        importer: self.modules[idx].asset.stable_id.clone(),
        name: name.clone(),
      }
    })
  }

  /// Resolves an export of a merged module through re-export chains and `export *`.
  fn resolve_export(
    &self,
    idx: usize,
    name: &str,
    visited: &mut FxHashSet<usize>,
  ) -> Option<Binding> {
    if !visited.insert(idx) {
      return None;
    }
    let analysis = &self.analyses[idx];

    if let Some(export) = analysis.local_exports.iter().find(|export| export.exported == name) {
      return Some(Binding::Name(self.names[idx][export.local].clone()));
    }

    if let Some(reexport) = analysis.reexports.iter().find(|reexport| reexport.exported == name) {
      return self.resolve_import(idx, &reexport.request, &reexport.imported).ok();
    }

    // `export *` never forwards a default export.
    if name == "default" {
      return None;
    }
    for star in &analysis.star_exports {
      let found = match self.target_of(idx, &star.request).ok()? {
        Target::Inlined(module) => self.resolve_export(module, name, visited),
        Target::External(external) => {
          surface_has(self.ctx.graph, self.externals[external].asset, name)
            .then(|| Binding::External(external, Some(name.to_string())))
        }
      };
      if found.is_some() {
        return found;
      }
    }

    None
  }
}

/// Whether a module's export surface has `name`, looking through `export *`.
pub fn surface_has(graph: &Graph, asset: &Asset, name: &str) -> bool {
  let surface = &asset.export_surface;
  if name == "default" {
    return surface.has_default;
  }
  surface.named.iter().any(|exported| exported == name)
    || surface.star_targets.iter().any(|target| {
      graph
        .get(target, EdgeType::StaticImportExport)
        .is_some_and(|target| surface_has(graph, target, name))
    })
}
