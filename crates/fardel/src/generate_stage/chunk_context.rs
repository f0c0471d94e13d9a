use std::iter;

use arcstr::ArcStr;
use fardel_adapter::{source_text, AdapterRegistry, FormatAdapter, ResolvedEdge};
use fardel_common::{
  Asset, Chunk, EdgeType, Graph, Item, ModuleId, NormalizedBundlerOptions, StrOrBytes,
};
use fardel_error::BuildDiagnostic;
use fardel_utils::path_ext::PathExt;
use rustc_hash::{FxHashMap, FxHashSet};

use crate::types::transform_cache::TransformCache;

#[derive(Clone, Copy)]
pub struct ChunkModule<'a> {
  pub item: &'a Item,
  pub asset: &'a Asset,
}

/// Everything the linkers need to generate one chunk.
pub struct ChunkContext<'a> {
  pub graph: &'a Graph,
  pub chunk: &'a Chunk,
  pub root: &'a Asset,
  pub options: &'a NormalizedBundlerOptions,
  pub adapters: &'a AdapterRegistry,
  pub cache: &'a dyn TransformCache,
}

#[derive(PartialEq, Eq, Hash, Debug)]
enum Status<'a> {
  ToBeExecuted(&'a ModuleId),
  WaitForExit(&'a ModuleId),
}

impl<'a> ChunkContext<'a> {
  pub fn adapter(&self, item: &Item) -> Result<&'a dyn FormatAdapter, BuildDiagnostic> {
    self
      .adapters
      .select(item)
      .ok_or_else(|| BuildDiagnostic::UnsupportedFormat { id: self.options.stable_id(item.id()) })
  }

  /// The text the adapter hands to the linker, cached per chunk root.
  pub fn transformed(&self, module: ChunkModule) -> Result<ArcStr, BuildDiagnostic> {
    let root = self.chunk.root();
    let id = &module.asset.id;
    if let Some(cached) = self.cache.get(root, id) {
      return Ok(cached);
    }

    let source = self
      .graph
      .source(id)
      .ok_or_else(|| BuildDiagnostic::transform(module.asset.stable_id.clone(), "not loaded"))?;
    let transformed =
      self.adapter(module.item)?.transform(id, source, module.asset.as_script)?;
    let text = source_text(id, &transformed)?.clone();
    self.cache.set(root, id, text.clone());
    Ok(text)
  }

  pub fn source(&self, asset: &Asset) -> Result<&'a StrOrBytes, BuildDiagnostic> {
    self
      .graph
      .source(&asset.id)
      .ok_or_else(|| BuildDiagnostic::transform(asset.stable_id.clone(), "not loaded"))
  }

  /// `target`'s output, relative to this chunk's output.
  pub fn import_path(&self, target: &Asset) -> String {
    let from = self.options.output_file(&self.root.output_path);
    from.import_path_to(&self.options.output_file(&target.output_path))
  }

  pub fn resolve_edge(
    &self,
    importer: &Asset,
    request: &str,
    edge_type: EdgeType,
  ) -> Option<ResolvedEdge> {
    let edge = importer.dependencies.find_request(request, edge_type)?;
    if edge.edge_type.is_static() && self.chunk.contains(&edge.target) {
      return Some(ResolvedEdge::Inlined);
    }
    let target = self.graph.get(&edge.target, edge.edge_type)?;
    Some(ResolvedEdge::Path(self.import_path(target)))
  }

  /// The modules of the chunk, dependencies before their dependents. The root comes last.
  pub fn sorted_modules(&self) -> Vec<ChunkModule<'a>> {
    let chunk = self.chunk;
    let items = iter::once(&chunk.item)
      .chain(chunk.dependency_items.iter())
      .map(|item| (item.id(), item))
      .collect::<FxHashMap<_, _>>();

    let mut execution_stack = vec![Status::ToBeExecuted(chunk.root())];
    let mut executed_ids = FxHashSet::default();
    let mut sorted_modules = Vec::with_capacity(items.len());

    while let Some(status) = execution_stack.pop() {
      match status {
        Status::ToBeExecuted(id) => {
          if !executed_ids.insert(id) {
            continue;
          }
          let Some(asset) = items.get(id).and_then(|item| self.graph.get(id, item.edge_type))
          else {
            continue;
          };
          execution_stack.push(Status::WaitForExit(id));
          execution_stack.extend(
            asset
              .dependencies
              .static_targets()
              .filter(|target| target != &id && items.contains_key(target))
              .collect::<Vec<_>>()
              .into_iter()
              .rev()
              .map(Status::ToBeExecuted),
          );
        }
        Status::WaitForExit(id) => {
          if let Some(asset) = self.graph.get(id, items[id].edge_type) {
            sorted_modules.push(ChunkModule { item: items[id], asset });
          }
        }
      }
    }

    sorted_modules
  }
}
