use std::{path::Path, time::SystemTime};

use fardel_common::{Chunk, Graph, ModuleId, Reload};
use fardel_fs::FileSystem;
use rustc_hash::{FxHashMap, FxHashSet};

/// What the previous build of a `Bundler` saw and produced.
#[derive(Debug, Default, Clone)]
pub struct BuildState {
  modified: FxHashMap<ModuleId, Option<SystemTime>>,
  /// Output path to the modules the chunk was made of.
  outputs: FxHashMap<String, Vec<ModuleId>>,
}

impl BuildState {
  /// Modules that are new, were modified since the previous build or are named by `reload`.
  pub fn changed_modules(&self, graph: &Graph, reload: &Reload) -> FxHashSet<ModuleId> {
    graph
      .iter()
      .filter(|asset| {
        reload.affects(&asset.id)
          || self.modified.get(&asset.id).is_none_or(|previous| *previous != asset.modified)
      })
      .map(|asset| asset.id.clone())
      .collect()
  }

  /// A chunk is skipped when it is made of the same unchanged modules as last time and its
  /// output is still there.
  pub fn can_skip(
    &self,
    chunk: &Chunk,
    output_path: &str,
    output_file: &Path,
    changed: &FxHashSet<ModuleId>,
    fs: &dyn FileSystem,
  ) -> bool {
    let Some(previous) = self.outputs.get(output_path) else {
      return false;
    };
    previous.iter().eq(chunk.module_ids())
      && chunk.module_ids().all(|id| !changed.contains(id))
      && fs.exists(output_file)
  }

  pub fn record_modules(&mut self, graph: &Graph) {
    self.modified = graph.iter().map(|asset| (asset.id.clone(), asset.modified)).collect();
  }

  pub fn record_output(&mut self, output_path: String, chunk: &Chunk) {
    self.outputs.insert(output_path, chunk.module_ids().cloned().collect());
  }

  pub fn forget_output(&mut self, output_path: &str) {
    self.outputs.remove(output_path);
  }
}
