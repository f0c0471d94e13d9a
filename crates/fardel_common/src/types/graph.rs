use oxc_index::IndexVec;
use rustc_hash::FxHashMap;

use crate::{Asset, AssetIdx, EdgeType, ModuleId, StrOrBytes};

/// Every asset of a build, keyed by the specifier and the edge type it was reached under, together
/// with the raw content read for each specifier.
#[derive(Debug, Default)]
pub struct Graph {
  pub assets: IndexVec<AssetIdx, Asset>,
  index: FxHashMap<(ModuleId, EdgeType), AssetIdx>,
  sources: FxHashMap<ModuleId, StrOrBytes>,
}

impl Graph {
  pub fn insert(&mut self, asset: Asset) -> AssetIdx {
    let key = asset.key();
    let idx = self.assets.push(asset);
    self.index.insert(key, idx);
    idx
  }

  pub fn get(&self, id: &ModuleId, edge_type: EdgeType) -> Option<&Asset> {
    self.idx_of(id, edge_type).map(|idx| &self.assets[idx])
  }

  pub fn idx_of(&self, id: &ModuleId, edge_type: EdgeType) -> Option<AssetIdx> {
    self.index.get(&(id.clone(), edge_type)).copied()
  }

  pub fn contains(&self, id: &ModuleId, edge_type: EdgeType) -> bool {
    self.idx_of(id, edge_type).is_some()
  }

  pub fn set_source(&mut self, id: ModuleId, source: StrOrBytes) {
    self.sources.entry(id).or_insert(source);
  }

  pub fn source(&self, id: &ModuleId) -> Option<&StrOrBytes> {
    self.sources.get(id)
  }

  pub fn len(&self) -> usize {
    self.assets.len()
  }

  pub fn is_empty(&self) -> bool {
    self.assets.is_empty()
  }

  pub fn iter(&self) -> impl Iterator<Item = &Asset> {
    self.assets.iter()
  }
}
