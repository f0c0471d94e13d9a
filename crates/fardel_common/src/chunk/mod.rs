use crate::{EdgeType, Item, ModuleId};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChunkKind {
  /// Rooted at a user supplied entry.
  Entry,
  /// Rooted at the target of a non-static edge.
  Async(EdgeType),
  /// Reached statically from more than one chunk root.
  Shared,
  /// Reached statically from a chunk whose format cannot host it.
  Isolated,
}

/// One output file: a root item and everything inlined into it.
#[derive(Debug, Clone)]
pub struct Chunk {
  pub item: Item,
  /// Inlined items in traversal order, first occurrence wins.
  pub dependency_items: Vec<Item>,
  pub kind: ChunkKind,
}

impl Chunk {
  pub fn new(item: Item, kind: ChunkKind) -> Self {
    Self { item, dependency_items: vec![], kind }
  }

  pub fn root(&self) -> &ModuleId {
    self.item.id()
  }

  /// The root followed by every inlined module.
  pub fn module_ids(&self) -> impl Iterator<Item = &ModuleId> {
    std::iter::once(self.item.id()).chain(self.dependency_items.iter().map(Item::id))
  }

  pub fn contains(&self, id: &ModuleId) -> bool {
    self.module_ids().any(|module| module == id)
  }
}
