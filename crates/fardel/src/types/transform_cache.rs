use arcstr::ArcStr;
use dashmap::DashMap;
use fardel_common::ModuleId;

/// Transformed module text, keyed by the root of the chunk it was linked into and the module.
pub trait TransformCache: Send + Sync {
  fn get(&self, root: &ModuleId, module: &ModuleId) -> Option<ArcStr>;

  fn set(&self, root: &ModuleId, module: &ModuleId, content: ArcStr);

  fn has(&self, root: &ModuleId, module: &ModuleId) -> bool {
    self.get(root, module).is_some()
  }

  /// Drops every entry of `module`, whatever chunk it was linked into.
  fn invalidate(&self, module: &ModuleId);
}

#[derive(Debug, Default)]
pub struct MemoryTransformCache {
  entries: DashMap<(ModuleId, ModuleId), ArcStr>,
}

impl MemoryTransformCache {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn len(&self) -> usize {
    self.entries.len()
  }

  pub fn is_empty(&self) -> bool {
    self.entries.is_empty()
  }
}

impl TransformCache for MemoryTransformCache {
  fn get(&self, root: &ModuleId, module: &ModuleId) -> Option<ArcStr> {
    self.entries.get(&(root.clone(), module.clone())).map(|entry| entry.value().clone())
  }

  fn set(&self, root: &ModuleId, module: &ModuleId, content: ArcStr) {
    self.entries.insert((root.clone(), module.clone()), content);
  }

  fn invalidate(&self, module: &ModuleId) {
    self.entries.retain(|(_, cached), _| cached != module);
  }
}

#[test]
fn invalidate_drops_every_root() {
  let cache = MemoryTransformCache::new();
  let (a, b, shared) = (ModuleId::from("/a.js"), ModuleId::from("/b.js"), ModuleId::from("/c.js"));
  cache.set(&a, &shared, "c".into());
  cache.set(&b, &shared, "c".into());
  cache.set(&a, &a, "a".into());
  assert!(cache.has(&b, &shared));

  cache.invalidate(&shared);
  assert!(!cache.has(&a, &shared));
  assert!(!cache.has(&b, &shared));
  assert_eq!(cache.get(&a, &a).as_deref(), Some("a"));
  assert_eq!(cache.len(), 1);
}
