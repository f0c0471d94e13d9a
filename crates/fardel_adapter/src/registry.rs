use fardel_common::Item;

use crate::{
  FormatAdapter, JsonAdapter, ManifestAdapter, MarkupAdapter, OpaqueAdapter, ScriptAdapter,
  StyleAdapter,
};

/// Adapters in priority order. The first one whose `test` accepts an item handles it.
pub struct AdapterRegistry {
  adapters: Vec<Box<dyn FormatAdapter>>,
}

impl AdapterRegistry {
  pub fn new(adapters: Vec<Box<dyn FormatAdapter>>) -> Self {
    Self { adapters }
  }

  pub fn builtin() -> Self {
    Self::new(vec![
      Box::new(OpaqueAdapter),
      Box::new(ScriptAdapter),
      Box::new(StyleAdapter),
      Box::new(MarkupAdapter),
      Box::new(ManifestAdapter),
      Box::new(JsonAdapter),
    ])
  }

  pub fn select(&self, item: &Item) -> Option<&dyn FormatAdapter> {
    self.adapters.iter().find(|adapter| adapter.test(item)).map(AsRef::as_ref)
  }

  pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
    self.adapters.iter().map(|adapter| adapter.name())
  }
}

impl Default for AdapterRegistry {
  fn default() -> Self {
    Self::builtin()
  }
}

#[cfg(test)]
mod tests {
  use fardel_common::{EdgeType, Format, ModuleId};

  use super::*;

  #[test]
  fn first_match_wins() {
    let registry = AdapterRegistry::default();
    assert_eq!(
      registry.names().collect::<Vec<_>>(),
      ["opaque", "script", "style", "markup", "manifest", "json"]
    );

    let entry = Item::entry(ModuleId::from("/index.html"), Format::Markup);
    let select = |item: &Item| registry.select(item).map(|adapter| adapter.name());
    assert_eq!(select(&entry), Some("markup"));

    let script =
      entry.child(ModuleId::from("/main.ts"), EdgeType::StaticImportExport, Format::Script);
    assert_eq!(select(&script), Some("script"));

    let fetched = script.child(ModuleId::from("/other.ts"), EdgeType::Fetch, Format::Script);
    assert_eq!(select(&fetched), Some("opaque"));

    let binary =
      script.child(ModuleId::from("/a.png"), EdgeType::StaticImportExport, Format::Binary);
    assert_eq!(select(&binary), None);
  }
}
