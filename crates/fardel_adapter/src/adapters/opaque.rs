use fardel_common::{EdgeType, Format, Item, ModuleId, StrOrBytes};
use fardel_error::BuildDiagnostic;

use crate::{ExtractedModule, FormatAdapter};

/// Fetched resources and binary files are copied as they are.
pub struct OpaqueAdapter;

impl FormatAdapter for OpaqueAdapter {
  fn name(&self) -> &'static str {
    "opaque"
  }

  fn test(&self, item: &Item) -> bool {
    matches!(item.edge_type, EdgeType::Fetch)
      || (matches!(item.format, Format::Binary) && !item.edge_type.is_static())
  }

  fn extract(
    &self,
    _id: &ModuleId,
    _source: &StrOrBytes,
  ) -> Result<ExtractedModule, BuildDiagnostic> {
    Ok(ExtractedModule::default())
  }
}

#[test]
fn claims_fetched_and_binary_items() {
  let entry = Item::entry(ModuleId::from("/main.js"), Format::Script);
  let fetched = entry.child(ModuleId::from("/data.json"), EdgeType::Fetch, Format::Json);
  let image = entry.child(ModuleId::from("/a.png"), EdgeType::DynamicImport, Format::Binary);
  let imported = entry.child(ModuleId::from("/b.js"), EdgeType::StaticImportExport, Format::Script);

  assert!(OpaqueAdapter.test(&fetched));
  assert!(OpaqueAdapter.test(&image));
  assert!(!OpaqueAdapter.test(&imported));
  assert!(!OpaqueAdapter.test(&entry));
}
