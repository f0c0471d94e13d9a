use fardel_common::{Format, Item, ModuleId, RawExports, StrOrBytes};
use fardel_error::BuildDiagnostic;
use fardel_utils::concat_string;

use crate::{source_text, ExtractedModule, FormatAdapter};

/// JSON documents. They declare no edges; consumed by a script they become a default export.
pub struct JsonAdapter;

impl FormatAdapter for JsonAdapter {
  fn name(&self) -> &'static str {
    "json"
  }

  fn test(&self, item: &Item) -> bool {
    matches!(item.format, Format::Json)
  }

  fn extract(
    &self,
    id: &ModuleId,
    source: &StrOrBytes,
  ) -> Result<ExtractedModule, BuildDiagnostic> {
    let text = source_text(id, source)?;
    serde_json::from_str::<serde_json::Value>(text)
      .map_err(|err| BuildDiagnostic::transform(id.to_string(), err))?;
    Ok(ExtractedModule {
      dependencies: vec![],
      exports: RawExports { named: vec![], has_default: true },
    })
  }

  fn transform(
    &self,
    id: &ModuleId,
    source: &StrOrBytes,
    as_script: bool,
  ) -> Result<StrOrBytes, BuildDiagnostic> {
    if !as_script {
      return Ok(source.clone());
    }
    let text = source_text(id, source)?;
    Ok(StrOrBytes::Str(concat_string!("export default ", text.trim(), ";\n").into()))
  }
}

#[test]
fn json_as_script_module() {
  let id = ModuleId::from("/data.json");
  let source = StrOrBytes::Str("{ \"a\": 1 }\n".into());
  let module = JsonAdapter.extract(&id, &source).unwrap();
  assert!(module.dependencies.is_empty());
  assert!(module.exports.has_default);

  let script = JsonAdapter.transform(&id, &source, true).unwrap();
  assert_eq!(script.as_str().map(|s| s.as_str()), Some("export default { \"a\": 1 };\n"));

  let invalid = StrOrBytes::Str("{ a: 1 }".into());
  assert!(JsonAdapter.extract(&id, &invalid).is_err());
}
