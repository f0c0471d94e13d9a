use fardel_common::{EdgeType, Format, Item, ModuleId, RawDependency, StrOrBytes};
use fardel_error::BuildDiagnostic;
use serde_json::Value;

use crate::{
  adapter::is_external_reference, source_text, EdgeResolver, ExtractedModule, FormatAdapter,
  ResolvedEdge,
};

/// Web app manifests. Image sources of icons, screenshots and shortcut icons are fetched.
pub struct ManifestAdapter;

/// Every `src` string of the manifest that names an image, ordered by manifest key.
fn image_sources(manifest: &mut Value) -> Vec<&mut String> {
  let Value::Object(manifest) = manifest else {
    return vec![];
  };

  let mut sources = vec![];
  for (key, value) in manifest.iter_mut() {
    match (key.as_str(), value) {
      ("icons" | "screenshots", Value::Array(images)) => {
        sources.extend(images.iter_mut().filter_map(image_source));
      }
      ("shortcuts", Value::Array(shortcuts)) => {
        for shortcut in shortcuts {
          if let Some(Value::Array(icons)) = shortcut.get_mut("icons") {
            sources.extend(icons.iter_mut().filter_map(image_source));
          }
        }
      }
      _ => {}
    }
  }
  sources
}

fn image_source(image: &mut Value) -> Option<&mut String> {
  match image.get_mut("src")? {
    Value::String(src) if !is_external_reference(src) => Some(src),
    _ => None,
  }
}

fn parse(id: &ModuleId, source: &str) -> Result<Value, BuildDiagnostic> {
  serde_json::from_str(source).map_err(|err| BuildDiagnostic::transform(id.to_string(), err))
}

impl FormatAdapter for ManifestAdapter {
  fn name(&self) -> &'static str {
    "manifest"
  }

  fn test(&self, item: &Item) -> bool {
    matches!(item.format, Format::WebManifest)
  }

  fn extract(
    &self,
    id: &ModuleId,
    source: &StrOrBytes,
  ) -> Result<ExtractedModule, BuildDiagnostic> {
    let mut manifest = parse(id, source_text(id, source)?)?;
    let dependencies = image_sources(&mut manifest)
      .into_iter()
      .map(|src| RawDependency::new(src.as_str(), EdgeType::Fetch))
      .collect();
    Ok(ExtractedModule { dependencies, ..ExtractedModule::default() })
  }

  fn rewrite(
    &self,
    id: &ModuleId,
    source: &str,
    resolve: &EdgeResolver,
  ) -> Result<String, BuildDiagnostic> {
    let mut manifest = parse(id, source)?;
    for src in image_sources(&mut manifest) {
      if let Some(ResolvedEdge::Path(path)) = resolve(src.as_str(), EdgeType::Fetch) {
        *src = path;
      }
    }
    serde_json::to_string_pretty(&manifest)
      .map_err(|err| BuildDiagnostic::transform(id.to_string(), err))
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  const MANIFEST: &str = r#"{
    "name": "App",
    "icons": [{ "src": "./icon-192.png", "sizes": "192x192" }, { "src": "https://cdn.test/x.png" }],
    "shortcuts": [{ "name": "New", "icons": [{ "src": "./new.png" }] }],
    "screenshots": [{ "src": "./shot.png" }]
  }"#;

  #[test]
  fn extracts_image_sources() {
    let source = StrOrBytes::Str(MANIFEST.into());
    let module =
      ManifestAdapter.extract(&ModuleId::from("/src/site.webmanifest"), &source).unwrap();
    let requests = module.dependencies.iter().map(|dep| dep.request.as_str()).collect::<Vec<_>>();
    assert_eq!(requests, ["./icon-192.png", "./shot.png", "./new.png"]);
    assert!(module.dependencies.iter().all(|dep| dep.edge_type == EdgeType::Fetch));
  }

  #[test]
  fn rewrites_image_sources() {
    let output = ManifestAdapter
      .rewrite(&ModuleId::from("/src/site.webmanifest"), MANIFEST, &|request, _| {
        (request == "./new.png").then(|| ResolvedEdge::Path("./deps/abc.png".to_string()))
      })
      .unwrap();
    let manifest: Value = serde_json::from_str(&output).unwrap();
    assert_eq!(manifest["shortcuts"][0]["icons"][0]["src"], "./deps/abc.png");
    assert_eq!(manifest["icons"][0]["src"], "./icon-192.png");
  }

  #[test]
  fn invalid_manifest_is_a_transform_error() {
    let source = StrOrBytes::Str("{ icons: [] }".into());
    let error = ManifestAdapter.extract(&ModuleId::from("/a.webmanifest"), &source).unwrap_err();
    assert!(matches!(error, BuildDiagnostic::Transform { .. }));
  }
}
