use fardel_common::{
  BindingShape, EdgeType, Format, Item, ModuleId, NamedBinding, RawDependency, RawExports,
  StrOrBytes,
};
use fardel_ecmascript::{EcmaCompiler, ScannedEdge, ScannedEdgeKind, ScannedModule};
use fardel_error::BuildDiagnostic;

use crate::{adapter::is_external_reference, source_text, ExtractedModule, FormatAdapter};

/// JavaScript, TypeScript and JSX modules.
pub struct ScriptAdapter;

impl FormatAdapter for ScriptAdapter {
  fn name(&self) -> &'static str {
    "script"
  }

  fn test(&self, item: &Item) -> bool {
    matches!(item.format, Format::Script)
  }

  fn extract(
    &self,
    id: &ModuleId,
    source: &StrOrBytes,
  ) -> Result<ExtractedModule, BuildDiagnostic> {
    let text = source_text(id, source)?;
    let source_type = EcmaCompiler::source_type_of(id.extension().unwrap_or_default());
    let ast = EcmaCompiler::parse(text.clone(), source_type)
      .map_err(|err| BuildDiagnostic::transform(id.to_string(), err))?;

    let scanned = ScannedModule::scan(&ast);
    Ok(ExtractedModule {
      dependencies: scanned
        .edges
        .into_iter()
        .filter(|edge| {
          matches!(edge.kind, ScannedEdgeKind::Static | ScannedEdgeKind::Dynamic)
            || !is_external_reference(&edge.request)
        })
        .map(raw_dependency)
        .collect(),
      exports: RawExports { named: scanned.exports, has_default: scanned.has_default_export },
    })
  }

  fn transform(
    &self,
    id: &ModuleId,
    source: &StrOrBytes,
    _as_script: bool,
  ) -> Result<StrOrBytes, BuildDiagnostic> {
    let text = source_text(id, source)?;
    let source_type = EcmaCompiler::source_type_of(id.extension().unwrap_or_default());
    if !EcmaCompiler::needs_transpile(source_type) {
      return Ok(source.clone());
    }

    let code = EcmaCompiler::transpile(id, text.clone(), source_type)
      .map_err(|err| BuildDiagnostic::transform(id.to_string(), err))?;
    Ok(StrOrBytes::Str(code.into()))
  }
}

fn raw_dependency(edge: ScannedEdge) -> RawDependency {
  let edge_type = match edge.kind {
    ScannedEdgeKind::Static => EdgeType::StaticImportExport,
    ScannedEdgeKind::Dynamic => EdgeType::DynamicImport,
    ScannedEdgeKind::Fetch => EdgeType::Fetch,
    ScannedEdgeKind::Worker => EdgeType::WebWorker,
    ScannedEdgeKind::ServiceWorker => EdgeType::ServiceWorker,
  };

  let mut dependency = RawDependency::new(edge.request, edge_type);
  dependency.format = match edge.asserted_type.as_deref() {
    Some("json") => Some(Format::Json),
    Some("css") => Some(Format::Style),
    _ => None,
  };
  dependency.is_export = edge.is_export;
  dependency.bindings = BindingShape {
    named: edge
      .named
      .into_iter()
      .map(|(imported, local)| NamedBinding { imported, local })
      .collect(),
    default: edge.default,
    namespace: edge.namespace,
    star: edge.star,
    type_only: edge.type_only,
  };
  dependency
}
