use arcstr::ArcStr;
use fardel_common::{EdgeType, Item, ModuleId, RawDependency, RawExports, StrOrBytes};
use fardel_error::BuildDiagnostic;

#[derive(Debug, Default)]
pub struct ExtractedModule {
  /// Edges in declaration order.
  pub dependencies: Vec<RawDependency>,
  pub exports: RawExports,
}

/// Where a request of the module being rewritten ends up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolvedEdge {
  /// Merged into the same output.
  Inlined,
  /// Another output, relative to the current one.
  Path(String),
}

/// Maps a raw request and the edge type it was declared with to its resolution.
pub type EdgeResolver<'a> = dyn Fn(&str, EdgeType) -> Option<ResolvedEdge> + 'a;

/// Format specific knowledge: which edges a module declares and how its text is turned into
/// output.
pub trait FormatAdapter: Send + Sync {
  fn name(&self) -> &'static str;

  /// Whether this adapter handles the item. The first adapter of the registry that accepts an
  /// item owns it.
  fn test(&self, item: &Item) -> bool;

  fn extract(
    &self,
    id: &ModuleId,
    source: &StrOrBytes,
  ) -> Result<ExtractedModule, BuildDiagnostic>;

  /// The text handed to the linker. With `as_script` the result is an ES module.
  fn transform(
    &self,
    _id: &ModuleId,
    source: &StrOrBytes,
    _as_script: bool,
  ) -> Result<StrOrBytes, BuildDiagnostic> {
    Ok(source.clone())
  }

  /// Points every reference of a module that is emitted in its own format at its output.
  fn rewrite(
    &self,
    _id: &ModuleId,
    source: &str,
    _resolve: &EdgeResolver,
  ) -> Result<String, BuildDiagnostic> {
    Ok(source.to_string())
  }
}

pub fn source_text<'s>(
  id: &ModuleId,
  source: &'s StrOrBytes,
) -> Result<&'s ArcStr, BuildDiagnostic> {
  source
    .as_str()
    .ok_or_else(|| BuildDiagnostic::transform(id.to_string(), "content is not valid UTF-8"))
}

/// References the bundler leaves alone: inline data, fragments and anything on another origin.
pub(crate) fn is_external_reference(request: &str) -> bool {
  request.is_empty()
    || request.starts_with('#')
    || request.starts_with("data:")
    || request.starts_with("//")
    || request.contains("://")
}

#[test]
fn test_is_external_reference() {
  assert!(is_external_reference("data:image/png;base64,AAAA"));
  assert!(is_external_reference("#icon"));
  assert!(is_external_reference("https://cdn.test/a.png"));
  assert!(is_external_reference("//cdn.test/a.png"));
  assert!(!is_external_reference("./a.png"));
  assert!(!is_external_reference("/a.png"));
}
