use arcstr::ArcStr;
use fardel_utils::indexmap::FxIndexMap;
use smallvec::SmallVec;

use crate::{EdgeType, Format, ModuleId};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamedBinding {
  pub imported: String,
  pub local: String,
}

/// What an edge binds in the importer. For re-exports `local` is the exported name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BindingShape {
  pub named: Vec<NamedBinding>,
  pub default: Option<String>,
  pub namespace: Option<String>,
  /// `export * from`
  pub star: bool,
  pub type_only: Vec<String>,
}

impl BindingShape {
  /// An edge that only carries types never exists at runtime.
  pub fn is_type_only(&self) -> bool {
    !self.type_only.is_empty()
      && self.named.is_empty()
      && self.default.is_none()
      && self.namespace.is_none()
      && !self.star
  }

  pub fn merge(&mut self, other: BindingShape) {
    self.named.extend(other.named);
    self.default = self.default.take().or(other.default);
    self.namespace = self.namespace.take().or(other.namespace);
    self.star |= other.star;
    self.type_only.extend(other.type_only);
  }
}

/// An edge as declared by a format adapter, before its request is resolved.
#[derive(Debug, Clone)]
pub struct RawDependency {
  pub request: ArcStr,
  pub edge_type: EdgeType,
  /// Set when the declaring syntax decides the format, e.g. `with { type: "json" }`.
  pub format: Option<Format>,
  pub bindings: BindingShape,
  pub is_export: bool,
}

impl RawDependency {
  pub fn new(request: impl Into<ArcStr>, edge_type: EdgeType) -> Self {
    Self {
      request: request.into(),
      edge_type,
      format: None,
      bindings: BindingShape::default(),
      is_export: false,
    }
  }

  pub fn with_format(mut self, format: Format) -> Self {
    self.format = Some(format);
    self
  }
}

#[derive(Debug, Clone)]
pub struct EdgeDescriptor {
  pub target: ModuleId,
  pub edge_type: EdgeType,
  pub format: Format,
  /// Every raw request string that resolved to `target`.
  pub requests: SmallVec<[ArcStr; 1]>,
  /// Position of the first declaration of this edge in the module.
  pub order: u32,
  pub bindings: BindingShape,
}

pub type DependencyKey = (ModuleId, EdgeType);

#[derive(Debug, Clone, Default)]
pub struct Dependencies {
  pub imports: FxIndexMap<DependencyKey, EdgeDescriptor>,
  pub exports: FxIndexMap<DependencyKey, EdgeDescriptor>,
}

impl Dependencies {
  pub fn is_empty(&self) -> bool {
    self.imports.is_empty() && self.exports.is_empty()
  }

  /// Imports and exports merged in declaration order. An edge declared both ways appears once.
  pub fn ordered(&self) -> Vec<&EdgeDescriptor> {
    let mut edges = self.imports.values().collect::<Vec<_>>();
    edges.extend(
      self.exports.iter().filter(|(key, _)| !self.imports.contains_key(*key)).map(|(_, edge)| edge),
    );
    edges.sort_by_key(|edge| edge.order);
    edges
  }

  pub fn static_targets(&self) -> impl Iterator<Item = &ModuleId> {
    self.ordered().into_iter().filter(|edge| edge.edge_type.is_static()).map(|edge| &edge.target)
  }

  /// The edge a raw request string of the given type resolved to.
  pub fn find_request(&self, request: &str, edge_type: EdgeType) -> Option<&EdgeDescriptor> {
    self
      .imports
      .values()
      .chain(self.exports.values())
      .find(|edge| edge.edge_type == edge_type && edge.requests.iter().any(|r| r == request))
  }
}

#[test]
fn type_only_bindings() {
  let mut shape = BindingShape { type_only: vec!["Props".to_string()], ..BindingShape::default() };
  assert!(shape.is_type_only());
  shape.merge(BindingShape { default: Some("React".to_string()), ..BindingShape::default() });
  assert!(!shape.is_type_only());
  assert!(!BindingShape::default().is_type_only());
}
