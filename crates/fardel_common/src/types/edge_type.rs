use serde::Deserialize;

/// How a module was reached. Only static import/export edges are merged into the importer's scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EdgeType {
  StaticImportExport,
  DynamicImport,
  Fetch,
  WebWorker,
  ServiceWorker,
  WebManifest,
}

impl EdgeType {
  pub fn is_static(self) -> bool {
    matches!(self, Self::StaticImportExport)
  }

  /// Workers and service workers are served from the bundle root so their scope is not narrowed.
  pub fn is_served_from_root(self) -> bool {
    matches!(self, Self::WebWorker | Self::ServiceWorker)
  }

  pub fn as_str(self) -> &'static str {
    match self {
      Self::StaticImportExport => "static",
      Self::DynamicImport => "dynamic",
      Self::Fetch => "fetch",
      Self::WebWorker => "worker",
      Self::ServiceWorker => "service-worker",
      Self::WebManifest => "manifest",
    }
  }
}

impl std::fmt::Display for EdgeType {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.write_str(self.as_str())
  }
}
