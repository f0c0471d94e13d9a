use thiserror::Error;

#[derive(Debug, Error)]
pub enum BuildDiagnostic {
  #[error("Could not resolve \"{request}\" from {importer}: {reason}")]
  Resolution { request: String, importer: String, reason: String },

  /// A static import/export chain returns to a module already on it. `chain` starts at the first
  /// module of the cycle and ends with it again.
  #[error("Circular dependency: {}", chain.join(" -> "))]
  CircularDependency { chain: Vec<String> },

  #[error("No format adapter accepts {id}")]
  UnsupportedFormat { id: String },

  #[error("Failed to transform {id}: {message}")]
  Transform { id: String, message: String },

  #[error("\"{name}\" is not exported by {id}, imported by {importer}")]
  MissingExport { id: String, importer: String, name: String },

  #[error("Could not access {path}: {source}")]
  Io {
    path: String,
    #[source]
    source: std::io::Error,
  },

  #[error("Build was cancelled")]
  Cancelled,
}

impl BuildDiagnostic {
  pub fn transform(id: impl Into<String>, message: impl std::fmt::Display) -> Self {
    Self::Transform { id: id.into(), message: message.to_string() }
  }

  pub fn io(path: impl Into<String>, source: std::io::Error) -> Self {
    Self::Io { path: path.into(), source }
  }

  pub fn is_circular_dependency(&self) -> bool {
    matches!(self, Self::CircularDependency { .. })
  }
}
