use thiserror::Error;

#[derive(Debug, Error)]
pub enum ResolveError {
  #[error("bare specifiers must be mapped by the import map")]
  BareSpecifier,

  #[error("invalid URL: {0}")]
  InvalidUrl(#[from] url::ParseError),

  #[error("invalid import map: {0}")]
  InvalidImportMap(#[from] serde_json::Error),
}
