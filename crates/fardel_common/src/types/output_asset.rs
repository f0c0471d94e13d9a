use crate::Format;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputContent {
  Text(String),
  Bytes(Vec<u8>),
}

impl OutputContent {
  pub fn as_bytes(&self) -> &[u8] {
    match self {
      Self::Text(text) => text.as_bytes(),
      Self::Bytes(bytes) => bytes,
    }
  }

  pub fn as_text(&self) -> Option<&str> {
    match self {
      Self::Text(text) => Some(text),
      Self::Bytes(_) => None,
    }
  }

  pub fn len(&self) -> usize {
    self.as_bytes().len()
  }

  pub fn is_empty(&self) -> bool {
    self.len() == 0
  }
}

#[derive(Debug, Clone)]
pub struct OutputAsset {
  /// Relative to the output directory.
  pub filename: String,
  pub content: OutputContent,
  /// The format the chunk was emitted as.
  pub format: Format,
}

impl OutputAsset {
  pub fn filename(&self) -> &str {
    &self.filename
  }

  pub fn content_as_bytes(&self) -> &[u8] {
    self.content.as_bytes()
  }

  pub fn text(&self) -> &str {
    self.content.as_text().unwrap_or_default()
  }
}
