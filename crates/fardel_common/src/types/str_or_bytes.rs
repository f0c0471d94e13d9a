use std::sync::Arc;

use arcstr::ArcStr;

#[derive(Debug, Clone)]
pub enum StrOrBytes {
  Str(ArcStr),
  Bytes(Arc<[u8]>),
}

impl Default for StrOrBytes {
  fn default() -> Self {
    Self::Str(ArcStr::default())
  }
}

impl StrOrBytes {
  /// Keeps the content as text when it is valid UTF-8.
  pub fn from_bytes(bytes: Vec<u8>) -> Self {
    match simdutf8::basic::from_utf8(&bytes) {
      Ok(text) => Self::Str(ArcStr::from(text)),
      Err(_) => Self::Bytes(bytes.into()),
    }
  }

  pub fn as_str(&self) -> Option<&ArcStr> {
    match self {
      Self::Str(source) => Some(source),
      Self::Bytes(_) => None,
    }
  }

  pub fn as_bytes(&self) -> &[u8] {
    match self {
      Self::Str(source) => source.as_bytes(),
      Self::Bytes(bytes) => bytes,
    }
  }
}

#[test]
fn test_from_bytes() {
  assert!(matches!(StrOrBytes::from_bytes(b"body {}".to_vec()), StrOrBytes::Str(_)));
  let png = StrOrBytes::from_bytes(vec![0x89, 0x50, 0x4e, 0x47, 0xff]);
  assert!(png.as_str().is_none());
  assert_eq!(png.as_bytes().len(), 5);
}
