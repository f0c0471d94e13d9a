use crate::ModuleId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Format {
  Script,
  Style,
  Markup,
  Json,
  WebManifest,
  Binary,
}

impl Format {
  pub fn from_extension(ext: &str) -> Self {
    match ext {
      "js" | "mjs" | "cjs" | "jsx" | "ts" | "mts" | "cts" | "tsx" => Self::Script,
      "css" => Self::Style,
      "html" | "htm" => Self::Markup,
      "json" => Self::Json,
      "webmanifest" => Self::WebManifest,
      _ => Self::Binary,
    }
  }

  pub fn from_id(id: &ModuleId) -> Self {
    id.extension().map_or(Self::Binary, Self::from_extension)
  }

  /// Whether a chunk rooted at a module of this format can inline `dependency` through a static
  /// edge. Anything else becomes a chunk of its own.
  pub fn can_inline(self, dependency: Format) -> bool {
    match self {
      Self::Script => matches!(dependency, Self::Script | Self::Json),
      Self::Style => matches!(dependency, Self::Style),
      Self::Markup | Self::Json | Self::WebManifest | Self::Binary => false,
    }
  }
}

#[test]
fn test_format_from_extension() {
  assert_eq!(Format::from_id(&ModuleId::from("/a.tsx")), Format::Script);
  assert_eq!(Format::from_id(&ModuleId::from("/a.htm")), Format::Markup);
  assert_eq!(Format::from_id(&ModuleId::from("/site.webmanifest")), Format::WebManifest);
  assert_eq!(Format::from_id(&ModuleId::from("/logo.png")), Format::Binary);
  assert_eq!(Format::from_id(&ModuleId::from("/Makefile")), Format::Binary);
}

#[test]
fn test_can_inline() {
  assert!(Format::Script.can_inline(Format::Json));
  assert!(!Format::Script.can_inline(Format::Style));
  assert!(Format::Style.can_inline(Format::Style));
  assert!(!Format::Markup.can_inline(Format::Script));
}
