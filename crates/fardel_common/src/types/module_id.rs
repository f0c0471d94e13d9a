use std::path::Path;

use arcstr::ArcStr;
use sugar_path::SugarPath;

/// `ModuleId` is the unique string identifier for each module: a normalized absolute file path or
/// an absolute URL. Two ids are the same module iff their strings are equal.
#[derive(Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Clone)]
pub struct ModuleId(ArcStr);

impl ModuleId {
  pub fn new(value: impl Into<ArcStr>) -> Self {
    Self(value.into())
  }

  pub fn is_url(&self) -> bool {
    self.0.contains("://")
  }

  /// The id relative to `cwd`, with forward slashes. Used in diagnostics and marker comments.
  pub fn stabilize(&self, cwd: &Path) -> String {
    if !self.is_url() && self.as_path().is_absolute() {
      self.relative(cwd).as_path().to_slash_lossy().into_owned()
    } else {
      self.to_string()
    }
  }

  /// The file name of the module, without query or fragment for URLs.
  pub fn file_name(&self) -> &str {
    let path = if self.is_url() {
      self.0.split(['?', '#']).next().unwrap_or_default()
    } else {
      self.0.as_str()
    };
    path.rsplit(['/', '\\']).next().unwrap_or(path)
  }

  pub fn extension(&self) -> Option<&str> {
    self.file_name().rsplit_once('.').map(|(_, ext)| ext).filter(|ext| !ext.is_empty())
  }

  pub fn inner(&self) -> &ArcStr {
    &self.0
  }
}

impl std::ops::Deref for ModuleId {
  type Target = str;

  fn deref(&self) -> &Self::Target {
    &self.0
  }
}

impl AsRef<str> for ModuleId {
  fn as_ref(&self) -> &str {
    self
  }
}

impl From<ArcStr> for ModuleId {
  fn from(value: ArcStr) -> Self {
    Self::new(value)
  }
}

impl From<&str> for ModuleId {
  fn from(value: &str) -> Self {
    Self::new(value)
  }
}

impl std::fmt::Display for ModuleId {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.write_str(&self.0)
  }
}

#[test]
fn test_extension() {
  assert_eq!(ModuleId::from("/src/a.ts").extension(), Some("ts"));
  assert_eq!(ModuleId::from("/src/LICENSE").extension(), None);
  assert_eq!(ModuleId::from("https://cdn.test/lib.mjs?v=1").extension(), Some("mjs"));
  assert_eq!(ModuleId::from("/src.d/file").extension(), None);
}

#[test]
fn test_stabilize() {
  let cwd = Path::new("/project");
  assert_eq!(ModuleId::from("/project/src/a.ts").stabilize(cwd), "src/a.ts");
  assert_eq!(ModuleId::from("https://cdn.test/a.js").stabilize(cwd), "https://cdn.test/a.js");
}
