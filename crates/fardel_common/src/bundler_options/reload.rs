use serde::Deserialize;

/// Which unchanged modules are rebuilt anyway on the next build.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(from = "RawReload")]
pub enum Reload {
  #[default]
  Off,
  All,
  /// Module paths. Relative paths are resolved against the working directory when normalized.
  Only(Vec<String>),
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawReload {
  Flag(bool),
  Only(Vec<String>),
}

impl From<RawReload> for Reload {
  fn from(value: RawReload) -> Self {
    match value {
      RawReload::Flag(true) => Self::All,
      RawReload::Flag(false) => Self::Off,
      RawReload::Only(ids) => Self::Only(ids),
    }
  }
}

impl Reload {
  pub fn affects(&self, id: &str) -> bool {
    match self {
      Self::Off => false,
      Self::All => true,
      Self::Only(ids) => ids.iter().any(|reload| reload == id),
    }
  }
}

#[test]
fn test_reload_affects() {
  assert!(!Reload::Off.affects("/a.js"));
  assert!(Reload::All.affects("/a.js"));
  let only = Reload::Only(vec!["/a.js".to_string()]);
  assert!(only.affects("/a.js"));
  assert!(!only.affects("/b.js"));
}
