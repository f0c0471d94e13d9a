use std::{collections::BTreeMap, path::Path};

use serde::Deserialize;
use sugar_path::SugarPath;

use crate::ResolveError;

#[derive(Deserialize)]
struct RawImportMap {
  #[serde(default)]
  imports: BTreeMap<String, String>,
}

/// Prefix substitutions applied to every request before it is resolved.
#[derive(Debug, Clone, Default)]
pub struct ImportMap {
  /// `(prefix, target)`, longest prefix first.
  entries: Vec<(String, String)>,
}

impl ImportMap {
  /// Parses `{ "imports": { ... } }`. Relative targets are resolved against `base`, usually the
  /// directory containing the import map.
  pub fn from_json(json: &str, base: &Path) -> Result<Self, ResolveError> {
    let raw: RawImportMap = serde_json::from_str(json)?;
    Ok(Self::from_entries(raw.imports, base))
  }

  pub fn from_entries(entries: impl IntoIterator<Item = (String, String)>, base: &Path) -> Self {
    let mut map = Self::default();
    map.extend(entries, base);
    map
  }

  /// Adds entries. A prefix already present is replaced.
  pub fn extend(&mut self, entries: impl IntoIterator<Item = (String, String)>, base: &Path) {
    for (prefix, target) in entries {
      let target = Self::resolve_target(&target, base);
      match self.entries.iter_mut().find(|(existing, _)| *existing == prefix) {
        Some(entry) => entry.1 = target,
        None => self.entries.push((prefix, target)),
      }
    }
    self.entries.sort_by(|(a, _), (b, _)| b.len().cmp(&a.len()).then_with(|| a.cmp(b)));
  }

  pub fn is_empty(&self) -> bool {
    self.entries.is_empty()
  }

  /// Substitutes the longest matching prefix. A prefix matches the whole request, or the start of
  /// it when the prefix ends with `/`.
  pub fn resolve(&self, request: &str) -> Option<String> {
    self.entries.iter().find_map(|(prefix, target)| {
      if request == prefix {
        Some(target.clone())
      } else if prefix.ends_with('/') && request.starts_with(prefix.as_str()) {
        Some(format!("{target}{}", &request[prefix.len()..]))
      } else {
        None
      }
    })
  }

  fn resolve_target(target: &str, base: &Path) -> String {
    if !(target.starts_with("./") || target.starts_with("../")) {
      return target.to_string();
    }
    let resolved = base.join(target).normalize();
    let mut resolved = resolved.to_string_lossy().into_owned();
    if target.ends_with('/') && !resolved.ends_with(std::path::MAIN_SEPARATOR) {
      resolved.push(std::path::MAIN_SEPARATOR);
    }
    resolved
  }
}

#[cfg(all(test, unix))]
mod tests {
  use super::*;

  #[test]
  fn longest_prefix_wins() {
    let map = ImportMap::from_json(
      r#"{
        "imports": {
          "lib/": "./vendor/lib/",
          "lib/special/": "https://cdn.test/special/",
          "react": "./vendor/react.js"
        }
      }"#,
      Path::new("/project"),
    )
    .unwrap();

    assert_eq!(map.resolve("react").as_deref(), Some("/project/vendor/react.js"));
    assert_eq!(map.resolve("lib/a.js").as_deref(), Some("/project/vendor/lib/a.js"));
    assert_eq!(map.resolve("lib/special/b.js").as_deref(), Some("https://cdn.test/special/b.js"));
    assert_eq!(map.resolve("react-dom"), None);
    assert_eq!(map.resolve("./local.js"), None);
  }

  #[test]
  fn later_entries_replace_earlier_ones() {
    let mut map = ImportMap::from_entries(
      [("app".to_string(), "./a.js".to_string())],
      Path::new("/project"),
    );
    map.extend([("app".to_string(), "./b.js".to_string())], Path::new("/project"));
    assert_eq!(map.resolve("app").as_deref(), Some("/project/b.js"));
  }

  #[test]
  fn rejects_malformed_json() {
    assert!(ImportMap::from_json("{ imports: 1 }", Path::new("/")).is_err());
  }
}
