pub mod normalized_bundler_options;
pub mod reload;

use std::{collections::BTreeMap, path::PathBuf};

use serde::Deserialize;

use crate::Reload;

#[derive(Default, Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct BundlerOptions {
  // --- Input
  pub input: Option<Vec<String>>,
  pub cwd: Option<PathBuf>,
  /// Path of an import map file: `{ "imports": { "prefix": "target" } }`.
  pub import_map: Option<PathBuf>,
  /// Inline import map entries, resolved against `cwd`. Merged over the file's entries.
  pub imports: Option<BTreeMap<String, String>>,

  // --- Output
  pub dir: Option<String>,
  pub deps_dir: Option<String>,
  /// Explicit output paths, keyed by module path relative to `cwd`.
  pub output_map: Option<BTreeMap<String, String>>,
  pub minify: Option<bool>,

  // --- Incremental
  pub reload: Option<Reload>,
}

#[test]
fn deserialize_camel_case_options() {
  let options: BundlerOptions = serde_json::from_str(
    r#"{
      "input": ["./src/main.ts"],
      "dir": "public",
      "outputMap": { "./src/sw.ts": "sw.js" },
      "reload": ["./src/a.ts"]
    }"#,
  )
  .unwrap();

  assert_eq!(options.input, Some(vec!["./src/main.ts".to_string()]));
  assert_eq!(options.dir.as_deref(), Some("public"));
  assert_eq!(options.output_map.unwrap()["./src/sw.ts"], "sw.js");
  assert_eq!(options.reload, Some(Reload::Only(vec!["./src/a.ts".to_string()])));
  assert!(serde_json::from_str::<BundlerOptions>(r#"{ "format": "cjs" }"#).is_err());
}
