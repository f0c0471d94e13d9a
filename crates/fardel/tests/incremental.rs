mod common;

use std::{path::Path, sync::Arc};

use common::{bundler, file_system, filenames};
use fardel::{BuildDiagnostic, FileSystem, MemoryTransformCache, Reload};

const FILES: &[(&str, &str)] = &[
  ("src/a.js", "import { shared } from \"./shared.js\";\nconsole.log(\"a\", shared);\n"),
  ("src/b.js", "import { shared } from \"./shared.js\";\nconsole.log(\"b\", shared);\n"),
  ("src/shared.js", "export const shared = 1;\n"),
];

#[tokio::test]
async fn unchanged_builds_skip_every_chunk() {
  let fs = file_system(FILES);
  let mut bundler = bundler(&fs, &["./src/a.js", "./src/b.js"]);

  let first = bundler.write().await.unwrap();
  assert_eq!(first.assets.len(), 3);
  assert!(first.skipped.is_empty());

  let second = bundler.write().await.unwrap();
  assert!(second.assets.is_empty(), "{:?}", filenames(&second));
  assert_eq!(second.skipped.len(), 3);
}

#[tokio::test]
async fn only_chunks_of_modified_modules_are_generated() {
  let fs = file_system(FILES);
  let mut bundler = bundler(&fs, &["./src/a.js", "./src/b.js"]);
  bundler.write().await.unwrap();

  fs.add_file(Path::new("/project/src/b.js"), "import \"./shared.js\";\nconsole.log(\"b2\");\n");
  let output = bundler.write().await.unwrap();
  assert_eq!(filenames(&output), ["b.js"]);
  assert!(output.get("b.js").unwrap().text().contains("console.log(\"b2\");"));
  assert_eq!(output.skipped.len(), 2);
}

#[tokio::test]
async fn reload_regenerates_named_modules() {
  let fs = file_system(FILES);
  let mut bundler = bundler(&fs, &["./src/a.js", "./src/b.js"]);
  bundler.write().await.unwrap();

  bundler.set_reload(Reload::Only(vec!["src/a.js".to_string()]));
  let output = bundler.write().await.unwrap();
  assert_eq!(filenames(&output), ["a.js"]);

  bundler.set_reload(Reload::All);
  let output = bundler.write().await.unwrap();
  assert_eq!(output.assets.len(), 3);
}

#[tokio::test]
async fn builds_that_are_not_written_do_not_count() {
  let fs = file_system(&[("src/a.js", "console.log(\"v1\");\n")]);
  let mut bundler = bundler(&fs, &["./src/a.js"]);
  bundler.write().await.unwrap();

  fs.add_file(Path::new("/project/src/a.js"), "console.log(\"v2\");\n");
  let built = bundler.build().await.unwrap();
  assert_eq!(filenames(&built), ["a.js"]);

  let output = bundler.write().await.unwrap();
  assert_eq!(filenames(&output), ["a.js"]);
  let written = fs.read_to_string(Path::new("/project/dist/a.js")).unwrap();
  assert!(written.contains("console.log(\"v2\");"), "{written}");
}

#[tokio::test]
async fn deleted_outputs_are_generated_again() {
  let fs = file_system(FILES);
  let mut bundler = bundler(&fs, &["./src/a.js", "./src/b.js"]);
  bundler.write().await.unwrap();

  fs.remove_file(Path::new("/project/dist/a.js")).unwrap();
  let output = bundler.write().await.unwrap();
  assert_eq!(filenames(&output), ["a.js"]);
}

#[tokio::test]
async fn modified_modules_are_transformed_again() {
  let fs = file_system(&[("src/a.ts", "export const a: number = 1;\n")]);
  let cache = Arc::new(MemoryTransformCache::new());
  let mut bundler = bundler(&fs, &["./src/a.ts"]).with_transform_cache(Arc::clone(&cache) as _);

  bundler.write().await.unwrap();
  assert_eq!(cache.len(), 1);

  fs.add_file(Path::new("/project/src/a.ts"), "export const a: number = 2;\n");
  let output = bundler.write().await.unwrap();
  assert!(output.get("a.js").unwrap().text().contains("const a = 2;"));
}

#[tokio::test]
async fn cancelled_builds_stop() {
  let fs = file_system(FILES);
  let mut bundler = bundler(&fs, &["./src/a.js"]);
  bundler.cancellation_token().cancel();

  let err = bundler.build().await.unwrap_err();
  assert!(matches!(err[0], BuildDiagnostic::Cancelled));
}

#[tokio::test]
async fn cancelled_bundlers_build_again() {
  let fs = file_system(FILES);
  let mut bundler = bundler(&fs, &["./src/a.js"]);
  bundler.cancellation_token().cancel();
  assert!(bundler.build().await.is_err());

  let output = bundler.build().await.unwrap();
  assert_eq!(filenames(&output), ["a.js"]);

  let token = bundler.cancellation_token();
  assert!(!token.is_cancelled());
  token.cancel();
  let err = bundler.write().await.unwrap_err();
  assert!(matches!(err[0], BuildDiagnostic::Cancelled));
}
