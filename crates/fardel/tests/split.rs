mod common;

use common::{build, bundler, dependency_text, file_system, filenames};
use fardel::BuildDiagnostic;

#[tokio::test]
async fn static_cycles_fail_the_build() {
  let fs = file_system(&[
    ("src/a.js", "import { b } from \"./b.js\";\nexport const a = b;\n"),
    ("src/b.js", "import { a } from \"./a.js\";\nexport const b = 1;\n"),
  ]);
  let err = bundler(&fs, &["./src/a.js"]).build().await.unwrap_err();

  let chains = err
    .iter()
    .filter_map(|diagnostic| match diagnostic {
      BuildDiagnostic::CircularDependency { chain } => Some(chain),
      _ => None,
    })
    .collect::<Vec<_>>();
  assert!(!chains.is_empty(), "{err}");
  assert!(chains.iter().all(|chain| {
    chain.iter().any(|id| id == "src/a.js") && chain.iter().any(|id| id == "src/b.js")
  }));
}

#[tokio::test]
async fn lazy_chunks_may_import_their_importer() {
  let output = build(
    &[
      ("src/a.js", "export const x = 1;\nimport(\"./b.js\");\n"),
      ("src/b.js", "import { x } from \"./a.js\";\nconsole.log(x);\n"),
    ],
    &["./src/a.js"],
  )
  .await;
  assert_eq!(output.assets.len(), 2, "{:?}", filenames(&output));
  let code = dependency_text(&output);
  assert!(code.contains("const { x } = await import_a;"), "{code}");
  assert!(code.contains("console.log(x);"), "{code}");
}

#[tokio::test]
async fn diamonds_are_not_cycles() {
  let output = build(
    &[
      ("src/a.js", "import \"./b.js\";\nimport \"./c.js\";\n"),
      ("src/b.js", "import \"./d.js\";\n"),
      ("src/c.js", "import \"./d.js\";\n"),
      ("src/d.js", "console.log(\"d\");\n"),
    ],
    &["./src/a.js"],
  )
  .await;
  assert_eq!(filenames(&output), ["a.js"]);
  assert_eq!(output.get("a.js").unwrap().text().matches("// src/d.js").count(), 1);
}

#[tokio::test]
async fn shared_dependencies_get_one_chunk() {
  let output = build(
    &[
      ("src/a.js", "import \"./c.js\";\nconsole.log(\"a\");\n"),
      ("src/b.js", "import \"./c.js\";\nconsole.log(\"b\");\n"),
      ("src/c.js", "console.log(\"shared\");\n"),
    ],
    &["./src/a.js", "./src/b.js"],
  )
  .await;

  assert_eq!(output.assets.len(), 3, "{:?}", filenames(&output));
  assert!(dependency_text(&output).contains("console.log(\"shared\");"));
  for entry in ["a.js", "b.js"] {
    let code = output.get(entry).unwrap().text();
    assert!(!code.contains("shared"), "{code}");
    assert!(code.contains("from \"./deps/"), "{code}");
    assert!(code.contains("await import_c;"), "{code}");
  }
}

#[tokio::test]
async fn a_single_chain_is_inlined() {
  let output = build(
    &[
      ("src/a.js", "import \"./b.js\";\nconsole.log(\"a\");\n"),
      ("src/b.js", "import \"./c.js\";\nconsole.log(\"b\");\n"),
      ("src/c.js", "console.log(\"c\");\n"),
    ],
    &["./src/a.js"],
  )
  .await;

  assert_eq!(filenames(&output), ["a.js"]);
  let code = output.get("a.js").unwrap().text();
  let c = code.find("// src/c.js").unwrap();
  let b = code.find("// src/b.js").unwrap();
  let a = code.find("// src/a.js").unwrap();
  assert!(c < b && b < a, "{code}");
  assert!(!code.contains("import "), "{code}");
}

#[tokio::test]
async fn non_static_edges_get_their_own_chunk() {
  let output = build(
    &[
      (
        "src/a.js",
        "import(\"./lazy.js\");\nfetch(\"./data.bin\");\nnew Worker(\"./worker.js\");\n",
      ),
      ("src/lazy.js", "export default 1;\n"),
      ("src/data.bin", "binary"),
      ("src/worker.js", "self.onmessage = () => {};\n"),
    ],
    &["./src/a.js"],
  )
  .await;

  assert_eq!(output.assets.len(), 4, "{:?}", filenames(&output));
  let code = output.get("a.js").unwrap().text();
  assert!(code.contains("const loadDefault = (module) => module.default;"), "{code}");
  assert!(code.contains("import(\"./deps/"), "{code}");
  assert!(code.contains(").then(loadDefault)"), "{code}");
  assert!(code.contains("fetch(\"./deps/"), "{code}");
  assert!(!code.contains("new Worker(\"./deps/"), "{code}");

  let workers = filenames(&output)
    .into_iter()
    .filter(|filename| !filename.contains('/') && *filename != "a.js")
    .collect::<Vec<_>>();
  assert_eq!(workers.len(), 1);
  assert!(code.contains(&format!("new Worker(\"./{}\")", workers[0])), "{code}");

  let fetched = output.assets.iter().find(|asset| asset.filename.ends_with(".bin")).unwrap();
  assert_eq!(fetched.content_as_bytes(), b"binary");
}
