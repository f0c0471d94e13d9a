mod common;

use common::{build, bundler, dependency_text, file_system};
use fardel::BuildDiagnostic;

#[tokio::test]
async fn colliding_names_get_a_suffix() {
  let output = build(
    &[
      (
        "src/a.ts",
        "import { x as other } from \"./b.ts\";\nexport const x = \"a\";\nconsole.log(other, x);",
      ),
      ("src/b.ts", "export const x: string = \"b\";\n"),
    ],
    &["./src/a.ts"],
  )
  .await;

  let code = output.get("a.js").unwrap().text();
  assert!(code.contains("const x = \"b\";"), "{code}");
  assert!(code.contains("const x1 = \"a\";"), "{code}");
  assert!(code.contains("console.log(x, x1);"), "{code}");
  assert!(code.contains("const b_exports = (async () => ({ x }))();"), "{code}");
  assert!(code.ends_with("export default (async () => ({ x: x1 }))();\n"), "{code}");
  assert!(code.find("// src/b.ts").unwrap() < code.find("// src/a.ts").unwrap());
}

#[tokio::test]
async fn names_taken_by_nested_scopes_are_skipped() {
  let a = "import \"./b.js\";
const value = 2;
function f() {
  const value1 = 3;
  return value + value1;
}
f();
";
  let output =
    build(&[("src/a.js", a), ("src/b.js", "export const value = 1;\n")], &["./src/a.js"]).await;

  let code = output.get("a.js").unwrap().text();
  assert!(code.contains("const value = 1;"), "{code}");
  assert!(code.contains("const value2 = 2;"), "{code}");
  assert!(code.contains("return value2 + value1;"), "{code}");
}

#[tokio::test]
async fn reexports_resolve_to_the_declaring_module() {
  let output = build(
    &[
      ("src/a.js", "import { answer, ns } from \"./b.js\";\nconsole.log(answer, ns);\n"),
      ("src/b.js", "export { value as answer } from \"./c.js\";\nexport * as ns from \"./c.js\";"),
      ("src/c.js", "export const value = 42;\n"),
    ],
    &["./src/a.js"],
  )
  .await;

  let code = output.get("a.js").unwrap().text();
  assert!(code.contains("const value = 42;"), "{code}");
  assert!(code.contains("const ns = await c_exports;"), "{code}");
  assert!(code.contains("console.log(value, ns);"), "{code}");
  let record = "const b_exports = (async () => ({ answer: value, ns: await c_exports }))();";
  assert!(code.contains(record), "{code}");
}

#[tokio::test]
async fn star_exports_are_spread_into_the_record() {
  let output = build(
    &[
      ("src/a.js", "export * from \"./b.js\";\nexport const own = 1;\n"),
      ("src/b.js", "export const value = 2;\n"),
    ],
    &["./src/a.js"],
  )
  .await;

  let code = output.get("a.js").unwrap().text();
  let record = "export default (async () => ({ ...(await b_exports), own }))();";
  assert!(code.contains(record), "{code}");
}

#[tokio::test]
async fn named_imports_from_other_chunks_are_destructured() {
  let output = build(
    &[
      ("src/a.js", "import { value as v } from \"./shared.js\";\nconsole.log(v);\n"),
      ("src/b.js", "import { value } from \"./shared.js\";\nconsole.log(value);\n"),
      ("src/shared.js", "export const value = 1;\n"),
    ],
    &["./src/a.js", "./src/b.js"],
  )
  .await;

  let a = output.get("a.js").unwrap().text();
  assert!(a.starts_with("import import_shared from \"./deps/"), "{a}");
  assert!(a.contains("const { value: v } = await import_shared;"), "{a}");
  let b = output.get("b.js").unwrap().text();
  assert!(b.contains("const { value } = await import_shared;"), "{b}");
  assert!(dependency_text(&output).contains("export default (async () => ({ value }))();"));
}

#[tokio::test]
async fn missing_exports_fail_only_their_chunk() {
  let fs = file_system(&[
    ("src/a.js", "import { nope } from \"./c.js\";\nconsole.log(nope);\n"),
    ("src/b.js", "console.log(\"b\");\n"),
    ("src/c.js", "export const value = 1;\n"),
  ]);
  let mut bundler = bundler(&fs, &["./src/a.js", "./src/b.js"]);

  let output = bundler.build().await.unwrap();
  assert!(output.get("b.js").is_some());
  assert_eq!(output.failed.len(), 1);
  let (filename, err) = &output.failed[0];
  assert_eq!(filename, "a.js");
  assert!(matches!(err, BuildDiagnostic::MissingExport { name, .. } if name == "nope"));

  let err = bundler.write().await.unwrap_err();
  assert!(matches!(&err[0], BuildDiagnostic::MissingExport { .. }));
  assert!(fs.paths().iter().any(|path| path.ends_with("dist/b.js")));
  assert!(!fs.paths().iter().any(|path| path.ends_with("dist/a.js")));
}

#[tokio::test]
async fn json_and_styles_consumed_by_scripts() {
  let output = build(
    &[
      (
        "src/a.js",
        concat!(
          "import data from \"./data.json\";\n",
          "import sheet from \"./a.css\";\n",
          "console.log(data.a, sheet);\n",
        ),
      ),
      ("src/data.json", "{ \"a\": 1 }\n"),
      ("src/a.css", "@import \"./base.css\";\n.a { color: red; }\n"),
      ("src/base.css", "body { margin: 0; }\n"),
    ],
    &["./src/a.js"],
  )
  .await;

  let code = output.get("a.js").unwrap().text();
  assert!(code.contains("const data_default = { \"a\": 1 };"), "{code}");
  assert!(code.contains("console.log(data_default.a, sheet);"), "{code}");
  assert!(code.contains("await import_a;"), "{code}");

  let style = dependency_text(&output);
  assert!(style.contains("new CSSStyleSheet()"), "{style}");
  assert!(style.contains("body { margin: 0; }"), "{style}");
  assert!(style.contains(".a { color: red; }"), "{style}");
  assert!(!style.contains("@import"), "{style}");
}

#[tokio::test]
async fn stylesheet_entries_inline_their_imports() {
  let output = build(
    &[
      ("src/main.css", "@import \"./base.css\";\n.main { background: url(./logo.png); }\n"),
      ("src/base.css", "body { margin: 0; }\n"),
      ("src/logo.png", "png"),
    ],
    &["./src/main.css"],
  )
  .await;

  let css = output.get("main.css").unwrap().text();
  let prefix = "/* src/base.css */\nbody { margin: 0; }\n/* src/main.css */\n";
  assert!(css.starts_with(prefix), "{css}");
  assert!(css.contains("url(./deps/"), "{css}");
  assert!(output.assets.iter().any(|asset| asset.filename.ends_with(".png")));
}

#[tokio::test]
async fn identical_inputs_give_identical_bundles() {
  let files = [
    ("src/a.ts", "import { b } from \"./b.ts\";\nimport(\"./c.ts\");\nexport const a = b;\n"),
    ("src/b.ts", "export const b = 1;\n"),
    ("src/c.ts", "import { b } from \"./b.ts\";\nexport default b;\n"),
    ("src/d.ts", "import { b } from \"./b.ts\";\nexport { b };\n"),
  ];
  let first = build(&files, &["./src/a.ts", "./src/d.ts"]).await;
  let second = build(&files, &["./src/a.ts", "./src/d.ts"]).await;
  assert_eq!(first.bundle(), second.bundle());
}

#[tokio::test]
async fn unused_imports_do_not_change_bindings() {
  let with_unused = build(
    &[
      (
        "src/a.js",
        concat!(
          "import { other } from \"./c.js\";\n",
          "import { value } from \"./b.js\";\n",
          "console.log(value);\n",
        ),
      ),
      ("src/b.js", "export const value = 1;\n"),
      ("src/c.js", "export const other = 2;\n"),
    ],
    &["./src/a.js"],
  )
  .await;
  let without = build(
    &[
      ("src/a.js", "import { value } from \"./b.js\";\nconsole.log(value);\n"),
      ("src/b.js", "export const value = 1;\n"),
    ],
    &["./src/a.js"],
  )
  .await;

  for output in [with_unused, without] {
    let code = output.get("a.js").unwrap().text().to_string();
    assert!(code.contains("const value = 1;"), "{code}");
    assert!(code.contains("console.log(value);"), "{code}");
  }
}
