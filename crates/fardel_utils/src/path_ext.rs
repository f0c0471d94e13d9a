use std::{borrow::Cow, ffi::OsStr, path::Path};

use sugar_path::SugarPath;

pub trait PathExt {
  fn expect_to_slash(&self) -> String;

  fn representative_file_name(&self) -> Cow<str>;

  /// `to`, relative to the directory containing `self`, always starting with `.`.
  fn import_path_to(&self, to: &Path) -> String;
}

impl PathExt for Path {
  fn expect_to_slash(&self) -> String {
    self
      .to_slash()
      .unwrap_or_else(|| panic!("Failed to convert {:?} to slash str", self.display()))
      .into_owned()
  }

  /// It doesn't ensure the file name is a valid identifier in JS.
  fn representative_file_name(&self) -> Cow<str> {
    let file_name =
      self.file_stem().map_or_else(|| self.to_string_lossy(), |stem| stem.to_string_lossy());

    let file_name = match &*file_name {
      // "index": Node.js use `index` as a special name for directory import.
      // "mod": https://docs.deno.com/runtime/manual/references/contributing/style_guide#do-not-use-the-filename-indextsindexjs.
      "index" | "mod" => self
        .parent()
        .and_then(Self::file_stem)
        .map(OsStr::to_string_lossy)
        .map_or(file_name, |parent_dir_name| parent_dir_name),
      _ => file_name,
    };

    file_name
  }

  fn import_path_to(&self, to: &Path) -> String {
    let source_dir = self.parent().unwrap_or(self);
    let import_path = to.relative(source_dir).as_path().expect_to_slash();
    if import_path.starts_with('.') {
      import_path
    } else {
      format!("./{import_path}")
    }
  }
}

#[test]
fn test_representative_file_name() {
  let cwd = Path::new(".").join("project");
  let path = cwd.join("src").join("vue.js");
  assert_eq!(path.representative_file_name(), "vue");

  let path = cwd.join("vue").join("index.js");
  assert_eq!(path.representative_file_name(), "vue");

  let path = cwd.join("vue").join("mod.ts");
  assert_eq!(path.representative_file_name(), "vue");
}

#[test]
fn test_import_path_to() {
  let dist = Path::new("/dist");
  assert_eq!(dist.join("main.js").import_path_to(&dist.join("deps/a.js")), "./deps/a.js");
  assert_eq!(dist.join("deps/a.js").import_path_to(&dist.join("deps/b.js")), "./b.js");
  assert_eq!(dist.join("deps/a.js").import_path_to(&dist.join("worker.js")), "../worker.js");
}
