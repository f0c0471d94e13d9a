use std::path::{Path, PathBuf};

use fardel_common::{BundlerOptions, ModuleId, NormalizedBundlerOptions, Reload};
use fardel_error::{BuildDiagnostic, BuildResult};
use fardel_fs::FileSystem;
use fardel_resolver::ImportMap;
use sugar_path::SugarPath;

pub struct NormalizeOptionsReturn {
  pub options: NormalizedBundlerOptions,
  pub import_map: ImportMap,
}

pub fn normalize_options(
  raw_options: BundlerOptions,
  fs: &dyn FileSystem,
) -> BuildResult<NormalizeOptionsReturn> {
  let cwd = match raw_options.cwd {
    Some(cwd) if cwd.is_absolute() => cwd.normalize(),
    Some(cwd) => current_dir()?.join(cwd).normalize(),
    None => current_dir()?,
  };

  let import_map_path = raw_options.import_map.map(|path| cwd.join(path).normalize());
  let mut import_map = match &import_map_path {
    Some(path) => {
      let json = fs
        .read_to_string(path)
        .map_err(|err| BuildDiagnostic::io(path.to_string_lossy(), err))?;
      let base = path.parent().unwrap_or(&cwd);
      ImportMap::from_json(&json, base)
        .map_err(|err| BuildDiagnostic::transform(path.to_string_lossy(), err))?
    }
    None => ImportMap::default(),
  };
  let imports = raw_options.imports.unwrap_or_default();
  import_map.extend(imports.clone(), &cwd);

  let output_map = raw_options
    .output_map
    .unwrap_or_default()
    .into_iter()
    .map(|(module, output)| {
      let output = output.strip_prefix("./").map(str::to_string).unwrap_or(output);
      (module_id_in(&cwd, &module), output)
    })
    .collect();

  let reload = normalize_reload(raw_options.reload.unwrap_or_default(), &cwd);

  let options = NormalizedBundlerOptions {
    input: raw_options.input.unwrap_or_default(),
    import_map: import_map_path,
    imports,
    dir: raw_options.dir.unwrap_or_else(|| "dist".to_string()),
    deps_dir: raw_options.deps_dir.unwrap_or_else(|| "deps".to_string()),
    output_map,
    minify: raw_options.minify.unwrap_or(false),
    reload,
    cwd,
  };

  Ok(NormalizeOptionsReturn { options, import_map })
}

fn current_dir() -> Result<PathBuf, BuildDiagnostic> {
  std::env::current_dir().map_err(|err| BuildDiagnostic::io(".", err))
}

/// Module paths named by `reload` are made absolute.
pub fn normalize_reload(reload: Reload, cwd: &Path) -> Reload {
  match reload {
    Reload::Only(modules) => {
      Reload::Only(modules.iter().map(|module| module_id_in(cwd, module).to_string()).collect())
    }
    reload => reload,
  }
}

/// URLs are kept as they are, paths are made absolute.
fn module_id_in(cwd: &Path, module: &str) -> ModuleId {
  if module.contains("://") {
    ModuleId::from(module)
  } else {
    ModuleId::new(cwd.join(module).normalize().to_string_lossy().as_ref())
  }
}

#[cfg(all(test, unix))]
mod tests {
  use std::collections::BTreeMap;

  use fardel_fs::MemoryFileSystem;

  use super::*;

  #[test]
  fn fills_in_defaults() {
    let raw = BundlerOptions { cwd: Some("/project".into()), ..BundlerOptions::default() };
    let NormalizeOptionsReturn { options, import_map } =
      normalize_options(raw, &MemoryFileSystem::new()).unwrap();
    assert_eq!(options.dir, "dist");
    assert_eq!(options.deps_dir, "deps");
    assert!(!options.minify);
    assert_eq!(options.reload, Reload::Off);
    assert!(import_map.is_empty());
    assert_eq!(options.out_dir(), Path::new("/project/dist"));
  }

  #[test]
  fn resolves_module_paths_against_cwd() {
    let fs = MemoryFileSystem::with_files([(
      "/project/config/imports.json",
      r#"{ "imports": { "lib/": "../vendor/lib/" } }"#,
    )]);
    let raw = BundlerOptions {
      cwd: Some("/project".into()),
      import_map: Some("config/imports.json".into()),
      imports: Some(BTreeMap::from([("app".to_string(), "./src/app.ts".to_string())])),
      output_map: Some(BTreeMap::from([("./src/sw.ts".to_string(), "./sw.js".to_string())])),
      reload: Some(Reload::Only(vec!["src/a.ts".to_string()])),
      ..BundlerOptions::default()
    };
    let NormalizeOptionsReturn { options, import_map } = normalize_options(raw, &fs).unwrap();

    assert_eq!(options.output_map[&ModuleId::from("/project/src/sw.ts")], "sw.js");
    assert_eq!(options.reload, Reload::Only(vec!["/project/src/a.ts".to_string()]));
    assert_eq!(import_map.resolve("lib/x.js").as_deref(), Some("/project/vendor/lib/x.js"));
    assert_eq!(import_map.resolve("app").as_deref(), Some("/project/src/app.ts"));
  }

  #[test]
  fn missing_import_map_is_an_io_error() {
    let raw = BundlerOptions {
      cwd: Some("/project".into()),
      import_map: Some("imports.json".into()),
      ..BundlerOptions::default()
    };
    let err = normalize_options(raw, &MemoryFileSystem::new()).err().unwrap();
    assert!(matches!(err[0], BuildDiagnostic::Io { .. }));
  }
}
