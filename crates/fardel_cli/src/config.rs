use std::path::Path;

use fardel::{BundlerOptions, Reload};

use crate::args::{InputArgs, OutputArgs};

const CONFIG_FILE: &str = "fardel.json";

/// Reads the options file, then lets command line flags override it.
pub fn load_options(input: InputArgs, output: OutputArgs) -> Result<BundlerOptions, String> {
  let base = input.cwd.clone().unwrap_or_default();
  let config = match input.config {
    Some(config) => Some(base.join(config)),
    None => Some(base.join(CONFIG_FILE)).filter(|path| path.is_file()),
  };

  let mut options = match config {
    Some(path) => read_config(&path)?,
    None => BundlerOptions::default(),
  };

  if !input.entries.is_empty() {
    options.input = Some(input.entries);
  }
  if let Some(cwd) = input.cwd {
    options.cwd = Some(cwd);
  }
  if input.import_map.is_some() {
    options.import_map = input.import_map;
  }
  if output.dir.is_some() {
    options.dir = output.dir;
  }
  if output.minify {
    options.minify = Some(true);
  }
  if output.reload {
    options.reload = Some(Reload::All);
  }
  Ok(options)
}

fn read_config(path: &Path) -> Result<BundlerOptions, String> {
  let json = std::fs::read_to_string(path)
    .map_err(|err| format!("Could not read {}: {err}", path.display()))?;
  serde_json::from_str(&json).map_err(|err| format!("Invalid {}: {err}", path.display()))
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn flags_fill_in_the_options() {
    let input = InputArgs {
      entries: vec!["./src/main.ts".to_string()],
      config: None,
      cwd: None,
      import_map: Some("imports.json".into()),
    };
    let output = OutputArgs { dir: None, minify: true, reload: true };

    let options = load_options(input, output).unwrap();
    assert_eq!(options.input, Some(vec!["./src/main.ts".to_string()]));
    assert_eq!(options.import_map.as_deref(), Some(Path::new("imports.json")));
    assert_eq!(options.minify, Some(true));
    assert_eq!(options.reload, Some(Reload::All));
    assert_eq!(options.dir, None);
  }

  #[test]
  fn missing_config_files_are_reported() {
    let input = InputArgs {
      entries: vec![],
      config: Some("does-not-exist.json".into()),
      cwd: None,
      import_map: None,
    };
    let output = OutputArgs { dir: None, minify: false, reload: false };
    assert!(load_options(input, output).unwrap_err().contains("does-not-exist.json"));
  }
}
