use std::{collections::BTreeMap, path::PathBuf};

use rustc_hash::FxHashMap;

use crate::{ModuleId, Reload};

#[derive(Debug)]
pub struct NormalizedBundlerOptions {
  // --- Input
  pub input: Vec<String>,
  pub cwd: PathBuf,
  pub import_map: Option<PathBuf>,
  pub imports: BTreeMap<String, String>,

  // --- Output
  pub dir: String,
  pub deps_dir: String,
  pub output_map: FxHashMap<ModuleId, String>,
  pub minify: bool,

  // --- Incremental
  pub reload: Reload,
}

impl NormalizedBundlerOptions {
  pub fn out_dir(&self) -> PathBuf {
    self.cwd.join(&self.dir)
  }

  pub fn output_file(&self, filename: &str) -> PathBuf {
    self.out_dir().join(filename)
  }

  pub fn stable_id(&self, id: &ModuleId) -> String {
    id.stabilize(&self.cwd)
  }
}
