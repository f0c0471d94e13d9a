use std::collections::BTreeMap;

use fardel_common::{OutputAsset, OutputContent};
use fardel_error::BuildDiagnostic;

#[derive(Debug, Default)]
pub struct BundleOutput {
  /// Generated outputs, sorted by filename.
  pub assets: Vec<OutputAsset>,
  /// Outputs left as they are because nothing they contain changed.
  pub skipped: Vec<String>,
  /// Outputs that could not be generated. Their previous content is no longer current.
  pub failed: Vec<(String, BuildDiagnostic)>,
}

impl BundleOutput {
  pub fn get(&self, filename: &str) -> Option<&OutputAsset> {
    self.assets.iter().find(|asset| asset.filename == filename)
  }

  pub fn bundle(&self) -> BTreeMap<String, OutputContent> {
    self.assets.iter().map(|asset| (asset.filename.clone(), asset.content.clone())).collect()
  }

  pub fn is_ok(&self) -> bool {
    self.failed.is_empty()
  }
}
