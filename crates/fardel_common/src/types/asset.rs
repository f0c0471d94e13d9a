use std::time::SystemTime;

use crate::{Dependencies, EdgeType, ExportSurface, Format, ModuleId};

/// A module as reached through one edge type. Created once per `(id, edge_type)` and never
/// modified after the graph is built.
#[derive(Debug, Clone)]
pub struct Asset {
  pub id: ModuleId,
  /// `id` relative to the working directory
  pub stable_id: String,
  /// A legal identifier derived from the file name, used to name synthesized bindings.
  pub repr_name: String,
  pub edge_type: EdgeType,
  pub format: Format,
  /// Relative to the output directory, always with forward slashes.
  pub output_path: String,
  pub dependencies: Dependencies,
  pub export_surface: ExportSurface,
  /// A non-script module consumed by a script, emitted as a script module.
  pub as_script: bool,
  pub modified: Option<SystemTime>,
}

impl Asset {
  pub fn key(&self) -> (ModuleId, EdgeType) {
    (self.id.clone(), self.edge_type)
  }

  /// Whether the module is linked with the script linker.
  pub fn is_script_like(&self) -> bool {
    matches!(self.format, Format::Script) || self.as_script
  }
}
