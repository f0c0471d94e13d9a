use crate::ModuleId;

/// Exports a format adapter found in a module, before `export *` targets are resolved.
#[derive(Debug, Clone, Default)]
pub struct RawExports {
  pub named: Vec<String>,
  pub has_default: bool,
}

#[derive(Debug, Clone, Default)]
pub struct ExportSurface {
  /// Local and forwarded names, in declaration order. `default` is tracked separately.
  pub named: Vec<String>,
  pub has_default: bool,
  pub star_targets: Vec<ModuleId>,
}
