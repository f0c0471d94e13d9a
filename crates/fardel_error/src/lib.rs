mod diagnostic;

use std::ops::{Deref, DerefMut};

pub use crate::diagnostic::BuildDiagnostic;

/// Every diagnostic collected while a build phase ran.
#[derive(Debug)]
pub struct BuildError(pub Vec<BuildDiagnostic>);

impl Deref for BuildError {
  type Target = Vec<BuildDiagnostic>;

  fn deref(&self) -> &Self::Target {
    &self.0
  }
}

impl DerefMut for BuildError {
  fn deref_mut(&mut self) -> &mut Self::Target {
    &mut self.0
  }
}

impl From<BuildDiagnostic> for BuildError {
  fn from(error: BuildDiagnostic) -> Self {
    Self(vec![error])
  }
}

impl From<Vec<BuildDiagnostic>> for BuildError {
  fn from(errors: Vec<BuildDiagnostic>) -> Self {
    Self(errors)
  }
}

impl std::fmt::Display for BuildError {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    for (index, error) in self.0.iter().enumerate() {
      if index > 0 {
        f.write_str("\n")?;
      }
      write!(f, "{error}")?;
    }
    Ok(())
  }
}

impl std::error::Error for BuildError {}

pub type BuildResult<T> = Result<T, BuildError>;

#[test]
fn display_joins_every_diagnostic() {
  let error = BuildError(vec![
    BuildDiagnostic::UnsupportedFormat { id: "/a.xyz".to_string() },
    BuildDiagnostic::CircularDependency {
      chain: vec!["/a.js".to_string(), "/b.js".to_string(), "/a.js".to_string()],
    },
  ]);
  assert_eq!(
    error.to_string(),
    "No format adapter accepts /a.xyz\nCircular dependency: /a.js -> /b.js -> /a.js"
  );
}
