use std::path::{Path, PathBuf};

use fardel_common::ModuleId;
use sugar_path::SugarPath;
use url::Url;

use crate::{ImportMap, ResolveError};

#[derive(Debug)]
pub struct Resolver {
  cwd: PathBuf,
  import_map: ImportMap,
}

impl Resolver {
  pub fn new(cwd: PathBuf, import_map: ImportMap) -> Self {
    Self { cwd, import_map }
  }

  pub fn cwd(&self) -> &Path {
    &self.cwd
  }

  /// Resolves `request` as written in `importer`. Entries have no importer and resolve against the
  /// working directory.
  pub fn resolve(
    &self,
    request: &str,
    importer: Option<&ModuleId>,
  ) -> Result<ModuleId, ResolveError> {
    let mapped = self.import_map.resolve(request);
    let specifier = mapped.as_deref().unwrap_or(request);

    if let Some(url) = Self::parse_absolute_url(specifier) {
      return Self::resolve_url(url);
    }

    let is_relative = specifier.starts_with("./") || specifier.starts_with("../");

    if let Some(importer) = importer.filter(|importer| importer.is_url()) {
      if is_relative || specifier.starts_with('/') {
        return Self::resolve_url(Url::parse(importer)?.join(specifier)?);
      }
    }

    let path = Path::new(specifier);
    let resolved = if path.is_absolute() {
      path.normalize()
    } else if is_relative {
      let base = importer
        .and_then(|importer| importer.as_path().parent())
        .unwrap_or(self.cwd.as_path());
      base.join(path).normalize()
    } else if importer.is_none() {
      // Entries may omit the leading `./`.
      self.cwd.join(path).normalize()
    } else {
      return Err(ResolveError::BareSpecifier);
    };

    Ok(ModuleId::new(resolved.to_string_lossy().as_ref()))
  }

  fn resolve_url(url: Url) -> Result<ModuleId, ResolveError> {
    if url.scheme() == "file" {
      if let Ok(path) = url.to_file_path() {
        return Ok(ModuleId::new(path.normalize().to_string_lossy().as_ref()));
      }
    }
    Ok(ModuleId::new(url.as_str()))
  }

  /// Drive letters such as `C:` also parse as URL schemes.
  fn parse_absolute_url(specifier: &str) -> Option<Url> {
    Url::parse(specifier).ok().filter(|url| url.scheme().len() > 1)
  }
}

#[cfg(all(test, unix))]
mod tests {
  use super::*;

  fn resolver() -> Resolver {
    let import_map = ImportMap::from_entries(
      [
        ("preact".to_string(), "https://esm.test/preact.mjs".to_string()),
        ("~/".to_string(), "./src/".to_string()),
      ],
      Path::new("/project"),
    );
    Resolver::new(PathBuf::from("/project"), import_map)
  }

  #[test]
  fn resolves_relative_to_importer() {
    let importer = ModuleId::from("/project/src/main.ts");
    let resolved = resolver().resolve("../lib/./util.ts", Some(&importer)).unwrap();
    assert_eq!(&*resolved, "/project/lib/util.ts");
  }

  #[test]
  fn entries_resolve_against_cwd() {
    assert_eq!(&*resolver().resolve("./src/main.ts", None).unwrap(), "/project/src/main.ts");
    assert_eq!(&*resolver().resolve("src/main.ts", None).unwrap(), "/project/src/main.ts");
  }

  #[test]
  fn import_map_is_applied_first() {
    let importer = ModuleId::from("/project/src/main.ts");
    let resolver = resolver();
    assert_eq!(
      &*resolver.resolve("preact", Some(&importer)).unwrap(),
      "https://esm.test/preact.mjs"
    );
    assert_eq!(&*resolver.resolve("~/a.ts", Some(&importer)).unwrap(), "/project/src/a.ts");
  }

  #[test]
  fn relative_requests_inside_urls_stay_urls() {
    let importer = ModuleId::from("https://esm.test/pkg/index.js");
    let resolved = resolver().resolve("../dep.js", Some(&importer)).unwrap();
    assert_eq!(&*resolved, "https://esm.test/dep.js");
  }

  #[test]
  fn unmapped_bare_specifiers_fail() {
    let importer = ModuleId::from("/project/src/main.ts");
    assert!(matches!(
      resolver().resolve("lodash", Some(&importer)),
      Err(ResolveError::BareSpecifier)
    ));
  }
}
