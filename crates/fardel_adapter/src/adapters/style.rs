use css_module_lexer::{collect_dependencies, Dependency, Mode, UrlRangeKind};
use fardel_common::{EdgeType, Format, Item, ModuleId, RawDependency, RawExports, StrOrBytes};
use fardel_error::BuildDiagnostic;
use fardel_utils::{concat_string, ecmascript::js_string_literal};
use string_wizard::MagicString;

use crate::{
  adapter::is_external_reference, source_text, EdgeResolver, ExtractedModule, FormatAdapter,
  ResolvedEdge,
};

/// Stylesheets. `@import` rules are static edges, `url()` references are fetched.
pub struct StyleAdapter;

impl StyleAdapter {
  /// A script module whose default export is a constructed stylesheet holding `css`.
  pub fn script_module(css: &str) -> String {
    concat_string!(
      "const sheet = new CSSStyleSheet();\nsheet.replaceSync(",
      js_string_literal(css),
      ");\nexport default sheet;\n"
    )
  }
}

impl FormatAdapter for StyleAdapter {
  fn name(&self) -> &'static str {
    "style"
  }

  fn test(&self, item: &Item) -> bool {
    matches!(item.format, Format::Style)
  }

  fn extract(
    &self,
    id: &ModuleId,
    source: &StrOrBytes,
  ) -> Result<ExtractedModule, BuildDiagnostic> {
    let text = source_text(id, source)?;
    let (lexed_deps, warnings) = collect_dependencies(text, Mode::Css);
    for warning in warnings {
      tracing::debug!("{id}: {warning}");
    }

    let mut dependencies = vec![];
    for lexed_dep in lexed_deps {
      match lexed_dep {
        Dependency::Import { request, .. } if !is_external_reference(request) => {
          let dependency = RawDependency::new(request, EdgeType::StaticImportExport);
          dependencies.push(dependency.with_format(Format::Style));
        }
        Dependency::Url { request, .. } if !is_external_reference(request) => {
          dependencies.push(RawDependency::new(request, EdgeType::Fetch));
        }
        _ => {}
      }
    }

    Ok(ExtractedModule { dependencies, exports: RawExports { named: vec![], has_default: true } })
  }

  fn transform(
    &self,
    id: &ModuleId,
    source: &StrOrBytes,
    as_script: bool,
  ) -> Result<StrOrBytes, BuildDiagnostic> {
    if as_script {
      let text = source_text(id, source)?;
      Ok(StrOrBytes::Str(Self::script_module(text).into()))
    } else {
      Ok(source.clone())
    }
  }

  fn rewrite(
    &self,
    _id: &ModuleId,
    source: &str,
    resolve: &EdgeResolver,
  ) -> Result<String, BuildDiagnostic> {
    let (lexed_deps, _) = collect_dependencies(source, Mode::Css);
    let mut magic_string = MagicString::new(source);

    for lexed_dep in lexed_deps {
      match lexed_dep {
        Dependency::Import { request, range, .. } => {
          match resolve(request, EdgeType::StaticImportExport) {
            Some(ResolvedEdge::Inlined) => {
              let mut range_end = range.end as usize;
              if source[range_end..].starts_with("\r\n") {
                range_end += 2;
              } else if source[range_end..].starts_with('\n') {
                range_end += 1;
              }
              magic_string.remove(range.start as usize, range_end);
            }
            Some(ResolvedEdge::Path(path)) => {
              let request = js_string_literal(&path);
              magic_string.update(
                range.start as usize,
                range.end as usize,
                concat_string!("@import ", request, ";"),
              );
            }
            None => {}
          }
        }
        Dependency::Url { request, range, kind } => {
          let Some(ResolvedEdge::Path(path)) = resolve(request, EdgeType::Fetch) else {
            continue;
          };
          // The range covers the quoted request for strings and the whole `url(...)` otherwise.
          let (start, end) = if matches!(kind, UrlRangeKind::String) {
            (range.start as usize + 1, range.end as usize - 1)
          } else {
            (range.start as usize + 4, range.end as usize - 1)
          };
          let original = &source[start..end];
          let replacement = match original.get(..1) {
            Some(quote @ ("\"" | "'")) => concat_string!(quote, path, quote),
            _ => path,
          };
          if start < end {
            magic_string.update(start, end, replacement);
          }
        }
        _ => {}
      }
    }

    Ok(magic_string.to_string())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn extracts_imports_and_urls() {
    let source = StrOrBytes::Str(
      r#"@import "./base.css";
.logo { background: url(./logo.png); }
.bg { background: url("data:image/png;base64,AAAA"); }
.x { mask: url(#mask); }
"#
      .into(),
    );
    let module = StyleAdapter.extract(&ModuleId::from("/src/a.css"), &source).unwrap();
    let edges = module
      .dependencies
      .iter()
      .map(|dep| (dep.request.as_str(), dep.edge_type))
      .collect::<Vec<_>>();
    assert_eq!(
      edges,
      [("./base.css", EdgeType::StaticImportExport), ("./logo.png", EdgeType::Fetch)]
    );
  }

  #[test]
  fn rewrite_drops_inlined_imports() {
    let source =
      "@import \"./base.css\";\n@import \"./shared.css\";\n.a { background: url(./logo.png); }\n";
    let output = StyleAdapter
      .rewrite(&ModuleId::from("/src/a.css"), source, &|request, _| match request {
        "./base.css" => Some(ResolvedEdge::Inlined),
        "./shared.css" => Some(ResolvedEdge::Path("./deps/abc.css".to_string())),
        "./logo.png" => Some(ResolvedEdge::Path("./deps/def.png".to_string())),
        _ => None,
      })
      .unwrap();
    assert!(!output.contains("base.css"));
    assert!(output.contains("@import \"./deps/abc.css\";"));
    assert!(output.contains("url(./deps/def.png)"));
  }

  #[test]
  fn script_module_wraps_the_sheet() {
    let code = StyleAdapter::script_module("a { color: \"red\" }");
    assert!(code.contains(r#"sheet.replaceSync("a { color: \"red\" }");"#));
    assert!(code.ends_with("export default sheet;\n"));
  }
}
