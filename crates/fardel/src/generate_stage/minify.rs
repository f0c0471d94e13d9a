use fardel_common::Asset;
use fardel_ecmascript::EcmaCompiler;
use fardel_error::BuildDiagnostic;
use lightningcss::{
  printer::PrinterOptions,
  stylesheet::{MinifyOptions, ParserOptions, StyleSheet},
};

pub fn minify_script(root: &Asset, code: &str) -> Result<String, BuildDiagnostic> {
  EcmaCompiler::minify(code).map_err(|err| BuildDiagnostic::transform(root.stable_id.clone(), err))
}

pub fn minify_style(root: &Asset, css: &str) -> Result<String, BuildDiagnostic> {
  let error = |err: &dyn std::fmt::Display| BuildDiagnostic::transform(root.stable_id.clone(), err);

  let mut stylesheet = StyleSheet::parse(
    css,
    ParserOptions { filename: root.stable_id.clone(), ..ParserOptions::default() },
  )
  .map_err(|err| error(&err))?;
  stylesheet.minify(MinifyOptions::default()).map_err(|err| error(&err))?;
  let printed = stylesheet
    .to_css(PrinterOptions { minify: true, ..PrinterOptions::default() })
    .map_err(|err| error(&err))?;
  Ok(printed.code)
}

#[cfg(test)]
mod tests {
  use fardel_common::{Dependencies, EdgeType, ExportSurface, Format, ModuleId};

  use super::*;

  fn asset(id: &str, format: Format) -> Asset {
    Asset {
      id: ModuleId::from(id),
      stable_id: id.trim_start_matches('/').to_string(),
      repr_name: "a".to_string(),
      edge_type: EdgeType::StaticImportExport,
      format,
      output_path: String::new(),
      dependencies: Dependencies::default(),
      export_surface: ExportSurface::default(),
      as_script: false,
      modified: None,
    }
  }

  #[test]
  fn minifies_stylesheets() {
    let css = "/* a.css */\n.a {\n  color: #ff0000;\n}\n";
    let minified = minify_style(&asset("/a.css", Format::Style), css).unwrap();
    assert_eq!(minified, ".a{color:red}");
  }

  #[test]
  fn minify_errors_name_the_chunk() {
    let err = minify_script(&asset("/a.js", Format::Script), "const = ;").unwrap_err();
    assert!(err.to_string().contains("a.js"));
  }
}
