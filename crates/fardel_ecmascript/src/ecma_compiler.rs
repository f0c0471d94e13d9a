use std::path::Path;

use arcstr::ArcStr;
use itertools::Itertools;
use oxc::{
  allocator::Allocator,
  codegen::{Codegen, CodegenOptions},
  diagnostics::{OxcDiagnostic, Severity},
  parser::Parser,
  semantic::SemanticBuilder,
  span::SourceType,
  transformer::{ESTarget, JsxRuntime, TransformOptions, Transformer},
};

use crate::ecma_ast::{
  program_cell::{ProgramCell, ProgramCellDependent, ProgramCellOwner, WithMutFields},
  EcmaAst,
};

#[derive(Debug, thiserror::Error)]
#[error("{}", .0.join("; "))]
pub struct EcmaError(pub Vec<String>);

impl EcmaError {
  pub(crate) fn from_diagnostics<'a>(
    diagnostics: impl IntoIterator<Item = &'a OxcDiagnostic>,
  ) -> Self {
    Self(diagnostics.into_iter().map(|error| error.message.to_string()).collect())
  }
}

pub struct EcmaCompiler;

impl EcmaCompiler {
  /// Source type for a file extension. Everything that is not TypeScript or JSX parses as an ES
  /// module.
  pub fn source_type_of(extension: &str) -> SourceType {
    match extension {
      "ts" | "mts" | "cts" => SourceType::ts(),
      "tsx" => SourceType::tsx(),
      "jsx" => SourceType::jsx(),
      _ => SourceType::mjs(),
    }
  }

  pub fn needs_transpile(source_type: SourceType) -> bool {
    source_type.is_typescript() || source_type.is_jsx()
  }

  pub fn parse(source: impl Into<ArcStr>, source_type: SourceType) -> Result<EcmaAst, EcmaError> {
    let allocator = Allocator::default();
    let owner = ProgramCellOwner { source: source.into(), allocator };
    let program = ProgramCell::try_new(owner, |owner| {
      let ret = Parser::new(&owner.allocator, &owner.source, source_type).parse();
      if ret.errors.is_empty() {
        Ok(ProgramCellDependent { program: ret.program })
      } else {
        Err(EcmaError::from_diagnostics(&ret.errors))
      }
    })?;

    Ok(EcmaAst { program, source_type })
  }

  pub fn print(ast: &EcmaAst) -> String {
    Codegen::new().build(ast.program()).code
  }

  /// Strips TypeScript syntax and compiles JSX with the classic runtime. Imports only used as
  /// types are removed.
  pub fn transpile(
    path: &str,
    source: impl Into<ArcStr>,
    source_type: SourceType,
  ) -> Result<String, EcmaError> {
    let mut ast = Self::parse(source, source_type)?;

    let errors = ast.program.with_mut(|WithMutFields { allocator, program, .. }| {
      let (symbols, scopes) =
        SemanticBuilder::new().build(program).semantic.into_symbol_table_and_scope_tree();

      let mut transform_options = TransformOptions::from(ESTarget::ESNext);
      transform_options.jsx.runtime = JsxRuntime::Classic;

      Transformer::new(allocator, Path::new(path), &transform_options)
        .build_with_symbols_and_scopes(symbols, scopes, program)
        .errors
    });

    let errors =
      errors.into_iter().filter(|error| matches!(error.severity, Severity::Error)).collect_vec();
    if !errors.is_empty() {
      return Err(EcmaError::from_diagnostics(&errors));
    }

    Ok(Self::print(&ast))
  }

  /// Removes whitespace and comments. Identifiers are left untouched.
  pub fn minify(source: &str) -> Result<String, EcmaError> {
    let ast = Self::parse(source.to_string(), SourceType::mjs())?;
    let ret = Codegen::new()
      .with_options(CodegenOptions { minify: true, ..CodegenOptions::default() })
      .build(ast.program());
    Ok(ret.code)
  }
}

#[test]
fn basic_test() {
  let ast = EcmaCompiler::parse("const a = 1;".to_string(), SourceType::default()).unwrap();
  let code = EcmaCompiler::print(&ast);
  assert_eq!(code, "const a = 1;\n");
}

#[test]
fn transpile_strips_types() {
  let code = EcmaCompiler::transpile(
    "/a.ts",
    "import type { B } from './b';\nexport const x: number = 1;\nexport interface I { b: B }\n",
    SourceType::ts(),
  )
  .unwrap();
  assert_eq!(code.trim(), "export const x = 1;");
}

#[test]
fn transpile_reports_syntax_errors() {
  let error = EcmaCompiler::transpile("/a.ts", "const = 1;", SourceType::ts()).unwrap_err();
  assert!(!error.0.is_empty());
}

#[test]
fn minify_keeps_names() {
  let code = EcmaCompiler::minify("const value = 1;\n// note\nexport default value;\n").unwrap();
  assert!(code.contains("const value=1"));
  assert!(!code.contains("note"));
}
