use arcstr::ArcStr;
use itertools::Itertools;
use oxc::{
  ast::{
    ast::{
      AssignmentTargetPropertyIdentifier, BindingIdentifier, BindingPatternKind, BindingProperty,
      CallExpression, ExportDefaultDeclarationKind, Expression, IdentifierReference,
      ImportDeclarationSpecifier, ImportExpression, NewExpression, ObjectProperty, Statement,
    },
    visit::walk,
    Visit,
  },
  semantic::{SemanticBuilder, SymbolId, SymbolTable},
  span::{GetSpan, SourceType, Span},
};
use rustc_hash::{FxHashMap, FxHashSet};

use crate::{
  scanner::{call_site, import_site, new_site, ScannedEdgeKind},
  EcmaCompiler, EcmaError,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImportedName {
  /// `default` is a named import like any other.
  Named(String),
  Namespace,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LocalKind {
  Declared,
  Import { statement: usize, imported: ImportedName },
  /// The binding an anonymous `export default` is given.
  DefaultExpression,
}

/// A binding of the module's top-level scope.
#[derive(Debug, Clone)]
pub struct Local {
  pub name: String,
  pub span: Span,
  pub kind: LocalKind,
}

#[derive(Debug, Clone)]
pub struct ImportStatement {
  pub span: Span,
  pub request: String,
  pub locals: Vec<usize>,
}

#[derive(Debug, Clone)]
pub struct LocalExport {
  pub exported: String,
  pub local: usize,
}

/// `export { a as b } from "x"` and `export * as ns from "x"`.
#[derive(Debug, Clone)]
pub struct ReExport {
  pub span: Span,
  pub request: String,
  pub exported: String,
  pub imported: ImportedName,
}

#[derive(Debug, Clone)]
pub struct StarExport {
  pub span: Span,
  pub request: String,
}

#[derive(Debug, Clone)]
pub struct DefaultExport {
  /// `export default ` in front of the expression.
  pub prefix: Span,
  pub end: u32,
  pub local: usize,
}

#[derive(Debug, Clone, Copy)]
pub struct Reference {
  pub span: Span,
  pub local: usize,
}

#[derive(Debug, Clone)]
pub struct DynamicImport {
  pub span: Span,
  pub request: String,
}

/// A string literal naming a fetched resource, a worker or a service worker.
#[derive(Debug, Clone)]
pub struct UrlReference {
  /// Includes the quotes.
  pub span: Span,
  pub request: String,
  pub kind: ScannedEdgeKind,
}

/// Everything the linker needs to know to merge a module into a shared scope.
#[derive(Debug, Default)]
pub struct LinkAnalysis {
  /// Top-level bindings in declaration order.
  pub locals: Vec<Local>,
  pub imports: Vec<ImportStatement>,
  pub local_exports: Vec<LocalExport>,
  pub reexports: Vec<ReExport>,
  pub star_exports: Vec<StarExport>,
  pub default_export: Option<DefaultExport>,
  /// Every mention of a top-level binding that survives linking, binding sites included.
  pub references: Vec<Reference>,
  /// Start offsets of identifiers written in shorthand property position.
  pub shorthands: FxHashSet<u32>,
  /// Names bound in nested scopes.
  pub nested_names: FxHashSet<String>,
  /// Names referenced but never bound.
  pub global_names: FxHashSet<String>,
  /// `export { a, b as c }` statements without a source.
  pub export_lists: Vec<Span>,
  /// `export ` in front of exported declarations.
  pub export_prefixes: Vec<Span>,
  pub dynamic_imports: Vec<DynamicImport>,
  pub url_references: Vec<UrlReference>,
}

impl LinkAnalysis {
  /// Analyzes plain ES module source. `default_name` names the binding introduced for an
  /// anonymous default export.
  pub fn analyze(source: ArcStr, default_name: &str) -> Result<Self, EcmaError> {
    let ast = EcmaCompiler::parse(source, SourceType::mjs())?;
    let program = ast.program();
    let (symbols, scopes) =
      SemanticBuilder::new().build(program).semantic.into_symbol_table_and_scope_tree();
    let root = scopes.root_scope_id();

    let mut analysis = Self::default();

    let mut pending = vec![];
    for symbol_id in symbols.symbol_ids() {
      let name = symbols.get_name(symbol_id).to_string();
      if symbols.get_scope_id(symbol_id) == root {
        let span = symbols.get_span(symbol_id);
        pending.push((Local { name, span, kind: LocalKind::Declared }, Some(symbol_id)));
      } else {
        analysis.nested_names.insert(name);
      }
    }
    for stmt in &program.body {
      if let Statement::ExportDefaultDeclaration(decl) = stmt {
        if default_declaration_id(&decl.declaration).is_none() {
          let span = Span::new(decl.span.start, decl.declaration.span().start);
          let kind = LocalKind::DefaultExpression;
          pending.push((Local { name: default_name.to_string(), span, kind }, None));
        }
      }
    }
    pending.sort_by_key(|(local, _)| local.span.start);

    let mut symbol_locals = FxHashMap::default();
    for (idx, (local, symbol_id)) in pending.into_iter().enumerate() {
      if let Some(symbol_id) = symbol_id {
        symbol_locals.insert(symbol_id, idx);
      }
      analysis.locals.push(local);
    }
    let local_of = |symbol_id: Option<SymbolId>| symbol_id.and_then(|id| symbol_locals.get(&id));

    for stmt in &program.body {
      match stmt {
        Statement::ImportDeclaration(decl) => {
          let statement = analysis.imports.len();
          let mut statement_locals = vec![];
          for specifier in decl.specifiers.iter().flatten() {
            let (binding, imported) = match specifier {
              ImportDeclarationSpecifier::ImportSpecifier(spec) => {
                (&spec.local, ImportedName::Named(spec.imported.name().to_string()))
              }
              ImportDeclarationSpecifier::ImportDefaultSpecifier(spec) => {
                (&spec.local, ImportedName::Named("default".to_string()))
              }
              ImportDeclarationSpecifier::ImportNamespaceSpecifier(spec) => {
                (&spec.local, ImportedName::Namespace)
              }
            };
            if let Some(&local) = local_of(binding.symbol_id.get()) {
              analysis.locals[local].kind = LocalKind::Import { statement, imported };
              statement_locals.push(local);
            }
          }
          analysis.imports.push(ImportStatement {
            span: decl.span,
            request: decl.source.value.to_string(),
            locals: statement_locals,
          });
        }
        Statement::ExportNamedDeclaration(decl) => {
          if let Some(declaration) = &decl.declaration {
            let declaration_span = declaration.span();
            analysis.export_prefixes.push(Span::new(decl.span.start, declaration_span.start));
            for (idx, local) in analysis.locals.iter().enumerate() {
              if local.kind == LocalKind::Declared
                && declaration_span.start <= local.span.start
                && local.span.end <= declaration_span.end
              {
                let exported = local.name.clone();
                analysis.local_exports.push(LocalExport { exported, local: idx });
              }
            }
          }

          match &decl.source {
            Some(source) if decl.specifiers.is_empty() => {
              analysis.imports.push(ImportStatement {
                span: decl.span,
                request: source.value.to_string(),
                locals: vec![],
              });
            }
            Some(source) => {
              for specifier in &decl.specifiers {
                analysis.reexports.push(ReExport {
                  span: decl.span,
                  request: source.value.to_string(),
                  exported: specifier.exported.name().to_string(),
                  imported: ImportedName::Named(specifier.local.name().to_string()),
                });
              }
            }
            None if decl.declaration.is_none() => {
              analysis.export_lists.push(decl.span);
              for specifier in &decl.specifiers {
                let symbol_id = scopes.get_binding(root, &specifier.local.name());
                if let Some(&local) = local_of(symbol_id) {
                  let exported = specifier.exported.name().to_string();
                  analysis.local_exports.push(LocalExport { exported, local });
                }
              }
            }
            None => {}
          }
        }
        Statement::ExportAllDeclaration(decl) => {
          let request = decl.source.value.to_string();
          match &decl.exported {
            Some(exported) => analysis.reexports.push(ReExport {
              span: decl.span,
              request,
              exported: exported.name().to_string(),
              imported: ImportedName::Namespace,
            }),
            None => analysis.star_exports.push(StarExport { span: decl.span, request }),
          }
        }
        Statement::ExportDefaultDeclaration(decl) => {
          let prefix = Span::new(decl.span.start, decl.declaration.span().start);
          match default_declaration_id(&decl.declaration) {
            Some(id) => {
              analysis.export_prefixes.push(prefix);
              if let Some(&local) = local_of(id.symbol_id.get()) {
                analysis.local_exports.push(LocalExport { exported: "default".to_string(), local });
              }
            }
            None => {
              let local = analysis.locals.iter().position(|local| {
                local.kind == LocalKind::DefaultExpression && local.span == prefix
              });
              if let Some(local) = local {
                analysis.default_export = Some(DefaultExport { prefix, end: decl.span.end, local });
                analysis.local_exports.push(LocalExport { exported: "default".to_string(), local });
              }
            }
          }
        }
        _ => {}
      }
    }

    let mut collector = ReferenceCollector {
      symbols: &symbols,
      symbol_locals: &symbol_locals,
      analysis: &mut analysis,
    };
    collector.visit_program(program);

    let removed = analysis.removed_spans();
    analysis.references.retain(|reference| {
      let next = removed.partition_point(|span| span.start <= reference.span.start);
      next == 0 || removed[next - 1].end <= reference.span.start
    });

    Ok(analysis)
  }

  /// Statements that disappear entirely from the linked output, sorted by position.
  pub fn removed_spans(&self) -> Vec<Span> {
    self
      .imports
      .iter()
      .map(|stmt| stmt.span)
      .chain(self.reexports.iter().map(|stmt| stmt.span))
      .chain(self.star_exports.iter().map(|stmt| stmt.span))
      .chain(self.export_lists.iter().copied())
      .sorted_by_key(|span| span.start)
      .dedup()
      .collect()
  }

  pub fn is_shorthand(&self, reference: &Reference) -> bool {
    self.shorthands.contains(&reference.span.start)
  }
}

fn default_declaration_id<'s, 'a>(
  kind: &'s ExportDefaultDeclarationKind<'a>,
) -> Option<&'s BindingIdentifier<'a>> {
  match kind {
    ExportDefaultDeclarationKind::FunctionDeclaration(func) => func.id.as_ref(),
    ExportDefaultDeclarationKind::ClassDeclaration(class) => class.id.as_ref(),
    _ => None,
  }
}

struct ReferenceCollector<'s> {
  symbols: &'s SymbolTable,
  symbol_locals: &'s FxHashMap<SymbolId, usize>,
  analysis: &'s mut LinkAnalysis,
}

impl<'a> Visit<'a> for ReferenceCollector<'_> {
  fn visit_identifier_reference(&mut self, ident: &IdentifierReference<'a>) {
    let symbol_id =
      ident.reference_id.get().and_then(|id| self.symbols.get_reference(id).symbol_id());
    match symbol_id {
      Some(symbol_id) => {
        if let Some(&local) = self.symbol_locals.get(&symbol_id) {
          self.analysis.references.push(Reference { span: ident.span, local });
        }
      }
      None => {
        self.analysis.global_names.insert(ident.name.to_string());
      }
    }
  }

  fn visit_binding_identifier(&mut self, ident: &BindingIdentifier<'a>) {
    if let Some(&local) = ident.symbol_id.get().and_then(|id| self.symbol_locals.get(&id)) {
      self.analysis.references.push(Reference { span: ident.span, local });
    }
  }

  fn visit_object_property(&mut self, prop: &ObjectProperty<'a>) {
    if prop.shorthand {
      if let Expression::Identifier(ident) = &prop.value {
        self.analysis.shorthands.insert(ident.span.start);
      }
    }
    walk::walk_object_property(self, prop);
  }

  fn visit_binding_property(&mut self, prop: &BindingProperty<'a>) {
    if prop.shorthand {
      let ident = match &prop.value.kind {
        BindingPatternKind::BindingIdentifier(ident) => Some(ident.span),
        BindingPatternKind::AssignmentPattern(pattern) => match &pattern.left.kind {
          BindingPatternKind::BindingIdentifier(ident) => Some(ident.span),
          _ => None,
        },
        _ => None,
      };
      if let Some(span) = ident {
        self.analysis.shorthands.insert(span.start);
      }
    }
    walk::walk_binding_property(self, prop);
  }

  fn visit_assignment_target_property_identifier(
    &mut self,
    it: &AssignmentTargetPropertyIdentifier<'a>,
  ) {
    self.analysis.shorthands.insert(it.binding.span.start);
    walk::walk_assignment_target_property_identifier(self, it);
  }

  fn visit_import_expression(&mut self, expr: &ImportExpression<'a>) {
    if let Some(request) = import_site(expr) {
      self
        .analysis
        .dynamic_imports
        .push(DynamicImport { span: expr.span, request: request.value.to_string() });
    }
    walk::walk_import_expression(self, expr);
  }

  fn visit_call_expression(&mut self, expr: &CallExpression<'a>) {
    if let Some((kind, request)) = call_site(expr) {
      self.analysis.url_references.push(UrlReference {
        span: request.span,
        request: request.value.to_string(),
        kind,
      });
    }
    walk::walk_call_expression(self, expr);
  }

  fn visit_new_expression(&mut self, expr: &NewExpression<'a>) {
    if let Some((kind, request)) = new_site(expr) {
      self.analysis.url_references.push(UrlReference {
        span: request.span,
        request: request.value.to_string(),
        kind,
      });
    }
    walk::walk_new_expression(self, expr);
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn analyze(source: &str) -> LinkAnalysis {
    LinkAnalysis::analyze(ArcStr::from(source), "mod_default").unwrap()
  }

  fn text<'s>(source: &'s str, span: Span) -> &'s str {
    &source[span.start as usize..span.end as usize]
  }

  #[test]
  fn locals_follow_declaration_order() {
    let analysis = analyze("import { a } from './a.js';\nconst b = a;\nfunction c() { let d; }\n");
    let names = analysis.locals.iter().map(|local| local.name.as_str()).collect_vec();
    assert_eq!(names, ["a", "b", "c"]);
    assert_eq!(
      analysis.locals[0].kind,
      LocalKind::Import { statement: 0, imported: ImportedName::Named("a".to_string()) }
    );
    assert!(analysis.nested_names.contains("d"));
  }

  #[test]
  fn references_skip_removed_statements() {
    let source = "import { a } from './a.js';\nconst b = a + a;\nexport { b as c };\n";
    let analysis = analyze(source);
    let mentions =
      analysis.references.iter().map(|reference| text(source, reference.span)).collect_vec();
    assert_eq!(mentions, ["b", "a", "a"]);
    assert_eq!(analysis.export_lists.len(), 1);
    assert_eq!(analysis.local_exports[0].exported, "c");
    assert_eq!(analysis.removed_spans().len(), 2);
  }

  #[test]
  fn anonymous_default_export_gets_a_local() {
    let source = "const x = 1;\nexport default x + 1;\n";
    let analysis = analyze(source);
    let default_export = analysis.default_export.as_ref().unwrap();
    assert_eq!(text(source, default_export.prefix), "export default ");
    assert_eq!(analysis.locals[default_export.local].name, "mod_default");
    assert_eq!(analysis.local_exports[0].exported, "default");
  }

  #[test]
  fn named_default_declaration_keeps_its_name() {
    let source = "export default function main() {}\nexport const value = 1;\n";
    let analysis = analyze(source);
    assert!(analysis.default_export.is_none());
    let exports = analysis
      .local_exports
      .iter()
      .map(|export| (export.exported.as_str(), analysis.locals[export.local].name.as_str()))
      .collect_vec();
    assert_eq!(exports, [("default", "main"), ("value", "value")]);
    let prefixes = analysis.export_prefixes.iter().map(|span| text(source, *span)).collect_vec();
    assert_eq!(prefixes, ["export default ", "export "]);
  }

  #[test]
  fn records_shorthands_and_globals() {
    let source = "const x = 1;\nconst o = { x };\nconst { x: y, z } = o;\nconsole.log(o, y, z);\n";
    let analysis = analyze(source);
    let shorthand = analysis
      .references
      .iter()
      .filter(|reference| analysis.is_shorthand(reference))
      .map(|reference| text(source, reference.span))
      .collect_vec();
    assert_eq!(shorthand, ["x", "z"]);
    assert!(analysis.global_names.contains("console"));
  }

  #[test]
  fn records_reexports() {
    let analysis = analyze(
      "export { a as b, default } from './a.js';\n\
       export * from './c.js';\n\
       export * as ns from './d.js';\n",
    );
    let reexports = analysis
      .reexports
      .iter()
      .map(|reexport| (reexport.exported.as_str(), reexport.imported.clone()))
      .collect_vec();
    assert_eq!(
      reexports,
      [
        ("b", ImportedName::Named("a".to_string())),
        ("default", ImportedName::Named("default".to_string())),
        ("ns", ImportedName::Namespace),
      ]
    );
    assert_eq!(analysis.star_exports[0].request, "./c.js");
  }

  #[test]
  fn records_dynamic_sites() {
    let source = "const page = import('./page.js');\nfetch('./data.bin');\nnew Worker('./w.js');\n";
    let analysis = analyze(source);
    assert_eq!(text(source, analysis.dynamic_imports[0].span), "import('./page.js')");
    let urls = analysis.url_references.iter().map(|url| text(source, url.span)).collect_vec();
    assert_eq!(urls, ["'./data.bin'", "'./w.js'"]);
  }
}
