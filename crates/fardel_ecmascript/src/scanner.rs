use oxc::ast::{
  ast::{
    Argument, BindingPattern, BindingPatternKind, CallExpression, Declaration,
    ExportDefaultDeclarationKind, Expression, ImportAttributeKey, ImportDeclaration,
    ImportDeclarationSpecifier, ImportExpression, NewExpression, Statement, StringLiteral,
    WithClause,
  },
  visit::walk,
  Visit,
};

use crate::EcmaAst;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScannedEdgeKind {
  Static,
  Dynamic,
  Fetch,
  Worker,
  ServiceWorker,
}

/// An edge declared in a script, with the names it binds.
#[derive(Debug, Clone)]
pub struct ScannedEdge {
  pub request: String,
  pub kind: ScannedEdgeKind,
  /// Offset of the declaring syntax in the source.
  pub position: u32,
  /// `type` of the import attributes.
  pub asserted_type: Option<String>,
  pub is_export: bool,
  /// `(imported, local)`. For re-exports `local` is the exported name.
  pub named: Vec<(String, String)>,
  pub default: Option<String>,
  pub namespace: Option<String>,
  pub star: bool,
  pub type_only: Vec<String>,
}

impl ScannedEdge {
  fn new(request: &StringLiteral, kind: ScannedEdgeKind, position: u32) -> Self {
    Self {
      request: request.value.to_string(),
      kind,
      position,
      asserted_type: None,
      is_export: false,
      named: vec![],
      default: None,
      namespace: None,
      star: false,
      type_only: vec![],
    }
  }
}

#[derive(Debug, Default)]
pub struct ScannedModule {
  pub edges: Vec<ScannedEdge>,
  /// Exported names other than `default`, in declaration order.
  pub exports: Vec<String>,
  pub has_default_export: bool,
}

impl ScannedModule {
  /// Collects every edge and export of a module. Works on the original source, so type-only
  /// bindings are still visible.
  pub fn scan(ast: &EcmaAst) -> Self {
    let mut module = Self::default();
    let program = ast.program();

    for stmt in &program.body {
      match stmt {
        Statement::ImportDeclaration(decl) => module.scan_import(decl),
        Statement::ExportNamedDeclaration(decl) => {
          let is_type = decl.export_kind.is_type();
          if let Some(declaration) = &decl.declaration {
            if !is_type {
              declared_names(declaration, &mut |name| module.add_export(name));
            }
          }

          match &decl.source {
            Some(source) => {
              let mut edge = ScannedEdge::new(source, ScannedEdgeKind::Static, decl.span.start);
              edge.is_export = true;
              edge.asserted_type = asserted_type(decl.with_clause.as_deref());
              for specifier in &decl.specifiers {
                let local = specifier.local.name().to_string();
                let exported = specifier.exported.name().to_string();
                if is_type || specifier.export_kind.is_type() {
                  edge.type_only.push(exported);
                } else {
                  module.add_export(exported.clone());
                  edge.named.push((local, exported));
                }
              }
              module.edges.push(edge);
            }
            None if !is_type => {
              for specifier in &decl.specifiers {
                if !specifier.export_kind.is_type() {
                  module.add_export(specifier.exported.name().to_string());
                }
              }
            }
            None => {}
          }
        }
        Statement::ExportAllDeclaration(decl) => {
          let mut edge = ScannedEdge::new(&decl.source, ScannedEdgeKind::Static, decl.span.start);
          edge.is_export = true;
          edge.asserted_type = asserted_type(decl.with_clause.as_deref());
          match &decl.exported {
            Some(exported) if decl.export_kind.is_type() => {
              edge.type_only.push(exported.name().to_string());
            }
            Some(exported) => {
              let exported = exported.name().to_string();
              module.add_export(exported.clone());
              edge.namespace = Some(exported);
            }
            None if decl.export_kind.is_type() => edge.type_only.push("*".to_string()),
            None => edge.star = true,
          }
          module.edges.push(edge);
        }
        Statement::ExportDefaultDeclaration(decl) => {
          if !matches!(decl.declaration, ExportDefaultDeclarationKind::TSInterfaceDeclaration(_)) {
            module.has_default_export = true;
          }
        }
        _ => {}
      }
    }

    let mut collector = DynamicEdgeCollector::default();
    collector.visit_program(program);
    module.edges.extend(collector.edges);
    module.edges.sort_by_key(|edge| edge.position);

    module
  }

  fn scan_import(&mut self, decl: &ImportDeclaration) {
    let mut edge = ScannedEdge::new(&decl.source, ScannedEdgeKind::Static, decl.span.start);
    edge.asserted_type = asserted_type(decl.with_clause.as_deref());
    let is_type = decl.import_kind.is_type();

    for specifier in decl.specifiers.iter().flatten() {
      match specifier {
        ImportDeclarationSpecifier::ImportSpecifier(spec) => {
          let local = spec.local.name.to_string();
          if is_type || spec.import_kind.is_type() {
            edge.type_only.push(local);
          } else {
            edge.named.push((spec.imported.name().to_string(), local));
          }
        }
        ImportDeclarationSpecifier::ImportDefaultSpecifier(spec) => {
          let local = spec.local.name.to_string();
          if is_type {
            edge.type_only.push(local);
          } else {
            edge.default = Some(local);
          }
        }
        ImportDeclarationSpecifier::ImportNamespaceSpecifier(spec) => {
          let local = spec.local.name.to_string();
          if is_type {
            edge.type_only.push(local);
          } else {
            edge.namespace = Some(local);
          }
        }
      }
    }

    self.edges.push(edge);
  }

  fn add_export(&mut self, name: String) {
    if name == "default" {
      self.has_default_export = true;
    } else if !self.exports.contains(&name) {
      self.exports.push(name);
    }
  }
}

fn asserted_type(with_clause: Option<&WithClause>) -> Option<String> {
  with_clause?.with_entries.iter().find_map(|attribute| {
    let key = match &attribute.key {
      ImportAttributeKey::Identifier(ident) => ident.name.as_str(),
      ImportAttributeKey::StringLiteral(lit) => lit.value.as_str(),
    };
    (key == "type").then(|| attribute.value.value.to_string())
  })
}

/// Names bound by a runtime declaration. Type declarations bind nothing.
pub(crate) fn declared_names(declaration: &Declaration, f: &mut impl FnMut(String)) {
  match declaration {
    Declaration::VariableDeclaration(decl) => {
      for declarator in &decl.declarations {
        pattern_names(&declarator.id, f);
      }
    }
    Declaration::FunctionDeclaration(func) => {
      if let Some(id) = &func.id {
        f(id.name.to_string());
      }
    }
    Declaration::ClassDeclaration(class) => {
      if let Some(id) = &class.id {
        f(id.name.to_string());
      }
    }
    Declaration::TSEnumDeclaration(decl) => f(decl.id.name.to_string()),
    _ => {}
  }
}

fn pattern_names(pattern: &BindingPattern, f: &mut impl FnMut(String)) {
  match &pattern.kind {
    BindingPatternKind::BindingIdentifier(ident) => f(ident.name.to_string()),
    BindingPatternKind::ObjectPattern(object) => {
      for property in &object.properties {
        pattern_names(&property.value, f);
      }
      if let Some(rest) = &object.rest {
        pattern_names(&rest.argument, f);
      }
    }
    BindingPatternKind::ArrayPattern(array) => {
      for element in array.elements.iter().flatten() {
        pattern_names(element, f);
      }
      if let Some(rest) = &array.rest {
        pattern_names(&rest.argument, f);
      }
    }
    BindingPatternKind::AssignmentPattern(assignment) => pattern_names(&assignment.left, f),
  }
}

/// `fetch("lit")` and `navigator.serviceWorker.register("lit")`.
pub(crate) fn call_site<'s, 'a>(
  expr: &'s CallExpression<'a>,
) -> Option<(ScannedEdgeKind, &'s StringLiteral<'a>)> {
  let Some(Argument::StringLiteral(request)) = expr.arguments.first() else {
    return None;
  };
  match &expr.callee {
    Expression::Identifier(ident) if ident.name == "fetch" => {
      Some((ScannedEdgeKind::Fetch, request))
    }
    Expression::StaticMemberExpression(member) if member.property.name == "register" => {
      match &member.object {
        Expression::StaticMemberExpression(object) if object.property.name == "serviceWorker" => {
          Some((ScannedEdgeKind::ServiceWorker, request))
        }
        _ => None,
      }
    }
    _ => None,
  }
}

/// `new Worker("lit")` and `new SharedWorker("lit")`.
pub(crate) fn new_site<'s, 'a>(
  expr: &'s NewExpression<'a>,
) -> Option<(ScannedEdgeKind, &'s StringLiteral<'a>)> {
  let Some(Argument::StringLiteral(request)) = expr.arguments.first() else {
    return None;
  };
  match &expr.callee {
    Expression::Identifier(ident) if matches!(ident.name.as_str(), "Worker" | "SharedWorker") => {
      Some((ScannedEdgeKind::Worker, request))
    }
    _ => None,
  }
}

pub(crate) fn import_site<'s, 'a>(expr: &'s ImportExpression<'a>) -> Option<&'s StringLiteral<'a>> {
  match &expr.source {
    Expression::StringLiteral(request) => Some(request),
    _ => None,
  }
}

#[derive(Default)]
struct DynamicEdgeCollector {
  edges: Vec<ScannedEdge>,
}

impl<'a> Visit<'a> for DynamicEdgeCollector {
  fn visit_import_expression(&mut self, expr: &ImportExpression<'a>) {
    if let Some(request) = import_site(expr) {
      self.edges.push(ScannedEdge::new(request, ScannedEdgeKind::Dynamic, expr.span.start));
    }
    walk::walk_import_expression(self, expr);
  }

  fn visit_call_expression(&mut self, expr: &CallExpression<'a>) {
    if let Some((kind, request)) = call_site(expr) {
      self.edges.push(ScannedEdge::new(request, kind, expr.span.start));
    }
    walk::walk_call_expression(self, expr);
  }

  fn visit_new_expression(&mut self, expr: &NewExpression<'a>) {
    if let Some((kind, request)) = new_site(expr) {
      self.edges.push(ScannedEdge::new(request, kind, expr.span.start));
    }
    walk::walk_new_expression(self, expr);
  }
}

#[cfg(test)]
mod tests {
  use oxc::span::SourceType;

  use super::*;
  use crate::EcmaCompiler;

  fn scan(source: &str) -> ScannedModule {
    let ast = EcmaCompiler::parse(source.to_string(), SourceType::ts()).unwrap();
    ScannedModule::scan(&ast)
  }

  #[test]
  fn scans_static_edges_in_order() {
    let module = scan(
      r#"
      import def, { a as b, type T } from "./a.ts";
      export { c } from "./c.ts";
      import * as ns from "./ns.ts";
      export * from "./star.ts";
      import data from "./data.json" with { type: "json" };
      "#,
    );

    let requests = module.edges.iter().map(|edge| edge.request.as_str()).collect::<Vec<_>>();
    assert_eq!(requests, ["./a.ts", "./c.ts", "./ns.ts", "./star.ts", "./data.json"]);

    let a = &module.edges[0];
    assert_eq!(a.default.as_deref(), Some("def"));
    assert_eq!(a.named, vec![("a".to_string(), "b".to_string())]);
    assert_eq!(a.type_only, vec!["T".to_string()]);

    assert!(module.edges[1].is_export);
    assert_eq!(module.edges[2].namespace.as_deref(), Some("ns"));
    assert!(module.edges[3].star);
    assert_eq!(module.edges[4].asserted_type.as_deref(), Some("json"));
    assert_eq!(module.exports, vec!["c".to_string()]);
  }

  #[test]
  fn type_only_imports_are_marked() {
    let module =
      scan(r#"import type { Props } from "./types.ts"; export type { X } from "./x.ts";"#);
    assert_eq!(module.edges[0].type_only, vec!["Props".to_string()]);
    assert!(module.edges[0].named.is_empty());
    assert_eq!(module.edges[1].type_only, vec!["X".to_string()]);
  }

  #[test]
  fn scans_dynamic_edges() {
    let module = scan(
      r#"
      const page = () => import("./page.ts");
      fetch("./data.bin");
      new Worker("./worker.ts");
      navigator.serviceWorker.register("./sw.ts");
      fetch(url);
      "#,
    );
    let kinds =
      module.edges.iter().map(|edge| (edge.kind, edge.request.as_str())).collect::<Vec<_>>();
    assert_eq!(
      kinds,
      [
        (ScannedEdgeKind::Dynamic, "./page.ts"),
        (ScannedEdgeKind::Fetch, "./data.bin"),
        (ScannedEdgeKind::Worker, "./worker.ts"),
        (ScannedEdgeKind::ServiceWorker, "./sw.ts"),
      ]
    );
  }

  #[test]
  fn collects_exports() {
    let module = scan(
      r"
      export const { a, b: [c] } = obj;
      export function f() {}
      export class K {}
      export enum E { A }
      export interface I {}
      export type T = string;
      const local = 1;
      export { local as renamed, local as default };
      ",
    );
    assert_eq!(module.exports, ["a", "c", "f", "K", "E", "renamed"]);
    assert!(module.has_default_export);
  }
}
