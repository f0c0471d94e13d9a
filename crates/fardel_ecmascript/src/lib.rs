mod ecma_ast;
mod ecma_compiler;
mod link_analysis;
mod scanner;

pub use crate::{
  ecma_ast::{program_cell::WithMutFields, EcmaAst},
  ecma_compiler::{EcmaCompiler, EcmaError},
  link_analysis::{
    DefaultExport, DynamicImport, ImportStatement, ImportedName, LinkAnalysis, Local, LocalExport,
    LocalKind, ReExport, Reference, StarExport, UrlReference,
  },
  scanner::{ScannedEdge, ScannedEdgeKind, ScannedModule},
};

pub use oxc::span::{SourceType, Span};
