mod adapter;
mod adapters;
mod registry;

pub use crate::{
  adapter::{source_text, EdgeResolver, ExtractedModule, FormatAdapter, ResolvedEdge},
  adapters::{
    json::JsonAdapter, manifest::ManifestAdapter, markup::MarkupAdapter, opaque::OpaqueAdapter,
    script::ScriptAdapter, style::StyleAdapter,
  },
  registry::AdapterRegistry,
};
