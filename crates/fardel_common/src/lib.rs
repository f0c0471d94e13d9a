mod bundler_options;
mod chunk;
mod types;

pub use bundler_options::{
  BundlerOptions, normalized_bundler_options::NormalizedBundlerOptions, reload::Reload,
};

pub use crate::{
  chunk::{Chunk, ChunkKind},
  types::{
    asset::Asset,
    dependencies::{BindingShape, Dependencies, EdgeDescriptor, NamedBinding, RawDependency},
    edge_type::EdgeType,
    export_surface::{ExportSurface, RawExports},
    format::Format,
    graph::Graph,
    item::Item,
    module_id::ModuleId,
    output_asset::{OutputAsset, OutputContent},
    raw_idx::{AssetIdx, ChunkIdx},
    source::Source,
    source_joiner::SourceJoiner,
    str_or_bytes::StrOrBytes,
  },
};
