pub mod asset;
pub mod dependencies;
pub mod edge_type;
pub mod export_surface;
pub mod format;
pub mod graph;
pub mod item;
pub mod module_id;
pub mod output_asset;
pub mod raw_idx;
pub mod source;
pub mod source_joiner;
pub mod str_or_bytes;
