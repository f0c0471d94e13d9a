pub mod concat_string;
pub mod ecmascript;
pub mod hash;
pub mod indexmap;
pub mod path_ext;
pub mod rayon;

pub use rustc_hash;
