pub mod normalize_options;
pub mod renamer;
