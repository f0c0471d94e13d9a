pub mod json;
pub mod manifest;
pub mod markup;
pub mod opaque;
pub mod script;
pub mod style;
