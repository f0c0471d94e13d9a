// Turns the raw request strings found in modules into module ids: import map first, then
// relative/absolute path or URL resolution.

pub mod error;
mod import_map;
mod resolver;

pub use crate::{error::ResolveError, import_map::ImportMap, resolver::Resolver};
