//! Memory path utilities.
//!
//! Shorthand property paths (`$name`, `@city`, ...) are rewritten into fully
//! qualified state-store paths by [`PathResolver`]s. Nothing in the dispatch
//! path depends on this module.

pub mod path;

pub use path::{AliasPathResolver, PathResolver, default_resolvers, resolve_path};
