//! Alias path resolvers.
//!
//! ```rust,ignore
//! use parley_core::memory::{default_resolvers, resolve_path};
//!
//! let resolvers = default_resolvers();
//! assert_eq!(resolve_path(&resolvers, "$count"), "dialog.count");
//! assert_eq!(resolve_path(&resolvers, "@city"), "turn.recognized.entities.city.first()");
//! assert_eq!(resolve_path(&resolvers, "@@city"), "turn.recognized.entities.city");
//! ```

use std::borrow::Cow;

/// Rewrites a shorthand path into a fully qualified one.
pub trait PathResolver: Send + Sync {
    /// Returns the rewritten path, or the input unchanged if it does not apply.
    fn transform_path<'a>(&self, path: &'a str) -> Cow<'a, str>;
}

/// Rewrites `<alias><name>` into `<prefix><name><postfix>`.
///
/// A path only matches when something follows the alias and, for
/// single-character aliases, the next character is not the alias again: `@@x`
/// is left for the `@@` resolver instead of becoming `@x` under `@`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AliasPathResolver {
    alias: String,
    prefix: String,
    postfix: String,
}

impl AliasPathResolver {
    pub fn new(alias: impl Into<String>, prefix: impl Into<String>) -> Self {
        Self::with_postfix(alias, prefix, "")
    }

    pub fn with_postfix(
        alias: impl Into<String>,
        prefix: impl Into<String>,
        postfix: impl Into<String>,
    ) -> Self {
        Self {
            alias: alias.into(),
            prefix: prefix.into().trim().to_string(),
            postfix: postfix.into().trim().to_string(),
        }
    }

    pub fn alias(&self) -> &str {
        &self.alias
    }

    /// `$name` → `dialog.name`
    pub fn dollar() -> Self {
        Self::new("$", "dialog.")
    }

    /// `#name` → `turn.recognized.intents.name`
    pub fn hash() -> Self {
        Self::new("#", "turn.recognized.intents.")
    }

    /// `@@name` → `turn.recognized.entities.name`
    pub fn at_at() -> Self {
        Self::new("@@", "turn.recognized.entities.")
    }

    /// `@name` → `turn.recognized.entities.name.first()`
    pub fn at() -> Self {
        Self::with_postfix("@", "turn.recognized.entities.", ".first()")
    }

    /// `%name` → `class.name`
    pub fn percent() -> Self {
        Self::new("%", "class.")
    }
}

impl PathResolver for AliasPathResolver {
    fn transform_path<'a>(&self, path: &'a str) -> Cow<'a, str> {
        let trimmed = path.trim();
        let Some(rest) = trimmed.strip_prefix(self.alias.as_str()) else {
            return Cow::Borrowed(path);
        };
        if rest.is_empty() {
            return Cow::Borrowed(path);
        }
        if self.alias.chars().count() == 1 && rest.starts_with(self.alias.as_str()) {
            return Cow::Borrowed(path);
        }

        Cow::Owned(format!("{}{}{}", self.prefix, rest, self.postfix))
    }
}

/// The standard resolvers, in evaluation order.
pub fn default_resolvers() -> Vec<Box<dyn PathResolver>> {
    vec![
        Box::new(AliasPathResolver::dollar()),
        Box::new(AliasPathResolver::hash()),
        Box::new(AliasPathResolver::at_at()),
        Box::new(AliasPathResolver::at()),
        Box::new(AliasPathResolver::percent()),
    ]
}

/// Applies the first resolver that rewrites `path`.
pub fn resolve_path<'a>(resolvers: &[Box<dyn PathResolver>], path: &'a str) -> Cow<'a, str> {
    for resolver in resolvers {
        if let Cow::Owned(resolved) = resolver.transform_path(path) {
            return Cow::Owned(resolved);
        }
    }
    Cow::Borrowed(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_at_resolver() {
        let at = AliasPathResolver::at();
        assert_eq!(
            at.transform_path("@city"),
            "turn.recognized.entities.city.first()"
        );
        assert_eq!(
            at.transform_path("  @city "),
            "turn.recognized.entities.city.first()"
        );
        assert_eq!(at.transform_path("@@city"), "@@city");
        assert_eq!(at.transform_path("@"), "@");
        assert_eq!(at.transform_path("user.name"), "user.name");
    }

    #[test]
    fn test_unmatched_paths_are_borrowed() {
        let dollar = AliasPathResolver::dollar();
        assert!(matches!(dollar.transform_path("turn.x"), Cow::Borrowed(_)));
        assert!(matches!(dollar.transform_path("$$x"), Cow::Borrowed(_)));
    }

    #[test]
    fn test_default_resolvers_prefer_double_alias() {
        let resolvers = default_resolvers();
        assert_eq!(resolve_path(&resolvers, "$count"), "dialog.count");
        assert_eq!(
            resolve_path(&resolvers, "#greeting"),
            "turn.recognized.intents.greeting"
        );
        assert_eq!(
            resolve_path(&resolvers, "@@city"),
            "turn.recognized.entities.city"
        );
        assert_eq!(
            resolve_path(&resolvers, "@city"),
            "turn.recognized.entities.city.first()"
        );
        assert_eq!(resolve_path(&resolvers, "%prop"), "class.prop");
        assert_eq!(resolve_path(&resolvers, "user.name"), "user.name");
    }
}
