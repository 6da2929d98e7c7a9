use std::path::{Component, Path};

use crate::error::{Error, Result};

/// Extension trait for Path to provide convenient string conversion methods
pub trait PathExt {
    /// Converts a path to a string slice, returning an error if the path contains invalid Unicode characters.
    ///
    /// # Examples
    /// ```
    /// use stencil::ext::PathExt;
    /// use std::path::Path;
    ///
    /// let path = Path::new("test");
    /// assert_eq!(path.to_str_checked().unwrap(), "test");
    /// ```
    fn to_str_checked(&self) -> Result<&str>;

    /// Joins the normal components with `/`, independent of the host separator.
    ///
    /// Used for keys that are persisted and compared across platforms.
    ///
    /// # Examples
    /// ```
    /// use stencil::ext::PathExt;
    /// use std::path::Path;
    ///
    /// assert_eq!(Path::new("docs").join("guide.md").to_slash_string(), "docs/guide.md");
    /// ```
    fn to_slash_string(&self) -> String;

    /// Whether the path stays below the directory it is joined onto.
    fn is_contained(&self) -> bool;
}

impl PathExt for Path {
    fn to_str_checked(&self) -> Result<&str> {
        self.to_str().ok_or_else(|| {
            Error::Other(anyhow::anyhow!(
                "Path '{}' contains invalid Unicode characters",
                self.display()
            ))
        })
    }

    fn to_slash_string(&self) -> String {
        self.components()
            .filter_map(|component| match component {
                Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
                _ => None,
            })
            .collect::<Vec<_>>()
            .join("/")
    }

    fn is_contained(&self) -> bool {
        self.components().all(|component| matches!(component, Component::Normal(_)))
    }
}
