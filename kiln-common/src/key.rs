use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Component, Path};

/// A hierarchical, `/`-joined resource key.
///
/// Keys identify resources within the content cache. A key is not a
/// filesystem path, although the cache maps each key onto one file.
#[derive(
    Clone, Debug, Default, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct ResourceKey(String);

impl ResourceKey {
    pub fn new(key: impl Into<String>) -> Self {
        ResourceKey(key.into())
    }

    /// Appends a child segment, `/`-joined.
    pub fn join(&self, child: impl AsRef<str>) -> Self {
        let child = child.as_ref();
        if self.0.is_empty() {
            ResourceKey(child.to_string())
        } else {
            ResourceKey(format!("{}/{}", self.0, child))
        }
    }

    /// Derives a key from a source path relative to the bake root, with the
    /// extension stripped.
    pub fn from_relative_path(path: &Path) -> Self {
        let stem = path.with_extension("");
        let segments: Vec<_> = stem
            .components()
            .filter_map(|c| match c {
                Component::Normal(segment) => Some(segment.to_string_lossy().into_owned()),
                _ => None,
            })
            .collect();
        ResourceKey(segments.join("/"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ResourceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ResourceKey {
    fn from(key: &str) -> Self {
        ResourceKey(key.to_string())
    }
}

#[cfg(test)]
mod test {
    use super::ResourceKey;
    use std::path::Path;

    #[test]
    fn join_is_slash_separated() {
        let key = ResourceKey::from("materials/rock").join("standard");
        assert_eq!(key.as_str(), "materials/rock/standard");
    }

    #[test]
    fn join_onto_empty_is_child() {
        assert_eq!(ResourceKey::default().join("x").as_str(), "x");
    }

    #[test]
    fn relative_path_strips_extension() {
        let key = ResourceKey::from_relative_path(Path::new("shaders/basic.vert_spv"));
        assert_eq!(key.as_str(), "shaders/basic");
    }
}
