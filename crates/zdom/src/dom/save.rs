//! Persisting a rendered subtree

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::dom::document::Document;
use crate::dom::node::NodeId;
use crate::error::{Error, Result};

/// Extension applied to targets given without one
pub const DEFAULT_EXTENSION: &str = "xml";

/// Something a rendered document can be written to
pub trait Target {
    /// True when the target already exists
    fn exists(&self) -> bool;

    /// Create the (empty) target
    fn create(&mut self) -> Result<()>;

    /// Replace the target's content with `text`
    fn write(&mut self, text: &str) -> Result<()>;
}

/// A file on the local filesystem
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FileTarget {
    path: PathBuf,
}

impl FileTarget {
    /// Target `path`, adding `.xml` when its file name has no dot
    pub fn new(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        let has_dot = path
            .file_name()
            .and_then(|name| name.to_str())
            .is_some_and(|name| name.contains('.'));
        let path = if has_dot {
            path.to_path_buf()
        } else {
            path.with_extension(DEFAULT_EXTENSION)
        };
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Target for FileTarget {
    fn exists(&self) -> bool {
        self.path.exists()
    }

    fn create(&mut self) -> Result<()> {
        fs::File::create(&self.path)
            .map(drop)
            .map_err(|err| Error::io(&err))
    }

    fn write(&mut self, text: &str) -> Result<()> {
        fs::write(&self.path, text).map_err(|err| Error::io(&err))
    }
}

impl Document {
    /// Render `id` at level 0 and write it to `target`, creating the
    /// target first when it does not exist.
    pub fn save<T: Target>(&self, id: NodeId, target: &mut T) -> Result<()> {
        let text = self.to_xml(id)?;
        if !target.exists() {
            target.create()?;
        }
        target.write(&text)?;
        debug!(bytes = text.len(), "saved document");
        Ok(())
    }

    /// Save `id` to a file; returns the path actually written
    pub fn save_to_path(&self, id: NodeId, path: impl AsRef<Path>) -> Result<PathBuf> {
        let mut target = FileTarget::new(path);
        debug!(path = %target.path().display(), "saving document");
        self.save(id, &mut target)?;
        Ok(target.path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct MemoryTarget {
        created: bool,
        content: Option<String>,
        writes: usize,
    }

    impl Target for MemoryTarget {
        fn exists(&self) -> bool {
            self.created
        }

        fn create(&mut self) -> Result<()> {
            self.created = true;
            self.content = Some(String::new());
            Ok(())
        }

        fn write(&mut self, text: &str) -> Result<()> {
            self.content = Some(text.to_string());
            self.writes += 1;
            Ok(())
        }
    }

    #[test]
    fn test_default_extension() {
        assert_eq!(FileTarget::new("out").path(), Path::new("out.xml"));
        assert_eq!(FileTarget::new("dir/out").path(), Path::new("dir/out.xml"));
        assert_eq!(FileTarget::new("out.txt").path(), Path::new("out.txt"));
        assert_eq!(FileTarget::new("a.b/out").path(), Path::new("a.b/out.xml"));
    }

    #[test]
    fn test_save_creates_then_overwrites() -> Result<()> {
        let mut doc = Document::new();
        let root = doc.create_element("root")?;
        let mut target = MemoryTarget::default();

        doc.save(root, &mut target)?;
        assert!(target.created);
        assert_eq!(target.content.as_deref(), Some(doc.to_xml(root)?.as_str()));

        doc.set_data(root, "second")?;
        doc.save(root, &mut target)?;
        assert_eq!(target.writes, 2);
        assert!(target.content.as_deref().is_some_and(|c| c.ends_with("<root>second</root>")));
        Ok(())
    }
}
