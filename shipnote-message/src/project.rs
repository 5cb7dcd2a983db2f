use camino::{Utf8Path, Utf8PathBuf};
use std::rc::Rc;

/// Coordinates of the project a message is composed for.
///
/// This is the narrow slice of the host build's project model that blocks
/// need: name, group, version, the project directory, and the chain of
/// parent projects used for upward changelog discovery. Contexts are cheap
/// to clone and immutable once built.
#[derive(Debug, Clone)]
pub struct ProjectContext {
    inner: Rc<Inner>,
}

#[derive(Debug)]
struct Inner {
    name: String,
    group: String,
    version: String,
    dir: Utf8PathBuf,
    parent: Option<ProjectContext>,
}

impl ProjectContext {
    pub fn new(
        name: impl Into<String>,
        group: impl Into<String>,
        version: impl Into<String>,
        dir: impl Into<Utf8PathBuf>,
    ) -> Self {
        Self {
            inner: Rc::new(Inner {
                name: name.into(),
                group: group.into(),
                version: version.into(),
                dir: dir.into(),
                parent: None,
            }),
        }
    }

    /// Returns a copy of this context attached to a parent project.
    pub fn with_parent(&self, parent: ProjectContext) -> Self {
        Self {
            inner: Rc::new(Inner {
                name: self.inner.name.clone(),
                group: self.inner.group.clone(),
                version: self.inner.version.clone(),
                dir: self.inner.dir.clone(),
                parent: Some(parent),
            }),
        }
    }

    pub fn name(&self) -> &str {
        &self.inner.name
    }

    pub fn group(&self) -> &str {
        &self.inner.group
    }

    pub fn version(&self) -> &str {
        &self.inner.version
    }

    pub fn dir(&self) -> &Utf8Path {
        &self.inner.dir
    }

    pub fn parent(&self) -> Option<&ProjectContext> {
        self.inner.parent.as_ref()
    }

    /// This project followed by its parents, nearest first.
    pub fn ancestors(&self) -> impl Iterator<Item = ProjectContext> + '_ {
        std::iter::successors(Some(self.clone()), |ctx| ctx.parent().cloned())
    }

    /// Resolves a possibly relative path against the project directory.
    pub fn resolve(&self, path: &Utf8Path) -> Utf8PathBuf {
        if path.is_absolute() {
            path.to_owned()
        } else {
            self.inner.dir.join(path)
        }
    }
}
