//! Platform client boundary

use spinforge_core::{CompiledObject, Kind};
use std::fmt;
use std::path::Path;

use crate::error::Result;

/// Identity of an object on the platform
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ObjectRef {
    Application { name: String },
    Pipeline { application: String, name: String },
}

impl ObjectRef {
    pub fn application(name: impl Into<String>) -> Self {
        Self::Application { name: name.into() }
    }

    pub fn pipeline(application: impl Into<String>, name: impl Into<String>) -> Self {
        Self::Pipeline {
            application: application.into(),
            name: name.into(),
        }
    }

    pub fn kind(&self) -> Kind {
        match self {
            Self::Application { .. } => Kind::Application,
            Self::Pipeline { .. } => Kind::Pipeline,
        }
    }

    /// Application that owns this object
    pub fn owner(&self) -> &str {
        match self {
            Self::Application { name } => name,
            Self::Pipeline { application, .. } => application,
        }
    }
}

impl fmt::Display for ObjectRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Application { name } => write!(f, "application '{name}'"),
            Self::Pipeline { application, name } => {
                write!(f, "pipeline '{name}' in application '{application}'")
            }
        }
    }
}

impl From<&CompiledObject> for ObjectRef {
    fn from(object: &CompiledObject) -> Self {
        match object {
            CompiledObject::Application(app) => Self::application(app.name()),
            CompiledObject::Pipeline(p) => Self::pipeline(p.application(), p.name()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    Deleted,
    AlreadyAbsent,
}

/// What the compiler needs from the platform
///
/// Not found is `Ok(None)` on get and `Ok(DeleteOutcome::AlreadyAbsent)`
/// on delete. Every `Err` is fatal.
pub trait PlatformClient {
    /// Current spec of `object`, as the platform returns it
    fn get(&self, object: &ObjectRef) -> Result<Option<Vec<u8>>>;

    /// Create or update `object` from the JSON spec stored at `spec_path`
    fn save(&self, object: &ObjectRef, spec_path: &Path) -> Result<()>;

    fn delete(&self, object: &ObjectRef) -> Result<DeleteOutcome>;
}

impl<C: PlatformClient + ?Sized> PlatformClient for &C {
    fn get(&self, object: &ObjectRef) -> Result<Option<Vec<u8>>> {
        (**self).get(object)
    }

    fn save(&self, object: &ObjectRef, spec_path: &Path) -> Result<()> {
        (**self).save(object, spec_path)
    }

    fn delete(&self, object: &ObjectRef) -> Result<DeleteOutcome> {
        (**self).delete(object)
    }
}

impl<C: PlatformClient + ?Sized> PlatformClient for Box<C> {
    fn get(&self, object: &ObjectRef) -> Result<Option<Vec<u8>>> {
        (**self).get(object)
    }

    fn save(&self, object: &ObjectRef, spec_path: &Path) -> Result<()> {
        (**self).save(object, spec_path)
    }

    fn delete(&self, object: &ObjectRef) -> Result<DeleteOutcome> {
        (**self).delete(object)
    }
}
