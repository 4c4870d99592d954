//! In-memory platform for tests
//!
//! Behaves like the real platform where it matters to reconciliation:
//! a pipeline cannot be saved into an application that does not exist,
//! and deleting an absent object reports `AlreadyAbsent`.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::client::{DeleteOutcome, ObjectRef, PlatformClient};
use crate::error::{PlatformError, Result};

#[derive(Clone, Default)]
pub struct MockPlatformClient {
    store: Arc<RwLock<BTreeMap<ObjectRef, Vec<u8>>>>,
    operations: Arc<RwLock<OperationCounts>>,
}

/// Counts of calls, for assertions
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct OperationCounts {
    pub gets: usize,
    pub saves: usize,
    pub deletes: usize,
    /// Spec files handed to `save`, in call order
    pub saved_paths: Vec<PathBuf>,
}

fn read<T>(lock: &RwLock<T>) -> RwLockReadGuard<'_, T> {
    lock.read().unwrap_or_else(|poisoned| poisoned.into_inner())
}

fn write<T>(lock: &RwLock<T>) -> RwLockWriteGuard<'_, T> {
    lock.write().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl MockPlatformClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `payload` as the platform's current copy of `object`
    pub fn insert(&self, object: ObjectRef, payload: impl Into<Vec<u8>>) {
        write(&self.store).insert(object, payload.into());
    }

    pub fn with_object(self, object: ObjectRef, payload: impl Into<Vec<u8>>) -> Self {
        self.insert(object, payload);
        self
    }

    pub fn stored(&self, object: &ObjectRef) -> Option<Vec<u8>> {
        read(&self.store).get(object).cloned()
    }

    pub fn object_count(&self) -> usize {
        read(&self.store).len()
    }

    pub fn operation_counts(&self) -> OperationCounts {
        read(&self.operations).clone()
    }

    pub fn reset_counts(&self) {
        *write(&self.operations) = OperationCounts::default();
    }
}

impl PlatformClient for MockPlatformClient {
    fn get(&self, object: &ObjectRef) -> Result<Option<Vec<u8>>> {
        write(&self.operations).gets += 1;
        Ok(self.stored(object))
    }

    fn save(&self, object: &ObjectRef, spec_path: &Path) -> Result<()> {
        {
            let mut ops = write(&self.operations);
            ops.saves += 1;
            ops.saved_paths.push(spec_path.to_path_buf());
        }

        if let ObjectRef::Pipeline { application, .. } = object {
            let owner = ObjectRef::application(application.clone());
            if !read(&self.store).contains_key(&owner) {
                return Err(PlatformError::ApplicationMissing {
                    object: object.to_string(),
                    application: application.clone(),
                });
            }
        }

        let payload = std::fs::read(spec_path)?;
        self.insert(object.clone(), payload);
        Ok(())
    }

    fn delete(&self, object: &ObjectRef) -> Result<DeleteOutcome> {
        write(&self.operations).deletes += 1;

        let mut store = write(&self.store);
        if store.remove(object).is_none() {
            return Ok(DeleteOutcome::AlreadyAbsent);
        }
        if let ObjectRef::Application { name } = object {
            store.retain(|key, _| !matches!(key, ObjectRef::Pipeline { application, .. } if application == name));
        }
        Ok(DeleteOutcome::Deleted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_save_requires_application() {
        let mock = MockPlatformClient::new();
        let dir = tempfile::tempdir().unwrap();
        let spec = dir.path().join("spec.json");
        std::fs::write(&spec, b"{}").unwrap();

        let pipe = ObjectRef::pipeline("shop", "release");
        assert!(matches!(
            mock.save(&pipe, &spec).unwrap_err(),
            PlatformError::ApplicationMissing { .. }
        ));

        mock.insert(ObjectRef::application("shop"), "{}");
        mock.save(&pipe, &spec).unwrap();
        assert_eq!(mock.stored(&pipe).unwrap(), b"{}");
        assert_eq!(mock.operation_counts().saves, 2);
    }

    #[test]
    fn test_delete_application_removes_its_pipelines() {
        let mock = MockPlatformClient::new()
            .with_object(ObjectRef::application("shop"), "{}")
            .with_object(ObjectRef::pipeline("shop", "release"), "{}")
            .with_object(ObjectRef::pipeline("web", "release"), "{}");

        assert_eq!(mock.delete(&ObjectRef::application("shop")).unwrap(), DeleteOutcome::Deleted);
        assert_eq!(mock.object_count(), 1);
        assert_eq!(
            mock.delete(&ObjectRef::application("shop")).unwrap(),
            DeleteOutcome::AlreadyAbsent
        );
    }
}
