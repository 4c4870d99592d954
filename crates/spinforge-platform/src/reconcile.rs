//! Plan and apply compiled objects against the platform
//!
//! Both sides are compared as canonical JSON: the platform's copy is first
//! decoded into the typed spec, which drops the fields the platform adds
//! (ids, timestamps, audit data), then re-encoded with sorted keys.

use spinforge_core::{Application, CompiledObject, ManifestSet, Pipeline, canonical_json};
use std::io::Write;

use crate::client::{DeleteOutcome, ObjectRef, PlatformClient};
use crate::diff::{DiffEngine, SpecDiff};
use crate::error::Result;

#[derive(Debug, Clone, Copy, Default)]
pub struct ReconcileOptions {
    /// Never save, only report
    pub dry_run: bool,
    /// Attach a diff to changed objects
    pub show_plan: bool,
}

impl ReconcileOptions {
    pub fn plan() -> Self {
        Self {
            dry_run: true,
            show_plan: true,
        }
    }

    pub fn apply(show_plan: bool) -> Self {
        Self {
            dry_run: false,
            show_plan,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    New,
    Changed,
    Unchanged,
}

#[derive(Debug, Clone)]
pub struct ReconcileReport {
    pub object: ObjectRef,
    pub outcome: Outcome,
    pub diff: Option<SpecDiff>,
    /// Whether the compiled spec was handed to the platform
    pub saved: bool,
}

pub struct Reconciler<C> {
    client: C,
    diff_engine: DiffEngine,
}

impl<C: PlatformClient> Reconciler<C> {
    pub fn new(client: C) -> Self {
        Self {
            client,
            diff_engine: DiffEngine::new(),
        }
    }

    /// Canonical JSON of the platform's copy, `None` when absent
    pub fn existing(&self, object: &CompiledObject) -> Result<Option<Vec<u8>>> {
        let target = ObjectRef::from(object);
        let Some(payload) = self.client.get(&target)? else {
            return Ok(None);
        };

        let canonical = match object {
            CompiledObject::Application(_) => canonical_json(&Application::from_platform_json(&payload)?)?,
            CompiledObject::Pipeline(_) => canonical_json(&Pipeline::from_platform_json(&payload)?)?,
        };
        Ok(Some(canonical))
    }

    pub fn reconcile(&self, object: &CompiledObject, options: ReconcileOptions) -> Result<ReconcileReport> {
        let target = ObjectRef::from(object);
        let compiled = object.canonical_json()?;

        let (outcome, diff) = match self.existing(object)? {
            None => (Outcome::New, None),
            Some(existing) if existing == compiled => {
                tracing::info!("No changes detected for {target}");
                (Outcome::Unchanged, None)
            }
            Some(existing) => {
                let diff = options.show_plan.then(|| {
                    tracing::info!("Planning changes for {target}");
                    self.diff_engine.diff(
                        &String::from_utf8_lossy(&existing),
                        &String::from_utf8_lossy(&compiled),
                    )
                });
                (Outcome::Changed, diff)
            }
        };

        let saved = !options.dry_run && outcome != Outcome::Unchanged;
        if saved {
            tracing::info!("Saving {target}");
            self.save(&target, &compiled)?;
        }

        Ok(ReconcileReport {
            object: target,
            outcome,
            diff,
            saved,
        })
    }

    /// Applications first, then pipelines; stops at the first error
    pub fn reconcile_all(&self, set: &ManifestSet, options: ReconcileOptions) -> Result<Vec<ReconcileReport>> {
        set.objects()
            .map(|object| self.reconcile(&object, options))
            .collect()
    }

    /// Not found is a success (`AlreadyAbsent`)
    pub fn delete(&self, object: &ObjectRef) -> Result<DeleteOutcome> {
        let outcome = self.client.delete(object)?;
        match outcome {
            DeleteOutcome::Deleted => tracing::info!("Deleted {object}"),
            DeleteOutcome::AlreadyAbsent => tracing::info!("{object} does not exist, nothing to delete"),
        }
        Ok(outcome)
    }

    /// Pipelines first, then their applications
    pub fn delete_all(&self, set: &ManifestSet) -> Result<Vec<(ObjectRef, DeleteOutcome)>> {
        let pipelines = set
            .pipelines
            .iter()
            .map(|p| ObjectRef::pipeline(p.application(), p.name()));
        let applications = set.applications.iter().map(|a| ObjectRef::application(a.name()));

        pipelines
            .chain(applications)
            .map(|object| self.delete(&object).map(|outcome| (object, outcome)))
            .collect()
    }

    /// Stage the compiled JSON in a temp file for the client; the file is removed on
    /// every path out of here
    fn save(&self, target: &ObjectRef, spec: &[u8]) -> Result<()> {
        let mut file = tempfile::Builder::new()
            .prefix("spinforge-")
            .suffix(".json")
            .tempfile()?;
        file.write_all(spec)?;
        file.flush()?;

        let result = self.client.save(target, file.path());
        if let Err(e) = file.close() {
            tracing::warn!("error removing the temp file: {e}");
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockPlatformClient;
    use crate::PlatformError;
    use spinforge_core::API_VERSION;

    fn manifests() -> ManifestSet {
        let yaml = format!(
            r#"apiVersion: {API_VERSION}
kind: Application
metadata:
  name: shop
spec:
  email: ops@example.com
  cloudProviders: kubernetes
---
apiVersion: {API_VERSION}
kind: Pipeline
metadata:
  name: release
  application: shop
spec:
  stages:
    - name: Pause
      type: wait
      waitTime: 30
"#
        );
        spinforge_core::manifest::load_str(&yaml).unwrap()
    }

    fn pipeline(set: &ManifestSet) -> CompiledObject {
        CompiledObject::Pipeline(set.pipelines[0].clone())
    }

    #[test]
    fn test_new_objects_are_saved_in_order() {
        let mock = MockPlatformClient::new();
        let reconciler = Reconciler::new(mock.clone());

        let reports = reconciler
            .reconcile_all(&manifests(), ReconcileOptions::apply(true))
            .unwrap();

        assert_eq!(reports.len(), 2);
        assert!(reports.iter().all(|r| r.outcome == Outcome::New && r.saved));
        assert_eq!(reports[0].object, ObjectRef::application("shop"));
        assert_eq!(mock.operation_counts().saves, 2);
    }

    #[test]
    fn test_second_apply_is_a_no_op() {
        let mock = MockPlatformClient::new();
        let reconciler = Reconciler::new(mock.clone());
        let set = manifests();

        reconciler.reconcile_all(&set, ReconcileOptions::apply(false)).unwrap();
        mock.reset_counts();

        let reports = reconciler.reconcile_all(&set, ReconcileOptions::plan()).unwrap();
        assert!(reports.iter().all(|r| r.outcome == Outcome::Unchanged && r.diff.is_none()));
        assert_eq!(mock.operation_counts().saves, 0);
    }

    #[test]
    fn test_platform_fields_do_not_count_as_changes() {
        let set = manifests();
        let mut stored: serde_json::Value =
            serde_json::from_slice(&pipeline(&set).canonical_json().unwrap()).unwrap();
        stored["id"] = "6c1b2a".into();
        stored["updateTs"] = "1650000000000".into();
        stored["lastModifiedBy"] = "someone".into();

        let mock = MockPlatformClient::new()
            .with_object(ObjectRef::pipeline("shop", "release"), serde_json::to_vec(&stored).unwrap());
        let report = Reconciler::new(mock)
            .reconcile(&pipeline(&set), ReconcileOptions::apply(true))
            .unwrap();

        assert_eq!(report.outcome, Outcome::Unchanged);
        assert!(!report.saved);
    }

    #[test]
    fn test_null_lists_from_the_platform_are_not_changes() {
        let set = manifests();
        let mut stored: serde_json::Value =
            serde_json::from_slice(&pipeline(&set).canonical_json().unwrap()).unwrap();
        stored["triggers"] = serde_json::Value::Null;
        stored["notifications"] = serde_json::Value::Null;

        let mock = MockPlatformClient::new()
            .with_object(ObjectRef::pipeline("shop", "release"), serde_json::to_vec(&stored).unwrap());
        let report = Reconciler::new(mock)
            .reconcile(&pipeline(&set), ReconcileOptions::plan())
            .unwrap();

        assert_eq!(report.outcome, Outcome::Unchanged);
    }

    #[test]
    fn test_changed_pipeline_gets_a_diff() {
        let set = manifests();
        let existing = br#"{"application":"shop","name":"release","stages":[]}"#.to_vec();
        let mock = MockPlatformClient::new()
            .with_object(ObjectRef::application("shop"), "{}")
            .with_object(ObjectRef::pipeline("shop", "release"), existing.clone());
        let reconciler = Reconciler::new(mock.clone());

        let plan = reconciler.reconcile(&pipeline(&set), ReconcileOptions::plan()).unwrap();
        assert_eq!(plan.outcome, Outcome::Changed);
        assert!(!plan.saved);
        let diff = plan.diff.unwrap();
        assert!(diff.additions > 0);
        assert!(diff.to_text().contains("+      \"waitTime\": 30"));
        assert_eq!(mock.stored(&ObjectRef::pipeline("shop", "release")).unwrap(), existing);

        let applied = reconciler
            .reconcile(&pipeline(&set), ReconcileOptions::apply(false))
            .unwrap();
        assert!(applied.saved);
        assert!(applied.diff.is_none());
        assert_eq!(
            mock.stored(&ObjectRef::pipeline("shop", "release")).unwrap(),
            pipeline(&set).canonical_json().unwrap()
        );
    }

    #[test]
    fn test_temp_file_removed_even_on_failure() {
        let set = manifests();
        let mock = MockPlatformClient::new();
        let reconciler = Reconciler::new(mock.clone());

        let err = reconciler
            .reconcile(&pipeline(&set), ReconcileOptions::apply(false))
            .unwrap_err();
        assert!(matches!(err, PlatformError::ApplicationMissing { .. }));

        let counts = mock.operation_counts();
        assert_eq!(counts.saved_paths.len(), 1);
        assert!(!counts.saved_paths[0].exists());
    }

    #[test]
    fn test_delete_not_found_is_success() {
        let mock = MockPlatformClient::new().with_object(ObjectRef::pipeline("shop", "release"), "{}");
        let reconciler = Reconciler::new(mock);
        let set = manifests();

        let outcomes = reconciler.delete_all(&set).unwrap();
        assert_eq!(
            outcomes,
            vec![
                (ObjectRef::pipeline("shop", "release"), DeleteOutcome::Deleted),
                (ObjectRef::application("shop"), DeleteOutcome::AlreadyAbsent),
            ]
        );
    }
}
