//! Sources of project metadata: schema snapshots, policies and views.

use warden_core::{async_trait, schema::CollectionId, Policy, Result, Schema, View};

use std::{
    collections::HashMap,
    fmt::Debug,
    sync::{Arc, PoisonError, RwLock},
};

/// Loads the metadata a project's queries are compiled against.
///
/// Results are cached by [`crate::Db`]; implementations do not need to cache.
#[async_trait]
pub trait Catalog: Debug + Send + Sync + 'static {
    async fn schema(&self, project: &str) -> Result<Option<Arc<Schema>>>;

    /// Every policy attached to the collection, active or not.
    async fn policies(&self, project: &str, collection: &CollectionId) -> Result<Vec<Policy>>;

    async fn view(&self, project: &str, name: &str) -> Result<Option<View>>;
}

/// A [`Catalog`] held in memory.
///
/// Clones share state. Replacing or updating a view bumps its version, so
/// plans compiled against the previous definition become stale.
#[derive(Debug, Clone, Default)]
pub struct MemoryCatalog {
    inner: Arc<RwLock<Inner>>,
}

#[derive(Debug, Default)]
struct Inner {
    schemas: HashMap<String, Arc<Schema>>,
    policies: HashMap<String, Vec<Policy>>,
    views: HashMap<(String, String), View>,
}

impl MemoryCatalog {
    pub fn new() -> MemoryCatalog {
        MemoryCatalog::default()
    }

    pub fn put_schema(&self, project: &str, schema: Schema) {
        self.write().schemas.insert(project.into(), Arc::new(schema));
    }

    pub fn add_policy(&self, project: &str, policy: Policy) {
        self.write()
            .policies
            .entry(project.into())
            .or_default()
            .push(policy);
    }

    /// Returns `true` if a policy was removed.
    pub fn remove_policy(&self, project: &str, id: i64) -> bool {
        let mut inner = self.write();
        let Some(policies) = inner.policies.get_mut(project) else {
            return false;
        };

        let before = policies.len();
        policies.retain(|policy| policy.id != id);
        policies.len() != before
    }

    /// Stores a view and returns its version. Replacing an existing view
    /// gives the new definition the next version.
    pub fn put_view(&self, project: &str, mut view: View) -> u64 {
        let mut inner = self.write();
        let key = (project.to_string(), view.name.clone());

        if let Some(existing) = inner.views.get(&key) {
            view.version = existing.version + 1;
        }

        let version = view.version;
        inner.views.insert(key, view);
        version
    }

    /// Edits a stored view in place, bumping its version. Returns the new
    /// version, or `None` if there is no such view.
    pub fn update_view(&self, project: &str, name: &str, f: impl FnOnce(&mut View)) -> Option<u64> {
        let mut inner = self.write();
        let view = inner
            .views
            .get_mut(&(project.to_string(), name.to_string()))?;

        f(view);
        view.version += 1;
        Some(view.version)
    }

    pub fn remove_view(&self, project: &str, name: &str) -> bool {
        self.write()
            .views
            .remove(&(project.to_string(), name.to_string()))
            .is_some()
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, Inner> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, Inner> {
        self.inner.write().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl Catalog for MemoryCatalog {
    async fn schema(&self, project: &str) -> Result<Option<Arc<Schema>>> {
        Ok(self.read().schemas.get(project).cloned())
    }

    async fn policies(&self, project: &str, collection: &CollectionId) -> Result<Vec<Policy>> {
        Ok(self
            .read()
            .policies
            .get(project)
            .map(|policies| {
                policies
                    .iter()
                    .filter(|policy| policy.collection_id == *collection)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn view(&self, project: &str, name: &str) -> Result<Option<View>> {
        Ok(self
            .read()
            .views
            .get(&(project.to_string(), name.to_string()))
            .cloned())
    }
}
