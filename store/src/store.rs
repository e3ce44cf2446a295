//! The collection repository.
//!
//! `CollectionStore` is the only mutator of collections. Every mutating call
//! runs load-mutate-persist inside one critical section, so callers sharing an
//! `Arc<CollectionStore>` cannot lose each other's updates.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::error::{Result, StoreError};
use crate::model::{Collection, CollectionUpdate, Problem};
use crate::official::OfficialCatalog;
use crate::storage::CollectionBackend;

/// How a collection is being created.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CreateMode {
    /// Created by the user; names must be unique ignoring case.
    Local,
    /// Created by an import; may reuse a remote-derived name.
    Import,
}

impl CreateMode {
    fn id_prefix(self) -> &'static str {
        match self {
            CreateMode::Local => "custom",
            CreateMode::Import => "import",
        }
    }
}

/// Repository of named problem collections.
pub struct CollectionStore {
    /// Persistence substrate.
    backend: Arc<dyn CollectionBackend>,

    /// Collections by id, in creation order.
    collections: Mutex<IndexMap<String, Collection>>,
}

impl CollectionStore {
    /// Open a store, loading whatever the backend holds.
    ///
    /// Unreadable or malformed stored data yields an empty store rather than
    /// a partial one.
    pub async fn open(backend: Arc<dyn CollectionBackend>) -> Self {
        let collections = match backend.load_all().await {
            Ok(loaded) => {
                let mut map = IndexMap::with_capacity(loaded.len());
                for collection in loaded {
                    map.insert(collection.id.clone(), collection);
                }
                map
            }
            Err(e) => {
                warn!("Failed to load collections, starting empty: {e}");
                IndexMap::new()
            }
        };

        info!("Loaded {} collections", collections.len());

        Self {
            backend,
            collections: Mutex::new(collections),
        }
    }

    /// Create an empty user collection.
    pub async fn create(
        &self,
        name: &str,
        description: Option<String>,
        url: Option<String>,
    ) -> Result<Collection> {
        self.create_with_mode(name, description, url, CreateMode::Local)
            .await
    }

    /// Create an empty collection.
    pub async fn create_with_mode(
        &self,
        name: &str,
        description: Option<String>,
        url: Option<String>,
        mode: CreateMode,
    ) -> Result<Collection> {
        let name = name.trim();
        if name.is_empty() {
            return Err(StoreError::Validation(
                "collection name cannot be empty".to_string(),
            ));
        }

        let mut collections = self.collections.lock().await;

        if mode == CreateMode::Local {
            let lowered = name.to_lowercase();
            if collections
                .values()
                .any(|c| !c.is_official && c.name.to_lowercase() == lowered)
            {
                return Err(StoreError::Validation(format!(
                    "a collection named \"{name}\" already exists"
                )));
            }
        }

        let now = Utc::now();
        let id = Self::fresh_id(&collections, mode, now);
        let mut collection = Collection::new(id.clone(), name, now);
        collection.description = description.filter(|d| !d.trim().is_empty());
        collection.url = url;

        collections.insert(id.clone(), collection.clone());
        self.persist(&collections).await?;

        info!("Created collection {name} ({id})");
        Ok(collection)
    }

    /// Get a collection by id.
    pub async fn get(&self, id: &str) -> Option<Collection> {
        self.collections.lock().await.get(id).cloned()
    }

    /// All collections, in creation order.
    pub async fn get_all(&self) -> Vec<Collection> {
        self.collections.lock().await.values().cloned().collect()
    }

    /// Collections created by the user or by imports.
    pub async fn get_custom(&self) -> Vec<Collection> {
        self.filtered(|c| !c.is_official).await
    }

    /// Built-in official collections.
    pub async fn get_official(&self) -> Vec<Collection> {
        self.filtered(|c| c.is_official).await
    }

    /// Collections whose flat list contains the problem.
    pub async fn lists_containing(&self, problem_id: &str) -> Vec<Collection> {
        self.filtered(|c| c.problems.iter().any(|p| p.matches(problem_id)))
            .await
    }

    /// Number of collections.
    pub async fn len(&self) -> usize {
        self.collections.lock().await.len()
    }

    /// Whether the store holds no collections.
    pub async fn is_empty(&self) -> bool {
        self.collections.lock().await.is_empty()
    }

    /// Merge fields into a collection.
    ///
    /// Renames are not checked for uniqueness.
    pub async fn update(&self, id: &str, update: CollectionUpdate) -> Result<Collection> {
        let mut collections = self.collections.lock().await;
        let collection = collections
            .get_mut(id)
            .ok_or_else(|| StoreError::NotFound(format!("collection {id}")))?;

        update.apply(collection);
        let dropped = collection.normalize();
        if dropped > 0 {
            debug!("Dropped {dropped} inconsistent problem entries while updating {id}");
        }
        collection.touch(Utc::now());
        let updated = collection.clone();

        self.persist(&collections).await?;
        debug!("Updated collection {id}");
        Ok(updated)
    }

    /// Permanently delete a collection and its categories.
    pub async fn delete(&self, id: &str) -> Result<()> {
        let mut collections = self.collections.lock().await;
        if collections.shift_remove(id).is_none() {
            return Err(StoreError::NotFound(format!("collection {id}")));
        }

        self.persist(&collections).await?;
        info!("Deleted collection {id}");
        Ok(())
    }

    /// Add a problem to a collection, and to one of its categories when
    /// `category_id` is given and the collection has categories.
    pub async fn add_problem(
        &self,
        list_id: &str,
        problem: Problem,
        category_id: Option<&str>,
    ) -> Result<Collection> {
        let mut collections = self.collections.lock().await;
        let collection = collections
            .get_mut(list_id)
            .ok_or_else(|| StoreError::NotFound(format!("collection {list_id}")))?;

        if collection.contains(&problem.id) {
            return Err(StoreError::Duplicate(format!(
                "problem {} is already in {}",
                problem.id, collection.name
            )));
        }

        if let Some(category_id) = category_id.filter(|_| collection.has_categories()) {
            let category = collection
                .category_mut(category_id)
                .ok_or_else(|| StoreError::NotFound(format!("category {category_id}")))?;
            if category.contains(&problem.id) {
                return Err(StoreError::Duplicate(format!(
                    "problem {} is already in category {}",
                    problem.id, category.name
                )));
            }
            category.problems.push(problem.clone());
        }

        debug!("Adding problem {} to {list_id}", problem.id);
        collection.problems.push(problem);
        collection.touch(Utc::now());
        let updated = collection.clone();

        self.persist(&collections).await?;
        Ok(updated)
    }

    /// Remove a problem from a collection and from every category in it.
    pub async fn remove_problem(&self, list_id: &str, problem_id: &str) -> Result<Collection> {
        let mut collections = self.collections.lock().await;
        let collection = collections
            .get_mut(list_id)
            .ok_or_else(|| StoreError::NotFound(format!("collection {list_id}")))?;

        let index = collection
            .problems
            .iter()
            .position(|p| p.id == problem_id)
            .ok_or_else(|| {
                StoreError::NotFound(format!("problem {problem_id} in {}", collection.name))
            })?;

        collection.problems.remove(index);
        if let Some(categories) = collection.categories.as_mut() {
            for category in categories.iter_mut() {
                category.problems.retain(|p| p.id != problem_id);
            }
        }
        collection.touch(Utc::now());
        let updated = collection.clone();

        self.persist(&collections).await?;
        debug!("Removed problem {problem_id} from {list_id}");
        Ok(updated)
    }

    /// Insert or refresh the built-in official collections.
    ///
    /// Existing official collections keep their creation time.
    pub async fn sync_official(&self, catalog: &OfficialCatalog) -> Result<usize> {
        let now = Utc::now();
        let mut collections = self.collections.lock().await;

        let mut synced = 0;
        for mut collection in catalog.collections(now) {
            if let Some(existing) = collections.get(&collection.id) {
                collection.created_at = existing.created_at;
                collection.touch(now);
            }
            debug!(
                "Synced official list {} with {} problems",
                collection.name,
                collection.problems.len()
            );
            collections.insert(collection.id.clone(), collection);
            synced += 1;
        }

        self.persist(&collections).await?;
        info!("Synced {synced} official collections");
        Ok(synced)
    }

    async fn filtered(&self, keep: impl Fn(&Collection) -> bool) -> Vec<Collection> {
        self.collections
            .lock()
            .await
            .values()
            .filter(|c| keep(c))
            .cloned()
            .collect()
    }

    async fn persist(&self, collections: &IndexMap<String, Collection>) -> Result<()> {
        let snapshot: Vec<Collection> = collections.values().cloned().collect();
        self.backend.save_all(&snapshot).await?;
        Ok(())
    }

    fn fresh_id(
        collections: &IndexMap<String, Collection>,
        mode: CreateMode,
        now: DateTime<Utc>,
    ) -> String {
        loop {
            let suffix = Uuid::new_v4().simple().to_string();
            let id = format!(
                "{}_{}_{}",
                mode.id_prefix(),
                now.timestamp_millis(),
                &suffix[..8]
            );
            if !collections.contains_key(&id) {
                return id;
            }
        }
    }
}
