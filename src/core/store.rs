//! Record store - the narrow persistence interface behind every save flow
//!
//! Stores deal in raw documents (`serde_json::Value`) keyed by record id.
//! Typed access goes through the provided methods, which decode with
//! [`Entity::from_value`] so that drill sheets are migrated on every load.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde_json::Value;
use thiserror::Error;

use crate::core::entity::Entity;
use crate::core::identity::{EntityId, EntityPrefix};
use crate::core::project::{Project, RECORD_SUFFIX};

/// Persistence failure
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{path} is not valid YAML: {message}")]
    Yaml { path: PathBuf, message: String },

    #[error("record {id} could not be decoded: {source}")]
    Decode {
        id: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("record {id} could not be encoded: {message}")]
    Encode { id: String, message: String },
}

/// Narrowing applied by [`RecordStore::list`]
#[derive(Debug, Clone, Default)]
pub struct RecordFilter {
    /// Only records owned by this customer
    pub customer_id: Option<EntityId>,
    /// Only records owned by this pro shop
    pub pro_shop_id: Option<String>,
}

impl RecordFilter {
    pub fn matches<T: Entity>(&self, record: &T) -> bool {
        if let Some(customer) = &self.customer_id {
            if record.customer_id() != Some(customer) {
                return false;
            }
        }
        if let Some(shop) = &self.pro_shop_id {
            if record.pro_shop_id() != shop {
                return false;
            }
        }
        true
    }
}

/// Key-value store of records
///
/// Each `put_value`/`delete` is atomic per record; there are no multi-record
/// transactions. Last write wins.
pub trait RecordStore {
    /// Raw stored document, if any
    fn get_value(&self, id: &EntityId) -> Result<Option<Value>, StoreError>;

    /// Every stored document of one record type, ordered by id
    fn list_values(&self, prefix: EntityPrefix) -> Result<Vec<(EntityId, Value)>, StoreError>;

    fn put_value(&mut self, id: &EntityId, value: Value) -> Result<(), StoreError>;

    /// Remove a record; false when it did not exist
    fn delete(&mut self, id: &EntityId) -> Result<bool, StoreError>;

    fn get<T: Entity>(&self, id: &EntityId) -> Result<Option<T>, StoreError>
    where
        Self: Sized,
    {
        match self.get_value(id)? {
            Some(value) => T::from_value(value)
                .map(Some)
                .map_err(|source| StoreError::Decode {
                    id: id.to_string(),
                    source,
                }),
            None => Ok(None),
        }
    }

    /// Typed records matching `filter`
    ///
    /// Documents that fail to decode are logged and skipped so one bad file
    /// does not hide the rest.
    fn list<T: Entity>(&self, filter: &RecordFilter) -> Result<Vec<T>, StoreError>
    where
        Self: Sized,
    {
        let mut records = Vec::new();
        for (id, value) in self.list_values(T::PREFIX)? {
            match T::from_value(value) {
                Ok(record) if filter.matches(&record) => records.push(record),
                Ok(_) => {}
                Err(e) => tracing::warn!(%id, error = %e, "skipping undecodable record"),
            }
        }
        Ok(records)
    }

    fn put<T: Entity>(&mut self, record: &T) -> Result<(), StoreError>
    where
        Self: Sized,
    {
        let value = serde_json::to_value(record).map_err(|e| StoreError::Encode {
            id: record.id().to_string(),
            message: e.to_string(),
        })?;
        self.put_value(record.id(), value)
    }
}

/// One YAML file per record under the project's per-type directories
#[derive(Debug, Clone)]
pub struct YamlStore {
    project: Project,
}

impl YamlStore {
    pub fn new(project: Project) -> Self {
        Self { project }
    }

    pub fn project(&self) -> &Project {
        &self.project
    }

    /// Path where a record lives (whether or not it exists)
    pub fn path_of(&self, id: &EntityId) -> PathBuf {
        self.project.entity_path(id)
    }

    /// Find a record file whose id starts with or contains `partial`
    pub fn find_file(&self, prefix: EntityPrefix, partial: &str) -> Option<PathBuf> {
        let needle = partial.to_uppercase();
        self.project
            .iter_entity_files(prefix)
            .find(|path| file_id(path).is_some_and(|stem| stem.contains(&needle)))
    }

    /// Read and parse one record file
    pub fn read_file(path: &Path) -> Result<Value, StoreError> {
        let contents = fs::read_to_string(path).map_err(|source| StoreError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_yml::from_str(&contents).map_err(|e| StoreError::Yaml {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }
}

fn io_error(path: &Path) -> impl FnOnce(std::io::Error) -> StoreError {
    let path = path.to_path_buf();
    move |source| StoreError::Io { path, source }
}

/// Record id encoded in a file name (`<ID>.shop.yaml`)
pub fn file_id(path: &Path) -> Option<&str> {
    path.file_name()?.to_str()?.strip_suffix(RECORD_SUFFIX)
}

impl RecordStore for YamlStore {
    fn get_value(&self, id: &EntityId) -> Result<Option<Value>, StoreError> {
        let path = self.path_of(id);
        if !path.exists() {
            return Ok(None);
        }
        Self::read_file(&path).map(Some)
    }

    fn list_values(&self, prefix: EntityPrefix) -> Result<Vec<(EntityId, Value)>, StoreError> {
        let mut values = Vec::new();
        for path in self.project.iter_entity_files(prefix) {
            let Some(id) = file_id(&path).and_then(|s| EntityId::parse(s).ok()) else {
                tracing::debug!(path = %path.display(), "ignoring file without a record id");
                continue;
            };
            match Self::read_file(&path) {
                Ok(value) => values.push((id, value)),
                Err(e) => tracing::warn!(error = %e, "skipping unreadable record file"),
            }
        }
        values.sort_by(|a, b| a.0.cmp(&b.0));
        Ok(values)
    }

    fn put_value(&mut self, id: &EntityId, value: Value) -> Result<(), StoreError> {
        let path = self.path_of(id);
        let yaml = serde_yml::to_string(&value).map_err(|e| StoreError::Encode {
            id: id.to_string(),
            message: e.to_string(),
        })?;

        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir).map_err(io_error(dir))?;
        }
        let tmp = path.with_extension("yaml.tmp");
        fs::write(&tmp, yaml).map_err(io_error(&tmp))?;
        fs::rename(&tmp, &path).map_err(io_error(&path))?;

        tracing::debug!(%id, path = %path.display(), "wrote record");
        Ok(())
    }

    fn delete(&mut self, id: &EntityId) -> Result<bool, StoreError> {
        let path = self.path_of(id);
        match fs::remove_file(&path) {
            Ok(()) => {
                tracing::debug!(%id, "deleted record");
                Ok(true)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(source) => Err(StoreError::Io { path, source }),
        }
    }
}

/// In-memory store keyed by id
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    records: BTreeMap<EntityId, Value>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl RecordStore for MemoryStore {
    fn get_value(&self, id: &EntityId) -> Result<Option<Value>, StoreError> {
        Ok(self.records.get(id).cloned())
    }

    fn list_values(&self, prefix: EntityPrefix) -> Result<Vec<(EntityId, Value)>, StoreError> {
        Ok(self
            .records
            .iter()
            .filter(|(id, _)| id.prefix() == prefix)
            .map(|(id, value)| (id.clone(), value.clone()))
            .collect())
    }

    fn put_value(&mut self, id: &EntityId, value: Value) -> Result<(), StoreError> {
        self.records.insert(id.clone(), value);
        Ok(())
    }

    fn delete(&mut self, id: &EntityId) -> Result<bool, StoreError> {
        Ok(self.records.remove(id).is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::customer::Customer;
    use crate::entities::drill_sheet::DrillSheet;
    use serde_json::json;
    use tempfile::tempdir;

    fn customer(name: &str, shop: &str) -> Customer {
        let mut c = Customer::new(name.to_string(), "test".to_string());
        c.pro_shop_id = shop.to_string();
        c
    }

    fn exercise_store(store: &mut impl RecordStore) {
        let a = customer("Ann", "north");
        let b = customer("Bo", "south");
        store.put(&a).unwrap();
        store.put(&b).unwrap();

        let loaded: Customer = store.get(&a.id).unwrap().unwrap();
        assert_eq!(loaded, a);

        let all: Vec<Customer> = store.list(&RecordFilter::default()).unwrap();
        assert_eq!(all.len(), 2);

        let north: Vec<Customer> = store
            .list(&RecordFilter {
                pro_shop_id: Some("north".to_string()),
                ..RecordFilter::default()
            })
            .unwrap();
        assert_eq!(north, vec![a.clone()]);

        assert!(store.delete(&a.id).unwrap());
        assert!(!store.delete(&a.id).unwrap());
        assert!(store.get::<Customer>(&a.id).unwrap().is_none());
    }

    #[test]
    fn test_memory_store_contract() {
        exercise_store(&mut MemoryStore::new());
    }

    #[test]
    fn test_yaml_store_contract() {
        let tmp = tempdir().unwrap();
        let project = Project::init(tmp.path()).unwrap();
        exercise_store(&mut YamlStore::new(project));
    }

    #[test]
    fn test_yaml_store_writes_record_file() {
        let tmp = tempdir().unwrap();
        let project = Project::init(tmp.path()).unwrap();
        let mut store = YamlStore::new(project.clone());

        let c = customer("Ann", "main");
        store.put(&c).unwrap();

        let path = project.entity_path(&c.id);
        let contents = fs::read_to_string(&path).unwrap();
        assert!(contents.contains("name: Ann"));
        assert!(!path.with_extension("yaml.tmp").exists());

        let partial = &c.id.to_string()[..12];
        assert_eq!(store.find_file(EntityPrefix::Cust, partial), Some(path));
    }

    #[test]
    fn test_list_filters_by_customer() {
        let mut store = MemoryStore::new();
        let owner = EntityId::new(EntityPrefix::Cust);

        let mut mine = DrillSheet::new("Mine".to_string(), "test".to_string());
        mine.customer_id = Some(owner.clone());
        let other = DrillSheet::new("Other".to_string(), "test".to_string());
        store.put(&mine).unwrap();
        store.put(&other).unwrap();

        let sheets: Vec<DrillSheet> = store
            .list(&RecordFilter {
                customer_id: Some(owner),
                ..RecordFilter::default()
            })
            .unwrap();
        assert_eq!(sheets.len(), 1);
        assert_eq!(sheets[0].name, "Mine");
    }

    #[test]
    fn test_get_migrates_legacy_drill_sheet() {
        let mut store = MemoryStore::new();
        let id = EntityId::new(EntityPrefix::Drl);
        store
            .put_value(
                &id,
                json!({
                    "id": id.to_string(),
                    "name": "Old",
                    "spans": {
                        "thumb_to_middle": {"fit_span": 4.5},
                        "middle_to_ring": {"fit_span": 0.3}
                    },
                    "holes": {"middle": {}, "ring": {}},
                    "created": "2023-06-01T09:30:00Z",
                    "author": "test"
                }),
            )
            .unwrap();

        let sheet: DrillSheet = store.get(&id).unwrap().unwrap();
        assert_eq!(sheet.bridge.distance, 0.3);
    }

    #[test]
    fn test_list_skips_undecodable_records() {
        let mut store = MemoryStore::new();
        let bad = EntityId::new(EntityPrefix::Cust);
        store.put_value(&bad, json!({"id": bad.to_string()})).unwrap();
        store.put(&customer("Ann", "main")).unwrap();

        let all: Vec<Customer> = store.list(&RecordFilter::default()).unwrap();
        assert_eq!(all.len(), 1);
    }
}
