use crate::storage::StorageError;
use crate::storage_model::object;
use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, Set};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::debug;
use url::Url;

/// Blob storage for rendered artifacts (receipts). put returns the public
/// URL the stored object is reachable under.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    async fn put_object(
        &self,
        key: &str,
        bytes: &[u8],
        content_type: &str,
    ) -> Result<String, StorageError>;

    async fn get_object(&self, key: &str) -> Result<Option<StoredObject>, StorageError>;
}

#[derive(Debug, Clone, PartialEq)]
pub struct StoredObject {
    pub content_type: String,
    pub bytes: Vec<u8>,
}

fn public_url(base: &str, key: &str) -> Result<String, StorageError> {
    let url = Url::parse(base)?.join(key)?;
    Ok(url.to_string())
}

/// Objects live in a database table; the backend's `/objects/{key}` route
/// serves them, which is what makes the returned URL public.
#[derive(Clone)]
pub struct PgObjectStore {
    db: DatabaseConnection,
    public_url_base: String,
}

impl PgObjectStore {
    pub fn new(db: DatabaseConnection, public_url_base: String) -> Self {
        Self {
            db,
            public_url_base,
        }
    }
}

#[async_trait]
impl ObjectStore for PgObjectStore {
    async fn put_object(
        &self,
        key: &str,
        bytes: &[u8],
        content_type: &str,
    ) -> Result<String, StorageError> {
        debug!("Storing object {} ({} bytes)", key, bytes.len());
        let row = object::ActiveModel {
            key: Set(key.to_string()),
            content_type: Set(content_type.to_string()),
            data: Set(bytes.to_vec()),
            created_at: Set(Utc::now().naive_utc()),
        };
        // Receipt keys are deterministic, so a re-render overwrites.
        match object::Entity::find_by_id(key.to_string())
            .one(&self.db)
            .await?
        {
            Some(_) => {
                row.update(&self.db).await?;
            }
            None => {
                row.insert(&self.db).await?;
            }
        }
        public_url(&self.public_url_base, key)
    }

    async fn get_object(&self, key: &str) -> Result<Option<StoredObject>, StorageError> {
        let row = object::Entity::find_by_id(key.to_string())
            .one(&self.db)
            .await?;
        Ok(row.map(|row| StoredObject {
            content_type: row.content_type,
            bytes: row.data,
        }))
    }
}

#[derive(Clone)]
pub struct InMemoryObjectStore {
    objects: Arc<Mutex<HashMap<String, StoredObject>>>,
    public_url_base: String,
}

impl InMemoryObjectStore {
    pub fn new(public_url_base: &str) -> Self {
        Self {
            objects: Arc::new(Mutex::new(HashMap::new())),
            public_url_base: public_url_base.to_string(),
        }
    }
}

#[async_trait]
impl ObjectStore for InMemoryObjectStore {
    async fn put_object(
        &self,
        key: &str,
        bytes: &[u8],
        content_type: &str,
    ) -> Result<String, StorageError> {
        let mut objects = self.objects.lock().await;
        objects.insert(
            key.to_string(),
            StoredObject {
                content_type: content_type.to_string(),
                bytes: bytes.to_vec(),
            },
        );
        public_url(&self.public_url_base, key)
    }

    async fn get_object(&self, key: &str) -> Result<Option<StoredObject>, StorageError> {
        let objects = self.objects.lock().await;
        Ok(objects.get(key).cloned())
    }
}
