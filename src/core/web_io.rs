use crate::core::io::Storage;
use anyhow::{anyhow, Result};
use async_trait::async_trait;
use idb::{Factory, ObjectStoreParams, TransactionMode};
use wasm_bindgen::JsValue;

const DB_NAME: &str = "storyprofit_db";
const STORE_NAME: &str = "studio";

/// Browser-local persistence backed by a single IndexedDB object store.
pub struct WebStorage {
    db: idb::Database,
}

impl WebStorage {
    pub async fn new() -> Result<Self> {
        let factory = Factory::new().map_err(|e| anyhow!("Failed to create factory: {:?}", e))?;
        let mut open_request = factory
            .open(DB_NAME, Some(1))
            .map_err(|e| anyhow!("Failed to open DB: {:?}", e))?;

        open_request.on_upgrade_needed(|event| {
            let Ok(db) = event.database() else {
                log::error!("Upgrade event carried no database");
                return;
            };
            if !db.store_names().iter().any(|n| n.as_str() == STORE_NAME) {
                if let Err(e) = db.create_object_store(STORE_NAME, ObjectStoreParams::new()) {
                    log::error!("Failed to create object store: {:?}", e);
                }
            }
        });

        let db = open_request
            .await
            .map_err(|e| anyhow!("Failed to await DB open: {:?}", e))?;
        Ok(Self { db })
    }
}

#[async_trait(?Send)]
impl Storage for WebStorage {
    async fn read(&self, path: &str) -> Result<Vec<u8>> {
        let transaction = self
            .db
            .transaction(&[STORE_NAME], TransactionMode::ReadOnly)
            .map_err(|e| anyhow!("Tx error: {:?}", e))?;
        let store = transaction
            .object_store(STORE_NAME)
            .map_err(|e| anyhow!("Store error: {:?}", e))?;

        let value = store
            .get(JsValue::from_str(path))
            .map_err(|e| anyhow!("Get error: {:?}", e))?
            .await
            .map_err(|e| anyhow!("Get await error: {:?}", e))?;

        match value {
            Some(v) => Ok(js_sys::Uint8Array::new(&v).to_vec()),
            None => Err(anyhow!("Key not found: {}", path)),
        }
    }

    async fn write(&self, path: &str, content: &[u8]) -> Result<()> {
        let transaction = self
            .db
            .transaction(&[STORE_NAME], TransactionMode::ReadWrite)
            .map_err(|e| anyhow!("Tx error: {:?}", e))?;
        let store = transaction
            .object_store(STORE_NAME)
            .map_err(|e| anyhow!("Store error: {:?}", e))?;

        let array = js_sys::Uint8Array::from(content);
        store
            .put(&array, Some(&JsValue::from_str(path)))
            .map_err(|e| anyhow!("Put error: {:?}", e))?
            .await
            .map_err(|e| anyhow!("Put await error: {:?}", e))?;

        transaction
            .commit()
            .map_err(|e| anyhow!("Commit error: {:?}", e))?
            .await
            .map_err(|e| anyhow!("Commit await error: {:?}", e))?;
        Ok(())
    }

    async fn exists(&self, path: &str) -> Result<bool> {
        let transaction = self
            .db
            .transaction(&[STORE_NAME], TransactionMode::ReadOnly)
            .map_err(|e| anyhow!("Tx error: {:?}", e))?;
        let store = transaction
            .object_store(STORE_NAME)
            .map_err(|e| anyhow!("Store error: {:?}", e))?;

        let key = store
            .get_key(JsValue::from_str(path))
            .map_err(|e| anyhow!("GetKey error: {:?}", e))?
            .await
            .map_err(|e| anyhow!("GetKey await error: {:?}", e))?;

        Ok(key.is_some())
    }
}
