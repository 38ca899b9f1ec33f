//! In-process object store used by tests and local development.

use super::{ObjectStorage, StorageError};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;

#[derive(Default)]
pub struct MemoryObjectStore {
    objects: Mutex<HashMap<String, (String, Vec<u8>)>>,
}

impl MemoryObjectStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, path: &str) -> bool {
        self.objects.lock().unwrap().contains_key(path)
    }

    pub fn object_count(&self) -> usize {
        self.objects.lock().unwrap().len()
    }

    pub fn bytes_at(&self, path: &str) -> Option<Vec<u8>> {
        self.objects.lock().unwrap().get(path).map(|(_, b)| b.clone())
    }
}

#[async_trait]
impl ObjectStorage for MemoryObjectStore {
    async fn upload(
        &self,
        path: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<String, StorageError> {
        self.objects
            .lock()
            .unwrap()
            .insert(path.to_string(), (content_type.to_string(), bytes));
        Ok(self.public_url(path))
    }

    fn public_url(&self, path: &str) -> String {
        format!("memory://cards/{path}")
    }
}
