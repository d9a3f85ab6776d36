use async_trait::async_trait;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::error::Error;
use tokio::sync::RwLock;

/// Atomic array mutation applied to a single document field.
///
/// `Union` appends the value only if no equal element is present;
/// `Remove` deletes every equal element. These are the only ways this
/// crate mutates arrays inside stored documents, so concurrent writers
/// never race on a read-modify-write.
#[derive(Debug, Clone)]
pub enum ArrayOp {
    Union(Value),
    Remove(Value),
}

/// Opaque key-value document API backing per-user state.
///
/// Implementations are injected wherever durable state is needed; nothing
/// in this crate reaches for a process-wide store handle.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Fetch a document, or `None` if it has never been written
    async fn get_document(
        &self,
        collection: &str,
        key: &str,
    ) -> Result<Option<Value>, Box<dyn Error + Send + Sync>>;

    /// Create the document if absent, otherwise merge the given fields
    /// into it, leaving unmentioned fields untouched
    async fn merge_document(
        &self,
        collection: &str,
        key: &str,
        partial: Value,
    ) -> Result<(), Box<dyn Error + Send + Sync>>;

    /// Apply an atomic array mutation to one field of an existing document
    async fn update_array(
        &self,
        collection: &str,
        key: &str,
        field: &str,
        op: ArrayOp,
    ) -> Result<(), Box<dyn Error + Send + Sync>>;
}

/// In-process [`DocumentStore`] with the same observable semantics as the
/// hosted one. Used by tests and the CLI.
#[derive(Default)]
pub struct MemoryStore {
    documents: RwLock<HashMap<String, Value>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn doc_key(collection: &str, key: &str) -> String {
        format!("{}/{}", collection, key)
    }
}

fn shallow_merge(existing: &mut Value, partial: Value) {
    match (existing.as_object_mut(), partial) {
        (Some(target), Value::Object(fields)) => {
            for (name, value) in fields {
                target.insert(name, value);
            }
        }
        (_, partial) => *existing = partial,
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn get_document(
        &self,
        collection: &str,
        key: &str,
    ) -> Result<Option<Value>, Box<dyn Error + Send + Sync>> {
        let documents = self.documents.read().await;
        Ok(documents.get(&Self::doc_key(collection, key)).cloned())
    }

    async fn merge_document(
        &self,
        collection: &str,
        key: &str,
        partial: Value,
    ) -> Result<(), Box<dyn Error + Send + Sync>> {
        let mut documents = self.documents.write().await;
        let entry = documents
            .entry(Self::doc_key(collection, key))
            .or_insert_with(|| Value::Object(Map::new()));
        shallow_merge(entry, partial);
        Ok(())
    }

    async fn update_array(
        &self,
        collection: &str,
        key: &str,
        field: &str,
        op: ArrayOp,
    ) -> Result<(), Box<dyn Error + Send + Sync>> {
        let mut documents = self.documents.write().await;
        let document = documents
            .get_mut(&Self::doc_key(collection, key))
            .ok_or_else(|| format!("No document to update: {}/{}", collection, key))?;
        let target = document
            .as_object_mut()
            .ok_or("Document is not an object")?;

        let array = target
            .entry(field)
            .or_insert_with(|| Value::Array(Vec::new()));
        let items = array
            .as_array_mut()
            .ok_or_else(|| format!("Field '{}' is not an array", field))?;

        match op {
            ArrayOp::Union(value) => {
                if !items.contains(&value) {
                    items.push(value);
                }
            }
            ArrayOp::Remove(value) => {
                items.retain(|item| item != &value);
            }
        }
        Ok(())
    }
}
