use async_trait::async_trait;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("store backend error: {0}")]
    Backend(String),
    #[error("value for '{key}' is not a boolean: {value}")]
    NotABool { key: String, value: String },
}

/// Persisted key-value storage shared by the publisher, the widget renderer
/// and the command channel
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    async fn get_string(&self, key: &str) -> Result<Option<String>, StoreError>;

    async fn set_string(&self, key: &str, value: &str) -> Result<(), StoreError>;

    async fn remove(&self, key: &str) -> Result<(), StoreError>;

    /// Booleans are stored as "true" / "false"
    async fn get_bool(&self, key: &str) -> Result<Option<bool>, StoreError> {
        match self.get_string(key).await? {
            Some(value) => match value.trim() {
                "true" => Ok(Some(true)),
                "false" => Ok(Some(false)),
                _ => Err(StoreError::NotABool {
                    key: key.to_string(),
                    value,
                }),
            },
            None => Ok(None),
        }
    }

    async fn set_bool(&self, key: &str, value: bool) -> Result<(), StoreError> {
        self.set_string(key, if value { "true" } else { "false" }).await
    }
}
