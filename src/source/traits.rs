use crate::model::SourceError;

#[async_trait::async_trait]
pub trait Source: Send + Sync {
    /// Returns the raw table text.
    async fn fetch(&self) -> Result<String, SourceError>;
}
