use crate::model::SourceError;
use crate::source::traits::Source;

use reqwest::Client;
use std::time::Duration;
use tracing::info;

pub struct FileSource {
    path: String,
}

impl FileSource {
    pub fn new(path: &str) -> Self {
        Self {
            path: path.to_string(),
        }
    }
}

#[async_trait::async_trait]
impl Source for FileSource {
    async fn fetch(&self) -> Result<String, SourceError> {
        info!("Reading price table from {}", self.path);
        tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|source| SourceError::Io {
                path: self.path.clone(),
                source,
            })
    }
}

pub struct HttpSource {
    client: Client,
    url: String,
}

impl HttpSource {
    pub fn new(url: &str) -> Self {
        Self::with_client(Client::new(), url)
    }

    pub fn with_client(client: Client, url: &str) -> Self {
        Self {
            client,
            url: url.to_string(),
        }
    }
}

#[async_trait::async_trait]
impl Source for HttpSource {
    async fn fetch(&self) -> Result<String, SourceError> {
        info!("Downloading price table from {}", self.url);
        let response = self
            .client
            .get(&self.url)
            .timeout(Duration::from_secs(60))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(SourceError::InvalidResponse(response.status()));
        }

        Ok(response.text().await?)
    }
}
