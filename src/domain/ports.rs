use crate::domain::model::TransformResult;
use crate::utils::error::Result;
use async_trait::async_trait;
use std::time::Duration;

/// Where rendered reports are persisted. Reports are only ever written.
pub trait Storage: Send + Sync {
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
    fn append_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

pub trait ConfigProvider: Send + Sync {
    fn base_url(&self) -> &str;
    fn api_key(&self) -> &str;
    fn output_path(&self) -> &str;
    fn request_timeout(&self) -> Option<Duration>;
}

/// A report run: fetch from the API, reshape, persist.
#[async_trait]
pub trait Pipeline: Send + Sync {
    type Extracted: Send;

    async fn extract(&self) -> Result<Self::Extracted>;
    async fn transform(&self, data: Self::Extracted) -> Result<TransformResult>;
    async fn load(&self, result: TransformResult) -> Result<Vec<String>>;
}
