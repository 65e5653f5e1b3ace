use crate::core::columns::HeaderRule;
use crate::core::coordinates::CoordinatePolicy;
use crate::domain::model::{KmlDocument, OutputFormat, RowErrorPolicy, TargetTable, TransformResult};
use crate::utils::error::Result;
use async_trait::async_trait;
use std::path::{Path, PathBuf};

pub trait Storage: Send + Sync {
    fn read_file(&self, path: &Path) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;
    fn write_file(
        &self,
        path: &Path,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

pub trait ConfigProvider: Send + Sync {
    fn input_path(&self) -> &Path;
    fn output_path(&self) -> PathBuf;
    fn output_format(&self) -> OutputFormat;
    fn coordinate_policy(&self) -> CoordinatePolicy;
    fn header_rules(&self) -> Vec<HeaderRule>;
    fn row_error_policy(&self) -> RowErrorPolicy;
}

#[async_trait]
pub trait Pipeline: Send + Sync {
    async fn extract(&self) -> Result<TargetTable>;
    async fn transform(&self, table: TargetTable) -> Result<TransformResult>;
    async fn load(&self, document: KmlDocument) -> Result<String>;
}
