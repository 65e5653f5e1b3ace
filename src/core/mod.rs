pub mod builder;
pub mod columns;
pub mod coordinates;
pub mod engine;
pub mod kml;
pub mod naming;
pub mod pipeline;

pub use crate::domain::model::{KmlDocument, Placemark, TargetTable, TransformResult};
pub use crate::domain::ports::{ConfigProvider, Pipeline, Storage};
pub use crate::utils::error::Result;
