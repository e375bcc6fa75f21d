//! # BOMX Core
//!
//! 核心資料模型與類型定義

pub mod catalog;
pub mod config;
pub mod demand;
pub mod normalize;
pub mod plan;
pub mod stock;
pub mod structure;
pub mod table;

// Re-export 主要類型
pub use catalog::{Catalog, CatalogBuilder};
pub use config::{ExplosionConfig, SemiPolicy};
pub use demand::DemandRequest;
pub use normalize::{normalize_code, parse_decimal};
pub use plan::{ActionItem, ActionKind, InsumoRequirement, InsumoStatus, ShortfallRecord, ShortfallStatus};
pub use stock::StockSnapshot;
pub use structure::{Category, ComponentLine, ComponentList, KitComposition, SimpleRecipe, Structure, StructureRecord};
pub use table::RawTable;

/// BOM 錯誤類型
///
/// 只用於展開開始前的致命錯誤；展開過程中的資料問題以警告回報。
#[derive(Debug, thiserror::Error)]
pub enum BomError {
    #[error("表格 {table} 缺少必要欄位 {column}（現有欄位: {found:?}）")]
    MissingColumn {
        table: String,
        column: String,
        found: Vec<String>,
    },

    #[error("無效的配置: {0}")]
    InvalidConfig(String),

    #[error("JSON 錯誤: {0}")]
    Json(#[from] serde_json::Error),

    #[error("讀取檔案失敗: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, BomError>;
