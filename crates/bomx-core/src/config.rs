//! 展開配置

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::{BomError, Result};

/// `Decimal` 支援的最大小數位數
const MAX_REPORT_DECIMALS: u32 = 28;

/// 半成品處理策略
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SemiPolicy {
    /// 半成品視為葉節點（insumo），不再往下展開
    #[default]
    Terminal,

    /// 半成品本身有結構時，繼續展開（先扣除半成品庫存）
    Explode,
}

/// 展開配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExplosionConfig {
    /// 半成品處理策略
    pub semi_policy: SemiPolicy,

    /// 報表數值保留的小數位數（四捨五入，僅在報表階段套用）
    pub report_decimals: u32,

    /// 是否收集逐步追蹤記錄
    pub collect_trace: bool,

    /// FABRICAR 行動的備註
    pub fabricar_note: String,

    /// 是否並行展開頂層需求
    pub parallel: bool,
}

impl Default for ExplosionConfig {
    fn default() -> Self {
        Self {
            semi_policy: SemiPolicy::Terminal,
            report_decimals: 2,
            collect_trace: true,
            fabricar_note: "PRODUZIR PARA ESTOQUE".to_string(),
            parallel: false,
        }
    }
}

impl ExplosionConfig {
    /// 創建預設配置
    pub fn new() -> Self {
        Self::default()
    }

    /// 建構器模式：設置半成品策略
    pub fn with_semi_policy(mut self, policy: SemiPolicy) -> Self {
        self.semi_policy = policy;
        self
    }

    /// 建構器模式：設置報表小數位數
    pub fn with_report_decimals(mut self, decimals: u32) -> Self {
        self.report_decimals = decimals;
        self
    }

    /// 建構器模式：設置是否收集追蹤記錄
    pub fn with_trace(mut self, collect: bool) -> Self {
        self.collect_trace = collect;
        self
    }

    /// 建構器模式：設置 FABRICAR 備註
    pub fn with_fabricar_note(mut self, note: impl Into<String>) -> Self {
        self.fabricar_note = note.into();
        self
    }

    /// 建構器模式：設置是否並行展開
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// 檢查配置是否有效
    pub fn validate(&self) -> Result<()> {
        if self.report_decimals > MAX_REPORT_DECIMALS {
            return Err(BomError::InvalidConfig(format!(
                "report_decimals 不可超過 {}，目前為 {}",
                MAX_REPORT_DECIMALS, self.report_decimals
            )));
        }
        Ok(())
    }

    /// 由 JSON 文字載入（缺少的欄位使用預設值）
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// 由 JSON 檔案載入
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json_str(&content)
    }
}
