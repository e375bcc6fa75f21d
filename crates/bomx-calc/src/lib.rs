//! # BOMX Calculation Engine
//!
//! 核心 BOM 需求展開引擎

pub mod accumulator;
pub mod explosion;
pub mod netting;
pub mod pairing;
pub mod pegging;
pub mod report;
pub mod trace;

// Re-export 主要類型
pub use accumulator::ExplosionAccumulator;
pub use explosion::ExplosionEngine;
pub use netting::NetRequirement;
pub use report::{ExplosionReport, ReportBuilder, ReportSummary};

use bomx_core::{ActionItem, DemandRequest, InsumoRequirement, ShortfallRecord};
use serde::Serialize;

/// 展開計算結果
#[derive(Debug, Clone)]
pub struct ExplosionResult {
    /// 執行ID
    pub run_id: uuid::Uuid,

    /// 彙總後的頂層需求
    pub demands: Vec<DemandRequest>,

    /// 頂層成品缺口
    pub shortfalls: Vec<ShortfallRecord>,

    /// Insumo 需求
    pub insumos: Vec<InsumoRequirement>,

    /// CADASTRAR_BOM 行動（未登錄或結構錯誤的代碼）
    pub registrations: Vec<ActionItem>,

    /// 警告信息
    pub warnings: Vec<ExplosionWarning>,

    /// 逐步追蹤記錄
    pub trace: Vec<String>,

    /// 計算耗時（毫秒）
    pub calculation_time_ms: Option<u128>,
}

impl ExplosionResult {
    /// 創建空的計算結果
    pub fn empty() -> Self {
        Self {
            run_id: uuid::Uuid::new_v4(),
            demands: Vec::new(),
            shortfalls: Vec::new(),
            insumos: Vec::new(),
            registrations: Vec::new(),
            warnings: Vec::new(),
            trace: Vec::new(),
            calculation_time_ms: None,
        }
    }

    /// 查詢頂層缺口
    pub fn shortfall(&self, code: &str) -> Option<&ShortfallRecord> {
        let code = bomx_core::normalize_code(code);
        self.shortfalls.iter().find(|r| r.code == code)
    }

    /// 查詢 insumo 需求
    pub fn insumo(&self, category: bomx_core::Category, code: &str) -> Option<&InsumoRequirement> {
        let code = bomx_core::normalize_code(code);
        self.insumos
            .iter()
            .find(|r| r.category == category && r.code == code)
    }

    /// 是否有錯誤等級的警告
    pub fn has_errors(&self) -> bool {
        self.warnings
            .iter()
            .any(|w| w.severity == WarningSeverity::Error)
    }
}

/// 展開警告
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExplosionWarning {
    pub code: String,
    pub message: String,
    pub severity: WarningSeverity,
    pub kind: WarningKind,
}

impl ExplosionWarning {
    pub fn new(code: String, message: String, severity: WarningSeverity, kind: WarningKind) -> Self {
        Self {
            code,
            message,
            severity,
            kind,
        }
    }

    pub fn info(code: String, message: String, kind: WarningKind) -> Self {
        Self::new(code, message, WarningSeverity::Info, kind)
    }

    pub fn warning(code: String, message: String, kind: WarningKind) -> Self {
        Self::new(code, message, WarningSeverity::Warning, kind)
    }

    pub fn error(code: String, message: String, kind: WarningKind) -> Self {
        Self::new(code, message, WarningSeverity::Error, kind)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum WarningSeverity {
    Info,
    Warning,
    Error,
}

/// 警告種類
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum WarningKind {
    /// 平行清單長度衝突，節點未展開
    ListMismatch,
    /// 數量清單較短，已補 1
    RaggedListPadded,
    /// 偵測到循環結構
    CycleDetected,
    /// 代碼未登錄結構
    Unregistered,
    /// 每單位用量為 0
    ZeroQuantity,
    /// 數量超出 Decimal 可表示範圍，節點未展開
    QuantityOverflow,
}
