//! 展開結果模型（成品缺口、insumo 需求、行動清單）

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::structure::Category;

/// 成品缺口狀態
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ShortfallStatus {
    /// 有缺口（排序時在前）
    Faltante,
    /// 庫存足夠
    Ok,
}

/// 頂層成品缺口記錄
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShortfallRecord {
    /// 成品代碼
    #[serde(rename = "codigo_final")]
    pub code: String,

    /// 需求數量
    #[serde(rename = "demanda")]
    pub demand: Decimal,

    /// 現有庫存（原始值）
    #[serde(rename = "estoque_atual")]
    pub on_hand: Decimal,

    /// 缺口 = max(0, 需求 - 可用庫存)
    #[serde(rename = "faltante")]
    pub shortfall: Decimal,

    /// 狀態
    pub status: ShortfallStatus,
}

impl ShortfallRecord {
    /// 創建缺口記錄
    pub fn new(code: String, demand: Decimal, on_hand: Decimal, shortfall: Decimal) -> Self {
        Self {
            code,
            demand,
            on_hand,
            shortfall,
            status: Self::status_of(shortfall),
        }
    }

    /// 合併同一代碼的另一次頂層展開（需求與缺口累加，超出範圍時停在上限）
    pub fn merge(&mut self, demand: Decimal, shortfall: Decimal) {
        self.demand = self.demand.saturating_add(demand);
        self.shortfall = self.shortfall.saturating_add(shortfall);
        self.status = Self::status_of(self.shortfall);
    }

    fn status_of(shortfall: Decimal) -> ShortfallStatus {
        if shortfall > Decimal::ZERO {
            ShortfallStatus::Faltante
        } else {
            ShortfallStatus::Ok
        }
    }
}

/// Insumo 狀態
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum InsumoStatus {
    /// 完全沒有可用庫存
    Faltando,
    /// 部分由庫存覆蓋
    Parcial,
    /// 庫存足夠
    Ok,
}

impl InsumoStatus {
    /// 由需求量與缺口推導狀態
    pub fn from_amounts(required: Decimal, shortfall: Decimal) -> Self {
        if shortfall <= Decimal::ZERO {
            InsumoStatus::Ok
        } else if shortfall < required {
            InsumoStatus::Parcial
        } else {
            InsumoStatus::Faltando
        }
    }

    /// 是否需要行動
    pub fn needs_action(&self) -> bool {
        !matches!(self, InsumoStatus::Ok)
    }
}

/// Insumo 需求（所有展開路徑加總後的結果）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InsumoRequirement {
    /// 類別
    #[serde(rename = "tipo")]
    pub category: Category,

    /// Insumo 代碼
    #[serde(rename = "insumo_codigo")]
    pub code: String,

    /// 需求量
    #[serde(rename = "requerido")]
    pub required: Decimal,

    /// 現有庫存（原始值）
    #[serde(rename = "estoque_atual")]
    pub on_hand: Decimal,

    /// 缺口 = max(0, 需求量 - 可用庫存)
    #[serde(rename = "faltante")]
    pub shortfall: Decimal,

    /// 狀態
    pub status: InsumoStatus,

    /// 需求來源（頂層成品代碼）
    #[serde(rename = "origem")]
    pub origins: Vec<String>,
}

impl InsumoRequirement {
    /// 以累計需求量與現有庫存完成計算
    pub fn finalize(
        category: Category,
        code: String,
        required: Decimal,
        on_hand: Decimal,
        origins: Vec<String>,
    ) -> Self {
        let available = on_hand.max(Decimal::ZERO);
        let shortfall = (required - available).max(Decimal::ZERO);
        Self {
            category,
            code,
            required,
            on_hand,
            shortfall,
            status: InsumoStatus::from_amounts(required, shortfall),
            origins,
        }
    }
}

/// 行動類型
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ActionKind {
    /// 生產 / 採購
    Fabricar,
    /// 登錄缺少的 BOM
    CadastrarBom,
}

impl ActionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActionKind::Fabricar => "FABRICAR",
            ActionKind::CadastrarBom => "CADASTRAR_BOM",
        }
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 行動項目
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionItem {
    /// 行動類型
    #[serde(rename = "acao")]
    pub action: ActionKind,

    /// 類別
    #[serde(rename = "tipo")]
    pub category: Category,

    /// 物料代碼
    #[serde(rename = "item")]
    pub code: String,

    /// 數量
    #[serde(rename = "qtd")]
    pub quantity: Decimal,

    /// 備註
    #[serde(rename = "observacao")]
    pub note: String,

    /// 需求來源（頂層成品代碼）
    #[serde(rename = "origem")]
    pub origins: Vec<String>,
}

impl ActionItem {
    /// 由 insumo 缺口建立 FABRICAR 行動
    pub fn fabricar(requirement: &InsumoRequirement, note: &str) -> Self {
        Self {
            action: ActionKind::Fabricar,
            category: requirement.category,
            code: requirement.code.clone(),
            quantity: requirement.shortfall,
            note: note.to_string(),
            origins: requirement.origins.clone(),
        }
    }

    /// 建立 CADASTRAR_BOM 行動
    pub fn cadastrar_bom(
        category: Category,
        code: String,
        quantity: Decimal,
        note: String,
        origins: Vec<String>,
    ) -> Self {
        Self {
            action: ActionKind::CadastrarBom,
            category,
            code,
            quantity,
            note,
            origins,
        }
    }
}
