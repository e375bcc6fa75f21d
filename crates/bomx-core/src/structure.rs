//! 產品結構模型（簡單產品配方 / 套組組成）

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::normalize::{decimal_or, normalize_code, parse_code_list, parse_quantity_list};

/// 物料類別
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Category {
    /// 半成品
    Semi,
    /// 領子
    Gola,
    /// 刺繡
    Bordado,
    /// 其他配件
    Extra,
    /// 套組節點（清單格式錯誤）
    Kit,
    /// 簡單產品節點（清單格式錯誤）
    Simples,
    /// 未登錄的頂層產品
    Produto,
    /// 套組下未登錄的組件
    Componente,
}

impl Category {
    /// 類別名稱（報表用）
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Semi => "SEMI",
            Category::Gola => "GOLA",
            Category::Bordado => "BORDADO",
            Category::Extra => "EXTRA",
            Category::Kit => "KIT",
            Category::Simples => "SIMPLES",
            Category::Produto => "PRODUTO",
            Category::Componente => "COMPONENTE",
        }
    }

    /// 是否為配方葉節點（insumo）類別
    pub fn is_insumo(&self) -> bool {
        matches!(
            self,
            Category::Semi | Category::Gola | Category::Bordado | Category::Extra
        )
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 單一組件行（代碼 + 每單位用量）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComponentLine {
    /// 組件代碼（已正規化）
    pub code: String,

    /// 每單位用量
    pub qty_per_unit: Decimal,
}

impl ComponentLine {
    /// 創建組件行；代碼為空時回傳 `None`
    pub fn new(code: &str, qty_per_unit: Decimal) -> Option<Self> {
        let code = normalize_code(code);
        if code.is_empty() {
            return None;
        }
        Some(Self { code, qty_per_unit })
    }

    /// 由表格文字創建
    ///
    /// 數量空白時視為 1（漏填）；無法解析時視為 0（不產生需求）。
    pub fn from_text(code: &str, qty: &str) -> Option<Self> {
        let qty_per_unit = if qty.trim().is_empty() {
            Decimal::ONE
        } else {
            decimal_or(qty, Decimal::ZERO)
        };
        Self::new(code, qty_per_unit)
    }
}

/// 平行清單（代碼清單 + 數量清單），保留原始長度以便檢查格式
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ComponentList {
    /// 組件代碼（已正規化）
    pub codes: Vec<String>,

    /// 對應數量
    pub quantities: Vec<Decimal>,
}

impl ComponentList {
    /// 創建平行清單
    pub fn new<S: AsRef<str>>(codes: &[S], quantities: Vec<Decimal>) -> Self {
        Self {
            codes: codes
                .iter()
                .map(|c| normalize_code(c.as_ref()))
                .filter(|c| !c.is_empty())
                .collect(),
            quantities,
        }
    }

    /// 由逗號分隔文字創建（`"G1,G2"`, `"1,2"`）
    pub fn from_text(codes: &str, quantities: &str) -> Self {
        Self {
            codes: parse_code_list(codes),
            quantities: parse_quantity_list(quantities),
        }
    }

    /// 兩個清單皆為空
    pub fn is_empty(&self) -> bool {
        self.codes.is_empty() && self.quantities.is_empty()
    }

    /// 兩個清單長度一致
    pub fn is_aligned(&self) -> bool {
        self.codes.len() == self.quantities.len()
    }
}

/// 簡單產品配方
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimpleRecipe {
    /// 成品代碼
    pub code: String,

    /// 半成品
    pub semi: Option<ComponentLine>,

    /// 領子清單
    pub golas: ComponentList,

    /// 刺繡
    pub bordado: Option<ComponentLine>,

    /// 其他配件清單
    pub extras: ComponentList,
}

impl SimpleRecipe {
    /// 創建空配方
    pub fn new(code: &str) -> Self {
        Self {
            code: normalize_code(code),
            semi: None,
            golas: ComponentList::default(),
            bordado: None,
            extras: ComponentList::default(),
        }
    }

    /// 建構器模式：設置半成品
    pub fn with_semi(mut self, code: &str, qty_per_unit: Decimal) -> Self {
        self.semi = ComponentLine::new(code, qty_per_unit);
        self
    }

    /// 建構器模式：設置領子清單
    pub fn with_golas(mut self, golas: ComponentList) -> Self {
        self.golas = golas;
        self
    }

    /// 建構器模式：設置刺繡
    pub fn with_bordado(mut self, code: &str, qty_per_unit: Decimal) -> Self {
        self.bordado = ComponentLine::new(code, qty_per_unit);
        self
    }

    /// 建構器模式：設置其他配件清單
    pub fn with_extras(mut self, extras: ComponentList) -> Self {
        self.extras = extras;
        self
    }
}

/// 套組組成
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KitComposition {
    /// 套組代碼
    pub code: String,

    /// 組件與倍數
    pub components: ComponentList,
}

impl KitComposition {
    /// 創建套組
    pub fn new(code: &str, components: ComponentList) -> Self {
        Self {
            code: normalize_code(code),
            components,
        }
    }
}

/// 結構記錄
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum StructureRecord {
    Simple(SimpleRecipe),
    Kit(KitComposition),
}

impl StructureRecord {
    /// 成品代碼
    pub fn code(&self) -> &str {
        match self {
            StructureRecord::Simple(recipe) => &recipe.code,
            StructureRecord::Kit(kit) => &kit.code,
        }
    }
}

/// 結構查詢結果
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Structure<'a> {
    /// 簡單產品
    Simple(&'a SimpleRecipe),
    /// 套組
    Kit(&'a KitComposition),
    /// 未登錄（既不是套組也不是簡單產品）
    Unregistered,
}
