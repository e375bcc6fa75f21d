//! 淨需求計算（缺口 = 需求 - 可用庫存）

use bomx_core::Catalog;
use rust_decimal::Decimal;

/// 淨需求計算結果
#[derive(Debug, Clone, PartialEq)]
pub struct NetRequirement {
    /// 總需求
    pub gross_requirement: Decimal,
    /// 現有庫存（原始值）
    pub on_hand: Decimal,
    /// 可用庫存（負值視為 0）
    pub available: Decimal,
    /// 淨需求（缺口）
    pub net_requirement: Decimal,
}

impl NetRequirement {
    /// 是否有缺口需要往下展開
    pub fn has_shortfall(&self) -> bool {
        self.net_requirement > Decimal::ZERO
    }
}

/// 淨需求計算器
pub struct NettingCalculator;

impl NettingCalculator {
    /// 計算淨需求
    ///
    /// 庫存為負時可用量視為 0；缺口不小於 0。
    pub fn calculate(gross_requirement: Decimal, on_hand: Decimal) -> NetRequirement {
        let available = on_hand.max(Decimal::ZERO);
        let net_requirement = (gross_requirement - available).max(Decimal::ZERO);

        NetRequirement {
            gross_requirement,
            on_hand,
            available,
            net_requirement,
        }
    }

    /// 依目錄庫存計算指定代碼的淨需求
    pub fn for_code(catalog: &Catalog, code: &str, gross_requirement: Decimal) -> NetRequirement {
        Self::calculate(gross_requirement, catalog.stock(code))
    }
}
