//! 庫存快照

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::normalize::normalize_code;

/// 庫存快照（一次展開期間不可變）
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StockSnapshot {
    /// 正規化代碼 → 現有庫存（可為負值）
    on_hand: HashMap<String, Decimal>,
}

impl StockSnapshot {
    /// 創建空的庫存快照
    pub fn new() -> Self {
        Self::default()
    }

    /// 建構器模式：添加庫存
    pub fn with_on_hand(mut self, code: &str, quantity: Decimal) -> Self {
        self.add(code, quantity);
        self
    }

    /// 累加庫存（重複代碼加總，而非覆蓋）
    ///
    /// 空代碼會被忽略，回傳是否已記錄。
    pub fn add(&mut self, code: &str, quantity: Decimal) -> bool {
        let code = normalize_code(code);
        if code.is_empty() {
            return false;
        }
        let total = self.on_hand.entry(code).or_insert(Decimal::ZERO);
        *total = total.saturating_add(quantity);
        true
    }

    /// 現有庫存（原始值，可為負）；未知代碼回傳 0
    pub fn on_hand(&self, code: &str) -> Decimal {
        self.lookup(&normalize_code(code))
    }

    /// 可用庫存（負值視為 0）
    pub fn available(&self, code: &str) -> Decimal {
        self.on_hand(code).max(Decimal::ZERO)
    }

    /// 以已正規化的代碼查詢
    pub(crate) fn lookup(&self, normalized: &str) -> Decimal {
        self.on_hand
            .get(normalized)
            .copied()
            .unwrap_or(Decimal::ZERO)
    }

    /// 記錄的代碼數量
    pub fn len(&self) -> usize {
        self.on_hand.len()
    }

    /// 是否沒有任何庫存記錄
    pub fn is_empty(&self) -> bool {
        self.on_hand.is_empty()
    }
}
