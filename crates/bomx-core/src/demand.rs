//! 需求模型

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::normalize::normalize_code;

/// 銷售需求（每個成品代碼一筆）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DemandRequest {
    /// 產品代碼（已正規化）
    #[serde(rename = "codigo")]
    pub code: String,

    /// 需求數量
    #[serde(rename = "quantidade")]
    pub quantity: Decimal,
}

impl DemandRequest {
    /// 創建新的需求
    pub fn new(code: &str, quantity: Decimal) -> Self {
        Self {
            code: normalize_code(code),
            quantity,
        }
    }

    /// 是否需要展開（代碼非空且數量為正）
    pub fn is_explodable(&self) -> bool {
        !self.code.is_empty() && self.quantity > Decimal::ZERO
    }

    /// 依正規化代碼彙總需求（同代碼加總，保留首次出現順序）
    ///
    /// 代碼為空的需求會被捨棄。
    pub fn aggregate(requests: impl IntoIterator<Item = DemandRequest>) -> Vec<DemandRequest> {
        let mut aggregated: Vec<DemandRequest> = Vec::new();
        let mut positions: HashMap<String, usize> = HashMap::new();

        for request in requests {
            let code = normalize_code(&request.code);
            if code.is_empty() {
                continue;
            }

            match positions.get(&code) {
                Some(&idx) => {
                    let total = &mut aggregated[idx].quantity;
                    *total = total.saturating_add(request.quantity);
                }
                None => {
                    positions.insert(code.clone(), aggregated.len());
                    aggregated.push(DemandRequest {
                        code,
                        quantity: request.quantity,
                    });
                }
            }
        }

        aggregated
    }
}
