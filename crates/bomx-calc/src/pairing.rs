//! 平行清單配對（代碼清單 × 數量清單）
//!
//! 兩種規則分開實作：
//! - 套組：嚴格配對，長度不一致即為錯誤，不猜測對應關係
//! - 配方清單（領子 / 配件）：數量較少時補 1；數量多於代碼時為錯誤

use bomx_core::ComponentList;
use rust_decimal::Decimal;

/// 配對結果
#[derive(Debug, Clone, PartialEq)]
pub struct PairedList<'a> {
    /// (代碼, 每單位用量)
    pub lines: Vec<(&'a str, Decimal)>,

    /// 補上預設數量 1 的項目數
    pub padded: usize,
}

/// 清單長度衝突
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{label}: codigos ({codes}) != qtds ({quantities})")]
pub struct ListShapeError {
    /// 清單名稱（如 `componentes`、`gola`）
    pub label: &'static str,
    pub codes: usize,
    pub quantities: usize,
}

/// 嚴格配對（套組）
pub fn pair_strict<'a>(
    list: &'a ComponentList,
    label: &'static str,
) -> Result<PairedList<'a>, ListShapeError> {
    if !list.is_aligned() {
        return Err(shape_error(list, label));
    }

    Ok(PairedList {
        lines: list
            .codes
            .iter()
            .map(String::as_str)
            .zip(list.quantities.iter().copied())
            .collect(),
        padded: 0,
    })
}

/// 容忍較短的數量清單（配方），缺少的數量補 1
pub fn pair_padded<'a>(
    list: &'a ComponentList,
    label: &'static str,
) -> Result<PairedList<'a>, ListShapeError> {
    if list.quantities.len() > list.codes.len() {
        return Err(shape_error(list, label));
    }

    let padded = list.codes.len() - list.quantities.len();
    let lines = list
        .codes
        .iter()
        .enumerate()
        .map(|(idx, code)| {
            let qty = list.quantities.get(idx).copied().unwrap_or(Decimal::ONE);
            (code.as_str(), qty)
        })
        .collect();

    Ok(PairedList { lines, padded })
}

fn shape_error(list: &ComponentList, label: &'static str) -> ListShapeError {
    ListShapeError {
        label,
        codes: list.codes.len(),
        quantities: list.quantities.len(),
    }
}
