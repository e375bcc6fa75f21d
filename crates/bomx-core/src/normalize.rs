//! 代碼與數值正規化
//!
//! 庫存表、結構表與銷售需求必須使用同一套正規化規則，否則查找會靜默失敗。

use rust_decimal::Decimal;
use std::str::FromStr;

/// 清單欄位分隔符（如 `A,B,C`、`1,2,1`）
pub const LIST_SEPARATOR: char = ',';

/// 正規化產品代碼
///
/// 去除首尾空白、合併連續空白、轉大寫並去除拉丁字母的變音符號。
/// 結果是冪等的：`normalize_code(&normalize_code(x)) == normalize_code(x)`。
pub fn normalize_code(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for (idx, word) in raw.split_whitespace().enumerate() {
        if idx > 0 {
            out.push(' ');
        }
        for c in word.chars().flat_map(char::to_uppercase) {
            out.push(fold_diacritic(c));
        }
    }
    out
}

fn fold_diacritic(c: char) -> char {
    match c {
        'À' | 'Á' | 'Â' | 'Ã' | 'Ä' | 'Å' => 'A',
        'Ç' => 'C',
        'È' | 'É' | 'Ê' | 'Ë' => 'E',
        'Ì' | 'Í' | 'Î' | 'Ï' => 'I',
        'Ñ' => 'N',
        'Ò' | 'Ó' | 'Ô' | 'Õ' | 'Ö' => 'O',
        'Ù' | 'Ú' | 'Û' | 'Ü' => 'U',
        'Ý' | 'Ÿ' => 'Y',
        _ => c,
    }
}

/// 解析數值文字（容忍 `1.234,5` 與 `1,234.5` 兩種地區格式）
///
/// 規則：
/// - 同時出現 `.` 與 `,` 時，最後出現者為小數點，另一個為千分位
/// - 只出現一種分隔符且僅一次時視為小數點；出現多次時視為千分位
/// - 其他格式交給 `Decimal` 解析（含科學記號），失敗回傳 `None`
pub fn parse_decimal(raw: &str) -> Option<Decimal> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }

    let (negative, body) = match s.strip_prefix('-') {
        Some(rest) => (true, rest.trim_start()),
        None => (false, s.strip_prefix('+').unwrap_or(s).trim_start()),
    };

    if !body.is_empty()
        && body
            .chars()
            .all(|c| c.is_ascii_digit() || c == '.' || c == ',')
    {
        let canonical = canonical_number(body)?;
        let value = Decimal::from_str(&canonical).ok()?;
        return Some(if negative { -value } else { value });
    }

    Decimal::from_str(s)
        .or_else(|_| Decimal::from_scientific(s))
        .ok()
}

/// 解析數值，失敗時回傳預設值
pub fn decimal_or(raw: &str, default: Decimal) -> Decimal {
    parse_decimal(raw).unwrap_or(default)
}

/// 將只含數字與分隔符的文字轉為 `Decimal` 可解析的格式
fn canonical_number(body: &str) -> Option<String> {
    if !body.chars().any(|c| c.is_ascii_digit()) {
        return None;
    }

    let dots = body.matches('.').count();
    let commas = body.matches(',').count();

    let decimal_sep = match (body.rfind('.'), body.rfind(',')) {
        (Some(dot), Some(comma)) => Some(if dot > comma { '.' } else { ',' }),
        (Some(_), None) => (dots == 1).then_some('.'),
        (None, Some(_)) => (commas == 1).then_some(','),
        (None, None) => None,
    };

    // 小數點只能出現一次
    match decimal_sep {
        Some('.') if dots > 1 => return None,
        Some(',') if commas > 1 => return None,
        _ => {}
    }

    let mut out = String::with_capacity(body.len() + 1);
    for c in body.chars() {
        if c.is_ascii_digit() {
            out.push(c);
        } else if Some(c) == decimal_sep {
            if out.is_empty() {
                out.push('0');
            }
            out.push('.');
        }
    }

    if out.ends_with('.') {
        out.pop();
    }
    Some(out)
}

/// 拆分清單欄位，去除空白項
pub fn split_list(raw: &str) -> impl Iterator<Item = &str> {
    raw.split(LIST_SEPARATOR)
        .map(str::trim)
        .filter(|part| !part.is_empty())
}

/// 解析代碼清單（`A, b ,C` → `["A", "B", "C"]`）
pub fn parse_code_list(raw: &str) -> Vec<String> {
    split_list(raw)
        .map(normalize_code)
        .filter(|code| !code.is_empty())
        .collect()
}

/// 解析數量清單（`1,2,1` → `[1, 2, 1]`）
///
/// 無法解析的項目記為 0，保持與代碼清單的位置對應。
pub fn parse_quantity_list(raw: &str) -> Vec<Decimal> {
    split_list(raw)
        .map(|part| decimal_or(part, Decimal::ZERO))
        .collect()
}
