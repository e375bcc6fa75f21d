//! 原始表格（由外部匯入層產生的字串表格）

use serde::{Deserialize, Serialize};

use crate::{BomError, Result};

/// 原始表格：表頭 + 字串儲存格
///
/// 匯入層（試算表、CSV、XLSX）負責產生此結構，核心只依欄位名稱讀取。
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawTable {
    /// 表格名稱（用於錯誤訊息）
    pub name: String,

    /// 表頭
    pub headers: Vec<String>,

    /// 資料列
    pub rows: Vec<Vec<String>>,
}

impl RawTable {
    /// 創建空表格
    pub fn new(name: impl Into<String>, headers: &[&str]) -> Self {
        Self {
            name: name.into(),
            headers: headers.iter().map(|h| h.to_string()).collect(),
            rows: Vec::new(),
        }
    }

    /// 建構器模式：添加資料列
    pub fn with_row(mut self, cells: &[&str]) -> Self {
        self.push_row(cells.iter().map(|c| c.to_string()).collect());
        self
    }

    /// 添加資料列
    pub fn push_row(&mut self, cells: Vec<String>) {
        self.rows.push(cells);
    }

    /// 依名稱查找欄位索引（忽略大小寫與首尾空白）
    pub fn column(&self, name: &str) -> Option<usize> {
        let wanted = name.trim().to_lowercase();
        self.headers
            .iter()
            .position(|h| h.trim().to_lowercase() == wanted)
    }

    /// 查找必要欄位，缺少時回傳錯誤
    pub fn require_column(&self, name: &str) -> Result<usize> {
        self.column(name).ok_or_else(|| BomError::MissingColumn {
            table: self.name.clone(),
            column: name.to_string(),
            found: self.headers.clone(),
        })
    }

    /// 讀取儲存格，超出範圍或欄位不存在時回傳空字串
    pub fn cell<'a>(&self, row: &'a [String], column: Option<usize>) -> &'a str {
        column
            .and_then(|idx| row.get(idx))
            .map(String::as_str)
            .unwrap_or("")
    }

    /// 資料列數
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// 是否沒有資料列
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}
