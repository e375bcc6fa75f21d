//! 逐步追蹤記錄（每個展開決策一行，供稽核與測試）

/// 追蹤記錄
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TraceLog {
    enabled: bool,
    lines: Vec<String>,
}

impl TraceLog {
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled,
            lines: Vec::new(),
        }
    }

    /// 記錄一行；停用時不會格式化訊息
    pub fn record(&mut self, line: impl FnOnce() -> String) {
        if self.enabled {
            let line = line();
            tracing::trace!("{}", line);
            self.lines.push(line);
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// 接上另一份記錄
    pub fn append(&mut self, other: TraceLog) {
        self.lines.extend(other.lines);
    }

    pub fn into_lines(self) -> Vec<String> {
        self.lines
    }
}
