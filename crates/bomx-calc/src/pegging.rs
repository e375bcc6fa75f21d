//! 需求追溯（展開路徑與循環防護）

/// 從頂層需求到目前節點的展開路徑
///
/// 路徑上的代碼即「正在處理中」的節點；再次進入同一代碼代表結構有循環。
#[derive(Debug, Clone)]
pub struct TraversalPath {
    /// 頂層需求代碼
    root: String,

    /// 目前路徑（不含正在評估的子節點）
    stack: Vec<String>,
}

impl TraversalPath {
    /// 以頂層代碼建立路徑
    pub fn new(root: &str) -> Self {
        Self {
            root: root.to_string(),
            stack: Vec::new(),
        }
    }

    /// 頂層需求代碼（即需求來源）
    pub fn root(&self) -> &str {
        &self.root
    }

    /// 代碼是否已在路徑上
    pub fn contains(&self, code: &str) -> bool {
        self.stack.iter().any(|c| c == code)
    }

    /// 進入節點
    pub fn enter(&mut self, code: &str) {
        self.stack.push(code.to_string());
    }

    /// 離開節點
    pub fn leave(&mut self) {
        self.stack.pop();
    }

    /// 目前深度
    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    /// 路徑文字（`A > B > C`），附加指定的子節點
    pub fn describe(&self, next: &str) -> String {
        let mut parts: Vec<&str> = self.stack.iter().map(String::as_str).collect();
        parts.push(next);
        parts.join(" > ")
    }
}
