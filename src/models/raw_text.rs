//! 输入文本

use std::fmt;

/// 已截断的原始文本
///
/// 长度按字符（Unicode 标量）计算，截断不会切开多字节字符。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawText {
    text: String,
    truncated: bool,
}

impl RawText {
    pub fn new(text: impl Into<String>, max_chars: usize) -> Self {
        let text = text.into();
        match text.char_indices().nth(max_chars) {
            Some((cut, _)) => Self {
                text: text[..cut].to_string(),
                truncated: true,
            },
            None => Self {
                text,
                truncated: false,
            },
        }
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn char_count(&self) -> usize {
        self.text.chars().count()
    }

    /// 构造时是否发生了截断
    pub fn was_truncated(&self) -> bool {
        self.truncated
    }

    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }
}

impl fmt::Display for RawText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}
