//! 敏感内容检测
//!
//! 标题或正文命中任一模式的需求被视为包含敏感数据，不能公开或共享

use once_cell::sync::Lazy;
use regex::RegexSet;

const SENSITIVE_PATTERNS: &[&str] = &[
    r"api[_-]key",
    r"password",
    r"secret",
    r"token",
    r"access[_-]key",
    r"private[_-]key",
    r"auth",
    r"credential",
];

static SENSITIVE_SET: Lazy<RegexSet> = Lazy::new(|| {
    let patterns = SENSITIVE_PATTERNS.iter().map(|p| format!("(?i){}", p));
    RegexSet::new(patterns).expect("valid sensitive content patterns")
});

/// 敏感内容检测器
pub struct SensitiveContentDetector;

impl SensitiveContentDetector {
    /// 文本是否包含敏感信息
    pub fn contains_sensitive(text: &str) -> bool {
        SENSITIVE_SET.is_match(text)
    }

    /// 任一字段命中即为敏感
    pub fn any_sensitive(texts: &[&str]) -> bool {
        texts.iter().any(|t| Self::contains_sensitive(t))
    }
}
