//! 语义 token 表
//!
//! token 以 kebab-case 字符串为 key（`bg-page`、`accent-default` ...），
//! 三层覆盖按 key 整体替换，不做深合并。

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::color::is_light_color;

/// 必备的颜色 token
pub const TOKEN_KEYS: &[&str] = &[
    "bg-page",
    "bg-section",
    "bg-section-alt",
    "bg-card",
    "bg-overlay",
    "fg-default",
    "fg-muted",
    "fg-emphasis",
    "fg-inverse",
    "fg-on-accent",
    "accent-default",
    "accent-hover",
    "accent-active",
    "accent-secondary",
    "border-default",
    "border-emphasis",
    "border-muted",
];

/// 可选的渐变 token
pub const GRADIENT_KEYS: &[&str] = &["gradient-hero", "gradient-accent", "gradient-overlay"];

const DEFAULT_TOKENS: &[(&str, &str)] = &[
    ("bg-page", "#ffffff"),
    ("bg-section", "#ffffff"),
    ("bg-section-alt", "#f8f8f8"),
    ("bg-card", "#ffffff"),
    ("bg-overlay", "rgba(0, 0, 0, 0.5)"),
    ("fg-default", "#1a1a1a"),
    ("fg-muted", "#6b6b6b"),
    ("fg-emphasis", "#000000"),
    ("fg-inverse", "#ffffff"),
    ("fg-on-accent", "#ffffff"),
    ("accent-default", "#c9a86c"),
    ("accent-hover", "#b8975b"),
    ("accent-active", "#a7864a"),
    ("accent-secondary", "#e8d4b8"),
    ("border-default", "#e5e5e5"),
    ("border-emphasis", "#1a1a1a"),
    ("border-muted", "#f0f0f0"),
];

/// 语义别名 → token key
const ALIASES: &[(&str, &str)] = &[
    ("color.background", "bg-page"),
    ("color.surface", "bg-section"),
    ("color.surface.alt", "bg-section-alt"),
    ("color.card", "bg-card"),
    ("color.overlay", "bg-overlay"),
    ("color.text.default", "fg-default"),
    ("color.text.muted", "fg-muted"),
    ("color.text.primary", "fg-emphasis"),
    ("color.text.inverse", "fg-inverse"),
    ("color.accent", "accent-default"),
    ("color.accent.hover", "accent-hover"),
    ("color.accent.active", "accent-active"),
    ("color.accent.secondary", "accent-secondary"),
    ("color.border", "border-default"),
];

/// 规范化 token key：别名、camelCase（`bgPage`）和 `--` 前缀都转换为 kebab-case
pub fn canonical_key(key: &str) -> String {
    let key = key.trim().trim_start_matches("--");
    if let Some((_, target)) = ALIASES.iter().find(|(alias, _)| *alias == key) {
        return (*target).to_string();
    }

    let mut out = String::with_capacity(key.len() + 4);
    for ch in key.chars() {
        if ch.is_ascii_uppercase() {
            if !out.is_empty() {
                out.push('-');
            }
            out.push(ch.to_ascii_lowercase());
        } else {
            out.push(ch);
        }
    }
    out
}

/// 已解析的颜色 token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResolvedTokens(BTreeMap<String, String>);

impl Default for ResolvedTokens {
    fn default() -> Self {
        Self::from_pairs(DEFAULT_TOKENS)
    }
}

impl ResolvedTokens {
    /// 以默认值为底，叠加给定的 (key, value)
    pub fn from_pairs(pairs: &[(&str, &str)]) -> Self {
        let mut map: BTreeMap<String, String> = DEFAULT_TOKENS
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        for (key, value) in pairs {
            map.insert(canonical_key(key), value.to_string());
        }
        Self(map)
    }

    /// 按 key 或别名取值
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(&canonical_key(key)).map(String::as_str)
    }

    /// 取值，缺失时返回空字符串
    pub fn value(&self, key: &str) -> &str {
        self.get(key).unwrap_or_default()
    }

    pub fn set(&mut self, key: &str, value: impl Into<String>) {
        self.0.insert(canonical_key(key), value.into());
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// 背景是否为深色
    pub fn is_dark(&self) -> bool {
        !is_light_color(self.value("bg-section"))
    }

    /// 前景与背景互换
    pub fn inverted(&self) -> Self {
        let mut next = self.clone();
        next.swap_backgrounds(self);
        next.swap_foregrounds(self);
        next
    }

    /// 只反转背景
    pub fn inverted_background(&self) -> Self {
        let mut next = self.clone();
        next.swap_backgrounds(self);
        next
    }

    /// 只反转文字
    pub fn inverted_text(&self) -> Self {
        let mut next = self.clone();
        next.swap_foregrounds(self);
        next
    }

    fn swap_backgrounds(&mut self, source: &Self) {
        self.set("bg-page", source.value("fg-default"));
        self.set("bg-section", source.value("fg-default"));
        self.set("bg-section-alt", source.value("fg-muted"));
        self.set("bg-card", source.value("fg-muted"));
    }

    fn swap_foregrounds(&mut self, source: &Self) {
        self.set("fg-default", source.value("bg-page"));
        self.set("fg-muted", source.value("bg-section-alt"));
        self.set("fg-emphasis", source.value("bg-page"));
        self.set("fg-inverse", source.value("fg-default"));
    }

    /// 以 accent 为背景的配色
    pub fn accented(&self) -> Self {
        let mut next = self.clone();
        let on_accent = self.value("fg-on-accent").to_string();
        next.set("bg-section", self.value("accent-default"));
        next.set("bg-section-alt", self.value("accent-hover"));
        next.set("fg-default", on_accent.clone());
        next.set("fg-emphasis", on_accent.clone());
        next.set("fg-muted", on_accent);
        next
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_cover_all_keys() {
        let tokens = ResolvedTokens::default();
        for key in TOKEN_KEYS {
            assert!(tokens.get(key).is_some(), "缺少 token {key}");
        }
        assert_eq!(tokens.len(), TOKEN_KEYS.len());
        assert_eq!(tokens.value("accent-default"), "#c9a86c");
    }

    #[test]
    fn test_canonical_key() {
        assert_eq!(canonical_key("color.text.primary"), "fg-emphasis");
        assert_eq!(canonical_key("bgSectionAlt"), "bg-section-alt");
        assert_eq!(canonical_key("--accent-hover"), "accent-hover");
        assert_eq!(canonical_key("border-muted"), "border-muted");
    }

    #[test]
    fn test_alias_lookup() {
        let tokens = ResolvedTokens::from_pairs(&[("color.background", "#fafafa")]);
        assert_eq!(tokens.value("bg-page"), "#fafafa");
        assert_eq!(tokens.get("color.background"), Some("#fafafa"));
    }

    #[test]
    fn test_inversion() {
        let tokens = ResolvedTokens::default();
        let inverted = tokens.inverted();
        assert_eq!(inverted.value("bg-section"), "#1a1a1a");
        assert_eq!(inverted.value("fg-default"), "#ffffff");
        assert!(inverted.is_dark());
        assert!(!tokens.is_dark());

        let bg_only = tokens.inverted_background();
        assert_eq!(bg_only.value("bg-section"), "#1a1a1a");
        assert_eq!(bg_only.value("fg-default"), "#1a1a1a");
    }

    #[test]
    fn test_accented() {
        let tokens = ResolvedTokens::default().accented();
        assert_eq!(tokens.value("bg-section"), "#c9a86c");
        assert_eq!(tokens.value("fg-default"), "#ffffff");
    }
}
