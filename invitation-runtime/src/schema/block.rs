//! Block：语义化的容器节点

use serde::{Deserialize, Serialize};

use super::{BlockAnimationConfig, BlockLayout, BlockThemeConfig, ColorValue, Element, SizeMode};

/// Block 语义类型
///
/// 未知的类型名以 [`BlockType::Other`] 原样保留，不会导致反序列化失败。
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum BlockType {
    Hero,
    GreetingParents,
    Profile,
    Calendar,
    Gallery,
    Rsvp,
    Location,
    Notice,
    Account,
    Message,
    Ending,
    Contact,
    Music,
    Loading,
    Interview,
    #[default]
    Custom,
    Other(String),
}

impl BlockType {
    pub fn as_str(&self) -> &str {
        match self {
            BlockType::Hero => "hero",
            BlockType::GreetingParents => "greeting-parents",
            BlockType::Profile => "profile",
            BlockType::Calendar => "calendar",
            BlockType::Gallery => "gallery",
            BlockType::Rsvp => "rsvp",
            BlockType::Location => "location",
            BlockType::Notice => "notice",
            BlockType::Account => "account",
            BlockType::Message => "message",
            BlockType::Ending => "ending",
            BlockType::Contact => "contact",
            BlockType::Music => "music",
            BlockType::Loading => "loading",
            BlockType::Interview => "interview",
            BlockType::Custom => "custom",
            BlockType::Other(name) => name,
        }
    }
}

impl From<String> for BlockType {
    fn from(value: String) -> Self {
        match value.as_str() {
            "hero" => BlockType::Hero,
            // 旧文档中的 greeting 合并进了 greeting-parents
            "greeting-parents" | "greeting" => BlockType::GreetingParents,
            "profile" => BlockType::Profile,
            "calendar" => BlockType::Calendar,
            "gallery" => BlockType::Gallery,
            "rsvp" => BlockType::Rsvp,
            "location" => BlockType::Location,
            "notice" => BlockType::Notice,
            "account" => BlockType::Account,
            "message" => BlockType::Message,
            "ending" => BlockType::Ending,
            "contact" => BlockType::Contact,
            "music" => BlockType::Music,
            "loading" => BlockType::Loading,
            "interview" => BlockType::Interview,
            "custom" => BlockType::Custom,
            _ => BlockType::Other(value),
        }
    }
}

impl From<BlockType> for String {
    fn from(value: BlockType) -> Self {
        match value {
            BlockType::Other(name) => name,
            other => other.as_str().to_string(),
        }
    }
}

impl std::fmt::Display for BlockType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Block 高度：数字表示 vh，也可以是尺寸模式
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum BlockHeight {
    Vh(f64),
    Mode(SizeMode),
}

impl Default for BlockHeight {
    fn default() -> Self {
        BlockHeight::Vh(100.0)
    }
}

/// 内边距：统一数值或分别指定
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PaddingValue {
    Uniform(f64),
    Sides(super::Padding),
}

impl PaddingValue {
    pub fn to_padding(self) -> super::Padding {
        match self {
            PaddingValue::Uniform(v) => super::Padding::uniform(v),
            PaddingValue::Sides(p) => p,
        }
    }
}

/// Block 级样式覆盖
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockStyleOverride {
    pub theme: Option<BlockThemeConfig>,
    pub background: Option<ColorValue>,
    pub padding: Option<PaddingValue>,
}

fn default_enabled() -> bool {
    true
}

/// Block
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Block {
    /// 渲染标识与动画作用域 key，文档内唯一
    pub id: String,
    #[serde(rename = "type", default)]
    pub block_type: BlockType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preset_id: Option<String>,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    #[serde(default)]
    pub layout: BlockLayout,
    #[serde(default)]
    pub height: BlockHeight,
    #[serde(default)]
    pub elements: Vec<Element>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style: Option<BlockStyleOverride>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub animation: Option<BlockAnimationConfig>,
}

impl Block {
    pub fn new(id: impl Into<String>, block_type: BlockType) -> Self {
        Self {
            id: id.into(),
            block_type,
            enabled: true,
            ..Default::default()
        }
    }

    pub fn with_elements(mut self, elements: Vec<Element>) -> Self {
        self.elements = elements;
        self
    }

    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    /// 深度优先遍历所有元素（含 group 子元素）
    pub fn walk_elements(&self) -> Vec<&Element> {
        let mut out = Vec::new();
        for element in &self.elements {
            element.collect_into(&mut out);
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::LayoutMode;

    #[test]
    fn test_block_type_round_trip() {
        let ty: BlockType = serde_json::from_str(r#""greeting-parents""#).unwrap();
        assert_eq!(ty, BlockType::GreetingParents);

        let unknown: BlockType = serde_json::from_str(r#""video-wall""#).unwrap();
        assert_eq!(unknown, BlockType::Other("video-wall".to_string()));
        assert_eq!(serde_json::to_string(&unknown).unwrap(), r#""video-wall""#);
    }

    #[test]
    fn test_block_height_forms() {
        let vh: BlockHeight = serde_json::from_str("80").unwrap();
        assert_eq!(vh, BlockHeight::Vh(80.0));

        let hug: BlockHeight = serde_json::from_str(r#"{"type":"hug"}"#).unwrap();
        assert_eq!(hug, BlockHeight::Mode(SizeMode::Hug));
    }

    #[test]
    fn test_block_defaults() {
        let block: Block = serde_json::from_str(r#"{"id":"b1","type":"notice"}"#).unwrap();
        assert!(block.enabled);
        assert_eq!(block.layout.mode, LayoutMode::Absolute);
        assert_eq!(block.height, BlockHeight::Vh(100.0));
        assert!(block.elements.is_empty());
    }

    #[test]
    fn test_padding_value() {
        let p: PaddingValue = serde_json::from_str("16").unwrap();
        assert_eq!(p.to_padding().left, 16.0);
        let p: PaddingValue = serde_json::from_str(r#"{"top":4}"#).unwrap();
        assert_eq!(p.to_padding().top, 4.0);
        assert_eq!(p.to_padding().bottom, 0.0);
    }
}
