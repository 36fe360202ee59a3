//! Element：叶子节点或 group 节点

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::{
    AlignSelf, ColorValue, ElementAnimationConfig, ElementConstraints, ElementSizing, LayoutMode,
};

/// 元素类型
///
/// 8 种叶子类型加 group。未知类型名保留为 [`ElementType::Other`]，
/// 渲染时降级为占位节点。
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ElementType {
    #[default]
    Text,
    Image,
    Shape,
    Button,
    Icon,
    Divider,
    Map,
    Calendar,
    Group,
    Other(String),
}

impl ElementType {
    /// 所有内置叶子类型（不含 group）
    pub const LEAF_TYPES: [ElementType; 8] = [
        ElementType::Text,
        ElementType::Image,
        ElementType::Shape,
        ElementType::Button,
        ElementType::Icon,
        ElementType::Divider,
        ElementType::Map,
        ElementType::Calendar,
    ];

    pub fn as_str(&self) -> &str {
        match self {
            ElementType::Text => "text",
            ElementType::Image => "image",
            ElementType::Shape => "shape",
            ElementType::Button => "button",
            ElementType::Icon => "icon",
            ElementType::Divider => "divider",
            ElementType::Map => "map",
            ElementType::Calendar => "calendar",
            ElementType::Group => "group",
            ElementType::Other(name) => name,
        }
    }

    pub fn is_known(&self) -> bool {
        !matches!(self, ElementType::Other(_))
    }
}

impl From<String> for ElementType {
    fn from(value: String) -> Self {
        match value.as_str() {
            "text" => ElementType::Text,
            "image" => ElementType::Image,
            "shape" => ElementType::Shape,
            "button" => ElementType::Button,
            "icon" => ElementType::Icon,
            "divider" => ElementType::Divider,
            "map" => ElementType::Map,
            "calendar" => ElementType::Calendar,
            "group" => ElementType::Group,
            _ => ElementType::Other(value),
        }
    }
}

impl From<ElementType> for String {
    fn from(value: ElementType) -> Self {
        match value {
            ElementType::Other(name) => name,
            other => other.as_str().to_string(),
        }
    }
}

impl std::fmt::Display for ElementType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextAlign {
    Left,
    #[default]
    Center,
    Right,
}

impl TextAlign {
    pub fn as_str(&self) -> &'static str {
        match self {
            TextAlign::Left => "left",
            TextAlign::Center => "center",
            TextAlign::Right => "right",
        }
    }
}

/// 文字样式
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextStyle {
    pub font_family: Option<String>,
    /// px
    pub font_size: Option<f64>,
    pub font_weight: Option<u16>,
    pub color: Option<String>,
    pub text_align: Option<TextAlign>,
    pub line_height: Option<f64>,
    /// em
    pub letter_spacing: Option<f64>,
}

fn default_border_style() -> String {
    "solid".to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BorderStyle {
    #[serde(default)]
    pub width: f64,
    #[serde(default)]
    pub color: String,
    #[serde(default = "default_border_style")]
    pub style: String,
    #[serde(default)]
    pub radius: f64,
}

/// 元素级样式
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ElementStyle {
    pub text: Option<TextStyle>,
    pub background: Option<ColorValue>,
    pub border: Option<BorderStyle>,
    pub shadow: Option<String>,
    pub opacity: Option<f64>,
}

/// 元素
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Element {
    pub id: String,
    #[serde(rename = "type", default)]
    pub element_type: ElementType,

    // 布局模式，缺省为 absolute
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub layout_mode: Option<LayoutMode>,

    // absolute 模式：x / width 单位 vw，y / height 为 block 内百分比
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub x: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub y: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rotation: Option<f64>,
    #[serde(default)]
    pub z_index: i32,

    // auto 模式
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sizing: Option<ElementSizing>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub constraints: Option<ElementConstraints>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub align_self: Option<AlignSelf>,

    /// 数据绑定路径
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub binding: Option<String>,
    /// binding 解析不到值时的后备路径
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub binding_fallback: Option<String>,
    /// 字面值，优先于 binding
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,

    /// 类型相关属性（按类型读取）
    #[serde(default)]
    pub props: Map<String, Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style: Option<ElementStyle>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub animation: Option<ElementAnimationConfig>,

    /// 仅 group 使用
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<Element>,
}

impl Element {
    pub fn new(id: impl Into<String>, element_type: ElementType) -> Self {
        Self {
            id: id.into(),
            element_type,
            ..Default::default()
        }
    }

    pub fn with_binding(mut self, path: impl Into<String>) -> Self {
        self.binding = Some(path.into());
        self
    }

    pub fn with_fallback(mut self, path: impl Into<String>) -> Self {
        self.binding_fallback = Some(path.into());
        self
    }

    pub fn with_value(mut self, value: impl Into<Value>) -> Self {
        self.value = Some(value.into());
        self
    }

    pub fn with_prop(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.props.insert(key.into(), value.into());
        self
    }

    pub fn with_children(mut self, children: Vec<Element>) -> Self {
        self.children = children;
        self
    }

    pub fn with_frame(mut self, x: f64, y: f64, width: f64, height: f64) -> Self {
        self.x = Some(x);
        self.y = Some(y);
        self.width = Some(width);
        self.height = Some(height);
        self
    }

    pub fn is_group(&self) -> bool {
        self.element_type == ElementType::Group
    }

    pub fn prop(&self, key: &str) -> Option<&Value> {
        self.props.get(key)
    }

    pub fn prop_str(&self, key: &str) -> Option<&str> {
        self.props.get(key).and_then(Value::as_str)
    }

    pub fn prop_f64(&self, key: &str) -> Option<f64> {
        self.props.get(key).and_then(Value::as_f64)
    }

    pub fn prop_bool(&self, key: &str) -> Option<bool> {
        self.props.get(key).and_then(Value::as_bool)
    }

    /// 文本格式串（`props.format`）
    pub fn text_format(&self) -> Option<&str> {
        if self.element_type == ElementType::Text {
            self.prop_str("format")
        } else {
            None
        }
    }

    pub(crate) fn collect_into<'a>(&'a self, out: &mut Vec<&'a Element>) {
        out.push(self);
        for child in &self.children {
            child.collect_into(out);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_element_type_parsing() {
        let ty: ElementType = serde_json::from_str(r#""calendar""#).unwrap();
        assert_eq!(ty, ElementType::Calendar);
        let other: ElementType = serde_json::from_str(r#""sparkle""#).unwrap();
        assert!(!other.is_known());
        assert_eq!(other.as_str(), "sparkle");
    }

    #[test]
    fn test_element_from_json() {
        let json = r#"{
            "id": "title",
            "type": "text",
            "x": 10, "y": 20, "width": 80, "height": 10,
            "zIndex": 2,
            "binding": "couple.groom.name",
            "bindingFallback": "groom.name",
            "props": { "type": "text", "format": "{couple.groom.name} ♥ {couple.bride.name}" },
            "style": { "text": { "fontSize": 24, "textAlign": "left" } }
        }"#;
        let el: Element = serde_json::from_str(json).unwrap();
        assert_eq!(el.element_type, ElementType::Text);
        assert_eq!(el.z_index, 2);
        assert_eq!(el.binding_fallback.as_deref(), Some("groom.name"));
        assert_eq!(
            el.text_format(),
            Some("{couple.groom.name} ♥ {couple.bride.name}")
        );
        let text = el.style.unwrap().text.unwrap();
        assert_eq!(text.font_size, Some(24.0));
        assert_eq!(text.text_align, Some(TextAlign::Left));
    }

    #[test]
    fn test_group_children_walk() {
        let group = Element::new("g", ElementType::Group).with_children(vec![
            Element::new("a", ElementType::Text),
            Element::new("inner", ElementType::Group)
                .with_children(vec![Element::new("b", ElementType::Image)]),
        ]);
        let mut out = Vec::new();
        group.collect_into(&mut out);
        let ids: Vec<_> = out.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["g", "a", "inner", "b"]);
    }

    #[test]
    fn test_format_only_for_text() {
        let el = Element::new("btn", ElementType::Button).with_prop("format", "{x}");
        assert_eq!(el.text_format(), None);
    }
}
