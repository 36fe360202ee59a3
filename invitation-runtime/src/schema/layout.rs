//! 布局相关类型：尺寸模式、block 布局、元素尺寸约束

use serde::{Deserialize, Serialize};

/// 尺寸单位
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SizeUnit {
    #[default]
    #[serde(rename = "px")]
    Px,
    #[serde(rename = "vh")]
    Vh,
    #[serde(rename = "vw")]
    Vw,
    #[serde(rename = "%")]
    Percent,
}

/// 尺寸模式
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum SizeMode {
    /// 固定尺寸
    Fixed {
        value: f64,
        #[serde(default)]
        unit: SizeUnit,
    },
    /// 包裹内容（fit-content）
    Hug,
    /// 填满剩余空间
    Fill,
    /// 按比例填充
    FillPortion { value: f64 },
}

/// 布局模式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LayoutMode {
    #[default]
    Absolute,
    Auto,
}

/// 自动布局方向
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LayoutDirection {
    #[default]
    Vertical,
    Horizontal,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Padding {
    #[serde(default)]
    pub top: f64,
    #[serde(default)]
    pub right: f64,
    #[serde(default)]
    pub bottom: f64,
    #[serde(default)]
    pub left: f64,
}

impl Padding {
    pub fn uniform(value: f64) -> Self {
        Self {
            top: value,
            right: value,
            bottom: value,
            left: value,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AlignItems {
    #[default]
    Start,
    Center,
    End,
    Stretch,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum JustifyContent {
    #[default]
    Start,
    Center,
    End,
    SpaceBetween,
    SpaceAround,
}

/// 元素在自动布局父容器中的自身对齐
pub type AlignSelf = AlignItems;

/// Block 布局设置
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockLayout {
    #[serde(default)]
    pub mode: LayoutMode,
    #[serde(default)]
    pub direction: LayoutDirection,
    /// 子元素间距（px）
    #[serde(default)]
    pub gap: f64,
    #[serde(default)]
    pub padding: Padding,
    #[serde(default)]
    pub align_items: AlignItems,
    #[serde(default)]
    pub justify_content: JustifyContent,
    #[serde(default)]
    pub wrap: bool,
}

/// 元素尺寸约束（px）
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ElementConstraints {
    pub min_width: Option<f64>,
    pub max_width: Option<f64>,
    pub min_height: Option<f64>,
    pub max_height: Option<f64>,
}

/// 元素尺寸设置，缺省时宽度为 fill、高度为 hug
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ElementSizing {
    pub width: Option<SizeMode>,
    pub height: Option<SizeMode>,
}

impl ElementSizing {
    pub fn width_or_default(&self) -> SizeMode {
        self.width.unwrap_or(SizeMode::Fill)
    }

    pub fn height_or_default(&self) -> SizeMode {
        self.height.unwrap_or(SizeMode::Hug)
    }
}
