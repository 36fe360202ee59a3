//! 样式系统数据模型（preset / quick / advanced 三层）

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// 渐变类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GradientKind {
    Linear,
    Radial,
    Conic,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GradientStop {
    pub color: String,
    /// 0 - 100
    pub position: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub opacity: Option<f64>,
}

/// 渐变值
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GradientValue {
    #[serde(rename = "type")]
    pub kind: GradientKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub angle: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shape: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<String>,
    pub stops: Vec<GradientStop>,
}

/// 颜色值：纯色字符串、渐变，或 `{ "color": ... }` 包装
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ColorValue {
    Solid(String),
    Gradient(GradientValue),
    Wrapped { color: String },
}

impl From<&str> for ColorValue {
    fn from(value: &str) -> Self {
        ColorValue::Solid(value.to_string())
    }
}

/// block 的快速模式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BlockMode {
    Light,
    Dark,
    Accent,
}

/// Level 2：快速设置
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuickStyleConfig {
    /// 主色，展开到 accent-* 与 fg-emphasis
    #[serde(default, alias = "accentColor", skip_serializing_if = "Option::is_none")]
    pub primary_color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dominant_color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secondary_color: Option<String>,
    /// 排版预设 id
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub typography: Option<String>,
    /// 效果预设 id
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub effects: Option<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub block_modes: BTreeMap<String, BlockMode>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BlockThemeMode {
    #[default]
    Inherit,
    Invert,
    Custom,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum InversionKind {
    #[default]
    Full,
    BgOnly,
    TextOnly,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Inversion {
    #[serde(rename = "type", default)]
    pub kind: InversionKind,
}

/// block 级主题设置
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BlockThemeConfig {
    #[serde(default)]
    pub mode: BlockThemeMode,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inversion: Option<Inversion>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub tokens: BTreeMap<String, ColorValue>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FontStacks {
    pub display: Option<String>,
    pub heading: Option<String>,
    pub body: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct FontWeights {
    pub display: Option<u16>,
    pub heading: Option<u16>,
    pub body: Option<u16>,
}

/// 显式的排版覆盖
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TypographyCustom {
    #[serde(default)]
    pub font_stacks: FontStacks,
    #[serde(default)]
    pub weights: FontWeights,
    /// xs / sm / base / lg / xl / 2xl / 3xl / 4xl
    #[serde(default)]
    pub scale: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TypographyConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preset: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom: Option<TypographyCustom>,
}

/// 显式的效果覆盖
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EffectsCustom {
    #[serde(default)]
    pub radius: BTreeMap<String, f64>,
    #[serde(default)]
    pub shadows: BTreeMap<String, String>,
    #[serde(default)]
    pub blurs: BTreeMap<String, f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EffectsConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preset: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom: Option<EffectsCustom>,
}

/// Level 3：高级设置
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdvancedStyleConfig {
    /// 语义 token 覆盖，key 可以是 `fg-emphasis` 这类 token 名，
    /// 也可以是 `color.text.primary` 这类语义别名
    #[serde(default)]
    pub tokens: BTreeMap<String, ColorValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub typography: Option<TypographyCustom>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub effects: Option<EffectsCustom>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub block_overrides: BTreeMap<String, BlockThemeConfig>,
}

/// 文档样式系统
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StyleSystem {
    /// Level 1：主题预设 id
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preset: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quick: Option<QuickStyleConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub advanced: Option<AdvancedStyleConfig>,
    #[serde(default)]
    pub typography: TypographyConfig,
    #[serde(default)]
    pub effects: EffectsConfig,
}

impl StyleSystem {
    pub fn with_preset(preset: impl Into<String>) -> Self {
        Self {
            preset: Some(preset.into()),
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quick_accent_alias() {
        let quick: QuickStyleConfig =
            serde_json::from_str(r##"{"accentColor":"#112233"}"##).unwrap();
        assert_eq!(quick.primary_color.as_deref(), Some("#112233"));
    }

    #[test]
    fn test_color_value_forms() {
        let solid: ColorValue = serde_json::from_str(r##""#fff""##).unwrap();
        assert_eq!(solid, ColorValue::Solid("#fff".to_string()));

        let gradient: ColorValue = serde_json::from_str(
            r##"{"type":"linear","angle":90,"stops":[{"color":"#000","position":0},{"color":"#fff","position":100}]}"##,
        )
        .unwrap();
        assert!(matches!(gradient, ColorValue::Gradient(_)));

        let wrapped: ColorValue = serde_json::from_str(r##"{"color":"red"}"##).unwrap();
        assert_eq!(
            wrapped,
            ColorValue::Wrapped {
                color: "red".to_string()
            }
        );
    }

    #[test]
    fn test_style_system_layers_are_kept_apart() {
        let style: StyleSystem = serde_json::from_str(
            r##"{
                "preset": "classic-serif",
                "quick": { "primaryColor": "#000" },
                "advanced": { "tokens": { "bg-page": "#fafafa" } }
            }"##,
        )
        .unwrap();
        assert_eq!(style.preset.as_deref(), Some("classic-serif"));
        assert!(style.quick.is_some());
        assert_eq!(style.advanced.unwrap().tokens.len(), 1);
    }
}
