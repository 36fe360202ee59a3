//! 三层样式解析
//!
//! 每一层都是对基线 token 表的一次"按 key 整体替换"：
//!
//! ```text
//! 默认值 → preset → quick（扇出） → advanced（字面值）
//! ```

use std::collections::BTreeMap;

use serde::Serialize;

use super::color::{adjust_color, color_to_css, is_light_color};
use super::presets::{EffectsPreset, PresetRegistry, TypographyPreset};
use super::tokens::ResolvedTokens;
use crate::schema::{
    BlockMode, BlockThemeConfig, BlockThemeMode, EffectsCustom, InversionKind, QuickStyleConfig,
    StyleSystem, TypographyCustom,
};

/// 已解析的字体设置
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedTypography {
    pub font_family_display: String,
    pub font_family_heading: String,
    pub font_family_body: String,
    pub font_family_accent: String,
    pub font_weight_display: u16,
    pub font_weight_heading: u16,
    pub font_weight_body: u16,
    pub font_weight_accent: u16,
    pub font_scale_display: f64,
    pub font_scale_heading: f64,
    pub font_scale_body: f64,
    pub font_scale_accent: f64,
    /// xs / sm / base / lg / xl / 2xl / 3xl / 4xl
    pub scale: BTreeMap<String, String>,
}

impl Default for ResolvedTypography {
    fn default() -> Self {
        let scale = [
            ("xs", "0.75rem"),
            ("sm", "0.875rem"),
            ("base", "1rem"),
            ("lg", "1.125rem"),
            ("xl", "1.25rem"),
            ("2xl", "1.5rem"),
            ("3xl", "1.875rem"),
            ("4xl", "2.25rem"),
        ]
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();

        Self {
            font_family_display: "\"Great Vibes\", cursive".into(),
            font_family_heading: "\"Playfair Display\", serif".into(),
            font_family_body: "\"Noto Serif KR\", serif".into(),
            font_family_accent: "\"Playfair Display\", serif".into(),
            font_weight_display: 400,
            font_weight_heading: 600,
            font_weight_body: 400,
            font_weight_accent: 400,
            font_scale_display: 1.25,
            font_scale_heading: 0.95,
            font_scale_body: 1.0,
            font_scale_accent: 0.95,
            scale,
        }
    }
}

/// 已解析的效果设置
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedEffects {
    pub radius: BTreeMap<String, f64>,
    pub shadows: BTreeMap<String, String>,
    pub blurs: BTreeMap<String, f64>,
}

impl Default for ResolvedEffects {
    fn default() -> Self {
        Self {
            radius: [("sm", 4.0), ("md", 8.0), ("lg", 16.0), ("full", 9999.0)]
                .iter()
                .map(|(k, v)| (k.to_string(), *v))
                .collect(),
            shadows: [
                ("sm", "0 1px 2px rgba(0, 0, 0, 0.05)"),
                ("md", "0 4px 6px rgba(0, 0, 0, 0.07)"),
                ("lg", "0 10px 15px rgba(0, 0, 0, 0.1)"),
            ]
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect(),
            blurs: [("sm", 4.0), ("md", 8.0), ("lg", 16.0)]
                .iter()
                .map(|(k, v)| (k.to_string(), *v))
                .collect(),
        }
    }
}

/// 样式解析结果
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedStyle {
    pub tokens: ResolvedTokens,
    pub typography: ResolvedTypography,
    pub effects: ResolvedEffects,
    /// block id → 覆盖后的完整 token
    pub block_overrides: BTreeMap<String, ResolvedTokens>,
}

impl ResolvedStyle {
    /// 某个 block 使用的 token（有覆盖用覆盖，否则用文档级）
    pub fn tokens_for_block(&self, block_id: &str) -> &ResolvedTokens {
        self.block_overrides.get(block_id).unwrap_or(&self.tokens)
    }
}

// =============================================================================
// 解析
// =============================================================================

/// 解析样式系统。未知预设回落到默认值，从不失败
pub fn resolve_style(style: &StyleSystem, registry: &PresetRegistry) -> ResolvedStyle {
    let tokens = resolve_tokens(style, registry);
    let typography = resolve_typography(style, registry);
    let effects = resolve_effects(style, registry);

    let mut block_overrides = BTreeMap::new();
    if let Some(quick) = &style.quick {
        for (block_id, mode) in &quick.block_modes {
            block_overrides.insert(block_id.clone(), apply_block_mode(&tokens, *mode));
        }
    }
    if let Some(advanced) = &style.advanced {
        for (block_id, config) in &advanced.block_overrides {
            if let Some(next) = apply_theme_config(&tokens, config) {
                block_overrides.insert(block_id.clone(), next);
            }
        }
    }

    ResolvedStyle {
        tokens,
        typography,
        effects,
        block_overrides,
    }
}

fn resolve_tokens(style: &StyleSystem, registry: &PresetRegistry) -> ResolvedTokens {
    // 第一层：preset
    let mut tokens = style
        .preset
        .as_deref()
        .and_then(|id| registry.theme(id))
        .map(|preset| preset.tokens.clone())
        .unwrap_or_default();

    // 第二层：quick
    if let Some(quick) = &style.quick {
        apply_quick(&mut tokens, quick);
    }

    // 第三层：advanced
    if let Some(advanced) = &style.advanced {
        for (key, value) in &advanced.tokens {
            tokens.set(key, color_to_css(value));
        }
    }

    tokens
}

/// quick 字段扇出到多个 token
pub fn apply_quick(tokens: &mut ResolvedTokens, quick: &QuickStyleConfig) {
    if let Some(dominant) = &quick.dominant_color {
        // 深色主色不作为背景
        if is_light_color(dominant) {
            tokens.set("bg-section", dominant.clone());
        }
    }
    if let Some(primary) = &quick.primary_color {
        tokens.set("accent-default", primary.clone());
        tokens.set("accent-hover", adjust_color(primary, -10));
        tokens.set("accent-active", adjust_color(primary, -20));
        tokens.set("fg-emphasis", primary.clone());
    }
    if let Some(secondary) = &quick.secondary_color {
        tokens.set("accent-secondary", secondary.clone());
    }
}

/// quick 的 block 模式
pub fn apply_block_mode(tokens: &ResolvedTokens, mode: BlockMode) -> ResolvedTokens {
    match mode {
        BlockMode::Light if tokens.is_dark() => tokens.inverted(),
        BlockMode::Dark if !tokens.is_dark() => tokens.inverted(),
        BlockMode::Accent => tokens.accented(),
        _ => tokens.clone(),
    }
}

/// 应用 block 主题配置。`inherit` 且无自定义 token 时返回 `None`
pub fn apply_theme_config(
    tokens: &ResolvedTokens,
    config: &BlockThemeConfig,
) -> Option<ResolvedTokens> {
    let mut next = match config.mode {
        BlockThemeMode::Invert => {
            match config.inversion.map(|i| i.kind).unwrap_or_default() {
                InversionKind::Full => tokens.inverted(),
                InversionKind::BgOnly => tokens.inverted_background(),
                InversionKind::TextOnly => tokens.inverted_text(),
            }
        }
        BlockThemeMode::Inherit if config.tokens.is_empty() => return None,
        BlockThemeMode::Inherit | BlockThemeMode::Custom => tokens.clone(),
    };

    for (key, value) in &config.tokens {
        next.set(key, color_to_css(value));
    }
    Some(next)
}

// =============================================================================
// 字体
// =============================================================================

fn apply_typography_preset(result: &mut ResolvedTypography, preset: &TypographyPreset) {
    result.font_family_display = preset.display.to_css();
    result.font_family_heading = preset.heading.to_css();
    result.font_family_body = preset.body.to_css();
    result.font_family_accent = preset.accent.to_css();
    (
        result.font_weight_display,
        result.font_weight_heading,
        result.font_weight_body,
        result.font_weight_accent,
    ) = preset.weights;
    result.font_scale_display = preset.display.size_scale;
    result.font_scale_heading = preset.heading.size_scale;
    result.font_scale_body = preset.body.size_scale;
    result.font_scale_accent = preset.accent.size_scale;
}

fn apply_typography_custom(result: &mut ResolvedTypography, custom: &TypographyCustom) {
    let stacks = &custom.font_stacks;
    if let Some(display) = &stacks.display {
        result.font_family_display = display.clone();
    }
    if let Some(heading) = &stacks.heading {
        result.font_family_heading = heading.clone();
    }
    if let Some(body) = &stacks.body {
        result.font_family_body = body.clone();
    }

    let weights = custom.weights;
    if let Some(w) = weights.display {
        result.font_weight_display = w;
    }
    if let Some(w) = weights.heading {
        result.font_weight_heading = w;
    }
    if let Some(w) = weights.body {
        result.font_weight_body = w;
    }

    for (key, value) in &custom.scale {
        result.scale.insert(key.clone(), value.clone());
    }
}

/// 字体解析：typography.preset → quick.typography → typography.custom → advanced.typography
pub fn resolve_typography(style: &StyleSystem, registry: &PresetRegistry) -> ResolvedTypography {
    let mut result = ResolvedTypography::default();

    let quick_preset = style.quick.as_ref().and_then(|q| q.typography.as_deref());
    for id in [style.typography.preset.as_deref(), quick_preset]
        .into_iter()
        .flatten()
    {
        if let Some(preset) = registry.typography(id) {
            apply_typography_preset(&mut result, preset);
        }
    }

    if let Some(custom) = &style.typography.custom {
        apply_typography_custom(&mut result, custom);
    }
    if let Some(custom) = style.advanced.as_ref().and_then(|a| a.typography.as_ref()) {
        apply_typography_custom(&mut result, custom);
    }

    result
}

// =============================================================================
// 效果
// =============================================================================

fn merge_effects(result: &mut ResolvedEffects, preset: &EffectsPreset) {
    result.radius.extend(preset.radius.clone());
    result.shadows.extend(preset.shadows.clone());
    result.blurs.extend(preset.blurs.clone());
}

fn merge_effects_custom(result: &mut ResolvedEffects, custom: &EffectsCustom) {
    result.radius.extend(custom.radius.clone());
    result.shadows.extend(custom.shadows.clone());
    result.blurs.extend(custom.blurs.clone());
}

/// 效果解析：effects.preset → quick.effects → effects.custom → advanced.effects
pub fn resolve_effects(style: &StyleSystem, registry: &PresetRegistry) -> ResolvedEffects {
    let mut result = ResolvedEffects::default();

    let quick_preset = style.quick.as_ref().and_then(|q| q.effects.as_deref());
    for id in [style.effects.preset.as_deref(), quick_preset]
        .into_iter()
        .flatten()
    {
        if let Some(preset) = registry.effects(id) {
            merge_effects(&mut result, preset);
        }
    }

    if let Some(custom) = &style.effects.custom {
        merge_effects_custom(&mut result, custom);
    }
    if let Some(custom) = style.advanced.as_ref().and_then(|a| a.effects.as_ref()) {
        merge_effects_custom(&mut result, custom);
    }

    result
}
