//! # Style 模块
//!
//! 三层样式系统的解析器。
//!
//! ## 优先级
//!
//! `advanced > quick > preset`。任一层声明的 key 整体替换下层同名 key，
//! 未声明的 key 向下回落。字体与效果走同样的三层。
//!
//! ## 示例
//!
//! ```ignore
//! let registry = PresetRegistry::builtin();
//! let resolved = resolve_style(&document.style, &registry);
//! let vars = style_to_css_variables(&resolved);
//! assert!(vars.contains_key("--bg-page"));
//! ```

mod color;
mod presets;
mod resolver;
mod tokens;

use std::collections::BTreeMap;

pub use color::{
    adjust_color, color_to_css, gradient_to_css, is_light_color, luminance, parse_hex,
};
pub use presets::{EffectsPreset, FontStack, PresetRegistry, ThemePreset, TypographyPreset};
pub use resolver::{
    ResolvedEffects, ResolvedStyle, ResolvedTypography, apply_block_mode, apply_quick,
    apply_theme_config, resolve_effects, resolve_style, resolve_typography,
};
pub use tokens::{GRADIENT_KEYS, ResolvedTokens, TOKEN_KEYS, canonical_key};

use crate::size::round2;

/// CSS 属性表（有序，便于输出稳定）
pub type CssProperties = BTreeMap<String, String>;

/// token 表转为 `--key` 形式的 CSS 变量
pub fn tokens_to_css_variables(tokens: &ResolvedTokens) -> CssProperties {
    tokens
        .iter()
        .map(|(key, value)| (format!("--{}", key), value.to_string()))
        .collect()
}

/// 解析结果转为 CSS 变量
pub fn style_to_css_variables(style: &ResolvedStyle) -> CssProperties {
    let mut vars = tokens_to_css_variables(&style.tokens);

    let t = &style.typography;
    let fonts = [
        ("display", &t.font_family_display, t.font_weight_display, t.font_scale_display),
        ("heading", &t.font_family_heading, t.font_weight_heading, t.font_scale_heading),
        ("body", &t.font_family_body, t.font_weight_body, t.font_scale_body),
        ("accent", &t.font_family_accent, t.font_weight_accent, t.font_scale_accent),
    ];
    for (role, family, weight, scale) in fonts {
        vars.insert(format!("--font-{}", role), family.clone());
        vars.insert(format!("--font-weight-{}", role), weight.to_string());
        vars.insert(format!("--font-scale-{}", role), round2(scale).to_string());
    }
    for (size, value) in &t.scale {
        vars.insert(format!("--text-{}", size), value.clone());
    }

    let e = &style.effects;
    for (size, value) in &e.radius {
        vars.insert(format!("--radius-{}", size), format!("{}px", round2(*value)));
    }
    for (size, value) in &e.shadows {
        vars.insert(format!("--shadow-{}", size), value.clone());
    }
    for (size, value) in &e.blurs {
        vars.insert(format!("--blur-{}", size), format!("{}px", round2(*value)));
    }

    vars
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::StyleSystem;

    #[test]
    fn test_css_variables() {
        let resolved = resolve_style(&StyleSystem::default(), &PresetRegistry::builtin());
        let vars = style_to_css_variables(&resolved);

        assert_eq!(vars.get("--bg-page").map(String::as_str), Some("#ffffff"));
        assert_eq!(
            vars.get("--accent-default").map(String::as_str),
            Some("#c9a86c")
        );
        assert_eq!(vars.get("--radius-sm").map(String::as_str), Some("4px"));
        assert_eq!(vars.get("--radius-full").map(String::as_str), Some("9999px"));
        assert_eq!(vars.get("--font-weight-heading").map(String::as_str), Some("600"));
        assert_eq!(vars.get("--font-scale-display").map(String::as_str), Some("1.25"));
        assert_eq!(vars.get("--text-2xl").map(String::as_str), Some("1.5rem"));
        assert_eq!(vars.get("--blur-md").map(String::as_str), Some("8px"));
        assert!(vars.get("--font-body").is_some_and(|f| f.contains("Noto Serif KR")));
    }

    #[test]
    fn test_gradient_token_becomes_variable() {
        let style: StyleSystem = serde_json::from_str(
            r##"{
                "advanced": {
                    "tokens": {
                        "gradient-hero": {
                            "type": "linear",
                            "angle": 90,
                            "stops": [
                                { "color": "#000", "position": 0 },
                                { "color": "#fff", "position": 100 }
                            ]
                        }
                    }
                }
            }"##,
        )
        .unwrap();
        let resolved = resolve_style(&style, &PresetRegistry::builtin());
        let vars = style_to_css_variables(&resolved);
        assert_eq!(
            vars.get("--gradient-hero").map(String::as_str),
            Some("linear-gradient(90deg, #000 0%, #fff 100%)")
        );
    }
}
