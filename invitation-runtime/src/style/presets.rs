//! # 预设注册表
//!
//! 主题 / 字体 / 效果预设都是只读的静态查找表。
//! 解析器只依赖它们的形状，注册表可以整体替换（测试或自定义主题包）。

use std::collections::BTreeMap;

use super::tokens::ResolvedTokens;

/// 字体栈
#[derive(Debug, Clone, PartialEq)]
pub struct FontStack {
    pub family: Vec<String>,
    /// 字号视觉补正系数
    pub size_scale: f64,
}

impl FontStack {
    pub fn new(family: &[&str], size_scale: f64) -> Self {
        Self {
            family: family.iter().map(|f| f.to_string()).collect(),
            size_scale,
        }
    }

    /// 转为 CSS font-family，含空格的字体名加引号
    pub fn to_css(&self) -> String {
        self.family
            .iter()
            .map(|f| {
                if f.contains(' ') {
                    format!("\"{}\"", f)
                } else {
                    f.clone()
                }
            })
            .collect::<Vec<_>>()
            .join(", ")
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ThemePreset {
    pub id: String,
    pub name: String,
    pub tokens: ResolvedTokens,
    pub recommended_typography: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TypographyPreset {
    pub id: String,
    pub display: FontStack,
    pub heading: FontStack,
    pub body: FontStack,
    pub accent: FontStack,
    /// (display, heading, body, accent)
    pub weights: (u16, u16, u16, u16),
}

#[derive(Debug, Clone, PartialEq)]
pub struct EffectsPreset {
    pub id: String,
    /// sm / md / lg / full
    pub radius: BTreeMap<String, f64>,
    pub shadows: BTreeMap<String, String>,
    pub blurs: BTreeMap<String, f64>,
}

/// 预设注册表
#[derive(Debug, Clone, Default)]
pub struct PresetRegistry {
    themes: BTreeMap<String, ThemePreset>,
    typography: BTreeMap<String, TypographyPreset>,
    effects: BTreeMap<String, EffectsPreset>,
}

impl PresetRegistry {
    /// 空注册表：所有查找都回落到默认值
    pub fn empty() -> Self {
        Self::default()
    }

    /// 内置预设
    pub fn builtin() -> Self {
        let mut registry = Self::empty();
        for theme in builtin_themes() {
            registry.insert_theme(theme);
        }
        for preset in builtin_typography() {
            registry.insert_typography(preset);
        }
        for preset in builtin_effects() {
            registry.insert_effects(preset);
        }
        registry
    }

    pub fn insert_theme(&mut self, preset: ThemePreset) {
        self.themes.insert(preset.id.clone(), preset);
    }

    pub fn insert_typography(&mut self, preset: TypographyPreset) {
        self.typography.insert(preset.id.clone(), preset);
    }

    pub fn insert_effects(&mut self, preset: EffectsPreset) {
        self.effects.insert(preset.id.clone(), preset);
    }

    pub fn theme(&self, id: &str) -> Option<&ThemePreset> {
        self.themes.get(id)
    }

    pub fn typography(&self, id: &str) -> Option<&TypographyPreset> {
        self.typography.get(id)
    }

    pub fn effects(&self, id: &str) -> Option<&EffectsPreset> {
        self.effects.get(id)
    }

    pub fn theme_ids(&self) -> impl Iterator<Item = &str> {
        self.themes.keys().map(String::as_str)
    }
}

// =============================================================================
// 内置主题
// =============================================================================

fn theme(id: &str, name: &str, typography: &str, tokens: &[(&str, &str)]) -> ThemePreset {
    ThemePreset {
        id: id.to_string(),
        name: name.to_string(),
        tokens: ResolvedTokens::from_pairs(tokens),
        recommended_typography: Some(typography.to_string()),
    }
}

fn builtin_themes() -> Vec<ThemePreset> {
    vec![
        theme(
            "minimal-light",
            "미니멀 라이트",
            "modern-minimal",
            &[
                ("bg-page", "#FFFFFF"),
                ("bg-section", "#FAFAFA"),
                ("bg-section-alt", "#F5F5F5"),
                ("bg-card", "#FFFFFF"),
                ("bg-overlay", "rgba(0, 0, 0, 0.4)"),
                ("fg-default", "#1A1A1A"),
                ("fg-muted", "#6B7280"),
                ("fg-emphasis", "#000000"),
                ("fg-inverse", "#FFFFFF"),
                ("fg-on-accent", "#FFFFFF"),
                ("accent-default", "#1A1A1A"),
                ("accent-hover", "#333333"),
                ("accent-active", "#000000"),
                ("accent-secondary", "#6B7280"),
                ("border-default", "#E5E7EB"),
                ("border-emphasis", "#D1D5DB"),
                ("border-muted", "#F3F4F6"),
            ],
        ),
        theme(
            "minimal-dark",
            "미니멀 다크",
            "modern-minimal",
            &[
                ("bg-page", "#0A0A0A"),
                ("bg-section", "#141414"),
                ("bg-section-alt", "#1F1F1F"),
                ("bg-card", "#1A1A1A"),
                ("bg-overlay", "rgba(0, 0, 0, 0.6)"),
                ("fg-default", "#F5F5F5"),
                ("fg-muted", "#A3A3A3"),
                ("fg-emphasis", "#FFFFFF"),
                ("fg-inverse", "#0A0A0A"),
                ("fg-on-accent", "#0A0A0A"),
                ("accent-default", "#F5F5F5"),
                ("accent-hover", "#E5E5E5"),
                ("accent-active", "#D4D4D4"),
                ("accent-secondary", "#A3A3A3"),
                ("border-default", "#2E2E2E"),
                ("border-emphasis", "#404040"),
                ("border-muted", "#1F1F1F"),
            ],
        ),
        theme(
            "classic-ivory",
            "클래식 아이보리",
            "classic-elegant",
            &[
                ("bg-page", "#FAF8F5"),
                ("bg-section", "#F5F2ED"),
                ("bg-section-alt", "#EFEBE4"),
                ("bg-card", "#FFFFFF"),
                ("bg-overlay", "rgba(45, 35, 25, 0.4)"),
                ("fg-default", "#3D3328"),
                ("fg-muted", "#7A6F5D"),
                ("fg-emphasis", "#2D2319"),
                ("fg-inverse", "#FAF8F5"),
                ("fg-on-accent", "#FFFFFF"),
                ("accent-default", "#8B7355"),
                ("accent-hover", "#7A6347"),
                ("accent-active", "#6A5339"),
                ("accent-secondary", "#A89880"),
                ("border-default", "#E5DED3"),
                ("border-emphasis", "#D4C9B8"),
                ("border-muted", "#F0EBE3"),
            ],
        ),
        theme(
            "classic-gold",
            "클래식 골드",
            "classic-elegant",
            &[
                ("bg-page", "#FFFDF8"),
                ("bg-section", "#FAF7F0"),
                ("bg-section-alt", "#F5F0E5"),
                ("bg-card", "#FFFFFF"),
                ("bg-overlay", "rgba(45, 35, 25, 0.5)"),
                ("fg-default", "#2D2319"),
                ("fg-muted", "#6B5D4D"),
                ("fg-emphasis", "#1A1408"),
                ("fg-inverse", "#FFFDF8"),
                ("fg-on-accent", "#1A1408"),
                ("accent-default", "#C9A962"),
                ("accent-hover", "#B8983F"),
                ("accent-active", "#A68A2D"),
                ("accent-secondary", "#D4BE7A"),
                ("border-default", "#E8DFC8"),
                ("border-emphasis", "#D4C5A5"),
                ("border-muted", "#F2EDE0"),
            ],
        ),
        theme(
            "classic-serif",
            "클래식 세리프",
            "classic-elegant",
            &[
                ("bg-page", "#FFFFFF"),
                ("bg-section", "#FCFBF9"),
                ("bg-section-alt", "#F6F3EE"),
                ("bg-card", "#FFFFFF"),
                ("bg-overlay", "rgba(30, 25, 20, 0.45)"),
                ("fg-default", "#2B2B2B"),
                ("fg-muted", "#76706A"),
                ("fg-emphasis", "#5C4A3A"),
                ("fg-inverse", "#FFFFFF"),
                ("fg-on-accent", "#FFFFFF"),
                ("accent-default", "#5C4A3A"),
                ("accent-hover", "#523F30"),
                ("accent-active", "#483526"),
                ("accent-secondary", "#B5A593"),
                ("border-default", "#E8E2DA"),
                ("border-emphasis", "#CFC5B8"),
                ("border-muted", "#F3EFEA"),
            ],
        ),
        theme(
            "modern-mono",
            "모던 모노크롬",
            "modern-minimal",
            &[
                ("bg-page", "#FFFFFF"),
                ("bg-section", "#F8F8F8"),
                ("bg-section-alt", "#F0F0F0"),
                ("bg-card", "#FFFFFF"),
                ("bg-overlay", "rgba(0, 0, 0, 0.5)"),
                ("fg-default", "#1A1A1A"),
                ("fg-muted", "#737373"),
                ("fg-emphasis", "#000000"),
                ("fg-inverse", "#FFFFFF"),
                ("fg-on-accent", "#FFFFFF"),
                ("accent-default", "#000000"),
                ("accent-hover", "#262626"),
                ("accent-active", "#404040"),
                ("accent-secondary", "#525252"),
                ("border-default", "#E5E5E5"),
                ("border-emphasis", "#D4D4D4"),
                ("border-muted", "#F5F5F5"),
            ],
        ),
        theme(
            "romantic-blush",
            "로맨틱 블러쉬",
            "natural-warm",
            &[
                ("bg-page", "#FFF9F9"),
                ("bg-section", "#FFF5F5"),
                ("bg-section-alt", "#FFEFEF"),
                ("bg-card", "#FFFFFF"),
                ("bg-overlay", "rgba(80, 40, 50, 0.4)"),
                ("fg-default", "#4A3535"),
                ("fg-muted", "#8C7070"),
                ("fg-emphasis", "#3A2525"),
                ("fg-inverse", "#FFF9F9"),
                ("fg-on-accent", "#FFFFFF"),
                ("accent-default", "#E8A0A0"),
                ("accent-hover", "#E08888"),
                ("accent-active", "#D87070"),
                ("accent-secondary", "#F0B8B8"),
                ("border-default", "#F5E0E0"),
                ("border-emphasis", "#EBD0D0"),
                ("border-muted", "#FAF0F0"),
            ],
        ),
        theme(
            "romantic-garden",
            "로맨틱 가든",
            "natural-warm",
            &[
                ("bg-page", "#F8FAF8"),
                ("bg-section", "#F2F7F2"),
                ("bg-section-alt", "#EBF2EB"),
                ("bg-card", "#FFFFFF"),
                ("bg-overlay", "rgba(35, 55, 40, 0.4)"),
                ("fg-default", "#2D3D32"),
                ("fg-muted", "#5A7560"),
                ("fg-emphasis", "#1D2D22"),
                ("fg-inverse", "#F8FAF8"),
                ("fg-on-accent", "#FFFFFF"),
                ("accent-default", "#6B8E6B"),
                ("accent-hover", "#5A7D5A"),
                ("accent-active", "#4A6C4A"),
                ("accent-secondary", "#8BA88B"),
                ("border-default", "#D8E5D8"),
                ("border-emphasis", "#C5D8C5"),
                ("border-muted", "#E8F0E8"),
            ],
        ),
        theme(
            "cinematic-dark",
            "시네마틱 다크",
            "romantic-script",
            &[
                ("bg-page", "#0D0D0F"),
                ("bg-section", "#121215"),
                ("bg-section-alt", "#1A1A1F"),
                ("bg-card", "#1E1E24"),
                ("bg-overlay", "rgba(0, 0, 0, 0.7)"),
                ("fg-default", "#E8E6E3"),
                ("fg-muted", "#9A968F"),
                ("fg-emphasis", "#F5E6C8"),
                ("fg-inverse", "#0D0D0F"),
                ("fg-on-accent", "#0D0D0F"),
                ("accent-default", "#D4B483"),
                ("accent-hover", "#C4A473"),
                ("accent-active", "#B49463"),
                ("accent-secondary", "#8A7558"),
                ("border-default", "#2A2A31"),
                ("border-emphasis", "#3D3D46"),
                ("border-muted", "#1E1E24"),
            ],
        ),
    ]
}

// =============================================================================
// 内置字体
// =============================================================================

fn builtin_typography() -> Vec<TypographyPreset> {
    let playfair = FontStack::new(&["Playfair Display", "Georgia", "serif"], 0.95);
    let great_vibes = FontStack::new(&["Great Vibes", "cursive"], 1.25);
    let noto_serif = FontStack::new(&["Noto Serif KR", "Batang", "serif"], 1.0);
    let montserrat = FontStack::new(&["Montserrat", "Helvetica Neue", "sans-serif"], 1.0);
    let pretendard = FontStack::new(&["Pretendard", "Apple SD Gothic Neo", "sans-serif"], 1.0);
    let gowun_batang = FontStack::new(&["Gowun Batang", "Batang", "serif"], 1.0);
    let dancing = FontStack::new(&["Dancing Script", "cursive"], 1.15);
    let gowun_dodum = FontStack::new(&["Gowun Dodum", "Apple SD Gothic Neo", "sans-serif"], 1.0);

    vec![
        TypographyPreset {
            id: "classic-elegant".into(),
            display: great_vibes.clone(),
            heading: playfair.clone(),
            body: noto_serif,
            accent: playfair.clone(),
            weights: (400, 600, 400, 400),
        },
        TypographyPreset {
            id: "modern-minimal".into(),
            display: montserrat.clone(),
            heading: montserrat.clone(),
            body: pretendard.clone(),
            accent: montserrat,
            weights: (500, 600, 400, 500),
        },
        TypographyPreset {
            id: "romantic-script".into(),
            display: great_vibes.clone(),
            heading: great_vibes,
            body: gowun_batang,
            accent: playfair,
            weights: (400, 400, 400, 500),
        },
        TypographyPreset {
            id: "natural-warm".into(),
            display: dancing.clone(),
            heading: dancing.clone(),
            body: gowun_dodum,
            accent: dancing,
            weights: (500, 500, 400, 500),
        },
    ]
}

// =============================================================================
// 内置效果
// =============================================================================

fn effects(
    id: &str,
    radius: [f64; 4],
    shadows: [&str; 3],
    blurs: [f64; 3],
) -> EffectsPreset {
    let sizes = ["sm", "md", "lg"];
    EffectsPreset {
        id: id.to_string(),
        radius: ["sm", "md", "lg", "full"]
            .iter()
            .zip(radius)
            .map(|(k, v)| (k.to_string(), v))
            .collect(),
        shadows: sizes
            .iter()
            .zip(shadows)
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect(),
        blurs: sizes.iter().zip(blurs).map(|(k, v)| (k.to_string(), v)).collect(),
    }
}

fn builtin_effects() -> Vec<EffectsPreset> {
    vec![
        effects(
            "minimal",
            [0.0, 2.0, 4.0, 9999.0],
            ["none", "none", "0 1px 2px rgba(0, 0, 0, 0.05)"],
            [2.0, 4.0, 8.0],
        ),
        effects(
            "soft",
            [8.0, 12.0, 20.0, 9999.0],
            [
                "0 2px 8px rgba(0, 0, 0, 0.04)",
                "0 6px 16px rgba(0, 0, 0, 0.06)",
                "0 12px 32px rgba(0, 0, 0, 0.08)",
            ],
            [4.0, 10.0, 20.0],
        ),
        effects(
            "elegant",
            [4.0, 8.0, 16.0, 9999.0],
            [
                "0 1px 3px rgba(60, 45, 30, 0.08)",
                "0 4px 12px rgba(60, 45, 30, 0.1)",
                "0 12px 24px rgba(60, 45, 30, 0.12)",
            ],
            [4.0, 8.0, 16.0],
        ),
        effects(
            "dramatic",
            [0.0, 4.0, 8.0, 9999.0],
            [
                "0 2px 4px rgba(0, 0, 0, 0.2)",
                "0 8px 16px rgba(0, 0, 0, 0.3)",
                "0 20px 40px rgba(0, 0, 0, 0.4)",
            ],
            [8.0, 16.0, 32.0],
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_registry() {
        let registry = PresetRegistry::builtin();
        assert!(registry.theme("classic-serif").is_some());
        assert!(registry.theme("does-not-exist").is_none());
        assert_eq!(registry.theme_ids().count(), 9);
        assert!(registry.typography("natural-warm").is_some());
        assert_eq!(
            registry.effects("soft").and_then(|e| e.radius.get("md")),
            Some(&12.0)
        );
    }

    #[test]
    fn test_theme_tokens_are_complete() {
        let registry = PresetRegistry::builtin();
        let ivory = registry.theme("classic-ivory").unwrap();
        for key in super::super::tokens::TOKEN_KEYS {
            assert!(ivory.tokens.get(key).is_some());
        }
        assert_eq!(ivory.tokens.value("accent-default"), "#8B7355");
    }

    #[test]
    fn test_font_stack_css() {
        let stack = FontStack::new(&["Noto Serif KR", "serif"], 1.0);
        assert_eq!(stack.to_css(), "\"Noto Serif KR\", serif");
    }

    #[test]
    fn test_empty_registry() {
        let registry = PresetRegistry::empty();
        assert!(registry.theme("minimal-light").is_none());
    }
}
