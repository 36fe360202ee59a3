//! # Mood 模块
//!
//! 全局动画设置：情绪（mood）决定时长倍率和默认缓动，
//! 再叠加文档的 `speed` 与减弱动效策略。

use std::collections::BTreeMap;

use invitation_runtime::schema::{AnimationMood, GlobalAnimation};
use tracing::warn;

use super::easing::{EaseMode, Easing};
use crate::error::AnimationError;

/// 情绪对应的时长倍率
pub fn mood_multiplier(mood: AnimationMood) -> f64 {
    match mood {
        AnimationMood::Minimal => 0.5,
        AnimationMood::Subtle => 0.8,
        AnimationMood::Elegant => 1.0,
        AnimationMood::Playful => 0.7,
        AnimationMood::Dramatic => 1.3,
        AnimationMood::Cinematic => 1.5,
    }
}

/// 情绪对应的默认缓动
pub fn mood_easing(mood: AnimationMood) -> Easing {
    match mood {
        AnimationMood::Minimal => Easing::Power {
            exponent: 2,
            mode: EaseMode::Out,
        },
        AnimationMood::Subtle => Easing::Power {
            exponent: 3,
            mode: EaseMode::InOut,
        },
        AnimationMood::Elegant => Easing::default(),
        AnimationMood::Playful => Easing::Back {
            overshoot: 1.7,
            mode: EaseMode::Out,
        },
        AnimationMood::Dramatic => Easing::Expo(EaseMode::Out),
        AnimationMood::Cinematic => Easing::Power {
            exponent: 5,
            mode: EaseMode::Out,
        },
    }
}

/// 时长档位
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DurationKind {
    Fast,
    Normal,
    Slow,
}

impl DurationKind {
    /// 未乘倍率的基础时长（ms）
    pub fn base_ms(self) -> f64 {
        match self {
            DurationKind::Fast => 200.0,
            DurationKind::Normal => 400.0,
            DurationKind::Slow => 800.0,
        }
    }
}

/// 解析后的全局动画设置
#[derive(Debug, Clone, PartialEq)]
pub struct AnimationSettings {
    pub mood: AnimationMood,
    /// 文档的全局速度系数
    pub speed: f64,
    /// 是否减弱动效（已结合宿主环境）
    pub reduced_motion: bool,
    /// 命名缓动预设
    pub easing_presets: BTreeMap<String, String>,
}

impl Default for AnimationSettings {
    fn default() -> Self {
        Self {
            mood: AnimationMood::default(),
            speed: 1.0,
            reduced_motion: false,
            easing_presets: BTreeMap::new(),
        }
    }
}

impl AnimationSettings {
    /// 从文档的全局动画设置构建
    pub fn from_global(global: &GlobalAnimation, environment_prefers_reduced: bool) -> Self {
        let speed = match global.speed {
            Some(speed) if speed.is_finite() && speed > 0.0 => speed,
            Some(speed) => {
                warn!(speed, "无效的全局速度，使用 1.0");
                1.0
            }
            None => 1.0,
        };

        Self {
            mood: global.mood,
            speed,
            reduced_motion: global.reduced_motion.resolve(environment_prefers_reduced),
            easing_presets: global.easing_presets.clone(),
        }
    }

    pub fn with_reduced_motion(mut self, reduced: bool) -> Self {
        self.reduced_motion = reduced;
        self
    }

    /// 时长倍率：`speed × mood 倍率`
    pub fn speed_multiplier(&self) -> f64 {
        self.speed * mood_multiplier(self.mood)
    }

    /// 默认缓动
    pub fn default_easing(&self) -> Easing {
        mood_easing(self.mood)
    }

    /// 默认时长（ms），已乘倍率
    pub fn default_duration(&self, kind: DurationKind) -> f64 {
        kind.base_ms() * self.speed_multiplier()
    }

    /// 解析缓动名：先查命名预设，再按缓动语法解析；缺省时用 mood 默认值
    pub fn resolve_easing(&self, name: Option<&str>) -> Result<Easing, AnimationError> {
        match name {
            None => Ok(self.default_easing()),
            Some(name) => {
                let expression = self
                    .easing_presets
                    .get(name)
                    .map(String::as_str)
                    .unwrap_or(name);
                Easing::parse(expression)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use invitation_runtime::schema::ReducedMotionPolicy;

    #[test]
    fn test_mood_table() {
        let mut global = GlobalAnimation::default();
        global.mood = AnimationMood::Cinematic;
        global.speed = Some(2.0);

        let settings = AnimationSettings::from_global(&global, false);
        assert_eq!(settings.speed_multiplier(), 3.0);
        assert_eq!(settings.default_duration(DurationKind::Normal), 1200.0);
        assert_eq!(settings.default_easing().to_string(), "power4.out");
    }

    #[test]
    fn test_default_settings_are_elegant() {
        let settings = AnimationSettings::default();
        assert_eq!(settings.speed_multiplier(), 1.0);
        assert_eq!(settings.default_duration(DurationKind::Fast), 200.0);
        assert_eq!(settings.resolve_easing(None).unwrap(), Easing::default());
    }

    #[test]
    fn test_reduced_motion_policy() {
        let mut global = GlobalAnimation::default();
        assert!(AnimationSettings::from_global(&global, true).reduced_motion);
        assert!(!AnimationSettings::from_global(&global, false).reduced_motion);

        global.reduced_motion = ReducedMotionPolicy::Never;
        assert!(!AnimationSettings::from_global(&global, true).reduced_motion);

        global.reduced_motion = ReducedMotionPolicy::Always;
        assert!(AnimationSettings::from_global(&global, false).reduced_motion);
    }

    #[test]
    fn test_easing_presets_take_priority() {
        let mut global = GlobalAnimation::default();
        global
            .easing_presets
            .insert("soft".to_string(), "sine.inOut".to_string());
        let settings = AnimationSettings::from_global(&global, false);

        assert_eq!(
            settings.resolve_easing(Some("soft")).unwrap(),
            Easing::Sine(EaseMode::InOut)
        );
        assert!(settings.resolve_easing(Some("nope")).is_err());
    }

    #[test]
    fn test_invalid_speed_falls_back() {
        let mut global = GlobalAnimation::default();
        global.speed = Some(-1.0);
        assert_eq!(AnimationSettings::from_global(&global, false).speed, 1.0);
    }
}
