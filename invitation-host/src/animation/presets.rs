//! # Presets 模块
//!
//! 入场与悬停动画预设。预设只描述"从哪里到哪里"，目标总是 `self`。

use std::collections::BTreeMap;

use invitation_runtime::schema::{
    AnimationAction, AnimationProperties, EntranceAnimation, HoverAnimation, PropertyValue,
    SetAction, SequenceAction, SpringAction, TimelineAction, TimelineOffset, TimelineTrack,
    TweenAction,
};
use tracing::warn;

use crate::error::AnimationError;

/// 悬停预设的统一时长（ms）
const HOVER_DURATION_MS: f64 = 200.0;

/// 预设运动方式
#[derive(Debug, Clone, PartialEq)]
pub enum PresetMotion {
    Tween { duration_ms: f64, easing: String },
    Spring { stiffness: f64, damping: f64 },
}

/// 动画预设
#[derive(Debug, Clone, PartialEq)]
pub struct AnimationPreset {
    pub id: String,
    pub from: AnimationProperties,
    pub to: AnimationProperties,
    pub motion: PresetMotion,
}

impl AnimationPreset {
    fn tween(id: &str, from: &[(&str, f64)], to: &[(&str, f64)], duration_ms: f64) -> Self {
        Self {
            id: id.to_string(),
            from: properties(from),
            to: properties(to),
            motion: PresetMotion::Tween {
                duration_ms,
                easing: "ease-out".to_string(),
            },
        }
    }

    fn spring(id: &str, from: &[(&str, f64)], to: &[(&str, f64)], stiffness: f64, damping: f64) -> Self {
        Self {
            id: id.to_string(),
            from: properties(from),
            to: properties(to),
            motion: PresetMotion::Spring { stiffness, damping },
        }
    }

    /// 构造作用于 `self` 的动作
    ///
    /// `duration` 只覆盖补间预设；`delay` 对两种预设都生效。
    pub fn to_action(&self, duration: Option<f64>, delay: Option<f64>) -> AnimationAction {
        match &self.motion {
            PresetMotion::Tween { duration_ms, easing } => {
                let mut tween = TweenAction::new("self", self.to.clone())
                    .with_duration(duration.unwrap_or(*duration_ms))
                    .with_easing(easing.clone());
                if !self.from.is_empty() {
                    tween = tween.with_from(self.from.clone());
                }
                if let Some(delay) = delay {
                    tween = tween.with_delay(delay);
                }
                AnimationAction::Tween(tween)
            }
            PresetMotion::Spring { stiffness, damping } => {
                let spring = AnimationAction::Spring(SpringAction {
                    target: "self".into(),
                    to: self.to.clone(),
                    stiffness: Some(*stiffness),
                    damping: Some(*damping),
                    mass: None,
                });
                let action = if self.from.is_empty() {
                    spring
                } else {
                    AnimationAction::Sequence(SequenceAction {
                        steps: vec![
                            AnimationAction::Set(SetAction {
                                target: "self".into(),
                                properties: self.from.clone(),
                            }),
                            spring,
                        ],
                    })
                };
                delayed(action, delay)
            }
        }
    }
}

fn properties(pairs: &[(&str, f64)]) -> AnimationProperties {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), PropertyValue::Number(*v)))
        .collect()
}

/// 用单轨时间线给任意动作加延迟
fn delayed(action: AnimationAction, delay: Option<f64>) -> AnimationAction {
    match delay {
        Some(delay) if delay > 0.0 => AnimationAction::Timeline(TimelineAction {
            tracks: vec![TimelineTrack {
                action,
                at: TimelineOffset::Millis(delay),
            }],
            total_duration: None,
        }),
        _ => action,
    }
}

/// 动画预设注册表
#[derive(Debug, Clone, Default)]
pub struct AnimationPresetRegistry {
    entrance: BTreeMap<String, AnimationPreset>,
    hover: BTreeMap<String, AnimationPreset>,
}

impl AnimationPresetRegistry {
    pub fn empty() -> Self {
        Self::default()
    }

    /// 内置预设
    pub fn builtin() -> Self {
        let mut registry = Self::empty();
        for preset in builtin_entrance() {
            registry.insert_entrance(preset);
        }
        for preset in builtin_hover() {
            registry.insert_hover(preset);
        }
        registry
    }

    pub fn insert_entrance(&mut self, preset: AnimationPreset) {
        self.entrance.insert(preset.id.clone(), preset);
    }

    pub fn insert_hover(&mut self, preset: AnimationPreset) {
        self.hover.insert(preset.id.clone(), preset);
    }

    pub fn entrance(&self, id: &str) -> Option<&AnimationPreset> {
        self.entrance.get(id)
    }

    /// 查找悬停预设，接受 `hover-` 前缀
    pub fn hover(&self, id: &str) -> Option<&AnimationPreset> {
        let id = id.strip_prefix("hover-").unwrap_or(id);
        self.hover.get(id)
    }

    pub fn entrance_ids(&self) -> impl Iterator<Item = &str> {
        self.entrance.keys().map(String::as_str)
    }

    /// 入场配置转为动作：`custom` 优先，其次是预设
    pub fn entrance_action(&self, entrance: &EntranceAnimation) -> Option<AnimationAction> {
        if let Some(custom) = &entrance.custom {
            return Some(delayed(custom.clone(), entrance.delay));
        }

        let id = entrance.preset.as_deref()?;
        match self.entrance(id) {
            Some(preset) => Some(preset.to_action(entrance.duration, entrance.delay)),
            None => {
                let error = AnimationError::UnknownPreset { id: id.to_string() };
                warn!(error = %error, "入场动画预设不存在");
                None
            }
        }
    }

    /// 悬停配置转为动作：显式 `action` 优先，其次是预设
    pub fn hover_action(&self, hover: &HoverAnimation) -> Option<AnimationAction> {
        if let Some(action) = &hover.action {
            return Some(action.clone());
        }

        let id = hover.preset.as_deref()?;
        match self.hover(id) {
            Some(preset) => Some(preset.to_action(hover.duration, None)),
            None => {
                let error = AnimationError::UnknownPreset { id: id.to_string() };
                warn!(error = %error, "悬停动画预设不存在");
                None
            }
        }
    }
}

// =============================================================================
// 内置预设
// =============================================================================

fn builtin_entrance() -> Vec<AnimationPreset> {
    vec![
        AnimationPreset::tween("fade-in", &[("opacity", 0.0)], &[("opacity", 1.0)], 500.0),
        AnimationPreset::tween(
            "fade-slide-up",
            &[("opacity", 0.0), ("y", 30.0)],
            &[("opacity", 1.0), ("y", 0.0)],
            600.0,
        ),
        AnimationPreset::tween(
            "fade-slide-down",
            &[("opacity", 0.0), ("y", -30.0)],
            &[("opacity", 1.0), ("y", 0.0)],
            600.0,
        ),
        AnimationPreset::tween(
            "slide-fade-left",
            &[("opacity", 0.0), ("x", 50.0)],
            &[("opacity", 1.0), ("x", 0.0)],
            600.0,
        ),
        AnimationPreset::tween(
            "slide-fade-right",
            &[("opacity", 0.0), ("x", -50.0)],
            &[("opacity", 1.0), ("x", 0.0)],
            600.0,
        ),
        AnimationPreset::tween(
            "scale-fade-in",
            &[("opacity", 0.0), ("scale", 1.1)],
            &[("opacity", 1.0), ("scale", 1.0)],
            700.0,
        ),
        AnimationPreset::tween(
            "zoom-in",
            &[("opacity", 0.0), ("scale", 0.8)],
            &[("opacity", 1.0), ("scale", 1.0)],
            600.0,
        ),
        AnimationPreset::tween(
            "blur-in",
            &[("opacity", 0.0), ("blur", 10.0)],
            &[("opacity", 1.0), ("blur", 0.0)],
            800.0,
        ),
        AnimationPreset::tween(
            "blur-fade-in",
            &[("opacity", 0.0), ("blur", 10.0)],
            &[("opacity", 1.0), ("blur", 0.0)],
            800.0,
        ),
        AnimationPreset::tween(
            "rotate-fade-in",
            &[("opacity", 0.0), ("rotate", -10.0), ("scale", 0.9)],
            &[("opacity", 1.0), ("rotate", 0.0), ("scale", 1.0)],
            700.0,
        ),
        AnimationPreset::spring(
            "spring-pop",
            &[("opacity", 0.0), ("scale", 0.6)],
            &[("opacity", 1.0), ("scale", 1.0)],
            200.0,
            15.0,
        ),
    ]
}

fn builtin_hover() -> Vec<AnimationPreset> {
    vec![
        AnimationPreset::tween("lift", &[], &[("y", -5.0)], HOVER_DURATION_MS),
        AnimationPreset::tween("grow", &[], &[("scale", 1.05)], HOVER_DURATION_MS),
        AnimationPreset::tween("glow", &[], &[("brightness", 1.1)], HOVER_DURATION_MS),
        AnimationPreset::tween("spring", &[], &[("scale", 1.08)], HOVER_DURATION_MS),
    ]
}
