//! # Animation 模块
//!
//! 声明式动画运行时：把文档中的动作树编译成引擎上的补间，并在事件驱动下触发。
//!
//! ## 核心设计理念
//!
//! 动画系统分三层：
//! - **编译**：`AnimationAction` → 带绝对延迟的 [`TweenSpec`] 列表
//! - **引擎**：只负责时间轴与属性当前值，通过 [`AnimationEngine`] 替换
//! - **触发**：[`TriggerRegistry`] 按作用域收集订阅，[`TriggerCleanup`] 显式注销
//!
//! ## 核心概念
//!
//! - [`AnimationRuntime`]：运行时入口，持有引擎与注册表
//! - [`ActionHandle`]：一次动作的组合取消句柄
//! - [`StateMachineInstance`]：多状态交互流程
//! - [`AnimationPresetRegistry`]：入场 / 悬停预设
//!
//! ## 使用示例
//!
//! ```rust,ignore
//! let mut runtime = AnimationRuntime::headless(AnimationSettings::default());
//!
//! // 立即返回，时间在 tick 中推进
//! let handle = runtime.apply_action(&action, &ActionContext::new("hero-title"));
//! runtime.tick(16.0);
//!
//! // 停在当前值
//! handle.cancel();
//! ```

mod compile;
mod easing;
mod engine;
mod handle;
mod mood;
mod presets;
mod registry;
mod runtime;
mod state_machine;
mod trigger;
mod tween;

pub use compile::{ActionContext, CompiledAction, compile, resolve_targets, spring_parameters};
pub use easing::{EaseMode, Easing};
pub use engine::{AnimationEngine, EngineEvent, SharedEngine, TimelineEngine};
pub use handle::ActionHandle;
pub use mood::{AnimationSettings, DurationKind, mood_easing, mood_multiplier};
pub use presets::{AnimationPreset, AnimationPresetRegistry, PresetMotion};
pub use registry::{Firing, InteractionInfo, RegistrationId, TriggerCleanup, TriggerRegistry};
pub use runtime::AnimationRuntime;
pub use state_machine::StateMachineInstance;
pub use trigger::{
    GestureRecognizer, PointerStroke, RuntimeEvent, ScrollEdge, ScrollObserver, ScrollPhase,
    ScrollPosition, matches_trigger, target_matches,
};
pub use tween::{TweenId, TweenSpec, TweenState};
