//! # Host 层
//!
//! 邀请函渲染器的宿主层实现：把文档渲染为节点树，并驱动声明式动画。
//!
//! ## 架构说明
//!
//! Host 层负责：
//! - 文档 / block / 元素渲染
//! - 动画引擎、触发器注册与状态机
//! - 渲染器配置
//!
//! 数据模型、绑定解析、样式与尺寸计算都在 `invitation-runtime` 中，
//! Host 层只负责把它们组合成可挂载的结果。

pub mod animation;
pub mod config;
pub mod error;
pub mod renderer;

pub use animation::{
    ActionContext, ActionHandle, AnimationEngine, AnimationPresetRegistry, AnimationRuntime,
    AnimationSettings, RuntimeEvent, StateMachineInstance, TimelineEngine, TriggerCleanup,
};
pub use config::{ConfigError, RendererConfig};
pub use error::{AnimationError, RenderError};
pub use renderer::{
    DocumentRenderer, LeafRegistry, LeafRenderer, NodeKind, RenderedDocument, VisualNode,
    render_block,
};
