//! # Schema 模块
//!
//! 邀请函文档的数据模型。所有类型都可以通过 serde 序列化，
//! 字段名使用 camelCase，与持久化的 JSON 文档结构保持一致。
//!
//! ## 层级结构
//!
//! ```text
//! Document
//!  ├── style: StyleSystem        (preset → quick → advanced 三层)
//!  ├── animation: GlobalAnimation (mood / 交互 / 状态机 / 浮动元素)
//!  ├── blocks: Vec<Block>         (数组顺序即显示顺序)
//!  │    └── elements: Vec<Element> (group 可嵌套 children)
//!  └── data: WeddingData          (绑定数据)
//! ```
//!
//! 文档在一次渲染过程中是只读快照，所有编辑都产生新的 `Document` 值。

pub mod animation;
pub mod block;
pub mod data;
pub mod document;
pub mod element;
pub mod layout;
pub mod style;

pub use animation::{
    AnimationAction, AnimationMood, AnimationProperties, AnimationStateMachine,
    BlockAnimationConfig, ElementAnimationConfig, EntranceAnimation, EventTrigger,
    FloatingAnchor, FloatingElement, FloatingOffset, FloatingPosition, GestureKind, GestureTrigger,
    GlobalAnimation, HoverAnimation, Interaction, InteractionCondition, LoopAnimation,
    LoopDirection, PropertyValue, ReducedMotionPolicy, ScrollAnimation, ScrollDirection,
    ScrollTrigger, SequenceAction, SetAction, SpringAction, StaggerAction, StaggerConfig,
    StaggerKeyword, StaggerOrigin, StaggerSpec, StateDefinition, StateTransition, StateTrigger, SwipeDirection,
    TargetSelector, TimeTrigger, TimelineAction, TimelineOffset, TimelineTrack, Trigger,
    TweenAction, TweenDirection,
};
pub use block::{Block, BlockHeight, BlockStyleOverride, BlockType, PaddingValue};
pub use data::WeddingData;
pub use document::{Document, DocumentMeta, SUPPORTED_SCHEMA_VERSION};
pub use element::{BorderStyle, Element, ElementStyle, ElementType, TextAlign, TextStyle};
pub use layout::{
    AlignItems, AlignSelf, BlockLayout, ElementConstraints, ElementSizing, JustifyContent,
    LayoutDirection, LayoutMode, Padding, SizeMode, SizeUnit,
};
pub use style::{
    AdvancedStyleConfig, BlockMode, BlockThemeConfig, BlockThemeMode, ColorValue,
    EffectsConfig, EffectsCustom, FontStacks, FontWeights, GradientKind, GradientStop,
    GradientValue, Inversion, InversionKind, QuickStyleConfig, StyleSystem, TypographyConfig,
    TypographyCustom,
};
