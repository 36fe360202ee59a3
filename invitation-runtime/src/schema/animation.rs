//! 动画、触发器、交互与状态机的数据模型
//!
//! 这里的类型全部是纯数据，不产生任何副作用；
//! 由 host 侧的动画运行时解释执行。

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::Element;

// =============================================================================
// 全局设置
// =============================================================================

/// 动画情绪，决定默认速度和缓动
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnimationMood {
    Minimal,
    Subtle,
    #[default]
    Elegant,
    Playful,
    Dramatic,
    Cinematic,
}

/// 减弱动效策略
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReducedMotionPolicy {
    /// 跟随宿主环境
    #[default]
    System,
    Always,
    Never,
}

impl ReducedMotionPolicy {
    /// 结合宿主环境偏好得出最终结果
    pub fn resolve(self, environment_prefers_reduced: bool) -> bool {
        match self {
            ReducedMotionPolicy::System => environment_prefers_reduced,
            ReducedMotionPolicy::Always => true,
            ReducedMotionPolicy::Never => false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FloatingPosition {
    #[default]
    Fixed,
    Sticky,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FloatingAnchor {
    TopLeft,
    TopRight,
    BottomLeft,
    #[default]
    BottomRight,
    Center,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct FloatingOffset {
    #[serde(default)]
    pub x: f64,
    #[serde(default)]
    pub y: f64,
}

/// 浮动元素，独立于 block 流，绘制在最上层
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FloatingElement {
    pub id: String,
    pub element: Element,
    #[serde(default)]
    pub position: FloatingPosition,
    #[serde(default)]
    pub anchor: FloatingAnchor,
    #[serde(default)]
    pub offset: FloatingOffset,
}

/// 文档级动画设置
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GlobalAnimation {
    #[serde(default)]
    pub mood: AnimationMood,
    /// 全局速度倍率
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub speed: Option<f64>,
    #[serde(default)]
    pub reduced_motion: ReducedMotionPolicy,
    /// 自定义缓动别名：名字 → 缓动表达式
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub easing_presets: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub interactions: Vec<Interaction>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub state_machines: Vec<AnimationStateMachine>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub floating_elements: Vec<FloatingElement>,
}

// =============================================================================
// Block / Element 动画配置
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EntranceAnimation {
    /// 动画预设 id（如 `fade-slide-up`）
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preset: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom: Option<AnimationAction>,
    /// ms
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delay: Option<f64>,
    /// ms
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScrollAnimation {
    pub trigger: ScrollTrigger,
    pub action: AnimationAction,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HoverAnimation {
    /// 预设 id 或显式动作，二选一
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preset: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action: Option<AnimationAction>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LoopDirection {
    #[default]
    Normal,
    Alternate,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoopAnimation {
    pub action: AnimationAction,
    /// -1 表示无限循环
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iterations: Option<i32>,
    #[serde(default)]
    pub direction: LoopDirection,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BlockAnimationConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entrance: Option<EntranceAnimation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scroll: Option<ScrollAnimation>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub interactions: Vec<Interaction>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ElementAnimationConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entrance: Option<EntranceAnimation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hover: Option<HoverAnimation>,
    #[serde(rename = "loop", default, skip_serializing_if = "Option::is_none")]
    pub looping: Option<LoopAnimation>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub interactions: Vec<Interaction>,
}

// =============================================================================
// 触发器
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScrollDirection {
    Down,
    Up,
    #[default]
    Both,
}

/// 滚动触发器
///
/// `start` / `end` 形如 `"top 80%"`：前半是元素边缘，后半是视口位置。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScrollTrigger {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,
    pub start: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end: Option<String>,
    #[serde(default)]
    pub direction: ScrollDirection,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enter: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub leave: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub once: Option<bool>,
}

impl ScrollTrigger {
    pub fn new(start: impl Into<String>) -> Self {
        Self {
            target: None,
            start: start.into(),
            end: None,
            direction: ScrollDirection::Both,
            enter: None,
            leave: None,
            once: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum GestureKind {
    Tap,
    DoubleTap,
    LongPress,
    Swipe,
    Pinch,
    Drag,
    Hover,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SwipeDirection {
    Left,
    Right,
    Up,
    Down,
    Horizontal,
    Vertical,
}

impl SwipeDirection {
    /// 声明的方向是否覆盖实际发生的方向
    pub fn covers(self, actual: SwipeDirection) -> bool {
        match self {
            SwipeDirection::Horizontal => {
                matches!(actual, SwipeDirection::Left | SwipeDirection::Right)
            }
            SwipeDirection::Vertical => matches!(actual, SwipeDirection::Up | SwipeDirection::Down),
            declared => declared == actual,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GestureTrigger {
    pub gesture: GestureKind,
    /// 元素 id，支持 `photo-*` 前缀通配
    pub target: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub direction: Option<SwipeDirection>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventTrigger {
    pub event: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StateTrigger {
    /// 缺省或 `*` 表示任意来源状态
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from: Option<String>,
    pub to: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeTrigger {
    /// 首次触发延迟（ms）
    pub delay: f64,
    /// 额外重复次数，-1 表示无限
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repeat: Option<i32>,
    /// 重复间隔（ms）
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interval: Option<f64>,
}

/// 触发器
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Trigger {
    Scroll(ScrollTrigger),
    Gesture(GestureTrigger),
    Event(EventTrigger),
    State(StateTrigger),
    Time(TimeTrigger),
}

impl Trigger {
    pub fn kind(&self) -> &'static str {
        match self {
            Trigger::Scroll(_) => "scroll",
            Trigger::Gesture(_) => "gesture",
            Trigger::Event(_) => "event",
            Trigger::State(_) => "state",
            Trigger::Time(_) => "time",
        }
    }

    /// 触发器的稳定描述，用于比较两个触发器是否相同
    pub fn signature(&self) -> String {
        match self {
            Trigger::Scroll(t) => format!(
                "scroll:{}:{}:{}",
                t.target.as_deref().unwrap_or(""),
                t.start,
                t.end.as_deref().unwrap_or("")
            ),
            Trigger::Gesture(t) => format!(
                "gesture:{:?}:{}:{:?}",
                t.gesture, t.target, t.direction
            ),
            Trigger::Event(t) => {
                format!("event:{}:{}", t.event, t.target.as_deref().unwrap_or(""))
            }
            Trigger::State(t) => format!("state:{}:{}", t.from.as_deref().unwrap_or("*"), t.to),
            Trigger::Time(t) => format!("time:{}", t.delay),
        }
    }
}

// =============================================================================
// 动作
// =============================================================================

/// 属性值：数字或字符串（如 `"50%"`、颜色）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PropertyValue {
    Number(f64),
    Text(String),
}

impl PropertyValue {
    pub fn as_number(&self) -> Option<f64> {
        match self {
            PropertyValue::Number(n) => Some(*n),
            PropertyValue::Text(_) => None,
        }
    }
}

impl From<f64> for PropertyValue {
    fn from(value: f64) -> Self {
        PropertyValue::Number(value)
    }
}

impl From<&str> for PropertyValue {
    fn from(value: &str) -> Self {
        PropertyValue::Text(value.to_string())
    }
}

/// 属性名 → 值（opacity、x、y、scale、backgroundColor、`--custom` 等）
pub type AnimationProperties = BTreeMap<String, PropertyValue>;

/// 目标选择器：单个或多个
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TargetSelector {
    One(String),
    Many(Vec<String>),
}

impl Default for TargetSelector {
    fn default() -> Self {
        TargetSelector::One("self".to_string())
    }
}

impl TargetSelector {
    pub fn selectors(&self) -> Vec<&str> {
        match self {
            TargetSelector::One(s) => vec![s.as_str()],
            TargetSelector::Many(list) => list.iter().map(String::as_str).collect(),
        }
    }
}

impl From<&str> for TargetSelector {
    fn from(value: &str) -> Self {
        TargetSelector::One(value.to_string())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TweenDirection {
    #[default]
    Normal,
    Reverse,
    Alternate,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TweenAction {
    #[serde(default)]
    pub target: TargetSelector,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from: Option<AnimationProperties>,
    pub to: AnimationProperties,
    /// ms
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub easing: Option<String>,
    /// ms
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delay: Option<f64>,
    #[serde(default)]
    pub direction: TweenDirection,
    /// -1 表示无限
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iterations: Option<i32>,
}

impl TweenAction {
    pub fn new(target: impl Into<TargetSelector>, to: AnimationProperties) -> Self {
        Self {
            target: target.into(),
            from: None,
            to,
            duration: None,
            easing: None,
            delay: None,
            direction: TweenDirection::Normal,
            iterations: None,
        }
    }

    pub fn with_from(mut self, from: AnimationProperties) -> Self {
        self.from = Some(from);
        self
    }

    pub fn with_duration(mut self, ms: f64) -> Self {
        self.duration = Some(ms);
        self
    }

    pub fn with_easing(mut self, easing: impl Into<String>) -> Self {
        self.easing = Some(easing.into());
        self
    }

    pub fn with_delay(mut self, ms: f64) -> Self {
        self.delay = Some(ms);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpringAction {
    #[serde(default)]
    pub target: TargetSelector,
    pub to: AnimationProperties,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stiffness: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub damping: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mass: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SequenceAction {
    pub steps: Vec<AnimationAction>,
}

/// 时间线轨道偏移：毫秒数，或 `"+=200"` / `"-=100"` / `"prev-end"` / `"prev-start"`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TimelineOffset {
    Millis(f64),
    Label(String),
}

impl Default for TimelineOffset {
    fn default() -> Self {
        TimelineOffset::Millis(0.0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimelineTrack {
    pub action: AnimationAction,
    #[serde(default)]
    pub at: TimelineOffset,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimelineAction {
    pub tracks: Vec<TimelineTrack>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_duration: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StaggerKeyword {
    First,
    Last,
    Center,
    Edges,
}

/// stagger 起点
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StaggerOrigin {
    Index(usize),
    Keyword(StaggerKeyword),
}

impl Default for StaggerOrigin {
    fn default() -> Self {
        StaggerOrigin::Keyword(StaggerKeyword::First)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct StaggerConfig {
    /// 每个目标的延迟增量（ms）
    #[serde(default)]
    pub each: f64,
    #[serde(default)]
    pub from: StaggerOrigin,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StaggerSpec {
    Each(f64),
    Config(StaggerConfig),
}

impl StaggerSpec {
    pub fn config(self) -> StaggerConfig {
        match self {
            StaggerSpec::Each(each) => StaggerConfig {
                each,
                from: StaggerOrigin::default(),
            },
            StaggerSpec::Config(config) => config,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StaggerAction {
    pub targets: TargetSelector,
    /// 对每个目标重复执行的动作（tween 或 spring）
    pub action: Box<AnimationAction>,
    pub stagger: StaggerSpec,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SetAction {
    #[serde(default)]
    pub target: TargetSelector,
    pub properties: AnimationProperties,
}

/// 动画动作
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum AnimationAction {
    Tween(TweenAction),
    Spring(SpringAction),
    Sequence(SequenceAction),
    Timeline(TimelineAction),
    Stagger(StaggerAction),
    Set(SetAction),
    /// 不支持的动作类型（如 path / morph），运行时作为空操作
    #[serde(other)]
    Unsupported,
}

impl AnimationAction {
    pub fn kind(&self) -> &'static str {
        match self {
            AnimationAction::Tween(_) => "tween",
            AnimationAction::Spring(_) => "spring",
            AnimationAction::Sequence(_) => "sequence",
            AnimationAction::Timeline(_) => "timeline",
            AnimationAction::Stagger(_) => "stagger",
            AnimationAction::Set(_) => "set",
            AnimationAction::Unsupported => "unsupported",
        }
    }

    /// 动作树中的动作总数
    pub fn count(&self) -> usize {
        match self {
            AnimationAction::Sequence(s) => 1 + s.steps.iter().map(Self::count).sum::<usize>(),
            AnimationAction::Timeline(t) => {
                1 + t.tracks.iter().map(|tr| tr.action.count()).sum::<usize>()
            }
            AnimationAction::Stagger(s) => 1 + s.action.count(),
            _ => 1,
        }
    }
}

// =============================================================================
// 交互与状态机
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InteractionCondition {
    /// 只在状态机处于该状态时生效
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expression: Option<String>,
}

/// 交互：触发器 + 动作
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Interaction {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub trigger: Trigger,
    pub action: AnimationAction,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condition: Option<InteractionCondition>,
    /// 触发时需要先停止的其它交互 id
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub cancels: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
}

impl Interaction {
    pub fn is_enabled(&self) -> bool {
        self.enabled.unwrap_or(true)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StateDefinition {
    /// 进入状态时立即设置的属性快照
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub properties: Option<BTreeMap<String, AnimationProperties>>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub on_enter: Vec<AnimationAction>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub on_exit: Vec<AnimationAction>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StateTransition {
    /// `*` 表示任意状态
    pub from: String,
    pub to: String,
    pub trigger: Trigger,
    /// 无副作用的守卫表达式：`flag`、`!flag`、`index < 3`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub guard: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub animation: Option<AnimationAction>,
}

/// 动画状态机定义
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnimationStateMachine {
    pub id: String,
    pub initial: String,
    pub states: BTreeMap<String, StateDefinition>,
    #[serde(default)]
    pub transitions: Vec<StateTransition>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_action_variants_parse() {
        let json = r#"{
            "type": "sequence",
            "steps": [
                { "type": "tween", "target": "title", "to": { "opacity": 1 }, "duration": 300 },
                { "type": "set", "target": ["a", "b"], "properties": { "x": "50%" } },
                { "type": "spring", "target": "card", "to": { "scale": 1.2 }, "stiffness": 150 }
            ]
        }"#;
        let action: AnimationAction = serde_json::from_str(json).unwrap();
        assert_eq!(action.kind(), "sequence");
        assert_eq!(action.count(), 4);
        if let AnimationAction::Sequence(seq) = &action {
            if let AnimationAction::Set(set) = &seq.steps[1] {
                assert_eq!(set.target.selectors(), vec!["a", "b"]);
                assert_eq!(set.properties["x"], PropertyValue::Text("50%".to_string()));
            } else {
                panic!("expected set");
            }
        }
    }

    #[test]
    fn test_unknown_action_is_unsupported() {
        let action: AnimationAction =
            serde_json::from_str(r#"{ "type": "morph", "target": "x", "toPath": "M0" }"#).unwrap();
        assert_eq!(action, AnimationAction::Unsupported);
    }

    #[test]
    fn test_trigger_variants_parse() {
        let scroll: Trigger =
            serde_json::from_str(r#"{ "type": "scroll", "start": "top 80%", "once": true }"#)
                .unwrap();
        assert_eq!(scroll.kind(), "scroll");

        let gesture: Trigger = serde_json::from_str(
            r#"{ "type": "gesture", "gesture": "double-tap", "target": "photo-*" }"#,
        )
        .unwrap();
        assert!(matches!(
            gesture,
            Trigger::Gesture(GestureTrigger {
                gesture: GestureKind::DoubleTap,
                ..
            })
        ));

        let state: Trigger =
            serde_json::from_str(r#"{ "type": "state", "to": "open" }"#).unwrap();
        assert_eq!(state.signature(), "state:*:open");
    }

    #[test]
    fn test_stagger_spec_forms() {
        let spec: StaggerSpec = serde_json::from_str("100").unwrap();
        assert_eq!(spec.config().each, 100.0);
        assert_eq!(spec.config().from, StaggerOrigin::Keyword(StaggerKeyword::First));

        let spec: StaggerSpec =
            serde_json::from_str(r#"{ "each": 50, "from": "center" }"#).unwrap();
        assert_eq!(spec.config().from, StaggerOrigin::Keyword(StaggerKeyword::Center));

        let spec: StaggerSpec = serde_json::from_str(r#"{ "each": 50, "from": 2 }"#).unwrap();
        assert_eq!(spec.config().from, StaggerOrigin::Index(2));
    }

    #[test]
    fn test_reduced_motion_policy() {
        assert!(ReducedMotionPolicy::System.resolve(true));
        assert!(!ReducedMotionPolicy::System.resolve(false));
        assert!(ReducedMotionPolicy::Always.resolve(false));
        assert!(!ReducedMotionPolicy::Never.resolve(true));
    }

    #[test]
    fn test_swipe_direction_cover() {
        assert!(SwipeDirection::Horizontal.covers(SwipeDirection::Left));
        assert!(!SwipeDirection::Horizontal.covers(SwipeDirection::Up));
        assert!(SwipeDirection::Up.covers(SwipeDirection::Up));
    }

    #[test]
    fn test_state_machine_parse() {
        let json = r#"{
            "id": "lightbox",
            "initial": "closed",
            "states": {
                "closed": {},
                "open": { "onEnter": [ { "type": "set", "target": "overlay", "properties": { "opacity": 1 } } ] }
            },
            "transitions": [
                { "from": "closed", "to": "open", "trigger": { "type": "gesture", "gesture": "tap", "target": "photo-*" } },
                { "from": "open", "to": "closed", "trigger": { "type": "event", "event": "close" } }
            ]
        }"#;
        let machine: AnimationStateMachine = serde_json::from_str(json).unwrap();
        assert_eq!(machine.states.len(), 2);
        assert_eq!(machine.states["open"].on_enter.len(), 1);
        assert_eq!(machine.transitions.len(), 2);
    }
}
