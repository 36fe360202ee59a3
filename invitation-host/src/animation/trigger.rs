//! # Trigger 模块
//!
//! 运行时事件、触发器匹配，以及把原始输入（滚动位置、指针）转换为事件的观察器。

use invitation_runtime::machine::ANY_STATE;
use invitation_runtime::schema::{GestureKind, ScrollDirection, SwipeDirection, Trigger};

use crate::error::AnimationError;

/// 滑动距离阈值（px）
pub const SWIPE_THRESHOLD_PX: f64 = 50.0;
/// 滑动速度阈值（px/ms）
pub const SWIPE_VELOCITY_THRESHOLD: f64 = 0.3;
/// 长按时长阈值（ms）
pub const LONG_PRESS_MS: f64 = 500.0;
/// 双击间隔（ms）
pub const DOUBLE_TAP_WINDOW_MS: f64 = 300.0;
/// 超过该位移（px）不再视为点击
pub const TAP_SLOP_PX: f64 = 10.0;

/// 滚动阶段
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollPhase {
    /// 向下滚动进入区间
    Enter,
    /// 向下滚动离开区间
    Leave,
    /// 向上滚动重新进入区间
    EnterBack,
    /// 向上滚动离开区间
    LeaveBack,
}

/// 运行时事件
#[derive(Debug, Clone, PartialEq)]
pub enum RuntimeEvent {
    Scroll {
        target: String,
        phase: ScrollPhase,
    },
    Gesture {
        gesture: GestureKind,
        target: String,
        direction: Option<SwipeDirection>,
    },
    Event {
        name: String,
        target: Option<String>,
    },
    State {
        from: String,
        to: String,
    },
    Time {
        elapsed_ms: f64,
    },
}

impl RuntimeEvent {
    pub fn tap(target: impl Into<String>) -> Self {
        RuntimeEvent::Gesture {
            gesture: GestureKind::Tap,
            target: target.into(),
            direction: None,
        }
    }

    pub fn event(name: impl Into<String>) -> Self {
        RuntimeEvent::Event {
            name: name.into(),
            target: None,
        }
    }

    pub fn state(from: impl Into<String>, to: impl Into<String>) -> Self {
        RuntimeEvent::State {
            from: from.into(),
            to: to.into(),
        }
    }

    /// 事件发生在哪个元素上
    pub fn target(&self) -> Option<&str> {
        match self {
            RuntimeEvent::Scroll { target, .. } | RuntimeEvent::Gesture { target, .. } => {
                Some(target)
            }
            RuntimeEvent::Event { target, .. } => target.as_deref(),
            RuntimeEvent::State { .. } | RuntimeEvent::Time { .. } => None,
        }
    }

    /// 稳定描述，用于历史记录
    pub fn signature(&self) -> String {
        match self {
            RuntimeEvent::Scroll { target, phase } => format!("scroll:{}:{:?}", target, phase),
            RuntimeEvent::Gesture {
                gesture, target, ..
            } => format!("gesture:{:?}:{}", gesture, target),
            RuntimeEvent::Event { name, target } => {
                format!("event:{}:{}", name, target.as_deref().unwrap_or(""))
            }
            RuntimeEvent::State { from, to } => format!("state:{}:{}", from, to),
            RuntimeEvent::Time { elapsed_ms } => format!("time:{}", elapsed_ms),
        }
    }
}

/// 目标匹配，支持 `photo-*` 前缀通配
pub fn target_matches(pattern: &str, actual: &str) -> bool {
    if pattern.contains('*') {
        actual.starts_with(&pattern.replace('*', ""))
    } else {
        pattern == actual
    }
}

/// 判断事件是否满足触发器
pub fn matches_trigger(trigger: &Trigger, event: &RuntimeEvent) -> bool {
    match (trigger, event) {
        (Trigger::Scroll(scroll), RuntimeEvent::Scroll { target, phase }) => {
            let target_ok = scroll
                .target
                .as_deref()
                .is_none_or(|expected| target_matches(expected, target));
            let back_allowed = matches!(scroll.direction, ScrollDirection::Up | ScrollDirection::Both);
            let phase_ok = match phase {
                ScrollPhase::Enter => scroll.enter != Some(false),
                ScrollPhase::Leave => scroll.leave == Some(true),
                ScrollPhase::EnterBack => back_allowed,
                ScrollPhase::LeaveBack => false,
            };
            target_ok && phase_ok
        }
        (
            Trigger::Gesture(expected),
            RuntimeEvent::Gesture {
                gesture,
                target,
                direction,
            },
        ) => {
            let direction_ok = match (expected.direction, direction) {
                (None, _) => true,
                (Some(declared), Some(actual)) => declared.covers(*actual),
                (Some(_), None) => false,
            };
            expected.gesture == *gesture && target_matches(&expected.target, target) && direction_ok
        }
        (Trigger::Event(expected), RuntimeEvent::Event { name, target }) => {
            expected.event == *name
                && expected
                    .target
                    .as_deref()
                    .is_none_or(|t| target.as_deref() == Some(t))
        }
        (Trigger::State(expected), RuntimeEvent::State { from, to }) => {
            let from_ok = expected
                .from
                .as_deref()
                .is_none_or(|f| f == ANY_STATE || f == from);
            expected.to == *to && from_ok
        }
        (Trigger::Time(time), RuntimeEvent::Time { elapsed_ms }) => *elapsed_ms >= time.delay,
        _ => false,
    }
}

// =============================================================================
// 滚动
// =============================================================================

/// 滚动位置的一侧：百分比或像素
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ScrollEdge {
    Percent(f64),
    Pixels(f64),
}

impl ScrollEdge {
    fn parse(token: &str) -> Option<Self> {
        match token {
            "top" | "left" => Some(ScrollEdge::Percent(0.0)),
            "center" => Some(ScrollEdge::Percent(50.0)),
            "bottom" | "right" => Some(ScrollEdge::Percent(100.0)),
            _ => {
                if let Some(percent) = token.strip_suffix('%') {
                    percent.parse().ok().map(ScrollEdge::Percent)
                } else {
                    token
                        .strip_suffix("px")
                        .unwrap_or(token)
                        .parse()
                        .ok()
                        .map(ScrollEdge::Pixels)
                }
            }
        }
    }

    fn resolve(self, length: f64) -> f64 {
        match self {
            ScrollEdge::Percent(p) => length * p / 100.0,
            ScrollEdge::Pixels(px) => px,
        }
    }
}

/// 滚动位置：`"<元素边> <视口边>"`，如 `"top 80%"` 表示元素顶部到达视口 80% 处
///
/// 只有一个词时视为视口边，元素边取 `top`。
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScrollPosition {
    pub element: ScrollEdge,
    pub viewport: ScrollEdge,
}

impl ScrollPosition {
    pub fn parse(value: &str) -> Result<Self, AnimationError> {
        let invalid = || AnimationError::InvalidScrollPosition {
            value: value.to_string(),
        };

        let tokens: Vec<&str> = value.split_whitespace().collect();
        let (element, viewport) = match tokens.as_slice() {
            [viewport] => (ScrollEdge::Percent(0.0), ScrollEdge::parse(viewport)),
            [element, viewport] => (
                ScrollEdge::parse(element).ok_or_else(invalid)?,
                ScrollEdge::parse(viewport),
            ),
            _ => return Err(invalid()),
        };

        Ok(Self {
            element,
            viewport: viewport.ok_or_else(invalid)?,
        })
    }

    /// 元素上的参考点是否已经越过视口上的参考点
    ///
    /// `element_top` 为元素顶部相对视口顶部的距离。
    pub fn reached(&self, element_top: f64, element_height: f64, viewport_height: f64) -> bool {
        element_top + self.element.resolve(element_height) <= self.viewport.resolve(viewport_height)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ScrollRegion {
    Before,
    Active,
    After,
}

/// 滚动观察器：跟踪元素相对区间 `[start, end]` 的位置，输出阶段变化
#[derive(Debug, Clone, PartialEq)]
pub struct ScrollObserver {
    start: ScrollPosition,
    end: ScrollPosition,
    region: ScrollRegion,
}

impl ScrollObserver {
    /// 默认结束位置：元素底部离开视口顶部
    pub const DEFAULT_END: &'static str = "bottom top";

    pub fn new(start: &str, end: Option<&str>) -> Result<Self, AnimationError> {
        Ok(Self {
            start: ScrollPosition::parse(start)?,
            end: ScrollPosition::parse(end.unwrap_or(Self::DEFAULT_END))?,
            region: ScrollRegion::Before,
        })
    }

    pub fn is_active(&self) -> bool {
        self.region == ScrollRegion::Active
    }

    /// 根据新的几何信息更新，返回本次产生的阶段（按发生顺序）
    pub fn update(
        &mut self,
        element_top: f64,
        element_height: f64,
        viewport_height: f64,
    ) -> Vec<ScrollPhase> {
        let region = if !self.start.reached(element_top, element_height, viewport_height) {
            ScrollRegion::Before
        } else if self.end.reached(element_top, element_height, viewport_height) {
            ScrollRegion::After
        } else {
            ScrollRegion::Active
        };

        let phases = match (self.region, region) {
            (ScrollRegion::Before, ScrollRegion::Active) => vec![ScrollPhase::Enter],
            (ScrollRegion::Before, ScrollRegion::After) => {
                vec![ScrollPhase::Enter, ScrollPhase::Leave]
            }
            (ScrollRegion::Active, ScrollRegion::After) => vec![ScrollPhase::Leave],
            (ScrollRegion::After, ScrollRegion::Active) => vec![ScrollPhase::EnterBack],
            (ScrollRegion::After, ScrollRegion::Before) => {
                vec![ScrollPhase::EnterBack, ScrollPhase::LeaveBack]
            }
            (ScrollRegion::Active, ScrollRegion::Before) => vec![ScrollPhase::LeaveBack],
            _ => Vec::new(),
        };

        self.region = region;
        phases
    }
}

// =============================================================================
// 指针手势
// =============================================================================

/// 一次完整的指针按下 → 抬起
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerStroke {
    /// 按下时刻（ms）
    pub start_ms: f64,
    /// 抬起时刻（ms）
    pub end_ms: f64,
    pub dx: f64,
    pub dy: f64,
}

/// 手势识别器：把指针轨迹转换为手势
#[derive(Debug, Clone, Default)]
pub struct GestureRecognizer {
    /// 上一次单击的抬起时刻
    last_tap_ms: Option<f64>,
}

impl GestureRecognizer {
    pub fn new() -> Self {
        Self::default()
    }

    /// 识别一次指针操作
    ///
    /// 同一次操作可能同时产生 tap 和 double-tap。
    pub fn recognize(&mut self, stroke: PointerStroke) -> Vec<(GestureKind, Option<SwipeDirection>)> {
        let elapsed = (stroke.end_ms - stroke.start_ms).max(0.0);
        let distance = stroke.dx.hypot(stroke.dy);

        if distance > TAP_SLOP_PX {
            self.last_tap_ms = None;
            return swipe_direction(stroke, elapsed)
                .map(|direction| vec![(GestureKind::Swipe, Some(direction))])
                .unwrap_or_default();
        }

        if elapsed >= LONG_PRESS_MS {
            self.last_tap_ms = None;
            return vec![(GestureKind::LongPress, None)];
        }

        let mut gestures = vec![(GestureKind::Tap, None)];
        match self.last_tap_ms {
            Some(last) if stroke.end_ms - last <= DOUBLE_TAP_WINDOW_MS => {
                gestures.push((GestureKind::DoubleTap, None));
                self.last_tap_ms = None;
            }
            _ => self.last_tap_ms = Some(stroke.end_ms),
        }
        gestures
    }
}

fn swipe_direction(stroke: PointerStroke, elapsed_ms: f64) -> Option<SwipeDirection> {
    let distance = stroke.dx.hypot(stroke.dy);
    let velocity = distance / elapsed_ms.max(1.0);
    if velocity < SWIPE_VELOCITY_THRESHOLD {
        return None;
    }

    if stroke.dx.abs() > stroke.dy.abs() {
        (stroke.dx.abs() > SWIPE_THRESHOLD_PX).then_some(if stroke.dx > 0.0 {
            SwipeDirection::Right
        } else {
            SwipeDirection::Left
        })
    } else {
        (stroke.dy.abs() > SWIPE_THRESHOLD_PX).then_some(if stroke.dy > 0.0 {
            SwipeDirection::Down
        } else {
            SwipeDirection::Up
        })
    }
}
