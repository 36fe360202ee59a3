//! # Tween 模块
//!
//! 补间实例定义。
//!
//! 核心设计：补间只关注属性值的时间轴变化，不假设元素类型。
//! 起始值在补间真正开始（延迟结束）时才捕获，和 GSAP 的懒初始化一致。

use std::collections::BTreeMap;

use invitation_runtime::schema::{AnimationProperties, PropertyValue};
use invitation_runtime::style::parse_hex;

use super::easing::Easing;

/// 补间 ID
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TweenId(pub u64);

impl TweenId {
    pub fn new(id: u64) -> Self {
        Self(id)
    }
}

impl std::fmt::Display for TweenId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "tween#{}", self.0)
    }
}

/// 已编译的补间描述（时间单位 ms）
#[derive(Debug, Clone, PartialEq)]
pub struct TweenSpec {
    /// 目标元素 id
    pub target: String,
    /// 显式起始值，缺省时取当前值
    pub from: Option<AnimationProperties>,
    pub to: AnimationProperties,
    pub delay_ms: f64,
    /// 单次播放时长
    pub duration_ms: f64,
    pub easing: Easing,
    /// 播放次数，`None` 表示无限
    pub iterations: Option<u32>,
    /// 往返播放（奇数次正向，偶数次反向）
    pub yoyo: bool,
}

impl TweenSpec {
    pub fn new(target: impl Into<String>, to: AnimationProperties, duration_ms: f64) -> Self {
        Self {
            target: target.into(),
            from: None,
            to,
            delay_ms: 0.0,
            duration_ms: duration_ms.max(0.0),
            easing: Easing::default(),
            iterations: Some(1),
            yoyo: false,
        }
    }

    /// 立即设置（零时长）
    pub fn set(target: impl Into<String>, properties: AnimationProperties) -> Self {
        Self::new(target, properties, 0.0)
    }

    pub fn with_from(mut self, from: AnimationProperties) -> Self {
        self.from = Some(from);
        self
    }

    pub fn with_delay(mut self, delay_ms: f64) -> Self {
        self.delay_ms = delay_ms.max(0.0);
        self
    }

    pub fn with_easing(mut self, easing: Easing) -> Self {
        self.easing = easing;
        self
    }

    /// 总播放时长（不含延迟），无限循环时为 `f64::INFINITY`
    pub fn active_ms(&self) -> f64 {
        match self.iterations {
            Some(n) => self.duration_ms * f64::from(n.max(1)),
            None if self.duration_ms > 0.0 => f64::INFINITY,
            None => 0.0,
        }
    }

    /// 从时间线起点到结束的总时长（含延迟）
    pub fn span_ms(&self) -> f64 {
        self.delay_ms + self.active_ms()
    }

    /// 最后一次播放是否停在起点
    fn ends_at_start(&self) -> bool {
        self.yoyo && matches!(self.iterations, Some(n) if n.max(1) % 2 == 0)
    }

    /// 收敛为"立即设置到终态"（减弱动效）
    pub fn collapse_to_end(&mut self) {
        self.delay_ms = 0.0;
        self.duration_ms = 0.0;
        self.iterations = Some(1);
        self.yoyo = false;
    }
}

/// 补间状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TweenState {
    /// 等待开始（有延迟）
    #[default]
    Pending,
    /// 正在播放
    Playing,
    /// 已完成
    Completed,
    /// 已被取消（停在当前值）
    Killed,
}

impl TweenState {
    /// 是否为活跃状态（需要更新）
    pub fn is_active(&self) -> bool {
        matches!(self, Self::Pending | Self::Playing)
    }

    /// 是否已结束
    pub fn is_finished(&self) -> bool {
        matches!(self, Self::Completed | Self::Killed)
    }
}

/// 补间实例
#[derive(Debug, Clone)]
pub struct Tween {
    pub id: TweenId,
    pub spec: TweenSpec,
    pub state: TweenState,
    /// 开始时捕获的起始值
    start: BTreeMap<String, PropertyValue>,
    /// 自创建以来经过的时间（含延迟）
    clock: f64,
}

impl Tween {
    pub fn new(id: TweenId, spec: TweenSpec) -> Self {
        Self {
            id,
            spec,
            state: TweenState::Pending,
            start: BTreeMap::new(),
            clock: 0.0,
        }
    }

    /// 推进时间
    ///
    /// # 返回
    /// - `true`: 本次推进中离开了延迟阶段，调用方需要先 [`Tween::begin`] 再采样
    pub fn advance(&mut self, dt_ms: f64) -> bool {
        if !self.state.is_active() {
            return false;
        }

        self.clock += dt_ms.max(0.0);
        let mut started = false;

        if self.state == TweenState::Pending && self.clock >= self.spec.delay_ms {
            self.state = TweenState::Playing;
            started = true;
        }

        if self.state == TweenState::Playing && self.clock - self.spec.delay_ms >= self.spec.active_ms() {
            self.state = TweenState::Completed;
        }

        started
    }

    /// 捕获起始值
    ///
    /// 优先使用显式 `from`，其次是目标当前值，最后是属性默认值。
    pub fn begin(&mut self, current: impl Fn(&str) -> Option<PropertyValue>) {
        self.start = self
            .spec
            .to
            .keys()
            .map(|property| {
                let explicit = self
                    .spec
                    .from
                    .as_ref()
                    .and_then(|from| from.get(property))
                    .cloned();
                let value = explicit
                    .or_else(|| current(property))
                    .unwrap_or_else(|| default_value(property));
                (property.clone(), value)
            })
            .collect();
    }

    /// 当前进度（已应用缓动）
    fn eased_progress(&self) -> f64 {
        match self.state {
            TweenState::Pending => 0.0,
            TweenState::Completed => {
                if self.spec.ends_at_start() {
                    0.0
                } else {
                    1.0
                }
            }
            TweenState::Playing | TweenState::Killed => {
                let duration = self.spec.duration_ms;
                if duration <= 0.0 {
                    return 1.0;
                }
                let active = (self.clock - self.spec.delay_ms).max(0.0);
                let cycle = (active / duration).floor();
                let raw = (active - cycle * duration) / duration;
                let forward = !(self.spec.yoyo && cycle as u64 % 2 == 1);
                if forward {
                    self.spec.easing.apply(raw)
                } else {
                    self.spec.easing.apply(1.0 - raw)
                }
            }
        }
    }

    /// 采样当前属性值
    pub fn sample(&self) -> Vec<(String, PropertyValue)> {
        let progress = self.eased_progress();
        self.spec
            .to
            .iter()
            .map(|(property, to)| {
                let from = self
                    .start
                    .get(property)
                    .cloned()
                    .unwrap_or_else(|| default_value(property));
                (property.clone(), interpolate_value(&from, to, progress))
            })
            .collect()
    }

    /// 跳到终点
    pub fn complete(&mut self) {
        if self.state.is_active() {
            self.state = TweenState::Completed;
        }
    }

    /// 停在当前值
    pub fn kill(&mut self) {
        if self.state.is_active() {
            self.state = TweenState::Killed;
        }
    }
}

/// 属性的默认值：opacity / scale 为 1，其余为 0
pub fn default_value(property: &str) -> PropertyValue {
    match property {
        "opacity" | "scale" | "scaleX" | "scaleY" => PropertyValue::Number(1.0),
        _ => PropertyValue::Number(0.0),
    }
}

/// 拆分数值和单位：`"50%"` → `(50, "%")`
fn numeric_parts(value: &PropertyValue) -> Option<(f64, String)> {
    match value {
        PropertyValue::Number(n) => Some((*n, String::new())),
        PropertyValue::Text(text) => {
            let text = text.trim();
            let split = text
                .find(|c: char| !(c.is_ascii_digit() || c == '.' || c == '-' || c == '+'))
                .unwrap_or(text.len());
            let number: f64 = text[..split].parse().ok()?;
            Some((number, text[split..].to_string()))
        }
    }
}

fn format_number(value: f64) -> String {
    let rounded = (value * 1000.0).round() / 1000.0;
    if rounded.fract() == 0.0 {
        format!("{}", rounded as i64)
    } else {
        format!("{}", rounded)
    }
}

/// 按进度插值
///
/// 数值（含相同单位的字符串）和 hex 颜色做线性插值，其余值在终点时切换。
pub fn interpolate_value(from: &PropertyValue, to: &PropertyValue, progress: f64) -> PropertyValue {
    if let (PropertyValue::Number(a), PropertyValue::Number(b)) = (from, to) {
        return PropertyValue::Number(a + (b - a) * progress);
    }

    if let (Some((a, unit_a)), Some((b, unit_b))) = (numeric_parts(from), numeric_parts(to)) {
        if unit_a == unit_b || unit_a.is_empty() {
            let value = a + (b - a) * progress;
            return PropertyValue::Text(format!("{}{}", format_number(value), unit_b));
        }
    }

    if let (PropertyValue::Text(a), PropertyValue::Text(b)) = (from, to) {
        if let (Some(ca), Some(cb)) = (parse_hex(a), parse_hex(b)) {
            let channel = |x: u8, y: u8| {
                (f64::from(x) + (f64::from(y) - f64::from(x)) * progress)
                    .round()
                    .clamp(0.0, 255.0) as u8
            };
            return PropertyValue::Text(format!(
                "#{:02x}{:02x}{:02x}",
                channel(ca.0, cb.0),
                channel(ca.1, cb.1),
                channel(ca.2, cb.2)
            ));
        }
    }

    if progress >= 1.0 {
        to.clone()
    } else {
        from.clone()
    }
}
