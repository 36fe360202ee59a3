//! # Engine 模块
//!
//! 动画引擎接口与默认的时间线实现。
//!
//! ## 设计理念
//!
//! 引擎只负责：
//! 1. 管理时间轴：知道某个属性从 A 到 B 需要在 duration 内变化
//! 2. 维护每个目标的当前属性值，供渲染侧查询
//! 3. 不假设目标类型：元素自己决定如何使用这些值
//!
//! 运行时通过 [`AnimationEngine`] trait 访问引擎，宿主可以替换为真实的渲染后端。

use std::cell::RefCell;
use std::collections::{BTreeMap, HashMap};
use std::rc::Rc;

use invitation_runtime::schema::{AnimationProperties, PropertyValue};

use super::tween::{Tween, TweenId, TweenSpec, TweenState};

/// 引擎事件
#[derive(Debug, Clone, PartialEq)]
pub enum EngineEvent {
    /// 补间开始（延迟结束）
    Started(TweenId),
    /// 补间完成
    Completed(TweenId),
    /// 补间被取消
    Killed(TweenId),
}

/// 动画引擎接口
pub trait AnimationEngine {
    /// 启动补间，立即返回 ID
    fn start_tween(&mut self, spec: TweenSpec) -> TweenId;

    /// 立即设置属性（不经过动画）
    fn set(&mut self, target: &str, properties: &AnimationProperties);

    /// 停止补间，属性停在当前值
    fn kill(&mut self, id: TweenId);

    /// 让补间立即跳到终点
    fn complete(&mut self, id: TweenId);

    /// 停止目标上的所有补间
    fn kill_target(&mut self, target: &str);

    /// 停止所有补间
    fn kill_all(&mut self);

    /// 补间是否仍在运行（等待或播放中）
    fn is_active(&self, id: TweenId) -> bool;

    /// 推进时间（ms），返回产生的事件
    fn advance(&mut self, dt_ms: f64) -> Vec<EngineEvent>;

    /// 查询目标属性的当前值
    fn value(&self, target: &str, property: &str) -> Option<PropertyValue>;

    /// 活跃补间数量
    fn active_count(&self) -> usize;
}

/// 共享的引擎句柄（单线程）
pub type SharedEngine = Rc<RefCell<dyn AnimationEngine>>;

/// 默认引擎：按帧推进的时间线
///
/// 补间按创建顺序更新，同一属性上后创建的补间覆盖先创建的。
pub struct TimelineEngine {
    tweens: BTreeMap<TweenId, Tween>,
    /// 目标 id → 属性 → 当前值
    values: HashMap<String, BTreeMap<String, PropertyValue>>,
    next_id: u64,
    /// 自创建以来推进的总时间
    elapsed_ms: f64,
}

impl Default for TimelineEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for TimelineEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TimelineEngine")
            .field("tweens", &self.tweens.len())
            .field("targets", &self.values.len())
            .field("elapsed_ms", &self.elapsed_ms)
            .finish()
    }
}

impl TimelineEngine {
    pub fn new() -> Self {
        Self {
            tweens: BTreeMap::new(),
            values: HashMap::new(),
            next_id: 1,
            elapsed_ms: 0.0,
        }
    }

    /// 包装为共享句柄
    pub fn shared() -> Rc<RefCell<TimelineEngine>> {
        Rc::new(RefCell::new(Self::new()))
    }

    fn next_tween_id(&mut self) -> TweenId {
        let id = TweenId::new(self.next_id);
        self.next_id += 1;
        id
    }

    /// 目标的全部当前属性
    pub fn values_of(&self, target: &str) -> Option<&BTreeMap<String, PropertyValue>> {
        self.values.get(target)
    }

    pub fn elapsed_ms(&self) -> f64 {
        self.elapsed_ms
    }

    fn write(&mut self, target: &str, samples: Vec<(String, PropertyValue)>) {
        let entry = self.values.entry(target.to_string()).or_default();
        for (property, value) in samples {
            entry.insert(property, value);
        }
    }

    /// 推进单个补间并写回属性
    fn step(&mut self, id: TweenId, dt_ms: f64, events: &mut Vec<EngineEvent>) {
        let Some(tween) = self.tweens.get_mut(&id) else {
            return;
        };

        let started = tween.advance(dt_ms);
        if started {
            let values = self.values.get(&tween.spec.target);
            tween.begin(|property| values.and_then(|v| v.get(property)).cloned());
            events.push(EngineEvent::Started(id));
        }

        if tween.state != TweenState::Pending {
            let target = tween.spec.target.clone();
            let samples = tween.sample();
            let finished = tween.state == TweenState::Completed;
            self.write(&target, samples);
            if finished {
                events.push(EngineEvent::Completed(id));
            }
        }
    }

    fn remove_finished(&mut self) {
        self.tweens.retain(|_, tween| tween.state.is_active());
    }
}

impl AnimationEngine for TimelineEngine {
    fn start_tween(&mut self, spec: TweenSpec) -> TweenId {
        let id = self.next_tween_id();
        self.tweens.insert(id, Tween::new(id, spec));

        // 无延迟的补间立即渲染首帧（零时长时直接到终点）
        let mut events = Vec::new();
        self.step(id, 0.0, &mut events);
        self.remove_finished();
        id
    }

    fn set(&mut self, target: &str, properties: &AnimationProperties) {
        let samples = properties
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        self.write(target, samples);
    }

    fn kill(&mut self, id: TweenId) {
        if let Some(tween) = self.tweens.get_mut(&id) {
            tween.kill();
        }
        self.tweens.remove(&id);
    }

    fn complete(&mut self, id: TweenId) {
        let Some(tween) = self.tweens.get_mut(&id) else {
            return;
        };

        if tween.state == TweenState::Pending {
            let values = self.values.get(&tween.spec.target);
            tween.begin(|property| values.and_then(|v| v.get(property)).cloned());
        }
        tween.complete();

        let target = tween.spec.target.clone();
        let samples = tween.sample();
        self.write(&target, samples);
        self.tweens.remove(&id);
    }

    fn kill_target(&mut self, target: &str) {
        self.tweens.retain(|_, tween| tween.spec.target != target);
    }

    fn kill_all(&mut self) {
        self.tweens.clear();
    }

    fn is_active(&self, id: TweenId) -> bool {
        self.tweens
            .get(&id)
            .is_some_and(|tween| tween.state.is_active())
    }

    fn advance(&mut self, dt_ms: f64) -> Vec<EngineEvent> {
        self.elapsed_ms += dt_ms.max(0.0);

        let mut events = Vec::new();
        let ids: Vec<TweenId> = self.tweens.keys().copied().collect();
        for id in ids {
            self.step(id, dt_ms, &mut events);
        }
        self.remove_finished();
        events
    }

    fn value(&self, target: &str, property: &str) -> Option<PropertyValue> {
        self.values.get(target)?.get(property).cloned()
    }

    fn active_count(&self) -> usize {
        self.tweens.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::animation::easing::Easing;

    fn props(pairs: &[(&str, f64)]) -> AnimationProperties {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), PropertyValue::Number(*v)))
            .collect()
    }

    fn number(engine: &TimelineEngine, target: &str, property: &str) -> f64 {
        engine
            .value(target, property)
            .and_then(|v| v.as_number())
            .unwrap_or(f64::NAN)
    }

    #[test]
    fn test_engine_creation() {
        let engine = TimelineEngine::new();
        assert_eq!(engine.active_count(), 0);
        assert!(engine.value("title", "opacity").is_none());
    }

    #[test]
    fn test_tween_renders_first_frame_immediately() {
        let mut engine = TimelineEngine::new();
        let spec = TweenSpec::new("title", props(&[("opacity", 1.0)]), 500.0)
            .with_from(props(&[("opacity", 0.0)]))
            .with_easing(Easing::Linear);
        let id = engine.start_tween(spec);

        assert!(engine.is_active(id));
        assert_eq!(number(&engine, "title", "opacity"), 0.0);

        engine.advance(250.0);
        assert!((number(&engine, "title", "opacity") - 0.5).abs() < 1e-9);

        let events = engine.advance(250.0);
        assert_eq!(events, vec![EngineEvent::Completed(id)]);
        assert!(!engine.is_active(id));
        assert_eq!(number(&engine, "title", "opacity"), 1.0);
    }

    #[test]
    fn test_zero_duration_applies_immediately() {
        let mut engine = TimelineEngine::new();
        let id = engine.start_tween(TweenSpec::set("card", props(&[("x", 40.0)])));

        assert!(!engine.is_active(id));
        assert_eq!(number(&engine, "card", "x"), 40.0);
    }

    #[test]
    fn test_delayed_tween_waits() {
        let mut engine = TimelineEngine::new();
        let spec = TweenSpec::new("card", props(&[("y", 100.0)]), 100.0)
            .with_delay(300.0)
            .with_easing(Easing::Linear);
        let id = engine.start_tween(spec);

        assert!(engine.value("card", "y").is_none());
        let events = engine.advance(300.0);
        assert_eq!(events, vec![EngineEvent::Started(id)]);
        assert_eq!(number(&engine, "card", "y"), 0.0);
    }

    #[test]
    fn test_kill_and_complete() {
        let mut engine = TimelineEngine::new();
        let a = engine.start_tween(
            TweenSpec::new("a", props(&[("x", 100.0)]), 1000.0).with_easing(Easing::Linear),
        );
        let b = engine.start_tween(
            TweenSpec::new("b", props(&[("x", 100.0)]), 1000.0).with_easing(Easing::Linear),
        );
        engine.advance(100.0);

        engine.kill(a);
        engine.complete(b);
        engine.advance(500.0);

        assert!((number(&engine, "a", "x") - 10.0).abs() < 1e-9);
        assert_eq!(number(&engine, "b", "x"), 100.0);
        assert_eq!(engine.active_count(), 0);
    }

    #[test]
    fn test_kill_target_and_all() {
        let mut engine = TimelineEngine::new();
        engine.start_tween(TweenSpec::new("a", props(&[("x", 1.0)]), 100.0));
        engine.start_tween(TweenSpec::new("a", props(&[("y", 1.0)]), 100.0));
        engine.start_tween(TweenSpec::new("b", props(&[("x", 1.0)]), 100.0));

        engine.kill_target("a");
        assert_eq!(engine.active_count(), 1);

        engine.kill_all();
        assert_eq!(engine.active_count(), 0);
    }

    #[test]
    fn test_set_is_visible_to_later_tweens() {
        let mut engine = TimelineEngine::new();
        engine.set("card", &props(&[("scale", 0.5)]));
        engine.start_tween(
            TweenSpec::new("card", props(&[("scale", 1.0)]), 100.0).with_easing(Easing::Linear),
        );
        engine.advance(50.0);

        assert!((number(&engine, "card", "scale") - 0.75).abs() < 1e-9);
        assert_eq!(engine.values_of("card").map(|v| v.len()), Some(1));
    }
}
