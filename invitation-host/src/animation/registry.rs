//! # Registry 模块
//!
//! 触发器注册表：运行时唯一的共享可变资源。
//!
//! ## 作用域与代数
//!
//! 每条注册都属于一个作用域（通常是 block id）。`begin_scope` 会让该作用域的
//! 代数加一并移除旧注册；旧代数签发的 [`TriggerCleanup`] 因代数不匹配而成为空操作，
//! 因此同一作用域"注册 / 清理"交错时，旧的清理不会拆掉新挂载的注册。

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::{Rc, Weak};

use invitation_runtime::schema::{AnimationAction, TimeTrigger, Trigger};

use super::compile::ActionContext;
use super::trigger::{RuntimeEvent, ScrollObserver, ScrollPhase, matches_trigger};
use crate::error::AnimationError;

/// 注册 ID
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RegistrationId(pub u64);

/// 注册时附带的交互信息
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InteractionInfo {
    pub id: String,
    /// 触发时先停止的交互
    pub cancels: Vec<String>,
    /// 触发时求值的守卫表达式
    pub expression: Option<String>,
    /// 触发时要求某个状态机处于的状态
    pub state: Option<String>,
}

/// 时间触发器的进度
#[derive(Debug, Clone, PartialEq)]
struct TimeState {
    elapsed: f64,
    next_fire: f64,
    interval: f64,
    /// 剩余重复次数，`None` 表示无限
    remaining: Option<u32>,
    done: bool,
}

impl TimeState {
    fn new(trigger: &TimeTrigger) -> Self {
        let remaining = match trigger.repeat {
            Some(-1) => None,
            Some(n) if n > 0 => Some(n as u32),
            _ => Some(0),
        };
        let interval = trigger.interval.unwrap_or(trigger.delay);
        Self {
            elapsed: 0.0,
            next_fire: trigger.delay.max(0.0),
            interval: interval.max(1.0),
            remaining,
            done: false,
        }
    }

    /// 推进时间，返回本次是否触发（每次推进最多触发一次）
    fn advance(&mut self, dt_ms: f64) -> bool {
        if self.done {
            return false;
        }
        self.elapsed += dt_ms.max(0.0);
        if self.elapsed < self.next_fire {
            return false;
        }

        match self.remaining {
            Some(0) => self.done = true,
            Some(n) => self.remaining = Some(n - 1),
            None => {}
        }
        self.next_fire = (self.next_fire + self.interval).max(self.elapsed);
        true
    }
}

struct Entry {
    id: RegistrationId,
    scope: String,
    generation: u64,
    trigger: Trigger,
    action: AnimationAction,
    context: ActionContext,
    interaction: Option<InteractionInfo>,
    /// 滚动触发器观察的元素
    observed: Option<String>,
    scroll: Option<ScrollObserver>,
    time: Option<TimeState>,
}

/// 一次触发
#[derive(Debug, Clone, PartialEq)]
pub struct Firing {
    pub registration: RegistrationId,
    pub scope: String,
    pub action: AnimationAction,
    pub context: ActionContext,
    pub interaction: Option<InteractionInfo>,
    /// 触发器签名，用于历史记录
    pub trigger: String,
}

impl Entry {
    fn fire(&self, event: Option<&RuntimeEvent>) -> Firing {
        let mut context = self.context.clone();

        // 手势作用在实际被操作的元素上
        if let Some(RuntimeEvent::Gesture { target, .. }) = event {
            context.target = target.clone();
            context.children.clear();
            context.triggered_element = Some(target.clone());
        }

        Firing {
            registration: self.id,
            scope: self.scope.clone(),
            action: self.action.clone(),
            context,
            interaction: self.interaction.clone(),
            trigger: self.trigger.signature(),
        }
    }

    fn fires_once(&self) -> bool {
        matches!(&self.trigger, Trigger::Scroll(scroll) if scroll.once == Some(true))
    }
}

/// 触发器注册表
#[derive(Default)]
pub struct TriggerRegistry {
    entries: Vec<Entry>,
    generations: HashMap<String, u64>,
    next_id: u64,
}

impl std::fmt::Debug for TriggerRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TriggerRegistry")
            .field("entries", &self.entries.len())
            .field("scopes", &self.generations.len())
            .finish()
    }
}

impl TriggerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn shared() -> Rc<RefCell<TriggerRegistry>> {
        Rc::new(RefCell::new(Self::new()))
    }

    /// 作用域当前代数
    pub fn generation(&self, scope: &str) -> u64 {
        self.generations.get(scope).copied().unwrap_or(0)
    }

    /// 开始新的挂载：代数加一并移除该作用域的旧注册
    pub fn begin_scope(&mut self, scope: &str) -> u64 {
        self.entries.retain(|entry| entry.scope != scope);
        let generation = self.generations.entry(scope.to_string()).or_insert(0);
        *generation += 1;
        *generation
    }

    /// 注册触发器
    ///
    /// 滚动位置无法解析时返回错误，其它触发器总是成功。
    pub fn register(
        &mut self,
        scope: &str,
        trigger: Trigger,
        action: AnimationAction,
        context: ActionContext,
        interaction: Option<InteractionInfo>,
    ) -> Result<RegistrationId, AnimationError> {
        let (scroll, observed) = match &trigger {
            Trigger::Scroll(scroll) => (
                Some(ScrollObserver::new(&scroll.start, scroll.end.as_deref())?),
                Some(scroll.target.clone().unwrap_or_else(|| context.target.clone())),
            ),
            _ => (None, None),
        };
        let time = match &trigger {
            Trigger::Time(time) => Some(TimeState::new(time)),
            _ => None,
        };

        self.next_id += 1;
        let id = RegistrationId(self.next_id);
        self.entries.push(Entry {
            id,
            scope: scope.to_string(),
            generation: self.generation(scope),
            trigger,
            action,
            context,
            interaction,
            observed,
            scroll,
            time,
        });
        Ok(id)
    }

    /// 移除指定注册（仅当代数仍然有效）
    fn remove(&mut self, ids: &[RegistrationId], scope: &str, generation: u64) -> usize {
        if self.generation(scope) != generation {
            return 0;
        }
        let before = self.entries.len();
        self.entries
            .retain(|entry| !(entry.scope == scope && ids.contains(&entry.id)));
        before - self.entries.len()
    }

    /// 移除作用域内的全部注册，并使旧的清理句柄失效
    pub fn cleanup_scope(&mut self, scope: &str) -> usize {
        let before = self.entries.len();
        self.entries.retain(|entry| entry.scope != scope);
        if let Some(generation) = self.generations.get_mut(scope) {
            *generation += 1;
        }
        before - self.entries.len()
    }

    /// 移除全部注册
    pub fn clear(&mut self) {
        self.entries.clear();
        for generation in self.generations.values_mut() {
            *generation += 1;
        }
    }

    /// 分发事件（时间触发器由 [`TriggerRegistry::tick`] 驱动，不参与分发）
    pub fn dispatch(&mut self, event: &RuntimeEvent) -> Vec<Firing> {
        let mut firings = Vec::new();
        let mut spent = Vec::new();

        for entry in &self.entries {
            if entry.time.is_some() || !matches_trigger(&entry.trigger, event) {
                continue;
            }
            firings.push(entry.fire(Some(event)));
            if entry.fires_once() {
                spent.push(entry.id);
            }
        }

        self.entries.retain(|entry| !spent.contains(&entry.id));
        firings
    }

    /// 推进时间触发器
    pub fn tick(&mut self, dt_ms: f64) -> Vec<Firing> {
        let mut firings = Vec::new();
        for entry in &mut self.entries {
            let fired = entry.time.as_mut().is_some_and(|time| time.advance(dt_ms));
            if fired {
                firings.push(entry.fire(None));
            }
        }
        self.entries
            .retain(|entry| !entry.time.as_ref().is_some_and(|time| time.done));
        firings
    }

    /// 更新某个元素的滚动几何信息
    pub fn scroll_update(
        &mut self,
        target: &str,
        element_top: f64,
        element_height: f64,
        viewport_height: f64,
    ) -> Vec<Firing> {
        let mut firings = Vec::new();
        let mut spent = Vec::new();

        for entry in &mut self.entries {
            if entry.observed.as_deref() != Some(target) {
                continue;
            }
            let Some(observer) = entry.scroll.as_mut() else {
                continue;
            };
            let phases: Vec<ScrollPhase> =
                observer.update(element_top, element_height, viewport_height);

            for phase in phases {
                let event = RuntimeEvent::Scroll {
                    target: target.to_string(),
                    phase,
                };
                if spent.contains(&entry.id) || !matches_trigger(&entry.trigger, &event) {
                    continue;
                }
                firings.push(entry.fire(Some(&event)));
                if entry.fires_once() {
                    spent.push(entry.id);
                }
            }
        }

        self.entries.retain(|entry| !spent.contains(&entry.id));
        firings
    }

    /// 注册总数
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// 某个作用域的注册数
    pub fn count_in_scope(&self, scope: &str) -> usize {
        self.entries.iter().filter(|e| e.scope == scope).count()
    }
}

/// 注销句柄
///
/// `cleanup` 幂等；注册表已释放或作用域已重新挂载时为空操作。
#[derive(Debug)]
pub struct TriggerCleanup {
    registry: Weak<RefCell<TriggerRegistry>>,
    scope: String,
    generation: u64,
    ids: Vec<RegistrationId>,
    done: Cell<bool>,
}

impl TriggerCleanup {
    pub fn new(
        registry: &Rc<RefCell<TriggerRegistry>>,
        scope: &str,
        ids: Vec<RegistrationId>,
    ) -> Self {
        let generation = registry.borrow().generation(scope);
        Self {
            registry: Rc::downgrade(registry),
            scope: scope.to_string(),
            generation,
            ids,
            done: Cell::new(false),
        }
    }

    /// 注销，返回实际移除的注册数
    pub fn cleanup(&self) -> usize {
        if self.done.replace(true) {
            return 0;
        }
        match self.registry.upgrade() {
            Some(registry) => registry
                .borrow_mut()
                .remove(&self.ids, &self.scope, self.generation),
            None => 0,
        }
    }

    pub fn is_done(&self) -> bool {
        self.done.get()
    }

    pub fn scope(&self) -> &str {
        &self.scope
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use invitation_runtime::schema::{
        EventTrigger, GestureKind, GestureTrigger, ScrollTrigger, SetAction,
    };

    fn action() -> AnimationAction {
        AnimationAction::Set(SetAction {
            target: Default::default(),
            properties: Default::default(),
        })
    }

    fn event_trigger(name: &str) -> Trigger {
        Trigger::Event(EventTrigger {
            event: name.to_string(),
            target: None,
        })
    }

    fn time_trigger(delay: f64, repeat: Option<i32>, interval: Option<f64>) -> Trigger {
        Trigger::Time(TimeTrigger {
            delay,
            repeat,
            interval,
        })
    }

    #[test]
    fn test_register_and_dispatch() {
        let mut registry = TriggerRegistry::new();
        registry.begin_scope("hero");
        registry
            .register("hero", event_trigger("open"), action(), ActionContext::new("hero"), None)
            .unwrap();

        assert_eq!(registry.dispatch(&RuntimeEvent::event("open")).len(), 1);
        assert!(registry.dispatch(&RuntimeEvent::event("close")).is_empty());
        assert_eq!(registry.count_in_scope("hero"), 1);
    }

    #[test]
    fn test_gesture_firing_targets_actual_element() {
        let mut registry = TriggerRegistry::new();
        let trigger = Trigger::Gesture(GestureTrigger {
            gesture: GestureKind::Tap,
            target: "photo-*".into(),
            direction: None,
        });
        registry
            .register("gallery", trigger, action(), ActionContext::new("gallery"), None)
            .unwrap();

        let firings = registry.dispatch(&RuntimeEvent::tap("photo-2"));
        assert_eq!(firings.len(), 1);
        assert_eq!(firings[0].context.target, "photo-2");
        assert_eq!(firings[0].context.triggered_element.as_deref(), Some("photo-2"));
    }

    #[test]
    fn test_cleanup_is_idempotent() {
        let registry = TriggerRegistry::shared();
        let id = registry
            .borrow_mut()
            .register("hero", event_trigger("a"), action(), ActionContext::new("hero"), None)
            .unwrap();
        registry
            .borrow_mut()
            .register("hero", event_trigger("b"), action(), ActionContext::new("hero"), None)
            .unwrap();

        let cleanup = TriggerCleanup::new(&registry, "hero", vec![id]);
        assert_eq!(cleanup.cleanup(), 1);
        assert_eq!(cleanup.cleanup(), 0);
        assert!(cleanup.is_done());
        assert_eq!(registry.borrow().len(), 1);
    }

    #[test]
    fn test_stale_cleanup_does_not_detach_new_mount() {
        let registry = TriggerRegistry::shared();

        registry.borrow_mut().begin_scope("hero");
        let old = registry
            .borrow_mut()
            .register("hero", event_trigger("a"), action(), ActionContext::new("hero"), None)
            .unwrap();
        let stale = TriggerCleanup::new(&registry, "hero", vec![old]);

        // 重新挂载同一作用域
        registry.borrow_mut().begin_scope("hero");
        registry
            .borrow_mut()
            .register("hero", event_trigger("a"), action(), ActionContext::new("hero"), None)
            .unwrap();

        assert_eq!(stale.cleanup(), 0);
        assert_eq!(registry.borrow().count_in_scope("hero"), 1);
    }

    #[test]
    fn test_cleanup_after_registry_dropped() {
        let registry = TriggerRegistry::shared();
        let cleanup = TriggerCleanup::new(&registry, "hero", Vec::new());
        drop(registry);
        assert_eq!(cleanup.cleanup(), 0);
    }

    #[test]
    fn test_time_trigger_repeat() {
        let mut registry = TriggerRegistry::new();
        registry
            .register(
                "hero",
                time_trigger(1000.0, Some(2), Some(500.0)),
                action(),
                ActionContext::new("hero"),
                None,
            )
            .unwrap();

        assert!(registry.tick(999.0).is_empty());
        assert_eq!(registry.tick(1.0).len(), 1);
        assert!(registry.tick(499.0).is_empty());
        assert_eq!(registry.tick(1.0).len(), 1);
        assert_eq!(registry.tick(500.0).len(), 1);
        // 首次 + 2 次重复后移除
        assert!(registry.is_empty());
        // 时间触发器不参与事件分发
        assert!(registry.dispatch(&RuntimeEvent::Time { elapsed_ms: 5000.0 }).is_empty());
    }

    #[test]
    fn test_time_trigger_without_repeat_fires_once() {
        let mut registry = TriggerRegistry::new();
        registry
            .register("s", time_trigger(0.0, None, None), action(), ActionContext::new("s"), None)
            .unwrap();
        assert_eq!(registry.tick(16.0).len(), 1);
        assert!(registry.tick(16.0).is_empty());
        assert!(registry.is_empty());
    }

    #[test]
    fn test_scroll_once_and_invalid_position() {
        let mut registry = TriggerRegistry::new();
        let mut scroll = ScrollTrigger::new("top 80%");
        scroll.once = Some(true);
        registry
            .register("hero", Trigger::Scroll(scroll), action(), ActionContext::new("hero"), None)
            .unwrap();

        assert_eq!(registry.scroll_update("hero", 600.0, 400.0, 800.0).len(), 1);
        assert!(registry.is_empty());

        let bad = Trigger::Scroll(ScrollTrigger::new("sideways"));
        let result = registry.register("hero", bad, action(), ActionContext::new("hero"), None);
        assert!(matches!(result, Err(AnimationError::InvalidScrollPosition { .. })));
    }

    #[test]
    fn test_scroll_enter_back() {
        let mut registry = TriggerRegistry::new();
        registry
            .register(
                "hero",
                Trigger::Scroll(ScrollTrigger::new("top 80%")),
                action(),
                ActionContext::new("hero"),
                None,
            )
            .unwrap();

        assert_eq!(registry.scroll_update("hero", 600.0, 400.0, 800.0).len(), 1);
        assert!(registry.scroll_update("hero", -600.0, 400.0, 800.0).is_empty());
        assert_eq!(registry.scroll_update("hero", 100.0, 400.0, 800.0).len(), 1);
        // 其它元素的几何变化不影响
        assert!(registry.scroll_update("gallery", 100.0, 400.0, 800.0).is_empty());
    }

    #[test]
    fn test_cleanup_scope() {
        let mut registry = TriggerRegistry::new();
        for scope in ["hero", "hero", "gallery"] {
            registry
                .register(scope, event_trigger("x"), action(), ActionContext::new(scope), None)
                .unwrap();
        }
        assert_eq!(registry.cleanup_scope("hero"), 2);
        assert_eq!(registry.cleanup_scope("hero"), 0);
        assert_eq!(registry.len(), 1);
    }
}
