//! # Runtime 模块
//!
//! 动画运行时：把动作编译为引擎调用，管理触发器注册与交互之间的取消关系。
//!
//! 运行时显式构造并持有自己的引擎与注册表，不存在全局单例。
//! 所有操作立即返回，时间只在 [`AnimationRuntime::tick`] 中推进。

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

use invitation_runtime::machine::{GuardContext, evaluate_guard};
use invitation_runtime::schema::{AnimationAction, Interaction, Trigger};
use invitation_runtime::{History, HistoryEvent};
use tracing::{debug, warn};

use super::compile::{ActionContext, compile};
use super::engine::{EngineEvent, SharedEngine, TimelineEngine};
use super::handle::ActionHandle;
use super::mood::AnimationSettings;
use super::registry::{Firing, InteractionInfo, TriggerCleanup, TriggerRegistry};
use super::trigger::RuntimeEvent;
use crate::error::AnimationError;

/// 正在运行的动作
#[derive(Debug)]
struct ActiveAction {
    scope: Option<String>,
    interaction: Option<String>,
    handle: ActionHandle,
}

/// 动画运行时
pub struct AnimationRuntime {
    engine: SharedEngine,
    settings: AnimationSettings,
    registry: Rc<RefCell<TriggerRegistry>>,
    active: Vec<ActiveAction>,
    history: History,
    /// 各状态机的当前状态（交互 `condition.state` 使用）
    machine_states: BTreeMap<String, String>,
    /// 交互守卫表达式的求值上下文
    guard_context: GuardContext,
    clock_ms: f64,
}

impl std::fmt::Debug for AnimationRuntime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnimationRuntime")
            .field("settings", &self.settings)
            .field("registry", &self.registry.borrow())
            .field("active", &self.active.len())
            .field("clock_ms", &self.clock_ms)
            .finish()
    }
}

impl AnimationRuntime {
    /// 使用给定引擎创建运行时
    pub fn new(engine: SharedEngine, settings: AnimationSettings) -> Self {
        Self {
            engine,
            settings,
            registry: TriggerRegistry::shared(),
            active: Vec::new(),
            history: History::new(),
            machine_states: BTreeMap::new(),
            guard_context: GuardContext::new(),
            clock_ms: 0.0,
        }
    }

    /// 使用默认的时间线引擎创建运行时
    pub fn headless(settings: AnimationSettings) -> Self {
        Self::new(TimelineEngine::shared(), settings)
    }

    pub fn engine(&self) -> &SharedEngine {
        &self.engine
    }

    pub fn settings(&self) -> &AnimationSettings {
        &self.settings
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    /// 运行时时钟（ms）
    pub fn now_ms(&self) -> f64 {
        self.clock_ms
    }

    // ========== 动作 ==========

    /// 执行动作，立即返回可取消的句柄
    ///
    /// 零目标、无效缓动等失败在这里被记录，对应的子动作作为空操作。
    pub fn apply_action(&mut self, action: &AnimationAction, context: &ActionContext) -> ActionHandle {
        self.apply_tracked(action, context, None, None)
    }

    fn apply_tracked(
        &mut self,
        action: &AnimationAction,
        context: &ActionContext,
        scope: Option<&str>,
        interaction: Option<&str>,
    ) -> ActionHandle {
        let compiled = compile(action, context, &self.settings);

        for error in &compiled.skipped {
            warn!(
                error = %error,
                target_id = %context.target,
                action = action.kind(),
                "动画动作被跳过"
            );
        }

        if compiled.steps.is_empty() {
            return ActionHandle::noop();
        }

        let ids = {
            let mut engine = self.engine.borrow_mut();
            compiled
                .steps
                .into_iter()
                .map(|spec| engine.start_tween(spec))
                .collect()
        };
        let handle = ActionHandle::new(self.engine.clone(), ids, compiled.duration_ms);

        if !handle.is_finished() {
            self.active.push(ActiveAction {
                scope: scope.map(str::to_string),
                interaction: interaction.map(str::to_string),
                handle: handle.clone(),
            });
        }
        handle
    }

    /// 停止目标上的所有补间
    pub fn kill_animations(&mut self, target: &str) {
        self.engine.borrow_mut().kill_target(target);
    }

    // ========== 触发器 ==========

    /// 开始作用域的新挂载，使旧的注销句柄失效
    pub fn begin_scope(&mut self, scope: &str) -> u64 {
        self.registry.borrow_mut().begin_scope(scope)
    }

    /// 注册触发器
    ///
    /// 只有无法解析的滚动位置会返回错误。
    pub fn setup_trigger(
        &mut self,
        scope: &str,
        trigger: &Trigger,
        action: &AnimationAction,
        context: &ActionContext,
    ) -> Result<TriggerCleanup, AnimationError> {
        let id = self.registry.borrow_mut().register(
            scope,
            trigger.clone(),
            action.clone(),
            context.clone(),
            None,
        )?;
        debug!(scope, trigger = trigger.kind(), "注册触发器");
        Ok(TriggerCleanup::new(&self.registry, scope, vec![id]))
    }

    /// 注册交互
    ///
    /// 交互被禁用时不注册，返回 `Ok(None)`。
    /// `condition.state` 与 `condition.expression` 都在触发时检查。
    pub fn setup_interaction(
        &mut self,
        scope: &str,
        interaction: &Interaction,
        context: &ActionContext,
    ) -> Result<Option<TriggerCleanup>, AnimationError> {
        if !interaction.is_enabled() {
            debug!(interaction = %interaction.id, "交互已禁用，跳过注册");
            return Ok(None);
        }

        let condition = interaction.condition.as_ref();
        let info = InteractionInfo {
            id: interaction.id.clone(),
            cancels: interaction.cancels.clone(),
            expression: condition.and_then(|c| c.expression.clone()),
            state: condition.and_then(|c| c.state.clone()),
        };
        let id = self.registry.borrow_mut().register(
            scope,
            interaction.trigger.clone(),
            interaction.action.clone(),
            context.clone(),
            Some(info),
        )?;
        Ok(Some(TriggerCleanup::new(&self.registry, scope, vec![id])))
    }

    /// 移除作用域的全部注册并取消该作用域中正在运行的动作
    pub fn cleanup_scope(&mut self, scope: &str) -> usize {
        let removed = self.registry.borrow_mut().cleanup_scope(scope);
        for active in self.active.iter().filter(|a| a.scope.as_deref() == Some(scope)) {
            active.handle.cancel();
        }
        self.active.retain(|a| a.scope.as_deref() != Some(scope));
        removed
    }

    /// 结束作用域的一次挂载
    ///
    /// 只有 `generation` 仍是当前代数时才移除注册并取消运行中的动作，
    /// 返回移除的注册数。
    pub fn end_scope(&mut self, scope: &str, generation: u64) -> usize {
        if self.registry.borrow().generation(scope) != generation {
            return 0;
        }
        self.cleanup_scope(scope)
    }

    /// 移除所有注册并停止所有补间
    pub fn kill_all_triggers(&mut self) {
        self.registry.borrow_mut().clear();
        for active in &self.active {
            active.handle.cancel();
        }
        self.active.clear();
        self.engine.borrow_mut().kill_all();
    }

    /// 注册总数
    pub fn registered_count(&self) -> usize {
        self.registry.borrow().len()
    }

    /// 作用域内的注册数
    pub fn registered_in_scope(&self, scope: &str) -> usize {
        self.registry.borrow().count_in_scope(scope)
    }

    // ========== 事件 ==========

    /// 分发事件，返回触发的动作数
    pub fn dispatch(&mut self, event: &RuntimeEvent) -> usize {
        let firings = self.registry.borrow_mut().dispatch(event);
        self.run_firings(firings)
    }

    /// 更新元素的滚动几何信息，返回触发的动作数
    pub fn observe_scroll(
        &mut self,
        target: &str,
        element_top: f64,
        element_height: f64,
        viewport_height: f64,
    ) -> usize {
        let firings = self.registry.borrow_mut().scroll_update(
            target,
            element_top,
            element_height,
            viewport_height,
        );
        self.run_firings(firings)
    }

    /// 推进时间：先处理时间触发器，再推进引擎
    pub fn tick(&mut self, dt_ms: f64) -> Vec<EngineEvent> {
        self.clock_ms += dt_ms.max(0.0);

        let firings = self.registry.borrow_mut().tick(dt_ms);
        self.run_firings(firings);

        let events = self.engine.borrow_mut().advance(dt_ms);
        self.active.retain(|a| !a.handle.is_finished());
        events
    }

    fn run_firings(&mut self, firings: Vec<Firing>) -> usize {
        let mut count = 0;
        for firing in firings {
            if let Some(info) = &firing.interaction {
                if let Some(state) = info.state.as_deref() {
                    if !self.machine_states.values().any(|current| current == state) {
                        debug!(interaction = %info.id, state, "交互条件状态不满足");
                        continue;
                    }
                }
                if !evaluate_guard(info.expression.as_deref(), &self.guard_context) {
                    debug!(interaction = %info.id, "交互守卫未通过");
                    continue;
                }
                self.cancel_interactions(&info.cancels, &info.id);
                self.history.push(HistoryEvent::interaction_fired(
                    &info.id,
                    &firing.trigger,
                    self.clock_ms,
                ));
            }

            self.apply_tracked(
                &firing.action,
                &firing.context,
                Some(&firing.scope),
                firing.interaction.as_ref().map(|i| i.id.as_str()),
            );
            count += 1;
        }
        count
    }

    fn cancel_interactions(&mut self, cancels: &[String], by: &str) {
        if cancels.is_empty() {
            return;
        }
        let clock = self.clock_ms;
        for active in &self.active {
            let Some(id) = active.interaction.as_deref() else {
                continue;
            };
            if cancels.iter().any(|c| c == id) && !active.handle.is_finished() {
                active.handle.cancel();
                self.history
                    .push(HistoryEvent::interaction_cancelled(id, by, clock));
            }
        }
        self.active.retain(|a| !a.handle.is_cancelled());
    }

    // ========== 状态 ==========

    /// 记录状态机的当前状态
    pub fn set_machine_state(&mut self, machine: &str, state: &str) {
        self.machine_states
            .insert(machine.to_string(), state.to_string());
    }

    /// 记录状态迁移
    pub fn record_transition(&mut self, machine: &str, from: &str, to: &str, trigger: &str) {
        self.set_machine_state(machine, to);
        self.history.push(HistoryEvent::transition(
            machine,
            from,
            to,
            trigger,
            self.clock_ms,
        ));
    }

    /// 设置交互守卫的上下文值
    pub fn set_context(&mut self, key: impl Into<String>, value: serde_json::Value) {
        self.guard_context.insert(key.into(), value);
    }

    /// 正在运行的动作数
    pub fn active_actions(&self) -> usize {
        self.active.iter().filter(|a| !a.handle.is_finished()).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use invitation_runtime::schema::{
        AnimationProperties, EventTrigger, GestureKind, GestureTrigger, InteractionCondition,
        PropertyValue, SequenceAction, TimeTrigger, TweenAction,
    };
    use serde_json::json;

    fn props(key: &str, value: f64) -> AnimationProperties {
        [(key.to_string(), PropertyValue::Number(value))]
            .into_iter()
            .collect()
    }

    fn fade(target: &str, duration: f64) -> AnimationAction {
        AnimationAction::Tween(
            TweenAction::new(target, props("opacity", 1.0))
                .with_from(props("opacity", 0.0))
                .with_duration(duration)
                .with_easing("linear"),
        )
    }

    fn value(runtime: &AnimationRuntime, target: &str, property: &str) -> Option<f64> {
        runtime
            .engine()
            .borrow()
            .value(target, property)
            .and_then(|v| v.as_number())
    }

    fn interaction(id: &str, event: &str, action: AnimationAction) -> Interaction {
        Interaction {
            id: id.to_string(),
            name: None,
            trigger: Trigger::Event(EventTrigger {
                event: event.to_string(),
                target: None,
            }),
            action,
            condition: None,
            cancels: Vec::new(),
            enabled: None,
        }
    }

    #[test]
    fn test_apply_action_returns_immediately() {
        let mut runtime = AnimationRuntime::headless(AnimationSettings::default());
        let handle = runtime.apply_action(&fade("title", 400.0), &ActionContext::new("title"));

        assert!(!handle.is_finished());
        assert_eq!(value(&runtime, "title", "opacity"), Some(0.0));

        runtime.tick(200.0);
        assert_eq!(value(&runtime, "title", "opacity"), Some(0.5));
        runtime.tick(200.0);
        assert!(handle.is_finished());
        assert_eq!(runtime.active_actions(), 0);
    }

    #[test]
    fn test_failed_action_is_noop() {
        let mut runtime = AnimationRuntime::headless(AnimationSettings::default());
        let handle = runtime.apply_action(&fade("photo-*", 400.0), &ActionContext::new("gallery"));

        assert!(handle.is_finished());
        assert_eq!(handle.tween_count(), 0);
    }

    #[test]
    fn test_sequence_total_duration() {
        let mut runtime = AnimationRuntime::headless(AnimationSettings::default());
        let action = AnimationAction::Sequence(SequenceAction {
            steps: vec![fade("a", 300.0), fade("b", 300.0), fade("c", 300.0)],
        });
        let handle = runtime.apply_action(&action, &ActionContext::new("block"));
        assert_eq!(handle.duration_ms(), 900.0);

        runtime.tick(600.0);
        assert_eq!(value(&runtime, "b", "opacity"), Some(1.0));
        // 第三步刚好开始
        assert_eq!(value(&runtime, "c", "opacity"), Some(0.0));
        assert!(!handle.is_finished());

        runtime.tick(300.0);
        assert!(handle.is_finished());
    }

    #[test]
    fn test_reduced_motion_finishes_within_a_frame() {
        let settings = AnimationSettings::default().with_reduced_motion(true);
        let mut runtime = AnimationRuntime::headless(settings);
        let action = AnimationAction::Sequence(SequenceAction {
            steps: vec![fade("a", 300.0), fade("b", 300.0), fade("c", 300.0)],
        });
        let handle = runtime.apply_action(&action, &ActionContext::new("block"));

        runtime.tick(16.0);
        assert!(handle.is_finished());
        for target in ["a", "b", "c"] {
            assert_eq!(value(&runtime, target, "opacity"), Some(1.0));
        }
    }

    #[test]
    fn test_interaction_cancels_other() {
        let mut runtime = AnimationRuntime::headless(AnimationSettings::default());
        runtime
            .setup_interaction("hero", &interaction("slow", "go", fade("card", 1000.0)), &ActionContext::new("hero"))
            .unwrap();
        let mut stopper = interaction("stop", "halt", fade("title", 100.0));
        stopper.cancels = vec!["slow".to_string()];
        runtime
            .setup_interaction("hero", &stopper, &ActionContext::new("hero"))
            .unwrap();

        assert_eq!(runtime.dispatch(&RuntimeEvent::event("go")), 1);
        runtime.tick(500.0);
        assert_eq!(runtime.dispatch(&RuntimeEvent::event("halt")), 1);
        runtime.tick(500.0);

        // 被取消的动作停在当前值
        assert_eq!(value(&runtime, "card", "opacity"), Some(0.5));
        assert_eq!(runtime.history().fired_count("slow"), 1);
        assert!(runtime.history().events().any(|e| matches!(
            e,
            HistoryEvent::InteractionCancelled { interaction, by, .. } if interaction == "slow" && by == "stop"
        )));
    }

    #[test]
    fn test_disabled_and_conditional_interactions() {
        let mut runtime = AnimationRuntime::headless(AnimationSettings::default());
        let context = ActionContext::new("hero");

        let mut disabled = interaction("off", "go", fade("a", 100.0));
        disabled.enabled = Some(false);
        assert!(runtime.setup_interaction("hero", &disabled, &context).unwrap().is_none());

        let mut conditional = interaction("when-open", "go", fade("a", 100.0));
        conditional.condition = Some(InteractionCondition {
            state: Some("open".to_string()),
            expression: None,
        });
        assert!(runtime.setup_interaction("hero", &conditional, &context).unwrap().is_some());
        assert_eq!(runtime.registered_in_scope("hero"), 1);

        // 状态条件在触发时检查
        assert_eq!(runtime.dispatch(&RuntimeEvent::event("go")), 0);
        runtime.set_machine_state("lightbox", "open");
        assert_eq!(runtime.dispatch(&RuntimeEvent::event("go")), 1);
        runtime.set_machine_state("lightbox", "closed");
        assert_eq!(runtime.dispatch(&RuntimeEvent::event("go")), 0);
        assert_eq!(runtime.history().fired_count("when-open"), 1);
    }

    #[test]
    fn test_interaction_expression_guard() {
        let mut runtime = AnimationRuntime::headless(AnimationSettings::default());
        let mut guarded = interaction("g", "go", fade("a", 100.0));
        guarded.condition = Some(InteractionCondition {
            state: None,
            expression: Some("unlocked".to_string()),
        });
        runtime
            .setup_interaction("hero", &guarded, &ActionContext::new("hero"))
            .unwrap();

        assert_eq!(runtime.dispatch(&RuntimeEvent::event("go")), 0);
        runtime.set_context("unlocked", json!(true));
        assert_eq!(runtime.dispatch(&RuntimeEvent::event("go")), 1);
    }

    #[test]
    fn test_double_cleanup_equals_single() {
        let mut runtime = AnimationRuntime::headless(AnimationSettings::default());
        let trigger = Trigger::Gesture(GestureTrigger {
            gesture: GestureKind::Tap,
            target: "heart".into(),
            direction: None,
        });
        let cleanup = runtime
            .setup_trigger("hero", &trigger, &fade("heart", 100.0), &ActionContext::new("hero"))
            .unwrap();
        runtime
            .setup_trigger("hero", &trigger, &fade("heart", 100.0), &ActionContext::new("hero"))
            .unwrap();

        cleanup.cleanup();
        let after_once = runtime.registered_count();
        cleanup.cleanup();
        assert_eq!(runtime.registered_count(), after_once);
        assert_eq!(after_once, 1);
    }

    #[test]
    fn test_time_trigger_fires_on_tick() {
        let mut runtime = AnimationRuntime::headless(AnimationSettings::default());
        let trigger = Trigger::Time(TimeTrigger {
            delay: 100.0,
            repeat: None,
            interval: None,
        });
        runtime
            .setup_trigger("hero", &trigger, &fade("title", 100.0), &ActionContext::new("hero"))
            .unwrap();

        runtime.tick(50.0);
        assert!(value(&runtime, "title", "opacity").is_none());
        runtime.tick(50.0);
        assert!(value(&runtime, "title", "opacity").is_some());
        assert_eq!(runtime.registered_count(), 0);
    }

    #[test]
    fn test_cleanup_scope_cancels_running_actions() {
        let mut runtime = AnimationRuntime::headless(AnimationSettings::default());
        runtime
            .setup_interaction("hero", &interaction("i", "go", fade("card", 1000.0)), &ActionContext::new("hero"))
            .unwrap();
        runtime.dispatch(&RuntimeEvent::event("go"));
        assert_eq!(runtime.active_actions(), 1);

        assert_eq!(runtime.cleanup_scope("hero"), 1);
        assert_eq!(runtime.active_actions(), 0);
        assert_eq!(runtime.engine().borrow().active_count(), 0);
    }
}
