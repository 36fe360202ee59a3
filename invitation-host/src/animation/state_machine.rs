//! # State Machine 模块
//!
//! 动画状态机实例：在事件驱动下在有限个状态之间迁移。
//!
//! ## 迁移顺序
//!
//! 1. 执行当前状态的 `onExit`
//! 2. 执行迁移自身的 `animation`
//! 3. 更新当前状态并写入历史
//! 4. 应用新状态的 `properties` 快照并执行 `onEnter`
//!
//! 迁移完成后返回一个 [`RuntimeEvent::State`]，由调用方再分发给其它订阅者。

use invitation_runtime::machine::{ANY_STATE, GuardContext, evaluate_guard};
use invitation_runtime::schema::{AnimationStateMachine, StateTransition};
use tracing::{debug, info, warn};

use super::compile::ActionContext;
use super::handle::ActionHandle;
use super::runtime::AnimationRuntime;
use super::trigger::{RuntimeEvent, matches_trigger};

/// 状态机实例
#[derive(Debug)]
pub struct StateMachineInstance {
    definition: AnimationStateMachine,
    context: ActionContext,
    current: String,
    previous: Option<String>,
    /// 经过的状态序列（含初始状态）
    visited: Vec<String>,
    guard_context: GuardContext,
    handles: Vec<ActionHandle>,
    destroyed: bool,
}

impl StateMachineInstance {
    /// 创建实例并进入初始状态
    pub fn new(
        definition: AnimationStateMachine,
        runtime: &mut AnimationRuntime,
        context: ActionContext,
    ) -> Self {
        if !definition.states.contains_key(&definition.initial) {
            warn!(
                machine = %definition.id,
                state = %definition.initial,
                "初始状态不存在"
            );
        }

        let initial = definition.initial.clone();
        let mut instance = Self {
            definition,
            context,
            current: initial.clone(),
            previous: None,
            visited: vec![initial.clone()],
            guard_context: GuardContext::new(),
            handles: Vec::new(),
            destroyed: false,
        };
        runtime.set_machine_state(&instance.definition.id, &initial);
        instance.enter(&initial, runtime);
        instance
    }

    pub fn id(&self) -> &str {
        &self.definition.id
    }

    pub fn current_state(&self) -> &str {
        &self.current
    }

    pub fn previous_state(&self) -> Option<&str> {
        self.previous.as_deref()
    }

    /// 经过的状态序列
    pub fn history(&self) -> &[String] {
        &self.visited
    }

    pub fn is_destroyed(&self) -> bool {
        self.destroyed
    }

    /// 设置守卫上下文值
    pub fn set_context(&mut self, key: impl Into<String>, value: serde_json::Value) {
        self.guard_context.insert(key.into(), value);
    }

    fn applies_from(&self, transition: &StateTransition) -> bool {
        transition.from == ANY_STATE || transition.from == self.current
    }

    /// 处理事件：第一条来源、触发器与守卫都满足的迁移生效
    pub fn handle_event(
        &mut self,
        event: &RuntimeEvent,
        runtime: &mut AnimationRuntime,
    ) -> Option<RuntimeEvent> {
        if self.destroyed {
            return None;
        }

        let mut chosen = None;
        for (index, transition) in self.definition.transitions.iter().enumerate() {
            if !self.applies_from(transition) || !matches_trigger(&transition.trigger, event) {
                continue;
            }
            if evaluate_guard(transition.guard.as_deref(), &self.guard_context) {
                chosen = Some(index);
                break;
            }
            debug!(
                machine = %self.definition.id,
                from = %self.current,
                to = %transition.to,
                guard = transition.guard.as_deref().unwrap_or(""),
                "守卫拒绝迁移"
            );
        }

        let index = chosen?;
        let transition = self.definition.transitions[index].clone();
        self.run_transition(&transition.to, Some(&transition), &event.signature(), runtime)
    }

    /// 是否存在从当前状态到 `to` 的迁移
    pub fn can_transition(&self, to: &str) -> bool {
        !self.destroyed
            && self
                .definition
                .transitions
                .iter()
                .any(|t| self.applies_from(t) && t.to == to)
    }

    /// 直接迁移到指定状态（不检查触发器与守卫）
    pub fn transition(&mut self, to: &str, runtime: &mut AnimationRuntime) -> Option<RuntimeEvent> {
        if self.destroyed {
            return None;
        }
        let animation = self
            .definition
            .transitions
            .iter()
            .find(|t| self.applies_from(t) && t.to == to)
            .cloned();
        self.run_transition(to, animation.as_ref(), "manual", runtime)
    }

    fn run_transition(
        &mut self,
        to: &str,
        transition: Option<&StateTransition>,
        trigger: &str,
        runtime: &mut AnimationRuntime,
    ) -> Option<RuntimeEvent> {
        if !self.definition.states.contains_key(to) {
            warn!(machine = %self.definition.id, state = to, "目标状态不存在");
            return None;
        }

        let from = self.current.clone();
        self.exit(&from, runtime);

        if let Some(animation) = transition.and_then(|t| t.animation.as_ref()) {
            let handle = runtime.apply_action(animation, &self.context);
            self.handles.push(handle);
        }

        self.previous = Some(from.clone());
        self.current = to.to_string();
        self.visited.push(to.to_string());
        runtime.record_transition(&self.definition.id, &from, to, trigger);
        info!(machine = %self.definition.id, from = %from, to, "状态迁移");

        self.enter(to, runtime);
        Some(RuntimeEvent::state(from, to))
    }

    fn enter(&mut self, state: &str, runtime: &mut AnimationRuntime) {
        let Some(definition) = self.definition.states.get(state) else {
            return;
        };

        if let Some(snapshot) = &definition.properties {
            let mut engine = runtime.engine().borrow_mut();
            for (target, properties) in snapshot {
                engine.set(target, properties);
            }
        }

        let actions = definition.on_enter.clone();
        for action in &actions {
            let handle = runtime.apply_action(action, &self.context);
            self.handles.push(handle);
        }
        self.handles.retain(|h| !h.is_finished());
    }

    fn exit(&mut self, state: &str, runtime: &mut AnimationRuntime) {
        let Some(definition) = self.definition.states.get(state) else {
            return;
        };
        let actions = definition.on_exit.clone();
        for action in &actions {
            let handle = runtime.apply_action(action, &self.context);
            self.handles.push(handle);
        }
    }

    /// 回到初始状态（不执行 `onExit`，清空历史）
    pub fn reset(&mut self, runtime: &mut AnimationRuntime) {
        if self.destroyed {
            return;
        }
        self.cancel_handles();
        let initial = self.definition.initial.clone();
        self.previous = None;
        self.current = initial.clone();
        self.visited = vec![initial.clone()];
        runtime.set_machine_state(&self.definition.id, &initial);
        self.enter(&initial, runtime);
    }

    /// 停止实例：取消正在运行的动作，之后的事件全部忽略
    pub fn destroy(&mut self) {
        if self.destroyed {
            return;
        }
        self.cancel_handles();
        self.destroyed = true;
    }

    fn cancel_handles(&mut self) {
        for handle in self.handles.drain(..) {
            handle.cancel();
        }
    }
}
