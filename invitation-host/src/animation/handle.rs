//! # Handle 模块
//!
//! 动作句柄：一次 `apply_action` 产生的全部补间的组合控制。

use std::cell::RefCell;
use std::rc::Rc;

use super::engine::SharedEngine;
use super::tween::TweenId;

#[derive(Debug, Default)]
struct HandleState {
    tweens: Vec<TweenId>,
    duration_ms: f64,
    cancelled: bool,
    completed: bool,
}

/// 可取消的动作句柄
///
/// - `cancel`：停在当前值，不跳到终点
/// - `complete`：立即跳到终点
///
/// 两者都是幂等的；克隆出的句柄共享同一状态。
#[derive(Clone)]
pub struct ActionHandle {
    engine: Option<SharedEngine>,
    state: Rc<RefCell<HandleState>>,
}

impl std::fmt::Debug for ActionHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state.borrow();
        f.debug_struct("ActionHandle")
            .field("tweens", &state.tweens)
            .field("duration_ms", &state.duration_ms)
            .field("cancelled", &state.cancelled)
            .field("completed", &state.completed)
            .finish()
    }
}

impl ActionHandle {
    pub fn new(engine: SharedEngine, tweens: Vec<TweenId>, duration_ms: f64) -> Self {
        Self {
            engine: Some(engine),
            state: Rc::new(RefCell::new(HandleState {
                tweens,
                duration_ms,
                ..HandleState::default()
            })),
        }
    }

    /// 空操作句柄（动作被跳过时返回）
    pub fn noop() -> Self {
        Self {
            engine: None,
            state: Rc::new(RefCell::new(HandleState::default())),
        }
    }

    /// 合并多个句柄
    pub fn merge(handles: impl IntoIterator<Item = ActionHandle>) -> Self {
        let mut engine = None;
        let mut tweens = Vec::new();
        let mut duration_ms: f64 = 0.0;

        for handle in handles {
            if engine.is_none() {
                engine = handle.engine.clone();
            }
            let state = handle.state.borrow();
            tweens.extend(state.tweens.iter().copied());
            duration_ms = duration_ms.max(state.duration_ms);
        }

        Self {
            engine,
            state: Rc::new(RefCell::new(HandleState {
                tweens,
                duration_ms,
                ..HandleState::default()
            })),
        }
    }

    /// 停止所有补间，属性停在当前值
    pub fn cancel(&self) {
        let mut state = self.state.borrow_mut();
        if state.cancelled || state.completed {
            return;
        }
        state.cancelled = true;

        if let Some(engine) = &self.engine {
            let mut engine = engine.borrow_mut();
            for id in &state.tweens {
                engine.kill(*id);
            }
        }
    }

    /// 让所有补间立即跳到终点
    pub fn complete(&self) {
        let mut state = self.state.borrow_mut();
        if state.cancelled || state.completed {
            return;
        }
        state.completed = true;

        if let Some(engine) = &self.engine {
            let mut engine = engine.borrow_mut();
            for id in &state.tweens {
                engine.complete(*id);
            }
        }
    }

    pub fn is_cancelled(&self) -> bool {
        self.state.borrow().cancelled
    }

    /// 已取消、已完成，或所有补间都已自然结束
    pub fn is_finished(&self) -> bool {
        let state = self.state.borrow();
        if state.cancelled || state.completed {
            return true;
        }
        match &self.engine {
            Some(engine) => {
                let engine = engine.borrow();
                state.tweens.iter().all(|id| !engine.is_active(*id))
            }
            None => true,
        }
    }

    /// 动作总时长（ms）
    pub fn duration_ms(&self) -> f64 {
        self.state.borrow().duration_ms
    }

    /// 句柄管理的补间数量
    pub fn tween_count(&self) -> usize {
        self.state.borrow().tweens.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::animation::engine::{AnimationEngine, TimelineEngine};
    use crate::animation::tween::TweenSpec;
    use invitation_runtime::schema::{AnimationProperties, PropertyValue};

    fn props(value: f64) -> AnimationProperties {
        [("x".to_string(), PropertyValue::Number(value))]
            .into_iter()
            .collect()
    }

    fn start(engine: &Rc<RefCell<TimelineEngine>>, target: &str) -> TweenId {
        engine
            .borrow_mut()
            .start_tween(TweenSpec::new(target, props(100.0), 1000.0))
    }

    #[test]
    fn test_cancel_is_idempotent() {
        let engine = TimelineEngine::shared();
        let ids = vec![start(&engine, "a"), start(&engine, "b")];
        let handle = ActionHandle::new(engine.clone(), ids, 1000.0);

        engine.borrow_mut().advance(100.0);
        handle.cancel();
        let after_first = engine.borrow().value("a", "x");
        handle.cancel();
        engine.borrow_mut().advance(500.0);

        assert!(handle.is_cancelled());
        assert!(handle.is_finished());
        assert_eq!(engine.borrow().value("a", "x"), after_first);
        assert_eq!(engine.borrow().active_count(), 0);
    }

    #[test]
    fn test_complete_jumps_to_end() {
        let engine = TimelineEngine::shared();
        let ids = vec![start(&engine, "a")];
        let handle = ActionHandle::new(engine.clone(), ids, 1000.0);

        handle.complete();
        handle.cancel();

        assert!(!handle.is_cancelled());
        assert_eq!(engine.borrow().value("a", "x"), Some(PropertyValue::Number(100.0)));
    }

    #[test]
    fn test_natural_finish() {
        let engine = TimelineEngine::shared();
        let handle = ActionHandle::new(engine.clone(), vec![start(&engine, "a")], 1000.0);
        assert!(!handle.is_finished());

        engine.borrow_mut().advance(1000.0);
        assert!(handle.is_finished());
    }

    #[test]
    fn test_merge_and_noop() {
        let engine = TimelineEngine::shared();
        let a = ActionHandle::new(engine.clone(), vec![start(&engine, "a")], 300.0);
        let b = ActionHandle::new(engine.clone(), vec![start(&engine, "b")], 800.0);
        let merged = ActionHandle::merge([a, b, ActionHandle::noop()]);

        assert_eq!(merged.tween_count(), 2);
        assert_eq!(merged.duration_ms(), 800.0);
        merged.cancel();
        assert_eq!(engine.borrow().active_count(), 0);

        let noop = ActionHandle::noop();
        noop.cancel();
        assert!(noop.is_finished());
    }
}
