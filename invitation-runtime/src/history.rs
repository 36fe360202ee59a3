//! # History 模块
//!
//! 动画运行时的事件记录，用于调试面板与测试断言。
//!
//! ## 设计原则
//!
//! - 只记录离散事件（状态迁移、交互触发、取消），不记录逐帧插值
//! - 时间戳由宿主时钟提供（毫秒），Runtime 自身不读取系统时间
//! - 超过容量时丢弃最早的事件

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

/// 默认最多记录的事件数
pub const DEFAULT_MAX_EVENTS: usize = 200;

/// 历史事件
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum HistoryEvent {
    /// 状态机迁移
    Transition {
        /// 状态机 id
        machine: String,
        from: String,
        to: String,
        /// 触发器签名（`tap:#card`、`event:open` ...）
        trigger: String,
        /// 宿主时钟（毫秒）
        at_ms: f64,
    },

    /// 交互触发
    InteractionFired {
        interaction: String,
        trigger: String,
        at_ms: f64,
    },

    /// 交互被其他交互取消
    InteractionCancelled {
        interaction: String,
        /// 发起取消的交互
        by: String,
        at_ms: f64,
    },
}

impl HistoryEvent {
    /// 获取事件时间戳
    pub fn at_ms(&self) -> f64 {
        match self {
            HistoryEvent::Transition { at_ms, .. }
            | HistoryEvent::InteractionFired { at_ms, .. }
            | HistoryEvent::InteractionCancelled { at_ms, .. } => *at_ms,
        }
    }

    /// 创建状态迁移事件
    pub fn transition(
        machine: impl Into<String>,
        from: impl Into<String>,
        to: impl Into<String>,
        trigger: impl Into<String>,
        at_ms: f64,
    ) -> Self {
        HistoryEvent::Transition {
            machine: machine.into(),
            from: from.into(),
            to: to.into(),
            trigger: trigger.into(),
            at_ms,
        }
    }

    /// 创建交互触发事件
    pub fn interaction_fired(
        interaction: impl Into<String>,
        trigger: impl Into<String>,
        at_ms: f64,
    ) -> Self {
        HistoryEvent::InteractionFired {
            interaction: interaction.into(),
            trigger: trigger.into(),
            at_ms,
        }
    }

    /// 创建交互取消事件
    pub fn interaction_cancelled(
        interaction: impl Into<String>,
        by: impl Into<String>,
        at_ms: f64,
    ) -> Self {
        HistoryEvent::InteractionCancelled {
            interaction: interaction.into(),
            by: by.into(),
            at_ms,
        }
    }
}

/// 历史记录容器
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct History {
    events: VecDeque<HistoryEvent>,
    max_events: usize,
}

impl Default for History {
    fn default() -> Self {
        Self::new()
    }
}

impl History {
    /// 创建新的历史记录
    pub fn new() -> Self {
        Self {
            events: VecDeque::new(),
            max_events: DEFAULT_MAX_EVENTS,
        }
    }

    /// 设置最大记录数（至少为 1）
    pub fn with_max_events(mut self, max: usize) -> Self {
        self.max_events = max.max(1);
        self.trim();
        self
    }

    /// 添加事件
    pub fn push(&mut self, event: HistoryEvent) {
        self.events.push_back(event);
        self.trim();
    }

    fn trim(&mut self) {
        while self.events.len() > self.max_events {
            self.events.pop_front();
        }
    }

    /// 按时间顺序遍历所有事件
    pub fn events(&self) -> impl Iterator<Item = &HistoryEvent> {
        self.events.iter()
    }

    /// 某个状态机的迁移路径 `(from, to)`
    pub fn transitions_of<'a>(&'a self, machine_id: &'a str) -> Vec<(&'a str, &'a str)> {
        self.events
            .iter()
            .filter_map(|e| match e {
                HistoryEvent::Transition {
                    machine, from, to, ..
                } if machine == machine_id => Some((from.as_str(), to.as_str())),
                _ => None,
            })
            .collect()
    }

    /// 最近一次事件
    pub fn last(&self) -> Option<&HistoryEvent> {
        self.events.back()
    }

    /// 交互触发次数
    pub fn fired_count(&self, interaction_id: &str) -> usize {
        self.events
            .iter()
            .filter(|e| {
                matches!(e, HistoryEvent::InteractionFired { interaction, .. } if interaction == interaction_id)
            })
            .count()
    }

    /// 清空历史
    pub fn clear(&mut self) {
        self.events.clear();
    }

    /// 获取事件总数
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// 是否为空
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_history_push_and_query() {
        let mut history = History::new();
        history.push(HistoryEvent::transition("lightbox", "closed", "open", "tap:#photo", 10.0));
        history.push(HistoryEvent::interaction_fired("pulse", "tap:#heart", 20.0));
        history.push(HistoryEvent::transition("lightbox", "open", "closed", "tap:#dim", 30.0));
        history.push(HistoryEvent::transition("menu", "idle", "open", "event:menu", 40.0));

        assert_eq!(history.len(), 4);
        assert_eq!(
            history.transitions_of("lightbox"),
            vec![("closed", "open"), ("open", "closed")]
        );
        assert_eq!(history.fired_count("pulse"), 1);
        assert_eq!(history.last().map(HistoryEvent::at_ms), Some(40.0));
    }

    #[test]
    fn test_history_max_events() {
        let mut history = History::new().with_max_events(3);
        for i in 0..5 {
            history.push(HistoryEvent::interaction_fired(format!("i{}", i), "tap:#x", i as f64));
        }

        assert_eq!(history.len(), 3);
        let first = history.events().next().map(HistoryEvent::at_ms);
        assert_eq!(first, Some(2.0));
    }

    #[test]
    fn test_history_serialization() {
        let mut history = History::new();
        history.push(HistoryEvent::interaction_cancelled("a", "b", 5.0));

        let json = serde_json::to_string(&history).unwrap();
        assert!(json.contains("\"kind\":\"interactionCancelled\""));
        let loaded: History = serde_json::from_str(&json).unwrap();
        assert_eq!(loaded.len(), 1);
    }

    #[test]
    fn test_history_clear() {
        let mut history = History::new();
        history.push(HistoryEvent::transition("m", "a", "b", "event:x", 1.0));
        history.clear();
        assert!(history.is_empty());
    }
}
