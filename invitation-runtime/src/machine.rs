//! # Machine 模块
//!
//! 状态机定义的静态部分：守卫表达式与设计期校验。
//! 运行期的状态机实例在 host 中实现。
//!
//! ## 守卫语法
//!
//! ```text
//! flag            上下文中 flag 为真
//! !flag           上下文中 flag 为假或不存在
//! index < 3       数值比较，支持 > < >= <= == != （以及 === / !==）
//! ```

use std::collections::{BTreeMap, BTreeSet, VecDeque};

use serde_json::Value;

use crate::diagnostic::{Diagnostic, DiagnosticResult};
use crate::schema::AnimationStateMachine;

/// 状态数上限
pub const MAX_STATES: usize = 5;
/// 转换数上限
pub const MAX_TRANSITIONS: usize = 10;
/// 单个状态的建议动作数上限
pub const MAX_ACTIONS_PER_STATE: usize = 3;

/// 任意状态
pub const ANY_STATE: &str = "*";

/// 守卫求值上下文
pub type GuardContext = BTreeMap<String, Value>;

/// 比较运算符
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    Gt,
    Lt,
    Ge,
    Le,
    Eq,
    Ne,
}

impl CompareOp {
    fn apply(self, left: f64, right: f64) -> bool {
        match self {
            CompareOp::Gt => left > right,
            CompareOp::Lt => left < right,
            CompareOp::Ge => left >= right,
            CompareOp::Le => left <= right,
            CompareOp::Eq => left == right,
            CompareOp::Ne => left != right,
        }
    }
}

/// 解析后的守卫
#[derive(Debug, Clone, PartialEq)]
pub enum Guard {
    Flag(String),
    NotFlag(String),
    Compare {
        key: String,
        op: CompareOp,
        value: f64,
    },
}

fn is_identifier(text: &str) -> bool {
    !text.is_empty() && text.chars().all(|c| c.is_alphanumeric() || c == '_')
}

impl Guard {
    /// 解析守卫表达式，不支持的语法返回 `None`
    pub fn parse(expression: &str) -> Option<Guard> {
        let expression = expression.trim();

        if let Some(flag) = expression.strip_prefix('!') {
            let flag = flag.trim();
            return is_identifier(flag).then(|| Guard::NotFlag(flag.to_string()));
        }
        if is_identifier(expression) {
            return Some(Guard::Flag(expression.to_string()));
        }

        // 长运算符在前，避免 `>=` 被拆成 `>`
        const OPERATORS: &[(&str, CompareOp)] = &[
            ("===", CompareOp::Eq),
            ("!==", CompareOp::Ne),
            (">=", CompareOp::Ge),
            ("<=", CompareOp::Le),
            ("==", CompareOp::Eq),
            ("!=", CompareOp::Ne),
            (">", CompareOp::Gt),
            ("<", CompareOp::Lt),
        ];
        for (symbol, op) in OPERATORS {
            if let Some((left, right)) = expression.split_once(symbol) {
                let key = left.trim();
                let value = right.trim().parse::<f64>().ok()?;
                if !is_identifier(key) {
                    return None;
                }
                return Some(Guard::Compare {
                    key: key.to_string(),
                    op: *op,
                    value,
                });
            }
        }
        None
    }

    /// 对上下文求值
    pub fn evaluate(&self, context: &GuardContext) -> bool {
        match self {
            Guard::Flag(flag) => context.get(flag).is_some_and(is_truthy),
            Guard::NotFlag(flag) => !context.get(flag).is_some_and(is_truthy),
            Guard::Compare { key, op, value } => context
                .get(key)
                .and_then(Value::as_f64)
                .is_some_and(|current| op.apply(current, *value)),
        }
    }
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// 求值守卫表达式。没有守卫时通过；无法解析的表达式放行
pub fn evaluate_guard(guard: Option<&str>, context: &GuardContext) -> bool {
    match guard {
        None => true,
        Some(expression) => Guard::parse(expression).is_none_or(|g| g.evaluate(context)),
    }
}

// =============================================================================
// 校验
// =============================================================================

/// 从初始状态可达的状态集合
pub fn reachable_states(machine: &AnimationStateMachine) -> BTreeSet<String> {
    let mut reachable = BTreeSet::new();
    if !machine.states.contains_key(&machine.initial) {
        return reachable;
    }

    let mut queue = VecDeque::from([machine.initial.clone()]);
    reachable.insert(machine.initial.clone());

    while let Some(state) = queue.pop_front() {
        for transition in &machine.transitions {
            if (transition.from == state || transition.from == ANY_STATE)
                && machine.states.contains_key(&transition.to)
                && reachable.insert(transition.to.clone())
            {
                queue.push_back(transition.to.clone());
            }
        }
    }

    reachable
}

/// 校验状态机定义
///
/// - Error：初始状态不存在、转换引用未定义状态、状态 / 转换数量超限
/// - Warn：不可达状态、同一 (from, trigger) 的守卫有歧义、单状态动作过多、守卫无法解析
pub fn validate_state_machine(machine: &AnimationStateMachine) -> DiagnosticResult {
    let mut result = DiagnosticResult::new();
    let source = format!("stateMachine:{}", machine.id);

    if machine.states.len() > MAX_STATES {
        result.push(Diagnostic::error(
            &source,
            format!("状态数量超限: {}/{}", machine.states.len(), MAX_STATES),
        ));
    }
    if machine.transitions.len() > MAX_TRANSITIONS {
        result.push(Diagnostic::error(
            &source,
            format!(
                "转换数量超限: {}/{}",
                machine.transitions.len(),
                MAX_TRANSITIONS
            ),
        ));
    }
    if !machine.states.contains_key(&machine.initial) {
        result.push(Diagnostic::error(
            &source,
            format!("初始状态 \"{}\" 未定义", machine.initial),
        ));
    }

    for (index, transition) in machine.transitions.iter().enumerate() {
        let location = format!("transitions[{}]", index);
        if !machine.states.contains_key(&transition.to) {
            result.push(
                Diagnostic::error(
                    &source,
                    format!("目标状态 \"{}\" 未定义", transition.to),
                )
                .with_location(&location),
            );
        }
        if transition.from != ANY_STATE && !machine.states.contains_key(&transition.from) {
            result.push(
                Diagnostic::error(
                    &source,
                    format!("出发状态 \"{}\" 未定义", transition.from),
                )
                .with_location(&location),
            );
        }
        if let Some(guard) = &transition.guard {
            if Guard::parse(guard).is_none() {
                result.push(
                    Diagnostic::warn(&source, format!("无法解析的守卫表达式: {}", guard))
                        .with_location(&location)
                        .with_detail("运行时该守卫总是放行"),
                );
            }
        }
    }

    for (name, state) in &machine.states {
        let count = state.on_enter.len() + state.on_exit.len();
        if count > MAX_ACTIONS_PER_STATE {
            result.push(
                Diagnostic::warn(
                    &source,
                    format!(
                        "状态 \"{}\" 的动作数超过建议值: {}/{}",
                        name, count, MAX_ACTIONS_PER_STATE
                    ),
                )
                .with_location(format!("states.{}", name)),
            );
        }
    }

    check_ambiguous_guards(machine, &source, &mut result);

    let reachable = reachable_states(machine);
    if machine.states.contains_key(&machine.initial) {
        for name in machine.states.keys() {
            if !reachable.contains(name) {
                result.push(
                    Diagnostic::warn(&source, format!("状态 \"{}\" 不可达", name))
                        .with_location(format!("states.{}", name)),
                );
            }
        }
    }

    result
}

/// 同一 (from, trigger) 的多条转换：最多一条无守卫且必须在最后，守卫不得重复
fn check_ambiguous_guards(
    machine: &AnimationStateMachine,
    source: &str,
    result: &mut DiagnosticResult,
) {
    let mut groups: BTreeMap<(String, String), Vec<usize>> = BTreeMap::new();
    for (index, transition) in machine.transitions.iter().enumerate() {
        groups
            .entry((transition.from.clone(), transition.trigger.signature()))
            .or_default()
            .push(index);
    }

    for ((from, _), indices) in groups.into_iter().filter(|(_, v)| v.len() > 1) {
        let guards: Vec<Option<&str>> = indices
            .iter()
            .map(|i| machine.transitions[*i].guard.as_deref().map(str::trim))
            .collect();

        let unguarded = guards.iter().filter(|g| g.is_none()).count();
        let shadowing = guards[..guards.len() - 1].iter().any(Option::is_none);
        let mut seen = BTreeSet::new();
        let duplicated = guards.iter().flatten().any(|g| !seen.insert(*g));

        if unguarded > 1 || shadowing || duplicated {
            result.push(
                Diagnostic::warn(
                    source,
                    format!("状态 \"{}\" 上同一触发器的转换守卫存在歧义", from),
                )
                .with_location(format!(
                    "transitions{:?}",
                    indices
                ))
                .with_detail("运行时以第一条守卫通过的转换为准"),
            );
        }
    }
}
