//! # Compile 模块
//!
//! 把声明式的动作树编译为扁平的补间列表。
//!
//! ## 时间规则
//!
//! - tween / spring：时长乘以 mood 倍率，延迟不乘
//! - sequence：严格串行，下一步从上一步结束时开始
//! - timeline：每个轨道在 `at` 指定的时刻开始，轨道之间可以重叠
//! - stagger：第 i 个目标额外延迟 `rank(i) × each`
//! - set：零时长
//!
//! 减弱动效时，编译结果统一收敛为"立即设置到终态"。

use invitation_runtime::schema::{
    AnimationAction, SetAction, SpringAction, StaggerAction, StaggerKeyword, StaggerOrigin,
    TargetSelector, TimelineAction, TimelineOffset, TweenAction, TweenDirection,
};
use tracing::debug;

use super::easing::Easing;
use super::mood::{AnimationSettings, DurationKind};
use super::tween::TweenSpec;
use crate::error::AnimationError;

const DEFAULT_STAGGER_EACH_MS: f64 = 100.0;
const DEFAULT_SPRING_STIFFNESS: f64 = 100.0;
const DEFAULT_SPRING_DAMPING: f64 = 10.0;

/// 动作执行上下文：目标解析所需的信息
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ActionContext {
    /// `self` 指向的元素 / block id
    pub target: String,
    /// 触发交互的元素（`$triggeredElement`）
    pub triggered_element: Option<String>,
    /// 当前激活的照片（`$activePhoto`）
    pub active_photo: Option<String>,
    /// `self` 的直接子元素
    pub children: Vec<String>,
    /// 作用域内所有可寻址的 id，用于通配符匹配
    pub known_targets: Vec<String>,
}

impl ActionContext {
    pub fn new(target: impl Into<String>) -> Self {
        Self {
            target: target.into(),
            ..Self::default()
        }
    }

    pub fn with_children(mut self, children: Vec<String>) -> Self {
        self.children = children;
        self
    }

    pub fn with_known_targets(mut self, known: Vec<String>) -> Self {
        self.known_targets = known;
        self
    }

    pub fn with_triggered_element(mut self, id: impl Into<String>) -> Self {
        self.triggered_element = Some(id.into());
        self
    }

    pub fn with_active_photo(mut self, id: impl Into<String>) -> Self {
        self.active_photo = Some(id.into());
        self
    }

    /// 以另一个元素作为 `self`
    fn retarget(&self, target: &str) -> Self {
        Self {
            target: target.to_string(),
            children: Vec::new(),
            ..self.clone()
        }
    }
}

/// 解析单个选择器
fn resolve_selector(selector: &str, context: &ActionContext) -> Vec<String> {
    match selector {
        "self" | "" => vec![context.target.clone()],
        "children" => context.children.clone(),
        dynamic if dynamic.starts_with('$') => {
            let resolved = match dynamic {
                "$triggeredElement" => context.triggered_element.clone(),
                "$activePhoto" => context.active_photo.clone(),
                _ => None,
            };
            vec![resolved.unwrap_or_else(|| context.target.clone())]
        }
        wildcard if wildcard.contains('*') => {
            let prefix = wildcard.replace('*', "");
            context
                .known_targets
                .iter()
                .filter(|id| id.starts_with(&prefix))
                .cloned()
                .collect()
        }
        literal => vec![literal.to_string()],
    }
}

/// 解析目标选择器
///
/// 结果按出现顺序去重；没有匹配任何目标时返回 [`AnimationError::NoTargets`]。
pub fn resolve_targets(
    selector: &TargetSelector,
    context: &ActionContext,
) -> Result<Vec<String>, AnimationError> {
    let mut targets: Vec<String> = Vec::new();
    for part in selector.selectors() {
        for id in resolve_selector(part, context) {
            if !targets.contains(&id) {
                targets.push(id);
            }
        }
    }

    if targets.is_empty() {
        return Err(AnimationError::NoTargets {
            selector: selector.selectors().join(","),
        });
    }
    Ok(targets)
}

/// 编译结果
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CompiledAction {
    /// 补间列表（延迟相对于动作开始时刻）
    pub steps: Vec<TweenSpec>,
    /// 动作总时长（ms），包含无限循环时为 `f64::INFINITY`
    pub duration_ms: f64,
    /// 被跳过的子动作及原因
    pub skipped: Vec<AnimationError>,
}

/// 编译动作树
pub fn compile(
    action: &AnimationAction,
    context: &ActionContext,
    settings: &AnimationSettings,
) -> CompiledAction {
    let mut compiled = CompiledAction::default();
    let end = compile_at(action, context, settings, 0.0, &mut compiled);
    compiled.duration_ms = end;

    if settings.reduced_motion {
        // 排在无限循环之后的步骤正常播放时永远不会开始，收敛时同样丢弃
        compiled.steps.retain(|step| step.delay_ms.is_finite());
        // 保持时间顺序，后开始的步骤最后写入
        compiled
            .steps
            .sort_by(|a, b| a.delay_ms.total_cmp(&b.delay_ms));
        for step in &mut compiled.steps {
            step.collapse_to_end();
        }
        compiled.duration_ms = 0.0;
    }

    compiled
}

/// 在 `offset` 处编译动作，返回动作结束时刻
fn compile_at(
    action: &AnimationAction,
    context: &ActionContext,
    settings: &AnimationSettings,
    offset: f64,
    out: &mut CompiledAction,
) -> f64 {
    match action {
        AnimationAction::Tween(tween) => compile_tween(tween, context, settings, offset, out),
        AnimationAction::Spring(spring) => compile_spring(spring, context, settings, offset, out),
        AnimationAction::Sequence(sequence) => sequence.steps.iter().fold(offset, |cursor, step| {
            compile_at(step, context, settings, cursor, out)
        }),
        AnimationAction::Timeline(timeline) => {
            compile_timeline(timeline, context, settings, offset, out)
        }
        AnimationAction::Stagger(stagger) => {
            compile_stagger(stagger, context, settings, offset, out)
        }
        AnimationAction::Set(set) => compile_set(set, context, offset, out),
        AnimationAction::Unsupported => {
            debug!(target_id = %context.target, "不支持的动作类型，忽略");
            offset
        }
    }
}

fn targets_or_skip(
    selector: &TargetSelector,
    context: &ActionContext,
    out: &mut CompiledAction,
) -> Option<Vec<String>> {
    match resolve_targets(selector, context) {
        Ok(targets) => Some(targets),
        Err(error) => {
            out.skipped.push(error);
            None
        }
    }
}

/// `iterations`：缺省为 1，-1 为无限，其余非正值按 1 处理
fn iterations(value: Option<i32>) -> Option<u32> {
    match value {
        Some(-1) => None,
        Some(n) if n > 0 => Some(n as u32),
        _ => Some(1),
    }
}

fn compile_tween(
    tween: &TweenAction,
    context: &ActionContext,
    settings: &AnimationSettings,
    offset: f64,
    out: &mut CompiledAction,
) -> f64 {
    let Some(targets) = targets_or_skip(&tween.target, context, out) else {
        return offset;
    };
    let easing = match settings.resolve_easing(tween.easing.as_deref()) {
        Ok(easing) => easing,
        Err(error) => {
            out.skipped.push(error);
            return offset;
        }
    };

    let duration = tween
        .duration
        .unwrap_or_else(|| DurationKind::Normal.base_ms())
        .max(0.0)
        * settings.speed_multiplier();

    let (from, to) = match (tween.direction, &tween.from) {
        (TweenDirection::Reverse, Some(from)) => (Some(tween.to.clone()), from.clone()),
        _ => (tween.from.clone(), tween.to.clone()),
    };

    let mut end = offset;
    for target in targets {
        let mut spec = TweenSpec::new(target, to.clone(), duration)
            .with_delay(offset + tween.delay.unwrap_or(0.0).max(0.0))
            .with_easing(easing);
        spec.from = from.clone();
        spec.iterations = iterations(tween.iterations);
        spec.yoyo = tween.direction == TweenDirection::Alternate;
        end = end.max(spec.span_ms());
        out.steps.push(spec);
    }
    end
}

/// 弹簧 → 弹性缓动的近似参数
pub fn spring_parameters(stiffness: Option<f64>, damping: Option<f64>) -> (Easing, f64) {
    let stiffness = stiffness.unwrap_or(DEFAULT_SPRING_STIFFNESS);
    let damping = damping.unwrap_or(DEFAULT_SPRING_DAMPING);
    let amplitude = (stiffness / 100.0).clamp(0.5, 2.0);
    let period = (damping / 50.0).max(0.1);
    let duration_ms = 800.0 + damping / 20.0 * 1000.0;
    (Easing::elastic(amplitude, period), duration_ms)
}

fn compile_spring(
    spring: &SpringAction,
    context: &ActionContext,
    settings: &AnimationSettings,
    offset: f64,
    out: &mut CompiledAction,
) -> f64 {
    let Some(targets) = targets_or_skip(&spring.target, context, out) else {
        return offset;
    };
    let (easing, base_duration) = spring_parameters(spring.stiffness, spring.damping);
    let duration = base_duration * settings.speed_multiplier();

    let mut end = offset;
    for target in targets {
        let spec = TweenSpec::new(target, spring.to.clone(), duration)
            .with_delay(offset)
            .with_easing(easing);
        end = end.max(spec.span_ms());
        out.steps.push(spec);
    }
    end
}

/// 解析时间线轨道的开始时刻
fn track_start(at: &TimelineOffset, origin: f64, prev_start: f64, prev_end: f64) -> f64 {
    let start = match at {
        TimelineOffset::Millis(ms) => origin + ms,
        TimelineOffset::Label(label) => {
            let label = label.trim();
            if let Some(delta) = label.strip_prefix("+=") {
                prev_end + delta.trim().parse::<f64>().unwrap_or(0.0)
            } else if let Some(delta) = label.strip_prefix("-=") {
                prev_end - delta.trim().parse::<f64>().unwrap_or(0.0)
            } else if label == "prev-end" || label == ">" {
                prev_end
            } else if label == "prev-start" || label == "<" {
                prev_start
            } else if let Ok(ms) = label.parse::<f64>() {
                origin + ms
            } else {
                // 未知标签追加到末尾
                prev_end
            }
        }
    };
    start.max(origin)
}

fn compile_timeline(
    timeline: &TimelineAction,
    context: &ActionContext,
    settings: &AnimationSettings,
    offset: f64,
    out: &mut CompiledAction,
) -> f64 {
    let mut prev_start = offset;
    let mut prev_end = offset;
    let mut end = offset;

    for track in &timeline.tracks {
        let start = track_start(&track.at, offset, prev_start, prev_end);
        let track_end = compile_at(&track.action, context, settings, start, out);
        prev_start = start;
        prev_end = track_end;
        end = end.max(track_end);
    }

    if let Some(total) = timeline.total_duration {
        end = end.max(offset + total.max(0.0) * settings.speed_multiplier());
    }
    end
}

/// 第 `index` 个目标（共 `count` 个）在 stagger 中的排序权重
pub fn stagger_rank(origin: StaggerOrigin, index: usize, count: usize) -> f64 {
    let i = index as f64;
    let last = count.saturating_sub(1) as f64;
    let middle = last / 2.0;
    match origin {
        StaggerOrigin::Keyword(StaggerKeyword::First) => i,
        StaggerOrigin::Keyword(StaggerKeyword::Last) => last - i,
        StaggerOrigin::Keyword(StaggerKeyword::Center) => (i - middle).abs(),
        StaggerOrigin::Keyword(StaggerKeyword::Edges) => middle - (i - middle).abs(),
        StaggerOrigin::Index(k) => (i - k as f64).abs(),
    }
}

fn compile_stagger(
    stagger: &StaggerAction,
    context: &ActionContext,
    settings: &AnimationSettings,
    offset: f64,
    out: &mut CompiledAction,
) -> f64 {
    let Some(targets) = targets_or_skip(&stagger.targets, context, out) else {
        return offset;
    };

    let config = stagger.stagger.config();
    let each = if config.each > 0.0 {
        config.each
    } else {
        DEFAULT_STAGGER_EACH_MS
    };

    let count = targets.len();
    let mut end = offset;
    for (index, target) in targets.iter().enumerate() {
        let start = offset + stagger_rank(config.from, index, count) * each;
        let item_context = context.retarget(target);
        end = end.max(compile_at(&stagger.action, &item_context, settings, start, out));
    }
    end
}

fn compile_set(
    set: &SetAction,
    context: &ActionContext,
    offset: f64,
    out: &mut CompiledAction,
) -> f64 {
    let Some(targets) = targets_or_skip(&set.target, context, out) else {
        return offset;
    };
    for target in targets {
        out.steps
            .push(TweenSpec::set(target, set.properties.clone()).with_delay(offset));
    }
    offset
}

#[cfg(test)]
mod tests {
    use super::*;
    use invitation_runtime::schema::{
        AnimationProperties, PropertyValue, SequenceAction, StaggerConfig, StaggerSpec,
        TimelineTrack,
    };

    fn props(key: &str, value: f64) -> AnimationProperties {
        [(key.to_string(), PropertyValue::Number(value))]
            .into_iter()
            .collect()
    }

    fn tween(target: &str, duration: f64) -> AnimationAction {
        AnimationAction::Tween(TweenAction::new(target, props("opacity", 1.0)).with_duration(duration))
    }

    fn settings() -> AnimationSettings {
        AnimationSettings::default()
    }

    fn gallery_context() -> ActionContext {
        ActionContext::new("gallery")
            .with_children(vec!["photo-1".into(), "photo-2".into(), "photo-3".into()])
            .with_known_targets(vec![
                "title".into(),
                "photo-1".into(),
                "photo-2".into(),
                "photo-3".into(),
            ])
            .with_triggered_element("photo-2")
    }

    #[test]
    fn test_resolve_targets() {
        let context = gallery_context();

        let resolve = |s: &str| resolve_targets(&TargetSelector::from(s), &context).unwrap();
        assert_eq!(resolve("self"), vec!["gallery"]);
        assert_eq!(resolve(""), vec!["gallery"]);
        assert_eq!(resolve("children").len(), 3);
        assert_eq!(resolve("photo-*"), vec!["photo-1", "photo-2", "photo-3"]);
        assert_eq!(resolve("$triggeredElement"), vec!["photo-2"]);
        // 未提供的动态变量回退到 self
        assert_eq!(resolve("$activePhoto"), vec!["gallery"]);
        assert_eq!(resolve("title"), vec!["title"]);

        let many = TargetSelector::Many(vec!["photo-*".into(), "photo-1".into()]);
        assert_eq!(resolve_targets(&many, &context).unwrap().len(), 3);

        let none = TargetSelector::from("video-*");
        assert!(matches!(
            resolve_targets(&none, &context),
            Err(AnimationError::NoTargets { .. })
        ));
    }

    #[test]
    fn test_sequence_is_strictly_sequential() {
        let action = AnimationAction::Sequence(SequenceAction {
            steps: vec![tween("a", 300.0), tween("b", 200.0), tween("c", 500.0)],
        });
        let compiled = compile(&action, &ActionContext::new("block"), &settings());

        let delays: Vec<f64> = compiled.steps.iter().map(|s| s.delay_ms).collect();
        assert_eq!(delays, vec![0.0, 300.0, 500.0]);
        assert_eq!(compiled.duration_ms, 1000.0);
    }

    #[test]
    fn test_mood_scales_duration_but_not_delay() {
        let mut settings = settings();
        settings.speed = 2.0;
        let action = AnimationAction::Tween(
            TweenAction::new("a", props("y", 0.0))
                .with_duration(100.0)
                .with_delay(50.0),
        );
        let compiled = compile(&action, &ActionContext::new("a"), &settings);

        assert_eq!(compiled.steps[0].duration_ms, 200.0);
        assert_eq!(compiled.steps[0].delay_ms, 50.0);
        assert_eq!(compiled.duration_ms, 250.0);

        // 缺省时长 400ms 同样乘倍率
        let default_duration = AnimationAction::Tween(TweenAction::new("a", props("y", 0.0)));
        let compiled = compile(&default_duration, &ActionContext::new("a"), &settings);
        assert_eq!(compiled.duration_ms, 800.0);
    }

    #[test]
    fn test_timeline_offsets() {
        let action = AnimationAction::Timeline(TimelineAction {
            tracks: vec![
                TimelineTrack {
                    action: tween("a", 400.0),
                    at: TimelineOffset::Millis(0.0),
                },
                TimelineTrack {
                    action: tween("b", 400.0),
                    at: TimelineOffset::Label("-=100".into()),
                },
                TimelineTrack {
                    action: tween("c", 100.0),
                    at: TimelineOffset::Label("prev-start".into()),
                },
                TimelineTrack {
                    action: tween("d", 100.0),
                    at: TimelineOffset::Label("+=50".into()),
                },
            ],
            total_duration: None,
        });
        let compiled = compile(&action, &ActionContext::new("block"), &settings());

        let delays: Vec<f64> = compiled.steps.iter().map(|s| s.delay_ms).collect();
        assert_eq!(delays, vec![0.0, 300.0, 300.0, 450.0]);
        assert_eq!(compiled.duration_ms, 700.0);
    }

    #[test]
    fn test_stagger_origins() {
        assert_eq!(stagger_rank(StaggerOrigin::default(), 2, 5), 2.0);
        assert_eq!(stagger_rank(StaggerOrigin::Keyword(StaggerKeyword::Last), 0, 5), 4.0);
        assert_eq!(stagger_rank(StaggerOrigin::Keyword(StaggerKeyword::Center), 0, 5), 2.0);
        assert_eq!(stagger_rank(StaggerOrigin::Keyword(StaggerKeyword::Center), 2, 5), 0.0);
        assert_eq!(stagger_rank(StaggerOrigin::Keyword(StaggerKeyword::Edges), 0, 5), 0.0);
        assert_eq!(stagger_rank(StaggerOrigin::Keyword(StaggerKeyword::Edges), 2, 5), 2.0);
        assert_eq!(stagger_rank(StaggerOrigin::Index(3), 1, 5), 2.0);
    }

    #[test]
    fn test_stagger_applies_per_target_delay() {
        let action = AnimationAction::Stagger(StaggerAction {
            targets: "photo-*".into(),
            action: Box::new(tween("self", 300.0)),
            stagger: StaggerSpec::Config(StaggerConfig {
                each: 0.0,
                from: StaggerOrigin::Keyword(StaggerKeyword::Last),
            }),
        });
        let compiled = compile(&action, &gallery_context(), &settings());

        let plan: Vec<(&str, f64)> = compiled
            .steps
            .iter()
            .map(|s| (s.target.as_str(), s.delay_ms))
            .collect();
        // each 为 0 时使用默认 100ms
        assert_eq!(plan, vec![("photo-1", 200.0), ("photo-2", 100.0), ("photo-3", 0.0)]);
        assert_eq!(compiled.duration_ms, 500.0);
    }

    #[test]
    fn test_spring_parameters() {
        let (easing, duration) = spring_parameters(Some(300.0), Some(2.0));
        assert_eq!(easing, Easing::elastic(2.0, 0.1));
        assert_eq!(duration, 900.0);

        let (easing, duration) = spring_parameters(None, None);
        assert_eq!(easing, Easing::elastic(1.0, 0.2));
        assert_eq!(duration, 1300.0);
    }

    #[test]
    fn test_failures_are_skipped_not_fatal() {
        let action = AnimationAction::Sequence(SequenceAction {
            steps: vec![
                AnimationAction::Tween(
                    TweenAction::new("a", props("x", 1.0)).with_easing("wobbly"),
                ),
                tween("video-*", 100.0),
                tween("b", 100.0),
                AnimationAction::Unsupported,
            ],
        });
        let compiled = compile(&action, &ActionContext::new("block"), &settings());

        assert_eq!(compiled.steps.len(), 1);
        assert_eq!(compiled.steps[0].delay_ms, 0.0);
        assert_eq!(compiled.skipped.len(), 2);
    }

    #[test]
    fn test_reduced_motion_collapses_uniformly() {
        let mut settings = settings();
        settings.reduced_motion = true;

        let mut looping = TweenAction::new("heart", props("scale", 1.2)).with_duration(600.0);
        looping.iterations = Some(-1);
        let action = AnimationAction::Sequence(SequenceAction {
            steps: vec![
                tween("a", 300.0),
                AnimationAction::Tween(looping),
                tween("c", 300.0),
            ],
        });
        let compiled = compile(&action, &ActionContext::new("block"), &settings);

        assert_eq!(compiled.duration_ms, 0.0);
        assert!(compiled.steps.iter().all(|s| s.span_ms() == 0.0));
        // c 排在无限循环之后，不可达
        let order: Vec<&str> = compiled.steps.iter().map(|s| s.target.as_str()).collect();
        assert_eq!(order, vec!["a", "heart"]);
    }

    #[test]
    fn test_steps_after_infinite_loop_never_start() {
        let mut looping = TweenAction::new("heart", props("scale", 1.2)).with_duration(600.0);
        looping.iterations = Some(-1);
        let action = AnimationAction::Sequence(SequenceAction {
            steps: vec![AnimationAction::Tween(looping), tween("c", 300.0)],
        });
        let compiled = compile(&action, &ActionContext::new("block"), &settings());

        assert!(compiled.duration_ms.is_infinite());
        let after = compiled.steps.iter().find(|s| s.target == "c").unwrap();
        assert!(after.delay_ms.is_infinite());
    }

    #[test]
    fn test_tween_iterations_and_direction() {
        let mut action = TweenAction::new("a", props("x", 10.0))
            .with_from(props("x", 0.0))
            .with_duration(100.0);
        action.iterations = Some(3);
        action.direction = TweenDirection::Alternate;
        let compiled = compile(
            &AnimationAction::Tween(action.clone()),
            &ActionContext::new("a"),
            &settings(),
        );
        assert!(compiled.steps[0].yoyo);
        assert_eq!(compiled.steps[0].iterations, Some(3));
        assert_eq!(compiled.duration_ms, 300.0);

        action.direction = TweenDirection::Reverse;
        action.iterations = Some(-1);
        let compiled = compile(&AnimationAction::Tween(action), &ActionContext::new("a"), &settings());
        assert_eq!(compiled.steps[0].to, props("x", 0.0));
        assert!(compiled.duration_ms.is_infinite());
    }
}
