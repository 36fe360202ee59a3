//! # Element 模块
//!
//! 元素渲染：内容解析 → 定位 → 样式 → 叶子渲染器。
//!
//! ## 内容优先级
//!
//! 1. 文本元素的 `props.format`（插值后整体胜出）
//! 2. 元素自身的 `value`
//! 3. `binding` 路径
//! 4. `bindingFallback` 路径
//! 5. 空字符串
//!
//! 空字符串或空列表视为没有值，继续向下一来源回落。

use invitation_runtime::binding::{BindingValue, normalize_value, resolve_with};
use invitation_runtime::schema::{
    AnimationAction, ColorValue, Element, ElementStyle, ElementType, GestureKind, GestureTrigger, LayoutDirection,
    LoopAnimation, LoopDirection, ScrollTrigger, TimeTrigger, Trigger, TweenDirection,
};
use invitation_runtime::size::{
    absolute_frame, absolute_style, auto_layout_element_style, has_absolute_position,
    is_auto_layout_element,
};
use invitation_runtime::style::{ResolvedTokens, color_to_css};
use invitation_runtime::{CssProperties, ResolveOptions, Viewport, WeddingData, interpolate};
use tracing::warn;

use super::context::{AnimationScope, BlockContext, ParentBox, RenderContext};
use super::visual::{NodeKind, VisualNode};
use crate::animation::ActionContext;
use crate::error::RenderError;

/// 入场动画的默认滚动起点
pub const ENTRANCE_SCROLL_START: &str = "top 80%";

/// 元素的已解析内容
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ElementContent {
    pub value: Option<BindingValue>,
    /// 显示用文本，没有值时为空字符串
    pub text: String,
}

impl ElementContent {
    fn from_value(value: BindingValue) -> Self {
        let text = value.to_string();
        Self {
            value: Some(value),
            text,
        }
    }

    /// 图片地址：列表取第一项
    pub fn first_url(&self) -> Option<&str> {
        match &self.value {
            Some(BindingValue::List(list)) => list.first().map(String::as_str),
            Some(BindingValue::Text(text)) if !text.is_empty() => Some(text),
            _ => None,
        }
    }
}

// =============================================================================
// 内容
// =============================================================================

/// 解析元素内容
///
/// 优先级：文本的 `props.format` > `value` > `binding` > `bindingFallback`。
/// 空字符串 `value: ""` 视为缺省，继续使用 binding。
pub fn resolve_content(
    element: &Element,
    data: &WeddingData,
    options: &ResolveOptions,
) -> ElementContent {
    if let Some(format) = element.text_format() {
        let text = interpolate(format, data);
        return ElementContent {
            value: Some(BindingValue::Text(text.clone())),
            text,
        };
    }

    let sources = [
        element.value.as_ref().and_then(normalize_value),
        element
            .binding
            .as_deref()
            .and_then(|path| resolve_with(path, data, options)),
        element
            .binding_fallback
            .as_deref()
            .and_then(|path| resolve_with(path, data, options)),
    ];

    sources
        .into_iter()
        .flatten()
        .find(|value| !value.is_blank())
        .map(ElementContent::from_value)
        .unwrap_or_default()
}

// =============================================================================
// 样式
// =============================================================================

/// 颜色引用 token 时取 token 值，否则原样使用
///
/// 接受 `accent-default`、`$accent-default`、`color.accent` 这样的写法。
pub fn resolve_color(value: &str, tokens: &ResolvedTokens) -> String {
    let key = value.trim().trim_start_matches('$');
    tokens
        .get(key)
        .map(str::to_string)
        .unwrap_or_else(|| value.to_string())
}

pub fn color_value_css(value: &ColorValue, tokens: &ResolvedTokens) -> String {
    match value {
        ColorValue::Solid(color) | ColorValue::Wrapped { color } => resolve_color(color, tokens),
        gradient @ ColorValue::Gradient(_) => color_to_css(gradient),
    }
}

/// 元素样式，颜色按 block token 解析
pub fn element_style(
    element_type: &ElementType,
    style: Option<&ElementStyle>,
    tokens: &ResolvedTokens,
) -> CssProperties {
    let mut css = CssProperties::new();

    if *element_type == ElementType::Text {
        css.insert("color".into(), tokens.value("fg-default").to_string());
        css.insert("font-family".into(), "var(--font-body)".into());
    }

    let Some(style) = style else {
        return css;
    };

    if let Some(text) = &style.text {
        if let Some(family) = &text.font_family {
            css.insert("font-family".into(), family.clone());
        }
        if let Some(size) = text.font_size {
            css.insert("font-size".into(), format!("{}px", size));
        }
        if let Some(weight) = text.font_weight {
            css.insert("font-weight".into(), weight.to_string());
        }
        if let Some(color) = &text.color {
            css.insert("color".into(), resolve_color(color, tokens));
        }
        if let Some(align) = text.text_align {
            css.insert("text-align".into(), align.as_str().into());
        }
        if let Some(line_height) = text.line_height {
            css.insert("line-height".into(), line_height.to_string());
        }
        if let Some(spacing) = text.letter_spacing {
            css.insert("letter-spacing".into(), format!("{}em", spacing));
        }
    }

    if let Some(background) = &style.background {
        css.insert("background".into(), color_value_css(background, tokens));
    }

    if let Some(border) = &style.border {
        if border.width > 0.0 {
            css.insert(
                "border".into(),
                format!(
                    "{}px {} {}",
                    border.width,
                    border.style,
                    resolve_color(&border.color, tokens)
                ),
            );
        }
        if border.radius > 0.0 {
            css.insert("border-radius".into(), format!("{}px", border.radius));
        }
    }

    if let Some(shadow) = &style.shadow {
        let value = match shadow.strip_prefix("shadow-") {
            Some(size) => format!("var(--shadow-{})", size),
            None => shadow.clone(),
        };
        css.insert("box-shadow".into(), value);
    }

    if let Some(opacity) = style.opacity {
        css.insert("opacity".into(), opacity.clamp(0.0, 1.0).to_string());
    }

    css
}

// =============================================================================
// 渲染
// =============================================================================

/// 元素的排布方式
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Placement {
    /// 绝对定位，相对于父级盒
    Absolute(ParentBox),
    /// 自动布局流中的一项
    Flow(LayoutDirection),
}

/// 渲染单个元素（group 递归）
///
/// 未知类型渲染为空占位并记录警告，不影响兄弟元素。
/// 只有格式错误的触发器定义会返回错误。
pub fn render_element(
    element: &Element,
    placement: Placement,
    ctx: &RenderContext<'_>,
    block: &BlockContext<'_>,
    scope: &mut AnimationScope<'_>,
) -> Result<VisualNode, RenderError> {
    let (position, own_box) = position_style(element, placement, ctx.viewport, block);

    if !element.element_type.is_known() && !ctx.leaves.contains(&element.element_type) {
        warn!(
            element_id = %element.id,
            element_type = %element.element_type,
            block_id = block.block_id,
            "未知元素类型，渲染为占位"
        );
        let mut node = VisualNode::new(NodeKind::Placeholder, &element.id, element.element_type.as_str());
        node.merge_style(position);
        return Ok(node);
    }

    let kind = if element.is_group() {
        NodeKind::Group
    } else {
        NodeKind::Element
    };
    let mut node = VisualNode::new(kind, &element.id, element.element_type.as_str());
    node.merge_style(position);
    node.merge_style(element_style(
        &element.element_type,
        element.style.as_ref(),
        &block.tokens,
    ));

    if element.is_group() {
        for child in &element.children {
            let child_node =
                render_element(child, Placement::Absolute(own_box), ctx, block, scope)?;
            node.children.push(child_node);
        }
    } else {
        let content = resolve_content(element, ctx.data, &ctx.resolve_options);
        if let Some(leaf) = ctx.leaves.get(&element.element_type) {
            leaf.render(element, &content, &mut node);
        }
    }

    register_animations(element, ctx, block, scope)?;
    Ok(node)
}

/// 定位样式，以及子元素使用的父级盒
fn position_style(
    element: &Element,
    placement: Placement,
    viewport: Viewport,
    block: &BlockContext<'_>,
) -> (CssProperties, ParentBox) {
    match placement {
        Placement::Flow(direction) if is_auto_layout_element(element, block.layout) => {
            let own = ParentBox {
                width: viewport.width,
                height: block.height_px,
            };
            (auto_layout_element_style(element, direction, viewport), own)
        }
        Placement::Flow(_) | Placement::Absolute(_) if has_absolute_position(element) => {
            let parent = match placement {
                Placement::Absolute(parent) => parent,
                Placement::Flow(_) => ParentBox {
                    width: viewport.width,
                    height: block.height_px,
                },
            };
            let reference = Viewport::new(parent.width, viewport.height);
            let frame = absolute_frame(element, reference, parent.height);
            let own = ParentBox {
                width: frame.width,
                height: frame.height,
            };
            (absolute_style(element, frame), own)
        }
        Placement::Absolute(parent) => {
            let mut css = CssProperties::new();
            css.insert("position".into(), "relative".into());
            (css, parent)
        }
        Placement::Flow(_) => {
            let mut css = CssProperties::new();
            css.insert("position".into(), "relative".into());
            let own = ParentBox {
                width: viewport.width,
                height: block.height_px,
            };
            (css, own)
        }
    }
}

// =============================================================================
// 动画注册
// =============================================================================

/// 循环动画：补间带上迭代次数与方向
fn loop_action(looping: &LoopAnimation) -> AnimationAction {
    match &looping.action {
        AnimationAction::Tween(tween) => {
            let mut tween = tween.clone();
            tween.iterations = Some(looping.iterations.unwrap_or(-1));
            if looping.direction == LoopDirection::Alternate {
                tween.direction = TweenDirection::Alternate;
            }
            AnimationAction::Tween(tween)
        }
        other => other.clone(),
    }
}

fn register_animations(
    element: &Element,
    ctx: &RenderContext<'_>,
    block: &BlockContext<'_>,
    scope: &mut AnimationScope<'_>,
) -> Result<(), RenderError> {
    let Some(config) = &element.animation else {
        return Ok(());
    };

    let action_context = ActionContext::new(&element.id)
        .with_children(element.children.iter().map(|c| c.id.clone()).collect())
        .with_known_targets(block.element_ids.clone());
    let block_id = block.block_id;

    if let Some(action) = config
        .entrance
        .as_ref()
        .and_then(|entrance| ctx.presets.entrance_action(entrance))
    {
        let mut trigger = ScrollTrigger::new(ENTRANCE_SCROLL_START);
        trigger.target = Some(element.id.clone());
        trigger.once = Some(true);
        scope
            .trigger(&Trigger::Scroll(trigger), &action, &action_context)
            .map_err(|e| RenderError::animation(block_id, e))?;
    }

    if let Some(action) = config
        .hover
        .as_ref()
        .and_then(|hover| ctx.presets.hover_action(hover))
    {
        let trigger = Trigger::Gesture(GestureTrigger {
            gesture: GestureKind::Hover,
            target: element.id.clone(),
            direction: None,
        });
        scope
            .trigger(&trigger, &action, &action_context)
            .map_err(|e| RenderError::animation(block_id, e))?;
    }

    if let Some(looping) = &config.looping {
        let trigger = Trigger::Time(TimeTrigger {
            delay: 0.0,
            repeat: None,
            interval: None,
        });
        scope
            .trigger(&trigger, &loop_action(looping), &action_context)
            .map_err(|e| RenderError::animation(block_id, e))?;
    }

    for interaction in &config.interactions {
        scope
            .interaction(interaction, &action_context)
            .map_err(|e| RenderError::MalformedInteraction {
                interaction_id: interaction.id.clone(),
                message: e.to_string(),
            })?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::animation::{AnimationPresetRegistry, AnimationRuntime, AnimationSettings};
    use crate::renderer::leaf::LeafRegistry;
    use invitation_runtime::schema::{
        BlockLayout, BorderStyle, ElementAnimationConfig, EntranceAnimation, TextStyle,
    };
    use invitation_runtime::{PresetRegistry, resolve_style};
    use serde_json::json;

    fn data() -> WeddingData {
        WeddingData::new(json!({
            "couple": {
                "groom": { "name": "민준" },
                "bride": { "name": "서연" }
            },
            "wedding": { "date": "2025-05-24", "time": "14:00" }
        }))
    }

    #[test]
    fn test_value_beats_binding() {
        let element = Element::new("t", ElementType::Text)
            .with_value("직접 입력")
            .with_binding("couple.groom.name");
        let content = resolve_content(&element, &data(), &ResolveOptions::default());
        assert_eq!(content.text, "직접 입력");
    }

    #[test]
    fn test_binding_then_fallback_then_empty() {
        let options = ResolveOptions::default();
        let bound = Element::new("t", ElementType::Text).with_binding("couple.bride.name");
        assert_eq!(resolve_content(&bound, &data(), &options).text, "서연");

        let fallback = Element::new("t", ElementType::Text)
            .with_binding("couple.groom.nameEn")
            .with_fallback("couple.groom.name");
        assert_eq!(resolve_content(&fallback, &data(), &options).text, "민준");

        let missing = Element::new("t", ElementType::Text).with_binding("venue.name");
        let content = resolve_content(&missing, &data(), &options);
        assert_eq!(content.text, "");
        assert!(content.value.is_none());
    }

    #[test]
    fn test_empty_value_falls_through() {
        let element = Element::new("t", ElementType::Text)
            .with_value("")
            .with_binding("couple.groom.name");
        let content = resolve_content(&element, &data(), &ResolveOptions::default());
        assert_eq!(content.text, "민준");
    }

    #[test]
    fn test_format_wins() {
        let element = Element::new("t", ElementType::Text)
            .with_value("무시됨")
            .with_prop("format", "{couple.groom.name} ♥ {couple.bride.name}");
        let content = resolve_content(&element, &data(), &ResolveOptions::default());
        assert_eq!(content.text, "민준 ♥ 서연");
    }

    #[test]
    fn test_element_style_resolves_tokens() {
        let tokens = ResolvedTokens::default();
        let style = ElementStyle {
            text: Some(TextStyle {
                font_size: Some(18.0),
                color: Some("accent-default".to_string()),
                ..Default::default()
            }),
            background: Some(ColorValue::Solid("$bg-card".to_string())),
            border: Some(BorderStyle {
                width: 1.0,
                color: "color.border".to_string(),
                style: "solid".to_string(),
                radius: 8.0,
            }),
            shadow: Some("shadow-md".to_string()),
            opacity: Some(1.5),
        };

        let css = element_style(&ElementType::Text, Some(&style), &tokens);
        insta::assert_debug_snapshot!(css, @r###"
        {
            "background": "#ffffff",
            "border": "1px solid #e5e5e5",
            "border-radius": "8px",
            "box-shadow": "var(--shadow-md)",
            "color": "#c9a86c",
            "font-family": "var(--font-body)",
            "font-size": "18px",
            "opacity": "1",
        }
        "###);
    }

    #[test]
    fn test_group_and_unknown_type() {
        let style = resolve_style(&Default::default(), &PresetRegistry::builtin());
        let data = data();
        let leaves = LeafRegistry::builtin();
        let presets = AnimationPresetRegistry::builtin();
        let ctx = RenderContext {
            data: &data,
            style: &style,
            viewport: Viewport::default(),
            leaves: &leaves,
            presets: &presets,
            resolve_options: ResolveOptions::default(),
        };
        let layout = BlockLayout::default();
        let block = BlockContext {
            block_id: "hero",
            tokens: style.tokens.clone(),
            layout: &layout,
            height_px: 844.0,
            element_ids: vec!["card".into(), "name".into(), "odd".into()],
        };
        let mut runtime = AnimationRuntime::headless(AnimationSettings::default());
        let mut scope = AnimationScope::begin(&mut runtime, "hero");

        let group = Element::new("card", ElementType::Group)
            .with_frame(10.0, 10.0, 80.0, 50.0)
            .with_children(vec![
                Element::new("name", ElementType::Text)
                    .with_binding("couple.groom.name")
                    .with_frame(0.0, 50.0, 100.0, 10.0),
                Element::new("odd", ElementType::Other("sparkle".into())),
            ]);
        let parent = ParentBox {
            width: 390.0,
            height: 844.0,
        };
        let node = render_element(&group, Placement::Absolute(parent), &ctx, &block, &mut scope).unwrap();

        assert_eq!(node.kind, NodeKind::Group);
        assert_eq!(node.style_value("width"), Some("312px"));
        let name = node.find("name").unwrap();
        assert_eq!(name.text.as_deref(), Some("민준"));
        // 子元素相对 group：50% × 422px
        assert_eq!(name.style_value("top"), Some("211px"));
        assert_eq!(node.find("odd").map(|n| n.kind), Some(NodeKind::Placeholder));
    }

    #[test]
    fn test_entrance_registers_scroll_trigger() {
        let style = resolve_style(&Default::default(), &PresetRegistry::builtin());
        let data = data();
        let leaves = LeafRegistry::builtin();
        let presets = AnimationPresetRegistry::builtin();
        let ctx = RenderContext {
            data: &data,
            style: &style,
            viewport: Viewport::default(),
            leaves: &leaves,
            presets: &presets,
            resolve_options: ResolveOptions::default(),
        };
        let layout = BlockLayout::default();
        let block = BlockContext {
            block_id: "hero",
            tokens: style.tokens.clone(),
            layout: &layout,
            height_px: 844.0,
            element_ids: vec!["title".into()],
        };
        let mut runtime = AnimationRuntime::headless(AnimationSettings::default());

        let mut element = Element::new("title", ElementType::Text).with_value("초대합니다");
        element.animation = Some(ElementAnimationConfig {
            entrance: Some(EntranceAnimation {
                preset: Some("fade-in".into()),
                custom: None,
                delay: None,
                duration: None,
            }),
            ..Default::default()
        });

        {
            let mut scope = AnimationScope::begin(&mut runtime, "hero");
            render_element(&element, Placement::Flow(LayoutDirection::Vertical), &ctx, &block, &mut scope)
                .unwrap();
            assert_eq!(scope.finish().registrations(), 1);
        }
        assert_eq!(runtime.registered_in_scope("hero"), 1);

        // 进入视口后淡入开始
        assert_eq!(runtime.observe_scroll("title", 600.0, 100.0, 844.0), 1);
        runtime.tick(250.0);
        let opacity = runtime
            .engine()
            .borrow()
            .value("title", "opacity")
            .and_then(|v| v.as_number())
            .unwrap();
        assert!(opacity > 0.0 && opacity < 1.0);
    }
}
