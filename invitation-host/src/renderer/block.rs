//! # Block 模块
//!
//! 单个 block 的渲染与挂载。
//!
//! ## 流程
//!
//! 1. 禁用的 block 不输出，也不注册任何触发器
//! 2. 文档 token → block 主题覆盖 → block 级 token
//! 3. 容器样式：高度、背景、内边距、布局模式
//! 4. 元素按顺序渲染（group 递归）
//! 5. block 级动画：入场、滚动、交互
//!
//! 任一注册失败时，已完成的注册随作用域一起注销，不留半挂载状态。

use invitation_runtime::schema::{Block, BlockLayout, LayoutMode, ScrollTrigger, Trigger};
use invitation_runtime::size::{auto_layout_container_style, block_height_px, block_height_style, px};
use invitation_runtime::style::{ResolvedTokens, apply_theme_config, tokens_to_css_variables};
use invitation_runtime::CssProperties;
use tracing::{debug, warn};

use super::context::{AnimationScope, BlockContext, ParentBox, RenderContext, ScopeMount};
use super::element::{
    ENTRANCE_SCROLL_START, Placement, color_value_css, render_element, resolve_color,
};
use super::special::render_special;
use super::visual::{NodeKind, VisualNode};
use crate::animation::{ActionContext, AnimationRuntime};
use crate::error::RenderError;

/// 已挂载的 block：节点树与它的动画作用域
#[derive(Debug)]
pub struct MountedBlock {
    pub node: VisualNode,
    pub scope: ScopeMount,
}

impl MountedBlock {
    /// 注销该 block 的全部触发器并停止其正在运行的动画，重复调用无副作用
    pub fn unmount(&self, runtime: &mut AnimationRuntime) {
        self.scope.unmount(runtime);
    }
}

/// 渲染 block，返回节点树；禁用时返回 `None`
pub fn render_block(
    block: &Block,
    ctx: &RenderContext<'_>,
    runtime: &mut AnimationRuntime,
) -> Result<Option<VisualNode>, RenderError> {
    Ok(mount_block(block, ctx, runtime)?.map(|mounted| mounted.node))
}

/// 渲染并挂载 block，保留注销句柄
pub fn mount_block(
    block: &Block,
    ctx: &RenderContext<'_>,
    runtime: &mut AnimationRuntime,
) -> Result<Option<MountedBlock>, RenderError> {
    if !block.enabled {
        debug!(block_id = %block.id, "block 已禁用，跳过");
        return Ok(None);
    }

    let tokens = block_tokens(block, ctx);
    let height_px = block_height_px(&block.height, ctx.viewport);
    let element_ids = block
        .walk_elements()
        .into_iter()
        .map(|e| e.id.clone())
        .collect();
    let block_ctx = BlockContext {
        block_id: &block.id,
        tokens,
        layout: &block.layout,
        height_px,
        element_ids,
    };

    let mut scope = AnimationScope::begin(runtime, &block.id);
    match build_block(block, ctx, &block_ctx, &mut scope) {
        Ok(node) => Ok(Some(MountedBlock {
            node,
            scope: scope.finish(),
        })),
        Err(e) => {
            let removed = scope.runtime.cleanup_scope(&block.id);
            warn!(block_id = %block.id, removed, error = %e, "block 挂载失败，已注销其触发器");
            Err(e)
        }
    }
}

/// block 级 token：文档 token 与 quick 的 block 模式，再叠加 block 主题
fn block_tokens(block: &Block, ctx: &RenderContext<'_>) -> ResolvedTokens {
    let base = ctx.style.tokens_for_block(&block.id);
    block
        .style
        .as_ref()
        .and_then(|style| style.theme.as_ref())
        .and_then(|theme| apply_theme_config(base, theme))
        .unwrap_or_else(|| base.clone())
}

fn container_style(block: &Block, block_ctx: &BlockContext<'_>, ctx: &RenderContext<'_>) -> CssProperties {
    let mut css = block_height_style(&block.height, ctx.viewport);
    css.insert("position".into(), "relative".into());
    css.insert("width".into(), "100%".into());
    css.insert("overflow".into(), "hidden".into());

    if block.layout.mode == LayoutMode::Auto {
        css.extend(auto_layout_container_style(&block.layout));
    }

    // 与文档 token 不同时写成局部 CSS 变量
    if block_ctx.tokens != ctx.style.tokens {
        css.extend(tokens_to_css_variables(&block_ctx.tokens));
    }

    let background = block
        .style
        .as_ref()
        .and_then(|s| s.background.as_ref())
        .map(|bg| color_value_css(bg, &block_ctx.tokens))
        .unwrap_or_else(|| resolve_color("bg-section", &block_ctx.tokens));
    css.insert("background".into(), background);

    if let Some(padding) = block.style.as_ref().and_then(|s| s.padding) {
        let p = padding.to_padding();
        css.insert(
            "padding".into(),
            format!("{} {} {} {}", px(p.top), px(p.right), px(p.bottom), px(p.left)),
        );
    }
    css
}

fn placement(layout: &BlockLayout, parent: ParentBox) -> Placement {
    match layout.mode {
        LayoutMode::Auto => Placement::Flow(layout.direction),
        LayoutMode::Absolute => Placement::Absolute(parent),
    }
}

fn build_block(
    block: &Block,
    ctx: &RenderContext<'_>,
    block_ctx: &BlockContext<'_>,
    scope: &mut AnimationScope<'_>,
) -> Result<VisualNode, RenderError> {
    let mut node = VisualNode::new(NodeKind::Block, &block.id, block.block_type.as_str())
        .with_attr("data-block-type", block.block_type.as_str());
    if let Some(preset) = &block.preset_id {
        node.attributes.insert("data-preset".into(), preset.clone());
    }
    node.merge_style(container_style(block, block_ctx, ctx));

    let parent = ParentBox {
        width: ctx.viewport.width,
        height: block_ctx.height_px,
    };
    let placement = placement(&block.layout, parent);
    for element in &block.elements {
        node.children
            .push(render_element(element, placement, ctx, block_ctx, scope)?);
    }

    if let Some(special) = render_special(&block.block_type, ctx.data, &block_ctx.tokens) {
        node.children.push(special);
    }

    register_block_animations(block, ctx, block_ctx, scope)?;
    Ok(node)
}

fn register_block_animations(
    block: &Block,
    ctx: &RenderContext<'_>,
    block_ctx: &BlockContext<'_>,
    scope: &mut AnimationScope<'_>,
) -> Result<(), RenderError> {
    let Some(config) = &block.animation else {
        return Ok(());
    };

    let action_context = ActionContext::new(&block.id)
        .with_children(block.elements.iter().map(|e| e.id.clone()).collect())
        .with_known_targets(block_ctx.element_ids.clone());

    if let Some(action) = config
        .entrance
        .as_ref()
        .and_then(|entrance| ctx.presets.entrance_action(entrance))
    {
        let mut trigger = ScrollTrigger::new(ENTRANCE_SCROLL_START);
        trigger.target = Some(block.id.clone());
        trigger.once = Some(true);
        scope
            .trigger(&Trigger::Scroll(trigger), &action, &action_context)
            .map_err(|e| RenderError::animation(&block.id, e))?;
    }

    if let Some(scroll) = &config.scroll {
        let mut trigger = scroll.trigger.clone();
        trigger.target.get_or_insert_with(|| block.id.clone());
        scope
            .trigger(&Trigger::Scroll(trigger), &scroll.action, &action_context)
            .map_err(|e| RenderError::animation(&block.id, e))?;
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
