//! # Document 模块
//!
//! 文档渲染：样式只解析一次，block 按顺序渲染，浮动层绘制在最上层。
//!
//! ## 设计理念
//!
//! - 单个 block 失败只影响它自己，渲染为可见的兜底节点
//! - 文档级交互挂在 `document` 作用域，浮动元素挂在 `floating` 作用域
//! - 状态机实例随渲染结果一起返回，由宿主驱动事件

use std::collections::BTreeMap;

use invitation_runtime::schema::{
    AnimationMood, BlockLayout, Document, FloatingAnchor, FloatingElement, FloatingPosition,
    LayoutMode,
};
use invitation_runtime::style::style_to_css_variables;
use invitation_runtime::{
    CssProperties, DiagnosticLevel, PresetRegistry, ResolveOptions, ResolvedStyle, Viewport, analyze_document,
    resolve_style,
};
use tracing::{error, info, warn};

use super::block::{MountedBlock, mount_block};
use super::context::{AnimationScope, BlockContext, ParentBox, RenderContext, ScopeMount};
use super::element::{Placement, render_element};
use super::leaf::LeafRegistry;
use super::visual::{NodeKind, VisualNode};
use crate::animation::{
    ActionContext, AnimationPresetRegistry, AnimationRuntime, AnimationSettings, RuntimeEvent,
    StateMachineInstance,
};
use crate::config::RendererConfig;

/// 文档级交互的动画作用域
pub const DOCUMENT_SCOPE: &str = "document";
/// 浮动元素的动画作用域
pub const FLOATING_SCOPE: &str = "floating";

const FLOATING_Z_INDEX: &str = "1000";
const FALLBACK_MESSAGE: &str = "이 섹션을 표시할 수 없습니다";

/// 文档渲染器
#[derive(Debug)]
pub struct DocumentRenderer {
    leaves: LeafRegistry,
    presets: AnimationPresetRegistry,
    styles: PresetRegistry,
    viewport: Viewport,
    resolve_options: ResolveOptions,
    prefers_reduced_motion: bool,
    fallback_preset: String,
    mood_override: Option<AnimationMood>,
}

impl Default for DocumentRenderer {
    fn default() -> Self {
        Self::new(&RendererConfig::default())
    }
}

impl DocumentRenderer {
    pub fn new(config: &RendererConfig) -> Self {
        Self {
            leaves: LeafRegistry::builtin(),
            presets: AnimationPresetRegistry::builtin(),
            styles: PresetRegistry::builtin(),
            viewport: config.viewport(),
            resolve_options: ResolveOptions::default(),
            prefers_reduced_motion: config.animation.reduced_motion,
            fallback_preset: config.style.fallback_preset.clone(),
            mood_override: config.animation.mood_override,
        }
    }

    /// 替换叶子渲染器注册表
    pub fn with_leaves(mut self, leaves: LeafRegistry) -> Self {
        self.leaves = leaves;
        self
    }

    pub fn with_presets(mut self, presets: AnimationPresetRegistry) -> Self {
        self.presets = presets;
        self
    }

    pub fn with_resolve_options(mut self, options: ResolveOptions) -> Self {
        self.resolve_options = options;
        self
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    /// 文档的动画设置（已结合宿主偏好）
    pub fn settings_for(&self, document: &Document) -> AnimationSettings {
        let mut settings =
            AnimationSettings::from_global(&document.animation, self.prefers_reduced_motion);
        if let Some(mood) = self.mood_override {
            settings.mood = mood;
        }
        settings
    }

    /// 为文档创建 headless 动画运行时
    pub fn create_runtime(&self, document: &Document) -> AnimationRuntime {
        AnimationRuntime::headless(self.settings_for(document))
    }

    /// 解析文档样式；未指定主题时使用配置的兜底主题，未知主题回落到默认 token
    pub fn resolve_style(&self, document: &Document) -> ResolvedStyle {
        let mut style = document.style.clone();
        match style.preset.as_deref() {
            None => style.preset = Some(self.fallback_preset.clone()),
            Some(id) if self.styles.theme(id).is_none() => {
                warn!(preset = id, "未知主题预设，使用默认 token");
            }
            Some(_) => {}
        }
        resolve_style(&style, &self.styles)
    }

    /// 渲染整个文档
    pub fn render(&self, document: &Document, runtime: &mut AnimationRuntime) -> RenderedDocument {
        let diagnostics = analyze_document(document);
        for diagnostic in diagnostics.filter_by_level(DiagnosticLevel::Warn) {
            warn!(
                source = %diagnostic.source,
                location = diagnostic.location.as_deref().unwrap_or(""),
                "{}",
                diagnostic.message
            );
        }

        let style = self.resolve_style(document);
        let ctx = RenderContext {
            data: &document.data,
            style: &style,
            viewport: self.viewport,
            leaves: &self.leaves,
            presets: &self.presets,
            resolve_options: self.resolve_options.clone(),
        };

        let mut root = VisualNode::new(NodeKind::Document, &document.id, "document");
        root.merge_style(style_to_css_variables(&style));
        root.style
            .insert("background".into(), style.tokens.value("bg-page").to_string());

        // 状态机先于交互创建，触发时总能读到当前状态
        let all_ids = document_element_ids(document);
        let machines = document
            .animation
            .state_machines
            .iter()
            .map(|definition| {
                let context = ActionContext::new(&definition.id).with_known_targets(all_ids.clone());
                StateMachineInstance::new(definition.clone(), runtime, context)
            })
            .collect();

        let mut blocks = BTreeMap::new();
        let mut failed = Vec::new();
        for block in &document.blocks {
            match mount_block(block, &ctx, runtime) {
                Ok(Some(mounted)) => {
                    root.children.push(mounted.node.clone());
                    blocks.insert(block.id.clone(), mounted);
                }
                Ok(None) => {}
                Err(e) => {
                    error!(block_id = %block.id, error = %e, "block 渲染失败");
                    root.children.push(
                        VisualNode::new(NodeKind::Fallback, &block.id, block.block_type.as_str())
                            .with_attr("error", e.to_string())
                            .with_text(FALLBACK_MESSAGE),
                    );
                    failed.push(block.id.clone());
                }
            }
        }

        let mut scopes = vec![self.register_document_interactions(document, &all_ids, runtime)];

        let (floating_layer, floating_scope) = self.render_floating(document, &ctx, runtime);
        if let Some(layer) = floating_layer {
            root.children.push(layer);
        }
        scopes.extend(floating_scope);

        info!(
            document_id = %document.id,
            blocks = blocks.len(),
            failed = failed.len(),
            triggers = runtime.registered_count(),
            "文档渲染完成"
        );

        RenderedDocument {
            root,
            blocks,
            failed,
            scopes,
            machines,
        }
    }

    fn register_document_interactions(
        &self,
        document: &Document,
        all_ids: &[String],
        runtime: &mut AnimationRuntime,
    ) -> ScopeMount {
        let mut scope = AnimationScope::begin(runtime, DOCUMENT_SCOPE);
        let context = ActionContext::new(&document.id).with_known_targets(all_ids.to_vec());
        for interaction in &document.animation.interactions {
            if let Err(e) = scope.interaction(interaction, &context) {
                warn!(interaction_id = %interaction.id, error = %e, "文档级交互注册失败，已跳过");
            }
        }
        scope.finish()
    }

    /// 浮动层：每个浮动元素按锚点固定在视口上
    fn render_floating(
        &self,
        document: &Document,
        ctx: &RenderContext<'_>,
        runtime: &mut AnimationRuntime,
    ) -> (Option<VisualNode>, Option<ScopeMount>) {
        let floating = &document.animation.floating_elements;
        if floating.is_empty() {
            return (None, None);
        }

        let layout = BlockLayout {
            mode: LayoutMode::Auto,
            ..Default::default()
        };
        let block_ctx = BlockContext {
            block_id: FLOATING_SCOPE,
            tokens: ctx.style.tokens.clone(),
            layout: &layout,
            height_px: ctx.viewport.height,
            element_ids: floating.iter().map(|f| f.element.id.clone()).collect(),
        };
        let parent = ParentBox {
            width: ctx.viewport.width,
            height: ctx.viewport.height,
        };

        let mut scope = AnimationScope::begin(runtime, FLOATING_SCOPE);
        let mut layer = VisualNode::new(NodeKind::FloatingLayer, FLOATING_SCOPE, "floating-layer")
            .with_style("position", "fixed")
            .with_style("inset", "0")
            .with_style("pointer-events", "none")
            .with_style("z-index", FLOATING_Z_INDEX);

        for item in floating {
            match render_element(&item.element, Placement::Absolute(parent), ctx, &block_ctx, &mut scope) {
                Ok(child) => {
                    let mut node = VisualNode::new(NodeKind::Floating, &item.id, "floating")
                        .with_style("pointer-events", "auto");
                    node.merge_style(anchor_style(item));
                    node.children.push(child);
                    layer.children.push(node);
                }
                Err(e) => {
                    warn!(floating_id = %item.id, error = %e, "浮动元素渲染失败，已跳过");
                }
            }
        }
        (Some(layer), Some(scope.finish()))
    }
}

/// 锚点与偏移 → 定位样式
fn anchor_style(item: &FloatingElement) -> CssProperties {
    let mut css = CssProperties::new();
    css.insert(
        "position".into(),
        match item.position {
            FloatingPosition::Fixed => "fixed",
            FloatingPosition::Sticky => "sticky",
        }
        .into(),
    );

    let (x, y) = (item.offset.x, item.offset.y);
    let mut set = |key: &str, value: String| {
        css.insert(key.into(), value);
    };
    match item.anchor {
        FloatingAnchor::TopLeft => {
            set("top", format!("{}px", y));
            set("left", format!("{}px", x));
        }
        FloatingAnchor::TopRight => {
            set("top", format!("{}px", y));
            set("right", format!("{}px", x));
        }
        FloatingAnchor::BottomLeft => {
            set("bottom", format!("{}px", y));
            set("left", format!("{}px", x));
        }
        FloatingAnchor::BottomRight => {
            set("bottom", format!("{}px", y));
            set("right", format!("{}px", x));
        }
        FloatingAnchor::Center => {
            set("top", "50%".into());
            set("left", "50%".into());
            set(
                "transform",
                format!("translate(calc(-50% + {}px), calc(-50% + {}px))", x, y),
            );
        }
    }
    css
}

/// 文档内所有元素 id（含浮动元素）
fn document_element_ids(document: &Document) -> Vec<String> {
    let mut ids: Vec<String> = document
        .blocks
        .iter()
        .flat_map(|block| block.walk_elements().into_iter().map(|e| e.id.clone()))
        .collect();
    ids.extend(
        document
            .animation
            .floating_elements
            .iter()
            .map(|f| f.element.id.clone()),
    );
    ids
}

/// 渲染结果：节点树、每个 block 的挂载句柄与状态机实例
#[derive(Debug)]
pub struct RenderedDocument {
    pub root: VisualNode,
    blocks: BTreeMap<String, MountedBlock>,
    failed: Vec<String>,
    /// 文档级与浮动层的作用域
    scopes: Vec<ScopeMount>,
    machines: Vec<StateMachineInstance>,
}

impl RenderedDocument {
    /// 已挂载的 block id
    pub fn mounted_blocks(&self) -> impl Iterator<Item = &str> {
        self.blocks.keys().map(String::as_str)
    }

    /// 渲染失败、以兜底节点显示的 block
    pub fn failed_blocks(&self) -> &[String] {
        &self.failed
    }

    pub fn machine(&self, id: &str) -> Option<&StateMachineInstance> {
        self.machines.iter().find(|m| m.id() == id)
    }

    pub fn machines(&self) -> &[StateMachineInstance] {
        &self.machines
    }

    /// 分发事件：先交给状态机，迁移产生的状态事件再与原事件一起交给触发器
    ///
    /// 返回触发器的触发次数。
    pub fn dispatch(&mut self, event: &RuntimeEvent, runtime: &mut AnimationRuntime) -> usize {
        let emitted: Vec<RuntimeEvent> = self
            .machines
            .iter_mut()
            .filter_map(|machine| machine.handle_event(event, runtime))
            .collect();

        let mut fired = runtime.dispatch(event);
        for state_event in &emitted {
            fired += runtime.dispatch(state_event);
        }
        fired
    }

    /// 手动让状态机迁移
    pub fn transition(
        &mut self,
        machine_id: &str,
        to: &str,
        runtime: &mut AnimationRuntime,
    ) -> Option<RuntimeEvent> {
        let machine = self.machines.iter_mut().find(|m| m.id() == machine_id)?;
        let event = machine.transition(to, runtime)?;
        runtime.dispatch(&event);
        Some(event)
    }

    /// 卸载单个 block：注销触发器并停止其动画；不存在时返回 `false`
    pub fn unmount_block(&mut self, block_id: &str, runtime: &mut AnimationRuntime) -> bool {
        match self.blocks.remove(block_id) {
            Some(mounted) => {
                mounted.unmount(runtime);
                true
            }
            None => false,
        }
    }

    /// 卸载全部：block、文档级交互、浮动元素与状态机
    pub fn unmount(&mut self, runtime: &mut AnimationRuntime) {
        for mounted in self.blocks.values() {
            mounted.unmount(runtime);
        }
        self.blocks.clear();
        for scope in &self.scopes {
            scope.unmount(runtime);
        }
        for machine in &mut self.machines {
            machine.destroy();
        }
    }
}
