//! # Renderer 模块
//!
//! 渲染系统，把邀请函文档转换为与 UI 框架无关的节点树。
//!
//! ## 渲染层次
//!
//! 1. 文档（Document）：全局 CSS 变量、状态机、文档级交互
//! 2. Block：token 覆盖、容器样式、block 级动画
//! 3. 元素（Element）：内容解析、定位、叶子渲染器
//! 4. 浮动层（Floating）：绘制在所有 block 之上
//!
//! 每个 block 的动画注册都挂在以 block id 命名的作用域下，
//! 卸载或重新挂载时整体注销。

mod block;
mod context;
mod document;
mod element;
mod leaf;
mod special;
mod visual;

pub use block::{MountedBlock, mount_block, render_block};
pub use context::{AnimationScope, BlockContext, ParentBox, RenderContext, ScopeMount};
pub use document::{DOCUMENT_SCOPE, DocumentRenderer, FLOATING_SCOPE, RenderedDocument};
pub use element::{
    ENTRANCE_SCROLL_START, ElementContent, Placement, element_style, render_element,
    resolve_color, resolve_content,
};
pub use leaf::{LeafRegistry, LeafRenderer};
pub use special::{has_special_renderer, render_special};
pub use visual::{NodeKind, VisualNode};
