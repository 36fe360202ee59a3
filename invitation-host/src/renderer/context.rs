//! 渲染上下文：文档级只解析一次的数据，以及 block 级的派生值

use invitation_runtime::schema::{AnimationAction, BlockLayout, Interaction, Trigger};
use invitation_runtime::style::ResolvedTokens;
use invitation_runtime::{ResolveOptions, ResolvedStyle, Viewport, WeddingData};

use super::leaf::LeafRegistry;
use crate::animation::{
    ActionContext, AnimationPresetRegistry, AnimationRuntime, TriggerCleanup,
};
use crate::error::AnimationError;

/// 文档级上下文，所有 block 共享
#[derive(Debug)]
pub struct RenderContext<'a> {
    pub data: &'a WeddingData,
    pub style: &'a ResolvedStyle,
    pub viewport: Viewport,
    pub leaves: &'a LeafRegistry,
    pub presets: &'a AnimationPresetRegistry,
    pub resolve_options: ResolveOptions,
}

/// block 级上下文
#[derive(Debug, Clone)]
pub struct BlockContext<'a> {
    pub block_id: &'a str,
    /// 已应用 block 覆盖的 token
    pub tokens: ResolvedTokens,
    pub layout: &'a BlockLayout,
    pub height_px: f64,
    /// block 内所有元素 id（通配选择器的匹配范围）
    pub element_ids: Vec<String>,
}

/// 元素的定位父级尺寸（px）
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParentBox {
    pub width: f64,
    pub height: f64,
}

/// 一个 block 的动画作用域：注册都挂在 block id 下
pub struct AnimationScope<'r> {
    pub runtime: &'r mut AnimationRuntime,
    scope: String,
    generation: u64,
    cleanups: Vec<TriggerCleanup>,
}

impl<'r> AnimationScope<'r> {
    /// 开始新的挂载，旧挂载的注销句柄随之失效
    pub fn begin(runtime: &'r mut AnimationRuntime, scope: &str) -> Self {
        let generation = runtime.begin_scope(scope);
        Self {
            runtime,
            scope: scope.to_string(),
            generation,
            cleanups: Vec::new(),
        }
    }

    pub fn scope(&self) -> &str {
        &self.scope
    }

    /// 注册触发器
    pub fn trigger(
        &mut self,
        trigger: &Trigger,
        action: &AnimationAction,
        context: &ActionContext,
    ) -> Result<(), AnimationError> {
        let cleanup = self
            .runtime
            .setup_trigger(&self.scope, trigger, action, context)?;
        self.cleanups.push(cleanup);
        Ok(())
    }

    /// 注册交互
    pub fn interaction(
        &mut self,
        interaction: &Interaction,
        context: &ActionContext,
    ) -> Result<(), AnimationError> {
        if let Some(cleanup) = self
            .runtime
            .setup_interaction(&self.scope, interaction, context)?
        {
            self.cleanups.push(cleanup);
        }
        Ok(())
    }

    /// 结束注册，得到可卸载的挂载记录
    pub fn finish(self) -> ScopeMount {
        ScopeMount {
            scope: self.scope,
            generation: self.generation,
            cleanups: self.cleanups,
        }
    }
}

/// 作用域的一次挂载：注销句柄与挂载时的代数
#[derive(Debug)]
pub struct ScopeMount {
    scope: String,
    generation: u64,
    cleanups: Vec<TriggerCleanup>,
}

impl ScopeMount {
    pub fn scope(&self) -> &str {
        &self.scope
    }

    /// 本次挂载登记的注册数
    pub fn registrations(&self) -> usize {
        self.cleanups.len()
    }

    /// 注销注册并停止作用域内正在运行的动作，重复调用无副作用
    ///
    /// 作用域已被重新挂载时只注销自己的句柄，不影响新的挂载。
    pub fn unmount(&self, runtime: &mut AnimationRuntime) {
        for cleanup in &self.cleanups {
            cleanup.cleanup();
        }
        runtime.end_scope(&self.scope, self.generation);
    }
}
