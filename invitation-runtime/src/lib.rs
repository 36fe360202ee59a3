//! # Invitation Runtime
//!
//! 邀请函文档渲染管线的纯逻辑核心，不依赖任何 IO、时钟或渲染后端。
//!
//! ## 架构概述
//!
//! `invitation-runtime` 负责把文档数据"解析"成宿主可以直接使用的值：
//!
//! ```text
//! Document ──► binding / interpolate ──► 文本内容
//!          ──► style                 ──► ResolvedStyle ──► CSS 变量
//!          ──► size                  ──► 像素几何 / 布局样式
//!          ──► machine / diagnostic  ──► 校验结果
//! ```
//!
//! 宿主（`invitation-host`）在此基础上完成动画调度与节点树渲染。
//!
//! ## 核心类型
//!
//! - [`Document`]：邀请函文档（只读快照）
//! - [`WeddingData`]：绑定数据
//! - [`ResolvedStyle`]：三层样式解析结果
//! - [`DiagnosticResult`]：静态检查结果
//!
//! ## 使用示例
//!
//! ```ignore
//! use invitation_runtime::{Document, PresetRegistry, interpolate, resolve_style};
//!
//! let document = Document::from_json(text)?;
//! let style = resolve_style(&document.style, &PresetRegistry::builtin());
//! let title = interpolate("{couple.groom.name} ♥ {couple.bride.name}", &document.data);
//! ```
//!
//! ## 模块结构
//!
//! - [`schema`]：文档数据模型
//! - [`binding`]：变量路径解析
//! - [`interpolate`]：`{path}` 格式串插值
//! - [`legacy`]：旧版 `{{path}}` 模板
//! - [`style`]：preset → quick → advanced 样式解析
//! - [`size`]：尺寸与布局计算
//! - [`machine`]：状态机守卫与校验
//! - [`diagnostic`]：文档静态检查
//! - [`history`]：动画事件记录
//! - [`error`]：错误类型定义

pub mod binding;
pub mod diagnostic;
pub mod error;
pub mod history;
pub mod interpolate;
pub mod legacy;
pub mod machine;
pub mod schema;
pub mod size;
pub mod style;

// 重导出核心类型
pub use binding::{BindingValue, DateFormat, ResolveOptions, resolve, resolve_with};
pub use diagnostic::{Diagnostic, DiagnosticLevel, DiagnosticResult, analyze_document};
pub use error::{DocumentError, InvitationError, InvitationResult, PathError};
pub use history::{History, HistoryEvent};
pub use interpolate::{
    InterpolateOptions, InterpolationResult, MissingBehavior, interpolate, interpolate_with,
    interpolate_with_details, validate_format,
};
pub use machine::{Guard, GuardContext, evaluate_guard, validate_state_machine};
pub use schema::{Block, BlockType, Document, Element, ElementType, WeddingData};
pub use size::{Frame, Viewport};
pub use style::{CssProperties, PresetRegistry, ResolvedStyle, ResolvedTokens, resolve_style};

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_public_api_accessible() {
        let data = WeddingData::new(json!({
            "couple": {
                "groom": { "name": "민준" },
                "bride": { "name": "서연" }
            }
        }));

        let text = interpolate("{couple.groom.name} ♥ {couple.bride.name}", &data);
        assert_eq!(text, "민준 ♥ 서연");
        assert_eq!(legacy::render("{{couple.bride.name}}", &data), "서연");

        let style = resolve_style(&Default::default(), &PresetRegistry::builtin());
        assert!(style.tokens.get("bg-page").is_some());

        let result = analyze_document(&Document::default());
        assert!(result.is_empty());

        let _viewport = Viewport::default();
        let _history = History::new();
    }
}
