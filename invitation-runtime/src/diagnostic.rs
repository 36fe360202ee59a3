//! # 诊断模块
//!
//! 提供文档静态检查和诊断 API，不依赖 IO 或渲染器。
//!
//! ## 设计原则
//!
//! - 纯函数 API，可在无 IO 环境下运行
//! - 诊断分级：Error（必须修复）、Warn（建议修复）、Info（信息提示）
//! - 结构问题只作为诊断返回，从不阻断渲染

use std::collections::HashMap;

use crate::binding::{self, is_valid_variable_path};
use crate::interpolate::validate_format;
use crate::machine::validate_state_machine;
use crate::schema::{Document, Element};

/// 诊断级别
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum DiagnosticLevel {
    /// 信息提示
    Info,
    /// 警告（建议修复）
    Warn,
    /// 错误（必须修复）
    Error,
}

impl std::fmt::Display for DiagnosticLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Info => write!(f, "INFO"),
            Self::Warn => write!(f, "WARN"),
            Self::Error => write!(f, "ERROR"),
        }
    }
}

/// 诊断条目
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    /// 诊断级别
    pub level: DiagnosticLevel,
    /// 来源（`block:hero`、`stateMachine:lightbox` ...）
    pub source: String,
    /// 来源内的位置（元素 id、`transitions[2]` ...）
    pub location: Option<String>,
    /// 诊断消息
    pub message: String,
    /// 诊断详情（可选）
    pub detail: Option<String>,
}

impl Diagnostic {
    fn new(level: DiagnosticLevel, source: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            level,
            source: source.into(),
            location: None,
            message: message.into(),
            detail: None,
        }
    }

    /// 创建错误诊断
    pub fn error(source: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(DiagnosticLevel::Error, source, message)
    }

    /// 创建警告诊断
    pub fn warn(source: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(DiagnosticLevel::Warn, source, message)
    }

    /// 创建信息诊断
    pub fn info(source: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(DiagnosticLevel::Info, source, message)
    }

    /// 设置位置
    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    /// 设置详情
    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.level, self.source)?;
        if let Some(location) = &self.location {
            write!(f, " @ {}", location)?;
        }
        write!(f, ": {}", self.message)?;
        if let Some(detail) = &self.detail {
            write!(f, "\n  | {}", detail)?;
        }
        Ok(())
    }
}

/// 诊断结果
#[derive(Debug, Clone, Default)]
pub struct DiagnosticResult {
    /// 诊断条目列表
    pub diagnostics: Vec<Diagnostic>,
}

impl DiagnosticResult {
    /// 创建空结果
    pub fn new() -> Self {
        Self::default()
    }

    /// 添加诊断
    pub fn push(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }

    /// 合并另一个结果
    pub fn merge(&mut self, other: DiagnosticResult) {
        self.diagnostics.extend(other.diagnostics);
    }

    /// 获取错误数量
    pub fn error_count(&self) -> usize {
        self.diagnostics
            .iter()
            .filter(|d| d.level == DiagnosticLevel::Error)
            .count()
    }

    /// 获取警告数量
    pub fn warn_count(&self) -> usize {
        self.diagnostics
            .iter()
            .filter(|d| d.level == DiagnosticLevel::Warn)
            .count()
    }

    /// 是否有错误
    pub fn has_errors(&self) -> bool {
        self.error_count() > 0
    }

    /// 是否为空
    pub fn is_empty(&self) -> bool {
        self.diagnostics.is_empty()
    }

    /// 按级别过滤
    pub fn filter_by_level(&self, min_level: DiagnosticLevel) -> Vec<&Diagnostic> {
        self.diagnostics
            .iter()
            .filter(|d| d.level >= min_level)
            .collect()
    }
}

//=============================================================================
// 文档分析 API
//=============================================================================

/// 分析文档，返回诊断结果
///
/// 执行以下检查：
/// - 重复的 block id（Error）
/// - 未知的绑定路径、格式错误的绑定路径（Warn）
/// - 无法解析的文本格式串（Warn）
/// - 未知的元素类型（Info，渲染时显示占位）
/// - 全局状态机定义
pub fn analyze_document(document: &Document) -> DiagnosticResult {
    let mut result = DiagnosticResult::new();

    let mut first_seen: HashMap<&str, usize> = HashMap::new();
    for (index, block) in document.blocks.iter().enumerate() {
        if let Some(previous) = first_seen.insert(block.id.as_str(), index) {
            result.push(
                Diagnostic::error(
                    format!("block:{}", block.id),
                    format!("重复的 block id: **{}**", block.id),
                )
                .with_detail(format!("第 {} 个与第 {} 个 block 使用了相同的 id", previous + 1, index + 1)),
            );
        }
    }

    for block in &document.blocks {
        let source = format!("block:{}", block.id);
        for element in block.walk_elements() {
            analyze_element(&source, element, &mut result);
        }
    }

    for machine in &document.animation.state_machines {
        result.merge(validate_state_machine(machine));
    }

    result
}

fn analyze_element(source: &str, element: &Element, result: &mut DiagnosticResult) {
    for path in [element.binding.as_deref(), element.binding_fallback.as_deref()]
        .into_iter()
        .flatten()
    {
        match binding::parse_path(path) {
            Err(error) => result.push(
                Diagnostic::warn(source, error.to_string()).with_location(&element.id),
            ),
            Ok(_) if !is_valid_variable_path(path) => result.push(
                Diagnostic::warn(source, format!("未知的绑定路径: {}", path))
                    .with_location(&element.id),
            ),
            Ok(_) => {}
        }
    }

    if let Some(format) = element.text_format() {
        let validation = validate_format(format);
        for error in validation.errors {
            result.push(
                Diagnostic::warn(source, format!("格式串错误: {}", error))
                    .with_location(&element.id)
                    .with_detail(format.to_string()),
            );
        }
    }

    if !element.element_type.is_known() {
        result.push(
            Diagnostic::info(
                source,
                format!("未知的元素类型: {}", element.element_type),
            )
            .with_location(&element.id),
        );
    }
}
