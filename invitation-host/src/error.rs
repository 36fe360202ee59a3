//! # Error 模块
//!
//! 定义 host 层的错误类型。
//!
//! 解析失败（未知路径、未知预设）从不报错；这里只覆盖动画边界上的失败
//! 和无法恢复的触发器定义错误。

use thiserror::Error;

/// 动画错误
///
/// 在动作应用边界被捕获并记录，出错的动作作为空操作处理。
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AnimationError {
    /// 无法识别的缓动表达式
    #[error("无效的缓动: {name}")]
    InvalidEasing { name: String },

    /// 无法解析的滚动位置（如 `"top 80%"`）
    #[error("无效的滚动位置: '{value}'")]
    InvalidScrollPosition { value: String },

    /// 目标选择器没有匹配任何元素
    #[error("目标选择器 '{selector}' 没有匹配任何元素")]
    NoTargets { selector: String },

    /// 未知的动画预设
    #[error("未知的动画预设: {id}")]
    UnknownPreset { id: String },
}

/// 渲染错误
///
/// 只在 block 级别产生，文档渲染器会把它转换为可见的降级节点。
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RenderError {
    /// 动画 / 触发器注册失败
    #[error("block '{block_id}' 的动画注册失败: {source}")]
    Animation {
        block_id: String,
        #[source]
        source: AnimationError,
    },

    /// 交互定义不完整
    #[error("交互 '{interaction_id}' 定义无效: {message}")]
    MalformedInteraction {
        interaction_id: String,
        message: String,
    },
}

impl RenderError {
    pub fn animation(block_id: impl Into<String>, source: AnimationError) -> Self {
        RenderError::Animation {
            block_id: block_id.into(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = RenderError::animation(
            "hero",
            AnimationError::InvalidScrollPosition {
                value: "sideways".to_string(),
            },
        );
        let message = err.to_string();
        assert!(message.contains("hero"));
        assert!(message.contains("sideways"));
    }
}
