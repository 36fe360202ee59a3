//! # Error 模块
//!
//! 定义 invitation-runtime 中使用的错误类型。
//!
//! 解析类函数（binding / interpolate / style）从不返回错误，
//! 这里只覆盖文档加载与路径语法这类结构性问题。

use thiserror::Error;

/// 文档加载错误
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DocumentError {
    /// JSON 解码失败
    #[error("文档解析失败: {message}")]
    Decode { message: String },

    /// JSON 编码失败
    #[error("文档序列化失败: {message}")]
    Encode { message: String },

    /// 不支持的 schema 版本
    #[error("不支持的文档版本 {found}，当前最高支持 {supported}")]
    UnsupportedVersion { found: u32, supported: u32 },
}

/// 变量路径语法错误
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PathError {
    /// 空路径
    #[error("变量路径为空")]
    Empty,

    /// 路径中存在空段（如 `a..b`）
    #[error("变量路径 '{path}' 含有空段")]
    EmptySegment { path: String },

    /// 数组下标格式错误
    #[error("变量路径 '{path}' 的下标无效: '{segment}'")]
    InvalidIndex { path: String, segment: String },
}

/// invitation-runtime 统一错误类型
#[derive(Error, Debug, Clone, PartialEq)]
pub enum InvitationError {
    /// 文档错误
    #[error("文档错误: {0}")]
    Document(#[from] DocumentError),

    /// 路径错误
    #[error("路径错误: {0}")]
    Path(#[from] PathError),
}

/// Result 类型别名
pub type InvitationResult<T> = Result<T, InvitationError>;
