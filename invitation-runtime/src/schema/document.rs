//! 文档根节点

use serde::{Deserialize, Serialize};

use super::{Block, GlobalAnimation, StyleSystem, WeddingData};
use crate::error::{DocumentError, InvitationResult};

/// 当前支持的最高 schema 版本
pub const SUPPORTED_SCHEMA_VERSION: u32 = 2;

fn default_version() -> u32 {
    SUPPORTED_SCHEMA_VERSION
}

/// 文档元数据
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentMeta {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub created_at: String,
    #[serde(default)]
    pub updated_at: String,
}

/// 邀请函文档
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    pub id: String,
    #[serde(default = "default_version")]
    pub version: u32,
    #[serde(default)]
    pub meta: DocumentMeta,
    #[serde(default)]
    pub style: StyleSystem,
    #[serde(default)]
    pub animation: GlobalAnimation,
    /// 数组顺序即显示顺序
    #[serde(default)]
    pub blocks: Vec<Block>,
    #[serde(default)]
    pub data: WeddingData,
}

impl Document {
    /// 从 JSON 文本解析文档
    ///
    /// 版本号高于 [`SUPPORTED_SCHEMA_VERSION`] 的文档会被拒绝。
    pub fn from_json(text: &str) -> InvitationResult<Self> {
        let document: Document =
            serde_json::from_str(text).map_err(|e| DocumentError::Decode {
                message: e.to_string(),
            })?;

        if document.version > SUPPORTED_SCHEMA_VERSION {
            return Err(DocumentError::UnsupportedVersion {
                found: document.version,
                supported: SUPPORTED_SCHEMA_VERSION,
            }
            .into());
        }

        Ok(document)
    }

    /// 序列化为 JSON 文本（保留 block/element 顺序与三层样式结构）
    pub fn to_json_pretty(&self) -> InvitationResult<String> {
        serde_json::to_string_pretty(self).map_err(|e| {
            DocumentError::Encode {
                message: e.to_string(),
            }
            .into()
        })
    }

    /// 按 id 查找 block
    pub fn block(&self, id: &str) -> Option<&Block> {
        self.blocks.iter().find(|b| b.id == id)
    }

    /// 已启用的 block（按显示顺序）
    pub fn enabled_blocks(&self) -> impl Iterator<Item = &Block> {
        self.blocks.iter().filter(|b| b.enabled)
    }

    /// 返回替换了 blocks 的新文档
    pub fn with_blocks(&self, blocks: Vec<Block>) -> Self {
        Self {
            blocks,
            ..self.clone()
        }
    }
}
