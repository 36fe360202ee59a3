//! # Visual 模块
//!
//! 渲染产物：与具体 UI 框架无关的节点树。
//!
//! 渲染器只输出"应该画什么"，宿主再把节点树映射到 DOM、原生视图或快照。

use std::collections::BTreeMap;

use invitation_runtime::CssProperties;
use serde::Serialize;

/// 节点种类
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum NodeKind {
    /// 文档根节点，携带全局 CSS 变量
    Document,
    Block,
    /// 叶子元素（text / image / ...）
    Element,
    /// group 元素，子元素以它为定位父级
    Group,
    /// 未知元素类型的空占位
    Placeholder,
    /// block 渲染失败时的可见兜底
    Fallback,
    /// 浮动层
    FloatingLayer,
    Floating,
    /// 叶子或专用子渲染器内部的结构节点
    Part,
}

/// 渲染节点
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VisualNode {
    pub kind: NodeKind,
    pub id: String,
    /// 元素类型、block 类型或结构节点名
    pub tag: String,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub attributes: BTreeMap<String, String>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub style: CssProperties,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<VisualNode>,
}

impl VisualNode {
    pub fn new(kind: NodeKind, id: impl Into<String>, tag: impl Into<String>) -> Self {
        Self {
            kind,
            id: id.into(),
            tag: tag.into(),
            attributes: BTreeMap::new(),
            style: CssProperties::new(),
            text: None,
            children: Vec::new(),
        }
    }

    /// 结构节点（id 为空）
    pub fn part(tag: impl Into<String>) -> Self {
        Self::new(NodeKind::Part, "", tag)
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    pub fn with_attr(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    pub fn with_style(mut self, property: impl Into<String>, value: impl Into<String>) -> Self {
        self.style.insert(property.into(), value.into());
        self
    }

    pub fn with_child(mut self, child: VisualNode) -> Self {
        self.children.push(child);
        self
    }

    /// 合并样式，后者覆盖前者
    pub fn merge_style(&mut self, style: CssProperties) {
        self.style.extend(style);
    }

    pub fn attr(&self, key: &str) -> Option<&str> {
        self.attributes.get(key).map(String::as_str)
    }

    pub fn style_value(&self, property: &str) -> Option<&str> {
        self.style.get(property).map(String::as_str)
    }

    /// 深度优先查找 id
    pub fn find(&self, id: &str) -> Option<&VisualNode> {
        if self.id == id {
            return Some(self);
        }
        self.children.iter().find_map(|child| child.find(id))
    }

    /// 统计某种节点的数量（含自身）
    pub fn count(&self, kind: NodeKind) -> usize {
        let own = usize::from(self.kind == kind);
        own + self.children.iter().map(|c| c.count(kind)).sum::<usize>()
    }

    /// 直接子节点中某种节点的 id 列表
    pub fn child_ids(&self, kind: NodeKind) -> Vec<&str> {
        self.children
            .iter()
            .filter(|c| c.kind == kind)
            .map(|c| c.id.as_str())
            .collect()
    }

    /// 子树中所有文本，按深度优先顺序用空格连接
    pub fn text_content(&self) -> String {
        let mut parts = Vec::new();
        self.collect_text(&mut parts);
        parts.join(" ")
    }

    fn collect_text<'a>(&'a self, out: &mut Vec<&'a str>) {
        if let Some(text) = self.text.as_deref().filter(|t| !t.is_empty()) {
            out.push(text);
        }
        for child in &self.children {
            child.collect_text(out);
        }
    }
}
