//! # Leaf 模块
//!
//! 叶子渲染器：按元素类型把已解析的内容装饰到节点上。
//!
//! 位置与样式已经由元素渲染器写入节点，叶子只负责类型相关的部分。
//! 注册表可以整体替换，宿主可以为某个类型提供自己的实现。

use std::collections::HashMap;

use chrono::{Datelike, NaiveDate};
use invitation_runtime::ElementType;
use invitation_runtime::binding::parse_date;
use invitation_runtime::schema::Element;

use super::element::ElementContent;
use super::visual::VisualNode;

/// 叶子渲染器
pub trait LeafRenderer {
    fn render(&self, element: &Element, content: &ElementContent, node: &mut VisualNode);
}

/// 叶子渲染器注册表，按元素类型索引
#[derive(Default)]
pub struct LeafRegistry {
    renderers: HashMap<ElementType, Box<dyn LeafRenderer>>,
}

impl std::fmt::Debug for LeafRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut types: Vec<&str> = self.renderers.keys().map(ElementType::as_str).collect();
        types.sort_unstable();
        f.debug_struct("LeafRegistry").field("types", &types).finish()
    }
}

impl LeafRegistry {
    pub fn empty() -> Self {
        Self::default()
    }

    /// 8 种内置叶子类型
    pub fn builtin() -> Self {
        let mut registry = Self::empty();
        registry.register(ElementType::Text, TextLeaf);
        registry.register(ElementType::Image, ImageLeaf);
        registry.register(ElementType::Shape, ShapeLeaf);
        registry.register(ElementType::Button, ButtonLeaf);
        registry.register(ElementType::Icon, IconLeaf);
        registry.register(ElementType::Divider, DividerLeaf);
        registry.register(ElementType::Map, MapLeaf);
        registry.register(ElementType::Calendar, CalendarLeaf);
        registry
    }

    pub fn register(&mut self, element_type: ElementType, renderer: impl LeafRenderer + 'static) {
        self.renderers.insert(element_type, Box::new(renderer));
    }

    pub fn get(&self, element_type: &ElementType) -> Option<&dyn LeafRenderer> {
        self.renderers.get(element_type).map(|r| r.as_ref())
    }

    pub fn contains(&self, element_type: &ElementType) -> bool {
        self.renderers.contains_key(element_type)
    }
}

// =============================================================================
// 内置叶子
// =============================================================================

struct TextLeaf;

impl LeafRenderer for TextLeaf {
    fn render(&self, _element: &Element, content: &ElementContent, node: &mut VisualNode) {
        node.text = Some(content.text.clone());
        node.style
            .entry("white-space".into())
            .or_insert_with(|| "pre-wrap".into());
    }
}

struct ImageLeaf;

impl LeafRenderer for ImageLeaf {
    fn render(&self, element: &Element, content: &ElementContent, node: &mut VisualNode) {
        if let Some(src) = content.first_url() {
            node.attributes.insert("src".into(), src.to_string());
        }
        node.attributes.insert(
            "alt".into(),
            element.prop_str("alt").unwrap_or_default().to_string(),
        );
        node.style.insert(
            "object-fit".into(),
            element.prop_str("objectFit").unwrap_or("cover").to_string(),
        );
    }
}

struct ShapeLeaf;

impl LeafRenderer for ShapeLeaf {
    fn render(&self, element: &Element, _content: &ElementContent, node: &mut VisualNode) {
        let shape = element.prop_str("shape").unwrap_or("rectangle");
        node.attributes.insert("shape".into(), shape.to_string());
        if let Some(fill) = element.prop_str("fill") {
            node.style.insert("background".into(), fill.to_string());
        }
        if shape == "circle" {
            node.style.insert("border-radius".into(), "50%".into());
        }
    }
}

struct ButtonLeaf;

impl LeafRenderer for ButtonLeaf {
    fn render(&self, element: &Element, content: &ElementContent, node: &mut VisualNode) {
        let label = if content.text.is_empty() {
            element.prop_str("label").unwrap_or_default()
        } else {
            content.text.as_str()
        };
        node.text = Some(label.to_string());
        if let Some(action) = element.prop_str("action") {
            node.attributes.insert("action".into(), action.to_string());
        }
        node.style.insert("cursor".into(), "pointer".into());
    }
}

struct IconLeaf;

impl LeafRenderer for IconLeaf {
    fn render(&self, element: &Element, content: &ElementContent, node: &mut VisualNode) {
        let name = element
            .prop_str("icon")
            .or_else(|| (!content.text.is_empty()).then_some(content.text.as_str()))
            .unwrap_or("heart");
        node.attributes.insert("icon".into(), name.to_string());
    }
}

struct DividerLeaf;

impl LeafRenderer for DividerLeaf {
    fn render(&self, element: &Element, _content: &ElementContent, node: &mut VisualNode) {
        let thickness = element.prop_f64("thickness").unwrap_or(1.0);
        let color = element
            .prop_str("color")
            .unwrap_or("var(--border-default)");
        let line = element.prop_str("lineStyle").unwrap_or("solid");
        node.style
            .insert("border-top".into(), format!("{}px {} {}", thickness, line, color));
    }
}

struct MapLeaf;

impl LeafRenderer for MapLeaf {
    fn render(&self, element: &Element, content: &ElementContent, node: &mut VisualNode) {
        node.attributes
            .insert("address".into(), content.text.clone());
        node.attributes.insert(
            "provider".into(),
            element.prop_str("provider").unwrap_or("kakao").to_string(),
        );
        for key in ["lat", "lng"] {
            if let Some(v) = element.prop_f64(key) {
                node.attributes.insert(key.into(), v.to_string());
            }
        }
    }
}

/// 月历：高亮婚礼当天
struct CalendarLeaf;

const WEEKDAY_LABELS: [&str; 7] = ["일", "월", "화", "수", "목", "금", "토"];

impl LeafRenderer for CalendarLeaf {
    fn render(&self, _element: &Element, content: &ElementContent, node: &mut VisualNode) {
        let Some(date) = parse_date(&content.text) else {
            node.text = Some(content.text.clone());
            return;
        };
        node.attributes.insert("date".into(), date.to_string());
        node.children.extend(month_grid(date));
    }
}

fn days_in_month(year: i32, month: u32) -> u32 {
    let (next_year, next_month) = if month == 12 { (year + 1, 1) } else { (year, month + 1) };
    NaiveDate::from_ymd_opt(next_year, next_month, 1)
        .and_then(|d| d.pred_opt())
        .map(|d| d.day())
        .unwrap_or(30)
}

/// 标题行 + 星期行 + 按周排列的日期
fn month_grid(date: NaiveDate) -> Vec<VisualNode> {
    let mut nodes = vec![VisualNode::part("calendar-title")
        .with_text(format!("{}년 {}월", date.year(), date.month()))];

    let mut header = VisualNode::part("calendar-week");
    for label in WEEKDAY_LABELS {
        header.children.push(VisualNode::part("calendar-weekday").with_text(label));
    }
    nodes.push(header);

    let offset = date
        .with_day(1)
        .map(|first| first.weekday().num_days_from_sunday())
        .unwrap_or(0);
    let total = days_in_month(date.year(), date.month());

    let mut week = VisualNode::part("calendar-week");
    for _ in 0..offset {
        week.children.push(VisualNode::part("calendar-empty"));
    }
    for day in 1..=total {
        let mut cell = VisualNode::part("calendar-day").with_text(day.to_string());
        if day == date.day() {
            cell = cell
                .with_attr("highlight", "true")
                .with_style("background", "var(--accent-default)")
                .with_style("color", "var(--fg-on-accent)")
                .with_style("border-radius", "50%");
        }
        week.children.push(cell);
        if week.children.len() == 7 {
            nodes.push(std::mem::replace(&mut week, VisualNode::part("calendar-week")));
        }
    }
    if !week.children.is_empty() {
        nodes.push(week);
    }
    nodes
}
