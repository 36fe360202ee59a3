//! # Size 模块
//!
//! 将抽象尺寸模式（hug / fill / fixed）和 block 高度转换为具体的布局原语。
//!
//! ## 坐标约定
//!
//! - 绝对定位元素的 `x` / `width` 是视口宽度的百分比
//! - `y` / `height` 是所在 block 高度的百分比
//! - block 高度为数字时单位是 vh；hug / fill 等非固定模式按视口高度的 50% 计算
//!
//! 所有函数都是纯函数，结果只取决于输入。

use serde::{Deserialize, Serialize};

use crate::schema::{
    AlignItems, BlockHeight, BlockLayout, Element, ElementConstraints, LayoutDirection,
    LayoutMode, SizeMode, SizeUnit,
};
use crate::style::CssProperties;

/// 视口尺寸（CSS px）
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            width: 390.0,
            height: 844.0,
        }
    }
}

impl Viewport {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

/// 元素在 block 内的绝对位置（px）
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Frame {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

/// 格式化 px 数值，保留两位小数
pub fn px(value: f64) -> String {
    format!("{}px", round2(value))
}

pub(crate) fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

// =============================================================================
// Block 高度
// =============================================================================

/// 固定尺寸换算为 px，`%` 以 `reference` 为基准
pub fn fixed_to_px(value: f64, unit: SizeUnit, viewport: Viewport, reference: f64) -> f64 {
    match unit {
        SizeUnit::Px => value,
        SizeUnit::Vh => value / 100.0 * viewport.height,
        SizeUnit::Vw => value / 100.0 * viewport.width,
        SizeUnit::Percent => value / 100.0 * reference,
    }
}

/// Block 高度（px）
pub fn block_height_px(height: &BlockHeight, viewport: Viewport) -> f64 {
    match height {
        BlockHeight::Vh(vh) => vh / 100.0 * viewport.height,
        BlockHeight::Mode(SizeMode::Fixed { value, unit }) => {
            fixed_to_px(*value, *unit, viewport, viewport.height)
        }
        BlockHeight::Mode(_) => viewport.height * 0.5,
    }
}

/// Block 容器的高度样式
pub fn block_height_style(height: &BlockHeight, viewport: Viewport) -> CssProperties {
    let mut css = CssProperties::new();
    match height {
        BlockHeight::Vh(vh) => {
            css.insert("min-height".into(), format!("{}vh", round2(*vh)));
        }
        BlockHeight::Mode(SizeMode::Fixed { .. }) => {
            css.insert("height".into(), px(block_height_px(height, viewport)));
        }
        BlockHeight::Mode(SizeMode::Hug) => {
            css.insert("height".into(), "fit-content".into());
        }
        BlockHeight::Mode(SizeMode::Fill) | BlockHeight::Mode(SizeMode::FillPortion { .. }) => {
            css.insert("min-height".into(), "100vh".into());
        }
    }
    css
}

// =============================================================================
// 定位模式
// =============================================================================

/// 元素是否使用绝对定位（未显式声明 auto 且带有 x / y 坐标）
pub fn has_absolute_position(element: &Element) -> bool {
    element.layout_mode != Some(LayoutMode::Auto) && element.x.is_some() && element.y.is_some()
}

/// 元素是否参与自动布局
///
/// 显式 `layoutMode: auto` 的元素总是参与；在 auto 模式的容器中，
/// 没有坐标的元素也参与，带坐标的元素仍然浮在流之上。
pub fn is_auto_layout_element(element: &Element, container: &BlockLayout) -> bool {
    match element.layout_mode {
        Some(LayoutMode::Auto) => true,
        Some(LayoutMode::Absolute) => false,
        None => container.mode == LayoutMode::Auto && !has_absolute_position(element),
    }
}

/// 绝对定位元素的 px 框
pub fn absolute_frame(element: &Element, viewport: Viewport, block_height: f64) -> Frame {
    Frame {
        x: element.x.unwrap_or(0.0) / 100.0 * viewport.width,
        y: element.y.unwrap_or(0.0) / 100.0 * block_height,
        width: element.width.unwrap_or(0.0) / 100.0 * viewport.width,
        height: element.height.unwrap_or(0.0) / 100.0 * block_height,
    }
}

/// 绝对定位样式
pub fn absolute_style(element: &Element, frame: Frame) -> CssProperties {
    let mut css = CssProperties::new();
    css.insert("position".into(), "absolute".into());
    css.insert("left".into(), px(frame.x));
    css.insert("top".into(), px(frame.y));
    css.insert("width".into(), px(frame.width));
    css.insert("height".into(), px(frame.height));
    if element.z_index != 0 {
        css.insert("z-index".into(), element.z_index.to_string());
    }
    if let Some(rotation) = element.rotation.filter(|r| *r != 0.0) {
        css.insert("transform".into(), format!("rotate({}deg)", round2(rotation)));
    }
    css
}

// =============================================================================
// 自动布局
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Axis {
    Main,
    Cross,
}

fn axis_for(dimension_is_width: bool, direction: LayoutDirection) -> Axis {
    match (direction, dimension_is_width) {
        (LayoutDirection::Horizontal, true) | (LayoutDirection::Vertical, false) => Axis::Main,
        _ => Axis::Cross,
    }
}

fn apply_size_mode(
    css: &mut CssProperties,
    property: &str,
    mode: SizeMode,
    axis: Axis,
    viewport: Viewport,
) {
    match (mode, axis) {
        (SizeMode::Fixed { value, unit }, _) => {
            let value = match unit {
                SizeUnit::Percent => format!("{}%", round2(value)),
                other => px(fixed_to_px(value, other, viewport, 0.0)),
            };
            css.insert(property.into(), value);
            if axis == Axis::Main {
                css.insert("flex-shrink".into(), "0".into());
            }
        }
        (SizeMode::Hug, _) => {
            css.insert(property.into(), "fit-content".into());
        }
        (SizeMode::Fill, Axis::Main) => {
            css.insert("flex".into(), "1 1 0".into());
        }
        (SizeMode::FillPortion { value }, Axis::Main) => {
            css.insert("flex".into(), format!("{} 1 0", round2(value.max(0.0))));
        }
        (SizeMode::Fill | SizeMode::FillPortion { .. }, Axis::Cross) => {
            css.insert("align-self".into(), "stretch".into());
        }
    }
}

fn apply_constraints(css: &mut CssProperties, constraints: &ElementConstraints) {
    let pairs = [
        ("min-width", constraints.min_width),
        ("max-width", constraints.max_width),
        ("min-height", constraints.min_height),
        ("max-height", constraints.max_height),
    ];
    for (property, value) in pairs {
        if let Some(v) = value {
            css.insert(property.into(), px(v));
        }
    }
}

fn align_value(align: AlignItems) -> &'static str {
    match align {
        AlignItems::Start => "flex-start",
        AlignItems::Center => "center",
        AlignItems::End => "flex-end",
        AlignItems::Stretch => "stretch",
    }
}

/// 自动布局元素的弹性盒样式
pub fn auto_layout_element_style(
    element: &Element,
    direction: LayoutDirection,
    viewport: Viewport,
) -> CssProperties {
    let mut css = CssProperties::new();
    css.insert("position".into(), "relative".into());

    let sizing = element.sizing.unwrap_or_default();
    apply_size_mode(
        &mut css,
        "width",
        sizing.width_or_default(),
        axis_for(true, direction),
        viewport,
    );
    apply_size_mode(
        &mut css,
        "height",
        sizing.height_or_default(),
        axis_for(false, direction),
        viewport,
    );

    if let Some(constraints) = &element.constraints {
        apply_constraints(&mut css, constraints);
    }
    if let Some(align) = element.align_self {
        css.insert("align-self".into(), align_value(align).into());
    }
    css
}

/// 自动布局容器样式
pub fn auto_layout_container_style(layout: &BlockLayout) -> CssProperties {
    let mut css = CssProperties::new();
    css.insert("display".into(), "flex".into());
    css.insert(
        "flex-direction".into(),
        match layout.direction {
            LayoutDirection::Vertical => "column",
            LayoutDirection::Horizontal => "row",
        }
        .into(),
    );
    if layout.gap > 0.0 {
        css.insert("gap".into(), px(layout.gap));
    }
    let p = layout.padding;
    if p != Default::default() {
        css.insert(
            "padding".into(),
            format!("{} {} {} {}", px(p.top), px(p.right), px(p.bottom), px(p.left)),
        );
    }
    css.insert("align-items".into(), align_value(layout.align_items).into());
    css.insert(
        "justify-content".into(),
        match layout.justify_content {
            crate::schema::JustifyContent::Start => "flex-start",
            crate::schema::JustifyContent::Center => "center",
            crate::schema::JustifyContent::End => "flex-end",
            crate::schema::JustifyContent::SpaceBetween => "space-between",
            crate::schema::JustifyContent::SpaceAround => "space-around",
        }
        .into(),
    );
    if layout.wrap {
        css.insert("flex-wrap".into(), "wrap".into());
    }
    css
}

/// 按主轴分配 px 尺寸
///
/// `intrinsic` 是各子元素 hug 时的内容尺寸。固定尺寸先占位，
/// 剩余空间按 fill 权重分配，最后应用 min / max 约束。
pub fn distribute_main_axis(
    modes: &[SizeMode],
    intrinsic: &[f64],
    constraints: &[(Option<f64>, Option<f64>)],
    available: f64,
    gap: f64,
    viewport: Viewport,
) -> Vec<f64> {
    let count = modes.len();
    let gaps = gap * count.saturating_sub(1) as f64;
    let mut sizes = vec![0.0; count];
    let mut used = gaps;
    let mut total_weight = 0.0;

    for (i, mode) in modes.iter().enumerate() {
        match *mode {
            SizeMode::Fixed { value, unit } => {
                sizes[i] = fixed_to_px(value, unit, viewport, available);
                used += sizes[i];
            }
            SizeMode::Hug => {
                sizes[i] = intrinsic.get(i).copied().unwrap_or(0.0);
                used += sizes[i];
            }
            SizeMode::Fill => total_weight += 1.0,
            SizeMode::FillPortion { value } => total_weight += value.max(0.0),
        }
    }

    let remaining = (available - used).max(0.0);
    for (i, mode) in modes.iter().enumerate() {
        let weight = match *mode {
            SizeMode::Fill => 1.0,
            SizeMode::FillPortion { value } => value.max(0.0),
            _ => continue,
        };
        if total_weight > 0.0 {
            sizes[i] = remaining * weight / total_weight;
        }
    }

    for (i, size) in sizes.iter_mut().enumerate() {
        if let Some((min, max)) = constraints.get(i) {
            if let Some(max) = max {
                *size = size.min(*max);
            }
            if let Some(min) = min {
                *size = size.max(*min);
            }
        }
    }

    sizes
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{ElementSizing, ElementType};

    const VIEWPORT: Viewport = Viewport {
        width: 400.0,
        height: 800.0,
    };

    #[test]
    fn test_block_height_px() {
        assert_eq!(block_height_px(&BlockHeight::Vh(100.0), VIEWPORT), 800.0);
        assert_eq!(block_height_px(&BlockHeight::Vh(50.0), VIEWPORT), 400.0);
        assert_eq!(
            block_height_px(
                &BlockHeight::Mode(SizeMode::Fixed {
                    value: 320.0,
                    unit: SizeUnit::Px
                }),
                VIEWPORT
            ),
            320.0
        );
        assert_eq!(
            block_height_px(
                &BlockHeight::Mode(SizeMode::Fixed {
                    value: 25.0,
                    unit: SizeUnit::Vh
                }),
                VIEWPORT
            ),
            200.0
        );
        assert_eq!(block_height_px(&BlockHeight::Mode(SizeMode::Hug), VIEWPORT), 400.0);
        assert_eq!(block_height_px(&BlockHeight::Mode(SizeMode::Fill), VIEWPORT), 400.0);
    }

    #[test]
    fn test_block_height_style() {
        let css = block_height_style(&BlockHeight::Vh(80.0), VIEWPORT);
        assert_eq!(css.get("min-height").map(String::as_str), Some("80vh"));

        let css = block_height_style(&BlockHeight::Mode(SizeMode::Hug), VIEWPORT);
        assert_eq!(css.get("height").map(String::as_str), Some("fit-content"));
    }

    #[test]
    fn test_position_mode_detection() {
        let absolute = Element::new("a", ElementType::Text).with_frame(10.0, 20.0, 50.0, 10.0);
        let floating = Element::new("b", ElementType::Text);
        let mut forced = Element::new("c", ElementType::Text).with_frame(0.0, 0.0, 10.0, 10.0);
        forced.layout_mode = Some(LayoutMode::Auto);

        let auto_block = BlockLayout {
            mode: LayoutMode::Auto,
            ..Default::default()
        };
        let absolute_block = BlockLayout::default();

        assert!(has_absolute_position(&absolute));
        assert!(!has_absolute_position(&floating));
        assert!(!has_absolute_position(&forced));

        assert!(!is_auto_layout_element(&absolute, &auto_block));
        assert!(is_auto_layout_element(&floating, &auto_block));
        assert!(!is_auto_layout_element(&floating, &absolute_block));
        assert!(is_auto_layout_element(&forced, &absolute_block));
    }

    #[test]
    fn test_absolute_frame() {
        let element = Element::new("a", ElementType::Image).with_frame(10.0, 25.0, 50.0, 50.0);
        let frame = absolute_frame(&element, VIEWPORT, 600.0);
        assert_eq!(
            frame,
            Frame {
                x: 40.0,
                y: 150.0,
                width: 200.0,
                height: 300.0
            }
        );

        let css = absolute_style(&element, frame);
        assert_eq!(css.get("left").map(String::as_str), Some("40px"));
        assert_eq!(css.get("top").map(String::as_str), Some("150px"));
        assert!(!css.contains_key("transform"));
    }

    #[test]
    fn test_auto_layout_element_style() {
        let mut element = Element::new("a", ElementType::Text);
        element.sizing = Some(ElementSizing {
            width: Some(SizeMode::Fixed {
                value: 120.0,
                unit: SizeUnit::Px,
            }),
            height: Some(SizeMode::Fill),
        });
        element.constraints = Some(ElementConstraints {
            max_height: Some(300.0),
            ..Default::default()
        });

        let css = auto_layout_element_style(&element, LayoutDirection::Vertical, VIEWPORT);
        assert_eq!(css.get("width").map(String::as_str), Some("120px"));
        assert_eq!(css.get("flex").map(String::as_str), Some("1 1 0"));
        assert_eq!(css.get("max-height").map(String::as_str), Some("300px"));
        assert!(!css.contains_key("flex-shrink"));

        let css = auto_layout_element_style(&element, LayoutDirection::Horizontal, VIEWPORT);
        assert_eq!(css.get("flex-shrink").map(String::as_str), Some("0"));
        assert_eq!(css.get("align-self").map(String::as_str), Some("stretch"));
    }

    #[test]
    fn test_default_sizing_is_fill_width_hug_height() {
        let element = Element::new("a", ElementType::Text);
        let css = auto_layout_element_style(&element, LayoutDirection::Vertical, VIEWPORT);
        assert_eq!(css.get("align-self").map(String::as_str), Some("stretch"));
        assert_eq!(css.get("height").map(String::as_str), Some("fit-content"));
    }

    #[test]
    fn test_distribute_main_axis() {
        let modes = [
            SizeMode::Fixed {
                value: 100.0,
                unit: SizeUnit::Px,
            },
            SizeMode::Hug,
            SizeMode::Fill,
            SizeMode::FillPortion { value: 2.0 },
        ];
        let sizes = distribute_main_axis(
            &modes,
            &[0.0, 40.0, 0.0, 0.0],
            &[],
            400.0,
            10.0,
            VIEWPORT,
        );
        // 400 - 30(gap) - 100 - 40 = 230，按 1:2 分配
        assert_eq!(round2(sizes[2]), 76.67);
        assert_eq!(round2(sizes[3]), 153.33);

        let clamped = distribute_main_axis(
            &[SizeMode::Fill],
            &[],
            &[(Some(50.0), Some(120.0))],
            400.0,
            0.0,
            VIEWPORT,
        );
        assert_eq!(clamped, vec![120.0]);
    }

    #[test]
    fn test_container_style() {
        let layout = BlockLayout {
            mode: LayoutMode::Auto,
            direction: LayoutDirection::Horizontal,
            gap: 8.0,
            wrap: true,
            ..Default::default()
        };
        let css = auto_layout_container_style(&layout);
        assert_eq!(css.get("flex-direction").map(String::as_str), Some("row"));
        assert_eq!(css.get("gap").map(String::as_str), Some("8px"));
        assert_eq!(css.get("flex-wrap").map(String::as_str), Some("wrap"));
        assert!(!css.contains_key("padding"));
    }
}
