//! 颜色工具：hex 解析、亮度判断、明暗调整、渐变转 CSS

use crate::schema::{ColorValue, GradientKind, GradientValue};
use crate::size::round2;

/// 解析 `#rgb` / `#rrggbb`，忽略 alpha
pub fn parse_hex(color: &str) -> Option<(u8, u8, u8)> {
    let hex = color.trim().strip_prefix('#')?;
    if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    let expanded: String = match hex.len() {
        3 | 4 => hex.chars().take(3).flat_map(|c| [c, c]).collect(),
        6 | 8 => hex.get(..6)?.to_string(),
        _ => return None,
    };
    let value = u32::from_str_radix(&expanded, 16).ok()?;
    Some((
        ((value >> 16) & 0xff) as u8,
        ((value >> 8) & 0xff) as u8,
        (value & 0xff) as u8,
    ))
}

/// 相对亮度（0.0 ~ 1.0，BT.601 加权）
pub fn luminance(color: &str) -> Option<f64> {
    let (r, g, b) = parse_hex(color)?;
    Some((0.299 * r as f64 + 0.587 * g as f64 + 0.114 * b as f64) / 255.0)
}

/// 是否为浅色。无法解析的颜色按浅色处理
pub fn is_light_color(color: &str) -> bool {
    luminance(color).is_none_or(|l| l > 0.5)
}

/// 各通道加减 `amount` 并钳制到 0..=255；非 hex 颜色原样返回
pub fn adjust_color(color: &str, amount: i32) -> String {
    match parse_hex(color) {
        Some((r, g, b)) => {
            let shift = |c: u8| (c as i32 + amount).clamp(0, 255);
            format!("#{:02x}{:02x}{:02x}", shift(r), shift(g), shift(b))
        }
        None => color.to_string(),
    }
}

/// 渐变转 CSS 字符串
pub fn gradient_to_css(gradient: &GradientValue) -> String {
    let stops = gradient
        .stops
        .iter()
        .map(|stop| match stop.opacity {
            Some(opacity) => format!("{}, {} {}%", stop.color, round2(opacity), round2(stop.position)),
            None => format!("{} {}%", stop.color, round2(stop.position)),
        })
        .collect::<Vec<_>>()
        .join(", ");

    match gradient.kind {
        GradientKind::Linear => format!(
            "linear-gradient({}deg, {})",
            round2(gradient.angle.unwrap_or(180.0)),
            stops
        ),
        GradientKind::Radial => format!(
            "radial-gradient({} at {}, {})",
            gradient.shape.as_deref().unwrap_or("circle"),
            gradient.position.as_deref().unwrap_or("center"),
            stops
        ),
        GradientKind::Conic => format!(
            "conic-gradient(from {}deg, {})",
            round2(gradient.angle.unwrap_or(0.0)),
            stops
        ),
    }
}

/// 颜色值转 CSS
pub fn color_to_css(value: &ColorValue) -> String {
    match value {
        ColorValue::Solid(color) | ColorValue::Wrapped { color } => color.clone(),
        ColorValue::Gradient(gradient) => gradient_to_css(gradient),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::GradientStop;

    #[test]
    fn test_parse_hex() {
        assert_eq!(parse_hex("#ffffff"), Some((255, 255, 255)));
        assert_eq!(parse_hex("#0f0"), Some((0, 255, 0)));
        assert_eq!(parse_hex("#11223344"), Some((0x11, 0x22, 0x33)));
        assert_eq!(parse_hex("red"), None);
        assert_eq!(parse_hex("#12"), None);
    }

    #[test]
    fn test_malformed_hex_is_rejected() {
        assert_eq!(parse_hex("#aaaaaéb"), None);
        assert_eq!(parse_hex("#ééé"), None);
        assert_eq!(parse_hex("#+12345"), None);
        assert_eq!(parse_hex("#gggggg"), None);
        assert_eq!(adjust_color("#aaaaaéb", -10), "#aaaaaéb");
        assert!(is_light_color("#aaaaaéb"));
    }

    #[test]
    fn test_light_detection() {
        assert!(is_light_color("#ffffff"));
        assert!(!is_light_color("#1a1a1a"));
        assert!(is_light_color("rgba(0, 0, 0, 0.5)"));
    }

    #[test]
    fn test_adjust_color() {
        assert_eq!(adjust_color("#c9a86c", -10), "#bf9e62");
        assert_eq!(adjust_color("#000", -20), "#000000");
        assert_eq!(adjust_color("#fff", 10), "#ffffff");
        assert_eq!(adjust_color("tomato", -10), "tomato");
    }

    #[test]
    fn test_gradient_to_css() {
        let stops = vec![
            GradientStop {
                color: "#000".into(),
                position: 0.0,
                opacity: None,
            },
            GradientStop {
                color: "#fff".into(),
                position: 100.0,
                opacity: None,
            },
        ];
        let linear = GradientValue {
            kind: GradientKind::Linear,
            angle: None,
            shape: None,
            position: None,
            stops: stops.clone(),
        };
        assert_eq!(
            gradient_to_css(&linear),
            "linear-gradient(180deg, #000 0%, #fff 100%)"
        );

        let radial = GradientValue {
            kind: GradientKind::Radial,
            ..linear.clone()
        };
        assert_eq!(
            gradient_to_css(&radial),
            "radial-gradient(circle at center, #000 0%, #fff 100%)"
        );

        let conic = GradientValue {
            kind: GradientKind::Conic,
            angle: Some(45.0),
            ..linear
        };
        assert_eq!(
            gradient_to_css(&conic),
            "conic-gradient(from 45deg, #000 0%, #fff 100%)"
        );
    }
}
