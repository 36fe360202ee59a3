//! # Interpolate 模块
//!
//! `{path}` 占位符插值。
//!
//! ```text
//! "{couple.groom.name} ♥ {couple.bride.name}"  →  "민준 ♥ 서연"
//! ```
//!
//! - 解析不到值的占位符默认替换为空字符串
//! - `{{` / `}}` 转义为字面量花括号
//! - 未闭合的 `{` 原样保留

use crate::binding::{self, BindingValue, ResolveOptions};
use crate::schema::WeddingData;

/// 缺失值处理方式
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum MissingBehavior {
    /// 替换为空字符串
    #[default]
    Remove,
    /// 保留 `{path}` 原文
    Keep,
    /// 替换为指定文本
    Placeholder(String),
}

/// 插值选项
#[derive(Debug, Clone)]
pub struct InterpolateOptions {
    pub missing: MissingBehavior,
    /// 是否处理 `{{` / `}}` 转义
    pub handle_escape: bool,
    pub resolve: ResolveOptions,
}

impl Default for InterpolateOptions {
    fn default() -> Self {
        Self {
            missing: MissingBehavior::Remove,
            handle_escape: true,
            resolve: ResolveOptions::default(),
        }
    }
}

/// 带详情的插值结果
#[derive(Debug, Clone, PartialEq, Default)]
pub struct InterpolationResult {
    pub result: String,
    /// 解析成功的路径（按出现顺序，去重）
    pub used_paths: Vec<String>,
    /// 解析失败的路径（按出现顺序，去重）
    pub missing_paths: Vec<String>,
    pub is_complete: bool,
}

/// 格式串校验结果
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FormatValidation {
    pub valid: bool,
    pub errors: Vec<String>,
}

// =============================================================================
// 扫描
// =============================================================================

enum Piece<'a> {
    Literal(&'a str),
    Variable(&'a str),
}

/// 将格式串切分为字面量和变量
fn scan(format: &str, handle_escape: bool) -> Vec<Piece<'_>> {
    let mut pieces = Vec::new();
    let bytes = format.as_bytes();
    let mut literal_start = 0;
    let mut i = 0;

    while i < bytes.len() {
        match bytes[i] {
            b'{' if handle_escape && bytes.get(i + 1) == Some(&b'{') => {
                pieces.push(Piece::Literal(&format[literal_start..i]));
                pieces.push(Piece::Literal("{"));
                i += 2;
                literal_start = i;
            }
            b'}' if handle_escape && bytes.get(i + 1) == Some(&b'}') => {
                pieces.push(Piece::Literal(&format[literal_start..i]));
                pieces.push(Piece::Literal("}"));
                i += 2;
                literal_start = i;
            }
            b'{' => {
                let close = format[i + 1..].find(['}', '{']).map(|offset| i + 1 + offset);
                match close {
                    Some(end) if bytes[end] == b'}' && end > i + 1 => {
                        pieces.push(Piece::Literal(&format[literal_start..i]));
                        pieces.push(Piece::Variable(format[i + 1..end].trim()));
                        i = end + 1;
                        literal_start = i;
                    }
                    _ => i += 1,
                }
            }
            _ => i += 1,
        }
    }

    pieces.push(Piece::Literal(&format[literal_start..]));
    pieces
}

fn push_unique(list: &mut Vec<String>, path: &str) {
    if !list.iter().any(|p| p == path) {
        list.push(path.to_string());
    }
}

// =============================================================================
// 插值
// =============================================================================

/// 使用默认选项插值
pub fn interpolate(format: &str, data: &WeddingData) -> String {
    interpolate_with(format, data, &InterpolateOptions::default())
}

pub fn interpolate_with(format: &str, data: &WeddingData, options: &InterpolateOptions) -> String {
    interpolate_with_details(format, data, options).result
}

/// 插值并记录用到 / 缺失的路径
pub fn interpolate_with_details(
    format: &str,
    data: &WeddingData,
    options: &InterpolateOptions,
) -> InterpolationResult {
    let mut out = InterpolationResult {
        result: String::with_capacity(format.len()),
        ..Default::default()
    };

    for piece in scan(format, options.handle_escape) {
        match piece {
            Piece::Literal(text) => out.result.push_str(text),
            Piece::Variable(path) => match binding::resolve_with(path, data, &options.resolve) {
                Some(value) => {
                    out.result.push_str(&value.to_string());
                    push_unique(&mut out.used_paths, path);
                }
                None => {
                    match &options.missing {
                        MissingBehavior::Remove => {}
                        MissingBehavior::Keep => {
                            out.result.push('{');
                            out.result.push_str(path);
                            out.result.push('}');
                        }
                        MissingBehavior::Placeholder(text) => out.result.push_str(text),
                    }
                    push_unique(&mut out.missing_paths, path);
                }
            },
        }
    }

    out.is_complete = out.missing_paths.is_empty();
    out
}

/// 格式串中引用的全部路径（不过滤未知路径）
pub fn referenced_paths(format: &str) -> Vec<String> {
    let mut paths = Vec::new();
    for piece in scan(format, true) {
        if let Piece::Variable(path) = piece {
            push_unique(&mut paths, path);
        }
    }
    paths
}

/// 格式串是否包含变量
pub fn has_variables(format: &str) -> bool {
    scan(format, true)
        .iter()
        .any(|piece| matches!(piece, Piece::Variable(_)))
}

/// 校验格式串：花括号配对与空占位符
pub fn validate_format(format: &str) -> FormatValidation {
    let mut errors = Vec::new();
    let unescaped = format.replace("{{", "").replace("}}", "");

    let mut depth: i32 = 0;
    for ch in unescaped.chars() {
        match ch {
            '{' => {
                depth += 1;
                if depth > 1 {
                    errors.push("Nested braces are not allowed".to_string());
                    depth = 1;
                }
            }
            '}' => {
                depth -= 1;
                if depth < 0 {
                    errors.push("Unexpected closing brace".to_string());
                    depth = 0;
                }
            }
            _ => {}
        }
    }
    if depth > 0 {
        errors.push("Unclosed brace".to_string());
    }

    let mut rest = unescaped.as_str();
    while let Some(open) = rest.find('{') {
        let after = &rest[open + 1..];
        let Some(close) = after.find('}') else { break };
        if after[..close].trim().is_empty() {
            errors.push("Empty variable placeholder".to_string());
        }
        rest = &after[close + 1..];
    }

    FormatValidation {
        valid: errors.is_empty(),
        errors,
    }
}

// =============================================================================
// 组合工具
// =============================================================================

/// 条件文本：路径有值（且非空、非 false）时插值 `if_true`，否则插值 `if_false`
pub fn conditional_text(path: &str, if_true: &str, if_false: &str, data: &WeddingData) -> String {
    let present = match binding::resolve(path, data) {
        None => false,
        Some(BindingValue::Bool(b)) => b,
        Some(value) => !value.is_blank(),
    };
    interpolate(if present { if_true } else { if_false }, data)
}

fn resolve_text(path: &str, data: &WeddingData) -> Option<String> {
    binding::resolve(path, data)
        .filter(|v| !v.is_blank())
        .map(|v| v.to_string())
}

/// 有值时加前缀，没有值时返回空字符串
pub fn with_prefix(path: &str, prefix: &str, data: &WeddingData) -> String {
    resolve_text(path, data)
        .map(|value| format!("{}{}", prefix, value))
        .unwrap_or_default()
}

/// 有值时加后缀，没有值时返回空字符串
pub fn with_suffix(path: &str, suffix: &str, data: &WeddingData) -> String {
    resolve_text(path, data)
        .map(|value| format!("{}{}", value, suffix))
        .unwrap_or_default()
}

/// 拼接多个路径的值，跳过空值
pub fn join_values(paths: &[&str], separator: &str, data: &WeddingData) -> String {
    paths
        .iter()
        .filter_map(|path| resolve_text(path, data))
        .collect::<Vec<_>>()
        .join(separator)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> WeddingData {
        WeddingData::new(json!({
            "couple": {
                "groom": { "name": "민준" },
                "bride": { "name": "서연" }
            },
            "venue": { "name": "그랜드홀", "hall": "" },
            "contact": { "showParents": false },
            "custom": { "motto": "늘 함께" }
        }))
    }

    #[test]
    fn test_basic_interpolation() {
        assert_eq!(
            interpolate("{couple.groom.name} ♥ {couple.bride.name}", &sample()),
            "민준 ♥ 서연"
        );
    }

    #[test]
    fn test_missing_is_removed_by_default() {
        assert_eq!(interpolate("Hi {unknown.path}!", &sample()), "Hi !");
    }

    #[test]
    fn test_missing_behaviors() {
        let data = sample();
        let keep = InterpolateOptions {
            missing: MissingBehavior::Keep,
            ..Default::default()
        };
        assert_eq!(interpolate_with("A {x.y} B", &data, &keep), "A {x.y} B");

        let placeholder = InterpolateOptions {
            missing: MissingBehavior::Placeholder("???".to_string()),
            ..Default::default()
        };
        assert_eq!(interpolate_with("A {x.y} B", &data, &placeholder), "A ??? B");
    }

    #[test]
    fn test_escape_and_unclosed_brace() {
        let data = sample();
        assert_eq!(
            interpolate("{{literal}} {couple.groom.name}", &data),
            "{literal} 민준"
        );
        assert_eq!(interpolate("open { brace", &data), "open { brace");
        assert_eq!(interpolate("{ {couple.bride.name}", &data), "{ 서연");
    }

    #[test]
    fn test_interpolate_with_details() {
        let details = interpolate_with_details(
            "{couple.groom.name} {a.b} {couple.groom.name} {custom.motto}",
            &sample(),
            &InterpolateOptions::default(),
        );
        assert_eq!(details.result, "민준  민준 늘 함께");
        insta::assert_debug_snapshot!(details.used_paths, @r###"
        [
            "couple.groom.name",
            "custom.motto",
        ]
        "###);
        assert_eq!(details.missing_paths, vec!["a.b"]);
        assert!(!details.is_complete);
    }

    #[test]
    fn test_validate_format() {
        assert!(validate_format("{couple.groom.name} {{ok}}").valid);

        let unclosed = validate_format("{couple.groom.name");
        assert!(!unclosed.valid);
        assert!(unclosed.errors.contains(&"Unclosed brace".to_string()));

        let empty = validate_format("hello { }");
        assert!(empty.errors.contains(&"Empty variable placeholder".to_string()));

        assert!(!validate_format("oops }").valid);
    }

    #[test]
    fn test_referenced_paths_and_has_variables() {
        assert_eq!(
            referenced_paths("{a.b} {c.d} {a.b} {{e.f}}"),
            vec!["a.b", "c.d"]
        );
        assert!(has_variables("x {a.b}"));
        assert!(!has_variables("x {{a.b}}"));
    }

    #[test]
    fn test_helpers() {
        let data = sample();
        assert_eq!(with_prefix("venue.name", "@ ", &data), "@ 그랜드홀");
        assert_eq!(with_prefix("venue.hall", "@ ", &data), "");
        assert_eq!(with_suffix("couple.groom.name", " 님", &data), "민준 님");
        assert_eq!(
            join_values(&["venue.name", "venue.hall", "couple.bride.name"], " · ", &data),
            "그랜드홀 · 서연"
        );
        assert_eq!(
            conditional_text("contact.showParents", "부모님", "신랑신부", &data),
            "신랑신부"
        );
        assert_eq!(
            conditional_text("venue.name", "{venue.name}에서", "미정", &data),
            "그랜드홀에서"
        );
    }
}
