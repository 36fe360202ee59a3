//! 旧版 `{{path}}` 模板
//!
//! 早期文档使用双花括号语法，与 [`crate::interpolate`] 互不兼容，单独保留。
//! 路径只允许字母、数字、`_` 和 `.`，缺失值替换为空字符串。

use crate::binding;
use crate::schema::WeddingData;

fn is_path_char(ch: char) -> bool {
    ch.is_ascii_alphanumeric() || ch == '_' || ch == '.'
}

/// 在 `text` 中查找下一个合法的 `{{path}}`，返回 (起始, 结束, 路径)
fn next_token(text: &str) -> Option<(usize, usize, &str)> {
    let mut search_from = 0;
    while let Some(offset) = text[search_from..].find("{{") {
        let start = search_from + offset;
        let inner_start = start + 2;
        if let Some(close) = text[inner_start..].find("}}") {
            let path = &text[inner_start..inner_start + close];
            if !path.is_empty() && path.chars().all(is_path_char) {
                return Some((start, inner_start + close + 2, path));
            }
        }
        search_from = start + 1;
    }
    None
}

/// 渲染 `{{path}}` 模板
pub fn render(template: &str, data: &WeddingData) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some((start, end, path)) = next_token(rest) {
        out.push_str(&rest[..start]);
        if let Some(value) = binding::resolve(path, data) {
            out.push_str(&value.to_string());
        }
        rest = &rest[end..];
    }

    out.push_str(rest);
    out
}

/// 模板引用的路径（去重，保持出现顺序）
pub fn extract_paths(template: &str) -> Vec<String> {
    let mut paths: Vec<String> = Vec::new();
    let mut rest = template;

    while let Some((_, end, path)) = next_token(rest) {
        if !paths.iter().any(|p| p == path) {
            paths.push(path.to_string());
        }
        rest = &rest[end..];
    }

    paths
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_render_double_brace() {
        let data = WeddingData::new(json!({
            "groom": { "name": "철수" },
            "bride": { "name": "영희" }
        }));
        assert_eq!(
            render("{{groom.name}}와 {{bride.name}}의 결혼식", &data),
            "철수와 영희의 결혼식"
        );
        assert_eq!(render("{{groom.phone}}!", &data), "!");
    }

    #[test]
    fn test_invalid_tokens_are_left_alone() {
        let data = WeddingData::default();
        assert_eq!(render("{{ spaced }} {single}", &data), "{{ spaced }} {single}");
    }

    #[test]
    fn test_extract_paths() {
        assert_eq!(
            extract_paths("{{a.b}} {{c_d}} {{a.b}} {x}"),
            vec!["a.b".to_string(), "c_d".to_string()]
        );
    }
}
