//! # Special 模块
//!
//! 专用子渲染器：notice / account / interview 三种 block 的数据驱动部分。
//!
//! 它们与普通元素使用同一份绑定数据和 block token，只是结构由数据决定。
//! 数据为空时不输出任何节点。

use invitation_runtime::schema::BlockType;
use invitation_runtime::style::ResolvedTokens;
use invitation_runtime::WeddingData;
use serde_json::Value;

use super::visual::VisualNode;

const DEFAULT_INTERVIEW_TITLE: &str = "두 사람의 인터뷰 읽어보기";

/// 按 block 类型分派专用子渲染器
pub fn render_special(
    block_type: &BlockType,
    data: &WeddingData,
    tokens: &ResolvedTokens,
) -> Option<VisualNode> {
    match block_type {
        BlockType::Notice => render_notice(data, tokens),
        BlockType::Account => render_accounts(data, tokens),
        BlockType::Interview => render_interview(data, tokens),
        _ => None,
    }
}

/// 该 block 类型是否有专用子渲染器
pub fn has_special_renderer(block_type: &BlockType) -> bool {
    matches!(
        block_type,
        BlockType::Notice | BlockType::Account | BlockType::Interview
    )
}

fn lookup<'a>(data: &'a WeddingData, path: &[&str]) -> Option<&'a Value> {
    path.iter()
        .try_fold(data.as_value(), |current, key| current.get(key))
}

fn text_of<'a>(value: &'a Value, key: &str) -> &'a str {
    value.get(key).and_then(Value::as_str).unwrap_or_default().trim()
}

fn card(tokens: &ResolvedTokens, tag: &str) -> VisualNode {
    VisualNode::part(tag)
        .with_style("background", tokens.value("bg-card"))
        .with_style("border", format!("1px solid {}", tokens.value("border-default")))
        .with_style("border-radius", "8px")
}

// =============================================================================
// Notice
// =============================================================================

/// 须知卡片轮播
fn render_notice(data: &WeddingData, tokens: &ResolvedTokens) -> Option<VisualNode> {
    let items = lookup(data, &["notice", "items"])?.as_array()?;
    if items.is_empty() {
        return None;
    }

    let mut swiper = VisualNode::part("notice-swiper").with_attr("count", items.len().to_string());
    for (index, item) in items.iter().enumerate() {
        let icon = item.get("icon").and_then(Value::as_str).unwrap_or("info");
        let mut slide = card(tokens, "notice-card")
            .with_attr("index", index.to_string())
            .with_attr("icon", icon);

        let image = VisualNode::part("notice-image");
        let image_on_top = item.get("imagePosition").and_then(Value::as_str) != Some("bottom");
        let image = item
            .get("image")
            .and_then(Value::as_str)
            .map(|src| image.with_attr("src", src));

        if image_on_top {
            slide.children.extend(image.clone());
        }
        slide.children.push(
            VisualNode::part("notice-title")
                .with_text(text_of(item, "title"))
                .with_style("color", tokens.value("fg-emphasis")),
        );
        slide.children.push(
            VisualNode::part("notice-content")
                .with_text(text_of(item, "content"))
                .with_style("color", tokens.value("fg-default")),
        );
        if !image_on_top {
            slide.children.extend(image);
        }
        swiper.children.push(slide);
    }

    if items.len() > 1 {
        let mut dots = VisualNode::part("notice-dots");
        for index in 0..items.len() {
            let color = if index == 0 { "accent-default" } else { "border-default" };
            dots.children.push(
                VisualNode::part("notice-dot")
                    .with_attr("active", (index == 0).to_string())
                    .with_style("background", tokens.value(color)),
            );
        }
        swiper.children.push(dots);
    }
    Some(swiper)
}

// =============================================================================
// Account
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Side {
    Groom,
    Bride,
}

impl Side {
    fn key(self) -> &'static str {
        match self {
            Side::Groom => "groom",
            Side::Bride => "bride",
        }
    }

    fn label(self) -> &'static str {
        match self {
            Side::Groom => "신랑측",
            Side::Bride => "신부측",
        }
    }
}

/// 账户有效：银行与账号都不为空
fn is_valid_account(account: &Value) -> bool {
    !text_of(account, "bank").is_empty() && !text_of(account, "number").is_empty()
}

/// 户主为空时按关系取名字
fn holder_fallback<'a>(data: &'a WeddingData, side: Side, relation: &str) -> &'a str {
    let side = side.key();
    let value = match relation {
        "본인" => lookup(data, &["couple", side, "name"]),
        "아버지" => lookup(data, &["parents", side, "father", "name"]),
        "어머니" => lookup(data, &["parents", side, "mother", "name"]),
        _ => None,
    };
    value.and_then(Value::as_str).unwrap_or_default()
}

fn render_accounts(data: &WeddingData, tokens: &ResolvedTokens) -> Option<VisualNode> {
    let accounts_of = |side: Side| -> Vec<&Value> {
        lookup(data, &["accounts", side.key()])
            .and_then(Value::as_array)
            .map(|list| list.iter().filter(|a| is_valid_account(a)).collect())
            .unwrap_or_default()
    };

    let sides = [(Side::Groom, accounts_of(Side::Groom)), (Side::Bride, accounts_of(Side::Bride))];
    if sides.iter().all(|(_, accounts)| accounts.is_empty()) {
        return None;
    }

    let mut tabs = VisualNode::part("account-tabs");
    for (side, accounts) in sides {
        let mut tab = VisualNode::part("account-tab")
            .with_attr("side", side.key())
            .with_attr("active", (side == Side::Groom).to_string())
            .with_attr("count", accounts.len().to_string())
            .with_text(side.label());

        for account in accounts {
            let relation = text_of(account, "relation");
            let holder = match text_of(account, "holder") {
                "" => holder_fallback(data, side, relation),
                holder => holder,
            };
            tab.children.push(
                card(tokens, "account-card")
                    .with_attr("number", text_of(account, "number"))
                    .with_child(VisualNode::part("account-relation").with_text(relation))
                    .with_child(VisualNode::part("account-holder").with_text(holder))
                    .with_child(VisualNode::part("account-number").with_text(format!(
                        "{} {}",
                        text_of(account, "bank"),
                        text_of(account, "number")
                    ))),
            );
        }

        if let Some(url) = lookup(data, &["accounts", "kakaopay", side.key()]).and_then(Value::as_str) {
            tab.children.push(
                VisualNode::part("account-kakaopay")
                    .with_attr("href", url)
                    .with_text("카카오페이 송금"),
            );
        }
        tabs.children.push(tab);
    }
    Some(tabs)
}

// =============================================================================
// Interview
// =============================================================================

fn render_interview(data: &WeddingData, tokens: &ResolvedTokens) -> Option<VisualNode> {
    let items = lookup(data, &["interview", "items"])?.as_array()?;
    if items.is_empty() {
        return None;
    }

    let name_of = |side: &str, default: &'static str| {
        lookup(data, &["couple", side, "name"])
            .and_then(Value::as_str)
            .filter(|name| !name.is_empty())
            .unwrap_or(default)
    };
    let groom = name_of("groom", "신랑");
    let bride = name_of("bride", "신부");

    let title = lookup(data, &["interview", "title"])
        .and_then(Value::as_str)
        .unwrap_or(DEFAULT_INTERVIEW_TITLE);

    let mut accordion = VisualNode::part("interview-accordion")
        .with_attr("expanded", "false")
        .with_child(
            card(tokens, "interview-header")
                .with_text(title)
                .with_style("color", tokens.value("fg-default")),
        );

    let mut body = card(tokens, "interview-body");
    for item in items {
        body.children.push(
            VisualNode::part("interview-qa")
                .with_child(VisualNode::part("interview-question").with_text(text_of(item, "question")))
                .with_child(
                    VisualNode::part("interview-answer")
                        .with_attr("speaker", groom)
                        .with_text(text_of(item, "groomAnswer")),
                )
                .with_child(
                    VisualNode::part("interview-answer")
                        .with_attr("speaker", bride)
                        .with_text(text_of(item, "brideAnswer")),
                ),
        );
    }
    accordion.children.push(body);
    Some(accordion)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn tokens() -> ResolvedTokens {
        ResolvedTokens::default()
    }

    #[test]
    fn test_notice_cards() {
        let data = WeddingData::new(json!({
            "notice": { "items": [
                { "title": "주차 안내", "content": "지하 2층", "icon": "car" },
                { "title": "식사", "content": "3층 연회장", "image": "meal.jpg", "imagePosition": "bottom" }
            ]}
        }));
        let node = render_special(&BlockType::Notice, &data, &tokens()).unwrap();

        assert_eq!(node.attr("count"), Some("2"));
        assert_eq!(node.children[0].attr("icon"), Some("car"));
        assert_eq!(node.children[1].children.last().map(|c| c.tag.as_str()), Some("notice-image"));
        assert_eq!(node.children[2].tag, "notice-dots");
        assert!(node.text_content().starts_with("주차 안내 지하 2층"));
    }

    #[test]
    fn test_accounts_filter_and_holder_fallback() {
        let data = WeddingData::new(json!({
            "couple": { "groom": { "name": "민준" } },
            "parents": { "groom": { "father": { "name": "김철수" } } },
            "accounts": {
                "groom": [
                    { "relation": "본인", "bank": "국민", "number": "123-45", "holder": "" },
                    { "relation": "아버지", "bank": "신한", "number": "678-90", "holder": "" },
                    { "relation": "어머니", "bank": "", "number": "000", "holder": "이영희" }
                ],
                "kakaopay": { "groom": "https://qr.kakaopay.com/abc" }
            }
        }));
        let node = render_special(&BlockType::Account, &data, &tokens()).unwrap();
        let groom = &node.children[0];

        assert_eq!(groom.attr("count"), Some("2"));
        assert_eq!(groom.children[0].children[1].text.as_deref(), Some("민준"));
        assert_eq!(groom.children[1].children[1].text.as_deref(), Some("김철수"));
        assert_eq!(groom.children[2].attr("href"), Some("https://qr.kakaopay.com/abc"));
        assert_eq!(node.children[1].attr("count"), Some("0"));
    }

    #[test]
    fn test_interview_names() {
        let data = WeddingData::new(json!({
            "couple": { "bride": { "name": "서연" } },
            "interview": { "items": [
                { "question": "첫인상은?", "groomAnswer": "밝았어요", "brideAnswer": "듬직했어요" }
            ]}
        }));
        let node = render_special(&BlockType::Interview, &data, &tokens()).unwrap();
        assert_eq!(node.children[0].text.as_deref(), Some(DEFAULT_INTERVIEW_TITLE));

        let qa = &node.children[1].children[0];
        assert_eq!(qa.children[1].attr("speaker"), Some("신랑"));
        assert_eq!(qa.children[2].attr("speaker"), Some("서연"));
    }

    #[test]
    fn test_empty_data_renders_nothing() {
        let data = WeddingData::new(json!({}));
        for ty in [BlockType::Notice, BlockType::Account, BlockType::Interview, BlockType::Hero] {
            assert!(render_special(&ty, &data, &tokens()).is_none());
        }
        assert!(has_special_renderer(&BlockType::Account));
        assert!(!has_special_renderer(&BlockType::Hero));
    }
}
