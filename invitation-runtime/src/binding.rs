//! # Binding 模块
//!
//! 将变量路径（如 `couple.groom.name`）解析为绑定数据中的值。
//!
//! ## 解析规则
//!
//! - 按 `.` 拆分路径逐段访问，中间缺失直接返回 `None`，从不报错
//! - `custom.` 前缀的路径重定向到扁平的自定义变量命名空间，
//!   即使自定义 key 与标准字段同名也不会冲突
//! - 段可以带数组下标：`photos.gallery[0]`
//! - `wedding.dday` 等计算字段由日期推导
//! - 数组归一化为字符串列表，账户 / 坐标 / 图片对象转换为可显示的字符串

use chrono::{Datelike, Local, NaiveDate, Weekday};
use serde_json::Value;

use crate::error::PathError;
use crate::schema::WeddingData;

/// 自定义变量前缀
pub const CUSTOM_PREFIX: &str = "custom.";

/// 绑定解析结果
#[derive(Debug, Clone, PartialEq)]
pub enum BindingValue {
    Text(String),
    Number(serde_json::Number),
    Bool(bool),
    /// 数组归一化后的字符串列表（如图片 URL）
    List(Vec<String>),
}

impl BindingValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            BindingValue::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[String]> {
        match self {
            BindingValue::List(list) => Some(list),
            _ => None,
        }
    }

    /// 空字符串 / 空列表视为"没有内容"
    pub fn is_blank(&self) -> bool {
        match self {
            BindingValue::Text(s) => s.is_empty(),
            BindingValue::List(list) => list.is_empty(),
            _ => false,
        }
    }

    /// 转为 JSON 值，供叶子渲染器使用
    pub fn to_json(&self) -> Value {
        match self {
            BindingValue::Text(s) => Value::String(s.clone()),
            BindingValue::Number(n) => Value::Number(n.clone()),
            BindingValue::Bool(b) => Value::Bool(*b),
            BindingValue::List(list) => {
                Value::Array(list.iter().cloned().map(Value::String).collect())
            }
        }
    }
}

impl std::fmt::Display for BindingValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BindingValue::Text(s) => write!(f, "{}", s),
            BindingValue::Number(n) => write!(f, "{}", n),
            BindingValue::Bool(b) => write!(f, "{}", b),
            BindingValue::List(list) => write!(f, "{}", list.join(",")),
        }
    }
}

impl From<&str> for BindingValue {
    fn from(value: &str) -> Self {
        BindingValue::Text(value.to_string())
    }
}

/// 日期显示格式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DateFormat {
    Iso,
    #[default]
    Korean,
    Short,
    Full,
}

/// 解析选项
#[derive(Debug, Clone, Default)]
pub struct ResolveOptions {
    /// 解析不到值时的默认值
    pub default_value: Option<BindingValue>,
    pub date_format: DateFormat,
    /// 计算 D-day / 倒计时时使用的"今天"，缺省取本地日期
    pub today: Option<NaiveDate>,
}

impl ResolveOptions {
    pub fn with_today(mut self, today: NaiveDate) -> Self {
        self.today = Some(today);
        self
    }

    fn today(&self) -> NaiveDate {
        self.today.unwrap_or_else(|| Local::now().date_naive())
    }
}

// =============================================================================
// 路径工具
// =============================================================================

/// 路径段
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathSegment<'a> {
    Key(&'a str),
    Indexed(&'a str, usize),
}

/// 拆分并校验变量路径
pub fn parse_path(path: &str) -> Result<Vec<PathSegment<'_>>, PathError> {
    if path.trim().is_empty() {
        return Err(PathError::Empty);
    }

    path.split('.')
        .map(|part| {
            if part.is_empty() {
                return Err(PathError::EmptySegment {
                    path: path.to_string(),
                });
            }
            match part.split_once('[') {
                None => Ok(PathSegment::Key(part)),
                Some((key, rest)) => {
                    let index = rest
                        .strip_suffix(']')
                        .and_then(|digits| digits.parse::<usize>().ok())
                        .filter(|_| !key.is_empty())
                        .ok_or_else(|| PathError::InvalidIndex {
                            path: path.to_string(),
                            segment: part.to_string(),
                        })?;
                    Ok(PathSegment::Indexed(key, index))
                }
            }
        })
        .collect()
}

/// 是否为自定义变量路径
pub fn is_custom_variable_path(path: &str) -> bool {
    path.starts_with(CUSTOM_PREFIX)
}

/// 提取自定义变量 key（`custom.title` → `title`）
pub fn custom_variable_key(path: &str) -> Option<&str> {
    path.strip_prefix(CUSTOM_PREFIX)
}

/// 路径的顶层分类（`couple.groom.name` → `couple`）
pub fn path_category(path: &str) -> &str {
    path.split('.').next().unwrap_or(path)
}

/// 路径的末级字段名（`couple.groom.name` → `name`）
pub fn path_field(path: &str) -> &str {
    path.rsplit('.').next().unwrap_or(path)
}

/// 已知的标准变量路径
const STANDARD_PATHS: &[&str] = &[
    // 新人
    "couple.groom.name", "couple.groom.nameEn", "couple.groom.phone", "couple.groom.intro",
    "couple.groom.baptismalName", "couple.groom.photo", "couple.groom.birthDate",
    "couple.groom.mbti", "couple.groom.tags",
    "couple.bride.name", "couple.bride.nameEn", "couple.bride.phone", "couple.bride.intro",
    "couple.bride.baptismalName", "couple.bride.photo", "couple.bride.birthDate",
    "couple.bride.mbti", "couple.bride.tags",
    "couple.photo", "couple.photos",
    "wedding.date", "wedding.time",
    // 父母
    "parents.deceasedIcon", "parents.groom.birthOrder", "parents.bride.birthOrder",
    "parents.groom.father.name", "parents.groom.father.status", "parents.groom.father.phone",
    "parents.groom.mother.name", "parents.groom.mother.status", "parents.groom.mother.phone",
    "parents.bride.father.name", "parents.bride.father.status", "parents.bride.father.phone",
    "parents.bride.mother.name", "parents.bride.mother.status", "parents.bride.mother.phone",
    // 场地
    "venue.name", "venue.hall", "venue.address", "venue.tel", "venue.lat", "venue.lng",
    "venue.naverUrl", "venue.kakaoUrl", "venue.tmapUrl",
    "venue.transportation.bus", "venue.transportation.subway", "venue.transportation.shuttle",
    "venue.transportation.parking", "venue.transportation.etc",
    // 照片
    "photos.main", "photos.gallery",
    // 各区块文案
    "intro.message", "greeting.title", "greeting.content", "contact.showParents",
    "gallery.effect", "accounts.groom", "accounts.bride", "accounts.kakaopay.groom",
    "accounts.kakaopay.bride", "rsvp.title", "rsvp.description", "rsvp.deadline",
    "notice.sectionTitle", "notice.title", "notice.description", "notice.items",
    "guestbook.title", "guestbook.placeholder", "ending.message", "ending.photo",
    "bgm.trackId", "bgm.title", "bgm.artist", "video.type", "video.url", "video.title",
    "interview.title", "interview.subtitle", "interview.items",
    "timeline.title", "timeline.subtitle", "timeline.items",
    // 旧版路径
    "groom.name", "groom.nameEn", "groom.fatherName", "groom.motherName", "groom.fatherPhone",
    "groom.motherPhone", "groom.phone", "groom.account",
    "bride.name", "bride.nameEn", "bride.fatherName", "bride.motherName", "bride.fatherPhone",
    "bride.motherPhone", "bride.phone", "bride.account",
    "venue.floor", "venue.addressDetail", "venue.coordinates", "venue.phone",
    "venue.parkingInfo", "venue.transportInfo", "music.url", "music.title", "music.artist",
];

/// 由日期推导的计算字段
const COMPUTED_FIELDS: &[&str] = &[
    "wedding.dateDisplay",
    "wedding.dateDot",
    "wedding.dateMonthDay",
    "wedding.timeDisplay",
    "wedding.dday",
    "wedding.year",
    "wedding.month",
    "wedding.day",
    "wedding.weekday",
    "wedding.dayOfWeek",
    "wedding.weekdayMinus2",
    "wedding.weekdayMinus1",
    "wedding.weekdayPlus1",
    "wedding.weekdayPlus2",
    "wedding.dayMinus2",
    "wedding.dayMinus1",
    "wedding.dayPlus1",
    "wedding.dayPlus2",
    "countdown.days",
    "countdown.hours",
    "countdown.minutes",
    "countdown.seconds",
];

pub fn is_computed_field(path: &str) -> bool {
    COMPUTED_FIELDS.contains(&path)
}

/// 是否为已知的变量路径（自定义路径总是有效）
pub fn is_valid_variable_path(path: &str) -> bool {
    is_custom_variable_path(path) || STANDARD_PATHS.contains(&path) || is_computed_field(path)
}

// =============================================================================
// 解析
// =============================================================================

/// 解析变量路径，使用默认选项
pub fn resolve(path: &str, data: &WeddingData) -> Option<BindingValue> {
    resolve_with(path, data, &ResolveOptions::default())
}

/// 解析变量路径
///
/// 找不到值时返回 `options.default_value`。
pub fn resolve_with(
    path: &str,
    data: &WeddingData,
    options: &ResolveOptions,
) -> Option<BindingValue> {
    lookup(path.trim(), data, options).or_else(|| options.default_value.clone())
}

/// 批量解析，保持输入顺序
pub fn resolve_many<'p>(
    paths: &[&'p str],
    data: &WeddingData,
) -> Vec<(&'p str, Option<BindingValue>)> {
    paths.iter().map(|p| (*p, resolve(p, data))).collect()
}

fn lookup(path: &str, data: &WeddingData, options: &ResolveOptions) -> Option<BindingValue> {
    if path.is_empty() {
        return None;
    }

    if let Some(key) = custom_variable_key(path) {
        return data.custom_value(key).and_then(normalize_value);
    }

    if is_computed_field(path) {
        return resolve_computed(path, data, options);
    }

    let segments = parse_path(path).ok()?;
    let mut current = data.as_value();
    for segment in segments {
        current = match segment {
            PathSegment::Key(key) => current.get(key)?,
            PathSegment::Indexed(key, index) => current.get(key)?.get(index)?,
        };
    }
    normalize_value(current)
}

/// 将 JSON 值归一化为可显示的绑定值
pub fn normalize_value(value: &Value) -> Option<BindingValue> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(BindingValue::Text(s.clone())),
        Value::Number(n) => Some(BindingValue::Number(n.clone())),
        Value::Bool(b) => Some(BindingValue::Bool(*b)),
        Value::Array(items) => Some(BindingValue::List(
            items
                .iter()
                .filter_map(|item| match item {
                    Value::String(s) => Some(s.clone()),
                    Value::Object(obj) => obj.get("url").and_then(Value::as_str).map(String::from),
                    _ => None,
                })
                .collect(),
        )),
        Value::Object(obj) => {
            // 账户信息
            if let (Some(bank), Some(number)) = (obj.get("bank"), obj.get("number")) {
                return Some(BindingValue::Text(format!(
                    "{} {} ({})",
                    display_scalar(bank),
                    display_scalar(number),
                    obj.get("holder").map(display_scalar).unwrap_or_default()
                )));
            }
            // 坐标
            if let (Some(lat), Some(lng)) = (obj.get("lat"), obj.get("lng")) {
                return Some(BindingValue::Text(format!(
                    "{},{}",
                    display_scalar(lat),
                    display_scalar(lng)
                )));
            }
            // 图片
            if let Some(url) = obj.get("url") {
                return Some(BindingValue::Text(display_scalar(url)));
            }
            Some(BindingValue::Text(value.to_string()))
        }
    }
}

fn display_scalar(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

// =============================================================================
// 计算字段
// =============================================================================

const WEEKDAYS_KO: [&str; 7] = ["일", "월", "화", "수", "목", "금", "토"];

fn weekday_ko(weekday: Weekday) -> &'static str {
    WEEKDAYS_KO[weekday.num_days_from_sunday() as usize]
}

/// 解析 `YYYY-MM-DD`（允许带时间后缀）
pub fn parse_date(text: &str) -> Option<NaiveDate> {
    let head = text.get(..10).unwrap_or(text);
    NaiveDate::parse_from_str(head, "%Y-%m-%d").ok()
}

/// `14:30` → `오후 2시 30분`
pub fn format_time(text: &str) -> Option<String> {
    let (h, m) = text.split_once(':')?;
    let hours: u32 = h.trim().parse().ok()?;
    let minutes: u32 = m.trim().get(..2).unwrap_or(m.trim()).parse().ok()?;
    if hours > 23 || minutes > 59 {
        return None;
    }

    let period = if hours < 12 { "오전" } else { "오후" };
    let display_hours = match hours {
        0 => 12,
        h if h > 12 => h - 12,
        h => h,
    };

    if minutes == 0 {
        Some(format!("{} {}시", period, display_hours))
    } else {
        Some(format!("{} {}시 {}분", period, display_hours, minutes))
    }
}

/// D-day 文案：当天 `D-Day`，之前 `D-N`，之后 `D+N`
pub fn format_dday(date: NaiveDate, today: NaiveDate) -> String {
    let diff = (date - today).num_days();
    match diff {
        0 => "D-Day".to_string(),
        d if d > 0 => format!("D-{}", d),
        d => format!("D+{}", d.abs()),
    }
}

/// 按格式输出婚礼日期
pub fn format_wedding_date(date: NaiveDate, format: DateFormat) -> String {
    let weekday = weekday_ko(date.weekday());
    match format {
        DateFormat::Iso => date.format("%Y-%m-%d").to_string(),
        DateFormat::Short => format!("{}월 {}일", date.month(), date.day()),
        DateFormat::Korean | DateFormat::Full => format!(
            "{}년 {}월 {}일 {}요일",
            date.year(),
            date.month(),
            date.day(),
            weekday
        ),
    }
}

fn format_date_with_time(date: NaiveDate, time: Option<&str>, format: DateFormat) -> String {
    let weekday = weekday_ko(date.weekday());
    let Some(time_text) = time.filter(|t| !t.is_empty()) else {
        return format!("{}월 {}일 {}요일", date.month(), date.day(), weekday);
    };
    let time_display = format_time(time_text).unwrap_or_else(|| time_text.to_string());

    match format {
        DateFormat::Iso => format!("{} {}", date.format("%Y-%m-%d"), time_text),
        DateFormat::Short => format!("{}월 {}일 {}", date.month(), date.day(), time_display),
        DateFormat::Korean | DateFormat::Full => format!(
            "{}월 {}일 {}요일 {}",
            date.month(),
            date.day(),
            weekday,
            time_display
        ),
    }
}

fn offset_date(date: NaiveDate, days: i64) -> Option<NaiveDate> {
    date.checked_add_signed(chrono::Duration::days(days))
}

fn resolve_computed(
    field: &str,
    data: &WeddingData,
    options: &ResolveOptions,
) -> Option<BindingValue> {
    let wedding = data.as_value().get("wedding");
    let date_text = wedding.and_then(|w| w.get("date")).and_then(Value::as_str);
    let time_text = wedding.and_then(|w| w.get("time")).and_then(Value::as_str);

    if field == "wedding.timeDisplay" {
        return format_time(time_text?).map(BindingValue::Text);
    }

    let date_text = date_text.filter(|d| !d.is_empty())?;
    let Some(date) = parse_date(date_text) else {
        // 无法解析的日期：展示类字段原样输出，其余视为缺失
        return match field {
            "wedding.dateDisplay" | "wedding.dateDot" | "wedding.dateMonthDay" => {
                Some(BindingValue::Text(date_text.to_string()))
            }
            "countdown.days" | "countdown.hours" | "countdown.minutes" | "countdown.seconds" => {
                Some(BindingValue::Number(0.into()))
            }
            _ => None,
        };
    };

    let text = |s: String| Some(BindingValue::Text(s));
    let weekday_at = |offset: i64| offset_date(date, offset).map(|d| weekday_ko(d.weekday()));
    let day_at = |offset: i64| offset_date(date, offset).map(|d| d.day().to_string());

    match field {
        "wedding.dateDisplay" => text(format_date_with_time(date, time_text, options.date_format)),
        "wedding.dateDot" => text(date.format("%Y.%m.%d").to_string()),
        "wedding.dateMonthDay" => text(date.format("%m.%d").to_string()),
        "wedding.dday" => text(format_dday(date, options.today())),
        "wedding.year" => text(date.year().to_string()),
        "wedding.month" => text(format!("{:02}", date.month())),
        "wedding.day" => text(format!("{:02}", date.day())),
        "wedding.weekday" | "wedding.dayOfWeek" => text(weekday_ko(date.weekday()).to_string()),
        "wedding.weekdayMinus2" => weekday_at(-2).map(BindingValue::from),
        "wedding.weekdayMinus1" => weekday_at(-1).map(BindingValue::from),
        "wedding.weekdayPlus1" => weekday_at(1).map(BindingValue::from),
        "wedding.weekdayPlus2" => weekday_at(2).map(BindingValue::from),
        "wedding.dayMinus2" => day_at(-2).map(BindingValue::Text),
        "wedding.dayMinus1" => day_at(-1).map(BindingValue::Text),
        "wedding.dayPlus1" => day_at(1).map(BindingValue::Text),
        "wedding.dayPlus2" => day_at(2).map(BindingValue::Text),
        "countdown.days" => {
            let days = (date - options.today()).num_days().max(0);
            Some(BindingValue::Number(days.into()))
        }
        // 静态倒计时只精确到天
        "countdown.hours" | "countdown.minutes" | "countdown.seconds" => {
            Some(BindingValue::Number(0.into()))
        }
        _ => None,
    }
}

// =============================================================================
// 格式串反查
// =============================================================================

/// 提取 `{path}` 格式串引用的有效变量路径
pub fn extract_bindings_from_format(format: &str) -> Vec<String> {
    let mut paths = Vec::new();
    let mut rest = format;

    while let Some(open) = rest.find('{') {
        let after = &rest[open + 1..];
        match after.find('}') {
            Some(0) => rest = &after[1..],
            Some(close) => {
                let path = &after[..close];
                if is_valid_variable_path(path) {
                    paths.push(path.to_string());
                }
                rest = &after[close + 1..];
            }
            None => break,
        }
    }

    paths
}
