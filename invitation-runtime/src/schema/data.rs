//! 绑定数据

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// 邀请函绑定数据
///
/// 结构是开放的 JSON 对象（couple / wedding / venue / photos ...），
/// 用户自定义变量放在扁平的 `custom` 命名空间下。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WeddingData(Value);

impl Default for WeddingData {
    fn default() -> Self {
        Self(Value::Object(Map::new()))
    }
}

impl From<Value> for WeddingData {
    fn from(value: Value) -> Self {
        Self(value)
    }
}

impl WeddingData {
    pub fn new(value: Value) -> Self {
        Self(value)
    }

    pub fn as_value(&self) -> &Value {
        &self.0
    }

    /// 自定义变量命名空间
    pub fn custom(&self) -> Option<&Map<String, Value>> {
        self.0.get("custom").and_then(Value::as_object)
    }

    /// 查询自定义变量（key 按字面匹配，不再按 `.` 拆分）
    pub fn custom_value(&self, key: &str) -> Option<&Value> {
        self.custom().and_then(|c| c.get(key))
    }

    /// 设置自定义变量，返回新值
    pub fn with_custom(&self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        let mut root = match &self.0 {
            Value::Object(map) => map.clone(),
            _ => Map::new(),
        };
        let custom = root
            .entry("custom")
            .or_insert_with(|| Value::Object(Map::new()));
        if !custom.is_object() {
            *custom = Value::Object(Map::new());
        }
        if let Value::Object(map) = custom {
            map.insert(key.into(), value.into());
        }
        Self(Value::Object(root))
    }
}
