//! 欄位快照
//!
//! 名稱格式只能讀取扁平的純量欄位值，不能拿到儲位本身或儲位樹的引用，
//! 以免透過關聯欄位讀到不相干的資料。

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// 純量欄位值
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    /// 文字
    Text(String),
    /// 整數
    Integer(i64),
}

impl FieldValue {
    /// 取得文字值
    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldValue::Text(value) => Some(value),
            FieldValue::Integer(_) => None,
        }
    }

    /// 取得整數值
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            FieldValue::Text(_) => None,
            FieldValue::Integer(value) => Some(*value),
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Text(value) => f.write_str(value),
            FieldValue::Integer(value) => write!(f, "{}", value),
        }
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Text(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::Text(value)
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        FieldValue::Integer(value)
    }
}

/// 欄位名稱到純量值的扁平映射
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldSnapshot {
    values: BTreeMap<String, FieldValue>,
}

impl FieldSnapshot {
    /// 創建空快照
    pub fn new() -> Self {
        Self::default()
    }

    /// 建構器模式：設置欄位
    pub fn with(mut self, field: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        self.insert(field, value);
        self
    }

    /// 設置欄位
    pub fn insert(&mut self, field: impl Into<String>, value: impl Into<FieldValue>) {
        self.values.insert(field.into(), value.into());
    }

    /// 讀取欄位
    pub fn get(&self, field: &str) -> Option<&FieldValue> {
        self.values.get(field)
    }

    pub fn contains(&self, field: &str) -> bool {
        self.values.contains_key(field)
    }

    /// 所有欄位名稱
    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}
