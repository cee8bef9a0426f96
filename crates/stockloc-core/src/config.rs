//! 儲位配置

use serde::{Deserialize, Serialize};

use crate::{LocationError, Result};

/// 儲位分類配置
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LocationConfig {
    /// 複製儲位時附加在名稱後的後綴
    pub copy_name_suffix: String,

    /// 向上遍歷的最大深度，超過即視為層級循環
    pub max_depth: usize,

    /// 多筆唯一性檢查是否並行執行
    pub parallel_validation: bool,
}

impl Default for LocationConfig {
    fn default() -> Self {
        Self {
            copy_name_suffix: "(copy)".to_string(),
            max_depth: 256,
            parallel_validation: true,
        }
    }
}

impl LocationConfig {
    /// 創建預設配置
    pub fn new() -> Self {
        Self::default()
    }

    /// 從 JSON 載入配置
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| LocationError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// 建構器模式：設置複製後綴
    pub fn with_copy_name_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.copy_name_suffix = suffix.into();
        self
    }

    /// 建構器模式：設置最大深度
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// 建構器模式：設置是否並行檢查
    pub fn with_parallel_validation(mut self, parallel: bool) -> Self {
        self.parallel_validation = parallel;
        self
    }

    /// 檢查配置是否有效
    pub fn validate(&self) -> Result<()> {
        if self.max_depth == 0 {
            return Err(LocationError::Config("max_depth 必須大於 0".to_string()));
        }
        if self.copy_name_suffix.trim().is_empty() {
            return Err(LocationError::Config(
                "copy_name_suffix 不可為空".to_string(),
            ));
        }
        Ok(())
    }

    /// 複製儲位時的預設名稱
    pub fn copy_name(&self, name: &str) -> String {
        format!("{} {}", name, self.copy_name_suffix)
    }
}
