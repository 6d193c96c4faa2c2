//! `key:value` 字段解析
//!
//! supervisor 的事件头和 payload 都是空格分隔的 `key:value` token，
//! 例如 `processname:foo groupname:bar from_state:RUNNING expected:0 pid:58597`。

use std::collections::HashMap;

use crate::error::ParseError;

/// 解析后的字段表（顺序无关）
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Fields(HashMap<String, String>);

impl Fields {
    /// 解析一行 `key:value` token，按第一个 `:` 切分
    pub fn parse(line: &str) -> Result<Self, ParseError> {
        let mut map = HashMap::new();
        for token in line.split_whitespace() {
            let (key, value) = token
                .split_once(':')
                .ok_or_else(|| ParseError::MalformedToken(token.to_string()))?;
            map.insert(key.to_string(), value.to_string());
        }
        Ok(Self(map))
    }

    /// 解析 payload：只有第一行是字段，后续行是事件正文
    pub fn parse_payload(payload: &str) -> Result<Self, ParseError> {
        let first_line = payload.split('\n').next().unwrap_or_default();
        Self::parse(first_line)
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    /// 获取必需字段
    pub fn require(&self, key: &'static str) -> Result<&str, ParseError> {
        self.get(key).ok_or(ParseError::MissingField(key))
    }

    /// 获取必需的整数字段
    pub fn require_int(&self, key: &'static str) -> Result<i64, ParseError> {
        let raw = self.require(key)?;
        raw.trim().parse().map_err(|_| ParseError::InvalidInteger {
            field: key,
            value: raw.to_string(),
        })
    }
}
