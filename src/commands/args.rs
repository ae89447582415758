//! 命令参数解析
//!
//! 命令直接读取原始调用体，自行区分「参数不是对象 / 类型不符」与「缺少参数」，
//! 对应前端的 `INVALID_ARGUMENTS` 和 `MISSING_ARGUMENT`。

use serde_json::{Map, Value};
use tauri::ipc::InvokeBody;

use crate::{AppError, AppResult};

/// 取出 JSON 调用体，原始字节体视为参数不是对象
pub(crate) fn json_body(body: &InvokeBody) -> AppResult<&Value> {
    match body {
        InvokeBody::Json(value) => Ok(value),
        InvokeBody::Raw(_) => Err(AppError::InvalidArguments),
    }
}

pub(crate) struct Arguments<'a> {
    map: &'a Map<String, Value>,
}

impl<'a> Arguments<'a> {
    pub fn from_value(value: &'a Value) -> AppResult<Self> {
        value
            .as_object()
            .map(|map| Self { map })
            .ok_or(AppError::InvalidArguments)
    }

    /// 必填字符串参数，缺失或为 null 时 `MissingArgument`
    pub fn string(&self, key: &'static str) -> AppResult<&'a str> {
        match self.map.get(key) {
            None | Some(Value::Null) => Err(AppError::MissingArgument(key)),
            Some(Value::String(s)) => Ok(s),
            Some(_) => Err(AppError::InvalidArguments),
        }
    }

    pub fn bool_or(&self, key: &'static str, default: bool) -> AppResult<bool> {
        match self.map.get(key) {
            None | Some(Value::Null) => Ok(default),
            Some(Value::Bool(b)) => Ok(*b),
            Some(_) => Err(AppError::InvalidArguments),
        }
    }
}
