//! Unified `{code, msg, success, data}` response envelope.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BizCode {
    pub code: i32,
    pub message: &'static str,
}

impl BizCode {
    pub const SUCCESS: BizCode = BizCode::new(0, "success");
    pub const FAILED: BizCode = BizCode::new(1000, "failed");
    pub const PARAM_ERR: BizCode = BizCode::new(1001, "param error");
    pub const SERVER_ERR: BizCode = BizCode::new(1002, "server error");
    pub const DB_ERR: BizCode = BizCode::new(1003, "database error");

    pub const fn new(code: i32, message: &'static str) -> Self {
        Self { code, message }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub code: i32,
    pub msg: String,
    pub success: bool,
    pub data: Option<T>,
}

impl<T> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            code: BizCode::SUCCESS.code,
            msg: BizCode::SUCCESS.message.to_string(),
            success: true,
            data: Some(data),
        }
    }

    pub fn error(biz: BizCode) -> Self {
        Self {
            code: biz.code,
            msg: biz.message.to_string(),
            success: false,
            data: None,
        }
    }

    /// Error envelope with a caller-specific message.
    pub fn error_with_message(biz: BizCode, msg: impl Into<String>) -> Self {
        Self {
            msg: msg.into(),
            ..Self::error(biz)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn ok_envelope() {
        let resp = ApiResponse::ok(json!({"id": 7}));
        assert_eq!(
            serde_json::to_value(&resp).unwrap(),
            json!({"code": 0, "msg": "success", "success": true, "data": {"id": 7}})
        );
    }

    #[test]
    fn error_envelope_has_null_data() {
        let resp: ApiResponse<()> = ApiResponse::error(BizCode::PARAM_ERR);
        assert_eq!(
            serde_json::to_value(&resp).unwrap(),
            json!({"code": 1001, "msg": "param error", "success": false, "data": null})
        );

        let resp: ApiResponse<()> = ApiResponse::error_with_message(BizCode::DB_ERR, "row locked");
        assert_eq!(resp.code, 1003);
        assert_eq!(resp.msg, "row locked");
    }
}
