//! Envelope decoding and request shaping helpers.

use serde::Deserialize;
use serde_json::Value;

use super::{ApiError, ApiResponse};

const SUCCESS_CODE: i64 = 200;

#[derive(Debug, Deserialize)]
struct Envelope {
    #[serde(default)]
    code: i64,
    #[serde(default)]
    data: Value,
    #[serde(default)]
    msg: Option<String>,
}

/// Decode a `{code, data, msg?}` body. HTTP status is only used for error context.
pub fn decode_envelope(url: &str, status: u32, body: &[u8]) -> Result<ApiResponse, ApiError> {
    let envelope: Envelope = serde_json::from_slice(body).map_err(|source| ApiError::Decode {
        url: url.to_string(),
        status,
        source,
    })?;
    if envelope.code == SUCCESS_CODE {
        Ok(ApiResponse::Data(envelope.data))
    } else {
        Ok(ApiResponse::Rejected {
            code: envelope.code,
            message: envelope.msg,
        })
    }
}

/// Query parameters for a GET payload. Non-object payloads produce none; nulls are skipped.
pub fn query_pairs(payload: &Value) -> Vec<(String, String)> {
    let Some(map) = payload.as_object() else {
        return Vec::new();
    };
    map.iter()
        .filter_map(|(k, v)| {
            let rendered = match v {
                Value::Null => return None,
                Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            Some((k.clone(), rendered))
        })
        .collect()
}

/// Append `path` to `base` with exactly one `/` between them.
pub fn join_path(base: &str, path: &str) -> String {
    let path = path.trim_start_matches('/');
    if base.ends_with('/') {
        format!("{}{}", base, path)
    } else {
        format!("{}/{}", base, path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn code_200_yields_data() {
        let r = decode_envelope("u", 200, br#"{"code":200,"data":"task-1"}"#).unwrap();
        assert_eq!(r, ApiResponse::Data(json!("task-1")));
    }

    #[test]
    fn code_200_without_data_is_null() {
        let r = decode_envelope("u", 200, br#"{"code":200}"#).unwrap();
        assert_eq!(r, ApiResponse::Data(Value::Null));
    }

    #[test]
    fn other_codes_are_rejected_with_message() {
        let r = decode_envelope("u", 200, br#"{"code":401,"msg":"bad signature"}"#).unwrap();
        assert_eq!(
            r,
            ApiResponse::Rejected {
                code: 401,
                message: Some("bad signature".into())
            }
        );
    }

    #[test]
    fn missing_code_is_rejected_as_zero() {
        let r = decode_envelope("u", 200, br#"{"data":{}}"#).unwrap();
        assert!(matches!(r, ApiResponse::Rejected { code: 0, .. }));
    }

    #[test]
    fn html_body_is_decode_error() {
        let e = decode_envelope("https://x/y", 502, b"<html>bad gateway</html>").unwrap_err();
        match e {
            ApiError::Decode { url, status, .. } => {
                assert_eq!(url, "https://x/y");
                assert_eq!(status, 502);
            }
            other => panic!("expected Decode, got {:?}", other),
        }
    }

    #[test]
    fn query_pairs_render_scalars() {
        let mut pairs = query_pairs(&json!({
            "taskId": "J1",
            "speakerNum": 2,
            "flag": true,
            "skip": null
        }));
        pairs.sort();
        assert_eq!(
            pairs,
            vec![
                ("flag".to_string(), "true".to_string()),
                ("speakerNum".to_string(), "2".to_string()),
                ("taskId".to_string(), "J1".to_string()),
            ]
        );
        assert!(query_pairs(&Value::Null).is_empty());
    }

    #[test]
    fn join_path_single_slash() {
        assert_eq!(join_path("https://h/result/", "J1"), "https://h/result/J1");
        assert_eq!(join_path("https://h/result", "J1"), "https://h/result/J1");
        assert_eq!(join_path("https://h/result/", "/J1"), "https://h/result/J1");
    }
}
