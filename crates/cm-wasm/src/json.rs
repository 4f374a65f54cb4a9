//! JSON at the JavaScript boundary. Kept free of `web-sys` so it can be
//! tested natively.

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64_STANDARD;
use cm_core::{PointKey, RawElement};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use std::collections::HashMap;

/// An element descriptor as the host chart library reports it.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HostElement {
    #[serde(flatten)]
    pub key: PointKey,
    #[serde(flatten)]
    pub raw: RawElement,
}

/// Parse boundary JSON, logging what was rejected.
pub fn parse<T: DeserializeOwned>(what: &str, json: &str) -> Option<T> {
    match serde_json::from_str(json) {
        Ok(v) => Some(v),
        Err(e) => {
            log::warn!("rejected {what} JSON: {e}");
            None
        }
    }
}

/// `{"url": "<base64 bytes>", ...}` into raw bytes per URL.
pub fn decode_assets(json: &str) -> Result<HashMap<String, Vec<u8>>, String> {
    if json.trim().is_empty() {
        return Ok(HashMap::new());
    }
    let encoded: HashMap<String, String> =
        serde_json::from_str(json).map_err(|e| format!("asset map: {e}"))?;
    encoded
        .into_iter()
        .map(|(url, b64)| {
            BASE64_STANDARD
                .decode(b64.trim())
                .map(|bytes| (url.clone(), bytes))
                .map_err(|e| format!("asset {url}: {e}"))
        })
        .collect()
}

pub fn ok_with(field: &str, value: &str) -> String {
    let mut obj = serde_json::Map::new();
    obj.insert("ok".to_string(), serde_json::Value::Bool(true));
    obj.insert(field.to_string(), serde_json::Value::String(value.to_string()));
    serde_json::Value::Object(obj).to_string()
}

pub fn error(message: &str) -> String {
    serde_json::json!({ "ok": false, "error": message }).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn host_elements_carry_their_key() {
        let v: Vec<HostElement> = parse(
            "elements",
            r#"[{"datasetIndex":1,"pointIndex":4,"x":10,"y":20,"base":90,"width":12}]"#,
        )
        .expect("valid");
        assert_eq!(v[0].key, PointKey::new(1, 4));
        assert_eq!(v[0].raw.base, Some(90.0));
        assert_eq!(v[0].raw.start_angle, None);
    }

    #[test]
    fn malformed_json_is_rejected_not_panicked() {
        assert!(parse::<Vec<HostElement>>("elements", "[{").is_none());
    }

    #[test]
    fn assets_decode_from_base64() {
        let assets = decode_assets(r#"{"a.png":"iVBORw0KGgo="}"#).expect("valid");
        assert_eq!(assets["a.png"][..4], [0x89, b'P', b'N', b'G']);
        assert!(decode_assets("").expect("empty is fine").is_empty());
        assert!(decode_assets(r#"{"a.png":"***"}"#).is_err());
    }

    #[test]
    fn result_objects_escape_their_payload() {
        let err: serde_json::Value = serde_json::from_str(&error("bad \"url\"")).expect("json");
        assert_eq!(err["ok"], false);
        assert_eq!(err["error"], "bad \"url\"");
        let ok: serde_json::Value = serde_json::from_str(&ok_with("script", "a\nb")).expect("json");
        assert_eq!(ok["ok"], true);
        assert_eq!(ok["script"], "a\nb");
    }
}
