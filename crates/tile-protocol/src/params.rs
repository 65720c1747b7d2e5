//! Render specification to tiler query string.
//!
//! Rules:
//! - `url` and `scale=1` come first, followed by spec fields in the order the
//!   collection declares them
//! - absent and falsy values (`null`, `false`, `0`, `""`) are omitted
//! - arrays are comma-joined, except `colormap` which is sent as JSON
//! - `title` is never sent; each entry of `assets` becomes a trailing `bands` parameter

use explorer_common::RenderSpec;
use serde_json::Value;
use url::form_urlencoded::byte_serialize;

/// Fields that never go into the generic parameter pass.
const EXCLUDED_FIELDS: &[&str] = &["title", "assets"];

/// Encode a render spec plus the resolved asset URL as tiler query parameters.
pub fn encode_render_params(spec: &RenderSpec, resolved_url: &str) -> String {
    let mut params: Vec<(String, Vec<String>)> = vec![
        ("url".to_string(), vec![resolved_url.to_string()]),
        ("scale".to_string(), vec!["1".to_string()]),
    ];

    for (key, value) in spec.fields() {
        if EXCLUDED_FIELDS.contains(&key.as_str()) || is_falsy(value) {
            continue;
        }

        let pieces = if key == "colormap" {
            vec![value.to_string()]
        } else {
            let mut pieces = Vec::new();
            flatten_value(value, &mut pieces);
            pieces
        };

        // A spec field sharing a name with url/scale replaces it in place
        match params.iter_mut().find(|(existing, _)| existing == key) {
            Some(slot) => slot.1 = pieces,
            None => params.push((key.clone(), pieces)),
        }
    }

    let mut query: Vec<String> = params
        .iter()
        .map(|(key, pieces)| encode_pair(key, pieces))
        .collect();

    for asset in spec.assets() {
        query.push(encode_pair("bands", &[asset.to_string()]));
    }

    query.join("&")
}

/// `key=a,b,c` with each piece form-encoded and the list delimiter kept literal.
fn encode_pair(key: &str, pieces: &[String]) -> String {
    let value = pieces
        .iter()
        .map(|piece| byte_serialize(piece.as_bytes()).collect::<String>())
        .collect::<Vec<_>>()
        .join(",");
    format!("{}={}", byte_serialize(key.as_bytes()).collect::<String>(), value)
}

fn is_falsy(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64().map_or(false, |f| f == 0.0 || f.is_nan()),
        Value::String(s) => s.is_empty(),
        Value::Array(_) | Value::Object(_) => false,
    }
}

/// Nested arrays join into one flat list, the same way `Array.join` stringifies them.
fn flatten_value(value: &Value, out: &mut Vec<String>) {
    match value {
        Value::Array(items) => {
            for item in items {
                flatten_value(item, out);
            }
        }
        other => out.push(scalar_to_string(other)),
    }
}

fn scalar_to_string(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                i.to_string()
            } else if let Some(u) = n.as_u64() {
                u.to_string()
            } else {
                let f = n.as_f64().unwrap_or_default();
                if f.fract() == 0.0 && f.abs() < 1e15 {
                    format!("{}", f as i64)
                } else {
                    f.to_string()
                }
            }
        }
        Value::Array(_) | Value::Object(_) => value.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use url::form_urlencoded;

    fn spec(json: &str) -> RenderSpec {
        serde_json::from_str(json).unwrap()
    }

    fn pairs(query: &str) -> Vec<(String, String)> {
        form_urlencoded::parse(query.as_bytes())
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect()
    }

    #[test]
    fn test_basic_spec() {
        let query = encode_render_params(
            &spec(r#"{"colormap_name": "viridis", "rescale": [0, 1], "assets": ["b1", "b2"], "title": "Temp"}"#),
            "vrt:///vsicurl/https://example.com/f.grib2?bands=9",
        );

        assert!(query.contains("colormap_name=viridis"));
        assert!(query.contains("rescale=0,1"));
        assert!(query.ends_with("bands=b1&bands=b2"));
        assert!(query.contains("scale=1"));
        assert!(!query.contains("title="));
        assert!(!query.contains("assets="));
    }

    #[test]
    fn test_order_is_url_scale_fields_bands() {
        let query = encode_render_params(
            &spec(r#"{"assets": ["b1"], "rescale": [0, 1], "colormap_name": "viridis", "resampling": "nearest"}"#),
            "u",
        );
        let keys: Vec<String> = pairs(&query).into_iter().map(|(k, _)| k).collect();
        assert_eq!(
            keys,
            vec!["url", "scale", "rescale", "colormap_name", "resampling", "bands"]
        );
        assert!(!query.contains("assets="));
    }

    #[test]
    fn test_fields_follow_declared_order() {
        let query = encode_render_params(
            &spec(r#"{"colormap_name": "viridis", "rescale": [0, 1], "resampling": "nearest"}"#),
            "u",
        );
        assert_eq!(
            query,
            "url=u&scale=1&colormap_name=viridis&rescale=0,1&resampling=nearest"
        );
    }

    #[test]
    fn test_falsy_values_are_omitted() {
        let query = encode_render_params(
            &spec(r#"{"nodata": 0, "color_formula": "", "colormap_name": "rdbu"}"#),
            "u",
        );
        assert!(!query.contains("nodata"));
        assert!(!query.contains("color_formula"));
        assert!(query.contains("colormap_name=rdbu"));
    }

    #[test]
    fn test_colormap_is_json() {
        let query = encode_render_params(
            &spec(r#"{"colormap": {"1": [255, 0, 0, 255]}}"#),
            "u",
        );
        let decoded = pairs(&query);
        let colormap = decoded
            .iter()
            .find(|(k, _)| k == "colormap")
            .map(|(_, v)| v.clone())
            .unwrap();
        assert_eq!(colormap, r#"{"1":[255,0,0,255]}"#);
    }

    #[test]
    fn test_nested_rescale_is_flattened() {
        let query = encode_render_params(&spec(r#"{"rescale": [[230, 320.5]]}"#), "u");
        assert!(query.contains("rescale=230,320.5"));
    }

    #[test]
    fn test_url_is_encoded_and_deterministic() {
        let s = spec(r#"{"assets": ["grib"], "colormap_name": "viridis"}"#);
        let url = "vrt:///vsicurl/https://example.com/a b.grib2?bands=9";
        let first = encode_render_params(&s, url);
        assert_eq!(first, encode_render_params(&s, url));

        let decoded = pairs(&first);
        assert_eq!(decoded[0], ("url".to_string(), url.to_string()));
        assert_eq!(decoded[1], ("scale".to_string(), "1".to_string()));
    }

    #[test]
    fn test_unknown_fields_keep_their_position() {
        let query = encode_render_params(
            &spec(r#"{"unscale": true, "colormap_name": "viridis"}"#),
            "u",
        );
        let keys: Vec<String> = pairs(&query).into_iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["url", "scale", "unscale", "colormap_name"]);
    }
}
