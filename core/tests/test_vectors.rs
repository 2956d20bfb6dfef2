//! Verify serialization and request building against JSON test vectors
//! stored in `test-vectors/`.
//!
//! Vector files are parsed with `preserve_order`, so each case's `data`
//! keeps the key order written in the file.

use ajax_core::{build_request, serialize, FormData, HttpMethod};

fn data(case: &serde_json::Value) -> FormData {
    case["data"].as_object().cloned().unwrap()
}

#[test]
fn serialize_test_vectors() {
    let raw = include_str!("../../test-vectors/serialize.json");
    let vectors: serde_json::Value = serde_json::from_str(raw).unwrap();

    for case in vectors["cases"].as_array().unwrap() {
        let name = case["name"].as_str().unwrap();
        let expected = case["expected"].as_str().unwrap();
        assert_eq!(serialize(&data(case)), expected, "{name}");
    }
}

#[test]
fn request_test_vectors() {
    let raw = include_str!("../../test-vectors/requests.json");
    let vectors: serde_json::Value = serde_json::from_str(raw).unwrap();

    for case in vectors["cases"].as_array().unwrap() {
        let name = case["name"].as_str().unwrap();
        let method_str = case["method"].as_str().unwrap();
        let req = build_request(case["url"].as_str().unwrap(), method_str, &data(case)).unwrap();

        let expected_method: HttpMethod =
            serde_json::from_value(serde_json::Value::String(method_str.to_uppercase())).unwrap();
        assert_eq!(req.method, expected_method, "{name}: method");
        assert_eq!(req.url, case["expected_url"].as_str().unwrap(), "{name}: url");
        assert_eq!(
            req.body.as_deref(),
            case["expected_body"].as_str(),
            "{name}: body"
        );
    }
}
