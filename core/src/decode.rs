//! Content negotiation: pick a decoder from the response's declared media
//! type.
//!
//! Matching is substring-based and case-insensitive, checked in a fixed
//! order (JSON, text, multipart, octet-stream); the first match wins.

use bytes::Bytes;
use serde_json::Value;

use crate::error::{AjaxError, Result};
use crate::http::HttpResponse;

/// A response body decoded according to its content type.
#[derive(Debug, Clone, PartialEq)]
pub enum Decoded {
    Json(Value),
    Text(String),
    FormData(MultipartForm),
    Bytes(Bytes),
}

impl Decoded {
    pub fn as_json(&self) -> Option<&Value> {
        match self {
            Decoded::Json(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Decoded::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_form(&self) -> Option<&MultipartForm> {
        match self {
            Decoded::FormData(f) => Some(f),
            _ => None,
        }
    }

    pub fn as_bytes(&self) -> Option<&Bytes> {
        match self {
            Decoded::Bytes(b) => Some(b),
            _ => None,
        }
    }
}

/// One part of a `multipart/form-data` body.
#[derive(Debug, Clone, PartialEq)]
pub struct FormPart {
    pub name: String,
    pub filename: Option<String>,
    pub content_type: Option<String>,
    pub data: Bytes,
}

/// Parts of a `multipart/form-data` body, in wire order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MultipartForm {
    pub parts: Vec<FormPart>,
}

impl MultipartForm {
    /// First part named `name`.
    pub fn get(&self, name: &str) -> Option<&FormPart> {
        self.parts.iter().find(|p| p.name == name)
    }

    pub fn get_all<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a FormPart> + 'a {
        self.parts.iter().filter(move |p| p.name == name)
    }

    /// First part named `name` as UTF-8 text, if it is valid UTF-8.
    pub fn text(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(|p| std::str::from_utf8(&p.data).ok())
    }

    pub fn len(&self) -> usize {
        self.parts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }
}

/// Decode `response.body` by its `Content-Type` header.
///
/// Fails with [`AjaxError::Decode`] when the header is missing or names a
/// type with no decoder, and with [`AjaxError::MalformedBody`] when the body
/// does not parse as the declared type.
pub async fn decode(response: HttpResponse) -> Result<Decoded> {
    let Some(content_type) = response.content_type().map(str::to_string) else {
        return Err(AjaxError::Decode { content_type: None });
    };
    let lowered = content_type.to_ascii_lowercase();

    if lowered.contains("application/json") {
        return serde_json::from_slice(&response.body)
            .map(Decoded::Json)
            .map_err(|e| AjaxError::MalformedBody(format!("invalid JSON: {e}")));
    }
    if lowered.contains("text/") {
        return Ok(Decoded::Text(
            String::from_utf8_lossy(&response.body).into_owned(),
        ));
    }
    if lowered.contains("multipart/form-data") {
        return decode_multipart(&content_type, response.body)
            .await
            .map(Decoded::FormData);
    }
    if lowered.contains("application/octet-stream") {
        return Ok(Decoded::Bytes(response.body));
    }

    Err(AjaxError::Decode {
        content_type: Some(content_type),
    })
}

async fn decode_multipart(content_type: &str, body: Bytes) -> Result<MultipartForm> {
    let boundary = multer::parse_boundary(content_type)
        .map_err(|e| AjaxError::MalformedBody(format!("multipart boundary: {e}")))?;
    let stream = futures::stream::once(async move { Ok::<Bytes, std::io::Error>(body) });
    let mut multipart = multer::Multipart::new(stream, boundary);

    let mut form = MultipartForm::default();
    while let Some(field) = multipart.next_field().await.map_err(malformed)? {
        let name = field.name().unwrap_or_default().to_string();
        let filename = field.file_name().map(str::to_string);
        let content_type = field.content_type().map(|m| m.to_string());
        let data = field.bytes().await.map_err(malformed)?;
        form.parts.push(FormPart {
            name,
            filename,
            content_type,
            data,
        });
    }
    Ok(form)
}

fn malformed(err: multer::Error) -> AjaxError {
    AjaxError::MalformedBody(format!("multipart body: {err}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn response(content_type: Option<&str>, body: &'static [u8]) -> HttpResponse {
        HttpResponse {
            status: 200,
            status_text: "OK".to_string(),
            headers: content_type
                .map(|ct| vec![("content-type".to_string(), ct.to_string())])
                .unwrap_or_default(),
            body: Bytes::from_static(body),
        }
    }

    #[tokio::test]
    async fn json_body_decodes_to_value() {
        let decoded = decode(response(Some("application/json; charset=utf-8"), br#"{"x":1}"#))
            .await
            .unwrap();
        assert_eq!(decoded, Decoded::Json(serde_json::json!({"x": 1})));
    }

    #[tokio::test]
    async fn text_types_decode_to_string() {
        for ct in ["text/plain", "text/html", "text/css", "text/javascript", "text/markdown"] {
            let decoded = decode(response(Some(ct), b"hello")).await.unwrap();
            assert_eq!(decoded.as_text(), Some("hello"), "{ct}");
        }
    }

    #[tokio::test]
    async fn invalid_utf8_text_is_replaced() {
        let decoded = decode(response(Some("text/plain"), b"a\xffb")).await.unwrap();
        assert_eq!(decoded.as_text(), Some("a\u{FFFD}b"));
    }

    #[tokio::test]
    async fn octet_stream_decodes_to_bytes() {
        let decoded = decode(response(Some("application/octet-stream"), &[0, 1, 255]))
            .await
            .unwrap();
        assert_eq!(decoded.as_bytes().map(|b| b.as_ref()), Some(&[0u8, 1, 255][..]));
    }

    #[tokio::test]
    async fn content_type_match_ignores_case() {
        let decoded = decode(response(Some("Application/JSON"), b"[1,2]")).await.unwrap();
        assert_eq!(decoded, Decoded::Json(serde_json::json!([1, 2])));
    }

    #[tokio::test]
    async fn multipart_decodes_parts_in_order() {
        let body = b"--XYZ\r\n\
Content-Disposition: form-data; name=\"title\"\r\n\
\r\n\
hello\r\n\
--XYZ\r\n\
Content-Disposition: form-data; name=\"file\"; filename=\"a.txt\"\r\n\
Content-Type: text/plain\r\n\
\r\n\
abc\r\n\
--XYZ--\r\n";
        let decoded = decode(response(Some("multipart/form-data; boundary=XYZ"), body))
            .await
            .unwrap();
        let form = decoded.as_form().unwrap();
        assert_eq!(form.len(), 2);
        assert_eq!(form.text("title"), Some("hello"));
        let file = form.get("file").unwrap();
        assert_eq!(file.filename.as_deref(), Some("a.txt"));
        assert_eq!(file.content_type.as_deref(), Some("text/plain"));
        assert_eq!(file.data, Bytes::from_static(b"abc"));
    }

    #[tokio::test]
    async fn repeated_field_names_are_all_kept() {
        let body = b"--B\r\n\
Content-Disposition: form-data; name=\"tag\"\r\n\
\r\n\
red\r\n\
--B\r\n\
Content-Disposition: form-data; name=\"tag\"\r\n\
\r\n\
blue\r\n\
--B--\r\n";
        let decoded = decode(response(Some("multipart/form-data; boundary=B"), body))
            .await
            .unwrap();
        let form = decoded.as_form().unwrap();
        let tags: Vec<&[u8]> = form.get_all("tag").map(|p| p.data.as_ref()).collect();
        assert_eq!(tags, vec![&b"red"[..], &b"blue"[..]]);
        assert_eq!(form.text("tag"), Some("red"));
        assert!(form.get_all("missing").next().is_none());
    }

    #[tokio::test]
    async fn missing_content_type_is_a_decode_error() {
        let err = decode(response(None, b"{}")).await.unwrap_err();
        assert!(matches!(err, AjaxError::Decode { content_type: None }));
    }

    #[tokio::test]
    async fn unknown_content_type_is_a_decode_error() {
        let err = decode(response(Some("application/xml"), b"<a/>")).await.unwrap_err();
        assert!(matches!(
            err,
            AjaxError::Decode { content_type: Some(ct) } if ct == "application/xml"
        ));
    }

    #[tokio::test]
    async fn bad_json_is_malformed() {
        let err = decode(response(Some("application/json"), b"{oops")).await.unwrap_err();
        assert!(matches!(err, AjaxError::MalformedBody(_)));
    }

    #[tokio::test]
    async fn multipart_without_boundary_is_malformed() {
        let err = decode(response(Some("multipart/form-data"), b"")).await.unwrap_err();
        assert!(matches!(err, AjaxError::MalformedBody(_)));
    }
}
