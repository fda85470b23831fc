//! multipart/mixed request body assembly, plus the small amount of parsing
//! the sink needs to count parts back out of a body.

use bytes::{BufMut, Bytes, BytesMut};

pub const MULTIPART_MIXED: &str = "multipart/mixed";
pub const OCTET_STREAM: &str = "application/octet-stream";

/// Builder for a multipart/mixed body. Parts are emitted in insertion
/// order.
pub struct MultipartBuilder {
    boundary: String,
    parts: Vec<Part>,
}

struct Part {
    content_type: String,
    data: Bytes,
}

impl MultipartBuilder {
    pub fn new() -> Self {
        Self::with_boundary(format!("stream-bench-{:016x}", rand::random::<u64>()))
    }

    /// Fixed boundary, for callers that assert on the framing.
    pub fn with_boundary(boundary: impl Into<String>) -> Self {
        Self {
            boundary: boundary.into(),
            parts: Vec::new(),
        }
    }

    /// Append one part carrying `data` under `content_type`.
    pub fn part(mut self, content_type: &str, data: Bytes) -> Self {
        self.parts.push(Part {
            content_type: content_type.to_string(),
            data,
        });
        self
    }

    pub fn part_count(&self) -> usize {
        self.parts.len()
    }

    pub fn build(self) -> MultipartBody {
        let mut buf = BytesMut::new();
        for part in &self.parts {
            buf.put_slice(b"--");
            buf.put_slice(self.boundary.as_bytes());
            buf.put_slice(b"\r\n");
            buf.put_slice(format!("Content-Type: {}\r\n", part.content_type).as_bytes());
            buf.put_slice(format!("Content-Length: {}\r\n", part.data.len()).as_bytes());
            buf.put_slice(b"\r\n");
            buf.put_slice(&part.data);
            buf.put_slice(b"\r\n");
        }
        buf.put_slice(b"--");
        buf.put_slice(self.boundary.as_bytes());
        buf.put_slice(b"--\r\n");

        MultipartBody {
            content_type: format!("{MULTIPART_MIXED}; boundary={}", self.boundary),
            part_count: self.parts.len(),
            bytes: buf.freeze(),
        }
    }
}

impl Default for MultipartBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A fully assembled multipart/mixed body.
pub struct MultipartBody {
    content_type: String,
    part_count: usize,
    bytes: Bytes,
}

impl MultipartBody {
    /// Value for the request's Content-Type header, boundary included.
    pub fn content_type(&self) -> &str {
        &self.content_type
    }

    pub fn part_count(&self) -> usize {
        self.part_count
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn into_bytes(self) -> Bytes {
        self.bytes
    }
}

/// Pull the boundary parameter out of a multipart/mixed Content-Type value.
pub fn boundary_of(content_type: &str) -> Option<&str> {
    let rest = content_type.strip_prefix(MULTIPART_MIXED)?;
    rest.split(';')
        .map(str::trim)
        .find_map(|param| param.strip_prefix("boundary="))
        .map(|b| b.trim_matches('"'))
}

/// Count the parts of `body` framed by the boundary named in
/// `content_type`. `None` when the content type is not multipart/mixed.
pub fn count_parts(content_type: &str, body: &[u8]) -> Option<usize> {
    let boundary = boundary_of(content_type)?;
    // The closing delimiter ends in "--", so matching on the trailing CRLF
    // counts only the per-part delimiters.
    let delimiter = format!("--{boundary}\r\n");
    Some(occurrences(body, delimiter.as_bytes()))
}

fn occurrences(haystack: &[u8], needle: &[u8]) -> usize {
    if needle.is_empty() {
        return 0;
    }
    haystack.windows(needle.len()).filter(|w| *w == needle).count()
}
