use axum::http::StatusCode;

use crate::error::RangeError;
use crate::headers::Headers;

/// Content type used when none was requested or sniffed.
pub const DEFAULT_MIME_TYPE: &str = "application/octet-stream";

const BYTES_UNIT: &str = "bytes";

/// The byte window and status chosen for one request.
///
/// Offsets are inclusive. For an empty file the window is `0-0` with a
/// content length of zero.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedRange {
    status: StatusCode,
    start: u64,
    end: u64,
    content_length: u64,
    file_len: u64,
    mime_type: String,
}

impl ResolvedRange {
    fn full(status: StatusCode, file_len: u64, mime_type: String) -> Self {
        Self::window(status, 0, file_len.saturating_sub(1), file_len, mime_type)
    }

    fn window(status: StatusCode, start: u64, end: u64, file_len: u64, mime_type: String) -> Self {
        let content_length = if file_len == 0 { 0 } else { end - start + 1 };
        ResolvedRange { status, start, end, content_length, file_len, mime_type }
    }

    /// 200 or 206.
    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn start(&self) -> u64 {
        self.start
    }

    pub fn end(&self) -> u64 {
        self.end
    }

    pub fn content_length(&self) -> u64 {
        self.content_length
    }

    pub fn file_len(&self) -> u64 {
        self.file_len
    }

    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    pub fn is_partial(&self) -> bool {
        self.status == StatusCode::PARTIAL_CONTENT
    }

    /// Value of the `Content-Range` header. An empty file reports `0-0/0`.
    pub fn content_range(&self) -> String {
        format!("{BYTES_UNIT} {}-{}/{}", self.start, self.end, self.file_len)
    }

    /// The four response headers, in the order they are sent.
    pub fn headers(&self) -> Headers {
        Headers::from(self)
    }
}

/// Resolves a raw `Range` value against a file of `file_len` bytes.
///
/// Only a single `bytes` range is understood. `bytes=N-` runs from `N` to
/// the end of the file and `bytes=-N` selects the last `N` bytes. Bounds
/// past the end of the file are clamped.
///
/// With `tolerate_errors` set, a malformed `bytes` range falls back to the
/// whole file but is still answered with 206, while a foreign unit is
/// ignored and answered with 200. Without it every problem is returned as
/// a [`RangeError`].
pub fn resolve(
    file_len: u64,
    mime_type: Option<&str>,
    range: Option<&str>,
    tolerate_errors: bool,
) -> Result<ResolvedRange, RangeError> {
    let mime_type = mime_type.unwrap_or(DEFAULT_MIME_TYPE).to_string();

    let Some(range) = range else {
        return Ok(ResolvedRange::full(StatusCode::OK, file_len, mime_type));
    };

    let (unit, pair) = range.split_once('=').unwrap_or((range, ""));
    if unit != BYTES_UNIT {
        let err = RangeError::UnsupportedRangeUnit { unit: unit.to_string() };
        if !tolerate_errors {
            return Err(err);
        }
        tracing::warn!(%err, range, "ignoring range request");
        return Ok(ResolvedRange::full(StatusCode::OK, file_len, mime_type));
    }

    match byte_window(pair, file_len) {
        Ok((start, end)) => {
            tracing::debug!(start, end, file_len, "resolved byte range");
            Ok(ResolvedRange::window(StatusCode::PARTIAL_CONTENT, start, end, file_len, mime_type))
        }
        Err(err) if tolerate_errors => {
            tracing::warn!(%err, range, "serving whole file for malformed range");
            Ok(ResolvedRange::full(StatusCode::PARTIAL_CONTENT, file_len, mime_type))
        }
        Err(err) => Err(err),
    }
}

/// Turns the part after `bytes=` into a clamped inclusive window.
fn byte_window(pair: &str, file_len: u64) -> Result<(u64, u64), RangeError> {
    if pair.contains(',') {
        return Err(RangeError::MultipleRanges);
    }

    let (first, last) = match pair.split('-').collect::<Vec<_>>()[..] {
        [first] => (first, ""),
        [first, last] => (first, last),
        // a third segment means one of the bounds was signed
        _ => return Err(RangeError::NegativeRangeBound { bound: pair.to_string() }),
    };

    let first = parse_bound(first)?;
    let last = parse_bound(last)?;

    if file_len == 0 {
        return match (first, last) {
            (None, None) => Err(RangeError::MissingRangeBounds),
            _ => Ok((0, 0)),
        };
    }

    let end_index = file_len - 1;
    let (start, end) = match (first, last) {
        (None, None) => return Err(RangeError::MissingRangeBounds),
        (Some(start), None) => (start, end_index),
        // the trailing number is a count of bytes from the end
        (None, Some(suffix)) => (file_len.saturating_sub(suffix), end_index),
        (Some(start), Some(end)) => (start, end.min(end_index)),
    };

    if start > end {
        return Err(RangeError::InvalidRangeOrder { start, end, file_len });
    }
    Ok((start, end))
}

fn parse_bound(bound: &str) -> Result<Option<u64>, RangeError> {
    let bound = bound.trim_matches(|c: char| c.is_ascii_whitespace());
    if bound.is_empty() {
        return Ok(None);
    }
    if !bound.bytes().all(|b| b.is_ascii_digit()) {
        return Err(RangeError::MalformedRangeBound { bound: bound.to_string() });
    }
    // only overflow can fail here, and an oversized bound is clamped anyway
    Ok(Some(bound.parse().unwrap_or(u64::MAX)))
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use axum::http::StatusCode;

    use super::{resolve, ResolvedRange, DEFAULT_MIME_TYPE};
    use crate::error::RangeError;

    fn window(range: &ResolvedRange) -> (StatusCode, u64, u64, u64) {
        (range.status(), range.start(), range.end(), range.content_length())
    }

    #[test]
    fn test_no_range_is_whole_file() {
        for file_len in [1, 2, 54, 1000, u64::MAX] {
            let range = resolve(file_len, None, None, false).unwrap();
            assert_eq!((StatusCode::OK, 0, file_len - 1, file_len), window(&range));
            assert_eq!(file_len, range.file_len());
            assert!(!range.is_partial());
        }
    }

    #[test]
    fn test_resolve_ranges() {
        let tests = [
            ("bytes=0-0", 1000, (StatusCode::PARTIAL_CONTENT, 0, 0, 1)),
            ("bytes=200-499", 1000, (StatusCode::PARTIAL_CONTENT, 200, 499, 300)),
            ("bytes=0-999", 1000, (StatusCode::PARTIAL_CONTENT, 0, 999, 1000)),
            ("bytes=999-999", 1000, (StatusCode::PARTIAL_CONTENT, 999, 999, 1)),
            ("bytes=100-", 1000, (StatusCode::PARTIAL_CONTENT, 100, 999, 900)),
            ("bytes=-100", 1000, (StatusCode::PARTIAL_CONTENT, 900, 999, 100)),
            ("bytes=-1", 1000, (StatusCode::PARTIAL_CONTENT, 999, 999, 1)),
            ("bytes=-5000", 1000, (StatusCode::PARTIAL_CONTENT, 0, 999, 1000)),
            ("bytes=30-99", 54, (StatusCode::PARTIAL_CONTENT, 30, 53, 24)),
            ("bytes=0-99999999999999999999999", 54, (StatusCode::PARTIAL_CONTENT, 0, 53, 54)),
            ("bytes= 10 - 19 ", 54, (StatusCode::PARTIAL_CONTENT, 10, 19, 10)),
            ("bytes=40", 54, (StatusCode::PARTIAL_CONTENT, 40, 53, 14)),
        ];

        for (i, (header, file_len, expected)) in tests.iter().enumerate() {
            let range = resolve(*file_len, None, Some(*header), false)
                .unwrap_or_else(|e| panic!("range #{i} {header:?} failed: {e}"));
            assert_eq!(*expected, window(&range), "range #{i}: {header}");
        }
    }

    #[test]
    fn test_every_valid_window_is_kept() {
        let file_len = 16;
        for start in 0..file_len {
            for end in start..file_len {
                let header = format!("bytes={start}-{end}");
                let range = resolve(file_len, None, Some(header.as_str()), false).unwrap();
                assert_eq!((StatusCode::PARTIAL_CONTENT, start, end, end - start + 1), window(&range));
            }
        }
    }

    #[test]
    fn test_start_after_end() {
        let err = resolve(1000, None, Some("bytes=500-200"), false).unwrap_err();
        assert_eq!(RangeError::InvalidRangeOrder { start: 500, end: 200, file_len: 1000 }, err);

        let range = resolve(1000, None, Some("bytes=500-200"), true).unwrap();
        assert_eq!((StatusCode::PARTIAL_CONTENT, 0, 999, 1000), window(&range));
    }

    #[test]
    fn test_start_past_end_of_file() {
        assert_matches!(
            resolve(54, None, Some("bytes=99-"), false),
            Err(RangeError::InvalidRangeOrder { start: 99, end: 53, file_len: 54 })
        );
        assert_matches!(
            resolve(54, None, Some("bytes=-0"), false),
            Err(RangeError::InvalidRangeOrder { start: 54, end: 53, .. })
        );
    }

    #[test]
    fn test_malformed_bytes_ranges() {
        let tests = [
            ("bytes=-", RangeError::MissingRangeBounds),
            ("bytes=", RangeError::MissingRangeBounds),
            ("bytes", RangeError::MissingRangeBounds),
            ("bytes=-5-10", RangeError::NegativeRangeBound { bound: "-5-10".into() }),
            ("bytes=5--10", RangeError::NegativeRangeBound { bound: "5--10".into() }),
            ("bytes=a-b", RangeError::MalformedRangeBound { bound: "a".into() }),
            ("bytes=+5-10", RangeError::MalformedRangeBound { bound: "+5".into() }),
            ("bytes=0-1,5-6", RangeError::MultipleRanges),
        ];

        for (header, expected) in tests {
            assert_eq!(Err(expected), resolve(1000, None, Some(header), false), "{header}");

            let range = resolve(1000, None, Some(header), true).unwrap();
            assert_eq!((StatusCode::PARTIAL_CONTENT, 0, 999, 1000), window(&range), "{header}");
        }
    }

    #[test]
    fn test_unsupported_unit() {
        for header in ["items=0-10", "Bytes=0-10", "none"] {
            assert_matches!(
                resolve(1000, None, Some(header), false),
                Err(RangeError::UnsupportedRangeUnit { .. })
            );

            let range = resolve(1000, None, Some(header), true).unwrap();
            assert_eq!((StatusCode::OK, 0, 999, 1000), window(&range), "{header}");
        }
    }

    #[test]
    fn test_empty_file() {
        for header in [None, Some("bytes=0-10"), Some("bytes=-100"), Some("bytes=5-")] {
            let range = resolve(0, None, header, false).unwrap();
            assert_eq!(0, range.content_length(), "{header:?}");
            assert_eq!((0, 0), (range.start(), range.end()));
            assert_eq!("bytes 0-0/0", range.content_range());
        }

        assert_eq!(StatusCode::OK, resolve(0, None, None, false).unwrap().status());
        assert_eq!(StatusCode::PARTIAL_CONTENT, resolve(0, None, Some("bytes=0-"), false).unwrap().status());
        assert_eq!(Err(RangeError::MissingRangeBounds), resolve(0, None, Some("bytes=-"), false));
    }

    #[test]
    fn test_mime_type() {
        let range = resolve(10, None, None, false).unwrap();
        assert_eq!(DEFAULT_MIME_TYPE, range.mime_type());

        let range = resolve(10, Some("audio/mpeg"), None, false).unwrap();
        assert_eq!("audio/mpeg", range.mime_type());
    }

    #[test]
    fn test_content_range() {
        let range = resolve(54, None, Some("bytes=30-53"), false).unwrap();
        assert_eq!("bytes 30-53/54", range.content_range());

        let range = resolve(54, None, None, false).unwrap();
        assert_eq!("bytes 0-53/54", range.content_range());
    }

    #[test]
    fn test_resolve_is_idempotent() {
        for header in [None, Some("bytes=100-"), Some("bytes=500-200"), Some("items=1-2")] {
            let first = resolve(1000, Some("text/plain"), header, true);
            let second = resolve(1000, Some("text/plain"), header, true);
            assert_eq!(first, second);
        }
    }
}
