use std::ops::Index;

use axum::http::header::{HeaderMap, HeaderName, HeaderValue};
use serde::{Deserialize, Serialize};

use crate::error::Error;
use crate::range::ResolvedRange;

/// A single response header. Values are stored in their wire form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Header {
    name: String,
    value: String,
}

impl Header {
    pub fn new(name: impl Into<String>, value: impl ToString) -> Self {
        Header { name: name.into(), value: value.to_string() }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    /// ASCII case-insensitive, as HTTP field names are.
    pub fn is_named(&self, name: &str) -> bool {
        self.name.eq_ignore_ascii_case(name)
    }
}

/// Ordered header list holding at most one entry per name.
///
/// [`Headers::set`] replaces an existing entry in place and appends new
/// ones, so iteration order is the order names were first set in.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Headers {
    entries: Vec<Header>,
}

impl Headers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Position of the header called `name`, if present.
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.entries.iter().position(|header| header.is_named(name))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index_of(name).is_some()
    }

    pub fn get(&self, name: &str) -> Option<&Header> {
        self.index_of(name).map(|index| &self.entries[index])
    }

    pub fn get_index(&self, index: usize) -> Option<&Header> {
        self.entries.get(index)
    }

    /// Sets `name` to `value`, keeping the position of an existing entry.
    pub fn set(&mut self, name: impl Into<String>, value: impl ToString) {
        let header = Header::new(name, value);
        match self.index_of(&header.name) {
            Some(index) => self.entries[index].value = header.value,
            None => self.entries.push(header),
        }
    }

    pub fn remove(&mut self, name: &str) -> Option<Header> {
        self.index_of(name).map(|index| self.entries.remove(index))
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Header> {
        self.entries.iter()
    }

    /// Copies every entry into a transport header map, replacing any value
    /// already stored there under the same name.
    pub fn write_to(&self, map: &mut HeaderMap) -> Result<(), Error> {
        for header in self {
            let invalid = || Error::InvalidHeader {
                name: header.name.clone(),
                value: header.value.clone(),
            };
            let name = HeaderName::try_from(header.name.as_str()).map_err(|_| invalid())?;
            let value = HeaderValue::try_from(header.value.as_str()).map_err(|_| invalid())?;
            map.insert(name, value);
        }
        Ok(())
    }
}

impl From<&ResolvedRange> for Headers {
    fn from(range: &ResolvedRange) -> Self {
        let mut headers = Headers::new();
        headers.set("Accept-Ranges", "bytes");
        headers.set("Content-Range", range.content_range());
        headers.set("Content-Length", range.content_length());
        headers.set("Content-Type", range.mime_type());
        headers
    }
}

impl Index<usize> for Headers {
    type Output = Header;

    fn index(&self, index: usize) -> &Header {
        &self.entries[index]
    }
}

impl<'a> IntoIterator for &'a Headers {
    type Item = &'a Header;
    type IntoIter = std::slice::Iter<'a, Header>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

impl IntoIterator for Headers {
    type Item = Header;
    type IntoIter = std::vec::IntoIter<Header>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}
