use crate::error::EditError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// One step of a [`FieldPath`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PathSegment {
    Key(String),
    Index(usize),
}

/// A path to a field inside a node, rooted at the node itself.
///
/// Keys are separated by dots and sequence elements are addressed with `[n]`:
///
/// ```
/// use flowpatch::document::{FieldPath, PathSegment};
///
/// let path: FieldPath = "parameters.rules.values[0].outputKey".parse().unwrap();
/// assert_eq!(path.root(), "parameters");
/// assert_eq!(path.segments()[3], PathSegment::Index(0));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct FieldPath {
    raw: String,
    segments: Vec<PathSegment>,
}

impl FieldPath {
    pub fn segments(&self) -> &[PathSegment] {
        &self.segments
    }

    /// The first key of the path. Parsing guarantees it exists.
    pub fn root(&self) -> &str {
        match self.segments.first() {
            Some(PathSegment::Key(key)) => key,
            _ => "",
        }
    }

    /// Everything after the root key.
    pub fn rest(&self) -> &[PathSegment] {
        self.segments.get(1..).unwrap_or(&[])
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    fn invalid(raw: &str, reason: impl Into<String>) -> EditError {
        EditError::InvalidFieldPath {
            path: raw.to_string(),
            reason: reason.into(),
        }
    }
}

impl FromStr for FieldPath {
    type Err = EditError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        if raw.trim().is_empty() {
            return Err(Self::invalid(raw, "path is empty"));
        }

        let mut segments = Vec::new();
        for part in raw.split('.') {
            let (key, mut indices) = match part.find('[') {
                Some(pos) => (&part[..pos], &part[pos..]),
                None => (part, ""),
            };
            if key.is_empty() {
                return Err(Self::invalid(raw, "every path component needs a key"));
            }
            segments.push(PathSegment::Key(key.to_string()));

            while !indices.is_empty() {
                let close = indices
                    .find(']')
                    .ok_or_else(|| Self::invalid(raw, "unterminated '['"))?;
                if !indices.starts_with('[') {
                    return Err(Self::invalid(raw, "unexpected text after ']'"));
                }
                let index = indices[1..close].parse::<usize>().map_err(|_| {
                    Self::invalid(
                        raw,
                        format!("'{}' is not a sequence index", &indices[1..close]),
                    )
                })?;
                segments.push(PathSegment::Index(index));
                indices = &indices[close + 1..];
            }
        }

        Ok(Self {
            raw: raw.to_string(),
            segments,
        })
    }
}

impl TryFrom<String> for FieldPath {
    type Error = EditError;

    fn try_from(raw: String) -> Result<Self, Self::Error> {
        raw.parse()
    }
}

impl TryFrom<&str> for FieldPath {
    type Error = EditError;

    fn try_from(raw: &str) -> Result<Self, Self::Error> {
        raw.parse()
    }
}

impl From<FieldPath> for String {
    fn from(path: FieldPath) -> Self {
        path.raw
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.raw)
    }
}
