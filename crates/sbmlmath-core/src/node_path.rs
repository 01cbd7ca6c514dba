use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum NodePathSegment {
    Element(String),
    Index(usize),
}

/// Location of an element inside a MathML document, written as
/// `/math/apply[0]/csymbol[0]` where `[i]` is the position among the
/// parent's element children.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct NodePath {
    segments: Vec<NodePathSegment>,
}

impl NodePath {
    pub fn root() -> Self {
        Self { segments: Vec::new() }
    }

    pub fn from_segments(segments: Vec<NodePathSegment>) -> Self {
        Self { segments }
    }

    pub fn push_element(&mut self, name: impl Into<String>) {
        self.segments.push(NodePathSegment::Element(name.into()));
    }

    pub fn push_index(&mut self, index: usize) {
        self.segments.push(NodePathSegment::Index(index));
    }

    pub fn pop(&mut self) -> Option<NodePathSegment> {
        self.segments.pop()
    }

    pub fn segments(&self) -> &[NodePathSegment] {
        &self.segments
    }

    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }
}

impl Default for NodePath {
    fn default() -> Self {
        Self::root()
    }
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum NodePathParseError {
    #[error("node path must start with '/'")]
    InvalidStart,
    #[error("empty element name at {0}")]
    EmptyElement(usize),
    #[error("invalid index segment at {0}")]
    InvalidIndex(usize),
    #[error("unexpected character '{ch}' at {pos}")]
    UnexpectedChar { ch: char, pos: usize },
}

impl std::str::FromStr for NodePath {
    type Err = NodePathParseError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let bytes = input.as_bytes();
        if bytes.first() != Some(&b'/') {
            return Err(NodePathParseError::InvalidStart);
        }
        if bytes.len() == 1 {
            return Ok(NodePath::root());
        }

        let mut segments = Vec::new();
        let mut position = 0;
        while position < bytes.len() {
            match bytes[position] {
                b'/' => {
                    position += 1;
                    let start = position;
                    while position < bytes.len() && is_name_byte(bytes[position]) {
                        position += 1;
                    }
                    if start == position {
                        return Err(NodePathParseError::EmptyElement(start));
                    }
                    segments.push(NodePathSegment::Element(input[start..position].to_string()));
                }
                b'[' => {
                    let open = position;
                    position += 1;
                    let start = position;
                    while position < bytes.len() && bytes[position].is_ascii_digit() {
                        position += 1;
                    }
                    if start == position || position >= bytes.len() || bytes[position] != b']' {
                        return Err(NodePathParseError::InvalidIndex(open));
                    }
                    let index = input[start..position]
                        .parse::<usize>()
                        .map_err(|_| NodePathParseError::InvalidIndex(open))?;
                    segments.push(NodePathSegment::Index(index));
                    position += 1;
                }
                other => {
                    return Err(NodePathParseError::UnexpectedChar {
                        ch: other as char,
                        pos: position,
                    })
                }
            }
        }

        Ok(NodePath::from_segments(segments))
    }
}

fn is_name_byte(byte: u8) -> bool {
    byte.is_ascii_alphanumeric() || byte == b'_' || byte == b'-' || byte == b':' || byte == b'.'
}

impl Display for NodePath {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        if self.segments.is_empty() {
            return write!(f, "/");
        }
        for segment in &self.segments {
            match segment {
                NodePathSegment::Element(name) => write!(f, "/{name}")?,
                NodePathSegment::Index(index) => write!(f, "[{index}]")?,
            }
        }
        Ok(())
    }
}

impl From<NodePath> for String {
    fn from(path: NodePath) -> Self {
        path.to_string()
    }
}

impl TryFrom<String> for NodePath {
    type Error = NodePathParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

#[cfg(test)]
#[path = "node_path_test.rs"]
mod tests;
