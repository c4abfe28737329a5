use thiserror::Error;
use tracing::trace;

use crate::FeatureTree;

/// Deepest group nesting `parse` accepts, the top-level group is depth 1.
pub const MAX_DEPTH: usize = 64;

/// A capability string that violates the grammar.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum MalformedCapabilityString {
    /// The string does not start with `(`.
    #[error("Capability string does not start with '('")]
    MissingOpeningParenthesis,

    /// A `(` was found with no key in front of it.
    #[error("Capability string has a group with no key at byte {position}")]
    UnnamedGroup {
        /// Byte offset of the offending `(`.
        position: usize,
    },

    /// The string ended before every group was closed.
    #[error("Capability string ended with {depth} unclosed group(s)")]
    Unterminated {
        /// How many groups were still open.
        depth: usize,
    },

    /// Groups are nested deeper than [`MAX_DEPTH`].
    #[error("Capability string nests groups deeper than {MAX_DEPTH} at byte {position}")]
    TooDeep {
        /// Byte offset of the `(` that opened the group past the limit.
        position: usize,
    },
}

/// Parses a capability string such as `(prot(monitor)vcp(10 12 60(0F 11)))` into a tree.
///
/// Anything after the `)` closing the top-level group is ignored.
pub fn parse(source: &str) -> Result<FeatureTree, MalformedCapabilityString> {
    let mut parser = Parser::new(source);
    parser.open_top_level()?;
    let tree = parser.parse_group(1)?;

    if parser.position < source.len() {
        trace!(
            "Ignoring {} trailing byte(s) in capability string",
            source.len() - parser.position
        );
    }

    Ok(tree)
}

/// Cursor over the capability string.
struct Parser<'a> {
    source: &'a str,
    position: usize,
}

impl<'a> Parser<'a> {
    fn new(source: &'a str) -> Self {
        Self {
            source,
            position: 0,
        }
    }

    fn peek(&self) -> Option<u8> {
        self.source.as_bytes().get(self.position).copied()
    }

    /// Skips leading whitespace then consumes the top-level `(`.
    fn open_top_level(&mut self) -> Result<(), MalformedCapabilityString> {
        while self.peek().is_some_and(|byte| byte.is_ascii_whitespace()) {
            self.position += 1;
        }

        match self.peek() {
            Some(b'(') => {
                self.position += 1;
                Ok(())
            }
            _ => Err(MalformedCapabilityString::MissingOpeningParenthesis),
        }
    }

    /// Parses the body of a group whose `(` was already consumed, up to and
    /// including the matching `)`.
    fn parse_group(&mut self, depth: usize) -> Result<FeatureTree, MalformedCapabilityString> {
        if depth > MAX_DEPTH {
            return Err(MalformedCapabilityString::TooDeep {
                position: self.position - 1,
            });
        }

        let mut tree = FeatureTree::new();
        let mut start = self.position;
        let mut content = false;

        loop {
            let Some(byte) = self.peek() else {
                return Err(MalformedCapabilityString::Unterminated { depth });
            };

            match byte {
                b'(' => {
                    if !content {
                        return Err(MalformedCapabilityString::UnnamedGroup {
                            position: self.position,
                        });
                    }

                    let key = &self.source[start..self.position];
                    self.position += 1;

                    let child = self.parse_group(depth + 1)?;
                    tree.insert(key, Some(child));

                    content = false;
                    start = self.position;
                }

                b')' => {
                    if content {
                        tree.insert(&self.source[start..self.position], None);
                    }
                    self.position += 1;

                    return Ok(tree);
                }

                byte if byte.is_ascii_whitespace() => {
                    if content {
                        tree.insert(&self.source[start..self.position], None);
                    }
                    content = false;
                    self.position += 1;
                    start = self.position;
                }

                _ => {
                    content = true;
                    self.position += 1;
                }
            }
        }
    }
}
