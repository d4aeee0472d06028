//! Byte offset → line/column translation, used only to decorate error
//! messages. Grounded on the `Code`/`Position` pair from the parser-combinator
//! example in this pack: line-break offsets are computed once and memoized,
//! then a binary search turns a byte offset into a (line, column) pair.

use once_cell::unsync::OnceCell;
use std::fmt;

#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq)]
pub struct Position {
    pub line: usize,
    pub column: usize,
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}, column {}", self.line, self.column)
    }
}

#[derive(Debug)]
pub struct LineIndex {
    line_breaks: OnceCell<Vec<usize>>,
}

impl LineIndex {
    pub fn new() -> Self {
        Self { line_breaks: OnceCell::new() }
    }

    fn line_breaks<'s>(&'s self, source: &[u8]) -> &'s Vec<usize> {
        self.line_breaks.get_or_init(|| {
            source
                .iter()
                .enumerate()
                .filter_map(|(i, &b)| if b == b'\n' { Some(i) } else { None })
                .collect()
        })
    }

    pub fn position_at(&self, source: &[u8], byte: usize) -> Position {
        let breaks = self.line_breaks(source);
        let idx = match breaks.binary_search(&byte) {
            Ok(i) | Err(i) => i,
        };
        if idx == 0 {
            Position { line: 1, column: byte + 1 }
        } else {
            let line_start = breaks[idx - 1] + 1;
            Position { line: idx + 1, column: byte - line_start + 1 }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_line_is_one_indexed() {
        let idx = LineIndex::new();
        let pos = idx.position_at(b"abc", 1);
        assert_eq!(pos, Position { line: 1, column: 2 });
    }

    #[test]
    fn finds_later_lines() {
        let idx = LineIndex::new();
        let src = b"ab\ncd\nef";
        assert_eq!(idx.position_at(src, 4), Position { line: 2, column: 2 });
        assert_eq!(idx.position_at(src, 7), Position { line: 3, column: 2 });
    }
}
