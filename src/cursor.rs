//! A cursor-based text scanner. All markup parsing in the crate is built on
//! [TextCursor]; exhaustion is reported through the [EndOfText] value rather
//! than panics or silent out-of-bounds successes.

/// Signal that a scanning operation ran out of input.
///
/// This is expected control flow used to terminate scanning loops, not an
/// error to report to the user, so it is deliberately not a variant of
/// [crate::Error].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EndOfText;

/// Scans a fixed buffer of characters with an advancing position.
///
/// Every read-advancing operation either returns data and advances the
/// position, or fails with [EndOfText] without a partial advance visible to
/// the caller. A cursor is created once per input buffer and lives for the
/// duration of one parse pass.
pub struct TextCursor {
    chars: Vec<char>,
    position: usize,
    length: usize,
}

impl TextCursor {
    /// Create a cursor over `text`, positioned at its start
    pub fn new(text: &str) -> TextCursor {
        let chars: Vec<char> = text.chars().collect();
        let length = chars.len();
        TextCursor {
            chars,
            position: 0,
            length,
        }
    }

    /// The current position, in characters from the start of the buffer
    pub fn position(&self) -> usize {
        self.position
    }

    /// The number of characters left to scan
    pub fn remaining(&self) -> usize {
        self.length - self.position
    }

    /// Advance while the current character is a member of `set`, stopping at
    /// the first non-member.
    ///
    /// Fails with [EndOfText] if the buffer is exhausted before a non-member
    /// is found. Note that this means a skip over an empty trailing run at
    /// the end of the buffer still fails: callers that consider a zero-width
    /// skip valid must check [TextCursor::remaining] first.
    pub fn skip(&mut self, set: &[char]) -> Result<(), EndOfText> {
        loop {
            if self.position >= self.length {
                return Err(EndOfText);
            }
            if !set.contains(&self.chars[self.position]) {
                return Ok(());
            }
            self.position += 1;
        }
    }

    /// Advance while the current character is NOT a member of `set`.
    ///
    /// Fails with [EndOfText] if none of `set` appears before the end.
    pub fn skip_until(&mut self, set: &[char]) -> Result<(), EndOfText> {
        loop {
            if self.position >= self.length {
                return Err(EndOfText);
            }
            if set.contains(&self.chars[self.position]) {
                return Ok(());
            }
            self.position += 1;
        }
    }

    /// If the next characters equal `word`, advance past them and return
    /// `true`; otherwise return `false` without advancing.
    ///
    /// Fails with [EndOfText] when `position + word.len() >= length`, i.e.
    /// one character earlier than strictly necessary: a word ending exactly
    /// at the end of the buffer cannot be eaten. This boundary is kept
    /// bit-for-bit compatible with existing markup files.
    pub fn eat(&mut self, word: &str) -> Result<bool, EndOfText> {
        let word: Vec<char> = word.chars().collect();
        let end = self.position + word.len();
        if end >= self.length {
            return Err(EndOfText);
        }
        if self.chars[self.position..end] == word[..] {
            self.position = end;
            return Ok(true);
        }
        Ok(false)
    }

    /// Return the text from the current position up to (not including)
    /// `end`, advancing the position to `end`.
    ///
    /// Fails if `end` exceeds the buffer length or precedes the position.
    pub fn substring(&mut self, end: usize) -> Result<String, EndOfText> {
        if end > self.length || end < self.position {
            return Err(EndOfText);
        }
        let result: String = self.chars[self.position..end].iter().collect();
        self.position = end;
        Ok(result)
    }

    /// Compare the characters immediately before the position against
    /// `word`, without advancing. Returns `false` (not an error) when there
    /// is insufficient text before the position.
    pub fn previous_equals(&self, word: &str) -> bool {
        let word: Vec<char> = word.chars().collect();
        match self.position.checked_sub(word.len()) {
            Some(start) => self.chars[start..self.position] == word[..],
            None => false,
        }
    }

    /// Search forward from the position for `word`, returning the absolute
    /// index of its first occurrence. This is a query, not a consuming read,
    /// so "not found" is `None` rather than a failure.
    pub fn index_of(&self, word: &str) -> Option<usize> {
        let word: Vec<char> = word.chars().collect();
        if word.is_empty() {
            return Some(self.position);
        }
        if word.len() > self.remaining() {
            return None;
        }
        self.chars[self.position..]
            .windows(word.len())
            .position(|window| window == &word[..])
            .map(|i| self.position + i)
    }

    /// Search forward from the position for the nearest occurrence of any
    /// member of `set`, returning its absolute index
    pub fn index_of_any(&self, set: &[char]) -> Option<usize> {
        self.chars[self.position..]
            .iter()
            .position(|ch| set.contains(ch))
            .map(|i| self.position + i)
    }

    /// Return the text from the position up to (not including) the next line
    /// terminator, consuming the terminator. A lone `\n` terminates a line,
    /// as does `\r` optionally followed by `\n`. If no terminator is found
    /// the remainder of the buffer is returned as the final line.
    ///
    /// Fails with [EndOfText] only when the position is already at the end
    /// of the buffer with nothing left to return.
    pub fn next_line(&mut self) -> Result<String, EndOfText> {
        match self.index_of_any(&['\r', '\n']) {
            None => {
                if self.position < self.length {
                    self.substring(self.length)
                } else {
                    Err(EndOfText)
                }
            }
            Some(end) => {
                let line = self.substring(end)?;
                let terminator = self.chars[self.position];
                self.position += 1;
                if terminator == '\r'
                    && self.position < self.length
                    && self.chars[self.position] == '\n'
                {
                    self.position += 1;
                }
                Ok(line)
            }
        }
    }
}
