use crate::util::ascii::is_space_ch;

/// Longest word [`Words`] yields. Longer runs of non-space bytes are split into pieces of at
/// most this many bytes.
pub const MAX_WORD_LEN: usize = 99;

/// Splits a byte buffer into whitespace separated words.
///
/// Whitespace is the C locale's `isspace` set, see [`is_space_ch`]. No word is empty and no
/// word is longer than [`MAX_WORD_LEN`].
pub struct Words<'a> { bytes: &'a [u8], pos: usize }

impl<'a> Words<'a> {
    pub fn new(bytes: &'a [u8]) -> Self { return Words { bytes, pos: 0 }; }

    fn rem(&self) -> &'a [u8] { return &self.bytes[self.pos..]; }

    fn advance_while(&mut self, limit: usize, pred: fn(u8) -> bool) -> &'a [u8] {
        let begin = self.pos;
        while self.pos - begin < limit && self.bytes.get(self.pos).copied().is_some_and(pred) {
            self.pos += 1;
        }
        return &self.bytes[begin..self.pos];
    }
}

impl<'a> Iterator for Words<'a> {
    type Item = &'a [u8];

    fn next(&mut self) -> Option<&'a [u8]> {
        self.advance_while(usize::MAX, is_space_ch);
        if self.rem().is_empty() { return None; }
        return Some(self.advance_while(MAX_WORD_LEN, |ch| !is_space_ch(ch)));
    }
}
