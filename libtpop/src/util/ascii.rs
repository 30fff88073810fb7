pub const SPACE: u8 = 32;
pub const TAB: u8 = 9;
pub const LINEBREAK: u8 = 10;
pub const VERTICAL_TAB: u8 = 11;
pub const FORMFEED: u8 = 12;
pub const CARRIAGE_RETURN: u8 = 13;

/// Whitespace as understood by the C locale's `isspace`.
pub const fn is_space_ch(ch: u8) -> bool {
    return ch == SPACE || (TAB <= ch && ch <= CARRIAGE_RETURN);
}
