//! Byte classification used by the scanner. Source text outside ASCII is
//! only legal inside comments.

/// Check if a byte is a line terminator.
#[inline]
pub fn is_line_break(ch: u8) -> bool {
    ch == b'\n' || ch == b'\r'
}

/// Check if a byte is whitespace (not line break).
#[inline]
pub fn is_white_space_single_line(ch: u8) -> bool {
    matches!(
        ch,
        b' ' | b'\t'
            | 0x0B // vertical tab
            | 0x0C // form feed
    )
}

#[inline]
pub fn is_identifier_start(ch: u8) -> bool {
    ch.is_ascii_alphabetic() || ch == b'_'
}

#[inline]
pub fn is_identifier_part(ch: u8) -> bool {
    ch.is_ascii_alphanumeric() || ch == b'_'
}
