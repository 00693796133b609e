//! Boundary matchers for typed placeholders.
//!
//! Each function is anchored at the start of `s` and returns how many leading
//! bytes satisfy the placeholder's grammar, `0` meaning no match. None of them
//! look past the consumed bytes: whether the rest of the path fits is decided
//! by the tree while it backtracks.

#[inline]
fn digit(b: u8) -> bool {
    b.is_ascii_digit()
}

#[inline]
fn nonzero(b: u8) -> bool {
    (b'1'..=b'9').contains(&b)
}

/// `^(true|false)`
pub(crate) fn boolean(s: &str) -> usize {
    if s.starts_with("true") {
        4
    } else if s.starts_with("false") {
        5
    } else {
        0
    }
}

/// `^(0|-?[1-9][0-9]*)`
pub(crate) fn integer(s: &str) -> usize {
    let s = s.as_bytes();
    let mut i = match s {
        [] => return 0,
        [b] => return digit(*b) as usize,
        [b'0', b, ..] => return if digit(*b) { 0 } else { 1 },
        [b'-', b, ..] if nonzero(*b) => 2,
        [b, ..] if nonzero(*b) => 1,
        _ => return 0,
    };

    while i < s.len() && digit(s[i]) {
        i += 1;
    }

    i
}

/// `^(0|-?0\.[0-9]*[1-9]|-?[1-9][0-9]*(\.[0-9]*[1-9])?)`
pub(crate) fn number(s: &str) -> usize {
    let s = s.as_bytes();
    // i: end of the scan, j: position of the decimal point (0 if none)
    let (mut i, mut j) = (0, 0);

    while i < s.len() {
        match s[i] {
            b if digit(b) => {}
            b'-' if i == 0 => {}
            b'.' => {
                if i == 0 || (i == 1 && s[0] == b'-') {
                    return 0;
                }
                if j != 0 {
                    break;
                }
                j = i;
            }
            _ => break,
        }
        i += 1;
    }

    if i == 0 {
        return 0;
    }

    let bad_sign = s[0] == b'-' && (i == 1 || (s[1] == b'0' && j != 2));
    let bad_zero = s[0] == b'0' && i != 1 && j != 1;
    let bad_fraction = j > 0 && (i - 1 == j || s[i - 1] == b'0');

    if bad_sign || bad_zero || bad_fraction {
        0
    } else {
        i
    }
}

/// `^[^/]*`, a single path segment.
pub(crate) fn part(s: &str) -> usize {
    s.find('/').unwrap_or(s.len())
}
