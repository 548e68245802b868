//! UTF-8 codepoint decoding
//!
//! Decodes one codepoint at a time from a raw byte string, recovering
//! deterministically from malformed input instead of failing. The slice end
//! plays the role of a terminating NUL: the decoder never indexes past it.
//!
//! On a bad sequence the decoder returns [`REPLACEMENT_CODEPOINT`] together
//! with the number of bytes it inspected before detecting the failure
//! (1 for a bad lead byte, 2 for a bad second byte, and so on). This skips
//! the minimum plausible span rather than re-scanning for a new lead byte.

/// Codepoint substituted for undecodable input: '?'
///
/// U+FFFD would be the standard choice, but bitmap fonts built from the
/// default ASCII range cannot display it.
pub const REPLACEMENT_CODEPOINT: u32 = 0x3f;

/// Decode one codepoint starting at `bytes[0]`.
///
/// Returns the codepoint and the number of bytes consumed. A truncated
/// sequence at the end of the slice consumes the remaining bytes; any other
/// failure consumes only the bytes inspected. An empty slice consumes 0.
pub fn next_codepoint(bytes: &[u8]) -> (u32, usize) {
    /*
        UTF-8 octet sequences, RFC 3629:

        0000 0000-0000 007F | 0xxxxxxx
        0000 0080-0000 07FF | 110xxxxx 10xxxxxx
        0000 0800-0000 FFFF | 1110xxxx 10xxxxxx 10xxxxxx
        0001 0000-0010 FFFF | 11110xxx 10xxxxxx 10xxxxxx 10xxxxxx
    */
    let Some(&octet) = bytes.first() else {
        return (REPLACEMENT_CODEPOINT, 0);
    };

    let code = if octet <= 0x7f {
        // Single octet (ASCII)
        return (octet as u32, 1);
    } else if octet & 0xe0 == 0xc0 {
        // Two octets: [0]xC2-DF [1]UTF8-tail
        let Some(&octet1) = bytes.get(1) else {
            return (REPLACEMENT_CODEPOINT, bytes.len());
        };
        if octet1 >> 6 != 0b10 {
            return (REPLACEMENT_CODEPOINT, 2);
        }
        if !(0xc2..=0xdf).contains(&octet) {
            // Overlong encoding (0xC0/0xC1 lead)
            return (REPLACEMENT_CODEPOINT, 1);
        }
        (((octet & 0x1f) as u32) << 6 | (octet1 & 0x3f) as u32, 2)
    } else if octet & 0xf0 == 0xe0 {
        /*
            Three octets:
            [0]xE0    [1]xA0-BF    [2]UTF8-tail
            [0]xE1-EC [1]UTF8-tail [2]UTF8-tail
            [0]xED    [1]x80-9F    [2]UTF8-tail
            [0]xEE-EF [1]UTF8-tail [2]UTF8-tail
        */
        let Some(&octet1) = bytes.get(1) else {
            return (REPLACEMENT_CODEPOINT, bytes.len());
        };
        if octet1 >> 6 != 0b10 {
            return (REPLACEMENT_CODEPOINT, 2);
        }
        let Some(&octet2) = bytes.get(2) else {
            return (REPLACEMENT_CODEPOINT, bytes.len());
        };
        if octet2 >> 6 != 0b10 {
            return (REPLACEMENT_CODEPOINT, 3);
        }
        if (octet == 0xe0 && !(0xa0..=0xbf).contains(&octet1))
            || (octet == 0xed && !(0x80..=0x9f).contains(&octet1))
        {
            // Overlong encoding or surrogate half
            return (REPLACEMENT_CODEPOINT, 2);
        }
        (
            ((octet & 0x0f) as u32) << 12 | ((octet1 & 0x3f) as u32) << 6 | (octet2 & 0x3f) as u32,
            3,
        )
    } else if octet & 0xf8 == 0xf0 {
        /*
            Four octets:
            [0]xF0    [1]x90-BF    [2]UTF8-tail [3]UTF8-tail
            [0]xF1-F3 [1]UTF8-tail [2]UTF8-tail [3]UTF8-tail
            [0]xF4    [1]x80-8F    [2]UTF8-tail [3]UTF8-tail
        */
        if octet > 0xf4 {
            return (REPLACEMENT_CODEPOINT, 1);
        }
        let Some(&octet1) = bytes.get(1) else {
            return (REPLACEMENT_CODEPOINT, bytes.len());
        };
        if octet1 >> 6 != 0b10 {
            return (REPLACEMENT_CODEPOINT, 2);
        }
        let Some(&octet2) = bytes.get(2) else {
            return (REPLACEMENT_CODEPOINT, bytes.len());
        };
        if octet2 >> 6 != 0b10 {
            return (REPLACEMENT_CODEPOINT, 3);
        }
        let Some(&octet3) = bytes.get(3) else {
            return (REPLACEMENT_CODEPOINT, bytes.len());
        };
        if octet3 >> 6 != 0b10 {
            return (REPLACEMENT_CODEPOINT, 4);
        }
        if (octet == 0xf0 && !(0x90..=0xbf).contains(&octet1))
            || (octet == 0xf4 && !(0x80..=0x8f).contains(&octet1))
        {
            // Overlong encoding or value above U+10FFFF
            return (REPLACEMENT_CODEPOINT, 2);
        }
        (
            ((octet & 0x07) as u32) << 18
                | ((octet1 & 0x3f) as u32) << 12
                | ((octet2 & 0x3f) as u32) << 6
                | (octet3 & 0x3f) as u32,
            4,
        )
    } else {
        // Stray continuation byte or lead above 0xF7
        return (REPLACEMENT_CODEPOINT, 1);
    };

    let (value, consumed) = code;
    if value > 0x10ffff {
        return (REPLACEMENT_CODEPOINT, consumed);
    }
    (value, consumed)
}

/// Walk a byte string as a codepoint stream.
///
/// Every decode failure yields [`REPLACEMENT_CODEPOINT`] and advances exactly
/// one byte, regardless of the decoder's reported consumption, so that each
/// bad byte is surfaced individually rather than skipped. Measurement and
/// draw layout both iterate text through this adapter, which keeps their
/// advance arithmetic identical.
pub fn codepoints(bytes: &[u8]) -> Codepoints<'_> {
    Codepoints { bytes }
}

/// Iterator over the codepoints of a byte string, see [`codepoints`]
#[derive(Debug, Clone)]
pub struct Codepoints<'a> {
    bytes: &'a [u8],
}

impl Iterator for Codepoints<'_> {
    type Item = u32;

    fn next(&mut self) -> Option<u32> {
        if self.bytes.is_empty() {
            return None;
        }
        let (code, mut consumed) = next_codepoint(self.bytes);
        if code == REPLACEMENT_CODEPOINT {
            consumed = 1;
        }
        self.bytes = &self.bytes[consumed..];
        Some(code)
    }
}
