use std::fmt;

/// Red, green and blue channels decoded from a hex literal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ChannelTriple {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl fmt::Display for ChannelTriple {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{},{}", self.r, self.g, self.b)
    }
}

fn nibble(c: u8) -> Option<u8> {
    match c {
        b'0'..=b'9' => Some(c - b'0'),
        b'a'..=b'f' => Some(c - b'a' + 10),
        b'A'..=b'F' => Some(c - b'A' + 10),
        _ => None,
    }
}

/// Decode `#RGB` or `#RRGGBB` into channels.
///
/// Returns `None` for anything else: wrong length, missing `#`, or a
/// character that is not a hex digit.
pub fn decode(hex: &str) -> Option<ChannelTriple> {
    let bytes = hex.as_bytes();
    if bytes.first() != Some(&b'#') {
        return None;
    }

    let (r, g, b) = match bytes.len() {
        4 => {
            // #RGB, each digit fills both nibbles
            let r = nibble(bytes[1])?;
            let g = nibble(bytes[2])?;
            let b = nibble(bytes[3])?;
            (r * 17, g * 17, b * 17)
        }
        7 => {
            let byte = |hi: u8, lo: u8| -> Option<u8> { Some(nibble(hi)? << 4 | nibble(lo)?) };
            (
                byte(bytes[1], bytes[2])?,
                byte(bytes[3], bytes[4])?,
                byte(bytes[5], bytes[6])?,
            )
        }
        _ => return None,
    };

    Some(ChannelTriple { r, g, b })
}

/// Channel string for a derived styling variable, e.g. `"37,99,235"`.
pub fn rgb_string(hex: &str) -> Option<String> {
    decode(hex).map(|triple| triple.to_string())
}
