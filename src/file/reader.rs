//! Token reader for the textual `tbcload` container format.
//!
//! A `.tbc` payload is a whitespace separated stream of integers, single type characters,
//! length prefixed strings and blocks of base-85 encoded binary data. [`BytecodeReader`]
//! walks such a payload and exposes typed reads for each of these token kinds.
//!
//! # Base-85 codec
//!
//! Binary data (instruction bytes, command-location tables, encoded strings) is packed with a
//! variant of ASCII85. Five characters form one 32-bit word, accumulated from the fifth
//! character down to the first and emitted little-endian. The characters that are special to
//! Tcl are remapped (`v`, `w`, `x`, `y` and `|` stand in for `"`, `$`, `[`, `\` and `]`), and
//! `z` abbreviates a group of four zero bytes. A trailing partial group is zero padded and only
//! yields the bytes that remain.
//!
//! # Examples
//!
//! ```rust
//! use tclscope::BytecodeReader;
//!
//! let mut reader = BytecodeReader::new("12 L 3 z");
//! assert_eq!(reader.read_integer()?, 12);
//! assert_eq!(reader.read_char()?, 'L');
//! assert_eq!(reader.decode_data(Some(3))?, vec![0, 0, 0]);
//! # Ok::<(), tclscope::Error>(())
//! ```

use crate::Result;

/// Decode table marker for characters that are skipped between digits.
const A85_WHITESPACE: i8 = -1;
/// Decode table marker for characters that may never appear in encoded data.
const A85_ILLEGAL: i8 = -2;
/// Decode table marker for the `z` zero-group abbreviation.
const A85_ZERO: i8 = -3;

/// Maps each ASCII character to its base-85 digit or one of the marker values.
const DECODE_MAP: [i8; 128] = build_decode_map();

const fn build_decode_map() -> [i8; 128] {
    let mut map = [A85_ILLEGAL; 128];

    // Standard ASCII85 digits from '!' to 'u'
    let mut ch = b'!';
    while ch <= b'u' {
        map[ch as usize] = (ch - b'!') as i8;
        ch += 1;
    }

    // Characters with a meaning to the Tcl parser are replaced
    map[b'"' as usize] = A85_ILLEGAL;
    map[b'$' as usize] = A85_ILLEGAL;
    map[b'[' as usize] = A85_ILLEGAL;
    map[b'\\' as usize] = A85_ILLEGAL;
    map[b']' as usize] = A85_ILLEGAL;
    map[b'v' as usize] = 1;
    map[b'w' as usize] = 3;
    map[b'x' as usize] = 58;
    map[b'y' as usize] = 59;
    map[b'|' as usize] = 60;
    map[b'z' as usize] = A85_ZERO;

    map[b' ' as usize] = A85_WHITESPACE;
    map[b'\t' as usize] = A85_WHITESPACE;
    map[b'\n' as usize] = A85_WHITESPACE;
    map[b'\r' as usize] = A85_WHITESPACE;

    map
}

/// Returns `true` for the separators of the token stream.
fn is_separator(byte: u8) -> bool {
    byte.is_ascii_whitespace()
}

/// Reader over the text of a `tbcload` payload.
///
/// All token reads skip leading whitespace. On failure the position is restored to where the
/// token started, so a caller can try an optional token.
pub struct BytecodeReader<'a> {
    /// Payload text as raw bytes; the format is pure ASCII
    data: &'a [u8],
    /// Current offset into `data`
    position: usize,
}

impl<'a> BytecodeReader<'a> {
    /// Creates a reader positioned at the start of `input`.
    #[must_use]
    pub fn new(input: &'a str) -> Self {
        BytecodeReader {
            data: input.as_bytes(),
            position: 0,
        }
    }

    /// Returns `true` once every character has been consumed.
    #[must_use]
    pub fn is_at_end(&self) -> bool {
        self.position >= self.data.len()
    }

    /// Current offset into the payload text.
    #[must_use]
    pub fn pos(&self) -> usize {
        self.position
    }

    /// Number of characters not yet consumed.
    ///
    /// Every token takes at least one character, so this bounds any element count that can
    /// still be satisfied by the input.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.data.len().saturating_sub(self.position)
    }

    /// Capacity to reserve for `count` elements still to be read from this input.
    #[must_use]
    pub fn capacity_for(&self, count: usize) -> usize {
        count.min(self.remaining())
    }

    /// Skips any whitespace at the current position.
    pub fn consume_whitespace(&mut self) {
        while self
            .data
            .get(self.position)
            .is_some_and(|byte| is_separator(*byte))
        {
            self.position += 1;
        }
    }

    /// Consumes `expected` if the text continues with it exactly.
    ///
    /// No whitespace is skipped before the comparison.
    pub fn matches(&mut self, expected: &str) -> bool {
        let expected = expected.as_bytes();
        if self.data[self.position..].starts_with(expected) {
            self.position += expected.len();
            true
        } else {
            false
        }
    }

    /// Reads the next non-whitespace character.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] at the end of the input.
    pub fn read_char(&mut self) -> Result<char> {
        self.consume_whitespace();
        let byte = self
            .data
            .get(self.position)
            .copied()
            .ok_or(out_of_bounds_error!())?;
        self.position += 1;
        Ok(char::from(byte))
    }

    /// Reads an optionally signed decimal integer.
    ///
    /// # Errors
    /// Returns [`crate::Error::Malformed`] if no integer can be parsed at the current position.
    pub fn read_integer(&mut self) -> Result<i32> {
        self.consume_whitespace();
        let start = self.position;

        self.skip_sign();
        self.skip_digits();

        let token = self.token_from(start);
        token.parse::<i32>().map_err(|_| {
            self.position = start;
            malformed_error!("Could not read integer at offset {}", start)
        })
    }

    /// Reads a decimal floating point number with an optional fraction and exponent.
    ///
    /// # Errors
    /// Returns [`crate::Error::Malformed`] if no number can be parsed at the current position.
    pub fn read_double(&mut self) -> Result<f64> {
        self.consume_whitespace();
        let start = self.position;

        self.skip_sign();
        self.skip_digits();
        if self.peek() == Some(b'.') {
            self.position += 1;
            self.skip_digits();
        }
        if matches!(self.peek(), Some(b'e' | b'E')) {
            self.position += 1;
            self.skip_sign();
            self.skip_digits();
        }

        let token = self.token_from(start);
        token.parse::<f64>().map_err(|_| {
            self.position = start;
            malformed_error!("Could not read double at offset {}", start)
        })
    }

    /// Reads the characters up to the next whitespace.
    pub fn read_word(&mut self) -> String {
        self.consume_whitespace();
        let start = self.position;
        while self.peek().is_some_and(|byte| !is_separator(byte)) {
            self.position += 1;
        }
        self.token_from(start).to_string()
    }

    /// Reads a length prefixed string.
    ///
    /// The length is followed by one separator character and then exactly `length` characters,
    /// which may themselves contain whitespace.
    ///
    /// # Errors
    /// Returns [`crate::Error::Malformed`] on a bad length and [`crate::Error::OutOfBounds`]
    /// if the text is shorter than announced.
    pub fn read_string(&mut self) -> Result<String> {
        let length = self.read_length()?;
        if length > 0 && self.peek().is_some_and(is_separator) {
            self.position += 1;
        }

        let end = self
            .position
            .checked_add(length)
            .ok_or(out_of_bounds_error!())?;
        let bytes = self
            .data
            .get(self.position..end)
            .ok_or(out_of_bounds_error!())?;
        self.position = end;

        Ok(String::from_utf8_lossy(bytes).into_owned())
    }

    /// Reads a length prefixed block of base-85 data.
    ///
    /// # Arguments
    /// * `expected_len` - If set, the announced length must equal this value
    ///
    /// # Errors
    /// Returns [`crate::Error::Malformed`] on a length mismatch or bad encoding.
    pub fn decode_data(&mut self, expected_len: Option<usize>) -> Result<Vec<u8>> {
        let length = self.read_length()?;
        if let Some(expected) = expected_len {
            if expected != length {
                return Err(malformed_error!(
                    "Encoded data has length {}, expected {}",
                    length,
                    expected
                ));
            }
        }

        self.decode(length)
    }

    /// Reads a length prefixed base-85 block and interprets it as text.
    ///
    /// # Errors
    /// Returns [`crate::Error::Malformed`] on bad encoding.
    pub fn decode_string(&mut self) -> Result<String> {
        let bytes = self.decode_data(None)?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }

    /// Reads a count followed by that many elements produced by `f`.
    ///
    /// # Errors
    /// Returns [`crate::Error::Malformed`] if the count differs from `expected_count`, and
    /// propagates any error returned by `f`.
    pub fn decode_array<T, F>(&mut self, expected_count: Option<usize>, mut f: F) -> Result<Vec<T>>
    where
        F: FnMut(&mut Self) -> Result<T>,
    {
        let count = self.read_length()?;
        if let Some(expected) = expected_count {
            if expected != count {
                return Err(malformed_error!(
                    "Array has {} elements, expected {}",
                    count,
                    expected
                ));
            }
        }

        let mut items = Vec::with_capacity(self.capacity_for(count));
        for _ in 0..count {
            items.push(f(self)?);
        }
        Ok(items)
    }

    /// Decodes exactly `length` bytes of base-85 data from the current position.
    ///
    /// # Errors
    /// Returns [`crate::Error::Malformed`] on illegal characters or a misplaced `z`, and
    /// [`crate::Error::OutOfBounds`] if the input ends early.
    pub fn decode(&mut self, length: usize) -> Result<Vec<u8>> {
        // A single `z` already yields four bytes
        let mut result = Vec::with_capacity(length.min(self.remaining().saturating_mul(4)));
        let mut remaining = length;
        let mut group = [0_u8; 5];
        let mut index = 0_usize;

        while remaining > 0 {
            let byte = self
                .data
                .get(self.position)
                .copied()
                .ok_or(out_of_bounds_error!())?;
            self.position += 1;

            let code = DECODE_MAP.get(usize::from(byte)).copied().unwrap_or(A85_ILLEGAL);
            match code {
                A85_WHITESPACE => continue,
                A85_ILLEGAL => {
                    return Err(malformed_error!(
                        "Illegal character 0x{:02x} in encoded data",
                        byte
                    ))
                }
                A85_ZERO => {
                    if index != 0 {
                        return Err(malformed_error!("Zero group inside a partial base-85 group"));
                    }

                    let count = remaining.min(4);
                    result.resize(result.len() + count, 0);
                    remaining -= count;
                }
                digit => {
                    // Digits are 0..=84 here, the markers are handled above
                    group[index] = digit as u8;
                    index += 1;

                    if remaining >= 4 && index == 5 {
                        let word = Self::group_word(&group);
                        result.extend_from_slice(&word.to_le_bytes());
                        remaining -= 4;
                        index = 0;
                    } else if remaining < 4 && index > remaining {
                        for slot in group.iter_mut().skip(remaining + 1) {
                            *slot = 0;
                        }

                        let word = Self::group_word(&group);
                        result.extend_from_slice(&word.to_le_bytes()[..remaining]);
                        remaining = 0;
                        index = 0;
                    }
                }
            }
        }

        Ok(result)
    }

    /// Folds a five digit group into its 32-bit word, highest digit last.
    fn group_word(group: &[u8; 5]) -> u32 {
        group[..4]
            .iter()
            .rev()
            .fold(u32::from(group[4]), |word, digit| {
                word.wrapping_mul(85).wrapping_add(u32::from(*digit))
            })
    }

    fn read_length(&mut self) -> Result<usize> {
        let value = self.read_integer()?;
        usize::try_from(value).map_err(|_| malformed_error!("Negative length {}", value))
    }

    fn peek(&self) -> Option<u8> {
        self.data.get(self.position).copied()
    }

    fn skip_sign(&mut self) {
        if matches!(self.peek(), Some(b'+' | b'-')) {
            self.position += 1;
        }
    }

    fn skip_digits(&mut self) {
        while self.peek().is_some_and(|byte| byte.is_ascii_digit()) {
            self.position += 1;
        }
    }

    fn token_from(&self, start: usize) -> &'a str {
        std::str::from_utf8(&self.data[start..self.position]).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;

    #[test]
    fn tokens() {
        let mut reader = BytecodeReader::new("  -12\n+7 3.5e2 true  x");

        assert_eq!(reader.read_integer().unwrap(), -12);
        assert_eq!(reader.read_integer().unwrap(), 7);
        assert!((reader.read_double().unwrap() - 350.0).abs() < f64::EPSILON);
        assert_eq!(reader.read_word(), "true");
        assert_eq!(reader.read_char().unwrap(), 'x');
        assert!(reader.is_at_end());
        assert!(matches!(reader.read_char(), Err(Error::OutOfBounds)));
    }

    #[test]
    fn failed_integer_restores_position() {
        let mut reader = BytecodeReader::new("  abc");

        assert!(matches!(reader.read_integer(), Err(Error::Malformed { .. })));
        assert_eq!(reader.read_word(), "abc");
    }

    #[test]
    fn length_prefixed_string() {
        let mut reader = BytecodeReader::new("11 hello world 0 5");

        assert_eq!(reader.read_string().unwrap(), "hello world");
        assert_eq!(reader.read_string().unwrap(), "");
        assert_eq!(reader.read_integer().unwrap(), 5);
    }

    fn encode_digit(digit: u8) -> char {
        match digit {
            1 => 'v',
            3 => 'w',
            58 => 'x',
            59 => 'y',
            60 => '|',
            _ => char::from(b'!' + digit),
        }
    }

    #[test]
    fn full_group() {
        let mut value: u32 = 0x0403_0201;
        let mut text = String::new();
        for _ in 0..5 {
            text.push(encode_digit((value % 85) as u8));
            value /= 85;
        }

        let mut reader = BytecodeReader::new(&text);
        assert_eq!(reader.decode(4).unwrap(), vec![0x01, 0x02, 0x03, 0x04]);
    }

    #[test]
    fn zero_group_and_whitespace() {
        let mut reader = BytecodeReader::new("8 z\n z");
        assert_eq!(reader.decode_data(Some(8)).unwrap(), vec![0; 8]);
    }

    #[test]
    fn partial_group() {
        // Two bytes need three digits: 0x0201 = 513 = 3 + 6*85
        let mut reader = BytecodeReader::new("2 w'!");
        assert_eq!(reader.decode_data(None).unwrap(), vec![0x01, 0x02]);
    }

    #[test]
    fn illegal_characters() {
        for text in ["4 !!{!!", "4 !!~!!", "4 !![!!", "4 !!\"!!"] {
            let mut reader = BytecodeReader::new(text);
            assert!(
                matches!(reader.decode_data(None), Err(Error::Malformed { .. })),
                "{text}"
            );
        }
    }

    #[test]
    fn misplaced_zero_group() {
        let mut reader = BytecodeReader::new("8 !!z");
        assert!(matches!(reader.decode_data(None), Err(Error::Malformed { .. })));
    }

    #[test]
    fn length_mismatch() {
        let mut reader = BytecodeReader::new("4 z");
        assert!(matches!(reader.decode_data(Some(8)), Err(Error::Malformed { .. })));
    }

    #[test]
    fn arrays() {
        let mut reader = BytecodeReader::new("3 1 2 3 2 9");

        let items = reader
            .decode_array(Some(3), |r| r.read_integer())
            .unwrap();
        assert_eq!(items, vec![1, 2, 3]);

        let result = reader.decode_array(Some(1), |r| r.read_integer());
        assert!(matches!(result, Err(Error::Malformed { .. })));
    }

    #[test]
    fn oversized_counts() {
        let mut reader = BytecodeReader::new("2000000000 1 2");
        assert_eq!(reader.capacity_for(2_000_000_000), 14);
        assert!(reader.decode_array(None, |r| r.read_integer()).is_err());

        let mut reader = BytecodeReader::new("2000000000 z");
        assert!(matches!(reader.decode_data(None), Err(Error::OutOfBounds)));
    }
}
