use crate::error::DecodeError;

/// Fixed-length bit sequence decoded from an octal or hex symbol string.
///
/// Each symbol expands MSB-first into `width` bits. Reads wrap modulo the
/// sequence length, so a sequence never runs out.
#[derive(Clone, Debug, PartialEq)]
pub struct BitSequence {
    bits: Vec<u8>,
    cursor: usize,
}

impl BitSequence {
    /// Decode `symbols` with `width` bits per symbol (3 = octal, 4 = hex).
    pub fn decode(symbols: &str, width: u32) -> Result<Self, DecodeError> {
        let radix = match width {
            3 => 8,
            4 => 16,
            other => return Err(DecodeError::UnsupportedWidth(other)),
        };
        if symbols.is_empty() {
            return Err(DecodeError::Empty);
        }

        let mut bits = Vec::with_capacity(symbols.len() * width as usize);
        for (position, symbol) in symbols.chars().enumerate() {
            let value = symbol
                .to_digit(radix)
                .ok_or(DecodeError::InvalidSymbol {
                    symbol,
                    position,
                    width,
                })?;
            bits.extend((0..width).rev().map(|i| ((value >> i) & 1) as u8));
        }

        Ok(Self { bits, cursor: 0 })
    }

    /// Octal string, 3 bits per symbol.
    pub fn from_octal(symbols: &str) -> Result<Self, DecodeError> {
        Self::decode(symbols, 3)
    }

    /// Hex string, 4 bits per symbol.
    pub fn from_hex(symbols: &str) -> Result<Self, DecodeError> {
        Self::decode(symbols, 4)
    }

    pub fn len(&self) -> usize {
        self.bits.len()
    }

    /// Always false: decoding rejects empty input.
    pub fn is_empty(&self) -> bool {
        self.bits.is_empty()
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Bit at `idx` modulo the length. Does not move the cursor.
    pub fn bit_at(&self, idx: usize) -> u8 {
        self.bits[idx % self.bits.len()]
    }

    /// Bit at an already wrapped index. Panics if `idx` is out of range.
    pub fn bit_at_strict(&self, idx: usize) -> u8 {
        assert!(
            idx < self.bits.len(),
            "bit index {} out of range for sequence of length {}",
            idx,
            self.bits.len()
        );
        self.bits[idx]
    }

    pub fn current_bit(&self) -> u8 {
        self.bits[self.cursor]
    }

    /// Move the cursor forward by one. Returns true when it wrapped to 0.
    pub fn advance(&mut self) -> bool {
        self.cursor += 1;
        if self.cursor == self.bits.len() {
            self.cursor = 0;
            true
        } else {
            false
        }
    }

    pub fn seek(&mut self, idx: usize) {
        self.cursor = idx % self.bits.len();
    }
}

/// Map a decoded bit onto a BPSK amplitude: 0 -> +1, 1 -> -1.
#[inline]
pub fn bit_to_sign(bit: u8) -> i32 {
    1 - 2 * (bit as i32)
}
