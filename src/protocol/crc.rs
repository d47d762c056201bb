//! CRC-16/CCITT-FALSE
//!
//! Polynomial 0x1021, initial register 0xFFFF, most-significant bit first,
//! no input or output reflection and no final XOR. The device computes the
//! same register bit by bit; the lookup table here is derived from the
//! polynomial at compile time and yields identical values.

const POLY: u16 = 0x1021;
const INIT: u16 = 0xFFFF;

const TABLE: [u16; 256] = build_table();

const fn build_table() -> [u16; 256] {
    let mut table = [0u16; 256];
    let mut index = 0;
    while index < 256 {
        let mut crc = (index as u16) << 8;
        let mut bit = 0;
        while bit < 8 {
            crc = if crc & 0x8000 != 0 {
                (crc << 1) ^ POLY
            } else {
                crc << 1
            };
            bit += 1;
        }
        table[index] = crc;
        index += 1;
    }
    table
}

/// Incremental CRC-16/CCITT-FALSE register
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Crc16 {
    value: u16,
}

impl Crc16 {
    /// Create a register holding the initial value
    #[must_use]
    pub const fn new() -> Self {
        Self { value: INIT }
    }

    /// Feed a single byte
    #[inline]
    pub fn update_byte(&mut self, byte: u8) {
        let index = ((self.value >> 8) as u8 ^ byte) as usize;
        self.value = (self.value << 8) ^ TABLE[index];
    }

    /// Feed a slice of bytes
    pub fn update(&mut self, data: &[u8]) {
        for &byte in data {
            self.update_byte(byte);
        }
    }

    /// Current register value
    #[must_use]
    pub const fn finish(self) -> u16 {
        self.value
    }
}

impl Default for Crc16 {
    fn default() -> Self {
        Self::new()
    }
}

/// Compute the CRC of `data` in one call
#[must_use]
pub fn crc16(data: &[u8]) -> u16 {
    let mut crc = Crc16::new();
    crc.update(data);
    crc.finish()
}
