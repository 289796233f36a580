//! IEEE-11073 FLOAT (32-bit) and SFLOAT (16-bit) decoding.
//!
//! Both formats are `mantissa × 10^exponent` with two's-complement fields:
//!
//! ```text
//! SFLOAT  ┌──────────┬──────────────────────┐
//!         │ exp (4b) │ mantissa (12b)       │   little-endian u16
//!         └──────────┴──────────────────────┘
//! FLOAT   ┌──────────┬──────────────────────────────────┐
//!         │ exp (8b) │ mantissa (24b)                   │   little-endian u32
//!         └──────────┴──────────────────────────────────┘
//! ```
//!
//! The SFLOAT reserved codes are keyed on the exponent nibble
//! (0xF NaN, 0xE +∞, 0xD −∞, 0xC zero).  Existing devices depend on this
//! mapping bit for bit.

/// SFLOAT exponent nibble reserved for NaN.
pub const SFLOAT_NAN: u8 = 0x0F;
/// SFLOAT exponent nibble reserved for +∞.
pub const SFLOAT_POS_INFINITY: u8 = 0x0E;
/// SFLOAT exponent nibble reserved for −∞.
pub const SFLOAT_NEG_INFINITY: u8 = 0x0D;
/// SFLOAT exponent nibble reserved for zero.
pub const SFLOAT_ZERO: u8 = 0x0C;

const FLOAT_NAN: u32 = 0x007F_FFFF;
const FLOAT_NRES: u32 = 0x0080_0000;
const FLOAT_POS_INFINITY: u32 = 0x007F_FFFE;
const FLOAT_NEG_INFINITY: u32 = 0x0080_0002;
const FLOAT_RESERVED: u32 = 0x0080_0001;

/// Decode a raw 16-bit SFLOAT.
pub fn sfloat(raw: u16) -> f32 {
    let exponent_bits = ((raw >> 12) & 0x0F) as u8;
    match exponent_bits {
        SFLOAT_NAN => return f32::NAN,
        SFLOAT_POS_INFINITY => return f32::INFINITY,
        SFLOAT_NEG_INFINITY => return f32::NEG_INFINITY,
        SFLOAT_ZERO => return 0.0,
        _ => {}
    }

    let mut mantissa = i32::from(raw & 0x0FFF);
    if mantissa & 0x0800 != 0 {
        mantissa -= 0x1000;
    }
    let mut exponent = i32::from(exponent_bits);
    if exponent & 0x08 != 0 {
        exponent -= 0x10;
    }
    scale(mantissa, exponent)
}

/// Decode a little-endian SFLOAT from the first two bytes of `bytes`.
/// Returns `None` if fewer than two bytes are present.
pub fn sfloat_le(bytes: &[u8]) -> Option<f32> {
    match bytes {
        [lo, hi, ..] => Some(sfloat(u16::from_le_bytes([*lo, *hi]))),
        _ => None,
    }
}

/// Decode a raw 32-bit FLOAT.
pub fn float32(raw: u32) -> f32 {
    let mantissa_bits = raw & 0x00FF_FFFF;
    match mantissa_bits {
        FLOAT_NAN | FLOAT_NRES | FLOAT_RESERVED => return f32::NAN,
        FLOAT_POS_INFINITY => return f32::INFINITY,
        FLOAT_NEG_INFINITY => return f32::NEG_INFINITY,
        _ => {}
    }

    let mut mantissa = mantissa_bits as i32;
    if mantissa & 0x0080_0000 != 0 {
        mantissa -= 0x0100_0000;
    }
    let exponent = i32::from((raw >> 24) as u8 as i8);
    scale(mantissa, exponent)
}

/// Decode a little-endian FLOAT from the first four bytes of `bytes`.
pub fn float32_le(bytes: &[u8]) -> Option<f32> {
    match bytes {
        [a, b, c, d, ..] => Some(float32(u32::from_le_bytes([*a, *b, *c, *d]))),
        _ => None,
    }
}

/// `mantissa × 10^exponent`, dividing for negative exponents so that
/// one-decimal values like 36.5 come out as the nearest f32.
fn scale(mantissa: i32, exponent: i32) -> f32 {
    let m = f64::from(mantissa);
    let v = if exponent >= 0 {
        m * 10f64.powi(exponent)
    } else {
        m / 10f64.powi(-exponent)
    };
    v as f32
}
