//! Universal Patient Identifier (UPI) generation.
//!
//! A UPI is a 128-bit random token rendered as a lowercase hyphenated UUID v4. It is a
//! secondary key, independent of the internal patient id.

use rand::rngs::{OsRng, StdRng};
use rand::{Rng, RngCore, SeedableRng};

const V4_TEMPLATE: &str = "xxxxxxxx-xxxx-4xxx-yxxx-xxxxxxxxxxxx";

/// Generates a UPI from the operating system's secure RNG.
///
/// If the secure source is unavailable, falls back to [`fallback_upi`] seeded from the current
/// time. The fallback keeps the UUID v4 version and variant bits, so the output shape is the
/// same either way.
pub fn generate_upi() -> String {
    let mut bytes = [0u8; 16];
    match OsRng.try_fill_bytes(&mut bytes) {
        Ok(()) => uuid::Builder::from_random_bytes(bytes)
            .into_uuid()
            .hyphenated()
            .to_string(),
        Err(e) => {
            tracing::warn!("secure random source unavailable, using fallback UPI: {}", e);
            let seed = chrono::Utc::now()
                .timestamp_nanos_opt()
                .unwrap_or_default() as u64;
            fallback_upi(&mut StdRng::seed_from_u64(seed))
        }
    }
}

/// Fills the v4 template from `rng`: `x` is any hex digit, `y` is one of `8`, `9`, `a`, `b`.
pub fn fallback_upi<R: Rng + ?Sized>(rng: &mut R) -> String {
    V4_TEMPLATE
        .chars()
        .map(|c| match c {
            'x' => hex_digit(rng.gen_range(0..16)),
            'y' => hex_digit((rng.gen_range(0..16) & 0x3) | 0x8),
            other => other,
        })
        .collect()
}

fn hex_digit(value: u32) -> char {
    char::from_digit(value, 16).unwrap_or('0')
}

/// Returns true if `input` is a lowercase hyphenated UUID with version 4 and RFC 4122 variant.
pub fn is_v4_shaped(input: &str) -> bool {
    if input.len() != V4_TEMPLATE.len() {
        return false;
    }
    input.chars().zip(V4_TEMPLATE.chars()).all(|(c, t)| match t {
        '-' => c == '-',
        '4' => c == '4',
        'y' => matches!(c, '8' | '9' | 'a' | 'b'),
        _ => matches!(c, '0'..='9' | 'a'..='f'),
    })
}
