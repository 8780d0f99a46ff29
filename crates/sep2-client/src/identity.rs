// crates/sep2-client/src/identity.rs

//! Device identifiers: SFDI derivation, label-based LFDIs and mRIDs.

use crate::error::Sep2Error;
use crate::types::{Lfdi, Sfdi};
use alloc::format;
use alloc::string::{String, ToString};
use alloc::vec::Vec;
use num::ToPrimitive;

/// Bits kept from the top of the LFDI before the checksum digit is appended.
pub const SFDI_TRUNCATION_BITS: u64 = 36;

/// Derives the SFDI of `lfdi`.
///
/// The LFDI is truncated to its leading 36 bits and a sum-of-digits checksum
/// `10 - (digit_sum % 10)` is appended in decimal. A checksum of 10 is
/// appended as the two digits `10`.
///
/// # Errors
/// `LfdiTooShort` when the LFDI has fewer than 36 significant bits.
pub fn sfdi_from_lfdi(lfdi: &Lfdi) -> Result<Sfdi, Sep2Error> {
    let bits = lfdi.bits();
    if bits < SFDI_TRUNCATION_BITS {
        return Err(Sep2Error::LfdiTooShort { bits });
    }
    let shift = usize::try_from(bits - SFDI_TRUNCATION_BITS).map_err(|_| {
        Sep2Error::InvalidValue {
            field: "lFDI",
            value: lfdi.to_string(),
        }
    })?;
    let truncated = (lfdi.value() >> shift)
        .to_u64()
        .ok_or_else(|| Sep2Error::InvalidValue {
            field: "lFDI",
            value: lfdi.to_string(),
        })?;

    let checksum = 10 - digit_sum(truncated) % 10;
    let sfdi = if checksum == 10 {
        truncated * 100 + 10
    } else {
        truncated * 10 + checksum
    };
    Ok(Sfdi(sfdi))
}

/// Text form of [`sfdi_from_lfdi`] for a hex LFDI string.
pub fn compute_sfdi(lfdi: &str) -> Result<String, Sep2Error> {
    let lfdi = Lfdi::new(lfdi)?;
    Ok(sfdi_from_lfdi(&lfdi)?.to_string())
}

fn digit_sum(mut value: u64) -> u64 {
    let mut sum = 0;
    while value > 0 {
        sum += value % 10;
        value /= 10;
    }
    sum
}

/// Builds a local LFDI by hex-encoding a UTF-8 label (a charger serial, a site name).
///
/// # Errors
/// `LfdiTooShort` when the encoded label cannot yield an SFDI.
pub fn lfdi_from_label(label: &str) -> Result<Lfdi, Sep2Error> {
    let lfdi = Lfdi::new(hex::encode(label.as_bytes()))?;
    if lfdi.bits() < SFDI_TRUNCATION_BITS {
        return Err(Sep2Error::LfdiTooShort { bits: lfdi.bits() });
    }
    Ok(lfdi)
}

/// Recovers the label of an LFDI built by [`lfdi_from_label`].
pub fn label_from_lfdi(lfdi: &Lfdi) -> Result<String, Sep2Error> {
    let text = lfdi.as_str();
    let digits = text
        .strip_prefix("0x")
        .or_else(|| text.strip_prefix("0X"))
        .unwrap_or(text);
    let bytes: Vec<u8> = hex::decode(digits)?;
    String::from_utf8(bytes).map_err(|_| Sep2Error::InvalidValue {
        field: "lFDI",
        value: text.to_string(),
    })
}

/// Master resource id: `provider_id` in the high bits, the IANA PEN in the low 32.
pub fn generate_mrid(provider_id: u64, pen: u32) -> String {
    let mrid = (u128::from(provider_id) << 32) + u128::from(pen);
    format!("{:#x}", mrid)
}

/// Hands out increasing ids for mRIDs and simulated `location` headers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdGenerator {
    next: u64,
}

impl IdGenerator {
    pub fn new() -> Self {
        Self::starting_at(1)
    }

    pub fn starting_at(first: u64) -> Self {
        Self { next: first }
    }

    pub fn next_id(&mut self) -> u64 {
        let id = self.next;
        self.next += 1;
        id
    }

    /// Convenience for `generate_mrid(self.next_id(), pen)`.
    pub fn next_mrid(&mut self, pen: u32) -> String {
        generate_mrid(self.next_id(), pen)
    }
}

impl Default for IdGenerator {
    fn default() -> Self {
        Self::new()
    }
}
