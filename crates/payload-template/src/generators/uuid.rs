//! GUID and UUID generators.

use rand::RngCore;
use uuid::Uuid;

/// Generate 16 random bytes formatted as a hyphenated lowercase GUID.
///
/// Unlike [`generate_uuid_v4`] no version or variant bits are forced.
pub fn generate_guid<R: RngCore + ?Sized>(rng: &mut R) -> Result<String, rand::Error> {
    let mut bytes = [0u8; 16];
    rng.try_fill_bytes(&mut bytes)?;

    Ok(Uuid::from_bytes(bytes).hyphenated().to_string())
}

/// Generate a random RFC 4122 version 4 UUID.
pub fn generate_uuid_v4<R: RngCore + ?Sized>(rng: &mut R) -> Result<String, rand::Error> {
    let mut bytes = [0u8; 16];
    rng.try_fill_bytes(&mut bytes)?;

    // Set version (4) and variant (RFC 4122) bits
    bytes[6] = (bytes[6] & 0x0f) | 0x40;
    bytes[8] = (bytes[8] & 0x3f) | 0x80;

    Ok(Uuid::from_bytes(bytes).to_string())
}
