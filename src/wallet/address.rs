//! EVM address derivation and validation

use crate::error::WalletResult;
use crate::types::{Address, PublicKey};
use crate::utils::crypto::keccak256;

/// Derive the account address for an uncompressed public key.
///
/// keccak-256 over `X‖Y`, last 20 bytes. The key may carry the SEC1 `0x04`
/// prefix or be the bare 64 coordinate bytes.
pub fn derive_address(public_key: &PublicKey) -> WalletResult<Address> {
    let xy = public_key.uncompressed_xy()?;
    let hash = keccak256(&xy);

    let mut bytes = [0u8; Address::LENGTH];
    bytes.copy_from_slice(&hash[12..]);
    Ok(Address::from_bytes(bytes))
}

/// Check whether a string is a well-formed EVM address.
///
/// The checksum casing is not enforced; all-lowercase and mixed-case inputs
/// are both accepted.
pub fn validate_address(address: &str) -> bool {
    address.parse::<Address>().is_ok()
}
