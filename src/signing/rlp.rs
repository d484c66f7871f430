//! Recursive Length Prefix encoding
//!
//! Only the encoder side is needed: transactions are built here and decoded
//! by nodes.

use ethers_core::types::U256;

/// Encode a byte string
pub fn encode_bytes(data: &[u8]) -> Vec<u8> {
    if data.len() == 1 && data[0] < 0x80 {
        return data.to_vec();
    }

    if data.len() < 56 {
        let mut result = vec![0x80 + data.len() as u8];
        result.extend_from_slice(data);
        result
    } else {
        let len_bytes = encode_length(data.len());
        let mut result = vec![0xb7 + len_bytes.len() as u8];
        result.extend_from_slice(&len_bytes);
        result.extend_from_slice(data);
        result
    }
}

/// Encode a big-endian unsigned integer in its minimal form.
///
/// Leading zero bytes are dropped and zero becomes the empty string.
pub fn encode_scalar(be_bytes: &[u8]) -> Vec<u8> {
    let start = be_bytes.iter().take_while(|&&b| b == 0).count();
    encode_bytes(&be_bytes[start..])
}

pub fn encode_u64(val: u64) -> Vec<u8> {
    encode_scalar(&val.to_be_bytes())
}

pub fn encode_u256(val: U256) -> Vec<u8> {
    let mut bytes = [0u8; 32];
    val.to_big_endian(&mut bytes);
    encode_scalar(&bytes)
}

pub fn encode_address(addr: &[u8; 20]) -> Vec<u8> {
    encode_bytes(addr)
}

/// Wrap already-encoded items in a list header
pub fn encode_list(items: &[Vec<u8>]) -> Vec<u8> {
    let payload: Vec<u8> = items.concat();

    if payload.len() < 56 {
        let mut result = vec![0xc0 + payload.len() as u8];
        result.extend_from_slice(&payload);
        result
    } else {
        let len_bytes = encode_length(payload.len());
        let mut result = vec![0xf7 + len_bytes.len() as u8];
        result.extend_from_slice(&len_bytes);
        result.extend_from_slice(&payload);
        result
    }
}

fn encode_length(len: usize) -> Vec<u8> {
    let bytes = len.to_be_bytes();
    let leading_zeros = bytes.iter().take_while(|&&b| b == 0).count();
    bytes[leading_zeros..].to_vec()
}
