//! Byte-slice helpers.

/// Concatenate byte slices into one owned buffer.
///
/// Signature verification reconstructs signed bytes with this; the
/// concatenation order must match the signer's exactly.
pub fn concat_bytes(parts: &[&[u8]]) -> Vec<u8> {
    let total = parts.iter().map(|p| p.len()).sum();
    let mut out = Vec::with_capacity(total);
    for part in parts {
        out.extend_from_slice(part);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn concatenates_in_order() {
        assert_eq!(
            concat_bytes(&[b"ab", b"", b"cde"]),
            b"abcde".to_vec()
        );
    }

    #[test]
    fn empty_input_is_empty() {
        assert!(concat_bytes(&[]).is_empty());
    }
}
