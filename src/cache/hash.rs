use sha2::{Digest, Sha256};

const FINGERPRINT_BYTES: usize = 8;

/// Stable image id: the first 64 bits of SHA-256 over `"{width}x{height}-{text}"`,
/// lowercase hex.
pub fn fingerprint(width: u32, height: u32, text: &str) -> String {
    let content = format!("{width}x{height}-{text}");
    let digest = Sha256::digest(content.as_bytes());
    hex::encode(&digest[..FINGERPRINT_BYTES])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_input_same_id() {
        assert_eq!(fingerprint(800, 600, "sunset"), fingerprint(800, 600, "sunset"));
    }

    #[test]
    fn id_is_sixteen_hex_chars() {
        let id = fingerprint(1, 1, "");
        assert_eq!(id.len(), 16);
        assert!(id.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    }

    #[test]
    fn known_value_is_stable() {
        // sha256("800x600-sunset"), truncated
        let full = hex::encode(Sha256::digest(b"800x600-sunset"));
        assert_eq!(fingerprint(800, 600, "sunset"), &full[..16]);
    }

    #[test]
    fn differing_inputs_differ() {
        let base = fingerprint(800, 600, "sunset");
        assert_ne!(base, fingerprint(600, 800, "sunset"));
        assert_ne!(base, fingerprint(800, 601, "sunset"));
        assert_ne!(base, fingerprint(800, 600, "sunrise"));
        assert_ne!(fingerprint(80, 600, "0-x"), fingerprint(800, 600, "x"));
    }
}
