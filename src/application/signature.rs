//! Gateway callback signatures: lowercase hex HMAC-SHA256 over
//! `"<order_id>|<payment_id>"` keyed with the gateway secret.

use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

fn mac_for(secret: &str, order_id: &str, payment_id: &str) -> HmacSha256 {
    let mut mac =
        HmacSha256::new_from_slice(secret.as_bytes()).expect("HMAC can take key of any size");
    mac.update(order_id.as_bytes());
    mac.update(b"|");
    mac.update(payment_id.as_bytes());
    mac
}

pub fn sign(secret: &str, order_id: &str, payment_id: &str) -> String {
    hex::encode(mac_for(secret, order_id, payment_id).finalize().into_bytes())
}

/// Constant-time comparison of `signature` against the expected MAC.
pub fn verify(secret: &str, order_id: &str, payment_id: &str, signature: &str) -> bool {
    let Ok(provided) = hex::decode(signature.trim()) else {
        return false;
    };
    mac_for(secret, order_id, payment_id)
        .verify_slice(&provided)
        .is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test_secret_key";

    fn flip_first_char(signature: &str) -> String {
        let mut chars: Vec<char> = signature.chars().collect();
        chars[0] = if chars[0] == 'a' { 'b' } else { 'a' };
        chars.into_iter().collect()
    }

    #[test]
    fn test_signature_matches_concatenated_payload() {
        let mut mac = HmacSha256::new_from_slice(SECRET.as_bytes()).unwrap();
        mac.update(b"order_abc|pay_123");
        let expected = hex::encode(mac.finalize().into_bytes());

        assert_eq!(sign(SECRET, "order_abc", "pay_123"), expected);
        assert_eq!(
            expected,
            "f1ac4747cef8b80e4c2974781edb52fff46fce00349f8b715842f3741ddc6942"
        );
    }

    #[test]
    fn test_verify_accepts_valid_signature() {
        let signature = sign(SECRET, "order_abc", "pay_123");
        assert!(verify(SECRET, "order_abc", "pay_123", &signature));
        assert!(verify(SECRET, "order_abc", "pay_123", &signature.to_uppercase()));
    }

    #[test]
    fn test_verify_rejects_tampering() {
        let signature = sign(SECRET, "order_abc", "pay_123");
        assert!(!verify(SECRET, "order_abc", "pay_123", &flip_first_char(&signature)));
        assert!(!verify(SECRET, "order_abc", "pay_124", &signature));
        assert!(!verify("other_secret", "order_abc", "pay_123", &signature));
        assert!(!verify(SECRET, "order_abc", "pay_123", "not-hex"));
        assert!(!verify(SECRET, "order_abc", "pay_123", ""));
    }
}
