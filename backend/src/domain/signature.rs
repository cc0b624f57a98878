//! Payment callback signature verification.
//!
//! The provider signs the literal string `"{order_id}|{payment_id}"` with
//! HMAC-SHA256 under a shared secret and sends the hex digest alongside the
//! callback. Verification recomputes the digest and compares in constant
//! time. A mismatch is terminal: no retry, no partial trust, and the expected
//! signature is never echoed back.

use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Shared secret for payment signature verification.
///
/// Wraps the raw key bytes so the secret is not passed around as a plain
/// string and `Debug` output cannot leak it.
#[derive(Clone)]
pub struct PaymentSecret(Vec<u8>);

impl PaymentSecret {
    /// Construct from the provider-issued key secret.
    pub fn new(secret: impl Into<Vec<u8>>) -> Self {
        Self(secret.into())
    }

    fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl std::fmt::Debug for PaymentSecret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("PaymentSecret(..)")
    }
}

/// Compute the expected hex signature for an order/payment pair.
///
/// Exposed for tests and tooling; production code should call
/// [`verify_signature`] instead of comparing strings itself.
pub fn expected_signature(secret: &PaymentSecret, order_id: &str, payment_id: &str) -> String {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .expect("HMAC-SHA256 accepts keys of any length");
    mac.update(order_id.as_bytes());
    mac.update(b"|");
    mac.update(payment_id.as_bytes());
    hex::encode(mac.finalize().into_bytes())
}

/// Verify a supplied hex signature against the expected digest.
///
/// Comparison happens on the raw MAC bytes via [`Mac::verify_slice`], which
/// is constant time. Malformed hex input fails verification rather than
/// erroring.
pub fn verify_signature(
    secret: &PaymentSecret,
    order_id: &str,
    payment_id: &str,
    supplied: &str,
) -> bool {
    let Ok(supplied_bytes) = hex::decode(supplied) else {
        return false;
    };
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .expect("HMAC-SHA256 accepts keys of any length");
    mac.update(order_id.as_bytes());
    mac.update(b"|");
    mac.update(payment_id.as_bytes());
    mac.verify_slice(&supplied_bytes).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn secret() -> PaymentSecret {
        PaymentSecret::new(b"test-key-secret".to_vec())
    }

    #[test]
    fn valid_signature_verifies() {
        let sig = expected_signature(&secret(), "order_1", "pay_1");
        assert!(verify_signature(&secret(), "order_1", "pay_1", &sig));
    }

    #[test]
    fn signature_binds_both_identifiers() {
        let sig = expected_signature(&secret(), "order_1", "pay_1");
        assert!(!verify_signature(&secret(), "order_2", "pay_1", &sig));
        assert!(!verify_signature(&secret(), "order_1", "pay_2", &sig));
    }

    #[test]
    fn tampered_signature_fails() {
        let mut sig = expected_signature(&secret(), "order_1", "pay_1");
        // Flip the last hex digit.
        let last = sig.pop().expect("non-empty");
        sig.push(if last == '0' { '1' } else { '0' });
        assert!(!verify_signature(&secret(), "order_1", "pay_1", &sig));
    }

    #[rstest]
    #[case("")]
    #[case("zz")]
    #[case("deadbeef")]
    fn malformed_or_truncated_signature_fails(#[case] supplied: &str) {
        assert!(!verify_signature(&secret(), "order_1", "pay_1", supplied));
    }

    #[test]
    fn wrong_secret_fails() {
        let sig = expected_signature(&secret(), "order_1", "pay_1");
        let other = PaymentSecret::new(b"another-secret".to_vec());
        assert!(!verify_signature(&other, "order_1", "pay_1", &sig));
    }

    #[test]
    fn debug_output_hides_key_material() {
        let debug = format!("{:?}", secret());
        assert!(!debug.contains("test-key-secret"));
    }
}
