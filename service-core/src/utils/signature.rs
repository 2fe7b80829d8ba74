use chrono::Utc;
use hmac::{Hmac, Mac};
use subtle::ConstantTimeEq;

type HmacSha256 = Hmac<sha2::Sha256>;

/// Generate an HMAC-SHA256 access signature for a storage object.
///
/// Format: HMAC-SHA256(container\nobject\npermissions\nexpiry, secret), hex-encoded.
/// Hex output keeps the signature free of characters that need escaping when
/// the signed URL is embedded into another URL.
pub fn generate_object_signature(
    secret: &str,
    container: &str,
    object_name: &str,
    permissions: &str,
    expires: i64,
) -> Result<String, anyhow::Error> {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .map_err(|e| anyhow::anyhow!("Invalid key length: {}", e))?;

    let payload = format!("{}\n{}\n{}\n{}", container, object_name, permissions, expires);
    mac.update(payload.as_bytes());
    let result = mac.finalize();

    Ok(hex::encode(result.into_bytes()))
}

/// Validate an object access signature using constant-time comparison.
///
/// Fails when the signature does not match or the expiry instant has passed.
pub fn validate_object_signature(
    secret: &str,
    container: &str,
    object_name: &str,
    permissions: &str,
    expires: i64,
    signature: &str,
) -> Result<(), anyhow::Error> {
    if expires < Utc::now().timestamp() {
        return Err(anyhow::anyhow!("Signature expired"));
    }

    let expected =
        generate_object_signature(secret, container, object_name, permissions, expires)?;

    let expected_bytes = expected.as_bytes();
    let signature_bytes = signature.as_bytes();

    if expected_bytes.len() != signature_bytes.len()
        || !bool::from(expected_bytes.ct_eq(signature_bytes))
    {
        return Err(anyhow::anyhow!("Invalid signature"));
    }

    Ok(())
}
