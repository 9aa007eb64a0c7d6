//! Request signing for authenticated venue endpoints

use anyhow::{anyhow, Context, Result};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use hmac::{Hmac, Mac};
use sha2::{Digest, Sha256, Sha512};

type HmacSha256 = Hmac<Sha256>;
type HmacSha512 = Hmac<Sha512>;

/// Hex HMAC-SHA256 of `payload`, as Binance expects in `signature=`.
pub fn hmac_sha256_hex(secret: &str, payload: &str) -> Result<String> {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .map_err(|e| anyhow!("HMAC key error: {}", e))?;
    mac.update(payload.as_bytes());
    Ok(hex::encode(mac.finalize().into_bytes()))
}

/// Kraken `API-Sign`: base64(HMAC-SHA512(b64decode(secret), path || SHA256(nonce || body))).
pub fn kraken_signature(path: &str, nonce: &str, body: &str, secret: &str) -> Result<String> {
    let key = STANDARD
        .decode(secret)
        .context("failed to decode Kraken API secret")?;

    let mut sha = Sha256::new();
    sha.update(nonce.as_bytes());
    sha.update(body.as_bytes());
    let digest = sha.finalize();

    let mut mac = HmacSha512::new_from_slice(&key)
        .map_err(|e| anyhow!("HMAC key error: {}", e))?;
    mac.update(path.as_bytes());
    mac.update(&digest);
    Ok(STANDARD.encode(mac.finalize().into_bytes()))
}
