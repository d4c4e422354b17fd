// ABOUTME: Random secret generation for newly issued credentials
// ABOUTME: Produces URL-safe base64 secrets wrapped so they never leak through Debug

use base64::Engine;
use rand::Rng;
use secrecy::SecretString;

/// Number of random bytes behind every generated secret
pub const SECRET_BYTES: usize = 32;

/// Generate a cryptographically secure random secret
/// Returns a base64 (URL-safe, unpadded) encoding of 32 random bytes
pub fn generate_secret() -> SecretString {
    let mut rng = rand::thread_rng();
    let random_bytes: [u8; SECRET_BYTES] = rng.gen();
    SecretString::new(base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(random_bytes))
}
