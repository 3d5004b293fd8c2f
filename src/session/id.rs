//! Session identifier generation.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use rand::{CryptoRng, RngCore};
use tracing::warn;

use crate::error::SessionError;

/// 256 bits of entropy per identifier.
pub(crate) const ID_BYTES: usize = 32;

/// Total attempts against the random source before giving up.
pub(crate) const MAX_ATTEMPTS: u32 = 3;

/// Draws a fresh identifier from `rng`, encoded as URL-safe base64 without
/// padding (43 characters).
///
/// A failing source is retried; after [`MAX_ATTEMPTS`] failures the error
/// is returned. No identifier is ever produced from a partial or failed read.
pub(crate) fn generate<R: RngCore + CryptoRng>(rng: &mut R) -> Result<String, SessionError> {
    let mut bytes = [0u8; ID_BYTES];
    let mut attempts = 0;
    loop {
        attempts += 1;
        match rng.try_fill_bytes(&mut bytes) {
            Ok(()) => return Ok(URL_SAFE_NO_PAD.encode(bytes)),
            Err(e) if attempts < MAX_ATTEMPTS => {
                warn!(attempt = attempts, "entropy source failed, retrying: {e}");
            }
            Err(source) => return Err(SessionError::EntropyUnavailable { attempts, source }),
        }
    }
}
