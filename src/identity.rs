use rand::{CryptoRng, RngCore};
use uuid::Uuid;

pub const DISPLAY_NAME_PREFIX: &str = "MediaVPN";

/// A fresh per-user credential plus the label it ships under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientIdentity {
    pub identifier: String,
    pub display_name: String,
}

#[derive(Debug)]
pub enum IdentityError {
    RandomUnavailable { reason: String },
}

impl std::fmt::Display for IdentityError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::RandomUnavailable { reason } => {
                write!(f, "randomness source unavailable: {reason}")
            }
        }
    }
}

impl std::error::Error for IdentityError {}

/// Draws a canonical UUIDv4 identifier and a `MediaVPN-<hex>` display name
/// from the injected rng. A failing source is surfaced, never papered over
/// with a fixed value.
pub fn generate_identity<R: RngCore + CryptoRng>(
    rng: &mut R,
) -> Result<ClientIdentity, IdentityError> {
    let mut uuid_bytes = [0u8; 16];
    rng.try_fill_bytes(&mut uuid_bytes)
        .map_err(|e| IdentityError::RandomUnavailable {
            reason: e.to_string(),
        })?;
    let identifier = uuid::Builder::from_random_bytes(uuid_bytes)
        .into_uuid()
        .to_string();

    let mut suffix = [0u8; 3];
    rng.try_fill_bytes(&mut suffix)
        .map_err(|e| IdentityError::RandomUnavailable {
            reason: e.to_string(),
        })?;
    let display_name = format!("{DISPLAY_NAME_PREFIX}-{}", hex::encode(suffix));

    Ok(ClientIdentity {
        identifier,
        display_name,
    })
}

pub fn is_uuid_string(s: &str) -> bool {
    Uuid::try_parse(s).is_ok()
}
