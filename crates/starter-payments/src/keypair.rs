// ============================================================================
// STARTER-PAYMENTS - Keypairs & StrKey Addresses
// ============================================================================
// Ed25519 keypairs in Stellar's StrKey encoding:
//   G... account address (public key)
//   S... secret seed
//   C... contract address
//
// No network access; everything here is a pure function over the key bytes.
// ============================================================================

use crate::error::ClientError;
use crate::Result;
use ed25519_dalek::SigningKey;
use rand::rngs::OsRng;
use std::fmt;
use zeroize::Zeroizing;

/// A signing keypair. The secret is wiped from memory when dropped and never
/// shows up in `Debug` output.
#[derive(Clone, PartialEq, Eq)]
pub struct Keypair {
    public_address: String,
    secret_key: Zeroizing<String>,
}

impl Keypair {
    fn from_signing_key(signing_key: &SigningKey) -> Self {
        let public = stellar_strkey::ed25519::PublicKey(signing_key.verifying_key().to_bytes());
        let secret = stellar_strkey::ed25519::PrivateKey(signing_key.to_bytes());

        Self {
            public_address: public.to_string(),
            secret_key: Zeroizing::new(secret.to_string()),
        }
    }

    /// Account address (G...)
    pub fn public_address(&self) -> &str {
        &self.public_address
    }

    /// Secret seed (S...). The caller owns where this goes next.
    pub fn secret_key(&self) -> &str {
        &self.secret_key
    }

    /// Raw Ed25519 public key bytes
    pub fn public_key_bytes(&self) -> Result<[u8; 32]> {
        decode_account_address(&self.public_address)
    }
}

impl fmt::Debug for Keypair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Keypair")
            .field("public_address", &self.public_address)
            .field("secret_key", &"<redacted>")
            .finish()
    }
}

/// Generates and imports keypairs
#[derive(Debug, Clone, Copy, Default)]
pub struct KeypairService;

impl KeypairService {
    pub fn new() -> Self {
        Self
    }

    /// Generate a fresh random keypair
    pub fn generate(&self) -> Keypair {
        let signing_key = SigningKey::generate(&mut OsRng);
        Keypair::from_signing_key(&signing_key)
    }

    /// Rebuild a keypair from an S... secret seed
    pub fn from_secret(&self, secret: &str) -> Result<Keypair> {
        let signing_key = signing_key_from_secret(secret)?;
        Ok(Keypair::from_signing_key(&signing_key))
    }
}

/// Decode an S... secret into an Ed25519 signing key
pub fn signing_key_from_secret(secret: &str) -> Result<SigningKey> {
    let seed = stellar_strkey::ed25519::PrivateKey::from_string(secret.trim())
        .map_err(|_| ClientError::InvalidSecretKey)?;
    let seed_bytes = Zeroizing::new(seed.0);
    Ok(SigningKey::from_bytes(&seed_bytes))
}

/// Decode a G... account address into raw public key bytes
pub fn decode_account_address(address: &str) -> Result<[u8; 32]> {
    stellar_strkey::ed25519::PublicKey::from_string(address)
        .map(|pk| pk.0)
        .map_err(|_| ClientError::InvalidAddress(address.to_string()))
}

/// Encode raw public key bytes as a G... account address
pub fn encode_account_address(key_bytes: &[u8; 32]) -> String {
    stellar_strkey::ed25519::PublicKey(*key_bytes).to_string()
}

/// Check that an address is a well-formed G... account address
pub fn validate_account_address(address: &str) -> Result<()> {
    decode_account_address(address).map(|_| ())
}

/// Check that an address is a well-formed C... contract address
pub fn validate_contract_address(address: &str) -> Result<()> {
    stellar_strkey::Contract::from_string(address)
        .map(|_| ())
        .map_err(|_| ClientError::InvalidAddress(address.to_string()))
}
