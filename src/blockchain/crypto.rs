use ed25519_dalek::{Signature, Signer, SigningKey, Verifier, VerifyingKey};
use rand::rngs::OsRng;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use thiserror::Error;

use std::fmt;

/// Errors that can occur during cryptographic operations
#[derive(Debug, Error)]
pub enum CryptoError {
    #[error("Invalid public key: {0}")]
    InvalidPublicKey(String),

    #[error("Invalid signature: {0}")]
    InvalidSignature(String),

    #[error("Encoding error: {0}")]
    EncodingError(String),

    #[error("Decoding error: {0}")]
    DecodingError(String),
}

/// A wallet address as it appears in transaction inputs and outputs
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Address(pub String);

impl Address {
    pub fn new(address: impl Into<String>) -> Self {
        Address(address.into())
    }

    /// Derives the default address of a key pair: its hex-encoded public key
    pub fn from_public_key(public_key: &VerifyingKey) -> Self {
        Address(hex::encode(public_key.as_bytes()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for Address {
    fn from(address: &str) -> Self {
        Address(address.to_string())
    }
}

/// Represents a digital signature
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DigitalSignature(pub String);

impl DigitalSignature {
    /// Creates a new digital signature from a signature
    pub fn from_signature(signature: &Signature) -> Self {
        let bytes = signature.to_bytes();
        DigitalSignature(bs58::encode(bytes).into_string())
    }

    /// Converts the digital signature to a signature
    pub fn to_signature(&self) -> Result<Signature, CryptoError> {
        let bytes = bs58::decode(&self.0)
            .into_vec()
            .map_err(|e| CryptoError::DecodingError(e.to_string()))?;

        let signature_bytes: [u8; 64] = bytes.try_into().map_err(|_| {
            CryptoError::InvalidSignature("Invalid signature length".to_string())
        })?;

        Ok(Signature::from_bytes(&signature_bytes))
    }
}

/// An ed25519 key pair owned by a wallet
#[derive(Debug, Clone)]
pub struct KeyPair {
    signing_key: SigningKey,
    verifying_key: VerifyingKey,
}

impl KeyPair {
    /// Generates a fresh random key pair
    pub fn generate() -> Self {
        let mut csprng = OsRng;
        let signing_key = SigningKey::generate(&mut csprng);
        let verifying_key = VerifyingKey::from(&signing_key);

        KeyPair {
            signing_key,
            verifying_key,
        }
    }

    pub fn public_key(&self) -> &VerifyingKey {
        &self.verifying_key
    }

    /// Hex encoding of the public key
    pub fn public_key_hex(&self) -> String {
        hex::encode(self.verifying_key.as_bytes())
    }

    /// Signs an opaque data hash with the private key
    pub fn sign(&self, data_hash: &str) -> DigitalSignature {
        let signature = self.signing_key.sign(data_hash.as_bytes());
        DigitalSignature::from_signature(&signature)
    }
}

/// Decodes a hex-encoded public key
pub fn public_key_from_hex(public_key: &str) -> Result<VerifyingKey, CryptoError> {
    let bytes = hex::decode(public_key).map_err(|e| CryptoError::DecodingError(e.to_string()))?;

    let key_bytes: [u8; 32] = bytes.try_into().map_err(|_| {
        CryptoError::InvalidPublicKey("Invalid public key length".to_string())
    })?;

    VerifyingKey::from_bytes(&key_bytes).map_err(|e| CryptoError::InvalidPublicKey(e.to_string()))
}

/// Verifies a signature over a data hash against a hex-encoded public key
pub fn verify_signature(
    public_key: &str,
    signature: &DigitalSignature,
    data_hash: &str,
) -> Result<bool, CryptoError> {
    let public_key = public_key_from_hex(public_key)?;
    let signature = signature.to_signature()?;

    Ok(public_key.verify(data_hash.as_bytes(), &signature).is_ok())
}

/// SHA-256 of the JSON encoding of `data`, as lowercase hex
pub fn hash<T: Serialize + ?Sized>(data: &T) -> Result<String, CryptoError> {
    let bytes = serde_json::to_vec(data).map_err(|e| CryptoError::EncodingError(e.to_string()))?;
    Ok(sha256_hex(&bytes))
}

pub fn sha256_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    format!("{:x}", hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_pair_generation() {
        let key_pair = KeyPair::generate();
        let public_key = key_pair.public_key_hex();

        assert_eq!(public_key.len(), 64);
        assert_eq!(
            Address::from_public_key(key_pair.public_key()).as_str(),
            public_key
        );
    }

    #[test]
    fn test_signing_and_verification() {
        let key_pair = KeyPair::generate();
        let data_hash = hash("Hello, world!").unwrap();

        let signature = key_pair.sign(&data_hash);
        assert!(verify_signature(&key_pair.public_key_hex(), &signature, &data_hash).unwrap());

        let wrong_hash = hash("Wrong message").unwrap();
        assert!(!verify_signature(&key_pair.public_key_hex(), &signature, &wrong_hash).unwrap());
    }

    #[test]
    fn test_verification_with_other_key() {
        let signer = KeyPair::generate();
        let other = KeyPair::generate();
        let data_hash = hash(&vec![1u64, 2, 3]).unwrap();

        let signature = signer.sign(&data_hash);
        assert!(!verify_signature(&other.public_key_hex(), &signature, &data_hash).unwrap());
    }

    #[test]
    fn test_malformed_public_key() {
        let key_pair = KeyPair::generate();
        let signature = key_pair.sign("abc");

        let result = verify_signature(crate::config::ISSUER_ADDRESS, &signature, "abc");
        assert!(matches!(result, Err(CryptoError::DecodingError(_))));
    }

    #[test]
    fn test_hash_is_deterministic() {
        let first = hash(&("a", 1u64)).unwrap();
        let second = hash(&("a", 1u64)).unwrap();

        assert_eq!(first, second);
        assert_eq!(first.len(), 64);
        assert_ne!(first, hash(&("a", 2u64)).unwrap());
    }
}
