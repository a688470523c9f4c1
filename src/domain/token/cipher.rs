//! AES-256-CBC encryption of cached access tokens.
//!
//! Stored form is `base64(iv || ciphertext)` with a fresh random 16-byte IV
//! per encryption and PKCS#7 padding.

use std::fmt;

use aes::Aes256;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use cbc::cipher::block_padding::Pkcs7;
use cbc::cipher::{BlockDecryptMut, BlockEncryptMut, KeyIvInit};
use rand::rngs::OsRng;
use rand::RngCore;
use secrecy::{ExposeSecret, Secret, SecretString};
use sha2::{Digest, Sha256};

use super::errors::TokenCacheError;

type Aes256CbcEnc = cbc::Encryptor<Aes256>;
type Aes256CbcDec = cbc::Decryptor<Aes256>;

pub const IV_LEN: usize = 16;

/// Symmetric cipher for token cache entries.
pub struct TokenCipher {
    key: Secret<[u8; 32]>,
}

impl TokenCipher {
    /// Derives the 256-bit key as SHA-256 of the configured secret.
    pub fn from_secret(secret: &SecretString) -> Self {
        let key: [u8; 32] = Sha256::digest(secret.expose_secret().as_bytes()).into();
        Self {
            key: Secret::new(key),
        }
    }

    pub fn encrypt(&self, plaintext: &str) -> Result<String, TokenCacheError> {
        let mut iv = [0u8; IV_LEN];
        OsRng.fill_bytes(&mut iv);

        let ciphertext = Aes256CbcEnc::new_from_slices(self.key.expose_secret(), &iv)
            .map_err(|_| TokenCacheError::InvalidKey)?
            .encrypt_padded_vec_mut::<Pkcs7>(plaintext.as_bytes());

        let mut stored = Vec::with_capacity(IV_LEN + ciphertext.len());
        stored.extend_from_slice(&iv);
        stored.extend_from_slice(&ciphertext);
        Ok(STANDARD.encode(stored))
    }

    pub fn decrypt(&self, stored: &str) -> Result<String, TokenCacheError> {
        let raw = STANDARD
            .decode(stored.as_bytes())
            .map_err(|_| TokenCacheError::Encoding)?;
        if raw.len() <= IV_LEN {
            return Err(TokenCacheError::Truncated);
        }

        let (iv, ciphertext) = raw.split_at(IV_LEN);
        let plaintext = Aes256CbcDec::new_from_slices(self.key.expose_secret(), iv)
            .map_err(|_| TokenCacheError::InvalidKey)?
            .decrypt_padded_vec_mut::<Pkcs7>(ciphertext)
            .map_err(|_| TokenCacheError::Decryption)?;

        String::from_utf8(plaintext).map_err(|_| TokenCacheError::NotUtf8)
    }
}

impl fmt::Debug for TokenCipher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenCipher")
            .field("key", &"[REDACTED]")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cipher(secret: &str) -> TokenCipher {
        TokenCipher::from_secret(&SecretString::new(secret.to_string()))
    }

    #[test]
    fn decrypts_what_it_encrypted() {
        let cipher = cipher("session-secret");
        let stored = cipher.encrypt("A21AAFEpH4PsADK7qSS7pSRsgzfENtu").unwrap();

        assert_eq!(
            cipher.decrypt(&stored).unwrap(),
            "A21AAFEpH4PsADK7qSS7pSRsgzfENtu"
        );
    }

    #[test]
    fn same_token_encrypts_differently_each_time() {
        let cipher = cipher("session-secret");

        let first = cipher.encrypt("tokA").unwrap();
        let second = cipher.encrypt("tokA").unwrap();

        assert_ne!(first, second);
    }

    #[test]
    fn stored_value_carries_iv_and_padded_blocks() {
        let stored = cipher("k").encrypt("tokA").unwrap();
        let raw = STANDARD.decode(stored).unwrap();

        // One IV plus one padded block.
        assert_eq!(raw.len(), IV_LEN + 16);
    }

    #[test]
    fn other_key_does_not_recover_token() {
        let stored = cipher("right").encrypt("tokA").unwrap();
        let recovered = cipher("wrong").decrypt(&stored).ok();

        assert_ne!(recovered.as_deref(), Some("tokA"));
    }

    #[test]
    fn rejects_garbage() {
        let cipher = cipher("k");

        assert_eq!(cipher.decrypt("%%%"), Err(TokenCacheError::Encoding));
        assert_eq!(
            cipher.decrypt(&STANDARD.encode([0u8; IV_LEN])),
            Err(TokenCacheError::Truncated)
        );
        assert_eq!(
            cipher.decrypt(&STANDARD.encode([0u8; IV_LEN + 5])),
            Err(TokenCacheError::Decryption)
        );
    }

    #[test]
    fn debug_output_hides_key() {
        let rendered = format!("{:?}", cipher("super-secret"));
        assert!(rendered.contains("REDACTED"));
        assert!(!rendered.contains("super-secret"));
    }
}
