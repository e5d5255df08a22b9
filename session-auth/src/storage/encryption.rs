//! Encryption at rest for persisted client state.
//!
//! Values are sealed with AES-256-GCM. The storage key a value lives under is
//! bound in as associated data, so a sealed session copied over the pending
//! login attempt file (or the other way round) fails to open.

use aes_gcm::{
    aead::{Aead, KeyInit, Payload},
    Aes256Gcm, Nonce,
};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use rand::Rng;

use crate::error::{storage_error, Error, ErrorKind, StorageErrorKind};

const NONCE_LEN: usize = 12;
const KEY_LEN: usize = 32;

/// AES-256-GCM cipher built once from the configured storage key.
#[derive(Clone)]
pub struct StorageCipher {
    cipher: Aes256Gcm,
}

impl StorageCipher {
    /// Build a cipher from a 64 character hex key.
    pub fn from_hex(key_hex: &str) -> Result<Self, Error> {
        let key = hex::decode(key_hex.trim()).map_err(|e| Error {
            source: Some(Box::new(e)),
            error_kind: ErrorKind::Storage(StorageErrorKind::EncryptionFailed),
        })?;
        if key.len() != KEY_LEN {
            return Err(storage_error(
                StorageErrorKind::EncryptionFailed,
                &format!("storage key must be {KEY_LEN} bytes, got {}", key.len()),
            ));
        }
        let cipher = Aes256Gcm::new_from_slice(&key).map_err(|_| {
            storage_error(StorageErrorKind::EncryptionFailed, "unusable storage key")
        })?;
        Ok(Self { cipher })
    }

    /// Encrypt `value` stored under `storage_key`.
    ///
    /// Output is base64 of a fresh random nonce followed by the ciphertext.
    pub fn seal(&self, storage_key: &str, value: &str) -> Result<String, Error> {
        let mut nonce = [0u8; NONCE_LEN];
        rand::thread_rng().fill(&mut nonce);

        let payload = Payload {
            msg: value.as_bytes(),
            aad: storage_key.as_bytes(),
        };
        let sealed = self
            .cipher
            .encrypt(Nonce::from_slice(&nonce), payload)
            .map_err(|_| storage_error(StorageErrorKind::EncryptionFailed, storage_key))?;

        let mut out = Vec::with_capacity(NONCE_LEN + sealed.len());
        out.extend_from_slice(&nonce);
        out.extend(sealed);
        Ok(BASE64.encode(out))
    }

    /// Decrypt a value produced by [`seal`](Self::seal) for the same storage key.
    pub fn open(&self, storage_key: &str, sealed: &str) -> Result<String, Error> {
        let raw = BASE64.decode(sealed.trim()).map_err(|e| Error {
            source: Some(Box::new(e)),
            error_kind: ErrorKind::Storage(StorageErrorKind::DecryptionFailed),
        })?;
        if raw.len() <= NONCE_LEN {
            return Err(storage_error(
                StorageErrorKind::DecryptionFailed,
                &format!("stored value for {storage_key} is truncated"),
            ));
        }

        let (nonce, ciphertext) = raw.split_at(NONCE_LEN);
        let payload = Payload {
            msg: ciphertext,
            aad: storage_key.as_bytes(),
        };
        let plain = self
            .cipher
            .decrypt(Nonce::from_slice(nonce), payload)
            .map_err(|_| {
                storage_error(
                    StorageErrorKind::DecryptionFailed,
                    &format!("stored value for {storage_key} does not match the storage key"),
                )
            })?;

        String::from_utf8(plain).map_err(|e| Error {
            source: Some(Box::new(e)),
            error_kind: ErrorKind::Storage(StorageErrorKind::DecryptionFailed),
        })
    }
}

impl std::fmt::Debug for StorageCipher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("StorageCipher(..)")
    }
}
