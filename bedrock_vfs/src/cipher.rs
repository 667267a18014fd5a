// /////////////////////////////////////////////////////////////////////////////
// Bedrock Foundation RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Cipher Capability
//!
//! The file pipeline consumes encryption through the [`ContentCipher`]
//! trait; the cryptography itself is not this crate's business. The bundled
//! implementation is AES in CTR mode (128- or 256-bit by key length), which
//! is what makes random-access decryption possible: any 16-byte block can be
//! keystreamed independently once its block index is known.
//!
//! The IV layout puts the caller's nonce in the high eight bytes and the
//! big-endian block index in the low eight, so consecutive blocks are
//! consecutive counter values.

use aes::{Aes128, Aes256};
use ctr::cipher::{KeyIvInit, StreamCipher};
use ctr::Ctr128BE;

use bedrock_core::{Error, Result};

/// Derives the CTR-mode IV for a block: `nonce || block_index`, both
/// big-endian.
pub fn create_iv(nonce: u64, block_index: i64) -> [u8; 16] {
    let mut iv = [0u8; 16];
    iv[..8].copy_from_slice(&nonce.to_be_bytes());
    iv[8..].copy_from_slice(&(block_index as u64).to_be_bytes());
    iv
}

/// A symmetric cipher usable for in-place keystream application.
pub trait ContentCipher: Send {
    /// The cipher's block length in bytes.
    fn block_len(&self) -> usize {
        16
    }

    /// XORs the keystream starting at `iv` over `data` in place. CTR mode
    /// makes this both encrypt and decrypt.
    fn apply_keystream(&self, iv: &[u8; 16], data: &mut [u8]) -> Result<()>;
}

enum AesKey {
    Aes128([u8; 16]),
    Aes256([u8; 32]),
}

/// AES-CTR over a raw key; 32 or more key bytes select AES-256, at least 16
/// select AES-128.
pub struct AesCtrCipher {
    key: AesKey,
}

impl AesCtrCipher {
    pub fn new(key: &[u8]) -> Result<AesCtrCipher> {
        let key = if key.len() >= 32 {
            let mut k = [0u8; 32];
            k.copy_from_slice(&key[..32]);
            AesKey::Aes256(k)
        } else if key.len() >= 16 {
            let mut k = [0u8; 16];
            k.copy_from_slice(&key[..16]);
            AesKey::Aes128(k)
        } else {
            return Err(Error::DecryptionKeyRequired);
        };
        Ok(AesCtrCipher { key })
    }
}

impl ContentCipher for AesCtrCipher {
    fn apply_keystream(&self, iv: &[u8; 16], data: &mut [u8]) -> Result<()> {
        match &self.key {
            AesKey::Aes128(key) => {
                let mut cipher = Ctr128BE::<Aes128>::new(key.into(), iv.into());
                cipher.apply_keystream(data);
            }
            AesKey::Aes256(key) => {
                let mut cipher = Ctr128BE::<Aes256>::new(key.into(), iv.into());
                cipher.apply_keystream(data);
            }
        }
        Ok(())
    }
}
