/*
 * manager.rs
 * Copyright (C) 2026 Chris Burdess
 *
 * This file is part of Sudomail, a secure email client core.
 *
 * Sudomail is free software: you can redistribute it and/or modify
 * it under the terms of the GNU General Public License as published by
 * the Free Software Foundation, either version 3 of the License, or
 * (at your option) any later version.
 *
 * Sudomail is distributed in the hope that it will be useful,
 * but WITHOUT ANY WARRANTY; without even the implied warranty of
 * MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 * GNU General Public License for more details.
 *
 * You should have received a copy of the GNU General Public License
 * along with Sudomail.  If not, see <http://www.gnu.org/licenses/>.
 */

//! Device key manager: RSA key pairs, AES symmetric keys and the primitive operations over them.
//!
//! Entries live in a [`SecureStore`] under `<namespace>/<kind>/<key id>`:
//! `private` (PKCS#8 DER), `public` (SPKI DER), `symmetric` (raw 32 bytes), plus the
//! `<namespace>/current-symmetric-key-id` pointer.

use aes::cipher::block_padding::Pkcs7;
use aes::cipher::{BlockDecryptMut, BlockEncryptMut, KeyIvInit};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use cbc::{Decryptor, Encryptor};
use log::{debug, info};
use rsa::pkcs1::DecodeRsaPublicKey;
use rsa::pkcs8::{DecodePrivateKey, DecodePublicKey, EncodePrivateKey, EncodePublicKey};
use rsa::{Oaep, Pkcs1v15Encrypt, RsaPrivateKey, RsaPublicKey};
use zeroize::Zeroizing;

use super::algorithm::{PublicKeyEncryptionAlgorithm, IV_SIZE, RSA_KEY_BITS, SYMMETRIC_KEY_SIZE};
use super::archive::SecureKeyArchive;
use super::error::DeviceKeyManagerError;
use super::secure_store::SecureStore;

type Aes256CbcEnc = Encryptor<aes::Aes256>;
type Aes256CbcDec = Decryptor<aes::Aes256>;

const PRIVATE_KIND: &str = "private";
const PUBLIC_KIND: &str = "public";
const SYMMETRIC_KIND: &str = "symmetric";
const CURRENT_SYMMETRIC_KEY: &str = "current-symmetric-key-id";

/// Public half of a stored key pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyPair {
    pub key_id: String,
    /// SPKI DER.
    pub public_key: Vec<u8>,
}

impl KeyPair {
    /// Base64 of the SPKI DER, the form published for an email address.
    pub fn public_key_base64(&self) -> String {
        BASE64.encode(&self.public_key)
    }
}

/// Local key lifecycle and cryptographic primitives.
pub trait DeviceKeyManager: Send + Sync {
    fn generate_key_pair(&self) -> Result<KeyPair, DeviceKeyManagerError>;
    fn get_key_pair_with_id(&self, key_id: &str) -> Result<Option<KeyPair>, DeviceKeyManagerError>;
    fn private_key_exists(&self, key_id: &str) -> Result<bool, DeviceKeyManagerError>;

    fn get_current_symmetric_key_id(&self) -> Result<Option<String>, DeviceKeyManagerError>;
    /// Create a new AES-256 key, store it and make it current. Returns its id.
    fn generate_new_current_symmetric_key(&self) -> Result<String, DeviceKeyManagerError>;
    fn symmetric_key_exists(&self, key_id: &str) -> Result<bool, DeviceKeyManagerError>;

    /// `IV(16) || AES-CBC-PKCS7(data)` under a stored symmetric key, with a random IV.
    fn encrypt_with_symmetric_key_id(&self, key_id: &str, data: &[u8]) -> Result<Vec<u8>, DeviceKeyManagerError>;
    fn decrypt_with_symmetric_key_id(&self, key_id: &str, data: &[u8]) -> Result<Vec<u8>, DeviceKeyManagerError>;

    fn encrypt_with_key_pair_id(
        &self,
        key_id: &str,
        data: &[u8],
        algorithm: PublicKeyEncryptionAlgorithm,
    ) -> Result<Vec<u8>, DeviceKeyManagerError>;
    fn decrypt_with_key_pair_id(
        &self,
        key_id: &str,
        data: &[u8],
        algorithm: PublicKeyEncryptionAlgorithm,
    ) -> Result<Vec<u8>, DeviceKeyManagerError>;
    /// Encrypt for a key that is not stored locally. Accepts SPKI or PKCS#1, DER, base64 DER or PEM.
    fn encrypt_with_public_key(
        &self,
        public_key: &[u8],
        data: &[u8],
        algorithm: PublicKeyEncryptionAlgorithm,
    ) -> Result<Vec<u8>, DeviceKeyManagerError>;

    fn generate_random_symmetric_key(&self) -> Result<Zeroizing<Vec<u8>>, DeviceKeyManagerError>;
    fn create_random_data(&self, size: usize) -> Result<Vec<u8>, DeviceKeyManagerError>;
    /// AES-CBC-PKCS7 with a caller-supplied key. A missing IV means all zeroes.
    fn encrypt_with_symmetric_key(
        &self,
        key: &[u8],
        data: &[u8],
        iv: Option<&[u8]>,
    ) -> Result<Vec<u8>, DeviceKeyManagerError>;
    fn decrypt_with_symmetric_key(
        &self,
        key: &[u8],
        data: &[u8],
        iv: Option<&[u8]>,
    ) -> Result<Vec<u8>, DeviceKeyManagerError>;

    fn export_keys(&self) -> Result<Vec<u8>, DeviceKeyManagerError>;
    fn import_keys(&self, archive: &[u8]) -> Result<(), DeviceKeyManagerError>;
    fn remove_all_keys(&self) -> Result<(), DeviceKeyManagerError>;
}

pub struct DefaultDeviceKeyManager<S> {
    store: S,
    namespace: String,
}

impl<S: SecureStore> DefaultDeviceKeyManager<S> {
    pub fn new(store: S, namespace: impl Into<String>) -> Self {
        Self {
            store,
            namespace: namespace.into(),
        }
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    fn entry_name(&self, kind: &str, key_id: &str) -> String {
        format!("{}/{}/{}", self.namespace, kind, key_id)
    }

    fn prefix(&self) -> String {
        format!("{}/", self.namespace)
    }

    fn load(&self, kind: &str, key_id: &str) -> Result<Zeroizing<Vec<u8>>, DeviceKeyManagerError> {
        self.store
            .get(&self.entry_name(kind, key_id))?
            .map(Zeroizing::new)
            .ok_or_else(|| DeviceKeyManagerError::KeyNotFound(format!("{} key {}", kind, key_id)))
    }

    fn exists(&self, kind: &str, key_id: &str) -> Result<bool, DeviceKeyManagerError> {
        Ok(self.store.get(&self.entry_name(kind, key_id))?.is_some())
    }

    fn load_private_key(&self, key_id: &str) -> Result<RsaPrivateKey, DeviceKeyManagerError> {
        let der = self.load(PRIVATE_KIND, key_id)?;
        RsaPrivateKey::from_pkcs8_der(&der)
            .map_err(|e| DeviceKeyManagerError::KeyOperationFailed(format!("private key {}: {}", key_id, e)))
    }
}

impl<S: SecureStore> DeviceKeyManager for DefaultDeviceKeyManager<S> {
    fn generate_key_pair(&self) -> Result<KeyPair, DeviceKeyManagerError> {
        let mut rng = rand::thread_rng();
        let private_key = RsaPrivateKey::new(&mut rng, RSA_KEY_BITS)
            .map_err(|e| DeviceKeyManagerError::KeyGeneration(e.to_string()))?;
        let public_key = RsaPublicKey::from(&private_key);
        let private_der = private_key
            .to_pkcs8_der()
            .map_err(|e| DeviceKeyManagerError::KeyGeneration(e.to_string()))?;
        let public_der = public_key
            .to_public_key_der()
            .map_err(|e| DeviceKeyManagerError::KeyGeneration(e.to_string()))?;

        let key_id = uuid::Uuid::new_v4().to_string();
        self.store
            .put(&self.entry_name(PRIVATE_KIND, &key_id), private_der.as_bytes())?;
        self.store
            .put(&self.entry_name(PUBLIC_KIND, &key_id), public_der.as_bytes())?;
        info!("generated key pair {}", key_id);
        Ok(KeyPair {
            key_id,
            public_key: public_der.as_bytes().to_vec(),
        })
    }

    fn get_key_pair_with_id(&self, key_id: &str) -> Result<Option<KeyPair>, DeviceKeyManagerError> {
        Ok(self
            .store
            .get(&self.entry_name(PUBLIC_KIND, key_id))?
            .map(|public_key| KeyPair {
                key_id: key_id.to_string(),
                public_key,
            }))
    }

    fn private_key_exists(&self, key_id: &str) -> Result<bool, DeviceKeyManagerError> {
        self.exists(PRIVATE_KIND, key_id)
    }

    fn get_current_symmetric_key_id(&self) -> Result<Option<String>, DeviceKeyManagerError> {
        let name = format!("{}{}", self.prefix(), CURRENT_SYMMETRIC_KEY);
        match self.store.get(&name)? {
            Some(bytes) => String::from_utf8(bytes)
                .map(Some)
                .map_err(|e| DeviceKeyManagerError::KeyOperationFailed(e.to_string())),
            None => Ok(None),
        }
    }

    fn generate_new_current_symmetric_key(&self) -> Result<String, DeviceKeyManagerError> {
        let key = self.generate_random_symmetric_key()?;
        let key_id = uuid::Uuid::new_v4().to_string();
        self.store
            .put(&self.entry_name(SYMMETRIC_KIND, &key_id), &key)?;
        self.store.put(
            &format!("{}{}", self.prefix(), CURRENT_SYMMETRIC_KEY),
            key_id.as_bytes(),
        )?;
        info!("generated symmetric key {}", key_id);
        Ok(key_id)
    }

    fn symmetric_key_exists(&self, key_id: &str) -> Result<bool, DeviceKeyManagerError> {
        self.exists(SYMMETRIC_KIND, key_id)
    }

    fn encrypt_with_symmetric_key_id(&self, key_id: &str, data: &[u8]) -> Result<Vec<u8>, DeviceKeyManagerError> {
        let key = self.load(SYMMETRIC_KIND, key_id)?;
        let iv = self.create_random_data(IV_SIZE)?;
        let mut out = iv.clone();
        out.extend(aes_cbc_encrypt(&key, &iv, data)?);
        Ok(out)
    }

    fn decrypt_with_symmetric_key_id(&self, key_id: &str, data: &[u8]) -> Result<Vec<u8>, DeviceKeyManagerError> {
        let key = self.load(SYMMETRIC_KIND, key_id)?;
        if data.len() < IV_SIZE {
            return Err(DeviceKeyManagerError::Decryption(format!(
                "ciphertext of {} bytes has no IV",
                data.len()
            )));
        }
        let (iv, ciphertext) = data.split_at(IV_SIZE);
        aes_cbc_decrypt(&key, iv, ciphertext)
    }

    fn encrypt_with_key_pair_id(
        &self,
        key_id: &str,
        data: &[u8],
        algorithm: PublicKeyEncryptionAlgorithm,
    ) -> Result<Vec<u8>, DeviceKeyManagerError> {
        let der = self.load(PUBLIC_KIND, key_id)?;
        let public_key = RsaPublicKey::from_public_key_der(&der)
            .map_err(|e| DeviceKeyManagerError::KeyOperationFailed(format!("public key {}: {}", key_id, e)))?;
        rsa_encrypt(&public_key, data, algorithm)
    }

    fn decrypt_with_key_pair_id(
        &self,
        key_id: &str,
        data: &[u8],
        algorithm: PublicKeyEncryptionAlgorithm,
    ) -> Result<Vec<u8>, DeviceKeyManagerError> {
        let private_key = self.load_private_key(key_id)?;
        let result = match algorithm {
            PublicKeyEncryptionAlgorithm::RsaEcbOaepSha1 => {
                private_key.decrypt(Oaep::new::<sha1::Sha1>(), data)
            }
            PublicKeyEncryptionAlgorithm::RsaEcbPkcs1 => private_key.decrypt(Pkcs1v15Encrypt, data),
        };
        result.map_err(|e| DeviceKeyManagerError::Decryption(format!("{} with key {}: {}", algorithm, key_id, e)))
    }

    fn encrypt_with_public_key(
        &self,
        public_key: &[u8],
        data: &[u8],
        algorithm: PublicKeyEncryptionAlgorithm,
    ) -> Result<Vec<u8>, DeviceKeyManagerError> {
        let public_key = parse_public_key(public_key)?;
        rsa_encrypt(&public_key, data, algorithm)
    }

    fn generate_random_symmetric_key(&self) -> Result<Zeroizing<Vec<u8>>, DeviceKeyManagerError> {
        Ok(Zeroizing::new(self.create_random_data(SYMMETRIC_KEY_SIZE)?))
    }

    fn create_random_data(&self, size: usize) -> Result<Vec<u8>, DeviceKeyManagerError> {
        let mut buf = vec![0u8; size];
        getrandom::getrandom(&mut buf)
            .map_err(|e| DeviceKeyManagerError::KeyOperationFailed(format!("random source: {}", e)))?;
        Ok(buf)
    }

    fn encrypt_with_symmetric_key(
        &self,
        key: &[u8],
        data: &[u8],
        iv: Option<&[u8]>,
    ) -> Result<Vec<u8>, DeviceKeyManagerError> {
        aes_cbc_encrypt(key, iv.unwrap_or(&[0u8; IV_SIZE]), data)
    }

    fn decrypt_with_symmetric_key(
        &self,
        key: &[u8],
        data: &[u8],
        iv: Option<&[u8]>,
    ) -> Result<Vec<u8>, DeviceKeyManagerError> {
        aes_cbc_decrypt(key, iv.unwrap_or(&[0u8; IV_SIZE]), data)
    }

    fn export_keys(&self) -> Result<Vec<u8>, DeviceKeyManagerError> {
        let prefix = self.prefix();
        let mut entries = Vec::new();
        for name in self.store.names()? {
            let Some(relative) = name.strip_prefix(&prefix) else {
                continue;
            };
            if let Some(value) = self.store.get(&name)? {
                entries.push((relative.to_string(), Zeroizing::new(value)));
            }
        }
        debug!("exporting {} key entries", entries.len());
        SecureKeyArchive::new(&self.namespace, entries).to_bytes()
    }

    fn import_keys(&self, archive: &[u8]) -> Result<(), DeviceKeyManagerError> {
        let entries = SecureKeyArchive::decode(archive)?;
        let prefix = self.prefix();
        for (name, value) in &entries {
            self.store.put(&format!("{}{}", prefix, name), value)?;
        }
        info!("imported {} key entries", entries.len());
        Ok(())
    }

    fn remove_all_keys(&self) -> Result<(), DeviceKeyManagerError> {
        let prefix = self.prefix();
        for name in self.store.names()? {
            if name.starts_with(&prefix) {
                self.store.delete(&name)?;
            }
        }
        info!("removed all keys in namespace {}", self.namespace);
        Ok(())
    }
}

fn rsa_encrypt(
    public_key: &RsaPublicKey,
    data: &[u8],
    algorithm: PublicKeyEncryptionAlgorithm,
) -> Result<Vec<u8>, DeviceKeyManagerError> {
    let mut rng = rand::thread_rng();
    let result = match algorithm {
        PublicKeyEncryptionAlgorithm::RsaEcbOaepSha1 => {
            public_key.encrypt(&mut rng, Oaep::new::<sha1::Sha1>(), data)
        }
        PublicKeyEncryptionAlgorithm::RsaEcbPkcs1 => public_key.encrypt(&mut rng, Pkcs1v15Encrypt, data),
    };
    result.map_err(|e| DeviceKeyManagerError::Encryption(format!("{}: {}", algorithm, e)))
}

/// Decode a public key given as SPKI or PKCS#1, in PEM, base64 DER or raw DER.
pub fn parse_public_key(input: &[u8]) -> Result<RsaPublicKey, DeviceKeyManagerError> {
    let invalid = |detail: String| DeviceKeyManagerError::KeyOperationFailed(format!("invalid public key: {}", detail));
    if let Ok(text) = std::str::from_utf8(input) {
        let text = text.trim();
        if text.starts_with("-----BEGIN RSA PUBLIC KEY-----") {
            return RsaPublicKey::from_pkcs1_pem(text).map_err(|e| invalid(e.to_string()));
        }
        if text.starts_with("-----BEGIN") {
            return RsaPublicKey::from_public_key_pem(text).map_err(|e| invalid(e.to_string()));
        }
        if let Ok(der) = BASE64.decode(text.as_bytes()) {
            return public_key_from_der(&der).map_err(invalid);
        }
    }
    public_key_from_der(input).map_err(invalid)
}

fn public_key_from_der(der: &[u8]) -> Result<RsaPublicKey, String> {
    RsaPublicKey::from_public_key_der(der)
        .or_else(|_| RsaPublicKey::from_pkcs1_der(der))
        .map_err(|e| e.to_string())
}

fn aes_cbc_encrypt(key: &[u8], iv: &[u8], data: &[u8]) -> Result<Vec<u8>, DeviceKeyManagerError> {
    let mut buf = vec![0u8; data.len() + IV_SIZE];
    buf[..data.len()].copy_from_slice(data);
    let ciphertext = Aes256CbcEnc::new_from_slices(key, iv)
        .map_err(|_| DeviceKeyManagerError::Encryption("invalid key or IV length".to_string()))?
        .encrypt_padded_mut::<Pkcs7>(&mut buf, data.len())
        .map_err(|_| DeviceKeyManagerError::Encryption("padding failed".to_string()))?;
    Ok(ciphertext.to_vec())
}

fn aes_cbc_decrypt(key: &[u8], iv: &[u8], data: &[u8]) -> Result<Vec<u8>, DeviceKeyManagerError> {
    let mut buf = data.to_vec();
    let plaintext = Aes256CbcDec::new_from_slices(key, iv)
        .map_err(|_| DeviceKeyManagerError::Decryption("invalid key or IV length".to_string()))?
        .decrypt_padded_mut::<Pkcs7>(&mut buf)
        .map_err(|_| DeviceKeyManagerError::Decryption("wrong key or corrupted data".to_string()))?;
    Ok(plaintext.to_vec())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keys::secure_store::MemorySecureStore;

    fn manager() -> DefaultDeviceKeyManager<MemorySecureStore> {
        DefaultDeviceKeyManager::new(MemorySecureStore::new(), "eml")
    }

    #[test]
    fn symmetric_key_id_round_trip() {
        let km = manager();
        assert_eq!(km.get_current_symmetric_key_id().unwrap(), None);
        let id = km.generate_new_current_symmetric_key().unwrap();
        assert_eq!(km.get_current_symmetric_key_id().unwrap(), Some(id.clone()));
        assert!(km.symmetric_key_exists(&id).unwrap());

        let sealed = km.encrypt_with_symmetric_key_id(&id, b"payload").unwrap();
        assert_eq!(sealed.len(), IV_SIZE + 16);
        assert_eq!(km.decrypt_with_symmetric_key_id(&id, &sealed).unwrap(), b"payload");
        // Random IV per call.
        assert_ne!(sealed, km.encrypt_with_symmetric_key_id(&id, b"payload").unwrap());
    }

    #[test]
    fn missing_symmetric_key_is_reported() {
        let km = manager();
        assert!(matches!(
            km.encrypt_with_symmetric_key_id("nope", b"x"),
            Err(DeviceKeyManagerError::KeyNotFound(_))
        ));
    }

    #[test]
    fn key_pair_round_trip_both_paddings() {
        let km = manager();
        let pair = km.generate_key_pair().unwrap();
        assert!(km.private_key_exists(&pair.key_id).unwrap());
        assert_eq!(km.get_key_pair_with_id(&pair.key_id).unwrap(), Some(pair.clone()));

        for alg in [
            PublicKeyEncryptionAlgorithm::RsaEcbOaepSha1,
            PublicKeyEncryptionAlgorithm::RsaEcbPkcs1,
        ] {
            let wrapped = km
                .encrypt_with_public_key(pair.public_key_base64().as_bytes(), b"secret", alg)
                .unwrap();
            assert_eq!(wrapped.len(), 256);
            assert_eq!(km.decrypt_with_key_pair_id(&pair.key_id, &wrapped, alg).unwrap(), b"secret");
        }
        let wrapped = km
            .encrypt_with_key_pair_id(&pair.key_id, b"again", PublicKeyEncryptionAlgorithm::RsaEcbOaepSha1)
            .unwrap();
        assert_eq!(
            km.decrypt_with_key_pair_id(&pair.key_id, &wrapped, PublicKeyEncryptionAlgorithm::RsaEcbOaepSha1)
                .unwrap(),
            b"again"
        );
    }

    #[test]
    fn zero_iv_symmetric_round_trip() {
        let km = manager();
        let key = km.generate_random_symmetric_key().unwrap();
        let ct = km.encrypt_with_symmetric_key(&key, b"hello", None).unwrap();
        let explicit = km.encrypt_with_symmetric_key(&key, b"hello", Some(&[0u8; 16][..])).unwrap();
        assert_eq!(ct, explicit);
        assert_eq!(km.decrypt_with_symmetric_key(&key, &ct, None).unwrap(), b"hello");
        assert!(km.encrypt_with_symmetric_key(&key[..8], b"hello", None).is_err());
    }

    #[test]
    fn export_import_and_remove() {
        let source = manager();
        let pair = source.generate_key_pair().unwrap();
        let sym = source.generate_new_current_symmetric_key().unwrap();
        let archive = source.export_keys().unwrap();

        let target = DefaultDeviceKeyManager::new(MemorySecureStore::new(), "other");
        target.import_keys(&archive).unwrap();
        assert!(target.private_key_exists(&pair.key_id).unwrap());
        assert!(target.symmetric_key_exists(&sym).unwrap());
        assert_eq!(target.get_current_symmetric_key_id().unwrap(), Some(sym));

        target.remove_all_keys().unwrap();
        assert!(!target.private_key_exists(&pair.key_id).unwrap());
        assert!(target.import_keys(b"not json").is_err());
    }
}
