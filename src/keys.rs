use hkdf::Hkdf;
use p256::{ecdh::diffie_hellman, elliptic_curve::sec1::ToEncodedPoint, PublicKey, SecretKey};
use sha2::Sha256;
use zeroize::Zeroize;

use crate::{
    error::{Error, Result},
    nonce::BaseNonce,
};

const KEY_LEN: usize = 16;
const SECRET_LEN: usize = 32;

const AESGCM_INFO: &[u8] = b"Content-Encoding: aesgcm\0";
const AES128GCM_INFO: &[u8] = b"Content-Encoding: aes128gcm\0";
const NONCE_BASE_INFO: &[u8] = b"Content-Encoding: nonce\0";
const AUTH_INFO: &[u8] = b"Content-Encoding: auth\0";
const WEBPUSH_INFO: &[u8] = b"WebPush: info\0";

/// The 16-byte content-encryption key, zeroized on drop.
#[derive(Clone)]
pub struct Cek(pub [u8; KEY_LEN]);

impl Drop for Cek {
    fn drop(&mut self) {
        self.0.zeroize();
    }
}

/// Whether the key schedule is running for the sending or receiving side.
/// Drives which public key plays "sender" and which plays "receiver" in
/// the `aesgcm` context and `aes128gcm` webpush `authInfo`.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum Mode {
    Encrypt,
    Decrypt,
}

/// Resolves the local and remote P-256 public keys into sender/receiver
/// order for context construction, per RFC 8291 / the `aesgcm` draft: on
/// encrypt the local key is the sender, on decrypt the local key is the
/// receiver.
fn sender_receiver<'a>(mode: Mode, local_public: &'a [u8], remote_public: &'a [u8]) -> (&'a [u8], &'a [u8]) {
    match mode {
        Mode::Encrypt => (local_public, remote_public),
        Mode::Decrypt => (remote_public, local_public),
    }
}

/// ECDH shared secret (X-coordinate) between a local P-256 private key
/// and a remote uncompressed SEC1 public key.
pub fn ecdh(local_secret: &SecretKey, remote_public: &[u8]) -> Result<[u8; SECRET_LEN]> {
    let peer = PublicKey::from_sec1_bytes(remote_public)?;
    let shared = diffie_hellman(local_secret.to_nonzero_scalar(), peer.as_affine());
    let mut out = [0u8; SECRET_LEN];
    out.copy_from_slice(shared.raw_secret_bytes().as_slice());
    Ok(out)
}

/// Zeroizes a stack-allocated shared secret in place, once its caller is
/// done with it.
fn zeroize_secret(secret: &mut [u8; SECRET_LEN]) {
    secret.zeroize();
}

/// Returns the 65-byte uncompressed SEC1 encoding of a public key.
pub fn public_key_bytes(secret: &SecretKey) -> [u8; 65] {
    let point = secret.public_key().to_encoded_point(false);
    let mut out = [0u8; 65];
    out.copy_from_slice(point.as_bytes());
    out
}

/// Inputs shared by both variants' secret-resolution paths. Mirrors the
/// `options` struct the Go original threads through its key-schedule
/// helpers, narrowed to exactly what this crate's key schedule needs.
pub struct KeyInputs<'a> {
    pub key: Option<&'a [u8]>,
    pub auth_secret: Option<&'a [u8]>,
    pub local_secret: Option<&'a SecretKey>,
    pub local_public: Option<&'a [u8]>,
    pub remote_public: Option<&'a [u8]>,
    pub key_id: Option<&'a [u8]>,
    pub key_map: Option<&'a dyn crate::options::KeyMap>,
    pub key_label: &'a [u8],
    pub mode: Mode,
}

fn hkdf_fill(salt: &[u8], ikm: &[u8], info: &[u8], out: &mut [u8]) -> Result<()> {
    let kdf = Hkdf::<Sha256>::new(Some(salt), ikm);
    kdf.expand(info, out)?;
    Ok(())
}

/// `extractSecretAndContext`: the `aesgcm` secret-resolution path (§4.1).
fn extract_secret_and_context(inputs: &KeyInputs<'_>) -> Result<(Vec<u8>, Vec<u8>)> {
    let (mut secret, context) = if let Some(key) = inputs.key {
        if key.len() != KEY_LEN {
            return Err(Error::InvalidKeyLength);
        }
        (key.to_vec(), Vec::new())
    } else if let Some(local_secret) = inputs.local_secret {
        let remote_public = inputs.remote_public.ok_or(Error::UnableDetermineKey)?;
        let local_public = inputs.local_public.ok_or(Error::UnableDetermineKey)?;
        let mut shared = ecdh(local_secret, remote_public)?;
        let (sp, rp) = sender_receiver(inputs.mode, local_public, remote_public);
        let mut ctx = Vec::with_capacity(inputs.key_label.len() + 1 + 2 + rp.len() + 2 + sp.len());
        ctx.extend_from_slice(inputs.key_label);
        ctx.push(0);
        ctx.extend_from_slice(&(rp.len() as u16).to_be_bytes());
        ctx.extend_from_slice(rp);
        ctx.extend_from_slice(&(sp.len() as u16).to_be_bytes());
        ctx.extend_from_slice(sp);
        let owned = shared.to_vec();
        zeroize_secret(&mut shared);
        (owned, ctx)
    } else if let Some(key_id) = inputs.key_id {
        let key_map = inputs.key_map.ok_or(Error::UnableDetermineKey)?;
        let secret = key_map.resolve(key_id).ok_or(Error::UnableDetermineKey)?;
        (secret, Vec::new())
    } else {
        return Err(Error::UnableDetermineKey);
    };

    if let Some(auth_secret) = inputs.auth_secret {
        let mut mixed = vec![0u8; SECRET_LEN];
        hkdf_fill(auth_secret, &secret, AUTH_INFO, &mut mixed)?;
        secret = mixed;
    }

    Ok((secret, context))
}

/// `extractSecret`: the `aes128gcm` secret-resolution path (§4.1).
fn extract_secret_aes128gcm(inputs: &KeyInputs<'_>) -> Result<Vec<u8>> {
    if let Some(key) = inputs.key {
        if key.len() != KEY_LEN {
            return Err(Error::InvalidKeyLength);
        }
        return Ok(key.to_vec());
    }

    let Some(local_secret) = inputs.local_secret else {
        let key_map = inputs.key_map.ok_or(Error::UnableDetermineKey)?;
        let key_id = inputs.key_id.ok_or(Error::UnableDetermineKey)?;
        return key_map.resolve(key_id).ok_or(Error::UnableDetermineKey);
    };

    let auth_secret = inputs.auth_secret.ok_or(Error::NoAuthSecret)?;
    let remote_public = inputs.remote_public.ok_or(Error::UnableDetermineKey)?;
    let local_public = inputs.local_public.ok_or(Error::UnableDetermineKey)?;
    let mut shared = ecdh(local_secret, remote_public)?;
    let (sp, rp) = sender_receiver(inputs.mode, local_public, remote_public);

    let mut info = Vec::with_capacity(WEBPUSH_INFO.len() + rp.len() + sp.len());
    info.extend_from_slice(WEBPUSH_INFO);
    info.extend_from_slice(rp);
    info.extend_from_slice(sp);

    let mut secret = vec![0u8; SECRET_LEN];
    let result = hkdf_fill(auth_secret, &shared, &info, &mut secret);
    zeroize_secret(&mut shared);
    result?;
    Ok(secret)
}

/// Derives the per-message `(CEK, BaseNonce)` pair for `variant`, per
/// spec.md §4.1.
pub fn derive_key_and_nonce(
    variant: crate::Variant,
    salt: &[u8; 16],
    inputs: &KeyInputs<'_>,
) -> Result<(Cek, BaseNonce)> {
    let (secret, key_info, nonce_info) = match variant {
        crate::Variant::AesGcm => {
            let (secret, context) = extract_secret_and_context(inputs)?;
            let mut key_info = AESGCM_INFO.to_vec();
            key_info.extend_from_slice(&context);
            let mut nonce_info = NONCE_BASE_INFO.to_vec();
            nonce_info.extend_from_slice(&context);
            (secret, key_info, nonce_info)
        }
        crate::Variant::Aes128Gcm => {
            let secret = extract_secret_aes128gcm(inputs)?;
            (secret, AES128GCM_INFO.to_vec(), NONCE_BASE_INFO.to_vec())
        }
    };

    let mut secret = secret;
    let (_prk_bytes, hkdf) = Hkdf::<Sha256>::extract(Some(&salt[..]), &secret);
    secret.zeroize();

    let mut cek = Cek([0u8; KEY_LEN]);
    hkdf.expand(&key_info, &mut cek.0)?;

    let mut base_nonce = [0u8; 12];
    hkdf.expand(&nonce_info, &mut base_nonce)?;

    Ok((cek, base_nonce))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand_core::OsRng;

    #[test]
    fn ecdh_round_trips_between_two_parties() {
        let a = SecretKey::random(&mut OsRng);
        let b = SecretKey::random(&mut OsRng);
        let a_pub = public_key_bytes(&a);
        let b_pub = public_key_bytes(&b);

        let shared_a = ecdh(&a, &b_pub).unwrap();
        let shared_b = ecdh(&b, &a_pub).unwrap();
        assert_eq!(shared_a, shared_b);
    }

    #[test]
    fn explicit_key_must_be_sixteen_bytes() {
        let inputs = KeyInputs {
            key: Some(&[0u8; 15]),
            auth_secret: None,
            local_secret: None,
            local_public: None,
            remote_public: None,
            key_id: None,
            key_map: None,
            key_label: b"P-256",
            mode: Mode::Encrypt,
        };
        let err = derive_key_and_nonce(crate::Variant::Aes128Gcm, &[0u8; 16], &inputs).unwrap_err();
        assert!(matches!(err, Error::InvalidKeyLength));
    }

    #[test]
    fn no_inputs_is_unable_to_determine_key() {
        let inputs = KeyInputs {
            key: None,
            auth_secret: None,
            local_secret: None,
            local_public: None,
            remote_public: None,
            key_id: None,
            key_map: None,
            key_label: b"P-256",
            mode: Mode::Encrypt,
        };
        let err = derive_key_and_nonce(crate::Variant::AesGcm, &[0u8; 16], &inputs).unwrap_err();
        assert!(matches!(err, Error::UnableDetermineKey));
    }

    #[test]
    fn aes128gcm_ecdh_requires_auth_secret() {
        let local = SecretKey::random(&mut OsRng);
        let remote = SecretKey::random(&mut OsRng);
        let local_pub = public_key_bytes(&local);
        let remote_pub = public_key_bytes(&remote);
        let inputs = KeyInputs {
            key: None,
            auth_secret: None,
            local_secret: Some(&local),
            local_public: Some(&local_pub),
            remote_public: Some(&remote_pub),
            key_id: None,
            key_map: None,
            key_label: b"P-256",
            mode: Mode::Encrypt,
        };
        let err = derive_key_and_nonce(crate::Variant::Aes128Gcm, &[0u8; 16], &inputs).unwrap_err();
        assert!(matches!(err, Error::NoAuthSecret));
    }
}
