use aead::{Aead, KeyInit};
use aes_gcm::Aes128Gcm as Aes128GcmCipher;
use p256::SecretKey;
use rand_core::{CryptoRng, RngCore};

use crate::{
    error::{Error, Result},
    header::Header,
    keys::{self, KeyInputs, Mode},
    nonce,
    options::EncryptOptions,
    pad,
    variant::Variant,
};

const MAX_RS: u32 = i32::MAX as u32;

/// Encrypts `plaintext` under `opts`, returning the self-framed ciphertext.
///
/// For `aes128gcm` the returned buffer opens with the RFC 8188 header
/// (salt, `rs`, keyId); for `aesgcm` it is just the concatenated record
/// bodies, since salt/`rs`/keyId travel out of band.
pub fn encrypt<R: RngCore + CryptoRng>(
    plaintext: &[u8],
    rng: &mut R,
    opts: &EncryptOptions<'_>,
) -> Result<Vec<u8>> {
    let variant = opts.variant;
    let overhead = variant.overhead();
    if (opts.rs as usize) < overhead + 1 || opts.rs > MAX_RS {
        return Err(Error::InvalidRecordSize);
    }

    let use_keymap = opts.key.is_none()
        && opts.private_key.is_none()
        && opts.dh.is_none()
        && opts.key_id.is_some()
        && opts.key_map.is_some();
    let ecdh_in_use = opts.key.is_none() && !use_keymap;

    let generated;
    let (local_secret, local_public): (Option<&SecretKey>, Option<[u8; 65]>) = if !ecdh_in_use {
        (None, None)
    } else if let Some(k) = opts.private_key {
        (Some(k), Some(keys::public_key_bytes(k)))
    } else {
        generated = SecretKey::random(rng);
        (Some(&generated), Some(keys::public_key_bytes(&generated)))
    };

    let mut key_id = opts.key_id.map(<[u8]>::to_vec);
    if variant == Variant::Aes128Gcm && key_id.is_none() && ecdh_in_use {
        key_id = local_public.map(|p| p.to_vec());
    }

    let salt = match opts.salt {
        Some(salt) => salt,
        None => {
            let mut salt = [0u8; 16];
            rng.try_fill_bytes(&mut salt)?;
            salt
        }
    };

    let inputs = KeyInputs {
        key: opts.key,
        auth_secret: opts.auth_secret,
        local_secret,
        local_public: local_public.as_ref().map(|p| &p[..]),
        remote_public: opts.dh,
        key_id: key_id.as_deref(),
        key_map: opts.key_map,
        key_label: opts.key_label,
        mode: Mode::Encrypt,
    };
    let (cek, base_nonce) = keys::derive_key_and_nonce(variant, &salt, &inputs)?;
    let cipher = Aes128GcmCipher::new_from_slice(&cek.0).map_err(|_| Error::InvalidKeyLength)?;

    let base_record_size = pad::base_record_size(opts.rs as usize, variant);
    let record_overhead = 16;
    let max_records = plaintext.len() / base_record_size + opts.pad as usize / base_record_size + 2;

    let header_len = match variant {
        Variant::Aes128Gcm => 16 + 4 + 1 + key_id.as_ref().map(Vec::len).unwrap_or(0),
        Variant::AesGcm => 0,
    };
    let mut out = Vec::with_capacity(header_len + max_records * (opts.rs as usize + record_overhead));

    if variant == Variant::Aes128Gcm {
        let header = Header {
            salt,
            rs: opts.rs,
            key_id: key_id.unwrap_or_default(),
        };
        header.encode_into(&mut out)?;
    }

    let plaintext_len = plaintext.len();
    let mut start = 0usize;
    let mut counter = 0u32;
    let mut remaining_pad = opts.pad;
    let mut record_buf = Vec::new();
    loop {
        let has_data = start < plaintext_len;
        let record_pad = pad::split_pad(remaining_pad, base_record_size, has_data, variant);
        remaining_pad -= record_pad;

        let mut end = start + base_record_size - record_pad as usize;
        let last = match variant {
            Variant::Aes128Gcm => end >= plaintext_len && remaining_pad == 0,
            Variant::AesGcm => end > plaintext_len && remaining_pad == 0,
        };
        if end > plaintext_len {
            end = plaintext_len;
        }

        let data = &plaintext[start..end];
        let block_len = data.len() + variant.pad_size() + record_pad as usize;
        record_buf.resize(block_len, 0);
        pad::write_padded(&mut record_buf, data, record_pad, last, variant);

        let nonce_bytes = nonce::record_nonce(&base_nonce, counter);
        let sealed = cipher
            .encrypt(aead::Nonce::<Aes128GcmCipher>::from_slice(&nonce_bytes), record_buf.as_slice())
            .map_err(Error::from)?;
        out.extend_from_slice(&sealed);

        start = end;
        if last {
            break;
        }
        counter = nonce::next_counter(counter)?;
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decrypt::decrypt;
    use crate::options::DecryptOptions;
    use rand_core::OsRng;

    #[test]
    fn aes128gcm_ecdh_round_trips_through_decrypt() {
        let receiver = SecretKey::random(&mut OsRng);
        let receiver_pub = keys::public_key_bytes(&receiver);
        let auth_secret = [0x42u8; 16];

        let mut encrypt_opts = EncryptOptions::new();
        encrypt_opts
            .with_dh(&receiver_pub)
            .with_auth_secret(&auth_secret);
        let ciphertext = encrypt(b"hello world", &mut OsRng, &encrypt_opts).unwrap();

        let mut decrypt_opts = DecryptOptions::new();
        decrypt_opts
            .with_private_key(&receiver)
            .with_auth_secret(&auth_secret);
        let plaintext = decrypt(&ciphertext, &decrypt_opts).unwrap();
        assert_eq!(plaintext, b"hello world");
    }

    #[test]
    fn explicit_raw_key_round_trips() {
        let key = [0x11u8; 16];
        let salt = [0x22u8; 16];

        let mut encrypt_opts = EncryptOptions::new();
        encrypt_opts.with_key(&key).with_salt(salt).with_record_size(24);
        let ciphertext = encrypt(b"0123456789", &mut OsRng, &encrypt_opts).unwrap();

        let mut decrypt_opts = DecryptOptions::new();
        decrypt_opts.with_key(&key);
        let plaintext = decrypt(&ciphertext, &decrypt_opts).unwrap();
        assert_eq!(plaintext, b"0123456789");
    }

    #[test]
    fn empty_plaintext_still_emits_one_record() {
        let key = [0x33u8; 16];
        let mut encrypt_opts = EncryptOptions::new();
        encrypt_opts.with_key(&key);
        let ciphertext = encrypt(b"", &mut OsRng, &encrypt_opts).unwrap();

        let mut decrypt_opts = DecryptOptions::new();
        decrypt_opts.with_key(&key);
        let plaintext = decrypt(&ciphertext, &decrypt_opts).unwrap();
        assert!(plaintext.is_empty());
    }

    #[test]
    fn rejects_record_size_below_overhead() {
        let key = [0x44u8; 16];
        let mut opts = EncryptOptions::new();
        opts.with_key(&key).with_record_size(10);
        assert!(matches!(
            encrypt(b"x", &mut OsRng, &opts),
            Err(Error::InvalidRecordSize)
        ));
    }

    #[test]
    fn padding_budget_is_fully_consumed() {
        let key = [0x55u8; 16];
        let mut encrypt_opts = EncryptOptions::new();
        encrypt_opts
            .with_key(&key)
            .with_record_size(24)
            .with_pad(40);
        let ciphertext = encrypt(b"hello", &mut OsRng, &encrypt_opts).unwrap();

        let mut decrypt_opts = DecryptOptions::new();
        decrypt_opts.with_key(&key);
        let plaintext = decrypt(&ciphertext, &decrypt_opts).unwrap();
        assert_eq!(plaintext, b"hello");
    }

    #[test]
    fn aesgcm_round_trips_with_explicit_salt_and_rs() {
        let key = [0x66u8; 16];
        let salt = [0x77u8; 16];

        let mut encrypt_opts = EncryptOptions::new();
        encrypt_opts
            .with_variant(Variant::AesGcm)
            .with_key(&key)
            .with_salt(salt)
            .with_record_size(18);
        let ciphertext = encrypt(b"push message", &mut OsRng, &encrypt_opts).unwrap();

        let mut decrypt_opts = DecryptOptions::new();
        decrypt_opts
            .with_variant(Variant::AesGcm)
            .with_key(&key)
            .with_salt(salt)
            .with_record_size(18);
        let plaintext = decrypt(&ciphertext, &decrypt_opts).unwrap();
        assert_eq!(plaintext, b"push message");
    }
}
