use aead::{Aead, KeyInit};
use aes_gcm::Aes128Gcm as Aes128GcmCipher;
use p256::SecretKey;

use crate::{
    error::{Error, Result},
    header::Header,
    keys::{self, KeyInputs, Mode},
    nonce,
    options::DecryptOptions,
    pad,
    variant::Variant,
};

const MAX_RS: u32 = i32::MAX as u32;

/// Decrypts `ciphertext` under `opts`, reversing [`crate::encrypt`].
///
/// For `aes128gcm` the header (salt, `rs`, keyId) is read from the front
/// of `ciphertext`, overriding anything set on `opts`. For `aesgcm`,
/// `salt` and `rs` must be supplied on `opts`, since they travel via HTTP
/// headers rather than on the wire.
pub fn decrypt(ciphertext: &[u8], opts: &DecryptOptions<'_>) -> Result<Vec<u8>> {
    let variant = opts.variant;

    let (salt, rs, header_key_id, body) = match variant {
        Variant::Aes128Gcm => {
            let (header, body) = Header::parse(ciphertext)?;
            (header.salt, header.rs, Some(header.key_id), body)
        }
        Variant::AesGcm => {
            let salt = opts.salt.ok_or(Error::InvalidSaltLength)?;
            (salt, opts.rs, None, ciphertext)
        }
    };

    let overhead = variant.overhead();
    if (rs as usize) < overhead + 1 || rs > MAX_RS {
        return Err(Error::InvalidRecordSize);
    }

    let use_keymap =
        opts.key.is_none() && opts.private_key.is_none() && opts.dh.is_none() && opts.key_map.is_some();
    let ecdh_in_use = opts.key.is_none() && !use_keymap;

    let local_secret: Option<&SecretKey> = if !ecdh_in_use {
        None
    } else {
        Some(opts.private_key.ok_or(Error::UnableDetermineKey)?)
    };
    let local_public = local_secret.map(keys::public_key_bytes);

    let remote_public: Option<Vec<u8>> = if ecdh_in_use {
        match variant {
            Variant::Aes128Gcm => {
                let key_id = header_key_id.clone().unwrap_or_default();
                if key_id.len() != 65 {
                    return Err(Error::EcdhFailure);
                }
                Some(key_id)
            }
            Variant::AesGcm => opts.dh.map(<[u8]>::to_vec),
        }
    } else {
        None
    };

    let key_id_for_lookup: Option<Vec<u8>> = match variant {
        Variant::Aes128Gcm => header_key_id,
        Variant::AesGcm => opts.key_id.map(<[u8]>::to_vec),
    };

    let inputs = KeyInputs {
        key: opts.key,
        auth_secret: opts.auth_secret,
        local_secret,
        local_public: local_public.as_ref().map(|p| &p[..]),
        remote_public: remote_public.as_deref(),
        key_id: key_id_for_lookup.as_deref(),
        key_map: opts.key_map,
        key_label: opts.key_label,
        mode: Mode::Decrypt,
    };
    let (cek, base_nonce) = keys::derive_key_and_nonce(variant, &salt, &inputs)?;
    let cipher = Aes128GcmCipher::new_from_slice(&cek.0).map_err(|_| Error::InvalidKeyLength)?;

    let cipher_record_len = match variant {
        Variant::Aes128Gcm => rs as usize,
        Variant::AesGcm => rs as usize + 16,
    };

    let content_len = body.len();
    if content_len == 0 {
        return Err(Error::Truncated);
    }

    let mut out = Vec::with_capacity(content_len);
    let mut start = 0usize;
    let mut counter = 0u32;
    loop {
        let full_end = start + cipher_record_len;
        if variant == Variant::AesGcm && full_end == content_len {
            return Err(Error::Truncated);
        }
        let end = full_end.min(content_len);
        let last = end >= content_len;
        let chunk = &body[start..end];

        let nonce_bytes = nonce::record_nonce(&base_nonce, counter);
        let block = cipher
            .decrypt(aead::Nonce::<Aes128GcmCipher>::from_slice(&nonce_bytes), chunk)
            .map_err(Error::from)?;
        let data = pad::strip_padding(&block, last, variant)?;
        out.extend_from_slice(data);

        start = end;
        if last {
            break;
        }
        counter = nonce::next_counter(counter)?;
    }

    Ok(out)
}
