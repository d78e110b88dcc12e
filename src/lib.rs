//! **http-ece** implements RFC 8188 HTTP Encrypted Content-Encoding
//! (`aes128gcm`) and the older `aesgcm` Web Push draft encoding that
//! RFC 8291 relies on.
//!
//! Both codings break a plaintext into fixed-size records, seal each
//! with AES-128-GCM under a key and nonce derived via HKDF from a salt
//! and an input keying material, and concatenate the sealed records
//! into a single self-framed ciphertext. `aes128gcm` additionally
//! prefixes the ciphertext with a binary header carrying the salt,
//! record size and an opaque key identifier; `aesgcm` expects those
//! three values to travel out of band (typically HTTP headers) and
//! operates on the record body alone.
//!
//! ```
//! use http_ece::{encrypt, decrypt, EncryptOptions, DecryptOptions};
//! use rand_core::OsRng;
//!
//! let key = [0x42u8; 16];
//! let mut encrypt_opts = EncryptOptions::new();
//! encrypt_opts.with_key(&key);
//! let ciphertext = encrypt(b"hello", &mut OsRng, &encrypt_opts).unwrap();
//!
//! let mut decrypt_opts = DecryptOptions::new();
//! decrypt_opts.with_key(&key);
//! let plaintext = decrypt(&ciphertext, &decrypt_opts).unwrap();
//! assert_eq!(plaintext, b"hello");
//! ```
//!
//! [rfc8188]: https://datatracker.ietf.org/doc/html/rfc8188
//! [rfc8291]: https://datatracker.ietf.org/doc/html/rfc8291

#![deny(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms)]

mod decrypt;
mod encrypt;
mod error;
mod header;
mod keys;
mod nonce;
mod options;
mod pad;
mod variant;

pub use decrypt::decrypt;
pub use encrypt::encrypt;
pub use error::{Error, Result};
pub use options::{DecryptOptions, EncryptOptions, KeyMap};
pub use variant::Variant;
