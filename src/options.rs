use p256::SecretKey;

use crate::variant::Variant;

/// Default record size, per spec.md §6.
pub const DEFAULT_RECORD_SIZE: u32 = 4096;

/// Default key label, used only by the `aesgcm` context construction.
pub const DEFAULT_KEY_LABEL: &[u8] = b"P-256";

/// Resolves an opaque `keyId` to a raw secret. Implementations MUST
/// return `None` for unknown key ids rather than fabricating a secret.
pub trait KeyMap {
    /// Looks up the secret bound to `key_id`, or `None` if unknown.
    fn resolve(&self, key_id: &[u8]) -> Option<Vec<u8>>;
}

impl<F> KeyMap for F
where
    F: Fn(&[u8]) -> Option<Vec<u8>>,
{
    fn resolve(&self, key_id: &[u8]) -> Option<Vec<u8>> {
        self(key_id)
    }
}

/// Options for [`crate::encrypt`].
pub struct EncryptOptions<'a> {
    pub(crate) variant: Variant,
    pub(crate) rs: u32,
    pub(crate) salt: Option<[u8; 16]>,
    pub(crate) key: Option<&'a [u8]>,
    pub(crate) auth_secret: Option<&'a [u8]>,
    pub(crate) private_key: Option<&'a SecretKey>,
    pub(crate) dh: Option<&'a [u8]>,
    pub(crate) key_id: Option<&'a [u8]>,
    pub(crate) key_label: &'a [u8],
    pub(crate) key_map: Option<&'a dyn KeyMap>,
    pub(crate) pad: u32,
}

impl Default for EncryptOptions<'_> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a> EncryptOptions<'a> {
    /// Creates the default set of options: `aes128gcm`, `rs = 4096`, no
    /// padding, a freshly generated sender key pair and salt.
    pub const fn new() -> Self {
        Self {
            variant: Variant::Aes128Gcm,
            rs: DEFAULT_RECORD_SIZE,
            salt: None,
            key: None,
            auth_secret: None,
            private_key: None,
            dh: None,
            key_id: None,
            key_label: DEFAULT_KEY_LABEL,
            key_map: None,
            pad: 0,
        }
    }

    /// Selects the content coding. Defaults to `aes128gcm`.
    pub fn with_variant(&mut self, variant: Variant) -> &mut Self {
        self.variant = variant;
        self
    }

    /// Sets the wire record size. Defaults to 4096.
    pub fn with_record_size(&mut self, rs: u32) -> &mut Self {
        self.rs = rs;
        self
    }

    /// Pins the 16-byte HKDF salt instead of generating one.
    pub fn with_salt(&mut self, salt: [u8; 16]) -> &mut Self {
        self.salt = Some(salt);
        self
    }

    /// Sets an explicit 16-byte raw CEK-IKM, bypassing ECDH entirely.
    pub fn with_key(&mut self, key: &'a [u8]) -> &mut Self {
        self.key = Some(key);
        self
    }

    /// Sets the Web Push `authSecret`.
    pub fn with_auth_secret(&mut self, auth_secret: &'a [u8]) -> &mut Self {
        self.auth_secret = Some(auth_secret);
        self
    }

    /// Pins the sender's P-256 private key instead of generating one.
    pub fn with_private_key(&mut self, private_key: &'a SecretKey) -> &mut Self {
        self.private_key = Some(private_key);
        self
    }

    /// Sets the peer's uncompressed SEC1 P-256 public key.
    pub fn with_dh(&mut self, dh: &'a [u8]) -> &mut Self {
        self.dh = Some(dh);
        self
    }

    /// Sets an explicit keyId. For `aes128gcm` with ECDH this otherwise
    /// defaults to the sender's public key.
    pub fn with_key_id(&mut self, key_id: &'a [u8]) -> &mut Self {
        self.key_id = Some(key_id);
        self
    }

    /// Sets the `aesgcm` context key label. Defaults to `"P-256"`.
    pub fn with_key_label(&mut self, key_label: &'a [u8]) -> &mut Self {
        self.key_label = key_label;
        self
    }

    /// Sets the `keyId -> secret` resolver used when neither `key` nor a
    /// private key is supplied.
    pub fn with_key_map(&mut self, key_map: &'a dyn KeyMap) -> &mut Self {
        self.key_map = Some(key_map);
        self
    }

    /// Sets the additional plaintext padding budget, split across
    /// records per spec.md §4.2.
    pub fn with_pad(&mut self, pad: u32) -> &mut Self {
        self.pad = pad;
        self
    }

    /// Finalizes the options.
    pub fn build(self) -> Self {
        self
    }
}

/// Options for [`crate::decrypt`].
pub struct DecryptOptions<'a> {
    pub(crate) variant: Variant,
    pub(crate) rs: u32,
    pub(crate) salt: Option<[u8; 16]>,
    pub(crate) key: Option<&'a [u8]>,
    pub(crate) auth_secret: Option<&'a [u8]>,
    pub(crate) private_key: Option<&'a SecretKey>,
    pub(crate) dh: Option<&'a [u8]>,
    pub(crate) key_id: Option<&'a [u8]>,
    pub(crate) key_label: &'a [u8],
    pub(crate) key_map: Option<&'a dyn KeyMap>,
}

impl Default for DecryptOptions<'_> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a> DecryptOptions<'a> {
    /// Creates the default set of options: `aes128gcm`, `rs = 4096`.
    pub const fn new() -> Self {
        Self {
            variant: Variant::Aes128Gcm,
            rs: DEFAULT_RECORD_SIZE,
            salt: None,
            key: None,
            auth_secret: None,
            private_key: None,
            dh: None,
            key_id: None,
            key_label: DEFAULT_KEY_LABEL,
            key_map: None,
        }
    }

    /// Selects the content coding. `aesgcm` requires `salt`/`rs` to be
    /// set explicitly, since they travel via HTTP headers rather than
    /// on the wire.
    pub fn with_variant(&mut self, variant: Variant) -> &mut Self {
        self.variant = variant;
        self
    }

    /// Sets the wire record size. Ignored for `aes128gcm`, whose header
    /// carries the authoritative value.
    pub fn with_record_size(&mut self, rs: u32) -> &mut Self {
        self.rs = rs;
        self
    }

    /// Sets the 16-byte HKDF salt. Required for `aesgcm`; overridden by
    /// the header for `aes128gcm`.
    pub fn with_salt(&mut self, salt: [u8; 16]) -> &mut Self {
        self.salt = Some(salt);
        self
    }

    /// Sets an explicit 16-byte raw CEK-IKM, bypassing ECDH entirely.
    pub fn with_key(&mut self, key: &'a [u8]) -> &mut Self {
        self.key = Some(key);
        self
    }

    /// Sets the Web Push `authSecret`.
    pub fn with_auth_secret(&mut self, auth_secret: &'a [u8]) -> &mut Self {
        self.auth_secret = Some(auth_secret);
        self
    }

    /// Pins the receiver's P-256 private key instead of generating one.
    pub fn with_private_key(&mut self, private_key: &'a SecretKey) -> &mut Self {
        self.private_key = Some(private_key);
        self
    }

    /// Sets the peer's uncompressed SEC1 P-256 public key. For
    /// `aes128gcm`, ignored in favor of the header `keyId`.
    pub fn with_dh(&mut self, dh: &'a [u8]) -> &mut Self {
        self.dh = Some(dh);
        self
    }

    /// Sets the expected keyId for `aesgcm`. Ignored for `aes128gcm`,
    /// where the header's keyId is authoritative.
    pub fn with_key_id(&mut self, key_id: &'a [u8]) -> &mut Self {
        self.key_id = Some(key_id);
        self
    }

    /// Sets the `aesgcm` context key label. Defaults to `"P-256"`.
    pub fn with_key_label(&mut self, key_label: &'a [u8]) -> &mut Self {
        self.key_label = key_label;
        self
    }

    /// Sets the `keyId -> secret` resolver used when neither `key` nor a
    /// private key is supplied.
    pub fn with_key_map(&mut self, key_map: &'a dyn KeyMap) -> &mut Self {
        self.key_map = Some(key_map);
        self
    }

    /// Finalizes the options.
    pub fn build(self) -> Self {
        self
    }
}
