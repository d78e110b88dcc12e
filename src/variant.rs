use core::fmt;

/// Which content coding to use when framing a message.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum Variant {
    /// RFC 8188 `aes128gcm`. Carries a binary header (salt, record size,
    /// keyid) as the first bytes of the message.
    Aes128Gcm,
    /// The older `aesgcm` draft used by RFC 8291. Salt, record size and
    /// keyid travel out of band (HTTP headers); only the record body is
    /// covered by this crate.
    AesGcm,
}

impl Variant {
    /// Per-record padding overhead: the number of bytes the padding
    /// scheme itself consumes, before the AEAD tag.
    pub const fn pad_size(&self) -> usize {
        match self {
            Variant::Aes128Gcm => 1,
            Variant::AesGcm => 2,
        }
    }

    /// Bytes of non-plaintext framing in a record: padding plus the
    /// 16-byte GCM tag.
    pub const fn overhead(&self) -> usize {
        self.pad_size() + 16
    }
}

impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Variant::Aes128Gcm => "aes128gcm",
            Variant::AesGcm => "aesgcm",
        };
        write!(f, "{s}")
    }
}
