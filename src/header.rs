use byteorder::{BigEndian, ByteOrder};

use crate::error::{Error, Result};

/// Fixed salt length for both variants.
pub const SALT_LEN: usize = 16;

/// The `aes128gcm` binary header: `salt(16) || rs(be u32) || idlen(u8) ||
/// keyid(idlen)`.
#[derive(Clone, Debug)]
pub struct Header {
    pub salt: [u8; SALT_LEN],
    pub rs: u32,
    pub key_id: Vec<u8>,
}

impl Header {
    /// Appends the encoded header to `dst`.
    pub fn encode_into(&self, dst: &mut Vec<u8>) -> Result<()> {
        if self.key_id.len() > 255 {
            return Err(Error::KeyIdTooLong);
        }
        dst.extend_from_slice(&self.salt);
        let mut rs_be = [0u8; 4];
        BigEndian::write_u32(&mut rs_be, self.rs);
        dst.extend_from_slice(&rs_be);
        dst.push(self.key_id.len() as u8);
        dst.extend_from_slice(&self.key_id);
        Ok(())
    }

    /// Returns the encoded length of this header.
    pub fn encoded_len(&self) -> usize {
        SALT_LEN + 4 + 1 + self.key_id.len()
    }

    /// Parses a header from the front of `buf`, returning the header and
    /// the remaining (body) slice.
    pub fn parse(buf: &[u8]) -> Result<(Header, &[u8])> {
        if buf.len() < SALT_LEN + 4 + 1 {
            return Err(Error::Truncated);
        }
        let mut salt = [0u8; SALT_LEN];
        salt.copy_from_slice(&buf[..SALT_LEN]);
        let rs = BigEndian::read_u32(&buf[SALT_LEN..SALT_LEN + 4]);
        let idlen = buf[SALT_LEN + 4] as usize;
        let body_start = SALT_LEN + 4 + 1 + idlen;
        if buf.len() < body_start {
            return Err(Error::Truncated);
        }
        let key_id = buf[SALT_LEN + 4 + 1..body_start].to_vec();
        Ok((Header { salt, rs, key_id }, &buf[body_start..]))
    }
}
