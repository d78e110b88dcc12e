use byteorder::{BigEndian, ByteOrder};

use crate::{
    error::{Error, Result},
    variant::Variant,
};

/// `aesgcm`'s pad length field is 16 bits wide.
const AESGCM_MAX_PAD: u32 = 65535;

/// The plaintext capacity of a non-last record: `rs` minus the bytes each
/// variant spends on framing before the AEAD tag is added. For
/// `aes128gcm`, `rs` already counts the 16-byte tag, so it's subtracted
/// here; for `aesgcm`, the tag rides outside `rs`, so only the pad-length
/// prefix is subtracted.
pub fn base_record_size(rs: usize, variant: Variant) -> usize {
    match variant {
        Variant::Aes128Gcm => rs - variant.overhead(),
        Variant::AesGcm => rs - variant.pad_size(),
    }
}

/// Splits the remaining pad budget across one record, following the
/// greedy per-record cap: `min(baseRecordSize - 1, remainingPad)`,
/// further capped to 65535 for `aesgcm`, bumped to 1 in the perverse case
/// where the formula would otherwise yield 0 despite pad remaining.
///
/// The `- 1` only reserves room for a data byte while there is still
/// plaintext left to place in this record (`has_data`); once the
/// plaintext is exhausted and only the pad budget remains, a record can
/// be padding from end to end, so the full `base_record_size` is
/// available.
pub fn split_pad(remaining_pad: u32, base_record_size: usize, has_data: bool, variant: Variant) -> u32 {
    if remaining_pad == 0 {
        return 0;
    }
    let mut cap = base_record_size as u32;
    if has_data {
        cap = cap.saturating_sub(1);
    }
    if variant == Variant::AesGcm {
        cap = cap.min(AESGCM_MAX_PAD);
    }
    let mut record_pad = cap.min(remaining_pad);
    if record_pad == 0 {
        record_pad = 1;
    }
    record_pad
}

/// Writes one record's padded plaintext block into `dst`, which must be
/// exactly `data.len() + variant.pad_size() + record_pad as usize` long.
pub fn write_padded(dst: &mut [u8], data: &[u8], record_pad: u32, last: bool, variant: Variant) {
    match variant {
        Variant::Aes128Gcm => {
            dst[..data.len()].copy_from_slice(data);
            dst[data.len()] = if last { 0x02 } else { 0x01 };
            for b in &mut dst[data.len() + 1..] {
                *b = 0;
            }
        }
        Variant::AesGcm => {
            let pad = record_pad as usize;
            BigEndian::write_u16(&mut dst[0..2], pad as u16);
            for b in &mut dst[2..2 + pad] {
                *b = 0;
            }
            dst[2 + pad..].copy_from_slice(data);
        }
    }
}

/// Strips padding from a decrypted record, returning the plaintext slice.
pub fn strip_padding(block: &[u8], last: bool, variant: Variant) -> Result<&[u8]> {
    match variant {
        Variant::Aes128Gcm => {
            let mut i = block.len();
            loop {
                if i == 0 {
                    return Err(Error::AllZeroPlaintext);
                }
                i -= 1;
                if block[i] != 0 {
                    break;
                }
            }
            let want = if last { 0x02 } else { 0x01 };
            if block[i] != want {
                return Err(if last {
                    Error::InvalidPaddingLast
                } else {
                    Error::InvalidPaddingNonLast
                });
            }
            Ok(&block[..i])
        }
        Variant::AesGcm => {
            if block.len() < 2 {
                return Err(Error::Truncated);
            }
            let pad = BigEndian::read_u16(&block[0..2]) as usize;
            if 2 + pad > block.len() {
                return Err(Error::Truncated);
            }
            Ok(&block[2 + pad..])
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_pad_basic() {
        // rs = 24, overhead = 17 (aes128gcm) -> base_record_size = 7.
        assert_eq!(split_pad(40, 7, true, Variant::Aes128Gcm), 6);
        assert_eq!(split_pad(0, 7, true, Variant::Aes128Gcm), 0);
    }

    #[test]
    fn split_pad_perverse_case_bumps_to_one() {
        // base_record_size = 1 -> cap would be 0, but pad remains, so we
        // must still emit a 1-byte pad record rather than stalling.
        assert_eq!(split_pad(5, 1, true, Variant::Aes128Gcm), 1);
    }

    #[test]
    fn split_pad_without_data_uses_full_record_capacity() {
        // Once the plaintext is exhausted a record can be pad end to end;
        // the `- 1` reservation for a data byte no longer applies.
        assert_eq!(split_pad(40, 7, false, Variant::Aes128Gcm), 7);
    }

    #[test]
    fn split_pad_aesgcm_caps_at_65535() {
        assert_eq!(
            split_pad(1_000_000, usize::MAX / 2, true, Variant::AesGcm),
            AESGCM_MAX_PAD
        );
    }

    #[test]
    fn pad_budget_accounting_example_s6() {
        // 5 plaintext bytes, rs = 24, pad = 40 -> 7 records, matching
        // spec.md S6: 6 full-size records (one data byte + 6 pad bytes
        // each) followed by a shorter, pad-only terminal record.
        let base_record_size = 24 - Variant::Aes128Gcm.overhead();
        assert_eq!(base_record_size, 7);
        let mut remaining = 40u32;
        let mut records = 0;
        let mut consumed = 0u64;
        let mut start = 0usize;
        let plaintext_len = 5usize;
        loop {
            let has_data = start < plaintext_len;
            let record_pad = split_pad(remaining, base_record_size, has_data, Variant::Aes128Gcm);
            remaining -= record_pad;
            consumed += record_pad as u64;
            let unclamped_end = start + base_record_size - record_pad as usize;
            let last = unclamped_end >= plaintext_len && remaining == 0;
            records += 1;
            start = unclamped_end.min(plaintext_len);
            if last {
                break;
            }
        }
        assert_eq!(records, 7);
        assert_eq!(consumed, 40);
    }

    #[test]
    fn aes128gcm_padding_round_trip() {
        let data = b"hello";
        let mut buf = vec![0u8; data.len() + Variant::Aes128Gcm.pad_size() + 3];
        write_padded(&mut buf, data, 3, true, Variant::Aes128Gcm);
        assert_eq!(strip_padding(&buf, true, Variant::Aes128Gcm).unwrap(), data);
    }

    #[test]
    fn aes128gcm_non_last_delimiter_rejected_as_last() {
        let data = b"hi";
        let mut buf = vec![0u8; data.len() + 1];
        write_padded(&mut buf, data, 0, false, Variant::Aes128Gcm);
        assert!(matches!(
            strip_padding(&buf, true, Variant::Aes128Gcm),
            Err(Error::InvalidPaddingLast)
        ));
    }

    #[test]
    fn aes128gcm_all_zero_block_rejected() {
        let buf = vec![0u8; 8];
        assert!(matches!(
            strip_padding(&buf, true, Variant::Aes128Gcm),
            Err(Error::AllZeroPlaintext)
        ));
    }

    #[test]
    fn aesgcm_padding_round_trip() {
        let data = b"naukio";
        let mut buf = vec![0u8; 2 + 24 + data.len()];
        write_padded(&mut buf, data, 24, false, Variant::AesGcm);
        assert_eq!(strip_padding(&buf, false, Variant::AesGcm).unwrap(), data);
    }

    #[test]
    fn aesgcm_oversized_pad_field_is_truncated_error() {
        let mut buf = [0u8; 4];
        BigEndian::write_u16(&mut buf[0..2], 100);
        assert!(matches!(
            strip_padding(&buf, false, Variant::AesGcm),
            Err(Error::Truncated)
        ));
    }
}
