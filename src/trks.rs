//! # TRKS Chunk
//!
//! Two on-disk encodings selected by image type: the WOZ1 "V1" layout of
//! fixed 1280-byte records, and the WOZ2/MOOF "V2" layout of a 160-entry
//! descriptor table plus a block-addressed bitstream region. Grounded in
//! `img/woz1.rs`'s hand-written `impl DiskStruct for Trks` (variable
//! length, so not auto-derived) and `img/woz2.rs`'s `Trk`/`Trks` V2
//! layout.

use crate::error::ContainerError;
use crate::primitive;
use crate::track::Track;

const V1_RECORD_LEN: usize = 1280;
const V1_RAW_LEN: usize = 6646;
const V2_DESCRIPTOR_TABLE_LEN: usize = 1280;
const V2_DESCRIPTOR_COUNT: usize = 160;

/// The WOZ1-only bookkeeping fields that ride alongside each track's raw
/// bitstream; preserved so a WOZ1 image round-trips byte for byte.
#[derive(Clone, Copy, Debug)]
pub struct V1TrackMeta {
    pub bytes_used: u16,
    pub splice_point: u16,
    pub splice_nibble: u8,
    pub splice_bit_count: u8,
}

pub fn parse_v1(payload: &[u8]) -> Result<(Vec<Track>, Vec<V1TrackMeta>), ContainerError> {
    if payload.len() % V1_RECORD_LEN != 0 {
        return Err(ContainerError::BadTrks);
    }
    let mut tracks = Vec::new();
    let mut metas = Vec::new();
    for rec in payload.chunks(V1_RECORD_LEN) {
        let raw = rec[0..V1_RAW_LEN].to_vec();
        let bytes_used = primitive::le_u16(&rec[V1_RAW_LEN..V1_RAW_LEN + 2]);
        let bit_count = primitive::le_u16(&rec[V1_RAW_LEN + 2..V1_RAW_LEN + 4]);
        let splice_point = primitive::le_u16(&rec[V1_RAW_LEN + 4..V1_RAW_LEN + 6]);
        let splice_nibble = rec[V1_RAW_LEN + 6];
        let splice_bit_count = rec[V1_RAW_LEN + 7];
        if bytes_used as usize > V1_RAW_LEN {
            return Err(ContainerError::BadTrks);
        }
        if splice_point != 0xFFFF {
            if splice_point > bit_count {
                return Err(ContainerError::BadTrks);
            }
            if !matches!(splice_bit_count, 8 | 9 | 10) {
                return Err(ContainerError::BadTrks);
            }
        }
        tracks.push(Track::new(raw, bit_count as usize));
        metas.push(V1TrackMeta { bytes_used, splice_point, splice_nibble, splice_bit_count });
    }
    Ok((tracks, metas))
}

pub fn serialize_v1(tracks: &[Track], metas: &[V1TrackMeta]) -> Vec<u8> {
    let mut out = Vec::with_capacity(tracks.len() * V1_RECORD_LEN);
    for (t, m) in tracks.iter().zip(metas.iter()) {
        let mut raw = t.raw_bytes().to_vec();
        raw.resize(V1_RAW_LEN, 0);
        out.extend_from_slice(&raw);
        out.extend_from_slice(&primitive::put_le_u16(m.bytes_used));
        out.extend_from_slice(&primitive::put_le_u16(t.raw_count() as u16));
        out.extend_from_slice(&primitive::put_le_u16(m.splice_point));
        out.push(m.splice_nibble);
        out.push(m.splice_bit_count);
        out.extend_from_slice(&[0u8; 3]);
    }
    out
}

pub fn parse_v2(payload: &[u8]) -> Result<Vec<Track>, ContainerError> {
    if payload.len() < V2_DESCRIPTOR_TABLE_LEN {
        return Err(ContainerError::BadStartingBlock);
    }
    let mut tracks = Vec::new();
    for i in 0..V2_DESCRIPTOR_COUNT {
        let off = i * 8;
        let starting_block = primitive::le_u16(&payload[off..off + 2]);
        let block_count = primitive::le_u16(&payload[off + 2..off + 4]);
        let bit_count = primitive::le_u32(&payload[off + 4..off + 8]);
        if starting_block == 0 {
            if block_count != 0 || bit_count != 0 {
                return Err(ContainerError::BadStartingBlock);
            }
            break;
        }
        if starting_block == 1 || starting_block == 2 {
            return Err(ContainerError::BadStartingBlock);
        }
        let byte_off = V2_DESCRIPTOR_TABLE_LEN + (starting_block as usize - 3) * 512;
        let needed = block_count as usize * 512;
        if byte_off + needed > payload.len() {
            return Err(ContainerError::BadStartingBlock);
        }
        let raw = payload[byte_off..byte_off + needed].to_vec();
        if (bit_count as usize + 7) / 8 > raw.len() {
            return Err(ContainerError::BadBitCount);
        }
        tracks.push(Track::new(raw, bit_count as usize));
    }
    Ok(tracks)
}

pub fn serialize_v2(tracks: &[Track]) -> Vec<u8> {
    let mut descriptors: Vec<(u16, u16, u32)> = Vec::with_capacity(tracks.len());
    let mut bitstream = Vec::new();
    let mut cum_block: u16 = 3;
    for t in tracks {
        let blocks = ((t.raw_bytes().len() + 511) / 512) as u16;
        descriptors.push((cum_block, blocks, t.raw_count() as u32));
        let mut padded = t.raw_bytes().to_vec();
        padded.resize(blocks as usize * 512, 0);
        bitstream.extend_from_slice(&padded);
        cum_block += blocks;
    }
    let mut out = Vec::with_capacity(V2_DESCRIPTOR_TABLE_LEN + bitstream.len());
    for (sb, bc, bits) in &descriptors {
        out.extend_from_slice(&primitive::put_le_u16(*sb));
        out.extend_from_slice(&primitive::put_le_u16(*bc));
        out.extend_from_slice(&primitive::put_le_u32(*bits));
    }
    for _ in descriptors.len()..V2_DESCRIPTOR_COUNT {
        out.extend_from_slice(&[0u8; 8]);
    }
    out.extend_from_slice(&bitstream);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn v2_round_trip_single_track() {
        let track = Track::new(vec![0xAAu8; 700], 700 * 8 - 3);
        let bytes = serialize_v2(std::slice::from_ref(&track));
        let parsed = parse_v2(&bytes).unwrap();
        assert_eq!(parsed.len(), 1);
        assert_eq!(parsed[0].raw_count(), track.raw_count());
        assert_eq!(parsed[0].raw_bytes().len() % 512, 0);
    }

    #[test]
    fn v2_empty_table_terminates_immediately() {
        let parsed = parse_v2(&[0u8; V2_DESCRIPTOR_TABLE_LEN]).unwrap();
        assert!(parsed.is_empty());
    }

    #[test]
    fn v2_reserved_starting_block_rejected() {
        let mut payload = vec![0u8; V2_DESCRIPTOR_TABLE_LEN];
        payload[0..2].copy_from_slice(&primitive::put_le_u16(1));
        assert!(matches!(parse_v2(&payload), Err(ContainerError::BadStartingBlock)));
    }

    #[test]
    fn v1_round_trip_single_track() {
        let track = Track::new(vec![0x55u8; V1_RAW_LEN], 6000);
        let meta = V1TrackMeta { bytes_used: 6000 / 8, splice_point: 0xFFFF, splice_nibble: 0, splice_bit_count: 0 };
        let bytes = serialize_v1(std::slice::from_ref(&track), std::slice::from_ref(&meta));
        let (tracks, metas) = parse_v1(&bytes).unwrap();
        assert_eq!(tracks.len(), 1);
        assert_eq!(tracks[0].raw_count(), 6000);
        assert_eq!(metas[0].splice_point, 0xFFFF);
    }
}
