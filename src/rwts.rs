//! # GCR RWTS Decoder (3.5-inch)
//!
//! Sector-hunt state machine over a `Track` cursor: finds address and
//! data fields, validates the three-way checksum, and reports recovered
//! sectors plus a structured event log. Grounded in
//! `img/disk35.rs`'s `TrackBits`/`decode_sector_62`/`decode_addr`
//! (the 6-and-2 nibble table and general field-hunting shape) and
//! `original_source/moofimage.py`'s `MoofRWTS`/`MoofDiskImage` (the exact
//! three-way checksum and PACE/E7 detection this decoder implements).

use crate::error::RwtsError;
use crate::track::Track;

pub const ADDRESS_PROLOGUE: [u8; 3] = [0xD5, 0xAA, 0x96];
pub const ADDRESS_EPILOGUE: [u8; 2] = [0xDE, 0xAA];
pub const DATA_PROLOGUE: [u8; 3] = [0xD5, 0xAA, 0xAD];
pub const DATA_EPILOGUE: [u8; 2] = [0xDE, 0xAA];

const PACE_PROLOGUE_FF_RUN: usize = 12;
const PACE_MARKER: [u8; 4] = [0xAB, 0xCD, 0xEF, 0xEF];

const E7_BYTESTREAM: [u8; 20] = [
    0x2B, 0x00, 0x2B, 0xFD, 0x83, 0x6F, 0x20, 0xE2, 0x8D, 0x99, 0x49, 0x44, 0x47, 0x82, 0xD9, 0x26,
    0xFB, 0xC6, 0x03, 0xF8,
];
const E7_OFFSET: usize = 0x18F;

/// Same 64-entry 6-and-2 table as `img/disk35.rs::DISK_BYTES_62`: index is
/// the 6-bit payload value, entry is the disk nibble that carries it.
pub const DISK_BYTES_62: [u8; 64] = [
    0x96, 0x97, 0x9a, 0x9b, 0x9d, 0x9e, 0x9f, 0xa6, 0xa7, 0xab, 0xac, 0xad, 0xae, 0xaf, 0xb2, 0xb3,
    0xb4, 0xb5, 0xb6, 0xb7, 0xb9, 0xba, 0xbb, 0xbc, 0xbd, 0xbe, 0xbf, 0xcb, 0xcd, 0xce, 0xcf, 0xd3,
    0xd6, 0xd7, 0xd9, 0xda, 0xdb, 0xdc, 0xdd, 0xde, 0xdf, 0xe5, 0xe6, 0xe7, 0xe9, 0xea, 0xeb, 0xec,
    0xed, 0xee, 0xef, 0xf2, 0xf3, 0xf4, 0xf5, 0xf6, 0xf7, 0xf9, 0xfa, 0xfb, 0xfc, 0xfd, 0xfe, 0xff,
];

pub const ZONED_SECS_PER_TRACK: [usize; 5] = [12, 11, 10, 9, 8];

fn invert_table() -> [Option<u8>; 256] {
    let mut table = [None; 256];
    for (six_bit, &disk_nibble) in DISK_BYTES_62.iter().enumerate() {
        table[disk_nibble as usize] = Some(six_bit as u8);
    }
    table
}

/// `track_id` is grouped into bands of 0x20 physical track IDs (band 0
/// gets 12 sectors, ... band 4 gets 8); IDs beyond 0x9F are out of range.
pub fn sectors_per_track(track_id: u8) -> Option<usize> {
    if track_id > 0x9F {
        return None;
    }
    Some(ZONED_SECS_PER_TRACK[(track_id as usize) / 0x20])
}

#[derive(Clone, Copy, Debug)]
pub struct MoofAddressField {
    pub volume: u8,
    pub track_id: u8,
    pub sector_id: u8,
    pub valid: bool,
}

#[derive(Clone, Debug)]
pub struct MoofDataField {
    pub valid: bool,
    pub sector_id: u8,
    pub tags: [u8; 12],
    pub data: [u8; 512],
}

#[derive(Clone, Debug)]
pub struct MoofBlock {
    pub address: MoofAddressField,
    pub data: MoofDataField,
}

#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    AddressChecksum,
    BadTrackId,
    BadSectorId,
    BadAddrEpilogue,
    DataChecksum,
    SectorIdMismatch,
    BadDataEpilogue,
    InvalidNibble,
    SectorCountShort { expected: usize, got: usize },
    PaceKeyFound { key: String },
    E7Found,
}

fn read_translated_nibble(track: &mut Track, inv: &[Option<u8>; 256]) -> Result<u8, RwtsError> {
    let raw = track.nibble();
    inv[raw as usize].ok_or(RwtsError::InvalidNibble)
}

fn verify_literal(track: &mut Track, expected: &[u8]) -> bool {
    for &want in expected {
        if track.nibble() != want {
            return false;
        }
    }
    true
}

fn read_address_field(track: &mut Track, inv: &[Option<u8>; 256]) -> Result<MoofAddressField, RwtsError> {
    let h0 = read_translated_nibble(track, inv)?;
    let sector_id = read_translated_nibble(track, inv)?;
    let h2 = read_translated_nibble(track, inv)?;
    let volume = read_translated_nibble(track, inv)?;
    let checksum = read_translated_nibble(track, inv)?;
    let valid = (h0 ^ sector_id ^ h2 ^ volume) == checksum;
    let track_id = (((h0 as u16) << 1) | (((h2 as u16) & 1) << 7) | (((h2 as u16) & 0x20) >> 5)) as u8;
    Ok(MoofAddressField { volume, track_id, sector_id, valid })
}

/// Decodes the 700-nibble data field body (175 groups of 4) through the
/// three-way checksum decoder, then validates the high-bit recovery
/// nibble and the three trailing low-6-bit checksum nibbles.
fn read_data_field(track: &mut Track, inv: &[Option<u8>; 256]) -> Result<MoofDataField, RwtsError> {
    let sector_id = read_translated_nibble(track, inv)?;

    let mut groups = [[0u8; 4]; 175];
    for g in groups.iter_mut() {
        for slot in g.iter_mut() {
            *slot = read_translated_nibble(track, inv)?;
        }
    }
    let nibble_700 = groups[174][3];

    let mut encoded = [0u8; 525];
    for (i, g) in groups.iter().enumerate() {
        let (a, b, c, d) = (g[0] as u16, g[1], g[2], g[3]);
        encoded[i * 3] = (b & 0x3F) | ((a << 2) & 0xC0) as u8;
        encoded[i * 3 + 1] = (c & 0x3F) | ((a << 4) & 0xC0) as u8;
        encoded[i * 3 + 2] = (d & 0x3F) | ((a << 6) & 0xC0) as u8;
    }

    let (plaintext, c1, c2, c3) = decode_checksum_stream(&encoded);

    let high_bits = (((c1 >> 6) & 3) | ((c2 >> 4) & 0x30) | ((c3 >> 2) & 0xC0)) as u8;
    let mut valid = nibble_700 == high_bits;

    let t_c3 = read_translated_nibble(track, inv)?;
    let t_c2 = read_translated_nibble(track, inv)?;
    let t_c1 = read_translated_nibble(track, inv)?;
    valid = valid
        && t_c3 == (c3 & 0x3F) as u8
        && t_c2 == (c2 & 0x3F) as u8
        && t_c1 == (c1 & 0x3F) as u8;

    let mut tags = [0u8; 12];
    tags.copy_from_slice(&plaintext[0..12]);
    let mut data = [0u8; 512];
    data.copy_from_slice(&plaintext[12..524]);

    Ok(MoofDataField { valid, sector_id, tags, data })
}

/// The three-way checksum decoder from spec step 4: runs `c1, c2, c3`
/// across all 175 triples of the 525-byte encoded stream, emitting 525
/// bytes but keeping only the first 524 as plaintext (12 tag + 512 data).
/// Returns the final checksum state for the step-5 trailer validation.
fn decode_checksum_stream(encoded: &[u8; 525]) -> ([u8; 525], u32, u32, u32) {
    let mut c1: u32 = 0;
    let mut c2: u32 = 0;
    let mut c3: u32 = 0;
    let mut plaintext = [0u8; 525];
    for (i, triple) in encoded.chunks(3).enumerate() {
        let d0 = triple[0] as u32;
        let d1 = triple[1] as u32;
        let d2 = triple[2] as u32;

        c1 = (c1 << 1) & 0x1FF;
        if c1 > 0xFF {
            c1 -= 0xFF;
            c3 += 1;
        }
        let b0 = d0 ^ c1;
        c3 += b0;
        plaintext[i * 3] = b0 as u8;

        if c3 > 0xFF {
            c3 &= 0xFF;
            c2 += 1;
        }
        let b1 = d1 ^ c3;
        c2 += b1;
        plaintext[i * 3 + 1] = b1 as u8;

        if c2 > 0xFF {
            c2 &= 0xFF;
            c1 += 1;
        }
        let b2 = d2 ^ c2;
        c1 += b2;
        plaintext[i * 3 + 2] = b2 as u8;
    }
    (plaintext, c1, c2, c3)
}

fn bit_compress(word: u16) -> u8 {
    let masked = word & 0x5555;
    let mut out = 0u8;
    for i in 0..8 {
        if masked & (1 << (2 * i)) != 0 {
            out |= 1 << i;
        }
    }
    out
}

/// At `track`'s current position (expected to be the saved pre-search
/// cursor), checks for the PACE protection marker and, if found, decodes
/// its trailing 4 big-endian words into a hex key. Restores the cursor
/// and returns `None` on no match.
fn try_pace_key(track: &mut Track) -> Option<String> {
    let saved = track.bit_index();
    for _ in 0..PACE_PROLOGUE_FF_RUN {
        if track.nibble() != 0xFF {
            track.seek_to(saved);
            return None;
        }
    }
    for &want in PACE_MARKER.iter() {
        if track.nibble() != want {
            track.seek_to(saved);
            return None;
        }
    }
    for _ in 0..4 {
        track.nibble();
    }
    let mut key_bytes = [0u8; 4];
    for slot in key_bytes.iter_mut() {
        let hi = track.nibble();
        let lo = track.nibble();
        let word = ((hi as u16) << 8) | lo as u16;
        *slot = bit_compress(word);
    }
    key_bytes.reverse();
    Some(hex::encode(key_bytes))
}

fn detect_e7(data: &[u8; 512]) -> bool {
    data[0..0x18E].iter().all(|&b| b == 0)
        && &data[E7_OFFSET..E7_OFFSET + 20] == &E7_BYTESTREAM[..]
}

/// Runs the full per-track sector hunt described in spec section 4.9,
/// returning every recovered sector plus the structured event log.
pub fn decode_track(track: &mut Track) -> (Vec<MoofBlock>, Vec<Event>) {
    let inv = invert_table();
    let mut blocks = Vec::new();
    let mut events = Vec::new();
    let mut seen: std::collections::HashSet<u8> = std::collections::HashSet::new();
    let mut last_track_id: Option<u8> = None;

    loop {
        if !track.find(&ADDRESS_PROLOGUE) {
            break;
        }
        let af = match read_address_field(track, &inv) {
            Ok(af) => af,
            Err(_) => {
                events.push(Event::InvalidNibble);
                continue;
            }
        };
        if !af.valid {
            events.push(Event::AddressChecksum);
            continue;
        }
        if af.track_id > 0x9F {
            events.push(Event::BadTrackId);
            continue;
        }
        let expected_spt = sectors_per_track(af.track_id).expect("track_id bounds already checked");
        if af.sector_id as usize >= expected_spt {
            events.push(Event::BadSectorId);
            continue;
        }
        if !verify_literal(track, &ADDRESS_EPILOGUE) {
            events.push(Event::BadAddrEpilogue);
            continue;
        }
        if seen.contains(&af.sector_id) {
            break;
        }
        seen.insert(af.sector_id);

        let saved_cursor = track.bit_index();
        if !track.find_this_not_that(&DATA_PROLOGUE, &ADDRESS_PROLOGUE) {
            track.seek_to(saved_cursor);
            if let Some(key) = try_pace_key(track) {
                events.push(Event::PaceKeyFound { key });
            }
            continue;
        }

        let df = match read_data_field(track, &inv) {
            Ok(df) => df,
            Err(_) => {
                events.push(Event::InvalidNibble);
                continue;
            }
        };
        if !df.valid {
            events.push(Event::DataChecksum);
            continue;
        }
        if df.sector_id != af.sector_id {
            events.push(Event::SectorIdMismatch);
            continue;
        }
        if detect_e7(&df.data) {
            events.push(Event::E7Found);
        }
        if !verify_literal(track, &DATA_EPILOGUE) {
            events.push(Event::BadDataEpilogue);
            continue;
        }
        last_track_id = Some(af.track_id);
        blocks.push(MoofBlock { address: af, data: df });
    }

    if let Some(tid) = last_track_id {
        if let Some(expected) = sectors_per_track(tid) {
            if seen.len() < expected {
                events.push(Event::SectorCountShort { expected, got: seen.len() });
            }
        }
    }

    (blocks, events)
}

/// Inverse of the 6-and-2 table and checksum encoder, used to build
/// synthetic tracks for tests (and available to CLI disk-creation paths).
pub mod encode {
    use super::*;

    fn encode_62(six_bit: u8) -> u8 {
        DISK_BYTES_62[(six_bit & 0x3F) as usize]
    }

    fn decompose_group(enc0: u8, enc1: u8, enc2: u8) -> (u8, u8, u8, u8) {
        let a = ((enc2 >> 6) & 1)
            | (((enc2 >> 7) & 1) << 1)
            | (((enc1 >> 6) & 1) << 2)
            | (((enc1 >> 7) & 1) << 3)
            | (((enc0 >> 6) & 1) << 4)
            | (((enc0 >> 7) & 1) << 5);
        (a, enc0 & 0x3F, enc1 & 0x3F, enc2 & 0x3F)
    }

    /// Encodes `tags` and `data` (524 bytes of plaintext) as the 700
    /// translated body nibbles plus the 3 trailing checksum nibbles.
    fn encode_data_body(tags: &[u8; 12], data: &[u8; 512]) -> ([u8; 700], [u8; 3]) {
        let mut plain = [0u8; 525];
        plain[0..12].copy_from_slice(tags);
        plain[12..524].copy_from_slice(data);
        // plain[524] is a structural filler byte with no plaintext meaning.

        let mut c1: u32 = 0;
        let mut c2: u32 = 0;
        let mut c3: u32 = 0;
        let mut encoded = [0u8; 525];
        for i in 0..175 {
            c1 = (c1 << 1) & 0x1FF;
            if c1 > 0xFF {
                c1 -= 0xFF;
                c3 += 1;
            }
            let b0 = plain[i * 3] as u32;
            let d0 = b0 ^ c1;
            c3 += b0;
            encoded[i * 3] = d0 as u8;

            if c3 > 0xFF {
                c3 &= 0xFF;
                c2 += 1;
            }
            let b1 = plain[i * 3 + 1] as u32;
            let d1 = b1 ^ c3;
            c2 += b1;
            encoded[i * 3 + 1] = d1 as u8;

            if c2 > 0xFF {
                c2 &= 0xFF;
                c1 += 1;
            }
            let b2 = plain[i * 3 + 2] as u32;
            let d2 = b2 ^ c2;
            c1 += b2;
            encoded[i * 3 + 2] = d2 as u8;
        }

        let mut body = [0u8; 700];
        for i in 0..175 {
            let (a, b, c, d) = decompose_group(encoded[i * 3], encoded[i * 3 + 1], encoded[i * 3 + 2]);
            body[i * 4] = encode_62(a);
            body[i * 4 + 1] = encode_62(b);
            body[i * 4 + 2] = encode_62(c);
            body[i * 4 + 3] = encode_62(d);
        }
        let trailer = [
            encode_62((c3 & 0x3F) as u8),
            encode_62((c2 & 0x3F) as u8),
            encode_62((c1 & 0x3F) as u8),
        ];
        (body, trailer)
    }

    fn encode_address_nibbles(volume: u8, track_id: u8, sector_id: u8) -> [u8; 5] {
        let h0 = (track_id >> 1) & 0x3F;
        let h2 = ((track_id >> 7) & 1) | ((track_id & 1) << 5);
        let sector6 = sector_id & 0x3F;
        let vol6 = volume & 0x3F;
        let checksum = h0 ^ sector6 ^ h2 ^ vol6;
        [
            encode_62(h0),
            encode_62(sector6),
            encode_62(h2),
            encode_62(vol6),
            encode_62(checksum),
        ]
    }

    /// Assembles a full address field + data field (with prologues,
    /// epilogues, and sync padding) as a flat byte sequence suitable for
    /// `Track::new`. Intended for tests and disk-creation tooling, not
    /// for on-the-wire output (no true self-sync timing is modeled).
    pub fn encode_sector(
        volume: u8,
        track_id: u8,
        sector_id: u8,
        tags: &[u8; 12],
        data: &[u8; 512],
    ) -> Vec<u8> {
        let mut out = Vec::new();
        out.extend_from_slice(&ADDRESS_PROLOGUE);
        out.extend_from_slice(&encode_address_nibbles(volume, track_id, sector_id));
        out.extend_from_slice(&ADDRESS_EPILOGUE);
        out.extend_from_slice(&[0xFF; 6]); // sync gap
        out.extend_from_slice(&DATA_PROLOGUE);
        out.push(encode_62(sector_id & 0x3F));
        let (body, trailer) = encode_data_body(tags, data);
        out.extend_from_slice(&body);
        out.extend_from_slice(&trailer);
        out.extend_from_slice(&DATA_EPILOGUE);
        out
    }
}
