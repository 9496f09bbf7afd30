//! # Container Parser / Serializer
//!
//! The top-level `DiskImage`: header parsing, the chunk loop, CRC-32
//! verification, and canonical-order serialization with a self-check
//! reload pass. Grounded in `img/woz.rs`'s `crc32`/`get_next_chunk` (the
//! CRC table and chunk-loop shape are carried over verbatim) and
//! `img/woz1.rs`/`img/woz2.rs`'s `from_bytes`/`to_bytes` assembly.

use log::{debug, trace, warn};

use crate::error::ContainerError;
use crate::info::{ImageType, Info};
use crate::meta::Meta;
use crate::tmap::{self, TMAP_LEN};
use crate::track::Track;
use crate::trks::{self, V1TrackMeta};

const INFO_ID: u32 = 0x4f464e49;
const TMAP_ID: u32 = 0x50414d54;
const TRKS_ID: u32 = 0x534b5254;
const FLUX_ID: u32 = 0x58554c46;
const WRIT_ID: u32 = 0x54495257;
const META_ID: u32 = 0x4154454d;

const CRC32_TAB: [u32; 256] = [
    0x00000000, 0x77073096, 0xee0e612c, 0x990951ba, 0x076dc419, 0x706af48f, 0xe963a535, 0x9e6495a3,
    0x0edb8832, 0x79dcb8a4, 0xe0d5e91e, 0x97d2d988, 0x09b64c2b, 0x7eb17cbd, 0xe7b82d07, 0x90bf1d91,
    0x1db71064, 0x6ab020f2, 0xf3b97148, 0x84be41de, 0x1adad47d, 0x6ddde4eb, 0xf4d4b551, 0x83d385c7,
    0x136c9856, 0x646ba8c0, 0xfd62f97a, 0x8a65c9ec, 0x14015c4f, 0x63066cd9, 0xfa0f3d63, 0x8d080df5,
    0x3b6e20c8, 0x4c69105e, 0xd56041e4, 0xa2677172, 0x3c03e4d1, 0x4b04d447, 0xd20d85fd, 0xa50ab56b,
    0x35b5a8fa, 0x42b2986c, 0xdbbbc9d6, 0xacbcf940, 0x32d86ce3, 0x45df5c75, 0xdcd60dcf, 0xabd13d59,
    0x26d930ac, 0x51de003a, 0xc8d75180, 0xbfd06116, 0x21b4f4b5, 0x56b3c423, 0xcfba9599, 0xb8bda50f,
    0x2802b89e, 0x5f058808, 0xc60cd9b2, 0xb10be924, 0x2f6f7c87, 0x58684c11, 0xc1611dab, 0xb6662d3d,
    0x76dc4190, 0x01db7106, 0x98d220bc, 0xefd5102a, 0x71b18589, 0x06b6b51f, 0x9fbfe4a5, 0xe8b8d433,
    0x7807c9a2, 0x0f00f934, 0x9609a88e, 0xe10e9818, 0x7f6a0dbb, 0x086d3d2d, 0x91646c97, 0xe6635c01,
    0x6b6b51f4, 0x1c6c6162, 0x856530d8, 0xf262004e, 0x6c0695ed, 0x1b01a57b, 0x8208f4c1, 0xf50fc457,
    0x65b0d9c6, 0x12b7e950, 0x8bbeb8ea, 0xfcb9887c, 0x62dd1ddf, 0x15da2d49, 0x8cd37cf3, 0xfbd44c65,
    0x4db26158, 0x3ab551ce, 0xa3bc0074, 0xd4bb30e2, 0x4adfa541, 0x3dd895d7, 0xa4d1c46d, 0xd3d6f4fb,
    0x4369e96a, 0x346ed9fc, 0xad678846, 0xda60b8d0, 0x44042d73, 0x33031de5, 0xaa0a4c5f, 0xdd0d7cc9,
    0x5005713c, 0x270241aa, 0xbe0b1010, 0xc90c2086, 0x5768b525, 0x206f85b3, 0xb966d409, 0xce61e49f,
    0x5edef90e, 0x29d9c998, 0xb0d09822, 0xc7d7a8b4, 0x59b33d17, 0x2eb40d81, 0xb7bd5c3b, 0xc0ba6cad,
    0xedb88320, 0x9abfb3b6, 0x03b6e20c, 0x74b1d29a, 0xead54739, 0x9dd277af, 0x04db2615, 0x73dc1683,
    0xe3630b12, 0x94643b84, 0x0d6d6a3e, 0x7a6a5aa8, 0xe40ecf0b, 0x9309ff9d, 0x0a00ae27, 0x7d079eb1,
    0xf00f9344, 0x8708a3d2, 0x1e01f268, 0x6906c2fe, 0xf762575d, 0x806567cb, 0x196c3671, 0x6e6b06e7,
    0xfed41b76, 0x89d32be0, 0x10da7a5a, 0x67dd4acc, 0xf9b9df6f, 0x8ebeeff9, 0x17b7be43, 0x60b08ed5,
    0xd6d6a3e8, 0xa1d1937e, 0x38d8c2c4, 0x4fdff252, 0xd1bb67f1, 0xa6bc5767, 0x3fb506dd, 0x48b2364b,
    0xd80d2bda, 0xaf0a1b4c, 0x36034af6, 0x41047a60, 0xdf60efc3, 0xa867df55, 0x316e8eef, 0x4669be79,
    0xcb61b38c, 0xbc66831a, 0x256fd2a0, 0x5268e236, 0xcc0c7795, 0xbb0b4703, 0x220216b9, 0x5505262f,
    0xc5ba3bbe, 0xb2bd0b28, 0x2bb45a92, 0x5cb36a04, 0xc2d7ffa7, 0xb5d0cf31, 0x2cd99e8b, 0x5bdeae1d,
    0x9b64c2b0, 0xec63f226, 0x756aa39c, 0x026d930a, 0x9c0906a9, 0xeb0e363f, 0x72076785, 0x05005713,
    0x95bf4a82, 0xe2b87a14, 0x7bb12bae, 0x0cb61b38, 0x92d28e9b, 0xe5d5be0d, 0x7cdcefb7, 0x0bdbdf21,
    0x86d3d2d4, 0xf1d4e242, 0x68ddb3f8, 0x1fda836e, 0x81be16cd, 0xf6b9265b, 0x6fb077e1, 0x18b74777,
    0x88085ae6, 0xff0f6a70, 0x66063bca, 0x11010b5c, 0x8f659eff, 0xf862ae69, 0x616bffd3, 0x166ccf45,
    0xa00ae278, 0xd70dd2ee, 0x4e048354, 0x3903b3c2, 0xa7672661, 0xd06016f7, 0x4969474d, 0x3e6e77db,
    0xaed16a4a, 0xd9d65adc, 0x40df0b66, 0x37d83bf0, 0xa9bcae53, 0xdebb9ec5, 0x47b2cf7f, 0x30b5ffe9,
    0xbdbdf21c, 0xcabac28a, 0x53b39330, 0x24b4a3a6, 0xbad03605, 0xcdd70693, 0x54de5729, 0x23d967bf,
    0xb3667a2e, 0xc4614ab8, 0x5d681b02, 0x2a6f2b94, 0xb40bbe37, 0xc30c8ea1, 0x5a05df1b, 0x2d02ef8d,
];

pub fn crc32(seed: u32, buf: &[u8]) -> u32 {
    let mut crc = seed ^ !0u32;
    for &b in buf {
        crc = CRC32_TAB[((crc ^ b as u32) & 0xFF) as usize] ^ (crc >> 8);
    }
    crc ^ !0u32
}

/// The full in-memory WOZ/MOOF image: header-derived `image_type` plus
/// every loaded chunk.
pub struct DiskImage {
    pub image_type: ImageType,
    pub info: Info,
    pub tmap: [u8; TMAP_LEN],
    pub tracks: Vec<Track>,
    pub flux: Option<[u8; TMAP_LEN]>,
    pub writ: Option<Vec<u8>>,
    pub meta: Meta,
    /// WOZ1-only per-track bookkeeping, parallel to `tracks`.
    pub v1_meta: Vec<V1TrackMeta>,
}

fn magic_to_image_type(magic: &[u8; 4]) -> Result<ImageType, ContainerError> {
    match magic {
        b"WOZ1" => Ok(ImageType::Woz1),
        b"WOZ2" => Ok(ImageType::Woz2),
        b"MOOF" => Ok(ImageType::Moof),
        _ => Err(ContainerError::NoWozMarker),
    }
}

fn image_type_magic(image_type: ImageType) -> &'static [u8; 4] {
    match image_type {
        ImageType::Woz1 => b"WOZ1",
        ImageType::Woz2 => b"WOZ2",
        ImageType::Moof => b"MOOF",
    }
}

impl DiskImage {
    /// Parses a full byte buffer: the 12-byte header, then the chunk
    /// loop, enforcing INFO-first and TMAP-before-TRKS/FLUX/WRIT/META
    /// ordering, verifying CRC-32 when nonzero, and validating every
    /// TMAP/FLUX entry against the final track count.
    pub fn load(buf: &[u8]) -> Result<Self, ContainerError> {
        if buf.len() < 12 {
            return Err(ContainerError::Eof);
        }
        let magic: [u8; 4] = buf[0..4].try_into().expect("checked length");
        let image_type = magic_to_image_type(&magic)?;
        if buf[4] != 0xFF {
            return Err(ContainerError::NoFf);
        }
        if buf[5] != 0x0A || buf[6] != 0x0D || buf[7] != 0x0A {
            return Err(ContainerError::NoLf);
        }
        let header_crc = u32::from_le_bytes(buf[8..12].try_into().expect("checked length"));

        if header_crc != 0 {
            let actual = crc32(0, &buf[12..]);
            if actual != header_crc {
                return Err(ContainerError::Crc);
            }
        }

        let mut info: Option<Info> = None;
        let mut tmap: Option<[u8; TMAP_LEN]> = None;
        let mut flux: Option<[u8; TMAP_LEN]> = None;
        let mut tracks: Vec<Track> = Vec::new();
        let mut v1_meta: Vec<V1TrackMeta> = Vec::new();
        let mut writ: Option<Vec<u8>> = None;
        let mut meta = Meta::new();

        let mut ptr = 12usize;
        while ptr < buf.len() {
            if ptr + 8 > buf.len() {
                return Err(ContainerError::Eof);
            }
            let id = u32::from_le_bytes(buf[ptr..ptr + 4].try_into().expect("checked length"));
            let size = u32::from_le_bytes(buf[ptr + 4..ptr + 8].try_into().expect("checked length")) as usize;
            let payload_start = ptr + 8;
            let payload_end = payload_start + size;
            if payload_end > buf.len() {
                return Err(ContainerError::Eof);
            }
            let payload = &buf[payload_start..payload_end];
            trace!("chunk id {:08X} at offset {}, size {}", id, ptr, size);

            if id != INFO_ID && info.is_none() {
                return Err(ContainerError::MissingInfoChunk);
            }
            if matches!(id, TRKS_ID | FLUX_ID | WRIT_ID | META_ID) && tmap.is_none() {
                return Err(ContainerError::MissingTmapChunk);
            }

            match id {
                INFO_ID => {
                    debug!("loading INFO chunk");
                    info = Some(Info::parse(image_type, payload)?);
                }
                TMAP_ID => {
                    debug!("loading TMAP chunk");
                    tmap = Some(tmap::parse_map(payload).ok_or(ContainerError::BadChunkSize)?);
                }
                TRKS_ID => {
                    debug!("loading TRKS chunk");
                    match image_type {
                        ImageType::Woz1 => {
                            let (t, m) = trks::parse_v1(payload)?;
                            tracks = t;
                            v1_meta = m;
                        }
                        ImageType::Woz2 | ImageType::Moof => {
                            tracks = trks::parse_v2(payload)?;
                        }
                    }
                }
                FLUX_ID => {
                    debug!("loading FLUX chunk");
                    flux = Some(tmap::parse_map(payload).ok_or(ContainerError::BadChunkSize)?);
                }
                WRIT_ID => {
                    debug!("loading WRIT chunk (opaque)");
                    writ = Some(payload.to_vec());
                }
                META_ID => {
                    debug!("loading META chunk");
                    meta = Meta::parse(payload)?;
                }
                _ => {
                    debug!("ignoring unknown chunk id {:08X}", id);
                }
            }

            ptr = payload_end;
        }

        let info = info.ok_or(ContainerError::MissingInfoChunk)?;
        let tmap = tmap.ok_or(ContainerError::MissingTmapChunk)?;

        if !tmap::validate_against_track_count(&tmap, tracks.len()) {
            return Err(ContainerError::BadTrks);
        }
        if let Some(f) = &flux {
            if !tmap::validate_against_track_count(f, tracks.len()) {
                return Err(ContainerError::BadTrks);
            }
        }

        Ok(DiskImage { image_type, info, tmap, tracks, flux, writ, meta, v1_meta })
    }

    fn largest_blocks_among(&self, map: &[u8; TMAP_LEN]) -> u16 {
        let mut max_blocks = 0u16;
        for &idx in map.iter() {
            if idx == tmap::NO_TRACK {
                continue;
            }
            if let Some(t) = self.tracks.get(idx as usize) {
                let blocks = (((t.raw_count() + 7) / 8 + 511) / 512) as u16;
                max_blocks = max_blocks.max(blocks);
            }
        }
        max_blocks
    }

    /// Serializes to bytes in canonical chunk order, recomputing
    /// `largest_track` (and, when FLUX is present, `flux_block` /
    /// `largest_flux_track`) and the header CRC-32. Finishes with a
    /// self-check: the freshly written bytes are re-parsed, and any
    /// failure to reload becomes `ContainerError::InternalError`.
    pub fn dump(&self) -> Result<Vec<u8>, ContainerError> {
        let mut info = self.info.clone();
        if matches!(self.image_type, ImageType::Woz2 | ImageType::Moof) {
            info.largest_track = self.largest_blocks_among(&self.tmap);
            if let Some(flux) = &self.flux {
                // The FLUX table addresses the same track list as TMAP, so its
                // "starting block" is simply where TRKS's own bitstream region
                // begins (block 3, right after the 1280-byte descriptor table).
                info.flux_block = 3;
                info.largest_flux_track = self.largest_blocks_among(flux);
            }
        }

        let trks_payload = match self.image_type {
            ImageType::Woz1 => trks::serialize_v1(&self.tracks, &self.v1_meta),
            ImageType::Woz2 | ImageType::Moof => trks::serialize_v2(&self.tracks),
        };

        let mut body = Vec::new();
        push_chunk(&mut body, INFO_ID, &info.to_bytes(self.image_type));
        push_chunk(&mut body, TMAP_ID, &self.tmap);
        push_chunk(&mut body, TRKS_ID, &trks_payload);
        if let Some(flux) = &self.flux {
            push_chunk(&mut body, FLUX_ID, flux);
        }
        if let Some(writ) = &self.writ {
            push_chunk(&mut body, WRIT_ID, writ);
        }
        if !self.meta.is_empty() {
            push_chunk(&mut body, META_ID, &self.meta.to_bytes());
        }

        let crc = crc32(0, &body);
        let mut out = Vec::with_capacity(12 + body.len());
        out.extend_from_slice(image_type_magic(self.image_type));
        out.extend_from_slice(&[0xFF, 0x0A, 0x0D, 0x0A]);
        out.extend_from_slice(&crc.to_le_bytes());
        out.extend_from_slice(&body);

        if DiskImage::load(&out).is_err() {
            warn!("freshly written image failed to reload");
            return Err(ContainerError::InternalError);
        }

        Ok(out)
    }
}

fn push_chunk(out: &mut Vec<u8>, id: u32, payload: &[u8]) {
    out.extend_from_slice(&id.to_le_bytes());
    out.extend_from_slice(&(payload.len() as u32).to_le_bytes());
    out.extend_from_slice(payload);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn minimal_woz2() -> DiskImage {
        let info = Info {
            version: 2,
            disk_type: 1,
            write_protected: false,
            synchronized: false,
            cleaned: false,
            moof_bit_timing: 0,
            creator: "wozardry".to_string(),
            disk_sides: 1,
            boot_sector_format: 0,
            optimal_bit_timing: 32,
            compatible_hardware: Vec::new(),
            required_ram: 0,
            largest_track: 0,
            flux_block: 0,
            largest_flux_track: 0,
        };
        DiskImage {
            image_type: ImageType::Woz2,
            info,
            tmap: [tmap::NO_TRACK; TMAP_LEN],
            tracks: Vec::new(),
            flux: None,
            writ: None,
            meta: Meta::new(),
            v1_meta: Vec::new(),
        }
    }

    #[test]
    fn minimal_image_round_trips() {
        let img = minimal_woz2();
        let bytes = img.dump().unwrap();
        assert_eq!(&bytes[0..4], b"WOZ2");
        let reloaded = DiskImage::load(&bytes).unwrap();
        assert_eq!(reloaded.tracks.len(), 0);
        assert_eq!(reloaded.info.creator, "wozardry");
    }

    #[test]
    fn tmap_before_info_rejected() {
        let mut buf = Vec::new();
        buf.extend_from_slice(b"WOZ2");
        buf.extend_from_slice(&[0xFF, 0x0A, 0x0D, 0x0A]);
        buf.extend_from_slice(&0u32.to_le_bytes());
        push_chunk(&mut buf, TMAP_ID, &[tmap::NO_TRACK; TMAP_LEN]);
        assert!(matches!(DiskImage::load(&buf), Err(ContainerError::MissingInfoChunk)));
    }

    #[test]
    fn bad_version_for_woz1_header() {
        let mut buf = Vec::new();
        buf.extend_from_slice(b"WOZ1");
        buf.extend_from_slice(&[0xFF, 0x0A, 0x0D, 0x0A]);
        buf.extend_from_slice(&0u32.to_le_bytes());
        let mut info_payload = vec![0u8; crate::info::INFO_LEN];
        info_payload[0] = 0; // bad version
        push_chunk(&mut buf, INFO_ID, &info_payload);
        assert!(matches!(DiskImage::load(&buf), Err(ContainerError::BadVersion)));
    }

    #[test]
    fn largest_track_uses_bit_count_not_padded_buffer() {
        // 100 bits needs ceil(100/8) = 13 bytes, which fits in 1 block, but
        // the stored buffer is padded out to 2 full blocks (1024 bytes).
        // largest_track must reflect the 1-block bit count, not the
        // 2-block buffer length.
        let mut img = minimal_woz2();
        img.tmap[0] = 0;
        img.tracks.push(Track::new(vec![0u8; 1024], 100));
        let bytes = img.dump().unwrap();
        let reloaded = DiskImage::load(&bytes).unwrap();
        assert_eq!(reloaded.info.largest_track, 1);
    }

    #[test]
    fn tmap_entry_out_of_range_rejected() {
        let mut img = minimal_woz2();
        img.tmap[0] = 0; // no tracks exist
        let body_err = {
            let mut buf = Vec::new();
            buf.extend_from_slice(b"WOZ2");
            buf.extend_from_slice(&[0xFF, 0x0A, 0x0D, 0x0A]);
            buf.extend_from_slice(&0u32.to_le_bytes());
            push_chunk(&mut buf, INFO_ID, &img.info.to_bytes(img.image_type));
            push_chunk(&mut buf, TMAP_ID, &img.tmap);
            push_chunk(&mut buf, TRKS_ID, &trks::serialize_v2(&img.tracks));
            DiskImage::load(&buf)
        };
        assert!(matches!(body_err, Err(ContainerError::BadTrks)));
    }
}
