//! # INFO Chunk
//!
//! Fixed 60-byte payload with version- and disk-type-conditional fields.
//! Grounded in `img/woz2.rs`'s `Info` struct layout and the `a2-4am/wozardry`
//! `validate_info_*` methods (see `original_source/wozardry.py`), here
//! hand-written instead of `a2kit_macro`-derived since fields need
//! conditional, not blanket, validation.

use crate::error::ContainerError;
use crate::primitive;

pub const INFO_LEN: usize = 60;

/// The 9 machine-model names indexed by bit position in `compatible_hardware`.
pub const MACHINE_NAMES: [&str; 9] =
    ["2", "2+", "2e", "2c", "2e+", "2gs", "2c+", "3", "3+"];

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum ImageType {
    Woz1,
    Woz2,
    Moof,
}

#[derive(Clone, Debug)]
pub struct Info {
    pub version: u8,
    pub disk_type: u8,
    pub write_protected: bool,
    pub synchronized: bool,
    /// WOZ1/WOZ2 byte-4 meaning: whether the image has been run through a
    /// cleanup pass. Unused (false) for MOOF.
    pub cleaned: bool,
    /// MOOF byte-4 meaning: the drive's optimal bit timing in 125ns units
    /// (8 or 16). Unused (0) for WOZ1/WOZ2.
    pub moof_bit_timing: u8,
    pub creator: String,
    /// WOZ2/MOOF only.
    pub disk_sides: u8,
    /// WOZ2/MOOF only.
    pub boot_sector_format: u8,
    /// WOZ2/MOOF byte 39 (distinct from the byte-4 MOOF bit timing field).
    pub optimal_bit_timing: u8,
    pub compatible_hardware: Vec<String>,
    pub required_ram: u16,
    pub largest_track: u16,
    pub flux_block: u16,
    pub largest_flux_track: u16,
}

impl Info {
    pub fn parse(image_type: ImageType, payload: &[u8]) -> Result<Self, ContainerError> {
        if payload.len() != INFO_LEN {
            return Err(ContainerError::BadChunkSize);
        }

        let version = payload[0];
        match image_type {
            ImageType::Woz1 => {
                if version != 1 {
                    return Err(ContainerError::BadVersion);
                }
            }
            ImageType::Woz2 => {
                if version < 2 {
                    return Err(ContainerError::BadVersion);
                }
            }
            ImageType::Moof => {
                if version != 1 {
                    return Err(ContainerError::BadVersion);
                }
            }
        }

        let disk_type = payload[1];
        match image_type {
            ImageType::Woz1 | ImageType::Woz2 => {
                if disk_type != 1 && disk_type != 2 {
                    return Err(ContainerError::BadDiskType);
                }
            }
            ImageType::Moof => {
                if disk_type > 3 {
                    return Err(ContainerError::BadDiskType);
                }
            }
        }

        let write_protected = parse_flag(payload[2], ContainerError::BadWriteProtected)?;
        let synchronized = parse_flag(payload[3], ContainerError::BadSynchronized)?;

        let mut cleaned = false;
        let mut moof_bit_timing = 0u8;
        match image_type {
            ImageType::Woz1 | ImageType::Woz2 => {
                cleaned = parse_flag(payload[4], ContainerError::BadCleaned)?;
            }
            ImageType::Moof => {
                moof_bit_timing = payload[4];
                if moof_bit_timing != 8 && moof_bit_timing != 16 {
                    return Err(ContainerError::BadOptimalBitTiming);
                }
            }
        }

        let creator = std::str::from_utf8(&payload[5..37])
            .map_err(|_| ContainerError::BadCreator)?
            .trim_end_matches(' ')
            .to_string();

        let mut disk_sides = 1u8;
        let mut boot_sector_format = 0u8;
        let mut optimal_bit_timing = 0u8;
        let mut compatible_hardware = Vec::new();
        let mut required_ram = 0u16;
        let mut largest_track = 0u16;
        let mut flux_block = 0u16;
        let mut largest_flux_track = 0u16;

        if matches!(image_type, ImageType::Woz2 | ImageType::Moof) {
            disk_sides = payload[37];
            match disk_type {
                1 => {
                    if disk_sides != 1 {
                        return Err(ContainerError::BadDiskSides);
                    }
                }
                2 => {
                    if disk_sides != 1 && disk_sides != 2 {
                        return Err(ContainerError::BadDiskSides);
                    }
                }
                _ => {}
            }

            boot_sector_format = payload[38];
            match disk_type {
                1 => {
                    if boot_sector_format > 3 {
                        return Err(ContainerError::BadBootSectorFormat);
                    }
                }
                2 => {
                    if boot_sector_format != 0 {
                        return Err(ContainerError::BadBootSectorFormat);
                    }
                }
                _ => {}
            }

            optimal_bit_timing = payload[39];
            match disk_type {
                1 => {
                    if !(24..=40).contains(&optimal_bit_timing) {
                        return Err(ContainerError::BadOptimalBitTiming);
                    }
                }
                2 => {
                    if !(8..=24).contains(&optimal_bit_timing) {
                        return Err(ContainerError::BadOptimalBitTiming);
                    }
                }
                _ => {}
            }

            let bitfield = primitive::le_u16(&payload[40..42]);
            if bitfield & 0xFE00 != 0 {
                return Err(ContainerError::BadCompatibleHardware);
            }
            compatible_hardware = expand_compatible_hardware(bitfield);

            required_ram = primitive::le_u16(&payload[42..44]);
            largest_track = primitive::le_u16(&payload[44..46]);
            flux_block = primitive::le_u16(&payload[46..48]);
            largest_flux_track = primitive::le_u16(&payload[48..50]);
        }

        Ok(Info {
            version,
            disk_type,
            write_protected,
            synchronized,
            cleaned,
            moof_bit_timing,
            creator,
            disk_sides,
            boot_sector_format,
            optimal_bit_timing,
            compatible_hardware,
            required_ram,
            largest_track,
            flux_block,
            largest_flux_track,
        })
    }

    pub fn to_bytes(&self, image_type: ImageType) -> Vec<u8> {
        let mut out = vec![0u8; INFO_LEN];
        out[0] = self.version;
        out[1] = self.disk_type;
        out[2] = self.write_protected as u8;
        out[3] = self.synchronized as u8;
        out[4] = match image_type {
            ImageType::Woz1 | ImageType::Woz2 => self.cleaned as u8,
            ImageType::Moof => self.moof_bit_timing,
        };
        let mut creator_field = [0x20u8; 32];
        let creator_bytes = self.creator.as_bytes();
        creator_field[..creator_bytes.len().min(32)]
            .copy_from_slice(&creator_bytes[..creator_bytes.len().min(32)]);
        out[5..37].copy_from_slice(&creator_field);

        if matches!(image_type, ImageType::Woz2 | ImageType::Moof) {
            out[37] = self.disk_sides;
            out[38] = self.boot_sector_format;
            out[39] = self.optimal_bit_timing;
            let bitfield = pack_compatible_hardware(&self.compatible_hardware);
            out[40..42].copy_from_slice(&primitive::put_le_u16(bitfield));
            out[42..44].copy_from_slice(&primitive::put_le_u16(self.required_ram));
            out[44..46].copy_from_slice(&primitive::put_le_u16(self.largest_track));
            out[46..48].copy_from_slice(&primitive::put_le_u16(self.flux_block));
            out[48..50].copy_from_slice(&primitive::put_le_u16(self.largest_flux_track));
        }
        out
    }
}

fn parse_flag(byte: u8, err: ContainerError) -> Result<bool, ContainerError> {
    match byte {
        0 => Ok(false),
        1 => Ok(true),
        _ => Err(err),
    }
}

fn expand_compatible_hardware(bitfield: u16) -> Vec<String> {
    (0..MACHINE_NAMES.len())
        .filter(|i| bitfield & (1 << i) != 0)
        .map(|i| MACHINE_NAMES[i].to_string())
        .collect()
}

fn pack_compatible_hardware(names: &[String]) -> u16 {
    let mut bitfield = 0u16;
    for name in names {
        if let Some(i) = MACHINE_NAMES.iter().position(|n| n == name) {
            bitfield |= 1 << i;
        }
    }
    bitfield
}

#[cfg(test)]
mod tests {
    use super::*;

    fn minimal_woz2_payload() -> Vec<u8> {
        let mut p = vec![0u8; INFO_LEN];
        p[0] = 2; // version
        p[1] = 1; // disk_type
        p[4] = 0; // cleaned
        p[5..13].copy_from_slice(b"wozardry");
        for b in p[13..37].iter_mut() {
            *b = 0x20;
        }
        p[37] = 1; // disk_sides
        p[39] = 32; // optimal_bit_timing within [24,40] for disk_type 1
        p
    }

    #[test]
    fn parses_minimal_woz2() {
        let info = Info::parse(ImageType::Woz2, &minimal_woz2_payload()).unwrap();
        assert_eq!(info.creator, "wozardry");
        assert_eq!(info.disk_sides, 1);
    }

    #[test]
    fn rejects_bad_version_for_woz1() {
        let mut p = minimal_woz2_payload();
        p[0] = 0;
        assert!(matches!(Info::parse(ImageType::Woz1, &p), Err(ContainerError::BadVersion)));
    }

    #[test]
    fn rejects_optimal_bit_timing_zero() {
        let mut p = minimal_woz2_payload();
        p[39] = 0;
        assert!(matches!(
            Info::parse(ImageType::Woz2, &p),
            Err(ContainerError::BadOptimalBitTiming)
        ));
    }

    #[test]
    fn rejects_high_bits_of_compatible_hardware() {
        let mut p = minimal_woz2_payload();
        p[40..42].copy_from_slice(&primitive::put_le_u16(0x8000));
        assert!(matches!(
            Info::parse(ImageType::Woz2, &p),
            Err(ContainerError::BadCompatibleHardware)
        ));
    }

    #[test]
    fn compatible_hardware_round_trips() {
        let bitfield = (1 << 0) | (1 << 5);
        let names = expand_compatible_hardware(bitfield);
        assert_eq!(names, vec!["2".to_string(), "2gs".to_string()]);
        assert_eq!(pack_compatible_hardware(&names), bitfield);
    }
}
