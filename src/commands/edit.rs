//! `edit`: set INFO/META fields on an image in place.
//!
//! Grounded in `original_source/wozardry.py`'s `_CommandEdit.update`:
//! `version` is applied first since it can change the chunk layout for
//! every field after it, `disk_type` second (it resets
//! `optimal_bit_timing` to a sensible default), then the remaining INFO
//! fields, then META (an assignment with an empty value deletes the key).

use clap::ArgMatches;

use crate::container::DiskImage;
use crate::error::ContainerError;
use crate::info::ImageType;
use crate::primitive;
use crate::STDRESULT;

pub fn edit(cmd: &ArgMatches) -> STDRESULT {
    let dimg_path = cmd.get_one::<String>("dimg").expect("required");
    let out_path = cmd.get_one::<String>("out").expect("required");
    let mut image = super::load_image(dimg_path)?;

    let info_assignments: Vec<&String> = cmd.get_many::<String>("info").map(|v| v.collect()).unwrap_or_default();
    let meta_assignments: Vec<&String> = cmd.get_many::<String>("meta").map(|v| v.collect()).unwrap_or_default();

    apply_info_edits(&mut image, &info_assignments)?;
    apply_meta_edits(&mut image, &meta_assignments)?;

    super::write_image_atomically(&image, out_path)?;
    Ok(())
}

fn apply_info_edits(image: &mut DiskImage, assignments: &[&String]) -> Result<(), ContainerError> {
    // 1st: version, since it determines image_type for everything after.
    for a in assignments {
        let (k, v) = super::split_assignment(a)?;
        if k == "version" {
            let n = primitive::parse_int(v).ok_or(ContainerError::BadVersion)?;
            image.image_type = match n {
                1 => ImageType::Woz1,
                2 | 3 => ImageType::Woz2,
                _ => return Err(ContainerError::BadVersion),
            };
            image.info.version = if n == 1 { 1 } else { n as u8 };
        }
    }

    // 2nd: disk_type. Changing it resets optimal_bit_timing to that
    // type's default, since the old value may fall outside the new
    // type's valid range.
    for a in assignments {
        let (k, v) = super::split_assignment(a)?;
        if k == "disk_type" {
            let old_disk_type = image.info.disk_type;
            let new_disk_type = primitive::parse_int(v).ok_or(ContainerError::BadDiskType)? as u8;
            if old_disk_type != new_disk_type {
                image.info.disk_type = new_disk_type;
                image.info.optimal_bit_timing = default_bit_timing(new_disk_type);
            }
        }
    }

    // then everything else.
    for a in assignments {
        let (k, v) = super::split_assignment(a)?;
        match k {
            "version" | "disk_type" => continue,
            "write_protected" => {
                image.info.write_protected = primitive::parse_bool(v).ok_or(ContainerError::BadWriteProtected)?;
            }
            "synchronized" => {
                image.info.synchronized = primitive::parse_bool(v).ok_or(ContainerError::BadSynchronized)?;
            }
            "cleaned" => {
                image.info.cleaned = primitive::parse_bool(v).ok_or(ContainerError::BadCleaned)?;
            }
            "creator" => {
                image.info.creator = v.to_string();
            }
            _ => {}
        }
        if image.info.version == 1 {
            continue;
        }
        match k {
            "disk_sides" => {
                image.info.disk_sides = primitive::parse_int(v).ok_or(ContainerError::BadDiskSides)? as u8;
            }
            "boot_sector_format" => {
                image.info.boot_sector_format = primitive::parse_int(v).ok_or(ContainerError::BadBootSectorFormat)? as u8;
            }
            "optimal_bit_timing" => {
                image.info.optimal_bit_timing = primitive::parse_int(v).ok_or(ContainerError::BadOptimalBitTiming)? as u8;
            }
            "required_ram" => {
                let v = v.strip_suffix('k').or_else(|| v.strip_suffix('K')).unwrap_or(v);
                image.info.required_ram = primitive::parse_int(v).ok_or(ContainerError::BadRam)? as u16;
            }
            "compatible_hardware" => {
                image.info.compatible_hardware = v.split('|').map(|s| s.to_string()).collect();
            }
            _ => {}
        }
    }
    Ok(())
}

/// `kDefaultBitTiming`: disk_type 1 (5.25-inch) defaults to 32, disk_type
/// 2 (3.5-inch) defaults to 16.
fn default_bit_timing(disk_type: u8) -> u8 {
    match disk_type {
        1 => 32,
        2 => 16,
        _ => 0,
    }
}

fn apply_meta_edits(image: &mut DiskImage, assignments: &[&String]) -> Result<(), ContainerError> {
    for a in assignments {
        let (k, v) = super::split_assignment(a)?;
        if v.is_empty() {
            image.meta.remove(k);
            continue;
        }
        let values: Vec<String> = v.split('|').map(|s| s.to_string()).collect();
        image.meta.set(k, values)?;
    }
    Ok(())
}
