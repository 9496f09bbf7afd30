//! # JSON import/export
//!
//! A thin `serde_json` view onto `DiskImage`'s INFO and META fields, for
//! the CLI's `dump --json` / `import --json` flows. Grounded in
//! `original_source/wozardry.py`'s `_CommandDump`/`_CommandImport` JSON
//! shape: `{"woz": {"info": {...}, "meta": {...}}}`.

use serde::{Deserialize, Serialize};

use crate::container::DiskImage;
use crate::error::ContainerError;
use crate::info::ImageType;

#[derive(Serialize, Deserialize)]
struct JsonRoot {
    woz: JsonWoz,
}

#[derive(Serialize, Deserialize)]
struct JsonWoz {
    info: JsonInfo,
    #[serde(default, skip_serializing_if = "std::collections::BTreeMap::is_empty")]
    meta: std::collections::BTreeMap<String, Vec<String>>,
}

#[derive(Serialize, Deserialize)]
struct JsonInfo {
    version: u8,
    disk_type: u8,
    write_protected: bool,
    synchronized: bool,
    creator: String,
    disk_sides: u8,
    boot_sector_format: u8,
    optimal_bit_timing: u8,
    compatible_hardware: Vec<String>,
    required_ram: u16,
    largest_track: u16,
}

/// Renders `image`'s INFO and META chunks as a JSON string.
pub fn to_json(image: &DiskImage) -> String {
    let info = &image.info;
    let mut meta = std::collections::BTreeMap::new();
    for (key, value) in image.meta.iter() {
        meta.insert(key.to_string(), value.values().iter().map(|s| s.to_string()).collect());
    }
    let root = JsonRoot {
        woz: JsonWoz {
            info: JsonInfo {
                version: info.version,
                disk_type: info.disk_type,
                write_protected: info.write_protected,
                synchronized: info.synchronized,
                creator: info.creator.clone(),
                disk_sides: info.disk_sides,
                boot_sector_format: info.boot_sector_format,
                optimal_bit_timing: info.optimal_bit_timing,
                compatible_hardware: info.compatible_hardware.clone(),
                required_ram: info.required_ram,
                largest_track: info.largest_track,
            },
            meta,
        },
    };
    serde_json::to_string_pretty(&root).expect("JsonRoot is always serializable")
}

/// Applies a JSON document's `woz.meta` keys onto `image`. INFO fields in
/// the JSON are read-only (reporting only) and are not re-applied: `info`
/// is derived from the image's own binary fields, never the reverse.
pub fn apply_meta_from_json(image: &mut DiskImage, text: &str) -> Result<(), ContainerError> {
    let root: JsonRoot = serde_json::from_str(text).map_err(|_| ContainerError::EncodingError)?;
    for (key, values) in root.woz.meta {
        image.meta.set(&key, values)?;
    }
    Ok(())
}

#[allow(dead_code)]
fn image_type_label(t: ImageType) -> &'static str {
    match t {
        ImageType::Woz1 => "WOZ1",
        ImageType::Woz2 => "WOZ2",
        ImageType::Moof => "MOOF",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::info::Info;
    use crate::meta::Meta;
    use crate::tmap::{NO_TRACK, TMAP_LEN};

    fn sample_image() -> DiskImage {
        DiskImage {
            image_type: ImageType::Woz2,
            info: Info {
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
                compatible_hardware: vec!["2gs".to_string()],
                required_ram: 128,
                largest_track: 0,
                flux_block: 0,
                largest_flux_track: 0,
            },
            tmap: [NO_TRACK; TMAP_LEN],
            tracks: Vec::new(),
            flux: None,
            writ: None,
            meta: Meta::new(),
            v1_meta: Vec::new(),
        }
    }

    #[test]
    fn round_trips_info_and_meta() {
        let mut image = sample_image();
        image.meta.set("language", vec!["English".to_string()]).unwrap();
        let text = to_json(&image);
        assert!(text.contains("\"creator\": \"wozardry\""));
        assert!(text.contains("\"language\""));
    }

    #[test]
    fn import_only_touches_meta() {
        let mut image = sample_image();
        let doc = r#"{"woz":{"info":{"version":2,"disk_type":1,"write_protected":false,"synchronized":false,"creator":"x","disk_sides":1,"boot_sector_format":0,"optimal_bit_timing":32,"compatible_hardware":[],"required_ram":0,"largest_track":0},"meta":{"side":["A"]}}}"#;
        apply_meta_from_json(&mut image, doc).unwrap();
        assert_eq!(image.meta.get("side").unwrap().values(), vec!["A"]);
        assert_eq!(image.info.creator, "wozardry");
    }
}
