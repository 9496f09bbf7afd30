//! `dump`: print a human-readable summary of an image's chunks.
//!
//! Grounded in `original_source/wozardry.py`'s `_CommandDump` (the
//! `print_info`/`print_tmap`/`print_meta` methods and their `.ljust(30)`
//! field-label layout).

use clap::ArgMatches;

use crate::info::ImageType;
use crate::STDRESULT;

const WIDTH: usize = 30;
const QUARTERS: [&str; 4] = ["", ".25", ".5", ".75"];

pub fn dump(cmd: &ArgMatches) -> STDRESULT {
    let path = cmd.get_one::<String>("dimg").expect("required");
    let field = cmd.get_one::<String>("field").map(|s| s.as_str()).unwrap_or("all");
    let image = super::load_image(path)?;

    if field == "info" || field == "all" {
        print_info(&image);
    }
    if field == "tmap" || field == "all" {
        print_tmap(&image);
    }
    if field == "trks" || field == "all" {
        print_trks(&image);
    }
    if field == "meta" || field == "all" {
        print_meta(&image);
    }
    Ok(())
}

fn label(s: &str) -> String {
    format!("{:width$}", s, width = WIDTH)
}

fn print_info(image: &crate::container::DiskImage) {
    let info = &image.info;
    let type_name = match image.image_type {
        ImageType::Woz1 => "WOZ1",
        ImageType::Woz2 => "WOZ2",
        ImageType::Moof => "MOOF",
    };
    println!("{} {}", label("INFO:  File format:"), type_name);
    println!("{} {}", label("INFO:  File format version:"), info.version);
    println!("{} {}", label("INFO:  Disk type:"), info.disk_type);
    println!("{} {}", label("INFO:  Write protected:"), if info.write_protected { "Yes" } else { "No" });
    println!("{} {}", label("INFO:  Tracks synchronized:"), if info.synchronized { "Yes" } else { "No" });
    if image.image_type != ImageType::Moof {
        println!("{} {}", label("INFO:  Weakbits cleaned:"), if info.cleaned { "Yes" } else { "No" });
    }
    println!("{} {}", label("INFO:  Creator:"), info.creator);
    if image.image_type == ImageType::Woz1 {
        return;
    }
    if info.disk_type == 1 {
        println!("{} {}", label("INFO:  Boot sector format:"), info.boot_sector_format);
    } else {
        println!("{} {}", label("INFO:  Disk sides:"), info.disk_sides);
    }
    println!("{} {}", label("INFO:  Optimal bit timing:"), info.optimal_bit_timing);
    if image.image_type == ImageType::Moof {
        return;
    }
    if info.compatible_hardware.is_empty() {
        println!("{} unknown", label("INFO:  Compatible hardware:"));
    } else {
        println!("{} {}", label("INFO:  Compatible hardware:"), info.compatible_hardware.join(","));
    }
    let ram = if info.required_ram == 0 { "unknown".to_string() } else { format!("{}K", info.required_ram) };
    println!("{} {}", label("INFO:  Required RAM:"), ram);
    println!("{} {} blocks", label("INFO:  Largest track:"), info.largest_track);
}

fn print_tmap(image: &crate::container::DiskImage) {
    for (i, &trk) in image.tmap.iter().enumerate() {
        if trk != crate::tmap::NO_TRACK {
            println!(
                "{} TRKS {}",
                label(&format!("TMAP:  Track {}{}", i / 4, QUARTERS[i % 4])),
                trk
            );
        }
    }
    if let Some(flux) = &image.flux {
        for (i, &trk) in flux.iter().enumerate() {
            if trk != crate::tmap::NO_TRACK && image.tmap[i] == crate::tmap::NO_TRACK {
                println!(
                    "{} TRKS {}",
                    label(&format!("FLUX:  Track {}{}", i / 4, QUARTERS[i % 4])),
                    trk
                );
            }
        }
    }
}

fn print_trks(image: &crate::container::DiskImage) {
    for (i, track) in image.tracks.iter().enumerate() {
        println!(
            "{} {} bytes, {} bits",
            label(&format!("TRKS:  Track index {}:", i)),
            track.raw_bytes().len(),
            track.raw_count()
        );
    }
}

fn print_meta(image: &crate::container::DiskImage) {
    for (key, value) in image.meta.iter() {
        let values = value.values();
        println!("{} {}", label(&format!("META:  {}:", key)), values[0]);
        for v in &values[1..] {
            println!("{} {}", label("META:  "), v);
        }
    }
}
