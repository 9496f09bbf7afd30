use assert_cmd::cargo;
use predicates::prelude::*;
use std::path::PathBuf;

use wozardry_rs::container::DiskImage;
use wozardry_rs::info::{ImageType, Info};
use wozardry_rs::meta::Meta;
use wozardry_rs::tmap::{NO_TRACK, TMAP_LEN};

type STDRESULT = Result<(), Box<dyn std::error::Error>>;

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
            compatible_hardware: Vec::new(),
            required_ram: 0,
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

fn write_sample(dir: &tempfile::TempDir, name: &str) -> PathBuf {
    let path = dir.path().join(name);
    let bytes = sample_image().dump().expect("sample image must serialize");
    std::fs::write(&path, bytes).expect("write sample image");
    path
}

#[test]
fn verify_accepts_well_formed_image() -> STDRESULT {
    let dir = tempfile::tempdir()?;
    let path = write_sample(&dir, "sample.woz");
    let mut cmd = cargo::cargo_bin_cmd!("wozardry-rs");
    cmd.arg("verify").arg("-d").arg(&path).assert().success();
    Ok(())
}

#[test]
fn verify_rejects_corrupt_image() -> STDRESULT {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("broken.woz");
    std::fs::write(&path, b"not a woz file at all")?;
    let mut cmd = cargo::cargo_bin_cmd!("wozardry-rs");
    cmd.arg("verify").arg("-d").arg(&path).assert().failure();
    Ok(())
}

#[test]
fn dump_prints_info_fields() -> STDRESULT {
    let dir = tempfile::tempdir()?;
    let path = write_sample(&dir, "sample.woz");
    let mut cmd = cargo::cargo_bin_cmd!("wozardry-rs");
    cmd.arg("dump")
        .arg("-d")
        .arg(&path)
        .arg("-f")
        .arg("info")
        .assert()
        .success()
        .stdout(predicate::str::contains("wozardry"));
    Ok(())
}

#[test]
fn export_then_import_round_trips_meta() -> STDRESULT {
    let dir = tempfile::tempdir()?;
    let path = write_sample(&dir, "sample.woz");
    let json_path = dir.path().join("sample.json");

    let mut cmd = cargo::cargo_bin_cmd!("wozardry-rs");
    cmd.arg("export").arg("-d").arg(&path).arg("-j").arg(&json_path).assert().success();
    assert!(std::fs::read_to_string(&json_path)?.contains("wozardry"));

    // import only ever applies `woz.meta`; INFO here is read-only reporting,
    // so any well-formed INFO block is accepted.
    let doc = r#"{"woz":{"info":{"version":2,"disk_type":1,"write_protected":false,
        "synchronized":false,"creator":"x","disk_sides":1,"boot_sector_format":0,
        "optimal_bit_timing":32,"compatible_hardware":[],"required_ram":0,
        "largest_track":0},"meta":{"side":["A"]}}}"#;
    std::fs::write(&json_path, doc)?;

    let out_path = dir.path().join("out.woz");
    let mut cmd = cargo::cargo_bin_cmd!("wozardry-rs");
    cmd.arg("import")
        .arg("-d")
        .arg(&path)
        .arg("-j")
        .arg(&json_path)
        .arg("-o")
        .arg(&out_path)
        .assert()
        .success();

    let reloaded = DiskImage::load(&std::fs::read(&out_path)?)?;
    assert_eq!(reloaded.meta.get("side").unwrap().values(), vec!["A"]);
    Ok(())
}

#[test]
fn edit_sets_info_field() -> STDRESULT {
    let dir = tempfile::tempdir()?;
    let path = write_sample(&dir, "sample.woz");
    let out_path = dir.path().join("out.woz");

    let mut cmd = cargo::cargo_bin_cmd!("wozardry-rs");
    cmd.arg("edit")
        .arg("-d")
        .arg(&path)
        .arg("--info")
        .arg("creator:new creator")
        .arg("-o")
        .arg(&out_path)
        .assert()
        .success();

    let reloaded = DiskImage::load(&std::fs::read(&out_path)?)?;
    assert_eq!(reloaded.info.creator, "new creator");
    Ok(())
}

#[test]
fn edit_disk_type_resets_optimal_bit_timing_default() -> STDRESULT {
    let dir = tempfile::tempdir()?;
    let path = write_sample(&dir, "sample.woz"); // disk_type 1, optimal_bit_timing 32
    let out_path = dir.path().join("out.woz");

    let mut cmd = cargo::cargo_bin_cmd!("wozardry-rs");
    cmd.arg("edit")
        .arg("-d")
        .arg(&path)
        .arg("--info")
        .arg("disk_type:2")
        .arg("-o")
        .arg(&out_path)
        .assert()
        .success();

    let reloaded = DiskImage::load(&std::fs::read(&out_path)?)?;
    assert_eq!(reloaded.info.disk_type, 2);
    assert_eq!(reloaded.info.optimal_bit_timing, 16);
    Ok(())
}

#[test]
fn remove_rejects_non_525_images() -> STDRESULT {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("moof.woz");
    let mut image = sample_image();
    image.info.disk_type = 2; // 3.5-inch
    std::fs::write(&path, image.dump()?)?;
    let out_path = dir.path().join("out.woz");

    let mut cmd = cargo::cargo_bin_cmd!("wozardry-rs");
    cmd.arg("remove")
        .arg("-d")
        .arg(&path)
        .arg("--track")
        .arg("1.0")
        .arg("-o")
        .arg(&out_path)
        .assert()
        .failure();
    Ok(())
}
