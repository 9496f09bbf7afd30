//! # CLI Subcommands
//!
//! Contains modules that run the subcommands.

pub mod dump;
pub mod edit;
pub mod export;
pub mod import;
pub mod remove;
pub mod verify;

use std::fs;
use std::io::Write;

use log::warn;

use crate::container::DiskImage;
use crate::error::ContainerError;

#[derive(thiserror::Error, Debug)]
pub enum CommandError {
    #[error("Command could not be interpreted")]
    InvalidCommand,
    #[error("field assignment is missing its ':' separator")]
    BadAssignment,
    #[error("unrecognized INFO field name")]
    UnknownInfoField,
    #[error("could not parse quarter-track number")]
    BadQuarterTrack,
}

/// Reads and parses the image at `path`.
pub fn load_image(path: &str) -> Result<DiskImage, Box<dyn std::error::Error>> {
    let buf = fs::read(path)?;
    Ok(DiskImage::load(&buf)?)
}

/// Serializes `image`, then writes it to `out_path` through a sibling
/// `.ardry` temp file and an atomic rename, so a crash or a refused
/// self-check never leaves a half-written image at the destination.
pub fn write_image_atomically(image: &DiskImage, out_path: &str) -> Result<(), Box<dyn std::error::Error>> {
    let bytes = image.dump().map_err(|e| {
        warn!("refusing to write an invalid file: {}", e);
        e
    })?;
    let tmp_path = format!("{}.ardry", out_path);
    {
        let mut tmp = fs::File::create(&tmp_path)?;
        tmp.write_all(&bytes)?;
    }
    fs::rename(&tmp_path, out_path)?;
    Ok(())
}

/// Splits a `key:value` CLI assignment, per wozardry's `k, v = i.split(":", 1)`.
pub fn split_assignment(s: &str) -> Result<(&str, &str), ContainerError> {
    s.split_once(':').ok_or(ContainerError::EncodingError)
}
