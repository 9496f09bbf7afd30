//! `remove`: delete one or more tracks from a 5.25-inch image.
//!
//! Grounded in `original_source/wozardry.py`'s `_CommandRemove.update`,
//! which rejects non-5.25-inch images and otherwise tolerates removing a
//! quarter-track that was never present.

use clap::ArgMatches;

use crate::error::ContainerError;
use crate::tmap;
use crate::STDRESULT;

pub fn remove(cmd: &ArgMatches) -> STDRESULT {
    let dimg_path = cmd.get_one::<String>("dimg").expect("required");
    let out_path = cmd.get_one::<String>("out").expect("required");
    let mut image = super::load_image(dimg_path)?;

    if image.info.disk_type != 1 {
        return Err(Box::new(ContainerError::BadDiskType));
    }

    for t in cmd.get_many::<String>("track").expect("required") {
        let track_num: f64 = t.parse().map_err(|_| super::CommandError::BadQuarterTrack)?;
        let hp = tmap::track_num_to_half_phase(track_num)?;
        tmap::remove(&mut image.tmap, image.flux.as_mut(), &mut image.tracks, hp)?;
    }

    super::write_image_atomically(&image, out_path)?;
    Ok(())
}
