//! `verify`: load an image and report whether it is well-formed.
//!
//! Grounded in `original_source/wozardry.py`'s `_CommandVerify`, which
//! produces no output unless a problem is found.

use clap::ArgMatches;
use log::info;

use crate::STDRESULT;

pub fn verify(cmd: &ArgMatches) -> STDRESULT {
    let path = cmd.get_one::<String>("dimg").expect("required");
    super::load_image(path)?;
    info!("{} is well-formed", path);
    Ok(())
}
