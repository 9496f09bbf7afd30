//! `import`: apply META edits from a JSON document onto a base image.
//!
//! Grounded in `original_source/wozardry.py`'s `_CommandImport`
//! (`self.disk_image.from_json(...)`), which only ever updates `meta`;
//! `json::apply_meta_from_json` preserves that read-only-INFO behavior.

use clap::ArgMatches;

use crate::STDRESULT;

pub fn import(cmd: &ArgMatches) -> STDRESULT {
    let dimg_path = cmd.get_one::<String>("dimg").expect("required");
    let json_path = cmd.get_one::<String>("json").expect("required");
    let out_path = cmd.get_one::<String>("out").expect("required");

    let mut image = super::load_image(dimg_path)?;
    let text = std::fs::read_to_string(json_path)?;
    crate::json::apply_meta_from_json(&mut image, &text)?;
    super::write_image_atomically(&image, out_path)?;
    Ok(())
}
