//! `export`: write INFO and META as JSON.
//!
//! Grounded in `original_source/wozardry.py`'s `_CommandExport`
//! (`self.disk_image.to_json()`), here writing to a file path instead of
//! stdout since the CLI surface takes an explicit `-j/--json` argument.

use clap::ArgMatches;

use crate::STDRESULT;

pub fn export(cmd: &ArgMatches) -> STDRESULT {
    let dimg_path = cmd.get_one::<String>("dimg").expect("required");
    let json_path = cmd.get_one::<String>("json").expect("required");

    let image = super::load_image(dimg_path)?;
    let text = crate::json::to_json(&image);
    std::fs::write(json_path, text)?;
    Ok(())
}
