//! # `wozardry-rs`
//!
//! A reader/writer for the WOZ1, WOZ2, and MOOF floppy disk image
//! container formats, plus a 3.5-inch Apple "Moof RWTS" GCR sector
//! decoder/encoder.
//!
//! ## Architecture
//!
//! * `container` parses/serializes the chunked container: header, CRC-32,
//!   and the INFO/TMAP/TRKS/FLUX/WRIT/META chunk loop.
//! * `info`, `tmap`, `trks`, `meta` each own one chunk's wire format.
//! * `track` is the self-synchronizing bit/nibble cursor over a track's
//!   raw bitstream, used by both TRKS parsing and `rwts`.
//! * `rwts` decodes/encodes 3.5-inch GCR sectors (address field, data
//!   field, 6-and-2 translation, PACE protection keys) from a `Track`.
//! * `primitive` holds little-endian codecs and the CLI's string
//!   coercion helpers.
//! * `error` is the flat error taxonomy shared by every subsystem.
//! * `json` renders/parses the INFO+META JSON view used by `export`/`import`.
//! * `commands` and `cli` implement the `wozardry` command-line tool.

pub mod cli;
pub mod commands;
pub mod container;
pub mod error;
pub mod info;
pub mod json;
pub mod meta;
pub mod primitive;
pub mod rwts;
pub mod tmap;
pub mod track;
pub mod trks;

pub type DYNERR = Box<dyn std::error::Error>;
pub type STDRESULT = Result<(), Box<dyn std::error::Error>>;
