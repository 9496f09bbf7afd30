//! # Error Taxonomy
//!
//! One flat enum per subsystem boundary, each variant a short human-readable
//! message. Mirrors the pattern of `img::Error` in the wider a2kit crate, but
//! scoped down to the WOZ/MOOF container and the 3.5-inch RWTS decoder.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ContainerError {
    #[error("unexpected end of file")]
    Eof,
    #[error("CRC-32 mismatch")]
    Crc,
    #[error("missing WOZ/MOOF marker bytes")]
    NoWozMarker,
    #[error("missing 0xFF byte in header")]
    NoFf,
    #[error("missing LF byte in header")]
    NoLf,
    #[error("chunk size does not match expected length")]
    BadChunkSize,
    #[error("INFO chunk must appear first")]
    MissingInfoChunk,
    #[error("unsupported or invalid version byte")]
    BadVersion,
    #[error("invalid disk_type")]
    BadDiskType,
    #[error("invalid write_protected flag")]
    BadWriteProtected,
    #[error("invalid synchronized flag")]
    BadSynchronized,
    #[error("invalid cleaned flag")]
    BadCleaned,
    #[error("creator field is not valid UTF-8")]
    BadCreator,
    #[error("invalid disk_sides")]
    BadDiskSides,
    #[error("invalid boot_sector_format")]
    BadBootSectorFormat,
    #[error("invalid optimal_bit_timing")]
    BadOptimalBitTiming,
    #[error("invalid compatible_hardware bitfield")]
    BadCompatibleHardware,
    #[error("invalid required_ram value")]
    BadRam,
    #[error("TMAP chunk must precede TRKS/FLUX/WRIT/META")]
    MissingTmapChunk,
    #[error("malformed TRKS chunk")]
    BadTrks,
    #[error("invalid starting_block in TRK descriptor")]
    BadStartingBlock,
    #[error("track bitstream block_count does not match payload")]
    BadBlockCount,
    #[error("invalid bit_count in TRK descriptor")]
    BadBitCount,
    #[error("META payload is not valid UTF-8")]
    EncodingError,
    #[error("META line is missing its tab separator")]
    NotEnoughTabs,
    #[error("META line has more than one tab separator")]
    TooManyTabs,
    #[error("duplicate META key")]
    DuplicateKey,
    #[error("META value contains a forbidden character")]
    BadValue,
    #[error("META language value is not a recognized language")]
    BadLanguage,
    #[error("META requires_ram value is not a recognized amount")]
    BadMetaRam,
    #[error("META requires_machine value is not a recognized machine")]
    BadMachine,
    #[error("internal error: freshly written image failed to reload")]
    InternalError,
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

#[derive(Error, Debug)]
pub enum RwtsError {
    #[error("disk nibble is outside the valid 6-and-2 translation range")]
    InvalidNibble,
}

#[derive(Error, Debug)]
pub enum TrackMapError {
    #[error("quarter-track number is out of range")]
    InvalidTrack,
}
