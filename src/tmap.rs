//! # TMAP / FLUX chunks and track-map operations
//!
//! Both chunks are a flat 160-entry quarter-phase table; FLUX carries the
//! same semantics as TMAP but is WOZ3/MOOF-only. Operations (`add`,
//! `remove`, `clean`, `seek`) are grounded in
//! `original_source/wozardry.py`'s `WozDiskImage` track-map methods.

use crate::error::TrackMapError;
use crate::track::Track;

pub const TMAP_LEN: usize = 160;
pub const NO_TRACK: u8 = 0xFF;

pub fn parse_map(payload: &[u8]) -> Option<[u8; TMAP_LEN]> {
    if payload.len() != TMAP_LEN {
        return None;
    }
    let mut map = [0u8; TMAP_LEN];
    map.copy_from_slice(payload);
    Some(map)
}

pub fn validate_against_track_count(map: &[u8; TMAP_LEN], track_count: usize) -> bool {
    map.iter().all(|&e| e == NO_TRACK || (e as usize) < track_count)
}

/// `n` must lie in `[0, 40]` with denominator in `{1, 2, 4}` once reduced;
/// returns the half-phase index `int(n * 4)`.
pub fn track_num_to_half_phase(n: f64) -> Result<usize, TrackMapError> {
    if !(0.0..=40.0).contains(&n) {
        return Err(TrackMapError::InvalidTrack);
    }
    let hp = n * 4.0;
    let rounded = hp.round();
    if (hp - rounded).abs() > 1e-9 {
        return Err(TrackMapError::InvalidTrack);
    }
    Ok(rounded as usize)
}

/// Appends `track`, writing its index into `tmap[hp]` and, when they
/// exist, `tmap[hp-1]` and `tmap[hp+1]` (the drive head straddles
/// adjacent quarter-phases).
pub fn add(tmap: &mut [u8; TMAP_LEN], tracks: &mut Vec<Track>, hp: usize, track: Track) -> Result<(), TrackMapError> {
    if hp >= TMAP_LEN {
        return Err(TrackMapError::InvalidTrack);
    }
    let idx = tracks.len() as u8;
    tracks.push(track);
    tmap[hp] = idx;
    if hp > 0 {
        tmap[hp - 1] = idx;
    }
    if hp + 1 < TMAP_LEN {
        tmap[hp + 1] = idx;
    }
    Ok(())
}

/// Sets `tmap[hp] = 0xFF` and compacts via `clean`.
pub fn remove(
    tmap: &mut [u8; TMAP_LEN],
    flux: Option<&mut [u8; TMAP_LEN]>,
    tracks: &mut Vec<Track>,
    hp: usize,
) -> Result<(), TrackMapError> {
    if hp >= TMAP_LEN {
        return Err(TrackMapError::InvalidTrack);
    }
    tmap[hp] = NO_TRACK;
    clean(tmap, flux, tracks);
    Ok(())
}

/// Deletes any Track referenced from neither `tmap` nor `flux`, then
/// decrements subsequent indices in both maps to stay consistent.
pub fn clean(tmap: &mut [u8; TMAP_LEN], flux: Option<&mut [u8; TMAP_LEN]>, tracks: &mut Vec<Track>) {
    let mut used = vec![false; tracks.len()];
    for &e in tmap.iter() {
        if e != NO_TRACK {
            used[e as usize] = true;
        }
    }
    if let Some(ref f) = flux {
        for &e in f.iter() {
            if e != NO_TRACK {
                used[e as usize] = true;
            }
        }
    }

    let mut remap = vec![NO_TRACK; tracks.len()];
    let mut kept = Vec::new();
    let drained: Vec<Track> = std::mem::take(tracks);
    for (i, t) in drained.into_iter().enumerate() {
        if used[i] {
            remap[i] = kept.len() as u8;
            kept.push(t);
        }
    }
    *tracks = kept;

    for e in tmap.iter_mut() {
        if *e != NO_TRACK {
            *e = remap[*e as usize];
        }
    }
    if let Some(f) = flux {
        for e in f.iter_mut() {
            if *e != NO_TRACK {
                *e = remap[*e as usize];
            }
        }
    }
}

/// Returns the Track at `tmap[hp]`; falls back to `flux[hp]` when present
/// and `tmap[hp]` is empty; otherwise `None` (the empty-track signal).
pub fn seek<'a>(
    tmap: &[u8; TMAP_LEN],
    flux: Option<&[u8; TMAP_LEN]>,
    tracks: &'a [Track],
    hp: usize,
) -> Option<&'a Track> {
    if hp >= TMAP_LEN {
        return None;
    }
    let idx = tmap[hp];
    if idx != NO_TRACK {
        return tracks.get(idx as usize);
    }
    if let Some(f) = flux {
        let fidx = f[hp];
        if fidx != NO_TRACK {
            return tracks.get(fidx as usize);
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn half_phase_accepts_quarter_fractions() {
        assert_eq!(track_num_to_half_phase(0.0).unwrap(), 0);
        assert_eq!(track_num_to_half_phase(0.25).unwrap(), 1);
        assert_eq!(track_num_to_half_phase(17.75).unwrap(), 71);
        assert_eq!(track_num_to_half_phase(40.0).unwrap(), 160);
    }

    #[test]
    fn half_phase_rejects_out_of_range() {
        assert!(track_num_to_half_phase(40.5).is_err());
        assert!(track_num_to_half_phase(-1.0).is_err());
    }

    #[test]
    fn add_straddles_adjacent_quarter_phases() {
        let mut tmap = [NO_TRACK; TMAP_LEN];
        let mut tracks = Vec::new();
        add(&mut tmap, &mut tracks, 4, Track::new(vec![0], 8)).unwrap();
        assert_eq!(tmap[3], 0);
        assert_eq!(tmap[4], 0);
        assert_eq!(tmap[5], 0);
    }

    #[test]
    fn clean_compacts_indices() {
        let mut tmap = [NO_TRACK; TMAP_LEN];
        let mut tracks = Vec::new();
        add(&mut tmap, &mut tracks, 0, Track::new(vec![0], 8)).unwrap();
        add(&mut tmap, &mut tracks, 80, Track::new(vec![1], 8)).unwrap();
        remove(&mut tmap, None, &mut tracks, 0).unwrap();
        assert_eq!(tracks.len(), 1);
        assert_eq!(tmap[80], 0);
        assert_eq!(tmap[1], NO_TRACK);
    }

    #[test]
    fn seek_falls_back_to_flux() {
        let tmap = [NO_TRACK; TMAP_LEN];
        let mut flux = [NO_TRACK; TMAP_LEN];
        flux[10] = 0;
        let tracks = vec![Track::new(vec![0], 8)];
        assert!(seek(&tmap, Some(&flux), &tracks, 10).is_some());
        assert!(seek(&tmap, None, &tracks, 10).is_none());
    }
}
