//! Conversion between user-facing region strings and internal coordinates.
//!
//! Users write 1-based inclusive regions (`chr1:100-200`) or single
//! positions (`chr1:150`). Everything inside the crate is 0-based half-open
//! `[start, end)`; a single position becomes the zero-width point query
//! `[p, p)`.

use crate::interval::Position;
use crate::reference::Chromosome;

/// A parsed user region in internal coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Region {
    pub chrom: Chromosome,
    pub start: Position,
    pub end: Position,
}

/// Parse `chr:start-end` or `chr:pos` (1-based) into 0-based half-open
/// coordinates. A bare chromosome name selects the whole chromosome.
pub fn parse_user_region(region_str: &str) -> Option<Region> {
    let (chr_part, rng_part) = match region_str.split_once(':') {
        Some((c, r)) => (c, Some(r)),
        None => (region_str, None),
    };
    let chrom = chr_part.parse::<Chromosome>().ok()?;

    let Some(rng_part) = rng_part else {
        return Some(Region {
            chrom,
            start: 0,
            end: crate::interval::CHROM_MAX,
        });
    };

    let rng_part = rng_part.replace(',', "");
    match rng_part.split_once('-') {
        Some((s, e)) => {
            let start_one_based = s.parse::<Position>().ok()?;
            let end_one_based = e.parse::<Position>().ok()?;
            if start_one_based < 1 || end_one_based < 1 || start_one_based > end_one_based {
                return None;
            }
            // [start-1, end)
            Some(Region {
                chrom,
                start: start_one_based - 1,
                end: end_one_based,
            })
        }
        None => {
            let pos_one_based = rng_part.parse::<Position>().ok()?;
            if pos_one_based < 1 {
                return None;
            }
            Some(Region {
                chrom,
                start: pos_one_based - 1,
                end: pos_one_based - 1,
            })
        }
    }
}

/// Format internal 0-based half-open coordinates as 1-based inclusive.
pub fn format_for_user(start_zero: Position, end_zero: Position) -> String {
    format!("{}-{}", start_zero + 1, end_zero)
}
