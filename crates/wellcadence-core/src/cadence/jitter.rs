//! Deterministic jitter.
//!
//! The offset is a pure function of the seed (the last trigger time, or
//! `now` on first run), so replaying the same history after a restart
//! yields the same schedule.

const MAX_JITTER_MIN: u32 = 3;

/// SplitMix64 finalizer.
pub fn splitmix64(seed: u64) -> u64 {
    let mut z = seed.wrapping_add(0x9E37_79B9_7F4A_7C15);
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}

/// Offset in whole minutes, uniformly spread over `[-jitter, +jitter]`.
pub fn jitter_offset_minutes(jitter_min: u32, seed: i64) -> i64 {
    let jitter = i64::from(jitter_min.min(MAX_JITTER_MIN));
    if jitter == 0 {
        return 0;
    }
    let span = (2 * jitter + 1) as u64;
    (splitmix64(seed as u64) % span) as i64 - jitter
}

/// `interval_min` plus the seeded offset, never below one minute.
pub fn jittered_minutes(interval_min: u32, jitter_min: u32, seed: i64) -> i64 {
    (i64::from(interval_min) + jitter_offset_minutes(jitter_min, seed)).max(1)
}
