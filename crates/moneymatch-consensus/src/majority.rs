//! Series arithmetic.

/// Rounds needed to take a best-of-`max_matches` series: `⌈max_matches / 2⌉`.
#[must_use]
pub fn wins_needed(max_matches: u32) -> u32 {
    max_matches / 2 + 1
}

/// A series length is valid when it is odd, so no series can end tied.
#[must_use]
pub fn is_valid_series_length(max_matches: u32) -> bool {
    max_matches % 2 == 1
}
