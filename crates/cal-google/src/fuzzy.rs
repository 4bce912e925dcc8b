//! Substring-biased fuzzy matching
//!
//! Scores how well a query matches a candidate on a 0-100 scale,
//! case-insensitively, with a strong bias toward containment: the shorter
//! string is slid across every equal-length window of the longer one and the
//! best normalized edit-distance similarity wins. An exact substring scores
//! 100.

/// Score similarity between a query and a candidate, in [0, 100].
///
/// Pure and deterministic. Empty inputs score 0 unless both are empty.
pub fn partial_ratio(query: &str, candidate: &str) -> u8 {
    let a = query.to_lowercase();
    let b = candidate.to_lowercase();

    if a.is_empty() && b.is_empty() {
        return 100;
    }
    if a.is_empty() || b.is_empty() {
        return 0;
    }

    let (short, long): (Vec<char>, Vec<char>) = if a.chars().count() <= b.chars().count() {
        (a.chars().collect(), b.chars().collect())
    } else {
        (b.chars().collect(), a.chars().collect())
    };

    let window = short.len();
    let short_str: String = short.iter().collect();

    let mut best = 0u8;
    for start in 0..=(long.len() - window) {
        let slice: String = long[start..start + window].iter().collect();
        let distance = strsim::levenshtein(&short_str, &slice);
        let score = ((1.0 - distance as f64 / window as f64) * 100.0).round();
        let score = score.clamp(0.0, 100.0) as u8;
        if score > best {
            best = score;
            if best == 100 {
                break;
            }
        }
    }

    best
}
