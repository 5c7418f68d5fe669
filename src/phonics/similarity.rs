/// Normalized edit-distance similarity in `[0, 1]`.
///
/// Callers are expected to have lowercased and trimmed both inputs. Two empty
/// strings count as equal; exactly one empty string scores 0.
pub fn similarity(a: &str, b: &str) -> f64 {
    if a == b {
        return 1.0;
    }
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }
    strsim::normalized_levenshtein(a, b)
}
