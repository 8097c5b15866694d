//! Turkish-aware text folding for search comparisons.

use unicode_normalization::UnicodeNormalization;

/// Lowercases with Turkish dotted/dotless `i` rules. A plain Unicode
/// lowercase maps `I` to `i`, which is wrong for Turkish input, so the
/// two special cases run before the generic conversion.
pub fn normalize(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '\u{0130}' => out.push('i'), // İ
            'I' => out.push('ı'),
            _ => out.extend(ch.to_lowercase()),
        }
    }
    out
}

/// Canonical search key: normalize, decompose (NFD), strip combining
/// marks, then collapse dotless `ı` into `i`. Idempotent, so stored
/// folded keys and freshly folded queries compare directly.
pub fn fold(text: &str) -> String {
    normalize(text)
        .chars()
        .nfd()
        .filter(|ch| !matches!(ch, '\u{0300}'..='\u{036f}'))
        .map(|ch| if ch == 'ı' { 'i' } else { ch })
        .collect()
}

/// Splits a raw query into folded tokens. An empty result is the
/// "match everything" sentinel.
pub fn tokenize(query: &str) -> Vec<String> {
    fold(query)
        .split_whitespace()
        .map(str::to_owned)
        .collect()
}

/// AND-substring test over a folded haystack.
pub fn matches_tokens(folded: &str, tokens: &[String]) -> bool {
    tokens.iter().all(|token| folded.contains(token.as_str()))
}
