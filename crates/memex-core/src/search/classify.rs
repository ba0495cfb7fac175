//! Query classification (§4.5.1): pick the candidate-path fusion weights
//! that best fit the shape of the incoming query.

use once_cell::sync::Lazy;
use regex::Regex;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryClass {
    /// Looks like a bare identifier / dotted path (`fooBar`, `a.b.c`, a
    /// `camelCase` or `snake_case` token with no spaces).
    Identifier,
    /// A natural-language question or description.
    Semantic,
    /// References graph shape directly ("what calls X", "who imports Y").
    Structural,
}

/// Relative weight given to each candidate path's RRF contribution for a
/// query class (§4.5.3 weighted RRF).
#[derive(Debug, Clone, Copy)]
pub struct FusionWeights {
    pub fts: f32,
    pub dense: f32,
    pub graph: f32,
}

static IDENTIFIER_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z_$][A-Za-z0-9_$]*(?:[.:][A-Za-z_$][A-Za-z0-9_$]*)*$").unwrap()
});
static STRUCTURAL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(calls?|imports?|implements?|extends?|depends? on|who (calls|imports|uses)|what (calls|imports|uses))\b")
        .unwrap()
});

pub fn classify(query: &str) -> QueryClass {
    let trimmed = query.trim();
    if !trimmed.contains(' ') && IDENTIFIER_RE.is_match(trimmed) {
        return QueryClass::Identifier;
    }
    if STRUCTURAL_RE.is_match(trimmed) {
        return QueryClass::Structural;
    }
    QueryClass::Semantic
}

impl QueryClass {
    pub fn fusion_weights(self) -> FusionWeights {
        match self {
            QueryClass::Identifier => FusionWeights { fts: 1.3, dense: 0.6, graph: 1.0 },
            QueryClass::Semantic => FusionWeights { fts: 0.7, dense: 1.3, graph: 0.7 },
            QueryClass::Structural => FusionWeights { fts: 0.6, dense: 0.5, graph: 1.5 },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_identifier_classifies_as_identifier() {
        assert_eq!(classify("computeRetrievability"), QueryClass::Identifier);
        assert_eq!(classify("mod.sub.func"), QueryClass::Identifier);
    }

    #[test]
    fn structural_phrasing_classifies_as_structural() {
        assert_eq!(classify("what calls parseConfig"), QueryClass::Structural);
        assert_eq!(classify("who imports the logger module"), QueryClass::Structural);
    }

    #[test]
    fn natural_language_falls_back_to_semantic() {
        assert_eq!(classify("why does the retry loop spin forever"), QueryClass::Semantic);
    }
}
