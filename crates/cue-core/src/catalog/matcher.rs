//! Fuzzy song matching and ranking.
//!
//! Given a transcribed utterance like "yesterday by the beatles", find the
//! catalog track that the user most plausibly meant. Two search strategies
//! compete:
//!
//! * artist-aware: split the utterance on `" by "`, search by title, score
//!   candidates on weighted title + artist similarity with an artist floor;
//! * global: search on the raw utterance and score candidates by raw
//!   similarity to the whole query.
//!
//! A perfect title match wins immediately; otherwise the higher combined
//! score wins and ties go to the artist-aware branch, which carries more
//! signal when the user actually named an artist.
//!
//! All tuning knobs live in [`MatcherConfig`] — the values were found
//! empirically and belong in configuration, not constants.

use serde::{Deserialize, Serialize};

use super::CatalogError;
use crate::text::contains_rtl;

/// Scores are percentages.
pub const MAX_SCORE: f64 = 100.0;

/// Candidate retrieval seam. The Spotify client implements this; tests use
/// an in-memory stub.
pub trait CatalogSearch {
    /// Return one page of track candidates for `query`.
    fn search(
        &mut self,
        query: &str,
        limit: u32,
        offset: u32,
    ) -> Result<Vec<TrackCandidate>, CatalogError>;
}

/// Tuning for the ranking heuristic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatcherConfig {
    /// Candidates whose artist similarity falls below this are dropped from
    /// the artist-aware strategy.
    pub artist_floor: f64,
    /// An artist-aware title similarity at or above this short-circuits the
    /// strategy comparison.
    pub perfect_title: f64,
    /// Weight of title similarity in the combined score.
    pub title_weight: f64,
    /// Weight of artist similarity in the combined score.
    pub artist_weight: f64,
    /// Candidates fetched per search page.
    pub page_size: u32,
    /// Maximum pages fetched per strategy.
    pub max_pages: u32,
}

impl Default for MatcherConfig {
    fn default() -> Self {
        Self {
            artist_floor: 40.0,
            perfect_title: 94.0,
            title_weight: 0.7,
            artist_weight: 0.3,
            page_size: 10,
            max_pages: 3,
        }
    }
}

/// A track as returned by a catalog search.
#[derive(Debug, Clone, PartialEq)]
pub struct TrackCandidate {
    pub id: String,
    pub uri: String,
    pub name: String,
    pub artist: String,
}

/// The winning track plus its confidence score in `[0, 100]`.
#[derive(Debug, Clone)]
pub struct TrackMatch {
    pub id: String,
    pub uri: String,
    pub name: String,
    pub artist: String,
    pub score: f64,
}

/// An utterance split into title and optional artist.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedQuery {
    pub title: String,
    pub artist: Option<String>,
}

/// Split an utterance on the first `" by "`. RTL transcripts are never
/// split; display reordering makes the separator position unreliable.
pub fn parse_query(utterance: &str) -> ParsedQuery {
    let whole = || ParsedQuery {
        title: utterance.trim().to_string(),
        artist: None,
    };

    if contains_rtl(utterance) {
        return whole();
    }

    match utterance.split_once(" by ") {
        Some((title, artist)) if !title.trim().is_empty() && !artist.trim().is_empty() => {
            ParsedQuery {
                title: title.trim().to_string(),
                artist: Some(artist.trim().to_string()),
            }
        }
        _ => whole(),
    }
}

/// Case-insensitive string similarity as a percentage.
pub fn similarity(a: &str, b: &str) -> f64 {
    strsim::normalized_levenshtein(&a.to_lowercase(), &b.to_lowercase()) * MAX_SCORE
}

/// A candidate with its strategy scores attached.
#[derive(Debug, Clone)]
struct Scored {
    candidate: TrackCandidate,
    /// Similarity of the candidate's title to the parsed title part.
    title_sim: f64,
    /// Strategy-specific combined score, clamped to `[0, 100]`.
    combined: f64,
}

fn clamp_score(score: f64) -> f64 {
    score.clamp(0.0, MAX_SCORE)
}

/// Ranking order within a strategy: a perfect title outranks everything,
/// then combined score, then title similarity.
fn outranks(challenger: &Scored, incumbent: &Scored) -> bool {
    let challenger_perfect = challenger.title_sim >= MAX_SCORE;
    let incumbent_perfect = incumbent.title_sim >= MAX_SCORE;
    if challenger_perfect != incumbent_perfect {
        return challenger_perfect;
    }
    if challenger.combined != incumbent.combined {
        return challenger.combined > incumbent.combined;
    }
    challenger.title_sim > incumbent.title_sim
}

/// Fetch up to `max_pages` pages for a query, stopping early on a short
/// page.
fn paged_candidates(
    source: &mut dyn CatalogSearch,
    query: &str,
    config: &MatcherConfig,
) -> Result<Vec<TrackCandidate>, CatalogError> {
    let mut all = Vec::new();
    for page in 0..config.max_pages {
        let batch = source.search(query, config.page_size, page * config.page_size)?;
        let exhausted = (batch.len() as u32) < config.page_size;
        all.extend(batch);
        if exhausted {
            break;
        }
    }
    Ok(all)
}

/// Artist-aware strategy: score candidates from a title search, weighting
/// in artist similarity when the utterance named one.
fn artist_aware_best(
    candidates: Vec<TrackCandidate>,
    parsed: &ParsedQuery,
    config: &MatcherConfig,
) -> Option<Scored> {
    let mut best: Option<Scored> = None;

    for candidate in candidates {
        let title_sim = similarity(&candidate.name, &parsed.title);

        let combined = match parsed.artist {
            Some(ref artist) => {
                let artist_sim = similarity(&candidate.artist, artist);
                if artist_sim < config.artist_floor {
                    continue;
                }
                clamp_score(config.title_weight * title_sim + config.artist_weight * artist_sim)
            }
            None => title_sim,
        };

        let scored = Scored {
            candidate,
            title_sim,
            combined,
        };
        if best.as_ref().is_none_or(|b| outranks(&scored, b)) {
            best = Some(scored);
        }
    }

    best
}

/// Global strategy: score candidates from a raw-query search by similarity
/// to the whole utterance, taking the better of the bare title and the
/// "title by artist" rendering.
fn global_best(
    candidates: Vec<TrackCandidate>,
    utterance: &str,
    parsed: &ParsedQuery,
) -> Option<Scored> {
    let mut best: Option<Scored> = None;

    for candidate in candidates {
        let rendered = format!("{} by {}", candidate.name, candidate.artist);
        let combined = clamp_score(
            similarity(utterance, &candidate.name).max(similarity(utterance, &rendered)),
        );
        let title_sim = similarity(&candidate.name, &parsed.title);

        let scored = Scored {
            candidate,
            title_sim,
            combined,
        };
        if best.as_ref().is_none_or(|b| outranks(&scored, b)) {
            best = Some(scored);
        }
    }

    best
}

fn to_match(scored: Scored) -> TrackMatch {
    TrackMatch {
        id: scored.candidate.id,
        uri: scored.candidate.uri,
        name: scored.candidate.name,
        artist: scored.candidate.artist,
        score: scored.combined,
    }
}

/// Find the best-matching track for an utterance, or
/// [`CatalogError::NotFound`] when both strategies come up empty.
pub fn find_best_match(
    source: &mut dyn CatalogSearch,
    config: &MatcherConfig,
    utterance: &str,
) -> Result<TrackMatch, CatalogError> {
    let utterance = utterance.trim();
    if utterance.is_empty() {
        return Err(CatalogError::NotFound);
    }

    let parsed = parse_query(utterance);

    let aware = artist_aware_best(
        paged_candidates(source, &parsed.title, config)?,
        &parsed,
        config,
    );

    // A perfect title from the artist-aware branch cannot be beaten; skip
    // the second round trip.
    if let Some(ref a) = aware {
        if a.title_sim >= MAX_SCORE {
            return Ok(to_match(a.clone()));
        }
    }

    let global = global_best(
        paged_candidates(source, utterance, config)?,
        utterance,
        &parsed,
    );

    match (aware, global) {
        (None, None) => Err(CatalogError::NotFound),
        (Some(a), None) => Ok(to_match(a)),
        (None, Some(g)) => Ok(to_match(g)),
        (Some(a), Some(g)) => {
            if g.title_sim >= MAX_SCORE && a.title_sim < MAX_SCORE {
                return Ok(to_match(g));
            }
            if a.title_sim >= config.perfect_title {
                return Ok(to_match(a));
            }
            // Tie goes to the artist-aware branch.
            if a.combined >= g.combined {
                Ok(to_match(a))
            } else {
                Ok(to_match(g))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidate(id: &str, name: &str, artist: &str) -> TrackCandidate {
        TrackCandidate {
            id: id.to_string(),
            uri: format!("spotify:track:{id}"),
            name: name.to_string(),
            artist: artist.to_string(),
        }
    }

    /// In-memory catalog returning the same ranked list for every query,
    /// honoring limit/offset so pagination is exercised.
    struct StubCatalog {
        tracks: Vec<TrackCandidate>,
        calls: u32,
    }

    impl StubCatalog {
        fn new(tracks: Vec<TrackCandidate>) -> Self {
            Self { tracks, calls: 0 }
        }
    }

    impl CatalogSearch for StubCatalog {
        fn search(
            &mut self,
            _query: &str,
            limit: u32,
            offset: u32,
        ) -> Result<Vec<TrackCandidate>, CatalogError> {
            self.calls += 1;
            let start = (offset as usize).min(self.tracks.len());
            let end = (start + limit as usize).min(self.tracks.len());
            Ok(self.tracks[start..end].to_vec())
        }
    }

    #[test]
    fn parse_splits_on_first_by() {
        let parsed = parse_query("yesterday by the beatles");
        assert_eq!(parsed.title, "yesterday");
        assert_eq!(parsed.artist.as_deref(), Some("the beatles"));
    }

    #[test]
    fn parse_uses_first_separator_occurrence() {
        let parsed = parse_query("stand by me by ben e king");
        assert_eq!(parsed.title, "stand");
        assert_eq!(parsed.artist.as_deref(), Some("me by ben e king"));
    }

    #[test]
    fn parse_without_separator_keeps_whole_title() {
        let parsed = parse_query("bohemian rhapsody");
        assert_eq!(parsed.title, "bohemian rhapsody");
        assert_eq!(parsed.artist, None);
    }

    #[test]
    fn parse_never_splits_rtl_text() {
        let parsed = parse_query("הללויה by לאונרד");
        assert_eq!(parsed.artist, None);
    }

    #[test]
    fn similarity_is_bounded() {
        for (a, b) in [
            ("yesterday", "yesterday"),
            ("yesterday", "tomorrow"),
            ("", "anything"),
            ("a", ""),
        ] {
            let s = similarity(a, b);
            assert!((0.0..=MAX_SCORE).contains(&s), "{a} vs {b} gave {s}");
        }
    }

    #[test]
    fn combined_score_is_bounded() {
        let config = MatcherConfig::default();
        let mut catalog = StubCatalog::new(vec![
            candidate("1", "Yesterday", "The Beatles"),
            candidate("2", "Yesterday Once More", "Carpenters"),
            candidate("3", "Tomorrow", "Annie Cast"),
        ]);
        let m = find_best_match(&mut catalog, &config, "yesterday by the beatles").unwrap();
        assert!((0.0..=MAX_SCORE).contains(&m.score));
    }

    #[test]
    fn perfect_title_beats_closer_artist() {
        let config = MatcherConfig::default();
        let mut catalog = StubCatalog::new(vec![
            candidate("near", "Yesterdays", "The Beatles"),
            candidate("exact", "Yesterday", "The Beatles Revival Band"),
        ]);
        let m = find_best_match(&mut catalog, &config, "yesterday by the beatles").unwrap();
        assert_eq!(m.id, "exact");
    }

    #[test]
    fn empty_results_yield_not_found() {
        let config = MatcherConfig::default();
        let mut catalog = StubCatalog::new(vec![]);
        let result = find_best_match(&mut catalog, &config, "yesterday by the beatles");
        assert!(matches!(result, Err(CatalogError::NotFound)));
    }

    #[test]
    fn blank_utterance_yields_not_found() {
        let config = MatcherConfig::default();
        let mut catalog = StubCatalog::new(vec![candidate("1", "Something", "Someone")]);
        let result = find_best_match(&mut catalog, &config, "   ");
        assert!(matches!(result, Err(CatalogError::NotFound)));
    }

    #[test]
    fn beatles_acceptance_case() {
        // "Yesterday by The Beatles" must score at or near 100 and beat the
        // same title by a different artist.
        let config = MatcherConfig::default();
        let mut catalog = StubCatalog::new(vec![
            candidate("cover", "Yesterday", "Boyz II Men"),
            candidate("original", "Yesterday", "The Beatles"),
        ]);
        let m = find_best_match(&mut catalog, &config, "yesterday by the beatles").unwrap();
        assert_eq!(m.id, "original");
        assert!(m.score >= 99.0, "score was {}", m.score);
    }

    #[test]
    fn artist_floor_filters_wrong_artists() {
        let parsed = parse_query("yesterday by the beatles");
        let config = MatcherConfig::default();
        let best = artist_aware_best(
            vec![candidate("1", "Yesterday", "Rammstein")],
            &parsed,
            &config,
        );
        assert!(best.is_none());
    }

    #[test]
    fn missing_artist_scores_on_title_alone() {
        let parsed = parse_query("bohemian rhapsody");
        let config = MatcherConfig::default();
        let best = artist_aware_best(
            vec![
                candidate("q", "Bohemian Rhapsody", "Queen"),
                candidate("p", "Bohemian Like You", "The Dandy Warhols"),
            ],
            &parsed,
            &config,
        )
        .unwrap();
        assert_eq!(best.candidate.id, "q");
        assert!(best.combined >= 99.0);
    }

    #[test]
    fn short_page_stops_pagination() {
        let config = MatcherConfig {
            page_size: 2,
            max_pages: 5,
            ..MatcherConfig::default()
        };
        // Three tracks with page size two: page one full, page two short.
        let mut catalog = StubCatalog::new(vec![
            candidate("1", "Alpha", "A"),
            candidate("2", "Beta", "B"),
            candidate("3", "Gamma", "C"),
        ]);
        paged_candidates(&mut catalog, "anything", &config).unwrap();
        assert_eq!(catalog.calls, 2);
    }

    #[test]
    fn global_strategy_rescues_unsplit_queries() {
        // Raw-query scoring keeps working when no artist was parsed.
        let parsed = parse_query("shape of you");
        let best = global_best(
            vec![candidate("ed", "Shape of You", "Ed Sheeran")],
            "shape of you",
            &parsed,
        )
        .unwrap();
        assert!(best.combined >= 99.0);
    }

    #[test]
    fn tie_prefers_artist_aware_branch() {
        // Both branches see the same single candidate; the artist-aware
        // result must be the one returned (observable via its combined
        // weighting rather than the raw-query score).
        let config = MatcherConfig::default();
        let mut catalog = StubCatalog::new(vec![candidate("only", "Hello", "Adele")]);
        let m = find_best_match(&mut catalog, &config, "hello by adele").unwrap();
        assert_eq!(m.id, "only");
        assert!(m.score >= 99.0);
    }
}
