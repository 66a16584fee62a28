//! Fuzzy genre matching.
//!
//! Free-text input is normalized to a slug and compared against the known
//! genre slugs with a Ratcliff/Obershelp similarity ratio. A clear winner is
//! picked automatically; anything closer is handed to the pager so the user
//! can choose.

use crate::error::PaginatorError;
use crate::pager::{LineSource, Paginator};
use crate::utils::{slug_to_title, title_to_slug};
use std::collections::HashMap;
use std::fmt;
use std::io::Write;

/// Maximum number of suggestions offered when no auto-pick is possible.
pub const MAX_SUGGESTIONS: usize = 10;

/// Minimum score for an automatic pick.
pub const AUTO_PICK_CUTOFF: f64 = 0.90;

/// Minimum lead over the runner-up for an automatic pick.
pub const AUTO_PICK_MARGIN: f64 = 0.07;

/// A known genre scored against the user's keyword.
#[derive(Debug, Clone, PartialEq)]
pub struct MatchCandidate {
    /// Genre slug.
    pub slug: String,
    /// Similarity in `[0, 1]`.
    pub score: f64,
}

impl fmt::Display for MatchCandidate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} (match {:.0}%)",
            slug_to_title(&self.slug),
            self.score * 100.0
        )
    }
}

/// How a genre was resolved.
#[derive(Debug, Clone, PartialEq)]
pub enum Resolution {
    /// The normalized keyword is a known slug.
    Exact(String),
    /// The best fuzzy match was a clear winner.
    AutoPicked(String),
    /// The user picked from the suggestion list.
    Chosen(String),
    /// The user quit the suggestion list.
    Cancelled,
}

impl Resolution {
    /// The resolved slug, unless the user cancelled.
    pub fn slug(&self) -> Option<&str> {
        match self {
            Resolution::Exact(slug) | Resolution::AutoPicked(slug) | Resolution::Chosen(slug) => {
                Some(slug)
            }
            Resolution::Cancelled => None,
        }
    }
}

/// Ratcliff/Obershelp similarity: twice the number of matched characters
/// over the total length of both strings.
///
/// Matching blocks are found by taking the longest common substring and
/// recursing on the pieces either side of it.
pub fn similarity_ratio(a: &str, b: &str) -> f64 {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let total = a.len() + b.len();
    if total == 0 {
        return 1.0;
    }

    2.0 * matched_characters(&a, &b) as f64 / total as f64
}

fn matched_characters(a: &[char], b: &[char]) -> usize {
    let mut b_positions: HashMap<char, Vec<usize>> = HashMap::new();
    for (j, &c) in b.iter().enumerate() {
        b_positions.entry(c).or_default().push(j);
    }

    let mut matched = 0;
    let mut queue = vec![(0, a.len(), 0, b.len())];
    while let Some((alo, ahi, blo, bhi)) = queue.pop() {
        let (i, j, size) = longest_match(a, &b_positions, alo, ahi, blo, bhi);
        if size == 0 {
            continue;
        }

        matched += size;
        if alo < i && blo < j {
            queue.push((alo, i, blo, j));
        }
        if i + size < ahi && j + size < bhi {
            queue.push((i + size, ahi, j + size, bhi));
        }
    }

    matched
}

/// Longest common block of `a[alo..ahi]` and `b[blo..bhi]`.
///
/// Ties resolve to the earliest start in `a`, then the earliest in `b`.
fn longest_match(
    a: &[char],
    b_positions: &HashMap<char, Vec<usize>>,
    alo: usize,
    ahi: usize,
    blo: usize,
    bhi: usize,
) -> (usize, usize, usize) {
    let (mut best_i, mut best_j, mut best_size) = (alo, blo, 0);
    // Length of the match ending at b[j] for the previous row of a.
    let mut run_lengths: HashMap<usize, usize> = HashMap::new();

    for (i, c) in a.iter().enumerate().take(ahi).skip(alo) {
        let mut next_run_lengths = HashMap::new();
        if let Some(positions) = b_positions.get(c) {
            for &j in positions {
                if j < blo {
                    continue;
                }
                if j >= bhi {
                    break;
                }

                let k = j
                    .checked_sub(1)
                    .and_then(|prev| run_lengths.get(&prev))
                    .copied()
                    .unwrap_or(0)
                    + 1;
                next_run_lengths.insert(j, k);
                if k > best_size {
                    best_i = i + 1 - k;
                    best_j = j + 1 - k;
                    best_size = k;
                }
            }
        }
        run_lengths = next_run_lengths;
    }

    (best_i, best_j, best_size)
}

/// Scores every known slug against `keyword` and sorts best first.
///
/// The keyword is normalized to a slug first. Equal scores keep the order of
/// `genres`.
pub fn rank_genres(keyword: &str, genres: &[String]) -> Vec<MatchCandidate> {
    let key = title_to_slug(keyword);
    let mut ranked: Vec<MatchCandidate> = genres
        .iter()
        .map(|slug| MatchCandidate {
            slug: slug.clone(),
            score: similarity_ratio(&key, slug),
        })
        .collect();

    ranked.sort_by(|a, b| b.score.total_cmp(&a.score));
    ranked
}

/// Returns the top candidate if it is good enough to pick without asking.
pub fn auto_pick(ranked: &[MatchCandidate]) -> Option<&MatchCandidate> {
    let best = ranked.first()?;
    let runner_up = ranked.get(1).map_or(0.0, |c| c.score);

    (best.score >= AUTO_PICK_CUTOFF && best.score - runner_up >= AUTO_PICK_MARGIN).then_some(best)
}

/// Resolves free text to one of `genres`.
///
/// An exact slug match wins outright. Otherwise a clear fuzzy winner is
/// picked, and failing that the top suggestions are offered through `pager`.
pub fn resolve_genre<I: LineSource, W: Write>(
    keyword: &str,
    genres: &[String],
    pager: &mut Paginator<I, W>,
) -> Result<Resolution, PaginatorError> {
    let key = title_to_slug(keyword);
    if genres.iter().any(|g| *g == key) {
        return Ok(Resolution::Exact(key));
    }

    let ranked = rank_genres(keyword, genres);
    if let Some(best) = auto_pick(&ranked) {
        return Ok(Resolution::AutoPicked(best.slug.clone()));
    }

    let suggestions = &ranked[..ranked.len().min(MAX_SUGGESTIONS)];
    let header = format!(
        "No exact genre match for '{}'. Closest matches:",
        keyword.trim()
    );
    let page_size = suggestions.len().max(1);

    Ok(
        match pager.paginate(suggestions, page_size, Some(&header), true)? {
            Some(choice) => Resolution::Chosen(choice.slug.clone()),
            None => Resolution::Cancelled,
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn genres(slugs: &[&str]) -> Vec<String> {
        slugs.iter().map(|s| s.to_string()).collect()
    }

    fn scripted(input: &str) -> Paginator<&[u8], Vec<u8>> {
        Paginator::new(input.as_bytes(), Vec::new())
    }

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_similarity_ratio() {
        assert!(close(similarity_ratio("abcd", "bcde"), 0.75));
        assert!(close(similarity_ratio("fantasy", "fantasy"), 1.0));
        assert!(close(similarity_ratio("", ""), 1.0));
        assert!(close(similarity_ratio("abc", ""), 0.0));
        assert!(close(similarity_ratio("abc", "xyz"), 0.0));
        // "science" + "fiction" matched: 2 * 14 / 29
        assert!(close(
            similarity_ratio("sciencefiction", "science-fiction"),
            28.0 / 29.0
        ));
        // "sci" + "fi" matched: 2 * 5 / 20
        assert!(close(similarity_ratio("scifi", "science-fiction"), 0.5));
    }

    #[test]
    fn test_similarity_uses_block_order() {
        // Only one of the two blocks can be matched in order.
        assert!(close(similarity_ratio("abxcd", "cdxab"), 2.0 * 2.0 / 10.0));
    }

    #[test]
    fn test_exact_match_skips_scoring() {
        let known = genres(&["science-fiction", "fantasy"]);
        let mut pager = scripted("");

        let resolution = resolve_genre("Science Fiction", &known, &mut pager).unwrap();

        assert_eq!(resolution, Resolution::Exact("science-fiction".to_string()));
        assert!(pager.into_output().is_empty());
    }

    #[test]
    fn test_ranking_orders_by_score() {
        let known = genres(&["fantasy", "science-fiction"]);
        let ranked = rank_genres("scifi", &known);

        assert_eq!(ranked[0].slug, "science-fiction");
        assert_eq!(ranked[1].slug, "fantasy");
        assert!(ranked[0].score > ranked[1].score);
    }

    #[test]
    fn test_ranking_ties_keep_input_order() {
        let known = genres(&["xyz", "uvw", "rst"]);
        let ranked = rank_genres("abc", &known);
        let slugs: Vec<&str> = ranked.iter().map(|c| c.slug.as_str()).collect();
        assert_eq!(slugs, vec!["xyz", "uvw", "rst"]);
    }

    #[test]
    fn test_clear_winner_is_auto_picked() {
        let known = genres(&["science-fiction", "fantasy"]);
        let mut pager = scripted("");

        let resolution = resolve_genre("sciencefiction", &known, &mut pager).unwrap();

        assert_eq!(
            resolution,
            Resolution::AutoPicked("science-fiction".to_string())
        );
        assert!(pager.into_output().is_empty());
    }

    #[test]
    fn test_near_tie_prompts_instead_of_auto_picking() {
        let known = genres(&["historical-fiction", "historical-fictions", "fantasy"]);
        let ranked = rank_genres("historical fictio", &known);
        assert!(ranked[0].score >= AUTO_PICK_CUTOFF);
        assert!(ranked[0].score - ranked[1].score < AUTO_PICK_MARGIN);
        assert!(auto_pick(&ranked).is_none());

        let mut pager = scripted("2\n");
        let resolution = resolve_genre("historical fictio", &known, &mut pager).unwrap();
        assert_eq!(
            resolution,
            Resolution::Chosen("historical-fictions".to_string())
        );

        let output = String::from_utf8(pager.into_output()).unwrap();
        assert!(output.contains("No exact genre match for 'historical fictio'. Closest matches:"));
        assert!(output.contains("1. Historical Fiction (match 97%)"));
        assert!(output.contains("2. Historical Fictions (match 94%)"));
    }

    #[test]
    fn test_low_scores_prompt_and_quit_cancels() {
        let known = genres(&["science-fiction", "fantasy"]);
        let mut pager = scripted("q\n");

        let resolution = resolve_genre("scifi", &known, &mut pager).unwrap();

        assert_eq!(resolution, Resolution::Cancelled);
        assert_eq!(resolution.slug(), None);
    }

    #[test]
    fn test_suggestions_are_capped() {
        let known: Vec<String> = (0..15).map(|i| format!("genre-{i}")).collect();
        let mut pager = scripted("q\n");

        resolve_genre("genre", &known, &mut pager).unwrap();

        let output = String::from_utf8(pager.into_output()).unwrap();
        assert!(output.contains("Page 1/1 (1-10 of 10)"));
        assert!(!output.contains("11. "));
    }

    #[test]
    fn test_candidate_display() {
        let candidate = MatchCandidate {
            slug: "young-adult".to_string(),
            score: 0.8333,
        };
        assert_eq!(candidate.to_string(), "Young Adult (match 83%)");
    }
}
