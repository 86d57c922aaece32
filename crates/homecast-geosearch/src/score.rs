//! Token-level similarity scoring between a query and candidate labels.
//!
//! Exact and prefix matches dominate; a Levenshtein-based fuzzy verdict is
//! the tie-break of last resort for typos ("falmuoth" -> "falmouth").

/// Score for an exact token match.
const SCORE_EXACT: i64 = 15;
/// Score when the candidate token starts with the whole query word.
const SCORE_PREFIX: i64 = 12;
/// Score when the candidate token starts with the query's first 3 chars.
const SCORE_PREFIX3: i64 = 8;
/// Score when the candidate token contains the query word.
const SCORE_SUBSTRING: i64 = 5;

/// Minimum query-word length for the 3-char prefix rule.
const PREFIX3_MIN_LEN: usize = 3;
/// Minimum query-word length for the fuzzy rule.
const FUZZY_MIN_LEN: usize = 4;
/// Normalized similarity above which the fuzzy rule fires.
const FUZZY_THRESHOLD: f64 = 0.75;
/// Multiplier applied to the normalized similarity for the fuzzy score.
const FUZZY_SCALE: f64 = 4.0;

/// Bonus when every query word matched some candidate token.
const FULL_COVERAGE_BONUS: i64 = 10;
/// Penalty per query word that matched nothing.
const UNMATCHED_PENALTY: i64 = 5;

/// Classic dynamic-programming Levenshtein distance, case-insensitive.
/// Insertion, deletion, and substitution all cost 1.
pub fn levenshtein(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.to_lowercase().chars().collect();
    let b: Vec<char> = b.to_lowercase().chars().collect();
    let (m, n) = (a.len(), b.len());

    let mut prev = (0..=n).collect::<Vec<_>>();
    let mut curr = vec![0; n + 1];

    for i in 1..=m {
        curr[0] = i;
        for j in 1..=n {
            let cost = usize::from(a[i - 1] != b[j - 1]);
            curr[j] = (prev[j] + 1)
                .min(curr[j - 1] + 1)
                .min(prev[j - 1] + cost);
        }
        std::mem::swap(&mut prev, &mut curr);
    }
    prev[n]
}

/// Score how well one query word matches one candidate token.
///
/// Rules are tried independently and the best verdict wins; they do not
/// short-circuit each other.
pub fn score_token(query_word: &str, result_word: &str) -> i64 {
    let q = query_word.to_lowercase();
    let r = result_word.to_lowercase();
    if q.is_empty() || r.is_empty() {
        return 0;
    }

    let mut best = 0;

    if r == q {
        best = best.max(SCORE_EXACT);
    }
    if r.starts_with(&q) {
        best = best.max(SCORE_PREFIX);
    }
    if q.chars().count() >= PREFIX3_MIN_LEN {
        let head: String = q.chars().take(PREFIX3_MIN_LEN).collect();
        if r.starts_with(&head) {
            best = best.max(SCORE_PREFIX3);
        }
    }
    if r.contains(&q) {
        best = best.max(SCORE_SUBSTRING);
    }
    if q.chars().count() >= FUZZY_MIN_LEN {
        let max_len = q.chars().count().max(r.chars().count());
        if max_len > 0 {
            let similarity = 1.0 - levenshtein(&q, &r) as f64 / max_len as f64;
            if similarity > FUZZY_THRESHOLD {
                best = best.max((similarity * FUZZY_SCALE).floor() as i64);
            }
        }
    }

    best
}

/// Aggregate score of a candidate label against the full query.
///
/// Sums the best per-token verdict for each query word, rewards full
/// coverage, and penalizes unmatched words. The penalty can drive long
/// multi-word queries to zero before clamping; the ranker then drops them.
pub fn score_candidate(name: &str, query_words: &[String]) -> i64 {
    let tokens: Vec<String> = name
        .split(|c: char| c.is_whitespace() || c == ',')
        .filter(|t| !t.is_empty())
        .map(str::to_lowercase)
        .collect();

    let mut total = 0;
    let mut matched = 0;

    for word in query_words {
        let best = tokens
            .iter()
            .map(|t| score_token(word, t))
            .max()
            .unwrap_or(0);
        total += best;
        if best > 0 {
            matched += 1;
        }
    }

    if matched == query_words.len() {
        total += FULL_COVERAGE_BONUS;
    }
    total -= UNMATCHED_PENALTY * (query_words.len() - matched) as i64;

    total.max(0)
}
