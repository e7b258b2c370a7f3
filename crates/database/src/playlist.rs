//! Playlist normalization and random selection.
//!
//! Stored direct lists come in three shapes, tried in order:
//!
//! 1. A JSON array of strings with at least one element.
//! 2. Comma-separated text; pieces are trimmed and blanks dropped.
//! 3. Any other non-empty text, taken as a single playlist.
//!
//! Anything else normalizes to an empty list.

use rand::Rng;

/// Outcome of one parser attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Parsed {
    /// The parser recognized the text.
    Found(Vec<String>),
    /// Not this format; try the next parser.
    Next,
}

/// A single step of the format chain.
pub type Parser = fn(&str) -> Parsed;

/// Format parsers in priority order.
pub const PARSERS: [(&str, Parser); 3] = [
    ("json", parse_json_list),
    ("comma", parse_comma_separated),
    ("single", parse_single),
];

/// A JSON list of strings, accepted only when it has at least one element.
pub fn parse_json_list(raw: &str) -> Parsed {
    match serde_json::from_str::<Vec<String>>(raw) {
        Ok(list) if !list.is_empty() => Parsed::Found(list),
        _ => Parsed::Next,
    }
}

/// Comma-separated text. Recognized whenever a comma is present, even if
/// every piece turns out blank.
pub fn parse_comma_separated(raw: &str) -> Parsed {
    if !raw.contains(',') {
        return Parsed::Next;
    }
    Parsed::Found(
        raw.split(',')
            .map(str::trim)
            .filter(|piece| !piece.is_empty())
            .map(str::to_string)
            .collect(),
    )
}

/// The whole text as one playlist.
pub fn parse_single(raw: &str) -> Parsed {
    if raw.is_empty() {
        return Parsed::Next;
    }
    Parsed::Found(vec![raw.to_string()])
}

/// Normalize a stored playlist representation into an ordered list.
pub fn parse_playlists(raw: &str) -> Vec<String> {
    for (_, parser) in PARSERS {
        if let Parsed::Found(list) = parser(raw) {
            return list;
        }
    }
    Vec::new()
}

/// Pick one playlist uniformly at random.
///
/// Returns `None` for an empty list.
pub fn select_random(playlists: &[String]) -> Option<&str> {
    select_random_with(playlists, &mut rand::thread_rng())
}

/// Pick one playlist uniformly at random using the given generator.
pub fn select_random_with<'a, R: Rng + ?Sized>(
    playlists: &'a [String],
    rng: &mut R,
) -> Option<&'a str> {
    if playlists.is_empty() {
        return None;
    }
    let index = rng.gen_range(0..playlists.len());
    Some(playlists[index].as_str())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_json_list() {
        assert_eq!(parse_playlists(r#"["p1","p2"]"#), strings(&["p1", "p2"]));
    }

    #[test]
    fn test_comma_separated_is_trimmed() {
        assert_eq!(parse_playlists("p1, p2, p3"), strings(&["p1", "p2", "p3"]));
        assert_eq!(parse_playlists("p1,, ,p2"), strings(&["p1", "p2"]));
    }

    #[test]
    fn test_single_playlist() {
        assert_eq!(parse_playlists("p1"), strings(&["p1"]));
        assert_eq!(parse_playlists("Chill Vibes"), strings(&["Chill Vibes"]));
    }

    #[test]
    fn test_empty_text() {
        assert!(parse_playlists("").is_empty());
    }

    #[test]
    fn test_only_commas_stays_empty() {
        // The comma parser claims the text, so the single-playlist fallback never runs.
        assert!(parse_playlists(" , ,").is_empty());
    }

    #[test]
    fn test_empty_json_list_falls_through() {
        assert_eq!(parse_json_list("[]"), Parsed::Next);
        assert_eq!(parse_playlists("[]"), strings(&["[]"]));
    }

    #[test]
    fn test_non_string_json_falls_back_to_commas() {
        assert_eq!(parse_json_list("[1,2]"), Parsed::Next);
        assert_eq!(parse_playlists("[1,2]"), strings(&["[1", "2]"]));
    }

    #[test]
    fn test_parser_order() {
        let names: Vec<&str> = PARSERS.iter().map(|(name, _)| *name).collect();
        assert_eq!(names, vec!["json", "comma", "single"]);
    }

    #[test]
    fn test_select_random_empty() {
        assert_eq!(select_random(&[]), None);
    }

    #[test]
    fn test_select_random_single() {
        let playlists = strings(&["only"]);
        for _ in 0..10 {
            assert_eq!(select_random(&playlists), Some("only"));
        }
    }

    #[test]
    fn test_selection_is_roughly_uniform() {
        let playlists = strings(&["A", "B", "C", "D"]);
        let mut rng = StdRng::seed_from_u64(7);
        let mut counts = [0usize; 4];
        let draws = 40_000;

        for _ in 0..draws {
            let picked = select_random_with(&playlists, &mut rng).unwrap();
            let index = playlists.iter().position(|p| p == picked).unwrap();
            counts[index] += 1;
        }

        let expected = draws / playlists.len();
        for count in counts {
            assert!(count > 0);
            let deviation = (count as f64 - expected as f64).abs() / expected as f64;
            assert!(deviation < 0.05, "count {} too far from {}", count, expected);
        }
    }
}
