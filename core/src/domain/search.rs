//! Query filtering over a registry snapshot.
//!
//! A query made only of ASCII digits is a port filter: it keeps every entity
//! whose port contains it as a substring, so `80` matches 80, 8080 and 8000.
//! Anything else is a fuzzy query over the textual attributes. A fuzzy hit is
//! either a skim subsequence match or a near miss by edit distance, so small
//! typos such as `ngnix` still find `nginx`.

use fuzzy_matcher::skim::SkimMatcherV2;
use fuzzy_matcher::FuzzyMatcher;

use super::PortProcess;

/// Minimum fuzzy score, per query character, for an entity to match.
pub const FUZZY_MIN_SCORE_PER_CHAR: i64 = 8;

/// Minimum normalized edit-distance similarity (0.0 to 1.0) for a typo match.
pub const SIMILARITY_THRESHOLD: f64 = 0.6;

/// Filter `entities` by `query`.
///
/// Numeric and empty queries keep the input order. Fuzzy results are ranked
/// by similarity and then by skim score, best first.
pub fn search(query: &str, entities: &[PortProcess]) -> Vec<PortProcess> {
    if query.is_empty() {
        return entities.to_vec();
    }

    if is_port_query(query) {
        return entities
            .iter()
            .filter(|p| p.port.to_string().contains(query))
            .cloned()
            .collect();
    }

    fuzzy_search(query, entities)
}

/// Digits only, no sign, any length.
pub fn is_port_query(query: &str) -> bool {
    !query.is_empty() && query.bytes().all(|b| b.is_ascii_digit())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
struct Rank {
    similarity: i64,
    score: i64,
}

fn fuzzy_search(query: &str, entities: &[PortProcess]) -> Vec<PortProcess> {
    let matcher = SkimMatcherV2::default().ignore_case();
    let min_score = FUZZY_MIN_SCORE_PER_CHAR * query.chars().count() as i64;
    let folded = query.to_lowercase();

    let mut hits: Vec<(Rank, &PortProcess)> = entities
        .iter()
        .filter_map(|p| {
            let fields = fields(p);
            let score = fields
                .iter()
                .filter_map(|field| matcher.fuzzy_match(field, query))
                .max();
            let similarity = fields
                .iter()
                .map(|field| similarity(field, &folded))
                .fold(0.0, f64::max);

            let skim_hit = score.is_some_and(|s| s >= min_score);
            if !skim_hit && similarity < SIMILARITY_THRESHOLD {
                return None;
            }
            let rank = Rank {
                similarity: (similarity * 1000.0).round() as i64,
                score: score.unwrap_or(0),
            };
            Some((rank, p))
        })
        .collect();

    // Stable, so equal ranks keep snapshot order.
    hits.sort_by(|a, b| b.0.cmp(&a.0));
    hits.into_iter().map(|(_, p)| p.clone()).collect()
}

fn fields(entity: &PortProcess) -> Vec<String> {
    [
        Some(entity.port.to_string()),
        Some(entity.process_name.clone()),
        Some(entity.command.clone()),
        entity.user.clone(),
        entity.cwd.clone(),
    ]
    .into_iter()
    .flatten()
    .filter(|field| !field.is_empty())
    .collect()
}

/// Best similarity between the case-folded query and the field or any of its
/// words, so `/usr/sbin/ngnix` is judged word by word.
fn similarity(field: &str, folded_query: &str) -> f64 {
    let field = field.to_lowercase();
    let whole = strsim::normalized_damerau_levenshtein(&field, folded_query);

    field
        .split(|c: char| !c.is_alphanumeric())
        .filter(|word| !word.is_empty())
        .map(|word| strsim::normalized_damerau_levenshtein(word, folded_query))
        .fold(whole, f64::max)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Protocol;

    fn entity(port: u16, pid: u32, name: &str) -> PortProcess {
        PortProcess::new(pid, port, Protocol::Tcp, "LISTEN", "0.0.0.0", name)
    }

    fn ports(list: &[PortProcess]) -> Vec<u16> {
        list.iter().map(|p| p.port).collect()
    }

    #[test]
    fn test_empty_query_returns_all() {
        let list = vec![entity(80, 1, "nginx"), entity(22, 2, "sshd")];
        assert_eq!(search("", &list), list);
    }

    #[test]
    fn test_numeric_query_is_substring_match() {
        let list = vec![entity(80, 1, "a"), entity(8080, 2, "b"), entity(8000, 3, "c"), entity(22, 4, "d")];
        assert_eq!(ports(&search("80", &list)), vec![80, 8080, 8000]);

        let list = vec![entity(80, 1, "a"), entity(443, 2, "b"), entity(8443, 3, "c")];
        assert_eq!(ports(&search("443", &list)), vec![443, 8443]);
    }

    #[test]
    fn test_port_query_is_digits_only() {
        assert!(is_port_query("80"));
        assert!(is_port_query("0"));
        assert!(is_port_query("123456789012345678901234"));
        assert!(!is_port_query(""));
        assert!(!is_port_query("+80"));
        assert!(!is_port_query("-1"));
        assert!(!is_port_query("80a"));
        assert!(!is_port_query("٨٠"));
    }

    #[test]
    fn test_long_numeric_query_filters_ports() {
        let list = vec![entity(80, 1, "a"), entity(8080, 2, "b")];
        assert!(search("123456789012345678901234", &list).is_empty());
    }

    #[test]
    fn test_numeric_query_does_not_match_pid() {
        let list = vec![entity(22, 8080, "sshd")];
        assert!(search("8080", &list).is_empty());
    }

    #[test]
    fn test_fuzzy_query_by_name() {
        let list = vec![entity(80, 1, "nginx"), entity(3000, 2, "node"), entity(6379, 3, "redis-server")];
        let result = search("nginx", &list);
        let names: Vec<&str> = result.iter().map(|p| p.process_name.as_str()).collect();
        assert!(names.contains(&"nginx"));
        assert!(!names.contains(&"redis-server"));
    }

    #[test]
    fn test_fuzzy_query_tolerates_gaps() {
        let list = vec![entity(80, 1, "nginx"), entity(6379, 3, "redis-server")];
        let result = search("ngx", &list);
        assert_eq!(ports(&result), vec![80]);
    }

    #[test]
    fn test_fuzzy_query_tolerates_typos() {
        let list = vec![entity(80, 1, "nginx"), entity(5432, 2, "postgres")];
        assert_eq!(ports(&search("ngimx", &list)), vec![80]);
        assert_eq!(ports(&search("ngnix", &list)), vec![80]);
        assert_eq!(ports(&search("postgrse", &list)), vec![5432]);
        assert_eq!(ports(&search("NGNIX", &list)), vec![80]);
        assert!(search("mysql", &list).is_empty());
    }

    #[test]
    fn test_typo_matches_a_word_of_the_command() {
        let list = vec![
            entity(80, 1, "x").with_command("/usr/sbin/nginx -g daemon off;"),
            entity(6379, 2, "redis-server"),
        ];
        assert_eq!(ports(&search("ngnix", &list)), vec![80]);
    }

    #[test]
    fn test_exact_match_outranks_typo_match() {
        let list = vec![entity(1, 1, "ngimx"), entity(2, 2, "nginx")];
        assert_eq!(ports(&search("nginx", &list)), vec![2, 1]);
    }

    #[test]
    fn test_fuzzy_query_is_case_insensitive() {
        let list = vec![entity(5432, 1, "postgres")];
        assert_eq!(search("Postgres", &list).len(), 1);
    }

    #[test]
    fn test_fuzzy_query_matches_user_and_cwd() {
        let list = vec![
            entity(3000, 1, "node").with_cwd(Some("/home/dev/storefront".to_string())),
            entity(22, 2, "sshd").with_user(Some("root".to_string())),
        ];
        assert_eq!(ports(&search("storefront", &list)), vec![3000]);
        assert_eq!(ports(&search("root", &list)), vec![22]);
    }

    #[test]
    fn test_fuzzy_query_ranks_best_first() {
        let list = vec![
            entity(1, 1, "x").with_command("nxxxxxoxxxxxdxxxxxe"),
            entity(2, 2, "node"),
        ];
        let result = search("node", &list);
        assert_eq!(result.first().map(|p| p.port), Some(2));
    }
}
