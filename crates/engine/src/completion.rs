/// Account names matching `query`, best first.
///
/// Every whitespace-separated fragment of the query must occur in the account
/// (case-insensitive). Accounts that start with the query come first, the rest
/// keep their alphabetical order. An exact match is not offered again.
pub fn complete<'a>(accounts: &'a [String], query: &str, limit: usize) -> Vec<&'a str> {
    let query = query.trim().to_lowercase();
    if query.is_empty() {
        return Vec::new();
    }
    let fragments: Vec<&str> = query.split_whitespace().collect();

    let mut matches: Vec<(bool, &str)> = accounts
        .iter()
        .map(String::as_str)
        .filter_map(|account| {
            let lower = account.to_lowercase();
            if lower == query || !fragments.iter().all(|f| lower.contains(f)) {
                return None;
            }
            Some((!lower.starts_with(&query), account))
        })
        .collect();
    matches.sort();
    matches
        .into_iter()
        .take(limit)
        .map(|(_, account)| account)
        .collect()
}
