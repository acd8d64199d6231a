/// Round-robin pairing of a group roster.
///
/// Every competitor is paired once with every competitor listed after it, so
/// the first listed side of each pair is "home". For n competitors the result
/// has exactly n*(n-1)/2 entries, no duplicates and no self-pairs. Pure and
/// storage-free.
pub fn round_robin(roster: &[String]) -> Vec<(String, String)> {
    let mut pairs = Vec::with_capacity(roster.len().saturating_mul(roster.len().saturating_sub(1)) / 2);
    for (i, home) in roster.iter().enumerate() {
        for away in &roster[i + 1..] {
            pairs.push((home.clone(), away.clone()));
        }
    }
    pairs
}
