//! Prompt construction and defensive response parsing.

use std::fmt::Write as _;
use std::sync::LazyLock;

use petprice_core::Candidate;
use regex::Regex;

static INTEGER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"-?\d+").expect("valid integer regex"));

/// Builds the arbitration prompt for `target` over the indexed `candidates`.
#[must_use]
pub fn build_prompt(candidates: &[Candidate], target: &str) -> String {
    let mut prompt = String::new();
    prompt.push_str(
        "You are matching retail search results to one exact pet product.\n\n",
    );
    let _ = writeln!(prompt, "TARGET PRODUCT: {target}\n");
    prompt.push_str("CANDIDATES:\n");
    for (i, c) in candidates.iter().enumerate() {
        let _ = write!(
            prompt,
            "[{i}] Title: {} | Price: R$ {}",
            c.display_title.trim(),
            c.observed_price.round_dp(2)
        );
        if let Some(sales) = c.sales_count {
            let _ = write!(prompt, " | Sales: {sales}");
        }
        prompt.push('\n');
    }
    prompt.push_str(
        "\nRULES:\n\
         1. Brand, product line and weight/size must match the target exactly.\n\
         2. If no candidate has the target's weight/size, answer -1. Never pick a different size.\n\
         3. Avoid kits, combos and multi-packs unless the target asks for one.\n\
         4. If several candidates qualify, prefer the one with more sales.\n\
         5. If nothing matches, answer -1.\n\n\
         Answer with ONLY the index number of the best candidate, or -1. No other text.\n",
    );
    prompt
}

/// Extracts the chosen index from a raw model response.
///
/// The first integer-looking token decides. Negative values, indices past
/// the end of the list, and responses without any integer are `None`.
#[must_use]
pub fn parse_index(response: &str, candidate_count: usize) -> Option<usize> {
    let token = INTEGER_RE.find(response)?.as_str();
    let value: i64 = token.parse().ok()?;
    let index = usize::try_from(value).ok()?;
    (index < candidate_count).then_some(index)
}
