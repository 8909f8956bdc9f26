//! # Error Suggestions
//!
//! This module provides helper functions for generating helpful error
//! messages with hints and suggestions for the `addon-store` commands. Errors
//! should tell users what went wrong AND how to fix it.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use addon_store::suggestions;
//!
//! if !store.exists(slug) {
//!     return Err(suggestions::unknown_addon(slug, &known));
//! }
//! ```

/// Generate an error for a slug that is neither installed nor available.
///
/// Suggests a qualified slug when the user typed the bare addon slug, or a
/// close match when it looks like a typo.
pub fn unknown_addon(slug: &str, known: &[&str]) -> anyhow::Error {
    let suffix = format!("_{slug}");
    let qualified: Vec<&str> = known
        .iter()
        .copied()
        .filter(|candidate| candidate.ends_with(&suffix))
        .collect();

    let did_you_mean = if !qualified.is_empty() {
        format!("\nhint: Did you mean '{}'?", qualified.join("' or '"))
    } else {
        find_similar(slug, known)
            .map(|s| format!("\nhint: Did you mean '{s}'?"))
            .unwrap_or_default()
    };

    anyhow::anyhow!(
        "Unknown addon: {slug}{did_you_mean}\n\n\
         hint: Addons are addressed as <repository>_<slug>, e.g. core_ssh\n\
         hint: Run 'addon-store list' to see installed and available addons"
    )
}

/// Generate an error for options given on the command line that are not JSON.
pub fn invalid_options_json(input: &str, error: &serde_json::Error) -> anyhow::Error {
    anyhow::anyhow!(
        "Options are not a JSON object: {input}\n\
         error: {error}\n\n\
         hint: Quote the whole object for your shell, e.g. '{{\"port\": 8080}}'\n\
         hint: Run 'addon-store options show <slug>' to see the current options"
    )
}

/// Generate an error for a build target whose architecture is unsupported.
pub fn unknown_arch() -> anyhow::Error {
    anyhow::anyhow!(
        "Can't detect a supported architecture for this machine ({arch})\n\n\
         hint: Pass --arch with one of armhf, aarch64, amd64 or i386\n\
         hint: Set the ADDON_STORE_ARCH environment variable",
        arch = std::env::consts::ARCH
    )
}

/// Find a similar string from a list of candidates using edit distance.
///
/// Returns Some(candidate) if a close match is found (edit distance <= 2).
fn find_similar<'a>(input: &str, candidates: &[&'a str]) -> Option<&'a str> {
    candidates
        .iter()
        .filter_map(|&candidate| {
            let distance = edit_distance(input, candidate);
            if distance <= 2 && distance < input.len() {
                Some((candidate, distance))
            } else {
                None
            }
        })
        .min_by_key(|(_, distance)| *distance)
        .map(|(candidate, _)| candidate)
}

/// Calculate the Levenshtein edit distance between two strings.
fn edit_distance(a: &str, b: &str) -> usize {
    let a_chars: Vec<char> = a.chars().collect();
    let b_chars: Vec<char> = b.chars().collect();

    if a_chars.is_empty() {
        return b_chars.len();
    }
    if b_chars.is_empty() {
        return a_chars.len();
    }

    // Single rolling row
    let mut previous: Vec<usize> = (0..=b_chars.len()).collect();
    for (i, a_char) in a_chars.iter().enumerate() {
        let mut current = vec![i + 1; b_chars.len() + 1];
        for (j, b_char) in b_chars.iter().enumerate() {
            let cost = usize::from(a_char != b_char);
            current[j + 1] = (previous[j + 1] + 1)
                .min(current[j] + 1)
                .min(previous[j] + cost);
        }
        previous = current;
    }

    previous[b_chars.len()]
}
