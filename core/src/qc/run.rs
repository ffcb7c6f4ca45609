use regex::Regex;
use std::sync::OnceLock;

/// Extracts the `run` capture of `pattern` from `text`
///
/// Returns `None` when the pattern does not match, has no `run` group, the
/// group did not participate, or its text is not an integer.
pub fn extract_run(pattern: &Regex, text: &str) -> Option<u32> {
    pattern
        .captures(text)?
        .name("run")?
        .as_str()
        .trim()
        .parse()
        .ok()
}

/// Run number embedded in a BIDS filename as `run-NN`
pub fn filename_run(filename: &str) -> Option<u32> {
    static REGEX: OnceLock<Regex> = OnceLock::new();
    let re = REGEX.get_or_init(|| {
        Regex::new(r"(?:^|_)run-(?P<run>\d+)(?:_|\.|$)").expect("Failed to compile regex")
    });
    extract_run(re, filename)
}

/// Formats a run number as `run-NN`
pub fn format_run(run: u32) -> String {
    format!("run-{:02}", run)
}
