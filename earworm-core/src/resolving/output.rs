/// Picks the direct URL out of the resolution tool's output.
///
/// The tool may print progress or log lines before the URL, so the last non-empty line wins.
/// The line is not validated as a URL.
pub fn last_non_empty_line(output: &str) -> Option<&str> {
    output
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .last()
}
