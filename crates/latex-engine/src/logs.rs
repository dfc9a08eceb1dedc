/// Split compiler output into trimmed, non-empty lines, preserving order.
pub fn parse_logs(output: &str) -> Vec<String> {
    output
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}
