//! Property-based tests for path validation, log parsing and PDF paths

use proptest::prelude::*;

use latex_engine::{parse_logs, validate_path, EngineConfig, LatexService};

/// Fragments built only from characters the HTTP layer accepts, minus `..`
fn safe_fragment() -> impl Strategy<Value = String> {
    "[A-Za-z0-9_/-]{1,16}(\\.[A-Za-z0-9_-]{1,8})?"
}

/// Insert one forbidden pattern somewhere inside an otherwise safe fragment
fn unsafe_fragment() -> impl Strategy<Value = String> {
    (
        "[A-Za-z0-9_./-]{0,12}",
        prop_oneof![Just(".."), Just(";"), Just("|")],
        "[A-Za-z0-9_./ -]{0,12}",
    )
        .prop_map(|(head, bad, tail)| format!("{}{}{}", head, bad, tail))
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn unsafe_fragments_rejected(path in unsafe_fragment()) {
        prop_assert!(validate_path(&path).is_err(), "'{}' should be rejected", path);
    }

    #[test]
    fn safe_fragments_accepted(path in safe_fragment()) {
        prop_assert!(validate_path(&path).is_ok(), "'{}' should be accepted", path);
    }

    #[test]
    fn parse_logs_is_idempotent(output in "[ -~\t\n]{0,400}") {
        let once = parse_logs(&output);
        let twice = parse_logs(&once.join("\n"));
        prop_assert_eq!(once, twice);
    }

    #[test]
    fn parse_logs_never_yields_blank_lines(output in "[ -~\t\r\n]{0,400}") {
        for line in parse_logs(&output) {
            prop_assert!(!line.is_empty());
            prop_assert_eq!(line.trim(), line.as_str());
        }
    }

    #[test]
    fn parse_logs_preserves_order(lines in prop::collection::vec("[a-z]{1,10}", 0..20)) {
        let output = lines.join("\n\n");
        prop_assert_eq!(parse_logs(&output), lines);
    }

    #[test]
    fn pdf_path_follows_convention(stem in "[A-Za-z0-9_-]{1,20}", dir in "[a-z]{1,10}") {
        let service = LatexService::new(EngineConfig::new("/ws"));
        let path = service.pdf_path(&format!("{}.tex", stem), &dir);
        prop_assert_eq!(path.to_string_lossy(), format!("/ws/{}/{}.pdf", dir, stem));
    }
}
