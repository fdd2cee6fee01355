use super::*;

fn words(n: usize) -> String {
    vec!["word"; n].join(" ")
}

#[test]
fn estimate_is_linear_at_180_wpm() {
    assert_eq!(estimate_duration_seconds(&words(180)), 60.0);
    assert_eq!(estimate_duration_seconds(&words(3)), 1.0);
    assert_eq!(estimate_duration_seconds(""), 0.0);
    assert_eq!(estimate_duration_seconds("  spaced \n\t out  "), 2.0 / 3.0);
}

#[test]
fn budget_boundary_is_inclusive() {
    // 510 words == 170.0 s exactly; one more word is over.
    assert!(is_within_budget("", &words(510)));
    assert!(!is_within_budget("", &words(511)));
    assert!(is_within_budget("two words", &words(508)));
    assert!(!is_within_budget("two words", &words(509)));
}

#[test]
fn ceiling_comparison_is_strict_above() {
    assert!(fits_ceiling(170.0, MAX_NARRATION_SECS));
    assert!(!fits_ceiling(170.001, MAX_NARRATION_SECS));
}

#[test]
fn story_duration_matches_joined_text() {
    let title = "AITA for leaving early";
    let body = words(100);
    assert_eq!(
        story_duration_seconds(title, &body),
        estimate_duration_seconds(&format!("{title} {body}"))
    );
}
