//! Scoring for graded attempts.
//!
//! A solve is worth a base amount plus three components that decay linearly
//! as the team burns time and penalty budget on the question, all scaled by
//! the fraction of test cases passed. The base amount guarantees a full pass
//! is always worth something, even after every budget is exhausted.

/// Flat component awarded to any solve.
pub const BASE: f64 = 5.0;
/// Maximum value of the time component.
pub const TIME_MAX: f64 = 8.0;
/// Maximum value of the syntax-penalty component.
pub const SYNTAX_MAX: f64 = 10.0;
/// Maximum value of the wrong-submission-penalty component.
pub const WRONG_MAX: f64 = 7.0;

/// Seconds after the first attempt at which the time component reaches zero.
pub const MAX_TIME_SECS: i64 = 45 * 60;
/// Syntax-error count at which the syntax component reaches zero.
pub const MAX_SYNTAX: i64 = 30;
/// Wrong-submission count at which the wrong component reaches zero.
pub const MAX_WRONG: i64 = 30;

/// Highest attainable score: a perfect, instant, clean solve.
pub const MAX_SCORE: f64 = BASE + TIME_MAX + SYNTAX_MAX + WRONG_MAX;

/// Linear decay from `max` down to zero as `value` approaches `cap`.
fn decay(max: f64, value: i64, cap: i64) -> f64 {
    let clamped = value.clamp(0, cap);
    (max * (1.0 - clamped as f64 / cap as f64)).max(0.0)
}

/// Score one graded attempt.
///
/// `elapsed_secs` counts from the team's first attempt on the question, not
/// from round start. `syntax_errors` and `wrong_submissions` are the team's
/// cumulative counts for the question before this attempt. `total` must be
/// positive; questions without test cases are rejected before grading.
pub fn submission_score(
    passed: i64,
    total: i64,
    elapsed_secs: i64,
    syntax_errors: i64,
    wrong_submissions: i64,
) -> f64 {
    let time_score = decay(TIME_MAX, elapsed_secs, MAX_TIME_SECS);
    let syntax_score = decay(SYNTAX_MAX, syntax_errors, MAX_SYNTAX);
    let wrong_score = decay(WRONG_MAX, wrong_submissions, MAX_WRONG);

    let total_weight = BASE + time_score + syntax_score + wrong_score;
    (passed as f64 / total as f64) * total_weight
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_perfect_instant_clean_is_max() {
        assert_eq!(submission_score(3, 3, 0, 0, 0), MAX_SCORE);
    }

    #[test]
    fn test_never_negative() {
        for elapsed in [0, 10, MAX_TIME_SECS, MAX_TIME_SECS * 10] {
            for errors in [0, 1, MAX_SYNTAX, 1000] {
                let score = submission_score(1, 4, elapsed, errors, errors);
                assert!(score >= 0.0, "score {score} < 0");
            }
        }
    }

    #[test]
    fn test_full_pass_scores_above_zero_with_budgets_exhausted() {
        let score = submission_score(5, 5, MAX_TIME_SECS * 2, MAX_SYNTAX + 5, MAX_WRONG + 5);
        assert_eq!(score, BASE);
    }

    #[test]
    fn test_non_increasing_in_elapsed_time() {
        let mut previous = f64::INFINITY;
        for elapsed in [0, 1, 60, 600, 1800, MAX_TIME_SECS, MAX_TIME_SECS + 1] {
            let score = submission_score(3, 3, elapsed, 2, 2);
            assert!(score <= previous);
            previous = score;
        }
    }

    #[test]
    fn test_non_increasing_in_syntax_errors() {
        let mut previous = f64::INFINITY;
        for errors in 0..=MAX_SYNTAX + 2 {
            let score = submission_score(3, 3, 100, errors, 0);
            assert!(score <= previous);
            previous = score;
        }
    }

    #[test]
    fn test_non_increasing_in_wrong_submissions() {
        let mut previous = f64::INFINITY;
        for wrong in 0..=MAX_WRONG + 2 {
            let score = submission_score(3, 3, 100, 0, wrong);
            assert!(score <= previous);
            previous = score;
        }
    }

    #[test]
    fn test_scaled_by_pass_fraction() {
        let full = submission_score(4, 4, 0, 0, 0);
        let half = submission_score(2, 4, 0, 0, 0);
        assert_eq!(half, full / 2.0);
    }

    #[test]
    fn test_components_clamp_at_caps() {
        // Past the cap, extra time/errors change nothing.
        assert_eq!(
            submission_score(3, 3, MAX_TIME_SECS, 0, 0),
            submission_score(3, 3, MAX_TIME_SECS + 999, 0, 0)
        );
        assert_eq!(
            submission_score(3, 3, 0, MAX_SYNTAX, 0),
            submission_score(3, 3, 0, MAX_SYNTAX + 7, 0)
        );
    }

    #[test]
    fn test_near_instant_solve_close_to_max() {
        // 3/3 after 10 seconds with no priors loses only a sliver of the
        // time component.
        let score = submission_score(3, 3, 10, 0, 0);
        let expected = BASE + TIME_MAX * (1.0 - 10.0 / MAX_TIME_SECS as f64) + SYNTAX_MAX + WRONG_MAX;
        assert!((score - expected).abs() < 1e-9);
        assert!(score < MAX_SCORE);
        assert!(score > MAX_SCORE - 0.1);
    }
}
