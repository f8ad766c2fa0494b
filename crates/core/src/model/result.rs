use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;

//
// ─── TIER ──────────────────────────────────────────────────────────────────────
//

/// Qualitative label for a score percentage.
///
/// Thresholds are inclusive lower bounds checked from the top:
/// - `Excellent`: 80 and above
/// - `Good`: 60 and above
/// - `NeedsImprovement`: 40 and above
/// - `NeedsReview`: below 40
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Tier {
    Excellent,
    Good,
    NeedsImprovement,
    NeedsReview,
}

impl Tier {
    #[must_use]
    pub fn from_percent(score_percent: u32) -> Self {
        match score_percent {
            80.. => Tier::Excellent,
            60.. => Tier::Good,
            40.. => Tier::NeedsImprovement,
            _ => Tier::NeedsReview,
        }
    }

    /// Stable machine-readable name.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Tier::Excellent => "excellent",
            Tier::Good => "good",
            Tier::NeedsImprovement => "needs-improvement",
            Tier::NeedsReview => "needs-review",
        }
    }

    /// Short human-facing headline for a result screen.
    #[must_use]
    pub fn headline(self) -> &'static str {
        match self {
            Tier::Excellent => "Excellent!",
            Tier::Good => "Well done!",
            Tier::NeedsImprovement => "Keep trying!",
            Tier::NeedsReview => "Time to review!",
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

//
// ─── SCORE ─────────────────────────────────────────────────────────────────────
//

/// Score derived from a session's questions and answers.
///
/// Never stored on its own; always recomputed from the answer record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Score {
    pub total: u32,
    pub correct: u32,
    pub answered: u32,
}

impl Score {
    #[must_use]
    pub fn wrong(&self) -> u32 {
        self.total.saturating_sub(self.correct)
    }

    #[must_use]
    pub fn unanswered(&self) -> u32 {
        self.total.saturating_sub(self.answered)
    }

    /// `round(100 * correct / total)`, halves rounded up.
    #[must_use]
    pub fn percent(&self) -> u32 {
        if self.total == 0 {
            return 0;
        }
        let total = u64::from(self.total);
        let scaled = (200 * u64::from(self.correct) + total) / (2 * total);
        u32::try_from(scaled).unwrap_or(100)
    }

    #[must_use]
    pub fn tier(&self) -> Tier {
        Tier::from_percent(self.percent())
    }
}

//
// ─── SESSION RESULT ────────────────────────────────────────────────────────────
//

/// Frozen outcome of a submitted session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionResult {
    pub total: u32,
    pub correct_count: u32,
    pub wrong_count: u32,
    pub unanswered_count: u32,
    pub score_percent: u32,
    pub elapsed_seconds: u64,
    pub tier: Tier,
    pub started_at: DateTime<Utc>,
    pub submitted_at: DateTime<Utc>,
}

impl SessionResult {
    #[must_use]
    pub fn from_score(
        score: Score,
        elapsed_seconds: u64,
        started_at: DateTime<Utc>,
        submitted_at: DateTime<Utc>,
    ) -> Self {
        Self {
            total: score.total,
            correct_count: score.correct,
            wrong_count: score.wrong(),
            unanswered_count: score.unanswered(),
            score_percent: score.percent(),
            elapsed_seconds,
            tier: score.tier(),
            started_at,
            submitted_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn score(correct: u32, total: u32) -> Score {
        Score {
            total,
            correct,
            answered: total,
        }
    }

    #[test]
    fn tier_boundaries() {
        assert_eq!(Tier::from_percent(100), Tier::Excellent);
        assert_eq!(Tier::from_percent(80), Tier::Excellent);
        assert_eq!(Tier::from_percent(79), Tier::Good);
        assert_eq!(Tier::from_percent(60), Tier::Good);
        assert_eq!(Tier::from_percent(59), Tier::NeedsImprovement);
        assert_eq!(Tier::from_percent(40), Tier::NeedsImprovement);
        assert_eq!(Tier::from_percent(39), Tier::NeedsReview);
        assert_eq!(Tier::from_percent(0), Tier::NeedsReview);
    }

    #[test]
    fn tier_names_are_kebab_case() {
        assert_eq!(Tier::NeedsImprovement.as_str(), "needs-improvement");
        assert_eq!(Tier::NeedsReview.to_string(), "needs-review");
        assert_eq!(
            serde_json::to_string(&Tier::NeedsImprovement).unwrap(),
            "\"needs-improvement\""
        );
    }

    #[test]
    fn percent_rounds_half_up() {
        assert_eq!(score(4, 5).percent(), 80);
        assert_eq!(score(1, 3).percent(), 33);
        assert_eq!(score(2, 3).percent(), 67);
        // 1/8 = 12.5%
        assert_eq!(score(1, 8).percent(), 13);
        // 5/8 = 62.5%
        assert_eq!(score(5, 8).percent(), 63);
        assert_eq!(score(0, 4).percent(), 0);
        assert_eq!(score(4, 4).percent(), 100);
    }

    #[test]
    fn wrong_and_unanswered_partition_total() {
        let s = Score {
            total: 10,
            correct: 6,
            answered: 8,
        };
        assert_eq!(s.correct + s.wrong(), s.total);
        assert_eq!(s.unanswered(), 2);
    }

    #[test]
    fn result_serializes_with_timestamps() {
        let started = crate::time::fixed_now();
        let submitted = started + chrono::Duration::seconds(65);
        let result = SessionResult::from_score(score(4, 5), 65, started, submitted);

        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["score_percent"], 80);
        assert_eq!(json["tier"], "excellent");
        assert_eq!(json["started_at"], "2023-11-14T22:13:20Z");
        assert_eq!(json["submitted_at"], "2023-11-14T22:14:25Z");
    }
}
