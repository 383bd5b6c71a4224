use crate::config::{blowout, InsightPolicy};
use crate::types::{OverUnderEdge, Tempo};

/// O/U lean from the projected final total. Boundaries are exclusive: a
/// projection exactly on a threshold stays NEUTRAL.
pub fn over_under_edge(projected_total: f64, policy: &InsightPolicy) -> OverUnderEdge {
    if projected_total > policy.over_total {
        OverUnderEdge::OverLean
    } else if projected_total < policy.under_total {
        OverUnderEdge::UnderLean
    } else {
        OverUnderEdge::Neutral
    }
}

/// Tempo from the unrounded pace.
pub fn tempo(pace: f64, policy: &InsightPolicy) -> Tempo {
    if pace > policy.hot_pace {
        Tempo::Hot
    } else if pace < policy.cold_pace {
        Tempo::Cold
    } else {
        Tempo::Neutral
    }
}

/// 0 up to a 15-point margin, then 5% per point, capped at 100.
pub fn blowout_risk(home_score: u32, away_score: u32) -> u8 {
    let diff = home_score.abs_diff(away_score);
    if diff <= blowout::SAFE_MARGIN {
        return 0;
    }
    let risk = (diff - blowout::SAFE_MARGIN).saturating_mul(blowout::PERCENT_PER_POINT);
    risk.min(100) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    const STANDARD: InsightPolicy = InsightPolicy::standard();

    #[test]
    fn edge_leans_over_above_140() {
        assert_eq!(over_under_edge(141.0, &STANDARD), OverUnderEdge::OverLean);
        assert_eq!(over_under_edge(140.0, &STANDARD), OverUnderEdge::Neutral);
    }

    #[test]
    fn edge_leans_under_below_130() {
        assert_eq!(over_under_edge(129.0, &STANDARD), OverUnderEdge::UnderLean);
        assert_eq!(over_under_edge(130.0, &STANDARD), OverUnderEdge::Neutral);
    }

    #[test]
    fn tempo_bands() {
        assert_eq!(tempo(75.1, &STANDARD), Tempo::Hot);
        assert_eq!(tempo(75.0, &STANDARD), Tempo::Neutral);
        assert_eq!(tempo(65.0, &STANDARD), Tempo::Neutral);
        assert_eq!(tempo(64.9, &STANDARD), Tempo::Cold);
        assert_eq!(tempo(0.0, &STANDARD), Tempo::Cold);
    }

    #[test]
    fn custom_policy_moves_thresholds() {
        let tight = InsightPolicy { over_total: 150.0, under_total: 120.0, hot_pace: 80.0, cold_pace: 60.0 };
        assert_eq!(over_under_edge(145.0, &tight), OverUnderEdge::Neutral);
        assert_eq!(tempo(77.0, &tight), Tempo::Neutral);
    }

    #[test]
    fn blowout_zero_within_safe_margin() {
        assert_eq!(blowout_risk(72, 68), 0);
        assert_eq!(blowout_risk(50, 35), 0);
        assert_eq!(blowout_risk(35, 50), 0);
    }

    #[test]
    fn blowout_scales_then_caps() {
        assert_eq!(blowout_risk(51, 35), 5);
        assert_eq!(blowout_risk(35, 65), 75);
        assert_eq!(blowout_risk(90, 55), 100);
        assert_eq!(blowout_risk(u32::MAX, 0), 100);
    }

    #[test]
    fn blowout_equal_scores_is_zero() {
        for s in [0, 1, 40, 99, 150] {
            assert_eq!(blowout_risk(s, s), 0);
        }
    }
}
