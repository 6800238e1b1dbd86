use crate::models::ScoreBreakdown;

pub const MIN_SCORE: u32 = 20;
pub const MAX_SCORE: u32 = 100;

pub fn steps_points(steps: u32) -> u32 {
    match steps {
        10_000.. => 40,
        7_000..=9_999 => 30,
        4_000..=6_999 => 20,
        _ => 10,
    }
}

pub fn active_points(active_minutes: u32) -> u32 {
    match active_minutes {
        60.. => 30,
        30..=59 => 20,
        15..=29 => 10,
        _ => 5,
    }
}

/// Distance in kilometres. Negative or NaN input falls through to the lowest band.
pub fn distance_points(distance: f64) -> u32 {
    if distance >= 8.0 {
        30
    } else if distance >= 5.0 {
        20
    } else if distance >= 2.0 {
        10
    } else {
        5
    }
}

pub fn breakdown(steps: u32, active_minutes: u32, distance: f64) -> ScoreBreakdown {
    let steps = steps_points(steps);
    let active = active_points(active_minutes);
    let distance = distance_points(distance);
    ScoreBreakdown {
        steps,
        active,
        distance,
        total: steps + active + distance,
    }
}

pub fn calc_score(steps: u32, active_minutes: u32, distance: f64) -> u32 {
    breakdown(steps, active_minutes, distance).total
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn documented_examples() {
        assert_eq!(calc_score(10_000, 60, 8.0), 100);
        assert_eq!(calc_score(5_000, 20, 3.0), 40);
        assert_eq!(calc_score(0, 0, 0.0), 20);
    }

    #[test]
    fn bands_are_inclusive_at_lower_bound() {
        assert_eq!(steps_points(3_999), 10);
        assert_eq!(steps_points(4_000), 20);
        assert_eq!(steps_points(7_000), 30);
        assert_eq!(steps_points(10_000), 40);
        assert_eq!(active_points(14), 5);
        assert_eq!(active_points(15), 10);
        assert_eq!(active_points(30), 20);
        assert_eq!(active_points(60), 30);
        assert_eq!(distance_points(1.99), 5);
        assert_eq!(distance_points(2.0), 10);
        assert_eq!(distance_points(5.0), 20);
        assert_eq!(distance_points(8.0), 30);
    }

    #[test]
    fn top_bands_always_reach_max() {
        for steps in [10_000, 25_000, u32::MAX] {
            for active in [60, 120, 1_440] {
                for distance in [8.0, 12.5, 42.195] {
                    assert_eq!(calc_score(steps, active, distance), MAX_SCORE);
                }
            }
        }
    }

    #[test]
    fn bottom_bands_always_reach_min() {
        for steps in [0, 1_000, 3_999] {
            for active in [0, 7, 14] {
                for distance in [0.0, 1.0, 1.999] {
                    assert_eq!(calc_score(steps, active, distance), MIN_SCORE);
                }
            }
        }
    }

    #[test]
    fn score_is_monotonic_in_each_input() {
        let mut last = 0;
        for steps in (0..=12_000).step_by(250) {
            let score = calc_score(steps, 30, 3.0);
            assert!(score >= last);
            last = score;
        }

        last = 0;
        for active in 0..=90 {
            let score = calc_score(5_000, active, 3.0);
            assert!(score >= last);
            last = score;
        }

        last = 0;
        for tenths in 0..=100 {
            let score = calc_score(5_000, 30, tenths as f64 / 10.0);
            assert!(score >= last);
            last = score;
        }
    }

    #[test]
    fn negative_distance_degrades_to_lowest_band() {
        assert_eq!(distance_points(-3.0), 5);
        assert_eq!(distance_points(f64::NAN), 5);
    }

    #[test]
    fn breakdown_sums_to_total() {
        let parts = breakdown(7_500, 45, 6.2);
        assert_eq!(parts.steps, 30);
        assert_eq!(parts.active, 20);
        assert_eq!(parts.distance, 20);
        assert_eq!(parts.total, 70);
    }
}
