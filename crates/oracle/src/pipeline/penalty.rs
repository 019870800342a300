use chrono::{DateTime, Datelike, Local, Timelike, Weekday};

/// Each active condition halves the running multiplier.
const PENALTY_FACTOR: f64 = 0.5;

pub const DEATH_NUMBERS: &str = "Death Numbers";
pub const FORBIDDEN_DAY: &str = "Forbidden Day";
pub const GHOST_HOUR: &str = "Ghost Hour";
pub const TUESDAY_PENALTY: &str = "Tuesday Penalty";

/// Ordered penalty labels plus the aggregate multiplier in (0, 1].
#[derive(Debug, Clone)]
pub struct PenaltyReport {
    pub labels: Vec<String>,
    pub multiplier: f64,
}

impl PenaltyReport {
    pub fn is_clear(&self) -> bool {
        self.labels.is_empty()
    }
}

/// Pure function of wall-clock time and the offering's decimal digits. No
/// state is kept; the outcome is only as stable as the host clock.
pub fn assess(now: &DateTime<Local>, amount: &str) -> PenaltyReport {
    let mut labels = Vec::new();

    if is_death_number(amount) {
        labels.push(DEATH_NUMBERS.to_string());
    }
    if matches!(now.day(), 4 | 14 | 24) {
        labels.push(FORBIDDEN_DAY.to_string());
    }
    if matches!(now.hour(), 4 | 16) && now.minute() == 44 {
        labels.push(GHOST_HOUR.to_string());
    }
    if now.weekday() == Weekday::Tue {
        labels.push(TUESDAY_PENALTY.to_string());
    }

    let multiplier = PENALTY_FACTOR.powi(labels.len() as i32);
    PenaltyReport { labels, multiplier }
}

/// Two or more occurrences of the digit 4 anywhere in the amount.
fn is_death_number(amount: &str) -> bool {
    amount.chars().filter(|c| *c == '4').count() >= 2
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(y: i32, mo: u32, d: u32, h: u32, mi: u32) -> DateTime<Local> {
        Local.with_ymd_and_hms(y, mo, d, h, mi, 0).unwrap()
    }

    #[test]
    fn clear_day_has_unit_multiplier() {
        // 2025-01-08 is a Wednesday
        let report = assess(&at(2025, 1, 8, 12, 0), "8");
        assert!(report.is_clear());
        assert_eq!(report.multiplier, 1.0);
    }

    #[test]
    fn death_numbers_need_two_fours() {
        let wed = at(2025, 1, 8, 12, 0);
        assert!(assess(&wed, "48").is_clear());
        let report = assess(&wed, "44.8");
        assert_eq!(report.labels, vec![DEATH_NUMBERS]);
        assert_eq!(report.multiplier, 0.5);
    }

    #[test]
    fn forbidden_days() {
        for day in [4, 24] {
            // January 2025: the 4th is a Saturday, the 24th a Friday
            let report = assess(&at(2025, 1, day, 12, 0), "8");
            assert_eq!(report.labels, vec![FORBIDDEN_DAY]);
        }
    }

    #[test]
    fn ghost_hour_requires_exact_minute() {
        let wed = at(2025, 1, 8, 4, 44);
        assert_eq!(assess(&wed, "8").labels, vec![GHOST_HOUR]);
        assert!(assess(&at(2025, 1, 8, 4, 43), "8").is_clear());
        assert_eq!(assess(&at(2025, 1, 8, 16, 44), "8").labels, vec![GHOST_HOUR]);
        assert!(assess(&at(2025, 1, 8, 15, 44), "8").is_clear());
    }

    #[test]
    fn multiplier_composes_multiplicatively() {
        // 2025-01-14 is a Tuesday and a forbidden day; 04:44 is the ghost
        // hour; "44" carries death numbers. Four conditions -> 0.0625.
        let report = assess(&at(2025, 1, 14, 4, 44), "44");
        assert_eq!(
            report.labels,
            vec![DEATH_NUMBERS, FORBIDDEN_DAY, GHOST_HOUR, TUESDAY_PENALTY]
        );
        assert_eq!(report.multiplier, 0.0625);
    }

    #[test]
    fn multiplier_is_monotone_in_condition_count() {
        let none = assess(&at(2025, 1, 8, 12, 0), "8");
        let one = assess(&at(2025, 1, 8, 12, 0), "44");
        let two = assess(&at(2025, 1, 14, 12, 0), "44");
        assert!(none.multiplier > one.multiplier);
        assert!(one.multiplier > two.multiplier);
    }
}
