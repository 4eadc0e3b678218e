//! Mapping from calendar dates to season labels.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Hemisphere {
    #[default]
    Northern,
    Southern,
}

/// Resolves the season label in effect on a given date.
///
/// Uses meteorological seasons (Dec–Feb, Mar–May, Jun–Aug, Sep–Nov). The
/// labels must match the ones used in the loaded table, since they are
/// compared verbatim against its `season` column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeasonCalendar {
    pub hemisphere: Hemisphere,
    pub winter: String,
    pub spring: String,
    pub summer: String,
    pub autumn: String,
}

impl Default for SeasonCalendar {
    fn default() -> Self {
        Self {
            hemisphere: Hemisphere::Northern,
            winter: "winter".to_string(),
            spring: "spring".to_string(),
            summer: "summer".to_string(),
            autumn: "autumn".to_string(),
        }
    }
}

impl SeasonCalendar {
    pub fn with_hemisphere(mut self, hemisphere: Hemisphere) -> Self {
        self.hemisphere = hemisphere;
        self
    }

    pub fn season_for(&self, date: NaiveDate) -> &str {
        let northern = match date.month() {
            12 | 1 | 2 => self.winter.as_str(),
            3..=5 => self.spring.as_str(),
            6..=8 => self.summer.as_str(),
            _ => self.autumn.as_str(),
        };
        match self.hemisphere {
            Hemisphere::Northern => northern,
            Hemisphere::Southern => self.opposite(northern),
        }
    }

    fn opposite<'a>(&'a self, label: &'a str) -> &'a str {
        if label == self.winter {
            self.summer.as_str()
        } else if label == self.summer {
            self.winter.as_str()
        } else if label == self.spring {
            self.autumn.as_str()
        } else {
            self.spring.as_str()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_northern_seasons() {
        let calendar = SeasonCalendar::default();
        assert_eq!(calendar.season_for(date(2024, 1, 15)), "winter");
        assert_eq!(calendar.season_for(date(2024, 12, 1)), "winter");
        assert_eq!(calendar.season_for(date(2024, 4, 30)), "spring");
        assert_eq!(calendar.season_for(date(2024, 7, 4)), "summer");
        assert_eq!(calendar.season_for(date(2024, 10, 19)), "autumn");
    }

    #[test]
    fn test_southern_seasons_are_flipped() {
        let calendar = SeasonCalendar::default().with_hemisphere(Hemisphere::Southern);
        assert_eq!(calendar.season_for(date(2024, 1, 15)), "summer");
        assert_eq!(calendar.season_for(date(2024, 7, 4)), "winter");
        assert_eq!(calendar.season_for(date(2024, 4, 30)), "autumn");
        assert_eq!(calendar.season_for(date(2024, 10, 19)), "spring");
    }

    #[test]
    fn test_custom_labels() {
        let calendar = SeasonCalendar {
            winter: "зима".to_string(),
            ..SeasonCalendar::default()
        };
        assert_eq!(calendar.season_for(date(2024, 2, 29)), "зима");
    }
}
