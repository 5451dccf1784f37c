use chrono::NaiveDate;

use crate::types::{DateKey, ListingPage};

#[derive(Debug, Default)]
pub struct CrawlWindow {
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    /// Keep only the most recent N pages of the window.
    pub tail: Option<usize>,
    pub limit: Option<usize>,
}

impl CrawlWindow {
    pub fn apply(self, mut pages: Vec<ListingPage>) -> Vec<ListingPage> {
        if let Some(start) = self.start_date {
            let start = DateKey::from_date(start);
            pages.retain(|p| p.date >= start);
        }
        if let Some(end) = self.end_date {
            let end = DateKey::from_date(end);
            pages.retain(|p| p.date <= end);
        }
        if let Some(tail) = self.tail
            && pages.len() > tail
        {
            pages = pages.split_off(pages.len() - tail);
        }
        if let Some(lim) = self.limit {
            pages.truncate(lim);
        }
        pages
    }

    pub fn validate(self) -> Result<Self, String> {
        if let Some(start) = self.start_date
            && let Some(end) = self.end_date
            && start > end
        {
            return Err(format!(
                "Start date ({start}) cannot be after end date ({end})"
            ));
        }
        if self.tail.is_some_and(|t| t == 0) {
            return Err("Tail must be greater than 0".to_string());
        }
        if self.limit.is_some_and(|l| l == 0) {
            return Err("Limit must be greater than 0".to_string());
        }
        Ok(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::urls::enumerate_listings;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_window_bounds() {
        let pages = enumerate_listings(date(2012, 3, 10));

        let window = CrawlWindow {
            start_date: Some(date(2012, 2, 1)),
            end_date: Some(date(2012, 3, 1)),
            ..CrawlWindow::default()
        };
        let pages = window.apply(pages);

        // The whole February slice of the grid plus March 1st. Invalid grid
        // days like Feb 30 order between Feb 29 and Mar 1, so they stay.
        assert_eq!(pages.len(), 32);
        assert!(pages.iter().any(|p| p.date.month == 2 && p.date.day == 30));
    }

    #[test]
    fn test_window_tail_keeps_most_recent() {
        let pages = enumerate_listings(date(2012, 2, 1));

        let window = CrawlWindow {
            tail: Some(3),
            ..CrawlWindow::default()
        };
        let pages = window.apply(pages);

        assert_eq!(pages.len(), 3);
        assert_eq!(pages.last().unwrap().url, "https://www.mk.ru/news/2012/1/31/");
    }

    #[test]
    fn test_window_tail_smaller_than_requested() {
        let pages = enumerate_listings(date(2012, 1, 3));

        let window = CrawlWindow {
            tail: Some(30),
            ..CrawlWindow::default()
        };

        assert_eq!(window.apply(pages).len(), 2);
    }

    #[test]
    fn test_validate_rejects_inverted_range() {
        let window = CrawlWindow {
            start_date: Some(date(2013, 1, 1)),
            end_date: Some(date(2012, 1, 1)),
            ..CrawlWindow::default()
        };

        assert!(window.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_zero_tail_and_limit() {
        let window = CrawlWindow {
            tail: Some(0),
            ..CrawlWindow::default()
        };
        assert!(window.validate().is_err());

        let window = CrawlWindow {
            limit: Some(0),
            ..CrawlWindow::default()
        };
        assert!(window.validate().is_err());
    }
}
