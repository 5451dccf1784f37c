use std::sync::LazyLock;

use chrono::{Datelike, NaiveDate};
use regex::Regex;

use crate::types::{DateKey, ListingPage};

/// First year with listing pages on the archive.
pub const START_YEAR: i32 = 2012;

static RE_LISTING_PATH: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"/news/(\d{1,4}/\d{1,2}/\d{1,2}/)").expect("invalid regex: listing path")
});

pub fn listing_url(date: &DateKey) -> String {
    format!(
        "{}/news/{}/{}/{}/",
        crate::BASE_URL,
        date.year,
        date.month,
        date.day
    )
}

/// Extract the `{y}/{m}/{d}/` path segment from a listing URL.
pub fn date_label_from_url(url: &str) -> Option<String> {
    RE_LISTING_PATH
        .captures(url)
        .map(|caps| caps[1].to_string())
}

/// Every listing page from 2012/1/1 up to, but not including, `today`.
///
/// Days run 1–31 for every month; the site answers invalid dates with a 404
/// or an empty listing, and the extractor tolerates both. The grid stops
/// with a break on the triple equal to `today`, so the result is a strict
/// prefix of the full day grid, not a filtered set.
pub fn enumerate_listings(today: NaiveDate) -> Vec<ListingPage> {
    let stop = DateKey::from_date(today);
    let mut pages = Vec::new();

    'grid: for year in START_YEAR..=today.year() {
        for month in 1..=12u32 {
            for day in 1..=31u32 {
                let date = DateKey { year, month, day };
                if date == stop {
                    break 'grid;
                }
                pages.push(ListingPage {
                    url: listing_url(&date),
                    date,
                });
            }
        }
    }

    pages
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_enumeration_stops_before_today() {
        let pages = enumerate_listings(date(2012, 1, 5));

        assert_eq!(pages.len(), 4);
        assert_eq!(pages[0].url, "https://www.mk.ru/news/2012/1/1/");
        assert_eq!(pages[3].url, "https://www.mk.ru/news/2012/1/4/");
    }

    #[test]
    fn test_enumeration_is_prefix_of_day_grid() {
        // 2012 in full (12 * 31) plus January and February of 2013 (31 + 31)
        // plus March 1st, stopping at March 2nd.
        let pages = enumerate_listings(date(2013, 3, 2));

        assert_eq!(pages.len(), 12 * 31 + 31 + 31 + 1);
        assert_eq!(pages.last().unwrap().url, "https://www.mk.ru/news/2013/3/1/");

        // Invalid calendar dates are part of the grid.
        assert!(
            pages
                .iter()
                .any(|p| p.url == "https://www.mk.ru/news/2012/2/30/")
        );
    }

    #[test]
    fn test_no_page_on_or_after_today() {
        let today = date(2025, 6, 15);
        let stop = DateKey::from_date(today);

        for page in enumerate_listings(today) {
            assert!(page.date < stop, "{} is not before today", page.url);
        }
    }

    #[test]
    fn test_date_label_from_url() {
        assert_eq!(
            date_label_from_url("https://www.mk.ru/news/2012/1/2/"),
            Some("2012/1/2/".to_string())
        );
        assert_eq!(date_label_from_url("https://www.mk.ru/about/"), None);
    }
}
