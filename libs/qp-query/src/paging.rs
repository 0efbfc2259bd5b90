//! Paging math and the windowed page list shown under search results.

use serde::Serialize;

/// Marker for an elided run of pages in a pagination window.
pub const GAP: u64 = 0;

/// Pages shown on each side of the current page.
const WINDOW_DELTA: u64 = 2;

/// Parse the 1-based `page` parameter. Anything unusable is page 1.
pub fn parse_page(raw: Option<&str>) -> u64 {
    raw.and_then(|value| value.trim().parse::<i64>().ok())
        .filter(|page| *page >= 1)
        .map_or(1, |page| page as u64)
}

/// Zero-based offset of the first row of `page`.
pub fn start_row(page: u64, page_size: u64) -> u64 {
    page.max(1).saturating_sub(1).saturating_mul(page_size)
}

pub fn page_count(hits: u64, page_size: u64) -> u64 {
    if page_size == 0 {
        return 0;
    }
    hits.div_ceil(page_size)
}

/// Windowed list of pages around `current_page`.
///
/// The first and last pages are always listed, as is every page within two of
/// the current one. A run of two or more missing pages collapses into one
/// [`GAP`]; a single missing page is listed instead of a gap.
///
/// ```
/// use qpnotes_query::paging::pagination_window;
///
/// assert_eq!(pagination_window(250, 10, 12), vec![1, 0, 10, 11, 12, 13, 14, 0, 25]);
/// assert_eq!(pagination_window(250, 10, 4), vec![1, 2, 3, 4, 5, 6, 0, 25]);
/// ```
pub fn pagination_window(hits: u64, page_size: u64, current_page: u64) -> Vec<u64> {
    let pages = page_count(hits, page_size);
    if pages == 0 {
        return Vec::new();
    }

    let current = current_page.clamp(1, pages);
    let left = current.saturating_sub(WINDOW_DELTA);
    let right = current + WINDOW_DELTA;

    let mut window = Vec::new();
    let mut last: Option<u64> = None;
    for page in (1..=pages).filter(|p| *p == 1 || *p == pages || (left..=right).contains(p)) {
        if let Some(prev) = last {
            match page - prev {
                1 => {}
                2 => window.push(prev + 1),
                _ => window.push(GAP),
            }
        }
        window.push(page);
        last = Some(page);
    }
    window
}

/// Navigation links derived from a pagination window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PageLinks {
    pub current: u64,
    pub previous: u64,
    pub next: u64,
    pub last: u64,
}

impl PageLinks {
    pub fn new(window: &[u64], requested_page: u64) -> Self {
        let last = window.last().copied().unwrap_or(1).max(1);
        let current = requested_page.clamp(1, last);
        Self {
            current,
            previous: current.saturating_sub(1).max(1),
            next: (current + 1).min(last),
            last,
        }
    }
}
