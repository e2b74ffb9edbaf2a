use serde::Serialize;

/// Users listed per page on the user screen
pub const USERS_PER_PAGE: u64 = 5;

/// Page number as requested in the query string, before it is checked
/// against the number of pages available
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest(i64);

impl PageRequest {
    /// Anything that is not an integer asks for the first page
    pub fn parse(raw: Option<&str>) -> Self {
        Self(raw.and_then(|p| p.trim().parse().ok()).unwrap_or(1))
    }

    /// Clamp to an existing page: out-of-range numbers (including zero and
    /// negatives) land on the last page
    pub fn resolve(self, num_pages: u64) -> u64 {
        let num_pages = num_pages.max(1);
        match u64::try_from(self.0) {
            Ok(number) if (1..=num_pages).contains(&number) => number,
            _ => num_pages,
        }
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self(1)
    }
}

/// One page of results
#[derive(Debug, Clone, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    /// 1-based
    pub number: u64,
    pub num_pages: u64,
    pub per_page: u64,
    pub total: u64,
    pub has_previous: bool,
    pub has_next: bool,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, number: u64, num_pages: u64, per_page: u64, total: u64) -> Self {
        let num_pages = num_pages.max(1);
        Self {
            items,
            number,
            num_pages,
            per_page,
            total,
            has_previous: number > 1,
            has_next: number < num_pages,
        }
    }
}
