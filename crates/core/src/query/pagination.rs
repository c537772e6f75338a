//! Page-number pagination.
//!
//! `?page=` selects the page (1-based, or `last`), `?page_size=` picks the
//! size within the configured maximum. A bad or out-of-range page is an
//! error; a bad page size quietly falls back to the default.

use serde::Serialize;
use thiserror::Error;
use url::form_urlencoded;

pub const PAGE_PARAM: &str = "page";
pub const PAGE_SIZE_PARAM: &str = "page_size";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PaginationError {
    #[error("Invalid page.")]
    InvalidPage,
}

/// Page size limits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageSettings {
    pub default_size: usize,
    pub max_size: usize,
}

impl Default for PageSettings {
    fn default() -> Self {
        Self {
            default_size: 10,
            max_size: 100,
        }
    }
}

/// Requested page before the item count is known.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageNumber {
    Number(usize),
    Last,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRequest {
    pub number: PageNumber,
    pub size: usize,
}

impl PageRequest {
    /// Parses the raw `page` and `page_size` query values.
    pub fn parse(
        page: Option<&str>,
        page_size: Option<&str>,
        settings: PageSettings,
    ) -> Result<Self, PaginationError> {
        let number = match page.map(str::trim) {
            None | Some("") => PageNumber::Number(1),
            Some("last") => PageNumber::Last,
            Some(raw) => match raw.parse::<usize>() {
                Ok(n) if n >= 1 => PageNumber::Number(n),
                _ => return Err(PaginationError::InvalidPage),
            },
        };

        let size = page_size
            .and_then(|raw| raw.trim().parse::<usize>().ok())
            .filter(|&n| n > 0)
            .map_or(settings.default_size, |n| n.min(settings.max_size));

        Ok(Self { number, size })
    }
}

/// A page of results together with its neighbours' links.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Page<T> {
    pub count: usize,
    pub next: Option<String>,
    pub previous: Option<String>,
    pub results: Vec<T>,
}

/// Where the page is served from, for building `next`/`previous` links.
#[derive(Debug, Clone, Copy)]
pub struct PageLocation<'a> {
    pub path: &'a str,
    pub query: Option<&'a str>,
}

/// Cuts one page out of `items`.
///
/// An empty result set still has a first page.
pub fn paginate<T>(
    items: Vec<T>,
    request: &PageRequest,
    location: PageLocation<'_>,
) -> Result<Page<T>, PaginationError> {
    let count = items.len();
    let size = request.size.max(1);
    let num_pages = count.div_ceil(size).max(1);

    let number = match request.number {
        PageNumber::Number(n) => n,
        PageNumber::Last => num_pages,
    };
    if number > num_pages {
        return Err(PaginationError::InvalidPage);
    }

    let results: Vec<T> = items
        .into_iter()
        .skip((number - 1) * size)
        .take(size)
        .collect();

    let next = (number < num_pages).then(|| page_link(location, Some(number + 1)));
    let previous = (number > 1).then(|| {
        let target = number - 1;
        page_link(location, (target > 1).then_some(target))
    });

    Ok(Page {
        count,
        next,
        previous,
        results,
    })
}

/// Rewrites the `page` parameter of the current query, keeping the others
/// in their original order. `None` drops the parameter (first page).
pub fn page_link(location: PageLocation<'_>, page: Option<usize>) -> String {
    let mut serializer = form_urlencoded::Serializer::new(String::new());
    let mut replaced = false;

    for (key, value) in form_urlencoded::parse(location.query.unwrap_or_default().as_bytes()) {
        if key == PAGE_PARAM {
            if let (Some(p), false) = (page, replaced) {
                serializer.append_pair(PAGE_PARAM, &p.to_string());
                replaced = true;
            }
            continue;
        }
        serializer.append_pair(&key, &value);
    }
    if let (Some(p), false) = (page, replaced) {
        serializer.append_pair(PAGE_PARAM, &p.to_string());
    }

    let query = serializer.finish();
    if query.is_empty() {
        location.path.to_string()
    } else {
        format!("{}?{}", location.path, query)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LOCATION: PageLocation<'static> = PageLocation {
        path: "/api/tasks/",
        query: None,
    };

    fn request(page: Option<&str>, size: Option<&str>) -> PageRequest {
        PageRequest::parse(page, size, PageSettings::default()).unwrap()
    }

    #[test]
    fn test_parse_defaults() {
        let req = request(None, None);
        assert_eq!(req.number, PageNumber::Number(1));
        assert_eq!(req.size, 10);
    }

    #[test]
    fn test_parse_page_size_is_clamped_to_max() {
        assert_eq!(request(None, Some("500")).size, 100);
        assert_eq!(request(None, Some("0")).size, 10);
        assert_eq!(request(None, Some("abc")).size, 10);
        assert_eq!(request(None, Some("25")).size, 25);
    }

    #[test]
    fn test_parse_invalid_page() {
        let settings = PageSettings::default();
        assert_eq!(
            PageRequest::parse(Some("abc"), None, settings),
            Err(PaginationError::InvalidPage)
        );
        assert_eq!(
            PageRequest::parse(Some("0"), None, settings),
            Err(PaginationError::InvalidPage)
        );
        assert_eq!(request(Some("last"), None).number, PageNumber::Last);
    }

    #[test]
    fn test_paginate_middle_page_links() {
        let items: Vec<u32> = (1..=25).collect();
        let page = paginate(items, &request(Some("2"), None), LOCATION).unwrap();

        assert_eq!(page.count, 25);
        assert_eq!(page.results, (11..=20).collect::<Vec<_>>());
        assert_eq!(page.next.as_deref(), Some("/api/tasks/?page=3"));
        assert_eq!(page.previous.as_deref(), Some("/api/tasks/"));
    }

    #[test]
    fn test_paginate_last_page() {
        let items: Vec<u32> = (1..=25).collect();
        let page = paginate(items, &request(Some("last"), None), LOCATION).unwrap();

        assert_eq!(page.results, vec![21, 22, 23, 24, 25]);
        assert_eq!(page.next, None);
        assert_eq!(page.previous.as_deref(), Some("/api/tasks/?page=2"));
    }

    #[test]
    fn test_paginate_empty_first_page_is_allowed() {
        let page = paginate(Vec::<u32>::new(), &request(None, None), LOCATION).unwrap();
        assert_eq!(page.count, 0);
        assert!(page.results.is_empty());
        assert_eq!(page.next, None);
        assert_eq!(page.previous, None);
    }

    #[test]
    fn test_paginate_out_of_range() {
        let items: Vec<u32> = (1..=5).collect();
        assert_eq!(
            paginate(items, &request(Some("2"), None), LOCATION),
            Err(PaginationError::InvalidPage)
        );
    }

    #[test]
    fn test_page_link_preserves_other_params() {
        let location = PageLocation {
            path: "/api/time-entries/",
            query: Some("task=api&page=1&ordering=-duration"),
        };
        assert_eq!(
            page_link(location, Some(2)),
            "/api/time-entries/?task=api&page=2&ordering=-duration"
        );
        assert_eq!(
            page_link(location, None),
            "/api/time-entries/?task=api&ordering=-duration"
        );
    }
}
