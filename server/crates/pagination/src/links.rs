//! Link planning for paginated collection responses.

use serde::Serialize;
use url::form_urlencoded;

use crate::params::{NUMBER_PARAM, OFFSET_PARAM, Pagination};

/// The request URL a set of page links is derived from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestTarget<'a> {
    base_url: &'a str,
    path: &'a str,
    query: &'a str,
}

impl<'a> RequestTarget<'a> {
    /// Describe a request by its base URL, path and raw query string.
    #[must_use]
    pub const fn new(base_url: &'a str, path: &'a str, query: &'a str) -> Self {
        Self {
            base_url,
            path,
            query,
        }
    }

    /// Rebuild the request URL with `key` set to `value`.
    ///
    /// The first occurrence of `key` is replaced in place and later
    /// duplicates are dropped; every other pair keeps its position. Pairs are
    /// written back decoded, so brackets stay readable.
    fn with_param(&self, key: &str, value: u64) -> String {
        let value = value.to_string();
        let mut replaced = false;
        let mut pairs = Vec::new();
        for (name, current) in form_urlencoded::parse(self.query.as_bytes()) {
            if name == key {
                if !replaced {
                    pairs.push(format!("{name}={value}"));
                    replaced = true;
                }
            } else {
                pairs.push(format!("{name}={current}"));
            }
        }
        if !replaced {
            pairs.push(format!("{key}={value}"));
        }
        format!("{}{}?{}", self.base_url, self.path, pairs.join("&"))
    }
}

/// Navigation links of a paginated collection.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PageLinks {
    /// Link to the first page.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first: Option<String>,
    /// Link to the previous page.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prev: Option<String>,
    /// Link to the next page.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next: Option<String>,
    /// Link to the last page.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last: Option<String>,
}

impl PageLinks {
    /// Report whether no link was planned.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.first.is_none() && self.prev.is_none() && self.next.is_none() && self.last.is_none()
    }

    /// Flatten the planned links into `(name, url)` pairs in navigation order.
    #[must_use]
    pub fn into_pairs(self) -> Vec<(&'static str, String)> {
        [
            ("first", self.first),
            ("prev", self.prev),
            ("next", self.next),
            ("last", self.last),
        ]
        .into_iter()
        .filter_map(|(name, link)| link.map(|url| (name, url)))
        .collect()
    }
}

impl Pagination {
    /// Plan the navigation links for this page given the total entry count.
    ///
    /// Numbered pages omit `first` and `prev` on page one and omit `next` and
    /// `last` on the final page. Offset windows omit `first` and `prev` at
    /// offset zero and omit `next` and `last` once the window reaches the end.
    #[must_use]
    pub fn links(&self, target: &RequestTarget<'_>, count: u64) -> PageLinks {
        let mut links = PageLinks::default();
        match *self {
            Self::Numbered { number, size } => {
                let total = if size == 0 { 0 } else { count.div_ceil(size) };
                if number != 1 {
                    links.first = Some(target.with_param(NUMBER_PARAM, 1));
                    links.prev = Some(target.with_param(NUMBER_PARAM, number.saturating_sub(1)));
                }
                if number != total {
                    links.next = Some(target.with_param(NUMBER_PARAM, number.saturating_add(1)));
                    links.last = Some(target.with_param(NUMBER_PARAM, total));
                }
            }
            Self::Offset { offset, limit } => {
                if offset != 0 {
                    links.first = Some(target.with_param(OFFSET_PARAM, 0));
                    links.prev = Some(target.with_param(OFFSET_PARAM, offset.saturating_sub(limit)));
                }
                if offset.saturating_add(limit) < count {
                    links.next = Some(target.with_param(OFFSET_PARAM, offset.saturating_add(limit)));
                    links.last = Some(target.with_param(OFFSET_PARAM, count.saturating_sub(limit)));
                }
            }
        }
        links
    }
}

#[cfg(test)]
mod tests {
    //! Link planning for both strategies.

    use super::*;
    use rstest::{fixture, rstest};

    const BASE: &str = "http://localhost:31415";
    const PATH: &str = "/v1/posts";

    fn url(query: &str) -> Option<String> {
        Some(format!("{BASE}{PATH}?{query}"))
    }

    #[fixture]
    fn numbered_query() -> &'static str {
        "page[number]=2&page[size]=10"
    }

    #[rstest]
    fn plans_all_links_for_middle_page(numbered_query: &str) {
        let target = RequestTarget::new(BASE, PATH, numbered_query);
        let page = Pagination::Numbered { number: 2, size: 10 };
        let links = page.links(&target, 25);
        assert_eq!(links.first, url("page[number]=1&page[size]=10"));
        assert_eq!(links.prev, url("page[number]=1&page[size]=10"));
        assert_eq!(links.next, url("page[number]=3&page[size]=10"));
        assert_eq!(links.last, url("page[number]=3&page[size]=10"));
    }

    #[rstest]
    fn first_page_has_no_backward_links() {
        let target = RequestTarget::new(BASE, PATH, "page[number]=1&page[size]=10");
        let links = Pagination::Numbered { number: 1, size: 10 }.links(&target, 25);
        assert_eq!(links.first, None);
        assert_eq!(links.prev, None);
        assert_eq!(links.next, url("page[number]=2&page[size]=10"));
        assert_eq!(links.last, url("page[number]=3&page[size]=10"));
    }

    #[rstest]
    fn last_page_has_no_forward_links() {
        let target = RequestTarget::new(BASE, PATH, "page[number]=3&page[size]=10");
        let links = Pagination::Numbered { number: 3, size: 10 }.links(&target, 25);
        assert_eq!(links.first, url("page[number]=1&page[size]=10"));
        assert_eq!(links.prev, url("page[number]=2&page[size]=10"));
        assert!(links.next.is_none());
        assert!(links.last.is_none());
    }

    #[rstest]
    fn preserves_unrelated_parameters_in_order() {
        let target = RequestTarget::new(BASE, PATH, "sort=title&page%5Bnumber%5D=2&page%5Bsize%5D=5");
        let links = Pagination::Numbered { number: 2, size: 5 }.links(&target, 10);
        assert_eq!(links.prev, url("sort=title&page[number]=1&page[size]=5"));
        assert!(links.next.is_none());
    }

    #[rstest]
    fn plans_offset_links_in_the_middle() {
        let target = RequestTarget::new(BASE, PATH, "page[offset]=10&page[limit]=10");
        let links = Pagination::Offset { offset: 10, limit: 10 }.links(&target, 25);
        assert_eq!(links.first, url("page[offset]=0&page[limit]=10"));
        assert_eq!(links.prev, url("page[offset]=0&page[limit]=10"));
        assert_eq!(links.next, url("page[offset]=20&page[limit]=10"));
        assert_eq!(links.last, url("page[offset]=15&page[limit]=10"));
    }

    #[rstest]
    #[case(0, 10, 25, false, true)]
    #[case(20, 10, 25, true, false)]
    #[case(0, 10, 5, false, false)]
    fn offset_link_presence(
        #[case] offset: u64,
        #[case] limit: u64,
        #[case] count: u64,
        #[case] backward: bool,
        #[case] forward: bool,
    ) {
        let query = format!("page[offset]={offset}&page[limit]={limit}");
        let target = RequestTarget::new(BASE, PATH, &query);
        let links = Pagination::Offset { offset, limit }.links(&target, count);
        assert_eq!(links.first.is_some(), backward);
        assert_eq!(links.prev.is_some(), backward);
        assert_eq!(links.next.is_some(), forward);
        assert_eq!(links.last.is_some(), forward);
    }

    #[rstest]
    fn pairs_follow_navigation_order() {
        let links = PageLinks {
            first: Some("a".into()),
            prev: None,
            next: Some("c".into()),
            last: Some("d".into()),
        };
        let names: Vec<_> = links.into_pairs().into_iter().map(|(name, _)| name).collect();
        assert_eq!(names, ["first", "next", "last"]);
        assert!(PageLinks::default().is_empty());
    }
}
