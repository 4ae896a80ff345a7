//! Query parameter parsing and strategy selection.

use serde::Serialize;
use thiserror::Error;
use url::form_urlencoded;

/// Query key selecting the page index of the numbered strategy.
pub const NUMBER_PARAM: &str = "page[number]";
/// Query key selecting the page size of the numbered strategy.
pub const SIZE_PARAM: &str = "page[size]";
/// Query key selecting the start offset of the offset strategy.
pub const OFFSET_PARAM: &str = "page[offset]";
/// Query key selecting the window length of the offset strategy.
pub const LIMIT_PARAM: &str = "page[limit]";

/// Errors raised while validating pagination parameters.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PaginationError {
    /// A parameter value is not an unsigned integer.
    #[error("{param} must be a non-negative integer, got {value:?}")]
    InvalidNumber {
        /// Query key that failed to parse.
        param: &'static str,
        /// Raw value supplied by the client.
        value: String,
    },
    /// A parameter that must be positive was zero.
    #[error("{param} must be greater than zero")]
    Zero {
        /// Query key holding the zero value.
        param: &'static str,
    },
}

/// Raw pagination values captured from a request query string.
///
/// Only the first occurrence of each key is kept and empty values count as
/// absent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageParams {
    number: Option<String>,
    size: Option<String>,
    offset: Option<String>,
    limit: Option<String>,
}

impl PageParams {
    /// Extract pagination values from a raw, possibly percent-encoded, query.
    #[must_use]
    pub fn from_query(query: &str) -> Self {
        let mut params = Self::default();
        for (key, value) in form_urlencoded::parse(query.as_bytes()) {
            let slot = match &*key {
                NUMBER_PARAM => &mut params.number,
                SIZE_PARAM => &mut params.size,
                OFFSET_PARAM => &mut params.offset,
                LIMIT_PARAM => &mut params.limit,
                _ => continue,
            };
            if slot.is_none() && !value.is_empty() {
                *slot = Some(value.into_owned());
            }
        }
        params
    }

    /// Report whether `key` is one of the four pagination keys.
    #[must_use]
    pub fn is_page_key(key: &str) -> bool {
        matches!(key, NUMBER_PARAM | SIZE_PARAM | OFFSET_PARAM | LIMIT_PARAM)
    }

    /// Select the pagination strategy requested by the client.
    ///
    /// Exactly `{number, size}` or exactly `{offset, limit}` must be present
    /// for a strategy to apply; every other combination yields `Ok(None)` and
    /// the caller falls back to an unpaginated listing.
    ///
    /// # Errors
    ///
    /// Returns [`PaginationError`] when a selected strategy carries a value
    /// that is not a number, or a zero page number, size or limit.
    pub fn strategy(&self) -> Result<Option<Pagination>, PaginationError> {
        match (&self.number, &self.size, &self.offset, &self.limit) {
            (Some(number), Some(size), None, None) => {
                let number = positive(NUMBER_PARAM, number)?;
                let size = positive(SIZE_PARAM, size)?;
                Ok(Some(Pagination::Numbered { number, size }))
            }
            (None, None, Some(offset), Some(limit)) => {
                let offset = parse(OFFSET_PARAM, offset)?;
                let limit = positive(LIMIT_PARAM, limit)?;
                Ok(Some(Pagination::Offset { offset, limit }))
            }
            _ => Ok(None),
        }
    }
}

/// A validated pagination request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "strategy", rename_all = "snake_case")]
pub enum Pagination {
    /// One-based page index with a fixed page size.
    Numbered {
        /// One-based page index.
        number: u64,
        /// Entries per page.
        size: u64,
    },
    /// Zero-based offset with a window length.
    Offset {
        /// Index of the first entry.
        offset: u64,
        /// Maximum number of entries.
        limit: u64,
    },
}

impl Pagination {
    /// Index of the first entry selected by this page.
    #[must_use]
    pub const fn start(&self) -> u64 {
        match *self {
            Self::Numbered { number, size } => number.saturating_sub(1).saturating_mul(size),
            Self::Offset { offset, .. } => offset,
        }
    }

    /// Maximum number of entries selected by this page.
    #[must_use]
    pub const fn len(&self) -> u64 {
        match *self {
            Self::Numbered { size, .. } => size,
            Self::Offset { limit, .. } => limit,
        }
    }

    /// Report whether the page can never select an entry.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn parse(param: &'static str, value: &str) -> Result<u64, PaginationError> {
    value
        .parse::<u64>()
        .map_err(|_| PaginationError::InvalidNumber {
            param,
            value: value.to_owned(),
        })
}

fn positive(param: &'static str, value: &str) -> Result<u64, PaginationError> {
    match parse(param, value)? {
        0 => Err(PaginationError::Zero { param }),
        parsed => Ok(parsed),
    }
}

#[cfg(test)]
mod tests {
    //! Strategy selection and validation.

    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("page[number]=2&page[size]=10", Some(Pagination::Numbered { number: 2, size: 10 }))]
    #[case("page[offset]=0&page[limit]=5", Some(Pagination::Offset { offset: 0, limit: 5 }))]
    #[case("page%5Bnumber%5D=3&page%5Bsize%5D=4", Some(Pagination::Numbered { number: 3, size: 4 }))]
    #[case("page[number]=2", None)]
    #[case("page[number]=2&page[size]=10&page[offset]=1", None)]
    #[case("page[number]=2&page[limit]=10", None)]
    #[case("page[number]=&page[size]=10", None)]
    #[case("sort=title", None)]
    #[case("", None)]
    fn selects_strategy(#[case] query: &str, #[case] expected: Option<Pagination>) {
        let params = PageParams::from_query(query);
        assert_eq!(params.strategy(), Ok(expected));
    }

    #[rstest]
    #[case("page[number]=abc&page[size]=10", PaginationError::InvalidNumber { param: NUMBER_PARAM, value: "abc".into() })]
    #[case("page[number]=-1&page[size]=10", PaginationError::InvalidNumber { param: NUMBER_PARAM, value: "-1".into() })]
    #[case("page[number]=0&page[size]=10", PaginationError::Zero { param: NUMBER_PARAM })]
    #[case("page[number]=1&page[size]=0", PaginationError::Zero { param: SIZE_PARAM })]
    #[case("page[offset]=0&page[limit]=0", PaginationError::Zero { param: LIMIT_PARAM })]
    #[case("page[offset]=x&page[limit]=2", PaginationError::InvalidNumber { param: OFFSET_PARAM, value: "x".into() })]
    fn rejects_invalid_values(#[case] query: &str, #[case] expected: PaginationError) {
        let params = PageParams::from_query(query);
        assert_eq!(params.strategy(), Err(expected));
    }

    #[rstest]
    fn first_occurrence_wins() {
        let params = PageParams::from_query("page[number]=2&page[number]=7&page[size]=3");
        assert_eq!(
            params.strategy(),
            Ok(Some(Pagination::Numbered { number: 2, size: 3 }))
        );
    }

    #[rstest]
    #[case(Pagination::Numbered { number: 3, size: 10 }, 20, 10)]
    #[case(Pagination::Numbered { number: 1, size: 5 }, 0, 5)]
    #[case(Pagination::Offset { offset: 7, limit: 2 }, 7, 2)]
    fn exposes_window(#[case] page: Pagination, #[case] start: u64, #[case] len: u64) {
        assert_eq!(page.start(), start);
        assert_eq!(page.len(), len);
    }

    #[rstest]
    fn recognises_page_keys() {
        assert!(PageParams::is_page_key("page[limit]"));
        assert!(!PageParams::is_page_key("page"));
    }
}
