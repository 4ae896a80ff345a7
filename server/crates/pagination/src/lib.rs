//! Pagination primitives for JSON:API collection endpoints.
//!
//! Two mutually exclusive strategies are understood: page-indexed
//! (`page[number]` with `page[size]`) and offset-based (`page[offset]` with
//! `page[limit]`). [`PageParams`] captures the raw query values,
//! [`Pagination`] is the validated strategy handed to data sources, and
//! [`Pagination::links`] plans the `first`, `prev`, `next` and `last` URLs of
//! a collection response.
//!
//! ```
//! use pagination::{PageParams, Pagination, RequestTarget};
//!
//! let params = PageParams::from_query("page[number]=2&page[size]=10");
//! let page = params.strategy().ok().flatten();
//! assert_eq!(page, Some(Pagination::Numbered { number: 2, size: 10 }));
//! ```

mod links;
mod params;

pub use links::{PageLinks, RequestTarget};
pub use params::{
    LIMIT_PARAM, NUMBER_PARAM, OFFSET_PARAM, PageParams, Pagination, PaginationError, SIZE_PARAM,
};
