//! Page-number pagination primitives shared by workout tracker list endpoints.
//!
//! The crate has three layers:
//!
//! - [`PageParams`] captures raw query-string values exactly as clients send
//!   them and validates them into a [`PageRequest`] under [`PageLimits`].
//! - [`paginate`] runs the filter, sort and slice pipeline over any in-memory
//!   collection whose items expose a stable [`Sequenced`] identifier.
//! - [`Paged`] is the response envelope returned to adapters.
//!
//! # Examples
//!
//! ```
//! use pagination::{PageLimits, PageParams, Sequenced, SortSelectors, paginate};
//!
//! struct Group {
//!     id: i64,
//!     name: &'static str,
//! }
//!
//! impl Sequenced for Group {
//!     fn sequence(&self) -> i64 {
//!         self.id
//!     }
//! }
//!
//! let groups = vec![
//!     Group { id: 1, name: "A" },
//!     Group { id: 2, name: "B" },
//!     Group { id: 3, name: "C" },
//! ];
//! let params = PageParams {
//!     page_number: Some("1".to_owned()),
//!     page_size: Some("2".to_owned()),
//!     sort_by: Some("name".to_owned()),
//!     sort_order: Some("Desc".to_owned()),
//!     ..PageParams::default()
//! };
//! let request = params.into_request(&PageLimits::default()).expect("valid params");
//! let sorts = SortSelectors::new().with("name", |group: &Group| group.name);
//!
//! let page = paginate(groups, &request, |_, _| true, &sorts);
//! let names: Vec<_> = page.data.iter().map(|group| group.name).collect();
//! assert_eq!(names, ["C", "B"]);
//! assert_eq!(page.total_items, 3);
//! assert_eq!(page.total_pages, 2);
//! ```

mod engine;
mod request;
mod response;

pub use engine::{Sequenced, SortSelectors, contains_ignore_case, paginate};
pub use request::{
    DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE, PageLimits, PageParams, PageRequest, PageRequestError,
    SortOrder,
};
pub use response::Paged;
