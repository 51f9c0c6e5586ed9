//! Typed wrappers over the backend's resource endpoints.
//!
//! Every call goes through [`ApiClient::execute`](crate::client::ApiClient::execute), so bearer
//! attachment and 401 recovery apply uniformly. Non-2xx responses become
//! [`Error::Api`](crate::error::Error::Api) with the backend's `{code, message}` body.

pub mod alerts;
pub mod metrics;
pub mod routers;
pub mod sessions;
pub mod topology;
pub mod users;

pub use alerts::*;
pub use metrics::*;
pub use routers::*;
pub use sessions::*;
pub use topology::*;
pub use users::*;

// crates.io
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
// self
use crate::{_prelude::*, error::ConfigError};

/// Pagination metadata attached to list responses.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
	/// 1-based page index.
	pub page: u32,
	/// Items per page.
	pub page_size: u32,
	/// Items across all pages.
	pub total_items: u64,
	/// Number of pages.
	pub total_pages: u32,
}

/// One page of a list endpoint.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Page<T> {
	/// Items on this page.
	pub data: Vec<T>,
	/// Position of this page within the full listing.
	pub pagination: Pagination,
}
impl<T> Page<T> {
	/// Returns `true` when later pages exist.
	pub fn has_next(&self) -> bool {
		self.pagination.page < self.pagination.total_pages
	}
}

/// Paging parameters shared by list endpoints. Unset fields are not sent.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct ListQuery {
	/// 1-based page index.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub page: Option<u32>,
	/// Items per page.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub page_size: Option<u32>,
}
impl ListQuery {
	/// Requests `page` with the backend's default page size.
	pub fn page(page: u32) -> Self {
		Self { page: Some(page), page_size: None }
	}

	/// Sets the page size.
	pub fn with_page_size(mut self, page_size: u32) -> Self {
		self.page_size = Some(page_size);

		self
	}
}

/// Characters escaped inside a single path segment: everything but RFC 3986 unreserved.
const PATH_SEGMENT: &AsciiSet =
	&NON_ALPHANUMERIC.remove(b'-').remove(b'.').remove(b'_').remove(b'~');

/// Percent-encodes an identifier for use as a single path segment.
///
/// Empty identifiers and the dot segments `.` and `..` are rejected; URL parsing would
/// collapse them and retarget the request at a different endpoint.
pub(crate) fn path_segment(id: &str) -> Result<String, ConfigError> {
	if matches!(id, "" | "." | "..") {
		return Err(ConfigError::InvalidPathSegment { segment: id.to_owned() });
	}

	Ok(utf8_percent_encode(id, PATH_SEGMENT).to_string())
}
