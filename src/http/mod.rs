//! HTTP protocol layer module
//!
//! Protocol helpers shared by the request handler: content types, cache
//! validators, byte ranges and status responses.

pub mod cache;
pub mod mime;
pub mod range;
pub mod response;

pub use mime::MimeTable;
pub use range::{parse_range_header, RangeParseResult};
pub use response::{
    build_301_response, build_304_response, build_404_response, build_405_response,
    build_416_response, build_500_response, build_options_response,
};
