//! Proc macros for pagesift.
//!
//! - [`Record`] - Derive `pagesift::Record` from struct field annotations
//!
//! The derive is re-exported by `pagesift` behind its default `macros`
//! feature, so most users never depend on this crate directly.

mod record;

use proc_macro::TokenStream;
use syn::{parse_macro_input, DeriveInput};

/// Derives `pagesift::Record` for a struct with named fields.
///
/// Only fields annotated with `#[record(...)]` are queryable.
///
/// # Field Types
///
/// | Attribute | Declared type | Field types |
/// |-----------|---------------|-------------|
/// | `String` | `FieldType::String` | `String`, `&str` |
/// | `Number` | `FieldType::Number` | integers, floats |
/// | `Timestamp` | `FieldType::Timestamp` | `i64` millis, chrono date-times, strings |
/// | `Bool` | `FieldType::Bool` | `bool` |
///
/// Any field type implementing `pagesift::ToValue` works, including
/// `Option<T>` (where `None` reads as null).
///
/// # Options
///
/// - `skip` - exclude the field
/// - `rename = "name"` - query name (default: the Rust field name)
/// - `ty = "timestamp"` - the type as a string
///
/// # Generated Code
///
/// 1. A `pub const` per field holding its query name, in SCREAMING_SNAKE_CASE
/// 2. `Record::field()` returning the field value
/// 3. `Record::schema()` listing the declared types
///
/// # Example
///
/// ```ignore
/// use pagesift::{PageQuery, Record};
///
/// #[derive(Record)]
/// struct Parcel {
///     #[record(String)]
///     status: String,
///     #[record(Number)]
///     weight: u32,
///     #[record(Timestamp, rename = "createdAt")]
///     created_at: i64,
///     #[record(skip)]
///     internal: String,
/// }
///
/// assert_eq!(Parcel::CREATED_AT, "createdAt");
/// let page = PageQuery::new().sort_desc(Parcel::WEIGHT).execute(&parcels)?;
/// ```
#[proc_macro_derive(Record, attributes(record))]
pub fn record_derive(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    record::record_derive_impl(input)
        .unwrap_or_else(|e| e.to_compile_error())
        .into()
}
