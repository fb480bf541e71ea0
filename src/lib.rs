//! countries-rs
//!
//! A lightweight Rust library for fetching the public list of world countries
//! and querying it as a normalized in-memory table. Pairs with country
//! dashboards and CLI menus, which consume the table; presentation stays on
//! their side.
//!
//! ### Features
//! - One-call fetch of all countries with bounded retry/backoff on transient
//!   server errors
//! - Normalization into a uniform table that tolerates partial or malformed
//!   upstream records
//! - Case-insensitive lookup by country name and ordered name enumeration
//!
//! ### Example
//! ```no_run
//! use countries_rs::Client;
//!
//! let client = Client::default();
//! let table = client.fetch_table()?;
//! for name in table.names().take(5) {
//!     println!("{name}");
//! }
//! if let Some(chile) = table.find_by_name("chile") {
//!     println!("{} has capital {}", chile.common_name, chile.capital);
//! }
//! # Ok::<(), countries_rs::FetchError>(())
//! ```

pub mod api;
pub mod models;
pub mod table;

pub use api::{Client, FetchError};
pub use models::CountryRecord;
pub use table::CountryTable;
