//! Generic DNS record management with a Mythic Beasts backend.
//!
//! The crate splits into a provider-agnostic core and per-provider
//! adapters. [`core::record::Record`] is the polymorphic record model and
//! [`core::provider`] defines the four capability contracts (get, append,
//! set, delete), each scoped to a zone. The Mythic Beasts adapter
//! translates that model to the DNS API v2 wire format and back.
//!
//! ```rust,no_run
//! use dns_mythicbeasts::{MythicBeastsConfig, MythicBeastsProvider, RecordGetter};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let provider = MythicBeastsProvider::new(MythicBeastsConfig::new("key-id", "secret"))?;
//! for record in provider.get_records("example.com.").await? {
//!     println!("{record:?}");
//! }
//! # Ok(())
//! # }
//! ```
//!
//! Zone arguments are reduced to their registrable domain (trailing dot
//! trimmed, effective TLD plus one label) before use, so
//! `www.example.com.` and `example.com` address the same zone.

pub mod core;
pub mod error;
pub mod providers;

pub use crate::core::provider::{RecordAppender, RecordDeleter, RecordGetter, RecordSetter};
pub use crate::core::record::{Record, Rr};
pub use crate::error::Error;
pub use crate::providers::mythicbeasts::{MythicBeastsConfig, MythicBeastsProvider};
