//! # kasir-core: Pure Business Logic for Kasir
//!
//! Everything in Kasir that can be decided without touching the database
//! or the network lives here.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                          Kasir Architecture                             │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                 kasir-api (axum HTTP layer)                     │   │
//! │  │    /categories  /products  /transactions  ...                   │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                 kasir-db (SQLite, units of work)                │   │
//! │  │    repositories · price ledger · invoice numbering · checkout   │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ kasir-core (THIS CRATE) ★                       │   │
//! │  │                                                                 │   │
//! │  │   ┌─────────┐ ┌─────────┐ ┌──────────┐ ┌─────────┐ ┌─────────┐ │   │
//! │  │   │  types  │ │  money  │ │ pricing  │ │ invoice │ │  input  │ │   │
//! │  │   └─────────┘ └─────────┘ └──────────┘ └─────────┘ └─────────┘ │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • NO CLOCK                  │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`money`] - Exact decimal `Money`
//! - [`types`] - Domain entities and read models
//! - [`input`] - Request contracts with validation
//! - [`validation`] - Field-level rules
//! - [`pricing`] - Cart line snapshots, totals, change due
//! - [`invoice`] - `INV-YYYYMMDD-NNN` code derivation
//! - [`error`] - Domain error types
//!
//! ## Example Usage
//!
//! ```rust
//! use kasir_core::{Money, PricedCart};
//!
//! let mut cart = PricedCart::new();
//! cart.add_line("kopi", 2, Money::from_units(25000)).unwrap();
//!
//! assert_eq!(cart.total(), Money::from_units(50000));
//! assert_eq!(
//!     cart.change_due(Money::from_units(60000)).unwrap(),
//!     Money::from_units(10000)
//! );
//! ```

pub mod error;
pub mod input;
pub mod invoice;
pub mod money;
pub mod pricing;
pub mod types;
pub mod validation;

pub use error::{CoreError, CoreResult, ValidationError};
pub use money::Money;
pub use pricing::{PricedCart, PricedLine};
pub use types::*;

/// Generates a new entity identifier (UUID v4).
pub fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}
