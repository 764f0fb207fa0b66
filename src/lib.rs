//! # PixelTrace
//!
//! Find the events a person appears in and browse their photos.
//!
//! The catalog is one JSON document mapping event → person → Drive photo
//! links. PixelTrace loads it from a URL or file, answers lookups over it,
//! turns Drive view links into direct image URLs, and serves all of that
//! over a small JSON API.
//!
//! ## Architecture
//!
//! ```text
//! ┌────────────┐   ┌──────────┐   ┌─────────────┐   ┌──────────┐
//! │  Source    │──▶│  Façade  │──▶│ LookupStore │   │ Resolver │
//! │ HTTP/File  │   │  policy  │   │  (Catalog)  │   │ Drive URL│
//! └────────────┘   └────┬─────┘   └─────────────┘   └────┬─────┘
//!                       │                                 │
//!            ┌──────────┴──────────┬──────────────────────┘
//!            ▼                     ▼
//!      ┌──────────┐          ┌──────────┐
//!      │ Session  │          │   HTTP   │
//!      │ debounce │          │  server  │
//!      └──────────┘          └──────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```bash
//! pixeltrace search "anchal"
//! pixeltrace events "Anchal Apurva"
//! pixeltrace photos "Under25" "anchal_apurva"
//! pixeltrace serve
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing |
//! | [`models`] | Catalog and result types, name normalization |
//! | [`resolver`] | Drive link → image URL fallback chain |
//! | [`store`] | Read-only lookups over a catalog |
//! | [`source`] | Catalog loading (HTTP, file, cache) |
//! | [`facade`] | Query policy and typed outcomes |
//! | [`debounce`] | Cancellable, debounced query slots |
//! | [`session`] | Navigation state for a front end |
//! | [`server`] | JSON HTTP API |
//! | [`error`] | Error types |

pub mod config;
pub mod debounce;
pub mod error;
pub mod facade;
pub mod models;
pub mod resolver;
pub mod server;
pub mod session;
pub mod source;
pub mod store;

/// Install the global `tracing` subscriber, filtered by `RUST_LOG`
/// (default `warn`). Logs go to stderr so command output stays clean.
pub fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}
