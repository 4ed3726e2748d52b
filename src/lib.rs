//! # fileconv
//!
//! An HTTP file conversion service: images, PDFs, SVGs, and Word documents
//! in; converted documents (or zip archives of them) out.
//!
//! ## Why this crate?
//!
//! File conversion is two very different jobs wearing one API. Raster and
//! vector transforms are pure CPU work that in-process codecs (`image`,
//! `resvg`, `lopdf`) do well; PDF↔Word and high-quality PDF compression need
//! battle-tested external converters (LibreOffice, Ghostscript, Poppler)
//! driven as subprocesses. This crate gives both the same shape: every
//! request gets validated options, an isolated scratch directory when disk is
//! involved, one stable error taxonomy, and a fixed download name.
//!
//! ## Request Flow
//!
//! ```text
//! multipart upload
//!  │
//!  ├─ 1. Validate  option bounds checked before any I/O (config)
//!  ├─ 2. Stage     scratch space + staged input file, RAII cleanup (scratch)
//!  ├─ 3. Transform in-process codec (codec::*) or external tool with
//!  │               candidate fallback (invoke)
//!  ├─ 4. Package   multi-file outputs zipped incrementally (archive)
//!  └─ 5. Respond   attachment download, archives streamed from disk (http)
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use fileconv::config::ToolConfig;
//! use fileconv::http::{router, AppState};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let app = router(AppState::new(ToolConfig::from_env()));
//!     let listener = tokio::net::TcpListener::bind("0.0.0.0:5000").await?;
//!     axum::serve(listener, app).await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature  | Default | Description |
//! |----------|---------|-------------|
//! | `server` | on      | Enables the `fileconv` binary (clap + anyhow + tracing-subscriber) |
//!
//! Disable `server` when embedding only the conversion flows:
//! ```toml
//! fileconv = { version = "0.3", default-features = false }
//! ```

// ── Modules ──────────────────────────────────────────────────────────────

pub mod archive;
pub mod codec;
pub mod config;
pub mod convert;
pub mod error;
pub mod http;
pub mod invoke;
pub mod probe;
pub mod scratch;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{Dimensions, ToolConfig};
pub use convert::Converted;
pub use error::ConvertError;
pub use probe::ToolHealth;
pub use scratch::ScratchSpace;
