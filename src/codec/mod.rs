//! In-process codec providers.
//!
//! Each submodule implements one transform family as pure functions:
//! validated bytes + options in, bytes out, or a [`crate::error::ConvertError::Codec`]
//! carrying the underlying library diagnostic. Nothing here touches the
//! filesystem or spawns processes — that separation keeps every transform
//! unit-testable and lets the orchestrator stay pure composition logic.
//!
//! All providers are CPU-bound and blocking; callers run them inside
//! `tokio::task::spawn_blocking`.
//!
//! 1. [`raster`] — raster decode/re-encode/resize via the `image` crate
//! 2. [`svg`]    — SVG rasterization at fixed density via `resvg`
//! 3. [`pdf`]    — PDF page count, single-page extraction, and raster
//!    embedding via `lopdf`

pub mod pdf;
pub mod raster;
pub mod svg;
