//! Configuration: external tool candidate lists and request option bounds.
//!
//! # Design choice: candidate lists over single binaries
//! The same converter ships under different executable names depending on the
//! platform and build — Ghostscript alone is `gs` on unix but `gswin64c` or
//! `gswin32c` on Windows. Each tool is therefore configured as an *ordered
//! candidate list*: the environment variable (if set) replaces the primary
//! name, and the built-in alternates remain as fallbacks. The invoker tries
//! them in order at call time, so a deployment never has to enumerate every
//! possible binary name itself.
//!
//! Request options (`quality`, `width`, `height`) are parsed and bounds-checked
//! here, before any scratch space or subprocess exists. An out-of-range value
//! is a [`ConvertError::Validation`] with the bound spelled out in the message.

use crate::error::ConvertError;
use std::env;

/// Environment variable naming the primary Ghostscript binary.
pub const GS_BIN: &str = "GS_BIN";
/// Environment variable naming the LibreOffice binary.
pub const SOFFICE_BIN: &str = "SOFFICE_BIN";
/// Environment variable naming the Poppler `pdftoppm` binary.
pub const POPPLER_PPM_BIN: &str = "POPPLER_PPM_BIN";

#[cfg(not(windows))]
const GS_DEFAULTS: &[&str] = &["gs"];
#[cfg(windows)]
const GS_DEFAULTS: &[&str] = &["gswin64c", "gswin32c"];

const SOFFICE_DEFAULTS: &[&str] = &["soffice", "libreoffice"];
const PDFTOPPM_DEFAULTS: &[&str] = &["pdftoppm"];

/// Ordered executable candidates for each external converter.
///
/// Construct via [`ToolConfig::from_env`] in the server, or directly in tests
/// to point a flow at a deliberately bogus binary.
#[derive(Debug, Clone)]
pub struct ToolConfig {
    pub ghostscript: Vec<String>,
    pub libreoffice: Vec<String>,
    pub pdftoppm: Vec<String>,
}

impl Default for ToolConfig {
    fn default() -> Self {
        Self {
            ghostscript: GS_DEFAULTS.iter().map(|s| s.to_string()).collect(),
            libreoffice: SOFFICE_DEFAULTS.iter().map(|s| s.to_string()).collect(),
            pdftoppm: PDFTOPPM_DEFAULTS.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl ToolConfig {
    /// Resolve candidate lists from the environment.
    ///
    /// A set variable replaces the *primary* candidate only; built-in
    /// alternates stay in the list so a misconfigured override still has a
    /// chance of finding a working binary. An absent or empty variable falls
    /// back to the defaults, never to failure.
    pub fn from_env() -> Self {
        Self {
            ghostscript: candidates(GS_BIN, GS_DEFAULTS),
            libreoffice: candidates(SOFFICE_BIN, SOFFICE_DEFAULTS),
            pdftoppm: candidates(POPPLER_PPM_BIN, PDFTOPPM_DEFAULTS),
        }
    }
}

fn candidates(var: &str, defaults: &[&str]) -> Vec<String> {
    match env::var(var) {
        Ok(v) if !v.trim().is_empty() => {
            let mut list = vec![v];
            list.extend(defaults.iter().skip(1).map(|s| s.to_string()));
            list
        }
        _ => defaults.iter().map(|s| s.to_string()).collect(),
    }
}

// ── Request option bounds ────────────────────────────────────────────────

/// Inclusive JPEG quality range.
pub const QUALITY_RANGE: (u8, u8) = (1, 100);
/// Inclusive pixel dimension range for rasterization targets.
pub const DIMENSION_RANGE: (u32, u32) = (1, 4096);

/// Parse an optional form field as a JPEG quality, defaulting when absent.
///
/// Bounds: 1–100 inclusive. Checked before any I/O happens.
pub fn parse_quality(field: Option<&str>, default: u8) -> Result<u8, ConvertError> {
    let q = match field {
        None | Some("") => default,
        Some(s) => s
            .trim()
            .parse::<u8>()
            .map_err(|_| ConvertError::Validation("Quality must be between 1-100".into()))?,
    };
    if q < QUALITY_RANGE.0 || q > QUALITY_RANGE.1 {
        return Err(ConvertError::Validation(
            "Quality must be between 1-100".into(),
        ));
    }
    Ok(q)
}

/// A validated output size for rasterization, fit-inside semantics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

impl Dimensions {
    /// Parse optional `width`/`height` form fields, defaulting to 1024 each.
    ///
    /// Bounds: 1–4096 px per dimension. Checked before any I/O happens.
    pub fn from_fields(width: Option<&str>, height: Option<&str>) -> Result<Self, ConvertError> {
        let width = parse_dimension(width, 1024)?;
        let height = parse_dimension(height, 1024)?;
        Ok(Self { width, height })
    }
}

fn parse_dimension(field: Option<&str>, default: u32) -> Result<u32, ConvertError> {
    let v = match field {
        None | Some("") => default,
        Some(s) => s.trim().parse::<u32>().map_err(|_| {
            ConvertError::Validation("Width and height must be between 1-4096 pixels".into())
        })?,
    };
    if v < DIMENSION_RANGE.0 || v > DIMENSION_RANGE.1 {
        return Err(ConvertError::Validation(
            "Width and height must be between 1-4096 pixels".into(),
        ));
    }
    Ok(v)
}
