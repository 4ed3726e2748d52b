//! Capability probing for the external converter tools.
//!
//! Each report is computed fresh on request — no caching — so an operator
//! who installs Ghostscript sees the flip on the very next probe. The result
//! is advisory: a `true` means the binary launched and answered `--version`,
//! not that conversions will succeed.

use crate::config::ToolConfig;
use crate::invoke;
use serde::Serialize;

/// Availability of each external converter, one flag per tool family.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub struct ToolHealth {
    pub ghostscript: bool,
    pub libreoffice: bool,
    pub poppler: bool,
}

/// Probe every configured candidate list.
pub async fn check(tools: &ToolConfig) -> ToolHealth {
    ToolHealth {
        ghostscript: invoke::probe_any(&tools.ghostscript).await,
        libreoffice: invoke::probe_any(&tools.libreoffice).await,
        poppler: invoke::probe_any(&tools.pdftoppm).await,
    }
}
