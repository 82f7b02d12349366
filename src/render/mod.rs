//! Graph rendering for charnet
//!
//! This module maps a character graph onto vis-network visual attributes and
//! embeds it in a standalone HTML page.

pub mod html;
pub mod payload;

// Re-export main types and functions
pub use html::{render_html, render_payload_html, write_html};
pub use payload::{GraphPayload, VisEdge, VisNode};
