//! # MCCS Capabilities
//! Parses the capability description string a display reports over DDC/CI and
//! extracts the input sources it supports.
//!
//! ```
//! use mccs_capabilities::{input_sources, parse};
//!
//! let tree = parse("(prot(monitor)vcp(10 12 60(0F 11)))").unwrap();
//! let mut sources = input_sources(&tree).unwrap();
//! sources.sort();
//!
//! assert_eq!(sources[0].label, "DisplayPort 1");
//! assert_eq!(sources[1].label, "HDMI 1");
//! ```

mod feature_tree;
mod input_source;
mod parser;

pub use feature_tree::FeatureTree;
pub use input_source::{
    INPUT_NAMES, INPUT_SELECT_CODE, INPUT_SELECT_KEY, InputSource, VCP_KEY, format_input_code,
    input_label, input_sources,
};
pub use parser::{MAX_DEPTH, MalformedCapabilityString, parse};

/// Parses a capability string and extracts its input sources in one step.
///
/// Returns `Ok(None)` when the display does not advertise the input select feature.
pub fn parse_input_sources(
    capabilities: &str,
) -> Result<Option<Vec<InputSource>>, MalformedCapabilityString> {
    let tree = parse(capabilities)?;
    Ok(input_sources(&tree))
}
