use crate::FeatureTree;

/// Key of the VCP feature list in a capability string.
pub const VCP_KEY: &str = "vcp";

/// Key of the input select feature inside the VCP feature list.
pub const INPUT_SELECT_KEY: &str = "60";

/// VCP code of the input select feature.
pub const INPUT_SELECT_CODE: u8 = 0x60;

/// Labels of the standard MCCS input select values, indexed by value.
pub static INPUT_NAMES: [&str; 19] = [
    "None",
    "Analog 1",
    "Analog 2",
    "DVI 1",
    "DVI 2",
    "Composite 1",
    "Composite 2",
    "S-video 1",
    "S-video 2",
    "Tuner 1",
    "Tuner 2",
    "Tuner 3",
    "Component 1",
    "Component 2",
    "Component 3",
    "DisplayPort 1",
    "DisplayPort 2",
    "HDMI 1",
    "HDMI 2",
];

/// An input a display can be switched to.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct InputSource {
    /// The code as written in the capability string, e.g. `0F`.
    pub code: String,

    /// Human readable name of the input.
    pub label: &'static str,
}

impl InputSource {
    /// Builds an input source from its capability string code.
    pub fn from_code<S: Into<String>>(code: S) -> Self {
        let code = code.into();
        let label = match u32::from_str_radix(&code, 16) {
            Ok(value) => input_label(value),
            Err(_) => INPUT_NAMES[0],
        };

        Self { code, label }
    }

    /// The numeric value to write to the input select feature, `None` if the code is not hex.
    pub fn value(&self) -> Option<u16> {
        u16::from_str_radix(&self.code, 16).ok()
    }
}

/// Label for an input select value. Values outside the standard table map to `None`.
pub fn input_label(value: u32) -> &'static str {
    usize::try_from(value)
        .ok()
        .and_then(|index| INPUT_NAMES.get(index))
        .copied()
        .unwrap_or(INPUT_NAMES[0])
}

/// Formats an input select value as reported by a display, e.g. `15` as `0F`.
///
/// Only the low byte identifies the input, displays may report garbage in the high byte.
pub fn format_input_code(value: u32) -> String {
    format!("{:02X}", value % 256)
}

/// Lists the input sources advertised under `vcp(60(...))`.
///
/// Returns `None` when the display does not advertise input select. The order
/// is the tree's key order, sort the result for a stable listing.
pub fn input_sources(tree: &FeatureTree) -> Option<Vec<InputSource>> {
    let modes = tree.path(&[VCP_KEY, INPUT_SELECT_KEY])?;

    Some(modes.keys().map(InputSource::from_code).collect())
}
