use display_identity::DisplayIdentity;

use crate::config::Config;

/// Finds the display `selector` refers to.
///
/// A selector is tried as a zero based index, then a serial number, then a user chosen name, and
/// finally a friendly name. Names only match when exactly one display has them.
pub fn select<'a, H>(
    displays: &'a [DisplayIdentity<H>],
    config: &Config,
    selector: &str,
) -> Option<&'a DisplayIdentity<H>> {
    if let Ok(index) = selector.parse::<usize>() {
        if let Some(display) = displays.get(index) {
            return Some(display);
        }
    }

    if let Some(display) = displays.iter().find(|display| display.serial == selector) {
        return Some(display);
    }

    unique(displays, |display| {
        config.names.get(&display.serial).map(String::as_str) == Some(selector)
    })
    .or_else(|| unique(displays, |display| display.friendly_name == selector))
}

fn unique<H>(
    displays: &[DisplayIdentity<H>],
    predicate: impl Fn(&DisplayIdentity<H>) -> bool,
) -> Option<&DisplayIdentity<H>> {
    let mut matches = displays.iter().filter(|display| predicate(display));

    match (matches.next(), matches.next()) {
        (Some(display), None) => Some(display),
        _ => None,
    }
}
