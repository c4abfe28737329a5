/// Returns the segment between the first and second `\` of a device or instance id.
///
/// `MONITOR\DEL4123\{4d36e96e-e325-11ce-bfc1-08002be10318}\0001` and
/// `DISPLAY\DEL4123\5&1b7e7b0a&0&UID4352_0` both give `DEL4123`.
/// Without a first `\` the segment starts at the beginning of the id, without
/// a second it runs to the end.
pub fn sub_id(id: &str) -> &str {
    let start = id.find('\\').map_or(0, |index| index + 1);
    let rest = &id[start..];

    match rest.find('\\') {
        Some(end) => &rest[..end],
        None => rest,
    }
}
