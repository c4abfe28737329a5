/// Decodes a fixed size UTF-16 buffer up to its first NUL.
pub fn from_wide(buffer: &[u16]) -> String {
    let end = buffer
        .iter()
        .position(|&unit| unit == 0)
        .unwrap_or(buffer.len());

    String::from_utf16_lossy(&buffer[..end])
}

/// Decodes an ASCII reply buffer, dropping trailing NULs.
pub fn from_ascii_reply(buffer: &[u8]) -> String {
    let end = buffer
        .iter()
        .rposition(|&byte| byte != 0)
        .map_or(0, |last| last + 1);

    String::from_utf8_lossy(&buffer[..end]).into_owned()
}
