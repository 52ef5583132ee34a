//! Escaping of partition values in directory names

/// Directory value used for null and empty partition values
pub const DEFAULT_PARTITION_NAME: &str = "__HIVE_DEFAULT_PARTITION__";

/// Decode `%XX` sequences in a directory value
///
/// A `%` not followed by two hex digits is kept literally.
pub fn unescape_path_name(value: &str) -> String {
    let mut unescaped: Vec<u8> = Vec::with_capacity(value.len());
    let mut rest = value;

    while let Some(pos) = rest.find('%') {
        unescaped.extend_from_slice(rest[..pos].as_bytes());
        let code = rest
            .get(pos + 1..pos + 3)
            .filter(|hex| hex.chars().all(|c| c.is_ascii_hexdigit()))
            .and_then(|hex| u8::from_str_radix(hex, 16).ok());
        match code {
            Some(byte) => {
                unescaped.push(byte);
                rest = &rest[pos + 3..];
            }
            None => {
                unescaped.push(b'%');
                rest = &rest[pos + 1..];
            }
        }
    }

    unescaped.extend_from_slice(rest.as_bytes());
    String::from_utf8_lossy(&unescaped).into_owned()
}
