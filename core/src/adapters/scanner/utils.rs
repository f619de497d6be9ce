//! Parsing helpers shared by the platform scanners.

/// Address printed for wildcard binds.
pub const ANY_ADDRESS: &str = "0.0.0.0";

/// Split an `address:port` string at its last colon.
///
/// The last colon is used so IPv6 forms (`[::1]:3000`, `::1:3000`) keep their
/// address intact. A wildcard (`*`) or empty address becomes `0.0.0.0`.
/// Returns `None` if there is no colon or the port is not a number.
pub fn split_address(address: &str) -> Option<(String, u16)> {
    let last_colon = address.rfind(':')?;
    let addr = &address[..last_colon];
    let port: u16 = address[last_colon + 1..].parse().ok()?;

    let addr = match addr {
        "" | "*" => ANY_ADDRESS,
        other => other,
    };
    Some((addr.to_string(), port))
}

/// Truncate to at most `max` characters.
pub fn truncate_chars(s: &str, max: usize) -> String {
    s.chars().take(max).collect()
}
