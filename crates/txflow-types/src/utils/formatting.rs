//! String formatting utilities.
//!
//! Hex prefix handling and shortened hashes for log output.

/// Shortens a hex identifier (such as a transaction hash) for log fields.
///
/// Keeps the first 10 characters, enough for "0x" plus four bytes.
pub fn truncate_id(id: &str) -> String {
	if id.len() <= 10 {
		id.to_string()
	} else {
		format!("{}..", &id[..10])
	}
}

/// Returns `hex` without its leading `0x`, if any.
pub fn strip_hex_prefix(hex: &str) -> &str {
	match hex.as_bytes() {
		[b'0', b'x' | b'X', ..] => &hex[2..],
		_ => hex,
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_truncate_id() {
		assert_eq!(truncate_id("0x12345678"), "0x12345678");
		assert_eq!(
			truncate_id("0x5fbdb2315678afecb367f032d93f642f64180aa3"),
			"0x5fbdb231.."
		);
	}

	#[test]
	fn test_strip_hex_prefix() {
		assert_eq!(strip_hex_prefix("0x6080"), "6080");
		assert_eq!(strip_hex_prefix("0X00"), "00");
		assert_eq!(strip_hex_prefix("6080"), "6080");
		assert_eq!(strip_hex_prefix("0x"), "");
	}
}
