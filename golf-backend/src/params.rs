/// Parse a business key from a path segment.
///
/// Leading whitespace and an optional sign are accepted, then the longest run
/// of decimal digits; anything after it is ignored (`"12abc"` is 12). Input
/// without digits, or a value outside `i64`, yields `None`, which the store
/// treats as a key that matches nothing.
pub fn parse_key(raw: &str) -> Option<i64> {
  let trimmed = raw.trim_start();
  let sign_len = usize::from(matches!(trimmed.as_bytes().first(), Some(b'-' | b'+')));
  let digits = trimmed[sign_len..]
    .bytes()
    .take_while(u8::is_ascii_digit)
    .count();

  if digits == 0 {
    return None;
  }

  trimmed[..sign_len + digits].parse().ok()
}
