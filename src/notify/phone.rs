/// Country and mobile prefix for Argentine WhatsApp numbers.
pub const PHONE_PREFIX: &str = "+549";

/// Strips every whitespace character and prepends [`PHONE_PREFIX`].
///
/// No length or digit validation happens here; a bad number surfaces as a
/// gateway rejection.
pub fn normalize_phone(raw: &str) -> String {
    let digits: String = raw.chars().filter(|c| !c.is_whitespace()).collect();
    format!("{PHONE_PREFIX}{digits}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_spaces_and_prefixes() {
        assert_eq!(normalize_phone("11 2345 6789"), "+5491123456789");
    }

    #[test]
    fn strips_tabs_and_newlines_too() {
        assert_eq!(normalize_phone(" 351\t456 7890\n"), "+5493514567890");
    }

    #[test]
    fn does_not_validate() {
        assert_eq!(normalize_phone(""), "+549");
        assert_eq!(normalize_phone("abc"), "+549abc");
    }
}
