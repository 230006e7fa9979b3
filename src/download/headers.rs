//! Response metadata parsing for fetched files.

/// Fallback filename when the server gives none we can use.
pub const DEFAULT_FILENAME: &str = "download";

pub const DEFAULT_MIME: &str = "application/octet-stream";

/// Pulls a display filename out of a `Content-Disposition` value.
///
/// Accepts quoted and unquoted forms after any `filename...=` key
/// (which also covers `filename*=`). Anything absent or unparseable
/// falls back to the literal `download`.
pub fn filename_from_disposition(value: Option<&str>) -> String {
    let fallback = || DEFAULT_FILENAME.to_string();

    let Some(value) = value else { return fallback() };
    let Some(pos) = value.find("filename") else {
        return fallback();
    };
    let rest = &value[pos..];
    let Some(eq) = rest.find('=') else {
        return fallback();
    };

    let raw = rest[eq + 1..].trim();
    // Stop at a following parameter if the value is unquoted.
    let raw = raw.split(';').next().unwrap_or(raw).trim();
    let name = raw.trim_matches('"');

    if name.is_empty() {
        fallback()
    } else {
        name.to_string()
    }
}

/// Parses a `Content-Length` value; `None` means the caller should fall
/// back to the actual retrieved byte length.
pub fn declared_length(value: Option<&str>) -> Option<u64> {
    value?.trim().parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quoted_filename() {
        let name = filename_from_disposition(Some("attachment; filename=\"report.pdf\""));
        assert_eq!(name, "report.pdf");
    }

    #[test]
    fn unquoted_filename() {
        let name = filename_from_disposition(Some("attachment; filename=report.pdf"));
        assert_eq!(name, "report.pdf");
    }

    #[test]
    fn unquoted_filename_before_other_params() {
        let name = filename_from_disposition(Some("attachment; filename=a.bin; size=12"));
        assert_eq!(name, "a.bin");
    }

    #[test]
    fn missing_header_defaults() {
        assert_eq!(filename_from_disposition(None), "download");
    }

    #[test]
    fn header_without_filename_defaults() {
        assert_eq!(filename_from_disposition(Some("inline")), "download");
    }

    #[test]
    fn empty_value_defaults() {
        assert_eq!(filename_from_disposition(Some("attachment; filename=\"\"")), "download");
        assert_eq!(filename_from_disposition(Some("attachment; filename")), "download");
    }

    #[test]
    fn content_length_parses_or_none() {
        assert_eq!(declared_length(Some("2048")), Some(2048));
        assert_eq!(declared_length(Some(" 7 ")), Some(7));
        assert_eq!(declared_length(Some("nope")), None);
        assert_eq!(declared_length(None), None);
    }
}
