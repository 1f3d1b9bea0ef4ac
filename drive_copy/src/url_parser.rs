//! Folder arguments: raw Drive IDs or folder links pasted from a browser.

use regex::Regex;
use std::sync::LazyLock;

use crate::error::{DriveError, Result};

/// Link shapes that carry a folder ID in their first capture group.
static FOLDER_LINK_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"^https?://drive\.google\.com/drive/(?:u/\d+/)?folders/([a-zA-Z0-9_-]+)",
        r"^https?://drive\.google\.com/open\?(?:.*&)?id=([a-zA-Z0-9_-]+)",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("Invalid folder link regex"))
    .collect()
});

/// Links to single files, which cannot be used as a copy source or target.
static FILE_LINK_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^https?://(?:drive|docs)\.google\.com/(?:file|document|spreadsheets|presentation)/d/",
    )
    .expect("Invalid file link regex")
});

static ID_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-zA-Z0-9_-]+$").expect("Invalid ID regex"));

/// Resolve a folder argument to a Drive folder ID.
///
/// Accepts `https://drive.google.com/drive/folders/<ID>` (optionally with a
/// `/u/<n>/` account segment or trailing query), `https://drive.google.com/open?id=<ID>`,
/// and bare IDs. File links are rejected.
///
/// # Examples
///
/// ```
/// use drive_copy::url_parser::extract_folder_id;
///
/// let link = "https://drive.google.com/drive/u/1/folders/1abc123?usp=sharing";
/// let id = extract_folder_id(link).unwrap();
/// assert_eq!(id, "1abc123");
///
/// assert!(extract_folder_id("https://drive.google.com/file/d/1abc123/view").is_err());
/// ```
pub fn extract_folder_id(url_or_id: &str) -> Result<String> {
    let trimmed = url_or_id.trim();

    if FILE_LINK_REGEX.is_match(trimmed) {
        return Err(DriveError::InvalidUrlOrId(format!(
            "{} (this links to a file, not a folder)",
            trimmed
        )));
    }

    let from_link = FOLDER_LINK_PATTERNS
        .iter()
        .find_map(|re| re.captures(trimmed).and_then(|c| c.get(1)));
    if let Some(id) = from_link {
        return Ok(id.as_str().to_string());
    }

    if ID_REGEX.is_match(trimmed) {
        return Ok(trimmed.to_string());
    }

    Err(DriveError::InvalidUrlOrId(url_or_id.to_string()))
}
