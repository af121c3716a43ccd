use lazy_static::lazy_static;
use regex::Regex;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

/// Separates the timestamp token from the sanitized original name
pub const ASSET_NAME_DELIMITER: char = '_';

/// Replacement used when nothing usable is left of a suggested name
const FALLBACK_FILE_NAME: &str = "upload";

/// Longest file name most filesystems accept, in bytes
const MAX_FILE_NAME_BYTES: usize = 255;

/// Room taken by the temp-file form `.<u64 token>_<name>.tmp` around the name
const NAME_OVERHEAD_BYTES: usize = ".".len() + 20 + "_".len() + ".tmp".len();

/// Longest sanitized name that still fits every file the store creates
pub const MAX_SANITIZED_NAME_BYTES: usize = MAX_FILE_NAME_BYTES - NAME_OVERHEAD_BYTES;

/// Extensions longer than this are truncated with the rest of the name
const MAX_KEPT_EXTENSION_BYTES: usize = 16;

lazy_static! {
    /// Shape of every name an asset store can issue: a decimal timestamp token,
    /// the delimiter, then a name without path separators.
    /// - Valid: "1718000000000000000_photo.png", "1718000000000000001_upload"
    /// - Invalid: "photo.png", "_photo.png", "1718_../etc/passwd", "1718_a/b.png"
    static ref ASSET_NAME_REGEX: Regex = Regex::new(r"^[0-9]+_[^/\\]+$").unwrap();
    static ref DOT_RUN_REGEX: Regex = Regex::new(r"\.{2,}").unwrap();
}

/// Whether `name` could have been issued by an asset store.
pub fn is_valid_asset_name(name: &str) -> bool {
    ASSET_NAME_REGEX.is_match(name) && !name.contains("..")
}

/// Reduce a caller-supplied file name to a single safe path component.
pub fn sanitize_file_name(suggested: &str) -> String {
    let last = suggested.rsplit(['/', '\\']).next().unwrap_or("");
    let cleaned: String = last.chars().filter(|c| !c.is_control()).collect();
    let collapsed = DOT_RUN_REGEX.replace_all(cleaned.trim(), ".");
    let truncated = truncate_file_name(&collapsed);

    match truncated.trim() {
        "" | "." => FALLBACK_FILE_NAME.to_string(),
        other => other.to_string(),
    }
}

/// Largest char boundary of `s` at or below `max` bytes
fn floor_char_boundary(s: &str, max: usize) -> usize {
    if max >= s.len() {
        return s.len();
    }
    (0..=max).rev().find(|&i| s.is_char_boundary(i)).unwrap_or(0)
}

/// Cut `name` to [`MAX_SANITIZED_NAME_BYTES`], keeping a short extension.
fn truncate_file_name(name: &str) -> String {
    if name.len() <= MAX_SANITIZED_NAME_BYTES {
        return name.to_string();
    }

    match name.rfind('.') {
        Some(dot) if dot > 0 && name.len() - dot <= MAX_KEPT_EXTENSION_BYTES => {
            let (stem, extension) = name.split_at(dot);
            let stem_end =
                floor_char_boundary(stem, MAX_SANITIZED_NAME_BYTES - extension.len());
            // A cut right after a dot would join it to the extension's dot
            let stem = stem[..stem_end].trim_end_matches('.');
            format!("{}{}", stem, extension)
        }
        _ => name[..floor_char_boundary(name, MAX_SANITIZED_NAME_BYTES)].to_string(),
    }
}

/// Issues strictly increasing nanosecond timestamp tokens.
///
/// Wall-clock time is the base, but a high-water mark guarantees that two
/// calls never share a token, even within one clock tick or after the
/// clock steps backwards.
#[derive(Debug, Default)]
pub struct AssetNameGenerator {
    last_token: AtomicU64,
}

impl AssetNameGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next_token(&self) -> u64 {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_nanos() as u64)
            .unwrap_or(0);

        let mut last = self.last_token.load(Ordering::Relaxed);
        loop {
            let candidate = now.max(last + 1);
            match self.last_token.compare_exchange_weak(
                last,
                candidate,
                Ordering::SeqCst,
                Ordering::Relaxed,
            ) {
                Ok(_) => return candidate,
                Err(actual) => last = actual,
            }
        }
    }

    /// `<token>_<sanitized suggested name>`
    pub fn next_name(&self, suggested: &str) -> String {
        format!(
            "{}{}{}",
            self.next_token(),
            ASSET_NAME_DELIMITER,
            sanitize_file_name(suggested)
        )
    }
}
