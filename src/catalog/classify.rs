//! Pure classification and naming helpers for catalog derivation.
//!
//! Every function here is a deterministic, side-effect-free function of its
//! inputs. The cover heuristic depends on the size of the full per-category
//! listing (the "> 5 objects" rule), so callers must hand [`scan_listing`]
//! the complete listing rather than filtering keys one at a time.

use crate::models::object::ObjectRecord;

/// Extensions that qualify an object as downloadable page content.
const PAGE_EXTENSIONS: [&str; 3] = [".jpg", ".png", ".pdf"];

/// Extensions eligible for the size-based cover heuristic (no PDFs).
const COVER_EXTENSIONS: [&str; 2] = [".jpg", ".png"];

/// Substrings that mark a key as cover/category artwork.
const COVER_MARKERS: [&str; 2] = ["cover", "category"];

/// An object is a content page iff it has a page extension and its
/// case-folded key carries no cover marker.
pub fn is_content_page(key: &str) -> bool {
    let key = key.to_lowercase();
    PAGE_EXTENSIONS.iter().any(|ext| key.ends_with(ext))
        && !COVER_MARKERS.iter().any(|marker| key.contains(marker))
}

/// An object is a cover candidate iff its case-folded key carries a cover
/// marker, or it is an image not named like a page in a category holding
/// more than 5 objects.
pub fn is_cover_candidate(key: &str, total_objects: usize) -> bool {
    let key = key.to_lowercase();
    if COVER_MARKERS.iter().any(|marker| key.contains(marker)) {
        return true;
    }
    COVER_EXTENSIONS.iter().any(|ext| key.ends_with(ext))
        && !key.contains("page")
        && total_objects > 5
}

/// Outcome of classifying one category's full listing.
#[derive(Debug, Clone)]
pub struct ListingScan {
    /// First cover candidate in listing order, if any.
    pub cover_key: Option<String>,
    /// Keys of all content pages, in listing order.
    pub page_keys: Vec<String>,
}

/// Classify a complete per-category listing.
///
/// Cover selection and page counting run over the same listing but with
/// independent predicates: an image promoted to cover by the size rule is
/// still counted among the pages, while keys carrying an explicit cover
/// marker never are.
pub fn scan_listing(objects: &[ObjectRecord]) -> ListingScan {
    let total = objects.len();
    let cover_key = objects
        .iter()
        .find(|o| is_cover_candidate(&o.key, total))
        .map(|o| o.key.clone());
    let page_keys = objects
        .iter()
        .filter(|o| is_content_page(&o.key))
        .map(|o| o.key.clone())
        .collect();
    ListingScan {
        cover_key,
        page_keys,
    }
}

/// URL-safe identifier: whitespace runs collapsed to hyphens, lower-cased.
pub fn slugify(name: &str) -> String {
    name.split_whitespace()
        .collect::<Vec<_>>()
        .join("-")
        .to_lowercase()
}

/// Human-readable title from a bare file name: extension stripped, `-`/`_`
/// replaced with spaces, each word capitalized.
pub fn humanize_file_name(file_name: &str) -> String {
    let stem = match file_name.rsplit_once('.') {
        Some((stem, _)) if !stem.is_empty() => stem,
        _ => file_name,
    };
    stem.replace(['-', '_'], " ")
        .split_whitespace()
        .map(capitalize)
        .collect::<Vec<_>>()
        .join(" ")
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn record(key: &str) -> ObjectRecord {
        ObjectRecord {
            key: key.to_string(),
            size_bytes: 1,
            content_type: None,
            etag: None,
            last_modified: Utc::now(),
        }
    }

    #[test]
    fn content_page_predicate() {
        assert!(is_content_page("Animals/lion.jpg"));
        assert!(is_content_page("Animals/Tiger.PNG"));
        assert!(is_content_page("Animals/outline.pdf"));
        assert!(!is_content_page("Animals/cover.jpg"));
        assert!(!is_content_page("Animals/category-art.png"));
        assert!(!is_content_page("Animals/notes.txt"));
        assert!(!is_content_page("Animals/"));
    }

    #[test]
    fn cover_candidate_predicate() {
        assert!(is_cover_candidate("Animals/cover.jpg", 2));
        assert!(is_cover_candidate("Animals/Category.png", 1));
        // Size rule: images only, no "page" in the key, more than 5 objects.
        assert!(is_cover_candidate("Animals/lion.jpg", 6));
        assert!(!is_cover_candidate("Animals/lion.jpg", 5));
        assert!(!is_cover_candidate("Animals/page-one.jpg", 6));
        assert!(!is_cover_candidate("Animals/outline.pdf", 6));
    }

    #[test]
    fn scan_picks_first_cover_in_listing_order() {
        let listing = vec![
            record("Animals/lion.jpg"),
            record("Animals/cover.jpg"),
            record("Animals/category.png"),
        ];
        let scan = scan_listing(&listing);
        assert_eq!(scan.cover_key.as_deref(), Some("Animals/cover.jpg"));
        assert_eq!(scan.page_keys, vec!["Animals/lion.jpg".to_string()]);
    }

    #[test]
    fn size_rule_cover_stays_in_page_count() {
        let listing: Vec<ObjectRecord> = ["a", "b", "c", "d", "e", "f"]
            .iter()
            .map(|n| record(&format!("Big/{n}.jpg")))
            .collect();
        let scan = scan_listing(&listing);
        assert_eq!(scan.cover_key.as_deref(), Some("Big/a.jpg"));
        assert_eq!(scan.page_keys.len(), 6);
    }

    #[test]
    fn slugify_collapses_whitespace() {
        assert_eq!(slugify("Animals"), "animals");
        assert_eq!(slugify("Wild  Cats"), "wild-cats");
        assert_eq!(slugify(" Sea   Life "), "sea-life");
    }

    #[test]
    fn humanize_builds_titles() {
        assert_eq!(humanize_file_name("tiger.png"), "Tiger");
        assert_eq!(humanize_file_name("cute-lion_cub.jpg"), "Cute Lion Cub");
        assert_eq!(humanize_file_name("already Nice.pdf"), "Already Nice");
        assert_eq!(humanize_file_name("noext"), "Noext");
    }
}
