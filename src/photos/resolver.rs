//! Turns whatever photo representation a record carries into one displayable URL.

use crate::dao::models::StoredPhoto;

const DATA_URI_PREFIX: &str = "data:";

/// Resolves stored photos against the base URL local files are served from.
#[derive(Debug, Clone)]
pub struct PhotoResolver {
    base_url: String,
}

impl PhotoResolver {
    /// Resolve relative paths against `base_url`.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
        }
    }

    /// See [`resolve_photo_url`].
    pub fn resolve(&self, photo: &StoredPhoto) -> Option<String> {
        resolve_photo_url(photo, &self.base_url)
    }
}

/// Pick the displayable reference for a stored photo.
///
/// Inline data wins over an object URL, which wins over a relative path. Older
/// records may carry the data URI in the URL slot; it is shown as-is. Blank or
/// unrecognized values are skipped; when nothing usable remains the result is
/// `None` and clients render a placeholder.
pub fn resolve_photo_url(photo: &StoredPhoto, base_url: &str) -> Option<String> {
    non_blank(&photo.image_base64)
        .filter(|value| value.starts_with(DATA_URI_PREFIX))
        .map(str::to_owned)
        .or_else(|| {
            non_blank(&photo.image_url)
                .filter(|value| is_absolute_url(value) || value.starts_with(DATA_URI_PREFIX))
                .map(str::to_owned)
        })
        .or_else(|| non_blank(&photo.image_path).and_then(|path| join_base(base_url, path)))
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|value| !value.is_empty())
}

fn is_absolute_url(value: &str) -> bool {
    value.starts_with("https://") || value.starts_with("http://")
}

fn join_base(base_url: &str, path: &str) -> Option<String> {
    // An absolute URL stored in the path slot is still usable as-is.
    if is_absolute_url(path) {
        return Some(path.to_owned());
    }
    let base = base_url.trim().trim_end_matches('/');
    let path = path.trim_start_matches("./").trim_start_matches('/');
    if path.is_empty() {
        return None;
    }
    Some(format!("{base}/{path}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    const BASE: &str = "http://localhost:8080";

    #[test]
    fn inline_data_wins_over_stored_url() {
        let photo = StoredPhoto {
            image_base64: Some("data:image/jpeg;base64,AAAA".into()),
            image_url: Some("https://cdn.example.com/a.jpg".into()),
            image_path: Some("uploads/a.jpg".into()),
        };
        assert_eq!(
            resolve_photo_url(&photo, BASE).as_deref(),
            Some("data:image/jpeg;base64,AAAA")
        );
    }

    #[test]
    fn url_wins_over_relative_path() {
        let photo = StoredPhoto {
            image_base64: None,
            image_url: Some("https://cdn.example.com/a.jpg".into()),
            image_path: Some("uploads/a.jpg".into()),
        };
        assert_eq!(
            resolve_photo_url(&photo, BASE).as_deref(),
            Some("https://cdn.example.com/a.jpg")
        );
    }

    #[test]
    fn data_uri_in_url_slot_is_displayed() {
        let photo = StoredPhoto {
            image_base64: None,
            image_url: Some("data:image/png;base64,iVBORw0KGgo=".into()),
            image_path: Some("uploads/a.jpg".into()),
        };
        assert_eq!(
            resolve_photo_url(&photo, BASE).as_deref(),
            Some("data:image/png;base64,iVBORw0KGgo=")
        );
    }

    #[test]
    fn relative_path_is_joined_with_base_url() {
        let resolver = PhotoResolver::new("http://localhost:8080/");
        assert_eq!(
            resolver.resolve(&StoredPhoto::path("/uploads/a.jpg")).as_deref(),
            Some("http://localhost:8080/uploads/a.jpg")
        );
        assert_eq!(
            resolver.resolve(&StoredPhoto::path("uploads/b.png")).as_deref(),
            Some("http://localhost:8080/uploads/b.png")
        );
    }

    #[test]
    fn unrecognized_values_fall_through_to_the_next_form() {
        let photo = StoredPhoto {
            image_base64: Some("not-a-data-uri".into()),
            image_url: Some("ftp://example.com/a.jpg".into()),
            image_path: Some("uploads/a.jpg".into()),
        };
        assert_eq!(
            resolve_photo_url(&photo, BASE).as_deref(),
            Some("http://localhost:8080/uploads/a.jpg")
        );
    }

    #[test]
    fn empty_or_blank_record_resolves_to_none() {
        assert_eq!(resolve_photo_url(&StoredPhoto::default(), BASE), None);

        let blank = StoredPhoto {
            image_base64: Some("   ".into()),
            image_url: Some(String::new()),
            image_path: Some("/".into()),
        };
        assert_eq!(resolve_photo_url(&blank, BASE), None);
    }
}
