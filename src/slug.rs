use crate::error::EmptySlugError;

/// URL-friendly slug: lowercase, runs of anything outside `[a-z0-9]`
/// collapsed to one hyphen, no leading or trailing hyphen.
pub fn slugify(title: &str) -> Result<String, EmptySlugError> {
    let lowered = title.trim().to_lowercase();
    let mut slug = String::with_capacity(lowered.len());
    let mut pending_dash = false;

    for ch in lowered.chars() {
        if ch.is_ascii_lowercase() || ch.is_ascii_digit() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            slug.push(ch);
            pending_dash = false;
        } else {
            pending_dash = true;
        }
    }

    if slug.is_empty() {
        return Err(EmptySlugError);
    }
    Ok(slug)
}
