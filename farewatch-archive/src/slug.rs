use farewatch_curate::CuratedDeal;

/// Lowercase, ascii-alphanumeric, dash-separated. Collapses runs of
/// separators and trims leading/trailing dashes.
pub fn slugify(input: &str) -> String {
    let mut slug = String::with_capacity(input.len());
    let mut last_dash = true;
    for c in input.chars() {
        if c.is_ascii_alphanumeric() {
            slug.push(c.to_ascii_lowercase());
            last_dash = false;
        } else if !last_dash {
            slug.push('-');
            last_dash = true;
        }
    }
    while slug.ends_with('-') {
        slug.pop();
    }
    slug
}

/// Public archive URL identity, derived from locale + destination +
/// price + departure date. Deterministic so a re-run derives the same
/// slug and the collision check can do its job.
pub fn archive_slug(deal: &CuratedDeal) -> String {
    slugify(&format!(
        "{} {} {:.0} {}",
        deal.deal.origin,
        deal.deal.destination.city,
        deal.deal.price,
        deal.deal.departure_date
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slugify_basic() {
        assert_eq!(slugify("New York"), "new-york");
        assert_eq!(slugify("  Sao   Paulo!! "), "sao-paulo");
        assert_eq!(slugify("lisbon-388-2026-09-04"), "lisbon-388-2026-09-04");
    }

    #[test]
    fn test_slugify_punctuation() {
        assert_eq!(slugify("Zurich/Geneve"), "zurich-geneve");
    }
}
