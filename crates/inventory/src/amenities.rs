/// Keyword groups mined from an offer's free-text room description.
const DESCRIPTION_FEATURES: &[(&[&str], &str)] = &[
    (&["tv", "television"], "Flat-screen TV"),
    (&["coffee", "keurig"], "Coffee maker"),
    (&["minibar", "mini-bar", "fridge"], "Mini-fridge"),
    (&["desk", "workspace"], "Work desk"),
    (&["view"], "Room view"),
];

/// Amenity labels for a provider room: WiFi always, then whatever the description
/// mentions, then the bed type when the provider estimated one.
pub fn room_amenities(description: Option<&str>, bed_type: Option<&str>) -> Vec<String> {
    let mut amenities = vec!["Free WiFi".to_owned()];

    let lowered = description.unwrap_or_default().to_lowercase();
    for (keywords, label) in DESCRIPTION_FEATURES {
        if keywords.iter().any(|keyword| lowered.contains(keyword)) {
            amenities.push((*label).to_owned());
        }
    }

    if let Some(bed_type) = bed_type.map(str::trim).filter(|bed| !bed.is_empty()) {
        amenities.push(format!("{bed_type} bed"));
    }

    amenities
}

#[cfg(test)]
mod tests {
    use super::room_amenities;

    #[test]
    fn description_keywords_become_labels_in_fixed_order() {
        let amenities = room_amenities(
            Some("Spacious room with city VIEW, Keurig coffee, work desk and 55in TV"),
            Some("KING"),
        );

        assert_eq!(
            amenities,
            vec!["Free WiFi", "Flat-screen TV", "Coffee maker", "Work desk", "Room view", "KING bed"]
        );
    }

    #[test]
    fn bare_offer_still_lists_wifi() {
        assert_eq!(room_amenities(None, Some("  ")), vec!["Free WiFi"]);
    }
}
