//! Human-readable place names from reverse-geocoding responses.

use crate::model::{Address, GeocodePayload};

pub const UNKNOWN_LOCATION: &str = "Unknown Location";

/// Resolve a display name for the frontend.
///
/// Address fields are tried from the most to the least specific, each paired
/// with the country. When none of them is usable the free-text
/// `display_name` is shortened to its first and last segments.
pub fn resolve_place_name(payload: &GeocodePayload) -> String {
    let from_address = payload.address.as_ref().and_then(place_from_address);

    from_address
        .or_else(|| non_empty(payload.display_name.as_deref()).map(shorten_display_name))
        .unwrap_or_else(|| UNKNOWN_LOCATION.to_string())
}

fn place_from_address(addr: &Address) -> Option<String> {
    let country = non_empty(addr.country.as_deref())?;

    [&addr.city, &addr.town, &addr.village, &addr.hamlet, &addr.county]
        .into_iter()
        .find_map(|field| non_empty(field.as_deref()))
        .map(|place| format!("{place}, {country}"))
}

/// "Eiffel Tower, 5th Arrondissement, Paris, France" -> "Eiffel Tower, France".
fn shorten_display_name(name: &str) -> String {
    let parts: Vec<&str> = name.split(',').collect();

    match parts.as_slice() {
        [first, .., last] => format!("{}, {}", first.trim(), last.trim()),
        _ => name.to_string(),
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|s| !s.is_empty())
}
