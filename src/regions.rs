//! Two-digit region codes (the state prefix of a county identifier).

/// Sorted by code. Codes 03, 07, 14, 43 and 52 are unassigned.
pub const REGION_CODES: [(&str, &str); 51] = [
    ("01", "alabama"),
    ("02", "alaska"),
    ("04", "arizona"),
    ("05", "arkansas"),
    ("06", "california"),
    ("08", "colorado"),
    ("09", "connecticut"),
    ("10", "delaware"),
    ("11", "district_of_columbia"),
    ("12", "florida"),
    ("13", "georgia"),
    ("15", "hawaii"),
    ("16", "idaho"),
    ("17", "illinois"),
    ("18", "indiana"),
    ("19", "iowa"),
    ("20", "kansas"),
    ("21", "kentucky"),
    ("22", "louisiana"),
    ("23", "maine"),
    ("24", "maryland"),
    ("25", "massachusetts"),
    ("26", "michigan"),
    ("27", "minnesota"),
    ("28", "mississippi"),
    ("29", "missouri"),
    ("30", "montana"),
    ("31", "nebraska"),
    ("32", "nevada"),
    ("33", "new_hampshire"),
    ("34", "new_jersey"),
    ("35", "new_mexico"),
    ("36", "new_york"),
    ("37", "north_carolina"),
    ("38", "north_dakota"),
    ("39", "ohio"),
    ("40", "oklahoma"),
    ("41", "oregon"),
    ("42", "pennsylvania"),
    ("44", "rhode_island"),
    ("45", "south_carolina"),
    ("46", "south_dakota"),
    ("47", "tennessee"),
    ("48", "texas"),
    ("49", "utah"),
    ("50", "vermont"),
    ("51", "virginia"),
    ("53", "washington"),
    ("54", "west_virginia"),
    ("55", "wisconsin"),
    ("56", "wyoming"),
];

pub fn state_for_code(code: &str) -> Option<&'static str> {
    REGION_CODES
        .binary_search_by(|(c, _)| (*c).cmp(code))
        .ok()
        .map(|i| REGION_CODES[i].1)
}

/// Resolves the state of a five-digit county identifier from its first two characters.
pub fn state_for_region_id(region_id: &str) -> Option<&'static str> {
    region_id.get(0..2).and_then(state_for_code)
}
