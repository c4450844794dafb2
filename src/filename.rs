//! Name-based record filenames, e.g. `orleans_parish_parish.json`.

/// Lower-cases, turns whitespace runs into `_` and drops everything outside `[a-z0-9_]`.
pub fn normalize_name(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut in_whitespace = false;
    for ch in name.to_lowercase().chars() {
        if ch.is_whitespace() {
            if !in_whitespace {
                out.push('_');
            }
            in_whitespace = true;
            continue;
        }
        in_whitespace = false;
        if ch.is_ascii_alphanumeric() || ch == '_' {
            out.push(ch);
        }
    }
    out
}

pub fn derive_filename(region_name: &str, state_id: &str) -> String {
    let lowered = region_name.to_lowercase();
    let suffix = match state_id {
        "louisiana" => "_parish",
        "alaska" if lowered.contains("borough") => "_borough",
        "alaska" if lowered.contains("census area") => "_census_area",
        _ => "_county",
    };
    format!("{}{}.json", normalize_name(region_name), suffix)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn suffix_follows_state_naming() {
        assert!(derive_filename("Orleans Parish", "louisiana").ends_with("_parish.json"));
        assert!(derive_filename("Yukon-Koyukuk Census Area", "alaska").ends_with("_census_area.json"));
        assert!(derive_filename("Cook County", "illinois").ends_with("_county.json"));
        assert_eq!(
            derive_filename("Matanuska-Susitna Borough", "alaska"),
            "matanuskasusitna_borough_borough.json"
        );
        assert_eq!(derive_filename("Juneau", "alaska"), "juneau_county.json");
    }

    #[test]
    fn normalization_collapses_and_strips() {
        assert_eq!(normalize_name("St. Mary's   Parish"), "st_marys_parish");
        assert_eq!(normalize_name("Doña Ana\tCounty"), "doa_ana_county");
        assert_eq!(normalize_name("A - B"), "a__b");
        assert_eq!(normalize_name(""), "");
    }

    #[test]
    fn normalization_is_idempotent() {
        for name in [
            "Orleans Parish",
            "Yukon-Koyukuk Census Area",
            "  Prince   George's County ",
            "Doña Ana",
            "already_normal_123",
        ] {
            let once = normalize_name(name);
            assert_eq!(normalize_name(&once), once, "{name}");
        }
    }
}
