use once_cell::sync::Lazy;
use regex::Regex;

use crate::dom::{ElementExt, ElementRef, Selector};

/// Leading quantity plus unit token; the rest of the text is the formulation.
/// Letter units must end at a word boundary ("5 GRAMS" is not a "G" dose).
static DOSE_FORM_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?is)^\s*((?:\d[\d,]*)?\.?\d+\s*(?:(?:MCG|MG|[µμ]G|G)\b|%))(.*)$").unwrap()
});

/// Numeric month/day/4-digit-year
static SLASH_DATE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b(\d{1,2}/\d{1,2}/\d{4})\b").unwrap());

/// Normalized text of the first match of `selector` under `scope`
pub(super) fn text_of(scope: &ElementRef<'_>, selector: &Selector) -> Option<String> {
    scope.select_first(selector).map(|el| el.normalized_text())
}

/// Split "10 MG Oral Tablet" into ("10 MG", "Oral Tablet").
/// Returns two empty strings when the text does not start with a dose.
pub(super) fn split_dose_form(text: &str) -> (String, String) {
    match DOSE_FORM_RE.captures(text) {
        Some(caps) => (caps[1].trim().to_string(), caps[2].trim().to_string()),
        None => (String::new(), String::new()),
    }
}

/// Date shown by a date element: its visible text, or the date portion of
/// its `title` / `datetime` attribute when the text is blank.
pub(super) fn element_date_text(el: &ElementRef<'_>) -> String {
    let visible = el.normalized_text();
    if !visible.is_empty() {
        return visible;
    }

    for attr in ["title", "datetime"] {
        if let Some(value) = el.attr(attr) {
            let date = date_portion(value);
            if !date.is_empty() {
                return date;
            }
        }
    }

    String::new()
}

/// Text before the first time separator ("01/02/2024 10:00 AM", "2024-01-02T10:00")
pub(super) fn date_portion(value: &str) -> String {
    let value = value.trim();
    let mut previous_was_digit = false;
    for (index, c) in value.char_indices() {
        if c.is_whitespace() || c == ',' || (c == 'T' && previous_was_digit) {
            return value[..index].to_string();
        }
        previous_was_digit = c.is_ascii_digit();
    }
    value.to_string()
}

/// First mm/dd/yyyy date in `text`
pub(super) fn find_slash_date(text: &str) -> Option<&str> {
    SLASH_DATE_RE
        .captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::Document;

    #[test]
    fn test_split_dose_form() {
        assert_eq!(
            split_dose_form("10 MG Oral Tablet"),
            ("10 MG".to_string(), "Oral Tablet".to_string())
        );
        assert_eq!(
            split_dose_form("0.5mg/mL injection"),
            ("0.5mg".to_string(), "/mL injection".to_string())
        );
        assert_eq!(split_dose_form("50 MCG Inhaler").0, "50 MCG");
        assert_eq!(split_dose_form("25 µg patch").0, "25 µg");
        assert_eq!(
            split_dose_form("2% Topical Cream"),
            ("2%".to_string(), "Topical Cream".to_string())
        );
        assert_eq!(split_dose_form("1,000 mg").0, "1,000 mg");
    }

    #[test]
    fn test_split_dose_form_unit_boundaries() {
        assert_eq!(
            split_dose_form("2%Cream"),
            ("2%".to_string(), "Cream".to_string())
        );
        assert_eq!(
            split_dose_form(".5 MG tablet"),
            (".5 MG".to_string(), "tablet".to_string())
        );
        assert_eq!(split_dose_form("10MG"), ("10MG".to_string(), String::new()));
    }

    #[test]
    fn test_split_dose_form_without_dose() {
        assert_eq!(split_dose_form("Oral Tablet"), (String::new(), String::new()));
        assert_eq!(split_dose_form("5 GRAMS powder"), (String::new(), String::new()));
        assert_eq!(split_dose_form(""), (String::new(), String::new()));
    }

    #[test]
    fn test_date_portion() {
        assert_eq!(date_portion("01/02/2024 10:00 AM"), "01/02/2024");
        assert_eq!(date_portion("2024-01-02T10:00:00Z"), "2024-01-02");
        assert_eq!(date_portion("  03/04/2023  "), "03/04/2023");
        assert_eq!(date_portion("Today"), "Today");
    }

    #[test]
    fn test_element_date_text_falls_back_to_attributes() {
        let doc = Document::parse(
            r#"<span class="a">05/06/2022</span>
               <span class="b" title="07/08/2021 09:15 PM"> </span>
               <time class="c" datetime="2020-01-01T00:00"></time>
               <span class="d"></span>"#,
        );
        let get = |s: &str| doc.select_first(&Selector::parse(s).unwrap()).unwrap();
        assert_eq!(element_date_text(&get(".a")), "05/06/2022");
        assert_eq!(element_date_text(&get(".b")), "07/08/2021");
        assert_eq!(element_date_text(&get(".c")), "2020-01-01");
        assert_eq!(element_date_text(&get(".d")), "");
    }

    #[test]
    fn test_find_slash_date() {
        assert_eq!(find_slash_date("01/15/2024 08:30 AM"), Some("01/15/2024"));
        assert_eq!(find_slash_date("Collected 1/5/2024 (fasting)"), Some("1/5/2024"));
        assert_eq!(find_slash_date("2024-01-15"), None);
    }
}
