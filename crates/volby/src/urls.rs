//! Positional accessors and builders for volby.cz result page URLs.
//!
//! The site encodes the hierarchy in query strings with a fixed parameter
//! order, e.g. `ps32?xjazyk=CZ&xkraj=11&xnumnuts=6207` for a district and
//! `ps311?xjazyk=CZ&xkraj=11&xobec=593711&xvyber=6207` for a municipality.

use crate::parser::ParseError;

/// Marker of district listing pages.
pub const DISTRICT_PAGE_MARKER: &str = "ps32";
/// Marker of the pseudo-district holding votes cast abroad.
pub const ABROAD_PAGE_MARKER: &str = "ps36";
/// `xvyber` value of the capital city (Praha).
pub const CAPITAL_DISTRICT_CODE: &str = "1100";

const DISTRICT_CODE_LEN: usize = 4;

/// Page listing every region and its districts.
pub fn region_listing_url(base_url: &str) -> String {
    format!("{}/ps3?xjazyk=CZ", base_url.trim_end_matches('/'))
}

pub fn abroad_url(base_url: &str) -> String {
    format!(
        "{}/{}?xjazyk=CZ",
        base_url.trim_end_matches('/'),
        ABROAD_PAGE_MARKER
    )
}

/// Turns a relative `href` from the region listing into the absolute form
/// users pass on the command line.
pub fn normalize_district_href(base_url: &str, href: &str) -> String {
    format!("{}/{}", base_url.trim_end_matches('/'), href).replace("&amp;", "&")
}

/// Region code: the value of the second query parameter (`xkraj`).
pub fn region_code_of(url: &str) -> Result<&str, ParseError> {
    url.split('=')
        .nth(2)
        .and_then(|segment| segment.split('&').next())
        .filter(|code| !code.is_empty())
        .ok_or_else(|| ParseError::UrlParseError(format!("No region code in {}", url)))
}

/// District code: the last four characters of a district URL.
pub fn district_code_of(url: &str) -> Result<&str, ParseError> {
    url.char_indices()
        .rev()
        .nth(DISTRICT_CODE_LEN - 1)
        .map(|(start, _)| &url[start..])
        .ok_or_else(|| ParseError::UrlParseError(format!("No district code in {}", url)))
}

pub fn build_municipality_url(
    base_url: &str,
    region: &str,
    district: &str,
    municipality: &str,
) -> String {
    format!(
        "{}/ps311?xjazyk=CZ&xkraj={}&xobec={}&xvyber={}",
        base_url.trim_end_matches('/'),
        region,
        municipality,
        district
    )
}

/// Whether a municipality URL points into the capital city, whose pages
/// carry one heading less above the municipality name.
pub fn is_capital_city(url: &str) -> bool {
    url.split_once('?').is_some_and(|(_, query)| {
        query
            .split('&')
            .filter_map(|pair| pair.split_once('='))
            .any(|(key, value)| key == "xvyber" && value == CAPITAL_DISTRICT_CODE)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::BASE_URL;

    const ZNOJMO_DISTRICT: &str =
        "https://www.volby.cz/pls/ps2017nss/ps32?xjazyk=CZ&xkraj=11&xnumnuts=6207";

    #[test]
    fn test_region_code_of() {
        assert_eq!(region_code_of(ZNOJMO_DISTRICT).unwrap(), "11");
        let praha = "https://www.volby.cz/pls/ps2017nss/ps32?xjazyk=CZ&xkraj=1&xnumnuts=1100";
        assert_eq!(region_code_of(praha).unwrap(), "1");
    }

    #[test]
    fn test_region_code_of_rejects_short_query() {
        assert!(matches!(
            region_code_of("https://www.volby.cz/pls/ps2017nss/ps3?xjazyk=CZ"),
            Err(ParseError::UrlParseError(_))
        ));
    }

    #[test]
    fn test_district_code_of() {
        assert_eq!(district_code_of(ZNOJMO_DISTRICT).unwrap(), "6207");
        assert!(district_code_of("abc").is_err());
        assert_eq!(district_code_of("1100").unwrap(), "1100");
    }

    #[test]
    fn test_build_municipality_url() {
        assert_eq!(
            build_municipality_url(BASE_URL, "11", "6207", "593711"),
            "https://www.volby.cz/pls/ps2017nss/ps311?xjazyk=CZ&xkraj=11&xobec=593711&xvyber=6207"
        );
    }

    #[test]
    fn test_build_municipality_url_tolerates_trailing_slash() {
        assert_eq!(
            build_municipality_url("https://www.volby.cz/pls/ps2017nss/", "11", "6207", "595179"),
            "https://www.volby.cz/pls/ps2017nss/ps311?xjazyk=CZ&xkraj=11&xobec=595179&xvyber=6207"
        );
    }

    #[test]
    fn test_is_capital_city() {
        assert!(is_capital_city(
            "https://www.volby.cz/pls/ps2017nss/ps311?xjazyk=CZ&xkraj=1&xobec=500054&xvyber=1100"
        ));
        assert!(!is_capital_city(
            "https://www.volby.cz/pls/ps2017nss/ps311?xjazyk=CZ&xkraj=11&xobec=593711&xvyber=6207"
        ));
        assert!(!is_capital_city(
            "https://www.volby.cz/pls/ps2017nss/ps311?xjazyk=CZ&xkraj=1&xobec=1100&xvyber=2101"
        ));
    }

    #[test]
    fn test_normalize_district_href() {
        assert_eq!(
            normalize_district_href(BASE_URL, "ps32?xjazyk=CZ&amp;xkraj=11&amp;xnumnuts=6207"),
            ZNOJMO_DISTRICT
        );
        assert_eq!(
            normalize_district_href(BASE_URL, "ps32?xjazyk=CZ&xkraj=11&xnumnuts=6207"),
            ZNOJMO_DISTRICT
        );
    }

    #[test]
    fn test_listing_and_abroad_urls() {
        assert_eq!(
            region_listing_url(BASE_URL),
            "https://www.volby.cz/pls/ps2017nss/ps3?xjazyk=CZ"
        );
        assert_eq!(
            abroad_url(BASE_URL),
            "https://www.volby.cz/pls/ps2017nss/ps36?xjazyk=CZ"
        );
    }
}
