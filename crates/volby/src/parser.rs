use std::sync::LazyLock;

use scraper::{ElementRef, Html, Selector};

use crate::types::MunicipalityRecord;
use crate::urls::{
    ABROAD_PAGE_MARKER, DISTRICT_PAGE_MARKER, is_capital_city, normalize_district_href,
};

#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("Failed to parse URL: {0}")]
    UrlParseError(String),
    #[error("Missing required field: {0}")]
    MissingField(String),
}

static SEL_LINK: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("a").expect("invalid selector: link"));
static SEL_HEADING: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("h3").expect("invalid selector: heading"));
static SEL_SUMMARY_TABLE: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("table#ps311_t1").expect("invalid selector: summary table"));
static SEL_ROW: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("tr").expect("invalid selector: row"));
static SEL_PARTY_NAME: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("td.overflow_name").expect("invalid selector: party name"));

const NAME_PREFIX: &str = "Obec: ";
const SUMMARY_ROW: usize = 2;
const REGISTERED_VOTERS_CELL: usize = 4;
const ISSUED_ENVELOPES_CELL: usize = 5;
const VALID_VOTES_CELL: usize = 8;

fn elem_text(element: ElementRef) -> String {
    element.text().collect::<String>()
}

fn replace_nbsp(text: &str) -> String {
    text.replace('\u{a0}', " ")
}

/// Absolute URLs of every in-country district linked from the region listing,
/// in page order.
pub fn parse_district_links(html: &str, base_url: &str) -> Vec<String> {
    let document = Html::parse_document(html);

    document
        .select(&SEL_LINK)
        .filter_map(|a| a.value().attr("href"))
        .filter(|href| href.contains(DISTRICT_PAGE_MARKER) && !href.contains(ABROAD_PAGE_MARKER))
        .map(|href| normalize_district_href(base_url, href))
        .collect()
}

/// Municipality codes of a district page: the text of every all-digit link.
/// Duplicates are kept.
pub fn parse_municipality_codes(html: &str) -> Vec<String> {
    let document = Html::parse_document(html);

    document
        .select(&SEL_LINK)
        .map(elem_text)
        .filter(|text| !text.is_empty() && text.chars().all(|c| c.is_ascii_digit()))
        .collect()
}

/// Where a municipality page keeps the municipality name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NameStrategy {
    /// Capital city pages: second `<h3>`.
    Capital,
    /// Everything else: third `<h3>`, below the region and district headings.
    Regular,
}

impl NameStrategy {
    pub fn for_url(url: &str) -> Self {
        if is_capital_city(url) {
            NameStrategy::Capital
        } else {
            NameStrategy::Regular
        }
    }

    fn heading_index(self) -> usize {
        match self {
            NameStrategy::Capital => 1,
            NameStrategy::Regular => 2,
        }
    }

    pub fn extract(self, document: &Html) -> Result<String, ParseError> {
        let heading = document
            .select(&SEL_HEADING)
            .nth(self.heading_index())
            .ok_or_else(|| {
                ParseError::MissingField(format!(
                    "municipality name (heading #{})",
                    self.heading_index() + 1
                ))
            })?;

        Ok(elem_text(heading).trim().replace(NAME_PREFIX, ""))
    }
}

fn summary_cell(cells: &[String], index: usize, label: &str) -> Result<String, ParseError> {
    cells
        .get(index)
        .cloned()
        .ok_or_else(|| ParseError::MissingField(format!("{} (summary cell {})", label, index)))
}

pub fn registered_voters_of(cells: &[String]) -> Result<String, ParseError> {
    summary_cell(cells, REGISTERED_VOTERS_CELL, "registered voters")
}

pub fn issued_envelopes_of(cells: &[String]) -> Result<String, ParseError> {
    summary_cell(cells, ISSUED_ENVELOPES_CELL, "issued envelopes")
}

pub fn valid_votes_of(cells: &[String]) -> Result<String, ParseError> {
    summary_cell(cells, VALID_VOTES_CELL, "valid votes")
}

/// Line-split text of the summary table's data row, non-breaking spaces
/// replaced.
fn summary_cells(document: &Html) -> Result<Vec<String>, ParseError> {
    let table = document
        .select(&SEL_SUMMARY_TABLE)
        .next()
        .ok_or_else(|| ParseError::MissingField("summary table #ps311_t1".to_string()))?;

    let row = table
        .select(&SEL_ROW)
        .nth(SUMMARY_ROW)
        .ok_or_else(|| ParseError::MissingField("summary table data row".to_string()))?;

    Ok(elem_text(row).lines().map(replace_nbsp).collect())
}

fn party_votes(document: &Html) -> Result<Vec<(String, String)>, ParseError> {
    document
        .select(&SEL_PARTY_NAME)
        .map(|cell| {
            let party = elem_text(cell);
            let votes = cell
                .next_siblings()
                .filter_map(ElementRef::wrap)
                .find(|sibling| sibling.value().name() == "td")
                .ok_or_else(|| ParseError::MissingField(format!("vote count of '{}'", party)))?;

            Ok::<_, ParseError>((party, replace_nbsp(elem_text(votes).trim())))
        })
        .collect()
}

pub fn parse_municipality_record(
    html: &str,
    url: &str,
    code: &str,
) -> Result<MunicipalityRecord, ParseError> {
    let document = Html::parse_document(html);

    let strategy = NameStrategy::for_url(url);
    let name = strategy.extract(&document)?;
    log::debug!("Municipality {} is '{}' ({:?} layout)", code, name, strategy);

    let cells = summary_cells(&document)?;
    let parties = party_votes(&document)?;

    let mut record = MunicipalityRecord::new();
    record.insert(crate::CODE_COLUMN, code);
    record.insert(crate::NAME_COLUMN, name);
    record.insert(crate::REGISTERED_VOTERS_COLUMN, registered_voters_of(&cells)?);
    record.insert(crate::ISSUED_ENVELOPES_COLUMN, issued_envelopes_of(&cells)?);
    record.insert(crate::VALID_VOTES_COLUMN, valid_votes_of(&cells)?);
    for (party, votes) in parties {
        record.insert(party, votes);
    }

    Ok(record)
}
