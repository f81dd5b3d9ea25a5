pub mod dataset;
mod parser;
pub mod scraper;
pub mod types;
pub mod urls;

pub use dataset::Dataset;
pub use dataset::OutputError;
pub use parser::{NameStrategy, ParseError};
pub use scraper::{
    ElectionScraper, Fetch, FetchError, HttpFetcher, MunicipalityOutcome, ScraperError,
    ValidationError,
};
pub use types::{DistrictCodes, DistrictUrl, MunicipalityRecord};

/// Results root of the 2017 Chamber of Deputies election.
pub const BASE_URL: &str = "https://www.volby.cz/pls/ps2017nss";

pub const CODE_COLUMN: &str = "code";
pub const NAME_COLUMN: &str = "name";
pub const REGISTERED_VOTERS_COLUMN: &str = "registered voters";
pub const ISSUED_ENVELOPES_COLUMN: &str = "issued envelopes";
pub const VALID_VOTES_COLUMN: &str = "valid votes";

/// Columns every [`MunicipalityRecord`] starts with, in order.
pub const FIXED_COLUMNS: [&str; 5] = [
    CODE_COLUMN,
    NAME_COLUMN,
    REGISTERED_VOTERS_COLUMN,
    ISSUED_ENVELOPES_COLUMN,
    VALID_VOTES_COLUMN,
];
