use crate::dataset::Dataset;
use crate::parser::{
    ParseError, parse_district_links, parse_municipality_codes, parse_municipality_record,
};
use crate::types::{DistrictCodes, DistrictUrl, MunicipalityRecord};
use crate::urls::{abroad_url, build_municipality_url, region_listing_url};

use reqwest::StatusCode;
use reqwest::blocking::Client;
use std::time::Duration;

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),
    #[error("Page not found: {0}")]
    NotFound(String),
}

#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    #[error("'{0}' is not a published district results URL")]
    InvalidFormat(String),
    #[error("Votes cast abroad are not supported, pick a district instead of '{0}'")]
    UnsupportedRegion(String),
}

#[derive(Debug, thiserror::Error)]
pub enum ScraperError {
    #[error("Invalid district URL: {0}")]
    Validation(#[from] ValidationError),
    #[error("Transport error: {0}")]
    Fetch(#[from] FetchError),
    #[error("Parse error: {0}")]
    ParseError(#[from] ParseError),
    #[error("Got {urls} municipality URLs for {codes} codes")]
    LengthMismatch { urls: usize, codes: usize },
}

/// Blocking page download.
pub trait Fetch {
    fn fetch(&self, url: &str) -> Result<String, FetchError>;
}

#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new() -> Result<Self, FetchError> {
        Self::with_timeout(DEFAULT_TIMEOUT)
    }

    pub fn with_timeout(timeout: Duration) -> Result<Self, FetchError> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(format!(
                "{}/{}",
                env!("CARGO_PKG_NAME"),
                env!("CARGO_PKG_VERSION")
            ))
            .build()?;

        Ok(Self::with_client(client))
    }

    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

impl Fetch for HttpFetcher {
    fn fetch(&self, url: &str) -> Result<String, FetchError> {
        log::debug!("GET {}", url);
        let response = self
            .client
            .get(url)
            .send()
            .inspect_err(|e| log::error!("HTTP error: {e:?}"))?;

        if response.status() == StatusCode::NOT_FOUND {
            return Err(FetchError::NotFound(url.to_string()));
        }

        Ok(response
            .error_for_status()?
            .text()
            .inspect_err(|e| log::error!("Decode error: {e:?}"))?)
    }
}

/// Outcome of scraping one municipality, see [`ElectionScraper::assemble_each`].
#[derive(Debug)]
pub struct MunicipalityOutcome {
    pub code: String,
    pub url: String,
    pub result: Result<MunicipalityRecord, ScraperError>,
}

impl FromIterator<MunicipalityOutcome> for Dataset {
    fn from_iter<I: IntoIterator<Item = MunicipalityOutcome>>(iter: I) -> Self {
        iter.into_iter()
            .filter_map(|outcome| match outcome.result {
                Ok(record) => Some(record),
                Err(e) => {
                    log::warn!(
                        "Skipping municipality {} ({}): {}",
                        outcome.code,
                        outcome.url,
                        e
                    );
                    None
                }
            })
            .collect()
    }
}

/// Walks region listing → district → municipality pages of one election.
#[derive(Debug, Clone)]
pub struct ElectionScraper<F = HttpFetcher> {
    fetcher: F,
    base_url: String,
}

impl ElectionScraper<HttpFetcher> {
    pub fn new() -> Result<Self, ScraperError> {
        Ok(Self::with_fetcher(HttpFetcher::new()?, crate::BASE_URL))
    }
}

impl<F: Fetch> ElectionScraper<F> {
    pub fn with_fetcher(fetcher: F, base_url: impl Into<String>) -> Self {
        let base_url: String = base_url.into();
        Self {
            fetcher,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Every in-country district URL published on the region listing, in page
    /// order and without repeats.
    pub fn list_districts(&self) -> Result<Vec<String>, ScraperError> {
        let url = region_listing_url(&self.base_url);
        log::info!("Fetching region listing {}...", url);
        let html = self.fetcher.fetch(&url)?;

        let mut districts: Vec<String> = Vec::new();
        for link in parse_district_links(&html, &self.base_url) {
            if !districts.contains(&link) {
                districts.push(link);
            }
        }
        log::debug!("Found {} district URLs", districts.len());
        Ok(districts)
    }

    /// Accepts `candidate` only if it is one of the published district URLs,
    /// compared verbatim.
    pub fn validate_district_url(&self, candidate: &str) -> Result<DistrictUrl, ScraperError> {
        let districts = self.list_districts()?;

        if districts.iter().any(|d| d == candidate) {
            Ok(DistrictUrl::new_unchecked(candidate))
        } else if candidate == abroad_url(&self.base_url) {
            Err(ValidationError::UnsupportedRegion(candidate.to_string()).into())
        } else {
            Err(ValidationError::InvalidFormat(candidate.to_string()).into())
        }
    }

    pub fn list_municipalities(&self, url: &DistrictUrl) -> Result<Vec<String>, ScraperError> {
        log::info!("Fetching municipality list {}...", url);
        let html = self.fetcher.fetch(url.as_str())?;
        let codes = parse_municipality_codes(&html);
        if codes.is_empty() {
            log::warn!("No municipalities linked from {}", url);
        }
        Ok(codes)
    }

    pub fn municipality_urls(
        &self,
        codes: &DistrictCodes,
        municipalities: &[String],
    ) -> Vec<String> {
        municipalities
            .iter()
            .map(|m| build_municipality_url(&self.base_url, &codes.region, &codes.district, m))
            .collect()
    }

    pub fn extract_municipality(
        &self,
        url: &str,
        code: &str,
    ) -> Result<MunicipalityRecord, ScraperError> {
        log::info!("Fetching municipality {}...", code);
        let html = self.fetcher.fetch(url)?;
        Ok(parse_municipality_record(&html, url, code)?)
    }

    /// Extracts every municipality in order; the first failure aborts the
    /// whole run.
    pub fn assemble(&self, urls: &[String], codes: &[String]) -> Result<Dataset, ScraperError> {
        check_lengths(urls, codes)?;

        let mut dataset = Dataset::new();
        for (url, code) in urls.iter().zip(codes) {
            dataset.push(self.extract_municipality(url, code)?);
        }
        Ok(dataset)
    }

    /// Like [`Self::assemble`] but keeps going after failures, leaving the
    /// abort-or-skip decision to the caller.
    pub fn assemble_each(
        &self,
        urls: &[String],
        codes: &[String],
    ) -> Result<Vec<MunicipalityOutcome>, ScraperError> {
        check_lengths(urls, codes)?;

        Ok(urls
            .iter()
            .zip(codes)
            .map(|(url, code)| MunicipalityOutcome {
                code: code.clone(),
                url: url.clone(),
                result: self.extract_municipality(url, code),
            })
            .collect())
    }

    /// Resolves a validated district and scrapes all its municipalities.
    pub fn scrape_district(&self, url: &DistrictUrl) -> Result<Dataset, ScraperError> {
        let (urls, codes) = self.resolve_district(url)?;
        self.assemble(&urls, &codes)
    }

    /// Like [`Self::scrape_district`] but municipalities that fail are logged
    /// and left out of the dataset.
    pub fn scrape_district_skipping_failures(
        &self,
        url: &DistrictUrl,
    ) -> Result<Dataset, ScraperError> {
        let (urls, codes) = self.resolve_district(url)?;
        let outcomes = self.assemble_each(&urls, &codes)?;
        let total = outcomes.len();

        let dataset: Dataset = outcomes.into_iter().collect();
        if dataset.len() < total {
            log::warn!("Scraped {} of {} municipalities", dataset.len(), total);
        }
        Ok(dataset)
    }

    /// Municipality URLs and codes of a district, in discovery order.
    pub fn resolve_district(
        &self,
        url: &DistrictUrl,
    ) -> Result<(Vec<String>, Vec<String>), ScraperError> {
        let district = DistrictCodes::from_url(url)?;
        log::debug!("Resolved {} to {}", url, district);
        let codes = self.list_municipalities(url)?;
        let urls = self.municipality_urls(&district, &codes);
        Ok((urls, codes))
    }
}

fn check_lengths(urls: &[String], codes: &[String]) -> Result<(), ScraperError> {
    if urls.len() != codes.len() {
        return Err(ScraperError::LengthMismatch {
            urls: urls.len(),
            codes: codes.len(),
        });
    }
    Ok(())
}
