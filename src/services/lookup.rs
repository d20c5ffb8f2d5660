//! Road-tax enquiry portal client.
//!
//! Queries the LTA vehicle-registration enquiry page for a plate's make/model
//! and road-tax expiry date, and parses the returned HTML.
//!
//! Official source: <https://vrl.lta.gov.sg/lta/vrl/action/pubfunc?ID=EnquireRoadTaxExpDtProxy>
//!
//! Only checksum-valid plates ever reach this module; the dispatcher gates
//! every call behind the plate validator.

use async_trait::async_trait;
use chrono::NaiveDate;
use scraper::{ElementRef, Html, Selector};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::warn;

/// Form action of the public road-tax enquiry function.
const ENQUIRY_PATH: &str = "/lta/vrl/action/pubfunc?ID=EnquireRoadTaxExpDtProxy";

/// Portal date format, e.g. "15 Mar 2026".
const EXPIRY_DATE_FORMAT: &str = "%d %b %Y";

/// Outcome of one enquiry, as consumed by the dispatcher.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum LookupStatus {
    /// The portal returned a record for the plate.
    Found {
        model: String,
        /// Expiry exactly as displayed by the portal.
        road_tax_expiry: String,
        /// The same expiry parsed as a date, `None` when unparseable.
        expiry_date: Option<NaiveDate>,
    },
    /// The portal answered but holds no record for the plate.
    NotFound,
    /// The portal could not be queried or answered with an unexpected page.
    /// All internal fault modes collapse here; the cause is only logged.
    Unavailable,
}

/// Internal error of the enquiry client. Never crosses the `VehicleLookup`
/// boundary: `lookup` degrades every variant to `LookupStatus::Unavailable`.
#[derive(Debug, thiserror::Error)]
pub enum LookupError {
    #[error("HTTP request to enquiry portal failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("enquiry portal unavailable: {0}")]
    Portal(String),

    #[error("failed to parse enquiry result page: {0}")]
    Parse(String),
}

/// The record source the dispatcher queries for valid plates.
///
/// Implementations own their timeouts and internal retries; `lookup` must
/// always produce a status, never a raw fault.
#[async_trait]
pub trait VehicleLookup: Send + Sync {
    async fn lookup(&self, plate: &str) -> LookupStatus;

    /// Reachability probe for `/health`. Implementations without a remote
    /// dependency report healthy.
    async fn health_check(&self) -> Result<(), LookupError> {
        Ok(())
    }
}

/// Client for the LTA vehicle-registration enquiry portal.
pub struct LtaVrlClient {
    http: reqwest::Client,
    base_url: String,
}

impl LtaVrlClient {
    /// Create a new enquiry client. `timeout` bounds the whole request;
    /// expiry surfaces as `LookupStatus::Unavailable` at the trait boundary.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, LookupError> {
        let http = reqwest::Client::builder()
            .user_agent("Mozilla/5.0 (compatible; VehicleCheckBot/1.0)")
            .timeout(timeout)
            .build()?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Submit the enquiry form for a normalized plate and parse the result.
    async fn retrieve(&self, plate: &str) -> Result<LookupStatus, LookupError> {
        let url = format!("{}{}", self.base_url, ENQUIRY_PATH);
        let params = [
            ("vehNoField", plate),
            ("agreeTCbox", "on"),
            ("btnNext", "Next"),
        ];

        let response = self.http.post(&url).form(&params).send().await?;

        if !response.status().is_success() {
            return Err(LookupError::Portal(format!(
                "portal returned HTTP {}",
                response.status()
            )));
        }

        let html = response.text().await?;
        self.parse_enquiry_result(&html)
    }

    /// Parse the enquiry result page.
    ///
    /// Result layout: make/model inside the `div.separated` block labeled
    /// "Vehicle Make/Model", expiry in the `p.vrlDT-content-p` following the
    /// "Road Tax Expiry Date" label. A `#backend-errorBox` element means the
    /// portal holds no record for the plate.
    fn parse_enquiry_result(&self, html: &str) -> Result<LookupStatus, LookupError> {
        let document = Html::parse_document(html);

        let error_box_sel = Selector::parse("#backend-errorBox").expect("valid selector");
        if document.select(&error_box_sel).next().is_some() {
            return Ok(LookupStatus::NotFound);
        }

        let model = extract_model(&document)
            .ok_or_else(|| LookupError::Parse("make/model block not found".to_string()))?;
        let road_tax_expiry = extract_expiry(&document)
            .ok_or_else(|| LookupError::Parse("road-tax expiry block not found".to_string()))?;

        let expiry_date = NaiveDate::parse_from_str(&road_tax_expiry, EXPIRY_DATE_FORMAT).ok();
        if expiry_date.is_none() {
            warn!(expiry = %road_tax_expiry, "expiry did not parse as a date, keeping raw text");
        }

        Ok(LookupStatus::Found {
            model,
            road_tax_expiry,
            expiry_date,
        })
    }
}

#[async_trait]
impl VehicleLookup for LtaVrlClient {
    async fn lookup(&self, plate: &str) -> LookupStatus {
        match self.retrieve(plate).await {
            Ok(status) => status,
            Err(e) => {
                warn!(plate = %plate, error = %e, "road-tax enquiry failed");
                LookupStatus::Unavailable
            }
        }
    }

    async fn health_check(&self) -> Result<(), LookupError> {
        let response = self.http.get(&self.base_url).send().await?;
        if response.status().is_server_error() {
            return Err(LookupError::Portal(format!(
                "portal returned HTTP {}",
                response.status()
            )));
        }
        Ok(())
    }
}

/// Make/model text: the `p` inside the `div.separated` block whose `h5 > i`
/// label reads "Vehicle Make/Model".
fn extract_model(document: &Html) -> Option<String> {
    let label_sel = Selector::parse("h5 > i").expect("valid selector");
    let p_sel = Selector::parse("p").expect("valid selector");

    for label in document.select(&label_sel) {
        let text: String = label.text().collect();
        if text.trim() != "Vehicle Make/Model" {
            continue;
        }

        let block = label.ancestors().filter_map(ElementRef::wrap).find(|el| {
            el.value().name() == "div"
                && el
                    .value()
                    .attr("class")
                    .is_some_and(|c| c.contains("separated"))
        })?;

        let value = block.select(&p_sel).next()?;
        let value: String = value.text().collect();
        let value = value.trim();
        if !value.is_empty() {
            return Some(value.to_string());
        }
    }

    None
}

/// Expiry text: the `p.vrlDT-content-p` sibling following the
/// `p.vrlDT-label-p` whose text contains "Road Tax Expiry Date".
fn extract_expiry(document: &Html) -> Option<String> {
    let label_sel = Selector::parse("p.vrlDT-label-p").expect("valid selector");

    for label in document.select(&label_sel) {
        let text: String = label.text().collect();
        if !text.contains("Road Tax Expiry Date") {
            continue;
        }

        let content = label
            .next_siblings()
            .filter_map(ElementRef::wrap)
            .find(|el| {
                el.value().name() == "p"
                    && el
                        .value()
                        .attr("class")
                        .is_some_and(|c| c.contains("vrlDT-content-p"))
            })?;

        let value: String = content.text().collect();
        let value = value.trim();
        if !value.is_empty() {
            return Some(value.to_string());
        }
    }

    None
}
