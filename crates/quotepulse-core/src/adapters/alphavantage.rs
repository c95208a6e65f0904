use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use serde::Deserialize;

use crate::http_client::{HttpClient, HttpRequest};
use crate::source::QuoteSource;
use crate::{Quote, Symbol, UpstreamError, UtcDateTime};

const DEFAULT_BASE_URL: &str = "https://www.alphavantage.co/query";
const REQUEST_TIMEOUT_MS: u64 = 5_000;

/// Alpha Vantage `GLOBAL_QUOTE` adapter.
///
/// Stateless: each call is a single bounded HTTP GET with the outcome
/// classified into [`UpstreamError`]. A free-tier notice in the body (the
/// `"Note"` field) is reported as `RateLimited` with the notice verbatim.
#[derive(Clone)]
pub struct AlphaVantageSource {
    http_client: Arc<dyn HttpClient>,
    api_key: String,
    base_url: String,
}

impl AlphaVantageSource {
    pub fn new(http_client: Arc<dyn HttpClient>, api_key: impl Into<String>) -> Self {
        Self {
            http_client,
            api_key: api_key.into(),
            base_url: String::from(DEFAULT_BASE_URL),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    fn quote_endpoint(&self, symbol: &Symbol) -> String {
        format!(
            "{}?function=GLOBAL_QUOTE&symbol={}&apikey={}",
            self.base_url,
            urlencoding::encode(symbol.as_str()),
            self.api_key
        )
    }
}

impl QuoteSource for AlphaVantageSource {
    fn id(&self) -> &'static str {
        "alphavantage"
    }

    fn fetch_quote<'a>(
        &'a self,
        symbol: &'a Symbol,
    ) -> Pin<Box<dyn Future<Output = Result<Quote, UpstreamError>> + Send + 'a>> {
        Box::pin(async move {
            let request =
                HttpRequest::get(self.quote_endpoint(symbol)).with_timeout_ms(REQUEST_TIMEOUT_MS);

            let response = self
                .http_client
                .execute(request)
                .await
                .map_err(|error| UpstreamError::Transport(error.message().to_owned()))?;

            if !response.is_success() {
                return Err(UpstreamError::Transport(format!(
                    "alphavantage returned status {}",
                    response.status
                )));
            }

            parse_global_quote(symbol, &response.body)
        })
    }
}

#[derive(Debug, Deserialize)]
struct GlobalQuoteResponse {
    #[serde(rename = "Global Quote", default)]
    quote: Option<GlobalQuoteData>,
    #[serde(rename = "Note", default)]
    note: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GlobalQuoteData {
    #[serde(rename = "05. price", default)]
    price: Option<String>,
}

fn parse_global_quote(symbol: &Symbol, body: &str) -> Result<Quote, UpstreamError> {
    let parsed: GlobalQuoteResponse = serde_json::from_str(body).map_err(|error| {
        UpstreamError::Malformed(format!("unparseable alphavantage payload: {error}"))
    })?;

    if let Some(note) = parsed.note {
        return Err(UpstreamError::RateLimited(note));
    }

    let raw_price = parsed
        .quote
        .and_then(|quote| quote.price)
        .ok_or_else(|| {
            UpstreamError::Malformed(format!(
                "alphavantage response has no '05. price' for {symbol}"
            ))
        })?;

    let price: f64 = raw_price.parse().map_err(|_| {
        UpstreamError::Malformed(format!("alphavantage price '{raw_price}' is not a number"))
    })?;

    Quote::live(symbol.clone(), price, UtcDateTime::now())
        .map_err(|error| UpstreamError::Malformed(error.to_string()))
}
