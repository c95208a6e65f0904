//! Shared test doubles for the behavior suites.

use std::collections::VecDeque;
use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;

use quotepulse_core::{
    FallbackRecord, HistoryError, Quote, QuoteHistory, QuoteSource, Symbol, UpstreamError,
    UtcDateTime,
};

/// Scripted upstream: pops one response per call, in order.
///
/// Once the script runs dry every further call fails with a transport
/// error, so tests never hang on an under-specified script.
pub struct ScriptedSource {
    responses: Mutex<VecDeque<Result<f64, UpstreamError>>>,
    calls: AtomicU32,
}

impl ScriptedSource {
    pub fn new(responses: Vec<Result<f64, UpstreamError>>) -> Self {
        Self {
            responses: Mutex::new(responses.into()),
            calls: AtomicU32::new(0),
        }
    }

    /// A source that fails every attempt with the same transport message.
    pub fn always_failing(message: &str) -> Self {
        Self::new(vec![
            Err(UpstreamError::Transport(message.to_owned())),
            Err(UpstreamError::Transport(message.to_owned())),
            Err(UpstreamError::Transport(message.to_owned())),
        ])
    }

    pub fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }
}

impl QuoteSource for ScriptedSource {
    fn id(&self) -> &'static str {
        "scripted"
    }

    fn fetch_quote<'a>(
        &'a self,
        symbol: &'a Symbol,
    ) -> Pin<Box<dyn Future<Output = Result<Quote, UpstreamError>> + Send + 'a>> {
        Box::pin(async move {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let next = self
                .responses
                .lock()
                .expect("script mutex poisoned")
                .pop_front()
                .unwrap_or_else(|| {
                    Err(UpstreamError::Transport(String::from("script exhausted")))
                });
            match next {
                Ok(price) => Quote::live(symbol.clone(), price, UtcDateTime::now())
                    .map_err(|error| UpstreamError::Malformed(error.to_string())),
                Err(error) => Err(error),
            }
        })
    }
}

/// In-memory append-only history.
#[derive(Default)]
pub struct MemoryHistory {
    records: Mutex<Vec<FallbackRecord>>,
}

impl MemoryHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_record(symbol: &Symbol, price: f64, observed_at: UtcDateTime) -> Self {
        let history = Self::default();
        history
            .record(&FallbackRecord {
                symbol: symbol.clone(),
                price,
                observed_at,
            })
            .expect("in-memory record cannot fail");
        history
    }

    pub fn len(&self) -> usize {
        self.records.lock().expect("history mutex poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl QuoteHistory for MemoryHistory {
    fn record(&self, record: &FallbackRecord) -> Result<(), HistoryError> {
        self.records
            .lock()
            .expect("history mutex poisoned")
            .push(record.clone());
        Ok(())
    }

    fn last_known(&self, symbol: &Symbol) -> Result<Option<FallbackRecord>, HistoryError> {
        let records = self.records.lock().expect("history mutex poisoned");
        Ok(records
            .iter()
            .filter(|record| record.symbol == *symbol)
            .max_by_key(|record| record.observed_at)
            .cloned())
    }
}

/// History whose writes always fail; reads report an empty store.
pub struct FailingHistory;

impl QuoteHistory for FailingHistory {
    fn record(&self, _record: &FallbackRecord) -> Result<(), HistoryError> {
        Err(HistoryError::Storage(String::from("disk full")))
    }

    fn last_known(&self, _symbol: &Symbol) -> Result<Option<FallbackRecord>, HistoryError> {
        Ok(None)
    }
}

pub fn symbol(raw: &str) -> Symbol {
    Symbol::parse(raw).expect("valid test symbol")
}
