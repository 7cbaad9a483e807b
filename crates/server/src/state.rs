use std::sync::Arc;

use catalog::SongIndex;
use common::HashStore;
use serde::{Deserialize, Serialize};

use crate::sniff::ContentSniffer;
use crate::streaming::RangeStreamer;

/// Built once at startup and shared by every handler. Nothing in here is
/// mutated after construction.
#[derive(Clone)]
pub struct AppState {
    pub index: Arc<SongIndex>,
    pub store: Arc<HashStore>,
    pub streamer: RangeStreamer,
}

impl AppState {
    pub fn new(index: SongIndex, store: HashStore, sniffer: Arc<dyn ContentSniffer>) -> Self {
        Self {
            index: Arc::new(index),
            store: Arc::new(store),
            streamer: RangeStreamer::new(sniffer),
        }
    }
}

#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    pub q: String,
}
