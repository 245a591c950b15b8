//! Application state management

use crate::channel::ChannelManagerClient;
use crate::config::Config;
use crate::error::Result;
use crate::sheets::{RateRecord, SheetsClient, WorksheetHandle};
use parking_lot::RwLock;
use std::sync::Arc;
use tracing::info;

/// The Record set captured by one refresh action. Read-only until the next
/// refresh replaces it whole; unsaved operator edits live in the UI only.
#[derive(Debug, Clone)]
pub struct Snapshot {
    pub worksheet: WorksheetHandle,
    pub records: Vec<RateRecord>,
    pub loaded_at: chrono::DateTime<chrono::Utc>,
}

impl Snapshot {
    /// 0-based position of a room type within this snapshot.
    pub fn position_of(&self, room_type: &str) -> Option<usize> {
        self.records.iter().position(|r| r.room_type == room_type)
    }

    pub fn record(&self, room_type: &str) -> Option<&RateRecord> {
        self.records.iter().find(|r| r.room_type == room_type)
    }
}

/// Application state shared across all dashboard actions.
///
/// Both remote clients are constructed once at startup and reused for the
/// process lifetime; the snapshot holds one session's loaded data.
pub struct AppState {
    pub config: Config,
    pub sheets: Arc<SheetsClient>,
    /// `None` when no channel-manager token is configured; the push feature
    /// is then unavailable rather than erroring.
    pub channel: Option<Arc<ChannelManagerClient>>,
    pub snapshot: RwLock<Option<Snapshot>>,
}

impl AppState {
    pub fn new(config: Config) -> Result<Self> {
        let sheets = Arc::new(SheetsClient::new(&config.spreadsheet));

        let channel = config
            .channel_manager
            .as_ref()
            .and_then(ChannelManagerClient::from_config)
            .map(Arc::new);

        match &channel {
            Some(_) => info!("Channel manager push enabled"),
            None => info!("Channel manager push disabled (no credential configured)"),
        }

        Ok(Self {
            config,
            sheets,
            channel,
            snapshot: RwLock::new(None),
        })
    }

    /// Whether the push feature is available at all.
    pub fn push_enabled(&self) -> bool {
        self.channel.is_some()
    }

    /// Whether a snapshot is loaded (Loaded vs Empty state).
    pub fn is_loaded(&self) -> bool {
        self.snapshot.read().is_some()
    }

    pub fn get_snapshot(&self) -> Option<Snapshot> {
        self.snapshot.read().clone()
    }

    /// Swap in a freshly loaded snapshot, discarding the previous one.
    pub fn set_snapshot(&self, snapshot: Snapshot) {
        *self.snapshot.write() = Some(snapshot);
    }
}
