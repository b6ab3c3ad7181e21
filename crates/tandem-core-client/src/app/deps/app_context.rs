// tandem-core-client/tandem-core-client
//
// Copyright: 2024, Tandem Authors
// License: Mozilla Public License v2.0 (MPL v2.0)

use anyhow::Result;
use chrono::Duration;
use parking_lot::RwLock;
use serde::Deserialize;

use crate::domain::shared::models::Viewer;
use crate::domain::uploads::models::AttachmentPolicy;

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Silence after the last keystroke before the local user stops "typing".
    pub typing_idle_timeout_ms: u64,
    /// Upper bound for showing the counterpart's typing indicator in case the closing
    /// signal got lost.
    pub typing_indicator_max_display_ms: u64,
    /// How long a message stays highlighted after scrolling to it.
    pub highlight_duration_ms: u64,
    pub max_staged_attachments: usize,
    pub attachment_policy: AttachmentPolicy,
    /// Consecutive messages by the same sender within this window are grouped.
    pub message_group_window_secs: u64,
    /// Distance from the bottom (in points) within which the timeline keeps following new
    /// content.
    pub auto_scroll_threshold: f64,
    /// Maximum number of characters shown in reply quotes.
    pub reply_snippet_length: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            typing_idle_timeout_ms: 2000,
            typing_indicator_max_display_ms: 10_000,
            highlight_duration_ms: 2000,
            max_staged_attachments: 5,
            attachment_policy: Default::default(),
            message_group_window_secs: 300,
            auto_scroll_threshold: 80.,
            reply_snippet_length: 100,
        }
    }
}

impl AppConfig {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn typing_idle_timeout(&self) -> Duration {
        Duration::milliseconds(self.typing_idle_timeout_ms as i64)
    }

    pub fn typing_indicator_max_display(&self) -> Duration {
        Duration::milliseconds(self.typing_indicator_max_display_ms as i64)
    }

    pub fn highlight_duration(&self) -> Duration {
        Duration::milliseconds(self.highlight_duration_ms as i64)
    }

    pub fn message_group_window(&self) -> Duration {
        Duration::seconds(self.message_group_window_secs as i64)
    }
}

pub struct AppContext {
    pub config: AppConfig,
    viewer: RwLock<Option<Viewer>>,
}

impl AppContext {
    pub fn new(config: AppConfig) -> Self {
        Self {
            config,
            viewer: Default::default(),
        }
    }

    pub fn with_viewer(viewer: Viewer) -> Self {
        let ctx = Self::default();
        ctx.set_viewer(Some(viewer));
        ctx
    }

    /// The signed-in user as reported by the identity provider.
    pub fn viewer(&self) -> Option<Viewer> {
        self.viewer.read().clone()
    }

    pub fn set_viewer(&self, viewer: Option<Viewer>) {
        *self.viewer.write() = viewer;
    }
}

impl Default for AppContext {
    fn default() -> Self {
        Self::new(AppConfig::default())
    }
}
