pub mod parse;
pub mod status;
pub mod sync;

use anyhow::Result;
use icsync_core::{LoadedCalendar, PreparedSync, SyncContext, load_records, prepare};
use icsync_notion::{NotionClient, NotionStore};

use crate::config::Settings;
use crate::render::render_dropped;
use crate::utils::tui;

/// Everything `sync` and `status` need before deciding on writes.
pub(crate) struct Session {
    pub ctx: SyncContext,
    pub loaded: LoadedCalendar,
    pub store: NotionStore,
    pub prepared: PreparedSync,
}

impl Session {
    pub async fn open(settings: &Settings) -> Result<Self> {
        let (token, database_id) = settings.credentials()?;
        let source = settings.read_calendar()?;

        let ctx = settings.context();
        let loaded = load_records(&source, &ctx)?;
        if let Some(dropped) = render_dropped(&loaded) {
            eprintln!("{dropped}");
        }

        let store = NotionStore::new(NotionClient::new(token)?, database_id);

        let spinner = tui::create_spinner("Reading Notion database");
        let prepared = prepare(&store, loaded.records.clone(), &settings.properties).await;
        spinner.finish_and_clear();

        Ok(Session {
            ctx,
            loaded,
            store,
            prepared: prepared?,
        })
    }
}
