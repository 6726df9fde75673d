use std::sync::Arc;
use tokio::sync::{watch, Mutex};
use tracing::{error, info, warn};

use super::{Connector, DatabaseClient};
use crate::error::Result;
use crate::schema::SchemaRegistry;

/// Schema id the UI sends to deselect the current database.
pub const DESELECT_ID: i64 = -1;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaSelection {
    None,
    Schema(i64),
}

impl SchemaSelection {
    pub fn from_id(id: i64) -> Self {
        if id == DESELECT_ID {
            Self::None
        } else {
            Self::Schema(id)
        }
    }
}

/// Point-in-time view of the session. Readers clone it out of the watch
/// channel, so rendering and query execution never wait on a schema switch.
#[derive(Clone, Default)]
pub struct SessionSnapshot {
    pub schema_id: Option<u32>,
    pub schema_text: String,
    /// Why the last selection failed, shown until the next selection.
    pub notice: Option<String>,
    client: Option<Arc<dyn DatabaseClient>>,
}

impl SessionSnapshot {
    pub fn is_connected(&self) -> bool {
        self.client.is_some()
    }

    pub fn client(&self) -> Option<&Arc<dyn DatabaseClient>> {
        self.client.as_ref()
    }

    fn failed(notice: String) -> Self {
        Self {
            notice: Some(notice),
            ..Self::default()
        }
    }

    #[cfg(test)]
    pub fn connected(schema_id: u32, schema_text: &str, client: Arc<dyn DatabaseClient>) -> Self {
        Self {
            schema_id: Some(schema_id),
            schema_text: schema_text.to_string(),
            notice: None,
            client: Some(client),
        }
    }
}

/// Owns the single database connection for the currently selected schema.
///
/// `switch` serializes selections and holds the client that must be closed
/// before another is opened. `view` is what everyone else reads.
pub struct DatabaseSession {
    registry: Arc<SchemaRegistry>,
    connector: Arc<dyn Connector>,
    switch: Mutex<Option<Arc<dyn DatabaseClient>>>,
    view: watch::Sender<SessionSnapshot>,
}

impl DatabaseSession {
    pub fn new(registry: Arc<SchemaRegistry>, connector: Arc<dyn Connector>) -> Self {
        Self {
            registry,
            connector,
            switch: Mutex::new(None),
            view: watch::Sender::new(SessionSnapshot::default()),
        }
    }

    /// Switches the active database. Any open connection is closed first and
    /// the whole switch runs under the `switch` lock, so concurrent
    /// selections can never leave two connections open.
    ///
    /// The view goes disconnected before the old client is closed; closing
    /// waits for in-flight queries, and readers are not held up by it.
    ///
    /// Unknown ids are rejected before the current state is touched. A failed
    /// connect leaves the session disconnected and remembers the cause.
    pub async fn select(&self, selection: SchemaSelection) -> Result<()> {
        let descriptor = match selection {
            SchemaSelection::None => None,
            SchemaSelection::Schema(id) => Some(self.registry.get(id)?),
        };

        let mut active = self.switch.lock().await;
        self.view.send_replace(SessionSnapshot::default());
        if let Some(previous) = active.take() {
            close_quietly(previous).await;
        }

        let Some(descriptor) = descriptor else {
            info!("Schema deselected");
            return Ok(());
        };

        match self.connector.connect(&descriptor.db_name).await {
            Ok(client) => {
                info!(
                    "Schema selected: {} (database {})",
                    descriptor.display_name, descriptor.db_name
                );
                *active = Some(Arc::clone(&client));
                self.view.send_replace(SessionSnapshot {
                    schema_id: Some(descriptor.id),
                    schema_text: descriptor.schema_text.clone(),
                    notice: None,
                    client: Some(client),
                });
                Ok(())
            }
            Err(e) => {
                error!("Unable to connect to database {}: {}", descriptor.db_name, e);
                self.view.send_replace(SessionSnapshot::failed(format!(
                    "Unable to connect to the database. {}",
                    e
                )));
                Err(e.into())
            }
        }
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        self.view.borrow().clone()
    }

    /// Schema text of the active database, empty when disconnected.
    pub fn current_schema_text(&self) -> String {
        self.view.borrow().schema_text.clone()
    }

    pub fn is_active(&self) -> bool {
        self.view.borrow().is_connected()
    }

    pub fn selected_id(&self) -> Option<u32> {
        self.view.borrow().schema_id
    }

    pub fn last_error(&self) -> Option<String> {
        self.view.borrow().notice.clone()
    }

    /// Closes the active connection on shutdown.
    pub async fn shutdown(&self) {
        let mut active = self.switch.lock().await;
        self.view.send_replace(SessionSnapshot::default());
        if let Some(client) = active.take() {
            close_quietly(client).await;
        }
    }
}

async fn close_quietly(client: Arc<dyn DatabaseClient>) {
    if let Err(e) = client.close().await {
        warn!("Unable to close the connection: {}", e);
    }
}
