use std::{net::SocketAddr, sync::Arc};

use derive_more::Deref;
use tokio::net::TcpListener;
use tracing::info;

use crate::{
    config::AppConfig,
    model::{PgStore, SubscriberStore},
    Result,
};

// ###################################
// ->  Structs
// ###################################
pub struct App {
    pub app_state: AppState,
    pub listener: TcpListener,
}
impl App {
    pub fn new(app_state: AppState, listener: TcpListener) -> Self {
        App {
            app_state,
            listener,
        }
    }

    /// Connects the PostgreSQL store and binds the listener described by `config`.
    pub async fn build_from_config(config: &AppConfig) -> Result<Self> {
        let store = PgStore::init(&config.db_config).await?;
        let app_state = AppState::new(Arc::new(store));

        let net_config = &config.net_config;
        let addr = SocketAddr::from((net_config.host, net_config.app_port));
        let listener = TcpListener::bind(addr).await?;
        let addr = listener.local_addr()?;
        info!("{:<20} - {}", "Server running on:", addr);

        let app = App::new(app_state, listener);
        Ok(app)
    }
}

pub struct InternalState {
    pub store: Arc<dyn SubscriberStore>,
}

/// Application state containing all global data.
/// It implements `Deref` to easily access the fields on `InternalState`
/// Uses an `Arc` so it can be cloned around.
#[derive(Clone, Deref)]
pub struct AppState(Arc<InternalState>);

impl AppState {
    pub fn new(store: Arc<dyn SubscriberStore>) -> Self {
        AppState(Arc::new(InternalState { store }))
    }

    pub fn store(&self) -> &dyn SubscriberStore {
        self.store.as_ref()
    }
}
