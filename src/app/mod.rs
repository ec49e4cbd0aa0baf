use std::{net::SocketAddr, sync::Arc};

use derive_more::Deref;
use tokio::net::TcpListener;
use tracing::info;

use crate::{
    analytics::Analytics, config::AppConfig, mailing_list::GroupId,
    templ_manager::TemplateManager, MailingListClient, Result,
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

    pub async fn build_from_config(config: &AppConfig) -> Result<Self> {
        let ml_config = &config.mailing_list_config;
        let group_id = ml_config.valid_group()?;
        let analytics = config
            .analytics_config
            .valid_tracking_id()?
            .map(Analytics::new);
        if analytics.is_none() {
            info!("{:<20} - {}", "Analytics:", "disabled");
        }

        let tm = TemplateManager::init()?;
        let mailing_list_client = MailingListClient::new(
            &ml_config.url,
            ml_config.api_key.clone(),
            ml_config.timeout(),
        )?;

        let app_state = AppState::new(
            tm,
            mailing_list_client,
            group_id,
            analytics,
            config.net_config.base_url.clone(),
        );

        let addr = SocketAddr::from((config.net_config.host, config.net_config.app_port));
        let listener = TcpListener::bind(addr).await?;
        let addr = listener.local_addr()?;
        info!("{:<20} - {}", "Listening on:", addr);

        let app = App::new(app_state, listener);
        Ok(app)
    }

    /// The address the listener is actually bound to, useful when binding port 0.
    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }
}

pub struct InternalState {
    pub templ_mgr: TemplateManager,
    pub mailing_list_client: MailingListClient,
    pub group_id: GroupId,
    /// `None` when no tracking id is configured.
    pub analytics: Option<Analytics>,
    pub base_url: String,
}

/// Application state containing all global data.
/// It implements `Deref` to easily access the fields on `InternalState`
/// Uses an `Arc` so it can be cloned around.
#[derive(Clone, Deref)]
pub struct AppState(Arc<InternalState>);

impl AppState {
    pub fn new(
        templ_mgr: TemplateManager,
        mailing_list_client: MailingListClient,
        group_id: GroupId,
        analytics: Option<Analytics>,
        base_url: String,
    ) -> Self {
        AppState(Arc::new(InternalState {
            templ_mgr,
            mailing_list_client,
            group_id,
            analytics,
            base_url,
        }))
    }
}
