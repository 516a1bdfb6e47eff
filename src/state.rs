//! Application state

use aws_sdk_sesv2::Client as SesClient;
use sqlx::SqlitePool;

use crate::config::Config;
use crate::db::DbService;
use crate::events::EventDispatcher;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// SQLite connection pool
    pub pool: SqlitePool,
    /// Post-commit domain event fan-out
    pub dispatcher: EventDispatcher,
    /// AWS SES client for notification emails
    pub ses: SesClient,
    /// SES sender address
    pub ses_from_email: String,
    /// Inbox that receives pending-review notifications
    pub review_notify_email: String,
    /// Shared secret for webhook signatures (empty disables verification)
    pub order_webhook_secret: String,
}

impl AppState {
    /// Create a new AppState: open the database, run migrations, build the
    /// SES client and the event dispatcher.
    pub async fn new(config: &Config) -> Result<Self, BoxError> {
        let db = DbService::new(&config.database_path).await?;

        let aws_config = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;
        let ses = SesClient::new(&aws_config);

        Ok(Self {
            pool: db.pool,
            dispatcher: EventDispatcher::default(),
            ses,
            ses_from_email: config.ses_from_email.clone(),
            review_notify_email: config.review_notify_email.clone(),
            order_webhook_secret: config.order_webhook_secret.clone(),
        })
    }
}
