mod settings;

pub use settings::{
    sanitize_database_url, EtlSettings, PostgresSettings, PriceFeedSettings, ServerSettings,
    Settings,
};
