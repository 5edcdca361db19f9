use crate::error::AppError;
use config::{Config as Cfg, ConfigBuilder, File, builder::DefaultState};
use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_port() -> u16 {
    3690
}

impl Config {
    /// Load the common section.
    ///
    /// Sources, lowest precedence first: optional `configuration.*` file,
    /// `APP__*` environment variables, then a bare `PORT` variable.
    pub fn load() -> Result<Self, AppError> {
        dotenvy::dotenv().ok();

        let builder = Cfg::builder()
            .add_source(File::with_name("configuration").required(false))
            .add_source(config::Environment::with_prefix("APP").separator("__"));

        Self::from_builder(builder, std::env::var("PORT").ok())
    }

    fn from_builder(
        builder: ConfigBuilder<DefaultState>,
        port_override: Option<String>,
    ) -> Result<Self, AppError> {
        let config = builder.set_override_option("port", port_override)?.build()?;

        Ok(config.try_deserialize()?)
    }
}
