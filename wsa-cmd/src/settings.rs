//! View settings shared by every subcommand.

use clap::Args;
use log::info;
use wsa_data::DatePolicy;
use wsa_sync::ViewConfig;

#[derive(Args, Debug, Clone, Default)]
pub struct SettingsArgs {
    /// JSON file overriding the default view settings
    #[arg(short = 'c', long)]
    pub config: Option<String>,

    /// Column holding the region identifier
    #[arg(long)]
    pub region_field: Option<String>,

    /// Fail the load when any date cannot be parsed instead of dropping the record
    #[arg(long)]
    pub strict_dates: bool,
}

impl SettingsArgs {
    /// Defaults, then the config file, then command line flags.
    pub fn load(&self) -> anyhow::Result<ViewConfig> {
        let mut config = match &self.config {
            Some(path) => {
                info!("Loading settings from {}", path);
                let json = std::fs::read_to_string(path)?;
                ViewConfig::from_json_str(&json)?
            }
            None => ViewConfig::default(),
        };
        if let Some(region_field) = &self.region_field {
            config.schema.region_field = region_field.clone();
        }
        if self.strict_dates {
            config.date_policy = DatePolicy::RejectLoad;
        }
        Ok(config)
    }
}
