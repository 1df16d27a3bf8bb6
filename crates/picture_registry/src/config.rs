use once_cell::sync::Lazy;
use serde::Deserialize;

#[derive(Deserialize, Clone, Debug)]
pub struct Config {
    #[serde(default = "default_ipv4_address")]
    pub registry_ipv4_address: String,
    #[serde(default = "default_registry_port")]
    pub registry_port: u16,
    #[serde(default = "default_pictures_file")]
    pub registry_pictures_file: String,
    #[serde(default = "default_ipv4_address")]
    pub prometheus_ipv4_address: String,
    #[serde(default = "default_prometheus_port")]
    pub prometheus_port: u16,
}

fn default_ipv4_address() -> String {
    "0.0.0.0".to_string()
}

fn default_registry_port() -> u16 {
    8080
}

/// The seed file shipped next to this crate's manifest.
fn default_pictures_file() -> String {
    concat!(env!("CARGO_MANIFEST_DIR"), "/data/pictures.json").to_string()
}

fn default_prometheus_port() -> u16 {
    9000
}

pub static CONFIG: Lazy<Config> = Lazy::new(|| {
    envy::from_env::<Config>()
        .unwrap_or_else(|err| panic!("Failed to load configuration from env: {:#?}", err))
});
