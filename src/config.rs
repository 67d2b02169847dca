use crate::prelude::*;

use crate::hm::inverter::{Serial, MAX_NAME_LENGTH};
use crate::hm::layout::InverterType;

use serde::Deserialize;
use serde_with::{serde_as, DisplayFromStr};
use std::collections::HashSet;
use std::str::FromStr;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

#[derive(Clone, Debug, Deserialize)]
pub struct Config {
    pub inverters: Vec<Inverter>,
    pub dtu: Dtu,

    #[serde(default = "Config::default_max_inverters")]
    pub max_inverters: usize,

    #[serde(default = "Config::default_loglevel")]
    pub loglevel: String,
}

// Inverter {{{
#[serde_as]
#[derive(Clone, Debug, Deserialize)]
pub struct Inverter {
    #[serde(default = "Config::default_enabled")]
    pub enabled: bool,

    pub name: String,
    #[serde(rename = "type")]
    #[serde_as(as = "DisplayFromStr")]
    pub inverter_type: InverterType,
    // quote it in yaml, an all-digit serial would otherwise load as a number
    #[serde_as(as = "DisplayFromStr")]
    pub serial: Serial,
}
impl Inverter {
    pub fn enabled(&self) -> bool {
        self.enabled
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn inverter_type(&self) -> InverterType {
        self.inverter_type
    }

    pub fn serial(&self) -> Serial {
        self.serial
    }
} // }}}

// Dtu {{{
#[derive(Clone, Debug, Deserialize)]
pub struct Dtu {
    #[serde(deserialize_with = "de_address")]
    pub address: u32,
}
impl Dtu {
    pub fn address(&self) -> u32 {
        self.address
    }
} // }}}

pub struct ConfigWrapper {
    config: Arc<Mutex<Config>>,
}

impl Clone for ConfigWrapper {
    fn clone(&self) -> Self {
        Self {
            config: self.config.clone(),
        }
    }
}

impl ConfigWrapper {
    pub fn new(file: String) -> Result<Self> {
        let config = Config::new(file)?;
        Ok(Self::from_config(config))
    }

    pub fn from_config(config: Config) -> Self {
        Self {
            config: Arc::new(Mutex::new(config)),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Config> {
        self.config.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn inverters(&self) -> Vec<Inverter> {
        self.lock().inverters.clone()
    }

    pub fn enabled_inverters(&self) -> Vec<Inverter> {
        self.inverters().into_iter().filter(|i| i.enabled()).collect()
    }

    pub fn inverter_with_name(&self, name: &str) -> Option<Inverter> {
        self.inverters().into_iter().find(|i| i.name() == name)
    }

    pub fn dtu(&self) -> Dtu {
        self.lock().dtu.clone()
    }

    pub fn max_inverters(&self) -> usize {
        self.lock().max_inverters
    }

    pub fn loglevel(&self) -> String {
        self.lock().loglevel.clone()
    }
}

impl Config {
    pub fn new(file: String) -> Result<Self> {
        info!("Reading configuration from {}", file);
        let content = std::fs::read_to_string(&file)
            .map_err(|err| anyhow!("config.rs:error reading {}: {}", file, err))?;

        let config = Self::from_yaml(&content)?;

        info!("Configuration loaded successfully:");
        info!("  DTU address: {:#010x}", config.dtu.address);
        info!(
            "  Inverters: {} configured, {} enabled (max {})",
            config.inverters.len(),
            config.inverters.iter().filter(|i| i.enabled).count(),
            config.max_inverters
        );
        for (i, inv) in config.inverters.iter().enumerate() {
            info!("    Inverter[{}]:", i);
            info!("      Enabled: {}", inv.enabled);
            info!("      Name: {}", inv.name);
            info!("      Type: {}", inv.inverter_type);
            info!("      Serial: {}", inv.serial);
        }
        info!("  Log Level: {}", config.loglevel);

        Ok(config)
    }

    pub fn from_yaml(content: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(content)
            .map_err(|err| anyhow!("config.rs:error parsing config: {}", err))?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.dtu.address == 0 {
            bail!("config.rs:dtu.address cannot be 0");
        }

        if log::LevelFilter::from_str(&self.loglevel).is_err() {
            bail!("config.rs:invalid loglevel {:?}", self.loglevel);
        }

        let enabled: Vec<&Inverter> = self.inverters.iter().filter(|i| i.enabled).collect();
        if enabled.len() > self.max_inverters {
            bail!(
                "config.rs:{} inverters enabled but max_inverters is {}",
                enabled.len(),
                self.max_inverters
            );
        }

        let mut serials = HashSet::new();
        for (i, inv) in enabled.iter().enumerate() {
            if inv.name.is_empty() {
                bail!("config.rs:inverter[{}].name cannot be empty", i);
            }
            if inv.name.len() > MAX_NAME_LENGTH {
                bail!(
                    "config.rs:inverter[{}].name {:?} is longer than {} bytes",
                    i,
                    inv.name,
                    MAX_NAME_LENGTH
                );
            }
            if !serials.insert(inv.serial) {
                bail!("config.rs:inverter[{}].serial {} is used twice", i, inv.serial);
            }
        }

        Ok(())
    }

    fn default_max_inverters() -> usize {
        crate::registry::MAX_NUM_INVERTERS
    }

    fn default_enabled() -> bool {
        true
    }

    fn default_loglevel() -> String {
        "info".to_string()
    }
}

fn de_address<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    Utils::parse_u32(&s).map_err(serde::de::Error::custom)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const YAML: &str = r#"
loglevel: debug
dtu:
  address: "0x78563412"
inverters:
  - name: HM-600.1
    type: HM600
    serial: "114172220049"
  - name: roof
    type: hm-1500
    serial: "116180216223"
    enabled: false
"#;

    #[test]
    fn loads_from_file() -> Result<()> {
        let mut file = NamedTempFile::new()?;
        file.write_all(YAML.as_bytes())?;

        let config = ConfigWrapper::new(file.path().to_string_lossy().to_string())?;

        assert_eq!(config.dtu().address(), 0x78563412);
        assert_eq!(config.loglevel(), "debug");
        assert_eq!(config.max_inverters(), 3);
        assert_eq!(config.inverters().len(), 2);

        let enabled = config.enabled_inverters();
        assert_eq!(enabled.len(), 1);
        assert_eq!(enabled[0].name(), "HM-600.1");
        assert_eq!(enabled[0].inverter_type(), InverterType::Hm600);
        assert_eq!(enabled[0].serial(), Serial::new(0x114172220049));

        let roof = config.inverter_with_name("roof").unwrap();
        assert_eq!(roof.inverter_type(), InverterType::Hm1200);

        Ok(())
    }

    #[test]
    fn missing_file() {
        assert!(Config::new("/nonexistent/hm-dtu.yaml".to_string()).is_err());
    }

    #[test]
    fn rejects_unknown_type() {
        let yaml = YAML.replace("type: HM600", "type: HM2000");
        assert!(Config::from_yaml(&yaml).is_err());
    }

    #[test]
    fn rejects_zero_dtu_address() {
        let yaml = YAML.replace("0x78563412", "0");
        assert!(Config::from_yaml(&yaml).is_err());
    }

    #[test]
    fn rejects_long_name() {
        let yaml = YAML.replace("HM-600.1", "a-very-long-inverter-name");
        assert!(Config::from_yaml(&yaml).is_err());

        // 16 bytes, one more than the firmware record has room for
        let yaml = YAML.replace("HM-600.1", "HM-1500.rooftop1");
        assert!(Config::from_yaml(&yaml).is_err());

        let yaml = YAML.replace("HM-600.1", "HM-1500.rooftop");
        assert!(Config::from_yaml(&yaml).is_ok());
    }

    #[test]
    fn rejects_duplicate_serial() {
        let yaml = YAML.replace("116180216223", "114172220049").replace("enabled: false", "enabled: true");
        assert!(Config::from_yaml(&yaml).is_err());
    }

    #[test]
    fn rejects_too_many_inverters() {
        let yaml = format!("{}max_inverters: 0\n", YAML);
        assert!(Config::from_yaml(&yaml).is_err());
    }
}
