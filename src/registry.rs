use crate::prelude::*;

use crate::hm::inverter::{default_radio_id, Inverter, RadioIdFn, Serial};
use crate::hm::layout::InverterType;

pub const MAX_NUM_INVERTERS: usize = 3;

/// Inverters known to this DTU. Ids are small integers handed out lowest
/// free first, so a removed inverter's id is reused by the next one added.
pub struct Registry {
    inverters: Vec<Inverter>,
    max: usize,
    radio_id: RadioIdFn,
}

impl Registry {
    pub fn new(max: usize, radio_id: RadioIdFn) -> Self {
        Self {
            inverters: Vec::with_capacity(max),
            max,
            radio_id,
        }
    }

    /// Registry of enabled inverters from the config, using the default
    /// serial conversion.
    pub fn from_config(config: &ConfigWrapper) -> Result<Self> {
        let mut registry = Self::new(config.max_inverters(), default_radio_id);

        for inverter in config.enabled_inverters() {
            let added = registry
                .add(inverter.name(), inverter.inverter_type(), inverter.serial())
                .map_err(|err| anyhow!("registry.rs:{}", err))?;
            info!(
                "registered inverter {} {:?} ({}) serial {} radio address {}",
                added.id, added.name, added.inverter_type, added.serial, added.radio_address
            );
        }

        Ok(registry)
    }

    pub fn add(
        &mut self,
        name: &str,
        inverter_type: InverterType,
        serial: Serial,
    ) -> Result<&Inverter, Error> {
        if self.inverters.len() >= self.max {
            return Err(Error::RegistryFull(self.max));
        }
        if self.find_by_serial(serial).is_some() {
            return Err(Error::DuplicateSerial(serial));
        }

        let id = self.next_id().ok_or(Error::RegistryFull(self.max))?;
        let inverter = Inverter::new(id, name, inverter_type, serial, self.radio_id)?;
        debug!("adding inverter {} ({}) as id {}", inverter.name, inverter.serial, id);

        // keep sorted by id
        let pos = self
            .inverters
            .iter()
            .position(|i| i.id > id)
            .unwrap_or(self.inverters.len());
        self.inverters.insert(pos, inverter);

        Ok(&self.inverters[pos])
    }

    pub fn remove(&mut self, id: u8) -> Option<Inverter> {
        let pos = self.inverters.iter().position(|i| i.id == id)?;
        let inverter = self.inverters.remove(pos);
        debug!("removed inverter {} ({})", inverter.name, inverter.serial);
        Some(inverter)
    }

    pub fn get(&self, id: u8) -> Option<&Inverter> {
        self.inverters.iter().find(|i| i.id == id)
    }

    pub fn find_by_serial(&self, serial: Serial) -> Option<&Inverter> {
        self.inverters.iter().find(|i| i.serial == serial)
    }

    pub fn find_by_name(&self, name: &str) -> Option<&Inverter> {
        self.inverters.iter().find(|i| i.name == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Inverter> {
        self.inverters.iter()
    }

    pub fn len(&self) -> usize {
        self.inverters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inverters.is_empty()
    }

    pub fn max(&self) -> usize {
        self.max
    }

    fn next_id(&self) -> Option<u8> {
        (0..=u8::MAX).find(|id| self.get(*id).is_none())
    }
}
