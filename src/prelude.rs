pub use anyhow::{anyhow, bail, Result};
pub use log::{debug, error, info, trace, warn};

pub use crate::config::{self, Config, ConfigWrapper};
pub use crate::error::Error;
pub use crate::hm;
pub use crate::options::Options;
pub use crate::unixtime::UnixTime;
pub use crate::utils::Utils;
