use serde::Serialize;

/// Running seconds counter stamped into time-sync frames.
///
/// Set once from a real clock, then advanced by an external one-second tick.
/// No internal locking; the owner serialises access through `&mut self`.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, PartialOrd, Ord, Hash, Serialize)]
pub struct UnixTime(u32);

impl UnixTime {
    pub fn new(ts: u32) -> Self {
        Self(ts)
    }

    pub fn now() -> Self {
        Self(u32::try_from(chrono::Utc::now().timestamp()).unwrap_or(0))
    }

    pub fn set(&mut self, ts: u32) {
        self.0 = ts;
    }

    pub fn tick(&mut self) {
        self.0 = self.0.wrapping_add(1);
    }

    pub fn get(&self) -> u32 {
        self.0
    }
}

impl From<u32> for UnixTime {
    fn from(ts: u32) -> Self {
        Self(ts)
    }
}

impl std::fmt::Display for UnixTime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
