use std::str::FromStr;
use std::time::Duration;

use anyhow::{Error, Result};

#[derive(Clone, Copy, Debug, PartialEq, PartialOrd)]
pub enum SpeedSetting {
    /// 1 sim second per real second
    Realtime,
    /// 5 sim seconds per real second
    Fast,
    /// 30 sim seconds per real second
    Faster,
    /// 1 sim hour per real second
    Fastest,
}

impl SpeedSetting {
    pub fn multiplier(self) -> f64 {
        match self {
            SpeedSetting::Realtime => 1.0,
            SpeedSetting::Fast => 5.0,
            SpeedSetting::Faster => 30.0,
            SpeedSetting::Fastest => 3600.0,
        }
    }

    /// How long to wait between two ticks `tick_len_ms` of sim time apart
    pub fn real_delay(self, tick_len_ms: i64) -> Duration {
        Duration::from_secs_f64(tick_len_ms.max(0) as f64 / 1000.0 / self.multiplier())
    }
}

impl FromStr for SpeedSetting {
    type Err = Error;

    fn from_str(x: &str) -> Result<Self> {
        match x {
            "realtime" => Ok(SpeedSetting::Realtime),
            "fast" => Ok(SpeedSetting::Fast),
            "faster" => Ok(SpeedSetting::Faster),
            "fastest" => Ok(SpeedSetting::Fastest),
            _ => bail!("Unknown speed {x}; use realtime, fast, faster, or fastest"),
        }
    }
}
