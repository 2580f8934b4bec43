//! Shared lookup tables: one carrier cycle of cos/sin and the receive
//! antenna gain pattern.

use std::f64::consts::PI;
use std::sync::LazyLock;

use crate::utils::consts::CARRIER_TABLE_AMPLITUDE;

/// Entries per carrier cycle. The top 9 bits of the phase accumulator
/// select one.
pub const CARRIER_TABLE_LEN: usize = 512;

/// Antenna attenuation (dB) by off-boresight angle in 5 degree steps,
/// i.e. index 0 is zenith (90 deg elevation), index 18 the horizon.
const ANTENNA_PATTERN_DB: [f64; 19] = [
    0.00, 0.00, 0.22, 0.44, 0.67, 1.11, 1.56, 2.00, 2.44, 2.89, 3.56, 4.22,
    4.89, 5.56, 6.22, 6.89, 7.56, 8.22, 8.89,
];

static TABLES: LazyLock<LookupTables> = LazyLock::new(LookupTables::new);

#[derive(Debug)]
pub struct LookupTables {
    pub cos: [i32; CARRIER_TABLE_LEN],
    pub sin: [i32; CARRIER_TABLE_LEN],
    pub antenna: [f64; ANTENNA_PATTERN_DB.len()],
}

impl LookupTables {
    fn new() -> Self {
        let mut cos = [0; CARRIER_TABLE_LEN];
        let mut sin = [0; CARRIER_TABLE_LEN];
        for k in 0..CARRIER_TABLE_LEN {
            let phase = 2.0 * PI * k as f64 / CARRIER_TABLE_LEN as f64;
            cos[k] = (CARRIER_TABLE_AMPLITUDE * phase.cos()).round() as i32;
            sin[k] = (CARRIER_TABLE_AMPLITUDE * phase.sin()).round() as i32;
        }

        let antenna = ANTENNA_PATTERN_DB.map(|db| 10f64.powf(-db / 20.0));

        Self { cos, sin, antenna }
    }

    /// Process-wide tables, built on first use.
    pub fn shared() -> &'static LookupTables {
        &TABLES
    }

    /// Table index for a carrier phase accumulator value.
    #[inline]
    pub fn carrier_index(phase: u32) -> usize {
        ((phase >> 23) & 0x1FF) as usize
    }

    /// Antenna bucket for an elevation angle in degrees, and whether it had
    /// to be clamped into the table.
    pub fn antenna_index(&self, elevation: f64) -> (usize, bool) {
        let raw = ((90.0 - elevation) / 5.0).floor();
        let last = self.antenna.len() - 1;
        if raw < 0.0 {
            (0, true)
        } else if raw > last as f64 {
            (last, true)
        } else {
            (raw as usize, false)
        }
    }

    pub fn antenna_gain(&self, elevation: f64) -> f64 {
        self.antenna[self.antenna_index(elevation).0]
    }
}
