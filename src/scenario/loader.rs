use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use serde::Deserialize;
use tracing::info;

use crate::error::{ConfigError, DecodeError, ScenarioError};
use crate::scenario::record::{Bds2Satellite, RecordExtension, SatType, SatelliteRecord};
use crate::signal::bits::BitSequence;
use crate::signal::{ChannelSimulator, LookupTables, SignalConfig};

#[derive(Deserialize)]
#[serde(untagged)]
enum RawSatType {
    Code(i64),
    Name(String),
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawRefDelay {
    Scalar(f64),
    Series(Vec<f64>),
}

/// One element of the scenario JSON array.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawRecord {
    data: String,
    prn: String,
    #[serde(rename = "type", default)]
    sat_type: Option<RawSatType>,
    delay: Vec<f64>,
    ref_delay: RawRefDelay,
    elevation: Vec<f64>,
    #[serde(default)]
    prn_number: Option<u32>,
    #[serde(default)]
    pilot: Option<String>,
}

impl RawRecord {
    fn into_record(self, index: usize) -> Result<Bds2Satellite, ScenarioError> {
        let decode = |source: DecodeError| ScenarioError::Decode { index, source };

        if self.delay.is_empty() {
            return Err(ScenarioError::EmptySeries { index, field: "delay" });
        }
        if let Some((step, &delay)) = self
            .delay
            .iter()
            .enumerate()
            .find(|(_, d)| !d.is_finite() || **d <= 0.0)
        {
            return Err(ScenarioError::InvalidDelay { index, step, delay });
        }
        if self.delay.len() != self.elevation.len() {
            return Err(ScenarioError::SeriesMismatch {
                index,
                delay: self.delay.len(),
                elevation: self.elevation.len(),
            });
        }

        let ref_delay = match self.ref_delay {
            RawRefDelay::Scalar(value) => value,
            RawRefDelay::Series(values) => *values
                .first()
                .ok_or(ScenarioError::EmptySeries {
                    index,
                    field: "refDelay",
                })?,
        };

        // the generator omits the tag for MEO-only scenarios
        let sat_type = match self.sat_type {
            None => SatType::Meo,
            Some(RawSatType::Code(code)) => SatType::from_code(code).map_err(decode)?,
            Some(RawSatType::Name(name)) => name.parse().map_err(decode)?,
        };

        let satellite = Bds2Satellite::new(
            &self.data,
            &self.prn,
            sat_type,
            self.delay,
            self.elevation,
            ref_delay,
        )
        .map_err(decode)?;

        if self.prn_number.is_none() && self.pilot.is_none() {
            return Ok(satellite);
        }
        let pilot_code = self
            .pilot
            .as_deref()
            .map(BitSequence::from_octal)
            .transpose()
            .map_err(decode)?;
        Ok(satellite.with_extension(RecordExtension {
            prn_number: self.prn_number,
            pilot_code,
        }))
    }
}

/// All satellites of one simulation run.
#[derive(Debug)]
pub struct Scenario {
    satellites: Vec<Box<dyn SatelliteRecord + Send + Sync>>,
}

impl Scenario {
    pub fn new(satellites: Vec<Box<dyn SatelliteRecord + Send + Sync>>) -> Self {
        Self { satellites }
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self, ScenarioError> {
        let raw: Vec<RawRecord> = serde_json::from_reader(reader)?;
        if raw.is_empty() {
            return Err(ScenarioError::NoSatellites);
        }

        let mut satellites: Vec<Box<dyn SatelliteRecord + Send + Sync>> =
            Vec::with_capacity(raw.len());
        for (index, record) in raw.into_iter().enumerate() {
            satellites.push(Box::new(record.into_record(index)?));
        }

        info!("Loaded scenario with {} satellites", satellites.len());
        Ok(Self { satellites })
    }

    pub fn from_json_str(json: &str) -> Result<Self, ScenarioError> {
        Self::from_reader(json.as_bytes())
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ScenarioError> {
        let file = File::open(path)?;
        Self::from_reader(BufReader::new(file))
    }

    pub fn len(&self) -> usize {
        self.satellites.len()
    }

    pub fn is_empty(&self) -> bool {
        self.satellites.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &(dyn SatelliteRecord + Send + Sync)> {
        self.satellites.iter().map(|s| s.as_ref())
    }

    /// Longest time series, in macro steps.
    pub fn series_len(&self) -> usize {
        self.iter()
            .map(|s| s.delay_series().len())
            .max()
            .unwrap_or(0)
    }

    /// Build one channel per satellite, in scenario order.
    pub fn channels(
        &self,
        config: &SignalConfig,
        tables: &'static LookupTables,
    ) -> Result<Vec<ChannelSimulator>, ConfigError> {
        self.iter()
            .enumerate()
            .map(|(id, record)| ChannelSimulator::from_record(id, record, config, tables))
            .collect()
    }
}
