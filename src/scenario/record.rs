use std::fmt;
use std::str::FromStr;

use crate::error::DecodeError;
use crate::signal::bits::BitSequence;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SatType {
    Geo,
    Igso,
    Meo,
}

impl SatType {
    /// Numeric tag used by the scenario generator: 1 = GEO, 2 = IGSO, 3 = MEO.
    pub fn from_code(code: i64) -> Result<Self, DecodeError> {
        match code {
            1 => Ok(SatType::Geo),
            2 => Ok(SatType::Igso),
            3 => Ok(SatType::Meo),
            other => Err(DecodeError::UnknownSatelliteType(other.to_string())),
        }
    }
}

impl FromStr for SatType {
    type Err = DecodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "GEO" => Ok(SatType::Geo),
            "IGSO" => Ok(SatType::Igso),
            "MEO" => Ok(SatType::Meo),
            _ => Err(DecodeError::UnknownSatelliteType(s.to_string())),
        }
    }
}

impl fmt::Display for SatType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SatType::Geo => "GEO",
            SatType::Igso => "IGSO",
            SatType::Meo => "MEO",
        };
        f.pad(name)
    }
}

/// Fields carried only by extended satellite records.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RecordExtension {
    pub prn_number: Option<u32>,
    pub pilot_code: Option<BitSequence>,
}

/// What a channel needs to know about one satellite.
pub trait SatelliteRecord: fmt::Debug {
    /// Navigation message bits
    fn data(&self) -> &BitSequence;
    /// Ranging code chips
    fn ranging_code(&self) -> &BitSequence;
    /// Pseudorange delay [s], one reading per macro step
    fn delay_series(&self) -> &[f64];
    /// Elevation [deg], one reading per macro step
    fn elevation_series(&self) -> &[f64];
    /// Reference delay for the initial carrier phase [s]
    fn ref_delay(&self) -> f64;
    fn sat_type(&self) -> SatType;

    fn extension(&self) -> Option<&RecordExtension> {
        None
    }
}

/// A BDS-2 B1I satellite record.
#[derive(Clone, Debug, PartialEq)]
pub struct Bds2Satellite {
    pub data: BitSequence,
    pub prn: BitSequence,
    pub sat_type: SatType,
    pub delay: Vec<f64>,
    pub elevation: Vec<f64>,
    pub ref_delay: f64,
    pub extension: Option<RecordExtension>,
}

impl Bds2Satellite {
    /// Decode a record from its hex data and octal ranging code strings.
    pub fn new(
        data: &str,
        prn: &str,
        sat_type: SatType,
        delay: Vec<f64>,
        elevation: Vec<f64>,
        ref_delay: f64,
    ) -> Result<Self, DecodeError> {
        Ok(Self {
            data: BitSequence::from_hex(data)?,
            prn: BitSequence::from_octal(prn)?,
            sat_type,
            delay,
            elevation,
            ref_delay,
            extension: None,
        })
    }

    pub fn with_extension(mut self, extension: RecordExtension) -> Self {
        self.extension = Some(extension);
        self
    }
}

impl SatelliteRecord for Bds2Satellite {
    fn data(&self) -> &BitSequence {
        &self.data
    }

    fn ranging_code(&self) -> &BitSequence {
        &self.prn
    }

    fn delay_series(&self) -> &[f64] {
        &self.delay
    }

    fn elevation_series(&self) -> &[f64] {
        &self.elevation
    }

    fn ref_delay(&self) -> f64 {
        self.ref_delay
    }

    fn sat_type(&self) -> SatType {
        self.sat_type
    }

    fn extension(&self) -> Option<&RecordExtension> {
        self.extension.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sat_type_tags() {
        assert_eq!(SatType::from_code(1), Ok(SatType::Geo));
        assert_eq!(SatType::from_code(3), Ok(SatType::Meo));
        assert_eq!(
            SatType::from_code(7),
            Err(DecodeError::UnknownSatelliteType("7".to_string()))
        );
        assert_eq!("igso".parse::<SatType>(), Ok(SatType::Igso));
        assert!("LEO".parse::<SatType>().is_err());
        assert_eq!(SatType::Geo.to_string(), "GEO");
    }

    #[test]
    fn test_record_decodes_symbol_strings() {
        let sat = Bds2Satellite::new("f0", "17", SatType::Meo, vec![0.07], vec![45.0], 0.07)
            .unwrap();
        assert_eq!(sat.data().len(), 8);
        assert_eq!(sat.ranging_code().len(), 6);
        assert!(sat.extension().is_none());

        let record: &dyn SatelliteRecord = &sat.with_extension(RecordExtension {
            prn_number: Some(6),
            pilot_code: None,
        });
        assert_eq!(record.extension().and_then(|e| e.prn_number), Some(6));
    }

    #[test]
    fn test_bad_ranging_code_is_a_decode_error() {
        let err = Bds2Satellite::new("f0", "19", SatType::Meo, vec![0.07], vec![45.0], 0.07)
            .unwrap_err();
        assert!(matches!(err, DecodeError::InvalidSymbol { symbol: '9', .. }));
    }
}
