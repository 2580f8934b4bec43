use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use byteorder::{LittleEndian, WriteBytesExt};

use crate::signal::IqSample;

/// On-disk sample layout.
#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum SampleFormat {
    /// Interleaved signed 8-bit I/Q (16-bit value >> 4)
    Iq8,
    /// Interleaved signed 16-bit little-endian I/Q
    Iq16,
    /// Stereo 16-bit WAV, I on the left channel and Q on the right
    Wav,
}

impl SampleFormat {
    pub fn bytes_per_sample(&self) -> usize {
        match self {
            SampleFormat::Iq8 => 2,
            SampleFormat::Iq16 | SampleFormat::Wav => 4,
        }
    }
}

pub fn pack_iq16(samples: &[IqSample]) -> Vec<u8> {
    let mut out = Vec::with_capacity(samples.len() * 4);
    for s in samples {
        // writes into a Vec cannot fail
        let _ = out.write_i16::<LittleEndian>(s.i);
        let _ = out.write_i16::<LittleEndian>(s.q);
    }
    out
}

pub fn pack_iq8(samples: &[IqSample]) -> Vec<u8> {
    let mut out = Vec::with_capacity(samples.len() * 2);
    for s in samples {
        let (i, q) = s.to_iq8();
        let _ = out.write_i8(i);
        let _ = out.write_i8(q);
    }
    out
}

fn wav_error(err: hound::Error) -> io::Error {
    io::Error::other(err)
}

/// Destination for the composite sample stream.
pub enum IqSink {
    Raw {
        writer: Box<dyn Write + Send>,
        format: SampleFormat,
        written: u64,
    },
    Wav {
        writer: hound::WavWriter<BufWriter<File>>,
        written: u64,
    },
}

impl IqSink {
    /// Raw sink over any writer. WAV needs a seekable file, see [`IqSink::create`].
    pub fn from_writer(writer: Box<dyn Write + Send>, format: SampleFormat) -> io::Result<Self> {
        if format == SampleFormat::Wav {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                "WAV output requires a file path",
            ));
        }
        Ok(IqSink::Raw {
            writer,
            format,
            written: 0,
        })
    }

    /// Open `output` ("-" for stdout) in the given format.
    pub fn create(output: &str, format: SampleFormat, sample_rate: u32) -> io::Result<Self> {
        if output == "-" {
            return Self::from_writer(Box::new(io::stdout()), format);
        }

        let path = Path::new(output);
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        match format {
            SampleFormat::Wav => {
                let spec = hound::WavSpec {
                    channels: 2,
                    sample_rate,
                    bits_per_sample: 16,
                    sample_format: hound::SampleFormat::Int,
                };
                let writer = hound::WavWriter::create(path, spec).map_err(wav_error)?;
                Ok(IqSink::Wav { writer, written: 0 })
            }
            _ => Self::from_writer(Box::new(BufWriter::new(File::create(path)?)), format),
        }
    }

    pub fn write_block(&mut self, samples: &[IqSample]) -> io::Result<()> {
        match self {
            IqSink::Raw {
                writer,
                format,
                written,
            } => {
                let bytes = match format {
                    SampleFormat::Iq8 => pack_iq8(samples),
                    _ => pack_iq16(samples),
                };
                writer.write_all(&bytes)?;
                *written += samples.len() as u64;
            }
            IqSink::Wav { writer, written } => {
                for s in samples {
                    writer.write_sample(s.i).map_err(wav_error)?;
                    writer.write_sample(s.q).map_err(wav_error)?;
                }
                *written += samples.len() as u64;
            }
        }
        Ok(())
    }

    pub fn finish(self) -> io::Result<u64> {
        match self {
            IqSink::Raw {
                mut writer,
                written,
                ..
            } => {
                writer.flush()?;
                Ok(written)
            }
            IqSink::Wav { writer, written } => {
                writer.finalize().map_err(wav_error)?;
                Ok(written)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    /// Writer that keeps its bytes reachable after the sink is consumed.
    #[derive(Clone, Default)]
    struct SharedBuf(Arc<Mutex<Vec<u8>>>);

    impl Write for SharedBuf {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }
        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    fn samples() -> Vec<IqSample> {
        vec![
            IqSample { i: 0x0102, q: -2 },
            IqSample { i: 250, q: -250 },
        ]
    }

    #[test]
    fn test_pack_iq16_little_endian() {
        let bytes = pack_iq16(&samples());
        assert_eq!(bytes.len(), 8);
        assert_eq!(&bytes[..4], &[0x02, 0x01, 0xfe, 0xff]);
        assert_eq!(i16::from_le_bytes([bytes[4], bytes[5]]), 250);
    }

    #[test]
    fn test_pack_iq8_shifts_by_four() {
        let bytes = pack_iq8(&samples());
        assert_eq!(bytes, vec![0x10, 0xff, 15, (-16i8) as u8]);
    }

    #[test]
    fn test_raw_sink_counts_and_flushes() {
        let buf = SharedBuf::default();
        let mut sink = IqSink::from_writer(Box::new(buf.clone()), SampleFormat::Iq16).unwrap();
        sink.write_block(&samples()).unwrap();
        sink.write_block(&samples()[..1]).unwrap();
        assert_eq!(sink.finish().unwrap(), 3);
        assert_eq!(buf.0.lock().unwrap().len(), 3 * SampleFormat::Iq16.bytes_per_sample());
    }

    #[test]
    fn test_wav_requires_a_file() {
        assert!(IqSink::from_writer(Box::new(io::sink()), SampleFormat::Wav).is_err());
    }

    #[test]
    fn test_wav_round_trip() {
        let path = std::env::temp_dir().join(format!("b1i_sink_{}.wav", std::process::id()));
        let mut sink =
            IqSink::create(path.to_str().unwrap(), SampleFormat::Wav, 2_046_000).unwrap();
        sink.write_block(&samples()).unwrap();
        assert_eq!(sink.finish().unwrap(), 2);

        let reader = hound::WavReader::open(&path).unwrap();
        assert_eq!(reader.spec().channels, 2);
        assert_eq!(reader.spec().sample_rate, 2_046_000);
        let values: Vec<i16> = reader.into_samples::<i16>().map(|s| s.unwrap()).collect();
        assert_eq!(values, vec![0x0102, -2, 250, -250]);
        let _ = std::fs::remove_file(path);
    }
}
