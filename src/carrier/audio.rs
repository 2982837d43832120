//! Audio carriers.
//!
//! Uncompressed integer-PCM WAV only. Every sample of every channel is an
//! addressable cell; the cell width follows the source sample width (8-bit
//! samples become u8 cells, 16-bit u16, 24- and 32-bit u32). The permutation
//! seed is the frame count, which the container discloses to both sides.

use hound::{SampleFormat, WavReader, WavSpec, WavWriter};
use std::io::{Cursor, Read, Seek, Write};
use std::path::Path;

use super::{Carrier, CarrierError};

/// Sample storage, width-matched to the source WAV.
enum SampleBuf {
    B8(Vec<u8>),
    B16(Vec<u16>),
    B32(Vec<u32>),
}

/// An audio carrier: PCM samples plus the spec to rewrap them with.
pub struct AudioCarrier {
    spec: WavSpec,
    frames: u32,
    cells: SampleBuf,
}

impl AudioCarrier {
    /// Loads a carrier from a WAV file.
    pub fn from_file(path: &Path) -> Result<Self, CarrierError> {
        let reader =
            WavReader::open(path).map_err(|e| CarrierError::LoadFailed(e.to_string()))?;
        Self::from_reader(reader)
    }

    /// Loads a carrier from WAV bytes.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, CarrierError> {
        let reader = WavReader::new(Cursor::new(bytes))
            .map_err(|e| CarrierError::LoadFailed(e.to_string()))?;
        Self::from_reader(reader)
    }

    fn from_reader<R: Read>(mut reader: WavReader<R>) -> Result<Self, CarrierError> {
        let spec = reader.spec();
        if spec.sample_format != SampleFormat::Int {
            return Err(CarrierError::UnsupportedFormat(
                "float WAV samples".to_string(),
            ));
        }

        let frames = reader.duration();

        let cells = match spec.bits_per_sample {
            8 => SampleBuf::B8(
                collect_samples::<_, i8>(&mut reader)?
                    .into_iter()
                    .map(|s| s as u8)
                    .collect(),
            ),
            16 => SampleBuf::B16(
                collect_samples::<_, i16>(&mut reader)?
                    .into_iter()
                    .map(|s| s as u16)
                    .collect(),
            ),
            24 | 32 => SampleBuf::B32(
                collect_samples::<_, i32>(&mut reader)?
                    .into_iter()
                    .map(|s| s as u32)
                    .collect(),
            ),
            other => {
                return Err(CarrierError::UnsupportedFormat(format!(
                    "{other}-bit WAV samples"
                )))
            }
        };

        Ok(Self {
            spec,
            frames,
            cells,
        })
    }

    /// WAV format parameters (channels, rate, width) of the source.
    pub fn spec(&self) -> WavSpec {
        self.spec
    }

    /// Total sample count across all channels.
    pub fn sample_count(&self) -> usize {
        match &self.cells {
            SampleBuf::B8(v) => v.len(),
            SampleBuf::B16(v) => v.len(),
            SampleBuf::B32(v) => v.len(),
        }
    }

    /// Samples widened to f64, for quality measurement.
    pub fn samples_f64(&self) -> Vec<f64> {
        match &self.cells {
            SampleBuf::B8(v) => v.iter().map(|&s| f64::from(s)).collect(),
            SampleBuf::B16(v) => v.iter().map(|&s| f64::from(s)).collect(),
            SampleBuf::B32(v) => v.iter().map(|&s| f64::from(s)).collect(),
        }
    }

    /// Saves the carrier as a WAV file with the original spec.
    pub fn save(&self, path: &Path) -> Result<(), CarrierError> {
        let writer =
            WavWriter::create(path, self.spec).map_err(|e| CarrierError::SaveFailed(e.to_string()))?;
        self.write_samples(writer)
    }

    /// Rewraps the carrier into WAV bytes with the original spec.
    pub fn to_bytes(&self) -> Result<Vec<u8>, CarrierError> {
        let mut bytes = Vec::new();
        {
            let cursor = Cursor::new(&mut bytes);
            let writer = WavWriter::new(cursor, self.spec)
                .map_err(|e| CarrierError::SaveFailed(e.to_string()))?;
            self.write_samples(writer)?;
        }
        Ok(bytes)
    }

    fn write_samples<W: Write + Seek>(&self, mut writer: WavWriter<W>) -> Result<(), CarrierError> {
        let written = match &self.cells {
            SampleBuf::B8(v) => v
                .iter()
                .try_for_each(|&s| writer.write_sample(s as i8)),
            SampleBuf::B16(v) => v
                .iter()
                .try_for_each(|&s| writer.write_sample(s as i16)),
            SampleBuf::B32(v) => v
                .iter()
                .try_for_each(|&s| writer.write_sample(s as i32)),
        };
        written.map_err(|e| CarrierError::SaveFailed(e.to_string()))?;

        writer
            .finalize()
            .map_err(|e| CarrierError::SaveFailed(e.to_string()))
    }
}

impl Carrier for AudioCarrier {
    fn capacity(&self) -> usize {
        self.sample_count()
    }

    fn seed(&self) -> u64 {
        u64::from(self.frames)
    }

    fn lsb(&self, idx: usize) -> u8 {
        match &self.cells {
            SampleBuf::B8(v) => v[idx] & 1,
            SampleBuf::B16(v) => (v[idx] & 1) as u8,
            SampleBuf::B32(v) => (v[idx] & 1) as u8,
        }
    }

    fn mask_bit(&self, idx: usize) -> u8 {
        match &self.cells {
            SampleBuf::B8(v) => (v[idx] >> 1) & 1,
            SampleBuf::B16(v) => ((v[idx] >> 1) & 1) as u8,
            SampleBuf::B32(v) => ((v[idx] >> 1) & 1) as u8,
        }
    }

    fn flip_lsb(&mut self, idx: usize) {
        match &mut self.cells {
            SampleBuf::B8(v) => v[idx] ^= 1,
            SampleBuf::B16(v) => v[idx] ^= 1,
            SampleBuf::B32(v) => v[idx] ^= 1,
        }
    }
}

fn collect_samples<R: Read, S: hound::Sample>(
    reader: &mut WavReader<R>,
) -> Result<Vec<S>, CarrierError> {
    reader
        .samples::<S>()
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| CarrierError::LoadFailed(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stego;

    fn sine_wav(sample_count: usize, bits_per_sample: u16) -> Vec<u8> {
        let spec = WavSpec {
            channels: 1,
            sample_rate: 44_100,
            bits_per_sample,
            sample_format: SampleFormat::Int,
        };

        let mut bytes = Vec::new();
        {
            let mut writer = WavWriter::new(Cursor::new(&mut bytes), spec).unwrap();
            for i in 0..sample_count {
                let t = i as f64 / 44_100.0;
                let wave = f64::sin(2.0 * std::f64::consts::PI * 440.0 * t);
                match bits_per_sample {
                    8 => writer.write_sample((wave * 100.0) as i8).unwrap(),
                    16 => writer.write_sample((wave * 16_000.0) as i16).unwrap(),
                    _ => writer.write_sample((wave * 4_000_000.0) as i32).unwrap(),
                }
            }
            writer.finalize().unwrap();
        }
        bytes
    }

    #[test]
    fn capacity_and_seed() {
        let carrier = AudioCarrier::from_bytes(&sine_wav(10_000, 16)).unwrap();

        assert_eq!(carrier.capacity(), 10_000);
        assert_eq!(carrier.seed(), 10_000);
    }

    #[test]
    fn wav_reencode_preserves_cells_16bit() {
        let mut carrier = AudioCarrier::from_bytes(&sine_wav(10_000, 16)).unwrap();
        stego::embed(&mut carrier, b"wav cycle").unwrap();

        let bytes = carrier.to_bytes().unwrap();
        let reloaded = AudioCarrier::from_bytes(&bytes).unwrap();

        assert_eq!(reloaded.samples_f64(), carrier.samples_f64());
        assert_eq!(reloaded.spec(), carrier.spec());
    }

    #[test]
    fn wav_reencode_preserves_cells_8bit() {
        let mut carrier = AudioCarrier::from_bytes(&sine_wav(4_000, 8)).unwrap();
        stego::embed(&mut carrier, b"8-bit cycle").unwrap();

        let bytes = carrier.to_bytes().unwrap();
        let reloaded = AudioCarrier::from_bytes(&bytes).unwrap();

        assert_eq!(reloaded.samples_f64(), carrier.samples_f64());
    }

    #[test]
    fn wav_reencode_preserves_cells_24bit() {
        let mut carrier = AudioCarrier::from_bytes(&sine_wav(4_000, 24)).unwrap();
        stego::embed(&mut carrier, b"24-bit cycle").unwrap();

        let bytes = carrier.to_bytes().unwrap();
        let reloaded = AudioCarrier::from_bytes(&bytes).unwrap();

        assert_eq!(reloaded.samples_f64(), carrier.samples_f64());
    }

    #[test]
    fn stereo_counts_all_samples() {
        let spec = WavSpec {
            channels: 2,
            sample_rate: 8_000,
            bits_per_sample: 16,
            sample_format: SampleFormat::Int,
        };

        let mut bytes = Vec::new();
        {
            let mut writer = WavWriter::new(Cursor::new(&mut bytes), spec).unwrap();
            for i in 0..2_000i16 {
                writer.write_sample(i).unwrap();
                writer.write_sample(-i).unwrap();
            }
            writer.finalize().unwrap();
        }

        let carrier = AudioCarrier::from_bytes(&bytes).unwrap();
        // 2000 frames, two samples each; the seed counts frames only
        assert_eq!(carrier.capacity(), 4_000);
        assert_eq!(carrier.seed(), 2_000);
    }

    #[test]
    fn float_wav_is_rejected() {
        let spec = WavSpec {
            channels: 1,
            sample_rate: 44_100,
            bits_per_sample: 32,
            sample_format: SampleFormat::Float,
        };

        let mut bytes = Vec::new();
        {
            let mut writer = WavWriter::new(Cursor::new(&mut bytes), spec).unwrap();
            for i in 0..100 {
                writer.write_sample(i as f32 / 100.0).unwrap();
            }
            writer.finalize().unwrap();
        }

        let result = AudioCarrier::from_bytes(&bytes);
        assert!(matches!(result, Err(CarrierError::UnsupportedFormat(_))));
    }

    #[test]
    fn save_and_reload_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("carrier.wav");

        let mut carrier = AudioCarrier::from_bytes(&sine_wav(5_000, 16)).unwrap();
        stego::embed(&mut carrier, b"file cycle").unwrap();
        carrier.save(&path).unwrap();

        let reloaded = AudioCarrier::from_file(&path).unwrap();
        assert_eq!(reloaded.samples_f64(), carrier.samples_f64());
    }
}
