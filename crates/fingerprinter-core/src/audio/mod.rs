use crate::error::OpenError;
use std::fs::File;
use std::io;
use std::path::Path;
use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::{Decoder, DecoderOptions, CODEC_TYPE_NULL};
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::{FormatOptions, FormatReader};
use symphonia::core::units::TimeBase;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;
use tracing::{debug, warn};

/// Counters for one file's decode loop.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct DecodeStats {
    pub packets_decoded: u64,
    /// Packets that failed to decode and were stepped over.
    pub packets_skipped: u64,
    /// Packets that decoded to no samples.
    pub empty_chunks: u64,
    pub samples_fed: u64,
}

/// Decoded audio from the first playable track of a media file.
pub struct AudioStream {
    format: Box<dyn FormatReader>,
    decoder: Box<dyn Decoder>,
    track_id: u32,
    sample_rate: u32,
    channels: u32,
    time_base: Option<TimeBase>,
    /// Whole seconds, once known. Containers without a frame count leave it
    /// unset until the packets have been read.
    duration_secs: Option<u32>,
    /// End timestamp of the furthest packet seen on our track.
    end_ts: u64,
    sample_buf: Option<SampleBuffer<i16>>,
    stats: DecodeStats,
    ended: bool,
}

impl AudioStream {
    /// Open and probe `path`, selecting the first track with a known codec.
    pub fn open(path: &Path) -> Result<Self, OpenError> {
        let file = File::open(path)?;
        let mss = MediaSourceStream::new(Box::new(file), Default::default());

        let mut hint = Hint::new();
        if let Some(ext) = path.extension().and_then(|e| e.to_str()) {
            hint.with_extension(ext);
        }

        let probed = symphonia::default::get_probe()
            .format(
                &hint,
                mss,
                &FormatOptions::default(),
                &MetadataOptions::default(),
            )
            .map_err(|e| match e {
                SymphoniaError::IoError(io_err) if io_err.kind() != io::ErrorKind::UnexpectedEof => {
                    OpenError::Io(io_err)
                }
                other => OpenError::UnsupportedContainer(other.to_string()),
            })?;
        let format = probed.format;

        let track = format
            .tracks()
            .iter()
            .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
            .ok_or(OpenError::NoAudioStream)?;
        let params = track.codec_params.clone();
        let track_id = track.id;

        let channels = params.channels.map(|c| c.count() as u32).unwrap_or(0);
        if channels == 0 {
            return Err(OpenError::NoChannels);
        }

        // Every symphonia sample format converts to i16; the stream is only
        // unusable when it cannot say how fast its samples run.
        let sample_rate = params
            .sample_rate
            .filter(|rate| *rate > 0)
            .ok_or_else(|| OpenError::UnsupportedSampleFormat("missing sample rate".to_string()))?;

        let decoder = symphonia::default::get_codecs()
            .make(&params, &DecoderOptions::default())
            .map_err(|e| OpenError::UnsupportedCodec(e.to_string()))?;

        let time_base = params.time_base;
        let duration_secs = params
            .n_frames
            .map(|frames| ts_to_secs(frames, time_base, sample_rate));

        debug!(
            "Opened {}: {} Hz, {} channel(s), {:?}s",
            path.display(),
            sample_rate,
            channels,
            duration_secs
        );

        Ok(Self {
            format,
            decoder,
            track_id,
            sample_rate,
            channels,
            time_base,
            duration_secs,
            end_ts: 0,
            sample_buf: None,
            stats: DecodeStats::default(),
            ended: false,
        })
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn channels(&self) -> u32 {
        self.channels
    }

    /// Stream duration in whole seconds.
    ///
    /// Taken from the container's frame count when it has one. Otherwise the
    /// packets not yet consumed are read without decoding and the end of the
    /// last one is used, which ends the stream.
    pub fn duration_secs(&mut self) -> u32 {
        if let Some(secs) = self.duration_secs {
            return secs;
        }
        while let Ok(packet) = self.format.next_packet() {
            if packet.track_id() == self.track_id {
                self.note_packet_end(packet.ts(), packet.dur());
            }
        }
        self.ended = true;

        let secs = ts_to_secs(self.end_ts, self.time_base, self.sample_rate);
        debug!("No frame count in container, estimated {}s from packet timestamps", secs);
        self.duration_secs = Some(secs);
        secs
    }

    fn note_packet_end(&mut self, ts: u64, dur: u64) {
        self.end_ts = self.end_ts.max(ts.saturating_add(dur));
    }

    pub fn stats(&self) -> DecodeStats {
        self.stats
    }

    pub(crate) fn record_fed(&mut self, samples: usize) {
        self.stats.samples_fed += samples as u64;
    }

    /// Next chunk of interleaved samples, or `None` once the stream is over.
    ///
    /// Packets that fail to decode or decode to nothing are skipped. Any
    /// other reader or decoder failure ends the stream early.
    pub fn next_chunk(&mut self) -> Option<&[i16]> {
        loop {
            if self.ended {
                return None;
            }

            let packet = match self.format.next_packet() {
                Ok(packet) => packet,
                Err(SymphoniaError::IoError(e)) if e.kind() == io::ErrorKind::UnexpectedEof => {
                    self.ended = true;
                    return None;
                }
                Err(e) => {
                    warn!("Stopping decode early: {}", e);
                    self.ended = true;
                    return None;
                }
            };

            if packet.track_id() != self.track_id {
                continue;
            }
            self.note_packet_end(packet.ts(), packet.dur());

            let decoded = match self.decoder.decode(&packet) {
                Ok(decoded) => decoded,
                Err(SymphoniaError::DecodeError(e)) => {
                    warn!("Skipping undecodable packet: {}", e);
                    self.stats.packets_skipped += 1;
                    continue;
                }
                Err(e) => {
                    warn!("Stopping decode early: {}", e);
                    self.ended = true;
                    return None;
                }
            };
            self.stats.packets_decoded += 1;

            if decoded.frames() == 0 {
                debug!("Decoder returned an empty chunk, skipping");
                self.stats.empty_chunks += 1;
                continue;
            }

            let spec = *decoded.spec();
            let frames = decoded.capacity() as u64;
            let needed = decoded.capacity() * spec.channels.count();
            if self
                .sample_buf
                .as_ref()
                .map_or(true, |buf| buf.capacity() < needed)
            {
                self.sample_buf = Some(SampleBuffer::<i16>::new(frames, spec));
            }
            let buf = self
                .sample_buf
                .get_or_insert_with(|| SampleBuffer::<i16>::new(frames, spec));
            buf.copy_interleaved_ref(decoded);
            return Some(buf.samples());
        }
    }
}

fn ts_to_secs(ts: u64, time_base: Option<TimeBase>, sample_rate: u32) -> u32 {
    let secs = match time_base {
        Some(tb) => tb.calc_time(ts).seconds,
        None => ts / u64::from(sample_rate),
    };
    u32::try_from(secs).unwrap_or(u32::MAX)
}
