//! Full pipeline against a voice written to disk: timeline, unit index and request files.

use std::cell::RefCell;
use std::path::Path;
use std::rc::Rc;

use unit_concatenator::audio::wav::write_wav;
use unit_concatenator::audio::{AudioFormat, AudioStream};
use unit_concatenator::concat::{PeriodResynthesizer, PitchSync, PitchSyncInput, Resynthesizer, ScaleLimits};
use unit_concatenator::corpus::{Datagram, MemoryTimeline, Request, RequestEntry, SelectedUnit, Target, UnitIndex, UnitIndexFile, UnitRecord};
use unit_concatenator::{Error, Strategy, UnitConcatenator};

const TIMELINE_RATE: u32 = 16000;
const UNIT_RATE: u32 = 8000;
const FRAME: usize = 10;

const A: usize = 0;
const PAUSE: usize = 1;
const B: usize = 2;
const C: usize = 3;
const EDGE: usize = 4;

/// Frame k of the timeline holds the constant value 50 * (k + 1).
fn frame_value(k: usize) -> f64 {
    50.0 * (k + 1) as f64 / 32768.0
}

/// Voice with units (in timeline samples) A: 0..100, pause at 100, B: 100..250,
/// C: 250..300 and an edge unit at 300..400.
fn write_voice(dir: &Path) {
    let frames = (0..40).map(|k| Datagram::from_samples(&[50 * (k as i16 + 1); FRAME])).collect();
    MemoryTimeline::new(TIMELINE_RATE, frames).save(&dir.join("timeline.bin")).unwrap();

    let record = |start: i64, duration: i32, edge: bool| UnitRecord { start, duration, edge };
    let index = UnitIndexFile {
        sample_rate: UNIT_RATE,
        units: vec![record(0, 50, false), record(50, 0, false), record(50, 75, false), record(125, 25, false), record(150, 50, true)],
    };
    std::fs::write(dir.join("units.json"), serde_json::to_vec(&index).unwrap()).unwrap();
}

fn write_request(path: &Path, picks: &[(usize, &str, f64)]) {
    let units = picks.iter().map(|&(unit, phone, samples)| RequestEntry { unit, target: Target::new(phone, samples / TIMELINE_RATE as f64, 0.0) }).collect();
    std::fs::write(path, serde_json::to_vec(&Request { units }).unwrap()).unwrap();
}

struct Voice {
    _dir: tempfile::TempDir,
    timeline: MemoryTimeline,
    index: UnitIndex,
    request_path: std::path::PathBuf,
}

impl Voice {
    fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        write_voice(dir.path());
        let timeline = MemoryTimeline::open(&dir.path().join("timeline.bin")).unwrap();
        let index = UnitIndex::open(&dir.path().join("units.json")).unwrap();
        let request_path = dir.path().join("request.json");
        Self { _dir: dir, timeline, index, request_path }
    }

    fn select(&self, picks: &[(usize, &str, f64)]) -> Vec<SelectedUnit> {
        write_request(&self.request_path, picks);
        Request::open(&self.request_path).unwrap().resolve(&self.index).unwrap()
    }

    fn render(&self, strategy: Strategy, picks: &[(usize, &str, f64)]) -> Vec<f64> {
        let units = self.select(picks);
        UnitConcatenator::new(&self.timeline, &self.index, strategy).synthesize(&units).unwrap().into_samples()
    }
}

#[derive(Clone, Default)]
struct Recorder(Rc<RefCell<Vec<PitchSyncInput>>>);

impl Resynthesizer for Recorder {
    fn resynthesize(&self, input: PitchSyncInput, format: AudioFormat) -> unit_concatenator::Result<AudioStream> {
        self.0.borrow_mut().push(input.clone());
        PeriodResynthesizer.resynthesize(input, format)
    }
}

#[test]
fn test_three_units_with_silence() {
    let voice = Voice::new();
    let picks = [(A, "a", 100.0), (PAUSE, "_", 80.0), (B, "s", 150.0)];

    for strategy in [Strategy::Base, Strategy::pitch_sync(ScaleLimits::default())] {
        let samples = voice.render(strategy, &picks);
        assert_eq!(samples.len(), 100 + 80 + 150);
        assert!(samples[100..180].iter().all(|&s| s == 0.0));
    }

    let samples = voice.render(Strategy::Base, &picks);
    assert!((samples[0] - frame_value(0)).abs() < 1e-12);
    assert!((samples[329] - frame_value(24)).abs() < 1e-12);

    // A's natural continuation fades out over the first frame of the pause
    let samples = voice.render(Strategy::Overlap, &picks);
    assert_eq!(samples.len(), 330);
    assert!((samples[100] - frame_value(10)).abs() < 1e-12);
    assert!(samples[110..180].iter().all(|&s| s == 0.0));
}

#[test]
fn test_overlap_crossfades_synthetic_join() {
    let voice = Voice::new();
    let picks = [(A, "a", 100.0), (C, "t", 50.0)];

    let plain = voice.render(Strategy::Base, &picks);
    let faded = voice.render(Strategy::Overlap, &picks);
    assert_eq!(plain.len(), 150);
    assert_eq!(faded.len(), 150);

    // A's natural continuation is frame 10; C starts on frame 25
    assert!((plain[100] - frame_value(25)).abs() < 1e-12);
    assert!((faded[100] - frame_value(10)).abs() < 1e-12);
    assert!((faded[105] - 0.5 * (frame_value(10) + frame_value(25))).abs() < 1e-12);

    // away from the join nothing changes
    assert_eq!(plain[..100], faded[..100]);
    assert_eq!(plain[110..], faded[110..]);
}

#[test]
fn test_pitch_sync_right_context_only_at_synthetic_joins() {
    let voice = Voice::new();
    let recorder = Recorder::default();
    let strategy = Strategy::PitchSync(PitchSync::with_engine(ScaleLimits::default(), recorder.clone()));
    let units = voice.select(&[(PAUSE, "_", 0.0), (B, "s", 150.0), (A, "a", 100.0), (C, "t", 50.0)]);
    let stream = UnitConcatenator::new(&voice.timeline, &voice.index, strategy).synthesize(&units).unwrap();
    assert_eq!(stream.frame_length(), 150 + 100 + 50);

    let inputs = recorder.0.borrow();
    assert_eq!(inputs.len(), 1);
    let contexts = &inputs[0].right_contexts;
    // pause -> B follows the corpus; B -> A and A -> C do not
    assert_eq!(contexts[0], None);
    assert_eq!(contexts[1], Some(Datagram::from_samples(&[50 * 26; FRAME])));
    assert_eq!(contexts[2], Some(Datagram::from_samples(&[50 * 11; FRAME])));
    // C is followed by an edge unit, so nothing was retrieved after it
    assert_eq!(contexts[3], None);
}

#[test]
fn test_pitch_sync_time_scaling() {
    let voice = Voice::new();
    // A and B ask for twice their length; C is a burst and keeps its own
    let samples = voice.render(Strategy::pitch_sync(ScaleLimits::default()), &[(A, "a", 200.0), (C, "t", 100.0), (B, "s", 300.0)]);
    assert_eq!(samples.len(), 200 + 50 + 300);

    let samples = voice.render(Strategy::pitch_sync(ScaleLimits::default()), &[(B, "s", 300.0)]);
    assert_eq!(samples.len(), 300);

    // scale limits cap the stretch
    let limits = ScaleLimits { max_time_scale: 1.5, ..ScaleLimits::default() };
    let samples = voice.render(Strategy::pitch_sync(limits), &[(A, "a", 200.0)]);
    assert_eq!(samples.len(), 150);
}

#[test]
fn test_pitch_sync_rejects_edge_unit() {
    let voice = Voice::new();
    let units = voice.select(&[(A, "a", 100.0), (EDGE, "_", 100.0)]);
    let concatenator = UnitConcatenator::new(&voice.timeline, &voice.index, Strategy::pitch_sync(ScaleLimits::default()));
    assert!(matches!(concatenator.synthesize(&units), Err(Error::EdgeUnitSelected { index: EDGE })));
}

#[test]
fn test_pcm_output_and_wav() {
    let voice = Voice::new();
    let units = voice.select(&[(A, "a", 100.0)]);
    let mut stream = UnitConcatenator::new(&voice.timeline, &voice.index, Strategy::Base).synthesize(&units).unwrap();
    assert_eq!(stream.format(), AudioFormat::pcm16_mono(TIMELINE_RATE));

    let mut pcm = [0u8; 4];
    assert_eq!(stream.read_pcm(&mut pcm), 4);
    assert_eq!(pcm, [0, 50, 0, 50]);

    let samples = stream.into_samples();
    assert_eq!(samples.len(), 98);

    let path = voice._dir.path().join("out.wav");
    write_wav(&path, &samples, TIMELINE_RATE).unwrap();
    let reader = hound::WavReader::open(&path).unwrap();
    assert_eq!(reader.len(), 98);
}
