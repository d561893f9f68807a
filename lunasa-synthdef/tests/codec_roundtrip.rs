//! End-to-end tests of the build-encode-decode pipeline against the wire
//! format scsynth expects.

use lunasa_synthdef::ugens::{Out, Pan2, SinOsc};
use lunasa_synthdef::{Input, SynthDef};

fn sine_tone() -> SynthDef {
    SynthDef::build("sine_tone", |g| {
        let sig = SinOsc::default().ar(g);
        Out {
            bus: 0.0.into(),
            channels: sig,
        }
        .ar(g)
    })
}

/// The byte-for-byte encoding of `sine_tone`, spelled out section by section.
fn expected_sine_tone_bytes() -> Vec<u8> {
    let mut b = Vec::new();
    b.extend_from_slice(b"SCgf");
    b.extend_from_slice(&2i32.to_be_bytes()); // version
    b.extend_from_slice(&1i16.to_be_bytes()); // definition count
    b.push(9);
    b.extend_from_slice(b"sine_tone");
    // constant pool: freq then phase, in first-seen order
    b.extend_from_slice(&2i32.to_be_bytes());
    b.extend_from_slice(&440.0f32.to_be_bytes());
    b.extend_from_slice(&0.0f32.to_be_bytes());
    // no params, no param names
    b.extend_from_slice(&0i32.to_be_bytes());
    b.extend_from_slice(&0i32.to_be_bytes());
    // two ugens, dependency first
    b.extend_from_slice(&2i32.to_be_bytes());
    // SinOsc: audio rate, inputs (-1,0) (-1,1), one audio output
    b.push(6);
    b.extend_from_slice(b"SinOsc");
    b.push(2);
    b.extend_from_slice(&0i16.to_be_bytes());
    b.extend_from_slice(&2i32.to_be_bytes());
    b.extend_from_slice(&(-1i32).to_be_bytes());
    b.extend_from_slice(&0i32.to_be_bytes());
    b.extend_from_slice(&(-1i32).to_be_bytes());
    b.extend_from_slice(&1i32.to_be_bytes());
    b.extend_from_slice(&1i32.to_be_bytes());
    b.push(2);
    // Out: audio rate, inputs (-1,1) (0,0), no outputs
    b.push(3);
    b.extend_from_slice(b"Out");
    b.push(2);
    b.extend_from_slice(&0i16.to_be_bytes());
    b.extend_from_slice(&2i32.to_be_bytes());
    b.extend_from_slice(&(-1i32).to_be_bytes());
    b.extend_from_slice(&1i32.to_be_bytes());
    b.extend_from_slice(&0i32.to_be_bytes());
    b.extend_from_slice(&0i32.to_be_bytes());
    b.extend_from_slice(&0i32.to_be_bytes());
    // no variants
    b.extend_from_slice(&0i16.to_be_bytes());
    b
}

#[test]
fn sine_tone_encodes_to_reference_bytes() {
    assert_eq!(sine_tone().to_bytes(), expected_sine_tone_bytes());
}

#[test]
fn decode_inverts_encode() {
    let def = sine_tone();
    let decoded = SynthDef::from_bytes(&def.to_bytes()).unwrap();
    assert_eq!(decoded, def);
}

#[test]
fn encode_inverts_decode() {
    let bytes = expected_sine_tone_bytes();
    let decoded = SynthDef::from_bytes(&bytes).unwrap();
    assert_eq!(decoded.to_bytes(), bytes);
}

#[test]
fn parameterized_stereo_def_round_trips() {
    let def = SynthDef::build("param_pan", |g| {
        let freq = g.add_param("freq", 440.0);
        let pan = g.add_param("pan", 0.0);
        let sig = SinOsc {
            freq,
            phase: 0.0.into(),
        }
        .ar(g)
        .mul(g, 0.3);
        let panned = Pan2 {
            input: sig,
            pos: pan,
            level: 1.0.into(),
        }
        .ar(g);
        Out {
            bus: 0.0.into(),
            channels: panned,
        }
        .ar(g)
    })
    .with_variant("low", vec![110.0, -0.5])
    .with_variant("high", vec![880.0, 0.5]);

    let bytes = def.to_bytes();
    let decoded = SynthDef::from_bytes(&bytes).unwrap();
    assert_eq!(decoded, def);
    assert_eq!(decoded.to_bytes(), bytes);
    assert_eq!(decoded.ugens[0].name, "Control");
    assert_eq!(decoded.variants.len(), 2);
}

#[test]
fn expanded_def_round_trips() {
    let def = SynthDef::build("detuned", |g| {
        let sig = SinOsc {
            freq: Input::Multi(vec![440.0.into(), 443.0.into()]),
            phase: 0.0.into(),
        }
        .ar(g);
        Out {
            bus: 0.0.into(),
            channels: sig,
        }
        .ar(g)
    });
    let decoded = SynthDef::from_bytes(&def.to_bytes()).unwrap();
    assert_eq!(decoded, def);
    assert_eq!(
        decoded.ugens.iter().filter(|u| u.name == "SinOsc").count(),
        2
    );
}

#[test]
fn def_file_round_trips_on_disk() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("sine_tone.scsyndef");
    let def = sine_tone();
    def.write_def_file(&path).unwrap();
    let from_disk = SynthDef::read_def_file(&path).unwrap();
    assert_eq!(from_disk, def);
}

#[test]
fn missing_def_file_is_an_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nope.scsyndef");
    assert!(matches!(
        SynthDef::read_def_file(&path),
        Err(lunasa_synthdef::DecodeError::Io(_))
    ));
}
