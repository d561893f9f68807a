//! Binary encoding of synth definitions.
//!
//! Wire format: the big-endian "SCgf" version 2 layout documented at
//! <https://doc.sccode.org/Reference/Synth-Definition-File-Format.html>, with
//! names as Pascal strings (one length byte, then the raw bytes). This layout
//! is the compatibility contract with scsynth; write-then-read-then-write must
//! reproduce identical bytes.

use std::fmt;
use std::fs::File;
use std::io::{self, BufReader, BufWriter, Read, Write};
use std::path::Path;

use crate::rate::Rate;
use crate::synthdef::{InputSpec, ParamName, SynthDef, UgenSpec, Variant};

/// Magic literal opening every synthdef stream.
pub(crate) const SYNTHDEF_MAGIC: &[u8; 4] = b"SCgf";

/// The only file format version this codec supports.
pub(crate) const SYNTHDEF_VERSION: i32 = 2;

/// Error decoding a synthdef stream.
///
/// Decoding stops at the first error; no partial definition is ever returned.
#[derive(Debug)]
pub enum DecodeError {
    Io(io::Error),
    /// The stream did not start with `"SCgf"`.
    BadMagic([u8; 4]),
    /// The version field was not 2.
    BadVersion(i32),
    /// The stream declared a definition count other than 1. Multi-definition
    /// streams are not supported.
    BadDefCount(i16),
    /// A rate byte was outside the known range.
    BadRate(i8),
}

impl From<io::Error> for DecodeError {
    fn from(e: io::Error) -> Self {
        Self::Io(e)
    }
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(e) => write!(f, "IO error: {}", e),
            Self::BadMagic(bytes) => {
                write!(f, "expected magic {:?}, got {:?}", SYNTHDEF_MAGIC, bytes)
            }
            Self::BadVersion(v) => {
                write!(f, "unsupported synthdef version {} (expected {})", v, SYNTHDEF_VERSION)
            }
            Self::BadDefCount(n) => {
                write!(f, "expected exactly 1 synthdef in stream, got {}", n)
            }
            Self::BadRate(r) => write!(f, "unknown ugen rate {}", r),
        }
    }
}

impl std::error::Error for DecodeError {}

impl SynthDef {
    /// Encode this definition to its binary form.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut buf = Vec::new();
        buf.extend_from_slice(SYNTHDEF_MAGIC);
        push_i32(&mut buf, SYNTHDEF_VERSION);
        push_i16(&mut buf, 1); // definition count
        push_pstring(&mut buf, &self.name);

        push_i32(&mut buf, self.constants.len() as i32);
        for &constant in &self.constants {
            push_f32(&mut buf, constant);
        }

        push_i32(&mut buf, self.initial_param_values.len() as i32);
        for &value in &self.initial_param_values {
            push_f32(&mut buf, value);
        }

        push_i32(&mut buf, self.param_names.len() as i32);
        for param in &self.param_names {
            push_pstring(&mut buf, &param.name);
            push_i32(&mut buf, param.index);
        }

        push_i32(&mut buf, self.ugens.len() as i32);
        for ugen in &self.ugens {
            push_pstring(&mut buf, &ugen.name);
            buf.push(ugen.rate.to_i8() as u8);
            push_i16(&mut buf, ugen.special_index);
            push_i32(&mut buf, ugen.inputs.len() as i32);
            for input in &ugen.inputs {
                push_i32(&mut buf, input.ugen_index);
                push_i32(&mut buf, input.output_index);
            }
            push_i32(&mut buf, ugen.outputs.len() as i32);
            for &output in &ugen.outputs {
                buf.push(output.to_i8() as u8);
            }
        }

        push_i16(&mut buf, self.variants.len() as i16);
        for variant in &self.variants {
            push_pstring(&mut buf, &variant.name);
            for &value in &variant.initial_param_values {
                push_f32(&mut buf, value);
            }
        }
        buf
    }

    /// Write the binary form to a writer.
    pub fn write<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        writer.write_all(&self.to_bytes())
    }

    /// Decode a definition from a reader.
    ///
    /// The inverse of [`SynthDef::write`]. Truncated streams surface as
    /// [`DecodeError::Io`]; structural mismatches get their own variants.
    pub fn read<R: Read>(reader: &mut R) -> Result<SynthDef, DecodeError> {
        let mut magic = [0u8; 4];
        reader.read_exact(&mut magic)?;
        if &magic != SYNTHDEF_MAGIC {
            return Err(DecodeError::BadMagic(magic));
        }
        let version = read_i32(reader)?;
        if version != SYNTHDEF_VERSION {
            return Err(DecodeError::BadVersion(version));
        }
        let def_count = read_i16(reader)?;
        if def_count != 1 {
            return Err(DecodeError::BadDefCount(def_count));
        }
        let name = read_pstring(reader)?;

        let num_constants = read_i32(reader)?;
        let mut constants = Vec::with_capacity(num_constants.max(0) as usize);
        for _ in 0..num_constants {
            constants.push(read_f32(reader)?);
        }

        let num_params = read_i32(reader)?;
        let mut initial_param_values = Vec::with_capacity(num_params.max(0) as usize);
        for _ in 0..num_params {
            initial_param_values.push(read_f32(reader)?);
        }

        let num_param_names = read_i32(reader)?;
        let mut param_names = Vec::with_capacity(num_param_names.max(0) as usize);
        for _ in 0..num_param_names {
            let name = read_pstring(reader)?;
            let index = read_i32(reader)?;
            param_names.push(ParamName { name, index });
        }

        let num_ugens = read_i32(reader)?;
        let mut ugens = Vec::with_capacity(num_ugens.max(0) as usize);
        for _ in 0..num_ugens {
            ugens.push(read_ugen(reader)?);
        }

        let num_variants = read_i16(reader)?;
        let mut variants = Vec::with_capacity(num_variants.max(0) as usize);
        for _ in 0..num_variants {
            variants.push(read_variant(reader, num_params)?);
        }

        Ok(SynthDef {
            name,
            constants,
            initial_param_values,
            param_names,
            ugens,
            variants,
        })
    }

    /// Decode a definition from a byte slice.
    pub fn from_bytes(mut bytes: &[u8]) -> Result<SynthDef, DecodeError> {
        SynthDef::read(&mut bytes)
    }

    /// Write this definition to a `.scsyndef` file on disk.
    pub fn write_def_file<P: AsRef<Path>>(&self, path: P) -> io::Result<()> {
        let mut writer = BufWriter::new(File::create(path)?);
        self.write(&mut writer)?;
        writer.flush()
    }

    /// Read a definition from a `.scsyndef` file on disk.
    pub fn read_def_file<P: AsRef<Path>>(path: P) -> Result<SynthDef, DecodeError> {
        let mut reader = BufReader::new(File::open(path)?);
        SynthDef::read(&mut reader)
    }
}

fn read_ugen<R: Read>(reader: &mut R) -> Result<UgenSpec, DecodeError> {
    let name = read_pstring(reader)?;
    let rate = read_rate(reader)?;
    let special_index = read_i16(reader)?;
    let num_inputs = read_i32(reader)?;
    let mut inputs = Vec::with_capacity(num_inputs.max(0) as usize);
    for _ in 0..num_inputs {
        let ugen_index = read_i32(reader)?;
        let output_index = read_i32(reader)?;
        inputs.push(InputSpec {
            ugen_index,
            output_index,
        });
    }
    let num_outputs = read_i32(reader)?;
    let mut outputs = Vec::with_capacity(num_outputs.max(0) as usize);
    for _ in 0..num_outputs {
        outputs.push(read_rate(reader)?);
    }
    Ok(UgenSpec {
        name,
        rate,
        special_index,
        inputs,
        outputs,
    })
}

fn read_variant<R: Read>(reader: &mut R, num_params: i32) -> Result<Variant, DecodeError> {
    let name = read_pstring(reader)?;
    let mut initial_param_values = Vec::with_capacity(num_params.max(0) as usize);
    for _ in 0..num_params {
        initial_param_values.push(read_f32(reader)?);
    }
    Ok(Variant {
        name,
        initial_param_values,
    })
}

fn push_i16(buf: &mut Vec<u8>, n: i16) {
    buf.extend_from_slice(&n.to_be_bytes());
}

fn push_i32(buf: &mut Vec<u8>, n: i32) {
    buf.extend_from_slice(&n.to_be_bytes());
}

fn push_f32(buf: &mut Vec<u8>, n: f32) {
    buf.extend_from_slice(&n.to_be_bytes());
}

// The length prefix is a signed byte, so names cap out at 127 bytes. Overlong
// names are rejected when the definition is constructed; this assert is the
// backstop for hand-built values.
fn push_pstring(buf: &mut Vec<u8>, s: &str) {
    assert!(s.len() <= 127, "pascal string longer than 127 bytes: {:?}", s);
    buf.push(s.len() as u8);
    buf.extend_from_slice(s.as_bytes());
}

fn read_i16<R: Read>(reader: &mut R) -> io::Result<i16> {
    let mut bytes = [0u8; 2];
    reader.read_exact(&mut bytes)?;
    Ok(i16::from_be_bytes(bytes))
}

fn read_i32<R: Read>(reader: &mut R) -> io::Result<i32> {
    let mut bytes = [0u8; 4];
    reader.read_exact(&mut bytes)?;
    Ok(i32::from_be_bytes(bytes))
}

fn read_f32<R: Read>(reader: &mut R) -> io::Result<f32> {
    let mut bytes = [0u8; 4];
    reader.read_exact(&mut bytes)?;
    Ok(f32::from_be_bytes(bytes))
}

fn read_rate<R: Read>(reader: &mut R) -> Result<Rate, DecodeError> {
    let mut byte = [0u8; 1];
    reader.read_exact(&mut byte)?;
    let raw = byte[0] as i8;
    Rate::from_i8(raw).ok_or(DecodeError::BadRate(raw))
}

fn read_pstring<R: Read>(reader: &mut R) -> io::Result<String> {
    let mut len = [0u8; 1];
    reader.read_exact(&mut len)?;
    let mut bytes = vec![0u8; len[0] as usize];
    reader.read_exact(&mut bytes)?;
    String::from_utf8(bytes).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
}
