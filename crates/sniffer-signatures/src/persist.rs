//! On-disk baseline format.
//!
//! A baseline is a gzip stream of bincode values: one [`BaselineHeader`], then
//! one `Option<ClassSignature>` per class. `None` terminates the stream;
//! anything after it is ignored.

use std::io::{BufReader, Read, Write};

use bincode::Options;
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use serde::{Deserialize, Serialize};

use crate::error::BaselineError;
use crate::signature::ClassSignature;

const MAGIC: [u8; 8] = *b"SNIFFSIG";

/// Version written by [`SignatureWriter`] and accepted by the reader.
pub const BASELINE_VERSION: u32 = 1;

/// Upper bound on the encoded size of a single record. Length prefixes beyond
/// it are rejected before anything is allocated.
const RECORD_LIMIT_BYTES: u64 = 16 * 1024 * 1024;

fn bincode_options() -> impl Options + Copy {
    bincode::DefaultOptions::new()
        .with_fixint_encoding()
        .with_little_endian()
        .allow_trailing_bytes()
}

fn bincode_options_limited() -> impl Options + Copy {
    bincode_options().with_limit(RECORD_LIMIT_BYTES)
}

#[derive(Serialize, Deserialize)]
struct BaselineHeader {
    magic: [u8; 8],
    version: u32,
}

/// Decode every record in `reader`, handing each one to `sink` in stream order.
/// Returns the number of records read.
pub(crate) fn read_records<R: Read>(
    reader: R,
    mut sink: impl FnMut(ClassSignature),
) -> Result<usize, BaselineError> {
    let mut stream = BufReader::new(GzDecoder::new(reader));

    let header: BaselineHeader = bincode_options_limited()
        .deserialize_from(&mut stream)
        .map_err(decode_error)?;
    if header.magic != MAGIC {
        return Err(BaselineError::UnrecognizedHeader);
    }
    if header.version != BASELINE_VERSION {
        return Err(BaselineError::UnsupportedVersion {
            found: header.version,
            expected: BASELINE_VERSION,
        });
    }

    let mut count = 0;
    while let Some(class) = bincode_options_limited()
        .deserialize_from::<_, Option<ClassSignature>>(&mut stream)
        .map_err(decode_error)?
    {
        sink(class);
        count += 1;
    }
    Ok(count)
}

/// Separate "could not read" from "read garbage". Decompression failures and
/// truncation surface from `flate2`/`bincode` as I/O errors of these kinds.
fn decode_error(err: bincode::Error) -> BaselineError {
    match *err {
        bincode::ErrorKind::Io(io)
            if !matches!(
                io.kind(),
                std::io::ErrorKind::UnexpectedEof
                    | std::io::ErrorKind::InvalidData
                    | std::io::ErrorKind::InvalidInput
            ) =>
        {
            BaselineError::Io(io)
        }
        other => BaselineError::Malformed(Box::new(other)),
    }
}

fn encode_error(err: bincode::Error) -> BaselineError {
    match *err {
        bincode::ErrorKind::Io(io) => BaselineError::Io(io),
        other => BaselineError::Malformed(Box::new(other)),
    }
}

/// Streams [`ClassSignature`] records into the baseline format.
///
/// ```
/// use sniffer_signatures::{ClassSignature, SignatureIndex, SignatureWriter};
///
/// let mut writer = SignatureWriter::new(Vec::new()).unwrap();
/// writer.write(&ClassSignature::new("java/lang/Object")).unwrap();
/// let bytes = writer.finish().unwrap();
///
/// let index = SignatureIndex::load(bytes.as_slice()).unwrap();
/// assert!(index.contains("java/lang/Object"));
/// ```
pub struct SignatureWriter<W: Write> {
    encoder: GzEncoder<W>,
    written: usize,
}

impl<W: Write> SignatureWriter<W> {
    pub fn new(writer: W) -> Result<Self, BaselineError> {
        let mut encoder = GzEncoder::new(writer, Compression::default());
        let header = BaselineHeader {
            magic: MAGIC,
            version: BASELINE_VERSION,
        };
        bincode_options()
            .serialize_into(&mut encoder, &header)
            .map_err(encode_error)?;
        Ok(Self {
            encoder,
            written: 0,
        })
    }

    pub fn write(&mut self, class: &ClassSignature) -> Result<(), BaselineError> {
        bincode_options()
            .serialize_into(&mut self.encoder, &Some(class))
            .map_err(encode_error)?;
        self.written += 1;
        Ok(())
    }

    pub fn written(&self) -> usize {
        self.written
    }

    /// Write the terminating sentinel and the gzip trailer.
    pub fn finish(mut self) -> Result<W, BaselineError> {
        bincode_options()
            .serialize_into(&mut self.encoder, &None::<&ClassSignature>)
            .map_err(encode_error)?;
        Ok(self.encoder.finish()?)
    }
}
