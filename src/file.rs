//! JPEG/JFIF marker segment analyzer.
//!
//! Walks the marker segments of a JPEG stream and describes each of them as a [`Node`] tree in
//! which every field is annotated with the byte range it was decoded from.


use std::{fmt, iter::FusedIterator};

use crate::{
    error::{Error, ErrorKind, Result},
    node::{field, table_field, Node, Value},
    reader::Reader,
};

/// Size of one 8-bit quantization table in a DQT segment: `Pq/Tq` byte plus 64 elements.
const DQT_TABLE_LEN: u16 = 65;

/// A 2-byte marker code, classified by the segments this analyzer understands.
#[derive(Clone, Copy, PartialEq, Eq)]
pub enum Marker {
    /// Start Of Image.
    Soi,
    /// End Of Image.
    Eoi,
    /// Application segment 0, holding the JFIF header.
    App0,
    /// Comment.
    Com,
    /// Define Quantization Tables.
    Dqt,
    /// Start Of Frame, baseline DCT.
    Sof0,
    /// Define Huffman Tables.
    Dht,
    /// Start Of Scan.
    Sos,
    /// Anything else. Its body is skipped using the declared length.
    Unknown(u16),
}

impl From<u16> for Marker {
    fn from(code: u16) -> Self {
        match code {
            0xFFD8 => Marker::Soi,
            0xFFD9 => Marker::Eoi,
            0xFFE0 => Marker::App0,
            0xFFFE => Marker::Com,
            0xFFDB => Marker::Dqt,
            0xFFC0 => Marker::Sof0,
            0xFFC4 => Marker::Dht,
            0xFFDA => Marker::Sos,
            other => Marker::Unknown(other),
        }
    }
}

impl Marker {
    pub fn code(self) -> u16 {
        match self {
            Marker::Soi => 0xFFD8,
            Marker::Eoi => 0xFFD9,
            Marker::App0 => 0xFFE0,
            Marker::Com => 0xFFFE,
            Marker::Dqt => 0xFFDB,
            Marker::Sof0 => 0xFFC0,
            Marker::Dht => 0xFFC4,
            Marker::Sos => 0xFFDA,
            Marker::Unknown(code) => code,
        }
    }

    /// Human-readable segment name used as the label of segment nodes.
    pub fn label(self) -> String {
        match self {
            Marker::Soi => "Start Of Image".into(),
            Marker::Eoi => "End Of Image".into(),
            Marker::App0 => "Application0".into(),
            Marker::Com => "Comment".into(),
            Marker::Dqt => "Define Quantization Tables".into(),
            Marker::Sof0 => "Baseline DCT".into(),
            Marker::Dht => "Define Huffman Tables".into(),
            Marker::Sos => "Start Of Scan".into(),
            Marker::Unknown(code) => format!("Unknown marker {code:x}"),
        }
    }
}

impl fmt::Debug for Marker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [{:04X}]", self.label(), self.code())
    }
}

/// Incremental segment analyzer.
///
/// Each call to [`Analyzer::next_segment`] consumes exactly one marker segment. Callers that want
/// to keep the segments parsed before an error can drive this directly instead of using
/// [`analyze`].
///
/// After an error, the analyzer is exhausted and yields no further segments.
pub struct Analyzer<'a> {
    reader: Reader<'a>,
    failed: bool,
}

/// Decodes a segment body into child nodes. Also receives the declared segment length.
type BodyReader = fn(&mut Reader<'_>, u16, &mut Vec<Node>) -> Result<()>;

impl<'a> Analyzer<'a> {
    pub fn new(buf: &'a [u8]) -> Self {
        Self {
            reader: Reader::new(buf),
            failed: false,
        }
    }

    /// Returns the offset at which the next segment starts.
    #[inline]
    pub fn position(&self) -> usize {
        self.reader.position()
    }

    /// Reads the next segment and returns its node.
    ///
    /// Returns `Ok(None)` once the whole buffer has been consumed, or after an error has been
    /// returned. Bytes following the EOI marker are analyzed like any other segment.
    pub fn next_segment(&mut self) -> Result<Option<Node>> {
        if self.failed {
            return Ok(None);
        }
        let res = self.read_segment();
        self.failed = res.is_err();
        res
    }

    fn read_segment(&mut self) -> Result<Option<Node>> {
        if self.reader.at_end() {
            return Ok(None);
        }

        let start = self.reader.position();
        let marker = Marker::from(self.reader.read_u16()?);
        log::trace!("{:?} at {:#x}", marker, start);

        let read_body: BodyReader = match marker {
            Marker::Soi | Marker::Eoi => {
                return Ok(Some(Node::composite(
                    marker.label(),
                    start,
                    self.reader.position(),
                    Vec::new(),
                )));
            }
            Marker::App0 => |r, _, out| read_app0(r, out),
            Marker::Com => |r, _, out| read_com(r, out),
            Marker::Dqt => read_dqt,
            Marker::Sof0 => |r, _, out| read_sof0(r, out),
            Marker::Dht => |r, _, out| read_dht(r, out),
            Marker::Sos => |r, _, out| read_sos_header(r, out),
            Marker::Unknown(_) => |r, _, _| r.skip(r.remaining().len()),
        };

        // The length includes the two length bytes, but not the marker.
        let (length, length_node) = field(&mut self.reader, "length", Reader::read_u16)?;
        if length < 2 {
            return Err(Error::malformed(
                start,
                format!("{:?} has invalid segment length {}", marker, length),
            ));
        }
        let expected_end = start + 2 + usize::from(length);
        let buf_len = self.reader.position() + self.reader.remaining().len();
        if expected_end > buf_len {
            return Err(Error::end_of_stream(buf_len));
        }

        let mut body = self.reader.segment(expected_end);
        let mut children = vec![length_node];
        read_body(&mut body, length, &mut children)
            .map_err(|e| overrun_to_malformed(e, marker, start, length))?;

        // The segment specified a bigger length than what we ended up reading. Skip the remaining
        // bytes and log a warning.
        if body.position() < expected_end {
            log::warn!(
                "{:?} segment specified a length of {} bytes, but {} remain after decoding",
                marker,
                length,
                expected_end - body.position(),
            );
        }
        self.reader.skip(expected_end - self.reader.position())?;

        if marker == Marker::Sos {
            children.push(self.read_scan_data()?);
        }

        Ok(Some(Node::composite(
            marker.label(),
            start,
            self.reader.position(),
            children,
        )))
    }

    /// Locates the entropy-coded data following a scan header.
    ///
    /// The data ends right before the first `0xFF` that is not followed by a stuffed `0x00`; that
    /// marker is left unconsumed for the next segment.
    fn read_scan_data(&mut self) -> Result<Node> {
        let data_start = self.reader.position();
        loop {
            if self.reader.peek_u8(0)? != 0xFF {
                self.reader.skip(1)?;
            } else if self.reader.peek_u8(1)? == 0x00 {
                self.reader.skip(2)?;
            } else {
                break;
            }
        }

        let len = self.reader.position() - data_start;
        log::debug!("scan data: {} bytes at {:#x}", len, data_start);
        Ok(Node::leaf(
            format!("data: {len}"),
            data_start,
            self.reader.position(),
            Value::Size(len),
        ))
    }
}

impl<'a> Iterator for Analyzer<'a> {
    type Item = Result<Node>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_segment().transpose()
    }
}

impl<'a> FusedIterator for Analyzer<'a> {}

/// Analyzes all marker segments in `buf`.
///
/// Returns a root node labelled `Segments` spanning the whole buffer, with one child per segment
/// in stream order.
pub fn analyze(buf: &[u8]) -> Result<Node> {
    let segments = Analyzer::new(buf).collect::<Result<Vec<_>>>()?;
    Ok(Node::composite("Segments", 0, buf.len(), segments))
}

/// The body reader of a segment is cut off at the segment's declared end, and the declared end is
/// known to be inside the buffer. Running out of data there means the fields contradict the
/// segment length.
fn overrun_to_malformed(e: Error, marker: Marker, start: usize, length: u16) -> Error {
    if e.kind() == ErrorKind::EndOfStream {
        Error::malformed(
            start,
            format!("{marker:?} contents exceed the declared length of {length} bytes"),
        )
    } else {
        e
    }
}

fn read_app0(r: &mut Reader<'_>, out: &mut Vec<Node>) -> Result<()> {
    out.push(field(r, "identifier", Reader::read_zstring)?.1);
    out.push(field(r, "version", |r| r.read_bytes(2))?.1);
    out.push(field(r, "units", Reader::read_u8)?.1);
    out.push(field(r, "xDensity", Reader::read_u16)?.1);
    out.push(field(r, "yDensity", Reader::read_u16)?.1);
    let (xthumbnail, node) = field(r, "xThumbnail", Reader::read_u8)?;
    out.push(node);
    let (ythumbnail, node) = field(r, "yThumbnail", Reader::read_u8)?;
    out.push(node);

    // Uncompressed RGB thumbnail, not decoded.
    let thumbnail_len = 3 * usize::from(xthumbnail) * usize::from(ythumbnail);
    if thumbnail_len != 0 {
        let start = r.position();
        r.skip(thumbnail_len)?;
        out.push(Node::leaf(
            format!("thumbnail: {thumbnail_len}"),
            start,
            r.position(),
            Value::Size(thumbnail_len),
        ));
    }
    Ok(())
}

fn read_com(r: &mut Reader<'_>, out: &mut Vec<Node>) -> Result<()> {
    let len = r.remaining().len();
    out.push(field(r, "content", |r| r.read_string(len))?.1);
    Ok(())
}

fn read_dqt(r: &mut Reader<'_>, length: u16, out: &mut Vec<Node>) -> Result<()> {
    // FIXME: 16-bit tables (Pq = 1) are 129 bytes long and get misread here
    let count = length / DQT_TABLE_LEN;
    for _ in 0..count {
        let table_start = r.position();
        let (_, id) = field(r, "precision/destination", Reader::read_u8)?;
        let values = table_field(r, "values", 8, |r| r.read_bytes(8))?;
        out.push(Node::composite(
            "table",
            table_start,
            r.position(),
            vec![id, values],
        ));
    }
    Ok(())
}

fn read_sof0(r: &mut Reader<'_>, out: &mut Vec<Node>) -> Result<()> {
    out.push(field(r, "precision", Reader::read_u8)?.1);
    out.push(field(r, "height", Reader::read_u16)?.1);
    out.push(field(r, "width", Reader::read_u16)?.1);
    let (num_components, node) = field(r, "components", Reader::read_u8)?;
    out.push(node);

    let table_start = r.position();
    let mut mapping = Vec::with_capacity(num_components.into());
    for i in 0..num_components {
        let start = r.position();
        let children = vec![
            field(r, "id", Reader::read_u8)?.1,
            field(r, "x/y sampling", Reader::read_u8)?.1,
            field(r, "quantization table id", Reader::read_u8)?.1,
        ];
        mapping.push(Node::composite(
            format!("mapping {i}"),
            start,
            r.position(),
            children,
        ));
    }
    out.push(Node::composite(
        "Quantization Mapping",
        table_start,
        r.position(),
        mapping,
    ));
    Ok(())
}

fn read_dht(r: &mut Reader<'_>, out: &mut Vec<Node>) -> Result<()> {
    // There is no table count, tables follow each other until the segment is exhausted.
    while !r.at_end() {
        let table_start = r.position();
        let (_, header) = field(r, "class/dest", Reader::read_u8)?;
        let (lengths, lengths_node) = field(r, "lengths", |r| r.read_bytes(16))?;

        let elements_start = r.position();
        let mut elements = Vec::with_capacity(16);
        for (i, &count) in lengths.iter().enumerate() {
            elements.push(field(r, &i.to_string(), |r| r.read_bytes(count.into()))?.1);
        }
        let elements = Node::composite("elements", elements_start, r.position(), elements);

        out.push(Node::composite(
            "table",
            table_start,
            r.position(),
            vec![header, lengths_node, elements],
        ));
    }
    Ok(())
}

fn read_sos_header(r: &mut Reader<'_>, out: &mut Vec<Node>) -> Result<()> {
    let (num_components, node) = field(r, "components", Reader::read_u8)?;
    out.push(node);

    let table_start = r.position();
    let mut components = Vec::with_capacity(num_components.into());
    for i in 0..num_components {
        let start = r.position();
        let children = vec![
            field(r, "selector", Reader::read_u8)?.1,
            field(r, "tables dc/ac", Reader::read_u8)?.1,
        ];
        components.push(Node::composite(
            format!("component {i}"),
            start,
            r.position(),
            children,
        ));
    }
    out.push(Node::composite(
        "Components",
        table_start,
        r.position(),
        components,
    ));

    out.push(field(r, "spectral select", |r| r.read_bytes(2))?.1);
    out.push(field(r, "successive approx", Reader::read_u8)?.1);
    Ok(())
}
