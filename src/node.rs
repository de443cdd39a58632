//! Byte-range annotated tree describing the segments of a JPEG stream.

use std::{fmt, ops::Range};

use crate::{error::Result, reader::Reader};

/// A decoded field value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    Byte(u8),
    Word(u16),
    Bytes(Vec<u8>),
    Text(String),
    /// A byte count, used for regions that are located but not decoded.
    Size(usize),
}

impl From<u8> for Value {
    fn from(value: u8) -> Self {
        Self::Byte(value)
    }
}

impl From<u16> for Value {
    fn from(value: u16) -> Self {
        Self::Word(value)
    }
}

impl<'a> From<&'a [u8]> for Value {
    fn from(value: &'a [u8]) -> Self {
        Self::Bytes(value.to_vec())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Byte(b) => b.fmt(f),
            Value::Word(w) => w.fmt(f),
            Value::Size(n) => n.fmt(f),
            Value::Text(s) => f.write_str(s),
            Value::Bytes(bytes) => {
                for (i, b) in bytes.iter().enumerate() {
                    if i != 0 {
                        f.write_str(",")?;
                    }
                    write!(f, "{b}")?;
                }
                Ok(())
            }
        }
    }
}

/// A node of the segment tree.
///
/// Every node covers the byte range `start..end` of the analyzed buffer. Leaves carry the value
/// decoded from that range, composites carry the nodes it is made of.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Leaf {
        label: String,
        start: usize,
        end: usize,
        value: Value,
    },
    Composite {
        label: String,
        start: usize,
        end: usize,
        children: Vec<Node>,
    },
}

impl Node {
    pub fn composite(
        label: impl Into<String>,
        start: usize,
        end: usize,
        children: Vec<Node>,
    ) -> Self {
        Node::Composite {
            label: label.into(),
            start,
            end,
            children,
        }
    }

    pub fn leaf(label: impl Into<String>, start: usize, end: usize, value: Value) -> Self {
        Node::Leaf {
            label: label.into(),
            start,
            end,
            value,
        }
    }

    #[inline]
    pub fn label(&self) -> &str {
        match self {
            Node::Leaf { label, .. } | Node::Composite { label, .. } => label,
        }
    }

    #[inline]
    pub fn start(&self) -> usize {
        match *self {
            Node::Leaf { start, .. } | Node::Composite { start, .. } => start,
        }
    }

    #[inline]
    pub fn end(&self) -> usize {
        match *self {
            Node::Leaf { end, .. } | Node::Composite { end, .. } => end,
        }
    }

    #[inline]
    pub fn range(&self) -> Range<usize> {
        self.start()..self.end()
    }

    pub fn value(&self) -> Option<&Value> {
        match self {
            Node::Leaf { value, .. } => Some(value),
            Node::Composite { .. } => None,
        }
    }

    /// Returns the child nodes. Leaves have none.
    pub fn children(&self) -> &[Node] {
        match self {
            Node::Leaf { .. } => &[],
            Node::Composite { children, .. } => children,
        }
    }

    fn write_indented(&self, depth: usize, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{:indent$}{:04X}..{:04X} {}",
            "",
            self.start(),
            self.end(),
            self.label(),
            indent = depth * 2
        )?;
        for child in self.children() {
            child.write_indented(depth + 1, f)?;
        }
        Ok(())
    }
}

/// Renders the tree, one `start..end label` line per node, children indented below their parent.
impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.write_indented(0, f)
    }
}

/// Runs `read` and records the bytes it consumed as a leaf labelled `"<name>: <value>"`.
///
/// The decoded value is handed back alongside the node so the caller can act on it.
pub(crate) fn field<'a, T, F>(reader: &mut Reader<'a>, name: &str, read: F) -> Result<(T, Node)>
where
    T: Clone + Into<Value>,
    F: FnOnce(&mut Reader<'a>) -> Result<T>,
{
    let start = reader.position();
    let raw = read(reader)?;
    let value = raw.clone().into();
    let node = Node::leaf(format!("{name}: {value}"), start, reader.position(), value);
    Ok((raw, node))
}

/// Runs `read` `count` times, collecting one leaf per row under a composite called `name`.
///
/// Rows are labelled with their byte offset inside the table.
pub(crate) fn table_field<'a, T, F>(
    reader: &mut Reader<'a>,
    name: &str,
    count: usize,
    mut read: F,
) -> Result<Node>
where
    T: Into<Value>,
    F: FnMut(&mut Reader<'a>) -> Result<T>,
{
    let start = reader.position();
    let mut rows = Vec::with_capacity(count);
    for i in 0..count {
        let row_start = reader.position();
        let value = read(reader)?.into();
        let row_len = reader.position() - row_start;
        rows.push(Node::leaf(
            format!("{}: {value}", i * row_len),
            row_start,
            reader.position(),
            value,
        ));
    }
    Ok(Node::composite(name, start, reader.position(), rows))
}

#[cfg(test)]
mod tests {
    use expect_test::expect;

    use super::*;

    #[test]
    fn field_records_range() {
        let mut reader = Reader::new(&[0xAA, 0x01, 0x02, 0x03]);
        reader.skip(1).unwrap();
        let (value, node) = field(&mut reader, "height", Reader::read_u16).unwrap();
        assert_eq!(value, 0x0102);
        assert_eq!(node.range(), 1..3);
        assert_eq!(node.label(), "height: 258");
        assert_eq!(node.value(), Some(&Value::Word(258)));
        assert!(node.children().is_empty());
    }

    #[test]
    fn failed_field_propagates() {
        let mut reader = Reader::new(&[0x01]);
        assert!(field(&mut reader, "width", Reader::read_u16).is_err());
    }

    #[test]
    fn table_rows() {
        let data: Vec<u8> = (0..6).collect();
        let mut reader = Reader::new(&data);
        let table = table_field(&mut reader, "values", 3, |r| r.read_bytes(2)).unwrap();
        expect![[r#"
            0000..0006 values
              0000..0002 0: 0,1
              0002..0004 2: 2,3
              0004..0006 4: 4,5
        "#]]
        .assert_eq(&table.to_string());
        assert_eq!(table.value(), None);
    }
}
