use std::io::Write;

use tracing::{debug, trace};

use super::{HEADER_SIZE, MAGIC, PAD_BYTE, reloc};
use crate::text::{Codepage, TextConfig, TextKind};
use crate::utils::{align_up, le_u32, pad_to};
use crate::{Error, Result};

/// Identifies a segment of a container under construction.
///
/// Segments are laid out in a fixed order: [`SegmentId::Strings`], then every
/// record segment in creation order, then [`SegmentId::Root`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SegmentId {
    /// The string table, placed directly after the header.
    Strings,
    /// A record segment created with [`Sir0Builder::add_segment`].
    Records(usize),
    /// The root record the header's main-data pointer refers to.
    Root,
}

/// A pointer value written into a segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pointer {
    /// Stored as `0`; never patched and never listed for relocation.
    Null,
    /// `offset` bytes into `segment`. Rewritten to an absolute file offset
    /// when the container is built.
    To { segment: SegmentId, offset: u32 },
}

impl Pointer {
    /// Pointer to `offset` bytes into `segment`.
    pub fn to(segment: SegmentId, offset: u32) -> Self {
        Self::To { segment, offset }
    }
}

#[derive(Debug)]
struct Placeholder {
    /// Segment-relative offset of the 4-byte slot.
    at: u32,
    target: SegmentId,
}

#[derive(Debug)]
struct Segment {
    name: &'static str,
    data: Vec<u8>,
    placeholders: Vec<Placeholder>,
}

impl Segment {
    fn new(name: &'static str) -> Self {
        Self {
            name,
            data: Vec::new(),
            placeholders: Vec::new(),
        }
    }

    fn len(&self) -> u32 {
        self.data.len() as u32
    }
}

/// Final file offsets of every segment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layout {
    strings: u32,
    records: Vec<u32>,
    root: u32,
    end: u32,
}

impl Layout {
    /// Base file offset of `segment`, or `None` if no such segment exists.
    pub fn base(&self, segment: SegmentId) -> Option<u32> {
        match segment {
            SegmentId::Strings => Some(self.strings),
            SegmentId::Records(i) => self.records.get(i).copied(),
            SegmentId::Root => Some(self.root),
        }
    }

    /// Value of the header's main-data pointer.
    pub fn main_data_offset(&self) -> u32 {
        self.root
    }

    /// Value of the header's relocation-table pointer.
    pub fn reloc_table_offset(&self) -> u32 {
        align_up(self.end as usize, 16) as u32
    }
}

/// Lays out a SIR0 container from strings, records and pointer placeholders.
///
/// Every write returns the segment-relative offset it landed at; wrap that in
/// a [`Pointer`] to refer to it from elsewhere. Building assigns each segment
/// its file offset, rewrites every placeholder to an absolute offset and
/// emits the relocation table.
///
/// ```
/// use datkit::formats::sir0::{Pointer, SegmentId, Sir0, Sir0Builder};
///
/// let mut b = Sir0Builder::new();
/// let name = b.add_identifier("ENTRY_A")?;
/// b.write_pointer(SegmentId::Root, name)?;
/// b.write_u32(SegmentId::Root, 7)?;
/// b.write_pointer(SegmentId::Root, Pointer::Null)?;
/// let file = b.build()?;
///
/// let sir0 = Sir0::parse(&file)?;
/// let root = sir0.main_data_offset();
/// let name_ptr = sir0.read_pointer(root)?.unwrap();
/// assert_eq!(sir0.read_identifier(name_ptr)?, "ENTRY_A");
/// assert_eq!(sir0.read_u32(root + 4)?, 7);
/// # Ok::<(), datkit::Error>(())
/// ```
#[derive(Debug)]
pub struct Sir0Builder {
    text: TextConfig,
    strings: Segment,
    records: Vec<Segment>,
    root: Segment,
}

impl Default for Sir0Builder {
    fn default() -> Self {
        Self::with_text_config(TextConfig::default())
    }
}

impl Sir0Builder {
    /// Builder whose display strings use Shift-JIS.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder whose display strings use `text.display`.
    pub fn with_text_config(text: TextConfig) -> Self {
        Self {
            text,
            strings: Segment::new("strings"),
            records: Vec::new(),
            root: Segment::new("root"),
        }
    }

    pub fn text_config(&self) -> &TextConfig {
        &self.text
    }

    /// Create a record segment. It is placed after all previously created
    /// record segments.
    pub fn add_segment(&mut self, name: &'static str) -> SegmentId {
        self.records.push(Segment::new(name));
        SegmentId::Records(self.records.len() - 1)
    }

    fn segment(&self, id: SegmentId) -> Result<&Segment> {
        match id {
            SegmentId::Strings => Ok(&self.strings),
            SegmentId::Root => Ok(&self.root),
            SegmentId::Records(i) => self.records.get(i).ok_or_else(|| unknown_segment(id)),
        }
    }

    fn segment_mut(&mut self, id: SegmentId) -> Result<&mut Segment> {
        match id {
            SegmentId::Strings => Ok(&mut self.strings),
            SegmentId::Root => Ok(&mut self.root),
            SegmentId::Records(i) => self
                .records
                .get_mut(i)
                .ok_or_else(|| unknown_segment(id)),
        }
    }

    /// Current length of `segment`, i.e. the offset the next write lands at.
    pub fn len(&self, segment: SegmentId) -> Result<u32> {
        Ok(self.segment(segment)?.len())
    }

    /// Append a null-terminated string encoded in `codepage` to the string
    /// table.
    pub fn add_string(&mut self, text: &str, codepage: Codepage) -> Result<Pointer> {
        let encoded = codepage.encode_terminated(text)?;
        let offset = self.strings.len();
        self.strings.data.extend_from_slice(&encoded);
        Ok(Pointer::to(SegmentId::Strings, offset))
    }

    /// Append an identifier string (always Shift-JIS).
    pub fn add_identifier(&mut self, text: &str) -> Result<Pointer> {
        self.add_string(text, Codepage::ShiftJis)
    }

    /// Append a string of `kind` in the code page the builder's
    /// [`TextConfig`] selects for it.
    pub fn add_text(&mut self, text: &str, kind: TextKind) -> Result<Pointer> {
        self.add_string(text, self.text.codepage(kind))
    }

    /// Append raw bytes to `segment`.
    pub fn write_bytes(&mut self, segment: SegmentId, bytes: &[u8]) -> Result<u32> {
        let seg = self.segment_mut(segment)?;
        let offset = seg.len();
        seg.data.extend_from_slice(bytes);
        Ok(offset)
    }

    pub fn write_u8(&mut self, segment: SegmentId, value: u8) -> Result<u32> {
        self.write_bytes(segment, &[value])
    }

    pub fn write_u16(&mut self, segment: SegmentId, value: u16) -> Result<u32> {
        self.write_bytes(segment, &value.to_le_bytes())
    }

    pub fn write_u32(&mut self, segment: SegmentId, value: u32) -> Result<u32> {
        self.write_bytes(segment, &value.to_le_bytes())
    }

    /// Append a pointer slot to `segment`.
    pub fn write_pointer(&mut self, segment: SegmentId, pointer: Pointer) -> Result<u32> {
        let at = self.write_u32(segment, 0)?;
        self.set_pointer(segment, at, pointer)?;
        Ok(at)
    }

    /// Store `pointer` in the already-written 4-byte slot at `at`, replacing
    /// whatever the slot held.
    pub fn set_pointer(&mut self, segment: SegmentId, at: u32, pointer: Pointer) -> Result<()> {
        let seg = self.segment_mut(segment)?;
        let start = at as usize;
        let slot = seg
            .data
            .get_mut(start..start.saturating_add(4))
            .filter(|s| s.len() == 4)
            .ok_or_else(|| {
                Error::InvalidSchema(format!(
                    "pointer slot {at:#x} outside segment '{}'",
                    seg.name
                ))
            })?;

        seg.placeholders.retain(|p| p.at != at);
        match pointer {
            Pointer::Null => slot.copy_from_slice(&[0; 4]),
            Pointer::To { segment: target, offset } => {
                slot.copy_from_slice(&offset.to_le_bytes());
                seg.placeholders.push(Placeholder { at, target });
            }
        }
        Ok(())
    }

    fn ordered(&self) -> impl Iterator<Item = (SegmentId, &Segment)> {
        std::iter::once((SegmentId::Strings, &self.strings))
            .chain(
                self.records
                    .iter()
                    .enumerate()
                    .map(|(i, s)| (SegmentId::Records(i), s)),
            )
            .chain(std::iter::once((SegmentId::Root, &self.root)))
    }

    /// Compute the file offset of every segment as it stands now.
    pub fn layout(&self) -> Result<Layout> {
        let mut cursor = HEADER_SIZE;
        let mut bases = Vec::with_capacity(self.records.len() + 2);
        for (id, seg) in self.ordered() {
            let base = align_up(cursor, 4);
            trace!(segment = seg.name, ?id, base, len = seg.data.len(), "segment placed");
            bases.push(base);
            cursor = base + seg.data.len();
        }
        let end = cursor;
        if align_up(end, 16) > u32::MAX as usize {
            return Err(Error::InvalidSchema(
                "container exceeds 32-bit offsets".into(),
            ));
        }

        let root = bases.pop().unwrap_or(HEADER_SIZE) as u32;
        let strings = bases.first().copied().unwrap_or(HEADER_SIZE) as u32;
        let records = bases.iter().skip(1).map(|&b| b as u32).collect();
        Ok(Layout {
            strings,
            records,
            root,
            end: end as u32,
        })
    }

    /// Lay out, patch and serialize the container.
    pub fn build(self) -> Result<Vec<u8>> {
        let layout = self.layout()?;

        let mut pointer_offsets = vec![4u32, 8];
        let mut patched = Vec::with_capacity(self.records.len() + 2);
        for (id, seg) in self.ordered() {
            let base = layout.base(id).ok_or_else(|| unknown_segment(id))?;
            let mut data = seg.data.clone();
            for p in &seg.placeholders {
                let target = self.segment(p.target)?;
                let target_base = layout.base(p.target).ok_or_else(|| unknown_segment(p.target))?;
                let at = p.at as usize;
                let relative = le_u32(&data, at)?;
                if relative > target.len() {
                    return Err(Error::InvalidSchema(format!(
                        "pointer at '{}'+{at:#x} targets offset {relative:#x} past end of '{}'",
                        seg.name, target.name
                    )));
                }
                let absolute = relative + target_base;
                data[at..at + 4].copy_from_slice(&absolute.to_le_bytes());
                pointer_offsets.push(base + p.at);
            }
            patched.push((base, data));
        }

        pointer_offsets.sort_unstable();
        let table = reloc::encode(&pointer_offsets)?;

        let mut out = Vec::with_capacity(layout.reloc_table_offset() as usize + table.len() + 16);
        out.extend_from_slice(MAGIC);
        out.extend_from_slice(&layout.main_data_offset().to_le_bytes());
        out.extend_from_slice(&layout.reloc_table_offset().to_le_bytes());
        out.extend_from_slice(&[0; 4]);
        for (base, data) in patched {
            out.resize(base as usize, PAD_BYTE);
            out.extend_from_slice(&data);
        }
        pad_to(&mut out, 16, PAD_BYTE);
        out.extend_from_slice(&table);
        pad_to(&mut out, 16, PAD_BYTE);

        debug!(
            len = out.len(),
            segments = self.records.len() + 2,
            pointers = pointer_offsets.len(),
            main_data_offset = layout.main_data_offset(),
            "built SIR0 container"
        );
        Ok(out)
    }

    /// Build the container and write it to `w`.
    pub fn write_to<W: Write>(self, w: &mut W) -> Result<()> {
        let bytes = self.build()?;
        w.write_all(&bytes)?;
        Ok(())
    }
}

fn unknown_segment(id: SegmentId) -> Error {
    Error::InvalidSchema(format!("unknown segment {id:?}"))
}
