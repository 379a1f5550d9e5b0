//! Graph codec — portable binary encoding of an `AnchorGraph`.
//!
//! ```text
//! header  "ANAV" | version u16 | flags u16 | saved_at i64 ms | record_count u32 | records_len u32
//! record  anchor_id [16] | pose 16×f32 (column-major) | kind u8 | body_len u32 | body
//!           kind 0 unset  —
//!           kind 1 path   id u32 | desired_degree u32 | n u32 | n × neighbor u32
//!           kind 2 room   room_number u32 | closest_path_id u32
//! footer  crc32 u32 over header + records
//! ```
//!
//! All integers little-endian. Every record body is length-framed, so a
//! reader skips kinds it does not know (they come back as `Unset`) and
//! ignores trailing fields a newer writer appended to a known kind.

use std::io::Write;

use bytes::{Buf, BufMut, Bytes, BytesMut};
use chrono::{DateTime, Utc};
use tracing::{debug, warn};

use crate::model::{AnchorGraph, AnchorId, AnchorKind, AnchorRecord, PathId, PathNode, Pose, RoomNode};
use crate::{Error, Result};

/// Magic bytes opening every encoded graph.
pub const MAGIC: &[u8; 4] = b"ANAV";

/// Highest format version this reader understands.
pub const FORMAT_VERSION: u16 = 1;

pub const KIND_UNSET: u8 = 0;
pub const KIND_PATH: u8 = 1;
pub const KIND_ROOM: u8 = 2;

const HEADER_LEN: usize = 4 + 2 + 2 + 8 + 4 + 4;
const FOOTER_LEN: usize = 4;
/// anchor id + pose + kind + body_len
const RECORD_PREFIX_LEN: usize = 16 + 16 * 4 + 1 + 4;
const PATH_BODY_MIN: usize = 12;
const ROOM_BODY_LEN: usize = 8;

/// Why a buffer failed to decode.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DecodeError {
    #[error("buffer truncated: needed {needed} bytes, {remaining} remaining")]
    Truncated { needed: usize, remaining: usize },

    #[error("bad magic {0:?}")]
    BadMagic([u8; 4]),

    #[error("unsupported format version {found} (this reader supports up to {supported})")]
    UnsupportedVersion { found: u16, supported: u16 },

    #[error("checksum mismatch: stored {stored:#010x}, computed {computed:#010x}")]
    ChecksumMismatch { stored: u32, computed: u32 },

    #[error("invalid header: {0}")]
    InvalidHeader(String),

    #[error("invalid record {index}: {message}")]
    Invalid { index: usize, message: String },
}

/// Metadata written ahead of the records.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SnapshotHeader {
    pub version: u16,
    pub saved_at: DateTime<Utc>,
    pub record_count: u32,
}

// ============================================================================
// Encode
// ============================================================================

/// Encode `graph`, stamped with the current time.
pub fn encode(graph: &AnchorGraph) -> Bytes {
    encode_at(graph, Utc::now())
}

/// Encode `graph` with an explicit `saved_at`. Same graph + same timestamp
/// always yields the same bytes.
pub fn encode_at(graph: &AnchorGraph, saved_at: DateTime<Utc>) -> Bytes {
    let mut records = BytesMut::with_capacity(graph.len() * (RECORD_PREFIX_LEN + 16));
    for record in graph.records() {
        put_record(&mut records, record);
    }

    let mut out = BytesMut::with_capacity(HEADER_LEN + records.len() + FOOTER_LEN);
    out.put_slice(MAGIC);
    out.put_u16_le(FORMAT_VERSION);
    out.put_u16_le(0);
    out.put_i64_le(saved_at.timestamp_millis());
    out.put_u32_le(graph.len() as u32);
    out.put_u32_le(records.len() as u32);
    out.put_slice(&records);

    let crc = crc32fast::hash(&out);
    out.put_u32_le(crc);

    debug!(records = graph.len(), bytes = out.len(), crc, "graph encoded");
    out.freeze()
}

/// Encode into a sink. Sink failures surface as `Error::Encode`.
pub fn encode_to<W: Write + ?Sized>(graph: &AnchorGraph, writer: &mut W) -> Result<()> {
    let bytes = encode(graph);
    writer.write_all(&bytes).map_err(Error::Encode)?;
    writer.flush().map_err(Error::Encode)
}

fn put_record(out: &mut BytesMut, record: &AnchorRecord) {
    out.put_slice(record.id.as_bytes());
    for value in record.pose.to_array() {
        out.put_f32_le(value);
    }

    match &record.kind {
        AnchorKind::Unset => {
            out.put_u8(KIND_UNSET);
            out.put_u32_le(0);
        }
        AnchorKind::Path(node) => {
            out.put_u8(KIND_PATH);
            out.put_u32_le((PATH_BODY_MIN + node.neighbor_ids.len() * 4) as u32);
            out.put_u32_le(node.id.0);
            out.put_u32_le(node.desired_degree);
            out.put_u32_le(node.neighbor_ids.len() as u32);
            for neighbor in &node.neighbor_ids {
                out.put_u32_le(neighbor.0);
            }
        }
        AnchorKind::Room(room) => {
            out.put_u8(KIND_ROOM);
            out.put_u32_le(ROOM_BODY_LEN as u32);
            out.put_u32_le(room.room_number);
            out.put_u32_le(room.closest_path_id.0);
        }
    }
}

// ============================================================================
// Decode
// ============================================================================

/// Decode a buffer produced by [`encode`].
pub fn decode(bytes: &[u8]) -> Result<AnchorGraph> {
    decode_snapshot(bytes).map(|(_, graph)| graph)
}

/// Decode a buffer, returning its header alongside the graph.
pub fn decode_snapshot(bytes: &[u8]) -> Result<(SnapshotHeader, AnchorGraph)> {
    let mut buf = bytes;
    need(&buf, HEADER_LEN)?;

    let mut magic = [0u8; 4];
    buf.copy_to_slice(&mut magic);
    if &magic != MAGIC {
        return Err(DecodeError::BadMagic(magic).into());
    }

    let version = buf.get_u16_le();
    if version == 0 || version > FORMAT_VERSION {
        return Err(DecodeError::UnsupportedVersion { found: version, supported: FORMAT_VERSION }.into());
    }
    let _flags = buf.get_u16_le();
    let saved_at_ms = buf.get_i64_le();
    let record_count = buf.get_u32_le();
    let records_len = buf.get_u32_le() as usize;

    need(&buf, records_len + FOOTER_LEN)?;
    let checked_len = HEADER_LEN + records_len;
    let computed = crc32fast::hash(&bytes[..checked_len]);
    let mut footer = &bytes[checked_len..checked_len + FOOTER_LEN];
    let stored = footer.get_u32_le();
    if stored != computed {
        return Err(DecodeError::ChecksumMismatch { stored, computed }.into());
    }
    if bytes.len() > checked_len + FOOTER_LEN {
        warn!(extra = bytes.len() - checked_len - FOOTER_LEN, "ignoring bytes after checksum footer");
    }

    let saved_at = DateTime::from_timestamp_millis(saved_at_ms)
        .ok_or_else(|| DecodeError::InvalidHeader(format!("timestamp {saved_at_ms} out of range")))?;

    let mut records = &buf[..records_len];
    let mut graph = AnchorGraph::new();
    for index in 0..record_count as usize {
        let record = get_record(&mut records, index)?;
        graph.insert(record).map_err(|e| DecodeError::Invalid { index, message: e.to_string() })?;
    }
    if records.has_remaining() {
        return Err(DecodeError::InvalidHeader(format!(
            "{} unread bytes after {record_count} records",
            records.remaining()
        ))
        .into());
    }

    let header = SnapshotHeader { version, saved_at, record_count };
    debug!(records = record_count, version, "graph decoded");
    Ok((header, graph))
}

fn need(buf: &&[u8], needed: usize) -> std::result::Result<(), DecodeError> {
    if buf.remaining() < needed {
        return Err(DecodeError::Truncated { needed, remaining: buf.remaining() });
    }
    Ok(())
}

fn get_record(buf: &mut &[u8], index: usize) -> std::result::Result<AnchorRecord, DecodeError> {
    need(buf, RECORD_PREFIX_LEN)?;

    let mut id = [0u8; 16];
    buf.copy_to_slice(&mut id);
    let mut pose = [0f32; 16];
    for value in &mut pose {
        *value = buf.get_f32_le();
    }
    let kind_tag = buf.get_u8();
    let body_len = buf.get_u32_le() as usize;

    need(buf, body_len)?;
    let mut body = &buf[..body_len];
    buf.advance(body_len);

    let kind = match kind_tag {
        KIND_UNSET => AnchorKind::Unset,
        KIND_PATH => AnchorKind::Path(get_path(&mut body, index)?),
        KIND_ROOM => AnchorKind::Room(get_room(&mut body, index)?),
        unknown => {
            warn!(index, kind = unknown, body_len, "unknown anchor kind, decoding as unset");
            AnchorKind::Unset
        }
    };

    Ok(AnchorRecord { id: AnchorId::from_bytes(id), pose: Pose::from_array(pose), kind })
}

fn get_path(body: &mut &[u8], index: usize) -> std::result::Result<PathNode, DecodeError> {
    if body.remaining() < PATH_BODY_MIN {
        return Err(DecodeError::Invalid {
            index,
            message: format!("path body is {} bytes, needs {PATH_BODY_MIN}", body.remaining()),
        });
    }
    let id = PathId(body.get_u32_le());
    let desired_degree = body.get_u32_le();
    let count = body.get_u32_le() as usize;
    if body.remaining() < count.saturating_mul(4) {
        return Err(DecodeError::Invalid {
            index,
            message: format!("path {id} lists {count} neighbors but body holds {} bytes", body.remaining()),
        });
    }
    let neighbors = (0..count).map(|_| PathId(body.get_u32_le()));
    Ok(PathNode::new(id, desired_degree).with_neighbors(neighbors))
}

fn get_room(body: &mut &[u8], index: usize) -> std::result::Result<RoomNode, DecodeError> {
    if body.remaining() < ROOM_BODY_LEN {
        return Err(DecodeError::Invalid {
            index,
            message: format!("room body is {} bytes, needs {ROOM_BODY_LEN}", body.remaining()),
        });
    }
    Ok(RoomNode { room_number: body.get_u32_le(), closest_path_id: PathId(body.get_u32_le()) })
}
