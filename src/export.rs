//! JSON dump — a human-readable view of a graph.
//!
//! Not a persistence format (that is `codec`). This is for eyeballing a
//! saved map: every path node with its adjacency, every room with the path
//! node it is bound to.
//!
//! ```text
//! AnchorGraph → export_json() → { "path_nodes": [...], "room_nodes": [...], ... }
//! ```

use std::io::Write;

use serde::Serialize;

use crate::model::*;
use crate::Result;

#[derive(Debug, Serialize)]
struct GraphDump {
    anchors: usize,
    unset_anchors: usize,
    path_nodes: Vec<PathDump>,
    room_nodes: Vec<RoomDump>,
}

#[derive(Debug, Serialize)]
struct PathDump {
    anchor: AnchorId,
    id: PathId,
    desired_degree: u32,
    neighbors: Vec<PathId>,
    translation: [f32; 3],
}

#[derive(Debug, Serialize)]
struct RoomDump {
    anchor: AnchorId,
    room_number: u32,
    closest_path_id: PathId,
    translation: [f32; 3],
}

fn dump(graph: &AnchorGraph) -> GraphDump {
    let path_nodes: Vec<PathDump> = graph
        .path_nodes()
        .map(|(rec, node)| PathDump {
            anchor: rec.id,
            id: node.id,
            desired_degree: node.desired_degree,
            neighbors: node.neighbor_ids.to_vec(),
            translation: rec.pose.translation(),
        })
        .collect();
    let room_nodes: Vec<RoomDump> = graph
        .room_nodes()
        .map(|(rec, room)| RoomDump {
            anchor: rec.id,
            room_number: room.room_number,
            closest_path_id: room.closest_path_id,
            translation: rec.pose.translation(),
        })
        .collect();

    GraphDump {
        anchors: graph.len(),
        unset_anchors: graph.len() - path_nodes.len() - room_nodes.len(),
        path_nodes,
        room_nodes,
    }
}

/// Write `graph` as pretty-printed JSON.
pub fn export_json(graph: &AnchorGraph, writer: &mut dyn Write) -> Result<()> {
    serde_json::to_writer_pretty(&mut *writer, &dump(graph))
        .map_err(|e| crate::Error::Encode(e.into()))?;
    writeln!(writer).map_err(crate::Error::Encode)?;
    Ok(())
}
