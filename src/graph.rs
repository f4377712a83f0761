//! Grid graph: the map that plan coordinates resolve against.
//!
//! The parser only ever asks a graph two things: how big it is, and which
//! node (if any) sits at a cell. Everything else about the map is the
//! graph's business.
//!
//! Nodes are identified by their index into the grid's flat cell array
//! (`width * y + x`). A [`Node`] is a small copyable handle carrying that
//! index plus the cell coordinates, so poses can be replayed without going
//! back to the graph.

mod map_file;

use std::{fs, io, path::Path};

use serde::Serialize;

/// Errors that can occur while building or loading a grid.
#[derive(Debug, thiserror::Error)]
pub enum GraphError {
    #[error("map header is missing `{0}`")]
    MissingHeader(&'static str),

    #[error("invalid {field} in map header: {value:?}")]
    InvalidHeader { field: &'static str, value: String },

    #[error("grid must be non-empty (got {width}x{height})")]
    EmptyGrid { width: u32, height: u32 },

    #[error("grid of {width}x{height} exceeds {MAX_CELLS} cells")]
    TooLarge { width: u32, height: u32 },

    #[error("cell mask has {found} entries, expected {expected}")]
    CellCount { expected: usize, found: usize },

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

pub type Result<T> = core::result::Result<T, GraphError>;

/// Largest grid accepted, in cells.
pub const MAX_CELLS: usize = 1 << 24;

/// Number of cells in a `width` x `height` grid, checked against [`MAX_CELLS`].
fn cell_count(width: u32, height: u32) -> Result<usize> {
    if width == 0 || height == 0 {
        return Err(GraphError::EmptyGrid { width, height });
    }
    (width as usize)
        .checked_mul(height as usize)
        .filter(|&cells| cells <= MAX_CELLS)
        .ok_or(GraphError::TooLarge { width, height })
}

/// Index of a cell in the grid's flat cell array.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct NodeId(usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// A passable cell of the grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Node {
    pub id: NodeId,
    pub x: u32,
    pub y: u32,
}

/// What the parser and renderer need from a map.
pub trait Graph {
    fn width(&self) -> u32;

    fn height(&self) -> u32;

    /// The node at `(x, y)`, or `None` when the cell is blocked or out of bounds.
    fn node_at(&self, x: u32, y: u32) -> Option<Node>;
}

/// A rectangular grid of passable and blocked cells.
#[derive(Debug, Clone)]
pub struct Grid {
    width: u32,
    height: u32,
    cells: Vec<Option<Node>>,
}

impl Grid {
    /// Builds a grid from a row-major passability mask.
    pub fn new(width: u32, height: u32, passable: &[bool]) -> Result<Self> {
        let expected = cell_count(width, height)?;
        if passable.len() != expected {
            return Err(GraphError::CellCount {
                expected,
                found: passable.len(),
            });
        }

        let cells = passable
            .iter()
            .enumerate()
            .map(|(index, &open)| {
                open.then(|| Node {
                    id: NodeId(index),
                    x: (index % width as usize) as u32,
                    y: (index / width as usize) as u32,
                })
            })
            .collect();

        Ok(Self {
            width,
            height,
            cells,
        })
    }

    /// A grid with every cell passable.
    pub fn open(width: u32, height: u32) -> Result<Self> {
        let passable = vec![true; cell_count(width, height)?];
        Self::new(width, height, &passable)
    }

    /// Parses a MovingAI `.map` document.
    pub fn parse_map(text: &str) -> Result<Self> {
        let map = map_file::parse(text)?;
        Self::new(map.width, map.height, &map.passable)
    }

    /// Loads a MovingAI `.map` file from disk.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        Self::parse_map(&text)
    }

    /// Looks a node up by id. `None` for blocked cells and foreign ids.
    pub fn node(&self, id: NodeId) -> Option<Node> {
        self.cells.get(id.0).copied().flatten()
    }

    /// Number of passable cells.
    pub fn node_count(&self) -> usize {
        self.cells.iter().filter(|c| c.is_some()).count()
    }
}

impl Graph for Grid {
    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }

    fn node_at(&self, x: u32, y: u32) -> Option<Node> {
        // Checked per axis: the flat index alone would wrap an out-of-range
        // x into the next row.
        if x >= self.width || y >= self.height {
            return None;
        }
        let index = self.width as usize * y as usize + x as usize;
        self.cells[index]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::fs;

    use tempfile::TempDir;

    #[test]
    fn node_ids_are_flat_indices() {
        let grid = Grid::open(4, 3).unwrap();
        let node = grid.node_at(2, 1).unwrap();

        assert_eq!(node.id.index(), 6);
        assert_eq!((node.x, node.y), (2, 1));
        assert_eq!(grid.node(node.id), Some(node));
    }

    #[test]
    fn blocked_cells_have_no_node() {
        let passable = [true, false, true, true];
        let grid = Grid::new(2, 2, &passable).unwrap();

        assert!(grid.node_at(1, 0).is_none());
        assert!(grid.node_at(0, 1).is_some());
        assert_eq!(grid.node_count(), 3);
    }

    #[test]
    fn out_of_bounds_does_not_wrap_rows() {
        let grid = Grid::open(3, 3).unwrap();

        // (3, 0) would alias (0, 1) through the flat index.
        assert!(grid.node_at(3, 0).is_none());
        assert!(grid.node_at(0, 3).is_none());
    }

    #[test]
    fn rejects_mismatched_mask() {
        let err = Grid::new(2, 2, &[true; 3]).unwrap_err();
        assert!(matches!(
            err,
            GraphError::CellCount {
                expected: 4,
                found: 3
            }
        ));
    }

    #[test]
    fn rejects_empty_grid() {
        let err = Grid::open(0, 5).unwrap_err();
        assert!(matches!(err, GraphError::EmptyGrid { .. }));
    }

    #[test]
    fn rejects_oversized_grid() {
        let err = Grid::open(4_000_000_000, 4_000_000_000).unwrap_err();
        assert!(matches!(err, GraphError::TooLarge { .. }));

        let err = Grid::open(4097, 4096).unwrap_err();
        assert!(matches!(err, GraphError::TooLarge { .. }));
    }

    #[test]
    fn loads_map_file_from_disk() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("tiny.map");
        fs::write(&path, "type octile\nheight 2\nwidth 3\nmap\n..@\nT..\n").unwrap();

        let grid = Grid::load(&path).unwrap();
        assert_eq!((grid.width(), grid.height()), (3, 2));
        assert!(grid.node_at(2, 0).is_none());
        assert!(grid.node_at(0, 1).is_none());
        assert!(grid.node_at(1, 1).is_some());
    }

    #[test]
    fn load_missing_file_fails() {
        let dir = TempDir::new().unwrap();
        let err = Grid::load(dir.path().join("absent.map")).unwrap_err();
        assert!(matches!(err, GraphError::Io(_)));
    }
}
