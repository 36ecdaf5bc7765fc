use std::fmt;
use std::path::Path;

/// Symbol used for blocking cells in the textual map form.
pub const WALL_SYMBOL: char = '#';

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cell {
    Empty,
    Wall,
}

impl Cell {
    #[inline]
    fn from_symbol(symbol: char) -> Self {
        if symbol == WALL_SYMBOL {
            Cell::Wall
        } else {
            Cell::Empty
        }
    }

    #[inline]
    pub fn is_wall(self) -> bool {
        self == Cell::Wall
    }
}

/// Reasons a map is refused before it ever reaches the renderer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MapError {
    /// No rows at all.
    NoRows,
    /// The first row has no cells, so the grid has zero width.
    ZeroWidth,
    /// A row whose length differs from the first row.
    Ragged {
        row: usize,
        expected: usize,
        found: usize,
    },
    /// Every cell is a wall; there is nowhere to stand.
    NoOpenCell,
    UnknownBuiltin(String),
    Io { path: String, message: String },
}

impl fmt::Display for MapError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoRows => write!(f, "map has no rows"),
            Self::ZeroWidth => write!(f, "map rows are empty"),
            Self::Ragged {
                row,
                expected,
                found,
            } => write!(
                f,
                "map row {row} has {found} cells, expected {expected} like the first row"
            ),
            Self::NoOpenCell => write!(f, "map has no empty cell to spawn in"),
            Self::UnknownBuiltin(name) => {
                write!(f, "unknown built-in map '{name}' (try {})", BUILTIN_NAMES.join(", "))
            }
            Self::Io { path, message } => write!(f, "could not read map {path}: {message}"),
        }
    }
}

impl std::error::Error for MapError {}

pub const BUILTIN_NAMES: [&str; 3] = ["open", "maze", "large"];

const MAZE: [&str; 16] = [
    "################",
    "#           #  #",
    "## ##       ## #",
    "## #           #",
    "#  #####   #####",
    "#  #           #",
    "# ##           #",
    "#              #",
    "#              #",
    "########       #",
    "###  ###       #",
    "#      #       #",
    "###  ###   ##  #",
    "###  ###   ##  #",
    "#              #",
    "################",
];

/// Immutable rectangular grid, stored row-major.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Map {
    cells: Vec<Cell>,
    width: usize,
    height: usize,
}

impl Map {
    /// Builds a map from textual rows (`#` is a wall, anything else is open).
    pub fn parse<S: AsRef<str>>(rows: &[S]) -> Result<Self, MapError> {
        let first = rows.first().ok_or(MapError::NoRows)?;
        let width = first.as_ref().chars().count();
        if width == 0 {
            return Err(MapError::ZeroWidth);
        }

        let mut cells = Vec::with_capacity(width * rows.len());
        for (row, line) in rows.iter().enumerate() {
            let found = line.as_ref().chars().count();
            if found != width {
                return Err(MapError::Ragged {
                    row,
                    expected: width,
                    found,
                });
            }
            cells.extend(line.as_ref().chars().map(Cell::from_symbol));
        }

        if cells.iter().all(|c| c.is_wall()) {
            return Err(MapError::NoOpenCell);
        }

        Ok(Self {
            cells,
            width,
            height: rows.len(),
        })
    }

    /// Parses a newline separated map. Trailing blank lines are ignored.
    pub fn from_text(text: &str) -> Result<Self, MapError> {
        let mut rows: Vec<&str> = text.lines().map(|l| l.trim_end_matches('\r')).collect();
        while rows.last().is_some_and(|l| l.is_empty()) {
            rows.pop();
        }
        Self::parse(&rows)
    }

    pub fn load(path: &Path) -> Result<Self, MapError> {
        let text = std::fs::read_to_string(path).map_err(|e| MapError::Io {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        let map = Self::from_text(&text)?;
        log::debug!("loaded map {} ({}x{})", path.display(), map.width, map.height);
        Ok(map)
    }

    pub fn builtin(name: &str) -> Result<Self, MapError> {
        match name {
            "open" => Ok(Self::enclosed(16, 16)),
            "maze" => Self::parse(&MAZE),
            "large" => Ok(Self::enclosed(32, 32)),
            other => Err(MapError::UnknownBuiltin(other.to_string())),
        }
    }

    /// Empty room with a one cell wall border. Sizes below 3 are bumped to 3.
    pub fn enclosed(width: usize, height: usize) -> Self {
        let (width, height) = (width.max(3), height.max(3));
        let mut cells = vec![Cell::Empty; width * height];
        for y in 0..height {
            for x in 0..width {
                if x == 0 || y == 0 || x == width - 1 || y == height - 1 {
                    cells[y * width + x] = Cell::Wall;
                }
            }
        }
        Self {
            cells,
            width,
            height,
        }
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    /// Bounds-checked cell lookup; `None` outside the grid.
    #[inline]
    pub fn cell(&self, x: usize, y: usize) -> Option<Cell> {
        if x >= self.width || y >= self.height {
            return None;
        }
        Some(self.cells[y * self.width + x])
    }

    /// Cell containing the point `(x, y)` in map units.
    #[inline]
    pub fn cell_at(&self, x: f32, y: f32) -> Option<Cell> {
        // also rejects NaN
        if !(x >= 0.0 && y >= 0.0) {
            return None;
        }
        // truncation is floor for non-negative values
        self.cell(x as usize, y as usize)
    }

    /// True for walls and for anything outside the grid.
    #[inline]
    pub fn is_blocked(&self, x: f32, y: f32) -> bool {
        self.cell_at(x, y).is_none_or(Cell::is_wall)
    }

    /// Start position: `(width / 2, width / 2)` when that cell is open,
    /// otherwise the centre of the first open cell in row-major order.
    pub fn spawn_point(&self) -> [f32; 2] {
        let mid = (self.width / 2) as f32;
        if !self.is_blocked(mid, mid) {
            return [mid, mid];
        }
        self.cells
            .iter()
            .position(|c| !c.is_wall())
            .map(|i| {
                [
                    (i % self.width) as f32 + 0.5,
                    (i / self.width) as f32 + 0.5,
                ]
            })
            .unwrap_or([mid, mid])
    }

    /// Rows rendered back into the textual form.
    pub fn rows(&self) -> Vec<String> {
        self.cells
            .chunks(self.width)
            .map(|row| {
                row.iter()
                    .map(|c| if c.is_wall() { WALL_SYMBOL } else { ' ' })
                    .collect()
            })
            .collect()
    }
}
