//! Track builder
//!
//! Turns a parsed level into collidable segments. Row 0 sits at z = 0 and the
//! track extends toward -z; columns are centred on x = 0.

use glam::Vec3;

use crate::consts::*;
use crate::level::Level;

/// Segment type tag, from the level legend
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SegmentKind {
    /// '1'-'4': plain road
    Normal,
    /// '5'-'6': road with a tube over it
    Tunnel,
    /// '7'-'8': solid block raised above the road
    Raised,
    /// '9': speeds the ship up while driven over
    Boost,
    /// '0': slows the ship down while driven over
    Brake,
}

impl SegmentKind {
    /// Legend lookup; `None` for '.', space and anything that isn't a digit
    pub fn from_char(ch: char) -> Option<Self> {
        match ch {
            '1'..='4' => Some(SegmentKind::Normal),
            '5' | '6' => Some(SegmentKind::Tunnel),
            '7' | '8' => Some(SegmentKind::Raised),
            '9' => Some(SegmentKind::Boost),
            '0' => Some(SegmentKind::Brake),
            _ => None,
        }
    }
}

/// Height of the driving surface for a tile
fn top_for_tile(ch: char) -> f32 {
    match ch {
        '7' => RAISED_LOW_TOP,
        '8' => RAISED_HIGH_TOP,
        _ => 0.0,
    }
}

/// One unit of track geometry
#[derive(Debug, Clone, PartialEq)]
pub struct Segment {
    /// Centre of the box
    pub pos: Vec3,
    /// Full extents (width, height, depth)
    pub size: Vec3,
    pub kind: SegmentKind,
    /// Source character from the level map
    pub tile: char,
    pub color: [f32; 4],
    pub row: usize,
    pub column: usize,
}

impl Segment {
    /// Top (driving) surface height
    #[inline]
    pub fn top(&self) -> f32 {
        self.pos.y + self.size.y / 2.0
    }

    #[inline]
    pub fn bottom(&self) -> f32 {
        self.pos.y - self.size.y / 2.0
    }

    /// Whether a point's horizontal position lies within this segment's footprint
    #[inline]
    pub fn covers(&self, x: f32, z: f32) -> bool {
        (x - self.pos.x).abs() <= self.size.x / 2.0 && (z - self.pos.z).abs() <= self.size.z / 2.0
    }

    /// Tube axis for tunnel segments: (x, y) of the cross-section centre
    #[inline]
    pub fn tube_axis(&self) -> (f32, f32) {
        (self.pos.x, self.top())
    }
}

/// x of a column's centre
#[inline]
pub fn column_x(column: usize) -> f32 {
    (column as f32 - (TRACK_COLUMNS as f32 - 1.0) / 2.0) * SEGMENT_WIDTH
}

/// z of a row's centre
#[inline]
pub fn row_z(row: usize) -> f32 {
    -(row as f32) * SEGMENT_DEPTH
}

/// The collidable track for one level
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Track {
    segments: Vec<Segment>,
    /// Index of each row's first segment in `segments` (plus a final end index)
    row_starts: Vec<usize>,
}

impl Track {
    /// Build the track for a level: one segment per recognised tile
    pub fn build(level: &Level) -> Self {
        let mut track = Self::default();
        track.rebuild(level);
        track
    }

    /// Drop all segments and regenerate them from level data
    pub fn rebuild(&mut self, level: &Level) {
        self.clear();
        for row in 0..level.len() {
            self.row_starts.push(self.segments.len());
            for (column, &tile) in level.row(row).iter().enumerate() {
                let Some(kind) = SegmentKind::from_char(tile) else {
                    continue;
                };
                let top = top_for_tile(tile);
                let height = top + FLOOR_THICKNESS;
                let color = level.palette.color(tile).unwrap_or([1.0; 4]);
                self.segments.push(Segment {
                    pos: Vec3::new(column_x(column), top - height / 2.0, row_z(row)),
                    size: Vec3::new(SEGMENT_WIDTH, height, SEGMENT_DEPTH),
                    kind,
                    tile,
                    color,
                    row,
                    column,
                });
            }
        }
        self.row_starts.push(self.segments.len());
        log::info!(
            "Built track {:?}: {} rows, {} segments",
            level.name,
            self.rows(),
            self.segments.len()
        );
    }

    pub fn clear(&mut self) {
        self.segments.clear();
        self.row_starts.clear();
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Number of rows (including empty ones)
    pub fn rows(&self) -> usize {
        self.row_starts.len().saturating_sub(1)
    }

    /// Segments of one row
    pub fn row(&self, row: usize) -> &[Segment] {
        if row >= self.rows() {
            return &[];
        }
        &self.segments[self.row_starts[row]..self.row_starts[row + 1]]
    }

    /// Full track width
    pub fn width(&self) -> f32 {
        TRACK_COLUMNS as f32 * SEGMENT_WIDTH
    }

    /// z of the far edge of the last row
    pub fn end_z(&self) -> f32 {
        -(self.rows() as f32 - 0.5) * SEGMENT_DEPTH
    }

    /// Segments whose footprint contains (x, z)
    pub fn segments_under(&self, x: f32, z: f32) -> impl Iterator<Item = &Segment> + '_ {
        let center = (-z / SEGMENT_DEPTH).round();
        let first = (center - 1.0).max(0.0) as usize;
        let last = (center + 1.0).max(0.0) as usize;
        (first..=last)
            .flat_map(move |row| self.row(row).iter())
            .filter(move |segment| segment.covers(x, z))
    }

    /// Where the ship starts: lane centre of row 0, resting on whatever is there
    pub fn start_position(&self) -> Vec3 {
        let y = self
            .segments_under(0.0, 0.0)
            .map(Segment::top)
            .fold(None, |best: Option<f32>, top| {
                Some(best.map_or(top, |b| b.max(top)))
            })
            .unwrap_or(0.0);
        Vec3::new(0.0, y, 0.0)
    }
}
