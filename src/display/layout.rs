use std::cmp::Ordering;
use std::collections::HashMap;
use std::fmt;
use std::hash::Hash;
use std::num::NonZeroUsize;

use serde::Deserialize;
use thiserror::Error;

/// One occurrence to place on the grid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduledEvent<R, C> {
    /// Time slot the event starts in
    pub row_key: R,
    /// Day or date the event belongs to
    pub column_key: C,
    /// Number of consecutive row slots the event covers
    pub span: NonZeroUsize,
    /// Display text, opaque to the layout
    pub label: String,
}

impl<R, C> ScheduledEvent<R, C> {
    pub fn new(row_key: R, column_key: C, span: NonZeroUsize, label: impl Into<String>) -> Self {
        Self {
            row_key,
            column_key,
            span,
            label: label.into(),
        }
    }
}

/// Ordering applied to events that start in the same (row, column) slot.
///
/// Both rules fall back to input order, so identical input always yields
/// an identical grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TieBreak {
    /// Keep the order the events were supplied in (source row order)
    #[default]
    Insertion,
    /// Alphabetical by label
    Label,
}

impl TieBreak {
    fn compare<R, C>(self, events: &[ScheduledEvent<R, C>], a: usize, b: usize) -> Ordering {
        match self {
            TieBreak::Insertion => a.cmp(&b),
            TieBreak::Label => events[a].label.cmp(&events[b].label).then(a.cmp(&b)),
        }
    }
}

/// A cell in the layout grid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Cell {
    /// No event here
    Empty,
    /// First row of an event; `span` is the number of rows actually placed
    Origin {
        event: usize,
        label: String,
        span: usize,
    },
    /// Row already covered by the origin cell above it
    Continuation { event: usize, origin_row: usize },
}

impl Cell {
    pub fn is_empty(&self) -> bool {
        matches!(self, Cell::Empty)
    }

    /// Index of the input event occupying this cell, if any.
    pub fn event(&self) -> Option<usize> {
        match self {
            Cell::Empty => None,
            Cell::Origin { event, .. } | Cell::Continuation { event, .. } => Some(*event),
        }
    }
}

/// A column of the grid and the sub-columns it was widened to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GridColumn<C> {
    pub key: C,
    /// Number of parallel sub-columns (1 when nothing overlaps)
    pub sub_columns: usize,
    /// Flat index of the first sub-column within a grid row
    pub offset: usize,
}

/// The placed grid: `cells[row]` holds every sub-column of every column,
/// left to right.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grid<R, C> {
    pub rows: Vec<R>,
    pub columns: Vec<GridColumn<C>>,
    pub cells: Vec<Vec<Cell>>,
}

impl<R, C> Grid<R, C> {
    /// Number of row slots
    pub fn height(&self) -> usize {
        self.rows.len()
    }

    /// Total number of sub-columns across all columns
    pub fn width(&self) -> usize {
        self.columns.iter().map(|c| c.sub_columns).sum()
    }

    pub fn cell_count(&self) -> usize {
        self.height() * self.width()
    }

    /// Get a cell by row, column and sub-column, or None if out of bounds
    pub fn cell(&self, row: usize, column: usize, sub: usize) -> Option<&Cell> {
        let col = self.columns.get(column)?;
        if sub >= col.sub_columns {
            return None;
        }
        self.cells.get(row).and_then(|r| r.get(col.offset + sub))
    }

    /// Sub-column count of a column, 0 if the column does not exist
    pub fn sub_columns(&self, column: usize) -> usize {
        self.columns.get(column).map_or(0, |c| c.sub_columns)
    }

    pub fn column_index(&self, key: &C) -> Option<usize>
    where
        C: PartialEq,
    {
        self.columns.iter().position(|c| &c.key == key)
    }

    pub fn row_index(&self, key: &R) -> Option<usize>
    where
        R: PartialEq,
    {
        self.rows.iter().position(|r| r == key)
    }
}

/// What went wrong with one input event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiagnosticKind {
    /// Row key not among the declared row slots; event dropped
    UnknownRow,
    /// Column key not among the declared columns; event dropped
    UnknownColumn,
    /// Span ran past the last row slot; event placed, truncated
    Clipped { requested: usize, placed: usize },
}

impl fmt::Display for DiagnosticKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiagnosticKind::UnknownRow => write!(f, "unknown row"),
            DiagnosticKind::UnknownColumn => write!(f, "unknown column"),
            DiagnosticKind::Clipped { requested, placed } => {
                write!(f, "clipped from {} to {} rows", requested, placed)
            }
        }
    }
}

/// A non-fatal input anomaly, reported alongside the grid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    /// Index of the event in the input slice
    pub event: usize,
    pub label: String,
    pub kind: DiagnosticKind,
}

impl Diagnostic {
    /// True when the event did not make it onto the grid at all
    pub fn is_dropped(&self) -> bool {
        !matches!(self.kind, DiagnosticKind::Clipped { .. })
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "'{}': {}", self.label, self.kind)
    }
}

/// Caller bugs that make a grid impossible to build.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigurationError {
    #[error("a grid needs at least one row slot")]
    EmptyRows,
    #[error("a grid needs at least one column")]
    EmptyColumns,
    #[error("row slot at position {0} is declared more than once")]
    DuplicateRow(usize),
    #[error("column at position {0} is declared more than once")]
    DuplicateColumn(usize),
}

/// Grid plus the diagnostics collected while building it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layout<R, C> {
    pub grid: Grid<R, C>,
    pub diagnostics: Vec<Diagnostic>,
}

impl<R, C> Layout<R, C> {
    /// Number of events that have an origin cell on the grid
    pub fn placed_count(&self) -> usize {
        self.grid
            .cells
            .iter()
            .flatten()
            .filter(|c| matches!(c, Cell::Origin { .. }))
            .count()
    }

    pub fn dropped(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics.iter().filter(|d| d.is_dropped())
    }
}

/// Map each axis key to its position, failing on the first repeated key.
fn index_axis<K: Eq + Hash>(keys: &[K]) -> Result<HashMap<&K, usize>, usize> {
    let mut index = HashMap::with_capacity(keys.len());
    for (pos, key) in keys.iter().enumerate() {
        if index.insert(key, pos).is_some() {
            return Err(pos);
        }
    }
    Ok(index)
}

/// Build a grid from scheduled events.
///
/// Events are grouped by column and placed in order of start row, then by
/// `tie_break`. Each event takes the lowest sub-column whose rows are free
/// for its whole span, so N events starting in the same slot land in N
/// sub-columns, left to right in tie-break order.
///
/// Events whose keys are not on the axes are dropped and spans running off
/// the bottom are clipped. Both are reported as diagnostics, never errors.
///
/// Example (`A` spans two rows, `B` starts with it):
/// ```text
///        Mon     Tue
/// 9      A   B   .
/// 10     |   .   C
/// 11     .   .   .
/// ```
pub fn build_grid<R, C>(
    events: &[ScheduledEvent<R, C>],
    row_slots: &[R],
    columns: &[C],
    tie_break: TieBreak,
) -> Result<Layout<R, C>, ConfigurationError>
where
    R: Eq + Hash + Clone,
    C: Eq + Hash + Clone,
{
    if row_slots.is_empty() {
        return Err(ConfigurationError::EmptyRows);
    }
    if columns.is_empty() {
        return Err(ConfigurationError::EmptyColumns);
    }

    let row_index = index_axis(row_slots).map_err(ConfigurationError::DuplicateRow)?;
    let column_index = index_axis(columns).map_err(ConfigurationError::DuplicateColumn)?;
    let height = row_slots.len();

    let mut diagnostics = Vec::new();

    // Group by column: (start row, event index)
    let mut per_column: Vec<Vec<(usize, usize)>> = vec![Vec::new(); columns.len()];
    for (idx, event) in events.iter().enumerate() {
        let Some(&row) = row_index.get(&event.row_key) else {
            log::warn!("dropping '{}': start slot is not on the grid", event.label);
            diagnostics.push(Diagnostic {
                event: idx,
                label: event.label.clone(),
                kind: DiagnosticKind::UnknownRow,
            });
            continue;
        };
        let Some(&col) = column_index.get(&event.column_key) else {
            log::warn!("dropping '{}': column is not on the grid", event.label);
            diagnostics.push(Diagnostic {
                event: idx,
                label: event.label.clone(),
                kind: DiagnosticKind::UnknownColumn,
            });
            continue;
        };
        per_column[col].push((row, idx));
    }

    // Lanes are sub-columns, each a full-height strip of cells
    let mut lanes_per_column: Vec<Vec<Vec<Cell>>> = Vec::with_capacity(columns.len());

    for placements in &mut per_column {
        placements.sort_by(|a, b| {
            a.0.cmp(&b.0)
                .then_with(|| tie_break.compare(events, a.1, b.1))
        });

        let mut lanes: Vec<Vec<Cell>> = Vec::new();

        for &(start, idx) in placements.iter() {
            let event = &events[idx];
            let requested = event.span.get();
            let placed = requested.min(height - start);
            if placed < requested {
                log::warn!(
                    "clipping '{}': {} rows requested, {} available",
                    event.label,
                    requested,
                    placed
                );
                diagnostics.push(Diagnostic {
                    event: idx,
                    label: event.label.clone(),
                    kind: DiagnosticKind::Clipped { requested, placed },
                });
            }
            let end = start + placed;

            // Everything placed so far starts at or above `start`, so the
            // first lane free at `start` stays free for the whole span
            let free = (0..lanes.len())
                .find(|&lane| lanes[lane][start..end].iter().all(Cell::is_empty));
            let lane = match free {
                Some(lane) => lane,
                None => {
                    lanes.push(vec![Cell::Empty; height]);
                    lanes.len() - 1
                }
            };

            let strip = &mut lanes[lane];
            strip[start] = Cell::Origin {
                event: idx,
                label: event.label.clone(),
                span: placed,
            };
            for cell in &mut strip[start + 1..end] {
                *cell = Cell::Continuation {
                    event: idx,
                    origin_row: start,
                };
            }
        }

        if lanes.is_empty() {
            lanes.push(vec![Cell::Empty; height]);
        }
        lanes_per_column.push(lanes);
    }

    // Flatten lanes into rows
    let width: usize = lanes_per_column.iter().map(Vec::len).sum();
    let mut cells: Vec<Vec<Cell>> = (0..height).map(|_| Vec::with_capacity(width)).collect();
    let mut grid_columns = Vec::with_capacity(columns.len());
    let mut offset = 0;

    for (key, lanes) in columns.iter().zip(lanes_per_column) {
        grid_columns.push(GridColumn {
            key: key.clone(),
            sub_columns: lanes.len(),
            offset,
        });
        offset += lanes.len();
        for lane in lanes {
            for (row, cell) in lane.into_iter().enumerate() {
                cells[row].push(cell);
            }
        }
    }

    diagnostics.sort_by_key(|d| d.event);

    Ok(Layout {
        grid: Grid {
            rows: row_slots.to_vec(),
            columns: grid_columns,
            cells,
        },
        diagnostics,
    })
}

/// Debug render a grid to ASCII for visual inspection.
/// Origins show the first letter of their label, continuations `|`.
pub fn debug_render_grid<R, C>(grid: &Grid<R, C>) -> String {
    let mut output = String::new();

    for row in &grid.cells {
        for cell in row {
            let ch = match cell {
                Cell::Origin { label, .. } => label.chars().next().unwrap_or('?'),
                Cell::Continuation { .. } => '|',
                Cell::Empty => '.',
            };
            output.push(ch);
        }
        output.push('\n');
    }

    output
}
