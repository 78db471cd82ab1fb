//! Row/column view of a document for editing front ends.
//!
//! Row `i` is the `i`-th trans-unit of [`Xliff::trans_units`]; column 0 is
//! the source segment and column 1 the target. Every segment change made
//! through the grid is announced to subscribed listeners.

use std::path::{Path, PathBuf};

use crate::{
    error::Error,
    load_options::LoadOptions,
    model::{TargetState, TransUnit, Xliff},
    registry::Side,
    resolver::{CursorState, TagTransfer},
};

pub const HEADERS: [&str; 2] = ["Source", "Target"];

/// Opens a document from disk.
pub fn open_document<P: AsRef<Path>>(path: P) -> Result<Xliff, Error> {
    Xliff::load(path)
}

/// Saves a document to disk.
pub fn save_document<P: AsRef<Path>>(document: &Xliff, path: P) -> Result<(), Error> {
    document.save(path)
}

/// All trans-units in row order.
pub fn all_units(document: &Xliff) -> Vec<&TransUnit> {
    document.all_trans_units()
}

/// Maps a grid column to a segment side.
pub fn column_side(column: usize) -> Option<Side> {
    match column {
        0 => Some(Side::Source),
        1 => Some(Side::Target),
        _ => None,
    }
}

/// Raised after a segment was changed through the grid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SegmentChanged {
    pub row: usize,
    pub side: Side,
    pub text: String,
}

type Listener = Box<dyn FnMut(&SegmentChanged)>;

pub struct TranslationGrid {
    document: Xliff,
    path: Option<PathBuf>,
    current_row: Option<usize>,
    modified: bool,
    listeners: Vec<Listener>,
}

impl TranslationGrid {
    pub fn new(document: Xliff) -> Self {
        TranslationGrid {
            document,
            path: None,
            current_row: None,
            modified: false,
            listeners: Vec::new(),
        }
    }

    /// Loads `path` and remembers it for [`TranslationGrid::save`].
    pub fn open<P: AsRef<Path>>(path: P, options: &LoadOptions) -> Result<Self, Error> {
        let path = path.as_ref();
        let mut grid = Self::new(Xliff::load_with(path, options)?);
        grid.path = Some(path.to_path_buf());
        if grid.row_count() > 0 {
            grid.current_row = Some(0);
        }
        Ok(grid)
    }

    pub fn document(&self) -> &Xliff {
        &self.document
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// `true` once a segment, state or tag changed since the last save.
    pub fn is_modified(&self) -> bool {
        self.modified
    }

    /// Saves back to the path the document was opened from.
    pub fn save(&mut self) -> Result<(), Error> {
        let Some(path) = self.path.clone() else {
            return Err(Error::save_error(
                PathBuf::new(),
                std::io::Error::new(std::io::ErrorKind::NotFound, "document has no path"),
            ));
        };
        self.save_as(path)
    }

    /// Saves to `path`, which becomes the document path on success.
    pub fn save_as<P: AsRef<Path>>(&mut self, path: P) -> Result<(), Error> {
        let path = path.as_ref();
        self.document.save(path)?;
        self.path = Some(path.to_path_buf());
        self.modified = false;
        Ok(())
    }

    /// Registers a listener for segment changes.
    pub fn subscribe(&mut self, listener: impl FnMut(&SegmentChanged) + 'static) {
        self.listeners.push(Box::new(listener));
    }

    pub fn row_count(&self) -> usize {
        self.document.unit_count()
    }

    pub fn column_count(&self) -> usize {
        HEADERS.len()
    }

    pub fn header(&self, column: usize) -> Option<&'static str> {
        HEADERS.get(column).copied()
    }

    pub fn unit(&self, row: usize) -> Option<&TransUnit> {
        self.document.trans_unit(row)
    }

    fn unit_mut(&mut self, row: usize) -> Result<&mut TransUnit, Error> {
        self.document
            .trans_unit_mut(row)
            .ok_or(Error::RowOutOfRange(row))
    }

    pub fn segment_text(&self, row: usize, side: Side) -> Option<&str> {
        self.unit(row).map(|unit| unit.segment_text(side))
    }

    /// Replaces a segment and notifies listeners.
    pub fn set_segment_text(
        &mut self,
        row: usize,
        side: Side,
        text: impl Into<String>,
    ) -> Result<(), Error> {
        let text = text.into();
        self.unit_mut(row)?.set_segment_text(side, text.clone());
        self.modified = true;
        self.notify(SegmentChanged { row, side, text });
        Ok(())
    }

    pub fn set_state(&mut self, row: usize, state: TargetState) -> Result<(), Error> {
        self.unit_mut(row)?.target.state = state;
        self.modified = true;
        Ok(())
    }

    /// Copies the next missing source tag into the stored target of `row`.
    pub fn copy_next_tag_from_source(
        &mut self,
        row: usize,
        cursor: &CursorState,
    ) -> Result<TagTransfer, Error> {
        let unit = self.unit_mut(row)?;
        let transfer = unit.copy_next_tag_from_source(cursor);
        if transfer.is_applied() {
            let text = unit.target.text.clone();
            self.modified = true;
            self.notify(SegmentChanged {
                row,
                side: Side::Target,
                text,
            });
        }
        Ok(transfer)
    }

    fn notify(&mut self, event: SegmentChanged) {
        log::trace!("row {} {} changed", event.row, event.side);
        for listener in &mut self.listeners {
            listener(&event);
        }
    }

    pub fn current_row(&self) -> Option<usize> {
        self.current_row
    }

    pub fn set_current_row(&mut self, row: usize) -> Result<(), Error> {
        if row >= self.row_count() {
            return Err(Error::RowOutOfRange(row));
        }
        self.current_row = Some(row);
        Ok(())
    }

    /// Moves one row up or down. Stays put at either end.
    pub fn move_to_adjacent(&mut self, previous: bool) -> Option<usize> {
        let current = self.current_row?;
        let next = if previous {
            current.checked_sub(1)
        } else {
            Some(current + 1).filter(|row| *row < self.row_count())
        };
        if let Some(row) = next {
            self.current_row = Some(row);
        }
        self.current_row
    }

    /// Jumps to the first or last row.
    pub fn move_to_first_or_last(&mut self, first: bool) -> Option<usize> {
        let rows = self.row_count();
        if rows == 0 {
            return None;
        }
        self.current_row = Some(if first { 0 } else { rows - 1 });
        self.current_row
    }

    /// Source texts of the rows before and after the current one.
    pub fn neighbours(&self) -> (Option<&str>, Option<&str>) {
        let Some(current) = self.current_row else {
            return (None, None);
        };
        let previous = current
            .checked_sub(1)
            .and_then(|row| self.segment_text(row, Side::Source));
        let next = self.segment_text(current + 1, Side::Source);
        (previous, next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Body, File, Group};
    use std::{cell::RefCell, rc::Rc};

    fn grid_with(units: Vec<TransUnit>) -> TranslationGrid {
        let document = Xliff {
            files: vec![File {
                body: Body {
                    groups: vec![Group {
                        trans_units: units,
                        ..Group::default()
                    }],
                },
                ..File::default()
            }],
            ..Xliff::default()
        };
        TranslationGrid::new(document)
    }

    fn sample_grid() -> TranslationGrid {
        grid_with(vec![
            TransUnit::new("1", "one", ""),
            TransUnit::new("2", "two {1>x<1}", ""),
            TransUnit::new("3", "three", ""),
        ])
    }

    #[test]
    fn test_shape() {
        let grid = sample_grid();
        assert_eq!(grid.row_count(), 3);
        assert_eq!(grid.column_count(), 2);
        assert_eq!(grid.header(0), Some("Source"));
        assert_eq!(grid.header(1), Some("Target"));
        assert_eq!(grid.header(2), None);
        assert_eq!(column_side(1), Some(Side::Target));
        assert_eq!(column_side(5), None);
    }

    #[test]
    fn test_set_segment_text_notifies() {
        let mut grid = sample_grid();
        let events = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&events);
        grid.subscribe(move |event| sink.borrow_mut().push(event.clone()));

        grid.set_segment_text(1, Side::Target, "zwei").unwrap();
        assert_eq!(grid.segment_text(1, Side::Target), Some("zwei"));
        assert!(grid.is_modified());
        assert_eq!(
            events.borrow().as_slice(),
            &[SegmentChanged {
                row: 1,
                side: Side::Target,
                text: "zwei".to_string()
            }]
        );
    }

    #[test]
    fn test_out_of_range_row() {
        let mut grid = sample_grid();
        let err = grid.set_segment_text(9, Side::Target, "x").unwrap_err();
        assert!(matches!(err, Error::RowOutOfRange(9)));
        assert!(grid.segment_text(9, Side::Source).is_none());
        assert!(!grid.is_modified());
    }

    #[test]
    fn test_copy_tag_notifies_only_when_applied() {
        let mut grid = sample_grid();
        let count = Rc::new(RefCell::new(0));
        let sink = Rc::clone(&count);
        grid.subscribe(move |_| *sink.borrow_mut() += 1);

        let transfer = grid.copy_next_tag_from_source(0, &CursorState::at(0)).unwrap();
        assert_eq!(transfer, TagTransfer::NothingMissing);
        assert_eq!(*count.borrow(), 0);

        let transfer = grid.copy_next_tag_from_source(1, &CursorState::at(0)).unwrap();
        assert!(transfer.is_applied());
        assert_eq!(grid.segment_text(1, Side::Target), Some("{1>"));
        assert_eq!(*count.borrow(), 1);
    }

    #[test]
    fn test_navigation() {
        let mut grid = sample_grid();
        assert_eq!(grid.move_to_adjacent(false), None);
        grid.set_current_row(0).unwrap();
        assert_eq!(grid.move_to_adjacent(true), Some(0));
        assert_eq!(grid.move_to_adjacent(false), Some(1));
        assert_eq!(grid.neighbours(), (Some("one"), Some("three")));
        assert_eq!(grid.move_to_first_or_last(false), Some(2));
        assert_eq!(grid.move_to_adjacent(false), Some(2));
        assert_eq!(grid.neighbours(), (Some("two {1>x<1}"), None));
        assert_eq!(grid.move_to_first_or_last(true), Some(0));
        assert!(grid.set_current_row(3).is_err());
    }

    #[test]
    fn test_save_without_path_fails() {
        let mut grid = sample_grid();
        assert!(matches!(grid.save(), Err(Error::Save { .. })));
    }

    #[test]
    fn test_set_state() {
        let mut grid = sample_grid();
        grid.set_state(2, TargetState::Translated).unwrap();
        assert_eq!(grid.unit(2).unwrap().target.state, TargetState::Translated);
    }
}
