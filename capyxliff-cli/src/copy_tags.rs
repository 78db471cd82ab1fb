use capyxliff::{CursorState, Side, TagTransfer, TransUnit, Xliff};

use crate::{load_document, write_back};

/// Appends every missing source tag to the end of the target, in source
/// order. Returns the number of tags copied.
pub fn fill_missing_tags(unit: &mut TransUnit) -> usize {
    let mut target = unit.editable(Side::Target);
    let mut copied = 0;
    // Each applied transfer removes one missing tag, so this terminates.
    loop {
        let cursor = CursorState::at(target.len());
        match unit.copy_next_tag_into(&mut target, &cursor) {
            TagTransfer::Applied(edit) => {
                log::trace!("unit {}: copied {}", unit.id_or_empty(), edit.token);
                copied += 1;
            }
            TagTransfer::NothingMissing | TagTransfer::CannotWrap(_) => break,
        }
    }
    if copied > 0 {
        unit.target.text = target.to_markup();
    }
    copied
}

fn fill_document(document: &mut Xliff, unit_id: Option<&str>) -> Result<usize, String> {
    match unit_id {
        Some(id) => {
            let unit = document
                .find_trans_unit_mut(id)
                .ok_or_else(|| format!("Unit '{}' not found in input", id))?;
            Ok(fill_missing_tags(unit))
        }
        None => Ok(document
            .trans_units_mut()
            .filter(|unit| unit.translate)
            .map(fill_missing_tags)
            .sum()),
    }
}

pub fn run_copy_tags_command(
    input: String,
    unit_id: Option<String>,
    output: Option<String>,
) -> Result<(), String> {
    let mut document = load_document(&input)?;
    let copied = fill_document(&mut document, unit_id.as_deref())?;
    write_back(&document, &input, &output)?;
    println!("✅ Copied {} tag(s)", copied);
    Ok(())
}
