use capyxliff::{TargetState, Xliff};

use crate::{load_document, write_back};

fn parse_state_opt(state: &Option<String>) -> Result<Option<TargetState>, String> {
    state
        .as_deref()
        .map(|s| s.parse::<TargetState>().map_err(|e| e.to_string()))
        .transpose()
}

/// Sets the target text and/or state of one unit, then saves.
pub fn run_edit_command(
    input: String,
    unit_id: String,
    target: Option<String>,
    state: Option<String>,
    output: Option<String>,
) -> Result<(), String> {
    if target.is_none() && state.is_none() {
        return Err("Nothing to edit; pass --target and/or --state".to_string());
    }
    let state = parse_state_opt(&state)?;

    let mut document = load_document(&input)?;
    apply_edit(&mut document, &unit_id, target, state)?;
    write_back(&document, &input, &output)?;
    println!("✅ Updated unit '{}'", unit_id);
    Ok(())
}

fn apply_edit(
    document: &mut Xliff,
    unit_id: &str,
    target: Option<String>,
    state: Option<TargetState>,
) -> Result<(), String> {
    let unit = document
        .find_trans_unit_mut(unit_id)
        .ok_or_else(|| format!("Unit '{}' not found in input", unit_id))?;
    if let Some(text) = target {
        unit.target.text = text;
    }
    if let Some(state) = state {
        unit.target.state = state;
    }
    log::debug!("unit {} is now: {}", unit_id, unit);
    Ok(())
}
