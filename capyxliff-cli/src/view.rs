use capyxliff::{Side, Xliff};
use serde_json::json;

use crate::truncate;

const PREVIEW_CHARS: usize = 50;

/// Print every trans-unit of a document.
pub fn print_view(document: &Xliff, full: bool, json_output: bool) -> Result<(), String> {
    if json_output {
        let units: Vec<_> = document
            .trans_units()
            .enumerate()
            .map(|(index, unit)| {
                json!({
                    "index": index,
                    "id": unit.id,
                    "translate": unit.translate,
                    "state": unit.target.state,
                    "source": unit.source.text,
                    "target": unit.target.text,
                    "source_tags": unit.tags.tags(Side::Source),
                    "target_tags": unit.tags.tags(Side::Target),
                })
            })
            .collect();
        let body = json!({
            "source_language": document.source_language(),
            "target_language": document.target_language(),
            "units": units,
        });
        let text = serde_json::to_string_pretty(&body).map_err(|e| e.to_string())?;
        println!("{}", text);
        return Ok(());
    }

    println!(
        "Languages: {} -> {}",
        document.source_language(),
        document.target_language()
    );
    println!("Units: {}", document.unit_count());

    let shorten = |value: &str| {
        if full {
            value.to_string()
        } else {
            truncate(value, PREVIEW_CHARS)
        }
    };

    for (index, unit) in document.trans_units().enumerate() {
        println!("\n  Unit {}: {}", index + 1, unit.id_or_empty());
        println!("    State: {}", unit.target.state);
        if !unit.translate {
            println!("    Translate: no");
        }
        println!("    Source: {}", shorten(&unit.source.text));
        println!("    Target: {}", shorten(&unit.target.text));
        for tag in unit.tags.tags(Side::Source) {
            println!("    Tag {}", tag);
        }
    }
    Ok(())
}
