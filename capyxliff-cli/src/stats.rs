use capyxliff::{TargetState, Xliff};
use serde_json::json;

#[derive(Default)]
struct UnitStats {
    total: usize,
    by_state: Vec<(TargetState, usize)>,
    done: usize,
    not_translatable: usize,
}

impl UnitStats {
    fn collect(document: &Xliff) -> Self {
        let mut stats = UnitStats {
            by_state: TargetState::ALL.iter().map(|state| (*state, 0)).collect(),
            ..UnitStats::default()
        };
        for unit in document.trans_units() {
            stats.total += 1;
            if !unit.translate {
                stats.not_translatable += 1;
                continue;
            }
            if let Some(entry) = stats
                .by_state
                .iter_mut()
                .find(|(state, _)| *state == unit.target.state)
            {
                entry.1 += 1;
            }
            if unit.target.state.is_done() {
                stats.done += 1;
            }
        }
        stats
    }

    fn completion_percent(&self) -> f64 {
        let denominator = self.total - self.not_translatable;
        if denominator == 0 {
            100.0
        } else {
            let percent = (self.done as f64) * 100.0 / (denominator as f64);
            (percent * 100.0).round() / 100.0
        }
    }
}

pub fn print_stats(document: &Xliff, json_output: bool) -> Result<(), String> {
    let stats = UnitStats::collect(document);

    if json_output {
        let by_state: serde_json::Map<String, serde_json::Value> = stats
            .by_state
            .iter()
            .map(|(state, count)| (state.as_str().to_string(), json!(count)))
            .collect();
        let body = json!({
            "source_language": document.source_language(),
            "target_language": document.target_language(),
            "files": document.files.len(),
            "total": stats.total,
            "not_translatable": stats.not_translatable,
            "by_state": by_state,
            "completion_percent": stats.completion_percent(),
        });
        let text = serde_json::to_string_pretty(&body).map_err(|e| e.to_string())?;
        println!("{}", text);
        return Ok(());
    }

    println!("=== Stats ===");
    println!("Files: {}", document.files.len());
    println!("Units: {}", stats.total);
    println!("Not translatable: {}", stats.not_translatable);
    println!("By state:");
    for (state, count) in stats.by_state.iter().filter(|(_, count)| *count > 0) {
        println!("  {}: {}", state, count);
    }
    println!("Completion: {:.2}%", stats.completion_percent());
    Ok(())
}
