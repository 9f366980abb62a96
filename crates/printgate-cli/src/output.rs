use crate::cli::OutputFormat;
use anyhow::Result;
use colored::Colorize;
use serde_json::Value;
use tabled::builder::Builder;
use tabled::settings::Style;

pub fn print_json(value: &Value) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

pub fn print_success(msg: &str) {
    println!("{} {}", "✓".green(), msg);
}

pub fn print_error(msg: &str) {
    eprintln!("{} {}", "✗".red(), msg);
}

/// Prints a queue listing (`{"printer", "jobs": [{"id", "filename"}]}`).
pub fn print_queue(listing: &Value, format: OutputFormat) -> Result<()> {
    if format == OutputFormat::Json {
        return print_json(listing);
    }

    let printer = listing.get("printer").and_then(Value::as_str).unwrap_or("-");
    let jobs = listing
        .get("jobs")
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or_default();

    println!("{} {}", "Print queue for".cyan(), printer.cyan());
    if jobs.is_empty() {
        println!("Queue is empty.");
        return Ok(());
    }
    println!("{}", jobs_table(jobs));
    Ok(())
}

fn jobs_table(jobs: &[Value]) -> String {
    let mut builder = Builder::default();
    builder.push_record(["Position", "Job", "File"]);
    for (position, job) in jobs.iter().enumerate() {
        let id = job
            .get("id")
            .and_then(Value::as_u64)
            .map_or_else(|| "-".to_string(), |id| id.to_string());
        let file = job.get("filename").and_then(Value::as_str).unwrap_or("-");
        builder.push_record([(position + 1).to_string(), id, file.to_string()]);
    }
    builder.build().with(Style::rounded()).to_string()
}

/// Prints a flat JSON object as `Key: value` lines, or as JSON.
pub fn print_fields(value: &Value, format: OutputFormat) -> Result<()> {
    if format == OutputFormat::Json {
        return print_json(value);
    }
    if let Some(obj) = value.as_object() {
        for (key, val) in obj {
            let rendered = match val {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            println!("{}: {}", key.cyan(), rendered);
        }
    } else {
        print_json(value)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_jobs_table_lists_positions() {
        let jobs = json!([
            { "id": 3, "filename": "urgent.pdf" },
            { "id": 1, "filename": "a.pdf" }
        ]);
        let table = jobs_table(jobs.as_array().unwrap());
        assert!(table.contains("urgent.pdf"));
        assert!(table.contains("Position"));
        let urgent = table.find("urgent.pdf").unwrap();
        let a = table.find("a.pdf").unwrap();
        assert!(urgent < a);
    }
}
