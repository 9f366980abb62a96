use anyhow::Result;
use colored::Colorize;
use serde_json::Value;

use crate::cli::OutputFormat;
use crate::client::PrintgateClient;
use crate::output::{print_json, print_queue, print_success};

pub async fn print(
    client: &PrintgateClient,
    printer: &str,
    file: &str,
    format: OutputFormat,
) -> Result<()> {
    let job = client.submit(printer, file).await?;
    if format == OutputFormat::Json {
        return print_json(&job);
    }
    let id = job.get("id").and_then(|v| v.as_u64()).unwrap_or_default();
    print_success(&format!(
        "Print job {} added to queue for {}",
        id.to_string().cyan(),
        printer.cyan()
    ));
    Ok(())
}

pub async fn queue(client: &PrintgateClient, printer: &str, format: OutputFormat) -> Result<()> {
    let listing = client.list_queue(printer).await?;
    print_queue(&listing, format)
}

/// Promotes a job. The server decides whether that means the front or the
/// back of the queue, so the new position is read back rather than assumed.
pub async fn top_queue(client: &PrintgateClient, printer: &str, job: u64) -> Result<()> {
    client.promote(printer, job).await?;
    let placement = client
        .list_queue(printer)
        .await
        .ok()
        .and_then(|listing| position_of(&listing, job));

    let job_label = job.to_string();
    let message = match placement {
        Some((position, total)) => format!(
            "Moved job {} to position {position} of {total} in queue for {}",
            job_label.cyan(),
            printer.cyan()
        ),
        None => format!(
            "Promoted job {} in queue for {}",
            job_label.cyan(),
            printer.cyan()
        ),
    };
    print_success(&message);
    Ok(())
}

/// 1-based position of `job` in a queue listing, with the queue length.
fn position_of(listing: &Value, job: u64) -> Option<(usize, usize)> {
    let jobs = listing.get("jobs")?.as_array()?;
    let index = jobs
        .iter()
        .position(|entry| entry.get("id").and_then(Value::as_u64) == Some(job))?;
    Some((index + 1, jobs.len()))
}

pub async fn status(client: &PrintgateClient, printer: &str, format: OutputFormat) -> Result<()> {
    let status = client.status(printer).await?;
    if format == OutputFormat::Json {
        return print_json(&status);
    }
    let running = status.get("running").and_then(|v| v.as_bool()).unwrap_or(false);
    let length = status
        .get("queue_length")
        .and_then(|v| v.as_u64())
        .unwrap_or_default();
    let state = if running {
        "Running".green()
    } else {
        "Stopped".red()
    };
    println!(
        "Printer {} - Status: {}, Queue size: {}",
        printer.cyan(),
        state,
        length
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_position_of_front_and_back() {
        let front = json!({ "printer": "lobby", "jobs": [{ "id": 3 }, { "id": 1 }, { "id": 2 }] });
        assert_eq!(position_of(&front, 3), Some((1, 3)));

        let back = json!({ "printer": "lobby", "jobs": [{ "id": 1 }, { "id": 2 }, { "id": 3 }] });
        assert_eq!(position_of(&back, 3), Some((3, 3)));
    }

    #[test]
    fn test_position_of_missing_job() {
        let listing = json!({ "printer": "lobby", "jobs": [{ "id": 1 }] });
        assert_eq!(position_of(&listing, 7), None);
        assert_eq!(position_of(&json!(null), 1), None);
    }
}
