//! `list-pipes` and `get-pipe` handlers

use anyhow::{Context, Result};
use sng_inspect::{get_pipe, list_pipes, Cancellation, Error, PipeRow, PipeTable, Target};

pub const NO_ID: &str = "[no ID]";
pub const UNKNOWN_LOCATION: &str = "[unknown location]";

/// Outcome of `get-pipe` that the caller turns into an exit status
#[derive(Debug, PartialEq, Eq)]
pub enum GetPipeOutcome {
    Found,
    InvalidIndex,
}

/// Handle the list-pipes command
pub fn handle_list_pipes(target: &Target<'_>, cancel: &Cancellation) -> Result<()> {
    let table = PipeTable::locate(target).context("Failed to locate initialized pipes")?;
    let rows = list_pipes(target, &table, cancel)?;

    println!();
    for row in &rows {
        println!("{}", format_row(row));
    }
    println!();

    Ok(())
}

/// One listing line: `[index]\t id:plugin (location)`
pub fn format_row(row: &PipeRow) -> String {
    match &row.driver {
        Ok(driver) => {
            let location = driver
                .location
                .as_ref()
                .map(|l| l.to_string())
                .unwrap_or_else(|| UNKNOWN_LOCATION.to_string());
            format!(
                "[{}]\t {}:{} ({})",
                row.index,
                driver.id.as_deref().unwrap_or(NO_ID),
                driver.plugin_name,
                location
            )
        }
        Err(e) => format!("[{}]\t <unreadable: {}>", row.index, e),
    }
}

/// Handle the get-pipe command
pub fn handle_get_pipe(target: &Target<'_>, index: usize) -> Result<GetPipeOutcome> {
    let table = PipeTable::locate(target).context("Failed to locate initialized pipes")?;

    match get_pipe(target, &table, index) {
        Ok(pipe) => {
            println!("(LogPipe *) {}", pipe);
            Ok(GetPipeOutcome::Found)
        }
        Err(Error::InvalidIndex { .. }) => {
            eprintln!("Invalid index, use sng-inspect list-pipes");
            Ok(GetPipeOutcome::InvalidIndex)
        }
        Err(e) => Err(e).context("Failed to read pipe slot"),
    }
}
