use postboard::presentation::OutputFormat;
use postboard::presentation::views::{RenderError, render_json};
use serde::Serialize;

/// Print `value` as pretty JSON or as the text produced by `text`.
pub fn print_output<T, F>(format: OutputFormat, value: &T, text: F) -> Result<(), RenderError>
where
    T: Serialize,
    F: FnOnce() -> Result<String, RenderError>,
{
    let out = match format {
        OutputFormat::Json => render_json(value)?,
        OutputFormat::Text => text()?,
    };
    println!("{out}");
    Ok(())
}
