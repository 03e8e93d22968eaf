use anyhow::Result;
use std::io::Write;

use crate::config::OutputFormat;
use crate::report::ProjectReport;

use super::releases::render_report;

/// Writes project reports in the requested format, in the given order.
pub fn export_reports(
    reports: &[ProjectReport],
    format: OutputFormat,
    pretty: bool,
    output: &mut dyn Write,
) -> Result<()> {
    match format {
        OutputFormat::Table => export_tables(reports, output),
        OutputFormat::Json => export_json(reports, pretty, output),
        OutputFormat::Csv => export_csv(reports, output),
    }
}

fn export_tables(reports: &[ProjectReport], output: &mut dyn Write) -> Result<()> {
    for report in reports {
        writeln!(output, "{}", render_report(report))?;
    }
    Ok(())
}

fn export_json(reports: &[ProjectReport], pretty: bool, output: &mut dyn Write) -> Result<()> {
    let json = if pretty {
        serde_json::to_string_pretty(reports)?
    } else {
        serde_json::to_string(reports)?
    };
    writeln!(output, "{json}")?;
    Ok(())
}

fn export_csv(reports: &[ProjectReport], output: &mut dyn Write) -> Result<()> {
    writeln!(output, "Project,Tag,Name,CreatedAt,QS_Tag,Content,Link")?;

    for report in reports {
        for row in &report.releases {
            let fields: [&str; 7] = [
                report.project.name.as_str(),
                &row.tag,
                &row.name,
                &row.created_at,
                &row.qs_tag,
                &row.content,
                &row.link,
            ];
            let line: Vec<String> = fields.iter().map(|field| csv_field(field)).collect();
            writeln!(output, "{}", line.join(","))?;
        }
    }

    Ok(())
}

fn csv_field(value: &str) -> String {
    if value.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}
