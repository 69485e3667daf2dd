use sgaudit_types::{RunReport, RunStatus};

pub fn render_markdown(report: &RunReport) -> String {
    let mut out = String::new();

    out.push_str("# sgaudit report\n\n");
    let status = match report.status {
        RunStatus::Success => "SUCCESS",
        RunStatus::Failure => "FAILURE",
    };
    let c = &report.counts;
    out.push_str(&format!(
        "- Status: **{}**\n- Security groups: {}\n- Evaluations: {}\n- Published results: {}\n\n",
        status, c.resources, c.evaluations, c.published
    ));

    out.push_str("| Observations | Satisfied | Not satisfied | Risks |\n");
    out.push_str("|---:|---:|---:|---:|\n");
    out.push_str(&format!(
        "| {} | {} | {} | {} |\n\n",
        c.observations, c.findings_satisfied, c.findings_not_satisfied, c.risks
    ));

    if !report.errors.is_empty() {
        out.push_str("## Errors\n\n");
        for e in &report.errors {
            // Errors may span lines; keep each one a single list item.
            out.push_str(&format!("- {}\n", e.replace('\n', " ")));
        }
        out.push('\n');
    }

    if report.streams.is_empty() {
        out.push_str("No results published.\n");
        return out;
    }

    out.push_str("## Streams\n\n");
    for s in &report.streams {
        out.push_str(&format!(
            "- `{}` / `{}`: `{}`\n",
            s.resource_id, s.policy_path, s.stream_id
        ));
    }

    out
}
