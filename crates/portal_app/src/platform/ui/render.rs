use std::fmt::Write;

use portal_core::{
    AppViewModel, DateInputMode, DocumentsView, FormView, ReportRowView, Severity, Tab,
    UploadFormat, UploadView,
};

const CONTENT_PREVIEW_CHARS: usize = 60;

/// Renders the tab bar, the notice line and the active tab as plain text.
pub fn render(view: &AppViewModel) -> String {
    let mut out = String::new();
    out.push_str(&tab_bar(view));
    out.push('\n');
    if let Some(notice) = &view.notice {
        let tag = match notice.severity {
            Severity::Info => "info",
            Severity::Success => "ok",
            Severity::Error => "error",
        };
        let _ = writeln!(out, "[{tag}] {}", notice.text);
    }
    out.push('\n');
    match view.tab {
        Tab::Request => render_form(&mut out, &view.form),
        Tab::Reports => render_reports(&mut out, &view.reports),
        Tab::Documents => render_documents(&mut out, &view.documents),
        Tab::Upload => render_upload(&mut out, &view.upload),
    }
    out
}

fn tab_bar(view: &AppViewModel) -> String {
    let tabs = [
        (Tab::Request, "Request".to_string()),
        (Tab::Reports, format!("Reports ({})", view.reports.len())),
        (Tab::Documents, "Documents".to_string()),
        (Tab::Upload, "Upload".to_string()),
    ];
    tabs.iter()
        .map(|(tab, label)| {
            if *tab == view.tab {
                format!("[{label}]")
            } else {
                format!(" {label} ")
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn render_form(out: &mut String, form: &FormView) {
    let mode = match form.date_mode {
        DateInputMode::Single => "single",
        DateInputMode::Range => "range",
        DateInputMode::Preset => "preset",
    };
    let date = match &form.date_label {
        Some(label) => label.to_string(),
        None => "-".to_string(),
    };
    let _ = writeln!(out, "Location : {}", or_dash(&form.location));
    let _ = writeln!(out, "Date     : ({mode}) {date}");
    let _ = writeln!(out, "Email    : {}", or_dash(&form.email));
    let _ = writeln!(
        out,
        "CSV      : {}",
        form.csv_filename.as_deref().unwrap_or("-")
    );
    let status = if form.submitting {
        "generating report..."
    } else if form.can_submit {
        "ready"
    } else {
        "busy"
    };
    let _ = writeln!(out, "Status   : {status}");
}

fn render_reports(out: &mut String, reports: &[ReportRowView]) {
    if reports.is_empty() {
        out.push_str("No reports generated yet.\n");
        return;
    }
    for (index, report) in reports.iter().enumerate() {
        let _ = writeln!(
            out,
            "{:>3}. {}  {}  {}  generated {}",
            index + 1,
            report.location,
            report.date_label,
            report.email,
            report.generated_at.format("%Y-%m-%d %H:%M UTC")
        );
        let busy = if report.downloading { " (downloading)" } else { "" };
        let _ = writeln!(out, "     {} -> {}{busy}", report.download_url, report.filename);
    }
}

fn render_documents(out: &mut String, documents: &DocumentsView) {
    if documents.loading {
        out.push_str("Loading documents...\n");
    }
    if documents.total == 0 {
        if !documents.loading {
            out.push_str("No documents loaded. Use `docs` to fetch the latest rows.\n");
        }
        return;
    }
    let _ = write!(
        out,
        "Showing {} of {} documents",
        documents.rows.len(),
        documents.total
    );
    if !documents.filter.is_empty() {
        out.push_str(" (filtered)");
    }
    out.push('\n');
    for row in &documents.rows {
        let date = row
            .date
            .map(|d| d.format("%Y-%m-%d").to_string())
            .unwrap_or_else(|| "----------".to_string());
        let _ = writeln!(
            out,
            "#{:<5} {date}  {}  {}  {}  {}",
            row.id,
            or_dash(&row.location),
            or_dash(&row.doc_type),
            or_dash(&row.source),
            preview(&row.content)
        );
    }
}

fn render_upload(out: &mut String, upload: &UploadView) {
    let format = match upload.format {
        UploadFormat::Multipart => "multipart",
        UploadFormat::Json => "json",
    };
    let _ = writeln!(out, "File    : {}", upload.filename.as_deref().unwrap_or("-"));
    let _ = writeln!(
        out,
        "Webhook : {}",
        upload.webhook_url.as_deref().unwrap_or("(configured default)")
    );
    let _ = writeln!(out, "Format  : {format}");
    if upload.busy {
        out.push_str("Uploading...\n");
    }
}

fn or_dash(text: &str) -> &str {
    if text.trim().is_empty() {
        "-"
    } else {
        text
    }
}

fn preview(content: &str) -> String {
    let flat = content.split_whitespace().collect::<Vec<_>>().join(" ");
    if flat.chars().count() <= CONTENT_PREVIEW_CHARS {
        return flat;
    }
    let cut: String = flat.chars().take(CONTENT_PREVIEW_CHARS).collect();
    format!("{cut}...")
}
