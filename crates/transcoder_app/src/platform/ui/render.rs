use transcoder_core::{AppViewModel, PreviewSource};

use super::constants::LOADING_LABEL;

/// Renders the session view as terminal lines.
///
/// `preview_url` is the blob reference currently bound to `view.preview`.
pub fn render(view: &AppViewModel, preview_url: Option<&str>) -> Vec<String> {
    let mut lines = Vec::new();

    if view.loading {
        lines.push(LOADING_LABEL.to_string());
    }

    if let Some(name) = &view.input_name {
        lines.push(format!("file: {name}"));
    }

    if let (Some(binding), Some(url)) = (view.preview, preview_url) {
        let source = match binding.source {
            PreviewSource::Input => "input",
            PreviewSource::Output => "output",
        };
        lines.push(format!("preview ({source}): {url}"));
    }

    if let Some(len) = view.output_len {
        lines.push(format!("output.mp4: {}", format_bytes(len)));
    }

    if let Some(label) = view.action.label() {
        let suffix = if view.action_enabled { "" } else { " (busy)" };
        lines.push(format!("[{label}]{suffix}"));
    }

    if !view.status.is_empty() {
        lines.push(format!("status: {}", view.status));
    }

    lines
}

fn format_bytes(len: usize) -> String {
    const KIB: f64 = 1024.0;
    const MIB: f64 = KIB * 1024.0;
    let len_f = len as f64;
    if len_f >= MIB {
        format!("{:.1} MiB", len_f / MIB)
    } else if len_f >= KIB {
        format!("{:.1} KiB", len_f / KIB)
    } else {
        format!("{len} B")
    }
}
