use is_terminal::IsTerminal;
use owo_colors::OwoColorize;
use sdui_types::{LayoutVariant, ViewModel, ViewState};

/// Colors only when stdout is a terminal and NO_COLOR is unset
pub fn use_color() -> bool {
    std::io::stdout().is_terminal() && std::env::var_os("NO_COLOR").is_none()
}

fn status(state: &ViewState, color: bool) -> String {
    let text = match state {
        ViewState::NotReady => "not ready",
        ViewState::Ready(_) => "ready",
        ViewState::Degraded { .. } => "degraded",
    };
    if !color {
        return text.to_string();
    }
    match state {
        ViewState::NotReady => text.yellow().to_string(),
        ViewState::Ready(_) => text.green().to_string(),
        ViewState::Degraded { .. } => text.red().to_string(),
    }
}

fn describe_layout(variant: &LayoutVariant) -> String {
    match variant {
        LayoutVariant::List => "list".to_string(),
        LayoutVariant::Grid { columns: 1 } => "grid (1 column)".to_string(),
        LayoutVariant::Grid { columns } => format!("grid ({} columns)", columns),
    }
}

fn view_model_lines(vm: &ViewModel, color: bool) -> Vec<String> {
    let favorites = if vm.layout_meta.favorites_enabled {
        "enabled"
    } else {
        "disabled"
    };

    let mut lines = vec![
        format!(
            "  layout     {}",
            describe_layout(&vm.layout_meta.layout_variant)
        ),
        format!("  favorites  {}", favorites),
        format!("  items      {}", vm.items.len()),
    ];

    for item in &vm.items {
        let marker = if item.is_favorite { "*" } else { " " };
        let title = if color {
            item.title.bold().to_string()
        } else {
            item.title.clone()
        };
        if item.description.is_empty() {
            lines.push(format!("    {} {}  {}", marker, item.id, title));
        } else {
            lines.push(format!(
                "    {} {}  {}  {}",
                marker, item.id, title, item.description
            ));
        }
    }
    lines
}

/// Human-readable rendering of a published state, newline terminated
pub fn render_state(state: &ViewState, color: bool) -> String {
    let mut lines = Vec::new();

    match state {
        ViewState::NotReady => lines.push(status(state, color)),
        ViewState::Ready(vm) => {
            lines.push(status(state, color));
            lines.extend(view_model_lines(vm, color));
        }
        ViewState::Degraded { last_good, error } => {
            lines.push(format!("{}: {}", status(state, color), error));
            match last_good {
                Some(vm) => {
                    lines.push("  last good view model:".to_string());
                    lines.extend(view_model_lines(vm, color));
                }
                None => lines.push("  nothing rendered yet".to_string()),
            }
        }
    }

    let mut out = lines.join("\n");
    out.push('\n');
    out
}
