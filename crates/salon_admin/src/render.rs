use salon_core::{ListViewModel, LoadMode, Phase};

const MAX_CELL_WIDTH: usize = 32;

/// Renders the view as a plain-text table followed by a summary line.
pub fn render(view: &ListViewModel) -> String {
    let columns = view.collection.columns();
    let rows: Vec<Vec<String>> = view
        .rows
        .iter()
        .map(|record| {
            columns
                .iter()
                .map(|column| clip(&record.display_field(column)))
                .collect()
        })
        .collect();

    let widths: Vec<usize> = columns
        .iter()
        .enumerate()
        .map(|(i, column)| {
            rows.iter()
                .map(|row| row[i].chars().count())
                .chain(std::iter::once(column.len()))
                .max()
                .unwrap_or_default()
        })
        .collect();

    let mut out = String::new();
    if let Some(notice) = &view.notice {
        out.push_str(&format!("! {notice}\n"));
    }
    if view.login_required {
        out.push_str("! session expired: log in again and retry\n");
    }
    if !rows.is_empty() {
        push_row(&mut out, columns.iter().map(|c| c.to_string()), &widths);
        push_row(&mut out, widths.iter().map(|w| "-".repeat(*w)), &widths);
        for row in rows {
            push_row(&mut out, row.into_iter(), &widths);
        }
    }
    out.push_str(&summary(view));
    out.push('\n');
    out
}

fn push_row(out: &mut String, cells: impl Iterator<Item = String>, widths: &[usize]) {
    let line = cells
        .zip(widths.iter().copied())
        .map(|(cell, width)| format!("{cell:<width$}"))
        .collect::<Vec<_>>()
        .join("  ");
    out.push_str(line.trim_end());
    out.push('\n');
}

fn clip(cell: &str) -> String {
    if cell.chars().count() <= MAX_CELL_WIDTH {
        return cell.to_string();
    }
    let mut clipped: String = cell.chars().take(MAX_CELL_WIDTH - 1).collect();
    clipped.push('…');
    clipped
}

fn summary(view: &ListViewModel) -> String {
    let mut line = match (view.phase, view.mode) {
        (Phase::Failed, _) => format!("Failed to load {}", view.collection),
        (Phase::Idle, _) => format!("{}: nothing loaded", view.collection),
        (Phase::Loading, _) => format!("{}: still loading", view.collection),
        (Phase::Loaded, LoadMode::All) => {
            format!("Loaded {} {}", view.rows.len(), view.collection)
        }
        (Phase::Loaded, LoadMode::Paged { page }) => format!(
            "Showing {} of {} {} (page {}/{})",
            view.rows.len(),
            view.total,
            view.collection,
            page,
            view.page_count.max(1)
        ),
    };
    if let Some(filter) = &view.filter {
        let parts: Vec<String> = filter
            .query_pairs()
            .into_iter()
            .map(|(key, value)| format!("{key}={value:?}"))
            .collect();
        line.push_str(&format!(" [{}]", parts.join(", ")));
    }
    if let Some(sort) = &view.sort {
        line.push_str(&format!(" sorted by {sort}"));
    }
    line
}
