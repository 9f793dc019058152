//! Server-rendered HTML views.
//!
//! Handlers describe *what* to show as a [`View`]; a [`Renderer`] turns it
//! into a page. [`HtmlRenderer`] is the built-in renderer: every view is
//! wrapped in a shared layout and all interpolated text is escaped.

use chrono::{DateTime, Utc};
use replog_core::Entry;
use std::fmt::{self, Write};

/// A page and the data it needs
#[derive(Debug)]
pub enum View<'a> {
    /// The log, newest first
    Index { entries: &'a [Entry] },
    /// Empty creation form
    New,
    /// Form pre-filled with an existing entry
    Edit { entry: &'a Entry },
}

impl View<'_> {
    pub fn name(&self) -> &'static str {
        match self {
            View::Index { .. } => "index",
            View::New => "new",
            View::Edit { .. } => "edit",
        }
    }

    fn title(&self) -> &'static str {
        match self {
            View::Index { .. } => "Workout Log",
            View::New => "New Entry",
            View::Edit { .. } => "Edit Entry",
        }
    }
}

/// Produces HTML for a view
pub trait Renderer: Send + Sync {
    fn render(&self, view: &View<'_>) -> Result<String, fmt::Error>;
}

/// Built-in renderer writing HTML directly
#[derive(Clone, Debug, Default)]
pub struct HtmlRenderer;

impl Renderer for HtmlRenderer {
    fn render(&self, view: &View<'_>) -> Result<String, fmt::Error> {
        let mut body = String::new();
        match view {
            View::Index { entries } => render_index(&mut body, entries)?,
            View::New => render_form(&mut body, None)?,
            View::Edit { entry } => render_form(&mut body, Some(*entry))?,
        }

        let mut page = String::with_capacity(body.len() + 512);
        render_layout(&mut page, view.title(), &body)?;
        Ok(page)
    }
}

// ============================================================================
// Layout
// ============================================================================

fn render_layout(out: &mut String, title: &str, body: &str) -> fmt::Result {
    write!(
        out,
        r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="utf-8">
  <meta name="viewport" content="width=device-width, initial-scale=1">
  <title>{title} | RepLog</title>
  <link rel="stylesheet" href="/css/style.css">
</head>
<body>
  <header>
    <nav>
      <a class="brand" href="/">RepLog</a>
      <a href="/entries/new">New entry</a>
    </nav>
  </header>
  <main>
    <h1>{title}</h1>
{body}
  </main>
</body>
</html>
"#,
        title = escape(title),
    )
}

// ============================================================================
// Pages
// ============================================================================

fn render_index(out: &mut String, entries: &[Entry]) -> fmt::Result {
    if entries.is_empty() {
        return writeln!(
            out,
            r#"    <p class="empty">No entries yet. <a href="/entries/new">Log your first workout.</a></p>"#
        );
    }

    writeln!(out, r#"    <table class="entries">"#)?;
    writeln!(
        out,
        "      <thead><tr><th>Date</th><th>Exercise</th><th>Muscle group</th><th>Sets</th><th>Reps</th><th>Weight</th><th>RPE</th><th>Notes</th><th></th></tr></thead>"
    )?;
    writeln!(out, "      <tbody>")?;

    for entry in entries {
        writeln!(
            out,
            r#"        <tr>
          <td>{date}</td>
          <td>{exercise}</td>
          <td>{muscle_group}</td>
          <td>{sets}</td>
          <td>{reps}</td>
          <td>{weight}</td>
          <td>{rpe}</td>
          <td>{notes}</td>
          <td class="actions">
            <a href="/entries/{id}/edit">Edit</a>
            <form method="POST" action="/entries/{id}?_method=DELETE">
              <button type="submit">Delete</button>
            </form>
          </td>
        </tr>"#,
            id = entry.id,
            date = format_date(&entry.date),
            exercise = escape(&entry.exercise),
            muscle_group = escape(&entry.muscle_group),
            sets = entry.sets,
            reps = escape(&entry.reps),
            weight = entry.weight.map(format_number).unwrap_or_default(),
            rpe = entry.rpe.map(format_number).unwrap_or_default(),
            notes = escape(entry.notes.as_deref().unwrap_or_default()),
        )?;
    }

    writeln!(out, "      </tbody>")?;
    writeln!(out, "    </table>")
}

/// Creation form when `entry` is `None`, edit form otherwise
fn render_form(out: &mut String, entry: Option<&Entry>) -> fmt::Result {
    let action = match entry {
        Some(entry) => format!("/entries/{}?_method=PUT", entry.id),
        None => "/entries".to_string(),
    };
    let submit = if entry.is_some() { "Save changes" } else { "Add entry" };

    let date = entry.map(|e| format_date(&e.date)).unwrap_or_default();
    let time = entry
        .map(|e| {
            format!(
                r#"
      <input type="hidden" name="time" value="{}">"#,
                e.date.format("%H:%M:%S%.f")
            )
        })
        .unwrap_or_default();
    let exercise = entry.map(|e| escape(&e.exercise)).unwrap_or_default();
    let muscle_group = entry.map(|e| escape(&e.muscle_group)).unwrap_or_default();
    let sets = entry.map(|e| e.sets.to_string()).unwrap_or_default();
    let reps = entry.map(|e| escape(&e.reps)).unwrap_or_default();
    let weight = entry.and_then(|e| e.weight).map(format_number).unwrap_or_default();
    let rpe = entry.and_then(|e| e.rpe).map(format_number).unwrap_or_default();
    let notes = entry
        .and_then(|e| e.notes.as_deref())
        .map(escape)
        .unwrap_or_default();

    write!(
        out,
        r#"    <form class="entry-form" method="POST" action="{action}">
      <label>Date <input type="date" name="date" value="{date}" required></label>{time}
      <label>Exercise <input type="text" name="exercise" value="{exercise}" required></label>
      <label>Muscle group <input type="text" name="muscleGroup" value="{muscle_group}" required></label>
      <label>Sets <input type="number" name="sets" step="1" value="{sets}" required></label>
      <label>Reps <input type="text" name="reps" value="{reps}" placeholder="12-12-10" required></label>
      <label>Weight <input type="number" name="weight" step="any" value="{weight}"></label>
      <label>RPE <input type="number" name="rpe" min="1" max="10" step="any" value="{rpe}"></label>
      <label>Notes <textarea name="notes">{notes}</textarea></label>
      <button type="submit">{submit}</button>
      <a href="/">Cancel</a>
    </form>
"#,
        action = escape(&action),
    )
}

// ============================================================================
// Helpers
// ============================================================================

/// Escape text for use in HTML element content and quoted attributes
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

fn format_date(date: &DateTime<Utc>) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// Whole numbers without a trailing `.0`
fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        n.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use replog_core::EntryFields;

    fn entry() -> Entry {
        Entry::new(
            EntryFields {
                date: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
                exercise: "Bench <Press>".into(),
                muscle_group: "Chest".into(),
                sets: 3,
                reps: "12-10-8".into(),
                weight: Some(135.0),
                rpe: Some(7.5),
                notes: Some("\"easy\"".into()),
            },
            Utc::now(),
        )
    }

    #[test]
    fn test_escape() {
        assert_eq!(
            escape(r#"<a href="x">Tom & 'Jerry'</a>"#),
            "&lt;a href=&quot;x&quot;&gt;Tom &amp; &#39;Jerry&#39;&lt;/a&gt;"
        );
    }

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(135.0), "135");
        assert_eq!(format_number(7.5), "7.5");
    }

    #[test]
    fn test_index_lists_entries_escaped() {
        let entries = vec![entry()];
        let html = HtmlRenderer
            .render(&View::Index { entries: &entries })
            .unwrap();

        assert!(html.contains("<title>Workout Log | RepLog</title>"));
        assert!(html.contains("Bench &lt;Press&gt;"));
        assert!(!html.contains("Bench <Press>"));
        assert!(html.contains("<td>135</td>"));
        assert!(html.contains("<td>7.5</td>"));
        assert!(html.contains(&format!("/entries/{}?_method=DELETE", entries[0].id)));
        assert!(html.contains(&format!("/entries/{}/edit", entries[0].id)));
    }

    #[test]
    fn test_index_empty_state() {
        let html = HtmlRenderer.render(&View::Index { entries: &[] }).unwrap();
        assert!(html.contains("No entries yet"));
        assert!(!html.contains("<table"));
    }

    #[test]
    fn test_new_form_is_blank() {
        let html = HtmlRenderer.render(&View::New).unwrap();
        assert!(html.contains(r#"action="/entries""#));
        assert!(html.contains(r#"name="exercise" value="""#));
        assert!(html.contains("Add entry"));
        assert!(!html.contains(r#"name="time""#));
    }

    #[test]
    fn test_edit_form_is_prefilled() {
        let entry = entry();
        let html = HtmlRenderer.render(&View::Edit { entry: &entry }).unwrap();

        assert!(html.contains(&format!(r#"action="/entries/{}?_method=PUT""#, entry.id)));
        assert!(html.contains(r#"name="date" value="2024-01-01""#));
        assert!(html.contains(r#"name="time" value="00:00:00""#));
        assert!(html.contains(r#"name="sets" step="1" value="3""#));
        assert!(html.contains(r#"name="exercise" value="Bench &lt;Press&gt;""#));
        assert!(html.contains(r#"name="weight" step="any" value="135""#));
        assert!(html.contains("<textarea name=\"notes\">&quot;easy&quot;</textarea>"));
    }

    #[test]
    fn test_view_names() {
        assert_eq!(View::New.name(), "new");
        assert_eq!(View::Index { entries: &[] }.name(), "index");
    }
}
