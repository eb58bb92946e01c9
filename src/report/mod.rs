//! Registration report.
//!
//! One row per candidate, in walk order, rendered once at startup as a
//! table followed by the number of active routes:
//!
//! ```text
//! ┌────────┬────────┬──────────────┬────────┐
//! │ Name   │ Method │    Route     │ Status │
//! ├────────┼────────┼──────────────┼────────┤
//! │ Signup │  POST  │ /auth/signup │   ✓    │
//! │ x.toml │        │              │   ✗    │
//! └────────┴────────┴──────────────┴────────┘
//! ```

use serde::Serialize;

use crate::discovery::RegistrationError;
use crate::routing::RouteDescriptor;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RouteStatus {
    Ok,
    Failed,
}

impl RouteStatus {
    fn mark(self) -> &'static str {
        match self {
            RouteStatus::Ok => "✓",
            RouteStatus::Failed => "✗",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportRow {
    pub name: String,
    pub method: String,
    pub route: String,
    pub status: RouteStatus,
    /// Failure kind and message; `None` for loaded routes.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

/// Outcome of every candidate seen during registration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RegistrationReport {
    rows: Vec<ReportRow>,
}

impl RegistrationReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_ok(&mut self, descriptor: &RouteDescriptor) {
        self.rows.push(ReportRow {
            name: descriptor.name.clone(),
            method: descriptor.method.to_string(),
            route: descriptor.route.raw().to_string(),
            status: RouteStatus::Ok,
            reason: None,
        });
    }

    pub fn record_failed(&mut self, error: &RegistrationError) {
        self.rows.push(ReportRow {
            name: error.label().to_string(),
            method: String::new(),
            route: String::new(),
            status: RouteStatus::Failed,
            reason: Some(format!("{}: {}", error.kind(), error)),
        });
    }

    pub fn rows(&self) -> &[ReportRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn active_routes(&self) -> usize {
        self.rows.iter().filter(|r| r.status == RouteStatus::Ok).count()
    }

    pub fn failed(&self) -> impl Iterator<Item = &ReportRow> {
        self.rows.iter().filter(|r| r.status == RouteStatus::Failed)
    }

    /// Render the diagnostic table.
    pub fn render(&self) -> String {
        const HEAD: [&str; 4] = ["Name", "Method", "Route", "Status"];
        // Name is left aligned, the rest centered.
        const CENTERED: [bool; 4] = [false, true, true, true];

        let cells: Vec<[&str; 4]> = self
            .rows
            .iter()
            .map(|r| [r.name.as_str(), r.method.as_str(), r.route.as_str(), r.status.mark()])
            .collect();

        let mut widths = HEAD.map(width);
        for row in &cells {
            for (w, cell) in widths.iter_mut().zip(row) {
                *w = (*w).max(width(cell));
            }
        }

        let rule = |left: &str, mid: &str, right: &str| {
            let segments: Vec<String> = widths.iter().map(|w| "─".repeat(w + 2)).collect();
            format!("{left}{}{right}\n", segments.join(mid))
        };
        let line = |row: &[&str; 4]| {
            let cols: Vec<String> = row
                .iter()
                .zip(widths)
                .zip(CENTERED)
                .map(|((cell, w), centered)| format!(" {} ", pad(cell, w, centered)))
                .collect();
            format!("│{}│\n", cols.join("│"))
        };

        let mut out = String::new();
        out.push_str(&rule("┌", "┬", "┐"));
        out.push_str(&line(&HEAD));
        out.push_str(&rule("├", "┼", "┤"));
        for row in &cells {
            out.push_str(&line(row));
        }
        out.push_str(&rule("└", "┴", "┘"));
        out
    }

    /// Print the table and log the summary. Called once after registration.
    pub fn emit(&self) {
        tracing::info!("Routes Loaded");
        if self.rows.is_empty() {
            tracing::info!("No routes loaded.");
            return;
        }
        println!("{}", self.render());
        for row in self.failed() {
            tracing::warn!(
                candidate = %row.name,
                reason = row.reason.as_deref().unwrap_or(""),
                "Route not loaded"
            );
        }
        tracing::info!(
            active = self.active_routes(),
            failed = self.len() - self.active_routes(),
            "{} active routes",
            self.active_routes()
        );
    }
}

fn width(s: &str) -> usize {
    s.chars().count()
}

fn pad(cell: &str, w: usize, centered: bool) -> String {
    let gap = w.saturating_sub(width(cell));
    if centered {
        let left = gap / 2;
        format!("{}{cell}{}", " ".repeat(left), " ".repeat(gap - left))
    } else {
        format!("{cell}{}", " ".repeat(gap))
    }
}
