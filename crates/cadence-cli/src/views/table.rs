use cadence_core::models::{DashboardMetrics, EventStatus, ResolvedEvent, Schedule};
use chrono::Utc;
use chrono_humanize::Humanize;
use chrono_tz::Tz;
use comfy_table::{Attribute, Cell, Color, Row, Table};

use crate::timezone::format_in_zone;

fn status_cell(status: EventStatus) -> Cell {
    let cell = Cell::new(status.as_str());
    match status {
        EventStatus::Completed => cell.fg(Color::Green),
        EventStatus::InProgress => cell.fg(Color::Yellow),
        EventStatus::Overdue => cell.fg(Color::Red).add_attribute(Attribute::Bold),
        EventStatus::Pending => cell,
    }
}

pub fn display_schedules(schedules: &[Schedule]) {
    if schedules.is_empty() {
        println!("No schedules found.");
        return;
    }

    let mut table = Table::new();
    table.set_header(vec!["ID", "Task", "Every", "From", "To", "Events", "Created"]);

    for schedule in schedules {
        let mut row = Row::new();
        // v7 ids share their leading characters for schedules created close together
        row.add_cell(Cell::new(schedule.id.to_string()));
        row.add_cell(Cell::new(&schedule.task_name).add_attribute(Attribute::Bold));
        row.add_cell(Cell::new(interval_label(schedule)));
        row.add_cell(Cell::new(schedule.start_date));
        row.add_cell(Cell::new(schedule.end_date));
        row.add_cell(Cell::new(schedule.total_events));
        row.add_cell(Cell::new(schedule.created_at.humanize()).fg(Color::DarkGrey));
        table.add_row(row);
    }

    println!("{table}");
}

fn interval_label(schedule: &Schedule) -> String {
    match schedule.rule() {
        Ok(rule) if rule.interval() > 1 => format!("{} x{}", rule.frequency(), rule.interval()),
        Ok(rule) => rule.frequency().to_string(),
        Err(_) => format!("{} (invalid rule)", schedule.frequency),
    }
}

pub fn display_events(events: &[ResolvedEvent], tz: &Tz) {
    if events.is_empty() {
        println!("No events in this range.");
        return;
    }

    let now = Utc::now();
    let mut table = Table::new();
    table.set_header(vec!["When", "Status", "", "Relative"]);

    for event in events {
        let mut row = Row::new();
        row.add_cell(Cell::new(format_in_zone(event.event_datetime, tz)));
        row.add_cell(status_cell(event.status));
        // Marks statuses that were set explicitly
        row.add_cell(Cell::new(if event.is_overridden() { "*" } else { "" }));

        let relative = Cell::new(event.event_datetime.humanize());
        row.add_cell(if event.event_datetime < now {
            relative.fg(Color::DarkGrey)
        } else {
            relative
        });
        table.add_row(row);
    }

    println!("{table}");
}

pub fn display_dashboard(metrics: &DashboardMetrics) {
    let mut table = Table::new();
    table.set_header(vec!["Total events", "Completed", "In progress", "Overdue"]);

    let mut row = Row::new();
    row.add_cell(Cell::new(metrics.total_events).add_attribute(Attribute::Bold));
    row.add_cell(Cell::new(metrics.completed).fg(Color::Green));
    row.add_cell(Cell::new(metrics.in_progress).fg(Color::Yellow));
    let overdue = Cell::new(metrics.overdue);
    row.add_cell(if metrics.overdue > 0 { overdue.fg(Color::Red) } else { overdue });
    table.add_row(row);

    println!("{table}");
}
