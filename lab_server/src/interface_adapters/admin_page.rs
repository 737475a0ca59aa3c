use std::fmt::Write;

use crate::interface_adapters::protocol::{SessionListResponse, SessionView};

// Renders the admin listing as a bare HTML table.
pub fn render(listing: &SessionListResponse) -> String {
    let mut html = String::from(
        "<!DOCTYPE html>\n<html>\n\
         <head><meta charset=\"utf-8\"><title>Lab Sessions</title></head>\n\
         <body>\n",
    );
    let _ = writeln!(
        html,
        "<h1>Lab Sessions</h1>\n<p>Total: {} | Active: {} | Today: {}</p>",
        listing.total, listing.active, listing.today
    );
    html.push_str(
        "<table>\n<thead><tr><th>Register No</th><th>Name</th><th>Department</th>\
         <th>System</th><th>In</th><th>Out</th><th>Status</th></tr></thead>\n<tbody>\n",
    );
    for session in &listing.sessions {
        render_row(&mut html, session);
    }
    html.push_str("</tbody>\n</table>\n</body>\n</html>\n");
    html
}

fn render_row(html: &mut String, session: &SessionView) {
    let out = match (&session.out_date, &session.out_time) {
        (Some(date), Some(time)) => format!("{date} {time}"),
        _ => "-".to_string(),
    };
    let _ = writeln!(
        html,
        "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{} {}</td><td>{}</td><td>{}</td></tr>",
        escape(&session.register_no),
        escape(&session.name),
        escape(&session.department),
        escape(&session.system_no),
        escape(&session.in_date),
        escape(&session.in_time),
        escape(&out),
        session.status.as_str(),
    );
}

fn escape(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            other => escaped.push(other),
        }
    }
    escaped
}
