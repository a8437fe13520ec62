//! Server-rendered HTML pages.

use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use axum_extra::extract::cookie::CookieJar;
use tessera_shared::models::{Event, ReservationSummary};

use crate::flash::{self, Level};
use crate::forms::{EventForm, FormErrors, LoginForm, SignupForm};
use crate::middleware::RequestContext;

const DATE_FORMAT: &str = "%Y-%m-%d %H:%M";

pub fn escape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
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

// ============================================================================
// Layout
// ============================================================================

/// Wraps `body` in the site layout, draining pending flash messages.
pub fn render(jar: CookieJar, ctx: &RequestContext, title: &str, body: String) -> Response {
    render_with_status(StatusCode::OK, jar, ctx, title, body)
}

pub fn render_with_status(
    status: StatusCode,
    jar: CookieJar,
    ctx: &RequestContext,
    title: &str,
    body: String,
) -> Response {
    let (jar, flashes) = flash::take(jar);

    let messages: String = flashes
        .iter()
        .map(|f| {
            let class = match f.level {
                Level::Info => "flash info",
                Level::Error => "flash error",
            };
            format!(r#"<div class="{}">{}</div>"#, class, escape(&f.message))
        })
        .collect();

    let html = format!(
        r#"<!DOCTYPE html>
<html>
<head>
  <meta charset="utf-8"/>
  <title>{title} | Tessera</title>
</head>
<body>
  <nav>{nav}</nav>
  {messages}
  <main>
    <h1>{title}</h1>
{body}
  </main>
</body>
</html>"#,
        title = escape(title),
        nav = nav(ctx),
        messages = messages,
        body = body,
    );

    (status, jar, Html(html)).into_response()
}

fn nav(ctx: &RequestContext) -> String {
    let mut links = vec![r#"<a href="/">Events</a>"#.to_string()];
    match &ctx.principal {
        Some(principal) => {
            links.push(r#"<a href="/manage-events">My reservations</a>"#.to_string());
            if principal.is_admin {
                links.push(r#"<a href="/admin">New event</a>"#.to_string());
            }
            links.push(format!(
                r#"<span>{}</span> <a href="/logout">Log out</a>"#,
                escape(&principal.email)
            ));
        }
        None => {
            links.push(r#"<a href="/login">Log in</a>"#.to_string());
            links.push(r#"<a href="/register">Sign up</a>"#.to_string());
        }
    }
    links.join(" | ")
}

fn field_error(errors: &FormErrors, field: &str) -> String {
    errors
        .get(field)
        .map(|msg| format!(r#"<span class="field-error">{}</span>"#, escape(msg)))
        .unwrap_or_default()
}

fn input(label: &str, kind: &str, name: &str, value: &str, errors: &FormErrors) -> String {
    format!(
        r#"    <p><label>{label} <input type="{kind}" name="{name}" value="{value}"/></label> {error}</p>
"#,
        label = label,
        kind = kind,
        name = name,
        value = escape(value),
        error = field_error(errors, name),
    )
}

fn when(event: &Event) -> String {
    format!(
        "{} to {}",
        event.start_date.format(DATE_FORMAT),
        event.end_date.format(DATE_FORMAT)
    )
}

// ============================================================================
// Pages
// ============================================================================

pub fn index(events: &[Event], ctx: &RequestContext) -> String {
    if events.is_empty() {
        return "    <p>No events scheduled.</p>".to_string();
    }

    let rows: String = events
        .iter()
        .map(|event| {
            let thumbnail = event
                .thumbnail
                .as_deref()
                .map(|src| format!(r#"<img src="{}" alt="" width="80"/> "#, escape(src)))
                .unwrap_or_default();
            let admin_links = if ctx.is_admin() {
                format!(
                    r#" <a href="/edit-event/{id}">Edit</a> <a href="/delete-event/{id}">Delete</a>"#,
                    id = event.id
                )
            } else {
                String::new()
            };
            format!(
                r#"      <li>{thumb}<strong>{title}</strong> ({when}) <a href="/register/{id}">Register</a>{admin}</li>
"#,
                thumb = thumbnail,
                title = escape(&event.title),
                when = when(event),
                id = event.id,
                admin = admin_links,
            )
        })
        .collect();

    format!("    <ul>\n{}    </ul>", rows)
}

pub fn login(form: &LoginForm, errors: &FormErrors) -> String {
    let checked = if form.remember() { " checked" } else { "" };
    format!(
        r#"    <form method="post" action="/login">
{email}{password}    <p><label><input type="checkbox" name="remember"{checked}/> Remember me</label></p>
    <p><button type="submit">Log in</button></p>
    </form>
    <p>No account yet? <a href="/register">Sign up</a></p>"#,
        email = input("Email", "email", "email", &form.email, errors),
        password = input("Password", "password", "password", "", errors),
        checked = checked,
    )
}

pub fn signup(form: &SignupForm, errors: &FormErrors) -> String {
    format!(
        r#"    <form method="post" action="/register">
{email}{password}{confirm}    <p><button type="submit">Sign up</button></p>
    </form>"#,
        email = input("Email", "email", "email", &form.email, errors),
        password = input("Password", "password", "password", "", errors),
        confirm = input("Confirm password", "password", "confirm_password", "", errors),
    )
}

pub fn register_confirm(event: &Event, email: &str) -> String {
    format!(
        r#"    <p><strong>{title}</strong> ({when})</p>
    <form method="post" action="/register/{id}">
    <p>Reserve a place for {email}?</p>
    <p><button type="submit">Confirm registration</button></p>
    </form>"#,
        title = escape(&event.title),
        when = when(event),
        id = event.id,
        email = escape(email),
    )
}

pub fn manage_events(reservations: &[ReservationSummary], all_events: Option<&[Event]>) -> String {
    let mut body = String::new();

    if reservations.is_empty() {
        body.push_str("    <p>You have no reservations.</p>\n");
    } else {
        body.push_str("    <ul>\n");
        for r in reservations {
            body.push_str(&format!(
                r#"      <li>{title}, code <code>{code}</code>
        <form method="post" action="/cancel-reservation/{id}"><button type="submit">Cancel</button></form></li>
"#,
                title = escape(&r.event_title),
                code = escape(&r.reservation_code),
                id = r.id,
            ));
        }
        body.push_str("    </ul>\n");
    }

    if let Some(events) = all_events {
        body.push_str("    <h2>All events</h2>\n    <ul>\n");
        for event in events {
            body.push_str(&format!(
                r#"      <li>{title} ({when}) <a href="/edit-event/{id}">Edit</a> <a href="/delete-event/{id}">Delete</a></li>
"#,
                title = escape(&event.title),
                when = when(event),
                id = event.id,
            ));
        }
        body.push_str(r#"    </ul>
    <p><a href="/admin">Create a new event</a></p>
"#);
    }

    body
}

pub fn manage_by_code(reservation: &ReservationSummary, email: &str, errors: &FormErrors) -> String {
    format!(
        r#"    <p>Reservation <code>{code}</code> for <strong>{title}</strong>, made {created}.</p>
    <form method="post" action="/manage/{code}">
{email}    <p><button type="submit">Cancel reservation</button></p>
    </form>"#,
        code = escape(&reservation.reservation_code),
        title = escape(&reservation.event_title),
        created = reservation.created_at.format(DATE_FORMAT),
        email = input("Email used for the reservation", "email", "email", email, errors),
    )
}

/// Create and edit share one form; `action` is where it posts.
pub fn event_form(action: &str, form: &EventForm, errors: &FormErrors) -> String {
    format!(
        r#"    <form method="post" action="{action}">
{title}{start}{end}{thumbnail}    <p><button type="submit">Save</button></p>
    </form>"#,
        action = escape(action),
        title = input("Title", "text", "title", &form.title, errors),
        start = input("Start", "datetime-local", "start_date", &form.start_date, errors),
        end = input("End", "datetime-local", "end_date", &form.end_date, errors),
        thumbnail = input("Thumbnail URL", "url", "thumbnail", &form.thumbnail, errors),
    )
}

pub fn delete_confirm(event: &Event) -> String {
    format!(
        r#"    <p>Delete <strong>{title}</strong> ({when})? All of its reservations are removed too.</p>
    <form method="post" action="/delete-event/{id}">
    <p><button type="submit">Delete event</button> <a href="/">Back</a></p>
    </form>"#,
        title = escape(&event.title),
        when = when(event),
        id = event.id,
    )
}

pub fn not_found(message: &str) -> String {
    format!(
        r#"    <p>{}</p>
    <p><a href="/">Back to events</a></p>"#,
        escape(message)
    )
}
