use crate::view::{Snapshot, ViewState};

const STYLE: &str = "
body { font-family: system-ui, sans-serif; text-align: center; margin-top: 12vh; background: #1d1b2f; color: #f4efe6; }
#current-time { font-size: 5rem; font-weight: 200; }
#status.error { color: #ff8a80; }
#sunset-time { font-size: 3rem; color: #ffb74d; }
form { display: inline-block; margin: 0.5rem; }
";

/// Polls `/time` once per second; reloads when the view changed server-side.
const SCRIPT: &str = "
const generation = __GENERATION__;
setInterval(async () => {
  try {
    const tick = await (await fetch('/time')).json();
    if (tick.generation !== generation) { location.reload(); return; }
    document.getElementById('current-time').textContent = tick.time;
  } catch (e) {}
}, 1000);
";

pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    out
}

fn display(visible: bool) -> &'static str {
    if visible { "block" } else { "none" }
}

/// Renders the whole page. Every panel is present; only the one named by
/// the snapshot is displayed.
pub fn render(snapshot: &Snapshot, current_time: &str) -> String {
    let visible = snapshot.state.panel_id();
    let (status_text, status_class) = match &snapshot.state {
        ViewState::Status { message, is_error } => (message.as_str(), if *is_error { "error" } else { "" }),
        _ => ("", ""),
    };
    let (sunset_time, location) = match &snapshot.state {
        ViewState::SunsetDisplay { sunset_time, location_label } => (sunset_time.as_str(), location_label.as_str()),
        _ => ("", ""),
    };

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>New Tab</title>
<style>{style}</style>
</head>
<body>
<div id="current-time">{time}</div>
<div id="status" class="{status_class}" style="display:{status_display}">{status_text}</div>
<div id="setup" style="display:{setup_display}">
  <form method="post" action="/location/auto"><button id="auto-location" type="submit">Use my location</button></form>
  <form method="post" action="/location/city">
    <input id="city-input" name="city" type="text" placeholder="Enter a city" autofocus>
    <button id="manual-location" type="submit">Set location</button>
  </form>
</div>
<div id="sunset-display" style="display:{sunset_display}">
  <div>Sunset today</div>
  <div id="sunset-time">{sunset_time}</div>
  <div id="location">{location}</div>
  <form method="post" action="/refresh"><button id="refresh" type="submit">Refresh</button></form>
  <form method="post" action="/change-location"><button id="change-location" type="submit">Change location</button></form>
</div>
<script>{script}</script>
</body>
</html>
"#,
        style = STYLE,
        time = escape_html(current_time),
        status_class = status_class,
        status_display = display(visible == "status"),
        status_text = escape_html(status_text),
        setup_display = display(visible == "setup"),
        sunset_display = display(visible == "sunset-display"),
        sunset_time = escape_html(sunset_time),
        location = escape_html(location),
        script = SCRIPT.replace("__GENERATION__", &snapshot.generation.to_string()),
    )
}
