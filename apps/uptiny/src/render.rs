use std::time::Duration;

use chrono::{DateTime, Local};
use html_escape::{encode_double_quoted_attribute, encode_text};
use probes::{Status, StatusList};

const STYLE: &str = "\
      body { font-family: segoe ui, Roboto, Oxygen-Sans, Ubuntu, Cantarell, helvetica neue, Verdana, sans-serif; }
      h1 { margin-top: 30px; }
      ul { padding: 0px; }
      li { list-style: none; margin-bottom: 2px; padding: 5px; border-bottom: 1px solid #ddd; }
      a { text-decoration: none; color: #000; }
      .container { max-width: 600px; width: 100%; margin: 15px auto; }
      .panel { text-align: center; padding: 10px; border: 0px; border-radius: 5px; }
      .failed-bg { color: white; background-color: #E25D6A; }
      .success-bg { color: white; background-color: #52B86A; }
      .failed { color: #E25D6A; }
      .success { color: #52B86A; }
      .small { font-size: 80%; }
      .status { float: right; }";

/// Assemble the whole status page.
///
/// Within a category, disrupted services are listed before operational
/// ones; HTTP targets are rendered as links so the page doubles as a
/// bookmark list.
pub fn page(
    title: &str,
    statuses: &StatusList,
    incidents: &[String],
    last_check: DateTime<Local>,
    elapsed: Duration,
) -> String {
    let mut html = String::new();

    html.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n  <head>\n");
    html.push_str("    <meta charset=\"utf-8\">\n");
    html.push_str(
        "    <meta name=\"viewport\" content=\"width=device-width, initial-scale=1, shrink-to-fit=no\">\n",
    );
    html.push_str(&format!("    <title>{}</title>\n", encode_text(title)));
    html.push_str(&format!("    <style>\n{STYLE}\n    </style>\n"));
    html.push_str("  </head>\n  <body>\n    <div class='container'>\n");

    html.push_str("      <h1>Global Status</h1>\n      <ul>\n");
    let outages = statuses.number_outages();
    if outages > 0 {
        html.push_str(&format!(
            "        <li class='panel failed-bg'>{outages} Outage(s)</li>\n"
        ));
    } else {
        html.push_str("        <li class='panel success-bg'>All Systems Operational</li>\n");
    }
    html.push_str("      </ul>\n");

    for (category, statuses) in statuses.categories() {
        html.push_str(&format!("      <h1>{}</h1>\n      <ul>\n", encode_text(&category)));
        for status in statuses.iter().filter(|status| !status.succeed()) {
            html.push_str(&disrupted_item(status));
        }
        for status in statuses.iter().filter(|status| status.succeed()) {
            html.push_str(&operational_item(status));
        }
        html.push_str("      </ul>\n");
    }

    html.push_str(&format!(
        "      <p class='small'>Last check: {} (in {:.3?})</p>\n",
        last_check.format("%Y-%m-%dT%H:%M:%S%z"),
        elapsed,
    ));

    if !incidents.is_empty() {
        html.push_str("      <h1>Incidents</h1>\n");
        for incident in incidents {
            html.push_str(&format!("      <p>{}</p>\n", encode_text(incident)));
        }
    }

    html.push_str("    </div>\n  </body>\n</html>\n");
    html
}

fn disrupted_item(status: &Status) -> String {
    let cause = status.outcome.as_ref().map(ToString::to_string).unwrap_or_default();
    format!(
        "        <li>{} <span class='small failed'>({})</span><span class='status failed'>Disrupted</span></li>\n",
        encode_text(&status.check.name),
        encode_text(&cause),
    )
}

fn operational_item(status: &Status) -> String {
    if status.check.kind.starts_with("http") {
        format!(
            "        <li><a href=\"{}\">{}</a> <span class='status success'>Operational</span></li>\n",
            encode_double_quoted_attribute(&status.check.target),
            encode_text(&status.check.name),
        )
    } else {
        format!(
            "        <li>{} <span class='status success'>Operational</span></li>\n",
            encode_text(&status.check.name),
        )
    }
}
