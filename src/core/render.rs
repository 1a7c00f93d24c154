use crate::domain::model::{Hospital, ManufacturingSite, ViewState};

pub const LOADING_TEXT: &str = "Loading route...";

/// 純文字輸出，路線文件原樣附在最後
pub fn render_text(state: &ViewState) -> String {
    match state {
        ViewState::Loading => LOADING_TEXT.to_string(),
        ViewState::Error(message) => message.clone(),
        ViewState::Ready {
            route,
            hospital,
            site,
        } => {
            let mut out = String::new();
            if let Some(site) = site {
                out.push_str(&site_panel_text(site));
                out.push('\n');
            }
            if let Some(hospital) = hospital {
                out.push_str(&hospital_panel_text(hospital));
                out.push('\n');
            }
            out.push_str(route.as_str());
            out
        }
    }
}

fn site_panel_text(site: &ManufacturingSite) -> String {
    format!(
        "Manufacturing Site Details\nName: {}\nLocation: {}\n",
        site.name,
        site.address_line()
    )
}

fn hospital_panel_text(hospital: &Hospital) -> String {
    format!(
        "Hospital Details\nName: {}\nAddress: {}\n",
        hospital.hospital_name,
        hospital.address_line()
    )
}

/// 獨立 HTML 頁面。面板文字會跳脫，路線文件原樣嵌入
pub fn render_html_page(state: &ViewState) -> String {
    let body = match state {
        ViewState::Loading => format!("<p class=\"loading\">{}</p>", escape_html(LOADING_TEXT)),
        ViewState::Error(message) => format!("<p class=\"error\">{}</p>", escape_html(message)),
        ViewState::Ready {
            route,
            hospital,
            site,
        } => {
            let mut body = String::from("<div class=\"container\">\n");
            if let Some(site) = site {
                body.push_str(&panel(
                    "Manufacturing Site Details",
                    &[
                        ("Name", site.name.as_str()),
                        ("Location", site.address_line().as_str()),
                    ],
                ));
            }
            if let Some(hospital) = hospital {
                body.push_str(&panel(
                    "Hospital Details",
                    &[
                        ("Name", hospital.hospital_name.as_str()),
                        ("Address", hospital.address_line().as_str()),
                    ],
                ));
            }
            body.push_str("<div class=\"route-map\">");
            body.push_str(route.as_str());
            body.push_str("</div>\n</div>");
            body
        }
    };

    format!(
        "<!DOCTYPE html>\n<html>\n<head><meta charset=\"utf-8\"><title>Route</title></head>\n<body>\n{}\n</body>\n</html>\n",
        body
    )
}

fn panel(title: &str, rows: &[(&str, &str)]) -> String {
    let mut html = format!("<div class=\"panel\">\n<h2>{}</h2>\n", escape_html(title));
    for (label, value) in rows {
        html.push_str(&format!(
            "<p><span class=\"label\">{}:</span> {}</p>\n",
            escape_html(label),
            escape_html(value)
        ));
    }
    html.push_str("</div>\n");
    html
}

fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
