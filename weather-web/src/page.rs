//! The single HTML page: a prompt form and a response area.

use pulldown_cmark::{CowStr, Event, Options, Parser, Tag, html};
use weather_core::{DisplayKind, DisplayResult};

const TITLE: &str = "Wetter Chatbot";
const DESCRIPTION: &str = "Interact with the weather agent to get weather information. \
                           Simply provide a prompt describing your query.";
const PLACEHOLDER: &str = "Ask about the weather...";

const STYLE: &str = r#"
body { font-family: system-ui, sans-serif; max-width: 48rem; margin: 2rem auto; padding: 0 1rem; color: #1f2933; }
label { display: block; font-weight: 600; margin: 1rem 0 .25rem; }
textarea { width: 100%; min-height: 5rem; font: inherit; padding: .5rem; box-sizing: border-box; }
button { margin-top: .5rem; padding: .5rem 1.25rem; font: inherit; cursor: pointer; }
.response { border: 1px solid #cbd2d9; border-radius: 6px; padding: .75rem 1rem; min-height: 3rem; }
.response.error { border-color: #e12d39; color: #ab091e; white-space: pre-wrap; }
"#;

/// Render the page with the prompt kept in the textarea and, after a submit, its result.
pub fn render(prompt: &str, result: Option<&DisplayResult>) -> String {
    let response = match result {
        None => r#"<div class="response"></div>"#.to_string(),
        Some(result) if result.kind == DisplayKind::Error => {
            format!(r#"<div class="response error">{}</div>"#, escape(&result.value))
        }
        Some(result) => format!(r#"<div class="response">{}</div>"#, markdown_to_html(&result.value)),
    };

    let mut page = String::with_capacity(2048);
    page.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n");
    page.push_str("<meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n");
    page.push_str(&format!("<title>{TITLE}</title>\n<style>{STYLE}</style>\n</head>\n<body>\n"));
    page.push_str(&format!("<h1>{TITLE}</h1>\n<p>{DESCRIPTION}</p>\n"));
    page.push_str("<form method=\"post\" action=\"/\">\n");
    page.push_str("<label for=\"prompt\">Prompt</label>\n");
    page.push_str(&format!(
        "<textarea id=\"prompt\" name=\"prompt\" placeholder=\"{PLACEHOLDER}\">{}</textarea>\n",
        escape(prompt)
    ));
    page.push_str("<button type=\"submit\">Submit</button>\n</form>\n");
    page.push_str("<label>Response</label>\n");
    page.push_str(&response);
    page.push_str("\n</body>\n</html>\n");
    page
}

/// URL schemes a link or image in a reply may point at.
const ALLOWED_SCHEMES: [&str; 3] = ["http:", "https:", "mailto:"];

/// Markdown to HTML; raw HTML in the input is shown as text, not interpreted,
/// and link or image targets outside `ALLOWED_SCHEMES` are blanked.
pub fn markdown_to_html(markdown: &str) -> String {
    let options = Options::ENABLE_TABLES | Options::ENABLE_STRIKETHROUGH;
    let events = Parser::new_ext(markdown, options).map(|event| match event {
        Event::Html(raw) | Event::InlineHtml(raw) => Event::Text(raw),
        Event::Start(Tag::Link {
            link_type,
            dest_url,
            title,
            id,
        }) if !is_allowed_url(&dest_url) => Event::Start(Tag::Link {
            link_type,
            dest_url: CowStr::Borrowed(""),
            title,
            id,
        }),
        Event::Start(Tag::Image {
            link_type,
            dest_url,
            title,
            id,
        }) if !is_allowed_url(&dest_url) => Event::Start(Tag::Image {
            link_type,
            dest_url: CowStr::Borrowed(""),
            title,
            id,
        }),
        other => other,
    });

    let mut out = String::new();
    html::push_html(&mut out, events);
    out
}

fn is_allowed_url(url: &str) -> bool {
    // Browsers ignore leading whitespace and control characters before the scheme.
    let url = url
        .trim_start_matches(|c: char| c.is_ascii_whitespace() || c.is_ascii_control())
        .to_ascii_lowercase();
    ALLOWED_SCHEMES.iter().any(|scheme| url.starts_with(scheme))
}

fn escape(text: &str) -> String {
    let mut out = String::new();
    html::push_html(&mut out, std::iter::once(Event::Text(text.into())));
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn markdown_is_rendered() {
        let html = markdown_to_html("**15°C**, cloudy\n\n- wind: 3 m/s");
        assert!(html.contains("<strong>15°C</strong>"));
        assert!(html.contains("<li>wind: 3 m/s</li>"));
    }

    #[test]
    fn raw_html_in_reply_is_escaped() {
        let html = markdown_to_html("hello <script>alert(1)</script>");
        assert!(!html.contains("<script>"));
        assert!(html.contains("&lt;script&gt;"));
    }

    #[test]
    fn script_links_in_reply_are_blanked() {
        let html = markdown_to_html("[click for forecast](javascript:alert(document.cookie))");
        assert!(!html.contains("javascript:"));
        assert!(html.contains(r#"<a href="">click for forecast</a>"#));

        let html = markdown_to_html(
            "[x](JavaScript:alert(1)) ![radar](data:text/html;base64,AAAA) <vbscript:msgbox>",
        );
        assert!(html.contains(r#"<a href="">x</a>"#));
        assert!(html.contains(r#"<img src="" alt="radar""#));
        assert!(!html.contains(r#"href="vbscript:"#));
    }

    #[test]
    fn web_and_mail_links_are_kept() {
        let html = markdown_to_html(
            "[map](https://openweathermap.org/weathermap) [old](http://example.com) [mail](mailto:ops@example.com)",
        );
        assert!(html.contains(r#"href="https://openweathermap.org/weathermap""#));
        assert!(html.contains(r#"href="http://example.com""#));
        assert!(html.contains(r#"href="mailto:ops@example.com""#));
    }

    #[test]
    fn prompt_is_escaped_inside_textarea() {
        let page = render("</textarea><b>x</b>", None);
        assert!(page.contains("&lt;/textarea&gt;&lt;b&gt;x&lt;/b&gt;</textarea>"));
    }

    #[test]
    fn error_result_uses_error_style() {
        let page = render("q", Some(&DisplayResult::error("API failed: *not markdown*")));
        assert!(page.contains(r#"<div class="response error">API failed: *not markdown*</div>"#));
    }

    #[test]
    fn empty_page_has_labels() {
        let page = render("", None);
        assert!(page.contains(">Prompt</label>"));
        assert!(page.contains(">Response</label>"));
        assert!(page.contains(DESCRIPTION));
    }
}
