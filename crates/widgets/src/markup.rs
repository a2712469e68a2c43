/// Backend-provided content that is either trusted markup or plain text.
///
/// The raw markup is kept verbatim; [`Markup::display_text`] flattens it for
/// the native renderer, which has no HTML engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Markup {
    Html(String),
    Text(String),
}

impl Markup {
    /// Content exactly as received.
    pub fn raw(&self) -> &str {
        match self {
            Markup::Html(s) | Markup::Text(s) => s,
        }
    }

    pub fn display_text(&self) -> String {
        match self {
            Markup::Html(html) => html_to_text(html),
            Markup::Text(text) => text.clone(),
        }
    }
}

/// Tags after which text continues on a new line.
const BREAKING_TAGS: &[&str] = &[
    "br", "p", "div", "li", "tr", "table", "ul", "ol", "h1", "h2", "h3", "h4", "h5", "h6",
];

/// Flatten an HTML fragment to readable text.
///
/// Tags are dropped (block tags and `<br>` become line breaks), `script` and
/// `style` contents are skipped, common entities are decoded and whitespace
/// is collapsed.
pub fn html_to_text(html: &str) -> String {
    let mut out = String::with_capacity(html.len());
    let mut rest = html;
    let mut skipping: Option<&str> = None;

    while let Some(lt) = rest.find('<') {
        if skipping.is_none() {
            out.push_str(&decode_entities(&rest[..lt]));
        }
        let after = &rest[lt + 1..];
        let Some(gt) = after.find('>') else {
            // Unterminated tag: keep the remainder as text.
            if skipping.is_none() {
                out.push_str(&decode_entities(&rest[lt..]));
            }
            rest = "";
            break;
        };

        let tag = after[..gt].trim();
        let closing = tag.starts_with('/');
        let name: String = tag
            .trim_start_matches('/')
            .chars()
            .take_while(|c| c.is_ascii_alphanumeric())
            .collect::<String>()
            .to_ascii_lowercase();

        match skipping {
            Some(open) if closing && name == open => skipping = None,
            Some(_) => {}
            None if !closing && (name == "script" || name == "style") => {
                skipping = Some(if name == "script" { "script" } else { "style" });
            }
            None if BREAKING_TAGS.contains(&name.as_str()) => out.push('\n'),
            None => {}
        }

        rest = &after[gt + 1..];
    }
    if skipping.is_none() {
        out.push_str(&decode_entities(rest));
    }

    out.lines()
        .map(|line| line.split_whitespace().collect::<Vec<_>>().join(" "))
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

fn decode_entities(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;

    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        let candidate = &rest[amp + 1..];
        let decoded = candidate
            .find(';')
            .filter(|&semi| semi <= 10)
            .and_then(|semi| entity(&candidate[..semi]).map(|c| (c, semi)));

        match decoded {
            Some((c, semi)) => {
                out.push(c);
                rest = &candidate[semi + 1..];
            }
            None => {
                out.push('&');
                rest = candidate;
            }
        }
    }
    out.push_str(rest);
    out
}

fn entity(name: &str) -> Option<char> {
    if let Some(num) = name.strip_prefix('#') {
        let code = match num.strip_prefix(&['x', 'X'][..]) {
            Some(hex) => u32::from_str_radix(hex, 16).ok()?,
            None => num.parse().ok()?,
        };
        return char::from_u32(code);
    }
    Some(match name {
        "amp" => '&',
        "lt" => '<',
        "gt" => '>',
        "quot" => '"',
        "apos" => '\'',
        "nbsp" => ' ',
        "deg" => '°',
        "auml" => 'ä',
        "ouml" => 'ö',
        "uuml" => 'ü',
        "Auml" => 'Ä',
        "Ouml" => 'Ö',
        "Uuml" => 'Ü',
        "szlig" => 'ß',
        _ => return None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_tags_and_breaks_lines() {
        let html = "<div><b>Restmüll</b>: morgen</div><div>Papier:<br/>Fr, 14.06.</div>";
        assert_eq!(html_to_text(html), "Restmüll: morgen\nPapier:\nFr, 14.06.");
    }

    #[test]
    fn decodes_entities() {
        assert_eq!(
            html_to_text("Gelber Sack &amp; Bio &ndash; heute &#8211; 5&deg;C &#x2013;"),
            "Gelber Sack & Bio &ndash; heute – 5°C –"
        );
        assert_eq!(html_to_text("Tonne dr&auml;u&szlig;en"), "Tonne dräußen");
    }

    #[test]
    fn skips_style_and_script_bodies() {
        let html = "<style>.x { color: red }</style><span>Sturmwarnung</span><script>alert(1)</script>";
        assert_eq!(html_to_text(html), "Sturmwarnung");
    }

    #[test]
    fn keeps_unterminated_tags_as_text() {
        assert_eq!(html_to_text("a < b"), "a < b");
    }

    #[test]
    fn raw_is_verbatim() {
        let m = Markup::Html("<b>x</b>".into());
        assert_eq!(m.raw(), "<b>x</b>");
        assert_eq!(m.display_text(), "x");
        assert_eq!(Markup::Text("<b>".into()).display_text(), "<b>");
    }
}
