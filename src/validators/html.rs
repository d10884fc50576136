//! HTML sanitisation
//!
//! Tags on the allow-list are kept (re-rendered with only their allowed
//! attributes); every other tag is escaped so it renders as text.

use super::Validator;
use crate::errors::FieldResult;
use crate::value::Value;
use regex::Regex;
use std::sync::LazyLock;

const ALLOWED_TAGS: &[&str] = &["a", "b", "br", "em", "i", "li", "ol", "p", "strong", "ul", "div"];

const ALLOWED_ATTRIBUTES: &[(&str, &[&str])] = &[("a", &["href", "target"])];

const ALLOWED_PROTOCOLS: &[&str] = &["http", "https", "mailto"];

static TAG_REGEX: LazyLock<Regex> = LazyLock::new(|| {
	Regex::new(r#"^<(/?)([a-zA-Z][a-zA-Z0-9]*)((?:[^>"']|"[^"]*"|'[^']*')*)>"#)
		.expect("TAG_REGEX: invalid regex pattern")
});

static ATTRIBUTE_REGEX: LazyLock<Regex> = LazyLock::new(|| {
	Regex::new(r#"([a-zA-Z_:][-a-zA-Z0-9_:.]*)(?:\s*=\s*(?:"([^"]*)"|'([^']*)'|([^\s"'=<>`]+)))?"#)
		.expect("ATTRIBUTE_REGEX: invalid regex pattern")
});

static ENTITY_REGEX: LazyLock<Regex> = LazyLock::new(|| {
	Regex::new(r"^&(?:[a-zA-Z][a-zA-Z0-9]*|#[0-9]+|#[xX][0-9a-fA-F]+);")
		.expect("ENTITY_REGEX: invalid regex pattern")
});

static SCHEME_REGEX: LazyLock<Regex> = LazyLock::new(|| {
	Regex::new(r"^([a-zA-Z][a-zA-Z0-9+.-]*):").expect("SCHEME_REGEX: invalid regex pattern")
});

fn escape_text(input: &str) -> String {
	input
		.replace('&', "&amp;")
		.replace('<', "&lt;")
		.replace('>', "&gt;")
}

fn escape_attribute(input: &str) -> String {
	escape_text(input).replace('"', "&quot;")
}

/// Strip what a browser drops from a URL before it resolves the scheme:
/// tab, CR and LF anywhere, plus leading C0 controls and spaces.
fn browser_normalised_url(href: &str) -> String {
	href.chars()
		.filter(|c| !matches!(*c, '\t' | '\n' | '\r'))
		.skip_while(|c| *c <= ' ')
		.collect()
}

fn is_safe_href(href: &str) -> bool {
	match SCHEME_REGEX.captures(&browser_normalised_url(href)) {
		Some(caps) => ALLOWED_PROTOCOLS
			.iter()
			.any(|protocol| caps[1].eq_ignore_ascii_case(protocol)),
		None => true,
	}
}

fn render_tag(closing: bool, name: &str, attributes: &str) -> String {
	if closing {
		return format!("</{}>", name);
	}

	let allowed = ALLOWED_ATTRIBUTES
		.iter()
		.find(|(tag, _)| *tag == name)
		.map(|(_, attrs)| *attrs)
		.unwrap_or_default();

	let mut out = format!("<{}", name);
	for caps in ATTRIBUTE_REGEX.captures_iter(attributes) {
		let attribute = caps[1].to_ascii_lowercase();
		if !allowed.contains(&attribute.as_str()) {
			continue;
		}
		let value = caps
			.get(2)
			.or_else(|| caps.get(3))
			.or_else(|| caps.get(4))
			.map(|m| m.as_str())
			.unwrap_or_default();
		if attribute == "href" && !is_safe_href(value) {
			continue;
		}
		out.push_str(&format!(" {}=\"{}\"", attribute, escape_attribute(value)));
	}
	out.push('>');
	out
}

/// Keep allow-listed markup and escape everything else
///
/// # Examples
///
/// ```
/// use reinhardt_marshal::validators::html::clean;
///
/// assert_eq!(clean("<b>bold</b>"), "<b>bold</b>");
/// assert_eq!(
///     clean("<script>alert(1)</script>"),
///     "&lt;script&gt;alert(1)&lt;/script&gt;"
/// );
/// ```
pub fn clean(input: &str) -> String {
	let mut out = String::with_capacity(input.len());
	let mut rest = input;

	while let Some(pos) = rest.find(['<', '>', '&']) {
		out.push_str(&rest[..pos]);
		let tail = &rest[pos..];

		if tail.starts_with('<') {
			if let Some(caps) = TAG_REGEX.captures(tail) {
				let whole = &caps[0];
				let name = caps[2].to_ascii_lowercase();
				if ALLOWED_TAGS.contains(&name.as_str()) {
					out.push_str(&render_tag(!caps[1].is_empty(), &name, &caps[3]));
				} else {
					out.push_str(&escape_text(whole));
				}
				rest = &tail[whole.len()..];
				continue;
			}
			out.push_str("&lt;");
		} else if tail.starts_with('>') {
			out.push_str("&gt;");
		} else if let Some(entity) = ENTITY_REGEX.find(tail) {
			out.push_str(entity.as_str());
			rest = &tail[entity.end()..];
			continue;
		} else {
			out.push_str("&amp;");
		}
		rest = &tail[1..];
	}

	out.push_str(rest);
	out
}

/// Sanitise HTML strings against a small allow-list of formatting tags
pub fn sanitize_html() -> impl Validator {
	|value: Value| -> FieldResult<Value> {
		Ok(match value {
			Value::String(s) => Value::String(clean(&s)),
			other => other,
		})
	}
}
