//! Lenient HTML fragment parser.
//!
//! Parses the markup a template produces into a node list, the way a browser
//! parses `<div>` + markup + `</div>` and hands back the wrapper's children.
//! Malformed input never fails: stray end tags are ignored, unclosed elements
//! are closed at the end of input, and a `<` that does not open markup is text.

use super::Node;

pub(super) const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source",
    "track", "wbr",
];

/// Elements whose content is not parsed as markup.
const RAW_TEXT_ELEMENTS: &[&str] = &["script", "style", "textarea", "title"];

/// Raw text elements whose content is emitted without escaping.
pub(super) const UNESCAPED_ELEMENTS: &[&str] = &["script", "style"];

/// Opening a new one of these closes an open one of the same name.
const SELF_NESTING_FORBIDDEN: &[&str] = &["li", "option", "p", "tr", "td", "th", "dt", "dd"];

/// Parses `markup` into a list of sibling nodes.
pub fn parse_fragment(markup: &str) -> Vec<Node> {
    Parser {
        src: markup,
        pos: 0,
        roots: Vec::new(),
        open: Vec::new(),
    }
    .run()
}

struct Parser<'a> {
    src: &'a str,
    pos: usize,
    roots: Vec<Node>,
    open: Vec<Node>,
}

impl Parser<'_> {
    fn run(mut self) -> Vec<Node> {
        while self.pos < self.src.len() {
            let rest = &self.src[self.pos..];
            if rest.starts_with("<!--") {
                self.comment();
            } else if rest.starts_with("</") {
                self.end_tag();
            } else if rest.starts_with("<!") || rest.starts_with("<?") {
                self.skip_declaration();
            } else if opens_markup(rest) {
                self.start_tag();
            } else {
                self.text();
            }
        }
        self.roots
    }

    fn append(&mut self, node: Node) {
        match self.open.last() {
            Some(parent) => parent.append_child(node),
            None => self.roots.push(node),
        }
    }

    fn text(&mut self) {
        let rest = &self.src[self.pos..];
        let end = rest
            .match_indices('<')
            .map(|(i, _)| i)
            .find(|&i| i > 0 && opens_markup(&rest[i..]))
            .unwrap_or(rest.len());

        self.append(Node::text(decode_entities(&rest[..end])));
        self.pos += end;
    }

    fn comment(&mut self) {
        let body = &self.src[self.pos + 4..];
        match body.find("-->") {
            Some(end) => {
                self.append(Node::comment(&body[..end]));
                self.pos += 4 + end + 3;
            }
            None => {
                self.append(Node::comment(body));
                self.pos = self.src.len();
            }
        }
    }

    fn skip_declaration(&mut self) {
        self.pos = match self.src[self.pos..].find('>') {
            Some(end) => self.pos + end + 1,
            None => self.src.len(),
        };
    }

    fn end_tag(&mut self) {
        let body = &self.src[self.pos + 2..];
        let close = body.find('>').unwrap_or(body.len());
        let tag = body[..close].trim().to_ascii_lowercase();
        self.pos = (self.pos + 2 + close + 1).min(self.src.len());

        let Some(depth) = self
            .open
            .iter()
            .rposition(|node| node.tag_name().as_deref() == Some(tag.as_str()))
        else {
            return;
        };
        self.open.truncate(depth);
    }

    fn start_tag(&mut self) {
        let bytes = self.src.as_bytes();
        let len = bytes.len();

        let mut cursor = self.pos + 1;
        while cursor < len
            && (bytes[cursor].is_ascii_alphanumeric() || matches!(bytes[cursor], b'-' | b':' | b'_'))
        {
            cursor += 1;
        }
        let tag = self.src[self.pos + 1..cursor].to_ascii_lowercase();
        let element = Node::element(&tag);

        let mut self_closing = false;
        loop {
            while cursor < len && bytes[cursor].is_ascii_whitespace() {
                cursor += 1;
            }
            if cursor >= len {
                break;
            }
            match bytes[cursor] {
                b'>' => {
                    cursor += 1;
                    break;
                }
                b'/' if bytes.get(cursor + 1) == Some(&b'>') => {
                    self_closing = true;
                    cursor += 2;
                    break;
                }
                b'/' | b'=' => {
                    cursor += 1;
                    continue;
                }
                _ => {}
            }

            let name_start = cursor;
            while cursor < len
                && !bytes[cursor].is_ascii_whitespace()
                && !matches!(bytes[cursor], b'=' | b'>' | b'/')
            {
                cursor += 1;
            }
            let name = &self.src[name_start..cursor];

            while cursor < len && bytes[cursor].is_ascii_whitespace() {
                cursor += 1;
            }

            let mut value = String::new();
            if cursor < len && bytes[cursor] == b'=' {
                cursor += 1;
                while cursor < len && bytes[cursor].is_ascii_whitespace() {
                    cursor += 1;
                }
                if cursor < len && matches!(bytes[cursor], b'"' | b'\'') {
                    let quote = bytes[cursor] as char;
                    let start = cursor + 1;
                    let end = self.src[start..]
                        .find(quote)
                        .map_or(len, |offset| start + offset);
                    value = decode_entities(&self.src[start..end]);
                    cursor = (end + 1).min(len);
                } else {
                    let start = cursor;
                    while cursor < len && !bytes[cursor].is_ascii_whitespace() && bytes[cursor] != b'>' {
                        cursor += 1;
                    }
                    value = decode_entities(&self.src[start..cursor]);
                }
            }

            // First occurrence of an attribute wins.
            if !element.has_attribute(name) {
                element.set_attribute(name, value);
            }
        }
        self.pos = cursor;

        if SELF_NESTING_FORBIDDEN.contains(&tag.as_str()) {
            if let Some(top) = self.open.last() {
                if top.tag_name().as_deref() == Some(tag.as_str()) {
                    self.open.pop();
                }
            }
        }

        self.append(element.clone());

        if self_closing || VOID_ELEMENTS.contains(&tag.as_str()) {
            return;
        }
        if RAW_TEXT_ELEMENTS.contains(&tag.as_str()) {
            self.raw_text(&element, &tag);
            return;
        }
        self.open.push(element);
    }

    fn raw_text(&mut self, element: &Node, tag: &str) {
        let rest = &self.src[self.pos..];
        let closing = format!("</{tag}");
        // ASCII lowercasing keeps byte offsets intact.
        let end = rest.to_ascii_lowercase().find(&closing).unwrap_or(rest.len());

        let content = &rest[..end];
        if !content.is_empty() {
            let text = if UNESCAPED_ELEMENTS.contains(&tag) {
                content.to_string()
            } else {
                decode_entities(content)
            };
            element.append_child(Node::text(text));
        }

        let after = &rest[end..];
        self.pos += end + after.find('>').map_or(after.len(), |i| i + 1);
    }
}

fn opens_markup(s: &str) -> bool {
    let mut chars = s.chars();
    if chars.next() != Some('<') {
        return false;
    }
    matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '/' || c == '!' || c == '?')
}

/// Decodes the named entities templates commonly emit plus numeric references.
pub(super) fn decode_entities(raw: &str) -> String {
    if !raw.contains('&') {
        return raw.to_string();
    }

    let mut out = String::with_capacity(raw.len());
    let mut rest = raw;
    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        rest = &rest[amp..];

        let decoded = rest
            .find(';')
            .filter(|&semi| semi <= 10)
            .and_then(|semi| entity(&rest[1..semi]).map(|c| (c, semi)));

        match decoded {
            Some((c, semi)) => {
                out.push(c);
                rest = &rest[semi + 1..];
            }
            None => {
                out.push('&');
                rest = &rest[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

fn entity(name: &str) -> Option<char> {
    match name {
        "amp" => Some('&'),
        "lt" => Some('<'),
        "gt" => Some('>'),
        "quot" => Some('"'),
        "apos" => Some('\''),
        "nbsp" => Some('\u{a0}'),
        _ => {
            let digits = name.strip_prefix('#')?;
            let code = match digits.strip_prefix(['x', 'X']) {
                Some(hex) => u32::from_str_radix(hex, 16).ok()?,
                None => digits.parse().ok()?,
            };
            char::from_u32(code)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::NodeKind;

    #[test]
    fn test_parses_siblings_and_nesting() {
        let nodes = parse_fragment("<p>A</p><ul><li>x</li><li>y</li></ul>");
        assert_eq!(nodes.len(), 2);
        assert_eq!(nodes[0].tag_name().as_deref(), Some("p"));
        assert_eq!(nodes[1].child_count(), 2);
        assert_eq!(nodes[1].text_content(), "xy");
    }

    #[test]
    fn test_whitespace_text_is_kept() {
        let nodes = parse_fragment("\n  <p>A</p>\n");
        assert_eq!(nodes.len(), 3);
        assert_eq!(nodes[0].kind(), NodeKind::Text("\n  ".to_string()));
    }

    #[test]
    fn test_attributes() {
        let nodes = parse_fragment(
            r#"<input type="checkbox" value='a b' checked data-binding=tags name="x" name="y">"#,
        );
        let input = &nodes[0];
        assert_eq!(input.attribute("type").as_deref(), Some("checkbox"));
        assert_eq!(input.attribute("value").as_deref(), Some("a b"));
        assert_eq!(input.attribute("checked").as_deref(), Some(""));
        assert_eq!(input.attribute("data-binding").as_deref(), Some("tags"));
        assert_eq!(input.attribute("name").as_deref(), Some("x"));
        assert_eq!(input.child_count(), 0);
    }

    #[test]
    fn test_void_and_self_closing_elements_do_not_nest() {
        let nodes = parse_fragment("<br><img src=a.png/><span>t</span>");
        assert_eq!(nodes.len(), 3);
        assert_eq!(nodes[2].text_content(), "t");
    }

    #[test]
    fn test_entities_are_decoded() {
        let nodes = parse_fragment("<p title=\"&quot;hi&quot;\">a &amp; b &lt;c&gt; &#x27;d&#39; &bogus;</p>");
        assert_eq!(nodes[0].attribute("title").as_deref(), Some("\"hi\""));
        assert_eq!(nodes[0].text_content(), "a & b <c> 'd' &bogus;");
    }

    #[test]
    fn test_stray_and_unclosed_tags() {
        let nodes = parse_fragment("</div><b>bold<i>both</b>after");
        assert_eq!(nodes.len(), 2);
        assert_eq!(nodes[0].text_content(), "boldboth");
        assert_eq!(nodes[1].text_content(), "after");
    }

    #[test]
    fn test_implied_end_tags() {
        let nodes = parse_fragment("<ul><li>a<li>b</ul>");
        assert_eq!(nodes[0].child_count(), 2);
    }

    #[test]
    fn test_raw_text_elements() {
        let nodes = parse_fragment("<textarea>a &amp; <b></textarea><script>if (a < b) {}</script>");
        assert_eq!(nodes[0].text_content(), "a & <b>");
        assert_eq!(nodes[1].text_content(), "if (a < b) {}");
    }

    #[test]
    fn test_literal_angle_bracket_is_text() {
        let nodes = parse_fragment("1 < 2 <em>ok</em>");
        assert_eq!(nodes.len(), 2);
        assert_eq!(nodes[0].text_content(), "1 < 2 ");
    }

    #[test]
    fn test_comments() {
        let nodes = parse_fragment("<!-- note --><p>x</p>");
        assert_eq!(nodes[0].kind(), NodeKind::Comment(" note ".to_string()));
    }
}
