//! Markup serialization.

use super::parser::{UNESCAPED_ELEMENTS, VOID_ELEMENTS};
use super::{Node, NodeKind};

pub(super) fn write_node(node: &Node, out: &mut String) {
    match node.kind() {
        NodeKind::Text(text) => escape_into(&text, false, out),
        NodeKind::Comment(data) => {
            out.push_str("<!--");
            out.push_str(&data);
            out.push_str("-->");
        }
        NodeKind::Element { tag, attributes } => {
            out.push('<');
            out.push_str(&tag);
            for (name, value) in &attributes {
                out.push(' ');
                out.push_str(name);
                out.push_str("=\"");
                escape_into(value, true, out);
                out.push('"');
            }
            out.push('>');

            if VOID_ELEMENTS.contains(&tag.as_str()) {
                return;
            }

            if UNESCAPED_ELEMENTS.contains(&tag.as_str()) {
                out.push_str(&node.text_content());
            } else {
                for child in node.children() {
                    write_node(&child, out);
                }
            }

            out.push_str("</");
            out.push_str(&tag);
            out.push('>');
        }
    }
}

fn escape_into(raw: &str, attribute: bool, out: &mut String) {
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '\u{a0}' => out.push_str("&nbsp;"),
            '"' if attribute => out.push_str("&quot;"),
            '<' if !attribute => out.push_str("&lt;"),
            '>' if !attribute => out.push_str("&gt;"),
            other => out.push(other),
        }
    }
}
