//! # Placeholder markup.
//!
//! [`Anchor`] is what the host merges into its layout: a wrapper `<div>` carrying
//! the host's class name, and inside it the `<ins class="adsbygoogle">` element
//! the library looks for. A hidden anchor keeps the element in the document (the
//! library may still attach to it) and only collapses the wrapper.

use std::fmt;

/// Renderable placeholder element with its current visibility.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Anchor {
    /// Host-supplied class names for the wrapper.
    pub class_name: Option<String>,
    /// Slot id rendered as `data-ad-slot`.
    pub slot_id: String,
    /// Library client id rendered as `data-ad-client`.
    pub client_id: String,
    /// Minimum reserved height in CSS pixels.
    pub min_height_px: u32,
    /// Whether the wrapper is displayed.
    pub visible: bool,
}

impl Anchor {
    /// Renders the anchor as an HTML fragment.
    pub fn render_html(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Anchor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("<div")?;
        if let Some(class) = self.class_name.as_deref().filter(|c| !c.is_empty()) {
            write!(f, " class=\"{}\"", escape_attr(class))?;
        }
        if !self.visible {
            f.write_str(" style=\"display:none\"")?;
        }
        write!(
            f,
            "><ins class=\"adsbygoogle block\" style=\"display:block;min-height:{}px\" \
             data-ad-client=\"{}\" data-ad-slot=\"{}\" data-ad-format=\"auto\" \
             data-full-width-responsive=\"true\"></ins></div>",
            self.min_height_px,
            escape_attr(&self.client_id),
            escape_attr(&self.slot_id),
        )
    }
}

fn escape_attr(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '"' => out.push_str("&quot;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn anchor(visible: bool) -> Anchor {
        Anchor {
            class_name: Some("hidden xl:block".into()),
            slot_id: "4075355245".into(),
            client_id: "ca-pub-1581472267398547".into(),
            min_height_px: 250,
            visible,
        }
    }

    #[test]
    fn test_visible_markup() {
        let html = anchor(true).render_html();
        assert!(html.starts_with("<div class=\"hidden xl:block\"><ins"));
        assert!(html.contains("data-ad-slot=\"4075355245\""));
        assert!(html.contains("data-ad-client=\"ca-pub-1581472267398547\""));
        assert!(html.contains("min-height:250px"));
        assert!(!html.contains("display:none"));
    }

    #[test]
    fn test_hidden_keeps_element() {
        let html = anchor(false).render_html();
        assert!(html.contains("style=\"display:none\""));
        assert!(html.contains("<ins class=\"adsbygoogle block\""));
    }

    #[test]
    fn test_attribute_escaping() {
        let mut a = anchor(true);
        a.slot_id = "\"><script>".into();
        a.class_name = None;
        let html = a.render_html();
        assert!(html.starts_with("<div><ins"));
        assert!(html.contains("data-ad-slot=\"&quot;&gt;&lt;script&gt;\""));
    }
}
