use crate::error::StylistError;
use crate::models::OutfitRecord;
use std::fmt::Write;

/// Results area: one table per outfit, rows tinted by category.
pub fn render_outfits(outfits: &[OutfitRecord]) -> String {
    if outfits.is_empty() {
        return r#"<p class="empty">The stylist returned no outfits. Try adjusting your preferences.</p>"#.to_string();
    }
    let mut html = String::new();
    for outfit in outfits {
        let _ = write!(
            html,
            "<section class=\"outfit\">\n<h3>{}</h3>\n<p><strong>Total Price:</strong> {}</p>\n",
            escape(&outfit.outfit_name),
            outfit.total_price
        );
        if !outfit.items.is_empty() {
            html.push_str("<table>\n<thead><tr><th>Category</th><th>Item</th><th>Brand</th><th>Color</th><th>Material</th><th>Price (USD)</th></tr></thead>\n<tbody>\n");
            for item in &outfit.items {
                let _ = writeln!(
                    html,
                    "<tr style=\"background-color: {}; text-align: center\"><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>",
                    item.category.background_color(),
                    escape(&item.category.to_string()),
                    escape(&item.name),
                    escape(&item.brand),
                    escape(&item.color),
                    escape(&item.material),
                    format_price(item.price),
                );
            }
            html.push_str("</tbody>\n</table>\n");
        }
        html.push_str("</section>\n<hr>\n");
    }
    html
}

/// Error panel; the raw reply is shown when there is one so it can be inspected by hand.
pub fn render_error(err: &StylistError) -> String {
    let mut html = format!(
        "<div class=\"error\">\n<p>Error generating recommendations: {}</p>\n",
        escape(&err.to_string())
    );
    if let Some(raw) = err.raw_reply() {
        let _ = write!(html, "<p>Raw output:</p>\n<pre>{}</pre>\n", escape(raw));
    }
    html.push_str("</div>\n");
    html
}

pub fn format_price(price: f64) -> String { format!("${:.2}", price) }

fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
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
