use crate::{db::Snapshot, models::Product};

/// Renders products as an HTML table, one row per item in the given order
pub fn render_table(items: &[Product]) -> String {
    let mut html = String::from(
        "<table border=\"1\">\n<tr><th>ID</th><th>Category</th><th>Stars</th></tr>\n",
    );
    for product in items {
        html.push_str(&format!(
            "<tr><td>{}</td><td>{}</td><td>{}</td></tr>\n",
            escape(&product.id),
            escape(&product.category),
            product.stars
        ));
    }
    html.push_str("</table>\n");
    html
}

/// Full dashboard page for a store snapshot
pub fn render_page(snapshot: &Snapshot) -> String {
    let last = snapshot
        .last_received_at
        .map(|at| at.format("%Y-%m-%d %H:%M:%S UTC").to_string())
        .unwrap_or_else(|| "never".to_string());

    format!(
        "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n\
         <title>Received Products</title>\n</head>\n<body>\n\
         <h1>Received Products</h1>\n\
         <p>{} products from {} batches, last batch: {}</p>\n{}</body>\n</html>\n",
        snapshot.items.len(),
        snapshot.batches,
        last,
        render_table(&snapshot.items)
    )
}

fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
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
