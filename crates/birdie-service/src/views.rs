//! Minimal HTML views for the staff-facing order list.
//!
//! One table of orders, each row carrying a form that posts a status
//! update. Rendered directly; there is no template engine.

use birdie_types::{status, Order};

/// Statuses offered in the per-row update dropdown.
const STATUS_OPTIONS: &[&str] = &[
	status::PENDING,
	status::CONFIRMED,
	status::DELAYED,
	status::DELIVERED,
];

/// Escapes text for inclusion in HTML body and attribute positions.
fn escape_html(s: &str) -> String {
	s.replace('&', "&amp;")
		.replace('<', "&lt;")
		.replace('>', "&gt;")
		.replace('"', "&quot;")
}

/// Renders the order list page.
pub fn render_order_list(orders: &[Order]) -> String {
	let mut rows = String::new();
	for order in orders {
		let mut options = String::new();
		for option in STATUS_OPTIONS {
			let selected = if *option == order.status {
				" selected"
			} else {
				""
			};
			options.push_str(&format!(
				"<option value=\"{}\"{}>{}</option>",
				option, selected, option
			));
		}
		// The current status may be outside the recognized set; show it
		// anyway so the page reflects what is stored.
		if !STATUS_OPTIONS.contains(&order.status.as_str()) {
			options.push_str(&format!(
				"<option value=\"{0}\" selected>{0}</option>",
				escape_html(&order.status)
			));
		}

		rows.push_str(&format!(
			"<tr>\
			 <td>{id}</td>\
			 <td>{name}</td>\
			 <td>{phone}</td>\
			 <td>{items}</td>\
			 <td>{status}</td>\
			 <td><form method=\"post\" action=\"/updateOrder\">\
			 <input type=\"hidden\" name=\"id\" value=\"{id}\">\
			 <select name=\"status\">{options}</select> \
			 <button type=\"submit\">Update</button>\
			 </form></td>\
			 </tr>",
			id = order.id,
			name = escape_html(&order.name),
			phone = escape_html(&order.phone),
			items = escape_html(&order.items),
			status = escape_html(&order.status),
			options = options,
		));
	}

	format!(
		"<!DOCTYPE html>\
		 <html>\
		 <head><title>BirdieNomNom Foods &middot; Orders</title></head>\
		 <body>\
		 <h1>Orders</h1>\
		 <table>\
		 <tr><th>#</th><th>Customer</th><th>Phone</th><th>Items</th>\
		 <th>Status</th><th>Update</th></tr>\
		 {rows}\
		 </table>\
		 </body>\
		 </html>"
	)
}
