pub mod line_content;
pub mod modifier;
pub mod result;

pub use line_content::{format_line, parse_line_contents};
pub use modifier::{ModifierProvider, StatDefinition, StatPatternProvider};
pub use result::reconcile;
