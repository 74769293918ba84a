pub mod extract;
pub mod prompt;

pub use extract::{extract_food_items, ExtractionError};
pub use prompt::build_request;
