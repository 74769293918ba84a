pub mod meal_parser;

pub use meal_parser::MealParser;
