pub use super::articles::Entity as Articles;
pub use super::cleaned_food_prices::Entity as CleanedFoodPrices;
