pub mod catalog_service;
pub mod category_service;
pub mod recommendation_service;
pub mod user_service;
