pub mod api;
pub mod purchase_traits;
pub mod repository_traits;
