pub mod pages;
pub mod posts;
pub mod prelude;
pub mod tags;
pub mod users;
