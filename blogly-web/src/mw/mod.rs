pub use self::forms::{FormData, FormParser};
pub use self::route::Route;
pub use self::router::Router;

pub mod forms;
pub mod regexp;
pub mod route;
pub mod router;
