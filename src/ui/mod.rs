pub mod handler;
pub mod render;

pub use handler::ui_router;
pub use handler::AppState;
