mod handlers;
mod main_menu;

pub use handlers::{run_segment_cutter, warm_up_engine};
pub use main_menu::show_main_menu;
