pub mod button;
pub mod field;
pub mod spinner;
pub mod surface;

// Re-export component symbols so callers can `use crate::components::ui::Button` etc.
pub use button::*;
pub use field::*;
pub use spinner::*;
pub use surface::*;
