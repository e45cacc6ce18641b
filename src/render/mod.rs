pub mod layout;
pub mod renderer;

pub use layout::grid_size_for_area;
pub use renderer::Renderer;
