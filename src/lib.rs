pub mod colors;
pub mod crossplan;
pub mod landpie;
pub mod layout;
pub mod raster_export;
pub mod recolor;
pub mod render_freq;
pub mod render_paint;
pub mod segments;
