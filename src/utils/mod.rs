pub mod render;
pub mod render2d;
pub mod rng;

pub use render::{encode_png, save_frames, save_png};
pub use render2d::{BLACK, BLUE, Canvas, Color, GRAY, GREEN, RED, WHITE};
pub use rng::{RngStream, SeedSequence, rng_from_seed};
